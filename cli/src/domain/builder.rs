//! Formation builder: turns a parsed Procfile into a Formation.
//!
//! Pure function: no I/O, no async.

use slipway_procfile::{CommandLine, ExtendedProcfile, Procfile, StandardProcfile};

use crate::domain::app::App;
use crate::domain::command::Command;
use crate::domain::error::FormationError;
use crate::domain::process::{Exposure, Formation, Process, is_registered_protocol};

/// The process type that receives implicit exposure in a Standard Procfile.
pub const WEB_PROCESS: &str = "web";

/// Build a Formation from a Procfile under the given App's policy.
///
/// Built processes have no instances and default constraints; merge with
/// the previous Formation to carry runtime state over.
///
/// # Errors
///
/// Returns an error naming the process if a command cannot be split or a
/// declared protocol is not registered.
pub fn formation_from_procfile(app: &App, procfile: &Procfile) -> Result<Formation, FormationError> {
    match procfile {
        Procfile::Standard(p) => from_standard(app, p),
        Procfile::Extended(p) => from_extended(app, p),
    }
}

fn from_standard(app: &App, procfile: &StandardProcfile) -> Result<Formation, FormationError> {
    let mut formation = Formation::new();
    for (name, line) in procfile {
        let mut process = Process::new(parse_command(name, line)?);
        if name == WEB_PROCESS {
            process.expose = Some(web_exposure(app));
        }
        formation.insert(name.clone(), process);
    }
    Ok(formation)
}

fn from_extended(app: &App, procfile: &ExtendedProcfile) -> Result<Formation, FormationError> {
    let mut formation = Formation::new();
    for (name, entry) in procfile {
        let command = match &entry.command {
            CommandLine::Line(line) => parse_command(name, line)?,
            CommandLine::Argv(argv) => {
                Command::try_from(argv.clone()).map_err(|source| FormationError::InvalidCommand {
                    process: name.clone(),
                    source,
                })?
            }
        };

        let mut process = Process::new(command);
        if let Some(expose) = entry.expose.as_ref().filter(|e| e.external) {
            if !is_registered_protocol(&expose.protocol) {
                return Err(FormationError::UnknownProtocol {
                    process: name.clone(),
                    protocol: expose.protocol.clone(),
                });
            }
            // The document never carries its own certificate.
            process.expose = Some(Exposure {
                protocol: expose.protocol.clone(),
                external: expose.external,
                cert: app.cert.clone(),
            });
        }
        formation.insert(name.clone(), process);
    }
    Ok(formation)
}

fn web_exposure(app: &App) -> Exposure {
    let external = app.is_public();
    Exposure {
        protocol: if external { "https" } else { "http" }.to_owned(),
        external,
        cert: if external { app.cert.clone() } else { None },
    }
}

fn parse_command(process: &str, line: &str) -> Result<Command, FormationError> {
    Command::parse(line).map_err(|source| FormationError::InvalidCommand {
        process: process.to_owned(),
        source,
    })
}

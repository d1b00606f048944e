//! `slipway validate`: check a local Procfile without touching a runtime.

use std::io::Read as _;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use owo_colors::OwoColorize as _;
use serde::Serialize;

use crate::app::AppContext;
use crate::application::services::deploy::formation_from_bytes;
use crate::domain::AppExposure;

/// Arguments for the validate command.
#[derive(Args)]
pub struct ValidateArgs {
    /// Procfile to check, or `-` for stdin
    #[arg(default_value = "Procfile")]
    pub file: PathBuf,

    /// Build as if the application were public
    #[arg(long)]
    pub public: bool,
}

#[derive(Serialize)]
struct ValidateOutput<'a> {
    valid: bool,
    processes: Vec<&'a str>,
}

/// Run the validate command.
///
/// # Errors
///
/// Returns an error if the file cannot be read, does not parse, or builds an
/// invalid Formation.
pub fn run(app: &AppContext, args: &ValidateArgs) -> Result<()> {
    let raw = read_input(&args.file)?;

    let mut policy = app.default_app("validate");
    if args.public {
        policy.exposure = AppExposure::Public;
    }
    let formation = formation_from_bytes(&policy, &raw, None)
        .with_context(|| format!("{} is invalid", args.file.display()))?;

    if app.is_json() {
        return app.emit(&ValidateOutput {
            valid: true,
            processes: formation.iter().map(|(name, _)| name).collect(),
        });
    }
    app.output.success(&format!(
        "{} is valid ({} process type(s))",
        args.file.display(),
        formation.len()
    ));
    for (name, process) in formation.iter() {
        let mut line = process.command.to_string();
        if let Some(expose) = &process.expose {
            let label = if expose.external {
                format!("[{} external]", expose.protocol)
            } else {
                format!("[{}]", expose.protocol)
            };
            line = format!("{line}  {}", label.style(app.output.styles.external));
        }
        app.output.kv(&format!("{name}:"), &line);
    }
    Ok(())
}

fn read_input(path: &Path) -> Result<Vec<u8>> {
    if path.as_os_str() == "-" {
        let mut raw = Vec::new();
        std::io::stdin()
            .read_to_end(&mut raw)
            .context("reading Procfile from stdin")?;
        return Ok(raw);
    }
    std::fs::read(path).with_context(|| format!("cannot read {}", path.display()))
}

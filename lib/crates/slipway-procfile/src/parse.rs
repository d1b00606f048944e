//! Procfile decoding.
//!
//! A document is tried as a Standard Procfile first and as an Extended one
//! second. Extended decoding never stops at the first bad entry: every
//! problem in the document is collected into one [`ParseError`].

use std::io::Read;

use serde::Deserialize;
use serde_yaml::Value;

use crate::document::{CommandLine, Exposure, ExtendedProcfile, Process, Procfile, StandardProcfile};
use crate::error::{EntryError, ParseError};

/// Read the whole stream and parse it as a Procfile.
pub fn parse_reader(mut reader: impl Read) -> Result<Procfile, ParseError> {
    let mut raw = Vec::new();
    reader
        .read_to_end(&mut raw)
        .map_err(|e| ParseError::document(format!("reading Procfile: {e}")))?;
    parse(&raw)
}

/// Parse raw bytes into a Procfile.
///
/// An empty document is an empty Standard Procfile. When neither shape
/// fits, the Extended attempt's errors are returned.
pub fn parse(raw: &[u8]) -> Result<Procfile, ParseError> {
    if is_blank(raw) {
        return Ok(Procfile::Standard(StandardProcfile::new()));
    }

    let doc: Value =
        serde_yaml::from_slice(raw).map_err(|e| ParseError::document(e.to_string()))?;
    if doc.is_null() {
        return Ok(Procfile::Standard(StandardProcfile::new()));
    }

    match as_standard(&doc) {
        Some(standard) => Ok(Procfile::Standard(standard)),
        None => parse_extended(doc).map(Procfile::Extended),
    }
}

/// Render a Procfile as YAML.
pub fn marshal(procfile: &Procfile) -> Result<String, serde_yaml::Error> {
    serde_yaml::to_string(procfile)
}

fn is_blank(raw: &[u8]) -> bool {
    raw.iter().all(u8::is_ascii_whitespace)
}

/// A mapping of string names to scalars. Numbers and booleans are taken as
/// their literal text, so `worker: 42` is the command `42`.
fn as_standard(doc: &Value) -> Option<StandardProcfile> {
    let Value::Mapping(entries) = doc else {
        return None;
    };
    entries
        .iter()
        .map(|(key, value)| Some((key.as_str()?.to_owned(), scalar_text(value)?)))
        .collect()
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

#[derive(Deserialize)]
struct RawProcess {
    command: Value,
    #[serde(default)]
    expose: Option<Exposure>,
}

fn parse_extended(doc: Value) -> Result<ExtendedProcfile, ParseError> {
    let Value::Mapping(entries) = doc else {
        return Err(ParseError::document(
            "expected a mapping of process names to commands",
        ));
    };

    let mut processes = ExtendedProcfile::new();
    let mut errors = Vec::new();

    for (key, body) in entries {
        let Some(name) = key.as_str().map(str::to_owned) else {
            errors.push(EntryError::Document(format!(
                "process names must be strings, got {key:?}"
            )));
            continue;
        };

        let raw: RawProcess = match serde_yaml::from_value(body) {
            Ok(raw) => raw,
            Err(e) => {
                errors.push(EntryError::Malformed {
                    process: name,
                    message: e.to_string(),
                });
                continue;
            }
        };

        match coerce_command(raw.command) {
            Some(command) => {
                processes.insert(
                    name,
                    Process {
                        command,
                        expose: raw.expose,
                    },
                );
            }
            None => errors.push(EntryError::CommandFormat { process: name }),
        }
    }

    if errors.is_empty() {
        Ok(processes)
    } else {
        errors.sort_by(|a, b| sort_key(a).cmp(sort_key(b)));
        Err(ParseError { errors })
    }
}

/// Accept a string, or a sequence made only of strings.
fn coerce_command(value: Value) -> Option<CommandLine> {
    match value {
        Value::String(line) => Some(CommandLine::Line(line)),
        Value::Sequence(items) => items
            .into_iter()
            .map(|item| match item {
                Value::String(s) => Some(s),
                _ => None,
            })
            .collect::<Option<Vec<_>>>()
            .map(CommandLine::Argv),
        _ => None,
    }
}

fn sort_key(error: &EntryError) -> &str {
    match error {
        EntryError::CommandFormat { process } | EntryError::Malformed { process, .. } => process,
        EntryError::Document(_) => "",
    }
}

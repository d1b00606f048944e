// lib/crates/slipway-procfile/src/document.rs

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize, Serializer};

/// Standard Procfile: `name: "command line"`.
pub type StandardProcfile = BTreeMap<String, String>;

/// Extended Procfile: `name: {command, expose}`.
pub type ExtendedProcfile = BTreeMap<String, Process>;

/// A parsed Procfile. Always exactly one of the two document shapes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Procfile {
    Standard(StandardProcfile),
    Extended(ExtendedProcfile),
}

impl Procfile {
    /// Single-process Extended Procfile with the command rendered as a list.
    ///
    /// This is the canonical shape used when a Procfile is synthesized rather
    /// than read from an image.
    #[must_use]
    pub fn from_argv(name: impl Into<String>, argv: Vec<String>) -> Self {
        let mut processes = ExtendedProcfile::new();
        processes.insert(
            name.into(),
            Process {
                command: CommandLine::Argv(argv),
                expose: None,
            },
        );
        Procfile::Extended(processes)
    }

    /// Names of every declared process, sorted.
    #[must_use]
    pub fn process_names(&self) -> Vec<&str> {
        match self {
            Procfile::Standard(p) => p.keys().map(String::as_str).collect(),
            Procfile::Extended(p) => p.keys().map(String::as_str).collect(),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Procfile::Standard(p) => p.len(),
            Procfile::Extended(p) => p.len(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Serialize for Procfile {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Procfile::Standard(p) => p.serialize(serializer),
            Procfile::Extended(p) => p.serialize(serializer),
        }
    }
}

/// One entry of an Extended Procfile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Process {
    pub command: CommandLine,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expose: Option<Exposure>,
}

/// The `command` field of an Extended entry: either a shell line or argv.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum CommandLine {
    Line(String),
    Argv(Vec<String>),
}

/// The `expose` block of an Extended entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Exposure {
    #[serde(default)]
    pub protocol: String,
    #[serde(default)]
    pub external: bool,
}

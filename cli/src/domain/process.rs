//! Process and Formation model: what runs, how many, and how it is reached.
//!
//! Pure functions only: no I/O or async.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::command::Command;
use crate::domain::constraints::{Constraints, DEFAULT_CONSTRAINTS};
use crate::domain::error::FormationError;

// ── Protocols ────────────────────────────────────────────────────────────────

/// Every protocol a process may declare, and whether it can currently be
/// exposed. Registered-but-disabled protocols parse and build, but fail
/// [`Formation::validate`].
pub const PROTOCOLS: &[(&str, bool)] = &[
    ("http", true),
    ("https", true),
    ("tcp", false),
    ("ssl", false),
];

/// Returns `true` if `protocol` is known at all.
#[must_use]
pub fn is_registered_protocol(protocol: &str) -> bool {
    PROTOCOLS.iter().any(|(name, _)| *name == protocol)
}

/// Returns `true` if `protocol` is known and enabled for traffic.
#[must_use]
pub fn is_enabled_protocol(protocol: &str) -> bool {
    PROTOCOLS
        .iter()
        .any(|(name, enabled)| *name == protocol && *enabled)
}

/// Instance count given to a process type that has never been scaled.
#[must_use]
pub fn default_quantity(process: &str) -> u32 {
    match process {
        "web" => 1,
        _ => 0,
    }
}

// ── Exposure ─────────────────────────────────────────────────────────────────

/// How a process is reachable from outside the cluster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Exposure {
    pub protocol: String,
    pub external: bool,
    /// Only relevant for TLS protocols.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cert: Option<String>,
}

impl Exposure {
    /// Check the protocol against the enabled set.
    ///
    /// # Errors
    ///
    /// Returns an error naming `process` if the protocol is unknown or disabled.
    pub fn validate(&self, process: &str) -> Result<(), FormationError> {
        if !is_registered_protocol(&self.protocol) {
            return Err(FormationError::UnknownProtocol {
                process: process.to_owned(),
                protocol: self.protocol.clone(),
            });
        }
        if !is_enabled_protocol(&self.protocol) {
            return Err(FormationError::DisabledProtocol {
                process: process.to_owned(),
                protocol: self.protocol.clone(),
            });
        }
        Ok(())
    }
}

// ── Process ──────────────────────────────────────────────────────────────────

/// Runtime configuration of one process type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Process {
    pub command: Command,
    #[serde(default)]
    pub quantity: u32,
    #[serde(default)]
    pub constraints: Constraints,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expose: Option<Exposure>,
}

impl Process {
    /// A process with no instances, default constraints and no exposure.
    #[must_use]
    pub fn new(command: Command) -> Self {
        Self {
            command,
            quantity: 0,
            constraints: DEFAULT_CONSTRAINTS,
            expose: None,
        }
    }

    #[must_use]
    pub fn with_expose(mut self, expose: Exposure) -> Self {
        self.expose = Some(expose);
        self
    }
}

// ── Formation ────────────────────────────────────────────────────────────────

/// Every process type of one application, keyed by name.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Formation(BTreeMap<String, Process>);

impl Formation {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, process: Process) -> Option<Process> {
        self.0.insert(name.into(), process)
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Process> {
        self.0.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Process)> {
        self.0.iter().map(|(name, p)| (name.as_str(), p))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Total instances across all process types.
    #[must_use]
    pub fn total_quantity(&self) -> u64 {
        self.0.values().map(|p| u64::from(p.quantity)).sum()
    }

    /// Check every exposed process against the enabled protocol set.
    ///
    /// # Errors
    ///
    /// Returns the first failing process's error, in name order.
    pub fn validate(&self) -> Result<(), FormationError> {
        for (name, process) in &self.0 {
            if let Some(expose) = &process.expose {
                expose.validate(name)?;
            }
        }
        Ok(())
    }

    /// Carry operator-tuned runtime state over from `previous`.
    ///
    /// Commands and exposure come from `self`. Quantity and constraints come
    /// from `previous` when it has a process of the same name, and from the
    /// system defaults otherwise. Processes only in `previous` are dropped.
    #[must_use]
    pub fn merge(&self, previous: &Formation) -> Formation {
        let merged = self
            .0
            .iter()
            .map(|(name, process)| {
                let mut process = process.clone();
                if let Some(existing) = previous.get(name) {
                    process.quantity = existing.quantity;
                    process.constraints = existing.constraints;
                } else {
                    process.quantity = default_quantity(name);
                    process.constraints = DEFAULT_CONSTRAINTS;
                }
                (name.clone(), process)
            })
            .collect();
        Formation(merged)
    }
}

impl FromIterator<(String, Process)> for Formation {
    fn from_iter<I: IntoIterator<Item = (String, Process)>>(iter: I) -> Self {
        Formation(iter.into_iter().collect())
    }
}

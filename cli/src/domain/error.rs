//! Typed domain error enums.
//!
//! This module has zero imports from `crate::infra`, `crate::commands`,
//! `crate::application`, `tokio`, `std::fs`, `std::process`, or `std::net`.
//! All error types implement `thiserror::Error` and convert to `anyhow::Error`
//! via the `?` operator.

use thiserror::Error;

// ── Command errors ────────────────────────────────────────────────────────────

/// Errors turning user input into an argv.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error("command is empty")]
    Empty,

    #[error("cannot split command '{0}': unbalanced quotes or trailing escape")]
    Unparseable(String),
}

// ── Constraint errors ─────────────────────────────────────────────────────────

/// Errors parsing resource constraints.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConstraintsError {
    #[error("invalid memory value '{0}': expected bytes or a KB/MB/GB suffix")]
    InvalidMemory(String),

    #[error("invalid CPU share '{0}': expected an integer between 2 and 1024")]
    InvalidCpuShare(String),

    #[error("invalid process limit '{0}'")]
    InvalidNproc(String),

    #[error("invalid constraints '{0}': expected a preset (1X, 2X, PX) or cpushare:memory[:nproc]")]
    InvalidFormat(String),
}

// ── Formation errors ──────────────────────────────────────────────────────────

/// Errors building or validating a Formation. Each names the process at fault.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormationError {
    #[error("{process} process is invalid: unknown protocol '{protocol}'")]
    UnknownProtocol { process: String, protocol: String },

    #[error("{process} process is invalid: unable to expose {protocol}")]
    DisabledProtocol { process: String, protocol: String },

    #[error("{process} process has an invalid command: {source}")]
    InvalidCommand {
        process: String,
        #[source]
        source: CommandError,
    },
}

// ── Image errors ──────────────────────────────────────────────────────────────

/// Errors parsing an image reference.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ImageError {
    #[error("invalid image reference '{0}'")]
    Invalid(String),
}

// ── Config errors ─────────────────────────────────────────────────────────────

/// Errors related to configuration key/value validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Unknown setting: {key}\n\nValid settings: {valid}")]
    UnknownKey { key: String, valid: String },

    #[error("Invalid value for {key}: {value}\n\nValid values: {valid}")]
    InvalidValue {
        key: String,
        value: String,
        valid: String,
    },
}

//! JSON output helpers.
//!
//! Provides the error-object formatter used by all `--json` code paths when
//! a command fails.

use anyhow::{Context, Result};
use slipway_procfile::ParseError;

use crate::application::ports::ExtractError;
use crate::domain::{ConfigError, FormationError};

/// Format a JSON error object.
///
/// Output (pretty-printed):
/// ```json
/// {
///   "error": true,
///   "message": "...",
///   "code": "..."
/// }
/// ```
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn format_error(message: &str, code: &str) -> Result<String> {
    let obj = serde_json::json!({
        "error": true,
        "message": message,
        "code": code,
    });
    serde_json::to_string_pretty(&obj).context("JSON serialization failed")
}

/// Stable machine-readable code for the first recognized error in the chain.
#[must_use]
pub fn error_code(err: &anyhow::Error) -> &'static str {
    for cause in err.chain() {
        if cause.is::<ParseError>() {
            return "INVALID_PROCFILE";
        }
        if cause.is::<FormationError>() {
            return "INVALID_FORMATION";
        }
        if cause.is::<ConfigError>() {
            return "INVALID_CONFIG";
        }
        if let Some(e) = cause.downcast_ref::<ExtractError>() {
            return match e {
                ExtractError::NotFound(_) => "PROCFILE_NOT_FOUND",
                ExtractError::Cancelled => "CANCELLED",
                ExtractError::Transport(_) => "RUNTIME_ERROR",
            };
        }
    }
    "ERROR"
}

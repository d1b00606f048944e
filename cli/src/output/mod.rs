//! Output formatting module
//!
//! Documents (Procfiles, Formations, JSON results) go to stdout so they can
//! be piped. Every human-facing message goes to stderr.

pub mod json;
pub mod reporter;
pub mod styles;

use console::Term;
use owo_colors::OwoColorize as _;
use serde::Serialize;

pub use reporter::TerminalReporter;
pub use styles::Styles;

/// Output context carrying styling and terminal state.
pub struct OutputContext {
    /// Stylesheet for colored output.
    pub styles: Styles,
    /// Whether to suppress non-error output.
    pub quiet: bool,
}

impl OutputContext {
    /// Create output context based on CLI flags and environment.
    #[must_use]
    pub fn new(no_color: bool, quiet: bool) -> Self {
        let styles = if !no_color && Term::stderr().is_term() {
            Styles::colored()
        } else {
            Styles::default()
        };
        Self { styles, quiet }
    }

    /// Print a success message prefixed with `✓`. Suppressed when `quiet`.
    pub fn success(&self, msg: &str) {
        if !self.quiet {
            eprintln!("  {} {msg}", "✓".style(self.styles.success));
        }
    }

    /// Print a warning message prefixed with `⚠`. Suppressed when `quiet`.
    pub fn warn(&self, msg: &str) {
        if !self.quiet {
            eprintln!("  {} {msg}", "⚠".style(self.styles.warning));
        }
    }

    /// Print an info message prefixed with `ℹ`. Suppressed when `quiet`.
    pub fn info(&self, msg: &str) {
        if !self.quiet {
            eprintln!("  {} {msg}", "ℹ".style(self.styles.info));
        }
    }

    /// Print a section header. Suppressed when `quiet`.
    pub fn header(&self, msg: &str) {
        if !self.quiet {
            eprintln!("  {}", msg.style(self.styles.header));
        }
    }

    /// Print a key-value pair with the key dimmed. Suppressed when `quiet`.
    pub fn kv(&self, key: &str, value: &str) {
        if !self.quiet {
            eprintln!("  {}  {value}", key.style(self.styles.dim));
        }
    }
}

/// Render a document for stdout as pretty JSON or YAML.
///
/// # Errors
///
/// Returns an error if the value cannot be serialized.
pub fn render_document<T: Serialize + ?Sized>(value: &T, json: bool) -> anyhow::Result<String> {
    use anyhow::Context as _;
    if json {
        let mut out = serde_json::to_string_pretty(value).context("JSON serialization failed")?;
        out.push('\n');
        Ok(out)
    } else {
        serde_yaml::to_string(value).context("YAML serialization failed")
    }
}

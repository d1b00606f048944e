//! Application context: unified state passed to every command handler.
//!
//! Built once in `Cli::run()` from the global flags and the config file,
//! then handed to each command as `&AppContext`.

use std::sync::Arc;

use anyhow::Result;
use serde::Serialize;
use tokio_util::sync::CancellationToken;

use crate::application::ports::ConfigStore;
use crate::domain::{App, SlipwayConfig};
use crate::infra::config::YamlConfigStore;
use crate::infra::docker::DockerRuntime;
use crate::output::{OutputContext, render_document};

/// Output rendering mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Human-readable terminal output (default).
    Human,
    /// Machine-readable JSON output.
    Json,
}

/// Output rendering flags.
pub struct OutputFlags {
    /// Disable ANSI color output.
    pub no_color: bool,
    /// Suppress non-error output.
    pub quiet: bool,
    /// Enable JSON output mode.
    pub json: bool,
}

/// Unified application context passed to every command handler.
pub struct AppContext {
    /// Terminal output context (colors, quiet mode).
    pub output: OutputContext,
    /// Output rendering mode (human vs JSON).
    pub mode: OutputMode,
    /// Where the configuration is persisted.
    pub config_store: YamlConfigStore,
    /// Configuration as loaded at startup.
    pub config: SlipwayConfig,
}

impl AppContext {
    /// Construct an `AppContext` from top-level CLI flags.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be read.
    pub fn new(flags: &OutputFlags) -> Result<Self> {
        let mode = if flags.json {
            OutputMode::Json
        } else {
            OutputMode::Human
        };
        let config_store = YamlConfigStore;
        let config = config_store.load()?;

        Ok(Self {
            output: OutputContext::new(flags.no_color || flags.json, flags.quiet),
            mode,
            config_store,
            config,
        })
    }

    /// Returns `true` when JSON output mode is active.
    #[must_use]
    pub fn is_json(&self) -> bool {
        self.mode == OutputMode::Json
    }

    /// Print a document to stdout, JSON in JSON mode and YAML otherwise.
    ///
    /// # Errors
    ///
    /// Returns an error if the value cannot be serialized.
    pub fn emit<T: Serialize + ?Sized>(&self, value: &T) -> Result<()> {
        print!("{}", render_document(value, self.is_json())?);
        Ok(())
    }

    /// The App policy from config, before any flag overrides.
    #[must_use]
    pub fn default_app(&self, name: &str) -> App {
        App {
            name: name.to_owned(),
            exposure: self.config.app.exposure,
            cert: self.config.app.cert.clone(),
        }
    }

    /// Connect to the Docker daemon with the configured timeout.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection settings are invalid.
    pub fn docker(&self) -> Result<Arc<DockerRuntime>> {
        DockerRuntime::connect(self.config.docker.timeout()).map(Arc::new)
    }
}

/// A token cancelled on Ctrl-C, so in-flight runtime calls stop and cleanup
/// still runs.
#[must_use]
pub fn interrupt_token() -> CancellationToken {
    let token = CancellationToken::new();
    let child = token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("interrupted, cancelling");
            child.cancel();
        }
    });
    token
}

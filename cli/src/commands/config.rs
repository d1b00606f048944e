//! `slipway config`: show and set configuration values.

use anyhow::Result;
use clap::Subcommand;
use owo_colors::OwoColorize as _;

use crate::app::AppContext;
use crate::application::ports::ConfigStore;
use crate::application::services::config_service;
use crate::infra::config::CONFIG_ENV;

/// Config subcommands.
#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show,
    /// Set configuration value
    Set {
        /// Configuration key
        key: String,
        /// Configuration value
        value: String,
    },
}

/// Run the config command.
///
/// # Errors
///
/// Returns an error if the configuration cannot be loaded or saved, or the
/// key or value is invalid.
pub fn run(app: &AppContext, cmd: ConfigCommand) -> Result<()> {
    match cmd {
        ConfigCommand::Show => show_config(app),
        ConfigCommand::Set { key, value } => set_config(app, &key, &value),
    }
}

fn show_config(app: &AppContext) -> Result<()> {
    let config = config_service::load_config(&app.config_store)?;
    if app.is_json() {
        return app.emit(&config);
    }

    let path = app.config_store.path()?;
    let styles = &app.output.styles;
    println!();
    println!(
        "  {}",
        format!("Configuration ({})", path.display()).style(styles.header)
    );
    println!();
    println!("  {:<22} {}", "docker.timeout_secs:", config.docker.timeout_secs);
    println!("  {:<22} {}", "cache.ttl_secs:", config.cache.ttl_secs);
    println!("  {:<22} {}", "cache.sweep_secs:", config.cache.sweep_secs);
    println!("  {:<22} {}", "app.exposure:", config.app.exposure);
    println!(
        "  {:<22} {}",
        "app.cert:",
        config.app.cert.as_deref().unwrap_or("(not set)")
    );
    println!();
    println!("  {}", "Environment:".style(styles.bold));
    for var in [CONFIG_ENV, "RUST_LOG", "DOCKER_HOST", "NO_COLOR"] {
        println!(
            "    {:<20} {}",
            format!("{var}:"),
            std::env::var(var).unwrap_or_else(|_| "(not set)".to_string())
        );
    }
    println!();
    Ok(())
}

fn set_config(app: &AppContext, key: &str, value: &str) -> Result<()> {
    config_service::set_config(&app.config_store, key, value)?;
    app.output.success(&format!("Set {key} = {value}"));
    Ok(())
}

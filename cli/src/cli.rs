//! CLI argument parsing with clap derive

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::app::{AppContext, OutputFlags, OutputMode};
use crate::commands;

/// Derive and reconcile process formations from container images
#[derive(Parser)]
#[command(
    name = "slipway",
    version,
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress non-error output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Log debug details to stderr (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(
        long,
        global = true,
        env = "NO_COLOR",
        value_parser = clap::builder::BoolishValueParser::new()
    )]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Print the Procfile an image would deploy with
    Procfile(commands::procfile::ProcfileArgs),

    /// Plan the Formation for an image
    Formation(commands::formation::FormationArgs),

    /// Check a local Procfile
    Validate(commands::validate::ValidateArgs),

    /// Resolve image references to their immutable ids
    Inspect(commands::inspect::InspectArgs),

    /// Manage configuration
    #[command(subcommand)]
    Config(commands::config::ConfigCommand),

    /// Show version
    Version,
}

impl Cli {
    /// Execute the CLI command.
    ///
    /// # Errors
    ///
    /// Returns an error if the command fails.
    pub async fn run(self) -> Result<()> {
        let Cli {
            json,
            quiet,
            no_color,
            command,
            ..
        } = self;

        if let Command::Version = command {
            commands::version::run(if json { OutputMode::Json } else { OutputMode::Human });
            return Ok(());
        }

        let app = AppContext::new(&OutputFlags {
            no_color,
            quiet,
            json,
        })?;
        match command {
            Command::Procfile(args) => commands::procfile::run(&app, &args).await,
            Command::Formation(args) => commands::formation::run(&app, &args).await,
            Command::Validate(args) => commands::validate::run(&app, &args),
            Command::Inspect(args) => commands::inspect::run(&app, &args).await,
            Command::Config(cmd) => commands::config::run(&app, cmd),
            Command::Version => Ok(()),
        }
    }
}

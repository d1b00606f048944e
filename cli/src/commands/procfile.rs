//! `slipway procfile`: print the Procfile an image would deploy with.

use std::io::Write as _;

use anyhow::{Context, Result};
use clap::Args;

use crate::app::{AppContext, interrupt_token};
use crate::application::ports::{ExtractContext, Extractor};
use crate::application::services::extractor::default_chain;
use crate::domain::Image;
use crate::output::TerminalReporter;

/// Arguments for the procfile command.
#[derive(Args)]
pub struct ProcfileArgs {
    /// Image reference, e.g. `acme/web:v42`
    pub image: Image,
}

/// Run the procfile command.
///
/// # Errors
///
/// Returns an error if no strategy can produce a Procfile.
pub async fn run(app: &AppContext, args: &ProcfileArgs) -> Result<()> {
    let runtime = app.docker()?;
    let chain = default_chain(&runtime);
    let reporter = TerminalReporter::new(&app.output);
    let ctx = ExtractContext::new(&reporter).with_cancel(interrupt_token());

    let raw = chain
        .extract(&ctx, &args.image)
        .await
        .with_context(|| format!("extracting Procfile from {}", args.image))?;

    let procfile = slipway_procfile::parse(&raw)
        .with_context(|| format!("Procfile from {} is malformed", args.image))?;
    if app.is_json() {
        return app.emit(&procfile);
    }
    app.output.info(&format!(
        "{} process type(s): {}",
        procfile.len(),
        procfile.process_names().join(", ")
    ));
    let mut stdout = std::io::stdout().lock();
    stdout.write_all(&raw).context("writing Procfile")?;
    if !raw.ends_with(b"\n") {
        stdout.write_all(b"\n").context("writing Procfile")?;
    }
    Ok(())
}

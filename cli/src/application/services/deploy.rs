//! Application service: plan the Formation for a deploy.
//!
//! Imports only from `crate::domain` and `crate::application::ports`.

use anyhow::{Context, Result};

use crate::application::ports::{ExtractContext, Extractor};
use crate::domain::{App, Formation, Image, formation_from_procfile};

/// Extract, parse, build, merge and validate the Formation for `image`.
///
/// `previous` is the Formation currently deployed for the app, if any; its
/// quantities and constraints survive the merge.
///
/// # Errors
///
/// Returns an error if extraction, parsing, building or validation fails.
pub async fn plan_formation(
    extractor: &impl Extractor,
    ctx: &ExtractContext<'_>,
    app: &App,
    image: &Image,
    previous: Option<&Formation>,
) -> Result<Formation> {
    let raw = extractor
        .extract(ctx, image)
        .await
        .with_context(|| format!("extracting Procfile from {image}"))?;
    tracing::debug!(%image, bytes = raw.len(), "extracted Procfile");

    let formation = formation_from_bytes(app, &raw, previous)?;
    ctx.reporter.success(&format!(
        "planned {} process type(s) for {image}",
        formation.len()
    ));
    Ok(formation)
}

/// Parse, build, merge and validate a Formation from raw Procfile bytes.
///
/// # Errors
///
/// Returns an error if the Procfile is malformed or the Formation is invalid.
pub fn formation_from_bytes(app: &App, raw: &[u8], previous: Option<&Formation>) -> Result<Formation> {
    let procfile = slipway_procfile::parse(raw).context("parsing Procfile")?;
    let built = formation_from_procfile(app, &procfile).context("building formation")?;

    let merged = match previous {
        Some(previous) => built.merge(previous),
        None => built.merge(&Formation::new()),
    };
    merged.validate().context("validating formation")?;

    tracing::info!(
        app = %app.name,
        processes = merged.len(),
        instances = merged.total_quantity(),
        "formation ready"
    );
    Ok(merged)
}

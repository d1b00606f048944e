//! `slipway inspect`: resolve image references to their immutable ids.

use std::sync::Arc;

use anyhow::Result;
use clap::Args;
use serde::Serialize;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::app::AppContext;
use crate::application::ports::{ImageDetails, ResourceDescriber};
use crate::domain::Image;
use crate::infra::cache::CachingDescriber;

/// Arguments for the inspect command.
#[derive(Args)]
pub struct InspectArgs {
    /// Image references; repeats are answered from the cache
    #[arg(required = true)]
    pub images: Vec<Image>,
}

#[derive(Debug, Serialize)]
struct Resolved {
    reference: String,
    id: String,
    repo_tags: Vec<String>,
    command: Vec<String>,
}

/// Run the inspect command.
///
/// # Errors
///
/// Returns an error if any reference cannot be resolved.
pub async fn run(app: &AppContext, args: &InspectArgs) -> Result<()> {
    let runtime = app.docker()?;
    let cache = Arc::new(CachingDescriber::with_ttl(
        runtime.as_ref().clone(),
        app.config.cache.ttl(),
    ));
    let stop = CancellationToken::new();
    let sweeper = cache.spawn_sweeper(app.config.cache.sweep_interval(), stop.clone());

    let result = resolve_all(cache.as_ref(), &args.images).await;
    stop.cancel();
    join_sweeper(sweeper).await;
    let resolved = result?;

    if app.is_json() {
        return app.emit(&resolved);
    }
    for r in &resolved {
        println!("{}  {}", r.id, r.reference);
    }
    app.output
        .info(&format!("{} cached entries", cache.len()));
    Ok(())
}

/// Wait for the sweeper to stop. Returns `false` if it panicked or was aborted.
async fn join_sweeper(handle: JoinHandle<()>) -> bool {
    match handle.await {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!(error = %e, "cache sweeper did not exit cleanly");
            false
        }
    }
}

async fn resolve_all<D>(describer: &D, images: &[Image]) -> Result<Vec<Resolved>>
where
    D: ResourceDescriber<Resource = ImageDetails>,
{
    let mut resolved = Vec::with_capacity(images.len());
    for image in images {
        let reference = image.to_string();
        let details = describer.describe(&reference).await?;
        resolved.push(Resolved {
            reference,
            id: details.id,
            repo_tags: details.repo_tags,
            command: details.config.default_argv(),
        });
    }
    Ok(resolved)
}

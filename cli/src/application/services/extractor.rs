//! Application service: Procfile extraction strategies.
//!
//! Imports only from `crate::domain` and `crate::application::ports`.
//! All runtime I/O is routed through the injected `ContainerRuntime`.

use std::future::Future;
use std::io::Read;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use slipway_procfile::Procfile;
use tokio_util::sync::CancellationToken;

use crate::application::ports::{ContainerRuntime, ExtractContext, ExtractError, Extractor, RuntimeError};
use crate::domain::Image;
use crate::domain::builder::WEB_PROCESS;

/// Where the in-image Procfile is read from.
pub const PROCFILE_PATH: &str = "/home/app/Procfile";

/// Upper bound on the cleanup call once the extraction itself has finished.
pub const CLEANUP_TIMEOUT: Duration = Duration::from_secs(30);

/// Race a runtime call against the caller's cancellation token.
async fn cancellable<T>(
    cancel: &CancellationToken,
    call: impl Future<Output = Result<T, RuntimeError>>,
) -> Result<T, ExtractError> {
    tokio::select! {
        biased;
        () = cancel.cancelled() => Err(ExtractError::Cancelled),
        result = call => result.map_err(ExtractError::from),
    }
}

// ── Default command ──────────────────────────────────────────────────────────

/// Synthesizes a single `web` process from the image's own entrypoint and cmd.
pub struct CommandExtractor<R> {
    runtime: Arc<R>,
}

impl<R: ContainerRuntime> CommandExtractor<R> {
    #[must_use]
    pub fn new(runtime: Arc<R>) -> Self {
        Self { runtime }
    }
}

#[async_trait]
impl<R: ContainerRuntime> Extractor for CommandExtractor<R> {
    fn name(&self) -> &'static str {
        "image-command"
    }

    async fn extract(&self, ctx: &ExtractContext<'_>, image: &Image) -> Result<Vec<u8>, ExtractError> {
        ctx.reporter
            .step(&format!("using the default command of {image}"));
        let config = cancellable(&ctx.cancel, self.runtime.inspect_image(image)).await?;

        let argv = config.default_argv();
        if argv.is_empty() {
            return Err(ExtractError::NotFound(format!("default command of {image}")));
        }

        let procfile = Procfile::from_argv(WEB_PROCESS, argv);
        slipway_procfile::marshal(&procfile)
            .map(String::into_bytes)
            .map_err(|e| ExtractError::Transport(e.into()))
    }
}

// ── In-image file ─────────────────────────────────────────────────────────────

/// Reads a Procfile out of the image's filesystem through a throwaway
/// container that is never started.
pub struct FileExtractor<R> {
    runtime: Arc<R>,
    path: String,
}

impl<R: ContainerRuntime> FileExtractor<R> {
    #[must_use]
    pub fn new(runtime: Arc<R>) -> Self {
        Self {
            runtime,
            path: PROCFILE_PATH.to_owned(),
        }
    }

    async fn copy_procfile(&self, ctx: &ExtractContext<'_>, id: &str) -> Result<Vec<u8>, ExtractError> {
        cancellable(&ctx.cancel, self.runtime.inspect_container(id)).await?;
        let archive = cancellable(&ctx.cancel, self.runtime.copy_out(id, &self.path)).await?;
        first_entry(&archive, &self.path)
    }

    /// Create the throwaway container. If the caller cancels while the
    /// daemon is still creating it, the create is allowed to finish (within
    /// [`CLEANUP_TIMEOUT`]) so the container it produced can be removed.
    async fn create(&self, ctx: &ExtractContext<'_>, image: &Image) -> Result<String, ExtractError> {
        if ctx.cancel.is_cancelled() {
            return Err(ExtractError::Cancelled);
        }
        let mut create = std::pin::pin!(self.runtime.create_container(image));
        tokio::select! {
            biased;
            () = ctx.cancel.cancelled() => {
                match tokio::time::timeout(CLEANUP_TIMEOUT, &mut create).await {
                    Ok(Ok(id)) => self.remove(&id).await,
                    Ok(Err(_)) => {}
                    Err(_) => tracing::warn!(
                        %image,
                        "gave up waiting for a cancelled container create; it may be left behind"
                    ),
                }
                Err(ExtractError::Cancelled)
            }
            result = &mut create => result.map_err(ExtractError::from),
        }
    }

    /// Best effort: a failed removal is logged and never replaces the
    /// extraction result.
    async fn remove(&self, id: &str) {
        match tokio::time::timeout(CLEANUP_TIMEOUT, self.runtime.remove_container(id)).await {
            Ok(Ok(())) => tracing::debug!(container = %id, "removed extraction container"),
            Ok(Err(e)) => {
                tracing::warn!(container = %id, error = %e, "failed to remove extraction container");
            }
            Err(_) => tracing::warn!(
                container = %id,
                "timed out removing extraction container after {}s",
                CLEANUP_TIMEOUT.as_secs()
            ),
        }
    }
}

#[async_trait]
impl<R: ContainerRuntime> Extractor for FileExtractor<R> {
    fn name(&self) -> &'static str {
        "image-file"
    }

    async fn extract(&self, ctx: &ExtractContext<'_>, image: &Image) -> Result<Vec<u8>, ExtractError> {
        ctx.reporter
            .step(&format!("looking for {} in {image}", self.path));
        let id = self.create(ctx, image).await?;
        tracing::debug!(container = %id, %image, "created extraction container");

        let result = self.copy_procfile(ctx, &id).await;
        self.remove(&id).await;
        result
    }
}

/// Body of the first entry of a tar archive.
fn first_entry(archive: &[u8], path: &str) -> Result<Vec<u8>, ExtractError> {
    let transport = |e: std::io::Error| ExtractError::Transport(anyhow::Error::new(e).context("reading Procfile archive"));

    let mut archive = tar::Archive::new(archive);
    let mut entries = archive.entries().map_err(transport)?;
    let Some(entry) = entries.next() else {
        return Err(ExtractError::NotFound(path.to_owned()));
    };

    let mut body = Vec::new();
    entry.map_err(transport)?.read_to_end(&mut body).map_err(transport)?;
    Ok(body)
}

// ── Fallback composite ───────────────────────────────────────────────────────

/// Tries each extractor in order and returns the first success.
///
/// Extractors run one at a time; a later one never runs once an earlier one
/// has succeeded. When all fail, the last error is returned.
#[derive(Default)]
pub struct MultiExtractor {
    extractors: Vec<Box<dyn Extractor>>,
}

impl MultiExtractor {
    #[must_use]
    pub fn then(mut self, extractor: impl Extractor + 'static) -> Self {
        self.extractors.push(Box::new(extractor));
        self
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.extractors.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.extractors.is_empty()
    }
}

#[async_trait]
impl Extractor for MultiExtractor {
    fn name(&self) -> &'static str {
        "fallback"
    }

    async fn extract(&self, ctx: &ExtractContext<'_>, image: &Image) -> Result<Vec<u8>, ExtractError> {
        let mut last = ExtractError::NotFound("extractor for Procfile".to_owned());
        for extractor in &self.extractors {
            match extractor.extract(ctx, image).await {
                Ok(raw) => {
                    tracing::debug!(extractor = extractor.name(), %image, "extracted Procfile");
                    return Ok(raw);
                }
                Err(ExtractError::Cancelled) => return Err(ExtractError::Cancelled),
                Err(e) => {
                    tracing::debug!(extractor = extractor.name(), error = %e, "extractor failed, trying next");
                    last = e;
                }
            }
        }
        Err(last)
    }
}

/// The standard chain: prefer a Procfile in the image, fall back to the
/// image's default command.
#[must_use]
pub fn default_chain<R: ContainerRuntime + 'static>(runtime: &Arc<R>) -> MultiExtractor {
    MultiExtractor::default()
        .then(FileExtractor::new(Arc::clone(runtime)))
        .then(CommandExtractor::new(Arc::clone(runtime)))
}

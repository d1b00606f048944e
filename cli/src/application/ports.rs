//! Port trait definitions for the Application layer.
//!
//! Ports are the interfaces (contracts) that infrastructure must fulfill.
//! This file imports only from `crate::domain`, never from `crate::infra`,
//! `crate::commands`, or `crate::output`.

use anyhow::Result;
use async_trait::async_trait;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

use crate::domain::{Formation, Image, SlipwayConfig};

// ── Errors ────────────────────────────────────────────────────────────────────

/// Failure of a container runtime call.
#[derive(Debug, Error)]
pub enum RuntimeError {
    /// The image, container or path does not exist.
    #[error("{0} not found")]
    NotFound(String),

    /// Anything else: connection, daemon error, decoding.
    #[error(transparent)]
    Transport(#[from] anyhow::Error),
}

/// Failure of an extraction strategy.
#[derive(Debug, Error)]
pub enum ExtractError {
    /// Nothing to extract; the next strategy in a chain may still succeed.
    #[error("{0} not found")]
    NotFound(String),

    #[error("extraction cancelled")]
    Cancelled,

    #[error(transparent)]
    Transport(anyhow::Error),
}

impl ExtractError {
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

impl From<RuntimeError> for ExtractError {
    fn from(e: RuntimeError) -> Self {
        match e {
            RuntimeError::NotFound(what) => Self::NotFound(what),
            RuntimeError::Transport(err) => Self::Transport(err),
        }
    }
}

// ── Value Types ───────────────────────────────────────────────────────────────

/// The default process an image declares.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImageConfig {
    pub entrypoint: Vec<String>,
    pub cmd: Vec<String>,
}

impl ImageConfig {
    /// Entrypoint followed by cmd, the argv the runtime would start.
    #[must_use]
    pub fn default_argv(&self) -> Vec<String> {
        self.entrypoint.iter().chain(&self.cmd).cloned().collect()
    }
}

/// What the runtime reports about a container.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContainerState {
    pub id: String,
    /// Runtime status, e.g. `"created"`.
    pub status: Option<String>,
}

/// An image as the runtime resolved it. `id` is the content digest, which
/// never changes; the tags that led to it may.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImageDetails {
    pub id: String,
    pub repo_tags: Vec<String>,
    pub config: ImageConfig,
}

impl Identified for ImageDetails {
    fn canonical_id(&self) -> &str {
        &self.id
    }
}

// ── Container Runtime Port ────────────────────────────────────────────────────

/// The subset of a container runtime API needed to read an image.
#[async_trait]
pub trait ContainerRuntime: Send + Sync {
    /// Read the image's embedded entrypoint and cmd.
    async fn inspect_image(&self, image: &Image) -> Result<ImageConfig, RuntimeError>;
    /// Create a container from the image without starting it. Returns its id.
    async fn create_container(&self, image: &Image) -> Result<String, RuntimeError>;
    /// Inspect a container by id.
    async fn inspect_container(&self, id: &str) -> Result<ContainerState, RuntimeError>;
    /// Copy `path` out of the container's filesystem as a tar archive.
    async fn copy_out(&self, id: &str, path: &str) -> Result<Vec<u8>, RuntimeError>;
    /// Remove the container.
    async fn remove_container(&self, id: &str) -> Result<(), RuntimeError>;
}

// ── Extraction Port ───────────────────────────────────────────────────────────

/// Per-call state handed to every extractor.
pub struct ExtractContext<'a> {
    /// Aborts in-flight runtime calls when cancelled.
    pub cancel: CancellationToken,
    /// Where user-facing progress goes.
    pub reporter: &'a (dyn ProgressReporter + Sync),
}

impl<'a> ExtractContext<'a> {
    #[must_use]
    pub fn new(reporter: &'a (dyn ProgressReporter + Sync)) -> Self {
        Self {
            cancel: CancellationToken::new(),
            reporter,
        }
    }

    #[must_use]
    pub fn with_cancel(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }
}

/// A strategy that derives raw Procfile bytes from an image.
#[async_trait]
pub trait Extractor: Send + Sync {
    /// Short label used in logs.
    fn name(&self) -> &'static str;

    async fn extract(&self, ctx: &ExtractContext<'_>, image: &Image) -> Result<Vec<u8>, ExtractError>;
}

// ── Describe-by-identity Port ─────────────────────────────────────────────────

/// A remote resource that knows its own immutable identity.
pub trait Identified {
    /// The identity the resource will always have, e.g. a content digest.
    fn canonical_id(&self) -> &str;
}

/// A remote lookup of a resource by key. The key may be an alias that the
/// remote side resolves to the resource's canonical identity.
#[async_trait]
pub trait ResourceDescriber: Send + Sync {
    type Resource: Identified + Clone + Send + Sync + 'static;

    async fn describe(&self, key: &str) -> Result<Self::Resource>;
}

// ── Progress Reporting Port ───────────────────────────────────────────────────

/// Abstracts progress reporting so services can emit events without
/// depending on the Presentation layer. Sync trait; no async needed.
pub trait ProgressReporter {
    /// Emit an in-progress step message.
    fn step(&self, message: &str);
    /// Emit a success message.
    fn success(&self, message: &str);
    /// Emit a warning message.
    fn warn(&self, message: &str);
}

/// Discards every progress event.
pub struct SilentReporter;

impl ProgressReporter for SilentReporter {
    fn step(&self, _: &str) {}
    fn success(&self, _: &str) {}
    fn warn(&self, _: &str) {}
}

// ── State Ports ───────────────────────────────────────────────────────────────

/// Abstracts reading and writing a Formation document.
pub trait FormationStore {
    /// Load the stored Formation, returning `None` if there is none.
    fn load(&self) -> Result<Option<Formation>>;
    /// Persist the given Formation.
    fn save(&self, formation: &Formation) -> Result<()>;
}

// ── Config Port ───────────────────────────────────────────────────────────────

/// Abstracts configuration persistence.
pub trait ConfigStore {
    /// Load the configuration, returning defaults if none is stored.
    fn load(&self) -> Result<SlipwayConfig>;
    /// Persist the configuration.
    fn save(&self, config: &SlipwayConfig) -> Result<()>;
    /// Where the configuration lives.
    fn path(&self) -> Result<std::path::PathBuf>;
}

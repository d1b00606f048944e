//! Shared mock infrastructure for unit tests.
//!
//! Provides a recording [`ContainerRuntime`] whose behaviour for each call is
//! configured up front, so each test file doesn't have to re-define the same
//! boilerplate.

#![allow(dead_code)]

use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use slipway_cli::application::ports::{
    ContainerRuntime, ContainerState, ImageConfig, RuntimeError,
};
use slipway_cli::domain::Image;

use crate::helpers::procfile_archive;

pub const CONTAINER_ID: &str = "c0ffee";

/// What `copy_out` does.
pub enum CopyOutcome {
    Archive(Vec<u8>),
    Missing,
    Fail,
    /// Never completes; only cancellation gets the caller out.
    Hang,
}

/// Container runtime mock that records every call by name.
pub struct RecordingRuntime {
    image_config: Result<ImageConfig, &'static str>,
    copy: CopyOutcome,
    fail_create: bool,
    create_delay: Duration,
    fail_remove: bool,
    calls: Mutex<Vec<&'static str>>,
}

impl RecordingRuntime {
    /// An image holding `body` at the Procfile path, with no default command.
    pub fn with_procfile(body: &str) -> Self {
        Self::new(CopyOutcome::Archive(procfile_archive(body)))
    }

    /// An image with no Procfile and no default command.
    pub fn without_procfile() -> Self {
        Self::new(CopyOutcome::Missing)
    }

    pub fn new(copy: CopyOutcome) -> Self {
        Self {
            image_config: Ok(ImageConfig::default()),
            copy,
            fail_create: false,
            create_delay: Duration::ZERO,
            fail_remove: false,
            calls: Mutex::new(Vec::new()),
        }
    }

    #[must_use]
    pub fn with_command(mut self, entrypoint: &[&str], cmd: &[&str]) -> Self {
        self.image_config = Ok(ImageConfig {
            entrypoint: entrypoint.iter().map(|s| (*s).to_owned()).collect(),
            cmd: cmd.iter().map(|s| (*s).to_owned()).collect(),
        });
        self
    }

    /// `inspect_image` fails with a transport error.
    #[must_use]
    pub fn failing_inspect(mut self) -> Self {
        self.image_config = Err("daemon unavailable");
        self
    }

    /// `create_container` fails with a transport error.
    #[must_use]
    pub fn failing_create(mut self) -> Self {
        self.fail_create = true;
        self
    }

    /// `create_container` takes `delay` before answering.
    #[must_use]
    pub fn slow_create(mut self, delay: Duration) -> Self {
        self.create_delay = delay;
        self
    }

    /// `remove_container` fails with a transport error.
    #[must_use]
    pub fn failing_remove(mut self) -> Self {
        self.fail_remove = true;
        self
    }

    pub fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    pub fn count(&self, call: &str) -> usize {
        self.calls().iter().filter(|c| **c == call).count()
    }

    fn record(&self, call: &'static str) {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(call);
        }
    }
}

fn transport(msg: &str) -> RuntimeError {
    RuntimeError::Transport(anyhow::anyhow!("{msg}"))
}

#[async_trait]
impl ContainerRuntime for RecordingRuntime {
    async fn inspect_image(&self, image: &Image) -> Result<ImageConfig, RuntimeError> {
        self.record("inspect_image");
        match &self.image_config {
            Ok(config) => Ok(config.clone()),
            Err(msg) => Err(transport(&format!("inspecting {image}: {msg}"))),
        }
    }

    async fn create_container(&self, _: &Image) -> Result<String, RuntimeError> {
        self.record("create_container");
        if !self.create_delay.is_zero() {
            tokio::time::sleep(self.create_delay).await;
        }
        if self.fail_create {
            return Err(transport("create refused"));
        }
        Ok(CONTAINER_ID.to_owned())
    }

    async fn inspect_container(&self, id: &str) -> Result<ContainerState, RuntimeError> {
        self.record("inspect_container");
        Ok(ContainerState {
            id: id.to_owned(),
            status: Some("created".to_owned()),
        })
    }

    async fn copy_out(&self, _: &str, path: &str) -> Result<Vec<u8>, RuntimeError> {
        self.record("copy_out");
        match &self.copy {
            CopyOutcome::Archive(archive) => Ok(archive.clone()),
            CopyOutcome::Missing => Err(RuntimeError::NotFound(path.to_owned())),
            CopyOutcome::Fail => Err(transport("copy interrupted")),
            CopyOutcome::Hang => std::future::pending().await,
        }
    }

    async fn remove_container(&self, _: &str) -> Result<(), RuntimeError> {
        self.record("remove_container");
        if self.fail_remove {
            return Err(transport("remove refused"));
        }
        Ok(())
    }
}

//! Docker Engine adapter for the `ContainerRuntime` and `ResourceDescriber`
//! ports, backed by `bollard`.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use bollard::Docker;
use bollard::container::{
    Config, CreateContainerOptions, DownloadFromContainerOptions, InspectContainerOptions,
    RemoveContainerOptions,
};
use bollard::errors::Error as BollardError;
use bollard::models::ImageInspect;
use futures_util::TryStreamExt;

use crate::application::ports::{
    ContainerRuntime, ContainerState, ImageConfig, ImageDetails, ResourceDescriber, RuntimeError,
};
use crate::domain::Image;

/// Handle to the local Docker daemon.
#[derive(Clone)]
pub struct DockerRuntime {
    docker: Docker,
}

impl DockerRuntime {
    /// Connect using `DOCKER_HOST` or the platform's default socket.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection settings are invalid. The daemon
    /// itself is not contacted until the first call.
    pub fn connect(timeout: Duration) -> Result<Self> {
        let docker = Docker::connect_with_local_defaults()
            .context("cannot connect to the Docker daemon")?
            .with_timeout(timeout);
        Ok(Self { docker })
    }

    async fn inspect(&self, reference: &str) -> Result<ImageInspect, RuntimeError> {
        self.docker
            .inspect_image(reference)
            .await
            .map_err(|e| runtime_error(e, || format!("image {reference}")))
    }
}

/// 404 from the daemon means the thing asked for does not exist.
fn runtime_error(err: BollardError, what: impl FnOnce() -> String) -> RuntimeError {
    match err {
        BollardError::DockerResponseServerError {
            status_code: 404, ..
        } => RuntimeError::NotFound(what()),
        other => RuntimeError::Transport(anyhow::Error::new(other).context(what())),
    }
}

fn image_config(inspect: &ImageInspect) -> ImageConfig {
    let config = inspect.config.as_ref();
    ImageConfig {
        entrypoint: config
            .and_then(|c| c.entrypoint.clone())
            .unwrap_or_default(),
        cmd: config.and_then(|c| c.cmd.clone()).unwrap_or_default(),
    }
}

#[async_trait]
impl ContainerRuntime for DockerRuntime {
    async fn inspect_image(&self, image: &Image) -> Result<ImageConfig, RuntimeError> {
        let inspect = self.inspect(&image.to_string()).await?;
        Ok(image_config(&inspect))
    }

    async fn create_container(&self, image: &Image) -> Result<String, RuntimeError> {
        let config = Config {
            image: Some(image.to_string()),
            ..Default::default()
        };
        let created = self
            .docker
            .create_container(None::<CreateContainerOptions<String>>, config)
            .await
            .map_err(|e| runtime_error(e, || format!("image {image}")))?;
        for warning in &created.warnings {
            tracing::warn!(container = %created.id, "docker: {warning}");
        }
        Ok(created.id)
    }

    async fn inspect_container(&self, id: &str) -> Result<ContainerState, RuntimeError> {
        let inspect = self
            .docker
            .inspect_container(id, None::<InspectContainerOptions>)
            .await
            .map_err(|e| runtime_error(e, || format!("container {id}")))?;
        Ok(ContainerState {
            id: inspect.id.unwrap_or_else(|| id.to_owned()),
            status: inspect
                .state
                .and_then(|s| s.status)
                .map(|s| s.to_string()),
        })
    }

    async fn copy_out(&self, id: &str, path: &str) -> Result<Vec<u8>, RuntimeError> {
        let options = DownloadFromContainerOptions { path };
        self.docker
            .download_from_container(id, Some(options))
            .try_fold(Vec::new(), |mut archive, chunk| async move {
                archive.extend_from_slice(&chunk);
                Ok::<_, BollardError>(archive)
            })
            .await
            .map_err(|e| runtime_error(e, || format!("{path} in container {id}")))
    }

    async fn remove_container(&self, id: &str) -> Result<(), RuntimeError> {
        let options = RemoveContainerOptions {
            force: true,
            v: true,
            ..Default::default()
        };
        self.docker
            .remove_container(id, Some(options))
            .await
            .map_err(|e| runtime_error(e, || format!("container {id}")))
    }
}

#[async_trait]
impl ResourceDescriber for DockerRuntime {
    type Resource = ImageDetails;

    async fn describe(&self, key: &str) -> Result<ImageDetails> {
        let inspect = self.inspect(key).await?;
        let config = image_config(&inspect);
        let id = inspect
            .id
            .ok_or_else(|| anyhow::anyhow!("daemon returned no id for image {key}"))?;
        Ok(ImageDetails {
            id,
            repo_tags: inspect.repo_tags.unwrap_or_default(),
            config,
        })
    }
}

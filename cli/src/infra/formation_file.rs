//! Infrastructure implementation of the `FormationStore` port.
//!
//! A Formation is kept as a single JSON or YAML document, chosen by the file
//! extension. Writes go to a temp file first and are renamed into place.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::application::ports::FormationStore;
use crate::domain::Formation;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
    Json,
    Yaml,
}

impl Format {
    fn of(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some("yaml" | "yml") => Self::Yaml,
            _ => Self::Json,
        }
    }
}

/// Formation document on disk.
pub struct FormationFile {
    path: PathBuf,
}

impl FormationFile {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn decode(&self, content: &str) -> Result<Formation> {
        match Format::of(&self.path) {
            Format::Json => serde_json::from_str(content)
                .with_context(|| format!("parsing formation file {}", self.path.display())),
            Format::Yaml => serde_yaml::from_str(content)
                .with_context(|| format!("parsing formation file {}", self.path.display())),
        }
    }

    fn encode(&self, formation: &Formation) -> Result<String> {
        match Format::of(&self.path) {
            Format::Json => serde_json::to_string_pretty(formation)
                .map(|mut s| {
                    s.push('\n');
                    s
                })
                .context("serializing formation"),
            Format::Yaml => serde_yaml::to_string(formation).context("serializing formation"),
        }
    }
}

impl FormationStore for FormationFile {
    fn load(&self) -> Result<Option<Formation>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let content = std::fs::read_to_string(&self.path)
            .with_context(|| format!("reading formation file {}", self.path.display()))?;
        self.decode(&content).map(Some)
    }

    fn save(&self, formation: &Formation) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("creating directory {}", parent.display()))?;
        }
        let content = self.encode(formation)?;

        let mut temp_path = self.path.clone().into_os_string();
        temp_path.push(".tmp");
        let temp_path = PathBuf::from(temp_path);
        std::fs::write(&temp_path, &content)
            .with_context(|| format!("writing temp file {}", temp_path.display()))?;
        std::fs::rename(&temp_path, &self.path)
            .with_context(|| format!("finalizing formation file {}", self.path.display()))?;

        tracing::debug!(path = %self.path.display(), processes = formation.len(), "saved formation");
        Ok(())
    }
}

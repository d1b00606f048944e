//! Domain types and validators for Slipway configuration.
//!
//! Pure functions only: no I/O or async.

use std::time::Duration;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::domain::app::AppExposure;
use crate::domain::error::ConfigError;

// ── Constants ────────────────────────────────────────────────────────────────

pub const VALID_CONFIG_KEYS: &[&str] = &[
    "docker.timeout_secs",
    "cache.ttl_secs",
    "cache.sweep_secs",
    "app.exposure",
    "app.cert",
];

// ── Config schema ────────────────────────────────────────────────────────────

/// Top-level configuration stored in `~/.slipway/config.yaml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct SlipwayConfig {
    pub docker: DockerConfig,
    pub cache: CacheConfig,
    pub app: AppConfig,
}

/// Container runtime connection settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DockerConfig {
    /// Per-request timeout against the Docker daemon.
    #[serde(default = "default_docker_timeout")]
    pub timeout_secs: u64,
}

impl Default for DockerConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_docker_timeout(),
        }
    }
}

impl DockerConfig {
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Immutable-resource cache tuning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Lifetime of entries keyed by an unresolved alias.
    #[serde(default = "default_cache_ttl")]
    pub ttl_secs: u64,
    /// Interval between sweeps of expired entries.
    #[serde(default = "default_cache_sweep")]
    pub sweep_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_secs: default_cache_ttl(),
            sweep_secs: default_cache_sweep(),
        }
    }
}

impl CacheConfig {
    #[must_use]
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }

    #[must_use]
    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_secs)
    }
}

/// Default application policy used when flags don't override it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub exposure: AppExposure,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cert: Option<String>,
}

fn default_docker_timeout() -> u64 {
    120
}

fn default_cache_ttl() -> u64 {
    30 * 60
}

fn default_cache_sweep() -> u64 {
    30
}

// ── Validators ───────────────────────────────────────────────────────────────

/// Validates a configuration key against the whitelist.
///
/// # Errors
///
/// Returns an error if the key is not in the allowed list.
pub fn validate_config_key(key: &str) -> Result<()> {
    if !VALID_CONFIG_KEYS.contains(&key) {
        return Err(ConfigError::UnknownKey {
            key: key.to_string(),
            valid: VALID_CONFIG_KEYS.join(", "),
        }
        .into());
    }
    Ok(())
}

/// Validates a configuration value for the given key.
///
/// # Errors
///
/// Returns an error if the value is not valid for the key.
pub fn validate_config_value(key: &str, value: &str) -> Result<()> {
    let invalid = |valid: &str| ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
        valid: valid.to_string(),
    };
    match key {
        "docker.timeout_secs" | "cache.ttl_secs" | "cache.sweep_secs" => {
            match value.parse::<u64>() {
                Ok(n) if n > 0 => Ok(()),
                _ => Err(invalid("a positive number of seconds").into()),
            }
        }
        "app.exposure" if !AppExposure::VALUES.contains(&value) => {
            Err(invalid(&AppExposure::VALUES.join(", ")).into())
        }
        "app.cert" if value.trim().is_empty() => Err(invalid("a certificate identifier").into()),
        _ => Ok(()),
    }
}

impl SlipwayConfig {
    /// Check values that did not come through [`set`](Self::set), such as a
    /// hand-edited file.
    ///
    /// # Errors
    ///
    /// Returns the first invalid value found.
    pub fn validate(&self) -> Result<()> {
        for (key, secs) in [
            ("docker.timeout_secs", self.docker.timeout_secs),
            ("cache.ttl_secs", self.cache.ttl_secs),
            ("cache.sweep_secs", self.cache.sweep_secs),
        ] {
            validate_config_value(key, &secs.to_string())?;
        }
        if let Some(cert) = &self.app.cert {
            validate_config_value("app.cert", cert)?;
        }
        Ok(())
    }

    /// Apply a validated `key = value` pair.
    ///
    /// # Errors
    ///
    /// Returns an error if the key or value is invalid.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        validate_config_key(key)?;
        validate_config_value(key, value)?;
        match key {
            "docker.timeout_secs" => self.docker.timeout_secs = value.parse()?,
            "cache.ttl_secs" => self.cache.ttl_secs = value.parse()?,
            "cache.sweep_secs" => self.cache.sweep_secs = value.parse()?,
            "app.exposure" => {
                self.app.exposure = value.parse().map_err(|e: String| anyhow::anyhow!(e))?;
            }
            "app.cert" => self.app.cert = Some(value.to_owned()),
            _ => {}
        }
        Ok(())
    }
}

//! Application service: configuration use-cases.

use anyhow::Result;

use crate::application::ports::ConfigStore;
use crate::domain::config::SlipwayConfig;

/// Load configuration.
///
/// # Errors
///
/// Returns an error if the stored configuration cannot be read.
pub fn load_config(store: &impl ConfigStore) -> Result<SlipwayConfig> {
    store.load()
}

/// Validate and apply `key = value`, then persist. Returns the updated config.
///
/// # Errors
///
/// Returns an error if the key or value is invalid, or persistence fails.
pub fn set_config(store: &impl ConfigStore, key: &str, value: &str) -> Result<SlipwayConfig> {
    let mut config = store.load()?;
    config.set(key, value)?;
    store.save(&config)?;
    tracing::debug!(key, value, "updated configuration");
    Ok(config)
}

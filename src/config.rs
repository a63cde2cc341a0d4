//! Tracking configuration.

use std::path::Path;

use serde::Deserialize;

use crate::error::TrackError;

/// Options for a tracking session. Every field has a default, so a config
/// file only needs the keys it changes.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TrackConfig {
    /// Refuse to freeze a head commit that has no steps.
    pub skip_empty_commits: bool,
    /// Prefix for decoration classes.
    pub class_prefix: String,
}

impl Default for TrackConfig {
    fn default() -> Self {
        return TrackConfig {
            skip_empty_commits: true,
            class_prefix: "blame".to_string(),
        };
    }
}

impl TrackConfig {
    /// Parse a config from JSON.
    pub fn from_json(json: &str) -> Result<TrackConfig, TrackError> {
        let config: TrackConfig = serde_json::from_str(json)?;
        if config.class_prefix.is_empty() {
            return Err(TrackError::Config("class_prefix must not be empty".to_string()));
        }
        return Ok(config);
    }

    /// Load a config from a JSON file.
    pub fn load(path: &Path) -> Result<TrackConfig, TrackError> {
        let json = std::fs::read_to_string(path)?;
        return TrackConfig::from_json(&json);
    }
}

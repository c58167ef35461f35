use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::ScenarioId;

/// Settings for the extract → reduce → mutate cycle.
///
/// Every field is optional in JSON; missing fields take their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Scenario treated as the surveyed baseline.
    pub baseline_scenario_id: ScenarioId,
    /// Joins member locations in the location of a bulk measure record.
    pub bulk_location_separator: String,
}

impl SyncConfig {
    pub fn new() -> Self {
        Self {
            baseline_scenario_id: ScenarioId::baseline(),
            bulk_location_separator: ", ".to_string(),
        }
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("Failed to parse sync config")
    }

    /// Reads a JSON config file.
    pub fn load(path: &Path) -> Result<Self> {
        let json = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;
        Self::from_json_str(&json)
            .with_context(|| format!("Invalid config in: {}", path.display()))
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self::new()
    }
}

use serde::{Deserialize, Serialize};
use std::fmt;

/// Legacy id of the baseline ("as surveyed") scenario.
pub const BASELINE_SCENARIO_ID: &str = "master";

/// Key of a scenario within a project (`master`, `scenario1`, ...).
#[derive(Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioId(String);

impl From<&str> for ScenarioId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for ScenarioId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl Default for ScenarioId {
    fn default() -> Self {
        Self::baseline()
    }
}

impl fmt::Display for ScenarioId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl ScenarioId {
    pub fn baseline() -> Self {
        Self(BASELINE_SCENARIO_ID.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serializes_as_plain_string() {
        let id = ScenarioId::from("scenario1");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"scenario1\"");
        let back: ScenarioId = serde_json::from_str("\"scenario1\"").unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn test_default_is_baseline() {
        assert_eq!(ScenarioId::default().as_str(), "master");
    }
}

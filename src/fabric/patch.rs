//! Partial updates applied to the page state.
//!
//! Nested `Option<Option<T>>` fields distinguish "leave unchanged" (outer
//! `None`) from "set to null" (`Some(None)`).

use serde::{Deserialize, Deserializer, Serialize};

use super::state::{AreaMode, BulkMeasure, State, ThermalMassParameter, Wall, WallInputs};

fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Replacement values for some of the page state fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatePatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thermal_mass_parameter: Option<ThermalMassParameter>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub walls: Option<Vec<Wall>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bulk_measures: Option<Vec<BulkMeasure>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_id: Option<u32>,
    #[serde(
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub deleted_element: Option<Option<u32>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_scenario_is_baseline: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locked: Option<bool>,
}

impl State {
    /// Shallow merge: every field present in the patch replaces the current one.
    pub fn merge(&mut self, patch: StatePatch) {
        if let Some(value) = patch.thermal_mass_parameter {
            self.thermal_mass_parameter = value;
        }
        if let Some(walls) = patch.walls {
            self.walls = walls;
        }
        if let Some(bulk_measures) = patch.bulk_measures {
            self.bulk_measures = bulk_measures;
        }
        if let Some(max_id) = patch.max_id {
            self.max_id = max_id;
        }
        if let Some(deleted_element) = patch.deleted_element {
            self.deleted_element = deleted_element;
        }
        if let Some(baseline) = patch.current_scenario_is_baseline {
            self.current_scenario_is_baseline = baseline;
        }
        if let Some(locked) = patch.locked {
            self.locked = locked;
        }
    }
}

/// Field edits for one wall's inputs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WallInputsPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub area: Option<AreaSpecPatch>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AreaSpecPatch {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<AreaMode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub specific: Option<SpecificAreaPatch>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dimensions: Option<DimensionsPatch>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SpecificAreaPatch {
    #[serde(
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub area: Option<Option<f64>>,
}

/// Dimension edits. The dimensions area is derived and cannot be patched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DimensionsPatch {
    #[serde(
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub length: Option<Option<f64>>,
    #[serde(
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub height: Option<Option<f64>>,
}

impl WallInputs {
    /// Deep-merges `patch` and re-derives the dimensions area.
    pub fn apply_patch(&mut self, patch: WallInputsPatch) {
        if let Some(location) = patch.location {
            self.location = location;
        }
        if let Some(area) = patch.area {
            if let Some(mode) = area.mode {
                self.area.mode = mode;
            }
            if let Some(specific) = area.specific
                && let Some(value) = specific.area
            {
                self.area.specific.area = value;
            }
            if let Some(dimensions) = area.dimensions {
                if let Some(length) = dimensions.length {
                    self.area.dimensions.length = length;
                }
                if let Some(height) = dimensions.height {
                    self.area.dimensions.height = height;
                }
            }
        }
        self.area.dimensions.recompute_area();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_null_and_missing_are_distinct() {
        let patch: DimensionsPatch = serde_json::from_value(json!({"length": null})).unwrap();
        assert_eq!(patch.length, Some(None));
        assert_eq!(patch.height, None);
    }

    #[test]
    fn test_apply_patch_recomputes_area() {
        let mut inputs = WallInputs::blank();
        let patch: WallInputsPatch = serde_json::from_value(json!({
            "location": "North",
            "area": {"type": "dimensions", "dimensions": {"length": 10, "height": 2}}
        }))
        .unwrap();
        inputs.apply_patch(patch);
        assert_eq!(inputs.location, "North");
        assert_eq!(inputs.area.dimensions.area, Some(20.0));

        let clear: WallInputsPatch =
            serde_json::from_value(json!({"area": {"dimensions": {"height": null}}})).unwrap();
        inputs.apply_patch(clear);
        assert_eq!(inputs.area.dimensions.length, Some(10.0));
        assert_eq!(inputs.area.dimensions.area, None);
    }

    #[test]
    fn test_merge_clears_deleted_element() {
        let mut state = State {
            deleted_element: Some(4),
            max_id: 4,
            ..State::default()
        };
        state.merge(StatePatch {
            deleted_element: Some(None),
            ..StatePatch::default()
        });
        assert_eq!(state.deleted_element, None);
        assert_eq!(state.max_id, 4);
    }
}

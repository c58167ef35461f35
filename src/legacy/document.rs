use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

use super::lenient;
use crate::ScenarioId;

/// Unmodelled fields carried through unchanged.
pub type Passthrough = Map<String, Value>;

/// A whole assessment project: every scenario keyed by its id.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Project {
    #[serde(default)]
    pub data: BTreeMap<ScenarioId, Scenario>,
    #[serde(flatten)]
    pub extra: Passthrough,
}

impl Project {
    pub fn scenario(&self, id: &ScenarioId) -> Option<&Scenario> {
        self.data.get(id)
    }

    pub fn scenario_mut(&mut self, id: &ScenarioId) -> Option<&mut Scenario> {
        self.data.get_mut(id)
    }
}

/// One scenario of a project.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    /// Scenario this one was derived from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_from: Option<ScenarioId>,
    #[serde(
        default,
        deserialize_with = "lenient::opt_bool",
        skip_serializing_if = "Option::is_none"
    )]
    pub locked: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fabric: Option<Fabric>,
    #[serde(flatten)]
    pub extra: Passthrough,
}

impl Scenario {
    /// Returns the fabric section, creating an empty one if absent.
    pub fn fabric_mut(&mut self) -> &mut Fabric {
        self.fabric.get_or_insert_with(Fabric::default)
    }
}

/// The `fabric` section of a scenario.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Fabric {
    #[serde(default)]
    pub elements: Vec<LegacyElement>,
    /// Applied measures keyed by element id (or bulk measure id).
    #[serde(default, deserialize_with = "lenient::id_map")]
    pub measures: BTreeMap<u32, MeasureRecord>,
    #[serde(
        rename = "global_TMP",
        default,
        deserialize_with = "lenient::opt_bool",
        skip_serializing_if = "Option::is_none"
    )]
    pub global_tmp: Option<bool>,
    #[serde(
        rename = "global_TMP_value",
        default,
        deserialize_with = "lenient::opt_u32",
        skip_serializing_if = "Option::is_none"
    )]
    pub global_tmp_value: Option<u32>,
    #[serde(flatten)]
    pub extra: Passthrough,
}

impl Fabric {
    /// Array index of the element with the given id.
    pub fn element_index(&self, id: u32) -> Option<usize> {
        self.elements.iter().position(|e| e.id == id)
    }

    pub fn element(&self, id: u32) -> Option<&LegacyElement> {
        self.elements.iter().find(|e| e.id == id)
    }

    /// Highest id used by an element or a measure record, or 0.
    pub fn max_id(&self) -> u32 {
        let elements = self.elements.iter().map(|e| e.id);
        let measures = self.measures.keys().copied();
        elements.chain(measures).max().unwrap_or(0)
    }
}

/// An entry of `fabric.measures`.
///
/// Records carrying `original_elements` are bulk measures covering several
/// elements; the others apply to the single element sharing their key.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MeasureRecord {
    pub measure: LegacyElement,
    #[serde(
        default,
        deserialize_with = "lenient::opt_id_map",
        skip_serializing_if = "Option::is_none"
    )]
    pub original_elements: Option<BTreeMap<u32, OriginalElementRef>>,
    #[serde(flatten)]
    pub extra: Passthrough,
}

impl MeasureRecord {
    pub fn is_bulk(&self) -> bool {
        self.original_elements.is_some()
    }

    /// Ids of the elements a bulk measure covers, ascending.
    pub fn covered_ids(&self) -> Vec<u32> {
        self.original_elements
            .as_ref()
            .map(|m| m.values().map(|r| r.id).collect())
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OriginalElementRef {
    #[serde(deserialize_with = "lenient::id")]
    pub id: u32,
    #[serde(flatten)]
    pub extra: Passthrough,
}

impl OriginalElementRef {
    pub fn new(id: u32) -> Self {
        Self {
            id,
            extra: Passthrough::new(),
        }
    }
}

/// The structured area inputs newer documents store next to `l`/`h`/`area`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LegacyAreaInputs {
    #[serde(rename = "type")]
    pub mode: String,
    #[serde(default)]
    pub specific: LegacySpecificArea,
    #[serde(default)]
    pub dimensions: LegacyDimensions,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LegacySpecificArea {
    #[serde(default, deserialize_with = "lenient::opt_number")]
    pub area: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LegacyDimensions {
    #[serde(default, deserialize_with = "lenient::opt_number")]
    pub length: Option<f64>,
    #[serde(default, deserialize_with = "lenient::opt_number")]
    pub height: Option<f64>,
    #[serde(default, deserialize_with = "lenient::opt_number")]
    pub area: Option<f64>,
}

/// A fabric element as stored in `fabric.elements`, also used for the
/// `measure` payload of measure records.
///
/// Only the fields the wall page reads or writes are modelled; everything
/// else lands in `extra`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LegacyElement {
    #[serde(default, deserialize_with = "lenient::id")]
    pub id: u32,
    #[serde(rename = "type", default)]
    pub element_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lib: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient::opt_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub uvalue: Option<f64>,
    #[serde(
        default,
        deserialize_with = "lenient::opt_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub kvalue: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient::opt_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub l: Option<f64>,
    #[serde(
        default,
        deserialize_with = "lenient::opt_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub h: Option<f64>,
    #[serde(
        default,
        deserialize_with = "lenient::opt_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub area: Option<f64>,
    #[serde(
        rename = "areaInputs",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub area_inputs: Option<LegacyAreaInputs>,

    #[serde(
        default,
        deserialize_with = "lenient::opt_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub windowarea: Option<f64>,
    #[serde(
        default,
        deserialize_with = "lenient::opt_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub netarea: Option<f64>,
    #[serde(
        default,
        deserialize_with = "lenient::opt_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub heatloss: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub associated_work: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub benefits: Option<String>,
    /// Cost per unit.
    #[serde(
        default,
        deserialize_with = "lenient::opt_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub cost: Option<f64>,
    /// Fixed base cost.
    #[serde(
        default,
        deserialize_with = "lenient::opt_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub min_cost: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cost_units: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disruption: Option<String>,
    #[serde(
        rename = "EWI",
        default,
        deserialize_with = "lenient::opt_bool",
        skip_serializing_if = "Option::is_none"
    )]
    pub ewi: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_risks: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maintenance: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub performance: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub who_by: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient::opt_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub cost_total: Option<f64>,
    #[serde(
        default,
        deserialize_with = "lenient::opt_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub quantity: Option<f64>,

    #[serde(flatten)]
    pub extra: Passthrough,
}

impl LegacyElement {
    /// Removes every applied-measure field, leaving a plain element.
    pub fn clear_measure_fields(&mut self) {
        self.associated_work = None;
        self.benefits = None;
        self.cost = None;
        self.min_cost = None;
        self.cost_units = None;
        self.disruption = None;
        self.ewi = None;
        self.key_risks = None;
        self.maintenance = None;
        self.notes = None;
        self.performance = None;
        self.who_by = None;
        self.cost_total = None;
        self.quantity = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_unknown_fields_survive_roundtrip() {
        let doc = json!({
            "id": 4,
            "type": "Floor",
            "perimeter": 12,
            "custom": {"nested": [1, 2]}
        });
        let element: LegacyElement = serde_json::from_value(doc.clone()).unwrap();
        assert_eq!(element.id, 4);
        assert_eq!(element.element_type, "Floor");
        assert_eq!(serde_json::to_value(&element).unwrap(), doc);
    }

    #[test]
    fn test_measure_keys_parse_as_ids() {
        let fabric: Fabric = serde_json::from_value(json!({
            "elements": [{"id": "2", "type": "Wall"}],
            "measures": {
                "5": {"measure": {"id": 5}, "original_elements": {"1": {"id": 1}, "2": {"id": "2"}}}
            }
        }))
        .unwrap();
        assert_eq!(fabric.elements[0].id, 2);
        assert!(fabric.measures[&5].is_bulk());
        assert_eq!(fabric.measures[&5].covered_ids(), vec![1, 2]);
        assert_eq!(fabric.max_id(), 5);
    }

    #[test]
    fn test_empty_fabric_max_id_is_zero() {
        assert_eq!(Fabric::default().max_id(), 0);
    }

    #[test]
    fn test_clear_measure_fields_keeps_element_fields() {
        let mut element: LegacyElement = serde_json::from_value(json!({
            "id": 1, "type": "Wall", "lib": "W1", "cost": 10, "cost_total": 200, "EWI": true
        }))
        .unwrap();
        element.clear_measure_fields();
        assert_eq!(
            serde_json::to_value(&element).unwrap(),
            json!({"id": 1, "type": "Wall", "lib": "W1"})
        );
    }
}

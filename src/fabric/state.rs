//! Normalized state of the fabric page.
//!
//! This is the typed shape the page renders and edits. It is rebuilt from the
//! legacy document before every action and written back after it, so nothing
//! here is persisted directly.

use serde::{Deserialize, Serialize};

use crate::legacy::lenient;
use crate::measures::{CostUnits, MeasureCost, QuantityBasis, calc_measure_qty_and_cost};

/// Kinds of wall-like fabric element handled by the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WallType {
    #[serde(rename = "external wall")]
    ExternalWall,
    #[serde(rename = "party wall")]
    PartyWall,
    #[serde(rename = "loft")]
    Loft,
    #[serde(rename = "roof")]
    Roof,
}

impl WallType {
    /// Parses a legacy element `type` or measure tag. Matching ignores case.
    pub fn from_legacy_tag(tag: &str) -> Option<Self> {
        match tag.trim().to_ascii_lowercase().as_str() {
            "wall" => Some(Self::ExternalWall),
            "party_wall" => Some(Self::PartyWall),
            "loft" => Some(Self::Loft),
            "roof" => Some(Self::Roof),
            _ => None,
        }
    }

    pub fn legacy_tag(&self) -> &'static str {
        match self {
            Self::ExternalWall => "Wall",
            Self::PartyWall => "Party_wall",
            Self::Loft => "Loft",
            Self::Roof => "Roof",
        }
    }
}

/// A library-sourced fabric component.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FabricElement {
    #[serde(rename = "type")]
    pub wall_type: WallType,
    /// Library tag (`lib` in the legacy document).
    pub tag: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub source: String,
    /// W/(m²·K)
    #[serde(default, deserialize_with = "lenient::number_or_zero")]
    pub uvalue: f64,
    /// kJ/(m²·K)
    #[serde(default, deserialize_with = "lenient::number_or_zero")]
    pub kvalue: f64,
}

/// A fabric component carrying an applied retrofit measure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeasureElement {
    #[serde(flatten)]
    pub base: FabricElement,
    #[serde(default)]
    pub associated_work: String,
    #[serde(default)]
    pub benefits: String,
    /// Cost per unit of `cost_units`.
    #[serde(default, deserialize_with = "lenient::number_or_zero")]
    pub cost: f64,
    /// Fixed base cost; `None` when the library left it blank.
    #[serde(default, deserialize_with = "lenient::opt_number")]
    pub min_cost: Option<f64>,
    pub cost_units: CostUnits,
    #[serde(default)]
    pub disruption: String,
    #[serde(rename = "EWI", default)]
    pub is_external_wall_insulation: bool,
    #[serde(default)]
    pub key_risks: String,
    #[serde(default)]
    pub maintenance: String,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub performance: String,
    #[serde(default)]
    pub who_by: String,
}

impl MeasureElement {
    pub fn base_cost(&self) -> f64 {
        self.min_cost.unwrap_or(0.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AreaMode {
    Specific,
    Dimensions,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SpecificArea {
    pub area: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Dimensions {
    pub length: Option<f64>,
    pub height: Option<f64>,
    /// Always `length * height` when both are known.
    pub area: Option<f64>,
}

impl Dimensions {
    pub fn new(length: Option<f64>, height: Option<f64>) -> Self {
        let mut dimensions = Self {
            length,
            height,
            area: None,
        };
        dimensions.recompute_area();
        dimensions
    }

    pub fn recompute_area(&mut self) {
        self.area = match (self.length, self.height) {
            (Some(l), Some(h)) => Some(l * h),
            _ => None,
        };
    }

    pub fn perimeter(&self) -> Option<f64> {
        match (self.length, self.height) {
            (Some(l), Some(h)) => Some(2.0 * (l + h)),
            _ => None,
        }
    }
}

/// How the area of a wall is entered.
///
/// Both branches are stored; only the one named by `mode` is authoritative.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AreaSpec {
    #[serde(rename = "type")]
    pub mode: AreaMode,
    pub specific: SpecificArea,
    pub dimensions: Dimensions,
}

impl AreaSpec {
    /// Empty inputs in dimensions mode, as used for newly added walls.
    pub fn blank() -> Self {
        Self {
            mode: AreaMode::Dimensions,
            specific: SpecificArea::default(),
            dimensions: Dimensions::default(),
        }
    }

    /// Area from the active branch.
    pub fn area(&self) -> Option<f64> {
        match self.mode {
            AreaMode::Specific => self.specific.area,
            AreaMode::Dimensions => self.dimensions.area,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WallInputs {
    pub location: String,
    pub area: AreaSpec,
}

impl WallInputs {
    pub fn blank() -> Self {
        Self {
            location: String::new(),
            area: AreaSpec::blank(),
        }
    }
}

/// Results of the external heat-loss calculation; `None` means no output.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WallOutputs {
    pub window_area: Option<f64>,
    pub net_area: Option<f64>,
    pub heat_loss: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum WallKind {
    Element {
        element: FabricElement,
    },
    Measure {
        element: MeasureElement,
        cost_quantity: f64,
        cost_total: f64,
        /// Plain element this wall was in the scenario it was created from.
        revert_to: Option<Box<Wall>>,
    },
}

/// A wall, party wall, loft or roof on the fabric page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Wall {
    pub id: u32,
    pub inputs: WallInputs,
    pub outputs: WallOutputs,
    #[serde(flatten)]
    pub kind: WallKind,
}

impl Wall {
    /// A plain element with blank inputs and no outputs.
    pub fn new_element(id: u32, element: FabricElement) -> Self {
        Self {
            id,
            inputs: WallInputs::blank(),
            outputs: WallOutputs::default(),
            kind: WallKind::Element { element },
        }
    }

    pub fn is_measure(&self) -> bool {
        matches!(self.kind, WallKind::Measure { .. })
    }

    /// The library component, with or without a measure applied.
    pub fn base_element(&self) -> &FabricElement {
        match &self.kind {
            WallKind::Element { element } => element,
            WallKind::Measure { element, .. } => &element.base,
        }
    }

    pub fn wall_type(&self) -> WallType {
        self.base_element().wall_type
    }

    /// Quantity and cost of `measure` applied to a wall with these inputs.
    pub fn price_measure(measure: &MeasureElement, inputs: &WallInputs) -> MeasureCost {
        let area = inputs.area.area().unwrap_or(0.0);
        let perimeter = inputs.area.dimensions.perimeter().unwrap_or(0.0);
        let basis = QuantityBasis::for_units(
            measure.cost_units,
            area,
            perimeter,
            measure.is_external_wall_insulation,
        );
        calc_measure_qty_and_cost(basis, measure.base_cost(), measure.cost)
    }

    /// Recomputes the cost of an applied measure from the current inputs.
    pub fn recompute_cost(&mut self) {
        if let WallKind::Measure {
            element,
            cost_quantity,
            cost_total,
            ..
        } = &mut self.kind
        {
            let cost = Self::price_measure(element, &self.inputs);
            *cost_quantity = cost.quantity;
            *cost_total = cost.total_cost;
        }
    }
}

/// One measure application shared by several walls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkMeasure {
    pub id: u32,
    pub applies_to: Vec<u32>,
}

/// Thermal mass parameter override for the whole scenario.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ThermalMassParameter {
    #[default]
    #[serde(rename = "no override")]
    NoOverride,
    #[serde(rename = "low")]
    Low,
    #[serde(rename = "medium")]
    Medium,
    #[serde(rename = "high")]
    High,
}

/// Legacy `global_TMP_value` for each override, in kJ/(m²·K).
pub const THERMAL_MASS_OVERRIDES: [(ThermalMassParameter, u32); 3] = [
    (ThermalMassParameter::Low, 100),
    (ThermalMassParameter::Medium, 250),
    (ThermalMassParameter::High, 450),
];

impl ThermalMassParameter {
    pub fn override_value(self) -> Option<u32> {
        THERMAL_MASS_OVERRIDES
            .iter()
            .find(|(p, _)| *p == self)
            .map(|(_, v)| *v)
    }

    pub fn from_override_value(value: u32) -> Option<Self> {
        THERMAL_MASS_OVERRIDES
            .iter()
            .find(|(_, v)| *v == value)
            .map(|(p, _)| *p)
    }
}

/// Dialog currently shown on the page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Modal {
    #[serde(rename = "add wall")]
    AddWall { wall_type: WallType },
    #[serde(rename = "replace wall")]
    ReplaceWall { id: u32, wall_type: WallType },
    #[serde(rename = "apply measure")]
    ApplyMeasure { id: u32, wall_type: WallType },
    #[serde(rename = "bulk measure")]
    BulkMeasure { wall_type: WallType },
}

/// Page-level state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct State {
    pub thermal_mass_parameter: ThermalMassParameter,
    pub walls: Vec<Wall>,
    pub bulk_measures: Vec<BulkMeasure>,
    /// Highest id assigned so far.
    pub max_id: u32,
    /// Last deleted wall, still to be removed from the legacy document.
    pub deleted_element: Option<u32>,
    /// Wall to focus after it was added.
    pub just_inserted: Option<u32>,
    pub current_scenario_is_baseline: bool,
    pub modal: Option<Modal>,
    pub locked: bool,
}

impl State {
    pub fn initial() -> Self {
        Self::default()
    }

    pub fn wall(&self, id: u32) -> Option<&Wall> {
        self.walls.iter().find(|w| w.id == id)
    }

    pub fn wall_mut(&mut self, id: u32) -> Option<&mut Wall> {
        self.walls.iter_mut().find(|w| w.id == id)
    }

    /// Removes the given ids from every bulk measure.
    pub fn remove_from_bulk_measures(&mut self, ids: &[u32]) {
        for bulk in self.bulk_measures.iter_mut() {
            bulk.applies_to.retain(|id| !ids.contains(id));
        }
    }
}

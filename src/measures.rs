//! Measure quantity and cost calculation.
//!
//! A measure is priced as `base_cost + quantity * cost_per_unit`, where the
//! quantity depends on the unit the measure is costed in: surface area for
//! `sqm`, perimeter for `ln m` and a fixed count of one for `unit`.

use serde::{Deserialize, Serialize};

/// Area inflation applied to external wall insulation.
///
/// Walls are surveyed with internal dimensions, so the insulated external
/// surface (plus reveals and detailing) is larger than the measured area.
pub const EWI_AREA_FACTOR: f64 = 1.15;

/// Unit a measure is costed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CostUnits {
    #[serde(rename = "sqm")]
    SquareMetre,
    #[serde(rename = "ln m")]
    LinearMetre,
    #[serde(rename = "unit")]
    Unit,
}

impl CostUnits {
    /// Parses the legacy `cost_units` string.
    pub fn from_legacy(value: &str) -> Option<Self> {
        match value.trim() {
            "sqm" => Some(Self::SquareMetre),
            "ln m" => Some(Self::LinearMetre),
            "unit" => Some(Self::Unit),
            _ => None,
        }
    }

    pub fn as_legacy(&self) -> &'static str {
        match self {
            Self::SquareMetre => "sqm",
            Self::LinearMetre => "ln m",
            Self::Unit => "unit",
        }
    }
}

/// Physical quantity a measure is costed against.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum QuantityBasis {
    SquareMetre {
        area: f64,
        is_external_wall_insulation: bool,
    },
    LinearMetre {
        perimeter: f64,
    },
    Unit,
}

impl QuantityBasis {
    /// Selects the basis matching `units` from the quantities available for an element.
    pub fn for_units(
        units: CostUnits,
        area: f64,
        perimeter: f64,
        is_external_wall_insulation: bool,
    ) -> Self {
        match units {
            CostUnits::SquareMetre => Self::SquareMetre {
                area,
                is_external_wall_insulation,
            },
            CostUnits::LinearMetre => Self::LinearMetre { perimeter },
            CostUnits::Unit => Self::Unit,
        }
    }

    pub fn quantity(&self) -> f64 {
        match *self {
            Self::SquareMetre {
                area,
                is_external_wall_insulation: true,
            } => area * EWI_AREA_FACTOR,
            Self::SquareMetre { area, .. } => area,
            Self::LinearMetre { perimeter } => perimeter,
            Self::Unit => 1.0,
        }
    }
}

/// Applied quantity and total cost of a measure.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MeasureCost {
    pub quantity: f64,
    pub total_cost: f64,
}

/// Computes the applied quantity and total cost of a measure.
///
/// The total is rounded to two decimals.
pub fn calc_measure_qty_and_cost(
    basis: QuantityBasis,
    base_cost: f64,
    cost_per_unit: f64,
) -> MeasureCost {
    let quantity = basis.quantity();
    MeasureCost {
        quantity,
        total_cost: round2(base_cost + quantity * cost_per_unit),
    }
}

/// Recovers the quantity implied by a stored total cost.
///
/// Returns 0 when `cost_per_unit` is 0. A negative implied quantity is
/// clamped to 1.
pub fn reverse_calc_quantity(base_cost: f64, cost_per_unit: f64, total_cost: f64) -> f64 {
    if cost_per_unit == 0.0 {
        return 0.0;
    }
    let quantity = (total_cost - base_cost) / cost_per_unit;
    if quantity < 0.0 { 1.0 } else { quantity }
}

/// Rounds to two decimal places.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

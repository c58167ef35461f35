//! Decision rules for reading the legacy document.
//!
//! Documents written over the years disagree on how areas, measures and
//! thermal mass are stored. Each rule here resolves one of those ambiguities
//! the same way the legacy page did.

use tracing::{debug, warn};

use super::state::{
    AreaMode, AreaSpec, BulkMeasure, Dimensions, SpecificArea, ThermalMassParameter, WallType,
};
use crate::legacy::{
    Fabric, LegacyAreaInputs, LegacyDimensions, LegacyElement, LegacySpecificArea, MeasureRecord,
};
use crate::measures::{MeasureCost, reverse_calc_quantity};

/// Area inputs of a legacy element.
///
/// Structured `areaInputs` are honoured when present. Older documents only
/// have `l`, `h` and `area`: non-zero length and height mean the area was
/// entered as dimensions, otherwise the stored `area` was typed in directly.
pub fn area_spec_from_legacy(element: &LegacyElement) -> AreaSpec {
    if let Some(inputs) = &element.area_inputs
        && let Some(mode) = area_mode_from_legacy(&inputs.mode)
    {
        return AreaSpec {
            mode,
            specific: SpecificArea {
                area: inputs.specific.area,
            },
            dimensions: Dimensions::new(inputs.dimensions.length, inputs.dimensions.height),
        };
    }

    let dimensions = Dimensions::new(element.l, element.h);
    let mode = match (element.l, element.h) {
        (Some(l), Some(h)) if l != 0.0 && h != 0.0 => AreaMode::Dimensions,
        _ => AreaMode::Specific,
    };
    AreaSpec {
        mode,
        specific: SpecificArea { area: element.area },
        dimensions,
    }
}

fn area_mode_from_legacy(mode: &str) -> Option<AreaMode> {
    match mode {
        "specific" => Some(AreaMode::Specific),
        "dimensions" => Some(AreaMode::Dimensions),
        _ => None,
    }
}

pub fn area_inputs_to_legacy(spec: &AreaSpec) -> LegacyAreaInputs {
    LegacyAreaInputs {
        mode: match spec.mode {
            AreaMode::Specific => "specific",
            AreaMode::Dimensions => "dimensions",
        }
        .to_string(),
        specific: LegacySpecificArea {
            area: spec.specific.area,
        },
        dimensions: LegacyDimensions {
            length: spec.dimensions.length,
            height: spec.dimensions.height,
            area: spec.dimensions.area,
        },
    }
}

/// Bulk measures recorded in a fabric section.
pub fn bulk_measures(fabric: &Fabric) -> Vec<BulkMeasure> {
    fabric
        .measures
        .iter()
        .filter(|(_, record)| record.is_bulk())
        .map(|(id, record)| BulkMeasure {
            id: *id,
            applies_to: record.covered_ids(),
        })
        .collect()
}

/// Where the measure applied to an element is recorded.
#[derive(Debug, Clone, Copy)]
pub enum MeasureSource<'a> {
    Bulk { id: u32, record: &'a MeasureRecord },
    Standalone { record: &'a MeasureRecord },
}

impl<'a> MeasureSource<'a> {
    pub fn record(&self) -> &'a MeasureRecord {
        match self {
            Self::Bulk { record, .. } | Self::Standalone { record } => record,
        }
    }
}

/// Finds the measure applied to element `id`.
///
/// Bulk membership takes precedence; a record keyed by the element id only
/// counts when it is not itself a bulk record.
pub fn measure_source<'a>(
    fabric: &'a Fabric,
    bulk_measures: &[BulkMeasure],
    id: u32,
) -> Option<MeasureSource<'a>> {
    let bulk = bulk_measures
        .iter()
        .find(|b| b.applies_to.contains(&id))
        .and_then(|b| {
            fabric
                .measures
                .get(&b.id)
                .map(|record| MeasureSource::Bulk { id: b.id, record })
        });
    bulk.or_else(|| {
        fabric
            .measures
            .get(&id)
            .filter(|record| !record.is_bulk())
            .map(|record| MeasureSource::Standalone { record })
    })
}

/// Wall type of a measure, trusting its tags over its `type` field.
///
/// Some documents label loft measures as roofs (and the reverse) in `type`
/// while the tags are right.
pub fn measure_wall_type(measure: &LegacyElement) -> Option<WallType> {
    let from_tags = measure
        .tags
        .iter()
        .flatten()
        .find_map(|tag| WallType::from_legacy_tag(tag));
    let from_type = WallType::from_legacy_tag(&measure.element_type);
    if let (Some(tagged), Some(typed)) = (from_tags, from_type)
        && tagged != typed
    {
        debug!(
            id = measure.id,
            ?tagged,
            ?typed,
            "measure type disagrees with its tags, using tags"
        );
    }
    from_tags.or(from_type)
}

/// Reconciles stored measure totals with freshly computed ones.
///
/// Stored values win: they may carry a user's manual amendment. When no
/// quantity was stored it is derived back from the stored total. Divergence
/// is logged but not corrected, which means a stale total can outlive an
/// area change made elsewhere in the application.
pub fn reconcile_measure_cost(
    id: u32,
    stored_total: Option<f64>,
    stored_quantity: Option<f64>,
    computed: MeasureCost,
    base_cost: f64,
    cost_per_unit: f64,
) -> MeasureCost {
    let total_cost = stored_total.unwrap_or(computed.total_cost);
    let quantity = match (stored_quantity, stored_total) {
        (Some(q), _) => q,
        (None, Some(total)) => reverse_calc_quantity(base_cost, cost_per_unit, total),
        (None, None) => computed.quantity,
    };
    if total_cost != computed.total_cost || quantity != computed.quantity {
        debug!(
            id,
            stored_total = total_cost,
            computed_total = computed.total_cost,
            stored_quantity = quantity,
            computed_quantity = computed.quantity,
            "stored measure cost differs from computed, keeping stored"
        );
    }
    MeasureCost {
        quantity,
        total_cost,
    }
}

/// Thermal mass override recorded in a fabric section.
pub fn thermal_mass_from_legacy(fabric: &Fabric) -> ThermalMassParameter {
    if fabric.global_tmp != Some(true) {
        return ThermalMassParameter::NoOverride;
    }
    match fabric.global_tmp_value {
        Some(value) => ThermalMassParameter::from_override_value(value).unwrap_or_else(|| {
            warn!(value, "unrecognized global thermal mass value, ignoring override");
            ThermalMassParameter::NoOverride
        }),
        None => ThermalMassParameter::NoOverride,
    }
}

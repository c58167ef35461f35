//! Page state → legacy scenario document.
//!
//! Writes happen in place on the project and are not transactional: if an
//! error is returned part of the document may already have been updated.

use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

use super::policy;
use super::state::{
    BulkMeasure, FabricElement, MeasureElement, State, ThermalMassParameter, Wall, WallKind,
    WallType,
};
use crate::config::SyncConfig;
use crate::error::FabricError;
use crate::legacy::{Fabric, LegacyElement, MeasureRecord, OriginalElementRef, Project};
use crate::measures::round2;
use crate::ScenarioId;

/// Writes `state` into the fabric section of scenario `scenario_id`.
pub fn mutate_legacy_data(
    project: &mut Project,
    scenario_id: &ScenarioId,
    state: &State,
    config: &SyncConfig,
) -> Result<(), FabricError> {
    let scenario = project
        .scenario_mut(scenario_id)
        .ok_or_else(|| FabricError::ScenarioNotFound {
            id: scenario_id.to_string(),
        })?;
    let fabric = scenario.fabric_mut();

    write_thermal_mass(fabric, state.thermal_mass_parameter);

    let bulk_covered: BTreeSet<u32> = state
        .bulk_measures
        .iter()
        .flat_map(|b| b.applies_to.iter().copied())
        .collect();

    for wall in &state.walls {
        match fabric.element_index(wall.id) {
            Some(index) => write_wall(&mut fabric.elements[index], wall),
            None => {
                let mut element = LegacyElement::default();
                write_wall(&mut element, wall);
                fabric.elements.push(element);
            }
        }

        if wall.is_measure() && !bulk_covered.contains(&wall.id) {
            let mut record = fabric
                .measures
                .remove(&wall.id)
                .filter(|r| !r.is_bulk())
                .unwrap_or_default();
            write_wall(&mut record.measure, wall);
            fabric.measures.insert(wall.id, record);
        } else {
            remove_standalone_measure(fabric, wall.id);
        }
    }

    for bulk in &state.bulk_measures {
        write_bulk_measure(fabric, bulk, state, config);
    }

    if let Some(id) = state.deleted_element {
        if let Some(index) = fabric.element_index(id) {
            fabric.elements.remove(index);
        }
        remove_standalone_measure(fabric, id);
    }

    Ok(())
}

fn write_thermal_mass(fabric: &mut Fabric, parameter: ThermalMassParameter) {
    let value = parameter.override_value();
    fabric.global_tmp = Some(value.is_some());
    fabric.global_tmp_value = value;
}

fn remove_standalone_measure(fabric: &mut Fabric, id: u32) {
    if fabric.measures.get(&id).is_some_and(|r| !r.is_bulk()) {
        fabric.measures.remove(&id);
    }
}

/// Writes `value` unless the field is absent and `value` is empty.
///
/// Extraction reads an absent field as empty, so this keeps a field that
/// was never there from appearing on write-back.
fn set_text(field: &mut Option<String>, value: &str) {
    if field.is_some() || !value.is_empty() {
        *field = Some(value.to_string());
    }
}

fn set_number(field: &mut Option<f64>, value: f64) {
    if field.is_some() || value != 0.0 {
        *field = Some(value);
    }
}

fn set_flag(field: &mut Option<bool>, value: bool) {
    if field.is_some() || value {
        *field = Some(value);
    }
}

fn write_library_fields(target: &mut LegacyElement, element: &FabricElement) {
    // Tags are matched case-insensitively, so "wall" stays "wall".
    if WallType::from_legacy_tag(&target.element_type) != Some(element.wall_type) {
        target.element_type = element.wall_type.legacy_tag().to_string();
    }
    set_text(&mut target.lib, &element.tag);
    set_text(&mut target.name, &element.name);
    set_text(&mut target.description, &element.description);
    set_text(&mut target.source, &element.source);
    set_number(&mut target.uvalue, element.uvalue);
    set_number(&mut target.kvalue, element.kvalue);
}

fn write_measure_fields(
    target: &mut LegacyElement,
    measure: &MeasureElement,
    quantity: f64,
    cost_total: f64,
) {
    let wall_type = measure.base.wall_type;
    write_library_fields(target, &measure.base);
    let tagged = target
        .tags
        .iter()
        .flatten()
        .find_map(|tag| WallType::from_legacy_tag(tag));
    if tagged != Some(wall_type) {
        target.tags = Some(vec![wall_type.legacy_tag().to_string()]);
    }
    set_text(&mut target.associated_work, &measure.associated_work);
    set_text(&mut target.benefits, &measure.benefits);
    set_number(&mut target.cost, measure.cost);
    set_number(&mut target.min_cost, measure.base_cost());
    target.cost_units = Some(measure.cost_units.as_legacy().to_string());
    set_text(&mut target.disruption, &measure.disruption);
    set_flag(&mut target.ewi, measure.is_external_wall_insulation);
    set_text(&mut target.key_risks, &measure.key_risks);
    set_text(&mut target.maintenance, &measure.maintenance);
    set_text(&mut target.notes, &measure.notes);
    set_text(&mut target.performance, &measure.performance);
    set_text(&mut target.who_by, &measure.who_by);
    target.cost_total = Some(cost_total);
    target.quantity = Some(quantity);
}

/// Serializes one wall into a legacy element, keeping unmodelled fields.
fn write_wall(target: &mut LegacyElement, wall: &Wall) {
    target.id = wall.id;
    match &wall.kind {
        WallKind::Element { element } => {
            target.clear_measure_fields();
            write_library_fields(target, element);
        }
        WallKind::Measure {
            element,
            cost_quantity,
            cost_total,
            ..
        } => write_measure_fields(target, element, *cost_quantity, *cost_total),
    }

    let area = &wall.inputs.area;
    set_text(&mut target.location, &wall.inputs.location);
    target.l = area.dimensions.length;
    target.h = area.dimensions.height;
    target.area = area.area();
    target.area_inputs = Some(policy::area_inputs_to_legacy(area));

    target.windowarea = wall.outputs.window_area;
    target.netarea = wall.outputs.net_area;
    target.heatloss = wall.outputs.heat_loss;
}

fn write_bulk_measure(
    fabric: &mut Fabric,
    bulk: &BulkMeasure,
    state: &State,
    config: &SyncConfig,
) {
    if bulk.applies_to.is_empty() {
        if fabric.measures.remove(&bulk.id).is_some() {
            debug!(id = bulk.id, "removed emptied bulk measure");
        }
        return;
    }

    let members: Vec<&Wall> = bulk
        .applies_to
        .iter()
        .filter_map(|id| state.wall(*id))
        .filter(|w| w.is_measure())
        .collect();
    // Bulk measures on floors, windows etc. share the same keyspace.
    let Some(first) = members.first() else {
        debug!(id = bulk.id, "bulk measure covers no walls, leaving it untouched");
        return;
    };
    let WallKind::Measure { element, .. } = &first.kind else {
        return;
    };

    let (quantity, cost_total) =
        members
            .iter()
            .fold((0.0, 0.0), |(q, c), wall| match &wall.kind {
                WallKind::Measure {
                    cost_quantity,
                    cost_total,
                    ..
                } => (q + cost_quantity, c + cost_total),
                WallKind::Element { .. } => (q, c),
            });
    let location = members
        .iter()
        .map(|w| w.inputs.location.as_str())
        .collect::<Vec<_>>()
        .join(&config.bulk_location_separator);

    let mut record: MeasureRecord = fabric.measures.remove(&bulk.id).unwrap_or_default();
    write_measure_fields(&mut record.measure, element, quantity, round2(cost_total));
    record.measure.id = bulk.id;
    record.measure.location = Some(location);
    record.original_elements = Some(
        bulk.applies_to
            .iter()
            .map(|id| (*id, OriginalElementRef::new(*id)))
            .collect::<BTreeMap<_, _>>(),
    );
    fabric.measures.insert(bulk.id, record);
}

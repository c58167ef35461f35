//! Page actions and the state transitions they cause.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::{debug, trace, warn};

use super::patch::{StatePatch, WallInputsPatch};
use super::state::{
    BulkMeasure, FabricElement, MeasureElement, Modal, State, ThermalMassParameter, Wall,
    WallKind,
};
use crate::error::FabricError;

/// Everything a user can do on the fabric page, plus the refresh the page
/// performs when the underlying document changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Action {
    /// Replaces the fields present in `state`.
    #[serde(rename = "external data update")]
    ExternalDataUpdate { state: StatePatch },
    #[serde(rename = "fabric/set thermal mass parameter")]
    SetThermalMassParameter { value: ThermalMassParameter },
    /// Deep-merges input edits into one wall.
    #[serde(rename = "fabric/merge wall input")]
    MergeWallInput { id: u32, value: WallInputsPatch },
    #[serde(rename = "fabric/add wall")]
    AddWall { item: FabricElement },
    #[serde(rename = "fabric/delete wall")]
    DeleteWall { id: u32 },
    #[serde(rename = "fabric/show modal")]
    ShowModal { value: Option<Modal> },
    /// Swaps the library element of a plain wall. Measure walls are left alone.
    #[serde(rename = "fabric/replace wall")]
    ReplaceWall { id: u32, item: FabricElement },
    /// Applies one measure to every wall in `ids`, grouped as a bulk measure
    /// when there is more than one.
    #[serde(rename = "fabric/apply wall measures")]
    ApplyWallMeasures { ids: Vec<u32>, item: MeasureElement },
    #[serde(rename = "fabric/revert wall measure")]
    RevertWallMeasure { id: u32 },
    /// Any action type this version does not know.
    #[serde(other)]
    Unknown,
}

impl Action {
    pub fn name(&self) -> &'static str {
        match self {
            Self::ExternalDataUpdate { .. } => "external data update",
            Self::SetThermalMassParameter { .. } => "fabric/set thermal mass parameter",
            Self::MergeWallInput { .. } => "fabric/merge wall input",
            Self::AddWall { .. } => "fabric/add wall",
            Self::DeleteWall { .. } => "fabric/delete wall",
            Self::ShowModal { .. } => "fabric/show modal",
            Self::ReplaceWall { .. } => "fabric/replace wall",
            Self::ApplyWallMeasures { .. } => "fabric/apply wall measures",
            Self::RevertWallMeasure { .. } => "fabric/revert wall measure",
            Self::Unknown => "unknown",
        }
    }
}

/// Side effects requested by a reducer step.
///
/// No step requests any yet; the return channel exists so one can be added
/// without changing every caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {}

/// Applies `action` to `state` in place.
///
/// Callers that need the previous state must clone it first.
pub fn reduce(state: &mut State, action: Action) -> Result<Vec<Effect>, FabricError> {
    trace!(action = action.name(), "reducing fabric action");
    match action {
        Action::ExternalDataUpdate { state: patch } => state.merge(patch),
        Action::SetThermalMassParameter { value } => state.thermal_mass_parameter = value,
        Action::MergeWallInput { id, value } => merge_wall_input(state, id, value),
        Action::AddWall { item } => add_wall(state, item),
        Action::DeleteWall { id } => delete_wall(state, id),
        Action::ShowModal { value } => {
            state.modal = value;
            state.just_inserted = None;
        }
        Action::ReplaceWall { id, item } => replace_wall(state, id, item),
        Action::ApplyWallMeasures { ids, item } => apply_wall_measures(state, ids, item),
        Action::RevertWallMeasure { id } => revert_wall_measure(state, id)?,
        Action::Unknown => debug!("ignoring unknown fabric action"),
    }
    Ok(Vec::new())
}

fn merge_wall_input(state: &mut State, id: u32, patch: WallInputsPatch) {
    let Some(wall) = state.wall_mut(id) else {
        warn!(id, "merge wall input for unknown wall");
        return;
    };
    wall.inputs.apply_patch(patch);
    wall.recompute_cost();
    if state.modal.is_some() {
        state.just_inserted = None;
    }
}

fn add_wall(state: &mut State, item: FabricElement) {
    let id = state.max_id + 1;
    state.walls.push(Wall::new_element(id, item));
    state.max_id = id;
    state.just_inserted = Some(id);
    state.modal = None;
}

fn delete_wall(state: &mut State, id: u32) {
    state.walls.retain(|w| w.id != id);
    state.deleted_element = Some(id);
    state.remove_from_bulk_measures(&[id]);
}

fn replace_wall(state: &mut State, id: u32, item: FabricElement) {
    match state.wall_mut(id) {
        Some(Wall {
            kind: WallKind::Element { element },
            ..
        }) => *element = item,
        Some(_) => debug!(id, "replace ignored for a wall with a measure"),
        None => warn!(id, "replace for unknown wall"),
    }
    state.modal = None;
}

fn apply_wall_measures(state: &mut State, ids: Vec<u32>, mut item: MeasureElement) {
    item.min_cost = Some(item.base_cost());
    // Only distinct, existing walls count towards a bulk measure.
    let mut seen = BTreeSet::new();
    let ids: Vec<u32> = ids
        .into_iter()
        .filter(|&id| {
            if state.wall(id).is_none() {
                warn!(id, "measure applied to unknown wall");
                return false;
            }
            seen.insert(id)
        })
        .collect();

    for &id in &ids {
        let Some(wall) = state.wall_mut(id) else {
            continue;
        };
        let revert_to = match &mut wall.kind {
            WallKind::Measure { revert_to, .. } => revert_to.take(),
            WallKind::Element { .. } => None,
        };
        wall.kind = WallKind::Measure {
            element: item.clone(),
            cost_quantity: 0.0,
            cost_total: 0.0,
            revert_to,
        };
        wall.recompute_cost();
    }

    state.remove_from_bulk_measures(&ids);
    if ids.len() > 1 {
        let id = state.max_id + 1;
        state.bulk_measures.push(BulkMeasure {
            id,
            applies_to: ids,
        });
        state.max_id = id;
    }
    state.modal = None;
}

fn revert_wall_measure(state: &mut State, id: u32) -> Result<(), FabricError> {
    let wall = state.wall_mut(id).ok_or(FabricError::WallNotFound { id })?;
    let previous = match &wall.kind {
        WallKind::Measure {
            revert_to: Some(previous),
            ..
        } => previous.base_element().clone(),
        _ => return Err(FabricError::NothingToRevert { id }),
    };
    wall.kind = WallKind::Element { element: previous };
    state.remove_from_bulk_measures(&[id]);
    Ok(())
}

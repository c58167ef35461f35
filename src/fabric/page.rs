//! The fabric page handle.
//!
//! [`FabricPage`] ties the extractor, reducer and mutator together for one
//! scenario. A dispatch first refreshes the state from the document, then
//! reduces the action and writes the result back.

use tracing::debug;

use super::extractor::{ExtractContext, extract_update_action};
use super::mutator::mutate_legacy_data;
use super::reducer::{Action, Effect, reduce};
use super::state::State;
use crate::ScenarioId;
use crate::config::SyncConfig;
use crate::error::FabricError;
use crate::legacy::Project;

/// The fabric page of one scenario.
///
/// Owns the page state and runs the extract → reduce → mutate cycle for
/// every dispatched action. The state is only readable from outside; it
/// changes solely through [`FabricPage::refresh`] and [`FabricPage::dispatch`].
#[derive(Debug, Clone)]
pub struct FabricPage {
    scenario_id: ScenarioId,
    config: SyncConfig,
    state: State,
}

impl FabricPage {
    /// A freshly mounted page with the initial state.
    pub fn new(scenario_id: ScenarioId, config: SyncConfig) -> Self {
        Self {
            scenario_id,
            config,
            state: State::initial(),
        }
    }

    pub fn scenario_id(&self) -> &ScenarioId {
        &self.scenario_id
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    pub fn state(&self) -> &State {
        &self.state
    }

    /// Re-reads the page state from the project without writing anything.
    pub fn refresh(&mut self, project: &Project) -> Result<Vec<Effect>, FabricError> {
        let ctx = ExtractContext {
            project,
            scenario_id: &self.scenario_id,
            config: &self.config,
        };
        let update = extract_update_action(&ctx)?;
        reduce(&mut self.state, update)
    }

    /// Runs one full cycle for `action` and writes the result into `project`.
    ///
    /// On error the project may be partly written and should be discarded.
    pub fn dispatch(
        &mut self,
        project: &mut Project,
        action: Action,
    ) -> Result<Vec<Effect>, FabricError> {
        let name = action.name();
        let mut effects = self.refresh(project)?;
        effects.extend(reduce(&mut self.state, action)?);
        mutate_legacy_data(project, &self.scenario_id, &self.state, &self.config)?;
        debug!(
            scenario = %self.scenario_id,
            action = name,
            walls = self.state.walls.len(),
            "fabric cycle complete"
        );
        Ok(effects)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fabric::state::{FabricElement, ThermalMassParameter, WallType};
    use serde_json::json;

    fn project() -> Project {
        serde_json::from_value(json!({"data": {"master": {"fabric": {
            "elements": [{"id": 1, "type": "Wall", "lib": "W1", "area": 10}]
        }}}}))
        .unwrap()
    }

    #[test]
    fn test_refresh_does_not_touch_project() {
        let p = project();
        let mut page = FabricPage::new(ScenarioId::baseline(), SyncConfig::default());
        page.refresh(&p).unwrap();
        assert_eq!(page.state().walls.len(), 1);
        assert_eq!(page.state().max_id, 1);
        assert!(page.state().current_scenario_is_baseline);
        assert_eq!(p, project());
    }

    #[test]
    fn test_dispatch_writes_back() {
        let mut p = project();
        let mut page = FabricPage::new(ScenarioId::baseline(), SyncConfig::default());
        let effects = page
            .dispatch(
                &mut p,
                Action::SetThermalMassParameter {
                    value: ThermalMassParameter::Low,
                },
            )
            .unwrap();
        assert!(effects.is_empty());
        let fabric = p.scenario(&ScenarioId::baseline()).unwrap().fabric.as_ref().unwrap();
        assert_eq!(fabric.global_tmp, Some(true));
        assert_eq!(fabric.global_tmp_value, Some(100));
    }

    #[test]
    fn test_page_only_state_survives_refresh() {
        let mut p = project();
        let mut page = FabricPage::new(ScenarioId::baseline(), SyncConfig::default());
        let item = FabricElement {
            wall_type: WallType::Loft,
            tag: "L1".to_string(),
            name: String::new(),
            description: String::new(),
            source: String::new(),
            uvalue: 0.2,
            kvalue: 9.0,
        };
        page.dispatch(&mut p, Action::AddWall { item }).unwrap();
        assert_eq!(page.state().just_inserted, Some(2));
        page.refresh(&p).unwrap();
        assert_eq!(page.state().just_inserted, Some(2));
        assert_eq!(page.state().walls.len(), 2);
    }

    #[test]
    fn test_unknown_scenario() {
        let mut p = project();
        let mut page = FabricPage::new(ScenarioId::from("scenario3"), SyncConfig::default());
        let result = page.dispatch(&mut p, Action::DeleteWall { id: 1 });
        assert!(matches!(result, Err(FabricError::ScenarioNotFound { .. })));
    }
}

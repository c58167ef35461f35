//! State synchronization core of the fabric page of a retrofit assessment.
//!
//! Scenario data lives in a loosely-typed legacy JSON document
//! ([`legacy::Project`]). The [`fabric`] module turns its wall-like elements
//! into a typed page state, applies page actions to it and writes the result
//! back. [`measures`] prices retrofit measures.

pub mod config;
pub mod error;
pub mod fabric;
pub mod io;
pub mod legacy;
pub mod measures;
mod scenario_id;

// Prelude
pub use config::SyncConfig;
pub use error::FabricError;
pub use fabric::{Action, Effect, FabricPage, State, Wall, WallKind, WallType};
pub use legacy::Project;
pub use measures::{CostUnits, MeasureCost, calc_measure_qty_and_cost, reverse_calc_quantity};
pub use scenario_id::{BASELINE_SCENARIO_ID, ScenarioId};

//! State synchronization for the wall-like elements of the fabric page.
//!
//! Every user edit runs one cycle: the [`extractor`] rebuilds the typed page
//! [`state`] from the legacy document, the [`reducer`] applies the action,
//! and the [`mutator`] writes the result back. [`FabricPage`] owns the state
//! and drives the cycle.

pub mod extractor;
pub mod mutator;
pub mod page;
pub mod patch;
pub mod policy;
pub mod reducer;
pub mod state;

pub use extractor::{ExtractContext, extract_update_action};
pub use mutator::mutate_legacy_data;
pub use page::FabricPage;
pub use patch::{AreaSpecPatch, DimensionsPatch, SpecificAreaPatch, StatePatch, WallInputsPatch};
pub use reducer::{Action, Effect, reduce};
pub use state::{
    AreaMode, AreaSpec, BulkMeasure, Dimensions, FabricElement, MeasureElement, Modal,
    SpecificArea, State, THERMAL_MASS_OVERRIDES, ThermalMassParameter, Wall, WallInputs, WallKind,
    WallOutputs, WallType,
};

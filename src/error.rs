use thiserror::Error;

/// Errors raised by the fabric state-sync core.
///
/// These indicate an action or document the page should never have produced;
/// they abort the current user action and are not retried.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FabricError {
    #[error("wall {id} not found")]
    WallNotFound { id: u32 },
    #[error("wall {id} has no previous state to revert to")]
    NothingToRevert { id: u32 },
    #[error("scenario '{id}' not found in project")]
    ScenarioNotFound { id: String },
    #[error("measure for element {id} is malformed: {reason}")]
    MalformedMeasure { id: u32, reason: String },
}

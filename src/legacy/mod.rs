//! Serialization boundary for the legacy scenario document.
//!
//! The rest of the application still reads and writes scenarios in their
//! historical loosely-typed JSON shape. These types model the parts the
//! fabric page touches; anything else is kept verbatim in flattened
//! passthrough maps so a sync cycle never drops data it does not understand.

pub mod document;
pub mod lenient;

pub use document::{
    Fabric, LegacyAreaInputs, LegacyDimensions, LegacyElement, LegacySpecificArea,
    MeasureRecord, OriginalElementRef, Passthrough, Project, Scenario,
};

//! File I/O for assessment projects.
//!
//! This module provides functions for reading and writing projects and
//! action lists as JSON.

pub mod project;

pub use project::{
    project_from_string, project_to_string, read_actions, read_project, write_project,
};

//! Project JSON I/O.
//!
//! Projects are stored as the JSON document the rest of the application
//! reads; fields the fabric page does not model are written back as read.

use crate::fabric::Action;
use crate::legacy::Project;
use anyhow::{Context, Result};
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

/// Writes a project to a JSON file.
///
/// # Arguments
/// * `path` - Path to the output file
/// * `project` - The project to serialize
///
/// # Example
/// ```no_run
/// use retrofit_fabric::io::{read_project, write_project};
/// use std::path::Path;
///
/// let project = read_project(Path::new("project.json")).unwrap();
/// write_project(Path::new("copy.json"), &project).unwrap();
/// ```
pub fn write_project(path: &Path, project: &Project) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("Failed to create file: {}", path.display()))?;
    let mut writer = BufWriter::new(file);

    serde_json::to_writer_pretty(&mut writer, project)
        .with_context(|| format!("Failed to serialize project to: {}", path.display()))?;
    writer
        .flush()
        .with_context(|| format!("Failed to write: {}", path.display()))?;

    Ok(())
}

/// Reads a project from a JSON file.
///
/// # Arguments
/// * `path` - Path to the input file
///
/// # Returns
/// The deserialized Project, with unmodelled fields kept for write-back
///
/// # Example
/// ```no_run
/// use retrofit_fabric::io::read_project;
/// use std::path::Path;
///
/// let project = read_project(Path::new("project.json")).unwrap();
/// println!("Loaded {} scenarios", project.data.len());
/// ```
pub fn read_project(path: &Path) -> Result<Project> {
    let file = File::open(path)
        .with_context(|| format!("Failed to open file: {}", path.display()))?;
    let reader = BufReader::new(file);

    let project: Project = serde_json::from_reader(reader)
        .with_context(|| format!("Failed to deserialize project from: {}", path.display()))?;

    Ok(project)
}

/// Serializes a project to a pretty-printed JSON string.
pub fn project_to_string(project: &Project) -> Result<String> {
    serde_json::to_string_pretty(project).context("Failed to serialize project to string")
}

/// Parses a project from a JSON string.
///
/// # Example
/// ```
/// use retrofit_fabric::io::project_from_string;
///
/// let project = project_from_string(r#"{"data": {"master": {}}}"#).unwrap();
/// assert_eq!(project.data.len(), 1);
/// ```
pub fn project_from_string(json: &str) -> Result<Project> {
    serde_json::from_str(json).context("Failed to deserialize project from string")
}

/// Reads a JSON array of page actions.
///
/// # Arguments
/// * `path` - Path to a file holding an array of tagged actions
///
/// # Example
/// ```no_run
/// use retrofit_fabric::io::read_actions;
/// use std::path::Path;
///
/// for action in read_actions(Path::new("actions.json")).unwrap() {
///     println!("{}", action.name());
/// }
/// ```
pub fn read_actions(path: &Path) -> Result<Vec<Action>> {
    let file = File::open(path)
        .with_context(|| format!("Failed to open file: {}", path.display()))?;
    let reader = BufReader::new(file);

    let actions: Vec<Action> = serde_json::from_reader(reader)
        .with_context(|| format!("Failed to deserialize actions from: {}", path.display()))?;

    Ok(actions)
}

//! Command scripts: a JSON array replayed into a session.
//!
//! Each element is either a session command, tagged by `op`:
//!
//! ```json
//! {"op": "add_point", "x": 0, "y": 0}
//! ```
//!
//! or a CSV import step whose path is resolved relative to the script:
//!
//! ```json
//! {"import_csv": "control.csv"}
//! ```

use std::path::{Path, PathBuf};

use georef_core::Command;
use serde::Deserialize;

use crate::control_csv::{ControlCsv, read_control_csv};
use crate::error::IoError;

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Step {
    ImportCsv { import_csv: PathBuf },
    Command(Command),
}

/// Parse script text into steps without touching the filesystem.
///
/// CSV steps are returned as their (unresolved) paths.
///
/// # Errors
///
/// Returns the JSON error if the text is not an array of valid steps.
pub fn parse_script(text: &str) -> Result<Vec<ScriptStep>, serde_json::Error> {
    let steps: Vec<Step> = serde_json::from_str(text)?;
    Ok(steps
        .into_iter()
        .map(|step| match step {
            Step::ImportCsv { import_csv } => ScriptStep::ImportCsv(import_csv),
            Step::Command(command) => ScriptStep::Command(command),
        })
        .collect())
}

/// One parsed script element.
#[derive(Debug, Clone, PartialEq)]
pub enum ScriptStep {
    /// A session command.
    Command(Command),
    /// Import control point coordinates from this CSV file.
    ImportCsv(PathBuf),
}

/// Load a script and expand its CSV steps into import commands.
///
/// # Errors
///
/// Returns [`IoError::Read`] or [`IoError::Script`] for the script file
/// itself, and any error from
/// [`read_control_csv`](crate::control_csv::read_control_csv) for the
/// CSV files it references.
pub fn load_script(path: &Path) -> Result<Vec<Command>, IoError> {
    let text = std::fs::read_to_string(path).map_err(|source| IoError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let steps = parse_script(&text).map_err(|source| IoError::Script {
        path: path.to_path_buf(),
        source,
    })?;
    let base = path.parent().unwrap_or_else(|| Path::new("."));

    let commands = steps
        .into_iter()
        .map(|step| match step {
            ScriptStep::Command(command) => Ok(command),
            ScriptStep::ImportCsv(csv) => {
                read_control_csv(&base.join(csv)).map(ControlCsv::into_command)
            }
        })
        .collect::<Result<Vec<_>, IoError>>()?;
    log::debug!("loaded {} commands from {}", commands.len(), path.display());
    Ok(commands)
}

//! Source export file loading.

use std::path::Path;

use passage_core::SourceExport;

use crate::error::{CliError, CliResult};

/// Load a Cognito user export from a JSON file.
pub fn load(path: &Path) -> CliResult<SourceExport> {
    let contents = std::fs::read_to_string(path).map_err(|e| CliError::ExportUnreadable {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;
    serde_json::from_str(&contents).map_err(|e| CliError::ExportUnreadable {
        path: path.display().to_string(),
        message: e.to_string(),
    })
}

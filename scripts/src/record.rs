//! Persists the deployment record

use std::{fs, path::Path};

use tracing::info;

use crate::{errors::ScriptError, types::DeploymentRecord, utils::write_atomic};

/// Write the record to `path` as pretty-printed JSON, replacing any existing record
pub fn persist(record: &DeploymentRecord, path: &Path) -> Result<(), ScriptError> {
    let json = serde_json::to_string_pretty(record)
        .map_err(|e| ScriptError::RecordWrite(e.to_string()))?;

    write_atomic(path, json.as_bytes())
        .map_err(|e| ScriptError::RecordWrite(format!("{}: {e}", path.display())))?;

    info!(path = %path.display(), "Deployment information saved to {}", path.display());
    Ok(())
}

/// Read a previously persisted record
pub fn load(path: &Path) -> Result<DeploymentRecord, ScriptError> {
    let contents = fs::read_to_string(path)
        .map_err(|e| ScriptError::ReadDeployments(format!("{}: {e}", path.display())))?;

    serde_json::from_str(&contents)
        .map_err(|e| ScriptError::ReadDeployments(format!("{}: {e}", path.display())))
}

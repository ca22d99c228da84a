//! JSON Schema validation of the changelog document.
use log::*;
use serde_json::Value;
use std::path::Path;

use crate::{
    Result,
    changelog::entry::ChangelogEntry,
    error::{ReleaseScribeError, SchemaViolation},
    file_loader::load_file,
};

/// Schema generated from [`ChangelogEntry`], used when no schema file is
/// configured.
pub fn default_schema() -> Value {
    let schema = schemars::schema_for!(Vec<ChangelogEntry>);
    schema.as_value().clone()
}

/// Load the schema at `path`, or fall back to [`default_schema`].
pub fn load_schema(path: Option<&Path>) -> Result<Value> {
    match path {
        Some(path) => {
            debug!("loading changelog schema from {}", path.display());
            let content = std::fs::read_to_string(path)?;
            Ok(serde_json::from_str(&content)?)
        }
        None => Ok(default_schema()),
    }
}

/// Validate an arbitrary changelog document against `schema`, reporting
/// every violation.
pub fn validate_value(schema: &Value, data: &Value) -> Result<()> {
    let validator = jsonschema::validator_for(schema).map_err(|e| {
        ReleaseScribeError::invalid_config(format!(
            "invalid changelog schema: {e}"
        ))
    })?;

    let violations: Vec<SchemaViolation> = validator
        .iter_errors(data)
        .map(|e| SchemaViolation {
            path: e.instance_path.to_string(),
            message: e.to_string(),
        })
        .collect();

    if violations.is_empty() {
        return Ok(());
    }

    Err(ReleaseScribeError::SchemaValidation(violations))
}

/// Validate the full would-be changelog.
pub fn validate_entries(schema: &Value, entries: &[ChangelogEntry]) -> Result<()> {
    let data = serde_json::to_value(entries)?;
    validate_value(schema, &data)
}

/// Validate the changelog file at `changelog` against the schema at
/// `schema` (or the generated default). Returns the number of entries.
pub fn validate_file(changelog: &Path, schema: Option<&Path>) -> Result<usize> {
    let content = load_file(changelog)?.ok_or_else(|| {
        ReleaseScribeError::not_found(format!(
            "changelog {}",
            changelog.display()
        ))
    })?;

    let data: Value = serde_json::from_str(&content)?;
    let schema = load_schema(schema)?;

    validate_value(&schema, &data)?;

    let count = data.as_array().map(|a| a.len()).unwrap_or(0);
    info!("{} is valid ({count} entries)", changelog.display());

    Ok(count)
}

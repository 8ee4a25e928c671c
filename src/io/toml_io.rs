use std::path::Path;

use crate::analysis::resolve;
use crate::error::FeasibilityError;
use crate::models::{ParameterPatch, ParameterSet};

/// Read a scenario from a TOML file and resolve its defaults.
pub fn read_toml(path: impl AsRef<Path>) -> Result<ParameterSet, FeasibilityError> {
    let content = std::fs::read_to_string(path.as_ref())?;
    read_toml_str(&content)
}

/// Read a scenario from TOML text.
pub fn read_toml_str(content: &str) -> Result<ParameterSet, FeasibilityError> {
    let patch = patch_from_toml_str(content)?;
    let mut params = ParameterSet::new();
    patch.apply_to(&mut params);
    Ok(resolve(&params))
}

/// Read a partial update from a TOML file.
pub fn read_patch_toml(path: impl AsRef<Path>) -> Result<ParameterPatch, FeasibilityError> {
    let content = std::fs::read_to_string(path.as_ref())?;
    patch_from_toml_str(&content)
}

fn patch_from_toml_str(content: &str) -> Result<ParameterPatch, FeasibilityError> {
    let value: serde_json::Value = toml::from_str(content)?;
    ParameterPatch::from_json(&value)
}

/// Write a scenario as TOML.
pub fn write_toml(params: &ParameterSet, path: impl AsRef<Path>) -> Result<(), FeasibilityError> {
    let content = toml::to_string_pretty(params)
        .map_err(|e| FeasibilityError::ParseError(format!("TOML serialization failed: {e}")))?;
    std::fs::write(path.as_ref(), content)?;
    Ok(())
}

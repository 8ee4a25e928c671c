use std::path::Path;

use serde::Serialize;

use crate::analysis::resolve;
use crate::error::FeasibilityError;
use crate::models::{ParameterPatch, ParameterSet};

/// Read a scenario from a JSON file and resolve its defaults.
///
/// The file is read as a patch over an empty scenario, so it may contain
/// numeric strings, nulls and extra keys.
pub fn read_json(path: impl AsRef<Path>) -> Result<ParameterSet, FeasibilityError> {
    let patch = read_patch_json(path)?;
    let mut params = ParameterSet::new();
    patch.apply_to(&mut params);
    Ok(resolve(&params))
}

/// Read a scenario from JSON bytes.
pub fn read_json_from_bytes(data: &[u8]) -> Result<ParameterSet, FeasibilityError> {
    let patch = patch_from_bytes(data)?;
    let mut params = ParameterSet::new();
    patch.apply_to(&mut params);
    Ok(resolve(&params))
}

/// Read a partial update from a JSON file.
pub fn read_patch_json(path: impl AsRef<Path>) -> Result<ParameterPatch, FeasibilityError> {
    let data = std::fs::read(path.as_ref())?;
    patch_from_bytes(&data)
}

fn patch_from_bytes(data: &[u8]) -> Result<ParameterPatch, FeasibilityError> {
    let content = std::str::from_utf8(data)
        .map_err(|e| FeasibilityError::ParseError(format!("Invalid UTF-8: {e}")))?;
    let value: serde_json::Value = serde_json::from_str(content)?;
    ParameterPatch::from_json(&value)
}

/// Write any serializable record (scenario, result, grid) as JSON.
pub fn write_json<T: Serialize>(
    value: &T,
    path: impl AsRef<Path>,
    pretty: bool,
) -> Result<(), FeasibilityError> {
    let content = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    std::fs::write(path.as_ref(), content)?;
    Ok(())
}

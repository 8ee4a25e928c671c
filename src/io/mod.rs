mod csv_io;
mod json_io;
mod toml_io;

use std::path::Path;

use crate::error::FeasibilityError;
use crate::models::{ParameterPatch, ParameterSet};

pub use csv_io::{
    grid_to_csv_string, read_csv, read_csv_from_bytes, run_batch, write_batch_csv,
    write_grid_csv, BatchRow, NamedScenario, NAME_COLUMN,
};
pub use json_io::{read_json, read_json_from_bytes, read_patch_json, write_json};
pub use toml_io::{read_patch_toml, read_toml, read_toml_str, write_toml};

/// Trait for reading a scenario from a file.
pub trait ScenarioReader {
    /// Read and resolve against the built-in defaults.
    fn read(&self, path: &Path) -> Result<ParameterSet, FeasibilityError>;

    /// Read the file's fields as an unresolved partial update.
    fn read_patch(&self, path: &Path) -> Result<ParameterPatch, FeasibilityError>;
}

/// Trait for writing a scenario to a file.
pub trait ScenarioWriter {
    fn write(&self, params: &ParameterSet, path: &Path) -> Result<(), FeasibilityError>;
}

/// JSON format reader/writer.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonFormat {
    pub pretty: bool,
}

impl ScenarioReader for JsonFormat {
    fn read(&self, path: &Path) -> Result<ParameterSet, FeasibilityError> {
        read_json(path)
    }

    fn read_patch(&self, path: &Path) -> Result<ParameterPatch, FeasibilityError> {
        read_patch_json(path)
    }
}

impl ScenarioWriter for JsonFormat {
    fn write(&self, params: &ParameterSet, path: &Path) -> Result<(), FeasibilityError> {
        write_json(params, path, self.pretty)
    }
}

/// TOML format reader/writer.
#[derive(Debug, Clone, Copy, Default)]
pub struct TomlFormat;

impl ScenarioReader for TomlFormat {
    fn read(&self, path: &Path) -> Result<ParameterSet, FeasibilityError> {
        read_toml(path)
    }

    fn read_patch(&self, path: &Path) -> Result<ParameterPatch, FeasibilityError> {
        read_patch_toml(path)
    }
}

impl ScenarioWriter for TomlFormat {
    fn write(&self, params: &ParameterSet, path: &Path) -> Result<(), FeasibilityError> {
        write_toml(params, path)
    }
}

fn extension(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase()
}

/// Pick a reader/writer for a file based on its extension.
pub fn format_for(path: &Path) -> Result<Box<dyn ScenarioFormat>, FeasibilityError> {
    match extension(path).as_str() {
        "json" => Ok(Box::new(JsonFormat { pretty: true })),
        "toml" => Ok(Box::new(TomlFormat)),
        other => Err(FeasibilityError::ParseError(format!(
            "Unsupported scenario format: '{other}'. Use .json or .toml"
        ))),
    }
}

/// A format that can both read and write scenarios.
pub trait ScenarioFormat: ScenarioReader + ScenarioWriter {}

impl<T: ScenarioReader + ScenarioWriter> ScenarioFormat for T {}

/// Read a scenario, choosing the format from the file extension.
pub fn read_scenario(path: impl AsRef<Path>) -> Result<ParameterSet, FeasibilityError> {
    let path = path.as_ref();
    format_for(path)?.read(path)
}

/// Read a file as an unresolved partial update, choosing the format from
/// the file extension.
pub fn read_patch(path: impl AsRef<Path>) -> Result<ParameterPatch, FeasibilityError> {
    let path = path.as_ref();
    format_for(path)?.read_patch(path)
}

/// Write a scenario, choosing the format from the file extension.
pub fn write_scenario(
    params: &ParameterSet,
    path: impl AsRef<Path>,
) -> Result<(), FeasibilityError> {
    let path = path.as_ref();
    format_for(path)?.write(params, path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::resolve;
    use crate::models::{Category, HousingClass, ParkingType};

    fn sample() -> ParameterSet {
        resolve(&ParameterSet {
            land_area_m2: Some(5000.0),
            far_ratio: Some(1.8),
            parking_type: Some(ParkingType::Enclosed.into()),
            housing_class: Some(HousingClass::Mid.into()),
            land_value_usd: Some(2_000_000.0),
            ..Default::default()
        })
    }

    #[test]
    fn test_scenario_roundtrip_by_extension() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["scenario.json", "scenario.TOML"] {
            let path = dir.path().join(name);
            write_scenario(&sample(), &path).unwrap();
            assert_eq!(read_scenario(&path).unwrap(), sample());
        }
    }

    #[test]
    fn test_read_patch_keeps_fields_unresolved() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("patch.toml");
        std::fs::write(&path, "housing_class = \"LOW\"\nsale_price_usd_per_m2 = \"\"\n").unwrap();
        let patch = read_patch(&path).unwrap();
        let mut params = sample();
        patch.apply_to(&mut params);
        assert_eq!(params.housing_class, Some(Category::Known(HousingClass::Low)));
        assert_eq!(params.construction_cost_usd_per_m2, Some(900.0));
        assert_eq!(params.sale_price_usd_per_m2, None);
    }

    #[test]
    fn test_unsupported_extension() {
        let err = read_scenario("scenario.xlsx").unwrap_err();
        assert!(err.to_string().contains("Unsupported scenario format"));
        let err = read_patch("patch.xlsx").unwrap_err();
        assert!(err.to_string().contains("Unsupported scenario format"));
    }

    #[test]
    fn test_format_for_reads_patch() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("partial.json");
        std::fs::write(&path, r#"{"housing_class": "HIGH", "far_ratio": "2.5"}"#).unwrap();
        let patch = format_for(&path).unwrap().read_patch(&path).unwrap();
        let mut params = ParameterSet::new();
        patch.apply_to(&mut params);
        assert_eq!(params.far_ratio, Some(2.5));
        assert_eq!(params.construction_cost_usd_per_m2, None);
    }

    #[test]
    fn test_format_traits() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("compact.json");
        JsonFormat::default().write(&sample(), &path).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert!(!content.contains('\n'));
        assert_eq!(JsonFormat::default().read(&path).unwrap(), sample());
    }
}

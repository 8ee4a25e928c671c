use thiserror::Error;

/// Errors that can occur while resolving or computing a feasibility scenario.
#[derive(Error, Debug)]
pub enum FeasibilityError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    /// A mandatory scenario field is absent or empty.
    #[error("Missing field: {0}")]
    MissingField(&'static str),

    /// A category value that no default can be derived from.
    #[error("Invalid {field} '{value}': cannot derive {derived}")]
    InvalidEnum {
        field: &'static str,
        value: String,
        derived: &'static str,
    },

    #[error("Not found: {0}")]
    NotFound(String),
}

impl FeasibilityError {
    /// Whether the error means the scenario is incomplete, as opposed to broken input.
    pub fn is_incomplete_scenario(&self) -> bool {
        matches!(
            self,
            FeasibilityError::MissingField(_) | FeasibilityError::InvalidEnum { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_display() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err = FeasibilityError::from(io_err);
        let msg = err.to_string();
        assert!(msg.contains("IO error"));
        assert!(msg.contains("file not found"));
    }

    #[test]
    fn test_missing_field_display() {
        let err = FeasibilityError::MissingField("land_area_m2");
        assert_eq!(err.to_string(), "Missing field: land_area_m2");
    }

    #[test]
    fn test_invalid_enum_display() {
        let err = FeasibilityError::InvalidEnum {
            field: "parking_type",
            value: "GARAGE".to_string(),
            derived: "parking_coefficient",
        };
        assert_eq!(
            err.to_string(),
            "Invalid parking_type 'GARAGE': cannot derive parking_coefficient"
        );
    }

    #[test]
    fn test_parse_error_display() {
        let err = FeasibilityError::ParseError("invalid format".to_string());
        assert_eq!(err.to_string(), "Parse error: invalid format");
    }

    #[test]
    fn test_validation_error_display() {
        let err = FeasibilityError::ValidationError("rate must be positive".to_string());
        assert_eq!(err.to_string(), "Validation error: rate must be positive");
    }

    #[test]
    fn test_incomplete_scenario_classification() {
        assert!(FeasibilityError::MissingField("far_ratio").is_incomplete_scenario());
        assert!(FeasibilityError::InvalidEnum {
            field: "housing_class",
            value: "LUXURY".to_string(),
            derived: "construction_cost_usd_per_m2",
        }
        .is_incomplete_scenario());
        assert!(!FeasibilityError::ParseError("x".to_string()).is_incomplete_scenario());
    }

    #[test]
    fn test_json_error_from_conversion() {
        let result: Result<serde_json::Value, _> = serde_json::from_str("not valid json{{{");
        let json_err = result.unwrap_err();
        let err: FeasibilityError = json_err.into();
        assert!(matches!(err, FeasibilityError::Json(_)));
        assert!(err.to_string().contains("JSON error"));
    }

    #[test]
    fn test_toml_error_from_conversion() {
        let result: Result<toml::Value, _> = toml::from_str("= nope");
        let err: FeasibilityError = result.unwrap_err().into();
        assert!(matches!(err, FeasibilityError::Toml(_)));
    }

    #[test]
    fn test_error_is_debug() {
        let err = FeasibilityError::ParseError("test".to_string());
        let debug_str = format!("{:?}", err);
        assert!(debug_str.contains("ParseError"));
    }
}

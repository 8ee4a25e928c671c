use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::FeasibilityError;

/// How parking is provided for the project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParkingType {
    Open,
    Enclosed,
}

impl ParkingType {
    /// Canonical wire code.
    pub fn code(&self) -> &'static str {
        match self {
            ParkingType::Open => "OPEN",
            ParkingType::Enclosed => "ENCLOSED",
        }
    }
}

impl fmt::Display for ParkingType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for ParkingType {
    type Err = FeasibilityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "open" | "acik" => Ok(ParkingType::Open),
            "enclosed" | "closed" | "kapali" => Ok(ParkingType::Enclosed),
            _ => Err(FeasibilityError::ParseError(format!(
                "Unknown parking type: '{s}'"
            ))),
        }
    }
}

/// Housing quality class, which drives the default construction cost.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HousingClass {
    Low,
    Mid,
    High,
}

impl HousingClass {
    /// Canonical wire code.
    pub fn code(&self) -> &'static str {
        match self {
            HousingClass::Low => "LOW",
            HousingClass::Mid => "MID",
            HousingClass::High => "HIGH",
        }
    }
}

impl fmt::Display for HousingClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for HousingClass {
    type Err = FeasibilityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "low" | "alt" => Ok(HousingClass::Low),
            "mid" | "middle" | "orta" => Ok(HousingClass::Mid),
            "high" | "yuksek" => Ok(HousingClass::High),
            _ => Err(FeasibilityError::ParseError(format!(
                "Unknown housing class: '{s}'"
            ))),
        }
    }
}

/// A category field as supplied by the user.
///
/// Values that do not parse are kept verbatim so that resolving and merging
/// never lose input; only the engine rejects them, and only when it needs a
/// default derived from the category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Category<T> {
    Known(T),
    Unrecognized(String),
}

impl<T: FromStr> Category<T> {
    /// Parse a raw value, keeping it verbatim when it is not a known code.
    pub fn parse(raw: &str) -> Self {
        match raw.parse::<T>() {
            Ok(value) => Category::Known(value),
            Err(_) => Category::Unrecognized(raw.to_string()),
        }
    }
}

impl<T: Copy> Category<T> {
    /// The recognized value, if any.
    pub fn known(&self) -> Option<T> {
        match self {
            Category::Known(value) => Some(*value),
            Category::Unrecognized(_) => None,
        }
    }
}

impl<T> From<T> for Category<T> {
    fn from(value: T) -> Self {
        Category::Known(value)
    }
}

impl<T: fmt::Display> fmt::Display for Category<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Category::Known(value) => write!(f, "{value}"),
            Category::Unrecognized(raw) => f.write_str(raw),
        }
    }
}

impl<T: fmt::Display> Serialize for Category<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de, T: FromStr> Deserialize<'de> for Category<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Category::parse(&raw))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parking_type_display() {
        assert_eq!(ParkingType::Open.to_string(), "OPEN");
        assert_eq!(ParkingType::Enclosed.to_string(), "ENCLOSED");
    }

    #[test]
    fn test_parking_type_parse_aliases() {
        assert_eq!("open".parse::<ParkingType>().unwrap(), ParkingType::Open);
        assert_eq!("ACIK".parse::<ParkingType>().unwrap(), ParkingType::Open);
        assert_eq!("Enclosed".parse::<ParkingType>().unwrap(), ParkingType::Enclosed);
        assert_eq!("KAPALI".parse::<ParkingType>().unwrap(), ParkingType::Enclosed);
    }

    #[test]
    fn test_parking_type_parse_invalid() {
        assert!("garage".parse::<ParkingType>().is_err());
        assert!("".parse::<ParkingType>().is_err());
    }

    #[test]
    fn test_housing_class_parse_aliases() {
        assert_eq!("low".parse::<HousingClass>().unwrap(), HousingClass::Low);
        assert_eq!("ALT".parse::<HousingClass>().unwrap(), HousingClass::Low);
        assert_eq!("ORTA".parse::<HousingClass>().unwrap(), HousingClass::Mid);
        assert_eq!(" high ".parse::<HousingClass>().unwrap(), HousingClass::High);
        assert_eq!("YUKSEK".parse::<HousingClass>().unwrap(), HousingClass::High);
    }

    #[test]
    fn test_housing_class_parse_invalid() {
        assert!("luxury".parse::<HousingClass>().is_err());
    }

    #[test]
    fn test_category_keeps_unrecognized_value() {
        let cat: Category<ParkingType> = Category::parse("GARAGE");
        assert_eq!(cat, Category::Unrecognized("GARAGE".to_string()));
        assert_eq!(cat.known(), None);
        assert_eq!(cat.to_string(), "GARAGE");
    }

    #[test]
    fn test_category_serializes_as_plain_string() {
        let cat: Category<HousingClass> = HousingClass::Mid.into();
        assert_eq!(serde_json::to_string(&cat).unwrap(), "\"MID\"");

        let back: Category<HousingClass> = serde_json::from_str("\"orta\"").unwrap();
        assert_eq!(back, Category::Known(HousingClass::Mid));

        let odd: Category<HousingClass> = serde_json::from_str("\"villa\"").unwrap();
        assert_eq!(serde_json::to_string(&odd).unwrap(), "\"villa\"");
    }
}

use serde::{Deserialize, Serialize};

use super::{HousingClass, ParkingType};

/// Default parking coefficients by parking type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParkingCoefficients {
    pub open: f64,
    pub enclosed: f64,
}

/// Default construction cost in USD per m² by housing class.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConstructionCosts {
    pub low: f64,
    pub mid: f64,
    pub high: f64,
}

/// Configurable default values used when a scenario leaves a field unset.
///
/// Sellable area: `zoning_floor_area * sellable_area_coefficient`
/// Gross construction area: `sellable_area * parking_coefficient`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Defaults {
    pub sellable_area_coefficient: f64,
    pub parking_coefficient: ParkingCoefficients,
    pub construction_cost_usd_per_m2: ConstructionCosts,
    pub average_unit_m2: f64,
}

impl Defaults {
    /// Parking coefficient for the given parking type.
    pub fn parking_coefficient_for(&self, parking_type: ParkingType) -> f64 {
        match parking_type {
            ParkingType::Open => self.parking_coefficient.open,
            ParkingType::Enclosed => self.parking_coefficient.enclosed,
        }
    }

    /// Construction cost per m² for the given housing class.
    pub fn construction_cost_for(&self, class: HousingClass) -> f64 {
        match class {
            HousingClass::Low => self.construction_cost_usd_per_m2.low,
            HousingClass::Mid => self.construction_cost_usd_per_m2.mid,
            HousingClass::High => self.construction_cost_usd_per_m2.high,
        }
    }
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            sellable_area_coefficient: 1.25,
            parking_coefficient: ParkingCoefficients {
                open: 1.20,
                enclosed: 1.60,
            },
            construction_cost_usd_per_m2: ConstructionCosts {
                low: 700.0,
                mid: 900.0,
                high: 1100.0,
            },
            average_unit_m2: 120.0,
        }
    }
}

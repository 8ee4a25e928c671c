pub mod analysis;
pub mod config;
pub mod error;
pub mod io;
pub mod models;
pub mod rates;
pub mod visualization;

#[cfg(feature = "web")]
pub mod web;

pub use analysis::{Feasibility, SensitivityGrid, Study, Warning};
pub use config::AppConfig;
pub use error::FeasibilityError;
pub use io::{ScenarioReader, ScenarioWriter};
pub use models::{
    Category, Defaults, HousingClass, Outputs, ParameterPatch, ParameterSet, ParkingType,
};
pub use rates::{RateProvider, RateQuote};

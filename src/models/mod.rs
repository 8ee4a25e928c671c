mod category;
mod defaults;
mod outputs;
mod params;

pub use category::{Category, HousingClass, ParkingType};
pub use defaults::{ConstructionCosts, Defaults, ParkingCoefficients};
pub use outputs::{Outputs, TARGET_MARGINS};
pub use params::{fields, ParameterPatch, ParameterSet, PatchField};

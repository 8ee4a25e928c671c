mod engine;
mod resolver;
mod sensitivity;
mod study;
mod warnings;

pub use engine::{compute, compute_with, Feasibility};
pub use resolver::{is_complete, merge, merge_with, missing_fields, resolve, resolve_with};
pub use sensitivity::{
    sensitivity, sensitivity_with, SensitivityCell, SensitivityGrid, MULTIPLIERS,
};
pub use study::Study;
pub use warnings::{Severity, Warning};

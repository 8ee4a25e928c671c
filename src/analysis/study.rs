use tracing::info;

use crate::analysis::{
    compute_with, merge_with, missing_fields, resolve_with, sensitivity_with, Feasibility,
    SensitivityGrid,
};
use crate::error::FeasibilityError;
use crate::models::{Defaults, ParameterPatch, ParameterSet};

/// Unified API that groups all operations on one scenario.
pub struct Study<'a> {
    params: &'a ParameterSet,
    exchange_rate: Option<f64>,
    defaults: Defaults,
}

impl<'a> Study<'a> {
    /// Create a study of the given scenario with the built-in defaults and no exchange rate.
    pub fn new(params: &'a ParameterSet) -> Self {
        Self {
            params,
            exchange_rate: None,
            defaults: Defaults::default(),
        }
    }

    pub fn with_exchange_rate(mut self, rate: Option<f64>) -> Self {
        self.exchange_rate = rate;
        self
    }

    pub fn with_defaults(mut self, defaults: Defaults) -> Self {
        self.defaults = defaults;
        self
    }

    /// The scenario with defaults filled in.
    pub fn resolved(&self) -> ParameterSet {
        resolve_with(self.params, &self.defaults)
    }

    /// The scenario after applying a patch, resolved.
    pub fn merged(&self, patch: &ParameterPatch) -> ParameterSet {
        merge_with(self.params, patch, &self.defaults)
    }

    /// Mandatory fields still missing.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        missing_fields(self.params)
    }

    /// Compute outputs and warnings.
    pub fn feasibility(&self) -> Result<Feasibility, FeasibilityError> {
        let result = compute_with(self.params, self.exchange_rate, &self.defaults)?;
        info!(
            revenue_mode = result.outputs.is_revenue_mode(),
            warnings = result.warnings.len(),
            "feasibility study computed"
        );
        Ok(result)
    }

    /// Compute the sale price / construction cost sensitivity grid.
    pub fn sensitivity(&self) -> Result<SensitivityGrid, FeasibilityError> {
        sensitivity_with(self.params, self.exchange_rate, &self.defaults)
    }
}

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::engine::{compute_with, ResolvedInputs};
use crate::error::FeasibilityError;
use crate::models::{Defaults, Outputs, ParameterSet};

/// Multipliers applied on each axis of the grid.
pub const MULTIPLIERS: [f64; 3] = [0.9, 1.0, 1.1];

/// One perturbed scenario in the grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensitivityCell {
    pub cost_multiplier: f64,
    pub sale_multiplier: f64,
    pub profit_usd: f64,
    pub profit_try: Option<f64>,
    pub gross_margin: f64,
}

/// Profit and margin under ±10% changes in sale price and construction cost.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensitivityGrid {
    /// Outputs of the unperturbed scenario
    pub base: Outputs,
    /// Row axis
    pub cost_multipliers: Vec<f64>,
    /// Column axis
    pub sale_multipliers: Vec<f64>,
    /// `cells[row][column]`; empty when the scenario has no sale price
    pub cells: Vec<Vec<SensitivityCell>>,
}

impl SensitivityGrid {
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Look up the cell for a pair of multipliers.
    pub fn cell(&self, cost_multiplier: f64, sale_multiplier: f64) -> Option<&SensitivityCell> {
        self.cells
            .iter()
            .flatten()
            .find(|c| c.cost_multiplier == cost_multiplier && c.sale_multiplier == sale_multiplier)
    }

    /// The unperturbed cell.
    pub fn center(&self) -> Option<&SensitivityCell> {
        self.cell(1.0, 1.0)
    }
}

/// Build the sensitivity grid with the built-in default table.
pub fn sensitivity(
    params: &ParameterSet,
    exchange_rate: Option<f64>,
) -> Result<SensitivityGrid, FeasibilityError> {
    sensitivity_with(params, exchange_rate, &Defaults::default())
}

/// [`sensitivity`] with a custom default table.
///
/// Each cell recomputes the full scenario with the sale price and the
/// construction cost scaled. The cost multiplier is applied to the cost in
/// effect for the scenario: the explicit value when one is set, otherwise
/// the class default. Warnings of perturbed runs are dropped.
pub fn sensitivity_with(
    params: &ParameterSet,
    exchange_rate: Option<f64>,
    defaults: &Defaults,
) -> Result<SensitivityGrid, FeasibilityError> {
    let base = compute_with(params, exchange_rate, defaults)?.outputs;

    let mut grid = SensitivityGrid {
        base,
        cost_multipliers: MULTIPLIERS.to_vec(),
        sale_multipliers: MULTIPLIERS.to_vec(),
        cells: Vec::new(),
    };

    if !grid.base.is_revenue_mode() {
        debug!("no sale price, sensitivity grid left empty");
        return Ok(grid);
    }

    let inputs = ResolvedInputs::from_params(params, defaults)?;
    let Some(sale_price) = inputs.sale_price_usd_per_m2 else {
        return Ok(grid);
    };
    let unit_cost = inputs.construction_cost_usd_per_m2;

    let mut cells = Vec::with_capacity(MULTIPLIERS.len());
    for &cost_multiplier in &MULTIPLIERS {
        let mut row = Vec::with_capacity(MULTIPLIERS.len());
        for &sale_multiplier in &MULTIPLIERS {
            let mut perturbed = params.clone();
            perturbed.sale_price_usd_per_m2 = Some(sale_price * sale_multiplier);
            perturbed.construction_cost_usd_per_m2 = Some(unit_cost * cost_multiplier);

            let out = compute_with(&perturbed, exchange_rate, defaults)?.outputs;
            row.push(SensitivityCell {
                cost_multiplier,
                sale_multiplier,
                profit_usd: out.profit_usd.unwrap_or_default(),
                profit_try: out.profit_try,
                gross_margin: out.gross_margin.unwrap_or_default(),
            });
        }
        cells.push(row);
    }

    debug!(cells = cells.len() * MULTIPLIERS.len(), "computed sensitivity grid");
    grid.cells = cells;
    Ok(grid)
}

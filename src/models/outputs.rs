use serde::{Deserialize, Serialize};

/// Gross margins for which a target sale price is reported.
pub const TARGET_MARGINS: [f64; 3] = [0.10, 0.30, 0.50];

/// Derived metrics of one feasibility computation.
///
/// `*_try` fields mirror their `*_usd` counterpart in the secondary currency
/// and are `None` when no exchange rate was supplied. Revenue, profit and
/// margin are `None` in cost-only mode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Outputs {
    pub zoning_floor_area_m2: f64,
    pub sellable_area_m2: f64,
    pub gross_construction_area_m2: f64,

    pub construction_cost_usd: f64,
    pub construction_cost_try: Option<f64>,
    pub land_value_usd: f64,
    pub land_value_try: Option<f64>,
    pub total_project_cost_usd: f64,
    pub total_project_cost_try: Option<f64>,

    pub unit_count: u64,
    pub leftover_sellable_area_m2: f64,

    pub breakeven_price_usd_per_m2: f64,
    pub breakeven_price_try_per_m2: Option<f64>,
    pub target_price_10_usd_per_m2: f64,
    pub target_price_10_try_per_m2: Option<f64>,
    pub target_price_30_usd_per_m2: f64,
    pub target_price_30_try_per_m2: Option<f64>,
    pub target_price_50_usd_per_m2: f64,
    pub target_price_50_try_per_m2: Option<f64>,

    pub revenue_usd: Option<f64>,
    pub revenue_try: Option<f64>,
    pub profit_usd: Option<f64>,
    pub profit_try: Option<f64>,
    /// Profit over total project cost
    pub gross_margin: Option<f64>,

    /// Exchange rate the `*_try` fields were converted with
    pub exchange_rate: Option<f64>,
}

impl Outputs {
    /// Whether a sale price was known and revenue figures were computed.
    pub fn is_revenue_mode(&self) -> bool {
        self.gross_margin.is_some()
    }

    /// Target prices as `(margin, usd, try)` triples, lowest margin first.
    pub fn target_prices(&self) -> [(f64, f64, Option<f64>); 3] {
        [
            (
                TARGET_MARGINS[0],
                self.target_price_10_usd_per_m2,
                self.target_price_10_try_per_m2,
            ),
            (
                TARGET_MARGINS[1],
                self.target_price_30_usd_per_m2,
                self.target_price_30_try_per_m2,
            ),
            (
                TARGET_MARGINS[2],
                self.target_price_50_usd_per_m2,
                self.target_price_50_try_per_m2,
            ),
        ]
    }

    /// Every USD monetary field paired with its converted mirror, by name.
    pub fn currency_pairs(&self) -> Vec<(&'static str, Option<f64>, Option<f64>)> {
        vec![
            (
                "construction_cost",
                Some(self.construction_cost_usd),
                self.construction_cost_try,
            ),
            ("land_value", Some(self.land_value_usd), self.land_value_try),
            (
                "total_project_cost",
                Some(self.total_project_cost_usd),
                self.total_project_cost_try,
            ),
            (
                "breakeven_price",
                Some(self.breakeven_price_usd_per_m2),
                self.breakeven_price_try_per_m2,
            ),
            (
                "target_price_10",
                Some(self.target_price_10_usd_per_m2),
                self.target_price_10_try_per_m2,
            ),
            (
                "target_price_30",
                Some(self.target_price_30_usd_per_m2),
                self.target_price_30_try_per_m2,
            ),
            (
                "target_price_50",
                Some(self.target_price_50_usd_per_m2),
                self.target_price_50_try_per_m2,
            ),
            ("revenue", self.revenue_usd, self.revenue_try),
            ("profit", self.profit_usd, self.profit_try),
        ]
    }
}

use serde::Serialize;
use tracing::debug;

use super::resolver::resolve_with;
use super::warnings::{collect_warnings, Warning};
use crate::error::FeasibilityError;
use crate::models::{fields, Category, Defaults, Outputs, ParameterSet, TARGET_MARGINS};

/// Result of one feasibility computation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Feasibility {
    pub outputs: Outputs,
    pub warnings: Vec<Warning>,
}

/// A scenario with every value the engine needs.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ResolvedInputs {
    pub land_area_m2: f64,
    pub far_ratio: f64,
    pub sellable_area_coefficient: f64,
    pub parking_coefficient: f64,
    pub construction_cost_usd_per_m2: f64,
    pub land_value_usd: f64,
    pub average_unit_m2: f64,
    pub sale_price_usd_per_m2: Option<f64>,
}

impl ResolvedInputs {
    /// Resolve defaults on a copy of `params` and check mandatory fields.
    pub(crate) fn from_params(
        params: &ParameterSet,
        defaults: &Defaults,
    ) -> Result<Self, FeasibilityError> {
        let resolved = resolve_with(params, defaults);

        let land_area_m2 = require(resolved.land_area_m2, fields::LAND_AREA_M2)?;
        let far_ratio = require(resolved.far_ratio, fields::FAR_RATIO)?;
        check_category(&resolved.parking_type, fields::PARKING_TYPE)?;
        check_category(&resolved.housing_class, fields::HOUSING_CLASS)?;
        let land_value_usd = require(resolved.land_value_usd, fields::LAND_VALUE_USD)?;

        let parking_coefficient = derived(
            resolved.parking_coefficient,
            &resolved.parking_type,
            fields::PARKING_TYPE,
            fields::PARKING_COEFFICIENT,
        )?;
        let construction_cost_usd_per_m2 = derived(
            resolved.construction_cost_usd_per_m2,
            &resolved.housing_class,
            fields::HOUSING_CLASS,
            fields::CONSTRUCTION_COST_USD_PER_M2,
        )?;

        Ok(Self {
            land_area_m2,
            far_ratio,
            sellable_area_coefficient: require(
                resolved.sellable_area_coefficient,
                fields::SELLABLE_AREA_COEFFICIENT,
            )?,
            parking_coefficient,
            construction_cost_usd_per_m2,
            land_value_usd,
            average_unit_m2: require(resolved.average_unit_m2, fields::AVERAGE_UNIT_M2)?,
            sale_price_usd_per_m2: resolved.sale_price_usd_per_m2,
        })
    }
}

fn require(value: Option<f64>, field: &'static str) -> Result<f64, FeasibilityError> {
    value.ok_or(FeasibilityError::MissingField(field))
}

fn check_category<T>(
    value: &Option<Category<T>>,
    field: &'static str,
) -> Result<(), FeasibilityError> {
    match value {
        None => Err(FeasibilityError::MissingField(field)),
        Some(Category::Unrecognized(raw)) if raw.trim().is_empty() => {
            Err(FeasibilityError::MissingField(field))
        }
        Some(_) => Ok(()),
    }
}

/// A value normally derived from a category. Absent only when the category
/// was not recognized and the user did not supply the value directly.
fn derived<T>(
    value: Option<f64>,
    category: &Option<Category<T>>,
    category_field: &'static str,
    field: &'static str,
) -> Result<f64, FeasibilityError> {
    match (value, category) {
        (Some(v), _) => Ok(v),
        (None, Some(Category::Unrecognized(raw))) => Err(FeasibilityError::InvalidEnum {
            field: category_field,
            value: raw.clone(),
            derived: field,
        }),
        (None, _) => Err(FeasibilityError::MissingField(field)),
    }
}

/// Compute all derived metrics for a scenario with the built-in default table.
///
/// `exchange_rate` converts USD to the secondary currency (TRY); without it
/// the `*_try` fields are `None`. A sale price is optional: without one only
/// cost, break-even and target-price figures are produced.
///
/// # Examples
///
/// ```
/// use feasibility_calculator::analysis::compute;
/// use feasibility_calculator::models::{HousingClass, ParameterSet, ParkingType};
///
/// let params = ParameterSet {
///     land_area_m2: Some(5000.0),
///     far_ratio: Some(1.8),
///     parking_type: Some(ParkingType::Enclosed.into()),
///     housing_class: Some(HousingClass::Mid.into()),
///     land_value_usd: Some(2_000_000.0),
///     ..Default::default()
/// };
/// let result = compute(&params, None).unwrap();
/// assert_eq!(result.outputs.sellable_area_m2, 11250.0);
/// assert!(result.outputs.profit_usd.is_none());
/// ```
pub fn compute(
    params: &ParameterSet,
    exchange_rate: Option<f64>,
) -> Result<Feasibility, FeasibilityError> {
    compute_with(params, exchange_rate, &Defaults::default())
}

/// [`compute`] with a custom default table.
pub fn compute_with(
    params: &ParameterSet,
    exchange_rate: Option<f64>,
    defaults: &Defaults,
) -> Result<Feasibility, FeasibilityError> {
    let inputs = ResolvedInputs::from_params(params, defaults)?;
    let rate = usable_rate(exchange_rate);
    let outputs = run(&inputs, rate);
    let warnings = collect_warnings(&inputs, rate, outputs.gross_margin);

    debug!(
        sellable_area_m2 = outputs.sellable_area_m2,
        total_project_cost_usd = outputs.total_project_cost_usd,
        revenue_mode = outputs.is_revenue_mode(),
        warnings = warnings.len(),
        "computed feasibility"
    );

    Ok(Feasibility { outputs, warnings })
}

/// Only a positive, finite rate enables currency conversion.
pub(crate) fn usable_rate(exchange_rate: Option<f64>) -> Option<f64> {
    exchange_rate.filter(|r| r.is_finite() && *r > 0.0)
}

fn run(inputs: &ResolvedInputs, rate: Option<f64>) -> Outputs {
    let convert = |usd: f64| rate.map(|r| usd * r);

    let zoning_floor_area = inputs.land_area_m2 * inputs.far_ratio;
    let sellable_area = zoning_floor_area * inputs.sellable_area_coefficient;
    let gross_construction_area = sellable_area * inputs.parking_coefficient;
    let construction_cost = gross_construction_area * inputs.construction_cost_usd_per_m2;
    let total_project_cost = construction_cost + inputs.land_value_usd;

    let unit_count = if inputs.average_unit_m2 > 0.0 {
        let quotient = sellable_area / inputs.average_unit_m2;
        if quotient > 0.0 {
            quotient.floor() as u64
        } else {
            0
        }
    } else {
        0
    };
    let leftover_sellable_area = if unit_count == 0 {
        sellable_area
    } else {
        sellable_area - unit_count as f64 * inputs.average_unit_m2
    };

    let price_for_margin = |margin: f64| {
        if sellable_area > 0.0 {
            total_project_cost * (1.0 + margin) / sellable_area
        } else {
            0.0
        }
    };
    let breakeven = price_for_margin(0.0);
    let [t10, t30, t50] = TARGET_MARGINS.map(price_for_margin);

    let (revenue, profit, gross_margin) = match inputs.sale_price_usd_per_m2 {
        Some(price) if price > 0.0 => {
            let revenue = sellable_area * price;
            let profit = revenue - total_project_cost;
            let margin = if total_project_cost > 0.0 {
                profit / total_project_cost
            } else {
                0.0
            };
            (Some(revenue), Some(profit), Some(margin))
        }
        _ => (None, None, None),
    };

    Outputs {
        zoning_floor_area_m2: zoning_floor_area,
        sellable_area_m2: sellable_area,
        gross_construction_area_m2: gross_construction_area,
        construction_cost_usd: construction_cost,
        construction_cost_try: convert(construction_cost),
        land_value_usd: inputs.land_value_usd,
        land_value_try: convert(inputs.land_value_usd),
        total_project_cost_usd: total_project_cost,
        total_project_cost_try: convert(total_project_cost),
        unit_count,
        leftover_sellable_area_m2: leftover_sellable_area,
        breakeven_price_usd_per_m2: breakeven,
        breakeven_price_try_per_m2: convert(breakeven),
        target_price_10_usd_per_m2: t10,
        target_price_10_try_per_m2: convert(t10),
        target_price_30_usd_per_m2: t30,
        target_price_30_try_per_m2: convert(t30),
        target_price_50_usd_per_m2: t50,
        target_price_50_try_per_m2: convert(t50),
        revenue_usd: revenue,
        revenue_try: revenue.and_then(convert),
        profit_usd: profit,
        profit_try: profit.and_then(convert),
        gross_margin,
        exchange_rate: rate,
    }
}

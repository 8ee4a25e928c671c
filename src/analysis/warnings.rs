use std::fmt;

use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};

use super::engine::ResolvedInputs;

/// Plausible range for the sellable area coefficient.
pub const SELLABLE_COEFFICIENT_RANGE: (f64, f64) = (1.0, 1.6);
/// Plausible range for the average unit size in m².
pub const AVERAGE_UNIT_RANGE: (f64, f64) = (60.0, 250.0);
/// Floor-area ratio above which the value is flagged as unusually high.
pub const HIGH_FAR_RATIO: f64 = 5.0;
/// Margin below which profitability is flagged as low.
pub const LOW_MARGIN: f64 = 0.10;
/// Margin below which profitability is noted as mid-range.
pub const MODERATE_MARGIN: f64 = 0.20;

/// Grouping of advisory warnings, in the order they are reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// An input that cannot be right.
    Invalid,
    /// An input outside the usual range.
    Unusual,
    Note,
    Profitability,
}

/// An advisory attached to a computation. Never blocks the result.
#[derive(Debug, Clone, PartialEq)]
pub enum Warning {
    NonPositiveFarRatio(f64),
    NonPositiveLandArea(f64),
    NonPositiveSellableCoefficient(f64),
    NonPositiveParkingCoefficient(f64),
    NegativeLandValue(f64),
    NonPositiveConstructionCost(f64),
    NonPositiveSalePrice(f64),
    HighFarRatio(f64),
    UnusualSellableCoefficient(f64),
    UnusualAverageUnit(f64),
    NoExchangeRate,
    Loss(f64),
    LowMargin(f64),
    ModerateMargin(f64),
}

impl Warning {
    pub fn severity(&self) -> Severity {
        match self {
            Warning::NonPositiveFarRatio(_)
            | Warning::NonPositiveLandArea(_)
            | Warning::NonPositiveSellableCoefficient(_)
            | Warning::NonPositiveParkingCoefficient(_)
            | Warning::NegativeLandValue(_)
            | Warning::NonPositiveConstructionCost(_)
            | Warning::NonPositiveSalePrice(_) => Severity::Invalid,
            Warning::HighFarRatio(_)
            | Warning::UnusualSellableCoefficient(_)
            | Warning::UnusualAverageUnit(_) => Severity::Unusual,
            Warning::NoExchangeRate => Severity::Note,
            Warning::Loss(_) | Warning::LowMargin(_) | Warning::ModerateMargin(_) => {
                Severity::Profitability
            }
        }
    }

    /// Stable machine-readable identifier.
    pub fn code(&self) -> &'static str {
        match self {
            Warning::NonPositiveFarRatio(_) => "non_positive_far_ratio",
            Warning::NonPositiveLandArea(_) => "non_positive_land_area",
            Warning::NonPositiveSellableCoefficient(_) => "non_positive_sellable_coefficient",
            Warning::NonPositiveParkingCoefficient(_) => "non_positive_parking_coefficient",
            Warning::NegativeLandValue(_) => "negative_land_value",
            Warning::NonPositiveConstructionCost(_) => "non_positive_construction_cost",
            Warning::NonPositiveSalePrice(_) => "non_positive_sale_price",
            Warning::HighFarRatio(_) => "high_far_ratio",
            Warning::UnusualSellableCoefficient(_) => "unusual_sellable_coefficient",
            Warning::UnusualAverageUnit(_) => "unusual_average_unit",
            Warning::NoExchangeRate => "no_exchange_rate",
            Warning::Loss(_) => "loss",
            Warning::LowMargin(_) => "low_margin",
            Warning::ModerateMargin(_) => "moderate_margin",
        }
    }
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Warning::NonPositiveFarRatio(v) => {
                write!(f, "Floor-area ratio must be positive (got {v}).")
            }
            Warning::NonPositiveLandArea(v) => {
                write!(f, "Land area must be positive (got {v} m²).")
            }
            Warning::NonPositiveSellableCoefficient(v) => {
                write!(f, "Sellable area coefficient must be positive (got {v}).")
            }
            Warning::NonPositiveParkingCoefficient(v) => {
                write!(f, "Parking coefficient must be positive (got {v}).")
            }
            Warning::NegativeLandValue(v) => write!(f, "Land value cannot be negative (got ${v})."),
            Warning::NonPositiveConstructionCost(v) => {
                write!(f, "Construction cost must be positive (got ${v}/m²).")
            }
            Warning::NonPositiveSalePrice(v) => write!(
                f,
                "Sale price must be positive (got ${v}/m²); computed in cost-only mode."
            ),
            Warning::HighFarRatio(v) => {
                write!(f, "Floor-area ratio {v} is unusually high (above {HIGH_FAR_RATIO}).")
            }
            Warning::UnusualSellableCoefficient(v) => write!(
                f,
                "Sellable area coefficient {v} is outside the usual {}–{} range \
                 (1.10–1.35 is common).",
                SELLABLE_COEFFICIENT_RANGE.0, SELLABLE_COEFFICIENT_RANGE.1
            ),
            Warning::UnusualAverageUnit(v) => write!(
                f,
                "Average unit size {v} m² is outside the usual {}–{} m² range.",
                AVERAGE_UNIT_RANGE.0, AVERAGE_UNIT_RANGE.1
            ),
            Warning::NoExchangeRate => {
                write!(f, "No exchange rate available; TRY fields are left empty.")
            }
            Warning::Loss(m) => write!(
                f,
                "Project shows a loss (gross margin {:.1}%).",
                m * 100.0
            ),
            Warning::LowMargin(m) => write!(
                f,
                "Gross margin {:.1}% is below 10% (low).",
                m * 100.0
            ),
            Warning::ModerateMargin(m) => write!(
                f,
                "Gross margin {:.1}% is in the 10–20% range (moderate).",
                m * 100.0
            ),
        }
    }
}

impl Serialize for Warning {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut s = serializer.serialize_struct("Warning", 3)?;
        s.serialize_field("code", self.code())?;
        s.serialize_field("severity", &self.severity())?;
        s.serialize_field("message", &self.to_string())?;
        s.end()
    }
}

/// Run every check; each fires independently.
///
/// Order: hard-sanity checks, then plausibility hints, then profitability.
pub(crate) fn collect_warnings(
    inputs: &ResolvedInputs,
    exchange_rate: Option<f64>,
    gross_margin: Option<f64>,
) -> Vec<Warning> {
    let mut warnings = Vec::new();

    if inputs.far_ratio <= 0.0 {
        warnings.push(Warning::NonPositiveFarRatio(inputs.far_ratio));
    }
    if inputs.land_area_m2 <= 0.0 {
        warnings.push(Warning::NonPositiveLandArea(inputs.land_area_m2));
    }
    if inputs.sellable_area_coefficient <= 0.0 {
        warnings.push(Warning::NonPositiveSellableCoefficient(
            inputs.sellable_area_coefficient,
        ));
    }
    if inputs.parking_coefficient <= 0.0 {
        warnings.push(Warning::NonPositiveParkingCoefficient(
            inputs.parking_coefficient,
        ));
    }
    if inputs.land_value_usd < 0.0 {
        warnings.push(Warning::NegativeLandValue(inputs.land_value_usd));
    }
    if inputs.construction_cost_usd_per_m2 <= 0.0 {
        warnings.push(Warning::NonPositiveConstructionCost(
            inputs.construction_cost_usd_per_m2,
        ));
    }
    if let Some(price) = inputs.sale_price_usd_per_m2 {
        if price <= 0.0 {
            warnings.push(Warning::NonPositiveSalePrice(price));
        }
    }

    if inputs.far_ratio > HIGH_FAR_RATIO {
        warnings.push(Warning::HighFarRatio(inputs.far_ratio));
    }
    let (lo, hi) = SELLABLE_COEFFICIENT_RANGE;
    if !(lo..=hi).contains(&inputs.sellable_area_coefficient) {
        warnings.push(Warning::UnusualSellableCoefficient(
            inputs.sellable_area_coefficient,
        ));
    }
    let (lo, hi) = AVERAGE_UNIT_RANGE;
    if !(lo..=hi).contains(&inputs.average_unit_m2) {
        warnings.push(Warning::UnusualAverageUnit(inputs.average_unit_m2));
    }
    if exchange_rate.is_none() {
        warnings.push(Warning::NoExchangeRate);
    }

    if let Some(margin) = gross_margin {
        if margin < 0.0 {
            warnings.push(Warning::Loss(margin));
        } else if margin < LOW_MARGIN {
            warnings.push(Warning::LowMargin(margin));
        } else if margin < MODERATE_MARGIN {
            warnings.push(Warning::ModerateMargin(margin));
        }
    }

    warnings
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sane_inputs() -> ResolvedInputs {
        ResolvedInputs {
            land_area_m2: 5000.0,
            far_ratio: 1.8,
            sellable_area_coefficient: 1.25,
            parking_coefficient: 1.6,
            construction_cost_usd_per_m2: 900.0,
            land_value_usd: 2_000_000.0,
            average_unit_m2: 120.0,
            sale_price_usd_per_m2: Some(2200.0),
        }
    }

    #[test]
    fn test_sane_inputs_with_rate_and_good_margin_are_silent() {
        assert!(collect_warnings(&sane_inputs(), Some(35.0), Some(0.36)).is_empty());
    }

    #[test]
    fn test_missing_rate_note() {
        let warnings = collect_warnings(&sane_inputs(), None, None);
        assert_eq!(warnings, vec![Warning::NoExchangeRate]);
        assert_eq!(warnings[0].severity(), Severity::Note);
    }

    #[test]
    fn test_all_sanity_checks_fire_independently() {
        let inputs = ResolvedInputs {
            land_area_m2: 0.0,
            far_ratio: -1.0,
            sellable_area_coefficient: 0.0,
            parking_coefficient: -0.5,
            construction_cost_usd_per_m2: 0.0,
            land_value_usd: -10.0,
            average_unit_m2: 120.0,
            sale_price_usd_per_m2: Some(0.0),
        };
        let codes: Vec<&str> = collect_warnings(&inputs, Some(1.0), None)
            .iter()
            .map(Warning::code)
            .collect();
        assert_eq!(
            codes,
            vec![
                "non_positive_far_ratio",
                "non_positive_land_area",
                "non_positive_sellable_coefficient",
                "non_positive_parking_coefficient",
                "negative_land_value",
                "non_positive_construction_cost",
                "non_positive_sale_price",
                "unusual_sellable_coefficient",
            ]
        );
    }

    #[test]
    fn test_zero_land_value_is_allowed() {
        let inputs = ResolvedInputs {
            land_value_usd: 0.0,
            ..sane_inputs()
        };
        assert!(collect_warnings(&inputs, Some(1.0), None).is_empty());
    }

    #[test]
    fn test_plausibility_hints() {
        let inputs = ResolvedInputs {
            far_ratio: 6.0,
            sellable_area_coefficient: 1.7,
            average_unit_m2: 45.0,
            ..sane_inputs()
        };
        let warnings = collect_warnings(&inputs, Some(1.0), None);
        assert_eq!(
            warnings,
            vec![
                Warning::HighFarRatio(6.0),
                Warning::UnusualSellableCoefficient(1.7),
                Warning::UnusualAverageUnit(45.0),
            ]
        );
        assert!(warnings.iter().all(|w| w.severity() == Severity::Unusual));
    }

    #[test]
    fn test_range_bounds_are_inclusive() {
        let inputs = ResolvedInputs {
            far_ratio: 5.0,
            sellable_area_coefficient: 1.6,
            average_unit_m2: 60.0,
            ..sane_inputs()
        };
        assert!(collect_warnings(&inputs, Some(1.0), None).is_empty());
        let inputs = ResolvedInputs {
            sellable_area_coefficient: 1.0,
            average_unit_m2: 250.0,
            ..sane_inputs()
        };
        assert!(collect_warnings(&inputs, Some(1.0), None).is_empty());
    }

    #[test]
    fn test_profitability_bands() {
        let band = |m: f64| collect_warnings(&sane_inputs(), Some(1.0), Some(m));
        assert_eq!(band(-0.05), vec![Warning::Loss(-0.05)]);
        assert_eq!(band(0.0), vec![Warning::LowMargin(0.0)]);
        assert_eq!(band(0.099), vec![Warning::LowMargin(0.099)]);
        assert_eq!(band(0.10), vec![Warning::ModerateMargin(0.10)]);
        assert_eq!(band(0.199), vec![Warning::ModerateMargin(0.199)]);
        assert!(band(0.20).is_empty());
    }

    #[test]
    fn test_profitability_comes_last() {
        let inputs = ResolvedInputs {
            far_ratio: 7.0,
            ..sane_inputs()
        };
        let warnings = collect_warnings(&inputs, None, Some(-0.2));
        let severities: Vec<Severity> = warnings.iter().map(Warning::severity).collect();
        assert_eq!(
            severities,
            vec![Severity::Unusual, Severity::Note, Severity::Profitability]
        );
    }

    #[test]
    fn test_warning_serializes_code_severity_message() {
        let value = serde_json::to_value(Warning::LowMargin(0.05)).unwrap();
        assert_eq!(value["code"], "low_margin");
        assert_eq!(value["severity"], "profitability");
        assert_eq!(value["message"], "Gross margin 5.0% is below 10% (low).");
    }
}

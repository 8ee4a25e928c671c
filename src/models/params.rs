use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use super::{Category, HousingClass, ParkingType};
use crate::error::FeasibilityError;

/// Canonical field names of a scenario.
pub mod fields {
    pub const LAND_AREA_M2: &str = "land_area_m2";
    pub const FAR_RATIO: &str = "far_ratio";
    pub const SELLABLE_AREA_COEFFICIENT: &str = "sellable_area_coefficient";
    pub const PARKING_TYPE: &str = "parking_type";
    pub const PARKING_COEFFICIENT: &str = "parking_coefficient";
    pub const HOUSING_CLASS: &str = "housing_class";
    pub const CONSTRUCTION_COST_USD_PER_M2: &str = "construction_cost_usd_per_m2";
    pub const LAND_VALUE_USD: &str = "land_value_usd";
    pub const AVERAGE_UNIT_M2: &str = "average_unit_m2";
    pub const SALE_PRICE_USD_PER_M2: &str = "sale_price_usd_per_m2";

    /// Fields that must be supplied before a scenario can be computed, in the
    /// order they should be asked for.
    pub const MANDATORY: [&str; 5] = [
        LAND_AREA_M2,
        FAR_RATIO,
        PARKING_TYPE,
        HOUSING_CLASS,
        LAND_VALUE_USD,
    ];
}

/// One feasibility scenario for a single land parcel.
///
/// Every field is optional: a scenario is built up incrementally and only
/// needs the mandatory fields to be computed. Keys that are not recognized
/// are carried in `extra` untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParameterSet {
    /// Land parcel area in m²
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub land_area_m2: Option<f64>,
    /// Floor-area ratio (emsal)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub far_ratio: Option<f64>,
    /// Zoning floor area to sellable area factor
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sellable_area_coefficient: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parking_type: Option<Category<ParkingType>>,
    /// Sellable area to gross construction area factor
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parking_coefficient: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub housing_class: Option<Category<HousingClass>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub construction_cost_usd_per_m2: Option<f64>,
    /// Total land value in USD
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub land_value_usd: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub average_unit_m2: Option<f64>,
    /// Expected sale price; absent means cost-only mode
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sale_price_usd_per_m2: Option<f64>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl ParameterSet {
    /// Create an empty scenario.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a field holds a usable value.
    pub fn has_field(&self, name: &str) -> bool {
        match name {
            fields::LAND_AREA_M2 => self.land_area_m2.is_some(),
            fields::FAR_RATIO => self.far_ratio.is_some(),
            fields::SELLABLE_AREA_COEFFICIENT => self.sellable_area_coefficient.is_some(),
            fields::PARKING_TYPE => category_present(&self.parking_type),
            fields::PARKING_COEFFICIENT => self.parking_coefficient.is_some(),
            fields::HOUSING_CLASS => category_present(&self.housing_class),
            fields::CONSTRUCTION_COST_USD_PER_M2 => self.construction_cost_usd_per_m2.is_some(),
            fields::LAND_VALUE_USD => self.land_value_usd.is_some(),
            fields::AVERAGE_UNIT_M2 => self.average_unit_m2.is_some(),
            fields::SALE_PRICE_USD_PER_M2 => self.sale_price_usd_per_m2.is_some(),
            other => self.extra.get(other).is_some_and(|v| !v.is_null()),
        }
    }

    /// Present fields as `(name, display value)` pairs in declaration order,
    /// followed by pass-through keys.
    pub fn entries(&self) -> Vec<(String, String)> {
        let numbers = [
            (fields::LAND_AREA_M2, self.land_area_m2),
            (fields::FAR_RATIO, self.far_ratio),
            (fields::SELLABLE_AREA_COEFFICIENT, self.sellable_area_coefficient),
        ];
        let mut entries: Vec<(String, String)> = numbers
            .iter()
            .filter_map(|(k, v)| v.map(|v| (k.to_string(), v.to_string())))
            .collect();
        if let Some(pt) = &self.parking_type {
            entries.push((fields::PARKING_TYPE.to_string(), pt.to_string()));
        }
        if let Some(v) = self.parking_coefficient {
            entries.push((fields::PARKING_COEFFICIENT.to_string(), v.to_string()));
        }
        if let Some(hc) = &self.housing_class {
            entries.push((fields::HOUSING_CLASS.to_string(), hc.to_string()));
        }
        let rest = [
            (
                fields::CONSTRUCTION_COST_USD_PER_M2,
                self.construction_cost_usd_per_m2,
            ),
            (fields::LAND_VALUE_USD, self.land_value_usd),
            (fields::AVERAGE_UNIT_M2, self.average_unit_m2),
            (fields::SALE_PRICE_USD_PER_M2, self.sale_price_usd_per_m2),
        ];
        entries.extend(
            rest.iter()
                .filter_map(|(k, v)| v.map(|v| (k.to_string(), v.to_string()))),
        );
        entries.extend(self.extra.iter().map(|(k, v)| (k.clone(), v.to_string())));
        entries
    }
}

fn category_present<T>(value: &Option<Category<T>>) -> bool {
    match value {
        Some(Category::Unrecognized(raw)) => !raw.trim().is_empty(),
        Some(Category::Known(_)) => true,
        None => false,
    }
}

/// A single field update inside a [`ParameterPatch`].
#[derive(Debug, Clone, PartialEq)]
pub enum PatchField<T> {
    /// Key absent from the patch: leave the current value alone.
    Keep,
    /// Explicit `null` or empty string: drop the current value.
    Clear,
    Set(T),
}

impl<T> Default for PatchField<T> {
    fn default() -> Self {
        PatchField::Keep
    }
}

impl<T> PatchField<T> {
    /// Apply this update to a scenario field.
    pub fn apply_to(self, target: &mut Option<T>) {
        match self {
            PatchField::Keep => {}
            PatchField::Clear => *target = None,
            PatchField::Set(value) => *target = Some(value),
        }
    }

    pub fn is_keep(&self) -> bool {
        matches!(self, PatchField::Keep)
    }
}

/// A partial scenario update, as produced by a form submission or by the
/// structured-extraction step of a conversation turn.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParameterPatch {
    pub land_area_m2: PatchField<f64>,
    pub far_ratio: PatchField<f64>,
    pub sellable_area_coefficient: PatchField<f64>,
    pub parking_type: PatchField<Category<ParkingType>>,
    pub parking_coefficient: PatchField<f64>,
    pub housing_class: PatchField<Category<HousingClass>>,
    pub construction_cost_usd_per_m2: PatchField<f64>,
    pub land_value_usd: PatchField<f64>,
    pub average_unit_m2: PatchField<f64>,
    pub sale_price_usd_per_m2: PatchField<f64>,
    pub extra: BTreeMap<String, PatchField<Value>>,
}

impl ParameterPatch {
    /// Build a patch from a JSON object.
    ///
    /// Numbers may be given as JSON numbers or numeric strings. `null` and
    /// empty strings clear the field.
    pub fn from_json(value: &Value) -> Result<Self, FeasibilityError> {
        let obj = value.as_object().ok_or_else(|| {
            FeasibilityError::ParseError("Patch must be a JSON object".to_string())
        })?;

        let mut patch = ParameterPatch::default();
        for (key, v) in obj {
            match key.as_str() {
                fields::LAND_AREA_M2 => patch.land_area_m2 = number_field(key, v)?,
                fields::FAR_RATIO => patch.far_ratio = number_field(key, v)?,
                fields::SELLABLE_AREA_COEFFICIENT => {
                    patch.sellable_area_coefficient = number_field(key, v)?
                }
                fields::PARKING_TYPE => patch.parking_type = category_field(key, v)?,
                fields::PARKING_COEFFICIENT => patch.parking_coefficient = number_field(key, v)?,
                fields::HOUSING_CLASS => patch.housing_class = category_field(key, v)?,
                fields::CONSTRUCTION_COST_USD_PER_M2 => {
                    patch.construction_cost_usd_per_m2 = number_field(key, v)?
                }
                fields::LAND_VALUE_USD => patch.land_value_usd = number_field(key, v)?,
                fields::AVERAGE_UNIT_M2 => patch.average_unit_m2 = number_field(key, v)?,
                fields::SALE_PRICE_USD_PER_M2 => {
                    patch.sale_price_usd_per_m2 = number_field(key, v)?
                }
                _ => {
                    let update = if is_blank(v) {
                        PatchField::Clear
                    } else {
                        PatchField::Set(v.clone())
                    };
                    patch.extra.insert(key.clone(), update);
                }
            }
        }
        Ok(patch)
    }

    /// Whether the patch changes nothing.
    pub fn is_empty(&self) -> bool {
        self.land_area_m2.is_keep()
            && self.far_ratio.is_keep()
            && self.sellable_area_coefficient.is_keep()
            && self.parking_type.is_keep()
            && self.parking_coefficient.is_keep()
            && self.housing_class.is_keep()
            && self.construction_cost_usd_per_m2.is_keep()
            && self.land_value_usd.is_keep()
            && self.average_unit_m2.is_keep()
            && self.sale_price_usd_per_m2.is_keep()
            && self.extra.values().all(PatchField::is_keep)
    }

    /// Overlay this patch onto a scenario, without resolving defaults.
    pub fn apply_to(self, params: &mut ParameterSet) {
        self.land_area_m2.apply_to(&mut params.land_area_m2);
        self.far_ratio.apply_to(&mut params.far_ratio);
        self.sellable_area_coefficient
            .apply_to(&mut params.sellable_area_coefficient);
        self.parking_type.apply_to(&mut params.parking_type);
        self.parking_coefficient
            .apply_to(&mut params.parking_coefficient);
        self.housing_class.apply_to(&mut params.housing_class);
        self.construction_cost_usd_per_m2
            .apply_to(&mut params.construction_cost_usd_per_m2);
        self.land_value_usd.apply_to(&mut params.land_value_usd);
        self.average_unit_m2.apply_to(&mut params.average_unit_m2);
        self.sale_price_usd_per_m2
            .apply_to(&mut params.sale_price_usd_per_m2);
        for (key, update) in self.extra {
            match update {
                PatchField::Keep => {}
                PatchField::Clear => {
                    params.extra.remove(&key);
                }
                PatchField::Set(value) => {
                    params.extra.insert(key, value);
                }
            }
        }
    }
}

impl<'de> Deserialize<'de> for ParameterPatch {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        ParameterPatch::from_json(&value).map_err(serde::de::Error::custom)
    }
}

fn is_blank(v: &Value) -> bool {
    match v {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        _ => false,
    }
}

fn number_field(key: &str, v: &Value) -> Result<PatchField<f64>, FeasibilityError> {
    if is_blank(v) {
        return Ok(PatchField::Clear);
    }
    let parsed = match v {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    match parsed {
        Some(n) if n.is_finite() => Ok(PatchField::Set(n)),
        _ => Err(FeasibilityError::ParseError(format!(
            "Field '{key}' expects a number, got {v}"
        ))),
    }
}

fn category_field<T: std::str::FromStr>(
    key: &str,
    v: &Value,
) -> Result<PatchField<Category<T>>, FeasibilityError> {
    if is_blank(v) {
        return Ok(PatchField::Clear);
    }
    match v {
        Value::String(s) => Ok(PatchField::Set(Category::parse(s.trim()))),
        _ => Err(FeasibilityError::ParseError(format!(
            "Field '{key}' expects a string, got {v}"
        ))),
    }
}

use crate::models::{fields, Defaults, ParameterPatch, ParameterSet};

/// Fill in category-dependent defaults using the built-in default table.
///
/// # Examples
///
/// ```
/// use feasibility_calculator::analysis::resolve;
/// use feasibility_calculator::models::{HousingClass, ParameterSet, ParkingType};
///
/// let raw = ParameterSet {
///     parking_type: Some(ParkingType::Enclosed.into()),
///     housing_class: Some(HousingClass::Mid.into()),
///     ..Default::default()
/// };
/// let resolved = resolve(&raw);
/// assert_eq!(resolved.parking_coefficient, Some(1.60));
/// assert_eq!(resolved.construction_cost_usd_per_m2, Some(900.0));
/// assert_eq!(resolved.sellable_area_coefficient, Some(1.25));
/// ```
pub fn resolve(raw: &ParameterSet) -> ParameterSet {
    resolve_with(raw, &Defaults::default())
}

/// Fill in defaults from a custom table.
///
/// Only absent fields are filled. A parking coefficient or construction cost
/// that is already set is never replaced, and nothing is derived from a
/// category value that is not recognized.
pub fn resolve_with(raw: &ParameterSet, defaults: &Defaults) -> ParameterSet {
    let mut out = raw.clone();

    out.sellable_area_coefficient
        .get_or_insert(defaults.sellable_area_coefficient);
    out.average_unit_m2.get_or_insert(defaults.average_unit_m2);

    if out.parking_coefficient.is_none() {
        if let Some(pt) = out.parking_type.as_ref().and_then(|c| c.known()) {
            out.parking_coefficient = Some(defaults.parking_coefficient_for(pt));
        }
    }

    if out.construction_cost_usd_per_m2.is_none() {
        if let Some(class) = out.housing_class.as_ref().and_then(|c| c.known()) {
            out.construction_cost_usd_per_m2 = Some(defaults.construction_cost_for(class));
        }
    }

    out
}

/// Overlay a patch onto the current scenario, then resolve defaults again.
pub fn merge(current: &ParameterSet, patch: &ParameterPatch) -> ParameterSet {
    merge_with(current, patch, &Defaults::default())
}

/// [`merge`] with a custom default table.
pub fn merge_with(
    current: &ParameterSet,
    patch: &ParameterPatch,
    defaults: &Defaults,
) -> ParameterSet {
    let mut merged = current.clone();
    patch.clone().apply_to(&mut merged);
    resolve_with(&merged, defaults)
}

/// Mandatory fields the scenario still lacks, in the order they should be asked for.
pub fn missing_fields(params: &ParameterSet) -> Vec<&'static str> {
    fields::MANDATORY
        .iter()
        .copied()
        .filter(|f| !params.has_field(f))
        .collect()
}

/// Whether every mandatory field is present.
pub fn is_complete(params: &ParameterSet) -> bool {
    missing_fields(params).is_empty()
}

#![no_main]

use feasibility_calculator::analysis::{compute, merge};
use feasibility_calculator::models::{ParameterPatch, ParameterSet};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(value) = serde_json::from_slice::<serde_json::Value>(data) else {
        return;
    };
    if let Ok(patch) = ParameterPatch::from_json(&value) {
        let params = merge(&ParameterSet::new(), &patch);
        let _ = compute(&params, Some(30.0));
    }
});

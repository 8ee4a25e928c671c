//! Incremental updates: build a scenario over several turns, the way a form
//! or a conversation fills it in, and compute once it is complete.
//!
//! Run from the project root:
//!   cargo run --example multi_turn_merge

use feasibility_calculator::analysis::{compute, merge, missing_fields};
use feasibility_calculator::models::{ParameterPatch, ParameterSet};
use feasibility_calculator::visualization::{
    print_missing_fields, print_outputs_table, print_parameters_table,
};
use serde_json::json;

fn main() {
    let turns = [
        json!({"land_area_m2": "5000", "parking_type": "kapali"}),
        json!({"far_ratio": 1.8, "housing_class": "MID"}),
        json!({"land_value_usd": 2000000}),
        json!({"sale_price_usd_per_m2": 2200}),
        // Switching class keeps the cost already in effect
        json!({"housing_class": "HIGH"}),
        // Clearing the cost brings back the class default
        json!({"construction_cost_usd_per_m2": null}),
    ];

    let mut params = ParameterSet::new();
    for (i, turn) in turns.iter().enumerate() {
        println!("\nTurn {}: {turn}", i + 1);
        let patch = ParameterPatch::from_json(turn).expect("valid patch");
        params = merge(&params, &patch);

        let missing = missing_fields(&params);
        if !missing.is_empty() {
            print_missing_fields(&missing);
            continue;
        }

        print_parameters_table(&params);
        match compute(&params, None) {
            Ok(result) => print_outputs_table(&result.outputs),
            Err(e) => eprintln!("Could not compute: {e}"),
        }
    }
}

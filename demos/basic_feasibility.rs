//! Basic example: load a scenario file, compute feasibility, and display results.
//!
//! Run from the project root:
//!   cargo run --example basic_feasibility

use std::path::Path;

use feasibility_calculator::analysis::Study;
use feasibility_calculator::io::{JsonFormat, ScenarioReader};
use feasibility_calculator::visualization::{
    print_outputs_table, print_parameters_table, print_warnings,
};

fn main() {
    let path = Path::new("data/samples/reference.json");
    let reader = JsonFormat::default();

    let params = reader.read(path).expect("Failed to read scenario file");
    print_parameters_table(&params);

    // Without an exchange rate the TRY column stays empty
    let study = Study::new(&params);
    match study.feasibility() {
        Ok(result) => {
            print_outputs_table(&result.outputs);
            print_warnings(&result.warnings);
        }
        Err(e) => eprintln!("Could not compute feasibility: {e}"),
    }

    let result = study
        .with_exchange_rate(Some(34.0))
        .feasibility()
        .expect("scenario is complete");
    print_outputs_table(&result.outputs);
}

//! Sensitivity example: profit under ±10% sale price and construction cost,
//! exported to CSV.
//!
//! Run from the project root:
//!   cargo run --example sensitivity_grid

use feasibility_calculator::analysis::sensitivity;
use feasibility_calculator::io::{read_toml, write_grid_csv};
use feasibility_calculator::visualization::{print_margin_chart, print_sensitivity_table};

fn main() {
    let mut params = read_toml("data/samples/reference.toml").expect("Failed to read scenario");
    params.sale_price_usd_per_m2 = Some(2200.0);

    let grid = sensitivity(&params, Some(34.0)).expect("scenario is complete");
    print_sensitivity_table(&grid);
    print_margin_chart(&grid);

    let out = std::env::temp_dir().join("sensitivity_grid.csv");
    match write_grid_csv(&grid, &out) {
        Ok(()) => println!("Grid written to {}", out.display()),
        Err(e) => eprintln!("Could not write grid: {e}"),
    }
}

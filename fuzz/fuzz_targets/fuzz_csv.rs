#![no_main]

use feasibility_calculator::io::{read_csv_from_bytes, run_batch};
use feasibility_calculator::models::Defaults;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(scenarios) = read_csv_from_bytes(data) {
        let _ = run_batch(&scenarios, None, &Defaults::default());
    }
});

mod charts;
mod tables;

pub use charts::{format_margin_chart, print_margin_chart};
pub use tables::{
    format_batch_table, print_batch_table,
    format_defaults_table, print_defaults_table,
    format_missing_fields, print_missing_fields,
    format_outputs_table, print_outputs_table,
    format_parameters_table, print_parameters_table,
    format_sensitivity_table, print_sensitivity_table,
    format_warnings, print_warnings,
};

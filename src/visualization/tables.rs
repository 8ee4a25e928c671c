use colored::Colorize;
use comfy_table::{
    modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL, Cell, ContentArrangement, Table,
};

use crate::analysis::{Severity, SensitivityGrid, Warning};
use crate::io::BatchRow;
use crate::models::{Defaults, Outputs, ParameterSet};

fn new_table(header: Vec<&str>) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header);
    table
}

/// Group the integer part of a number in thousands: `1234567.8` -> `1,234,567.80`.
pub(crate) fn grouped(value: f64, decimals: usize) -> String {
    let formatted = format!("{:.*}", decimals, value.abs());
    let (int_part, frac_part) = match formatted.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (formatted.as_str(), None),
    };
    let mut out = String::new();
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    if let Some(f) = frac_part {
        out.push('.');
        out.push_str(f);
    }
    if value < 0.0 && formatted.chars().any(|c| c != '0' && c != '.') {
        out.insert(0, '-');
    }
    out
}

fn opt_grouped(value: Option<f64>, decimals: usize) -> String {
    value.map(|v| grouped(v, decimals)).unwrap_or_else(|| "-".to_string())
}

/// Format the scenario's parameters as a string.
pub fn format_parameters_table(params: &ParameterSet) -> String {
    let mut output = String::new();
    output.push_str(&format!("\n{}\n", "Scenario Parameters".bold().green()));
    output.push_str(&format!("{}\n", "=".repeat(50)));

    let entries = params.entries();
    if entries.is_empty() {
        output.push_str("  No parameters set.\n");
        return output;
    }

    let mut table = new_table(vec!["Parameter", "Value"]);
    for (name, value) in entries {
        table.add_row(vec![Cell::new(name), Cell::new(value)]);
    }

    output.push_str(&format!("{table}"));
    output
}

/// Print the scenario's parameters.
pub fn print_parameters_table(params: &ParameterSet) {
    print!("{}", format_parameters_table(params));
}

/// Format computed outputs as a string. A TRY column is shown when the
/// outputs were converted with an exchange rate.
pub fn format_outputs_table(outputs: &Outputs) -> String {
    let mut output = String::new();
    output.push_str(&format!("\n{}\n", "Feasibility".bold().green()));
    if let Some(rate) = outputs.exchange_rate {
        output.push_str(&format!("{}\n", format!("USD/TRY rate: {rate}").dimmed()));
    }
    output.push_str(&format!("{}\n", "=".repeat(60)));

    let mut areas = new_table(vec!["Metric", "Value", "Unit"]);
    let area_rows = [
        ("Zoning Floor Area", outputs.zoning_floor_area_m2),
        ("Sellable Area", outputs.sellable_area_m2),
        ("Gross Construction Area", outputs.gross_construction_area_m2),
        ("Leftover Sellable Area", outputs.leftover_sellable_area_m2),
    ];
    for (label, value) in area_rows {
        areas.add_row(vec![Cell::new(label), Cell::new(grouped(value, 1)), Cell::new("m²")]);
    }
    areas.add_row(vec![
        Cell::new("Units"),
        Cell::new(outputs.unit_count.to_string()),
        Cell::new(""),
    ]);
    output.push_str(&format!("{areas}\n"));

    let with_try = outputs.exchange_rate.is_some();
    let mut header = vec!["Item", "USD"];
    if with_try {
        header.push("TRY");
    }
    let mut money = new_table(header);

    let mut add = |label: String, usd: Option<f64>, try_value: Option<f64>| {
        let mut row = vec![Cell::new(label), Cell::new(opt_grouped(usd, 2))];
        if with_try {
            row.push(Cell::new(opt_grouped(try_value, 2)));
        }
        money.add_row(row);
    };

    add(
        "Construction Cost".to_string(),
        Some(outputs.construction_cost_usd),
        outputs.construction_cost_try,
    );
    add("Land Value".to_string(), Some(outputs.land_value_usd), outputs.land_value_try);
    add(
        "Total Project Cost".to_string(),
        Some(outputs.total_project_cost_usd),
        outputs.total_project_cost_try,
    );
    add(
        "Break-even Price /m²".to_string(),
        Some(outputs.breakeven_price_usd_per_m2),
        outputs.breakeven_price_try_per_m2,
    );
    for (margin, usd, try_value) in outputs.target_prices() {
        add(
            format!("Price for {:.0}% Margin /m²", margin * 100.0),
            Some(usd),
            try_value,
        );
    }
    if outputs.is_revenue_mode() {
        add("Revenue".to_string(), outputs.revenue_usd, outputs.revenue_try);
        add("Profit".to_string(), outputs.profit_usd, outputs.profit_try);
    }
    output.push_str(&format!("{money}\n"));

    match outputs.gross_margin {
        Some(margin) => {
            let text = format!("Gross Margin: {:.1}%", margin * 100.0);
            let colored = if margin < 0.0 {
                text.red()
            } else if margin < 0.20 {
                text.yellow()
            } else {
                text.green()
            };
            output.push_str(&format!("{}\n", colored.bold()));
        }
        None => {
            output.push_str(&format!(
                "{}\n",
                "No sale price given: cost-only analysis.".dimmed()
            ));
        }
    }

    output
}

/// Print computed outputs.
pub fn print_outputs_table(outputs: &Outputs) {
    print!("{}", format_outputs_table(outputs));
}

/// Format warnings as a bulleted list, colored by severity.
pub fn format_warnings(warnings: &[Warning]) -> String {
    let mut output = String::new();
    if warnings.is_empty() {
        return output;
    }
    output.push_str(&format!("\n{}\n", "Warnings".bold().yellow()));
    for warning in warnings {
        let line = format!("  - {warning}");
        let line = match warning.severity() {
            Severity::Invalid => line.red(),
            Severity::Unusual | Severity::Profitability => line.yellow(),
            Severity::Note => line.dimmed(),
        };
        output.push_str(&format!("{line}\n"));
    }
    output
}

/// Print warnings.
pub fn print_warnings(warnings: &[Warning]) {
    print!("{}", format_warnings(warnings));
}

/// Format the sensitivity grid: one row per construction-cost multiplier,
/// one column per sale-price multiplier.
pub fn format_sensitivity_table(grid: &SensitivityGrid) -> String {
    let mut output = String::new();
    output.push_str(&format!("\n{}\n", "Sensitivity (profit USD, margin)".bold().green()));
    output.push_str(&format!("{}\n", "=".repeat(60)));

    if grid.is_empty() {
        output.push_str("  Sensitivity requires a sale price.\n");
        return output;
    }

    let header_cells: Vec<String> = std::iter::once("Cost \\ Sale".to_string())
        .chain(grid.sale_multipliers.iter().map(|m| multiplier_label(*m)))
        .collect();
    let mut table = new_table(header_cells.iter().map(String::as_str).collect());

    for row in &grid.cells {
        let Some(first) = row.first() else {
            continue;
        };
        let mut cells = vec![Cell::new(multiplier_label(first.cost_multiplier))];
        for cell in row {
            cells.push(Cell::new(format!(
                "{} ({:.1}%)",
                grouped(cell.profit_usd, 0),
                cell.gross_margin * 100.0
            )));
        }
        table.add_row(cells);
    }

    output.push_str(&format!("{table}\n"));
    output
}

fn multiplier_label(multiplier: f64) -> String {
    let pct = ((multiplier - 1.0) * 100.0).round();
    if pct == 0.0 {
        "base".to_string()
    } else {
        format!("{pct:+.0}%")
    }
}

/// Print the sensitivity grid.
pub fn print_sensitivity_table(grid: &SensitivityGrid) {
    print!("{}", format_sensitivity_table(grid));
}

/// Format the list of mandatory fields still needed.
pub fn format_missing_fields(missing: &[&str]) -> String {
    let mut output = String::new();
    if missing.is_empty() {
        return output;
    }
    output.push_str(&format!("\n{}\n", "Missing Fields".bold().red()));
    for field in missing {
        output.push_str(&format!("  - {field}\n"));
    }
    output
}

/// Print the list of missing fields.
pub fn print_missing_fields(missing: &[&str]) {
    print!("{}", format_missing_fields(missing));
}

/// Format the default table used to fill absent parameters.
pub fn format_defaults_table(defaults: &Defaults) -> String {
    let mut output = String::new();
    output.push_str(&format!("\n{}\n", "Default Assumptions".bold().green()));
    output.push_str(&format!("{}\n", "=".repeat(50)));

    let mut table = new_table(vec!["Assumption", "Value", "Unit"]);
    let rows = [
        ("Sellable Area Coefficient", defaults.sellable_area_coefficient, ""),
        ("Parking Coefficient (open)", defaults.parking_coefficient.open, ""),
        ("Parking Coefficient (enclosed)", defaults.parking_coefficient.enclosed, ""),
        ("Construction Cost (low)", defaults.construction_cost_usd_per_m2.low, "USD/m²"),
        ("Construction Cost (mid)", defaults.construction_cost_usd_per_m2.mid, "USD/m²"),
        ("Construction Cost (high)", defaults.construction_cost_usd_per_m2.high, "USD/m²"),
        ("Average Unit Size", defaults.average_unit_m2, "m²"),
    ];
    for (label, value, unit) in rows {
        table.add_row(vec![Cell::new(label), Cell::new(value.to_string()), Cell::new(unit)]);
    }

    output.push_str(&format!("{table}\n"));
    output
}

/// Print the default table.
pub fn print_defaults_table(defaults: &Defaults) {
    print!("{}", format_defaults_table(defaults));
}

/// Format a batch summary table.
pub fn format_batch_table(rows: &[BatchRow]) -> String {
    let mut output = String::new();
    output.push_str(&format!("\n{}\n", "Batch Results".bold().green()));
    output.push_str(&format!("{}\n", "=".repeat(70)));

    let mut table = new_table(vec![
        "Scenario",
        "Status",
        "Units",
        "Total Cost USD",
        "Break-even /m²",
        "Profit USD",
        "Margin",
    ]);
    for row in rows {
        table.add_row(vec![
            Cell::new(&row.name),
            Cell::new(&row.status),
            Cell::new(row.unit_count.map(|u| u.to_string()).unwrap_or_else(|| "-".to_string())),
            Cell::new(opt_grouped(row.total_project_cost_usd, 0)),
            Cell::new(opt_grouped(row.breakeven_price_usd_per_m2, 2)),
            Cell::new(opt_grouped(row.profit_usd, 0)),
            Cell::new(
                row.gross_margin
                    .map(|m| format!("{:.1}%", m * 100.0))
                    .unwrap_or_else(|| "-".to_string()),
            ),
        ]);
    }

    output.push_str(&format!("{table}\n"));
    output
}

/// Print a batch summary table.
pub fn print_batch_table(rows: &[BatchRow]) {
    print!("{}", format_batch_table(rows));
}

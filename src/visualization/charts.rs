use colored::Colorize;

use crate::analysis::SensitivityGrid;

/// Format a text bar chart of gross margin for each sensitivity cell.
pub fn format_margin_chart(grid: &SensitivityGrid) -> String {
    let mut output = String::new();
    output.push_str(&format!("\n{}\n", "Margin by Scenario".bold().green()));
    output.push_str(&format!("{}\n", "=".repeat(60)));

    if grid.is_empty() {
        output.push_str("  No data available.\n");
        return output;
    }

    let max_abs = grid
        .cells
        .iter()
        .flatten()
        .map(|c| c.gross_margin.abs())
        .fold(0.0f64, f64::max);

    let bar_width = 40;

    output.push_str(&format!(
        "  {:>6}  {:>6}  {:>8}  Margin\n",
        "Cost", "Sale", "Margin %"
    ));
    output.push_str(&format!("  {}\n", "-".repeat(70)));

    for cell in grid.cells.iter().flatten() {
        let bar_len = if max_abs > 0.0 {
            ((cell.gross_margin.abs() / max_abs) * bar_width as f64).round() as usize
        } else {
            0
        };

        let bar = "\u{2588}".repeat(bar_len);
        let bar = if cell.gross_margin < 0.0 {
            bar.red()
        } else {
            bar.green()
        };

        output.push_str(&format!(
            "  {:>5.0}%  {:>5.0}%  {:>8.1}  {}\n",
            cell.cost_multiplier * 100.0,
            cell.sale_multiplier * 100.0,
            cell.gross_margin * 100.0,
            bar
        ));
    }

    output.push('\n');
    output
}

/// Print a text bar chart of gross margin per sensitivity cell.
pub fn print_margin_chart(grid: &SensitivityGrid) {
    print!("{}", format_margin_chart(grid));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{SensitivityCell, MULTIPLIERS};
    use crate::models::Outputs;

    fn grid_with(cells: Vec<Vec<SensitivityCell>>) -> SensitivityGrid {
        let base: Outputs = serde_json::from_value(serde_json::json!({
            "zoning_floor_area_m2": 0.0,
            "sellable_area_m2": 0.0,
            "gross_construction_area_m2": 0.0,
            "construction_cost_usd": 0.0,
            "construction_cost_try": null,
            "land_value_usd": 0.0,
            "land_value_try": null,
            "total_project_cost_usd": 0.0,
            "total_project_cost_try": null,
            "unit_count": 0,
            "leftover_sellable_area_m2": 0.0,
            "breakeven_price_usd_per_m2": 0.0,
            "breakeven_price_try_per_m2": null,
            "target_price_10_usd_per_m2": 0.0,
            "target_price_10_try_per_m2": null,
            "target_price_30_usd_per_m2": 0.0,
            "target_price_30_try_per_m2": null,
            "target_price_50_usd_per_m2": 0.0,
            "target_price_50_try_per_m2": null,
            "revenue_usd": null,
            "revenue_try": null,
            "profit_usd": null,
            "profit_try": null,
            "gross_margin": null,
            "exchange_rate": null
        }))
        .unwrap();
        SensitivityGrid {
            base,
            cost_multipliers: MULTIPLIERS.to_vec(),
            sale_multipliers: MULTIPLIERS.to_vec(),
            cells,
        }
    }

    #[test]
    fn test_format_margin_chart_empty() {
        let output = format_margin_chart(&grid_with(vec![]));
        assert!(output.contains("No data available."));
        assert!(output.contains("Margin by Scenario"));
    }

    #[test]
    fn test_format_margin_chart_with_data() {
        let cells = vec![vec![
            SensitivityCell {
                cost_multiplier: 0.9,
                sale_multiplier: 1.1,
                profit_usd: 500_000.0,
                profit_try: None,
                gross_margin: 0.25,
            },
            SensitivityCell {
                cost_multiplier: 1.1,
                sale_multiplier: 0.9,
                profit_usd: -100_000.0,
                profit_try: None,
                gross_margin: -0.05,
            },
        ]];
        let output = format_margin_chart(&grid_with(cells));
        assert!(output.contains("Margin %"));
        assert!(output.contains("25.0"));
        assert!(output.contains("-5.0"));
        assert!(output.contains("\u{2588}"));
    }
}

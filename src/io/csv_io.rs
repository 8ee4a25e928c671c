use std::io::{Read, Write};
use std::path::Path;

use serde::Serialize;

use crate::analysis::{compute_with, Feasibility, SensitivityGrid};
use crate::error::FeasibilityError;
use crate::models::{Defaults, ParameterPatch, ParameterSet};

/// Column holding a scenario's label in a batch file.
pub const NAME_COLUMN: &str = "name";

/// A labelled scenario read from one CSV row. Defaults are not resolved yet.
#[derive(Debug, Clone, PartialEq)]
pub struct NamedScenario {
    pub name: String,
    pub params: ParameterSet,
}

fn parse_csv_records<R: Read>(
    rdr: &mut csv::Reader<R>,
) -> Result<Vec<NamedScenario>, FeasibilityError> {
    let headers = rdr.headers()?.clone();
    let mut scenarios = Vec::new();

    for (index, result) in rdr.records().enumerate() {
        let record = result?;
        let mut name = None;
        let mut obj = serde_json::Map::new();
        for (header, cell) in headers.iter().zip(record.iter()) {
            if header == NAME_COLUMN {
                name = Some(cell.to_string()).filter(|s| !s.is_empty());
                continue;
            }
            if !cell.is_empty() {
                obj.insert(header.to_string(), serde_json::Value::String(cell.to_string()));
            }
        }

        let patch = ParameterPatch::from_json(&serde_json::Value::Object(obj)).map_err(|e| {
            FeasibilityError::ParseError(format!("Row {}: {e}", index + 1))
        })?;
        let mut params = ParameterSet::new();
        patch.apply_to(&mut params);

        scenarios.push(NamedScenario {
            name: name.unwrap_or_else(|| format!("scenario-{}", index + 1)),
            params,
        });
    }

    Ok(scenarios)
}

/// Read one scenario per row from a CSV file. Empty cells leave a field unset.
pub fn read_csv(path: impl AsRef<Path>) -> Result<Vec<NamedScenario>, FeasibilityError> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_path(path.as_ref())?;
    parse_csv_records(&mut rdr)
}

/// Read scenarios from CSV bytes.
pub fn read_csv_from_bytes(data: &[u8]) -> Result<Vec<NamedScenario>, FeasibilityError> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(data);
    parse_csv_records(&mut rdr)
}

/// One summary row of a batch run.
#[derive(Debug, Clone, Serialize)]
pub struct BatchRow {
    pub name: String,
    pub status: String,
    pub sellable_area_m2: Option<f64>,
    pub unit_count: Option<u64>,
    pub total_project_cost_usd: Option<f64>,
    pub breakeven_price_usd_per_m2: Option<f64>,
    pub revenue_usd: Option<f64>,
    pub profit_usd: Option<f64>,
    pub gross_margin: Option<f64>,
    pub warnings: String,
}

impl BatchRow {
    fn from_result(name: &str, result: &Result<Feasibility, FeasibilityError>) -> Self {
        match result {
            Ok(f) => Self {
                name: name.to_string(),
                status: "ok".to_string(),
                sellable_area_m2: Some(f.outputs.sellable_area_m2),
                unit_count: Some(f.outputs.unit_count),
                total_project_cost_usd: Some(f.outputs.total_project_cost_usd),
                breakeven_price_usd_per_m2: Some(f.outputs.breakeven_price_usd_per_m2),
                revenue_usd: f.outputs.revenue_usd,
                profit_usd: f.outputs.profit_usd,
                gross_margin: f.outputs.gross_margin,
                warnings: f
                    .warnings
                    .iter()
                    .map(|w| w.code())
                    .collect::<Vec<_>>()
                    .join(";"),
            },
            Err(e) => Self {
                name: name.to_string(),
                status: e.to_string(),
                sellable_area_m2: None,
                unit_count: None,
                total_project_cost_usd: None,
                breakeven_price_usd_per_m2: None,
                revenue_usd: None,
                profit_usd: None,
                gross_margin: None,
                warnings: String::new(),
            },
        }
    }
}

/// Compute every scenario against `defaults`; incomplete ones are reported in
/// the status column.
pub fn run_batch(
    scenarios: &[NamedScenario],
    exchange_rate: Option<f64>,
    defaults: &Defaults,
) -> Vec<BatchRow> {
    scenarios
        .iter()
        .map(|s| BatchRow::from_result(&s.name, &compute_with(&s.params, exchange_rate, defaults)))
        .collect()
}

fn write_rows<W: Write, T: Serialize>(writer: W, rows: &[T]) -> Result<(), FeasibilityError> {
    let mut wtr = csv::Writer::from_writer(writer);
    for row in rows {
        wtr.serialize(row)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Write batch results to a CSV file.
pub fn write_batch_csv(rows: &[BatchRow], path: impl AsRef<Path>) -> Result<(), FeasibilityError> {
    let file = std::fs::File::create(path.as_ref())?;
    write_rows(file, rows)
}

/// Render the sensitivity grid as CSV, one row per cell.
pub fn grid_to_csv_string(grid: &SensitivityGrid) -> Result<String, FeasibilityError> {
    let cells: Vec<_> = grid.cells.iter().flatten().collect();
    let mut buf = Vec::new();
    write_rows(&mut buf, &cells)?;
    String::from_utf8(buf).map_err(|e| FeasibilityError::ParseError(e.to_string()))
}

/// Write the sensitivity grid to a CSV file.
pub fn write_grid_csv(
    grid: &SensitivityGrid,
    path: impl AsRef<Path>,
) -> Result<(), FeasibilityError> {
    std::fs::write(path.as_ref(), grid_to_csv_string(grid)?)?;
    Ok(())
}

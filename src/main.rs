use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use tracing_subscriber::EnvFilter;

use feasibility_calculator::{
    analysis::{merge_with, missing_fields, resolve_with, Study},
    config::AppConfig,
    io,
    models::{fields, ParameterPatch, ParameterSet},
    rates::FixedRate,
    visualization::{
        print_batch_table, print_defaults_table, print_margin_chart, print_missing_fields,
        print_outputs_table, print_parameters_table, print_sensitivity_table, print_warnings,
    },
};

#[derive(Parser)]
#[command(
    name = "feasibility",
    about = "Residential development feasibility calculator",
    version,
    author
)]
struct Cli {
    /// Configuration file (defaults to ./feasibility.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Scenario fields given on the command line. They override the input file.
#[derive(Args, Debug, Default)]
struct FieldArgs {
    /// Land area in m²
    #[arg(long)]
    land_area: Option<f64>,

    /// Floor-area ratio
    #[arg(long)]
    far: Option<f64>,

    /// Sellable area coefficient
    #[arg(long)]
    sellable_coefficient: Option<f64>,

    /// Parking type: OPEN or ENCLOSED
    #[arg(long)]
    parking_type: Option<String>,

    /// Parking coefficient
    #[arg(long)]
    parking_coefficient: Option<f64>,

    /// Housing class: LOW, MID or HIGH
    #[arg(long)]
    housing_class: Option<String>,

    /// Construction cost in USD per m²
    #[arg(long)]
    construction_cost: Option<f64>,

    /// Land value in USD
    #[arg(long)]
    land_value: Option<f64>,

    /// Average unit size in m²
    #[arg(long)]
    average_unit: Option<f64>,

    /// Sale price in USD per m²
    #[arg(long)]
    sale_price: Option<f64>,
}

impl FieldArgs {
    fn to_patch(&self) -> Result<ParameterPatch> {
        let mut obj = serde_json::Map::new();
        let numbers = [
            (fields::LAND_AREA_M2, self.land_area),
            (fields::FAR_RATIO, self.far),
            (fields::SELLABLE_AREA_COEFFICIENT, self.sellable_coefficient),
            (fields::PARKING_COEFFICIENT, self.parking_coefficient),
            (fields::CONSTRUCTION_COST_USD_PER_M2, self.construction_cost),
            (fields::LAND_VALUE_USD, self.land_value),
            (fields::AVERAGE_UNIT_M2, self.average_unit),
            (fields::SALE_PRICE_USD_PER_M2, self.sale_price),
        ];
        for (name, value) in numbers {
            if let Some(v) = value {
                obj.insert(name.to_string(), serde_json::json!(v));
            }
        }
        let categories = [
            (fields::PARKING_TYPE, &self.parking_type),
            (fields::HOUSING_CLASS, &self.housing_class),
        ];
        for (name, value) in categories {
            if let Some(v) = value {
                obj.insert(name.to_string(), serde_json::Value::String(v.clone()));
            }
        }
        Ok(ParameterPatch::from_json(&serde_json::Value::Object(obj))?)
    }
}

/// Scenario input shared by `compute` and `sensitivity`.
#[derive(Args, Debug)]
struct ScenarioArgs {
    /// Scenario file (JSON or TOML)
    #[arg(short, long)]
    input: Option<PathBuf>,

    #[command(flatten)]
    fields: FieldArgs,

    /// USD to TRY exchange rate (overrides the configured rate)
    #[arg(short, long)]
    rate: Option<f64>,

    /// Print JSON instead of tables
    #[arg(long)]
    json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute feasibility metrics for one scenario
    Compute {
        #[command(flatten)]
        scenario: ScenarioArgs,
    },

    /// Show profit under ±10% changes in sale price and construction cost
    Sensitivity {
        #[command(flatten)]
        scenario: ScenarioArgs,

        /// Also write the grid to a CSV file
        #[arg(long)]
        csv: Option<PathBuf>,

        /// Show a margin bar chart
        #[arg(long)]
        chart: bool,
    },

    /// Apply a partial update to a stored scenario
    Merge {
        /// Current scenario file (JSON or TOML); empty when omitted
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Patch file (JSON or TOML)
        #[arg(short, long)]
        patch: PathBuf,

        /// Where to write the merged scenario; printed when omitted
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Compute every scenario in a CSV file
    Batch {
        /// CSV with one scenario per row
        #[arg(short, long)]
        input: PathBuf,

        /// USD to TRY exchange rate
        #[arg(short, long)]
        rate: Option<f64>,

        /// Write results to a CSV file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show the default assumptions in effect
    Defaults,

    /// Start the JSON API server
    #[cfg(feature = "web")]
    Serve {
        /// Address to bind
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on
        #[arg(short, long)]
        port: Option<u16>,
    },
}

fn load_config(path: Option<&Path>) -> Result<AppConfig> {
    Ok(match path {
        Some(p) => AppConfig::load(p)?,
        None => AppConfig::discover()?,
    })
}

/// Combine the input file and the command-line fields, then resolve defaults.
fn load_scenario(args: &ScenarioArgs, config: &AppConfig) -> Result<ParameterSet> {
    let mut raw = ParameterSet::new();
    if let Some(path) = &args.input {
        io::read_patch(path)?.apply_to(&mut raw);
    }
    args.fields.to_patch()?.apply_to(&mut raw);
    Ok(resolve_with(&raw, &config.defaults))
}

/// The `--rate` flag when given, else the configured rate. A flag that is not
/// a positive, finite number is rejected.
fn effective_rate(flag: Option<f64>, config: &AppConfig) -> Result<Option<f64>> {
    match flag {
        Some(rate) => {
            FixedRate::new(rate, "cli")?;
            Ok(Some(rate))
        }
        None => Ok(config.exchange_rate.as_ref().map(|r| r.rate)),
    }
}

/// Print what is still needed and fail when mandatory fields are absent.
fn ensure_complete(params: &ParameterSet) -> Result<()> {
    let missing = missing_fields(params);
    if missing.is_empty() {
        return Ok(());
    }
    print_missing_fields(&missing);
    anyhow::bail!("scenario is incomplete: {} mandatory field(s) missing", missing.len())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Compute { scenario } => {
            let params = load_scenario(&scenario, &config)?;
            ensure_complete(&params)?;

            let study = Study::new(&params)
                .with_exchange_rate(effective_rate(scenario.rate, &config)?)
                .with_defaults(config.defaults.clone());
            let result = study.feasibility()?;

            if scenario.json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                print_parameters_table(&params);
                print_outputs_table(&result.outputs);
                print_warnings(&result.warnings);
            }
        }

        Commands::Sensitivity {
            scenario,
            csv,
            chart,
        } => {
            let params = load_scenario(&scenario, &config)?;
            ensure_complete(&params)?;

            let study = Study::new(&params)
                .with_exchange_rate(effective_rate(scenario.rate, &config)?)
                .with_defaults(config.defaults.clone());
            let grid = study.sensitivity()?;

            if scenario.json {
                println!("{}", serde_json::to_string_pretty(&grid)?);
            } else {
                print_sensitivity_table(&grid);
                if chart {
                    print_margin_chart(&grid);
                }
            }

            if let Some(path) = csv {
                io::write_grid_csv(&grid, &path)?;
                eprintln!("{} Wrote {}", "Success:".green().bold(), path.display());
            }
        }

        Commands::Merge {
            input,
            patch,
            output,
        } => {
            let current = match &input {
                Some(path) => {
                    let mut raw = ParameterSet::new();
                    io::read_patch(path)?.apply_to(&mut raw);
                    resolve_with(&raw, &config.defaults)
                }
                None => ParameterSet::new(),
            };
            let update = io::read_patch(&patch)?;
            let merged = merge_with(&current, &update, &config.defaults);

            match output {
                Some(path) => {
                    io::write_scenario(&merged, &path)?;
                    println!(
                        "{} Merged {} -> {}",
                        "Success:".green().bold(),
                        patch.display(),
                        path.display()
                    );
                }
                None => println!("{}", serde_json::to_string_pretty(&merged)?),
            }

            let missing = missing_fields(&merged);
            if !missing.is_empty() {
                print_missing_fields(&missing);
            }
        }

        Commands::Batch {
            input,
            rate,
            output,
        } => {
            let scenarios = io::read_csv(&input)?;
            let rate = effective_rate(rate, &config)?;
            let rows = io::run_batch(&scenarios, rate, &config.defaults);
            print_batch_table(&rows);

            if let Some(path) = output {
                io::write_batch_csv(&rows, &path)?;
                println!("{} Wrote {}", "Success:".green().bold(), path.display());
            }
        }

        Commands::Defaults => {
            print_defaults_table(&config.defaults);
        }

        #[cfg(feature = "web")]
        Commands::Serve { host, port } => {
            let mut config = config;
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(feasibility_calculator::web::start_server(config))?;
        }
    }

    Ok(())
}

pub mod commands;
pub mod logging;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use plancast_core::config::{ConfigOverrides, ExportFormat, LoadOptions};

#[derive(Debug, Parser)]
#[command(
    name = "plancast",
    about = "Plancast sales forecast CLI",
    long_about = "Classify product-line trends, project next-year monthly sales per SKU, and export the forecast table.",
    after_help = "Examples:\n  plancast demo --output-dir demo-data\n  plancast trends\n  plancast forecast --growth scenario.toml --format json\n  plancast summary --line Skincare --market EMFRAN\n  plancast doctor --json"
)]
pub struct Cli {
    #[arg(long, global = true, help = "Path to a plancast.toml config file")]
    config: Option<PathBuf>,
    #[arg(long, global = true, help = "Historical sales table (overrides config)")]
    historical: Option<PathBuf>,
    #[arg(long, global = true, help = "Current-year base table (overrides config)")]
    base: Option<PathBuf>,
    #[arg(long, global = true, help = "Year the forecast is produced for")]
    forecast_year: Option<i32>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Classify each product line as evolving, declining or stable")]
    Trends,
    #[command(about = "Project next-year monthly sales per SKU and export the forecast table")]
    Forecast {
        #[arg(long, help = "Scenario TOML with [growth] overrides per market and product line")]
        growth: Option<PathBuf>,
        #[arg(long, help = "Scenario TOML with [seasonality] weights per market")]
        seasonality: Option<PathBuf>,
        #[arg(long, help = "Export format: xlsx (default), csv or json")]
        format: Option<ExportFormat>,
        #[arg(long, help = "Directory the forecast file is written to")]
        output_dir: Option<PathBuf>,
    },
    #[command(about = "Headline totals, market totals per product line, monthly table per market")]
    Summary {
        #[arg(long, help = "Restrict market totals to one product line")]
        line: Option<String>,
        #[arg(long, help = "Restrict the monthly table to one market")]
        market: Option<String>,
    },
    #[command(about = "Write a deterministic demo dataset and forecast it end to end")]
    Demo {
        #[arg(long, default_value = "demo-data", help = "Directory for demo tables and output")]
        output_dir: PathBuf,
    },
    #[command(about = "Inspect effective configuration values with source attribution")]
    Config,
    #[command(about = "Validate config and input table readiness")]
    Doctor {
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
}

impl Cli {
    fn load_options(&self) -> LoadOptions {
        let mut overrides = ConfigOverrides {
            historical_path: self.historical.clone(),
            base_path: self.base.clone(),
            forecast_year: self.forecast_year,
            ..ConfigOverrides::default()
        };
        if let Command::Forecast { growth, seasonality, format, output_dir } = &self.command {
            overrides.growth_path = growth.clone();
            overrides.seasonality_path = seasonality.clone();
            overrides.export_format = *format;
            overrides.output_dir = output_dir.clone();
        }

        LoadOptions {
            config_path: self.config.clone(),
            require_file: self.config.is_some(),
            overrides,
        }
    }
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();
    let options = cli.load_options();

    if let Err(error) = logging::init_from_options(&options) {
        eprintln!("logging disabled: {error:#}");
    }

    let result = match cli.command {
        Command::Trends => commands::trends::run(&options),
        Command::Forecast { .. } => commands::forecast::run(&options),
        Command::Summary { line, market } => {
            commands::summary::run(&options, line.as_deref(), market.as_deref())
        }
        Command::Demo { output_dir } => commands::demo::run(&options, &output_dir),
        Command::Config => {
            commands::CommandResult { exit_code: 0, output: commands::config::run(&options) }
        }
        Command::Doctor { json } => commands::doctor::run(&options, json),
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}

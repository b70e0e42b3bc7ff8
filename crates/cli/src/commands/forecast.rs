use std::path::{Path, PathBuf};

use plancast_core::aggregation::kpi_summary;
use plancast_core::config::{AppConfig, ExportFormat, LoadOptions};
use plancast_core::{
    ApplicationError, ForecastPlan, GrowthRate, KpiSummary, Market, MarketFailure, TrendOutcome,
};
use plancast_ingest::{export_forecast, ExportTable};
use serde::Serialize;

use crate::commands::{load_config, load_inputs, CommandResult, LoadedInputs};

#[derive(Debug, Serialize)]
struct ForecastOutput {
    output_path: PathBuf,
    sheet: String,
    forecast_year: i32,
    prior_year: i32,
    line_count: usize,
    trend_status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    trend_unavailable_reason: Option<String>,
    kpi: KpiSummary,
    growth: Vec<GrowthRate>,
    degenerate_seasonality: Vec<Market>,
    failures: Vec<MarketFailure>,
}

pub fn run(options: &LoadOptions) -> CommandResult {
    let config = match load_config("forecast", options) {
        Ok(config) => config,
        Err(result) => return result,
    };
    let inputs = match load_inputs("forecast", &config) {
        Ok(inputs) => inputs,
        Err(result) => return result,
    };

    forecast_and_export("forecast", &config, &inputs, &config.export.output_dir)
}

/// Plans, writes the forecast table and reports the outcome. A run with failed markets still
/// writes the table for every other market and reports `partial`.
pub(crate) fn forecast_and_export(
    command: &str,
    config: &AppConfig,
    inputs: &LoadedInputs,
    output_dir: &Path,
) -> CommandResult {
    let plan = inputs.plan(config);
    export_plan(
        command,
        &plan,
        config.export.format,
        output_dir,
        inputs.historical_error.clone(),
    )
}

fn export_plan(
    command: &str,
    plan: &ForecastPlan,
    format: ExportFormat,
    output_dir: &Path,
    historical_error: Option<String>,
) -> CommandResult {
    let table = ExportTable::new(&plan.run.lines, plan.prior_year, plan.forecast_year);

    let output_path = match export_forecast(&table, plan.forecast_year, format, output_dir) {
        Ok(path) => path,
        Err(error) => {
            return CommandResult::from_error(command, &ApplicationError::Export(error.to_string()));
        }
    };

    let output = describe(plan, table.sheet, output_path, historical_error);
    let message = format!(
        "forecast {} written to {} ({} lines, {} -> {})",
        output.forecast_year,
        output.output_path.display(),
        output.line_count,
        output.kpi.total_prior_year,
        output.kpi.total_forecast_year,
    );

    if plan.run.is_complete() {
        CommandResult::report(command, message, &output)
    } else {
        let errors = plan
            .run
            .failures
            .iter()
            .map(|failure| ApplicationError::from(failure.error.clone()))
            .collect::<Vec<_>>();
        let details = errors.iter().map(ToString::to_string).collect::<Vec<_>>();
        let error_class = errors.first().map_or("missing_seasonality", ApplicationError::error_class);
        CommandResult::partial(
            command,
            error_class,
            format!("{message}; {}", details.join("; ")),
            &output,
        )
    }
}

fn describe(
    plan: &ForecastPlan,
    sheet: String,
    output_path: PathBuf,
    historical_error: Option<String>,
) -> ForecastOutput {
    let trend_unavailable_reason = match &plan.trend {
        TrendOutcome::Classified { .. } => None,
        TrendOutcome::Unavailable { reason } => {
            Some(historical_error.unwrap_or_else(|| reason.clone()))
        }
    };

    ForecastOutput {
        output_path,
        sheet,
        forecast_year: plan.forecast_year,
        prior_year: plan.prior_year,
        line_count: plan.run.lines.len(),
        trend_status: if trend_unavailable_reason.is_some() { "unavailable" } else { "classified" },
        trend_unavailable_reason,
        kpi: kpi_summary(&plan.run.lines),
        growth: plan.growth.rates(),
        degenerate_seasonality: plan.seasonality.degenerate_markets().to_vec(),
        failures: plan.run.failures.clone(),
    }
}

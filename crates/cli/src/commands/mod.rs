pub mod config;
pub mod demo;
pub mod doctor;
pub mod forecast;
pub mod summary;
pub mod trends;

use std::collections::BTreeMap;

use plancast_core::config::{AppConfig, LoadOptions};
use plancast_core::{
    ApplicationError, BaseRecord, ForecastPlan, ForecastPlanner, GrowthRate, HistoricalRecord, Market,
    PlanningInputs, Weights,
};
use plancast_ingest::{
    load_base, load_growth_adjustments, load_historical, load_seasonality_adjustments, IngestError,
};
use serde::Serialize;
use serde_json::Value;
use tracing::warn;

pub const EXIT_CONFIG: u8 = 2;
pub const EXIT_INGEST: u8 = 3;
pub const EXIT_EXPORT: u8 = 4;
pub const EXIT_PARTIAL: u8 = 6;

#[derive(Debug, Clone)]
pub struct CommandResult {
    pub exit_code: u8,
    pub output: String,
}

#[derive(Debug, Serialize)]
struct CommandOutcome {
    command: String,
    status: String,
    error_class: Option<String>,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<Value>,
}

impl CommandResult {
    /// Success payload carrying a structured `data` section.
    pub fn report(command: &str, message: impl Into<String>, data: impl Serialize) -> Self {
        Self::with_data(command, "ok", None, 0, message, to_value(data))
    }

    /// Some markets could not be projected; the rest of the output is still valid.
    pub fn partial(
        command: &str,
        error_class: &str,
        message: impl Into<String>,
        data: impl Serialize,
    ) -> Self {
        Self::with_data(command, "partial", Some(error_class), EXIT_PARTIAL, message, to_value(data))
    }

    pub fn failure(
        command: &str,
        error_class: &str,
        message: impl Into<String>,
        exit_code: u8,
    ) -> Self {
        Self::with_data(command, "error", Some(error_class), exit_code, message, None)
    }

    /// Failure payload for an application error, keyed by its stable error class.
    pub fn from_error(command: &str, error: &ApplicationError) -> Self {
        let exit_code = match error {
            ApplicationError::Configuration(_) => EXIT_CONFIG,
            ApplicationError::Ingest(_) => EXIT_INGEST,
            ApplicationError::Export(_) => EXIT_EXPORT,
            ApplicationError::Domain(_) => EXIT_PARTIAL,
        };
        Self::failure(
            command,
            error.error_class(),
            format!("{} {error}", error.user_message()),
            exit_code,
        )
    }

    fn with_data(
        command: &str,
        status: &str,
        error_class: Option<&str>,
        exit_code: u8,
        message: impl Into<String>,
        data: Option<Value>,
    ) -> Self {
        let payload = CommandOutcome {
            command: command.to_string(),
            status: status.to_string(),
            error_class: error_class.map(str::to_string),
            message: message.into(),
            data,
        };
        Self { exit_code, output: serialize_payload(payload) }
    }
}

fn to_value(data: impl Serialize) -> Option<Value> {
    serde_json::to_value(data).ok()
}

fn serialize_payload(payload: CommandOutcome) -> String {
    serde_json::to_string(&payload).unwrap_or_else(|error| {
        format!(
            "{{\"command\":\"unknown\",\"status\":\"error\",\"error_class\":\"serialization\",\"message\":\"{}\"}}",
            error.to_string().replace('\\', "\\\\").replace('"', "\\\"")
        )
    })
}

pub(crate) fn load_config(command: &str, options: &LoadOptions) -> Result<AppConfig, CommandResult> {
    AppConfig::load(options.clone()).map_err(|error| {
        CommandResult::from_error(command, &ApplicationError::Configuration(error.to_string()))
    })
}

/// Tables and scenario parameters for one planning run.
pub(crate) struct LoadedInputs {
    pub historical: Option<Vec<HistoricalRecord>>,
    pub historical_error: Option<String>,
    pub base: Vec<BaseRecord>,
    pub growth_adjustments: Vec<GrowthRate>,
    pub seasonality_adjustments: BTreeMap<Market, Weights>,
}

impl LoadedInputs {
    pub fn plan(&self, config: &AppConfig) -> ForecastPlan {
        ForecastPlanner::new(config.planning_parameters()).plan(PlanningInputs {
            historical: self.historical.as_deref(),
            base: &self.base,
            growth_adjustments: &self.growth_adjustments,
            seasonality_adjustments: &self.seasonality_adjustments,
        })
    }
}

/// A missing or unreadable historical table only disables trend defaults; every other input
/// is required.
pub(crate) fn load_inputs(command: &str, config: &AppConfig) -> Result<LoadedInputs, CommandResult> {
    let ingest_failure = |error: IngestError| {
        CommandResult::from_error(command, &ApplicationError::Ingest(error.to_string()))
    };

    let (historical, historical_error) = match load_historical(&config.inputs.historical_path) {
        Ok(records) => (Some(records), None),
        Err(error) => {
            warn!(
                event_name = "cli.inputs.historical_unavailable",
                error = %error,
                "historical table could not be loaded; trend defaults disabled"
            );
            (None, Some(error.to_string()))
        }
    };

    let base = load_base(&config.inputs.base_path).map_err(ingest_failure)?;

    let growth_adjustments = match &config.inputs.growth_path {
        Some(path) => load_growth_adjustments(path).map_err(ingest_failure)?,
        None => Vec::new(),
    };
    let seasonality_adjustments = match &config.inputs.seasonality_path {
        Some(path) => load_seasonality_adjustments(path).map_err(ingest_failure)?,
        None => BTreeMap::new(),
    };

    Ok(LoadedInputs { historical, historical_error, base, growth_adjustments, seasonality_adjustments })
}

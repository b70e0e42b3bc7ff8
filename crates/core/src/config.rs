use std::collections::BTreeMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::month::MONTHS_PER_YEAR;
use crate::domain::sales::Market;
use crate::planner::PlanningParameters;
use crate::seasonality::{builtin_named_defaults, Weights};

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub planning: PlanningConfig,
    pub inputs: InputConfig,
    pub export: ExportConfig,
    pub seasonality: SeasonalityConfig,
    pub logging: LoggingConfig,
}

#[derive(Clone, Debug)]
pub struct PlanningConfig {
    pub base_year: i32,
    pub comparison_year: i32,
    pub forecast_year: i32,
}

#[derive(Clone, Debug)]
pub struct InputConfig {
    pub historical_path: PathBuf,
    pub base_path: PathBuf,
    pub growth_path: Option<PathBuf>,
    pub seasonality_path: Option<PathBuf>,
}

#[derive(Clone, Debug)]
pub struct ExportConfig {
    pub output_dir: PathBuf,
    pub format: ExportFormat,
}

#[derive(Clone, Debug)]
pub struct SeasonalityConfig {
    /// Replaces the built-in named market curves when present in the config file.
    pub named_defaults: Option<BTreeMap<String, Vec<Decimal>>>,
}

#[derive(Clone, Debug)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportFormat {
    Xlsx,
    Csv,
    Json,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    pub base_year: Option<i32>,
    pub comparison_year: Option<i32>,
    pub forecast_year: Option<i32>,
    pub historical_path: Option<PathBuf>,
    pub base_path: Option<PathBuf>,
    pub growth_path: Option<PathBuf>,
    pub seasonality_path: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
    pub export_format: Option<ExportFormat>,
    pub log_level: Option<String>,
}

#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    pub config_path: Option<PathBuf>,
    pub require_file: bool,
    pub overrides: ConfigOverrides,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse config file `{path}`: {source}")]
    ParseFile { path: PathBuf, source: toml::de::Error },
    #[error("required config file was not found: `{0}`")]
    MissingConfigFile(PathBuf),
    #[error("environment variable interpolation failed for `{var}`")]
    MissingEnvInterpolation { var: String },
    #[error("unterminated environment interpolation expression")]
    UnterminatedInterpolation,
    #[error("invalid environment override for `{key}`: `{value}`")]
    InvalidEnvOverride { key: String, value: String },
    #[error("configuration validation failed: {0}")]
    Validation(String),
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            planning: PlanningConfig { base_year: 2024, comparison_year: 2025, forecast_year: 2026 },
            inputs: InputConfig {
                historical_path: PathBuf::from("data/historical.csv"),
                base_path: PathBuf::from("data/base.csv"),
                growth_path: None,
                seasonality_path: None,
            },
            export: ExportConfig { output_dir: PathBuf::from("."), format: ExportFormat::Xlsx },
            seasonality: SeasonalityConfig { named_defaults: None },
            logging: LoggingConfig { level: "info".to_string(), format: LogFormat::Compact },
        }
    }
}

impl std::str::FromStr for ExportFormat {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "xlsx" => Ok(Self::Xlsx),
            "csv" => Ok(Self::Csv),
            "json" => Ok(Self::Json),
            other => Err(ConfigError::Validation(format!(
                "unsupported export format `{other}` (expected xlsx|csv|json)"
            ))),
        }
    }
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            Self::Xlsx => "xlsx",
            Self::Csv => "csv",
            Self::Json => "json",
        }
    }
}

impl std::str::FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(ConfigError::Validation(format!(
                "unsupported log format `{other}` (expected compact|pretty|json)"
            ))),
        }
    }
}

impl AppConfig {
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let maybe_path = resolve_config_path(options.config_path.as_deref());

        if let Some(path) = maybe_path {
            let patch = read_patch(&path)?;
            config.apply_patch(patch);
        } else if options.require_file {
            let expected = options.config_path.unwrap_or_else(|| PathBuf::from("plancast.toml"));
            return Err(ConfigError::MissingConfigFile(expected));
        }

        config.apply_env_overrides()?;
        config.apply_overrides(options.overrides);
        config.validate()?;

        Ok(config)
    }

    /// Named market curves after file overrides, keyed by market.
    pub fn named_seasonality(&self) -> BTreeMap<Market, Weights> {
        let Some(named_defaults) = &self.seasonality.named_defaults else {
            return builtin_named_defaults();
        };

        named_defaults
            .iter()
            .filter_map(|(market, weights)| {
                let weights: Weights = weights.as_slice().try_into().ok()?;
                Some((Market(market.clone()), weights))
            })
            .collect()
    }

    pub fn planning_parameters(&self) -> PlanningParameters {
        PlanningParameters {
            base_year: self.planning.base_year,
            comparison_year: self.planning.comparison_year,
            forecast_year: self.planning.forecast_year,
            named_seasonality: self.named_seasonality(),
        }
    }

    fn apply_patch(&mut self, patch: ConfigPatch) {
        if let Some(planning) = patch.planning {
            if let Some(base_year) = planning.base_year {
                self.planning.base_year = base_year;
            }
            if let Some(comparison_year) = planning.comparison_year {
                self.planning.comparison_year = comparison_year;
            }
            if let Some(forecast_year) = planning.forecast_year {
                self.planning.forecast_year = forecast_year;
            }
        }

        if let Some(inputs) = patch.inputs {
            if let Some(historical_path) = inputs.historical_path {
                self.inputs.historical_path = historical_path;
            }
            if let Some(base_path) = inputs.base_path {
                self.inputs.base_path = base_path;
            }
            if let Some(growth_path) = inputs.growth_path {
                self.inputs.growth_path = Some(growth_path);
            }
            if let Some(seasonality_path) = inputs.seasonality_path {
                self.inputs.seasonality_path = Some(seasonality_path);
            }
        }

        if let Some(export) = patch.export {
            if let Some(output_dir) = export.output_dir {
                self.export.output_dir = output_dir;
            }
            if let Some(format) = export.format {
                self.export.format = format;
            }
        }

        if let Some(seasonality) = patch.seasonality {
            if let Some(defaults) = seasonality.defaults {
                self.seasonality.named_defaults = Some(defaults);
            }
        }

        if let Some(logging) = patch.logging {
            if let Some(level) = logging.level {
                self.logging.level = level;
            }
            if let Some(format) = logging.format {
                self.logging.format = format;
            }
        }
    }

    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Some(value) = read_env("PLANCAST_BASE_YEAR") {
            self.planning.base_year = parse_year("PLANCAST_BASE_YEAR", &value)?;
        }
        if let Some(value) = read_env("PLANCAST_COMPARISON_YEAR") {
            self.planning.comparison_year = parse_year("PLANCAST_COMPARISON_YEAR", &value)?;
        }
        if let Some(value) = read_env("PLANCAST_FORECAST_YEAR") {
            self.planning.forecast_year = parse_year("PLANCAST_FORECAST_YEAR", &value)?;
        }

        if let Some(value) = read_env("PLANCAST_HISTORICAL_PATH") {
            self.inputs.historical_path = PathBuf::from(value);
        }
        if let Some(value) = read_env("PLANCAST_BASE_PATH") {
            self.inputs.base_path = PathBuf::from(value);
        }
        if let Some(value) = read_env("PLANCAST_GROWTH_PATH") {
            self.inputs.growth_path = Some(PathBuf::from(value));
        }
        if let Some(value) = read_env("PLANCAST_SEASONALITY_PATH") {
            self.inputs.seasonality_path = Some(PathBuf::from(value));
        }

        if let Some(value) = read_env("PLANCAST_EXPORT_DIR") {
            self.export.output_dir = PathBuf::from(value);
        }
        if let Some(value) = read_env("PLANCAST_EXPORT_FORMAT") {
            self.export.format = value.parse()?;
        }

        let log_level =
            read_env("PLANCAST_LOGGING_LEVEL").or_else(|| read_env("PLANCAST_LOG_LEVEL"));
        if let Some(value) = log_level {
            self.logging.level = value;
        }
        let log_format =
            read_env("PLANCAST_LOGGING_FORMAT").or_else(|| read_env("PLANCAST_LOG_FORMAT"));
        if let Some(value) = log_format {
            self.logging.format = value.parse()?;
        }

        Ok(())
    }

    fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(base_year) = overrides.base_year {
            self.planning.base_year = base_year;
        }
        if let Some(comparison_year) = overrides.comparison_year {
            self.planning.comparison_year = comparison_year;
        }
        if let Some(forecast_year) = overrides.forecast_year {
            self.planning.forecast_year = forecast_year;
        }
        if let Some(historical_path) = overrides.historical_path {
            self.inputs.historical_path = historical_path;
        }
        if let Some(base_path) = overrides.base_path {
            self.inputs.base_path = base_path;
        }
        if let Some(growth_path) = overrides.growth_path {
            self.inputs.growth_path = Some(growth_path);
        }
        if let Some(seasonality_path) = overrides.seasonality_path {
            self.inputs.seasonality_path = Some(seasonality_path);
        }
        if let Some(output_dir) = overrides.output_dir {
            self.export.output_dir = output_dir;
        }
        if let Some(export_format) = overrides.export_format {
            self.export.format = export_format;
        }
        if let Some(log_level) = overrides.log_level {
            self.logging.level = log_level;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_planning(&self.planning)?;
        validate_inputs(&self.inputs)?;
        validate_seasonality(&self.seasonality)?;
        validate_logging(&self.logging)?;
        Ok(())
    }
}

fn resolve_config_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return path.exists().then_some(path.to_path_buf());
    }

    [PathBuf::from("plancast.toml"), PathBuf::from("config/plancast.toml")]
        .into_iter()
        .find(|path| path.exists())
}

fn read_patch(path: &Path) -> Result<ConfigPatch, ConfigError> {
    let raw = fs::read_to_string(path)
        .map_err(|source| ConfigError::ReadFile { path: path.to_path_buf(), source })?;

    let interpolated = interpolate_env_vars(&raw)?;
    toml::from_str::<ConfigPatch>(&interpolated)
        .map_err(|source| ConfigError::ParseFile { path: path.to_path_buf(), source })
}

fn interpolate_env_vars(input: &str) -> Result<String, ConfigError> {
    let mut output = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '$' && matches!(chars.peek(), Some('{')) {
            chars.next();
            let mut key = String::new();

            loop {
                match chars.next() {
                    Some('}') => break,
                    Some(next) => key.push(next),
                    None => return Err(ConfigError::UnterminatedInterpolation),
                }
            }

            let value = env::var(&key)
                .map_err(|_| ConfigError::MissingEnvInterpolation { var: key.clone() })?;
            output.push_str(&value);
            continue;
        }

        output.push(ch);
    }

    Ok(output)
}

fn validate_planning(planning: &PlanningConfig) -> Result<(), ConfigError> {
    for (key, year) in [
        ("planning.base_year", planning.base_year),
        ("planning.comparison_year", planning.comparison_year),
        ("planning.forecast_year", planning.forecast_year),
    ] {
        if !(1000..=9999).contains(&year) {
            return Err(ConfigError::Validation(format!("{key} must be a 4-digit year")));
        }
    }

    if planning.base_year == planning.comparison_year {
        return Err(ConfigError::Validation(
            "planning.base_year and planning.comparison_year must differ".to_string(),
        ));
    }

    if planning.forecast_year <= planning.comparison_year {
        return Err(ConfigError::Validation(
            "planning.forecast_year must come after planning.comparison_year".to_string(),
        ));
    }

    Ok(())
}

fn validate_inputs(inputs: &InputConfig) -> Result<(), ConfigError> {
    if inputs.base_path.as_os_str().is_empty() {
        return Err(ConfigError::Validation("inputs.base_path must not be empty".to_string()));
    }
    if inputs.historical_path.as_os_str().is_empty() {
        return Err(ConfigError::Validation(
            "inputs.historical_path must not be empty".to_string(),
        ));
    }
    Ok(())
}

fn validate_seasonality(seasonality: &SeasonalityConfig) -> Result<(), ConfigError> {
    let Some(named_defaults) = &seasonality.named_defaults else {
        return Ok(());
    };

    for (market, weights) in named_defaults {
        if weights.len() != MONTHS_PER_YEAR {
            return Err(ConfigError::Validation(format!(
                "seasonality.defaults.{market} must list {MONTHS_PER_YEAR} monthly weights, found {}",
                weights.len()
            )));
        }
        if weights.iter().any(|weight| weight.is_sign_negative() && !weight.is_zero()) {
            return Err(ConfigError::Validation(format!(
                "seasonality.defaults.{market} weights must be non-negative"
            )));
        }
    }

    Ok(())
}

fn validate_logging(logging: &LoggingConfig) -> Result<(), ConfigError> {
    let level = logging.level.trim().to_ascii_lowercase();
    match level.as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
        _ => Err(ConfigError::Validation(
            "logging.level must be one of trace|debug|info|warn|error".to_string(),
        )),
    }
}

fn read_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn parse_year(key: &str, value: &str) -> Result<i32, ConfigError> {
    value.trim().parse::<i32>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

#[derive(Debug, Default, Deserialize)]
struct ConfigPatch {
    planning: Option<PlanningPatch>,
    inputs: Option<InputPatch>,
    export: Option<ExportPatch>,
    seasonality: Option<SeasonalityPatch>,
    logging: Option<LoggingPatch>,
}

#[derive(Debug, Default, Deserialize)]
struct PlanningPatch {
    base_year: Option<i32>,
    comparison_year: Option<i32>,
    forecast_year: Option<i32>,
}

#[derive(Debug, Default, Deserialize)]
struct InputPatch {
    historical_path: Option<PathBuf>,
    base_path: Option<PathBuf>,
    growth_path: Option<PathBuf>,
    seasonality_path: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize)]
struct ExportPatch {
    output_dir: Option<PathBuf>,
    format: Option<ExportFormat>,
}

#[derive(Debug, Default, Deserialize)]
struct SeasonalityPatch {
    defaults: Option<BTreeMap<String, Vec<Decimal>>>,
}

#[derive(Debug, Default, Deserialize)]
struct LoggingPatch {
    level: Option<String>,
    format: Option<LogFormat>,
}

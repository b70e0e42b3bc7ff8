use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use plancast_core::config::{AppConfig, LoadOptions};
use toml::Value;

pub fn run(options: &LoadOptions) -> String {
    let config = match AppConfig::load(options.clone()) {
        Ok(config) => config,
        Err(error) => return format!("config validation failed: {error}"),
    };

    let config_file_path = detect_config_path(options.config_path.as_deref());
    let config_file_doc = load_config_file_doc(config_file_path.as_deref());
    let overrides = &options.overrides;
    let source = |key_path: &str, flagged: bool, env_keys: &[&str]| {
        if flagged {
            return "flag".to_string();
        }
        field_source(key_path, env_keys, config_file_doc.as_ref(), config_file_path.as_deref())
    };

    let mut lines =
        vec!["effective config (source precedence: flag > env > file > default):".to_string()];

    lines.push(render_line(
        "planning.base_year",
        &config.planning.base_year.to_string(),
        source("planning.base_year", overrides.base_year.is_some(), &["PLANCAST_BASE_YEAR"]),
    ));
    lines.push(render_line(
        "planning.comparison_year",
        &config.planning.comparison_year.to_string(),
        source(
            "planning.comparison_year",
            overrides.comparison_year.is_some(),
            &["PLANCAST_COMPARISON_YEAR"],
        ),
    ));
    lines.push(render_line(
        "planning.forecast_year",
        &config.planning.forecast_year.to_string(),
        source(
            "planning.forecast_year",
            overrides.forecast_year.is_some(),
            &["PLANCAST_FORECAST_YEAR"],
        ),
    ));

    lines.push(render_line(
        "inputs.historical_path",
        &config.inputs.historical_path.display().to_string(),
        source(
            "inputs.historical_path",
            overrides.historical_path.is_some(),
            &["PLANCAST_HISTORICAL_PATH"],
        ),
    ));
    lines.push(render_line(
        "inputs.base_path",
        &config.inputs.base_path.display().to_string(),
        source("inputs.base_path", overrides.base_path.is_some(), &["PLANCAST_BASE_PATH"]),
    ));
    lines.push(render_line(
        "inputs.growth_path",
        &render_optional_path(config.inputs.growth_path.as_deref()),
        source("inputs.growth_path", overrides.growth_path.is_some(), &["PLANCAST_GROWTH_PATH"]),
    ));
    lines.push(render_line(
        "inputs.seasonality_path",
        &render_optional_path(config.inputs.seasonality_path.as_deref()),
        source(
            "inputs.seasonality_path",
            overrides.seasonality_path.is_some(),
            &["PLANCAST_SEASONALITY_PATH"],
        ),
    ));

    lines.push(render_line(
        "export.output_dir",
        &config.export.output_dir.display().to_string(),
        source("export.output_dir", overrides.output_dir.is_some(), &["PLANCAST_EXPORT_DIR"]),
    ));
    lines.push(render_line(
        "export.format",
        config.export.format.extension(),
        source("export.format", overrides.export_format.is_some(), &["PLANCAST_EXPORT_FORMAT"]),
    ));

    let named_markets = config.named_seasonality().keys().map(ToString::to_string).collect::<Vec<_>>();
    lines.push(render_line(
        "seasonality.defaults",
        &format!("[{}]", named_markets.join(", ")),
        source("seasonality.defaults", false, &[]),
    ));

    lines.push(render_line(
        "logging.level",
        &config.logging.level,
        source(
            "logging.level",
            overrides.log_level.is_some(),
            &["PLANCAST_LOGGING_LEVEL", "PLANCAST_LOG_LEVEL"],
        ),
    ));
    lines.push(render_line(
        "logging.format",
        &format!("{:?}", config.logging.format),
        source("logging.format", false, &["PLANCAST_LOGGING_FORMAT", "PLANCAST_LOG_FORMAT"]),
    ));

    lines.join("\n")
}

fn detect_config_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return path.exists().then(|| path.to_path_buf());
    }

    let root = PathBuf::from("plancast.toml");
    if root.exists() {
        return Some(root);
    }

    let nested = PathBuf::from("config/plancast.toml");
    if nested.exists() {
        return Some(nested);
    }

    None
}

fn load_config_file_doc(path: Option<&Path>) -> Option<Value> {
    let path = path?;
    let raw = fs::read_to_string(path).ok()?;
    raw.parse::<Value>().ok()
}

fn field_source(
    key_path: &str,
    env_keys: &[&str],
    config_file_doc: Option<&Value>,
    config_file_path: Option<&Path>,
) -> String {
    if let Some(env_key) = env_keys.iter().find(|env_key| env::var_os(env_key).is_some()) {
        return format!("env ({env_key})");
    }

    if let Some(doc) = config_file_doc {
        if contains_path(doc, key_path) {
            let file_path = config_file_path
                .map(|path| path.display().to_string())
                .unwrap_or_else(|| "config file".to_string());
            return format!("file ({file_path})");
        }
    }

    "default".to_string()
}

fn contains_path(root: &Value, key_path: &str) -> bool {
    let mut current = root;
    for key in key_path.split('.') {
        let Some(next) = current.get(key) else {
            return false;
        };
        current = next;
    }
    true
}

fn render_line(key: &str, value: &str, source: String) -> String {
    format!("- {key} = {value} (source: {source})")
}

fn render_optional_path(path: Option<&Path>) -> String {
    path.map(|path| path.display().to_string()).unwrap_or_else(|| "<unset>".to_string())
}

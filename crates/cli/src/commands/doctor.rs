use std::path::Path;

use plancast_core::config::{AppConfig, LoadOptions};
use plancast_core::{ForecastPlanner, TrendOutcome};
use plancast_ingest::{
    load_base, load_growth_adjustments, load_historical, load_seasonality_adjustments,
};
use serde::Serialize;

use crate::commands::{CommandResult, EXIT_CONFIG};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
enum CheckStatus {
    Pass,
    Warn,
    Fail,
    Skipped,
}

#[derive(Debug, Serialize)]
struct DoctorCheck {
    name: &'static str,
    status: CheckStatus,
    details: String,
}

#[derive(Debug, Serialize)]
struct DoctorReport {
    overall_status: CheckStatus,
    summary: String,
    checks: Vec<DoctorCheck>,
}

/// Exit code is non-zero only when a required check fails; an unusable historical table is a
/// warning because forecasting still works without trend defaults.
pub fn run(options: &LoadOptions, json_output: bool) -> CommandResult {
    let report = build_report(options);
    let exit_code = if report.overall_status == CheckStatus::Fail { EXIT_CONFIG } else { 0 };

    let output = if json_output {
        serde_json::to_string_pretty(&report).unwrap_or_else(|error| {
            format!(
                "{{\"overall_status\":\"fail\",\"summary\":\"doctor serialization failed\",\"error\":\"{}\"}}",
                escape_json(&error.to_string())
            )
        })
    } else {
        render_human(&report)
    };

    CommandResult { exit_code, output }
}

fn build_report(options: &LoadOptions) -> DoctorReport {
    let mut checks = Vec::new();

    match AppConfig::load(options.clone()) {
        Ok(config) => {
            checks.push(DoctorCheck {
                name: "config_validation",
                status: CheckStatus::Pass,
                details: "configuration loaded and validated".to_string(),
            });
            checks.push(check_base_table(&config));
            checks.push(check_historical_table(&config));
            checks.push(check_parameter_file(
                "growth_parameters",
                config.inputs.growth_path.as_deref(),
                |path| load_growth_adjustments(path).map(|rates| rates.len()),
            ));
            checks.push(check_parameter_file(
                "seasonality_parameters",
                config.inputs.seasonality_path.as_deref(),
                |path| load_seasonality_adjustments(path).map(|weights| weights.len()),
            ));
        }
        Err(error) => {
            checks.push(DoctorCheck {
                name: "config_validation",
                status: CheckStatus::Fail,
                details: error.to_string(),
            });
            for name in
                ["base_table", "historical_trends", "growth_parameters", "seasonality_parameters"]
            {
                checks.push(DoctorCheck {
                    name,
                    status: CheckStatus::Skipped,
                    details: "skipped because configuration did not load".to_string(),
                });
            }
        }
    }

    let any_fail = checks.iter().any(|check| check.status == CheckStatus::Fail);
    let any_warn = checks.iter().any(|check| check.status == CheckStatus::Warn);
    let (overall_status, summary) = if any_fail {
        (CheckStatus::Fail, "doctor: one or more readiness checks failed".to_string())
    } else if any_warn {
        (CheckStatus::Warn, "doctor: ready, with warnings".to_string())
    } else {
        (CheckStatus::Pass, "doctor: all readiness checks passed".to_string())
    };

    DoctorReport { overall_status, summary, checks }
}

fn check_base_table(config: &AppConfig) -> DoctorCheck {
    let path = &config.inputs.base_path;
    match load_base(path) {
        Ok(records) if records.is_empty() => DoctorCheck {
            name: "base_table",
            status: CheckStatus::Fail,
            details: format!("`{}` has no rows", path.display()),
        },
        Ok(records) => DoctorCheck {
            name: "base_table",
            status: CheckStatus::Pass,
            details: format!("`{}` loaded with {} rows", path.display(), records.len()),
        },
        Err(error) => {
            DoctorCheck { name: "base_table", status: CheckStatus::Fail, details: error.to_string() }
        }
    }
}

fn check_historical_table(config: &AppConfig) -> DoctorCheck {
    let historical = match load_historical(&config.inputs.historical_path) {
        Ok(records) => records,
        Err(error) => {
            return DoctorCheck {
                name: "historical_trends",
                status: CheckStatus::Warn,
                details: format!("trend defaults disabled: {error}"),
            };
        }
    };

    let planner = ForecastPlanner::new(config.planning_parameters());
    match planner.classify_trends(Some(historical.as_slice())) {
        TrendOutcome::Classified { report } => DoctorCheck {
            name: "historical_trends",
            status: CheckStatus::Pass,
            details: format!(
                "{} product lines classified for {} -> {}",
                report.classifications.len(),
                report.base_year,
                report.comparison_year
            ),
        },
        TrendOutcome::Unavailable { reason } => DoctorCheck {
            name: "historical_trends",
            status: CheckStatus::Warn,
            details: format!("trend defaults disabled: {reason}"),
        },
    }
}

fn check_parameter_file<E: std::fmt::Display>(
    name: &'static str,
    path: Option<&Path>,
    load: impl FnOnce(&Path) -> Result<usize, E>,
) -> DoctorCheck {
    let Some(path) = path else {
        return DoctorCheck {
            name,
            status: CheckStatus::Skipped,
            details: "no parameter file configured".to_string(),
        };
    };

    match load(path) {
        Ok(count) => DoctorCheck {
            name,
            status: CheckStatus::Pass,
            details: format!("`{}` loaded with {count} entries", path.display()),
        },
        Err(error) => DoctorCheck { name, status: CheckStatus::Fail, details: error.to_string() },
    }
}

fn render_human(report: &DoctorReport) -> String {
    let mut lines = Vec::new();
    lines.push(report.summary.clone());

    for check in &report.checks {
        let marker = match check.status {
            CheckStatus::Pass => "ok",
            CheckStatus::Warn => "warn",
            CheckStatus::Fail => "fail",
            CheckStatus::Skipped => "skip",
        };
        lines.push(format!("- [{marker}] {}: {}", check.name, check.details));
    }

    lines.join("\n")
}

fn escape_json(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

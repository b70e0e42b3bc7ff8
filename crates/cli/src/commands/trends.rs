use plancast_core::config::LoadOptions;
use plancast_core::{ApplicationError, ForecastPlanner, TrendOutcome};
use plancast_ingest::load_historical;

use crate::commands::{load_config, CommandResult};

pub fn run(options: &LoadOptions) -> CommandResult {
    let config = match load_config("trends", options) {
        Ok(config) => config,
        Err(result) => return result,
    };

    let historical = match load_historical(&config.inputs.historical_path) {
        Ok(records) => records,
        Err(error) => {
            return CommandResult::from_error(
                "trends",
                &ApplicationError::Ingest(error.to_string()),
            );
        }
    };

    let planner = ForecastPlanner::new(config.planning_parameters());
    let outcome = planner.classify_trends(Some(historical.as_slice()));
    let message = match &outcome {
        TrendOutcome::Classified { report } => {
            let lines = report
                .classifications
                .values()
                .map(|classification| {
                    format!(
                        "{}: {} ({}%)",
                        classification.product_line,
                        classification.label,
                        classification.growth_pct.round_dp(2)
                    )
                })
                .collect::<Vec<_>>();
            format!(
                "classified {} product lines ({} vs {}): {}",
                lines.len(),
                report.comparison_year,
                report.base_year,
                lines.join(", ")
            )
        }
        TrendOutcome::Unavailable { reason } => {
            format!("trend classification unavailable: {reason}")
        }
    };

    CommandResult::report("trends", message, &outcome)
}

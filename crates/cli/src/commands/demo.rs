use std::path::Path;

use plancast_core::config::LoadOptions;
use plancast_core::ApplicationError;
use plancast_ingest::DemoDataset;

use crate::commands::forecast::forecast_and_export;
use crate::commands::{load_config, load_inputs, CommandResult};

/// Writes the demo tables into `output_dir`, points the inputs at them and runs the full
/// forecast, exporting next to the tables.
pub fn run(options: &LoadOptions, output_dir: &Path) -> CommandResult {
    let files = match DemoDataset::write(output_dir) {
        Ok(files) => files,
        Err(error) => {
            return CommandResult::from_error("demo", &ApplicationError::Export(error.to_string()));
        }
    };

    let mut options = options.clone();
    options.overrides.historical_path = Some(files.historical_path);
    options.overrides.base_path = Some(files.base_path);
    options.overrides.growth_path = Some(files.scenario_path.clone());
    options.overrides.seasonality_path = Some(files.scenario_path);
    options.overrides.base_year = Some(DemoDataset::HISTORY_YEARS[0]);
    options.overrides.comparison_year = Some(DemoDataset::HISTORY_YEARS[1]);
    options.overrides.forecast_year = Some(DemoDataset::BASE_YEAR + 1);

    let config = match load_config("demo", &options) {
        Ok(config) => config,
        Err(result) => return result,
    };
    let inputs = match load_inputs("demo", &config) {
        Ok(inputs) => inputs,
        Err(result) => return result,
    };

    forecast_and_export("demo", &config, &inputs, output_dir)
}

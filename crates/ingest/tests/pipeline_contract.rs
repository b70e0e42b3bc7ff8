use std::collections::BTreeMap;
use std::str::FromStr;

use plancast_core::config::ExportFormat;
use plancast_core::seasonality::builtin_named_defaults;
use plancast_core::{ForecastPlanner, PlanningInputs, PlanningParameters, TrendLabel};
use plancast_ingest::{
    export_forecast, load_base, load_growth_adjustments, load_historical,
    load_seasonality_adjustments, DemoDataset, ExportTable,
};
use rust_decimal::Decimal;
use tempfile::TempDir;

type PipelineContractResult<T = ()> = Result<T, String>;

macro_rules! require {
    ($cond:expr) => {
        if !$cond {
            return Err(format!("assertion failed: `{}`", stringify!($cond)));
        }
    };
    ($cond:expr, $($arg:tt)*) => {
        if !$cond {
            return Err(format!($($arg)*));
        }
    };
}

macro_rules! require_eq {
    ($left:expr, $right:expr) => {
        if $left != $right {
            return Err(format!(
                "assertion failed: `left == right` (`{:?}` != `{:?}`)",
                $left,
                $right
            ));
        }
    };
}

fn parameters() -> PlanningParameters {
    PlanningParameters {
        base_year: DemoDataset::HISTORY_YEARS[0],
        comparison_year: DemoDataset::HISTORY_YEARS[1],
        forecast_year: DemoDataset::BASE_YEAR + 1,
        named_seasonality: builtin_named_defaults(),
    }
}

fn decimal(cell: &str) -> PipelineContractResult<Decimal> {
    Decimal::from_str(cell).map_err(|error| format!("`{cell}` is not a decimal: {error}"))
}

#[test]
fn demo_dataset_flows_through_planner_and_export() -> PipelineContractResult {
    let dir = TempDir::new().map_err(|error| error.to_string())?;
    let files = DemoDataset::write(dir.path()).map_err(|error| error.to_string())?;

    let historical = load_historical(&files.historical_path).map_err(|error| error.to_string())?;
    let base = load_base(&files.base_path).map_err(|error| error.to_string())?;
    let growth = load_growth_adjustments(&files.scenario_path).map_err(|error| error.to_string())?;
    let seasonality =
        load_seasonality_adjustments(&files.scenario_path).map_err(|error| error.to_string())?;

    let plan = ForecastPlanner::new(parameters()).plan(PlanningInputs {
        historical: Some(historical.as_slice()),
        base: &base,
        growth_adjustments: &growth,
        seasonality_adjustments: &seasonality,
    });

    let report = plan.trend.report().ok_or("demo history should classify")?;
    require_eq!(report.classifications.len(), 3);
    require_eq!(report.label_for(&"Skincare".into()), Some(TrendLabel::Evolving));
    require_eq!(report.label_for(&"Haircare".into()), Some(TrendLabel::Declining));
    require_eq!(report.label_for(&"Fragrance".into()), Some(TrendLabel::Stable));
    require!(plan.run.is_complete(), "every demo market has seasonality");
    require_eq!(plan.run.lines.len(), DemoDataset::base_row_count());
    require_eq!(plan.growth.lookup(&"EMSPAI".into(), &"Fragrance".into()), Decimal::new(45, 1));
    require_eq!(plan.growth.lookup(&"EMFRAN".into(), &"Haircare".into()), Decimal::new(-6, 0));

    let table = ExportTable::new(&plan.run.lines, plan.prior_year, plan.forecast_year);
    let path = export_forecast(&table, plan.forecast_year, ExportFormat::Csv, dir.path())
        .map_err(|error| error.to_string())?;
    require!(path.ends_with("Forecast_2026.csv"), "unexpected export path {}", path.display());

    let mut reader = csv::Reader::from_path(&path).map_err(|error| error.to_string())?;
    let headers = reader.headers().map_err(|error| error.to_string())?.clone();
    require_eq!(headers.get(3), Some("Total_2025"));
    require_eq!(headers.get(4), Some("Total_2026"));
    require_eq!(headers.len(), 17);

    let mut forecast_by_market: BTreeMap<String, Decimal> = BTreeMap::new();
    let mut row_count = 0;
    for record in reader.records() {
        let record = record.map_err(|error| error.to_string())?;
        row_count += 1;

        let total = decimal(&record[4])?;
        let mut months = Decimal::ZERO;
        for cell in record.iter().skip(5) {
            let value = decimal(cell)?;
            require!(value.scale() <= 2, "month cell `{cell}` has more than two decimals");
            months += value;
        }
        require_eq!(total, months);
        *forecast_by_market.entry(record[0].to_string()).or_default() += total;
    }
    require_eq!(row_count, DemoDataset::base_row_count());
    require_eq!(forecast_by_market.len(), DemoDataset::market_count());

    Ok(())
}

#[test]
fn growth_is_applied_within_rounding_tolerance() -> PipelineContractResult {
    let dir = TempDir::new().map_err(|error| error.to_string())?;
    let files = DemoDataset::write(dir.path()).map_err(|error| error.to_string())?;
    let historical = load_historical(&files.historical_path).map_err(|error| error.to_string())?;
    let base = load_base(&files.base_path).map_err(|error| error.to_string())?;

    let plan = ForecastPlanner::new(parameters()).plan(PlanningInputs {
        historical: Some(historical.as_slice()),
        base: &base,
        growth_adjustments: &[],
        seasonality_adjustments: &BTreeMap::new(),
    });

    // Twelve rounded months drift at most half a cent each.
    let tolerance = Decimal::new(6, 2);
    for line in &plan.run.lines {
        let growth_pct = plan.growth.lookup(&line.market, &line.product_line);
        let expected =
            line.total_prior_year * (Decimal::ONE + growth_pct / Decimal::ONE_HUNDRED);
        require!(
            (line.total_forecast_year - expected).abs() <= tolerance,
            "{}/{}/{}: {} is not within tolerance of {}",
            line.market,
            line.product_line,
            line.sku,
            line.total_forecast_year,
            expected
        );
    }

    Ok(())
}

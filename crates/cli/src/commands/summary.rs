use std::collections::BTreeMap;

use plancast_core::aggregation::{
    kpi_summary, market_totals_for_line, markets, monthly_by_line_for_market, product_lines,
};
use plancast_core::config::LoadOptions;
use plancast_core::{KpiSummary, Market, MarketFailure, MarketTotals, MonthRow, ProductLine};
use serde::Serialize;

use crate::commands::{load_config, load_inputs, CommandResult};

#[derive(Debug, Serialize)]
struct SummaryOutput {
    forecast_year: i32,
    prior_year: i32,
    kpi: KpiSummary,
    product_lines: Vec<ProductLine>,
    markets: Vec<Market>,
    market_totals: BTreeMap<ProductLine, Vec<MarketTotals>>,
    monthly_by_line: BTreeMap<Market, Vec<MonthRow>>,
    failures: Vec<MarketFailure>,
}

/// Read-only view of a planning run; nothing is written.
pub fn run(options: &LoadOptions, line: Option<&str>, market: Option<&str>) -> CommandResult {
    let config = match load_config("summary", options) {
        Ok(config) => config,
        Err(result) => return result,
    };
    let inputs = match load_inputs("summary", &config) {
        Ok(inputs) => inputs,
        Err(result) => return result,
    };

    let plan = inputs.plan(&config);
    let lines = &plan.run.lines;
    let all_lines = product_lines(lines);
    let all_markets = markets(lines);

    let selected_lines = match line {
        Some(line) => vec![ProductLine::from(line)],
        None => all_lines.clone(),
    };
    let selected_markets = match market {
        Some(market) => vec![Market::from(market)],
        None => all_markets.clone(),
    };

    let market_totals = selected_lines
        .iter()
        .map(|line| (line.clone(), market_totals_for_line(lines, line)))
        .collect();
    let monthly_by_line = selected_markets
        .iter()
        .map(|market| (market.clone(), monthly_by_line_for_market(lines, market)))
        .collect();

    let output = SummaryOutput {
        forecast_year: plan.forecast_year,
        prior_year: plan.prior_year,
        kpi: kpi_summary(lines),
        product_lines: all_lines,
        markets: all_markets,
        market_totals,
        monthly_by_line,
        failures: plan.run.failures.clone(),
    };
    let message = format!(
        "total {}: {} | total {}: {} | variation: {}%",
        output.prior_year,
        output.kpi.total_prior_year,
        output.forecast_year,
        output.kpi.total_forecast_year,
        output.kpi.variation_pct.round_dp(2),
    );

    CommandResult::report("summary", message, &output)
}

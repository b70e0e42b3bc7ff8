use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;
use tracing::{debug, warn};

use crate::domain::forecast::ForecastLine;
use crate::domain::month::{sum_months, MonthlyValues};
use crate::domain::sales::{BaseRecord, Market};
use crate::errors::ForecastError;
use crate::growth::{growth_factor, GrowthOverrides};
use crate::seasonality::{SeasonalityProfile, Weights};

const FORECAST_DECIMAL_PLACES: u32 = 2;

#[derive(Clone, Copy, Debug)]
pub struct ForecastInput<'a> {
    pub records: &'a [BaseRecord],
    pub growth: &'a GrowthOverrides,
    pub seasonality: &'a SeasonalityProfile,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct MarketFailure {
    pub market: Market,
    pub error: ForecastError,
    pub skipped_records: usize,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ForecastRun {
    pub lines: Vec<ForecastLine>,
    pub failures: Vec<MarketFailure>,
}

impl ForecastRun {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

pub trait ForecastEngine: Send + Sync {
    fn project(&self, input: ForecastInput<'_>) -> ForecastRun;
}

#[derive(Default)]
pub struct DeterministicForecastEngine;

impl ForecastEngine for DeterministicForecastEngine {
    fn project(&self, input: ForecastInput<'_>) -> ForecastRun {
        project_records(input)
    }
}

/// Projects every base record; records of a market without seasonality are collected as one
/// failure per market while the other markets still compute.
pub fn project_records(input: ForecastInput<'_>) -> ForecastRun {
    let mut run = ForecastRun::default();

    for record in input.records {
        let Some(weights) = input.seasonality.weights_for(&record.market) else {
            match run.failures.iter_mut().find(|failure| failure.market == record.market) {
                Some(failure) => failure.skipped_records += 1,
                None => run.failures.push(MarketFailure {
                    market: record.market.clone(),
                    error: ForecastError::MissingSeasonality { market: record.market.clone() },
                    skipped_records: 1,
                }),
            }
            continue;
        };

        let growth_pct = input.growth.lookup(&record.market, &record.product_line);
        run.lines.push(project_record(record, growth_pct, weights));
    }

    for failure in &run.failures {
        warn!(
            event_name = "forecast.engine.market_failed",
            market = %failure.market,
            skipped_records = failure.skipped_records,
            error = %failure.error,
            "market excluded from forecast run"
        );
    }
    debug!(
        event_name = "forecast.engine.completed",
        line_count = run.lines.len(),
        failed_markets = run.failures.len(),
        "forecast run completed"
    );

    run
}

pub fn project_record(record: &BaseRecord, growth_pct: Decimal, weights: &Weights) -> ForecastLine {
    let total_prior_year = record.annual_total();
    let projected_total = total_prior_year * growth_factor(growth_pct);
    let monthly_forecast: MonthlyValues = weights.map(|weight| round_amount(projected_total * weight));

    ForecastLine {
        market: record.market.clone(),
        product_line: record.product_line.clone(),
        sku: record.sku.clone(),
        total_prior_year,
        total_forecast_year: sum_months(&monthly_forecast),
        monthly_forecast,
    }
}

/// Two decimal places, ties to even.
pub fn round_amount(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(FORECAST_DECIMAL_PLACES, RoundingStrategy::MidpointNearestEven)
}

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::{info, warn};

use crate::domain::sales::{BaseRecord, HistoricalRecord, Market, ProductLine};
use crate::engine::{DeterministicForecastEngine, ForecastEngine, ForecastInput, ForecastRun};
use crate::growth::{GrowthOverrides, GrowthRate};
use crate::seasonality::{SeasonalityInputs, SeasonalityProfile, Weights};
use crate::trend::{TrendClassifier, TrendReport};

/// Everything a planning run depends on besides the tables themselves.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlanningParameters {
    pub base_year: i32,
    pub comparison_year: i32,
    pub forecast_year: i32,
    pub named_seasonality: BTreeMap<Market, Weights>,
}

impl PlanningParameters {
    /// Year of the base table the forecast is projected from.
    pub fn prior_year(&self) -> i32 {
        self.forecast_year - 1
    }
}

#[derive(Clone, Copy, Debug)]
pub struct PlanningInputs<'a> {
    /// `None` when the historical table could not be loaded.
    pub historical: Option<&'a [HistoricalRecord]>,
    pub base: &'a [BaseRecord],
    pub growth_adjustments: &'a [GrowthRate],
    pub seasonality_adjustments: &'a BTreeMap<Market, Weights>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TrendOutcome {
    Classified { report: TrendReport },
    Unavailable { reason: String },
}

impl TrendOutcome {
    pub fn report(&self) -> Option<&TrendReport> {
        match self {
            Self::Classified { report } => Some(report),
            Self::Unavailable { .. } => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ForecastPlan {
    pub forecast_year: i32,
    pub prior_year: i32,
    pub trend: TrendOutcome,
    pub growth: GrowthOverrides,
    pub seasonality: SeasonalityProfile,
    pub run: ForecastRun,
}

pub struct ForecastPlanner<E = DeterministicForecastEngine> {
    parameters: PlanningParameters,
    engine: E,
}

impl ForecastPlanner<DeterministicForecastEngine> {
    pub fn new(parameters: PlanningParameters) -> Self {
        Self { parameters, engine: DeterministicForecastEngine }
    }
}

impl<E: ForecastEngine> ForecastPlanner<E> {
    pub fn with_engine(parameters: PlanningParameters, engine: E) -> Self {
        Self { parameters, engine }
    }

    pub fn parameters(&self) -> &PlanningParameters {
        &self.parameters
    }

    pub fn classify_trends(&self, historical: Option<&[HistoricalRecord]>) -> TrendOutcome {
        let Some(historical) = historical else {
            return TrendOutcome::Unavailable {
                reason: "historical sales table is not available".to_string(),
            };
        };

        let classifier =
            TrendClassifier::new(self.parameters.base_year, self.parameters.comparison_year);
        match classifier.classify(historical) {
            Ok(report) => TrendOutcome::Classified { report },
            Err(error) => {
                warn!(
                    event_name = "forecast.trend.unavailable",
                    error = %error,
                    "trend classification unavailable; growth defaults fall back to stable"
                );
                TrendOutcome::Unavailable { reason: error.to_string() }
            }
        }
    }

    /// Trend defaults seeded for every market/line pair of the base table, then user
    /// adjustments on top.
    pub fn resolve_growth(
        &self,
        base: &[BaseRecord],
        trend: &TrendOutcome,
        adjustments: &[GrowthRate],
    ) -> GrowthOverrides {
        let markets = distinct(base.iter().map(|record| &record.market));
        let product_lines: Vec<ProductLine> =
            distinct(base.iter().map(|record| &record.product_line));

        let mut growth = GrowthOverrides::seeded(&markets, &product_lines, trend.report());
        for adjustment in adjustments {
            growth.set(
                adjustment.market.clone(),
                adjustment.product_line.clone(),
                adjustment.growth_pct,
            );
        }
        growth
    }

    pub fn resolve_seasonality(
        &self,
        base: &[BaseRecord],
        adjustments: &BTreeMap<Market, Weights>,
    ) -> SeasonalityProfile {
        let markets = distinct(base.iter().map(|record| &record.market));
        let mut inputs = SeasonalityInputs::seeded(&markets, &self.parameters.named_seasonality);
        for (market, weights) in adjustments {
            inputs.set(market.clone(), *weights);
        }
        inputs.normalize()
    }

    pub fn plan(&self, inputs: PlanningInputs<'_>) -> ForecastPlan {
        let trend = self.classify_trends(inputs.historical);
        let growth = self.resolve_growth(inputs.base, &trend, inputs.growth_adjustments);
        let seasonality = self.resolve_seasonality(inputs.base, inputs.seasonality_adjustments);

        let run = self.engine.project(ForecastInput {
            records: inputs.base,
            growth: &growth,
            seasonality: &seasonality,
        });

        info!(
            event_name = "forecast.plan.completed",
            forecast_year = self.parameters.forecast_year,
            base_records = inputs.base.len(),
            forecast_lines = run.lines.len(),
            failed_markets = run.failures.len(),
            trend_available = trend.report().is_some(),
            "forecast plan computed"
        );

        ForecastPlan {
            forecast_year: self.parameters.forecast_year,
            prior_year: self.parameters.prior_year(),
            trend,
            growth,
            seasonality,
            run,
        }
    }
}

fn distinct<'a, T: Clone + PartialEq + 'a>(values: impl Iterator<Item = &'a T>) -> Vec<T> {
    let mut seen: Vec<T> = Vec::new();
    for value in values {
        if !seen.contains(value) {
            seen.push(value.clone());
        }
    }
    seen
}

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::domain::month::{sum_months, MonthlyValues, MONTHS_PER_YEAR};
use crate::domain::sales::Market;

pub type Weights = MonthlyValues;

pub fn uniform_weights() -> Weights {
    [Decimal::ONE / Decimal::from(MONTHS_PER_YEAR as u32); MONTHS_PER_YEAR]
}

/// Monthly weights for the markets with a known sales calendar, in percent.
pub fn builtin_named_defaults() -> BTreeMap<Market, Weights> {
    let table: [(&str, [i64; MONTHS_PER_YEAR]); 3] = [
        ("EMFRAN", [9, 8, 9, 8, 9, 8, 9, 6, 9, 9, 9, 7]),
        ("EMMORO", [6, 8, 8, 8, 7, 6, 10, 8, 9, 9, 9, 14]),
        ("EMSPAI", [9, 5, 9, 5, 5, 7, 9, 7, 9, 8, 11, 16]),
    ];

    table
        .into_iter()
        .map(|(market, weights)| (Market::from(market), weights.map(|weight| Decimal::new(weight, 0))))
        .collect()
}

/// Rescales weights to sum to one. Returns `None` when the sum is not positive, in which case
/// the caller keeps the raw weights.
pub fn normalize_weights(weights: &Weights) -> Option<Weights> {
    let total = sum_months(weights);
    if total <= Decimal::ZERO {
        return None;
    }
    Some(weights.map(|weight| weight / total))
}

/// Raw, user-editable weights per market.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeasonalityInputs {
    weights: BTreeMap<Market, Weights>,
}

impl SeasonalityInputs {
    /// Starts from the named defaults and gives every other market a uniform curve.
    pub fn seeded<'a>(
        markets: impl IntoIterator<Item = &'a Market>,
        named_defaults: &BTreeMap<Market, Weights>,
    ) -> Self {
        let mut weights = named_defaults.clone();
        for market in markets {
            weights.entry(market.clone()).or_insert_with(uniform_weights);
        }
        Self { weights }
    }

    pub fn set(&mut self, market: Market, weights: Weights) {
        self.weights.insert(market, weights);
    }

    pub fn get(&self, market: &Market) -> Option<&Weights> {
        self.weights.get(market)
    }

    pub fn markets(&self) -> impl Iterator<Item = &Market> {
        self.weights.keys()
    }

    pub fn normalize(&self) -> SeasonalityProfile {
        let mut degenerate_markets = Vec::new();
        let weights = self
            .weights
            .iter()
            .map(|(market, raw)| {
                let normalized = normalize_weights(raw).unwrap_or_else(|| {
                    warn!(
                        event_name = "forecast.seasonality.degenerate",
                        market = %market,
                        "seasonality weights do not sum to a positive value; kept unnormalized"
                    );
                    degenerate_markets.push(market.clone());
                    *raw
                });
                (market.clone(), normalized)
            })
            .collect();

        SeasonalityProfile { weights, degenerate_markets }
    }
}

/// Normalized weights per market, ready for projection.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeasonalityProfile {
    weights: BTreeMap<Market, Weights>,
    degenerate_markets: Vec<Market>,
}

impl SeasonalityProfile {
    pub fn weights_for(&self, market: &Market) -> Option<&Weights> {
        self.weights.get(market)
    }

    pub fn weights(&self) -> &BTreeMap<Market, Weights> {
        &self.weights
    }

    /// Markets whose raw weights could not be normalized.
    pub fn degenerate_markets(&self) -> &[Market] {
        &self.degenerate_markets
    }
}

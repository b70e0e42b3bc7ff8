//! Scenario parameter files: growth percentages per market and product line, and raw monthly
//! seasonality weights per market. Both tables may live in the same TOML file:
//!
//! ```toml
//! [growth.EMFRAN]
//! Skincare = 10.5
//!
//! [seasonality]
//! EMFRAN = [9, 8, 9, 8, 9, 8, 9, 6, 9, 9, 9, 7]
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use plancast_core::{GrowthRate, Market, ProductLine, Weights, MONTHS_PER_YEAR};
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::error::IngestError;

#[derive(Debug, Default, Deserialize)]
struct ScenarioFile {
    #[serde(default)]
    growth: BTreeMap<String, BTreeMap<String, Decimal>>,
    #[serde(default)]
    seasonality: BTreeMap<String, Vec<Decimal>>,
}

fn read_scenario(path: &Path) -> Result<ScenarioFile, IngestError> {
    let raw = fs::read_to_string(path)
        .map_err(|source| IngestError::ReadParameters { path: path.to_path_buf(), source })?;
    toml::from_str(&raw)
        .map_err(|source| IngestError::ParseParameters { path: path.to_path_buf(), source })
}

pub fn load_growth_adjustments(path: &Path) -> Result<Vec<GrowthRate>, IngestError> {
    let scenario = read_scenario(path)?;

    Ok(scenario
        .growth
        .into_iter()
        .flat_map(|(market, lines)| {
            lines.into_iter().map(move |(product_line, growth_pct)| GrowthRate {
                market: Market(market.clone()),
                product_line: ProductLine(product_line),
                growth_pct,
            })
        })
        .collect())
}

pub fn load_seasonality_adjustments(path: &Path) -> Result<BTreeMap<Market, Weights>, IngestError> {
    let scenario = read_scenario(path)?;

    scenario
        .seasonality
        .into_iter()
        .map(|(market, weights)| {
            let weights: Weights = weights.as_slice().try_into().map_err(|_| {
                IngestError::InvalidParameters {
                    path: path.to_path_buf(),
                    message: format!(
                        "seasonality for `{market}` must list {MONTHS_PER_YEAR} weights, found {}",
                        weights.len()
                    ),
                }
            })?;
            if weights.iter().any(|weight| *weight < Decimal::ZERO) {
                return Err(IngestError::InvalidParameters {
                    path: path.to_path_buf(),
                    message: format!("seasonality for `{market}` has a negative weight"),
                });
            }
            Ok((Market(market), weights))
        })
        .collect()
}

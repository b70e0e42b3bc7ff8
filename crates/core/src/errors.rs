use serde::Serialize;
use thiserror::Error;

use crate::domain::sales::Market;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum TrendError {
    #[error("no 4-digit year found in `{raw}`")]
    Parse { raw: String },
    #[error("insufficient trend data for {base_year} -> {comparison_year}: missing {missing:?}")]
    InsufficientData { base_year: i32, comparison_year: i32, missing: Vec<i32> },
}

#[derive(Clone, Debug, Error, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ForecastError {
    #[error("market `{market}` has no seasonality profile")]
    MissingSeasonality { market: Market },
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum DomainError {
    #[error(transparent)]
    Trend(#[from] TrendError),
    #[error(transparent)]
    Forecast(#[from] ForecastError),
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ApplicationError {
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error("ingest failure: {0}")]
    Ingest(String),
    #[error("export failure: {0}")]
    Export(String),
    #[error("configuration failure: {0}")]
    Configuration(String),
}

impl ApplicationError {
    /// Stable classification surfaced in command payloads.
    pub fn error_class(&self) -> &'static str {
        match self {
            Self::Domain(DomainError::Trend(TrendError::Parse { .. })) => "year_parse",
            Self::Domain(DomainError::Trend(TrendError::InsufficientData { .. })) => {
                "insufficient_trend_data"
            }
            Self::Domain(DomainError::Forecast(ForecastError::MissingSeasonality { .. })) => {
                "missing_seasonality"
            }
            Self::Ingest(_) => "ingest",
            Self::Export(_) => "export",
            Self::Configuration(_) => "config_validation",
        }
    }

    pub fn user_message(&self) -> &'static str {
        match self {
            Self::Domain(_) => "The forecast inputs are incomplete for part of the data.",
            Self::Ingest(_) => "A sales table could not be read. Check the input paths and columns.",
            Self::Export(_) => "The forecast could not be written to the output directory.",
            Self::Configuration(_) => "The configuration is invalid. Run `plancast doctor`.",
        }
    }
}

impl From<TrendError> for ApplicationError {
    fn from(value: TrendError) -> Self {
        Self::Domain(DomainError::Trend(value))
    }
}

impl From<ForecastError> for ApplicationError {
    fn from(value: ForecastError) -> Self {
        Self::Domain(DomainError::Forecast(value))
    }
}

#[cfg(test)]
mod tests {
    use crate::domain::sales::Market;
    use crate::errors::{ApplicationError, ForecastError, TrendError};

    #[test]
    fn missing_seasonality_maps_to_stable_error_class() {
        let error = ApplicationError::from(ForecastError::MissingSeasonality {
            market: Market("EMITAL".to_owned()),
        });

        assert_eq!(error.error_class(), "missing_seasonality");
        assert_eq!(error.to_string(), "market `EMITAL` has no seasonality profile");
    }

    #[test]
    fn insufficient_trend_data_lists_missing_years() {
        let error = ApplicationError::from(TrendError::InsufficientData {
            base_year: 2024,
            comparison_year: 2025,
            missing: vec![2024],
        });

        assert_eq!(error.error_class(), "insufficient_trend_data");
        assert!(error.to_string().contains("[2024]"));
    }

    #[test]
    fn configuration_error_has_user_safe_message() {
        let error = ApplicationError::Configuration("bad year".to_owned());

        assert_eq!(error.error_class(), "config_validation");
        assert_eq!(error.user_message(), "The configuration is invalid. Run `plancast doctor`.");
    }
}

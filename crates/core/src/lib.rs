pub mod aggregation;
pub mod config;
pub mod domain;
pub mod engine;
pub mod errors;
pub mod growth;
pub mod planner;
pub mod seasonality;
pub mod trend;

pub use aggregation::{KpiSummary, MarketTotals, MonthRow};
pub use domain::forecast::ForecastLine;
pub use domain::month::{Month, MonthlyValues, MONTHS_PER_YEAR};
pub use domain::sales::{BaseRecord, HistoricalRecord, Market, ProductLine, RawSalesRow, Sku};
pub use engine::{
    DeterministicForecastEngine, ForecastEngine, ForecastInput, ForecastRun, MarketFailure,
};
pub use errors::{ApplicationError, DomainError, ForecastError, TrendError};
pub use growth::{GrowthOverrides, GrowthRate};
pub use planner::{ForecastPlan, ForecastPlanner, PlanningInputs, PlanningParameters, TrendOutcome};
pub use seasonality::{SeasonalityInputs, SeasonalityProfile, Weights};
pub use trend::{TrendClassification, TrendClassifier, TrendLabel, TrendReport, YearlyLineTotal};

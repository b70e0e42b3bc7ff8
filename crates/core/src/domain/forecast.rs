use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::month::MonthlyValues;
use crate::domain::sales::{Market, ProductLine, Sku};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForecastLine {
    pub market: Market,
    pub product_line: ProductLine,
    pub sku: Sku,
    pub total_prior_year: Decimal,
    pub total_forecast_year: Decimal,
    pub monthly_forecast: MonthlyValues,
}

use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::month::{sum_months, MonthlyValues};

pub const UNKNOWN_MARKET: &str = "MARKET_UNKNOWN";
pub const UNKNOWN_PRODUCT_LINE: &str = "UNKNOWN";
pub const UNKNOWN_SKU: &str = "SKU_UNKNOWN";

#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Market(pub String);

#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ProductLine(pub String);

#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Sku(pub String);

impl fmt::Display for Market {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for ProductLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for Sku {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Market {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<&str> for ProductLine {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<&str> for Sku {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// A sales table row as handed over by a loader, before optional fields are resolved.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RawSalesRow {
    pub year: Option<String>,
    pub market: Option<String>,
    pub product_line: Option<String>,
    pub sku: Option<String>,
    pub monthly_values: MonthlyValues,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HistoricalRecord {
    /// Year as found in the source table; may carry a prefix or suffix around the 4 digits.
    pub year: String,
    pub market: Market,
    pub product_line: ProductLine,
    pub monthly_values: MonthlyValues,
}

impl HistoricalRecord {
    pub fn annual_total(&self) -> Decimal {
        sum_months(&self.monthly_values)
    }
}

impl From<RawSalesRow> for HistoricalRecord {
    fn from(row: RawSalesRow) -> Self {
        Self {
            year: row.year.unwrap_or_default(),
            market: resolve_market(row.market),
            product_line: resolve_product_line(row.product_line),
            monthly_values: row.monthly_values,
        }
    }
}

/// One row of the current-year table the forecast is projected from.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BaseRecord {
    pub market: Market,
    pub product_line: ProductLine,
    pub sku: Sku,
    pub monthly_values: MonthlyValues,
}

impl BaseRecord {
    pub fn annual_total(&self) -> Decimal {
        sum_months(&self.monthly_values)
    }
}

impl From<RawSalesRow> for BaseRecord {
    fn from(row: RawSalesRow) -> Self {
        Self {
            market: resolve_market(row.market),
            product_line: resolve_product_line(row.product_line),
            sku: resolve_sku(row.sku),
            monthly_values: row.monthly_values,
        }
    }
}

fn resolve_market(value: Option<String>) -> Market {
    Market(non_blank(value).unwrap_or_else(|| UNKNOWN_MARKET.to_string()))
}

fn resolve_product_line(value: Option<String>) -> ProductLine {
    ProductLine(non_blank(value).unwrap_or_else(|| UNKNOWN_PRODUCT_LINE.to_string()))
}

fn resolve_sku(value: Option<String>) -> Sku {
    Sku(non_blank(value).unwrap_or_else(|| UNKNOWN_SKU.to_string()))
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.map(|value| value.trim().to_string()).filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::{
        BaseRecord, HistoricalRecord, RawSalesRow, UNKNOWN_MARKET, UNKNOWN_PRODUCT_LINE,
        UNKNOWN_SKU,
    };

    fn raw(product_line: Option<&str>, sku: Option<&str>) -> RawSalesRow {
        RawSalesRow {
            year: Some("2025".to_string()),
            market: Some("EMFRAN".to_string()),
            product_line: product_line.map(str::to_string),
            sku: sku.map(str::to_string),
            monthly_values: [Decimal::TEN; 12],
        }
    }

    #[test]
    fn missing_optional_fields_resolve_to_sentinels() {
        let record = BaseRecord::from(raw(None, Some("   ")));
        assert_eq!(record.product_line.0, UNKNOWN_PRODUCT_LINE);
        assert_eq!(record.sku.0, UNKNOWN_SKU);
        assert_eq!(record.annual_total(), Decimal::new(120, 0));
    }

    #[test]
    fn present_fields_are_trimmed_and_kept() {
        let record = BaseRecord::from(raw(Some(" Skincare "), Some("SKU-1")));
        assert_eq!(record.product_line.0, "Skincare");
        assert_eq!(record.sku.0, "SKU-1");
    }

    #[test]
    fn historical_record_keeps_raw_year_text() {
        let mut row = raw(Some("Haircare"), None);
        row.year = Some("FY2024".to_string());
        let record = HistoricalRecord::from(row);
        assert_eq!(record.year, "FY2024");
        assert_eq!(record.product_line.0, "Haircare");
    }

    #[test]
    fn blank_market_resolves_to_sentinel_for_both_tables() {
        let mut row = raw(Some("Skincare"), Some("SKU-1"));
        row.market = Some("  ".to_string());
        assert_eq!(BaseRecord::from(row.clone()).market.0, UNKNOWN_MARKET);

        row.market = None;
        let record = HistoricalRecord::from(row);
        assert_eq!(record.market.0, UNKNOWN_MARKET);
        assert_eq!(record.product_line.0, "Skincare");
    }
}

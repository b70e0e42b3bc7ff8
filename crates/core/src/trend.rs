//! Year-over-year trend classification per product line.
//!
//! Historical rows are grouped by `(year, product line)`; the two target years are compared and
//! each product line present in both is labelled from its growth percentage.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::domain::sales::{HistoricalRecord, ProductLine};
use crate::errors::TrendError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendLabel {
    Evolving,
    Declining,
    Stable,
}

impl TrendLabel {
    /// Strict in both directions: exactly +5% or -5% is still stable.
    pub fn classify(growth_pct: Decimal) -> Self {
        if growth_pct > Decimal::new(5, 0) {
            Self::Evolving
        } else if growth_pct < Decimal::new(-5, 0) {
            Self::Declining
        } else {
            Self::Stable
        }
    }

    pub fn default_growth_pct(self) -> Decimal {
        match self {
            Self::Evolving => Decimal::new(8, 0),
            Self::Declining => Decimal::new(-6, 0),
            Self::Stable => Decimal::ZERO,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Evolving => "evolving",
            Self::Declining => "declining",
            Self::Stable => "stable",
        }
    }
}

impl fmt::Display for TrendLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearlyLineTotal {
    pub year: i32,
    pub product_line: ProductLine,
    pub total: Decimal,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrendClassification {
    pub product_line: ProductLine,
    pub base_total: Decimal,
    pub comparison_total: Decimal,
    pub growth_pct: Decimal,
    pub label: TrendLabel,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedRecord {
    pub index: usize,
    pub raw_year: String,
    pub reason: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearlyTotals {
    pub totals: Vec<YearlyLineTotal>,
    pub skipped: Vec<SkippedRecord>,
}

impl YearlyTotals {
    pub fn years(&self) -> BTreeSet<i32> {
        self.totals.iter().map(|total| total.year).collect()
    }

    pub fn for_year(&self, year: i32) -> BTreeMap<&ProductLine, Decimal> {
        self.totals
            .iter()
            .filter(|total| total.year == year)
            .map(|total| (&total.product_line, total.total))
            .collect()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrendReport {
    pub base_year: i32,
    pub comparison_year: i32,
    pub classifications: BTreeMap<ProductLine, TrendClassification>,
    pub yearly_totals: Vec<YearlyLineTotal>,
    pub skipped: Vec<SkippedRecord>,
}

impl TrendReport {
    pub fn label_for(&self, product_line: &ProductLine) -> Option<TrendLabel> {
        self.classifications.get(product_line).map(|classification| classification.label)
    }

    /// Growth default seeded into the override map; unclassified lines count as stable.
    pub fn default_growth_for(&self, product_line: &ProductLine) -> Decimal {
        self.label_for(product_line).unwrap_or(TrendLabel::Stable).default_growth_pct()
    }
}

/// Pulls the first run of four consecutive digits out of a year cell (`FY2024`, `2024.0`).
pub fn extract_year(raw: &str) -> Result<i32, TrendError> {
    raw.as_bytes()
        .windows(4)
        .find(|window| window.iter().all(u8::is_ascii_digit))
        .and_then(|digits| std::str::from_utf8(digits).ok())
        .and_then(|digits| digits.parse::<i32>().ok())
        .ok_or_else(|| TrendError::Parse { raw: raw.to_string() })
}

pub fn yearly_line_totals(records: &[HistoricalRecord]) -> YearlyTotals {
    let mut grouped: BTreeMap<(i32, ProductLine), Decimal> = BTreeMap::new();
    let mut skipped = Vec::new();

    for (index, record) in records.iter().enumerate() {
        let year = match extract_year(&record.year) {
            Ok(year) => year,
            Err(error) => {
                warn!(
                    event_name = "forecast.trend.record_skipped",
                    record_index = index,
                    raw_year = %record.year,
                    "historical record excluded from trend aggregation"
                );
                skipped.push(SkippedRecord {
                    index,
                    raw_year: record.year.clone(),
                    reason: error.to_string(),
                });
                continue;
            }
        };

        *grouped.entry((year, record.product_line.clone())).or_insert(Decimal::ZERO) +=
            record.annual_total();
    }

    let totals = grouped
        .into_iter()
        .map(|((year, product_line), total)| YearlyLineTotal { year, product_line, total })
        .collect();

    YearlyTotals { totals, skipped }
}

/// Percentage change from `base_total`; a zero base divides by one instead.
pub fn growth_pct(base_total: Decimal, comparison_total: Decimal) -> Decimal {
    let denominator = if base_total.is_zero() { Decimal::ONE } else { base_total };
    (comparison_total - base_total) / denominator * Decimal::ONE_HUNDRED
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TrendClassifier {
    pub base_year: i32,
    pub comparison_year: i32,
}

impl TrendClassifier {
    pub fn new(base_year: i32, comparison_year: i32) -> Self {
        Self { base_year, comparison_year }
    }

    pub fn classify(&self, records: &[HistoricalRecord]) -> Result<TrendReport, TrendError> {
        let yearly = yearly_line_totals(records);
        let years = yearly.years();

        let missing: Vec<i32> = [self.base_year, self.comparison_year]
            .into_iter()
            .filter(|year| !years.contains(year))
            .collect();
        if !missing.is_empty() {
            return Err(TrendError::InsufficientData {
                base_year: self.base_year,
                comparison_year: self.comparison_year,
                missing,
            });
        }

        let base = yearly.for_year(self.base_year);
        let comparison = yearly.for_year(self.comparison_year);

        let classifications = base
            .iter()
            .filter_map(|(product_line, base_total)| {
                let comparison_total = *comparison.get(product_line)?;
                let growth_pct = growth_pct(*base_total, comparison_total);
                Some((
                    (*product_line).clone(),
                    TrendClassification {
                        product_line: (*product_line).clone(),
                        base_total: *base_total,
                        comparison_total,
                        growth_pct,
                        label: TrendLabel::classify(growth_pct),
                    },
                ))
            })
            .collect();

        Ok(TrendReport {
            base_year: self.base_year,
            comparison_year: self.comparison_year,
            classifications,
            yearly_totals: yearly.totals,
            skipped: yearly.skipped,
        })
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::{
        extract_year, growth_pct, yearly_line_totals, TrendClassifier, TrendLabel,
    };
    use crate::domain::sales::{HistoricalRecord, Market, ProductLine};
    use crate::errors::TrendError;

    fn record(year: &str, market: &str, line: &str, monthly: i64) -> HistoricalRecord {
        HistoricalRecord {
            year: year.to_string(),
            market: Market(market.to_string()),
            product_line: ProductLine(line.to_string()),
            monthly_values: [Decimal::new(monthly, 0); 12],
        }
    }

    #[test]
    fn extracts_first_four_digit_run() {
        assert_eq!(extract_year("2024"), Ok(2024));
        assert_eq!(extract_year("FY2025"), Ok(2025));
        assert_eq!(extract_year("2024.0"), Ok(2024));
        assert_eq!(extract_year("Year 2023 (final)"), Ok(2023));
    }

    #[test]
    fn year_without_four_digits_is_a_parse_error() {
        assert_eq!(extract_year("FY24"), Err(TrendError::Parse { raw: "FY24".to_string() }));
        assert!(extract_year("").is_err());
    }

    #[test]
    fn classification_thresholds_are_strict() {
        assert_eq!(TrendLabel::classify(Decimal::new(5, 0)), TrendLabel::Stable);
        assert_eq!(TrendLabel::classify(Decimal::new(-5, 0)), TrendLabel::Stable);
        assert_eq!(TrendLabel::classify(Decimal::new(501, 2)), TrendLabel::Evolving);
        assert_eq!(TrendLabel::classify(Decimal::new(-501, 2)), TrendLabel::Declining);
        assert_eq!(TrendLabel::classify(Decimal::ZERO), TrendLabel::Stable);
    }

    #[test]
    fn default_growth_follows_label() {
        assert_eq!(TrendLabel::Evolving.default_growth_pct(), Decimal::new(8, 0));
        assert_eq!(TrendLabel::Declining.default_growth_pct(), Decimal::new(-6, 0));
        assert_eq!(TrendLabel::Stable.default_growth_pct(), Decimal::ZERO);
    }

    #[test]
    fn zero_base_total_divides_by_one() {
        let pct = growth_pct(Decimal::ZERO, Decimal::new(200, 0));
        assert_eq!(pct, Decimal::new(20_000, 0));
        assert_eq!(TrendLabel::classify(pct), TrendLabel::Evolving);
    }

    #[test]
    fn totals_aggregate_across_markets_and_skip_bad_years() {
        let records = vec![
            record("2024", "EMFRAN", "Skincare", 10),
            record("2024", "EMSPAI", "Skincare", 5),
            record("n/a", "EMSPAI", "Skincare", 1_000),
            record("2025", "EMFRAN", "Skincare", 20),
        ];

        let yearly = yearly_line_totals(&records);

        assert_eq!(yearly.skipped.len(), 1);
        assert_eq!(yearly.skipped[0].index, 2);
        let totals_2024 = yearly.for_year(2024);
        assert_eq!(totals_2024[&ProductLine("Skincare".to_string())], Decimal::new(180, 0));
        let totals_2025 = yearly.for_year(2025);
        assert_eq!(totals_2025[&ProductLine("Skincare".to_string())], Decimal::new(240, 0));
    }

    #[test]
    fn classifier_labels_lines_present_in_both_years() {
        let records = vec![
            record("2024", "EMFRAN", "Skincare", 100),
            record("2025", "EMFRAN", "Skincare", 110),
            record("2024", "EMFRAN", "Haircare", 100),
            record("2025", "EMFRAN", "Haircare", 90),
            record("2024", "EMFRAN", "Fragrance", 100),
            record("2025", "EMFRAN", "Fragrance", 103),
            record("2025", "EMFRAN", "Bodycare", 50),
        ];

        let report = TrendClassifier::new(2024, 2025).classify(&records).expect("both years");

        assert_eq!(report.label_for(&"Skincare".into()), Some(TrendLabel::Evolving));
        assert_eq!(report.label_for(&"Haircare".into()), Some(TrendLabel::Declining));
        assert_eq!(report.label_for(&"Fragrance".into()), Some(TrendLabel::Stable));
        assert_eq!(report.label_for(&"Bodycare".into()), None);
        assert_eq!(report.default_growth_for(&"Bodycare".into()), Decimal::ZERO);
        assert_eq!(report.default_growth_for(&"Skincare".into()), Decimal::new(8, 0));
        assert_eq!(
            report.classifications[&ProductLine::from("Skincare")].growth_pct,
            Decimal::new(10, 0)
        );
    }

    #[test]
    fn zero_base_year_total_scenario() {
        let records = vec![record("2024", "EMFRAN", "Suncare", 0), {
            let mut comparison = record("2025", "EMFRAN", "Suncare", 0);
            comparison.monthly_values[0] = Decimal::new(200, 0);
            comparison
        }];

        let report = TrendClassifier::new(2024, 2025).classify(&records).expect("both years");
        let classification = &report.classifications[&ProductLine::from("Suncare")];

        assert_eq!(classification.growth_pct, Decimal::new(20_000, 0));
        assert_eq!(classification.label, TrendLabel::Evolving);
    }

    #[test]
    fn missing_target_year_reports_insufficient_data() {
        let records = vec![record("2025", "EMFRAN", "Skincare", 10)];

        let error = TrendClassifier::new(2024, 2025).classify(&records).expect_err("no 2024");

        assert_eq!(
            error,
            TrendError::InsufficientData { base_year: 2024, comparison_year: 2025, missing: vec![2024] }
        );
    }
}

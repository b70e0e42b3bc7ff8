//! Read-only summaries over a forecast run: headline totals, per-market totals for one product
//! line and a month-indexed table of product lines for one market.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::Serialize;

use crate::domain::forecast::ForecastLine;
use crate::domain::month::{Month, MONTHS_PER_YEAR};
use crate::domain::sales::{Market, ProductLine};

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct KpiSummary {
    pub total_prior_year: Decimal,
    pub total_forecast_year: Decimal,
    pub variation_pct: Decimal,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct MarketTotals {
    pub market: Market,
    pub total_prior_year: Decimal,
    pub total_forecast_year: Decimal,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct MonthRow {
    pub month: Month,
    pub values: BTreeMap<ProductLine, Decimal>,
}

pub fn kpi_summary(lines: &[ForecastLine]) -> KpiSummary {
    let total_prior_year: Decimal = lines.iter().map(|line| line.total_prior_year).sum();
    let total_forecast_year: Decimal = lines.iter().map(|line| line.total_forecast_year).sum();
    let variation_pct = if total_prior_year > Decimal::ZERO {
        (total_forecast_year - total_prior_year) / total_prior_year * Decimal::ONE_HUNDRED
    } else {
        Decimal::ZERO
    };

    KpiSummary { total_prior_year, total_forecast_year, variation_pct }
}

pub fn market_totals_for_line(lines: &[ForecastLine], product_line: &ProductLine) -> Vec<MarketTotals> {
    let mut totals: BTreeMap<&Market, (Decimal, Decimal)> = BTreeMap::new();
    for line in lines.iter().filter(|line| &line.product_line == product_line) {
        let entry = totals.entry(&line.market).or_insert((Decimal::ZERO, Decimal::ZERO));
        entry.0 += line.total_prior_year;
        entry.1 += line.total_forecast_year;
    }

    totals
        .into_iter()
        .map(|(market, (total_prior_year, total_forecast_year))| MarketTotals {
            market: market.clone(),
            total_prior_year,
            total_forecast_year,
        })
        .collect()
}

/// Twelve rows, one per month, each holding the summed forecast of every product line sold in
/// `market`.
pub fn monthly_by_line_for_market(lines: &[ForecastLine], market: &Market) -> Vec<MonthRow> {
    let mut by_line: BTreeMap<&ProductLine, [Decimal; MONTHS_PER_YEAR]> = BTreeMap::new();
    for line in lines.iter().filter(|line| &line.market == market) {
        let sums = by_line.entry(&line.product_line).or_insert([Decimal::ZERO; MONTHS_PER_YEAR]);
        for (sum, value) in sums.iter_mut().zip(line.monthly_forecast) {
            *sum += value;
        }
    }

    Month::ALL
        .into_iter()
        .map(|month| MonthRow {
            month,
            values: by_line
                .iter()
                .map(|(product_line, sums)| ((*product_line).clone(), sums[month.index()]))
                .collect(),
        })
        .collect()
}

/// Distinct product lines in first-seen order.
pub fn product_lines(lines: &[ForecastLine]) -> Vec<ProductLine> {
    let mut seen = Vec::new();
    for line in lines {
        if !seen.contains(&line.product_line) {
            seen.push(line.product_line.clone());
        }
    }
    seen
}

/// Distinct markets in first-seen order.
pub fn markets(lines: &[ForecastLine]) -> Vec<Market> {
    let mut seen = Vec::new();
    for line in lines {
        if !seen.contains(&line.market) {
            seen.push(line.market.clone());
        }
    }
    seen
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::{kpi_summary, market_totals_for_line, markets, monthly_by_line_for_market, product_lines};
    use crate::domain::forecast::ForecastLine;
    use crate::domain::month::{sum_months, Month};
    use crate::domain::sales::{Market, ProductLine, Sku};

    fn line(market: &str, product_line: &str, prior: i64, monthly: i64) -> ForecastLine {
        let monthly_forecast = [Decimal::new(monthly, 0); 12];
        ForecastLine {
            market: Market::from(market),
            product_line: ProductLine::from(product_line),
            sku: Sku::from("SKU"),
            total_prior_year: Decimal::new(prior, 0),
            total_forecast_year: sum_months(&monthly_forecast),
            monthly_forecast,
        }
    }

    fn fixture() -> Vec<ForecastLine> {
        vec![
            line("EMFRAN", "Skincare", 100, 10),
            line("EMSPAI", "Skincare", 200, 20),
            line("EMFRAN", "Haircare", 300, 25),
            line("EMFRAN", "Skincare", 50, 5),
        ]
    }

    #[test]
    fn kpi_totals_cover_every_line() {
        let summary = kpi_summary(&fixture());

        assert_eq!(summary.total_prior_year, Decimal::new(650, 0));
        assert_eq!(summary.total_forecast_year, Decimal::new(720, 0));
        assert!(summary.variation_pct > Decimal::new(1076, 2));
        assert!(summary.variation_pct < Decimal::new(1077, 2));
    }

    #[test]
    fn kpi_variation_is_zero_without_prior_sales() {
        let summary = kpi_summary(&[line("EMFRAN", "Skincare", 0, 1)]);
        assert_eq!(summary.variation_pct, Decimal::ZERO);
        assert_eq!(kpi_summary(&[]).total_forecast_year, Decimal::ZERO);
    }

    #[test]
    fn market_totals_sum_to_line_total() {
        let lines = fixture();
        let skincare = ProductLine::from("Skincare");

        let totals = market_totals_for_line(&lines, &skincare);

        assert_eq!(totals.len(), 2);
        assert_eq!(totals[0].market, Market::from("EMFRAN"));
        assert_eq!(totals[0].total_prior_year, Decimal::new(150, 0));
        assert_eq!(totals[0].total_forecast_year, Decimal::new(180, 0));
        let forecast_sum: Decimal = totals.iter().map(|total| total.total_forecast_year).sum();
        let expected: Decimal = lines
            .iter()
            .filter(|line| line.product_line == skincare)
            .map(|line| line.total_forecast_year)
            .sum();
        assert_eq!(forecast_sum, expected);
    }

    #[test]
    fn monthly_table_is_transposed_per_product_line() {
        let lines = fixture();
        let france = Market::from("EMFRAN");

        let rows = monthly_by_line_for_market(&lines, &france);

        assert_eq!(rows.len(), 12);
        assert_eq!(rows[0].month, Month::Jan);
        assert_eq!(rows[11].month, Month::Dec);
        assert_eq!(rows[3].values[&ProductLine::from("Skincare")], Decimal::new(15, 0));
        assert_eq!(rows[3].values[&ProductLine::from("Haircare")], Decimal::new(25, 0));
        let table_total: Decimal = rows.iter().flat_map(|row| row.values.values()).copied().sum();
        let market_total: Decimal = lines
            .iter()
            .filter(|line| line.market == france)
            .map(|line| line.total_forecast_year)
            .sum();
        assert_eq!(table_total, market_total);
    }

    #[test]
    fn selector_options_keep_first_seen_order() {
        let lines = fixture();
        assert_eq!(product_lines(&lines), vec![ProductLine::from("Skincare"), "Haircare".into()]);
        assert_eq!(markets(&lines), vec![Market::from("EMFRAN"), "EMSPAI".into()]);
    }
}

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::Serialize;

use crate::domain::sales::{Market, ProductLine};
use crate::trend::TrendReport;

/// Annual growth percentage per `(market, product line)`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GrowthOverrides {
    rates: BTreeMap<(Market, ProductLine), Decimal>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct GrowthRate {
    pub market: Market,
    pub product_line: ProductLine,
    pub growth_pct: Decimal,
}

impl GrowthOverrides {
    /// Seeds every market/line pair with the trend default; without a trend report every pair
    /// starts stable at 0%.
    pub fn seeded<'a>(
        markets: impl IntoIterator<Item = &'a Market>,
        product_lines: &[ProductLine],
        trend: Option<&TrendReport>,
    ) -> Self {
        let mut rates = BTreeMap::new();
        for market in markets {
            for product_line in product_lines {
                let default = trend
                    .map(|report| report.default_growth_for(product_line))
                    .unwrap_or(Decimal::ZERO);
                rates.insert((market.clone(), product_line.clone()), default);
            }
        }
        Self { rates }
    }

    pub fn set(&mut self, market: Market, product_line: ProductLine, growth_pct: Decimal) {
        self.rates.insert((market, product_line), growth_pct);
    }

    /// Unknown pairs grow by 0%.
    pub fn lookup(&self, market: &Market, product_line: &ProductLine) -> Decimal {
        self.rates
            .get(&(market.clone(), product_line.clone()))
            .copied()
            .unwrap_or(Decimal::ZERO)
    }

    pub fn len(&self) -> usize {
        self.rates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }

    pub fn rates(&self) -> Vec<GrowthRate> {
        self.rates
            .iter()
            .map(|((market, product_line), growth_pct)| GrowthRate {
                market: market.clone(),
                product_line: product_line.clone(),
                growth_pct: *growth_pct,
            })
            .collect()
    }
}

pub fn growth_factor(growth_pct: Decimal) -> Decimal {
    Decimal::ONE + growth_pct / Decimal::ONE_HUNDRED
}

use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

pub const MONTHS_PER_YEAR: usize = 12;

/// Twelve amounts in calendar order, January first.
pub type MonthlyValues = [Decimal; MONTHS_PER_YEAR];

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Month {
    Jan,
    Feb,
    Mar,
    Apr,
    May,
    Jun,
    Jul,
    Aug,
    Sep,
    Oct,
    Nov,
    Dec,
}

impl Month {
    pub const ALL: [Month; MONTHS_PER_YEAR] = [
        Month::Jan,
        Month::Feb,
        Month::Mar,
        Month::Apr,
        Month::May,
        Month::Jun,
        Month::Jul,
        Month::Aug,
        Month::Sep,
        Month::Oct,
        Month::Nov,
        Month::Dec,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn abbreviation(self) -> &'static str {
        match self {
            Self::Jan => "Jan",
            Self::Feb => "Feb",
            Self::Mar => "Mar",
            Self::Apr => "Apr",
            Self::May => "May",
            Self::Jun => "Jun",
            Self::Jul => "Jul",
            Self::Aug => "Aug",
            Self::Sep => "Sep",
            Self::Oct => "Oct",
            Self::Nov => "Nov",
            Self::Dec => "Dec",
        }
    }

    /// Two-digit month code used by raw sales exports (`01` for January).
    pub fn code(self) -> String {
        format!("{:02}", self.index() + 1)
    }

    /// Resolves a month column header given either as a two-digit code or an abbreviation.
    pub fn from_column(header: &str) -> Option<Self> {
        let header = header.trim();
        Self::ALL.into_iter().find(|month| {
            month.abbreviation().eq_ignore_ascii_case(header) || month.code() == header
        })
    }
}

impl fmt::Display for Month {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.abbreviation())
    }
}

pub fn sum_months(values: &MonthlyValues) -> Decimal {
    values.iter().copied().sum()
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::{sum_months, Month};

    #[test]
    fn month_codes_map_to_abbreviations() {
        assert_eq!(Month::from_column("01"), Some(Month::Jan));
        assert_eq!(Month::from_column("12"), Some(Month::Dec));
        assert_eq!(Month::from_column(" sep "), Some(Month::Sep));
        assert_eq!(Month::from_column("13"), None);
        assert_eq!(Month::from_column("1"), None);
    }

    #[test]
    fn months_are_in_calendar_order() {
        let indexes: Vec<usize> = Month::ALL.iter().map(|month| month.index()).collect();
        assert_eq!(indexes, (0..12).collect::<Vec<_>>());
        assert_eq!(Month::Oct.code(), "10");
    }

    #[test]
    fn sums_all_twelve_months() {
        let values = [Decimal::new(150, 2); 12];
        assert_eq!(sum_months(&values), Decimal::new(1800, 2));
    }
}

use std::path::{Path, PathBuf};
use std::str::FromStr;

use csv::{ReaderBuilder, StringRecord, Trim};
use plancast_core::{BaseRecord, HistoricalRecord, Month, MonthlyValues, RawSalesRow, MONTHS_PER_YEAR};
use rust_decimal::Decimal;
use tracing::debug;

use crate::error::IngestError;

pub const YEAR_COLUMN: &str = "Year";
pub const MARKET_COLUMN: &str = "Sales District";
pub const PRODUCT_LINE_COLUMN: &str = "Product Line2";
pub const SKU_COLUMN: &str = "Product";

/// Positions of the known columns in one table's header row.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ColumnLayout {
    pub year: Option<usize>,
    pub market: usize,
    pub product_line: Option<usize>,
    pub sku: Option<usize>,
    pub months: [usize; MONTHS_PER_YEAR],
}

impl ColumnLayout {
    /// Month columns may be named `01`..`12` or `Jan`..`Dec`.
    pub fn resolve(path: &Path, headers: &StringRecord) -> Result<Self, IngestError> {
        let find = |name: &str| headers.iter().position(|header| header.trim() == name);
        let missing = |column: &str| IngestError::MissingColumn {
            path: path.to_path_buf(),
            column: column.to_string(),
        };

        let mut months = [None; MONTHS_PER_YEAR];
        for (index, header) in headers.iter().enumerate() {
            if let Some(month) = Month::from_column(header) {
                months[month.index()].get_or_insert(index);
            }
        }

        let mut resolved = [0; MONTHS_PER_YEAR];
        for month in Month::ALL {
            resolved[month.index()] = months[month.index()].ok_or_else(|| missing(month.abbreviation()))?;
        }

        Ok(Self {
            year: find(YEAR_COLUMN),
            market: find(MARKET_COLUMN).ok_or_else(|| missing(MARKET_COLUMN))?,
            product_line: find(PRODUCT_LINE_COLUMN),
            sku: find(SKU_COLUMN),
            months: resolved,
        })
    }
}

/// Reads every data row of a sales table; optional fields stay unresolved.
pub fn read_rows(path: &Path) -> Result<Vec<RawSalesRow>, IngestError> {
    let mut reader = ReaderBuilder::new()
        .trim(Trim::All)
        .flexible(true)
        .from_path(path)
        .map_err(|source| IngestError::Open { path: path.to_path_buf(), source })?;

    let headers = reader
        .headers()
        .map_err(|source| IngestError::Csv { path: path.to_path_buf(), source })?
        .clone();
    let layout = ColumnLayout::resolve(path, &headers)?;

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result.map_err(|source| IngestError::Csv { path: path.to_path_buf(), source })?;
        if record.iter().all(|cell| cell.is_empty()) {
            continue;
        }
        rows.push(parse_row(path, &layout, &record)?);
    }

    debug!(
        event_name = "ingest.table.loaded",
        path = %path.display(),
        row_count = rows.len(),
        "sales table loaded"
    );
    Ok(rows)
}

pub fn load_historical(path: &Path) -> Result<Vec<HistoricalRecord>, IngestError> {
    Ok(read_rows(path)?.into_iter().map(HistoricalRecord::from).collect())
}

pub fn load_base(path: &Path) -> Result<Vec<BaseRecord>, IngestError> {
    Ok(read_rows(path)?.into_iter().map(BaseRecord::from).collect())
}

fn parse_row(
    path: &Path,
    layout: &ColumnLayout,
    record: &StringRecord,
) -> Result<RawSalesRow, IngestError> {
    let line = record.position().map(|position| position.line()).unwrap_or_default();
    let cell = |index: usize| record.get(index).map(str::trim).filter(|value| !value.is_empty());

    let mut monthly_values: MonthlyValues = [Decimal::ZERO; MONTHS_PER_YEAR];
    for month in Month::ALL {
        if let Some(raw) = cell(layout.months[month.index()]) {
            monthly_values[month.index()] = parse_amount(raw).ok_or_else(|| {
                IngestError::InvalidNumber {
                    path: PathBuf::from(path),
                    line,
                    column: month.abbreviation().to_string(),
                    value: raw.to_string(),
                }
            })?;
        }
    }

    Ok(RawSalesRow {
        year: layout.year.and_then(cell).map(str::to_string),
        market: cell(layout.market).map(str::to_string),
        product_line: layout.product_line.and_then(cell).map(str::to_string),
        sku: layout.sku.and_then(cell).map(str::to_string),
        monthly_values,
    })
}

/// Empty cells are handled by the caller; this accepts plain and scientific notation.
fn parse_amount(raw: &str) -> Option<Decimal> {
    Decimal::from_str(raw).or_else(|_| Decimal::from_scientific(raw)).ok()
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use csv::StringRecord;
    use plancast_core::domain::sales::UNKNOWN_MARKET;
    use plancast_core::{ProductLine, TrendClassifier};
    use rust_decimal::Decimal;
    use tempfile::NamedTempFile;

    use super::{load_base, load_historical, ColumnLayout};
    use crate::error::IngestError;

    fn table(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().expect("temp file");
        file.write_all(contents.as_bytes()).expect("write table");
        file
    }

    #[test]
    fn month_codes_and_abbreviations_both_resolve() {
        let path = std::path::Path::new("t.csv");
        let coded = StringRecord::from(vec![
            "Sales District", "01", "02", "03", "04", "05", "06", "07", "08", "09", "10", "11", "12",
        ]);
        let named = StringRecord::from(vec![
            "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
            "Sales District",
        ]);

        let coded = ColumnLayout::resolve(path, &coded).expect("coded headers");
        let named = ColumnLayout::resolve(path, &named).expect("named headers");

        assert_eq!(coded.market, 0);
        assert_eq!(coded.months[0], 1);
        assert_eq!(named.market, 12);
        assert_eq!(named.months[11], 11);
        assert_eq!(named.year, None);
    }

    #[test]
    fn base_table_resolves_sentinels_and_blank_months() {
        let file = table(
            "Sales District,Product Line2,Product,01,02,03,04,05,06,07,08,09,10,11,12\n\
             EMFRAN,Skincare,SK-1,10,10,10,10,10,10,10,10,10,10,10,10\n\
             EMSPAI,,,1.5,,,,,,,,,,,2\n",
        );

        let records = load_base(file.path()).expect("base table");

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].annual_total(), Decimal::new(120, 0));
        assert_eq!(records[1].product_line.0, "UNKNOWN");
        assert_eq!(records[1].sku.0, "SKU_UNKNOWN");
        assert_eq!(records[1].annual_total(), Decimal::new(35, 1));
    }

    #[test]
    fn historical_table_keeps_raw_year_cells() {
        let file = table(
            "Year,Sales District,Product Line2,Jan,Feb,Mar,Apr,May,Jun,Jul,Aug,Sep,Oct,Nov,Dec\n\
             FY2024,EMFRAN,Skincare,1,1,1,1,1,1,1,1,1,1,1,1\n\
             ,EMFRAN,Skincare,1,1,1,1,1,1,1,1,1,1,1,1\n",
        );

        let records = load_historical(file.path()).expect("historical table");

        assert_eq!(records[0].year, "FY2024");
        assert_eq!(records[1].year, "");
    }

    #[test]
    fn blank_market_cell_keeps_the_base_row() {
        let file = table(
            "Sales District,Product Line2,Product,01,02,03,04,05,06,07,08,09,10,11,12\n\
             EMFRAN,Skincare,SK-1,10,10,10,10,10,10,10,10,10,10,10,10\n\
             ,Skincare,SK-2,5,5,5,5,5,5,5,5,5,5,5,5\n",
        );

        let records = load_base(file.path()).expect("blank market is not fatal");

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].market.0, "EMFRAN");
        assert_eq!(records[1].market.0, UNKNOWN_MARKET);
        assert_eq!(records[1].sku.0, "SK-2");
        assert_eq!(records[1].annual_total(), Decimal::new(60, 0));
    }

    #[test]
    fn blank_market_cell_keeps_the_historical_row_in_line_totals() {
        let file = table(
            "Year,Sales District,Product Line2,01,02,03,04,05,06,07,08,09,10,11,12\n\
             2024,EMFRAN,Skincare,10,10,10,10,10,10,10,10,10,10,10,10\n\
             2025,EMFRAN,Skincare,10,10,10,10,10,10,10,10,10,10,10,10\n\
             2025,,Skincare,1,1,1,1,1,1,1,1,1,1,1,1\n",
        );

        let records = load_historical(file.path()).expect("blank market is not fatal");
        let report = TrendClassifier::new(2024, 2025).classify(&records).expect("both years present");

        assert_eq!(records.len(), 3);
        assert_eq!(records[2].market.0, UNKNOWN_MARKET);
        let skincare = &report.classifications[&ProductLine::from("Skincare")];
        assert_eq!(skincare.base_total, Decimal::new(120, 0));
        assert_eq!(skincare.comparison_total, Decimal::new(132, 0));
        assert_eq!(skincare.growth_pct, Decimal::new(10, 0));
    }

    #[test]
    fn missing_month_column_is_reported() {
        let file = table("Sales District,01,02,03,04,05,06,07,08,09,10,11\nEMFRAN,1,1,1,1,1,1,1,1,1,1,1\n");

        let error = load_base(file.path()).expect_err("december is missing");

        assert!(matches!(error, IngestError::MissingColumn { ref column, .. } if column == "Dec"));
    }

    #[test]
    fn non_numeric_amount_reports_line_and_column() {
        let file = table(
            "Sales District,01,02,03,04,05,06,07,08,09,10,11,12\n\
             EMFRAN,1,1,1,1,1,1,1,1,1,1,1,1\n\
             EMFRAN,1,1,n/a,1,1,1,1,1,1,1,1,1\n",
        );

        let error = load_base(file.path()).expect_err("n/a is not a number");

        match error {
            IngestError::InvalidNumber { line, column, value, .. } => {
                assert_eq!(line, 3);
                assert_eq!(column, "Mar");
                assert_eq!(value, "n/a");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn absent_file_is_an_open_error() {
        let error = load_base(std::path::Path::new("/nonexistent/plancast/base.csv"))
            .expect_err("file does not exist");
        assert!(matches!(error, IngestError::Open { .. }));
    }
}

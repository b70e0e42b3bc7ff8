use std::fs;
use std::path::{Path, PathBuf};

use plancast_core::config::ExportFormat;
use plancast_core::{ForecastLine, Month};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use rust_xlsxwriter::{Format, Workbook, XlsxError};
use serde::ser::SerializeSeq;
use serde::{Serialize, Serializer};
use tracing::info;

use crate::error::ExportError;

/// Leading text columns before the amount columns.
pub const TEXT_COLUMNS: usize = 3;

/// The flattened forecast table, named after the forecast year.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ExportTable {
    pub sheet: String,
    pub columns: Vec<String>,
    pub rows: Vec<ExportRow>,
}

/// One SKU line: market, product line and SKU, then the prior-year total,
/// the forecast total and the twelve monthly amounts.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExportRow {
    pub market: String,
    pub product_line: String,
    pub sku: String,
    pub amounts: Vec<Decimal>,
}

impl ExportRow {
    fn from_line(line: &ForecastLine) -> Self {
        let mut amounts = vec![line.total_prior_year, line.total_forecast_year];
        amounts.extend(line.monthly_forecast.iter().copied());
        Self {
            market: line.market.to_string(),
            product_line: line.product_line.to_string(),
            sku: line.sku.to_string(),
            amounts,
        }
    }

    pub fn text(&self) -> [&str; TEXT_COLUMNS] {
        [self.market.as_str(), self.product_line.as_str(), self.sku.as_str()]
    }

    /// Cells as written to CSV, amounts at their stored scale.
    pub fn cells(&self) -> Vec<String> {
        self.text()
            .iter()
            .map(|value| value.to_string())
            .chain(self.amounts.iter().map(Decimal::to_string))
            .collect()
    }
}

/// Rows serialize as flat arrays: text cells as strings, amounts as numbers.
impl Serialize for ExportRow {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(TEXT_COLUMNS + self.amounts.len()))?;
        for value in self.text() {
            seq.serialize_element(value)?;
        }
        for amount in &self.amounts {
            seq.serialize_element(&as_number(*amount))?;
        }
        seq.end()
    }
}

impl ExportTable {
    pub fn new(lines: &[ForecastLine], prior_year: i32, forecast_year: i32) -> Self {
        let mut columns = vec![
            "Market".to_string(),
            "Product Line".to_string(),
            "SKU".to_string(),
            format!("Total_{prior_year}"),
            format!("Total_{forecast_year}"),
        ];
        columns.extend(Month::ALL.iter().map(|month| month.abbreviation().to_string()));

        let rows = lines.iter().map(ExportRow::from_line).collect();

        Self { sheet: sheet_name(forecast_year), columns, rows }
    }
}

pub fn sheet_name(forecast_year: i32) -> String {
    format!("Forecast{forecast_year}")
}

pub fn file_name(forecast_year: i32, format: ExportFormat) -> String {
    format!("Forecast_{forecast_year}.{}", format.extension())
}

/// Writes the table into `output_dir` and returns the file path.
pub fn export_forecast(
    table: &ExportTable,
    forecast_year: i32,
    format: ExportFormat,
    output_dir: &Path,
) -> Result<PathBuf, ExportError> {
    fs::create_dir_all(output_dir)
        .map_err(|source| ExportError::CreateDir { path: output_dir.to_path_buf(), source })?;
    let path = output_dir.join(file_name(forecast_year, format));

    match format {
        ExportFormat::Xlsx => write_xlsx(table, &path)
            .map_err(|source| ExportError::Xlsx { path: path.clone(), source })?,
        ExportFormat::Csv => write_csv(table, &path)?,
        ExportFormat::Json => {
            let payload = serde_json::to_string_pretty(table)?;
            fs::write(&path, payload)
                .map_err(|source| ExportError::Write { path: path.clone(), source })?;
        }
    }

    info!(
        event_name = "export.forecast.written",
        path = %path.display(),
        sheet = %table.sheet,
        format = format.extension(),
        row_count = table.rows.len(),
        "forecast exported"
    );
    Ok(path)
}

fn as_number(amount: Decimal) -> f64 {
    amount.to_f64().unwrap_or_default()
}

fn write_xlsx(table: &ExportTable, path: &Path) -> Result<(), XlsxError> {
    let header = Format::new().set_bold();
    let amount = Format::new().set_num_format("#,##0.00");

    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(&table.sheet)?;

    for (col, name) in (0u16..).zip(&table.columns) {
        worksheet.write_string_with_format(0, col, name, &header)?;
    }
    let first_amount = TEXT_COLUMNS as u16;
    for (row, record) in (1u32..).zip(&table.rows) {
        for (col, value) in (0u16..).zip(record.text()) {
            worksheet.write_string(row, col, value)?;
        }
        for (col, value) in (first_amount..).zip(&record.amounts) {
            worksheet.write_number_with_format(row, col, as_number(*value), &amount)?;
        }
    }
    worksheet.set_freeze_panes(1, 0)?;

    workbook.save(path)
}

fn write_csv(table: &ExportTable, path: &Path) -> Result<(), ExportError> {
    let csv_error = |source| ExportError::Csv { path: path.to_path_buf(), source };

    let mut writer = csv::Writer::from_path(path).map_err(csv_error)?;
    writer.write_record(&table.columns).map_err(csv_error)?;
    for row in &table.rows {
        writer.write_record(row.cells()).map_err(csv_error)?;
    }
    writer
        .flush()
        .map_err(|source| ExportError::Write { path: path.to_path_buf(), source })
}

use std::fs;
use std::path::{Path, PathBuf};

use plancast_core::Month;

use crate::error::ExportError;
use crate::table::{MARKET_COLUMN, PRODUCT_LINE_COLUMN, SKU_COLUMN, YEAR_COLUMN};

const DEMO_MARKETS: &[&str] = &["EMFRAN", "EMMORO", "EMSPAI", "EMITAL"];

/// Product lines with their year-over-year change in percent.
const DEMO_LINES: &[(&str, i64)] = &[("Skincare", 12), ("Haircare", -9), ("Fragrance", 2)];

const DEMO_SKUS_PER_LINE: usize = 2;

const DEMO_SCENARIO: &str = r#"# Growth and seasonality adjustments applied on top of the trend defaults.
[growth.EMSPAI]
Fragrance = 4.5

[seasonality]
EMITAL = [6, 6, 8, 8, 8, 9, 10, 6, 8, 9, 10, 12]
"#;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DemoFiles {
    pub historical_path: PathBuf,
    pub base_path: PathBuf,
    pub scenario_path: PathBuf,
}

/// Deterministic two-year sales history plus a current-year table for demos and smoke runs.
pub struct DemoDataset;

impl DemoDataset {
    pub const HISTORY_YEARS: [i32; 2] = [2024, 2025];
    pub const BASE_YEAR: i32 = 2025;

    pub fn write(output_dir: &Path) -> Result<DemoFiles, ExportError> {
        fs::create_dir_all(output_dir)
            .map_err(|source| ExportError::CreateDir { path: output_dir.to_path_buf(), source })?;

        let files = DemoFiles {
            historical_path: output_dir.join("historical.csv"),
            base_path: output_dir.join("base.csv"),
            scenario_path: output_dir.join("scenario.toml"),
        };

        write_rows(&files.historical_path, &historical_header(), historical_rows())?;
        write_rows(&files.base_path, &base_header(), base_rows())?;
        fs::write(&files.scenario_path, DEMO_SCENARIO).map_err(|source| ExportError::Write {
            path: files.scenario_path.clone(),
            source,
        })?;

        Ok(files)
    }

    pub fn market_count() -> usize {
        DEMO_MARKETS.len()
    }

    pub fn base_row_count() -> usize {
        DEMO_MARKETS.len() * DEMO_LINES.len() * DEMO_SKUS_PER_LINE
    }
}

/// Month cells of one SKU for one year; 2024 is the reference level.
fn monthly_amounts(year: i32, market_index: usize, line_change_pct: i64, sku_index: usize) -> Vec<i64> {
    Month::ALL
        .iter()
        .map(|month| {
            let level = 100 + 20 * market_index as i64 + 15 * sku_index as i64 + 3 * month.index() as i64;
            let years_after_reference = i64::from(year - DemoDataset::HISTORY_YEARS[0]);
            level * (100 + line_change_pct * years_after_reference) / 100
        })
        .collect()
}

fn historical_header() -> Vec<String> {
    let mut header =
        vec![YEAR_COLUMN.to_string(), MARKET_COLUMN.to_string(), PRODUCT_LINE_COLUMN.to_string()];
    header.extend(Month::ALL.iter().map(|month| month.code()));
    header
}

fn base_header() -> Vec<String> {
    let mut header = vec![
        MARKET_COLUMN.to_string(),
        PRODUCT_LINE_COLUMN.to_string(),
        SKU_COLUMN.to_string(),
    ];
    header.extend(Month::ALL.iter().map(|month| month.abbreviation().to_string()));
    header
}

fn historical_rows() -> Vec<Vec<String>> {
    let mut rows = Vec::new();
    for year in DemoDataset::HISTORY_YEARS {
        for (market_index, market) in DEMO_MARKETS.iter().enumerate() {
            for (line, change_pct) in DEMO_LINES {
                for sku_index in 0..DEMO_SKUS_PER_LINE {
                    let mut row = vec![year.to_string(), market.to_string(), line.to_string()];
                    row.extend(
                        monthly_amounts(year, market_index, *change_pct, sku_index)
                            .into_iter()
                            .map(|amount| amount.to_string()),
                    );
                    rows.push(row);
                }
            }
        }
    }

    // Spreadsheet exports often end with a totals row that carries no year.
    let mut totals = vec!["Total".to_string(), "All".to_string(), String::new()];
    totals.extend(Month::ALL.iter().map(|_| "0".to_string()));
    rows.push(totals);
    rows
}

fn base_rows() -> Vec<Vec<String>> {
    let mut rows = Vec::new();
    for (market_index, market) in DEMO_MARKETS.iter().enumerate() {
        for (line_index, (line, change_pct)) in DEMO_LINES.iter().enumerate() {
            for sku_index in 0..DEMO_SKUS_PER_LINE {
                // One SKU cell is left blank to exercise sentinel resolution.
                let sku = if market_index == 0 && line_index == 0 && sku_index == 1 {
                    String::new()
                } else {
                    format!("{}-{:03}", &line[..2].to_ascii_uppercase(), line_index * 10 + sku_index)
                };
                let mut row = vec![market.to_string(), line.to_string(), sku];
                row.extend(
                    monthly_amounts(DemoDataset::BASE_YEAR, market_index, *change_pct, sku_index)
                        .into_iter()
                        .map(|amount| amount.to_string()),
                );
                rows.push(row);
            }
        }
    }
    rows
}

fn write_rows(path: &Path, header: &[String], rows: Vec<Vec<String>>) -> Result<(), ExportError> {
    let csv_error = |source| ExportError::Csv { path: path.to_path_buf(), source };

    let mut writer = csv::Writer::from_path(path).map_err(csv_error)?;
    writer.write_record(header).map_err(csv_error)?;
    for row in rows {
        writer.write_record(&row).map_err(csv_error)?;
    }
    writer.flush().map_err(|source| ExportError::Write { path: path.to_path_buf(), source })
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::DemoDataset;
    use crate::table::{load_base, load_historical};

    #[test]
    fn demo_tables_load_with_expected_shapes() {
        let dir = TempDir::new().expect("temp dir");

        let files = DemoDataset::write(dir.path()).expect("demo files");
        let historical = load_historical(&files.historical_path).expect("historical");
        let base = load_base(&files.base_path).expect("base");

        assert_eq!(historical.len(), DemoDataset::base_row_count() * 2 + 1);
        assert_eq!(base.len(), DemoDataset::base_row_count());
        assert_eq!(base[1].sku.0, "SKU_UNKNOWN");
        assert_eq!(base[0].sku.0, "SK-000");
        assert!(files.scenario_path.exists());
    }

    #[test]
    fn demo_is_deterministic() {
        let first = TempDir::new().expect("temp dir");
        let second = TempDir::new().expect("temp dir");

        let a = DemoDataset::write(first.path()).expect("first");
        let b = DemoDataset::write(second.path()).expect("second");

        assert_eq!(
            std::fs::read_to_string(a.base_path).expect("read"),
            std::fs::read_to_string(b.base_path).expect("read")
        );
    }
}

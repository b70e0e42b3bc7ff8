use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("could not open `{path}`: {source}")]
    Open { path: PathBuf, source: csv::Error },
    #[error("malformed csv in `{path}`: {source}")]
    Csv { path: PathBuf, source: csv::Error },
    #[error("`{path}` is missing required column `{column}`")]
    MissingColumn { path: PathBuf, column: String },
    #[error("`{path}` line {line}: `{value}` in column `{column}` is not a number")]
    InvalidNumber { path: PathBuf, line: u64, column: String, value: String },
    #[error("could not read parameter file `{path}`: {source}")]
    ReadParameters { path: PathBuf, source: std::io::Error },
    #[error("could not parse parameter file `{path}`: {source}")]
    ParseParameters { path: PathBuf, source: toml::de::Error },
    #[error("parameter file `{path}`: {message}")]
    InvalidParameters { path: PathBuf, message: String },
}

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("could not create output directory `{path}`: {source}")]
    CreateDir { path: PathBuf, source: std::io::Error },
    #[error("could not write `{path}`: {source}")]
    Write { path: PathBuf, source: std::io::Error },
    #[error("csv export to `{path}` failed: {source}")]
    Csv { path: PathBuf, source: csv::Error },
    #[error("xlsx export to `{path}` failed: {source}")]
    Xlsx { path: PathBuf, source: rust_xlsxwriter::XlsxError },
    #[error("json export failed: {0}")]
    Json(#[from] serde_json::Error),
}

use chrono::NaiveDate;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProberError {
    #[error("Invalid station id {0:?}: at least 4 alphanumeric characters required")]
    InvalidStationId(String),

    #[error("Invalid date range: start {start} is after end {end}")]
    InvalidDateRange { start: NaiveDate, end: NaiveDate },

    #[error("Parallelism must be at least 1")]
    InvalidParallelism,

    #[error("Unsupported RINEX version: {0} (expected 2, 3 or 4)")]
    UnsupportedRinexVersion(u8),

    #[error("Unsupported archive URL {0:?}: expected an ftp:// or https:// template")]
    UnsupportedUrl(String),

    #[error("Pattern error: {0}")]
    PatternError(#[from] glob::PatternError),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Request error: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),
}

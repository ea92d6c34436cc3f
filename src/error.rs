use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MapError {
    #[error("No data found for country code: {0}")]
    NoData(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("ZIP archive error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("No CSV entry found in archive: {0:?}")]
    MissingCsvEntry(PathBuf),
}

/// 1レコード分の緯度経度が不正な場合のエラー。抽出処理の中で破棄される。
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CoordinateError {
    #[error("Malformed {field}: {value:?}")]
    Malformed { field: &'static str, value: String },

    #[error("{field} out of range: {value}")]
    OutOfRange { field: &'static str, value: f64 },
}

pub type Result<T> = std::result::Result<T, MapError>;

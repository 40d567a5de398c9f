//! エラー型定義

use thiserror::Error;

/// 共通エラー型
///
/// カード構築時の検証エラーは必ず対象カードの index を含む。
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Config(String),

    #[error("card {index}: missing required field `{field}`")]
    MissingField { index: usize, field: &'static str },

    #[error("card {index}: row_index {row} is out of range (dataset has {rows} rows)")]
    RowOutOfRange { index: usize, row: usize, rows: usize },

    #[error("card {index}: dataset `{reference}` could not be resolved: {reason}")]
    Dataset {
        index: usize,
        reference: String,
        reason: String,
    },

    #[error("unknown dataset reference: {0}")]
    UnknownDataset(String),

    #[error("unsupported dataset format: {0} (use CSV or Excel files)")]
    UnsupportedFormat(String),

    #[error("dataset `{reference}`: duplicate column name `{column}`")]
    DuplicateColumn { reference: String, column: String },

    #[error("dataset `{reference}`: row {row} has {found} cells, expected {expected}")]
    RaggedRow {
        reference: String,
        row: usize,
        found: usize,
        expected: usize,
    },

    #[error("Workbook error: {0}")]
    Workbook(String),
}

/// Result型エイリアス
pub type Result<T> = std::result::Result<T, Error>;

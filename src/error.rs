use thiserror::Error;

#[derive(Error, Debug)]
pub enum SwipeCardsError {
    #[error("設定エラー: {0}")]
    Config(String),

    #[error("ファイルが見つかりません: {0}")]
    FileNotFound(String),

    #[error("カード定義エラー: {0}")]
    Cards(#[from] swipecards_common::Error),

    #[error("JSON解析エラー: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("IOエラー: {0}")]
    Io(#[from] std::io::Error),

    #[error("表計算ファイル読み込みエラー: {0}")]
    Spreadsheet(#[from] calamine::Error),

    #[error("CSV解析エラー: {path} {line}行目: {reason}")]
    CsvParse {
        path: String,
        line: usize,
        reason: String,
    },

    #[error("Excel生成エラー: {0}")]
    ExcelGeneration(#[from] rust_xlsxwriter::XlsxError),

    #[error("操作スクリプトが不正: {0}")]
    InvalidScript(String),

    #[error("CLI実行エラー: {0}")]
    CliExecution(String),
}

impl SwipeCardsError {
    /// データセット解決の境界で共通エラーに戻す
    pub fn into_common(self) -> swipecards_common::Error {
        match self {
            SwipeCardsError::Cards(e) => e,
            SwipeCardsError::Io(e) => swipecards_common::Error::Io(e),
            SwipeCardsError::JsonParse(e) => swipecards_common::Error::Json(e),
            other => swipecards_common::Error::Workbook(other.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, SwipeCardsError>;

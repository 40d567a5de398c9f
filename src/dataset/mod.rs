//! データセット解決
//!
//! カードが参照する表データファイル（CSV / Excel）を読み込む。
//! 同じ参照は `DatasetCache` で一度だけ読む。

pub mod cache;
pub mod csv;
pub mod excel;

pub use cache::{CacheStats, DatasetCache};

use crate::error::{Result, SwipeCardsError};
use std::path::Path;
use swipecards_common::TableData;

/// 対応フォーマット
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatasetFormat {
    Csv,
    Excel,
}

impl DatasetFormat {
    /// 拡張子から判定（大文字小文字は区別しない）
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_lowercase();
        match ext.as_str() {
            "csv" => Some(DatasetFormat::Csv),
            "xlsx" | "xls" | "xlsm" | "ods" => Some(DatasetFormat::Excel),
            _ => None,
        }
    }
}

/// データセットを読み込む（キャッシュなし）
pub fn load_dataset(path: &Path, reference: &str) -> Result<TableData> {
    let format = DatasetFormat::from_path(path)
        .ok_or_else(|| swipecards_common::Error::UnsupportedFormat(reference.to_string()))?;
    if !path.exists() {
        return Err(SwipeCardsError::FileNotFound(path.display().to_string()));
    }

    match format {
        DatasetFormat::Csv => csv::load_csv(path, reference),
        DatasetFormat::Excel => excel::load_workbook(path, reference),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_detection() {
        assert_eq!(DatasetFormat::from_path(Path::new("a.CSV")), Some(DatasetFormat::Csv));
        assert_eq!(DatasetFormat::from_path(Path::new("b.xlsx")), Some(DatasetFormat::Excel));
        assert_eq!(DatasetFormat::from_path(Path::new("c.xls")), Some(DatasetFormat::Excel));
        assert_eq!(DatasetFormat::from_path(Path::new("d.json")), None);
        assert_eq!(DatasetFormat::from_path(Path::new("noext")), None);
    }

    #[test]
    fn test_unsupported_format_checked_before_existence() {
        let result = load_dataset(Path::new("/nonexistent/data.parquet"), "data.parquet");
        assert!(matches!(
            result,
            Err(SwipeCardsError::Cards(swipecards_common::Error::UnsupportedFormat(_)))
        ));
    }

    #[test]
    fn test_missing_file() {
        let result = load_dataset(Path::new("/nonexistent/data.csv"), "data.csv");
        assert!(matches!(result, Err(SwipeCardsError::FileNotFound(_))));
    }
}

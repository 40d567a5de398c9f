pub mod excel;
pub mod json;

use crate::cli::ExportFormat;
use crate::error::Result;
use std::path::{Path, PathBuf};
use swipecards_common::{Card, SwipeResults};

fn output_path_for_format(output: &Path, title: &str, extension: &str) -> PathBuf {
    if output.is_dir() || output.extension().is_none() {
        output.join(format!("{}.{}", title, extension))
    } else {
        output.to_path_buf()
    }
}

fn output_paths_for_both(output: &Path, title: &str) -> (PathBuf, PathBuf) {
    if output.is_dir() || output.extension().is_none() {
        (
            output.join(format!("{}.json", title)),
            output.join(format!("{}.xlsx", title)),
        )
    } else {
        let parent = output.parent().unwrap_or_else(|| Path::new("."));
        let stem = output
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or(title);
        (
            parent.join(format!("{}.json", stem)),
            parent.join(format!("{}.xlsx", stem)),
        )
    }
}

/// 既定の出力名（日時入り）
pub fn default_title() -> String {
    format!("swipe-results-{}", chrono::Local::now().format("%Y%m%d-%H%M%S"))
}

/// 結果を書き出す。書き出したファイルのパスを返す
pub fn export_results(
    results: &SwipeResults,
    cards: &[Card],
    format: &ExportFormat,
    output_dir: &Path,
    title: &str,
) -> Result<Vec<PathBuf>> {
    let written = match format {
        ExportFormat::Json => {
            let path = output_path_for_format(output_dir, title, "json");
            println!("- JSONを生成中...");
            json::write_report(results, cards, &path)?;
            vec![path]
        }
        ExportFormat::Excel => {
            let path = output_path_for_format(output_dir, title, "xlsx");
            println!("- Excelを生成中...");
            excel::write_workbook(results, cards, &path)?;
            vec![path]
        }
        ExportFormat::Both => {
            let (json_path, excel_path) = output_paths_for_both(output_dir, title);
            println!("- JSONを生成中...");
            json::write_report(results, cards, &json_path)?;
            println!("- Excelを生成中...");
            excel::write_workbook(results, cards, &excel_path)?;
            vec![json_path, excel_path]
        }
    };

    for path in &written {
        println!("✔ 出力: {}", path.display());
    }
    Ok(written)
}

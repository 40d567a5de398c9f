//! Excel出力（CLI版）
//!
//! 集計・履歴シートは共通ライブラリで生成し、
//! 表カードがあればデータセットごとに判定列を付けたシートを別ファイルに出す。

use crate::error::{Result, SwipeCardsError};
use rust_xlsxwriter::{Color, Format, FormatBorder, Workbook};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use swipecards_common::export::results_excel::generate_results_buffer;
use swipecards_common::{Action, Card, SwipeResults, TableData};

/// 結果ワークブックを書き出す
pub fn write_workbook(results: &SwipeResults, cards: &[Card], path: &Path) -> Result<()> {
    let buffer = generate_results_buffer(results, |index| {
        cards.get(index).map(|c| c.title().to_string())
    })?;
    std::fs::write(path, buffer)?;

    if cards.iter().any(|c| c.table().is_some()) {
        let annotated = annotated_path(path);
        write_annotated_datasets(results, cards, &annotated)?;
        println!("✔ 判定付きデータ: {}", annotated.display());
    }
    Ok(())
}

fn annotated_path(path: &Path) -> PathBuf {
    let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or("results");
    path.with_file_name(format!("{}-annotated.xlsx", stem))
}

/// シート名に使えない文字を除いて31文字に切り詰める
fn sheet_name(reference: &str, used: &mut Vec<String>) -> String {
    let base = Path::new(reference)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(reference);
    let cleaned: String = base
        .chars()
        .filter(|c| !matches!(c, '[' | ']' | ':' | '*' | '?' | '/' | '\\'))
        .take(28)
        .collect();
    let cleaned = if cleaned.is_empty() { "data".to_string() } else { cleaned };

    let mut name = cleaned.clone();
    let mut n = 2;
    while used.iter().any(|u| u.eq_ignore_ascii_case(&name)) {
        name = format!("{}_{}", cleaned, n);
        n += 1;
    }
    used.push(name.clone());
    name
}

/// データセットの各行に判定列を付けて書き出す
pub fn write_annotated_datasets(results: &SwipeResults, cards: &[Card], path: &Path) -> Result<()> {
    // データセット → (表, 行 → 判定)
    let mut datasets: BTreeMap<&str, (&TableData, BTreeMap<usize, Option<Action>>)> = BTreeMap::new();
    for card in cards {
        let Some(table) = card.table() else {
            continue;
        };
        let action = results
            .swiped_cards
            .iter()
            .find(|s| s.index == card.index())
            .map(|s| s.action);
        let entry = datasets
            .entry(table.data().reference())
            .or_insert_with(|| (table.data(), BTreeMap::new()));
        entry.1.insert(table.row_index(), action);
    }

    let header_format = Format::new()
        .set_bold()
        .set_background_color(Color::RGB(0xF5F5F5))
        .set_border(FormatBorder::Thin);
    let like_format = Format::new().set_background_color(Color::RGB(0xE8F5E8));
    let pass_format = Format::new().set_background_color(Color::RGB(0xFDECEA));

    let mut workbook = Workbook::new();
    let mut used = Vec::new();
    for (reference, (table, decisions)) in &datasets {
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(sheet_name(reference, &mut used))?;

        let decision_col = table.column_count() as u16;
        for (col, name) in table.columns().iter().enumerate() {
            worksheet.write_string_with_format(0, col as u16, name, &header_format)?;
        }
        worksheet.write_string_with_format(0, decision_col, "decision", &header_format)?;

        for (row, values) in table.rows().iter().enumerate() {
            let excel_row = row as u32 + 1;
            for (col, value) in values.iter().enumerate() {
                worksheet.write_string(excel_row, col as u16, value)?;
            }
            match decisions.get(&row) {
                Some(Some(action)) => {
                    let format = match action {
                        Action::Like => &like_format,
                        Action::Pass => &pass_format,
                    };
                    worksheet.write_string_with_format(excel_row, decision_col, action.as_str(), format)?;
                }
                Some(None) => {
                    worksheet.write_string(excel_row, decision_col, "pending")?;
                }
                None => {}
            }
        }
        worksheet.autofit();
    }

    workbook
        .save(path)
        .map_err(SwipeCardsError::ExcelGeneration)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sheet_names_are_unique_and_clean() {
        let mut used = Vec::new();
        assert_eq!(sheet_name("data/people.csv", &mut used), "people");
        assert_eq!(sheet_name("other/people.xlsx", &mut used), "people_2");
        assert_eq!(sheet_name("a[1]:b.csv", &mut used), "a1b");
    }

    #[test]
    fn test_annotated_path() {
        assert_eq!(
            annotated_path(Path::new("/tmp/out.xlsx")),
            PathBuf::from("/tmp/out-annotated.xlsx")
        );
    }
}

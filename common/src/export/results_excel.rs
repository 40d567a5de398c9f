//! 結果の Excel 生成
//!
//! 「Summary」シートに集計、「Decisions」シートに確定履歴を書き出す。

use crate::error::{Error, Result};
use crate::results::SwipeResults;
use rust_xlsxwriter::*;

const SUMMARY_SHEET: &str = "Summary";
const DECISIONS_SHEET: &str = "Decisions";
const LIKE_COLOR: u32 = 0xE8F5E8;
const PASS_COLOR: u32 = 0xFDECEA;

fn xlsx_err(context: &str) -> impl Fn(XlsxError) -> Error + '_ {
    move |e| Error::Workbook(format!("{}: {}", context, e))
}

fn join_indices(indices: &[usize]) -> String {
    indices
        .iter()
        .map(|i| i.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// 結果をバッファに生成
///
/// # Arguments
/// * `results` - 結果スナップショット
/// * `title_of` - カード index からタイトルを引くクロージャ
pub fn generate_results_buffer<F>(results: &SwipeResults, title_of: F) -> Result<Vec<u8>>
where
    F: Fn(usize) -> Option<String>,
{
    let mut workbook = Workbook::new();

    let header_format = Format::new()
        .set_bold()
        .set_font_color(Color::RGB(0x333333))
        .set_background_color(Color::RGB(0xF5F5F5))
        .set_border(FormatBorder::Thin)
        .set_border_color(Color::RGB(0xAAAAAA));
    let label_format = Format::new()
        .set_bold()
        .set_align(FormatAlign::Left);
    let like_format = Format::new().set_background_color(Color::RGB(LIKE_COLOR));
    let pass_format = Format::new().set_background_color(Color::RGB(PASS_COLOR));

    // 集計
    let summary = workbook.add_worksheet();
    summary
        .set_name(SUMMARY_SHEET)
        .map_err(xlsx_err("シート名設定エラー"))?;
    summary
        .set_column_width(0, 18.0)
        .map_err(xlsx_err("列幅設定エラー"))?;
    summary
        .set_column_width(1, 40.0)
        .map_err(xlsx_err("列幅設定エラー"))?;

    let last_action = results
        .last_action
        .map(|a| format!("{:?} #{}", a.action, a.card_index).to_lowercase())
        .unwrap_or_else(|| "-".to_string());
    let rows: [(&str, String); 6] = [
        ("totalSwiped", results.total_swiped.to_string()),
        ("remainingCards", results.remaining_cards.to_string()),
        ("currentIndex", results.current_index.to_string()),
        ("liked", join_indices(&results.liked)),
        ("passed", join_indices(&results.passed)),
        ("lastAction", last_action),
    ];
    for (row, (label, value)) in rows.iter().enumerate() {
        summary
            .write_string_with_format(row as u32, 0, *label, &label_format)
            .map_err(xlsx_err("ラベル書き込みエラー"))?;
        summary
            .write_string(row as u32, 1, value)
            .map_err(xlsx_err("値書き込みエラー"))?;
    }

    // 履歴
    let decisions = workbook.add_worksheet();
    decisions
        .set_name(DECISIONS_SHEET)
        .map_err(xlsx_err("シート名設定エラー"))?;
    for (col, (header, width)) in [("#", 6.0), ("index", 8.0), ("title", 36.0), ("action", 10.0), ("timestamp", 18.0)]
        .iter()
        .enumerate()
    {
        decisions
            .set_column_width(col as u16, *width)
            .map_err(xlsx_err("列幅設定エラー"))?;
        decisions
            .write_string_with_format(0, col as u16, *header, &header_format)
            .map_err(xlsx_err("見出し書き込みエラー"))?;
    }

    for (i, swiped) in results.swiped_cards.iter().enumerate() {
        let row = i as u32 + 1;
        let format = match swiped.action {
            crate::decision::Action::Like => &like_format,
            crate::decision::Action::Pass => &pass_format,
        };
        let title = title_of(swiped.index).unwrap_or_default();

        decisions
            .write_number(row, 0, (i + 1) as f64)
            .map_err(xlsx_err("値書き込みエラー"))?;
        decisions
            .write_number(row, 1, swiped.index as f64)
            .map_err(xlsx_err("値書き込みエラー"))?;
        decisions
            .write_string(row, 2, &title)
            .map_err(xlsx_err("値書き込みエラー"))?;
        decisions
            .write_string_with_format(row, 3, swiped.action.as_str(), format)
            .map_err(xlsx_err("値書き込みエラー"))?;
        decisions
            .write_number(row, 4, swiped.timestamp as f64)
            .map_err(xlsx_err("値書き込みエラー"))?;
    }

    workbook
        .save_to_buffer()
        .map_err(xlsx_err("Excel保存エラー"))
}

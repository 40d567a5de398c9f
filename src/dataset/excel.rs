//! Excel読み込み（calamine）
//!
//! 先頭シートの1行目をヘッダーとして扱う。日付セルは ISO 形式の文字列にする。

use crate::error::Result;
use calamine::{open_workbook_auto, Data, Reader};
use chrono::{NaiveDate, TimeDelta};
use std::path::Path;
use swipecards_common::table::format_float;
use swipecards_common::TableData;

/// Excelファイルから表データを読み込み
pub fn load_workbook(path: &Path, reference: &str) -> Result<TableData> {
    let mut workbook = open_workbook_auto(path)?;
    let Some(sheet) = workbook.sheet_names().first().cloned() else {
        return Ok(TableData::new(reference, Vec::new(), Vec::new())?);
    };
    let range = workbook.worksheet_range(&sheet)?;
    tracing::debug!(reference, sheet = %sheet, rows = range.height(), "worksheet loaded");

    let mut rows = range.rows();
    let Some(header) = rows.next() else {
        return Ok(TableData::new(reference, Vec::new(), Vec::new())?);
    };
    let columns: Vec<String> = header
        .iter()
        .enumerate()
        .map(|(i, cell)| {
            let name = cell_to_string(cell);
            if name.trim().is_empty() {
                format!("Unnamed: {}", i)
            } else {
                name.trim().to_string()
            }
        })
        .collect();

    let rows = rows
        .filter(|row| row.iter().any(|c| !matches!(c, Data::Empty)))
        .map(|row| {
            let mut values: Vec<String> = row.iter().map(cell_to_string).collect();
            values.resize(columns.len(), String::new());
            values
        })
        .collect();

    Ok(TableData::new(reference, columns, rows)?)
}

/// セル値を表示用文字列に変換
pub fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) => format_float(*f),
        Data::Bool(b) => b.to_string(),
        Data::DateTime(dt) => excel_serial_to_iso(dt.as_f64()).unwrap_or_else(|| format_float(dt.as_f64())),
        Data::DateTimeIso(s) | Data::DurationIso(s) => s.clone(),
        Data::Error(e) => format!("#{:?}", e),
    }
}

/// Excel のシリアル値（1899-12-30 起点）を ISO 形式に
pub fn excel_serial_to_iso(serial: f64) -> Option<String> {
    if !serial.is_finite() || serial < 0.0 {
        return None;
    }
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?;
    let days = serial.trunc() as i64;
    let seconds = ((serial - serial.trunc()) * 86_400.0).round() as i64;
    let date = epoch.checked_add_signed(TimeDelta::try_days(days)?)?;
    if seconds == 0 {
        return Some(date.format("%Y-%m-%d").to_string());
    }
    let datetime = date.and_hms_opt(0, 0, 0)? + TimeDelta::try_seconds(seconds)?;
    Some(datetime.format("%Y-%m-%d %H:%M:%S").to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_excel_serial_dates() {
        assert_eq!(excel_serial_to_iso(45292.0).as_deref(), Some("2024-01-01"));
        assert_eq!(excel_serial_to_iso(45292.5).as_deref(), Some("2024-01-01 12:00:00"));
        assert_eq!(excel_serial_to_iso(-1.0), None);
    }

    #[test]
    fn test_cell_to_string() {
        assert_eq!(cell_to_string(&Data::Float(85000.0)), "85000");
        assert_eq!(cell_to_string(&Data::Float(1.25)), "1.25");
        assert_eq!(cell_to_string(&Data::Int(7)), "7");
        assert_eq!(cell_to_string(&Data::Empty), "");
        assert_eq!(cell_to_string(&Data::Bool(true)), "true");
    }
}

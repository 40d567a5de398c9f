//! CSV読み込み
//!
//! 先頭行をヘッダーとして扱う。ダブルクォート内のカンマ・改行・`""` エスケープに対応。

use crate::error::{Result, SwipeCardsError};
use std::path::Path;
use swipecards_common::TableData;

/// CSVファイルから表データを読み込み
pub fn load_csv(path: &Path, reference: &str) -> Result<TableData> {
    let content = std::fs::read_to_string(path)?;
    parse_csv_table(&content, reference)
}

/// CSV文字列から表データを作成
pub fn parse_csv_table(content: &str, reference: &str) -> Result<TableData> {
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);
    let mut records = parse_records(content, reference)?.into_iter();

    let Some(header) = records.next() else {
        return Ok(TableData::new(reference, Vec::new(), Vec::new())?);
    };
    let columns: Vec<String> = header
        .into_iter()
        .enumerate()
        .map(|(i, name)| {
            let name = name.trim().to_string();
            if name.is_empty() {
                format!("Unnamed: {}", i)
            } else {
                name
            }
        })
        .collect();

    // 列が足りない行は空文字で埋める（多すぎる行は TableData 側でエラー）
    let rows = records
        .filter(|r| !(r.len() == 1 && r[0].trim().is_empty()))
        .map(|mut r| {
            if r.len() < columns.len() {
                r.resize(columns.len(), String::new());
            }
            r.into_iter().map(|v| v.trim().to_string()).collect()
        })
        .collect();

    Ok(TableData::new(reference, columns, rows)?)
}

/// レコード単位に分割（クォート内の改行はレコードを跨がない）
fn parse_records(content: &str, reference: &str) -> Result<Vec<Vec<String>>> {
    let mut records = Vec::new();
    let mut record = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut line = 1;
    let mut chars = content.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes => {
                if chars.peek() == Some(&'"') {
                    field.push('"');
                    chars.next();
                } else {
                    in_quotes = false;
                }
            }
            '"' if field.trim().is_empty() => {
                field.clear();
                in_quotes = true;
            }
            ',' if !in_quotes => {
                record.push(std::mem::take(&mut field));
            }
            '\r' if !in_quotes => {}
            '\n' if !in_quotes => {
                record.push(std::mem::take(&mut field));
                records.push(std::mem::take(&mut record));
                line += 1;
            }
            '\n' => {
                field.push(c);
                line += 1;
            }
            _ => field.push(c),
        }
    }

    if in_quotes {
        return Err(SwipeCardsError::CsvParse {
            path: reference.to_string(),
            line,
            reason: "閉じられていないダブルクォート".into(),
        });
    }
    if !field.is_empty() || !record.is_empty() {
        record.push(field);
        records.push(record);
    }

    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_csv() {
        let table = parse_csv_table("Name,Salary\nAlice,85000\nBob,70000\n", "people.csv")
            .expect("解析失敗");
        assert_eq!(table.columns(), &["Name".to_string(), "Salary".to_string()]);
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.cell(1, 1), Some("70000"));
    }

    #[test]
    fn test_quoted_fields() {
        let csv = "Name,Note\n\"Smith, J\",\"said \"\"hi\"\"\"\n\"Multi\nLine\",x\n";
        let table = parse_csv_table(csv, "q.csv").expect("解析失敗");
        assert_eq!(table.cell(0, 0), Some("Smith, J"));
        assert_eq!(table.cell(0, 1), Some("said \"hi\""));
        assert_eq!(table.cell(1, 0), Some("Multi\nLine"));
    }

    #[test]
    fn test_short_rows_padded_and_blank_lines_skipped() {
        let table = parse_csv_table("\u{feff}A,B,C\r\n1,2\r\n\r\n4,5,6\r\n", "p.csv").expect("解析失敗");
        assert_eq!(table.columns()[0], "A");
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.cell(0, 2), Some(""));
    }

    #[test]
    fn test_unnamed_header() {
        let table = parse_csv_table(",B\n1,2", "u.csv").expect("解析失敗");
        assert_eq!(table.columns()[0], "Unnamed: 0");
        assert_eq!(table.cell(0, 1), Some("2"));
    }

    #[test]
    fn test_unterminated_quote() {
        let result = parse_csv_table("A\n\"open", "bad.csv");
        assert!(matches!(result, Err(SwipeCardsError::CsvParse { line: 2, .. })));
    }

    #[test]
    fn test_too_many_cells_rejected() {
        let result = parse_csv_table("A,B\n1,2,3\n", "wide.csv");
        assert!(matches!(
            result,
            Err(SwipeCardsError::Cards(swipecards_common::Error::RaggedRow { row: 0, .. }))
        ));
    }
}

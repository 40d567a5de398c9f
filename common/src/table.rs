//! 表データとハイライト指定
//!
//! `TableData` はデータセット1件分のスナップショット（列名＋表示用文字列の行）。
//! 同じデータセットを参照するカード間で `Arc` 共有される。
//! `TableView` はカード1枚分の表示指定で、前面に出す行・ハイライト・初期スクロール位置を持つ。
//! ハイライトは重ね描きの指定であり、セル値そのものは決して変更しない。

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::ops::Range;
use std::sync::Arc;
use tracing::warn;

/// セルハイライトの既定色（ゴールド）
pub const DEFAULT_CELL_COLOR: &str = "#FFD700";
/// 行ハイライトの既定色（ライトブルー）
pub const DEFAULT_ROW_COLOR: &str = "#E3F2FD";
/// 列ハイライトの既定色（ライトグリーン）
pub const DEFAULT_COLUMN_COLOR: &str = "#E8F5E8";
/// 前面行の背景
pub const FOREGROUND_ROW_BACKGROUND: &str = "rgba(0, 123, 255, 0.1)";
pub const FOREGROUND_ROW_BORDER: &str = "rgba(0, 123, 255, 0.3)";

/// `"random"` 指定時に使うパレット
pub const RANDOM_PALETTE: [&str; 10] = [
    "#FFB6C1", "#98FB98", "#87CEEB", "#DDA0DD", "#F0E68C",
    "#FFA07A", "#20B2AA", "#FFE4B5", "#D3D3D3", "#F5DEB3",
];

/// データセット1件分のスナップショット
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableData {
    reference: String,
    columns: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl TableData {
    /// 表示用文字列に変換済みの行から作成
    pub fn new(
        reference: impl Into<String>,
        columns: Vec<String>,
        rows: Vec<Vec<String>>,
    ) -> Result<Self> {
        let reference = reference.into();

        let mut seen = HashSet::new();
        for column in &columns {
            if !seen.insert(column.as_str()) {
                return Err(Error::DuplicateColumn {
                    reference,
                    column: column.clone(),
                });
            }
        }

        for (i, row) in rows.iter().enumerate() {
            if row.len() != columns.len() {
                return Err(Error::RaggedRow {
                    reference,
                    row: i,
                    found: row.len(),
                    expected: columns.len(),
                });
            }
        }

        Ok(Self { reference, columns, rows })
    }

    /// JSON値の行から作成（ここで一度だけ表示用文字列に変換する）
    pub fn from_json_rows(
        reference: impl Into<String>,
        columns: Vec<String>,
        rows: Vec<Vec<serde_json::Value>>,
    ) -> Result<Self> {
        let rows = rows
            .iter()
            .map(|row| row.iter().map(display_value).collect())
            .collect();
        Self::new(reference, columns, rows)
    }

    pub fn reference(&self) -> &str {
        &self.reference
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn cell(&self, row: usize, column: usize) -> Option<&str> {
        self.rows.get(row).and_then(|r| r.get(column)).map(String::as_str)
    }
}

/// JSON値を表示用文字列に変換
pub fn display_value(value: &serde_json::Value) -> String {
    use serde_json::Value;

    match value {
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                i.to_string()
            } else if let Some(u) = n.as_u64() {
                u.to_string()
            } else {
                n.as_f64().map(format_float).unwrap_or_else(|| n.to_string())
            }
        }
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// 浮動小数の表示形式（整数値は小数部なし、それ以外は末尾0を除去）
pub fn format_float(value: f64) -> String {
    if !value.is_finite() {
        return String::new();
    }
    if value.fract() == 0.0 && value.abs() < 1e15 {
        return format!("{}", value as i64);
    }
    let s = format!("{:.6}", value);
    s.trim_end_matches('0').trim_end_matches('.').to_string()
}

/// 列の指定（列名または0始まりの列番号）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ColumnRef {
    Index(usize),
    Name(String),
}

impl ColumnRef {
    fn resolve(&self, data: &TableData) -> Option<usize> {
        match self {
            ColumnRef::Index(i) if *i < data.column_count() => Some(*i),
            ColumnRef::Index(_) => None,
            ColumnRef::Name(name) => data.column_index(name),
        }
    }

    fn label(&self) -> String {
        match self {
            ColumnRef::Index(i) => i.to_string(),
            ColumnRef::Name(name) => name.clone(),
        }
    }
}

impl From<&str> for ColumnRef {
    fn from(name: &str) -> Self {
        ColumnRef::Name(name.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellHighlight {
    pub row: usize,
    pub column: ColumnRef,
    #[serde(default)]
    pub color: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowHighlight {
    pub row: usize,
    #[serde(default)]
    pub color: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnHighlight {
    pub column: ColumnRef,
    #[serde(default)]
    pub color: Option<String>,
}

/// ハイライト指定一式
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Highlights {
    #[serde(default)]
    pub cells: Vec<CellHighlight>,
    #[serde(default)]
    pub rows: Vec<RowHighlight>,
    #[serde(default)]
    pub columns: Vec<ColumnHighlight>,
}

/// セルの見た目
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellStyle {
    pub background: String,
    pub border: String,
    pub border_width: u8,
    pub bold: bool,
    pub source: StyleSource,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StyleSource {
    Cell,
    Row,
    Column,
    ForegroundRow,
}

impl CellStyle {
    pub fn to_css(&self) -> String {
        let weight = if self.bold {
            "bold"
        } else if self.source == StyleSource::ForegroundRow {
            "normal"
        } else {
            "500"
        };
        format!(
            "background-color: {}; border: {}px solid {}; font-weight: {};",
            self.background, self.border_width, self.border, weight
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
struct ResolvedCell {
    row: usize,
    column: usize,
    color: String,
}

#[derive(Debug, Clone, PartialEq)]
struct ResolvedLine {
    index: usize,
    color: String,
}

/// 表示範囲
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableWindow {
    pub rows: Range<usize>,
    pub columns: Range<usize>,
}

/// カード1枚分の表表示
#[derive(Debug, Clone, PartialEq)]
pub struct TableView {
    data: Arc<TableData>,
    row_index: usize,
    cells: Vec<ResolvedCell>,
    rows: Vec<ResolvedLine>,
    columns: Vec<ResolvedLine>,
    center_row: usize,
    center_column: Option<usize>,
}

impl TableView {
    /// 指定を検証して作成。`card_index` はエラー・警告表示用
    ///
    /// `row_index` が範囲外なら失敗する。ハイライトと初期スクロール位置の誤りは読み飛ばす。
    pub fn new(
        card_index: usize,
        data: Arc<TableData>,
        row_index: usize,
        highlights: &Highlights,
        center_row: Option<usize>,
        center_column: Option<&ColumnRef>,
    ) -> Result<Self> {
        let rows_total = data.row_count();
        if row_index >= rows_total {
            return Err(Error::RowOutOfRange {
                index: card_index,
                row: row_index,
                rows: rows_total,
            });
        }

        // 表示用の指定が古い・誤っている場合は警告して捨てる。カード自体は作る
        let row_in_range = |row: usize, directive: &str| -> bool {
            let ok = row < rows_total;
            if !ok {
                warn!(card = card_index, row, rows = rows_total, directive, "highlight row out of range, skipped");
            }
            ok
        };
        let resolve_column = |column: &ColumnRef, directive: &str| -> Option<usize> {
            let resolved = column.resolve(&data);
            if resolved.is_none() {
                warn!(card = card_index, column = %column.label(), directive, "unknown column, skipped");
            }
            resolved
        };

        let mut cells = Vec::with_capacity(highlights.cells.len());
        for h in &highlights.cells {
            if !row_in_range(h.row, "highlight_cells") {
                continue;
            }
            let Some(column) = resolve_column(&h.column, "highlight_cells") else {
                continue;
            };
            cells.push(ResolvedCell {
                row: h.row,
                column,
                color: resolve_color(h.color.as_deref(), DEFAULT_CELL_COLOR, h.row * 31 + column),
            });
        }

        let rows = highlights
            .rows
            .iter()
            .filter(|h| row_in_range(h.row, "highlight_rows"))
            .map(|h| ResolvedLine {
                index: h.row,
                color: resolve_color(h.color.as_deref(), DEFAULT_ROW_COLOR, h.row),
            })
            .collect();

        let columns = highlights
            .columns
            .iter()
            .filter_map(|h| {
                let column = resolve_column(&h.column, "highlight_columns")?;
                Some(ResolvedLine {
                    index: column,
                    color: resolve_color(h.color.as_deref(), DEFAULT_COLUMN_COLOR, column + 7),
                })
            })
            .collect();

        let center_row = center_row
            .filter(|&row| row_in_range(row, "center_row"))
            .unwrap_or(row_index);
        let center_column = center_column.and_then(|c| resolve_column(c, "center_column"));

        Ok(Self {
            data,
            row_index,
            cells,
            rows,
            columns,
            center_row,
            center_column,
        })
    }

    pub fn data(&self) -> &TableData {
        &self.data
    }

    pub fn shared_data(&self) -> &Arc<TableData> {
        &self.data
    }

    /// 前面に出す行
    pub fn row_index(&self) -> usize {
        self.row_index
    }

    /// 前面行のセル値
    pub fn foreground_row(&self) -> &[String] {
        &self.data.rows()[self.row_index]
    }

    pub fn cell(&self, row: usize, column: usize) -> Option<&str> {
        self.data.cell(row, column)
    }

    /// 初期スクロール位置
    pub fn center(&self) -> (usize, Option<usize>) {
        (self.center_row, self.center_column)
    }

    /// セルのスタイル（セル > 行 > 列 > 前面行 の優先順）
    pub fn cell_style(&self, row: usize, column: usize) -> Option<CellStyle> {
        if let Some(h) = self.cells.iter().find(|h| h.row == row && h.column == column) {
            return Some(CellStyle {
                background: h.color.clone(),
                border: darken_color(&h.color, 20),
                border_width: 2,
                bold: true,
                source: StyleSource::Cell,
            });
        }
        if let Some(h) = self.rows.iter().find(|h| h.index == row) {
            return Some(line_style(&h.color, StyleSource::Row));
        }
        if let Some(h) = self.columns.iter().find(|h| h.index == column) {
            return Some(line_style(&h.color, StyleSource::Column));
        }
        if row == self.row_index {
            return Some(CellStyle {
                background: FOREGROUND_ROW_BACKGROUND.to_string(),
                border: FOREGROUND_ROW_BORDER.to_string(),
                border_width: 1,
                bold: false,
                source: StyleSource::ForegroundRow,
            });
        }
        None
    }

    /// 最大行数・列数で切り出した表示範囲（中心セルを含むように寄せる）
    pub fn window(&self, max_rows: Option<usize>, max_columns: Option<usize>) -> TableWindow {
        TableWindow {
            rows: centered_range(self.data.row_count(), self.center_row, max_rows),
            columns: centered_range(
                self.data.column_count(),
                self.center_column.unwrap_or(0),
                max_columns,
            ),
        }
    }
}

fn line_style(color: &str, source: StyleSource) -> CellStyle {
    CellStyle {
        background: color.to_string(),
        border: darken_color(color, 20),
        border_width: 1,
        bold: false,
        source,
    }
}

fn centered_range(len: usize, center: usize, max: Option<usize>) -> Range<usize> {
    let Some(max) = max.filter(|m| *m > 0 && *m < len) else {
        return 0..len;
    };
    let start = center.saturating_sub(max / 2).min(len - max);
    start..start + max
}

/// 色指定を解決（未指定は既定色、`"random"` はパレットから決定的に選ぶ）
fn resolve_color(color: Option<&str>, default: &str, seed: usize) -> String {
    match color.map(str::trim) {
        None | Some("") => default.to_string(),
        Some(c) if c.eq_ignore_ascii_case("random") => {
            RANDOM_PALETTE[seed % RANDOM_PALETTE.len()].to_string()
        }
        Some(c) => c.to_string(),
    }
}

/// `#RRGGBB` を percent% 暗くする。解釈できない色はそのまま返す
pub fn darken_color(color: &str, percent: u8) -> String {
    let Some(hex) = color.strip_prefix('#') else {
        return color.to_string();
    };
    if hex.len() != 6 {
        return color.to_string();
    }
    let Ok(num) = u32::from_str_radix(hex, 16) else {
        return color.to_string();
    };
    let amount = (2.55 * percent as f64).round() as i32;
    let channel = |shift: u32| (((num >> shift) & 0xFF) as i32 - amount).clamp(0, 255) as u32;
    format!("#{:02x}{:02x}{:02x}", channel(16), channel(8), channel(0))
}

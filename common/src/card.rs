//! カードモデル
//!
//! ホストから渡されたカード指定（緩い辞書）を検証し、
//! 不変の `Card` 列に変換する。不正なカードは index 付きのエラーで即失敗し、
//! 黙って捨てることはしない。

use crate::config::{DisplayMode, RenderOptions};
use crate::error::{Error, Result};
use crate::table::{CellHighlight, ColumnHighlight, ColumnRef, Highlights, RowHighlight, TableData, TableView};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// 表カードの既定説明文
pub const DEFAULT_TABLE_DESCRIPTION: &str = "Swipe to evaluate this data row";

/// データセット参照を表データに解決する
///
/// 実装側は同じ参照を二度読みしないようにキャッシュしてよい。
pub trait DatasetResolver {
    fn resolve(&mut self, reference: &str) -> Result<Arc<TableData>>;
}

/// 読み込み済みの表を参照名で引くだけのリゾルバ（WASM・テスト用）
#[derive(Debug, Clone, Default)]
pub struct InMemoryResolver {
    tables: HashMap<String, Arc<TableData>>,
}

impl InMemoryResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, table: TableData) {
        self.tables
            .insert(table.reference().to_string(), Arc::new(table));
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

impl DatasetResolver for InMemoryResolver {
    fn resolve(&mut self, reference: &str) -> Result<Arc<TableData>> {
        self.tables
            .get(reference)
            .cloned()
            .ok_or_else(|| Error::UnknownDataset(reference.to_string()))
    }
}

/// ホストから渡されるカード指定
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CardSpec {
    pub name: Option<String>,
    pub description: Option<String>,
    pub image: Option<String>,
    pub pills: Vec<String>,
    #[serde(alias = "dataset_path", alias = "datasetPath")]
    pub dataset: Option<String>,
    #[serde(alias = "rowIndex")]
    pub row_index: Option<usize>,
    #[serde(alias = "highlightCells")]
    pub highlight_cells: Vec<CellHighlight>,
    #[serde(alias = "highlightRows")]
    pub highlight_rows: Vec<RowHighlight>,
    #[serde(alias = "highlightColumns")]
    pub highlight_columns: Vec<ColumnHighlight>,
    #[serde(alias = "centerTableRow")]
    pub center_table_row: Option<usize>,
    #[serde(alias = "centerTableColumn")]
    pub center_table_column: Option<ColumnRef>,
}

impl CardSpec {
    pub fn kind(&self) -> CardKind {
        if self.dataset.is_some() || self.row_index.is_some() {
            CardKind::TableRow
        } else {
            CardKind::Image
        }
    }

    fn highlights(&self) -> Highlights {
        Highlights {
            cells: self.highlight_cells.clone(),
            rows: self.highlight_rows.clone(),
            columns: self.highlight_columns.clone(),
        }
    }
}

/// ホストからの入力一式
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionInput {
    pub cards: Vec<CardSpec>,
    /// カード指定が空のとき、このデータセットの全行を表カードにする
    #[serde(alias = "dataset_path", alias = "datasetPath")]
    pub dataset: Option<String>,
    #[serde(alias = "highlightCells")]
    pub highlight_cells: Vec<CellHighlight>,
    #[serde(alias = "displayMode")]
    pub display_mode: DisplayMode,
    pub options: RenderOptions,
}

/// ファイルを読めない環境（WASM）向けに、参照先の表データを同梱した入力
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionBundle {
    #[serde(flatten)]
    pub input: SessionInput,
    #[serde(default)]
    pub datasets: Vec<TableData>,
}

impl SessionBundle {
    pub fn resolver(&self) -> InMemoryResolver {
        let mut resolver = InMemoryResolver::new();
        for table in &self.datasets {
            resolver.insert(table.clone());
        }
        resolver
    }

    /// 同梱データだけでカード列を構築
    pub fn build_cards(&self) -> Result<Vec<Card>> {
        build_session_cards(&self.input, &mut self.resolver())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CardKind {
    Image,
    TableRow,
}

impl CardKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            CardKind::Image => "image",
            CardKind::TableRow => "table-row",
        }
    }
}

/// カードの中身
#[derive(Debug, Clone, PartialEq)]
pub enum CardContent {
    Image { image: String },
    TableRow { table: TableView, image: Option<String> },
}

/// 不変のカード
#[derive(Debug, Clone, PartialEq)]
pub struct Card {
    index: usize,
    title: String,
    body: String,
    tags: Vec<String>,
    content: CardContent,
}

impl Card {
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn kind(&self) -> CardKind {
        match self.content {
            CardContent::Image { .. } => CardKind::Image,
            CardContent::TableRow { .. } => CardKind::TableRow,
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    pub fn content(&self) -> &CardContent {
        &self.content
    }

    pub fn image(&self) -> Option<&str> {
        match &self.content {
            CardContent::Image { image } => Some(image),
            CardContent::TableRow { image, .. } => image.as_deref(),
        }
    }

    pub fn table(&self) -> Option<&TableView> {
        match &self.content {
            CardContent::TableRow { table, .. } => Some(table),
            CardContent::Image { .. } => None,
        }
    }

    /// 描画時のCSSクラス
    pub fn css_class(&self) -> &'static str {
        match self.kind() {
            CardKind::Image => "image-card",
            CardKind::TableRow => "table-card",
        }
    }
}

fn required_text(value: &Option<String>, index: usize, field: &'static str) -> Result<String> {
    match value.as_deref().map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v.to_string()),
        _ => Err(Error::MissingField { index, field }),
    }
}

fn clean_tags(pills: &[String]) -> Vec<String> {
    pills
        .iter()
        .map(|p| p.trim())
        .filter(|p| !p.is_empty())
        .map(str::to_string)
        .collect()
}

fn build_card(index: usize, spec: &CardSpec, resolver: &mut dyn DatasetResolver) -> Result<Card> {
    let tags = clean_tags(&spec.pills);

    match spec.kind() {
        CardKind::Image => {
            let title = required_text(&spec.name, index, "name")?;
            let body = required_text(&spec.description, index, "description")?;
            let image = required_text(&spec.image, index, "image")?;
            Ok(Card {
                index,
                title,
                body,
                tags,
                content: CardContent::Image { image },
            })
        }
        CardKind::TableRow => {
            let reference = required_text(&spec.dataset, index, "dataset")?;
            let row_index = spec
                .row_index
                .ok_or(Error::MissingField { index, field: "row_index" })?;

            let data = resolver.resolve(&reference).map_err(|e| match e {
                Error::UnsupportedFormat(_) => e,
                other => Error::Dataset {
                    index,
                    reference: reference.clone(),
                    reason: other.to_string(),
                },
            })?;

            let table = TableView::new(
                index,
                data,
                row_index,
                &spec.highlights(),
                spec.center_table_row,
                spec.center_table_column.as_ref(),
            )?;

            let title = spec
                .name
                .as_deref()
                .map(str::trim)
                .filter(|n| !n.is_empty())
                .map(str::to_string)
                .unwrap_or_else(|| format!("Row {}", row_index + 1));
            let body = spec
                .description
                .as_deref()
                .map(str::trim)
                .filter(|d| !d.is_empty())
                .unwrap_or(DEFAULT_TABLE_DESCRIPTION)
                .to_string();
            let image = spec
                .image
                .as_deref()
                .map(str::trim)
                .filter(|i| !i.is_empty())
                .map(str::to_string);

            Ok(Card {
                index,
                title,
                body,
                tags,
                content: CardContent::TableRow { table, image },
            })
        }
    }
}

/// カード指定列からカード列を構築（1枚でも不正なら全体が失敗）
pub fn build_cards(specs: &[CardSpec], resolver: &mut dyn DatasetResolver) -> Result<Vec<Card>> {
    let cards = specs
        .iter()
        .enumerate()
        .map(|(index, spec)| build_card(index, spec, resolver))
        .collect::<Result<Vec<_>>>()?;
    debug!(count = cards.len(), "cards built");
    Ok(cards)
}

/// 入力一式からカード列を構築
///
/// カード指定が空でデータセットが指定されている場合は全行を表カードに展開する。
pub fn build_session_cards(
    input: &SessionInput,
    resolver: &mut dyn DatasetResolver,
) -> Result<Vec<Card>> {
    if !input.cards.is_empty() {
        return build_cards(&input.cards, resolver);
    }

    let Some(reference) = input.dataset.as_deref() else {
        return Ok(Vec::new());
    };

    let data = resolver.resolve(reference)?;
    let specs: Vec<CardSpec> = (0..data.row_count())
        .map(|row| CardSpec {
            dataset: Some(reference.to_string()),
            row_index: Some(row),
            highlight_cells: input.highlight_cells.clone(),
            ..Default::default()
        })
        .collect();
    build_cards(&specs, resolver)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::StyleSource;

    fn image_spec(name: &str) -> CardSpec {
        CardSpec {
            name: Some(name.to_string()),
            description: Some(format!("{} description", name)),
            image: Some(format!("https://example.com/{}.jpg", name)),
            ..Default::default()
        }
    }

    fn resolver() -> InMemoryResolver {
        let mut resolver = InMemoryResolver::new();
        resolver.insert(
            TableData::new(
                "people.csv",
                vec!["Name".into(), "Salary".into()],
                vec![
                    vec!["Alice".into(), "85000".into()],
                    vec!["Bob".into(), "70000".into()],
                ],
            )
            .expect("表作成失敗"),
        );
        resolver
    }

    #[test]
    fn test_build_image_cards() {
        let specs = vec![image_spec("alice"), image_spec("bob")];
        let cards = build_cards(&specs, &mut resolver()).expect("構築失敗");

        assert_eq!(cards.len(), 2);
        assert_eq!(cards[1].index(), 1);
        assert_eq!(cards[1].kind(), CardKind::Image);
        assert_eq!(cards[1].title(), "bob");
        assert_eq!(cards[1].image(), Some("https://example.com/bob.jpg"));
        assert_eq!(cards[1].css_class(), "image-card");
    }

    #[test]
    fn test_image_card_requires_image() {
        let mut bad = image_spec("carol");
        bad.image = Some("   ".to_string());
        let specs = vec![image_spec("alice"), bad];

        match build_cards(&specs, &mut resolver()) {
            Err(Error::MissingField { index, field }) => {
                assert_eq!(index, 1);
                assert_eq!(field, "image");
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_table_card_defaults() {
        let spec = CardSpec {
            dataset: Some("people.csv".into()),
            row_index: Some(1),
            pills: vec!["Sales".into(), " ".into()],
            ..Default::default()
        };
        let cards = build_cards(&[spec], &mut resolver()).expect("構築失敗");
        let card = &cards[0];

        assert_eq!(card.kind(), CardKind::TableRow);
        assert_eq!(card.title(), "Row 2");
        assert_eq!(card.body(), DEFAULT_TABLE_DESCRIPTION);
        assert_eq!(card.tags(), &["Sales".to_string()]);
        assert_eq!(card.table().map(|t| t.foreground_row()[0].as_str()), Some("Bob"));
        assert_eq!(card.image(), None);
    }

    #[test]
    fn test_table_card_row_out_of_range() {
        let spec = CardSpec {
            dataset: Some("people.csv".into()),
            row_index: Some(5),
            ..Default::default()
        };
        let result = build_cards(&[image_spec("a"), spec], &mut resolver());
        assert!(matches!(result, Err(Error::RowOutOfRange { index: 1, row: 5, rows: 2 })));
    }

    #[test]
    fn test_table_card_missing_row_index() {
        let spec = CardSpec {
            dataset: Some("people.csv".into()),
            ..Default::default()
        };
        let result = build_cards(&[spec], &mut resolver());
        assert!(matches!(result, Err(Error::MissingField { index: 0, field: "row_index" })));
    }

    #[test]
    fn test_unresolvable_dataset_names_card() {
        let spec = CardSpec {
            dataset: Some("missing.csv".into()),
            row_index: Some(0),
            ..Default::default()
        };
        match build_cards(&[spec], &mut resolver()) {
            Err(Error::Dataset { index, reference, .. }) => {
                assert_eq!(index, 0);
                assert_eq!(reference, "missing.csv");
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_card_spec_accepts_host_keys() {
        let json = r##"{
            "dataset_path": "people.csv",
            "row_index": 0,
            "name": "Alice",
            "pills": ["Senior"],
            "highlight_cells": [{"row": 0, "column": "Salary", "color": "#FFB6C1"}],
            "center_table_column": "Name"
        }"##;
        let spec: CardSpec = serde_json::from_str(json).expect("デシリアライズ失敗");
        assert_eq!(spec.kind(), CardKind::TableRow);
        assert_eq!(spec.center_table_column, Some(ColumnRef::Name("Name".into())));

        let cards = build_cards(&[spec], &mut resolver()).expect("構築失敗");
        assert_eq!(cards[0].title(), "Alice");
    }

    #[test]
    fn test_session_input_expands_dataset_rows() {
        let input: SessionInput = serde_json::from_str(
            r#"{"dataset": "people.csv", "display_mode": "table"}"#,
        )
        .expect("デシリアライズ失敗");
        assert_eq!(input.display_mode, DisplayMode::Table);

        let cards = build_session_cards(&input, &mut resolver()).expect("構築失敗");
        assert_eq!(cards.len(), 2);
        assert_eq!(cards[1].table().map(|t| t.row_index()), Some(1));
    }

    #[test]
    fn test_expansion_skips_stale_highlights() {
        // 全行に同じ指定が付くので、2行しかない表では row 5 と "Age" は無効
        let input: SessionInput = serde_json::from_str(
            r#"{"dataset": "people.csv", "highlight_cells": [
                {"row": 5, "column": "Name"},
                {"row": 0, "column": "Age"},
                {"row": 1, "column": "Salary"}
            ]}"#,
        )
        .expect("デシリアライズ失敗");

        let cards = build_session_cards(&input, &mut resolver()).expect("構築失敗");
        assert_eq!(cards.len(), 2);
        let table = cards[0].table().expect("表カード");
        assert_eq!(table.cell_style(1, 1).map(|s| s.source), Some(StyleSource::Cell));
        assert_eq!(table.cell_style(1, 0), None);
    }

    #[test]
    fn test_bundle_builds_from_embedded_datasets() {
        let bundle: SessionBundle = serde_json::from_str(
            r#"{
                "cards": [{"dataset": "t.csv", "row_index": 0}],
                "displayMode": "table",
                "datasets": [{"reference": "t.csv", "columns": ["A"], "rows": [["1"]]}]
            }"#,
        )
        .expect("デシリアライズ失敗");
        assert_eq!(bundle.input.display_mode, DisplayMode::Table);

        let cards = bundle.build_cards().expect("構築失敗");
        assert_eq!(cards[0].table().map(|t| t.foreground_row().to_vec()), Some(vec!["1".to_string()]));
    }

    #[test]
    fn test_plain_input_is_bundle_without_datasets() {
        let bundle: SessionBundle =
            serde_json::from_str(r#"{"cards": [{"name": "a", "description": "b", "image": "c.jpg"}]}"#)
                .expect("デシリアライズ失敗");
        assert!(bundle.datasets.is_empty());
        assert_eq!(bundle.build_cards().expect("構築失敗").len(), 1);
    }

    #[test]
    fn test_session_input_empty() {
        let cards = build_session_cards(&SessionInput::default(), &mut resolver()).expect("構築失敗");
        assert!(cards.is_empty());
    }
}

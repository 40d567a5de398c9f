//! エラーケーステスト
//!
//! 不正な入力はカード構築時に、対象カードの index 付きで失敗する。
//! ハイライトの誤りは警告のみ

use swipecards::cards::{build_from_input, load_input};
use swipecards::error::SwipeCardsError;
use swipecards_common::Error;
use tempfile::tempdir;

fn build(json: &str) -> Result<usize, SwipeCardsError> {
    let dir = tempdir().expect("Failed to create temp dir");
    std::fs::write(dir.path().join("t.csv"), "A,B\n1,2\n").expect("CSV書き込み失敗");
    let input = dir.path().join("input.json");
    std::fs::write(&input, json).expect("入力書き込み失敗");

    let loaded = load_input(&input)?;
    let cards = build_from_input(&loaded, &mut loaded.cache())?;
    Ok(cards.len())
}

#[test]
fn test_missing_input_file() {
    let result = load_input(std::path::Path::new("/nonexistent/input.json"));
    assert!(matches!(result, Err(SwipeCardsError::FileNotFound(_))));
}

#[test]
fn test_malformed_json() {
    assert!(matches!(build("{\"cards\": ["), Err(SwipeCardsError::JsonParse(_))));
}

#[test]
fn test_image_card_without_image() {
    let result = build(r#"{"cards": [{"name": "a", "description": "b"}]}"#);
    assert!(matches!(
        result,
        Err(SwipeCardsError::Cards(Error::MissingField { index: 0, field: "image" }))
    ));
}

#[test]
fn test_row_index_out_of_range() {
    let result = build(
        r#"{"cards": [
            {"dataset": "t.csv", "row_index": 0},
            {"dataset": "t.csv", "row_index": 3}
        ]}"#,
    );
    assert!(matches!(
        result,
        Err(SwipeCardsError::Cards(Error::RowOutOfRange { index: 1, row: 3, rows: 1 }))
    ));
}

/// 存在しない列・行へのハイライトは読み飛ばし、カードは構築される
#[test]
fn test_unknown_highlight_column_is_skipped() {
    let result = build(
        r#"{"cards": [{"dataset": "t.csv", "row_index": 0,
            "highlight_columns": [{"column": "Salary"}],
            "highlight_rows": [{"row": 4}]}]}"#,
    );
    assert_eq!(result.expect("ハイライトの誤りで失敗してはいけない"), 1);
}

/// データセット展開で全行に付くハイライトが古くても、セッション全体は止まらない
#[test]
fn test_expanded_dataset_with_stale_highlight() {
    let result = build(r#"{"dataset": "t.csv", "highlight_cells": [{"row": 2, "column": "C"}]}"#);
    assert_eq!(result.expect("展開失敗"), 1);
}

#[test]
fn test_missing_dataset_file_names_card() {
    let result = build(r#"{"cards": [{"dataset": "nope.csv", "row_index": 0}]}"#);
    match result {
        Err(SwipeCardsError::Cards(Error::Dataset { index, reference, .. })) => {
            assert_eq!(index, 0);
            assert_eq!(reference, "nope.csv");
        }
        other => panic!("unexpected: {:?}", other),
    }
}

#[test]
fn test_error_messages_are_japanese() {
    let err = SwipeCardsError::FileNotFound("x.json".into());
    assert_eq!(err.to_string(), "ファイルが見つかりません: x.json");
}

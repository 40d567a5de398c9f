//! JSON/Excel出力の統合テスト

use swipecards::cli::ExportFormat;
use swipecards::export::{self, json::ResultsReport};
use swipecards_common::{
    build_cards, Action, CardSpec, InMemoryResolver, StackState, SwipeResults, TableData,
};
use tempfile::tempdir;

fn sample() -> (SwipeResults, Vec<swipecards_common::Card>) {
    let mut resolver = InMemoryResolver::new();
    resolver.insert(
        TableData::new(
            "data/people.csv",
            vec!["Name".into(), "Salary".into()],
            vec![
                vec!["Alice".into(), "85000".into()],
                vec!["Bob".into(), "70000".into()],
            ],
        )
        .expect("表作成失敗"),
    );
    let specs = vec![
        CardSpec {
            name: Some("Photo".into()),
            description: Some("image card".into()),
            image: Some("https://example.com/p.jpg".into()),
            ..Default::default()
        },
        CardSpec {
            dataset: Some("data/people.csv".into()),
            row_index: Some(0),
            ..Default::default()
        },
        CardSpec {
            dataset: Some("data/people.csv".into()),
            row_index: Some(1),
            ..Default::default()
        },
    ];
    let cards = build_cards(&specs, &mut resolver).expect("カード構築失敗");

    let mut state = StackState::new(cards.len());
    state.commit(Action::Like, 1_700_000_000_000).expect("確定失敗");
    state.commit(Action::Pass, 1_700_000_005_000).expect("確定失敗");
    (SwipeResults::from_state(&state), cards)
}

#[test]
fn test_json_report() {
    let dir = tempdir().expect("Failed to create temp dir");
    let (results, cards) = sample();

    let written = export::export_results(&results, &cards, &ExportFormat::Json, dir.path(), "report")
        .expect("JSON出力失敗");
    assert_eq!(written, vec![dir.path().join("report.json")]);

    let content = std::fs::read_to_string(&written[0]).expect("読み込み失敗");
    let report: ResultsReport = serde_json::from_str(&content).expect("JSON解析失敗");
    assert_eq!(report.results, results);
    assert_eq!(report.cards.len(), 3);
    assert_eq!(report.cards[1].title, "Row 1");
    assert_eq!(report.cards[1].action, Some(Action::Pass));
    assert_eq!(report.cards[2].action, None);
    assert_eq!(report.cards[2].kind, "table-row");
}

#[test]
fn test_excel_with_annotated_dataset() {
    let dir = tempdir().expect("Failed to create temp dir");
    let (results, cards) = sample();
    let output = dir.path().join("out.xlsx");

    export::export_results(&results, &cards, &ExportFormat::Excel, &output, "ignored")
        .expect("Excel出力失敗");

    assert!(output.exists(), "Excelファイルが作成されていない");
    let annotated = dir.path().join("out-annotated.xlsx");
    assert!(annotated.exists(), "判定付きデータが作成されていない");

    use calamine::{open_workbook_auto, Reader};
    let mut workbook = open_workbook_auto(&annotated).expect("Excel読み込み失敗");
    assert_eq!(workbook.sheet_names(), vec!["people".to_string()]);
    let range = workbook.worksheet_range("people").expect("シート読み込み失敗");
    let decisions: Vec<String> = range
        .rows()
        .map(|r| r.get(2).map(|c| c.to_string()).unwrap_or_default())
        .collect();
    assert_eq!(decisions, vec!["decision", "pass", "pending"]);
}

#[test]
fn test_both_formats_from_stem() {
    let dir = tempdir().expect("Failed to create temp dir");
    let (results, _) = sample();

    let written = export::export_results(
        &results,
        &[],
        &ExportFormat::Both,
        &dir.path().join("session.out"),
        "ignored",
    )
    .expect("出力失敗");
    assert_eq!(
        written,
        vec![dir.path().join("session.json"), dir.path().join("session.xlsx")]
    );
    assert!(written.iter().all(|p| p.exists()));
}

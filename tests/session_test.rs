//! セッション再生テスト
//!
//! 入力JSON＋操作スクリプトから、ジェスチャ・ボタン・キーボードを混ぜた操作を再生する

use swipecards::cards::{build_from_input, load_input};
use swipecards::session::{load_script, replay, SessionEvent};
use swipecards_common::{ActionKind, Notice, SwipeConfig, SwipeStack};
use tempfile::tempdir;

const THREE_CARDS: &str = r#"{"cards": [
    {"name": "A", "description": "first", "image": "https://example.com/a.jpg", "pills": ["x"]},
    {"name": "B", "description": "second", "image": "https://example.com/b.jpg"},
    {"name": "C", "description": "third", "image": "https://example.com/c.jpg"}
]}"#;

fn mount(dir: &std::path::Path) -> SwipeStack {
    let input = dir.join("input.json");
    std::fs::write(&input, THREE_CARDS).expect("入力書き込み失敗");
    let loaded = load_input(&input).expect("入力読み込み失敗");
    let cards = build_from_input(&loaded, &mut loaded.cache()).expect("カード構築失敗");
    SwipeStack::new(cards, SwipeConfig::default()).expect("スタック作成失敗")
}

/// pass A（ドラッグ -150px）→ like B（ボタン）→ back → like B → like C（キー）→ 結果取得
#[test]
fn test_replay_three_card_scenario() {
    let dir = tempdir().expect("Failed to create temp dir");
    let mut stack = mount(dir.path());

    let script = dir.path().join("script.json");
    std::fs::write(
        &script,
        r#"[
            {"type": "pointer_down", "x": 300, "y": 400, "t": 0},
            {"type": "pointer_move", "x": 220, "y": 405, "t": 100},
            {"type": "pointer_up", "x": 150, "y": 410, "t": 400},
            {"type": "like", "t": 1000},
            {"type": "back", "t": 2000},
            {"type": "like", "t": 3000},
            {"type": "key", "key": "ArrowRight", "t": 4000},
            {"type": "results", "t": 5000},
            {"type": "results", "t": 5100}
        ]"#,
    )
    .expect("スクリプト書き込み失敗");

    let events = load_script(&script).expect("スクリプト読み込み失敗");
    let report = replay(&mut stack, &events);

    assert!(report.notices.is_empty(), "想定外の通知: {:?}", report.notices);
    assert_eq!(report.delivered.len(), 2);

    let results = &report.delivered[0];
    assert_eq!(results.total_swiped, 3);
    assert_eq!(results.remaining_cards, 0);
    assert_eq!(results.current_index, 3);
    assert_eq!(results.liked, vec![1, 2]);
    assert_eq!(results.passed, vec![0]);
    assert_eq!(results.swiped_cards[0].timestamp, 400);
    assert_eq!(results.last_action.map(|a| a.action), Some(ActionKind::Like));

    // 結果取得は冪等
    assert_eq!(report.delivered[0], report.delivered[1]);
    assert_eq!(report.final_results, report.delivered[0]);
}

/// 高速フリック（しきい値未満の移動でも確定）
#[test]
fn test_replay_fling() {
    let dir = tempdir().expect("Failed to create temp dir");
    let mut stack = mount(dir.path());

    let events = vec![
        SessionEvent::PointerDown { pointer: 7, kind: Default::default(), x: 0.0, y: 0.0, t: 0.0 },
        SessionEvent::PointerMove { pointer: 7, x: 20.0, y: 0.0, t: 40.0 },
        SessionEvent::PointerUp { pointer: 7, x: 60.0, y: 0.0, t: 60.0 },
    ];
    let report = replay(&mut stack, &events);
    assert_eq!(report.final_results.liked, vec![0]);
}

/// 全カード確定後の like は通知のみ、back で1枚戻る
#[test]
fn test_replay_exhausted_boundary() {
    let dir = tempdir().expect("Failed to create temp dir");
    let mut stack = mount(dir.path());

    let events = vec![
        SessionEvent::Pass { t: 0.0 },
        SessionEvent::Pass { t: 1000.0 },
        SessionEvent::Pass { t: 2000.0 },
        SessionEvent::Like { t: 3000.0 },
        SessionEvent::Key { key: "z".into(), t: 4000.0 },
    ];
    let report = replay(&mut stack, &events);

    assert_eq!(report.notices, vec![(3, Notice::Exhausted)]);
    assert_eq!(report.final_results.remaining_cards, 1);
    assert_eq!(report.final_results.passed, vec![0, 1]);
}

/// アニメーション中のボタン操作は、フリック終了時刻で確定する。
/// 間のフレームが無くても、後続のポインタ操作は受け付けられる
#[test]
fn test_replay_queued_request_commits_at_animation_end() {
    let dir = tempdir().expect("Failed to create temp dir");
    let mut stack = mount(dir.path());

    let events = vec![
        SessionEvent::Like { t: 0.0 },
        SessionEvent::Pass { t: 50.0 },
        SessionEvent::PointerDown { pointer: 1, kind: Default::default(), x: 300.0, y: 400.0, t: 5000.0 },
    ];
    let report = replay(&mut stack, &events);

    assert!(report.notices.is_empty(), "想定外の通知: {:?}", report.notices);
    let results = &report.final_results;
    assert_eq!(results.liked, vec![0]);
    assert_eq!(results.passed, vec![1]);
    assert_eq!(results.swiped_cards[0].timestamp, 0);
    assert_eq!(results.swiped_cards[1].timestamp, 300);
    assert!(stack.is_dragging());
}

/// 時刻が巻き戻るスクリプトは拒否
#[test]
fn test_script_time_must_not_go_backwards() {
    let dir = tempdir().expect("Failed to create temp dir");
    let script = dir.path().join("bad.json");
    std::fs::write(&script, r#"[{"type": "like", "t": 100}, {"type": "pass", "t": 50}]"#)
        .expect("書き込み失敗");

    let result = load_script(&script);
    assert!(matches!(
        result,
        Err(swipecards::error::SwipeCardsError::InvalidScript(_))
    ));
}

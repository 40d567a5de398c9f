//! 端末セッション
//!
//! - `run_interactive`: dialoguer の選択肢で like/pass/back/結果取得 を行う
//! - `replay`: 記録済みの入力イベント列（JSON）をそのまま流し込む
//!
//! どちらも `SwipeStack` を経由するので、ボタン・キー・ジェスチャの状態遷移は同一。

use crate::error::{Result, SwipeCardsError};
use dialoguer::Select;
use serde::{Deserialize, Serialize};
use std::path::Path;
use swipecards_common::stack::EMPTY_MESSAGE;
use swipecards_common::table::StyleSource;
use swipecards_common::{
    Card, CardContent, CollectingSink, Command, Notice, Outcome, Point, PointerId, PointerKind,
    RenderOptions, Response, SwipeResults, SwipeStack,
};
use tracing::{debug, info, warn};

/// 端末表示での表の既定行数
const TERMINAL_MAX_ROWS: usize = 7;
const TERMINAL_MAX_COLUMNS: usize = 6;

/// 現在時刻（エポックミリ秒）
pub fn now_ms() -> f64 {
    chrono::Utc::now().timestamp_millis() as f64
}

/// 進行中のアニメーションをすべて終わらせる
fn settle(stack: &mut SwipeStack, now: f64) {
    let config = stack.config();
    let longest = config.fling_out_ms.max(config.return_ms).max(config.undo_ms);
    stack.tick(now + longest + 1.0);
}

/// カード1枚を端末表示用の行に変換
pub fn render_card_lines(card: &Card, options: &RenderOptions) -> Vec<String> {
    let mut lines = Vec::new();
    lines.push(format!("■ {}", card.title()));
    lines.push(format!("  {}", card.body()));
    if !card.tags().is_empty() {
        let pills: Vec<String> = card.tags().iter().map(|t| format!("[{}]", t)).collect();
        lines.push(format!("  {}", pills.join(" ")));
    }

    match card.content() {
        CardContent::Image { image } => {
            lines.push(format!("  画像: {}", abbreviate(image, 60)));
        }
        CardContent::TableRow { table, image } => {
            if let Some(image) = image {
                lines.push(format!("  画像: {}", abbreviate(image, 60)));
            }
            let window = table.window(
                Some(options.max_rows.unwrap_or(TERMINAL_MAX_ROWS)),
                Some(options.max_columns.unwrap_or(TERMINAL_MAX_COLUMNS)),
            );
            let columns = table.data().columns();
            let header: Vec<&str> = window.columns.clone().map(|c| columns[c].as_str()).collect();
            lines.push(format!("     | {}", header.join(" | ")));

            for row in window.rows.clone() {
                let marker = if row == table.row_index() { "▶" } else { " " };
                let cells: Vec<String> = window
                    .columns
                    .clone()
                    .map(|col| {
                        let value = table.cell(row, col).unwrap_or("");
                        match table.cell_style(row, col).map(|s| s.source) {
                            Some(StyleSource::Cell) => format!("*{}*", value),
                            Some(StyleSource::Row) | Some(StyleSource::Column) => format!("+{}", value),
                            _ => value.to_string(),
                        }
                    })
                    .collect();
                lines.push(format!("{} {:>3} | {}", marker, row, cells.join(" | ")));
            }
        }
    }
    lines
}

fn abbreviate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        let head: String = text.chars().take(max).collect();
        format!("{}…", head)
    }
}

fn print_results(results: &SwipeResults) {
    println!("\n📊 結果");
    println!("  スワイプ済み: {}", results.total_swiped);
    println!("  残り: {}", results.remaining_cards);
    println!("  like: {:?}", results.liked);
    println!("  pass: {:?}", results.passed);
}

fn save_results(results: &SwipeResults, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, swipecards_common::export::results_json(results)?)?;
    println!("✔ 結果を保存: {}", path.display());
    Ok(())
}

/// 対話モード
///
/// 結果は「結果を取得」または終了時にのみ書き出す。
pub fn run_interactive(mut stack: SwipeStack, results_out: Option<&Path>) -> Result<SwipeResults> {
    const CHOICES: [(&str, Option<Command>); 5] = [
        ("👍 Like", Some(Command::Like)),
        ("👎 Pass", Some(Command::Pass)),
        ("↩ Back", Some(Command::Back)),
        ("📊 Get Results", Some(Command::GetResults)),
        ("終了", None),
    ];
    let mut sink = CollectingSink::default();

    println!("🃏 swipecards - {}枚のカード\n", stack.cards().len());

    loop {
        println!("{}", stack.counter_text());
        match stack.top_card() {
            Some(card) => {
                for line in render_card_lines(card, stack.options()) {
                    println!("{}", line);
                }
            }
            None => println!("{}", stack.status_message().unwrap_or(EMPTY_MESSAGE)),
        }

        let labels: Vec<&str> = CHOICES.iter().map(|(label, _)| *label).collect();
        let selection = Select::new()
            .with_prompt("操作")
            .items(&labels)
            .default(0)
            .interact()
            .map_err(|e| SwipeCardsError::CliExecution(e.to_string()))?;

        let Some(command) = CHOICES[selection].1 else {
            break;
        };

        let now = now_ms();
        match stack.execute(command, now, &mut sink) {
            Response::Results(results) => {
                print_results(&results);
                if let Some(path) = results_out {
                    save_results(&results, path)?;
                }
            }
            Response::Outcome(Outcome::Ignored(notice)) => println!("⚠ {}", notice.message()),
            Response::Outcome(outcome) => debug!(?outcome, "applied"),
            Response::Queued(command) => debug!(command = command.label(), "queued"),
        }
        settle(&mut stack, now);
        println!();
    }

    let results = stack.get_results();
    if sink.delivered.last() != Some(&results) {
        print_results(&results);
        if let Some(path) = results_out {
            save_results(&results, path)?;
        }
    }
    Ok(results)
}

/// 再生用の入力イベント
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionEvent {
    PointerDown {
        #[serde(default = "default_pointer")]
        pointer: i32,
        #[serde(default)]
        kind: PointerKind,
        x: f64,
        y: f64,
        t: f64,
    },
    PointerMove {
        #[serde(default = "default_pointer")]
        pointer: i32,
        x: f64,
        y: f64,
        t: f64,
    },
    PointerUp {
        #[serde(default = "default_pointer")]
        pointer: i32,
        x: f64,
        y: f64,
        t: f64,
    },
    PointerCancel {
        #[serde(default = "default_pointer")]
        pointer: i32,
        t: f64,
    },
    Key {
        key: String,
        t: f64,
    },
    Like {
        t: f64,
    },
    Pass {
        t: f64,
    },
    Back {
        t: f64,
    },
    Results {
        t: f64,
    },
    /// アニメーションフレーム
    Tick {
        t: f64,
    },
}

fn default_pointer() -> i32 {
    1
}

impl SessionEvent {
    pub fn time(&self) -> f64 {
        match self {
            SessionEvent::PointerDown { t, .. }
            | SessionEvent::PointerMove { t, .. }
            | SessionEvent::PointerUp { t, .. }
            | SessionEvent::PointerCancel { t, .. }
            | SessionEvent::Key { t, .. }
            | SessionEvent::Like { t }
            | SessionEvent::Pass { t }
            | SessionEvent::Back { t }
            | SessionEvent::Results { t }
            | SessionEvent::Tick { t } => *t,
        }
    }
}

/// 再生結果
#[derive(Debug, Clone, Default)]
pub struct ReplayReport {
    /// 結果取得で渡された結果（順番通り）
    pub delivered: Vec<SwipeResults>,
    /// 最終状態
    pub final_results: SwipeResults,
    /// 無視された入力（イベント番号と理由）
    pub notices: Vec<(usize, Notice)>,
}

/// 操作スクリプトを読み込み
pub fn load_script(path: &Path) -> Result<Vec<SessionEvent>> {
    if !path.exists() {
        return Err(SwipeCardsError::FileNotFound(path.display().to_string()));
    }
    let content = std::fs::read_to_string(path)?;
    let events: Vec<SessionEvent> = serde_json::from_str(&content)?;

    if let Some(i) = events
        .windows(2)
        .position(|w| w[1].time() < w[0].time())
    {
        return Err(SwipeCardsError::InvalidScript(format!(
            "イベント {} の時刻が前のイベントより前です",
            i + 1
        )));
    }
    Ok(events)
}

/// イベント列を再生
///
/// 各イベントの前にその時刻までフレームを進めるため、
/// 時間が十分空いていればアニメーションは自然に終了する。
pub fn replay(stack: &mut SwipeStack, events: &[SessionEvent]) -> ReplayReport {
    let mut sink = CollectingSink::default();
    let mut notices = Vec::new();

    for (i, event) in events.iter().enumerate() {
        let t = event.time();
        stack.tick(t);

        let notice = match event {
            SessionEvent::PointerDown { pointer, kind, x, y, t } => stack
                .pointer_down(PointerId(*pointer), *kind, Point::new(*x, *y, *t))
                .err(),
            SessionEvent::PointerMove { pointer, x, y, t } => {
                stack.pointer_move(PointerId(*pointer), Point::new(*x, *y, *t));
                None
            }
            SessionEvent::PointerUp { pointer, x, y, t } => {
                ignored(stack.pointer_up(PointerId(*pointer), Point::new(*x, *y, *t)))
            }
            SessionEvent::PointerCancel { pointer, t } => {
                ignored(stack.pointer_cancel(PointerId(*pointer), *t))
            }
            SessionEvent::Key { key, t } => match stack.handle_key(key, *t, &mut sink) {
                Some(response) => ignored_response(response),
                None => {
                    warn!(key = %key, "unmapped key ignored");
                    None
                }
            },
            SessionEvent::Like { t } => ignored_response(stack.execute(Command::Like, *t, &mut sink)),
            SessionEvent::Pass { t } => ignored_response(stack.execute(Command::Pass, *t, &mut sink)),
            SessionEvent::Back { t } => ignored_response(stack.execute(Command::Back, *t, &mut sink)),
            SessionEvent::Results { t } => {
                ignored_response(stack.execute(Command::GetResults, *t, &mut sink))
            }
            SessionEvent::Tick { .. } => None,
        };

        if let Some(notice) = notice {
            debug!(event = i, notice = notice.message(), "input ignored");
            notices.push((i, notice));
        }
    }

    let final_results = stack.get_results();
    info!(
        events = events.len(),
        swiped = final_results.total_swiped,
        "replay finished"
    );
    ReplayReport {
        delivered: sink.delivered,
        final_results,
        notices,
    }
}

fn ignored(outcome: Outcome) -> Option<Notice> {
    match outcome {
        Outcome::Ignored(notice) => Some(notice),
        _ => None,
    }
}

fn ignored_response(response: Response) -> Option<Notice> {
    match response {
        Response::Outcome(outcome) => ignored(outcome),
        _ => None,
    }
}

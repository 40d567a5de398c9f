//! スタック描画コア
//!
//! ジェスチャ追跡・判定エンジン・アニメーション制御を束ね、
//! 「今どのカードが何枚見えているか」とホストへの結果受け渡しを担当する。
//! プラットフォームには依存しない（DOM や端末 UI は呼び出し側）。

use crate::animation::{AnimationController, AnimationFinished, AnimationKind, Indicator, Transform};
use crate::card::Card;
use crate::config::{DisplayMode, RenderOptions, SwipeConfig};
use crate::decision::{Action, DecisionEngine, Notice, Outcome, StackState};
use crate::error::{Error, Result};
use crate::gesture::{GestureRelease, GestureTracker, Point, PointerId, PointerKind};
use crate::results::{ResultsSink, SwipeResults};
use tracing::{debug, info};

/// カードが無いときの表示
pub const EMPTY_MESSAGE: &str = "No Cards Available";

/// 表示状態
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayState {
    Empty,
    Active,
    Exhausted,
}

/// ボタン・キーボードから発行されるコマンド
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Like,
    Pass,
    Back,
    GetResults,
}

impl Command {
    /// キー名（`KeyboardEvent.key` 相当）からコマンドへ
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "ArrowRight" | "l" | "L" => Some(Command::Like),
            "ArrowLeft" | "h" | "H" => Some(Command::Pass),
            "Backspace" | "ArrowDown" | "z" | "Z" | "u" | "U" => Some(Command::Back),
            "Enter" | "r" | "R" => Some(Command::GetResults),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Command::Like => "Like",
            Command::Pass => "Pass",
            Command::Back => "Back",
            Command::GetResults => "Get Results",
        }
    }
}

/// コマンド実行の結果
#[derive(Debug, Clone, PartialEq)]
pub enum Response {
    Outcome(Outcome),
    /// アニメーション終了後に適用される
    Queued(Command),
    Results(SwipeResults),
}

/// 描画対象の1枚
#[derive(Debug, Clone, PartialEq)]
pub struct VisibleCard<'a> {
    pub card: &'a Card,
    /// 0 がトップ
    pub depth: usize,
    pub transform: Transform,
    pub indicator: Indicator,
    /// フリックアウト中（既に確定済み）のカード
    pub outgoing: bool,
}

impl VisibleCard<'_> {
    pub fn is_top(&self) -> bool {
        self.depth == 0 && !self.outgoing
    }

    /// 重なり順（大きいほど手前）
    pub fn z_index(&self, window_len: usize) -> usize {
        if self.outgoing {
            window_len + 1
        } else {
            window_len - self.depth
        }
    }
}

/// スワイプスタック本体
#[derive(Debug, Clone)]
pub struct SwipeStack {
    cards: Vec<Card>,
    engine: DecisionEngine,
    tracker: GestureTracker,
    animation: AnimationController,
    display_mode: DisplayMode,
    options: RenderOptions,
    pending: Option<Command>,
}

impl SwipeStack {
    pub fn new(cards: Vec<Card>, config: SwipeConfig) -> Result<Self> {
        let state = StackState::new(cards.len());
        Self::with_state(cards, state, config)
    }

    /// 保存済みの `StackState` から再開する
    pub fn with_state(cards: Vec<Card>, state: StackState, config: SwipeConfig) -> Result<Self> {
        config.validate()?;
        if state.total_cards() != cards.len() {
            return Err(Error::Config(format!(
                "state holds {} cards but {} were given",
                state.total_cards(),
                cards.len()
            )));
        }
        debug!(cards = cards.len(), cursor = state.cursor(), "swipe stack mounted");
        Ok(Self {
            cards,
            animation: AnimationController::new(config.clone()),
            engine: DecisionEngine::with_state(state, config),
            tracker: GestureTracker::new(),
            display_mode: DisplayMode::default(),
            options: RenderOptions::default(),
            pending: None,
        })
    }

    pub fn with_display(mut self, display_mode: DisplayMode, options: RenderOptions) -> Self {
        self.display_mode = display_mode;
        self.options = options;
        self
    }

    /// アンマウント時に状態を返す
    pub fn into_state(self) -> StackState {
        self.engine.into_state()
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn state(&self) -> &StackState {
        self.engine.state()
    }

    pub fn config(&self) -> &SwipeConfig {
        self.engine.config()
    }

    pub fn display_mode(&self) -> DisplayMode {
        self.display_mode
    }

    pub fn options(&self) -> &RenderOptions {
        &self.options
    }

    pub fn viewport_height(&self) -> u32 {
        self.options.viewport_height(self.display_mode)
    }

    pub fn top_card(&self) -> Option<&Card> {
        self.cards.get(self.state().cursor())
    }

    pub fn display_state(&self) -> DisplayState {
        if self.cards.is_empty() {
            DisplayState::Empty
        } else if self.state().is_exhausted() {
            DisplayState::Exhausted
        } else {
            DisplayState::Active
        }
    }

    /// トップカードが無いときに出すメッセージ
    pub fn status_message(&self) -> Option<&str> {
        match self.display_state() {
            DisplayState::Empty => Some(EMPTY_MESSAGE),
            DisplayState::Exhausted => Some(self.options.last_card_message()),
            DisplayState::Active => None,
        }
    }

    pub fn total_swiped(&self) -> usize {
        self.state().total_swiped()
    }

    pub fn remaining_cards(&self) -> usize {
        self.state().remaining()
    }

    pub fn counter_text(&self) -> String {
        format!(
            "Swiped: {} | Remaining: {}",
            self.total_swiped(),
            self.remaining_cards()
        )
    }

    pub fn is_dragging(&self) -> bool {
        self.tracker.is_active()
    }

    pub fn is_animating(&self) -> bool {
        self.animation.is_animating()
    }

    pub fn pending(&self) -> Option<Command> {
        self.pending
    }

    // ---- ポインタ入力 ----

    /// ジェスチャ開始
    pub fn pointer_down(&mut self, pointer: PointerId, kind: PointerKind, point: Point) -> std::result::Result<(), Notice> {
        if self.top_card().is_none() {
            return Err(Notice::Exhausted);
        }
        if self.animation.is_animating() {
            debug!(pointer = pointer.0, "pointer rejected during animation");
            return Err(Notice::Busy);
        }
        if !self.tracker.begin(pointer, kind, point) {
            return Err(Notice::ForeignPointer);
        }
        if let Err(notice) = self.engine.begin_drag() {
            self.tracker.reset();
            return Err(notice);
        }
        Ok(())
    }

    /// ドラッグ更新。トップカードの新しい変換を返す
    pub fn pointer_move(&mut self, pointer: PointerId, point: Point) -> Option<Transform> {
        let cursor = self.state().cursor();
        let drag = *self.tracker.update(pointer, point)?;
        Some(self.animation.follow_drag(cursor, &drag))
    }

    /// ジェスチャ終了。確定時刻は `point.t_ms`
    pub fn pointer_up(&mut self, pointer: PointerId, point: Point) -> Outcome {
        let Some(release) = self.tracker.end(pointer, point) else {
            return Outcome::Ignored(self.inactive_notice());
        };
        self.finish_gesture(&release, point.t_ms)
    }

    /// ジェスチャ取り消し（追跡面を離れた等）
    pub fn pointer_cancel(&mut self, pointer: PointerId, now_ms: f64) -> Outcome {
        let Some(release) = self.tracker.cancel(pointer) else {
            return Outcome::Ignored(self.inactive_notice());
        };
        self.finish_gesture(&release, now_ms)
    }

    fn inactive_notice(&self) -> Notice {
        if self.tracker.is_active() {
            Notice::ForeignPointer
        } else {
            Notice::NoActiveGesture
        }
    }

    fn finish_gesture(&mut self, release: &GestureRelease, now_ms: f64) -> Outcome {
        let cursor = self.state().cursor();
        let outcome = self.engine.release(release, now_ms.max(0.0) as u64);
        match outcome {
            Outcome::Committed(decision) => {
                self.animation.start_fling(decision.card_index, decision.action, now_ms);
            }
            Outcome::Returned => self.animation.start_return(cursor, now_ms),
            _ => {
                self.animation.clear_drag();
            }
        }
        outcome
    }

    // ---- ボタン・キーボード ----

    pub fn like(&mut self, now_ms: f64) -> Response {
        self.request(Command::Like, now_ms)
    }

    pub fn pass(&mut self, now_ms: f64) -> Response {
        self.request(Command::Pass, now_ms)
    }

    pub fn back(&mut self, now_ms: f64) -> Response {
        self.request(Command::Back, now_ms)
    }

    /// キー入力。割り当てのないキーは `None`
    pub fn handle_key(&mut self, key: &str, now_ms: f64, sink: &mut dyn ResultsSink) -> Option<Response> {
        let command = Command::from_key(key)?;
        Some(self.execute(command, now_ms, sink))
    }

    /// ボタンとキーボードの共通入口
    pub fn execute(&mut self, command: Command, now_ms: f64, sink: &mut dyn ResultsSink) -> Response {
        match command {
            Command::GetResults => Response::Results(self.deliver_results(sink)),
            other => self.request(other, now_ms),
        }
    }

    fn request(&mut self, command: Command, now_ms: f64) -> Response {
        if self.tracker.is_active() {
            return Response::Outcome(Outcome::Ignored(Notice::Busy));
        }
        if self.animation.is_animating() {
            if let Some(replaced) = self.pending.replace(command) {
                debug!(replaced = replaced.label(), queued = command.label(), "queued request replaced");
            }
            return Response::Queued(command);
        }
        Response::Outcome(self.apply(command, now_ms))
    }

    fn apply(&mut self, command: Command, now_ms: f64) -> Outcome {
        let timestamp = now_ms.max(0.0) as u64;
        match command {
            Command::Like | Command::Pass => {
                let action = if command == Command::Like {
                    Action::Like
                } else {
                    Action::Pass
                };
                let outcome = self.engine.decide(action, timestamp);
                if let Outcome::Committed(decision) = outcome {
                    self.animation.start_fling(decision.card_index, action, now_ms);
                }
                outcome
            }
            Command::Back => {
                let outcome = self.engine.back();
                if let Outcome::Undone(decision) = outcome {
                    self.animation.start_undo(decision.card_index, decision.action, now_ms);
                }
                outcome
            }
            Command::GetResults => Outcome::Ignored(Notice::NoActiveGesture),
        }
    }

    /// フレーム更新。アニメーションが終われば待機中の要求をその終了時刻で適用する
    ///
    /// フレームが間引かれても、`now_ms` までに終わるはずのアニメーションはすべて終える。
    /// 戻り値は最後に終わったもの。
    pub fn tick(&mut self, now_ms: f64) -> Option<AnimationFinished> {
        let mut last = None;
        while let Some(finished) = self.animation.tick(now_ms) {
            debug!(card = finished.card_index, kind = ?finished.kind, at = finished.ended_ms, "animation finished");
            if let Some(command) = self.pending.take() {
                let outcome = self.apply(command, finished.ended_ms);
                debug!(command = command.label(), ?outcome, "queued request applied");
            }
            last = Some(finished);
        }
        last
    }

    // ---- 描画 ----

    /// 見えているカード（手前から順）
    ///
    /// フリックアウト中のカードは確定済みでも最前面に残す。
    pub fn visible_window(&self) -> Vec<VisibleCard<'_>> {
        let mut window = Vec::new();

        if let Some(animation) = self.animation.active() {
            if let AnimationKind::FlingOut(_) = animation.kind {
                if let Some(card) = self.cards.get(animation.card_index) {
                    let transform = self
                        .animation
                        .transform_for(animation.card_index)
                        .unwrap_or_default();
                    window.push(VisibleCard {
                        card,
                        depth: 0,
                        transform,
                        indicator: self.animation.indicator(&transform),
                        outgoing: true,
                    });
                }
            }
        }

        let cursor = self.state().cursor();
        let end = (cursor + 1 + self.config().peek_count).min(self.cards.len());
        for (depth, card) in self.cards[cursor.min(end)..end].iter().enumerate() {
            let transform = if depth == 0 {
                self.animation
                    .transform_for(card.index())
                    .unwrap_or(Transform::NEUTRAL)
            } else {
                self.animation.peek_transform(depth)
            };
            let indicator = if depth == 0 {
                self.animation.indicator(&transform)
            } else {
                Indicator::None
            };
            window.push(VisibleCard {
                card,
                depth,
                transform,
                indicator,
                outgoing: false,
            });
        }
        window
    }

    // ---- ホスト境界 ----

    /// 結果スナップショット（何度呼んでも同じ状態なら同じ値）
    pub fn get_results(&self) -> SwipeResults {
        SwipeResults::from_state(self.state())
    }

    /// 結果をホストへ渡す（明示的な要求時のみ）
    pub fn deliver_results(&self, sink: &mut dyn ResultsSink) -> SwipeResults {
        let results = self.get_results();
        info!(
            swiped = results.total_swiped,
            remaining = results.remaining_cards,
            "results delivered"
        );
        sink.deliver(&results);
        results
    }
}

//! 判定エンジン
//!
//! カード1枚ごとの状態遷移 `Idle → Dragging → {Committed | Returned}` と、
//! 確定履歴 (`StackState`) を管理する。
//! カーソルは履歴の長さそのものなので、`history.len() == cursor` は構造的に常に成り立つ。

use crate::config::SwipeConfig;
use crate::gesture::GestureRelease;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// 確定アクション
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Like,
    Pass,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Like => "like",
            Action::Pass => "pass",
        }
    }

    /// フリックアウト方向（右 = +1, 左 = -1）
    pub fn direction(&self) -> f64 {
        match self {
            Action::Like => 1.0,
            Action::Pass => -1.0,
        }
    }
}

/// 直近の操作（戻すを含む）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionKind {
    Like,
    Pass,
    Back,
}

impl From<Action> for ActionKind {
    fn from(action: Action) -> Self {
        match action {
            Action::Like => ActionKind::Like,
            Action::Pass => ActionKind::Pass,
        }
    }
}

/// 確定記録
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Decision {
    pub card_index: usize,
    pub action: Action,
    /// エポックミリ秒（呼び出し側が渡す）
    pub timestamp: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LastAction {
    pub action: ActionKind,
    pub card_index: usize,
}

/// 何もしなかった理由（エラーではなく受動的な通知）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notice {
    /// 戻す履歴がない
    EmptyHistory,
    /// 全カード確定済み
    Exhausted,
    /// ドラッグ中またはアニメーション中
    Busy,
    /// 追跡中のジェスチャがない
    NoActiveGesture,
    /// 追跡中でないポインタからの入力
    ForeignPointer,
}

impl Notice {
    pub fn message(&self) -> &'static str {
        match self {
            Notice::EmptyHistory => "Nothing to undo",
            Notice::Exhausted => "No more cards to swipe",
            Notice::Busy => "Busy",
            Notice::NoActiveGesture => "No active gesture",
            Notice::ForeignPointer => "Ignored pointer",
        }
    }
}

/// 操作の結果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Committed(Decision),
    Undone(Decision),
    Returned,
    Ignored(Notice),
}

/// ジェスチャ終了時の判定
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    Commit(Action),
    Return,
}

/// 距離しきい値を先に、次にフリック速度を評価する
pub fn resolve_release(release: &GestureRelease, config: &SwipeConfig) -> Resolution {
    if release.cancelled {
        return Resolution::Return;
    }

    let dx = release.delta_x;
    let threshold = config.distance_threshold;
    if dx >= threshold {
        return Resolution::Commit(Action::Like);
    }
    if dx <= -threshold {
        return Resolution::Commit(Action::Pass);
    }

    let vx = release.velocity_x;
    let like = vx > config.fling_velocity;
    let pass = vx < -config.fling_velocity;
    match (like, pass) {
        (true, true) if dx < 0.0 => Resolution::Commit(Action::Pass),
        (true, _) => Resolution::Commit(Action::Like),
        (false, true) => Resolution::Commit(Action::Pass),
        (false, false) => Resolution::Return,
    }
}

/// セッションの可変状態
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StackState {
    total: usize,
    history: Vec<Decision>,
    last_action: Option<LastAction>,
}

impl StackState {
    pub fn new(total: usize) -> Self {
        Self {
            total,
            history: Vec::with_capacity(total),
            last_action: None,
        }
    }

    /// 次に判定するカードの index
    pub fn cursor(&self) -> usize {
        self.history.len()
    }

    pub fn history(&self) -> &[Decision] {
        &self.history
    }

    pub fn total_cards(&self) -> usize {
        self.total
    }

    pub fn total_swiped(&self) -> usize {
        self.history.len()
    }

    pub fn remaining(&self) -> usize {
        self.total - self.cursor()
    }

    pub fn is_exhausted(&self) -> bool {
        self.cursor() >= self.total
    }

    pub fn last_action(&self) -> Option<LastAction> {
        self.last_action
    }

    pub fn liked(&self) -> Vec<usize> {
        self.indices_for(Action::Like)
    }

    pub fn passed(&self) -> Vec<usize> {
        self.indices_for(Action::Pass)
    }

    fn indices_for(&self, action: Action) -> Vec<usize> {
        self.history
            .iter()
            .filter(|d| d.action == action)
            .map(|d| d.card_index)
            .collect()
    }

    /// カーソル位置のカードを確定する
    pub fn commit(&mut self, action: Action, timestamp: u64) -> Result<Decision, Notice> {
        if self.is_exhausted() {
            return Err(Notice::Exhausted);
        }
        let decision = Decision {
            card_index: self.cursor(),
            action,
            timestamp,
        };
        self.history.push(decision);
        self.last_action = Some(LastAction {
            action: action.into(),
            card_index: decision.card_index,
        });
        Ok(decision)
    }

    /// 直近の確定を取り消す
    pub fn undo(&mut self) -> Result<Decision, Notice> {
        let decision = self.history.pop().ok_or(Notice::EmptyHistory)?;
        self.last_action = Some(LastAction {
            action: ActionKind::Back,
            card_index: decision.card_index,
        });
        Ok(decision)
    }
}

/// カード1枚ごとのターン状態
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TurnState {
    #[default]
    Idle,
    Dragging,
    Committed(Action),
    Returned,
}

/// 状態遷移と履歴をまとめた判定エンジン
#[derive(Debug, Clone)]
pub struct DecisionEngine {
    state: StackState,
    turn: TurnState,
    config: SwipeConfig,
}

impl DecisionEngine {
    pub fn new(total: usize, config: SwipeConfig) -> Self {
        Self {
            state: StackState::new(total),
            turn: TurnState::Idle,
            config,
        }
    }

    /// 保存済みの状態から再開する
    pub fn with_state(state: StackState, config: SwipeConfig) -> Self {
        Self {
            state,
            turn: TurnState::Idle,
            config,
        }
    }

    pub fn state(&self) -> &StackState {
        &self.state
    }

    pub fn into_state(self) -> StackState {
        self.state
    }

    pub fn turn(&self) -> TurnState {
        self.turn
    }

    pub fn config(&self) -> &SwipeConfig {
        &self.config
    }

    /// `Idle → Dragging`
    pub fn begin_drag(&mut self) -> Result<(), Notice> {
        if self.state.is_exhausted() {
            return Err(Notice::Exhausted);
        }
        if self.turn == TurnState::Dragging {
            return Err(Notice::Busy);
        }
        self.turn = TurnState::Dragging;
        Ok(())
    }

    /// ジェスチャ終了を判定して確定または差し戻す
    pub fn release(&mut self, release: &GestureRelease, timestamp: u64) -> Outcome {
        if self.turn != TurnState::Dragging {
            return Outcome::Ignored(Notice::NoActiveGesture);
        }
        match resolve_release(release, &self.config) {
            Resolution::Commit(action) => self.commit(action, timestamp),
            Resolution::Return => {
                debug!(dx = release.delta_x, vx = release.velocity_x, "gesture returned");
                self.turn = TurnState::Returned;
                Outcome::Returned
            }
        }
    }

    /// ボタン・キーボードによる確定（ドラッグを経ずに `Idle → Committed`）
    pub fn decide(&mut self, action: Action, timestamp: u64) -> Outcome {
        if self.turn == TurnState::Dragging {
            return Outcome::Ignored(Notice::Busy);
        }
        self.commit(action, timestamp)
    }

    /// 戻す
    pub fn back(&mut self) -> Outcome {
        if self.turn == TurnState::Dragging {
            return Outcome::Ignored(Notice::Busy);
        }
        match self.state.undo() {
            Ok(decision) => {
                debug!(card = decision.card_index, "decision undone");
                self.turn = TurnState::Idle;
                Outcome::Undone(decision)
            }
            Err(notice) => Outcome::Ignored(notice),
        }
    }

    fn commit(&mut self, action: Action, timestamp: u64) -> Outcome {
        match self.state.commit(action, timestamp) {
            Ok(decision) => {
                debug!(card = decision.card_index, action = action.as_str(), "decision committed");
                self.turn = TurnState::Committed(action);
                Outcome::Committed(decision)
            }
            Err(notice) => {
                self.turn = TurnState::Idle;
                Outcome::Ignored(notice)
            }
        }
    }
}

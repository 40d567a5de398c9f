//! ホストへ返す結果
//!
//! 明示的な「結果取得」操作のときだけ作られるスナップショット。

use crate::decision::{Action, LastAction, StackState};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwipedCard {
    pub index: usize,
    pub action: Action,
    pub timestamp: u64,
}

/// 結果スナップショット
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwipeResults {
    pub total_swiped: usize,
    pub remaining_cards: usize,
    pub current_index: usize,
    pub liked: Vec<usize>,
    pub passed: Vec<usize>,
    pub swiped_cards: Vec<SwipedCard>,
    pub last_action: Option<LastAction>,
}

impl SwipeResults {
    pub fn from_state(state: &StackState) -> Self {
        Self {
            total_swiped: state.total_swiped(),
            remaining_cards: state.remaining(),
            current_index: state.cursor(),
            liked: state.liked(),
            passed: state.passed(),
            swiped_cards: state
                .history()
                .iter()
                .map(|d| SwipedCard {
                    index: d.card_index,
                    action: d.action,
                    timestamp: d.timestamp,
                })
                .collect(),
            last_action: state.last_action(),
        }
    }
}

/// 結果の受け取り先（ホスト境界）
pub trait ResultsSink {
    fn deliver(&mut self, results: &SwipeResults);
}

impl<F> ResultsSink for F
where
    F: FnMut(&SwipeResults),
{
    fn deliver(&mut self, results: &SwipeResults) {
        self(results)
    }
}

/// 受け取った結果を溜めておくだけのシンク
#[derive(Debug, Clone, Default)]
pub struct CollectingSink {
    pub delivered: Vec<SwipeResults>,
}

impl ResultsSink for CollectingSink {
    fn deliver(&mut self, results: &SwipeResults) {
        self.delivered.push(results.clone());
    }
}

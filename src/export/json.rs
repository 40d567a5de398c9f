//! JSONレポート出力
//!
//! 結果スナップショットにカードごとの判定を添えて書き出す。

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;
use swipecards_common::{Action, Card, SwipeResults};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardDecision {
    pub index: usize,
    pub title: String,
    pub kind: String,
    /// 未判定は null
    pub action: Option<Action>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultsReport {
    pub generated_at: String,
    pub results: SwipeResults,
    pub cards: Vec<CardDecision>,
}

impl ResultsReport {
    pub fn new(results: &SwipeResults, cards: &[Card]) -> Self {
        let cards = cards
            .iter()
            .map(|card| CardDecision {
                index: card.index(),
                title: card.title().to_string(),
                kind: card.kind().as_str().to_string(),
                action: results
                    .swiped_cards
                    .iter()
                    .find(|s| s.index == card.index())
                    .map(|s| s.action),
            })
            .collect();
        Self {
            generated_at: chrono::Local::now().to_rfc3339(),
            results: results.clone(),
            cards,
        }
    }
}

pub fn write_report(results: &SwipeResults, cards: &[Card], path: &Path) -> Result<()> {
    let report = ResultsReport::new(results, cards);
    let json = serde_json::to_string_pretty(&report)?;
    std::fs::write(path, json)?;
    Ok(())
}

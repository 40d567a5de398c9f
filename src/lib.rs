//! スワイプカード評価ツール（CLI）
//!
//! 入力JSON・データセット（CSV / Excel）の読み込み、端末セッション、結果の書き出しを担当する。
//! カードの判定ロジックは `swipecards_common` にある。

pub mod cards;
pub mod cli;
pub mod config;
pub mod dataset;
pub mod error;
pub mod export;
pub mod session;

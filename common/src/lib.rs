//! Swipe Cards Common Library
//!
//! CLIとWeb(WASM)で共有されるスワイプカードのエンジン。
//! カードモデル・ジェスチャ追跡・判定・アニメーション・スタック描画コアを含む。

pub mod animation;
pub mod card;
pub mod config;
pub mod decision;
pub mod error;
pub mod export;
pub mod gesture;
pub mod results;
pub mod stack;
pub mod table;

pub use animation::{AnimationController, AnimationFinished, AnimationKind, Indicator, Transform};
pub use card::{build_cards, build_session_cards, Card, CardContent, CardKind, CardSpec, DatasetResolver, InMemoryResolver, SessionBundle, SessionInput};
pub use config::{DisplayMode, RenderOptions, SwipeConfig, ThemeMode};
pub use decision::{Action, ActionKind, Decision, DecisionEngine, LastAction, Notice, Outcome, StackState};
pub use error::{Error, Result};
pub use gesture::{GestureTracker, Point, PointerId, PointerKind};
pub use results::{CollectingSink, ResultsSink, SwipeResults, SwipedCard};
pub use stack::{Command, DisplayState, Response, SwipeStack, VisibleCard};
pub use table::{CellStyle, ColumnRef, Highlights, TableData, TableView};

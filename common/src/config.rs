//! エンジン設定と表示オプション
//!
//! しきい値やアニメーション時間は実装上の定数ではなく設定値として扱う。

use serde::{Deserialize, Serialize};

/// スワイプエンジンの調整値
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SwipeConfig {
    /// 確定とみなす水平移動量 (px)。この値ちょうども確定
    pub distance_threshold: f64,
    /// フリック判定の水平速度 (px/ms)
    pub fling_velocity: f64,
    /// 水平移動 1px あたりの回転角 (deg)
    pub rotation_factor: f64,
    /// like/pass インジケータを表示する移動量 (px)
    pub indicator_threshold: f64,
    /// フリックアウトの時間 (ms)
    pub fling_out_ms: f64,
    /// 元位置へ戻るアニメーションの時間 (ms)
    pub return_ms: f64,
    /// 戻す操作で再入場するアニメーションの時間 (ms)
    pub undo_ms: f64,
    /// フリックアウト時にカードが移動する水平距離 (px)
    pub fling_distance: f64,
    /// トップカードの下に見せるカード枚数
    pub peek_count: usize,
    /// 奥のカード1枚ごとの縮小率
    pub peek_scale_step: f64,
    /// 奥のカード1枚ごとの縦オフセット (px)
    pub peek_offset_step: f64,
}

impl Default for SwipeConfig {
    fn default() -> Self {
        Self {
            distance_threshold: 100.0,
            fling_velocity: 0.5,
            rotation_factor: 0.1,
            indicator_threshold: 50.0,
            fling_out_ms: 300.0,
            return_ms: 250.0,
            undo_ms: 300.0,
            fling_distance: 600.0,
            peek_count: 2,
            peek_scale_step: 0.05,
            peek_offset_step: 10.0,
        }
    }
}

impl SwipeConfig {
    /// 値の整合性チェック
    pub fn validate(&self) -> crate::Result<()> {
        if !(self.distance_threshold > 0.0) {
            return Err(crate::Error::Config(format!(
                "distance_threshold must be positive (got {})",
                self.distance_threshold
            )));
        }
        if !(self.fling_velocity > 0.0) {
            return Err(crate::Error::Config(format!(
                "fling_velocity must be positive (got {})",
                self.fling_velocity
            )));
        }
        for (name, value) in [
            ("fling_out_ms", self.fling_out_ms),
            ("return_ms", self.return_ms),
            ("undo_ms", self.undo_ms),
        ] {
            if !(value >= 0.0) {
                return Err(crate::Error::Config(format!(
                    "{} must not be negative (got {})",
                    name, value
                )));
            }
        }
        Ok(())
    }
}

/// 表示モード
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DisplayMode {
    #[default]
    Cards,
    Table,
}

impl DisplayMode {
    /// ホストに伝えるビューポート高さの既定値 (px)
    pub fn default_viewport_height(&self) -> u32 {
        match self {
            DisplayMode::Cards => 620,
            DisplayMode::Table => 720,
        }
    }
}

/// テーマ
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeMode {
    #[default]
    Auto,
    Light,
    Dark,
}

impl ThemeMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ThemeMode::Auto => "auto",
            ThemeMode::Light => "light",
            ThemeMode::Dark => "dark",
        }
    }
}

/// ホストから渡される表示オプション
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RenderOptions {
    #[serde(alias = "show_border")]
    pub show_border: bool,
    pub theme: ThemeMode,
    #[serde(alias = "font_size")]
    pub font_size: f32,
    #[serde(alias = "max_rows")]
    pub max_rows: Option<usize>,
    #[serde(alias = "max_columns")]
    pub max_columns: Option<usize>,
    #[serde(alias = "last_card_message")]
    pub last_card_message: Option<String>,
    #[serde(alias = "viewport_height")]
    pub viewport_height: Option<u32>,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            show_border: true,
            theme: ThemeMode::Auto,
            font_size: 16.0,
            max_rows: None,
            max_columns: None,
            last_card_message: None,
            viewport_height: None,
        }
    }
}

pub const DEFAULT_LAST_CARD_MESSAGE: &str = "🎉 All done!";

impl RenderOptions {
    pub fn last_card_message(&self) -> &str {
        self.last_card_message
            .as_deref()
            .filter(|m| !m.trim().is_empty())
            .unwrap_or(DEFAULT_LAST_CARD_MESSAGE)
    }

    pub fn viewport_height(&self, mode: DisplayMode) -> u32 {
        self.viewport_height
            .unwrap_or_else(|| mode.default_viewport_height())
    }
}

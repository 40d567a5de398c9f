use crate::error::{Result, SwipeCardsError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use swipecards_common::{RenderOptions, SwipeConfig};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    /// エンジンの調整値
    pub swipe: SwipeConfig,
    /// 入力側で指定がない場合の表示オプション
    pub render: RenderOptions,
    /// 結果の保存先（省略時はカレント）
    pub results_dir: Option<PathBuf>,
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: Config = serde_json::from_str(&content)?;
            config.swipe.validate()?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        self.swipe.validate()?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| SwipeCardsError::Config("ホームディレクトリが見つかりません".into()))?;
        Ok(home.join(".config").join("swipecards").join("config.json"))
    }

    pub fn results_dir(&self) -> PathBuf {
        self.results_dir.clone().unwrap_or_else(|| PathBuf::from("."))
    }
}

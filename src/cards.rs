//! 入力JSONの読み込みとカード構築
//!
//! 相対パス（画像・データセット）は入力JSONのあるディレクトリを基準に解決する。

use crate::dataset::DatasetCache;
use crate::error::{Result, SwipeCardsError};
use base64::{engine::general_purpose::STANDARD, Engine};
use std::path::{Path, PathBuf};
use swipecards_common::{build_session_cards, Card, SessionBundle, SessionInput};
use tracing::debug;

/// 読み込み済みの入力
#[derive(Debug, Clone)]
pub struct LoadedInput {
    pub input: SessionInput,
    pub base_dir: PathBuf,
}

impl LoadedInput {
    pub fn cache(&self) -> DatasetCache {
        DatasetCache::new(&self.base_dir)
    }
}

/// 入力JSONファイルを読み込み
pub fn load_input(path: &Path) -> Result<LoadedInput> {
    if !path.exists() {
        return Err(SwipeCardsError::FileNotFound(path.display().to_string()));
    }
    let content = std::fs::read_to_string(path)?;
    let input: SessionInput = serde_json::from_str(&content)?;
    let base_dir = path
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));
    debug!(cards = input.cards.len(), base = %base_dir.display(), "input loaded");
    Ok(LoadedInput { input, base_dir })
}

/// カード列を構築（不正なカードが1枚でもあれば失敗）
pub fn build_from_input(loaded: &LoadedInput, cache: &mut DatasetCache) -> Result<Vec<Card>> {
    Ok(build_session_cards(&loaded.input, cache)?)
}

/// 画像参照がローカルファイルかどうか
fn is_local_image(reference: &str) -> bool {
    let lower = reference.to_lowercase();
    !(lower.starts_with("http://")
        || lower.starts_with("https://")
        || lower.starts_with("data:")
        || lower.starts_with("blob:"))
}

fn mime_for(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_lowercase();
    match ext.as_str() {
        "jpg" | "jpeg" => Some("image/jpeg"),
        "png" => Some("image/png"),
        "gif" => Some("image/gif"),
        "webp" => Some("image/webp"),
        "svg" => Some("image/svg+xml"),
        _ => None,
    }
}

/// ローカル画像を data URL に変換
pub fn image_data_url(path: &Path) -> Result<String> {
    let mime = mime_for(path).ok_or_else(|| {
        SwipeCardsError::Config(format!("画像形式に対応していません: {}", path.display()))
    })?;
    let bytes = std::fs::read(path)?;
    Ok(format!("data:{};base64,{}", mime, STANDARD.encode(bytes)))
}

/// カード指定内のローカル画像を data URL に置き換える。置き換えた枚数を返す
pub fn inline_images(input: &mut SessionInput, base_dir: &Path) -> Result<usize> {
    let mut count = 0;
    for spec in &mut input.cards {
        let Some(image) = spec.image.as_deref().map(str::trim) else {
            continue;
        };
        if image.is_empty() || !is_local_image(image) {
            continue;
        }
        let path = base_dir.join(image);
        if !path.exists() {
            return Err(SwipeCardsError::FileNotFound(path.display().to_string()));
        }
        spec.image = Some(image_data_url(&path)?);
        count += 1;
    }
    Ok(count)
}

/// Web版に渡すバンドルを作成
///
/// カードを一度構築して検証してから、参照された表データと画像を同梱する。
pub fn make_bundle(loaded: &LoadedInput) -> Result<(SessionBundle, usize)> {
    let mut cache = loaded.cache();
    build_from_input(loaded, &mut cache)?;

    let mut input = loaded.input.clone();
    let inlined = inline_images(&mut input, &loaded.base_dir)?;

    let datasets = cache
        .references()
        .into_iter()
        .filter_map(|r| cache.get(r))
        .map(|t| t.as_ref().clone())
        .collect();
    Ok((SessionBundle { input, datasets }, inlined))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_local_image() {
        assert!(is_local_image("photos/a.jpg"));
        assert!(!is_local_image("https://example.com/a.jpg"));
        assert!(!is_local_image("data:image/png;base64,AAAA"));
    }

    #[test]
    fn test_image_data_url() {
        let dir = tempfile::tempdir().expect("一時ディレクトリ作成失敗");
        let path = dir.path().join("dot.png");
        std::fs::write(&path, [0x89, b'P', b'N', b'G']).expect("書き込み失敗");

        let url = image_data_url(&path).expect("変換失敗");
        assert_eq!(url, "data:image/png;base64,iVBORw==");
    }

    #[test]
    fn test_unknown_image_extension() {
        let dir = tempfile::tempdir().expect("一時ディレクトリ作成失敗");
        let path = dir.path().join("a.tiff");
        std::fs::write(&path, b"x").expect("書き込み失敗");
        assert!(matches!(image_data_url(&path), Err(SwipeCardsError::Config(_))));
    }
}

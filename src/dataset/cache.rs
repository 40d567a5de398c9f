//! データセットキャッシュ
//!
//! 参照文字列をキーに読み込み済みの表を保持し、同じファイルの再読込をスキップする。
//! 相対パスは入力JSONのあるディレクトリを基準に解決する。

use super::load_dataset;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use swipecards_common::{DatasetResolver, TableData};
use tracing::{debug, warn};

/// キャッシュ統計
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: usize,
    pub misses: usize,
    pub entries: usize,
}

#[derive(Debug, Clone)]
pub struct DatasetCache {
    base_dir: PathBuf,
    tables: HashMap<String, Arc<TableData>>,
    hits: usize,
    misses: usize,
}

impl DatasetCache {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
            tables: HashMap::new(),
            hits: 0,
            misses: 0,
        }
    }

    /// 参照を実パスに解決
    pub fn resolve_path(&self, reference: &str) -> PathBuf {
        let path = Path::new(reference);
        if path.is_relative() {
            self.base_dir.join(path)
        } else {
            path.to_path_buf()
        }
    }

    pub fn get(&self, reference: &str) -> Option<&Arc<TableData>> {
        self.tables.get(reference)
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits,
            misses: self.misses,
            entries: self.tables.len(),
        }
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    /// 読み込み済みの参照一覧（ソート済み）
    pub fn references(&self) -> Vec<&str> {
        let mut refs: Vec<&str> = self.tables.keys().map(String::as_str).collect();
        refs.sort_unstable();
        refs
    }

    pub fn clear(&mut self) {
        self.tables.clear();
        self.hits = 0;
        self.misses = 0;
    }
}

impl DatasetResolver for DatasetCache {
    fn resolve(&mut self, reference: &str) -> swipecards_common::Result<Arc<TableData>> {
        if let Some(table) = self.tables.get(reference) {
            self.hits += 1;
            return Ok(Arc::clone(table));
        }

        self.misses += 1;
        let path = self.resolve_path(reference);
        debug!(reference, path = %path.display(), "loading dataset");
        let table = load_dataset(&path, reference).map_err(|e| {
            warn!(reference, error = %e, "dataset load failed");
            e.into_common()
        })?;

        let table = Arc::new(table);
        self.tables.insert(reference.to_string(), Arc::clone(&table));
        Ok(table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relative_reference_uses_base_dir() {
        let cache = DatasetCache::new("/data/input");
        assert_eq!(cache.resolve_path("people.csv"), PathBuf::from("/data/input/people.csv"));
        assert_eq!(cache.resolve_path("/abs/people.csv"), PathBuf::from("/abs/people.csv"));
    }

    #[test]
    fn test_second_resolve_is_hit() {
        let dir = tempfile::tempdir().expect("一時ディレクトリ作成失敗");
        std::fs::write(dir.path().join("p.csv"), "A\n1\n2\n").expect("書き込み失敗");

        let mut cache = DatasetCache::new(dir.path());
        let first = cache.resolve("p.csv").expect("読み込み失敗");
        let second = cache.resolve("p.csv").expect("読み込み失敗");

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.stats(), CacheStats { hits: 1, misses: 1, entries: 1 });
    }

    #[test]
    fn test_failed_load_not_cached() {
        let dir = tempfile::tempdir().expect("一時ディレクトリ作成失敗");
        let mut cache = DatasetCache::new(dir.path());
        assert!(cache.resolve("missing.csv").is_err());
        assert!(cache.is_empty());
        assert_eq!(cache.stats().misses, 1);
    }
}

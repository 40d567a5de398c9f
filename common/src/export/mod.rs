//! 結果の書き出し（CLI と WASM で共有）

use crate::results::SwipeResults;

#[cfg(feature = "excel")]
pub mod results_excel;

/// 整形済み JSON
pub fn results_json(results: &SwipeResults) -> crate::Result<String> {
    Ok(serde_json::to_string_pretty(results)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_results_json_is_camel_case() {
        let json = results_json(&SwipeResults::default()).expect("JSON生成失敗");
        assert!(json.contains("\"totalSwiped\": 0"));
        assert!(json.contains("\"lastAction\": null"));
    }
}

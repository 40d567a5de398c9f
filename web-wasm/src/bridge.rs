//! JavaScript ホストとの境界
//!
//! 入力の受け取り（JSON文字列またはオブジェクト）と、結果コールバックの呼び出し。

use serde::Serialize;
use swipecards_common::{ResultsSink, SessionBundle, SwipeResults};
use wasm_bindgen::prelude::*;

/// ホストから渡された入力を解釈
///
/// 文字列なら JSON として、オブジェクトならそのままデシリアライズする。
pub fn parse_bundle(input: JsValue) -> Result<SessionBundle, String> {
    if let Some(text) = input.as_string() {
        return serde_json::from_str(&text).map_err(|e| format!("入力JSONの解析に失敗: {}", e));
    }
    serde_wasm_bindgen::from_value(input).map_err(|e| format!("入力の解析に失敗: {}", e))
}

/// Rust の値を素の JS オブジェクトに変換（Map ではなく Object）
pub fn to_js<T: Serialize>(value: &T) -> Result<JsValue, serde_wasm_bindgen::Error> {
    value.serialize(&serde_wasm_bindgen::Serializer::json_compatible())
}

/// 結果を JS のコールバック関数に渡す
#[derive(Clone, Default)]
pub struct JsCallbackSink {
    callback: Option<js_sys::Function>,
}

impl JsCallbackSink {
    pub fn new(callback: Option<js_sys::Function>) -> Self {
        Self { callback }
    }
}

impl ResultsSink for JsCallbackSink {
    fn deliver(&mut self, results: &SwipeResults) {
        let Some(callback) = &self.callback else {
            return;
        };
        let value = match to_js(results) {
            Ok(value) => value,
            Err(e) => {
                web_sys::console::error_1(&format!("結果の変換に失敗: {}", e).into());
                return;
            }
        };
        if let Err(e) = callback.call1(&JsValue::NULL, &value) {
            web_sys::console::error_2(&"結果コールバックで例外".into(), &e);
        }
    }
}

/// 結果JSONをファイルとしてダウンロードさせる
pub fn download_json(file_name: &str, json: &str) -> Result<(), JsValue> {
    let parts = js_sys::Array::of1(&JsValue::from_str(json));
    let options = web_sys::BlobPropertyBag::new();
    options.set_type("application/json");
    let blob = web_sys::Blob::new_with_str_sequence_and_options(&parts, &options)?;
    let url = web_sys::Url::create_object_url_with_blob(&blob)?;

    let document = web_sys::window()
        .and_then(|w| w.document())
        .ok_or_else(|| JsValue::from_str("document がありません"))?;
    let anchor: web_sys::HtmlAnchorElement = document.create_element("a")?.dyn_into()?;
    anchor.set_href(&url);
    anchor.set_download(file_name);
    anchor.click();

    web_sys::Url::revoke_object_url(&url)
}

#[cfg(test)]
mod tests {
    use super::*;
    use wasm_bindgen_test::*;

    #[wasm_bindgen_test]
    fn test_parse_bundle_from_json_string() {
        let input = JsValue::from_str(
            r#"{"cards": [{"name": "A", "description": "a", "image": "a.jpg"}],
                "options": {"lastCardMessage": "done"}}"#,
        );
        let bundle = parse_bundle(input).expect("解析失敗");
        assert_eq!(bundle.input.cards.len(), 1);
        assert_eq!(bundle.input.options.last_card_message(), "done");
    }

    #[wasm_bindgen_test]
    fn test_parse_bundle_rejects_garbage() {
        assert!(parse_bundle(JsValue::from_str("{")).is_err());
    }

    #[wasm_bindgen_test]
    fn test_sink_without_callback_is_silent() {
        let mut sink = JsCallbackSink::default();
        sink.deliver(&SwipeResults::default());
    }
}

//! Swipe Cards Web Component (Leptos + WASM)
//!
//! ホストページから `mountSwipeCards(selector, input, onResults, config)` で呼び出す。

mod app;
mod bridge;
mod components;

use app::App;
use leptos::prelude::*;
use swipecards_common::{SwipeConfig, SwipeStack};
use wasm_bindgen::prelude::*;

#[wasm_bindgen(start)]
pub fn main() {
    console_error_panic_hook::set_once();
}

/// セレクタで指定した要素にスワイプカードを描画する
///
/// `input` は JSON 文字列または同じ形のオブジェクト。
/// 戻り値はホスト側で確保すべきビューポートの高さ (px)。
#[wasm_bindgen(js_name = mountSwipeCards)]
pub fn mount_swipe_cards(
    selector: &str,
    input: JsValue,
    on_results: Option<js_sys::Function>,
    config: JsValue,
) -> Result<u32, JsValue> {
    let bundle = bridge::parse_bundle(input).map_err(|e| JsValue::from_str(&e))?;
    let config: SwipeConfig = if config.is_undefined() || config.is_null() {
        SwipeConfig::default()
    } else {
        serde_wasm_bindgen::from_value(config)?
    };

    let cards = bundle
        .build_cards()
        .map_err(|e| JsValue::from_str(&e.to_string()))?;
    let stack = SwipeStack::new(cards, config)
        .map_err(|e| JsValue::from_str(&e.to_string()))?
        .with_display(bundle.input.display_mode, bundle.input.options.clone());
    let height = stack.viewport_height();

    let parent: web_sys::HtmlElement = web_sys::window()
        .and_then(|w| w.document())
        .ok_or_else(|| JsValue::from_str("document がありません"))?
        .query_selector(selector)?
        .ok_or_else(|| JsValue::from_str(&format!("要素が見つかりません: {}", selector)))?
        .dyn_into()?;

    let sink = bridge::JsCallbackSink::new(on_results);
    leptos::mount::mount_to(parent, move || view! { <App stack=stack sink=sink /> }).forget();
    Ok(height)
}

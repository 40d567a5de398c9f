//! 結果パネルコンポーネント
//!
//! 「Get Results」で渡した最新の結果を表示し、JSONとして保存できるようにする。

use crate::bridge::download_json;
use leptos::prelude::*;
use swipecards_common::export::results_json;
use swipecards_common::{SwipeResults, SwipeStack};

#[component]
pub fn ResultsPanel(
    stack: RwSignal<SwipeStack>,
    results: ReadSignal<Option<SwipeResults>>,
) -> impl IntoView {
    let titles = move |indices: &[usize]| -> Vec<String> {
        stack.with_untracked(|s| {
            indices
                .iter()
                .filter_map(|i| s.cards().get(*i))
                .map(|c| c.title().to_string())
                .collect()
        })
    };

    let on_download = move |_| {
        let Some(r) = results.get_untracked() else {
            return;
        };
        let saved = results_json(&r)
            .map_err(|e| wasm_bindgen::JsValue::from_str(&e.to_string()))
            .and_then(|json| download_json("swipe-results.json", &json));
        if let Err(e) = saved {
            web_sys::console::error_2(&"結果の保存に失敗".into(), &e);
        }
    };

    view! {
        {move || results.get().map(|r| {
            let liked = titles(&r.liked);
            let passed = titles(&r.passed);
            view! {
                <div class="results-panel">
                    <h4>"Results"</h4>
                    <p>
                        {format!(
                            "Swiped: {} | Remaining: {} | Like: {} | Pass: {}",
                            r.total_swiped,
                            r.remaining_cards,
                            r.liked.len(),
                            r.passed.len()
                        )}
                    </p>
                    <div class="results-lists">
                        <ul class="liked">
                            {liked.into_iter().map(|t| view! { <li>{t}</li> }).collect_view()}
                        </ul>
                        <ul class="passed">
                            {passed.into_iter().map(|t| view! { <li>{t}</li> }).collect_view()}
                        </ul>
                    </div>
                    <button class="btn btn-small btn-secondary" on:click=on_download>
                        "JSON保存"
                    </button>
                </div>
            }
        })}
    }
}

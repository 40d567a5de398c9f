//! ヘッダーコンポーネント（スワイプ済み・残り枚数）

use leptos::prelude::*;

#[component]
pub fn Header(counter: Signal<String>) -> impl IntoView {
    view! {
        <header class="header">
            <span class="counter">{move || counter.get()}</span>
        </header>
    }
}

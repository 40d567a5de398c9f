//! メインアプリケーションコンポーネント

use crate::bridge::JsCallbackSink;
use crate::components::{
    action_buttons::ActionButtons,
    card_view::CardView,
    header::Header,
    progress_bar::ProgressBar,
    results_panel::ResultsPanel,
};
use gloo::events::EventListener;
use gloo::timers::callback::Interval;
use leptos::prelude::*;
use swipecards_common::{Command, DisplayState, Outcome, Response, SwipeResults, SwipeStack};
use wasm_bindgen::JsCast;

/// アニメーションフレームの間隔 (ms)
const FRAME_MS: u32 = 16;

/// 現在時刻（エポックms）
pub fn now_ms() -> f64 {
    js_sys::Date::now()
}

/// 無視された入力の理由を表示用に取り出す
pub fn notice_text(outcome: &Outcome) -> Option<String> {
    match outcome {
        Outcome::Ignored(notice) => Some(notice.message().to_string()),
        _ => None,
    }
}

/// 入力欄でのキー入力は横取りしない
fn is_editable_target(event: &web_sys::KeyboardEvent) -> bool {
    let Some(element) = event
        .target()
        .and_then(|t| t.dyn_into::<web_sys::HtmlElement>().ok())
    else {
        return false;
    };
    matches!(element.tag_name().as_str(), "INPUT" | "TEXTAREA" | "SELECT")
        || element.is_content_editable()
}

/// メインアプリケーションコンポーネント
#[component]
pub fn App(stack: SwipeStack, sink: JsCallbackSink) -> impl IntoView {
    let total = stack.cards().len();
    let display_mode = stack.display_mode();
    let options = stack.options().clone();

    let stack = RwSignal::new(stack);
    let sink = StoredValue::new_local(sink);
    let (results, set_results) = signal(None::<SwipeResults>);
    let (notice, set_notice) = signal(None::<String>);

    // ボタンとキーボードの応答をまとめて処理
    let report = move |response: Option<Response>| match response {
        Some(Response::Results(r)) => {
            set_notice.set(None);
            set_results.set(Some(r));
        }
        Some(Response::Outcome(outcome)) => set_notice.set(notice_text(&outcome)),
        Some(Response::Queued(_)) | None => {}
    };

    let dispatch = move |command: Command| {
        let mut sink = sink.get_value();
        let response = stack.try_update(|s| s.execute(command, now_ms(), &mut sink));
        report(response);
    };

    // アニメーション中だけ状態を更新する
    let ticker = Interval::new(FRAME_MS, move || {
        if stack.with_untracked(|s| s.is_animating()) {
            stack.update(|s| {
                s.tick(now_ms());
            });
        }
    });
    StoredValue::new_local(ticker);

    if let Some(window) = web_sys::window() {
        let keyboard = EventListener::new(&window, "keydown", move |event| {
            let Some(event) = event.dyn_ref::<web_sys::KeyboardEvent>() else {
                return;
            };
            if event.repeat() || is_editable_target(event) {
                return;
            }
            if Command::from_key(&event.key()).is_none() {
                return;
            }
            event.prevent_default();
            let mut sink = sink.get_value();
            let response = stack
                .try_update(|s| s.handle_key(&event.key(), now_ms(), &mut sink))
                .flatten();
            report(response);
        });
        StoredValue::new_local(keyboard);
    }

    let card_indices = move || {
        stack.with(|s| {
            s.visible_window()
                .iter()
                .map(|v| v.card.index())
                .collect::<Vec<_>>()
        })
    };
    let status_message = move || {
        stack.with(|s| s.status_message().map(str::to_string))
    };
    let exhausted = move || stack.with(|s| s.display_state() == DisplayState::Exhausted);
    let progress = Signal::derive(move || {
        if total == 0 {
            0.0
        } else {
            stack.with(|s| s.total_swiped()) as f32 / total as f32
        }
    });

    let container_class = format!(
        "swipe-cards mode-{} theme-{}",
        match display_mode {
            swipecards_common::DisplayMode::Cards => "cards",
            swipecards_common::DisplayMode::Table => "table",
        },
        options.theme.as_str()
    );
    let container_style = format!(
        "min-height: {}px; font-size: {}px;",
        options.viewport_height(display_mode),
        options.font_size
    );

    view! {
        <div class=container_class class:bordered=options.show_border style=container_style>
            <Header counter=Signal::derive(move || stack.with(|s| s.counter_text())) />
            <ProgressBar progress=progress />

            <div class="card-stack">
                <For
                    each=card_indices
                    key=|index| *index
                    children=move |index| {
                        view! { <CardView stack=stack index=index set_notice=set_notice /> }
                    }
                />
                {move || status_message().map(|message| {
                    view! {
                        <div class="stack-message" class:done=exhausted>
                            <p>{message}</p>
                        </div>
                    }
                })}
            </div>

            <Show when=move || notice.get().is_some()>
                <p class="notice text-muted">{move || notice.get().unwrap_or_default()}</p>
            </Show>

            <ActionButtons stack=stack on_command=dispatch />

            <ResultsPanel stack=stack results=results />
        </div>
    }
}

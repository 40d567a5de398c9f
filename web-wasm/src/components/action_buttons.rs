//! 操作ボタンコンポーネント（Pass / Back / Like / Get Results）

use leptos::prelude::*;
use swipecards_common::{Command, DisplayState, SwipeStack};

#[component]
pub fn ActionButtons<F>(stack: RwSignal<SwipeStack>, on_command: F) -> impl IntoView
where
    F: Fn(Command) + Copy + 'static,
{
    let no_cards = move || stack.with(|s| s.display_state() == DisplayState::Empty);
    let dragging = move || stack.with(|s| s.is_dragging());

    view! {
        <div class="action-buttons">
            <button
                class="btn btn-pass"
                disabled=move || no_cards() || dragging()
                on:click=move |_| on_command(Command::Pass)
            >
                {Command::Pass.label()}
            </button>

            <button
                class="btn btn-secondary"
                disabled=move || no_cards() || dragging()
                on:click=move |_| on_command(Command::Back)
            >
                {Command::Back.label()}
            </button>

            <button
                class="btn btn-like"
                disabled=move || no_cards() || dragging()
                on:click=move |_| on_command(Command::Like)
            >
                {Command::Like.label()}
            </button>

            <button
                class="btn btn-primary"
                on:click=move |_| on_command(Command::GetResults)
            >
                {Command::GetResults.label()}
            </button>
        </div>
    }
}

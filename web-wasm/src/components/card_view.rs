//! カードコンポーネント
//!
//! 中身（画像・表）は構築時に一度だけ描画し、変換とインジケータだけを追従させる。
//! ジェスチャはトップカードだけが受け付ける。

use crate::app::{notice_text, now_ms};
use crate::components::table_view::TableBlock;
use leptos::prelude::*;
use wasm_bindgen::JsCast;
use swipecards_common::{
    Card, CardContent, Indicator, Point, PointerId, PointerKind, SwipeStack,
};

/// 1フレーム分の描画状態
#[derive(Clone, Debug, PartialEq)]
struct Frame {
    style: String,
    indicator: Indicator,
    is_top: bool,
    outgoing: bool,
}

fn frame_of(stack: &SwipeStack, index: usize) -> Option<Frame> {
    let window = stack.visible_window();
    let len = window.len();
    window.iter().find(|v| v.card.index() == index).map(|v| Frame {
        style: format!(
            "transform: {}; opacity: {:.2}; z-index: {};",
            v.transform.to_css(),
            v.transform.opacity,
            v.z_index(len)
        ),
        indicator: v.indicator,
        is_top: v.is_top(),
        outgoing: v.outgoing,
    })
}

fn pointer_kind(ev: &web_sys::PointerEvent) -> PointerKind {
    match ev.pointer_type().as_str() {
        "touch" => PointerKind::Touch,
        "pen" => PointerKind::Pen,
        _ => PointerKind::Mouse,
    }
}

fn point_of(ev: &web_sys::PointerEvent) -> Point {
    Point::new(ev.client_x() as f64, ev.client_y() as f64, now_ms())
}

#[component]
pub fn CardView(
    stack: RwSignal<SwipeStack>,
    index: usize,
    set_notice: WriteSignal<Option<String>>,
) -> impl IntoView {
    let Some(card) = stack.with_untracked(|s| s.cards().get(index).cloned()) else {
        return ().into_any();
    };
    let options = stack.with_untracked(|s| s.options().clone());
    let class = format!("card {}", card.css_class());

    let frame = Memo::new(move |_| stack.with(|s| frame_of(s, index)));
    let style = move || frame.get().map(|f| f.style).unwrap_or_default();
    let is_top = move || frame.get().is_some_and(|f| f.is_top);
    let indicator = move || frame.get().map(|f| f.indicator).unwrap_or_default();

    let on_pointerdown = move |ev: web_sys::PointerEvent| {
        if !is_top() {
            return;
        }
        let pointer = PointerId(ev.pointer_id());
        let kind = pointer_kind(&ev);
        let point = point_of(&ev);
        let result = stack.try_update(|s| s.pointer_down(pointer, kind, point));
        match result {
            Some(Ok(())) => {
                ev.prevent_default();
                // 要素外へ出てもドラッグを追えるように捕捉
                if let Some(element) = ev.target().and_then(|t| t.dyn_into::<web_sys::Element>().ok()) {
                    if let Err(e) = element.set_pointer_capture(ev.pointer_id()) {
                        web_sys::console::warn_2(&"ポインタの捕捉に失敗".into(), &e);
                    }
                }
                set_notice.set(None);
            }
            Some(Err(notice)) => set_notice.set(Some(notice.message().to_string())),
            None => {}
        }
    };

    let on_pointermove = move |ev: web_sys::PointerEvent| {
        if !stack.with_untracked(|s| s.is_dragging()) {
            return;
        }
        let pointer = PointerId(ev.pointer_id());
        let point = point_of(&ev);
        stack.update(|s| {
            s.pointer_move(pointer, point);
        });
    };

    let on_pointerup = move |ev: web_sys::PointerEvent| {
        if !stack.with_untracked(|s| s.is_dragging()) {
            return;
        }
        let pointer = PointerId(ev.pointer_id());
        let point = point_of(&ev);
        if let Some(outcome) = stack.try_update(|s| s.pointer_up(pointer, point)) {
            set_notice.set(notice_text(&outcome));
        }
    };

    let on_pointercancel = move |ev: web_sys::PointerEvent| {
        if !stack.with_untracked(|s| s.is_dragging()) {
            return;
        }
        let pointer = PointerId(ev.pointer_id());
        stack.update(|s| {
            s.pointer_cancel(pointer, now_ms());
        });
    };

    view! {
        <div
            class=class
            class:top=is_top
            class:outgoing=move || frame.get().is_some_and(|f| f.outgoing)
            style=style
            on:pointerdown=on_pointerdown
            on:pointermove=on_pointermove
            on:pointerup=on_pointerup
            on:pointercancel=on_pointercancel
        >
            <div class="indicator like" class:visible=move || indicator() == Indicator::Like>
                "LIKE"
            </div>
            <div class="indicator pass" class:visible=move || indicator() == Indicator::Pass>
                "PASS"
            </div>
            <CardBody card=card options=options />
        </div>
    }
    .into_any()
}

#[component]
fn CardBody(card: Card, options: swipecards_common::RenderOptions) -> impl IntoView {
    let image = card.image().map(|src| {
        view! { <img class="card-image" src=src.to_string() alt=card.title().to_string() draggable="false" /> }
    });
    let table = match card.content() {
        CardContent::TableRow { table, .. } => Some(view! {
            <TableBlock
                table=table.clone()
                max_rows=options.max_rows
                max_columns=options.max_columns
            />
        }),
        CardContent::Image { .. } => None,
    };
    let pills = card
        .tags()
        .iter()
        .map(|tag| view! { <span class="pill">{tag.clone()}</span> })
        .collect_view();

    view! {
        {image}
        <div class="card-info">
            <h3>{card.title().to_string()}</h3>
            <p>{card.body().to_string()}</p>
            <div class="pills">{pills}</div>
        </div>
        {table}
    }
}

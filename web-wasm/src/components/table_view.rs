//! 表カードの表描画
//!
//! 前面の行・ハイライトは `TableView::cell_style` が決めたスタイルをそのまま当てる。

use leptos::prelude::*;
use swipecards_common::TableView;

#[component]
pub fn TableBlock(
    table: TableView,
    max_rows: Option<usize>,
    max_columns: Option<usize>,
) -> impl IntoView {
    let window = table.window(max_rows, max_columns);
    let columns = table.data().columns();

    let header = window
        .columns
        .clone()
        .map(|c| view! { <th>{columns[c].clone()}</th> })
        .collect_view();

    let body = window
        .rows
        .clone()
        .map(|row| {
            let cells = window
                .columns
                .clone()
                .map(|col| {
                    let value = table.cell(row, col).unwrap_or("").to_string();
                    let style = table.cell_style(row, col).map(|s| s.to_css()).unwrap_or_default();
                    view! { <td style=style>{value}</td> }
                })
                .collect_view();
            view! {
                <tr class:foreground={row == table.row_index()}>
                    <th class="row-number">{row}</th>
                    {cells}
                </tr>
            }
        })
        .collect_view();

    view! {
        <div class="table-container">
            <table class="data-table">
                <thead>
                    <tr>
                        <th></th>
                        {header}
                    </tr>
                </thead>
                <tbody>{body}</tbody>
            </table>
        </div>
    }
}

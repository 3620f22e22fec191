//! Компонент сортируемой ячейки заголовка таблицы
//!
//! ```ignore
//! <SortableHeaderCell
//!     label="Created"
//!     sort_field="created"
//!     sort=Signal::derive(move || table.with(|t| t.sort()))
//!     on_sort=Callback::new(move |field| controller.sort_by(field))
//! />
//! ```

use crate::shared::list_utils::get_sort_indicator;
use leptos::prelude::*;
use thaw::*;

#[component]
pub fn SortableHeaderCell(
    /// Текст заголовка
    #[prop(into)]
    label: String,

    /// Поле для сортировки
    sort_field: &'static str,

    /// Текущая сортировка: поле и направление
    #[prop(into)]
    sort: Signal<(&'static str, bool)>,

    /// Callback при клике на заголовок
    on_sort: Callback<&'static str>,
) -> impl IntoView {
    view! {
        <TableHeaderCell>
            <div
                class="table__sortable-header"
                style="cursor: pointer; user-select: none;"
                on:click=move |_| on_sort.run(sort_field)
            >
                {label}
                <span class="table__sort-indicator">
                    {move || {
                        let (field, ascending) = sort.get();
                        get_sort_indicator(field, sort_field, ascending)
                    }}
                </span>
            </div>
        </TableHeaderCell>
    }
}

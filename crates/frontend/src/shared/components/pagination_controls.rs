use leptos::prelude::*;

/// One button of the page strip
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageItem {
    Page(usize),
    Gap,
}

/// Page strip around `current` (0-indexed): first, last and two neighbours,
/// the rest collapsed into gaps.
pub fn page_window(current: usize, pages: usize) -> Vec<PageItem> {
    if pages <= 7 {
        return (0..pages).map(PageItem::Page).collect();
    }
    let from = current.saturating_sub(2).max(1);
    let to = (current + 2).min(pages - 2);
    let mut items = vec![PageItem::Page(0)];
    if from > 1 {
        items.push(PageItem::Gap);
    }
    items.extend((from..=to).map(PageItem::Page));
    if to < pages - 2 {
        items.push(PageItem::Gap);
    }
    items.push(PageItem::Page(pages - 1));
    items
}

/// "Showing 26 to 50 of 120 entries"
pub fn entries_label(page: usize, page_size: usize, total: usize) -> String {
    if total == 0 {
        return "Showing 0 to 0 of 0 entries".to_string();
    }
    let first = page * page_size + 1;
    let last = ((page + 1) * page_size).min(total);
    format!("Showing {} to {} of {} entries", first, last, total)
}

/// Pager above a list table
#[component]
pub fn PaginationControls(
    /// 0-indexed
    #[prop(into)]
    current_page: Signal<usize>,
    #[prop(into)] total_pages: Signal<usize>,
    #[prop(into)] total_count: Signal<usize>,
    #[prop(into)] page_size: Signal<usize>,
    on_page_change: Callback<usize>,
    on_page_size_change: Callback<usize>,
    page_size_options: Vec<usize>,
) -> impl IntoView {
    let fallback_size = page_size_options.get(1).or(page_size_options.first()).copied().unwrap_or(25);

    let strip = move || {
        let current = current_page.get();
        page_window(current, total_pages.get())
            .into_iter()
            .map(|item| match item {
                PageItem::Page(page) => view! {
                    <button
                        type="button"
                        class=if page == current { "paginate_button current" } else { "paginate_button" }
                        on:click=move |_| on_page_change.run(page)
                    >
                        {page + 1}
                    </button>
                }
                .into_any(),
                PageItem::Gap => view! { <span class="ellipsis">"…"</span> }.into_any(),
            })
            .collect_view()
    };

    view! {
        <div class="dataTables_wrapper">
            <label class="dataTables_length">
                "Show "
                <select
                    on:change=move |ev| {
                        let size = event_target_value(&ev).parse().unwrap_or(fallback_size);
                        on_page_size_change.run(size);
                    }
                    prop:value=move || page_size.get().to_string()
                >
                    {page_size_options.iter().map(|&size| {
                        view! { <option value=size.to_string()>{size}</option> }
                    }).collect_view()}
                </select>
                " entries"
            </label>
            <div class="dataTables_info">
                {move || entries_label(current_page.get(), page_size.get(), total_count.get())}
            </div>
            <div class="dataTables_paginate">
                <button
                    type="button"
                    class="paginate_button previous"
                    disabled=move || current_page.get() == 0
                    on:click=move |_| {
                        let page = current_page.get_untracked();
                        if page > 0 {
                            on_page_change.run(page - 1);
                        }
                    }
                >
                    "Previous"
                </button>
                {strip}
                <button
                    type="button"
                    class="paginate_button next"
                    disabled=move || current_page.get() + 1 >= total_pages.get()
                    on:click=move |_| on_page_change.run(current_page.get_untracked() + 1)
                >
                    "Next"
                </button>
            </div>
        </div>
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use PageItem::{Gap, Page};

    #[test]
    fn test_short_strip_lists_every_page() {
        assert_eq!(page_window(0, 3), vec![Page(0), Page(1), Page(2)]);
        assert!(page_window(0, 0).is_empty());
    }

    #[test]
    fn test_long_strip_collapses() {
        assert_eq!(
            page_window(5, 20),
            vec![Page(0), Gap, Page(3), Page(4), Page(5), Page(6), Page(7), Gap, Page(19)]
        );
        assert_eq!(
            page_window(0, 20),
            vec![Page(0), Page(1), Page(2), Gap, Page(19)]
        );
        assert_eq!(
            page_window(19, 20),
            vec![Page(0), Gap, Page(17), Page(18), Page(19)]
        );
    }

    #[test]
    fn test_entries_label() {
        assert_eq!(entries_label(1, 25, 120), "Showing 26 to 50 of 120 entries");
        assert_eq!(entries_label(4, 25, 120), "Showing 101 to 120 of 120 entries");
        assert_eq!(entries_label(0, 25, 0), "Showing 0 to 0 of 0 entries");
    }
}

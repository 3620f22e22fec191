//! List page controller: filters → fetch → table.

use super::filters::{
    default_query, parse_query, restore_filters, serialize_filters, FilterField, FilterValues,
};
use super::state::{arrow_key, page_from_hash, page_hash, PageStep, TableState};
use crate::layout::global_context::AppContext;
use crate::routes::navigation::{
    current_hash, current_pathname, current_search, focus_in_text_entry, replace_url,
};
use crate::shared::api_utils::{ApiError, FetchParams, ParamValue};
use crate::shared::components::pagination_controls::PaginationControls;
use crate::shared::date_utils::{default_incident_start, filter_datetime_to_unix_local};
use crate::shared::list_utils::{toggle_sort, Sortable};
use crate::shared::request_tracker::RequestTracker;
use chrono::Local;
use leptos::prelude::*;
use leptos::task::spawn_local;

/// A page that shows one filterable table.
#[allow(async_fn_in_trait)]
pub trait ListView: Clone + Send + Sync + 'static {
    type Row: Sortable + Clone + Send + Sync + 'static;

    fn app(&self) -> AppContext;

    /// Filter form controls, in form order
    fn filter_fields(&self) -> &'static [FilterField] {
        &[]
    }

    /// "No plans found"
    fn empty_message(&self) -> String;

    async fn get_data(&self, params: FetchParams) -> Result<Vec<Self::Row>, ApiError>;

    /// Called after every successful render
    fn after_render(&self) {}
}

/// `limit` plus optional `fields=` for list endpoints
pub fn list_params(mut params: FetchParams, limit: usize, fields: &[&str]) -> FetchParams {
    params.insert("limit".into(), ParamValue::Int(limit as i64));
    if !fields.is_empty() {
        params.insert("fields".into(), ParamValue::from(fields));
    }
    params
}

/// What one finished fetch did to the page
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// A newer request was issued meanwhile; nothing changed
    Stale,
    Rendered,
    /// Table swapped for an empty one, alert carries the view's message
    Empty(String),
    /// Table left as it was
    Failed(String),
}

impl FetchOutcome {
    pub fn swapped_table(&self) -> bool {
        matches!(self, FetchOutcome::Rendered | FetchOutcome::Empty(_))
    }

    pub fn alert(&self) -> Option<&str> {
        match self {
            FetchOutcome::Empty(text) | FetchOutcome::Failed(text) => Some(text),
            FetchOutcome::Stale | FetchOutcome::Rendered => None,
        }
    }
}

/// Applies a response to the table unless `token` was superseded.
pub fn apply_response<R: Sortable>(
    tracker: &RequestTracker,
    token: u64,
    result: Result<Vec<R>, ApiError>,
    table: &mut TableState<R>,
    limit: usize,
    empty_message: &str,
) -> FetchOutcome {
    if !tracker.is_current(token) {
        return FetchOutcome::Stale;
    }
    match result {
        Ok(rows) => {
            let empty = rows.is_empty();
            table.replace(rows, limit);
            if empty {
                FetchOutcome::Empty(empty_message.to_string())
            } else {
                FetchOutcome::Rendered
            }
        }
        Err(e) => FetchOutcome::Failed(format!("{}: {}", empty_message, e)),
    }
}

pub struct TableController<R: Send + Sync + 'static> {
    pub table: RwSignal<TableState<R>>,
    pub filters: RwSignal<FilterValues>,
    /// A fetch is in flight
    pub loading: RwSignal<bool>,
    /// At least one result set was rendered
    pub loaded: RwSignal<bool>,
    page_size_options: StoredValue<Vec<usize>>,
    tracker: RequestTracker,
}

impl<R: Send + Sync + 'static> Clone for TableController<R> {
    fn clone(&self) -> Self {
        Self {
            table: self.table,
            filters: self.filters,
            loading: self.loading,
            loaded: self.loaded,
            page_size_options: self.page_size_options,
            tracker: self.tracker.clone(),
        }
    }
}

impl<R: Sortable + Clone + Send + Sync + 'static> TableController<R> {
    pub fn new(ctx: &AppContext, sort: (&'static str, bool)) -> Self {
        let config = ctx.config();
        Self {
            table: RwSignal::new(TableState::new(config.page_size, sort)),
            filters: RwSignal::new(FilterValues::new()),
            loading: RwSignal::new(false),
            loaded: RwSignal::new(false),
            page_size_options: StoredValue::new(config.page_size_options),
            tracker: RequestTracker::new(),
        }
    }

    /// Restores the form from the URL and fetches.
    pub fn filter_table<V: ListView<Row = R>>(&self, view: &V) {
        let ctx = view.app();
        let search = current_search();
        let query = if search.is_empty() {
            let start = default_incident_start(&Local::now(), ctx.config().default_lookback_hours);
            default_query(&ctx.user(), start)
        } else {
            parse_query(&search)
        };
        let restored = restore_filters(view.filter_fields(), &query, filter_datetime_to_unix_local);
        self.filters.set(restored.values);
        self.fetch(view, restored.params);
    }

    /// Form submit: writes the filters into the URL, then re-filters.
    pub fn submit<V: ListView<Row = R>>(&self, view: &V) {
        let qs = self
            .filters
            .with_untracked(|values| serialize_filters(view.filter_fields(), values));
        let path = current_pathname();
        if qs.is_empty() {
            replace_url(&path);
        } else {
            replace_url(&format!("{}?{}", path, qs));
        }
        self.filter_table(view);
    }

    pub fn fetch<V: ListView<Row = R>>(&self, view: &V, params: FetchParams) {
        let token = self.tracker.next();
        self.loading.set(true);
        let this = self.clone();
        let view = view.clone();
        spawn_local(async move {
            let result = view.get_data(params).await;
            let ctx = view.app();
            let limit = ctx.config().table_entry_limit;
            let empty_message = view.empty_message();
            let mut outcome = FetchOutcome::Stale;
            this.table.maybe_update(|t| {
                outcome = apply_response(&this.tracker, token, result, t, limit, &empty_message);
                outcome.swapped_table()
            });
            if outcome == FetchOutcome::Stale {
                log::debug!("discarding stale table response #{}", token);
                return;
            }
            this.loading.set(false);
            if let Some(text) = outcome.alert() {
                ctx.alerts.danger(text);
            }
            if outcome.swapped_table() {
                this.loaded.set(true);
                this.restore_page();
                view.after_render();
            }
        });
    }

    fn restore_page(&self) {
        let pages = self.table.with_untracked(|t| t.pages());
        if let Some(page) = page_from_hash(&current_hash(), pages) {
            self.table.update(|t| {
                t.set_page(page);
            });
        }
    }

    pub fn go_to_page(&self, page: usize) {
        let mut changed = false;
        self.table.update(|t| changed = t.set_page(page));
        if changed {
            replace_url(&page_hash(page));
        }
    }

    pub fn step(&self, step: PageStep) {
        let page = self.table.with_untracked(|t| t.page());
        match step {
            PageStep::Previous if page > 0 => self.go_to_page(page - 1),
            PageStep::Next => self.go_to_page(page + 1),
            _ => {}
        }
    }

    /// ←/→ paging; bound from the module's `events()`
    pub fn bind_arrow_keys(&self) {
        let this = self.clone();
        let handle = window_event_listener(leptos::ev::keydown, move |ev| {
            if focus_in_text_entry() {
                return;
            }
            if let Some(step) = arrow_key(&ev.key()) {
                this.step(step);
            }
        });
        on_cleanup(move || handle.remove());
    }

    pub fn sort_by(&self, field: &'static str) {
        let mut page = 0;
        self.table.update(|t| {
            let ascending = toggle_sort(t.sort(), field);
            t.sort_by(field, ascending);
            page = t.page();
        });
        replace_url(&page_hash(page));
    }

    pub fn set_page_size(&self, size: usize) {
        let mut page = 0;
        self.table.update(|t| {
            t.set_page_size(size);
            page = t.page();
        });
        replace_url(&page_hash(page));
    }

    pub fn set_filter(&self, name: &'static str, value: String) {
        self.filters.update(|f| {
            f.insert(name, value);
        });
    }

    pub fn filter_value(&self, name: &'static str) -> String {
        self.filters
            .with(|f| f.get(name).cloned().unwrap_or_default())
    }

    /// Rows of the visible page (tracked)
    pub fn page_rows(&self) -> Vec<R> {
        self.table.with(|t| t.page_rows().to_vec())
    }

    pub fn is_empty(&self) -> bool {
        self.table.with(|t| t.is_empty())
    }

    pub fn pager(&self) -> impl IntoView {
        let table = self.table;
        let this = self.clone();
        let limit_note = move || {
            table.with(|t| t.limit_reached()).then(|| {
                view! {
                    <p class="table-limit-note">
                        {move || format!("Showing the first {} results. Narrow the filters to see more.", table.with(|t| t.len()))}
                    </p>
                }
            })
        };

        view! {
            <PaginationControls
                current_page=Signal::derive(move || table.with(|t| t.page()))
                total_pages=Signal::derive(move || table.with(|t| t.pages()))
                total_count=Signal::derive(move || table.with(|t| t.len()))
                page_size=Signal::derive(move || table.with(|t| t.page_size()))
                on_page_change=Callback::new(move |page| this.go_to_page(page))
                on_page_size_change=Callback::new({
                    let this = self.clone();
                    move |size| this.set_page_size(size)
                })
                page_size_options=self.page_size_options.get_value()
            />
            {limit_note}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_params() {
        let mut params = FetchParams::new();
        params.insert("active".into(), ParamValue::Int(1));
        let params = list_params(params, 500, &["id", "name"]);
        assert_eq!(params.get("limit"), Some(&ParamValue::Int(500)));
        assert_eq!(
            params.get("fields"),
            Some(&ParamValue::List(vec!["id".into(), "name".into()]))
        );
        assert_eq!(params.len(), 3);

        let params = list_params(FetchParams::new(), 100, &[]);
        assert!(!params.contains_key("fields"));
    }

    #[derive(Debug, Clone, PartialEq)]
    struct Plan(i64);

    impl Sortable for Plan {
        fn compare_by_field(&self, other: &Self, _field: &str) -> std::cmp::Ordering {
            self.0.cmp(&other.0)
        }
    }

    fn table() -> TableState<Plan> {
        TableState::new(25, ("id", true))
    }

    #[test]
    fn test_superseded_response_is_dropped() {
        let tracker = RequestTracker::new();
        let mut state = table();
        let slow = tracker.next();
        let fast = tracker.next();

        let outcome = apply_response(&tracker, fast, Ok(vec![Plan(2), Plan(1)]), &mut state, 500, "No plans found");
        assert_eq!(outcome, FetchOutcome::Rendered);
        assert_eq!(state.generation(), 1);

        let outcome = apply_response(&tracker, slow, Ok(vec![Plan(9)]), &mut state, 500, "No plans found");
        assert_eq!(outcome, FetchOutcome::Stale);
        assert!(!outcome.swapped_table());
        assert_eq!(outcome.alert(), None);
        assert_eq!(state.rows(), &[Plan(1), Plan(2)]);
        assert_eq!(state.generation(), 1);
    }

    #[test]
    fn test_empty_result_swaps_table_and_alerts() {
        let tracker = RequestTracker::new();
        let mut state = table();
        let token = tracker.next();
        apply_response(&tracker, token, Ok(vec![Plan(1)]), &mut state, 500, "No plans found");

        let token = tracker.next();
        let outcome = apply_response(&tracker, token, Ok(Vec::new()), &mut state, 500, "No plans found");
        assert!(outcome.swapped_table());
        assert_eq!(outcome.alert(), Some("No plans found"));
        assert!(state.is_empty());
        assert_eq!(state.generation(), 2);
    }

    #[test]
    fn test_failure_alerts_once_and_keeps_table() {
        let tracker = RequestTracker::new();
        let mut state = table();
        let token = tracker.next();
        apply_response(&tracker, token, Ok(vec![Plan(1)]), &mut state, 500, "No incidents found");

        let token = tracker.next();
        let error = ApiError::Status {
            status: 500,
            message: "Internal Server Error".into(),
        };
        let outcome = apply_response(&tracker, token, Err(error), &mut state, 500, "No incidents found");
        assert_eq!(
            outcome,
            FetchOutcome::Failed("No incidents found: Internal Server Error".into())
        );
        assert!(!outcome.swapped_table());
        assert_eq!(state.rows(), &[Plan(1)]);
        assert_eq!(state.generation(), 1);
    }

    #[test]
    fn test_limit_note_when_result_hits_limit() {
        let tracker = RequestTracker::new();
        let mut state = table();
        let token = tracker.next();
        apply_response(&tracker, token, Ok(vec![Plan(1), Plan(2)]), &mut state, 2, "No plans found");
        assert!(state.limit_reached());
    }
}

use super::api;
use crate::layout::global_context::AppContext;
use crate::shared::api_utils::{ApiError, FetchParams};
use crate::shared::components::table::SortableHeaderCell;
use crate::shared::list_utils::{cmp_text, Sortable};
use crate::shared::table::{ListView, TableController};
use crate::shared::view_module::{ModuleLifecycle, ViewModule};
use contracts::system::stats::StatRow;
use leptos::prelude::*;
use std::cmp::Ordering;
use thaw::*;

impl Sortable for StatRow {
    fn compare_by_field(&self, other: &Self, field: &str) -> Ordering {
        match field {
            "value" => match (self.value.parse::<f64>(), other.value.parse::<f64>()) {
                (Ok(a), Ok(b)) => a.partial_cmp(&b).unwrap_or(Ordering::Equal),
                _ => cmp_text(&self.value, &other.value),
            },
            _ => cmp_text(&self.name, &other.name),
        }
    }
}

/// Which stats endpoint the page shows
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatsKind {
    All,
    Application(String),
    Single(String),
}

impl StatsKind {
    pub fn title(&self) -> &'static str {
        match self {
            StatsKind::All => "Stats",
            StatsKind::Application(_) => "App Stats",
            StatsKind::Single(_) => "Stats",
        }
    }

    pub fn header(&self) -> String {
        match self {
            StatsKind::All => "Stats".to_string(),
            StatsKind::Application(app) => format!("App Stats: {}", app),
            StatsKind::Single(name) => format!("Stats: {}", name),
        }
    }
}

/// Key/value table of one stats endpoint, no filters
#[derive(Clone)]
pub struct StatsView {
    ctx: AppContext,
    kind: StatsKind,
    lifecycle: ModuleLifecycle,
    controller: TableController<StatRow>,
}

impl StatsView {
    pub fn new(ctx: AppContext, kind: StatsKind) -> Self {
        Self {
            ctx,
            kind,
            lifecycle: ModuleLifecycle::new(),
            controller: TableController::new(&ctx, ("name", true)),
        }
    }
}

impl ListView for StatsView {
    type Row = StatRow;

    fn app(&self) -> AppContext {
        self.ctx
    }

    fn empty_message(&self) -> String {
        "No stats found".to_string()
    }

    async fn get_data(&self, _params: FetchParams) -> Result<Vec<StatRow>, ApiError> {
        let cfg = self.ctx.config();
        let stats = match &self.kind {
            StatsKind::All => api::fetch_stats(&cfg).await?,
            StatsKind::Application(app) => api::fetch_app_stats(&cfg, app).await?,
            StatsKind::Single(name) => api::fetch_single_stat(&cfg, name).await?,
        };
        Ok(stats.rows())
    }
}

impl ViewModule for StatsView {
    fn title(&self) -> String {
        self.kind.title().to_string()
    }

    fn lifecycle(&self) -> &ModuleLifecycle {
        &self.lifecycle
    }

    fn events(&self) {
        self.controller.bind_arrow_keys();
    }

    fn load(&self) {
        self.controller.filter_table(self);
    }

    fn view(&self) -> AnyView {
        let controller = self.controller.clone();
        let table = controller.table;
        let sort = Signal::derive(move || table.with(|t| t.sort()));
        let on_sort = Callback::new({
            let controller = controller.clone();
            move |field| controller.sort_by(field)
        });

        let rows = {
            let controller = controller.clone();
            move || {
                controller
                    .page_rows()
                    .into_iter()
                    .map(|stat| {
                        view! {
                            <TableRow>
                                <TableCell>{stat.name}</TableCell>
                                <TableCell>{stat.value}</TableCell>
                            </TableRow>
                        }
                    })
                    .collect_view()
            }
        };

        view! {
            <div class="stats">
                <div class="page__header">
                    <h1 class="page__title" id="stats-header">{self.kind.header()}</h1>
                </div>
                {controller.pager()}
                <Table class="table">
                    <TableHeader>
                        <TableRow>
                            <SortableHeaderCell label="Stat" sort_field="name" sort=sort on_sort=on_sort />
                            <SortableHeaderCell label="Value" sort_field="value" sort=sort on_sort=on_sort />
                        </TableRow>
                    </TableHeader>
                    <TableBody>{rows}</TableBody>
                </Table>
            </div>
        }
        .into_any()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::list_utils::sort_list;

    fn row(name: &str, value: &str) -> StatRow {
        StatRow {
            name: name.into(),
            value: value.into(),
        }
    }

    #[test]
    fn test_values_sort_numerically() {
        let mut rows = vec![row("a", "9"), row("b", "10.5"), row("c", "")];
        sort_list(&mut rows, "value", false);
        assert_eq!(rows[0].name, "b");
        assert_eq!(rows[1].name, "a");
    }

    #[test]
    fn test_headers() {
        assert_eq!(StatsKind::All.header(), "Stats");
        assert_eq!(StatsKind::Application("nodes".into()).header(), "App Stats: nodes");
        assert_eq!(StatsKind::Single("total".into()).title(), "Stats");
    }
}

use crate::domain::a001_plan::api;
use crate::layout::global_context::AppContext;
use crate::routes::navigation::follow_link;
use crate::shared::api_utils::{ApiError, FetchParams};
use crate::shared::components::table::SortableHeaderCell;
use crate::shared::date_utils::format_unix;
use crate::shared::list_utils::{cmp_text, Sortable};
use crate::shared::table::{
    list_params, ControlKind, FilterField, FilterForm, ListView, TableController, ACTIVE_CHOICES,
};
use crate::shared::view_module::{ModuleLifecycle, ViewModule};
use contracts::domain::a001_plan::aggregate::PlanSummary;
use leptos::prelude::*;
use std::cmp::Ordering;
use thaw::*;

const FILTERS: &[FilterField] = &[
    FilterField::new("filter-name", "Name", ControlKind::Plain, Some("name__contains")),
    FilterField::new("filter-target", "Creator", ControlKind::Typeahead("user"), Some("target")),
    FilterField::new("filter-active", "Status", ControlKind::ChoiceGroup(ACTIVE_CHOICES), None),
];

impl Sortable for PlanSummary {
    fn compare_by_field(&self, other: &Self, field: &str) -> Ordering {
        match field {
            "id" => self.id.cmp(&other.id),
            "name" => cmp_text(&self.name, &other.name),
            "creator" => cmp_text(&self.creator, &other.creator),
            "active" => self.active.cmp(&other.active),
            _ => self.created.cmp(&other.created),
        }
    }
}

#[derive(Clone)]
pub struct PlansView {
    ctx: AppContext,
    lifecycle: ModuleLifecycle,
    controller: TableController<PlanSummary>,
}

impl PlansView {
    pub fn new(ctx: AppContext) -> Self {
        Self {
            ctx,
            lifecycle: ModuleLifecycle::new(),
            controller: TableController::new(&ctx, ("created", false)),
        }
    }
}

impl ListView for PlansView {
    type Row = PlanSummary;

    fn app(&self) -> AppContext {
        self.ctx
    }

    fn filter_fields(&self) -> &'static [FilterField] {
        FILTERS
    }

    fn empty_message(&self) -> String {
        "No plans found".to_string()
    }

    async fn get_data(&self, params: FetchParams) -> Result<Vec<PlanSummary>, ApiError> {
        let cfg = self.ctx.config();
        let params = list_params(params, cfg.table_entry_limit, &[]);
        api::fetch_plans(&cfg, params).await
    }
}

impl ViewModule for PlansView {
    fn title(&self) -> String {
        "Plans".to_string()
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
                    .map(|plan| {
                        let path = format!("/plans/{}", plan.id);
                        view! {
                            <TableRow class="clickable" on:click=move |ev| follow_link(&path, &ev)>
                                <TableCell>{plan.id}</TableCell>
                                <TableCell>{plan.name}</TableCell>
                                <TableCell>{format_unix(plan.created)}</TableCell>
                                <TableCell>{plan.creator}</TableCell>
                                <TableCell>
                                    <span class=if plan.active { "badge badge--active" } else { "badge" }>
                                        {if plan.active { "active" } else { "inactive" }}
                                    </span>
                                </TableCell>
                            </TableRow>
                        }
                    })
                    .collect_view()
            }
        };

        view! {
            <div class="plans">
                <div class="page__header">
                    <h1 class="page__title">"Plans"</h1>
                    <a class="button button--primary" href="/plans/new">"Create new plan"</a>
                </div>
                <FilterForm view=self.clone() controller=controller.clone() />
                {controller.pager()}
                <Table class="table">
                    <TableHeader>
                        <TableRow>
                            <SortableHeaderCell label="ID" sort_field="id" sort=sort on_sort=on_sort />
                            <SortableHeaderCell label="Name" sort_field="name" sort=sort on_sort=on_sort />
                            <SortableHeaderCell label="Created" sort_field="created" sort=sort on_sort=on_sort />
                            <SortableHeaderCell label="Creator" sort_field="creator" sort=sort on_sort=on_sort />
                            <SortableHeaderCell label="Status" sort_field="active" sort=sort on_sort=on_sort />
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

    fn plan(id: i64, name: &str, created: i64) -> PlanSummary {
        PlanSummary {
            id,
            name: name.into(),
            description: None,
            created,
            creator: "alice".into(),
            active: true,
        }
    }

    #[test]
    fn test_default_order_newest_first() {
        let mut rows = vec![plan(1, "b", 100), plan(2, "a", 300), plan(3, "c", 200)];
        sort_list(&mut rows, "created", false);
        assert_eq!(rows.iter().map(|p| p.id).collect::<Vec<_>>(), vec![2, 3, 1]);
    }

    #[test]
    fn test_filters_map_to_api_params() {
        assert_eq!(FILTERS[0].param, Some("name__contains"));
        assert_eq!(FILTERS[1].key(), "target");
        assert_eq!(FILTERS[2].param, None);
    }
}

use crate::domain::a002_template::api;
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
use contracts::domain::a002_template::aggregate::TemplateSummary;
use leptos::prelude::*;
use std::cmp::Ordering;
use thaw::*;

const FILTERS: &[FilterField] = &[
    FilterField::new("filter-name", "Name", ControlKind::Plain, Some("name__contains")),
    FilterField::new("filter-target", "Creator", ControlKind::Typeahead("user"), Some("creator")),
    FilterField::new("filter-active", "Status", ControlKind::ChoiceGroup(ACTIVE_CHOICES), None),
];

impl Sortable for TemplateSummary {
    fn compare_by_field(&self, other: &Self, field: &str) -> Ordering {
        match field {
            "name" => cmp_text(&self.name, &other.name),
            "creator" => cmp_text(&self.creator, &other.creator),
            "active" => self.active.cmp(&other.active),
            _ => self.created.cmp(&other.created),
        }
    }
}

#[derive(Clone)]
pub struct TemplatesView {
    ctx: AppContext,
    lifecycle: ModuleLifecycle,
    controller: TableController<TemplateSummary>,
}

impl TemplatesView {
    pub fn new(ctx: AppContext) -> Self {
        Self {
            ctx,
            lifecycle: ModuleLifecycle::new(),
            controller: TableController::new(&ctx, ("created", false)),
        }
    }
}

impl ListView for TemplatesView {
    type Row = TemplateSummary;

    fn app(&self) -> AppContext {
        self.ctx
    }

    fn filter_fields(&self) -> &'static [FilterField] {
        FILTERS
    }

    fn empty_message(&self) -> String {
        "No templates found".to_string()
    }

    async fn get_data(&self, params: FetchParams) -> Result<Vec<TemplateSummary>, ApiError> {
        let cfg = self.ctx.config();
        let params = list_params(params, cfg.table_entry_limit, &[]);
        api::fetch_templates(&cfg, params).await
    }
}

impl ViewModule for TemplatesView {
    fn title(&self) -> String {
        "Templates".to_string()
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
                    .map(|template| {
                        let path = format!("/templates/{}", template.id);
                        view! {
                            <TableRow class="clickable" on:click=move |ev| follow_link(&path, &ev)>
                                <TableCell>{template.name}</TableCell>
                                <TableCell>{template.creator}</TableCell>
                                <TableCell>{format_unix(template.created)}</TableCell>
                                <TableCell>
                                    <span class=if template.active { "badge badge--active" } else { "badge" }>
                                        {if template.active { "active" } else { "inactive" }}
                                    </span>
                                </TableCell>
                            </TableRow>
                        }
                    })
                    .collect_view()
            }
        };

        view! {
            <div class="templates">
                <div class="page__header">
                    <h1 class="page__title">"Templates"</h1>
                    <a class="button button--primary" href="/templates/new">"Create new template"</a>
                </div>
                <FilterForm view=self.clone() controller=controller.clone() />
                {controller.pager()}
                <Table class="table">
                    <TableHeader>
                        <TableRow>
                            <SortableHeaderCell label="Name" sort_field="name" sort=sort on_sort=on_sort />
                            <SortableHeaderCell label="Creator" sort_field="creator" sort=sort on_sort=on_sort />
                            <SortableHeaderCell label="Created" sort_field="created" sort=sort on_sort=on_sort />
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

    fn template(id: i64, name: &str, active: bool) -> TemplateSummary {
        TemplateSummary {
            id,
            name: name.into(),
            creator: "alice".into(),
            created: id * 10,
            active,
        }
    }

    #[test]
    fn test_sort_by_name_ignores_case() {
        let mut rows = vec![template(1, "beta", true), template(2, "Alpha", false)];
        sort_list(&mut rows, "name", true);
        assert_eq!(rows[0].name, "Alpha");
        sort_list(&mut rows, "created", false);
        assert_eq!(rows[0].id, 2);
    }

    #[test]
    fn test_creator_filter_uses_typeahead() {
        assert_eq!(FILTERS[1].kind, ControlKind::Typeahead("user"));
        assert_eq!(FILTERS[1].param, Some("creator"));
    }
}

use crate::domain::a004_message::api;
use crate::layout::global_context::AppContext;
use crate::routes::navigation::follow_link;
use crate::shared::api_utils::{ApiError, FetchParams};
use crate::shared::components::table::SortableHeaderCell;
use crate::shared::date_utils::format_opt_unix;
use crate::shared::list_utils::{cmp_opt, cmp_text, Sortable};
use crate::shared::table::{
    list_params, ControlKind, FilterField, FilterForm, ListView, SelectSource, TableController,
};
use crate::shared::view_module::{ModuleLifecycle, ViewModule};
use contracts::domain::a004_message::aggregate::MessageSummary;
use leptos::prelude::*;
use std::cmp::Ordering;
use thaw::*;

const FILTERS: &[FilterField] = &[
    FilterField::new(
        "filter-application",
        "Application",
        ControlKind::Select(SelectSource::Applications),
        Some("application"),
    ),
    FilterField::new(
        "filter-priority",
        "Priority",
        ControlKind::Select(SelectSource::Priorities),
        Some("priority"),
    ),
    FilterField::new("filter-target", "Target", ControlKind::Typeahead("user"), Some("target")),
    FilterField::new("filter-start", "Sent after", ControlKind::DateTime, Some("sent__ge")),
    FilterField::new("filter-end", "Sent before", ControlKind::DateTime, Some("sent__le")),
];

impl Sortable for MessageSummary {
    fn compare_by_field(&self, other: &Self, field: &str) -> Ordering {
        match field {
            "batch" => cmp_opt(&self.batch, &other.batch),
            "target" => cmp_text(&self.target, &other.target),
            "subject" => cmp_opt(&self.subject, &other.subject),
            "incident_id" => cmp_opt(&self.incident_id, &other.incident_id),
            "priority" => cmp_text(&self.priority, &other.priority),
            "application" => cmp_text(&self.application, &other.application),
            "mode" => cmp_text(&self.mode, &other.mode),
            "sent" => cmp_opt(&self.sent, &other.sent),
            _ => self.id.cmp(&other.id),
        }
    }
}

/// Mode column; a changed mode or target is marked with `*`
fn mode_label(message: &MessageSummary) -> String {
    if message.mode_changed || message.target_changed {
        format!("{} *", message.mode)
    } else {
        message.mode.clone()
    }
}

#[derive(Clone)]
pub struct MessagesView {
    ctx: AppContext,
    lifecycle: ModuleLifecycle,
    controller: TableController<MessageSummary>,
}

impl MessagesView {
    pub fn new(ctx: AppContext) -> Self {
        Self {
            ctx,
            lifecycle: ModuleLifecycle::new(),
            controller: TableController::new(&ctx, ("id", false)),
        }
    }
}

impl ListView for MessagesView {
    type Row = MessageSummary;

    fn app(&self) -> AppContext {
        self.ctx
    }

    fn filter_fields(&self) -> &'static [FilterField] {
        FILTERS
    }

    fn empty_message(&self) -> String {
        "No messages found".to_string()
    }

    async fn get_data(&self, params: FetchParams) -> Result<Vec<MessageSummary>, ApiError> {
        let cfg = self.ctx.config();
        let params = list_params(params, cfg.table_entry_limit, &[]);
        api::fetch_messages(&cfg, params).await
    }
}

impl ViewModule for MessagesView {
    fn title(&self) -> String {
        "Messages".to_string()
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
                    .map(|message| {
                        let path = format!("/messages/{}", message.id);
                        let mode = mode_label(&message);
                        let incident = message.incident_id.map(|id| {
                            view! {
                                <a href=format!("/incidents/{}", id) on:click=|ev| ev.stop_propagation()>
                                    {id}
                                </a>
                            }
                        });
                        view! {
                            <TableRow class="clickable" on:click=move |ev| follow_link(&path, &ev)>
                                <TableCell>{message.id}</TableCell>
                                <TableCell>{message.batch.unwrap_or_default()}</TableCell>
                                <TableCell>{message.target}</TableCell>
                                <TableCell>{message.subject.unwrap_or_default()}</TableCell>
                                <TableCell>{incident}</TableCell>
                                <TableCell>{message.priority}</TableCell>
                                <TableCell>{message.application}</TableCell>
                                <TableCell>{mode}</TableCell>
                                <TableCell>{format_opt_unix(message.sent)}</TableCell>
                            </TableRow>
                        }
                    })
                    .collect_view()
            }
        };

        view! {
            <div class="messages">
                <div class="page__header">
                    <h1 class="page__title">"Messages"</h1>
                </div>
                <FilterForm view=self.clone() controller=controller.clone() />
                {controller.pager()}
                <Table class="table">
                    <TableHeader>
                        <TableRow>
                            <SortableHeaderCell label="ID" sort_field="id" sort=sort on_sort=on_sort />
                            <SortableHeaderCell label="Batch" sort_field="batch" sort=sort on_sort=on_sort />
                            <SortableHeaderCell label="Target" sort_field="target" sort=sort on_sort=on_sort />
                            <SortableHeaderCell label="Subject" sort_field="subject" sort=sort on_sort=on_sort />
                            <SortableHeaderCell label="Incident" sort_field="incident_id" sort=sort on_sort=on_sort />
                            <SortableHeaderCell label="Priority" sort_field="priority" sort=sort on_sort=on_sort />
                            <SortableHeaderCell label="Application" sort_field="application" sort=sort on_sort=on_sort />
                            <SortableHeaderCell label="Mode" sort_field="mode" sort=sort on_sort=on_sort />
                            <SortableHeaderCell label="Sent" sort_field="sent" sort=sort on_sort=on_sort />
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
    use contracts::shared::app_data::AppData;

    fn message(id: i64, sent: Option<i64>) -> MessageSummary {
        serde_json::from_value(serde_json::json!({
            "id": id, "target": "alice", "mode": "sms", "priority": "high",
            "application": "nodes", "sent": sent
        }))
        .unwrap()
    }

    #[test]
    fn test_empty_result_message() {
        let view = MessagesView::new(AppContext::new(AppData::default()));
        assert_eq!(view.empty_message(), "No messages found");
    }

    #[test]
    fn test_default_order_newest_id_first() {
        let mut rows = vec![message(3, None), message(10, Some(5)), message(7, Some(1))];
        sort_list(&mut rows, "id", false);
        assert_eq!(rows.iter().map(|m| m.id).collect::<Vec<_>>(), vec![10, 7, 3]);
    }

    #[test]
    fn test_unsent_sort_first() {
        let mut rows = vec![message(1, Some(5)), message(2, None)];
        sort_list(&mut rows, "sent", true);
        assert_eq!(rows[0].id, 2);
    }

    #[test]
    fn test_mode_label_marks_changes() {
        let mut m = message(1, None);
        assert_eq!(mode_label(&m), "sms");
        m.target_changed = true;
        assert_eq!(mode_label(&m), "sms *");
    }

    #[test]
    fn test_no_active_filter() {
        assert!(FILTERS.iter().all(|f| f.key() != "active"));
        assert_eq!(FILTERS[3].param, Some("sent__ge"));
    }
}

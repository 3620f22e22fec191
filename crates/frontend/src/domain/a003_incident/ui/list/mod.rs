use crate::domain::a003_incident::api;
use crate::layout::global_context::AppContext;
use crate::routes::navigation::follow_link;
use crate::shared::alert::{Alert, AlertKind};
use crate::shared::api_utils::{ApiError, FetchParams};
use crate::shared::components::table::SortableHeaderCell;
use crate::shared::date_utils::{format_opt_unix, format_unix};
use crate::shared::list_utils::{cmp_opt, cmp_text, Sortable};
use crate::shared::summary_template::{default_summary, render};
use crate::shared::table::{
    list_params, ControlKind, FilterField, FilterForm, ListView, SelectSource, TableController,
    ACTIVE_CHOICES,
};
use crate::shared::view_module::{ModuleLifecycle, ViewModule};
use contracts::domain::a003_incident::aggregate::{IncidentContext, IncidentSummary};
use contracts::shared::app_data::AppData;
use leptos::prelude::*;
use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use thaw::*;

const FILTERS: &[FilterField] = &[
    FilterField::new(
        "filter-application",
        "Application",
        ControlKind::Select(SelectSource::Applications),
        Some("application"),
    ),
    FilterField::new("filter-target", "Target", ControlKind::Typeahead("user"), Some("target")),
    FilterField::new(
        "filter-incidentStart",
        "Created after",
        ControlKind::DateTime,
        Some("created__ge"),
    ),
    FilterField::new("filter-active", "Status", ControlKind::ChoiceGroup(ACTIVE_CHOICES), None),
];

impl Sortable for IncidentSummary {
    fn compare_by_field(&self, other: &Self, field: &str) -> Ordering {
        match field {
            "owner" => cmp_text(self.owner.as_deref().unwrap_or(""), other.owner.as_deref().unwrap_or("")),
            "updated" => cmp_opt(&self.updated, &other.updated),
            "application" => cmp_text(&self.application, &other.application),
            "plan" => cmp_text(&self.plan, &other.plan),
            "created" => self.created.cmp(&other.created),
            "active" => self.active.cmp(&other.active),
            _ => self.id.cmp(&other.id),
        }
    }
}

/// Summary column text: the application's summary template, or the raw context
pub fn summary_for(data: &AppData, item: &IncidentContext) -> String {
    let template = data
        .find_application(&item.application)
        .and_then(|app| app.summary_template.clone())
        .filter(|t| !t.trim().is_empty());
    let Some(template) = template else {
        return default_summary(&item.context);
    };
    let root = serde_json::to_value(item).unwrap_or_default();
    render(&template, &root).unwrap_or_else(|e| {
        log::warn!("summary template of {} failed: {}", item.application, e);
        default_summary(&item.context)
    })
}

/// Ids on the page whose summary is neither known nor requested
fn missing_ids(ids: &[i64], known: &HashMap<i64, String>, pending: &HashSet<i64>) -> Vec<i64> {
    ids.iter()
        .copied()
        .filter(|id| !known.contains_key(id) && !pending.contains(id))
        .collect()
}

/// Reported from the server state after the change: still active means released
fn claim_message(id: i64, active: bool) -> String {
    if active {
        format!("Incident {} unclaimed.", id)
    } else {
        format!("Incident {} claimed.", id)
    }
}

fn active_ids(rows: &[IncidentSummary]) -> Vec<i64> {
    rows.iter().filter(|r| r.active).map(|r| r.id).collect()
}

#[derive(Clone)]
pub struct IncidentsView {
    ctx: AppContext,
    lifecycle: ModuleLifecycle,
    controller: TableController<IncidentSummary>,
    /// Rendered summaries by incident id; survive re-filtering
    summaries: RwSignal<HashMap<i64, String>>,
    pending: StoredValue<HashSet<i64>>,
    /// Ids awaiting "Claim Active Incidents" confirmation
    claim_prompt: RwSignal<Option<Vec<i64>>>,
}

impl IncidentsView {
    pub fn new(ctx: AppContext) -> Self {
        Self {
            ctx,
            lifecycle: ModuleLifecycle::new(),
            controller: TableController::new(&ctx, ("id", false)),
            summaries: RwSignal::new(HashMap::new()),
            pending: StoredValue::new(HashSet::new()),
            claim_prompt: RwSignal::new(None),
        }
    }

    fn load_summaries(&self, ids: Vec<i64>) {
        let missing = self.summaries.with_untracked(|known| {
            self.pending.with_value(|pending| missing_ids(&ids, known, pending))
        });
        if missing.is_empty() {
            return;
        }
        self.pending.update_value(|p| p.extend(missing.iter().copied()));

        let ctx = self.ctx;
        let summaries = self.summaries;
        let pending = self.pending;
        let cfg = ctx.config();
        wasm_bindgen_futures::spawn_local(async move {
            match api::fetch_contexts(&cfg, &missing).await {
                Ok(items) => {
                    let rendered: Vec<(i64, String)> = ctx.with_data(|data| {
                        items.iter().map(|item| (item.id, summary_for(data, item))).collect()
                    });
                    summaries.update(|s| s.extend(rendered));
                }
                Err(e) => log::warn!("incident summaries failed to load: {}", e),
            }
            pending.update_value(|p| {
                for id in &missing {
                    p.remove(id);
                }
            });
        });
    }

    fn claim(&self, id: i64, active: bool) {
        let ctx = self.ctx;
        let table = self.controller.table;
        let owner = active.then(|| ctx.user());
        let cfg = ctx.config();
        wasm_bindgen_futures::spawn_local(async move {
            match api::claim_incident(&cfg, id, owner).await {
                Ok(result) => {
                    table.update(|t| {
                        if let Some(row) = t.rows_mut().iter_mut().find(|r| r.id == result.incident_id) {
                            row.owner = result.owner.clone();
                            row.active = result.active;
                        }
                    });
                    ctx.alerts.show(
                        Alert::new(claim_message(result.incident_id, result.active))
                            .kind(AlertKind::Success)
                            .fixed(),
                    );
                }
                Err(e) => {
                    log::warn!("claim of incident {} failed: {}", id, e);
                    ctx.alerts.danger("Failed to modify incident");
                }
            }
        });
    }

    /// Opens the confirmation for every active row of the result set
    fn prompt_claim_all(&self) {
        let ids = self.controller.table.with_untracked(|t| active_ids(t.rows()));
        if ids.is_empty() {
            self.ctx.alerts.danger("No active incidents to claim");
            return;
        }
        self.claim_prompt.set(Some(ids));
    }

    fn claim_all(&self) {
        let Some(ids) = self.claim_prompt.get_untracked() else {
            return;
        };
        self.claim_prompt.set(None);
        let this = self.clone();
        let cfg = self.ctx.config();
        let user = self.ctx.user();
        wasm_bindgen_futures::spawn_local(async move {
            match api::claim_all(&cfg, &user, ids).await {
                Ok(result) => {
                    let claimed = result
                        .claimed
                        .iter()
                        .map(|id| id.to_string())
                        .collect::<Vec<_>>()
                        .join(", ");
                    this.ctx.alerts.success(format!(
                        "Successfully claimed {} incidents: {}",
                        result.claimed.len(),
                        claimed
                    ));
                    this.controller.filter_table(&this);
                }
                Err(e) => {
                    log::error!("claim all failed: {}", e);
                    this.ctx.alerts.danger("Error: failed to claim incidents");
                }
            }
        });
    }

    fn show_all(&self) {
        self.controller.set_filter("filter-active", "all".to_string());
        self.controller.submit(self);
    }
}

impl ListView for IncidentsView {
    type Row = IncidentSummary;

    fn app(&self) -> AppContext {
        self.ctx
    }

    fn filter_fields(&self) -> &'static [FilterField] {
        FILTERS
    }

    fn empty_message(&self) -> String {
        "No incidents found".to_string()
    }

    async fn get_data(&self, params: FetchParams) -> Result<Vec<IncidentSummary>, ApiError> {
        let cfg = self.ctx.config();
        let params = list_params(params, cfg.table_entry_limit, &[]);
        api::fetch_incidents(&cfg, params).await
    }
}

impl ViewModule for IncidentsView {
    fn title(&self) -> String {
        "Incidents".to_string()
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
        let this = self.clone();
        let controller = self.controller.clone();
        let table = controller.table;
        let loaded = controller.loaded;
        let summaries = self.summaries;
        let claim_prompt = self.claim_prompt;
        let sort = Signal::derive(move || table.with(|t| t.sort()));
        let on_sort = Callback::new({
            let controller = controller.clone();
            move |field| controller.sort_by(field)
        });

        // подгружаем сводки для видимой страницы
        Effect::new({
            let this = this.clone();
            move |_| {
                let ids: Vec<i64> = table.with(|t| t.page_rows().iter().map(|r| r.id).collect());
                this.load_summaries(ids);
            }
        });

        let rows = {
            let this = this.clone();
            let controller = controller.clone();
            move || {
                controller
                    .page_rows()
                    .into_iter()
                    .map(|incident| {
                        let path = format!("/incidents/{}", incident.id);
                        let id = incident.id;
                        let active = incident.active;
                        let summary = move || summaries.with(|s| s.get(&id).cloned().unwrap_or_default());
                        let this = this.clone();
                        view! {
                            <TableRow class="clickable" on:click=move |ev| follow_link(&path, &ev)>
                                <TableCell>{id}</TableCell>
                                <TableCell>{incident.owner.clone().unwrap_or_default()}</TableCell>
                                <TableCell>{incident.application}</TableCell>
                                <TableCell>
                                    <span class="incident-summary" style="white-space: pre-line;">{summary}</span>
                                </TableCell>
                                <TableCell>{incident.plan}</TableCell>
                                <TableCell>{format_unix(incident.created)}</TableCell>
                                <TableCell>{format_opt_unix(incident.updated)}</TableCell>
                                <TableCell>
                                    <button
                                        type="button"
                                        class=if active { "button button--primary claim" } else { "button claim" }
                                        on:click=move |ev| {
                                            ev.stop_propagation();
                                            this.claim(id, active);
                                        }
                                    >
                                        {if active { "Claim" } else { "Unclaim" }}
                                    </button>
                                </TableCell>
                            </TableRow>
                        }
                    })
                    .collect_view()
            }
        };

        let show_all_link = {
            let this = this.clone();
            let controller = controller.clone();
            move || {
                let applies = loaded.get()
                    && controller.is_empty()
                    && controller.filter_value("filter-active") == "active";
                let this = this.clone();
                applies.then(|| {
                    view! {
                        <p class="table-empty">
                            <a href="#" on:click=move |ev| {
                                ev.prevent_default();
                                this.show_all();
                            }>
                                "Try viewing all incidents instead of just active incidents"
                            </a>
                        </p>
                    }
                })
            }
        };

        let prompt = {
            let this = this.clone();
            move || {
                claim_prompt.get().map(|ids| {
                    let confirm = this.clone();
                    view! {
                        <div class="claim-prompt">
                            <p>{format!("Claim {} active incidents?", ids.len())}</p>
                            <Button appearance=ButtonAppearance::Primary on_click=move |_| confirm.claim_all()>
                                "Claim"
                            </Button>
                            <Button on_click=move |_| claim_prompt.set(None)>"Cancel"</Button>
                        </div>
                    }
                })
            }
        };

        view! {
            <div class="incidents">
                <div class="page__header">
                    <h1 class="page__title">"Incidents"</h1>
                    <Button on_click={
                        let this = this.clone();
                        move |_| this.prompt_claim_all()
                    }>
                        "Claim Active Incidents"
                    </Button>
                </div>
                {prompt}
                <FilterForm view=this.clone() controller=controller.clone() />
                {controller.pager()}
                <Table class="table">
                    <TableHeader>
                        <TableRow>
                            <SortableHeaderCell label="ID" sort_field="id" sort=sort on_sort=on_sort />
                            <SortableHeaderCell label="Owner" sort_field="owner" sort=sort on_sort=on_sort />
                            <SortableHeaderCell label="Application" sort_field="application" sort=sort on_sort=on_sort />
                            <TableHeaderCell>"Summary"</TableHeaderCell>
                            <SortableHeaderCell label="Plan" sort_field="plan" sort=sort on_sort=on_sort />
                            <SortableHeaderCell label="Created" sort_field="created" sort=sort on_sort=on_sort />
                            <SortableHeaderCell label="Updated" sort_field="updated" sort=sort on_sort=on_sort />
                            <SortableHeaderCell label="Status" sort_field="active" sort=sort on_sort=on_sort />
                        </TableRow>
                    </TableHeader>
                    <TableBody>{rows}</TableBody>
                </Table>
                {show_all_link}
            </div>
        }
        .into_any()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::list_utils::sort_list;
    use contracts::shared::app_data::ApplicationInfo;
    use serde_json::json;

    fn incident(id: i64, active: bool) -> IncidentSummary {
        IncidentSummary {
            id,
            owner: None,
            application: "nodes".into(),
            plan: "page-oncall".into(),
            plan_id: Some(1),
            created: 100 + id,
            updated: None,
            active,
            current_step: 1,
        }
    }

    #[test]
    fn test_empty_result_message() {
        let view = IncidentsView::new(AppContext::new(AppData::default()));
        assert_eq!(view.empty_message(), "No incidents found");
    }

    #[test]
    fn test_default_order_newest_id_first() {
        let mut rows = vec![incident(2, true), incident(9, false), incident(5, true)];
        sort_list(&mut rows, "id", false);
        assert_eq!(rows.iter().map(|r| r.id).collect::<Vec<_>>(), vec![9, 5, 2]);
    }

    #[test]
    fn test_active_ids() {
        let rows = vec![incident(1, true), incident(2, false), incident(3, true)];
        assert_eq!(active_ids(&rows), vec![1, 3]);
        assert!(active_ids(&[incident(4, false)]).is_empty());
    }

    #[test]
    fn test_missing_ids_skips_known_and_pending() {
        let known = HashMap::from([(1, "a".to_string())]);
        let pending = HashSet::from([2]);
        assert_eq!(missing_ids(&[1, 2, 3, 4], &known, &pending), vec![3, 4]);
    }

    #[test]
    fn test_claim_message() {
        assert_eq!(claim_message(7, true), "Incident 7 unclaimed.");
        assert_eq!(claim_message(7, false), "Incident 7 claimed.");
    }

    #[test]
    fn test_summary_uses_application_template() {
        let data = AppData {
            applications: vec![ApplicationInfo {
                name: "nodes".into(),
                summary_template: Some("{{context.host}} is down".into()),
                ..Default::default()
            }],
            ..Default::default()
        };
        let item = IncidentContext {
            id: 1,
            application: "nodes".into(),
            context: json!({"host": "db1"}),
        };
        assert_eq!(summary_for(&data, &item), "db1 is down");

        let other = IncidentContext {
            application: "other".into(),
            ..item
        };
        assert_eq!(summary_for(&data, &other), "host: db1");
    }

    #[test]
    fn test_summary_falls_back_on_broken_template() {
        let data = AppData {
            applications: vec![ApplicationInfo {
                name: "nodes".into(),
                summary_template: Some("{{#if context.host}}open".into()),
                ..Default::default()
            }],
            ..Default::default()
        };
        let item = IncidentContext {
            id: 1,
            application: "nodes".into(),
            context: json!({"host": "db1"}),
        };
        assert_eq!(summary_for(&data, &item), "host: db1");
    }

    #[test]
    fn test_filters_map_to_api_params() {
        assert_eq!(FILTERS[0].key(), "application");
        assert_eq!(FILTERS[2].key(), "incidentStart");
        assert_eq!(FILTERS[2].param, Some("created__ge"));
    }
}

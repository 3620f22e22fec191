use crate::domain::a005_application::api;
use crate::layout::global_context::AppContext;
use crate::routes::navigation::{follow_link, navigate_to};
use crate::shared::api_utils::{ApiError, FetchParams};
use crate::shared::components::table::SortableHeaderCell;
use crate::shared::list_utils::{cmp_text, Sortable};
use crate::shared::table::{ListView, TableController};
use crate::shared::view_module::{ModuleLifecycle, ViewModule};
use contracts::shared::app_data::{AppData, ApplicationInfo};
use leptos::prelude::*;
use std::cmp::Ordering;
use thaw::*;

impl Sortable for ApplicationInfo {
    fn compare_by_field(&self, other: &Self, field: &str) -> Ordering {
        match field {
            "owners" => cmp_text(&self.owners.join(", "), &other.owners.join(", ")),
            _ => cmp_text(&self.name, &other.name),
        }
    }
}

/// What "create application" does with a typed name
#[derive(Debug, Clone, PartialEq)]
enum CreateAction {
    Ignore,
    /// Already known, open its page
    Open(String),
    Create(String),
}

fn create_action(data: &AppData, raw: &str) -> CreateAction {
    let name = raw.trim();
    if name.is_empty() {
        return CreateAction::Ignore;
    }
    match data.find_application(name) {
        Some(app) => CreateAction::Open(app.name.clone()),
        None => CreateAction::Create(name.to_string()),
    }
}

fn app_path(name: &str) -> String {
    format!("/applications/{}", urlencoding::encode(name))
}

#[derive(Clone)]
pub struct ApplicationsView {
    ctx: AppContext,
    lifecycle: ModuleLifecycle,
    controller: TableController<ApplicationInfo>,
    new_name: RwSignal<Option<String>>,
    creating: RwSignal<bool>,
}

impl ApplicationsView {
    pub fn new(ctx: AppContext) -> Self {
        Self {
            ctx,
            lifecycle: ModuleLifecycle::new(),
            controller: TableController::new(&ctx, ("name", true)),
            new_name: RwSignal::new(None),
            creating: RwSignal::new(false),
        }
    }

    fn create(&self) {
        let raw = self.new_name.get_untracked().unwrap_or_default();
        let name = match self.ctx.with_data(|d| create_action(d, &raw)) {
            CreateAction::Ignore => {
                self.new_name.set(Some(String::new()));
                return;
            }
            CreateAction::Open(name) => {
                navigate_to(&app_path(&name));
                return;
            }
            CreateAction::Create(name) => name,
        };

        let ctx = self.ctx;
        let new_name = self.new_name;
        let creating = self.creating;
        let cfg = ctx.config();
        creating.set(true);
        wasm_bindgen_futures::spawn_local(async move {
            match api::create_application(&cfg, &name).await {
                Ok(()) => navigate_to(&app_path(&name)),
                Err(e) => {
                    log::warn!("application {} was not created: {}", name, e);
                    ctx.alerts.danger(format!("Failed creating application: {}", e));
                }
            }
            creating.set(false);
            new_name.set(None);
        });
    }
}

impl ListView for ApplicationsView {
    type Row = ApplicationInfo;

    fn app(&self) -> AppContext {
        self.ctx
    }

    fn empty_message(&self) -> String {
        "No applications found".to_string()
    }

    /// Список приложений уже лежит в bootstrap, запроса нет
    async fn get_data(&self, _params: FetchParams) -> Result<Vec<ApplicationInfo>, ApiError> {
        Ok(self.ctx.with_data(|d| d.applications.clone()))
    }
}

impl ViewModule for ApplicationsView {
    fn title(&self) -> String {
        "Applications".to_string()
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
                    .map(|app| {
                        let path = app_path(&app.name);
                        view! {
                            <TableRow class="clickable" on:click=move |ev| follow_link(&path, &ev)>
                                <TableCell>{app.name}</TableCell>
                                <TableCell>{app.owners.join(", ")}</TableCell>
                            </TableRow>
                        }
                    })
                    .collect_view()
            }
        };

        let this = self.clone();
        let new_name = self.new_name;
        let creating = self.creating;
        let open = Memo::new(move |_| new_name.with(Option::is_some));
        let create_form = move || {
            let this = this.clone();
            match open.get() {
                false => view! {
                    <Button appearance=ButtonAppearance::Primary on_click=move |_| new_name.set(Some(String::new()))>
                        "Create application"
                    </Button>
                }
                .into_any(),
                true => view! {
                    <div class="create-app">
                        <input
                            id="create-app-name"
                            class="form__input"
                            placeholder="Application name"
                            prop:value=move || new_name.get().unwrap_or_default()
                            on:input=move |ev| new_name.set(Some(event_target_value(&ev)))
                            on:keydown={
                                let this = this.clone();
                                move |ev: web_sys::KeyboardEvent| {
                                    if ev.key() == "Enter" {
                                        this.create();
                                    }
                                }
                            }
                        />
                        <Button
                            appearance=ButtonAppearance::Primary
                            disabled=creating
                            on_click=move |_| this.create()
                        >
                            "Create"
                        </Button>
                        <Button on_click=move |_| new_name.set(None)>"Cancel"</Button>
                    </div>
                }
                .into_any(),
            }
        };
        let admin = self.ctx.is_admin();

        view! {
            <div class="applications">
                <div class="page__header">
                    <h1 class="page__title">"Applications"</h1>
                    {admin.then_some(create_form)}
                </div>
                {controller.pager()}
                <Table class="table">
                    <TableHeader>
                        <TableRow>
                            <SortableHeaderCell label="Name" sort_field="name" sort=sort on_sort=on_sort />
                            <SortableHeaderCell label="Owners" sort_field="owners" sort=sort on_sort=on_sort />
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

    fn data() -> AppData {
        serde_json::from_value(serde_json::json!({
            "applications": [{"name": "nodes"}, {"name": "Autoalerts", "owners": ["bob"]}]
        }))
        .unwrap()
    }

    #[test]
    fn test_create_action() {
        let data = data();
        assert_eq!(create_action(&data, "   "), CreateAction::Ignore);
        assert_eq!(create_action(&data, " autoalerts "), CreateAction::Open("Autoalerts".into()));
        assert_eq!(create_action(&data, " grafana "), CreateAction::Create("grafana".into()));
    }

    #[test]
    fn test_sorted_by_name_ignoring_case() {
        let mut apps = data().applications;
        sort_list(&mut apps, "name", true);
        assert_eq!(apps[0].name, "Autoalerts");
    }

    #[test]
    fn test_app_path_encodes() {
        assert_eq!(app_path("Alert manager"), "/applications/Alert%20manager");
    }
}

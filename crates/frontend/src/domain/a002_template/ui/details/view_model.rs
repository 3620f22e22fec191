use super::model::{self, TemplateForm, DUPLICATE_APPLICATION};
use crate::domain::a002_template::api;
use crate::layout::global_context::AppContext;
use crate::routes::navigation::{navigate_to, replace_url};
use crate::shared::alert::Alert;
use crate::shared::api_utils::{created_path, ApiError};
use crate::shared::validation::FieldErrors;
use crate::shared::view_module::{DetailState, EntityRef};
use contracts::domain::a001_plan::aggregate::PlanVersion;
use contracts::domain::a002_template::aggregate::Template;
use contracts::shared::app_data::AppData;
use leptos::prelude::*;
use std::future::Future;

/// Preview pane of one mode
#[derive(Debug, Clone, PartialEq)]
pub enum Preview {
    Loading,
    Rendered { subject: Option<String>, body: String },
    Failed(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct PreviewPane {
    pub block: u32,
    pub mode: String,
    pub preview: Preview,
}

/// State a template route opens in. `/templates/new` never touches the
/// network, an id goes through `fetch` exactly once and opens read-only.
pub async fn open_template<F, Fut>(
    entity: &EntityRef,
    data: &AppData,
    fetch: F,
) -> Result<DetailState<TemplateForm>, ApiError>
where
    F: FnOnce(String) -> Fut,
    Fut: Future<Output = Result<Template, ApiError>>,
{
    match entity {
        EntityRef::New => Ok(DetailState::blank(TemplateForm::blank(data))),
        EntityRef::Id(id) => {
            let template = fetch(id.clone()).await?;
            Ok(DetailState::loaded(TemplateForm::from_template(&template, &data.modes)))
        }
    }
}

#[derive(Clone, Copy)]
pub struct TemplateDetailsViewModel {
    ctx: AppContext,
    pub state: RwSignal<Option<DetailState<TemplateForm>>>,
    pub versions: RwSignal<Vec<PlanVersion>>,
    pub errors: RwSignal<FieldErrors>,
    pub busy: RwSignal<bool>,
    pub preview: RwSignal<Option<PreviewPane>>,
    pub show_related: RwSignal<bool>,
    leaving: StoredValue<bool>,
}

impl TemplateDetailsViewModel {
    pub fn new(ctx: AppContext) -> Self {
        Self {
            ctx,
            state: RwSignal::new(None),
            versions: RwSignal::new(Vec::new()),
            errors: RwSignal::new(FieldErrors::new()),
            busy: RwSignal::new(false),
            preview: RwSignal::new(None),
            show_related: RwSignal::new(false),
            leaving: StoredValue::new(false),
        }
    }

    pub fn ctx(&self) -> AppContext {
        self.ctx
    }

    pub fn is_editing(&self) -> bool {
        self.state.with(|s| s.as_ref().is_some_and(|s| s.is_editing()))
    }

    pub fn guards_unload(&self) -> bool {
        !self.leaving.get_value()
            && self
                .state
                .with_untracked(|s| s.as_ref().is_some_and(|s| s.is_editing()))
    }

    fn leave(&self, path: &str) {
        self.leaving.set_value(true);
        navigate_to(path);
    }

    pub fn load(&self, entity: &EntityRef) {
        let this = *self;
        let entity = entity.clone();
        let cfg = self.ctx.config();
        let data = self.ctx.with_data(AppData::clone);
        wasm_bindgen_futures::spawn_local(async move {
            let opened = open_template(&entity, &data, |id| async move {
                api::fetch_template(&cfg, &id).await
            })
            .await;
            match opened {
                Ok(state) => {
                    let name = state.saved().map(|t| t.name.clone());
                    this.state.set(Some(state));
                    this.errors.set(FieldErrors::new());
                    this.preview.set(None);
                    if let Some(name) = name {
                        this.load_versions(name);
                    }
                }
                Err(e) => {
                    let id = entity.id().unwrap_or_default();
                    log::warn!("template {} failed to load: {}", id, e);
                    this.ctx.alerts.show(
                        Alert::new(format!("\"{}\" template not found.", id))
                            .link("/templates/new", "Create a new template."),
                    );
                }
            }
        });
    }

    pub fn fetch(&self, id: String) {
        self.load(&EntityRef::Id(id));
    }

    fn load_versions(&self, name: String) {
        let versions = self.versions;
        let cfg = self.ctx.config();
        wasm_bindgen_futures::spawn_local(async move {
            match api::fetch_versions(&cfg, &name).await {
                Ok(mut list) => {
                    list.reverse();
                    versions.set(list);
                }
                Err(e) => log::warn!("versions of {} failed to load: {}", name, e),
            }
        });
    }

    pub fn switch_version(&self, id: i64) {
        replace_url(&format!("/templates/{}", id));
        self.fetch(id.to_string());
    }

    pub fn edit(&self) {
        self.state.update(|s| {
            if let Some(s) = s {
                s.edit();
            }
        });
    }

    pub fn discard(&self) {
        let mut discarded = false;
        self.state.update(|s| {
            if let Some(s) = s {
                discarded = s.discard();
            }
        });
        if discarded {
            self.errors.set(FieldErrors::new());
            self.preview.set(None);
            self.ctx.alerts.dismiss();
        } else {
            self.leave("/templates/");
        }
    }

    pub fn update(&self, f: impl FnOnce(&mut TemplateForm)) {
        self.state.update(|s| {
            if let Some(draft) = s.as_mut().and_then(|s| s.draft_mut()) {
                f(draft);
            }
        });
    }

    pub fn add_block(&self) {
        let ctx = self.ctx;
        self.update(|f| ctx.with_data(|d| f.add_block(&d.modes)));
    }

    pub fn publish(&self) {
        let Some(draft) = self
            .state
            .with_untracked(|s| s.as_ref().and_then(|s| s.draft().cloned()))
        else {
            return;
        };

        let result = model::validate(&draft);
        self.errors.set(result.errors.clone());
        if let Some(message) = result.errors.missing_message() {
            self.ctx.alerts.danger(message);
            return;
        }
        if result.duplicate_application {
            self.ctx.alerts.danger(DUPLICATE_APPLICATION);
            return;
        }

        let dto = model::to_new_template(&draft, &self.ctx.user());
        let this = *self;
        let cfg = self.ctx.config();
        self.busy.set(true);
        wasm_bindgen_futures::spawn_local(async move {
            match api::create_template(&cfg, &dto).await {
                Ok(response) => match created_path("templates", &response) {
                    Some(path) => this.leave(&path),
                    None => this.ctx.alerts.danger("Error: Template creation failed."),
                },
                Err(ApiError::Status { message, .. }) => {
                    this.ctx.alerts.danger(format!("Error: {}", message));
                }
                Err(e) => {
                    log::error!("template creation failed: {}", e);
                    this.ctx.alerts.danger("Error: Template creation failed.");
                }
            }
            this.busy.set(false);
        });
    }

    pub fn activate(&self) {
        let Some(id) = self
            .state
            .with_untracked(|s| s.as_ref().and_then(|s| s.saved()).and_then(|t| t.id))
        else {
            return;
        };
        let this = *self;
        let cfg = self.ctx.config();
        wasm_bindgen_futures::spawn_local(async move {
            match api::activate_template(&cfg, id).await {
                Ok(()) => this.fetch(id.to_string()),
                Err(e) => {
                    log::warn!("activate template {} failed: {}", id, e);
                    this.ctx.alerts.danger("Failed to activate.");
                }
            }
        });
    }

    /// Renders one mode of one block through `/validate/jinja`
    pub fn preview(&self, block: u32, mode: String) {
        let content = self.state.with_untracked(|s| {
            let form = s.as_ref()?.current()?;
            let b = form.block(block)?;
            let m = b.modes.iter().find(|m| m.mode == mode)?;
            Some((b.application.clone(), m.subject.clone(), m.body.clone()))
        });
        let Some((application, subject, body)) = content else {
            return;
        };
        if application.is_empty() {
            self.preview.set(Some(PreviewPane {
                block,
                mode,
                preview: Preview::Failed("Please select an application.".to_string()),
            }));
            return;
        }

        let pane = self.preview;
        pane.set(Some(PreviewPane {
            block,
            mode: mode.clone(),
            preview: Preview::Loading,
        }));
        wasm_bindgen_futures::spawn_local(async move {
            let preview = match api::preview(&application, &subject, &body).await {
                Ok(Ok(p)) => Preview::Rendered {
                    subject: (mode == model::SUBJECT_MODE).then(|| p.template_subject.unwrap_or_default()),
                    body: p.template_body.unwrap_or_default(),
                },
                Ok(Err(message)) => Preview::Failed(message),
                Err(e) => {
                    log::warn!("template preview failed: {}", e);
                    Preview::Failed("Invalid template".to_string())
                }
            };
            // другой превью мог быть запрошен, пока этот летел
            pane.update(|p| {
                if let Some(p) = p.as_mut().filter(|p| p.block == block && p.mode == mode) {
                    p.preview = preview;
                }
            });
        });
    }

    pub fn close_preview(&self) {
        self.preview.set(None);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::config::AppConfig;
    use futures::executor::block_on;
    use std::cell::RefCell;

    fn data() -> AppData {
        AppData {
            user: "alice".into(),
            modes: vec!["sms".into(), "email".into()],
            ..Default::default()
        }
    }

    fn template() -> Template {
        serde_json::from_str(
            r#"{"id": 42, "name": "default", "active": 1, "creator": "bob", "created": 10,
                "content": {}, "plans": []}"#,
        )
        .unwrap()
    }

    #[test]
    fn test_new_route_opens_blank_without_fetching() {
        let calls = RefCell::new(Vec::<String>::new());
        let state = block_on(open_template(&EntityRef::parse("new"), &data(), |id| {
            calls.borrow_mut().push(id);
            async { Ok(template()) }
        }))
        .unwrap();

        assert!(calls.borrow().is_empty());
        assert!(state.is_editing());
        assert!(state.saved().is_none());
        assert_eq!(state.draft().unwrap().creator, "alice");
    }

    #[test]
    fn test_id_route_fetches_once_and_opens_read_only() {
        let cfg = AppConfig::default();
        let urls = RefCell::new(Vec::<String>::new());
        let state = block_on(open_template(&EntityRef::parse("42"), &data(), |id| {
            urls.borrow_mut().push(api::template_url(&cfg, &id));
            async { Ok(template()) }
        }))
        .unwrap();

        assert_eq!(*urls.borrow(), vec![cfg.api("templates/42")]);
        assert!(!state.is_editing());
        let saved = state.saved().unwrap();
        assert_eq!(saved.id, Some(42));
        assert_eq!(saved.name, "default");
    }

    #[test]
    fn test_failed_fetch_opens_nothing() {
        let opened = block_on(open_template(&EntityRef::parse("9"), &data(), |_| async {
            Err::<Template, _>(ApiError::Status {
                status: 404,
                message: "Not Found".into(),
            })
        }));
        assert!(opened.is_err());
    }
}

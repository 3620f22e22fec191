use super::model::{self, PlanForm, DURATION_EXCEEDED};
use crate::domain::a001_plan::api;
use crate::domain::a003_incident::api as incident_api;
use crate::layout::global_context::AppContext;
use crate::routes::navigation::{navigate_to, replace_url};
use crate::shared::alert::Alert;
use crate::shared::api_utils::{created_path, ApiError};
use crate::shared::validation::FieldErrors;
use crate::shared::view_module::{DetailState, EntityRef};
use contracts::domain::a001_plan::aggregate::PlanVersion;
use contracts::domain::a003_incident::aggregate::DynamicTarget;
use leptos::prelude::*;

/// ViewModel for the plan page
#[derive(Clone, Copy)]
pub struct PlanDetailsViewModel {
    ctx: AppContext,
    pub state: RwSignal<Option<DetailState<PlanForm>>>,
    /// Newest first
    pub versions: RwSignal<Vec<PlanVersion>>,
    pub errors: RwSignal<FieldErrors>,
    pub busy: RwSignal<bool>,
    /// Application of the test incident
    pub test_application: RwSignal<String>,
    /// Role/target per dynamic slot of the test incident
    pub test_targets: RwSignal<Vec<DynamicTarget>>,
    /// Set right before a deliberate navigation so the unload guard stays quiet
    leaving: StoredValue<bool>,
}

impl PlanDetailsViewModel {
    pub fn new(ctx: AppContext) -> Self {
        let first_app = ctx.with_data(|d| d.applications.first().map(|a| a.name.clone()));
        Self {
            ctx,
            state: RwSignal::new(None),
            versions: RwSignal::new(Vec::new()),
            errors: RwSignal::new(FieldErrors::new()),
            busy: RwSignal::new(false),
            test_application: RwSignal::new(first_app.unwrap_or_default()),
            test_targets: RwSignal::new(Vec::new()),
            leaving: StoredValue::new(false),
        }
    }

    pub fn ctx(&self) -> AppContext {
        self.ctx
    }

    pub fn is_editing(&self) -> bool {
        self.state.with(|s| s.as_ref().is_some_and(|s| s.is_editing()))
    }

    /// Unsaved edits would be lost by leaving the page
    pub fn guards_unload(&self) -> bool {
        !self.leaving.get_value() && self.state.with_untracked(|s| s.as_ref().is_some_and(|s| s.is_editing()))
    }

    fn leave(&self, path: &str) {
        self.leaving.set_value(true);
        navigate_to(path);
    }

    /// `New` renders a blank plan without touching the network
    pub fn load(&self, entity: &EntityRef) {
        match entity {
            EntityRef::New => {
                let blank = self.ctx.with_data(PlanForm::blank);
                self.state.set(Some(DetailState::blank(blank)));
                self.versions.set(Vec::new());
            }
            EntityRef::Id(id) => self.fetch(id.clone()),
        }
    }

    pub fn fetch(&self, id: String) {
        let this = *self;
        let cfg = self.ctx.config();
        wasm_bindgen_futures::spawn_local(async move {
            match api::fetch_plan(&cfg, &id).await {
                Ok(plan) => {
                    let form = PlanForm::from_plan(&plan);
                    this.test_targets
                        .set(this.ctx.with_data(|d| model::test_target_slots(&form, d)));
                    this.state.set(Some(DetailState::loaded(form)));
                    this.errors.set(FieldErrors::new());
                    this.load_versions(plan.name);
                }
                Err(e) => {
                    log::warn!("plan {} failed to load: {}", id, e);
                    this.ctx.alerts.show(
                        Alert::new(format!("\"{}\" plan not found.", id))
                            .link("/plans/new", "Create a new plan."),
                    );
                }
            }
        });
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

    /// Version select: keeps the page, swaps the URL and the plan
    pub fn switch_version(&self, id: i64) {
        replace_url(&format!("/plans/{}", id));
        self.fetch(id.to_string());
    }

    /// Starts editing a new version from the one shown
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
            self.ctx.alerts.dismiss();
        } else {
            // nothing saved to go back to
            self.leave("/plans/");
        }
    }

    /// Mutates the draft; ignored outside edit mode
    pub fn update(&self, f: impl FnOnce(&mut PlanForm)) {
        self.state.update(|s| {
            if let Some(draft) = s.as_mut().and_then(|s| s.draft_mut()) {
                f(draft);
            }
        });
    }

    pub fn add_step(&self) {
        let ctx = self.ctx;
        self.update(|f| ctx.with_data(|d| f.add_step(d)));
    }

    pub fn add_notification(&self, step: usize) {
        let ctx = self.ctx;
        self.update(|f| ctx.with_data(|d| f.add_notification(step, d)));
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
        if result.duration_exceeded {
            self.ctx.alerts.danger(DURATION_EXCEEDED);
            return;
        }

        let dto = model::to_new_plan(&draft, &self.ctx.user());
        let this = *self;
        let cfg = self.ctx.config();
        self.busy.set(true);
        wasm_bindgen_futures::spawn_local(async move {
            match api::create_plan(&cfg, &dto).await {
                Ok(response) => match created_path("plans", &response) {
                    Some(path) => this.leave(&path),
                    None => {
                        log::warn!("unexpected plan creation response: {}", response);
                        this.ctx.alerts.danger("Plan creation failed.");
                    }
                },
                Err(ApiError::Status { message, .. }) => {
                    this.ctx.alerts.danger(format!("Error: {}", message));
                }
                Err(e) => {
                    log::error!("plan creation failed: {}", e);
                    this.ctx.alerts.danger("Plan creation failed.");
                }
            }
            this.busy.set(false);
        });
    }

    fn saved_id(&self) -> Option<i64> {
        self.state
            .with_untracked(|s| s.as_ref().and_then(|s| s.saved()).and_then(|p| p.id))
    }

    pub fn activate(&self) {
        let Some(id) = self.saved_id() else {
            return;
        };
        let this = *self;
        let cfg = self.ctx.config();
        wasm_bindgen_futures::spawn_local(async move {
            match api::activate_plan(&cfg, id).await {
                Ok(()) => this.fetch(id.to_string()),
                Err(e) => {
                    log::warn!("activate plan {} failed: {}", id, e);
                    this.ctx.alerts.danger("Failed to activate.");
                }
            }
        });
    }

    pub fn delete(&self) {
        let Some(id) = self.saved_id() else {
            return;
        };
        let this = *self;
        let cfg = self.ctx.config();
        wasm_bindgen_futures::spawn_local(async move {
            match api::delete_plan(&cfg, id).await {
                Ok(()) => this.leave("/plans/"),
                Err(e) => this
                    .ctx
                    .alerts
                    .danger(format!("Failed deleting plan: {}", e)),
            }
        });
    }

    /// Fires the saved plan against the chosen application's sample context
    pub fn test_incident(&self) {
        let Some(plan) = self
            .state
            .with_untracked(|s| s.as_ref().and_then(|s| s.saved()).map(|p| p.name.clone()))
        else {
            return;
        };
        let application = self.test_application.get_untracked();
        let dto = self.test_targets.with_untracked(|targets| {
            self.ctx
                .with_data(|d| model::test_incident_dto(&plan, &application, d, targets))
        });

        let this = *self;
        let cfg = self.ctx.config();
        wasm_bindgen_futures::spawn_local(async move {
            match incident_api::create_incident(&cfg, &dto).await {
                Ok(response) => match created_path("incidents", &response) {
                    Some(path) => this.leave(&path),
                    None => this.ctx.alerts.danger("Failed creating test incident."),
                },
                Err(e) => this
                    .ctx
                    .alerts
                    .danger(format!("Failed creating test incident: {}", e)),
            }
        });
    }
}

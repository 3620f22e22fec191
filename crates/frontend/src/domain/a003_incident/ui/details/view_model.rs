use super::model::{claim_message, claim_owner, created_id, reescalation_comments, Reescalation};
use crate::domain::a001_plan::api as plan_api;
use crate::domain::a003_incident::api;
use crate::domain::a005_application::api as application_api;
use crate::layout::global_context::AppContext;
use crate::routes::navigation::navigate_to;
use crate::shared::alert::{Alert, AlertTarget};
use crate::shared::config::AppConfig;
use crate::shared::table::state::TableState;
use contracts::domain::a003_incident::aggregate::{Comment, Incident, IncidentStep, NewIncidentDto};
use leptos::prelude::*;

/// Alert regions of the page
pub const COMMENT_REGION: &str = "add-comment";
pub const REESCALATE_REGION: &str = "re-escalate";

#[derive(Clone, Copy)]
pub struct IncidentDetailsViewModel {
    ctx: AppContext,
    pub incident: RwSignal<Option<Incident>>,
    /// `context_template` of the incident's application
    pub context_template: RwSignal<Option<String>>,
    /// Messages table, owned by the module's table controller
    pub steps: RwSignal<TableState<IncidentStep>>,
    /// Comment being written; `None` while the composer is hidden
    pub comment: RwSignal<Option<String>>,
    pub claiming: RwSignal<bool>,
    pub reescalation: RwSignal<Reescalation>,
    pub busy: RwSignal<bool>,
}

impl IncidentDetailsViewModel {
    pub fn new(ctx: AppContext, steps: RwSignal<TableState<IncidentStep>>) -> Self {
        Self {
            ctx,
            incident: RwSignal::new(None),
            context_template: RwSignal::new(None),
            steps,
            comment: RwSignal::new(None),
            claiming: RwSignal::new(false),
            reescalation: RwSignal::new(Reescalation::default()),
            busy: RwSignal::new(false),
        }
    }

    pub fn ctx(&self) -> AppContext {
        self.ctx
    }

    fn region_alert(&self, region: &'static str, text: impl Into<String>) {
        self.ctx.alerts.show(Alert::new(text).at(AlertTarget::Region(region)));
    }

    pub fn load(&self, id: String) {
        let this = *self;
        let cfg = self.ctx.config();
        wasm_bindgen_futures::spawn_local(async move {
            match api::fetch_incident(&cfg, &id).await {
                Ok(incident) => this.apply(incident),
                Err(e) => {
                    log::warn!("incident {} failed to load: {}", id, e);
                    this.ctx.alerts.danger("Incident not found");
                }
            }
        });
    }

    fn apply(&self, incident: Incident) {
        let application = incident.application.clone();
        let same_app = self
            .incident
            .with_untracked(|i| i.as_ref().is_some_and(|i| i.application == application));
        self.steps.update(|t| t.replace(incident.steps.clone(), 0));
        self.incident.set(Some(incident));
        if !same_app {
            self.load_context_template(application);
        }
    }

    fn load_context_template(&self, application: String) {
        let template = self.context_template;
        let cfg = self.ctx.config();
        wasm_bindgen_futures::spawn_local(async move {
            match application_api::fetch_application(&cfg, &application).await {
                Ok(app) => template.set(app.context_template),
                Err(e) => log::warn!("application {} failed to load: {}", application, e),
            }
        });
    }

    fn incident_id(&self) -> Option<i64> {
        self.incident.with_untracked(|i| i.as_ref().map(|i| i.id))
    }

    /// Claims an active incident, unclaims a closed one, then reloads it
    pub fn claim(&self) {
        let user = self.ctx.user();
        let Some((id, owner)) = self
            .incident
            .with_untracked(|i| i.as_ref().map(|i| (i.id, claim_owner(i, &user))))
        else {
            return;
        };
        let this = *self;
        let cfg = self.ctx.config();
        self.claiming.set(true);
        wasm_bindgen_futures::spawn_local(async move {
            match api::claim_incident(&cfg, id, owner.clone()).await {
                Ok(_) => match api::fetch_incident(&cfg, &id.to_string()).await {
                    Ok(incident) => {
                        this.apply(incident);
                        this.ctx.alerts.success(claim_message(id, &owner));
                    }
                    Err(e) => log::warn!("incident {} failed to reload: {}", id, e),
                },
                Err(e) => {
                    log::warn!("claim of incident {} failed: {}", id, e);
                    this.ctx.alerts.danger("Failed to modify incident");
                }
            }
            this.claiming.set(false);
        });
    }

    pub fn show_comment(&self) {
        self.comment.set(Some(String::new()));
    }

    pub fn hide_comment(&self) {
        self.comment.set(None);
    }

    pub fn add_comment(&self) {
        let Some(id) = self.incident_id() else {
            return;
        };
        let content = self.comment.get_untracked().unwrap_or_default();
        if content.is_empty() {
            self.region_alert(COMMENT_REGION, "Error: Empty comment body");
            return;
        }
        let this = *self;
        let author = self.ctx.user();
        let cfg = self.ctx.config();
        wasm_bindgen_futures::spawn_local(async move {
            match api::add_comment(&cfg, id, &author, &content).await {
                Ok(()) => {
                    let comment = Comment {
                        author,
                        content,
                        created: Some(js_sys::Date::now() / 1000.0),
                    };
                    this.incident.update(|i| {
                        if let Some(i) = i {
                            i.comments.push(comment);
                        }
                    });
                    this.hide_comment();
                }
                Err(e) => {
                    log::warn!("comment on incident {} failed: {}", id, e);
                    this.region_alert(COMMENT_REGION, "Failed to post comment");
                }
            }
        });
    }

    pub fn open_reescalation(&self) {
        self.reescalation.set(Reescalation::opened());
    }

    pub fn close_reescalation(&self) {
        self.reescalation.set(Reescalation::default());
        self.ctx.alerts.dismiss();
    }

    pub fn set_plan_query(&self, query: String) {
        self.reescalation.update(|r| r.query = query);
    }

    /// Resolves the typed plan name to an active plan and previews it
    pub fn select_plan(&self) {
        let name = self.reescalation.with_untracked(|r| r.query.trim().to_string());
        self.reescalation.update(|r| r.reset_preview());
        let this = *self;
        let cfg = self.ctx.config();
        wasm_bindgen_futures::spawn_local(async move {
            let found = plan_api::find_active_plan(&cfg, &name).await;
            match found.ok().and_then(|plans| plans.into_iter().next()) {
                Some(plan) => this.preview_plan(plan.id, plan.name),
                None => {
                    let message = format!("No plan found for query: {}", name);
                    this.reescalation.update(|r| r.reset_preview());
                    this.region_alert(REESCALATE_REGION, message);
                }
            }
        });
    }

    /// Typeahead pick: same as typing the full name
    pub fn pick_plan(&self, name: String) {
        self.set_plan_query(name);
        self.select_plan();
    }

    fn preview_plan(&self, id: i64, name: String) {
        let this = *self;
        let cfg = self.ctx.config();
        wasm_bindgen_futures::spawn_local(async move {
            match plan_api::fetch_plan(&cfg, &id.to_string()).await {
                Ok(plan) if plan.is_dynamic() => {
                    let message = format!("Cannot re-escalate with dynamic plan: {}", name);
                    this.reescalation.update(|r| r.reset_preview());
                    this.region_alert(REESCALATE_REGION, message);
                }
                Ok(plan) => {
                    this.ctx.alerts.dismiss();
                    this.reescalation.update(|r| r.plan = Some(plan));
                }
                Err(e) => {
                    log::warn!("plan {} failed to load: {}", id, e);
                    this.reescalation.update(|r| r.reset_preview());
                    this.region_alert(REESCALATE_REGION, "Failed to fetch plan details");
                }
            }
        });
    }

    /// Claim (if active) → new incident on the previewed plan → comments on both → navigate
    pub fn reescalate(&self) {
        let Some(incident) = self.incident.get_untracked() else {
            return;
        };
        let Some(plan) = self.reescalation.with_untracked(|r| r.plan.as_ref().map(|p| p.name.clone())) else {
            return;
        };
        let this = *self;
        let user = self.ctx.user();
        let cfg = self.ctx.config();
        self.busy.set(true);
        wasm_bindgen_futures::spawn_local(async move {
            let result = this.run_reescalation(&cfg, incident, plan, user).await;
            match result {
                Ok(created) => navigate_to(&format!("/incidents/{}", created)),
                Err(message) => this.region_alert(REESCALATE_REGION, message),
            }
            this.busy.set(false);
        });
    }

    async fn run_reescalation(
        &self,
        cfg: &AppConfig,
        incident: Incident,
        plan: String,
        user: String,
    ) -> Result<i64, String> {
        if incident.active {
            api::claim_incident(cfg, incident.id, Some(user.clone()))
                .await
                .map_err(|_| "Failed to claim original incident".to_string())?;
        }

        let dto = NewIncidentDto {
            application: incident.application.clone(),
            context: incident.context.clone(),
            plan,
            dynamic_targets: Vec::new(),
        };
        let created = api::create_incident(cfg, &dto)
            .await
            .ok()
            .and_then(|response| created_id(&response))
            .ok_or_else(|| "Failed creating re-escalation incident".to_string())?;

        let (on_original, on_created) = reescalation_comments(incident.id, created, &user);
        let (original, reescalated) = futures::join!(
            api::add_comment(cfg, incident.id, &user, &on_original),
            api::add_comment(cfg, created, &user, &on_created),
        );
        if original.is_err() || reescalated.is_err() {
            return Err(format!(
                "Failed to post re-escalation comments for re-escalation incident {}",
                created
            ));
        }
        Ok(created)
    }
}

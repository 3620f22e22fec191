use super::model::{rename_target, to_update_dto, AppFlags, ApplicationForm, QuotaChange, QuotaForm};
use crate::domain::a005_application::api;
use crate::layout::global_context::AppContext;
use crate::routes::navigation::navigate_to;
use crate::shared::alert::{Alert, AlertKind};
use crate::shared::api_utils::ApiError;
use crate::shared::config::AppConfig;
use crate::shared::view_module::DetailState;
use contracts::domain::a005_application::aggregate::ApplicationUpdateDto;
use leptos::prelude::*;

pub const NO_SECONDARY_KEY: &str = "No secondary key exists";

/// Writes every section the user may change, the application itself last
async fn persist(
    cfg: &AppConfig,
    name: &str,
    flags: AppFlags,
    draft: &ApplicationForm,
    dto: &ApplicationUpdateDto,
    quota: Option<&QuotaChange>,
) -> Result<(), ApiError> {
    if flags.is_editable() {
        api::update_email_incidents(cfg, name, &draft.email_incidents).await?;
        api::save_categories(cfg, name, &draft.categories).await?;
    }
    match quota {
        Some(QuotaChange::Delete) => api::delete_quota(cfg, name).await?,
        Some(QuotaChange::Save(q)) => api::save_quota(cfg, name, q).await?,
        None => {}
    }
    api::update_application(cfg, name, dto).await
}

/// Actions behind a confirmation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DangerAction {
    Rename,
    Delete,
    Rekey,
    SecondaryKey,
}

#[derive(Clone, Copy)]
pub struct ApplicationDetailsViewModel {
    ctx: AppContext,
    /// Canonical name from bootstrap data
    name: RwSignal<String>,
    pub flags: RwSignal<AppFlags>,
    pub state: RwSignal<Option<DetailState<ApplicationForm>>>,
    pub api_key: RwSignal<Option<String>>,
    pub secondary_key: RwSignal<Option<String>>,
    pub danger: RwSignal<Option<DangerAction>>,
    pub rename_to: RwSignal<String>,
    pub busy: RwSignal<bool>,
    leaving: StoredValue<bool>,
}

impl ApplicationDetailsViewModel {
    pub fn new(ctx: AppContext) -> Self {
        Self {
            ctx,
            name: RwSignal::new(String::new()),
            flags: RwSignal::new(AppFlags::default()),
            state: RwSignal::new(None),
            api_key: RwSignal::new(None),
            secondary_key: RwSignal::new(None),
            danger: RwSignal::new(None),
            rename_to: RwSignal::new(String::new()),
            busy: RwSignal::new(false),
            leaving: StoredValue::new(false),
        }
    }

    pub fn ctx(&self) -> AppContext {
        self.ctx
    }

    pub fn name(&self) -> String {
        self.name.get()
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

    pub fn load(&self, requested: &str) {
        let Some(app) = self.ctx.with_data(|d| d.find_application(requested).cloned()) else {
            self.ctx.alerts.danger("Application not found");
            return;
        };
        let flags = AppFlags::new(&app, &self.ctx.user(), self.ctx.is_admin());
        self.flags.set(flags);
        self.name.set(app.name.clone());

        let this = *self;
        let cfg = self.ctx.config();
        wasm_bindgen_futures::spawn_local(async move {
            let (emails, quota, categories) = futures::join!(
                api::fetch_email_incidents(&cfg, &app.name),
                api::fetch_quota(&cfg, &app.name),
                api::fetch_categories(&cfg, &app.name)
            );
            match emails {
                Ok(emails) => {
                    let mut form = ApplicationForm::from_info(&app, emails);
                    match quota {
                        Ok(q) => form.quota = QuotaForm::from_quota(&q),
                        Err(e) => log::warn!("quota of {} failed to load: {}", app.name, e),
                    }
                    match categories {
                        Ok(c) => form.categories = c,
                        Err(e) => log::warn!("categories of {} failed to load: {}", app.name, e),
                    }
                    this.state.set(Some(DetailState::loaded(form)));
                }
                Err(e) => {
                    log::warn!("settings of {} failed to load: {}", app.name, e);
                    this.ctx.alerts.danger("Failed loading app settings");
                }
            }
        });
    }

    pub fn edit(&self) {
        self.state.update(|s| {
            if let Some(s) = s {
                s.edit();
            }
        });
    }

    pub fn discard(&self) {
        self.state.update(|s| {
            if let Some(s) = s {
                s.discard();
            }
        });
        self.ctx.alerts.dismiss();
    }

    pub fn update(&self, f: impl FnOnce(&mut ApplicationForm)) {
        self.state.update(|s| {
            if let Some(draft) = s.as_mut().and_then(|s| s.draft_mut()) {
                f(draft);
            }
        });
    }

    /// Like `update`, the error goes to the alert slot. Returns whether it applied.
    pub fn try_update(&self, f: impl FnOnce(&mut ApplicationForm) -> Result<(), String>) -> bool {
        let mut result = Ok(());
        self.update(|draft| result = f(draft));
        match result {
            Ok(()) => true,
            Err(message) => {
                self.ctx.alerts.danger(message);
                false
            }
        }
    }

    pub fn save(&self) {
        let Some(draft) = self
            .state
            .with_untracked(|s| s.as_ref().and_then(|s| s.draft().cloned()))
        else {
            return;
        };
        let flags = self.flags.get_untracked();
        let dto = match to_update_dto(&draft, flags) {
            Ok(dto) => dto,
            Err(message) => {
                self.ctx.alerts.danger(message);
                return;
            }
        };
        let quota = if flags.can_edit_quota() {
            match draft.quota.change() {
                Ok(change) => Some(change),
                Err(message) => {
                    self.ctx.alerts.danger(message);
                    return;
                }
            }
        } else {
            None
        };

        let this = *self;
        let name = self.name.get_untracked();
        let cfg = self.ctx.config();
        self.busy.set(true);
        wasm_bindgen_futures::spawn_local(async move {
            match persist(&cfg, &name, flags, &draft, &dto, quota.as_ref()).await {
                Ok(()) => {
                    let quota = match quota {
                        Some(QuotaChange::Save(q)) => QuotaForm::from_quota(&q),
                        Some(QuotaChange::Delete) => QuotaForm::default(),
                        None => draft.quota.clone(),
                    };
                    let saved = ApplicationForm {
                        sample_context: dto.sample_context,
                        default_modes: dto.default_modes,
                        title_variable: dto.title_variable,
                        quota,
                        ..draft
                    };
                    this.state.update(|s| {
                        if let Some(s) = s {
                            s.save_succeeded(saved);
                        }
                    });
                    this.api_key.set(None);
                    this.ctx.alerts.success("Settings saved");
                }
                Err(e) => {
                    log::warn!("settings of {} were not saved: {}", name, e);
                    this.ctx.alerts.danger(format!("Settings failed to save: {}", e));
                }
            }
            this.busy.set(false);
        });
    }

    pub fn show_key(&self) {
        let this = *self;
        let name = self.name.get_untracked();
        let cfg = self.ctx.config();
        wasm_bindgen_futures::spawn_local(async move {
            match api::fetch_key(&cfg, &name).await {
                Ok(key) => this.api_key.set(Some(key.key.unwrap_or_default())),
                Err(e) => this.ctx.alerts.danger(format!("Unable to get key: {}", e)),
            }
        });
    }

    pub fn show_secondary_key(&self) {
        let this = *self;
        let name = self.name.get_untracked();
        let cfg = self.ctx.config();
        wasm_bindgen_futures::spawn_local(async move {
            match api::fetch_secondary_key(&cfg, &name).await {
                Ok(key) => this
                    .secondary_key
                    .set(Some(key.key.unwrap_or_else(|| NO_SECONDARY_KEY.to_string()))),
                Err(e) => this.ctx.alerts.danger(format!("Unable to get key: {}", e)),
            }
        });
    }

    pub fn ask(&self, action: DangerAction) {
        if action == DangerAction::Rename {
            self.rename_to.set(self.name.get_untracked());
        }
        self.danger.set(Some(action));
    }

    pub fn cancel(&self) {
        self.danger.set(None);
    }

    pub fn confirm(&self) {
        match self.danger.get_untracked() {
            Some(DangerAction::Rename) => self.rename(),
            Some(DangerAction::Delete) => self.delete(),
            Some(DangerAction::Rekey) => self.rekey(),
            Some(DangerAction::SecondaryKey) => self.generate_secondary_key(),
            None => {}
        }
    }

    fn rename(&self) {
        let name = self.name.get_untracked();
        let Some(new_name) = rename_target(&name, &self.rename_to.get_untracked()) else {
            return;
        };
        let this = *self;
        let cfg = self.ctx.config();
        self.busy.set(true);
        wasm_bindgen_futures::spawn_local(async move {
            match api::rename(&cfg, &name, &new_name).await {
                Ok(()) => {
                    this.leave(&format!("/applications/{}", urlencoding::encode(&new_name)));
                }
                Err(e) => {
                    this.ctx
                        .alerts
                        .danger(format!("Failed renaming application: {}", e));
                }
            }
            this.danger.set(None);
            this.busy.set(false);
        });
    }

    fn delete(&self) {
        let this = *self;
        let name = self.name.get_untracked();
        let cfg = self.ctx.config();
        self.busy.set(true);
        wasm_bindgen_futures::spawn_local(async move {
            match api::delete_application(&cfg, &name).await {
                Ok(()) => this.leave("/applications/"),
                Err(e) => {
                    this.ctx
                        .alerts
                        .danger(format!("Failed deleting application: {}", e));
                }
            }
            this.danger.set(None);
            this.busy.set(false);
        });
    }

    fn rekey(&self) {
        let this = *self;
        let name = self.name.get_untracked();
        let cfg = self.ctx.config();
        self.busy.set(true);
        wasm_bindgen_futures::spawn_local(async move {
            match api::rekey(&cfg, &name).await {
                Ok(()) => {
                    // показанный ключ устарел
                    this.api_key.set(None);
                    this.ctx.alerts.show(
                        Alert::new("Successfully rekey'd application").kind(AlertKind::Success),
                    );
                }
                Err(e) => {
                    this.ctx
                        .alerts
                        .danger(format!("Failed re-keying application: {}", e));
                }
            }
            this.danger.set(None);
            this.busy.set(false);
        });
    }

    fn generate_secondary_key(&self) {
        let this = *self;
        let name = self.name.get_untracked();
        let cfg = self.ctx.config();
        self.busy.set(true);
        wasm_bindgen_futures::spawn_local(async move {
            match api::create_secondary_key(&cfg, &name).await {
                Ok(()) => {
                    this.secondary_key.set(None);
                    this.ctx.alerts.success("Successfully generated secondary key");
                }
                Err(e) => {
                    this.ctx
                        .alerts
                        .danger(format!("Failed to generate secondary key: {}", e));
                }
            }
            this.danger.set(None);
            this.busy.set(false);
        });
    }
}

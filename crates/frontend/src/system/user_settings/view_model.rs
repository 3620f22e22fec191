use super::model::{
    category_apps, overrides_by_app, to_modes_dto, CategoryEditor, CategoryModes, ReprioritizationDraft,
    SettingsForm,
};
use crate::domain::a005_application::api as app_api;
use crate::layout::global_context::AppContext;
use crate::system::users::api;
use contracts::system::users::ReprioritizationRule;
use leptos::prelude::*;
use std::collections::BTreeMap;

#[derive(Clone, Copy)]
pub struct UserSettingsViewModel {
    ctx: AppContext,
    pub form: RwSignal<Option<SettingsForm>>,
    pub sms_override: RwSignal<bool>,
    pub timezones: RwSignal<Vec<String>>,
    pub timezone: RwSignal<String>,
    pub rules: RwSignal<Vec<ReprioritizationRule>>,
    pub draft: RwSignal<ReprioritizationDraft>,
    pub busy: RwSignal<bool>,
    /// application → category → mode
    pub category_overrides: RwSignal<BTreeMap<String, CategoryModes>>,
    /// Applications with custom categories
    pub category_apps: RwSignal<Vec<String>>,
    pub category_editor: RwSignal<Option<CategoryEditor>>,
    /// Application whose overrides wait for delete confirmation
    pub category_delete: RwSignal<Option<String>>,
}

impl UserSettingsViewModel {
    pub fn new(ctx: AppContext) -> Self {
        let draft = ctx.with_data(ReprioritizationDraft::new);
        let timezone = ctx.with_data(|d| d.user_settings.timezone.clone().unwrap_or_default());
        Self {
            ctx,
            form: RwSignal::new(None),
            sms_override: RwSignal::new(false),
            timezones: RwSignal::new(Vec::new()),
            timezone: RwSignal::new(timezone),
            rules: RwSignal::new(Vec::new()),
            draft: RwSignal::new(draft),
            busy: RwSignal::new(false),
            category_overrides: RwSignal::new(BTreeMap::new()),
            category_apps: RwSignal::new(Vec::new()),
            category_editor: RwSignal::new(None),
            category_delete: RwSignal::new(None),
        }
    }

    pub fn ctx(&self) -> AppContext {
        self.ctx
    }

    pub fn load(&self) {
        let this = *self;
        let user = self.ctx.user();
        let cfg = self.ctx.config();
        wasm_bindgen_futures::spawn_local(async move {
            match api::fetch_user(&cfg, &user).await {
                Ok(u) => {
                    this.sms_override.set(u.has_sms_override());
                    this.form.set(Some(SettingsForm::from_user(&u)));
                }
                Err(e) => {
                    log::warn!("settings of {} failed to load: {}", user, e);
                    this.ctx.alerts.danger(format!("Error: Failed to load data - {}", e));
                }
            }
        });
        self.load_rules();
        self.load_timezones();
        self.load_category_overrides();
    }

    fn load_category_overrides(&self) {
        let this = *self;
        let user = self.ctx.user();
        let cfg = self.ctx.config();
        wasm_bindgen_futures::spawn_local(async move {
            let (overrides, categories) = futures::join!(
                api::fetch_category_overrides(&cfg, &user),
                app_api::fetch_all_categories(&cfg)
            );
            match overrides {
                Ok(rows) => this.category_overrides.set(overrides_by_app(&rows)),
                Err(e) => this
                    .ctx
                    .alerts
                    .danger(format!("Error: Failed to load notification category data - {}", e)),
            }
            match categories {
                Ok(all) => this.category_apps.set(category_apps(&all)),
                Err(e) => {
                    log::warn!("category applications failed to load: {}", e);
                    this.ctx.alerts.danger("Failed to fetch applications for dropdown");
                }
            }
        });
    }

    /// Opens the category editor of one application
    pub fn edit_categories(&self, app: String) {
        if app.is_empty() {
            return;
        }
        let this = *self;
        let cfg = self.ctx.config();
        wasm_bindgen_futures::spawn_local(async move {
            match app_api::fetch_categories(&cfg, &app).await {
                Ok(categories) => {
                    let editor = this
                        .category_overrides
                        .with_untracked(|o| CategoryEditor::new(&app, &categories, o.get(&app)));
                    this.category_editor.set(Some(editor));
                }
                Err(e) => {
                    log::warn!("categories of {} failed to load: {}", app, e);
                    this.ctx.alerts.danger("Failed to fetch category data for this app");
                }
            }
        });
    }

    pub fn close_categories(&self) {
        self.category_editor.set(None);
    }

    pub fn save_categories(&self) {
        let Some(editor) = self.category_editor.get_untracked() else {
            return;
        };
        let modes = editor.modes();
        let this = *self;
        let user = self.ctx.user();
        let cfg = self.ctx.config();
        self.busy.set(true);
        wasm_bindgen_futures::spawn_local(async move {
            match api::save_category_overrides(&cfg, &user, &editor.application, &modes).await {
                Ok(()) => {
                    this.category_overrides.update(|o| {
                        o.insert(editor.application.clone(), modes);
                    });
                    this.category_editor.set(None);
                    this.ctx.alerts.success("Category settings saved.");
                }
                Err(e) => {
                    log::warn!("categories of {} were not saved: {}", editor.application, e);
                    this.ctx.alerts.danger("Failed to save category settings");
                }
            }
            this.busy.set(false);
        });
    }

    pub fn delete_categories(&self) {
        let Some(app) = self.category_delete.get_untracked() else {
            return;
        };
        let this = *self;
        let user = self.ctx.user();
        let cfg = self.ctx.config();
        wasm_bindgen_futures::spawn_local(async move {
            match api::delete_category_overrides(&cfg, &user, &app).await {
                Ok(()) => {
                    this.category_overrides.update(|o| {
                        o.remove(&app);
                    });
                    this.ctx.alerts.success("Deleted application successfully");
                }
                Err(e) => {
                    log::warn!("category overrides of {} were not deleted: {}", app, e);
                    this.ctx.alerts.danger("Failed to delete application");
                }
            }
            this.category_delete.set(None);
        });
    }

    fn load_rules(&self) {
        let this = *self;
        let user = self.ctx.user();
        let cfg = self.ctx.config();
        wasm_bindgen_futures::spawn_local(async move {
            match api::fetch_reprioritization(&cfg, &user).await {
                Ok(rules) => this.rules.set(rules),
                Err(e) => this
                    .ctx
                    .alerts
                    .danger(format!("Error: Failed to load reprioritization data - {}", e)),
            }
        });
    }

    fn load_timezones(&self) {
        let this = *self;
        let cfg = self.ctx.config();
        wasm_bindgen_futures::spawn_local(async move {
            match api::fetch_timezones(&cfg).await {
                Ok(zones) => this.timezones.set(zones),
                Err(e) => this
                    .ctx
                    .alerts
                    .danger(format!("Error: Failed to load supported timezones - {}", e)),
            }
        });
    }

    pub fn update(&self, f: impl FnOnce(&mut SettingsForm)) {
        self.form.update(|form| {
            if let Some(form) = form {
                f(form);
            }
        });
    }

    pub fn save_modes(&self) {
        let Some(form) = self.form.get_untracked() else {
            return;
        };
        let dto = self.ctx.with_data(|d| to_modes_dto(&form, d));
        let this = *self;
        let user = self.ctx.user();
        let cfg = self.ctx.config();
        self.busy.set(true);
        wasm_bindgen_futures::spawn_local(async move {
            match api::save_modes(&cfg, &user, &dto).await {
                Ok(()) => {
                    this.update(|f| f.saved());
                    this.ctx.alerts.success("Settings saved.");
                }
                Err(e) => {
                    log::warn!("modes of {} were not saved: {}", user, e);
                    this.ctx.alerts.danger("Failed to save settings");
                }
            }
            this.busy.set(false);
        });
    }

    pub fn save_timezone(&self) {
        let timezone = self.timezone.get_untracked();
        if timezone.is_empty() {
            return;
        }
        let ctx = self.ctx;
        let user = ctx.user();
        let cfg = ctx.config();
        wasm_bindgen_futures::spawn_local(async move {
            match api::save_timezone(&cfg, &user, &timezone).await {
                Ok(()) => ctx.alerts.success("Settings saved."),
                Err(e) => {
                    log::warn!("timezone of {} was not saved: {}", user, e);
                    ctx.alerts.danger("Failed to save settings");
                }
            }
        });
    }

    pub fn save_sms_override(&self) {
        let enabled = self.sms_override.get_untracked();
        let ctx = self.ctx;
        let user = ctx.user();
        let cfg = ctx.config();
        wasm_bindgen_futures::spawn_local(async move {
            match api::save_sms_override(&cfg, &user, enabled).await {
                Ok(()) => ctx.alerts.success("Settings saved."),
                Err(e) => {
                    log::warn!("sms override of {} was not saved: {}", user, e);
                    ctx.alerts.danger("Failed to save settings");
                }
            }
        });
    }

    pub fn add_rule(&self) {
        let rule = match self.draft.with_untracked(|d| d.to_rule()) {
            Ok(rule) => rule,
            Err(message) => {
                self.ctx.alerts.danger(message);
                return;
            }
        };
        let this = *self;
        let user = self.ctx.user();
        let cfg = self.ctx.config();
        self.busy.set(true);
        wasm_bindgen_futures::spawn_local(async move {
            match api::add_reprioritization(&cfg, &user, &rule).await {
                Ok(()) => {
                    this.ctx.alerts.success("Reprioritization added.");
                    this.load_rules();
                }
                Err(e) => this
                    .ctx
                    .alerts
                    .danger(format!("Failed to add reprioritization: {}", e)),
            }
            this.busy.set(false);
        });
    }

    pub fn delete_rule(&self, src_mode: String) {
        let this = *self;
        let user = self.ctx.user();
        let cfg = self.ctx.config();
        wasm_bindgen_futures::spawn_local(async move {
            match api::delete_reprioritization(&cfg, &user, &src_mode).await {
                Ok(()) => {
                    this.ctx.alerts.success("Reprioritization rule deleted.");
                    this.load_rules();
                }
                Err(e) => {
                    log::warn!("rule {} of {} was not deleted: {}", src_mode, user, e);
                    this.ctx.alerts.danger("Failed deleting");
                }
            }
        });
    }
}

//! Notification settings of the current user.
//!
//! `default` в селекте означает «как задано приложением или приоритетом».
//! Приложение, у которого все значения `default`, сервер удаляет, поэтому
//! перед отправкой такие строки заполняются фактическими значениями.

use contracts::domain::a005_application::aggregate::NotificationCategory;
use contracts::shared::app_data::AppData;
use contracts::system::users::{
    CategoryOverride, PriorityModes, ReprioritizationRule, User, UserModesDto,
};
use std::collections::{BTreeMap, BTreeSet};

pub const DEFAULT_MODE: &str = "default";
pub const DROP_MODE: &str = "drop";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SettingsForm {
    /// Global overrides; a missing priority is `default`
    pub modes: PriorityModes,
    pub per_app_modes: BTreeMap<String, PriorityModes>,
    /// Rows removed since the last save; sent back as all-`default`
    pub removed_apps: BTreeSet<String>,
    pub dirty: bool,
}

impl SettingsForm {
    pub fn from_user(user: &User) -> Self {
        Self {
            modes: user.modes.clone(),
            per_app_modes: user.per_app_modes.clone(),
            ..Default::default()
        }
    }

    pub fn global_mode(&self, priority: &str) -> String {
        self.modes
            .get(priority)
            .cloned()
            .unwrap_or_else(|| DEFAULT_MODE.to_string())
    }

    pub fn app_mode(&self, app: &str, priority: &str) -> String {
        self.per_app_modes
            .get(app)
            .and_then(|m| m.get(priority))
            .cloned()
            .unwrap_or_else(|| DEFAULT_MODE.to_string())
    }

    pub fn set_global(&mut self, priority: &str, mode: &str) {
        if mode == DEFAULT_MODE {
            self.modes.remove(priority);
        } else {
            self.modes.insert(priority.to_string(), mode.to_string());
        }
        self.dirty = true;
    }

    pub fn set_app(&mut self, app: &str, priority: &str, mode: &str) {
        self.per_app_modes
            .entry(app.to_string())
            .or_default()
            .insert(priority.to_string(), mode.to_string());
        self.dirty = true;
    }

    pub fn add_app(&mut self, app: &str) {
        if app.is_empty() {
            return;
        }
        self.per_app_modes.entry(app.to_string()).or_default();
        self.removed_apps.remove(app);
        self.dirty = true;
    }

    pub fn remove_app(&mut self, app: &str) {
        self.per_app_modes.remove(app);
        self.removed_apps.insert(app.to_string());
        self.dirty = true;
    }

    pub fn saved(&mut self) {
        self.removed_apps.clear();
        self.dirty = false;
    }
}

/// Effective mode per priority of one application: its own default, then the
/// priority's default, else empty.
pub fn app_defaults(data: &AppData, app: &str) -> PriorityModes {
    let own = data.applications.iter().find(|a| a.name == app);
    data.priorities
        .iter()
        .map(|p| {
            let mode = own
                .and_then(|a| a.default_modes.get(&p.name).cloned())
                .or_else(|| p.default_mode.clone())
                .unwrap_or_default();
            (p.name.clone(), mode)
        })
        .collect()
}

/// Applications not yet configured, sorted ignoring case
pub fn addable_apps(data: &AppData, form: &SettingsForm) -> Vec<String> {
    let mut names: Vec<String> = data
        .applications
        .iter()
        .map(|a| a.name.clone())
        .filter(|name| !form.per_app_modes.contains_key(name))
        .collect();
    names.sort_by_key(|n| n.to_lowercase());
    names
}

/// Per-application selects offer the application's modes
pub fn app_mode_options(data: &AppData, app: &str) -> Vec<String> {
    let mut options = vec![DEFAULT_MODE.to_string()];
    if let Some(a) = data.applications.iter().find(|a| a.name == app) {
        options.extend(a.supported_modes.iter().cloned());
    }
    options
}

pub fn to_modes_dto(form: &SettingsForm, data: &AppData) -> UserModesDto {
    let modes = data
        .priorities
        .iter()
        .map(|p| (p.name.clone(), form.global_mode(&p.name)))
        .collect();

    let mut per_app_modes = BTreeMap::new();
    for app in form.per_app_modes.keys() {
        let row: PriorityModes = data
            .priorities
            .iter()
            .map(|p| (p.name.clone(), form.app_mode(app, &p.name)))
            .collect();
        let all_default = row.values().all(|m| m == DEFAULT_MODE);
        let row = if all_default { app_defaults(data, app) } else { row };
        per_app_modes.insert(app.clone(), row);
    }
    for app in &form.removed_apps {
        let row = data
            .priorities
            .iter()
            .map(|p| (p.name.clone(), DEFAULT_MODE.to_string()))
            .collect();
        per_app_modes.insert(app.clone(), row);
    }

    UserModesDto {
        modes,
        per_app_modes,
    }
}

/// The unsubscribe page maps every priority of one application to `drop`
pub fn unsubscribe_dto(user: &User, data: &AppData, app: &str) -> UserModesDto {
    let mut per_app_modes = user.per_app_modes.clone();
    per_app_modes.insert(
        app.to_string(),
        data.priorities
            .iter()
            .map(|p| (p.name.clone(), DROP_MODE.to_string()))
            .collect(),
    );
    UserModesDto {
        modes: user.modes.clone(),
        per_app_modes,
    }
}

/// Add-rule form; numbers stay text until submitted
#[derive(Debug, Clone, PartialEq)]
pub struct ReprioritizationDraft {
    pub src_mode: String,
    pub dst_mode: String,
    pub count: String,
    pub duration_minutes: String,
}

impl ReprioritizationDraft {
    pub fn new(data: &AppData) -> Self {
        Self {
            src_mode: data.modes.first().cloned().unwrap_or_default(),
            dst_mode: "sms".to_string(),
            count: String::new(),
            duration_minutes: String::new(),
        }
    }

    pub fn to_rule(&self) -> Result<ReprioritizationRule, String> {
        let count = self
            .count
            .trim()
            .parse::<i64>()
            .ok()
            .filter(|c| *c > 0)
            .ok_or_else(|| "Count must be a positive number".to_string())?;
        let minutes = self
            .duration_minutes
            .trim()
            .parse::<i64>()
            .ok()
            .filter(|m| (1..=60).contains(m))
            .ok_or_else(|| "Duration must be between 1 and 60 minutes".to_string())?;
        Ok(ReprioritizationRule {
            src_mode: self.src_mode.clone(),
            dst_mode: self.dst_mode.clone(),
            count,
            duration: minutes * 60,
        })
    }
}

/// Options of the timezone select; `""` stands for the browser default
pub fn timezone_options(configured: Option<&str>, supported: &[String]) -> Vec<(String, String)> {
    let mut options = Vec::with_capacity(supported.len() + 1);
    if configured.is_none() {
        options.push((String::new(), "Browser Default".to_string()));
    }
    options.extend(supported.iter().map(|tz| (tz.clone(), tz.clone())));
    options
}

/// category → mode
pub type CategoryModes = BTreeMap<String, String>;

/// The user's category overrides grouped by application
pub fn overrides_by_app(rows: &[CategoryOverride]) -> BTreeMap<String, CategoryModes> {
    let mut grouped: BTreeMap<String, CategoryModes> = BTreeMap::new();
    for row in rows {
        grouped
            .entry(row.application.clone())
            .or_default()
            .insert(row.category.clone(), row.mode.clone());
    }
    grouped
}

/// Applications that define custom categories, sorted, each once
pub fn category_apps(categories: &[NotificationCategory]) -> Vec<String> {
    categories
        .iter()
        .map(|c| c.application.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Category selects offer every mode plus `drop`
pub fn category_mode_options(data: &AppData) -> Vec<String> {
    let mut options = data.modes.clone();
    if !options.iter().any(|m| m == DROP_MODE) {
        options.push(DROP_MODE.to_string());
    }
    options
}

/// One line of the per-application category editor
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryRow {
    pub category: String,
    pub description: String,
    pub mode: String,
}

/// Category editor of one application
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryEditor {
    pub application: String,
    pub rows: Vec<CategoryRow>,
}

impl CategoryEditor {
    /// The application's categories; a user override replaces the default mode
    pub fn new(application: &str, categories: &[NotificationCategory], overrides: Option<&CategoryModes>) -> Self {
        let rows = categories
            .iter()
            .map(|c| CategoryRow {
                category: c.name.clone(),
                description: c.description.clone(),
                mode: overrides
                    .and_then(|o| o.get(&c.name))
                    .cloned()
                    .unwrap_or_else(|| c.mode.clone()),
            })
            .collect();
        Self {
            application: application.to_string(),
            rows,
        }
    }

    pub fn set_mode(&mut self, category: &str, mode: &str) {
        if let Some(row) = self.rows.iter_mut().find(|r| r.category == category) {
            row.mode = mode.to_string();
        }
    }

    /// Body of `POST /v0/users/<user>/categories/<app>`
    pub fn modes(&self) -> CategoryModes {
        self.rows
            .iter()
            .map(|r| (r.category.clone(), r.mode.clone()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn data() -> AppData {
        serde_json::from_value(json!({
            "user": "alice",
            "priorities": [
                {"name": "high", "default_mode": "sms"},
                {"name": "low", "default_mode": "email"}
            ],
            "applications": [
                {"name": "nodes", "supported_modes": ["sms", "call"], "default_modes": {"high": "call"}},
                {"name": "Autoalerts"},
                {"name": "grafana"}
            ],
            "modes": ["sms", "email", "call"]
        }))
        .unwrap()
    }

    #[test]
    fn test_global_default_removes_override() {
        let mut form = SettingsForm::default();
        form.set_global("high", "call");
        assert_eq!(form.global_mode("high"), "call");
        form.set_global("high", DEFAULT_MODE);
        assert_eq!(form.global_mode("high"), DEFAULT_MODE);
        assert!(form.modes.is_empty());
        assert!(form.dirty);
    }

    #[test]
    fn test_app_defaults() {
        let defaults = app_defaults(&data(), "nodes");
        assert_eq!(defaults["high"], "call");
        assert_eq!(defaults["low"], "email");
    }

    #[test]
    fn test_all_default_row_is_filled() {
        let data = data();
        let mut form = SettingsForm::default();
        form.add_app("nodes");
        let dto = to_modes_dto(&form, &data);
        assert_eq!(dto.per_app_modes["nodes"]["high"], "call");
        assert_eq!(dto.modes["high"], DEFAULT_MODE);

        form.set_app("nodes", "high", "sms");
        let dto = to_modes_dto(&form, &data);
        assert_eq!(dto.per_app_modes["nodes"]["high"], "sms");
        assert_eq!(dto.per_app_modes["nodes"]["low"], DEFAULT_MODE);
    }

    #[test]
    fn test_removed_app_resets_to_default() {
        let data = data();
        let mut form = SettingsForm::default();
        form.add_app("nodes");
        form.remove_app("nodes");
        let dto = to_modes_dto(&form, &data);
        assert_eq!(dto.per_app_modes["nodes"]["high"], DEFAULT_MODE);

        form.add_app("nodes");
        assert!(form.removed_apps.is_empty());
    }

    #[test]
    fn test_addable_apps_sorted() {
        let mut form = SettingsForm::default();
        form.add_app("grafana");
        assert_eq!(addable_apps(&data(), &form), vec!["Autoalerts", "nodes"]);
    }

    #[test]
    fn test_unsubscribe_drops_every_priority() {
        let user: User = serde_json::from_value(json!({
            "name": "alice", "modes": {"high": "call"},
            "per_app_modes": {"grafana": {"high": "sms"}}
        }))
        .unwrap();
        let dto = unsubscribe_dto(&user, &data(), "nodes");
        assert_eq!(dto.per_app_modes["nodes"]["high"], DROP_MODE);
        assert_eq!(dto.per_app_modes["nodes"]["low"], DROP_MODE);
        assert_eq!(dto.per_app_modes["grafana"]["high"], "sms");
        assert_eq!(dto.modes["high"], "call");
    }

    #[test]
    fn test_reprioritization_rule() {
        let mut draft = ReprioritizationDraft::new(&data());
        assert_eq!(draft.dst_mode, "sms");
        assert!(draft.to_rule().is_err());
        draft.count = "3".into();
        draft.duration_minutes = "90".into();
        assert_eq!(
            draft.to_rule().unwrap_err(),
            "Duration must be between 1 and 60 minutes"
        );
        draft.duration_minutes = "5".into();
        let rule = draft.to_rule().unwrap();
        assert_eq!(rule.duration, 300);
        assert_eq!(rule.count, 3);
    }

    #[test]
    fn test_timezone_options() {
        let zones = vec!["UTC".to_string()];
        assert_eq!(timezone_options(None, &zones)[0].1, "Browser Default");
        assert_eq!(timezone_options(Some("UTC"), &zones).len(), 1);
    }

    fn category(app: &str, name: &str, mode: &str) -> NotificationCategory {
        NotificationCategory {
            application: app.into(),
            name: name.into(),
            description: format!("{} alerts", name),
            mode: mode.into(),
        }
    }

    #[test]
    fn test_overrides_grouped_per_app() {
        let rows: Vec<CategoryOverride> = serde_json::from_value(json!([
            {"application": "nodes", "category": "disk", "mode": "drop"},
            {"application": "nodes", "category": "cpu", "mode": "sms"},
            {"application": "grafana", "category": "panel", "mode": "email"}
        ]))
        .unwrap();
        let grouped = overrides_by_app(&rows);
        assert_eq!(grouped.keys().collect::<Vec<_>>(), vec!["grafana", "nodes"]);
        assert_eq!(grouped["nodes"]["disk"], "drop");
        assert_eq!(grouped["nodes"].len(), 2);
    }

    #[test]
    fn test_category_apps_unique_sorted() {
        let all = vec![
            category("nodes", "disk", "email"),
            category("grafana", "panel", "sms"),
            category("nodes", "cpu", "sms"),
        ];
        assert_eq!(category_apps(&all), vec!["grafana", "nodes"]);
    }

    #[test]
    fn test_category_editor_applies_overrides() {
        let categories = vec![category("nodes", "disk", "email"), category("nodes", "cpu", "sms")];
        let overrides = CategoryModes::from([("disk".to_string(), "drop".to_string())]);
        let mut editor = CategoryEditor::new("nodes", &categories, Some(&overrides));
        assert_eq!(editor.rows[0].mode, "drop");
        assert_eq!(editor.rows[1].mode, "sms");
        assert_eq!(editor.rows[1].description, "cpu alerts");

        editor.set_mode("cpu", "call");
        editor.set_mode("missing", "call");
        assert_eq!(
            editor.modes(),
            CategoryModes::from([
                ("cpu".to_string(), "call".to_string()),
                ("disk".to_string(), "drop".to_string()),
            ])
        );
        assert_eq!(CategoryEditor::new("nodes", &categories, None).rows[0].mode, "email");
    }

    #[test]
    fn test_category_mode_options_add_drop() {
        assert_eq!(category_mode_options(&data()), vec!["sms", "email", "call", "drop"]);
    }
}

//! Application settings model.
//!
//! Права считаются один раз при загрузке из bootstrap-данных; сервер всё
//! равно проверяет их сам, UI лишь прячет недоступные элементы.

use crate::shared::summary_template::validate_template;
use crate::shared::validation::{add_unique, is_valid_email, normalize_json};
use contracts::domain::a005_application::aggregate::{
    ApplicationQuota, ApplicationUpdateDto, EmailIncidents, NotificationCategory,
};
use contracts::shared::app_data::ApplicationInfo;
use std::collections::BTreeMap;

pub const INVALID_EMAIL: &str =
    "Email address is invalid. Please make sure it is formatted correctly.";

/// What the current user may do on the page
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AppFlags {
    pub is_admin: bool,
    pub is_owner: bool,
}

impl AppFlags {
    pub fn new(app: &ApplicationInfo, user: &str, is_admin: bool) -> Self {
        Self {
            is_admin,
            is_owner: app.owners.iter().any(|o| o == user),
        }
    }

    /// Templates, variables, owners, keys, email incidents, dangerous actions
    pub fn is_editable(&self) -> bool {
        self.is_admin || self.is_owner
    }

    pub fn can_edit_supported_modes(&self) -> bool {
        self.is_admin
    }

    pub fn can_edit_quota(&self) -> bool {
        self.is_admin
    }

    /// Non-admins cannot remove themselves
    pub fn can_remove_owner(&self, owner: &str, user: &str) -> bool {
        self.is_admin || owner != user
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ApplicationForm {
    pub name: String,
    pub context_template: String,
    pub summary_template: String,
    pub mobile_template: String,
    pub sample_context: String,
    pub variables: Vec<String>,
    pub owners: Vec<String>,
    pub supported_modes: Vec<String>,
    /// priority → mode
    pub default_modes: BTreeMap<String, String>,
    pub title_variable: Option<String>,
    pub email_incidents: EmailIncidents,
    pub quota: QuotaForm,
    pub categories: Vec<NotificationCategory>,
}

/// Quota inputs as typed; durations in minutes
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QuotaForm {
    pub hard_threshold: String,
    pub soft_threshold: String,
    pub hard_duration: String,
    pub soft_duration: String,
    pub plan_name: String,
    pub target_name: String,
}

/// Seconds the sender waits between quota notifications
pub const QUOTA_WAIT_TIME: i64 = 3600;

/// What saving the quota section does
#[derive(Debug, Clone, PartialEq)]
pub enum QuotaChange {
    Delete,
    Save(ApplicationQuota),
}

impl QuotaForm {
    pub fn from_quota(quota: &ApplicationQuota) -> Self {
        let number = |v: Option<i64>| v.map(|v| v.to_string()).unwrap_or_default();
        let minutes = |v: Option<i64>| v.map(|v| (v / 60).to_string()).unwrap_or_default();
        Self {
            hard_threshold: number(quota.hard_quota_threshold),
            soft_threshold: number(quota.soft_quota_threshold),
            hard_duration: minutes(quota.hard_quota_duration),
            soft_duration: minutes(quota.soft_quota_duration),
            plan_name: quota.plan_name.clone().unwrap_or_default(),
            target_name: quota.target_name.clone().unwrap_or_default(),
        }
    }

    /// Blank and `0` inputs count as unset; nothing set deletes the quota
    pub fn change(&self) -> Result<QuotaChange, String> {
        fn set(value: &str) -> Option<&str> {
            let value = value.trim();
            (!value.is_empty() && value != "0").then_some(value)
        }
        fn number(value: &str, label: &str) -> Result<Option<i64>, String> {
            set(value)
                .map(|v| v.parse::<i64>().map_err(|_| format!("Invalid quota value: {}", label)))
                .transpose()
        }

        let quota = ApplicationQuota {
            hard_quota_threshold: number(&self.hard_threshold, "hard quota threshold")?,
            soft_quota_threshold: number(&self.soft_threshold, "soft quota threshold")?,
            hard_quota_duration: number(&self.hard_duration, "hard quota duration")?.map(|m| m * 60),
            soft_quota_duration: number(&self.soft_duration, "soft quota duration")?.map(|m| m * 60),
            plan_name: set(&self.plan_name).map(str::to_string),
            target_name: set(&self.target_name).map(str::to_string),
            wait_time: None,
        };
        if quota == ApplicationQuota::default() {
            return Ok(QuotaChange::Delete);
        }
        Ok(QuotaChange::Save(ApplicationQuota {
            wait_time: Some(QUOTA_WAIT_TIME),
            ..quota
        }))
    }
}

impl ApplicationForm {
    pub fn from_info(app: &ApplicationInfo, email_incidents: EmailIncidents) -> Self {
        Self {
            name: app.name.clone(),
            context_template: app.context_template.clone().unwrap_or_default(),
            summary_template: app.summary_template.clone().unwrap_or_default(),
            mobile_template: app.mobile_template.clone().unwrap_or_default(),
            sample_context: app.sample_context.clone().unwrap_or_default(),
            variables: app.variables.clone(),
            owners: app.owners.clone(),
            supported_modes: app.supported_modes.clone(),
            default_modes: app.default_modes.clone(),
            title_variable: app.title_variable.clone(),
            email_incidents,
            quota: QuotaForm::default(),
            categories: Vec::new(),
        }
    }

    /// Same name twice replaces the category
    pub fn add_category(&mut self, name: &str, description: &str, mode: &str) -> Result<(), String> {
        let name = name.trim();
        if name.is_empty() {
            return Err("Cannot add empty category".to_string());
        }
        if mode.is_empty() {
            return Err("Pick a default mode for the category".to_string());
        }
        self.categories.retain(|c| c.name != name);
        self.categories.push(NotificationCategory {
            application: self.name.clone(),
            name: name.to_string(),
            description: description.trim().to_string(),
            mode: mode.to_string(),
        });
        Ok(())
    }

    pub fn remove_category(&mut self, name: &str) {
        self.categories.retain(|c| c.name != name);
    }

    pub fn add_variable(&mut self, variable: &str) -> Result<(), String> {
        add_unique(&mut self.variables, variable, "variable")
    }

    pub fn remove_variable(&mut self, variable: &str) {
        self.variables.retain(|v| v != variable);
        if self.title_variable.as_deref() == Some(variable) {
            self.title_variable = None;
        }
    }

    pub fn add_owner(&mut self, owner: &str) -> Result<(), String> {
        add_unique(&mut self.owners, owner, "owner")
    }

    pub fn remove_owner(&mut self, owner: &str) {
        self.owners.retain(|o| o != owner);
    }

    pub fn toggle_mode(&mut self, mode: &str, on: bool) {
        if on {
            if !self.supported_modes.iter().any(|m| m == mode) {
                self.supported_modes.push(mode.to_string());
            }
        } else {
            self.supported_modes.retain(|m| m != mode);
        }
    }

    /// Same address twice replaces the plan
    pub fn add_email_incident(&mut self, email: &str, plan: &str) -> Result<(), String> {
        let email = email.trim();
        let plan = plan.trim();
        if email.is_empty() {
            return Err("Cannot add empty email".to_string());
        }
        if !is_valid_email(email) {
            return Err(INVALID_EMAIL.to_string());
        }
        if plan.is_empty() {
            return Err("Cannot add empty plan".to_string());
        }
        self.email_incidents.insert(email.to_string(), plan.to_string());
        Ok(())
    }

    pub fn add_default_mode(&mut self, priority: &str, mode: &str) -> Result<(), String> {
        if priority.is_empty() || mode.is_empty() {
            return Err("Pick both a priority and a mode".to_string());
        }
        self.default_modes.insert(priority.to_string(), mode.to_string());
        Ok(())
    }
}

/// Builds the `PUT` body. Blank sample context is sent as `{}`; default modes
/// that point to a mode no longer supported are dropped.
pub fn to_update_dto(form: &ApplicationForm, flags: AppFlags) -> Result<ApplicationUpdateDto, String> {
    for (field, template) in [
        ("context_template", &form.context_template),
        ("summary_template", &form.summary_template),
        ("mobile_template", &form.mobile_template),
    ] {
        validate_template(template)
            .map_err(|e| format!("Invalid HandleBars syntax for {}.\n{}", field, e))?;
    }
    let sample_context = normalize_json(&form.sample_context)
        .map_err(|e| format!("Invalid JSON syntax for sample context.\n{}", e))?;

    let mut default_modes = form.default_modes.clone();
    if flags.can_edit_supported_modes() {
        default_modes.retain(|_, mode| form.supported_modes.contains(mode));
    }

    Ok(ApplicationUpdateDto {
        context_template: form.context_template.clone(),
        summary_template: form.summary_template.clone(),
        mobile_template: form.mobile_template.clone(),
        sample_context,
        variables: form.variables.clone(),
        owners: form.owners.clone(),
        supported_modes: form.supported_modes.clone(),
        default_modes,
        title_variable: form.title_variable.clone().filter(|v| !v.is_empty()),
    })
}

/// Rename box value; `None` when nothing would change
pub fn rename_target(current: &str, typed: &str) -> Option<String> {
    let name = typed.trim();
    (!name.is_empty() && name != current).then(|| name.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn app() -> ApplicationInfo {
        serde_json::from_value(json!({
            "name": "nodes",
            "variables": ["host", "title"],
            "owners": ["bob"],
            "supported_modes": ["sms", "email"],
            "default_modes": {"high": "sms", "low": "call"},
            "title_variable": "title"
        }))
        .unwrap()
    }

    fn form() -> ApplicationForm {
        ApplicationForm::from_info(&app(), EmailIncidents::new())
    }

    #[test]
    fn test_flags() {
        let owner = AppFlags::new(&app(), "bob", false);
        assert!(owner.is_editable());
        assert!(!owner.can_edit_supported_modes());
        assert!(!owner.can_remove_owner("bob", "bob"));
        assert!(owner.can_remove_owner("carol", "bob"));

        let stranger = AppFlags::new(&app(), "alice", false);
        assert!(!stranger.is_editable());

        let admin = AppFlags::new(&app(), "bob", true);
        assert!(admin.can_edit_supported_modes());
        assert!(admin.can_remove_owner("bob", "bob"));
    }

    #[test]
    fn test_variables_and_owners() {
        let mut f = form();
        assert_eq!(f.add_variable("").unwrap_err(), "Cannot add empty variable");
        assert_eq!(
            f.add_owner("bob").unwrap_err(),
            "That owner \"bob\" already exists"
        );
        f.remove_variable("title");
        assert_eq!(f.title_variable, None);
        assert_eq!(f.variables, vec!["host"]);
    }

    #[test]
    fn test_email_incidents() {
        let mut f = form();
        assert_eq!(f.add_email_incident("nope", "db").unwrap_err(), INVALID_EMAIL);
        assert!(f.add_email_incident("db@example.com", "db-plan").is_ok());
        assert!(f.add_email_incident("db@example.com", "other").is_ok());
        assert_eq!(f.email_incidents.len(), 1);
        assert_eq!(f.email_incidents["db@example.com"], "other");
    }

    #[test]
    fn test_dto_sample_context() {
        let mut f = form();
        let dto = to_update_dto(&f, AppFlags::default()).unwrap();
        assert_eq!(dto.sample_context, "{}");

        f.sample_context = "{broken".into();
        let err = to_update_dto(&f, AppFlags::default()).unwrap_err();
        assert!(err.starts_with("Invalid JSON syntax for sample context.\n"));
    }

    #[test]
    fn test_dto_rejects_broken_templates() {
        let mut f = form();
        f.summary_template = "{{#each context.items}}{{this}},{{/each}}".into();
        f.context_template = "{{#if context.host}}{{context.host}}{{else}}none{{/if}}".into();
        assert!(to_update_dto(&f, AppFlags::default()).is_ok());

        f.mobile_template = "{{#if context.host}}unclosed".into();
        let err = to_update_dto(&f, AppFlags::default()).unwrap_err();
        assert!(err.starts_with("Invalid HandleBars syntax for mobile_template.\n"));
    }

    #[test]
    fn test_dto_drops_unsupported_default_modes_for_admin() {
        let f = form();
        let admin = AppFlags {
            is_admin: true,
            is_owner: false,
        };
        let dto = to_update_dto(&f, admin).unwrap();
        assert_eq!(dto.default_modes.len(), 1);
        assert_eq!(dto.default_modes["high"], "sms");

        let owner = AppFlags {
            is_admin: false,
            is_owner: true,
        };
        assert_eq!(to_update_dto(&f, owner).unwrap().default_modes.len(), 2);
    }

    #[test]
    fn test_rename_target() {
        assert_eq!(rename_target("nodes", "  "), None);
        assert_eq!(rename_target("nodes", " nodes "), None);
        assert_eq!(rename_target("nodes", " hosts "), Some("hosts".into()));
    }

    #[test]
    fn test_quota_round_trip_in_minutes() {
        let quota = ApplicationQuota {
            hard_quota_threshold: Some(100),
            soft_quota_threshold: Some(50),
            hard_quota_duration: Some(3600),
            soft_quota_duration: Some(600),
            plan_name: Some("quota-plan".into()),
            target_name: Some("ops".into()),
            wait_time: Some(QUOTA_WAIT_TIME),
        };
        let form = QuotaForm::from_quota(&quota);
        assert_eq!(form.hard_duration, "60");
        assert_eq!(form.soft_duration, "10");
        assert_eq!(form.change(), Ok(QuotaChange::Save(quota)));
    }

    #[test]
    fn test_blank_quota_deletes() {
        assert_eq!(QuotaForm::default().change(), Ok(QuotaChange::Delete));
        let zeros = QuotaForm {
            hard_threshold: "0".into(),
            soft_duration: " 0 ".into(),
            ..Default::default()
        };
        assert_eq!(zeros.change(), Ok(QuotaChange::Delete));

        let broken = QuotaForm {
            hard_threshold: "lots".into(),
            ..Default::default()
        };
        assert_eq!(
            broken.change(),
            Err("Invalid quota value: hard quota threshold".to_string())
        );
    }

    #[test]
    fn test_categories_replace_by_name() {
        let mut f = form();
        f.add_category("disk", "Disk alerts", "email").unwrap();
        f.add_category(" disk ", "Disk pages", "sms").unwrap();
        assert_eq!(f.categories.len(), 1);
        assert_eq!(f.categories[0].mode, "sms");
        assert_eq!(f.categories[0].description, "Disk pages");
        assert!(f.add_category("", "x", "sms").is_err());
        assert!(f.add_category("cpu", "", "").is_err());

        f.remove_category("disk");
        assert!(f.categories.is_empty());
    }

    #[test]
    fn test_quota_is_admin_only() {
        assert!(!AppFlags::new(&app(), "bob", false).can_edit_quota());
        assert!(AppFlags::new(&app(), "alice", true).can_edit_quota());
    }
}

use crate::shared::serde_utils::bool_from_any;
use serde::{Deserialize, Serialize};

/// Данные, которые сервер встраивает в страницу (`window.appData`)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppData {
    #[serde(default)]
    pub user: String,
    #[serde(default, deserialize_with = "bool_from_any")]
    pub user_admin: bool,
    #[serde(default)]
    pub priorities: Vec<Priority>,
    #[serde(default)]
    pub target_roles: Vec<TargetRole>,
    #[serde(default)]
    pub applications: Vec<ApplicationInfo>,
    #[serde(default)]
    pub templates: Vec<TemplateRef>,
    #[serde(default)]
    pub modes: Vec<String>,
    #[serde(default)]
    pub user_settings: UserSettings,
    /// Optional override of the list row limit
    #[serde(default)]
    pub table_entry_limit: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Priority {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub default_mode: Option<String>,
}

/// Роль получателя в шаге плана. `url_type` - сегмент в `/v0/targets/<type>`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetRole {
    pub name: String,
    #[serde(rename = "type")]
    pub url_type: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ApplicationInfo {
    pub name: String,
    #[serde(default)]
    pub variables: Vec<String>,
    #[serde(default)]
    pub required_variables: Vec<String>,
    #[serde(default)]
    pub owners: Vec<String>,
    #[serde(default)]
    pub supported_modes: Vec<String>,
    #[serde(default)]
    pub sample_context: Option<String>,
    #[serde(default)]
    pub summary_template: Option<String>,
    #[serde(default)]
    pub context_template: Option<String>,
    #[serde(default)]
    pub mobile_template: Option<String>,
    #[serde(default)]
    pub title_variable: Option<String>,
    #[serde(default)]
    pub default_modes: std::collections::BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateRef {
    pub name: String,
    #[serde(default, deserialize_with = "bool_from_any")]
    pub active: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserSettings {
    #[serde(default)]
    pub timezone: Option<String>,
}

impl AppData {
    /// Case-insensitive application lookup
    pub fn find_application(&self, name: &str) -> Option<&ApplicationInfo> {
        let lower = name.to_lowercase();
        self.applications
            .iter()
            .find(|app| app.name.to_lowercase() == lower)
    }

    /// Sorted names of active templates, offered in plan notifications
    pub fn active_template_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .templates
            .iter()
            .filter(|t| t.active)
            .map(|t| t.name.clone())
            .collect();
        names.sort_by_key(|n| n.to_lowercase());
        names
    }

    pub fn priority_names(&self) -> Vec<String> {
        self.priorities.iter().map(|p| p.name.clone()).collect()
    }

    pub fn role_url_type(&self, role: &str) -> Option<&str> {
        self.target_roles
            .iter()
            .find(|r| r.name == role)
            .map(|r| r.url_type.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> AppData {
        serde_json::from_str(
            r#"{
                "user": "alice",
                "user_admin": 0,
                "priorities": [{"name": "urgent"}, {"name": "low"}],
                "target_roles": [{"name": "user", "type": "user"}, {"name": "oncall-primary", "type": "team"}],
                "applications": [{"name": "Autoalerts", "variables": ["title"], "owners": ["bob"]}],
                "templates": [{"name": "zeta", "active": 1}, {"name": "Alpha", "active": true}, {"name": "old", "active": 0}],
                "modes": ["sms", "email", "call"]
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_bootstrap_deserialize() {
        let data = sample();
        assert_eq!(data.user, "alice");
        assert!(!data.user_admin);
        assert_eq!(data.target_roles[1].url_type, "team");
        assert_eq!(data.user_settings.timezone, None);
        assert_eq!(data.table_entry_limit, None);
    }

    #[test]
    fn test_find_application_case_insensitive() {
        let data = sample();
        assert!(data.find_application("autoalerts").is_some());
        assert!(data.find_application("missing").is_none());
    }

    #[test]
    fn test_active_templates_sorted() {
        assert_eq!(sample().active_template_names(), vec!["Alpha", "zeta"]);
    }

    #[test]
    fn test_role_url_type() {
        let data = sample();
        assert_eq!(data.role_url_type("oncall-primary"), Some("team"));
        assert_eq!(data.role_url_type("nope"), None);
    }
}

use crate::shared::serde_utils::bool_from_any;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// priority → mode
pub type PriorityModes = BTreeMap<String, String>;

/// `GET /v0/users/<name>`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub name: String,
    #[serde(default, deserialize_with = "bool_from_any")]
    pub admin: bool,
    #[serde(default)]
    pub modes: PriorityModes,
    #[serde(default)]
    pub per_app_modes: BTreeMap<String, PriorityModes>,
    #[serde(default)]
    pub teams: Vec<String>,
    /// mode → destination
    #[serde(default)]
    pub contacts: BTreeMap<String, String>,
    #[serde(default)]
    pub template_overrides: Vec<String>,
}

impl User {
    pub fn has_sms_override(&self) -> bool {
        self.template_overrides.iter().any(|m| m == "sms")
    }
}

/// Тело `POST /v0/users/modes/<name>`.
/// Глобальные режимы лежат на верхнем уровне рядом с `per_app_modes`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserModesDto {
    #[serde(flatten)]
    pub modes: PriorityModes,
    pub per_app_modes: BTreeMap<String, PriorityModes>,
}

/// `PUT /v0/users/settings/<name>`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimezoneDto {
    pub timezone: String,
}

/// `POST /v0/users/overrides/<name>`, value is `enabled` or `disabled`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateOverridesDto {
    pub template_overrides: BTreeMap<String, String>,
}

impl TemplateOverridesDto {
    pub fn sms(enabled: bool) -> Self {
        let value = if enabled { "enabled" } else { "disabled" };
        Self {
            template_overrides: BTreeMap::from([("sms".to_string(), value.to_string())]),
        }
    }
}

/// `GET|POST /v0/users/reprioritization/<name>`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReprioritizationRule {
    pub src_mode: String,
    pub dst_mode: String,
    pub count: i64,
    /// Seconds, 60..=3600
    pub duration: i64,
}

/// `GET /v0/users/<name>/categories`: one row per overridden category.
/// Saving goes per application as `category → mode`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryOverride {
    pub application: String,
    pub category: String,
    pub mode: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_modes_flatten() {
        let dto = UserModesDto {
            modes: BTreeMap::from([("high".to_string(), "sms".to_string())]),
            per_app_modes: BTreeMap::from([(
                "app".to_string(),
                BTreeMap::from([("high".to_string(), "drop".to_string())]),
            )]),
        };
        let v = serde_json::to_value(&dto).unwrap();
        assert_eq!(v["high"], "sms");
        assert_eq!(v["per_app_modes"]["app"]["high"], "drop");
    }

    #[test]
    fn test_user_deserialize() {
        let u: User = serde_json::from_str(
            r#"{"name": "alice", "admin": false, "modes": {"urgent": "call"},
                "per_app_modes": {}, "teams": [], "contacts": {"email": "a@b.c"},
                "template_overrides": ["sms"]}"#,
        )
        .unwrap();
        assert!(u.has_sms_override());
        assert_eq!(u.modes["urgent"], "call");
    }
}

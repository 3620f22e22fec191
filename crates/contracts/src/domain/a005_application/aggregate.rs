use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// email address → plan name
pub type EmailIncidents = BTreeMap<String, String>;

/// Тело `PUT /v0/applications/<name>`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ApplicationUpdateDto {
    pub context_template: String,
    pub summary_template: String,
    pub mobile_template: String,
    pub sample_context: String,
    pub variables: Vec<String>,
    pub owners: Vec<String>,
    pub supported_modes: Vec<String>,
    pub default_modes: BTreeMap<String, String>,
    pub title_variable: Option<String>,
}

/// `GET /v0/applications/<name>/key` and `/secondary`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ApplicationKey {
    #[serde(default)]
    pub key: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenameApplicationDto {
    pub new_name: String,
}

/// `POST /v0/applications/`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewApplicationDto {
    pub name: String,
}

/// `GET /v0/applications/<name>/quota`. Пустой объект означает «квоты нет».
/// Тот же объект уходит в `POST`, незаданные поля не сериализуются.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ApplicationQuota {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hard_quota_threshold: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub soft_quota_threshold: Option<i64>,
    /// Seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hard_quota_duration: Option<i64>,
    /// Seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub soft_quota_duration: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plan_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_name: Option<String>,
    /// Seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wait_time: Option<i64>,
}

impl ApplicationQuota {
    pub fn is_set(&self) -> bool {
        self.hard_quota_threshold.is_some() || self.soft_quota_threshold.is_some()
    }
}

/// Custom notification category of an application.
///
/// `GET /v0/categories/<app>` returns them with `application`; the owner
/// saves the full list back with `POST` and without it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NotificationCategory {
    #[serde(default, skip_serializing)]
    pub application: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Default mode of the category
    #[serde(default)]
    pub mode: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_quota() {
        let q: ApplicationQuota = serde_json::from_str("{}").unwrap();
        assert!(!q.is_set());
        let q: ApplicationQuota =
            serde_json::from_str(r#"{"hard_quota_threshold": 10, "hard_quota_duration": 600}"#)
                .unwrap();
        assert!(q.is_set());
    }

    #[test]
    fn test_null_key() {
        let k: ApplicationKey = serde_json::from_str(r#"{"key": null}"#).unwrap();
        assert_eq!(k.key, None);
    }

    #[test]
    fn test_quota_body_skips_unset() {
        let q = ApplicationQuota {
            hard_quota_threshold: Some(10),
            wait_time: Some(3600),
            ..Default::default()
        };
        assert_eq!(
            serde_json::to_value(&q).unwrap(),
            serde_json::json!({"hard_quota_threshold": 10, "wait_time": 3600})
        );
    }

    #[test]
    fn test_category_body_drops_application() {
        let c: NotificationCategory = serde_json::from_str(
            r#"{"application": "nodes", "name": "disk", "description": "Disk alerts", "mode": "email"}"#,
        )
        .unwrap();
        assert_eq!(c.application, "nodes");
        assert_eq!(
            serde_json::to_value(&c).unwrap(),
            serde_json::json!({"name": "disk", "description": "Disk alerts", "mode": "email"})
        );
    }
}

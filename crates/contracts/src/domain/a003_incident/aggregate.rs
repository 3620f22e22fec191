use crate::shared::serde_utils::bool_from_any;
use serde::{Deserialize, Serialize};

/// Поля, которые список инцидентов запрашивает у API
pub const INCIDENT_LIST_FIELDS: &[&str] = &[
    "id",
    "owner",
    "application",
    "plan",
    "plan_id",
    "created",
    "updated",
    "active",
    "current_step",
];

/// Строка списка инцидентов (`GET /v0/incidents/`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IncidentSummary {
    pub id: i64,
    #[serde(default)]
    pub owner: Option<String>,
    #[serde(default)]
    pub application: String,
    #[serde(default)]
    pub plan: String,
    #[serde(default)]
    pub plan_id: Option<i64>,
    #[serde(default)]
    pub created: i64,
    #[serde(default)]
    pub updated: Option<i64>,
    #[serde(default, deserialize_with = "bool_from_any")]
    pub active: bool,
    #[serde(default)]
    pub current_step: i64,
}

/// Context row used by the summary column
/// (`GET /v0/incidents?fields=id&fields=context&fields=application&id__in=..`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IncidentContext {
    pub id: i64,
    #[serde(default)]
    pub application: String,
    #[serde(default)]
    pub context: serde_json::Value,
}

/// Message sent as part of an incident
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IncidentStep {
    pub id: i64,
    /// Target name
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub mode: String,
    #[serde(default)]
    pub priority: String,
    #[serde(default)]
    pub created: Option<i64>,
    #[serde(default)]
    pub sent: Option<i64>,
    #[serde(default)]
    pub step: i64,
    #[serde(default, deserialize_with = "bool_from_any")]
    pub mode_changed: bool,
    #[serde(default, deserialize_with = "bool_from_any")]
    pub target_changed: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub author: String,
    pub content: String,
    #[serde(default)]
    pub created: Option<f64>,
}

/// `POST /v0/incidents/<id>/comments`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewCommentDto {
    pub author: String,
    pub content: String,
}

/// `GET /v0/incidents/<id>`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Incident {
    pub id: i64,
    #[serde(default)]
    pub plan: String,
    #[serde(default)]
    pub plan_id: Option<i64>,
    #[serde(default)]
    pub created: i64,
    #[serde(default)]
    pub updated: Option<i64>,
    #[serde(default)]
    pub context: serde_json::Value,
    #[serde(default)]
    pub owner: Option<String>,
    #[serde(default)]
    pub application: String,
    #[serde(default)]
    pub current_step: i64,
    #[serde(default, deserialize_with = "bool_from_any")]
    pub active: bool,
    #[serde(default)]
    pub steps: Vec<IncidentStep>,
    #[serde(default)]
    pub comments: Vec<Comment>,
}

/// `POST /v0/incidents/<id>` - `owner: None` unclaims
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClaimDto {
    pub owner: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClaimResult {
    pub incident_id: i64,
    #[serde(default)]
    pub owner: Option<String>,
    #[serde(default, deserialize_with = "bool_from_any")]
    pub active: bool,
}

/// `POST /v0/incidents/claim`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClaimAllDto {
    pub owner: String,
    pub incident_ids: Vec<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClaimAllResult {
    #[serde(default)]
    pub claimed: Vec<i64>,
    #[serde(default)]
    pub unclaimed: Vec<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DynamicTarget {
    pub role: String,
    pub target: String,
}

/// `POST /v0/incidents` - ответ: id нового инцидента
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewIncidentDto {
    pub application: String,
    pub context: serde_json::Value,
    pub plan: String,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub dynamic_targets: Vec<DynamicTarget>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_incident_deserialize() {
        let inc: Incident = serde_json::from_str(
            r#"{"updated": 1492057026, "plan_id": 48271, "created": 1492055912,
                "application": "Alert manager",
                "steps": [{"name": "alice", "created": 1492055953, "target_changed": 0,
                           "mode_changed": 0, "priority": "urgent", "step": 1, "mode": "sms",
                           "id": 25443689, "sent": 1492055957}],
                "plan": "test-plan", "context": {"number": 1, "str": "hello"},
                "owner": "alice", "active": 0, "id": 1, "current_step": 1}"#,
        )
        .unwrap();
        assert!(!inc.active);
        assert_eq!(inc.steps.len(), 1);
        assert!(inc.comments.is_empty());
        assert_eq!(inc.context["str"], "hello");
    }

    #[test]
    fn test_unclaim_serializes_null_owner() {
        let json = serde_json::to_string(&ClaimDto { owner: None }).unwrap();
        assert_eq!(json, r#"{"owner":null}"#);
    }
}

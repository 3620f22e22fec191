use crate::shared::serde_utils::{bool_from_any, opt_bool_from_any, string_or_null};
use serde::{Deserialize, Serialize};

// ============================================================================
// List rows
// ============================================================================

/// Строка списка планов (`GET /v0/plans`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanSummary {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub created: i64,
    #[serde(default)]
    pub creator: String,
    #[serde(default, deserialize_with = "bool_from_any")]
    pub active: bool,
}

/// Version entry (`GET /v0/plans?name=..&fields=id&fields=created&fields=creator`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanVersion {
    pub id: i64,
    #[serde(default)]
    pub created: i64,
    #[serde(default)]
    pub creator: String,
}

// ============================================================================
// Single plan
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Plan {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub created: i64,
    #[serde(default)]
    pub creator: String,
    #[serde(default, deserialize_with = "bool_from_any")]
    pub active: bool,
    /// Seconds
    #[serde(default)]
    pub threshold_window: i64,
    #[serde(default)]
    pub threshold_count: i64,
    /// Seconds
    #[serde(default)]
    pub aggregation_window: i64,
    /// Seconds
    #[serde(default)]
    pub aggregation_reset: i64,
    #[serde(default)]
    pub tracking_type: Option<String>,
    #[serde(default)]
    pub tracking_key: Option<String>,
    #[serde(default)]
    pub tracking_template: Option<serde_json::Value>,
    #[serde(default)]
    pub steps: Vec<Vec<PlanNotification>>,
}

impl Plan {
    /// A plan is dynamic when any notification targets a dynamic index.
    /// Dynamic plans cannot be used for re-escalation.
    pub fn is_dynamic(&self) -> bool {
        self.steps
            .iter()
            .flatten()
            .any(|n| n.dynamic_index.is_some())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanNotification {
    #[serde(default)]
    pub id: Option<i64>,
    /// `null` in dynamic plans
    #[serde(default, deserialize_with = "string_or_null")]
    pub role: String,
    #[serde(default)]
    pub target: Option<String>,
    #[serde(default)]
    pub priority: String,
    /// Seconds between repeats
    #[serde(default)]
    pub wait: i64,
    /// Number of repeats after the first message
    #[serde(default)]
    pub repeat: i64,
    #[serde(default)]
    pub template: String,
    #[serde(default)]
    pub dynamic_index: Option<i64>,
    #[serde(default, deserialize_with = "opt_bool_from_any", skip_serializing)]
    pub optional: Option<bool>,
}

// ============================================================================
// Create
// ============================================================================

/// Тело `POST /v0/plans`. Сервер отвечает путём новой версии плана.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewPlanDto {
    pub creator: String,
    pub name: String,
    pub description: String,
    pub threshold_window: i64,
    pub threshold_count: i64,
    pub aggregation_window: i64,
    pub aggregation_reset: i64,
    pub steps: Vec<Vec<NewPlanNotification>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tracking_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tracking_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tracking_template: Option<serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewPlanNotification {
    /// Absent in dynamic plans, the incident supplies role and target
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    pub priority: String,
    pub wait: i64,
    pub repeat: i64,
    pub template: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dynamic_index: Option<i64>,
}

/// `POST /v0/plans/<id>` and `POST /v0/templates/<id>` activation body
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ActivateDto {
    pub active: u8,
}

impl ActivateDto {
    pub fn activate() -> Self {
        Self { active: 1 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plan_deserialize() {
        let plan: Plan = serde_json::from_str(
            r#"{
                "id": 42, "name": "oncall", "description": null, "created": 1492055912,
                "creator": "alice", "active": 1, "threshold_window": 900, "threshold_count": 10,
                "aggregation_window": 300, "aggregation_reset": 300,
                "tracking_type": null, "tracking_key": null, "tracking_template": null,
                "steps": [[{"id": 1, "role": "user", "target": "alice", "priority": "urgent",
                            "wait": 600, "repeat": 1, "template": "default", "dynamic_index": null}]]
            }"#,
        )
        .unwrap();
        assert!(plan.active);
        assert_eq!(plan.steps[0][0].repeat, 1);
        assert!(!plan.is_dynamic());
    }

    #[test]
    fn test_dynamic_plan() {
        let plan: Plan = serde_json::from_str(
            r#"{"id": 1, "name": "dyn", "steps": [[{"role": "user", "priority": "low",
                "wait": 0, "repeat": 0, "template": "t", "dynamic_index": 0}]]}"#,
        )
        .unwrap();
        assert!(plan.is_dynamic());
    }

    #[test]
    fn test_new_plan_skips_empty_tracking() {
        let dto = NewPlanDto {
            creator: "alice".into(),
            name: "p".into(),
            description: String::new(),
            threshold_window: 900,
            threshold_count: 10,
            aggregation_window: 300,
            aggregation_reset: 300,
            steps: vec![],
            tracking_type: None,
            tracking_key: None,
            tracking_template: None,
        };
        let json = serde_json::to_string(&dto).unwrap();
        assert!(!json.contains("tracking"));
    }
}

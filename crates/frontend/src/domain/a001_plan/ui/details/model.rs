//! Plan editor model and its mapping to and from the API.
//!
//! Форма хранит минуты и `count` (сколько раз отправить), API хранит
//! секунды и `repeat` (сколько повторов после первого сообщения).

use crate::shared::validation::FieldErrors;
use contracts::domain::a001_plan::aggregate::{NewPlanDto, NewPlanNotification, Plan};
use contracts::domain::a003_incident::aggregate::{DynamicTarget, NewIncidentDto};
use contracts::shared::app_data::AppData;

/// Longest allowed plan, minutes
pub const MAX_PLAN_MINUTES: i64 = 1440;

pub const DURATION_EXCEEDED: &str =
    "Maximum plan duration exceeded: plan steps must add up to < 24 hours";

#[derive(Debug, Clone, PartialEq)]
pub struct NotificationForm {
    /// Local key, stable while editing
    pub key: u32,
    pub role: String,
    pub target: String,
    pub priority: String,
    /// Minutes
    pub wait: String,
    pub count: String,
    pub template: String,
    /// Slot of the incident's dynamic targets, used instead of role/target
    /// when the plan is dynamic
    pub dynamic_index: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StepForm {
    pub key: u32,
    pub notifications: Vec<NotificationForm>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlanForm {
    pub id: Option<i64>,
    pub name: String,
    pub description: String,
    pub creator: String,
    pub created: Option<i64>,
    pub active: bool,
    /// Minutes
    pub threshold_window: String,
    pub threshold_count: String,
    /// Minutes
    pub aggregation_window: String,
    /// Minutes
    pub aggregation_reset: String,
    pub steps: Vec<StepForm>,
    /// Notifications address `dynamic_targets[i]` of the incident
    pub dynamic: bool,
    pub tracking_type: Option<String>,
    pub tracking_key: Option<String>,
    pub tracking_template: Option<serde_json::Value>,
    next_key: u32,
}

/// 600 → "10", 90 → "1.5"
pub fn minutes(seconds: i64) -> String {
    if seconds % 60 == 0 {
        (seconds / 60).to_string()
    } else {
        format!("{}", seconds as f64 / 60.0)
    }
}

fn parse_number(value: &str) -> Option<f64> {
    value.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

impl PlanForm {
    fn blank_notification(&mut self, role: &str) -> NotificationForm {
        self.next_key += 1;
        NotificationForm {
            key: self.next_key,
            role: role.to_string(),
            target: String::new(),
            priority: String::new(),
            wait: String::new(),
            count: "1".to_string(),
            template: String::new(),
            dynamic_index: "0".to_string(),
        }
    }

    /// New plan: one step with one notification for the first role
    pub fn blank(data: &AppData) -> Self {
        let mut form = Self {
            id: None,
            name: String::new(),
            description: String::new(),
            creator: data.user.clone(),
            created: None,
            active: false,
            threshold_window: minutes(900),
            threshold_count: "10".to_string(),
            aggregation_window: minutes(300),
            aggregation_reset: minutes(300),
            steps: Vec::new(),
            dynamic: false,
            tracking_type: None,
            tracking_key: None,
            tracking_template: None,
            next_key: 0,
        };
        form.add_step(data);
        form
    }

    pub fn from_plan(plan: &Plan) -> Self {
        let mut next_key = 0;
        let mut key = || {
            next_key += 1;
            next_key
        };
        let steps = plan
            .steps
            .iter()
            .map(|step| StepForm {
                key: key(),
                notifications: step
                    .iter()
                    .map(|n| NotificationForm {
                        key: key(),
                        role: n.role.clone(),
                        target: n.target.clone().unwrap_or_default(),
                        priority: n.priority.clone(),
                        wait: minutes(n.wait),
                        count: (n.repeat + 1).to_string(),
                        template: n.template.clone(),
                        dynamic_index: n.dynamic_index.unwrap_or(0).to_string(),
                    })
                    .collect(),
            })
            .collect();

        Self {
            id: Some(plan.id),
            name: plan.name.clone(),
            description: plan.description.clone().unwrap_or_default(),
            creator: plan.creator.clone(),
            created: Some(plan.created),
            active: plan.active,
            threshold_window: minutes(plan.threshold_window),
            threshold_count: plan.threshold_count.to_string(),
            aggregation_window: minutes(plan.aggregation_window),
            aggregation_reset: minutes(plan.aggregation_reset),
            steps,
            dynamic: plan.is_dynamic(),
            tracking_type: plan.tracking_type.clone(),
            tracking_key: plan.tracking_key.clone(),
            tracking_template: plan.tracking_template.clone(),
            next_key,
        }
    }

    pub fn add_step(&mut self, data: &AppData) {
        let role = data
            .target_roles
            .first()
            .map(|r| r.name.clone())
            .unwrap_or_default();
        let notification = self.blank_notification(&role);
        self.next_key += 1;
        self.steps.push(StepForm {
            key: self.next_key,
            notifications: vec![notification],
        });
    }

    pub fn remove_step(&mut self, step: usize) {
        if step < self.steps.len() {
            self.steps.remove(step);
        }
    }

    pub fn add_notification(&mut self, step: usize, data: &AppData) {
        let role = data
            .target_roles
            .first()
            .map(|r| r.name.clone())
            .unwrap_or_default();
        let notification = self.blank_notification(&role);
        if let Some(s) = self.steps.get_mut(step) {
            s.notifications.push(notification);
        }
    }

    pub fn remove_notification(&mut self, step: usize, index: usize) {
        if let Some(s) = self.steps.get_mut(step) {
            if index < s.notifications.len() {
                s.notifications.remove(index);
            }
        }
    }

    pub fn notification_mut(&mut self, step: usize, index: usize) -> Option<&mut NotificationForm> {
        self.steps.get_mut(step)?.notifications.get_mut(index)
    }

    pub fn step_position(&self, step_key: u32) -> Option<usize> {
        self.steps.iter().position(|s| s.key == step_key)
    }

    /// (step index, notification index) of a notification by its keys
    pub fn notification_position(&self, step_key: u32, key: u32) -> Option<(usize, usize)> {
        let step = self.step_position(step_key)?;
        let index = self.steps[step]
            .notifications
            .iter()
            .position(|n| n.key == key)?;
        Some((step, index))
    }

    pub fn find_notification(&self, step_key: u32, key: u32) -> Option<&NotificationForm> {
        let (step, index) = self.notification_position(step_key, key)?;
        self.steps[step].notifications.get(index)
    }

    pub fn find_notification_mut(&mut self, step_key: u32, key: u32) -> Option<&mut NotificationForm> {
        let (step, index) = self.notification_position(step_key, key)?;
        self.notification_mut(step, index)
    }

    pub fn notification_count(&self) -> usize {
        self.steps.iter().map(|s| s.notifications.len()).sum()
    }

    /// How many role/target pairs a test incident of this plan needs
    pub fn dynamic_target_count(&self) -> usize {
        if !self.dynamic {
            return 0;
        }
        self.steps
            .iter()
            .flat_map(|s| &s.notifications)
            .filter_map(|n| dynamic_index(&n.dynamic_index))
            .map(|i| i as usize + 1)
            .max()
            .unwrap_or(0)
    }
}

fn dynamic_index(value: &str) -> Option<i64> {
    value.trim().parse::<i64>().ok().filter(|i| *i >= 0)
}

/// "Dynamic target #2"
pub fn dynamic_label(index: &str) -> String {
    format!("Dynamic target #{}", index.trim())
}

/// Minutes a step takes: the shortest `wait × count` of its
/// notifications, at least 1. `None` for a step without notifications.
pub fn step_time(step: &StepForm) -> Option<f64> {
    let shortest = step
        .notifications
        .iter()
        .map(|n| parse_number(&n.wait).unwrap_or(0.0) * parse_number(&n.count).unwrap_or(0.0))
        .fold(None, |acc: Option<f64>, t| Some(acc.map_or(t, |a| a.min(t))))?;
    Some(if shortest == 0.0 { 1.0 } else { shortest })
}

/// Sum of whole step minutes
pub fn plan_duration(form: &PlanForm) -> i64 {
    form.steps
        .iter()
        .filter_map(step_time)
        .map(|t| t.trunc() as i64)
        .sum()
}

/// Key of a notification input in [`FieldErrors`]
pub fn field_key(step_key: u32, key: u32, field: &str) -> String {
    format!("step-{}-n{}-{}", step_key, key, field)
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlanValidation {
    pub errors: FieldErrors,
    pub duration_exceeded: bool,
}

impl PlanValidation {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty() && !self.duration_exceeded
    }
}

/// Recomputed from scratch on every publish attempt.
pub fn validate(form: &PlanForm) -> PlanValidation {
    let mut errors = FieldErrors::new();
    errors.require("plan-name", "Plan name", &form.name);

    if form.notification_count() == 0 {
        errors.require("plan-steps", "steps/notifications", "");
    }

    for (key, label, value) in [
        ("threshold-window", "threshold window", &form.threshold_window),
        ("threshold-count", "threshold count", &form.threshold_count),
        ("aggregation-window", "aggregation window", &form.aggregation_window),
        ("aggregation-reset", "aggregation reset", &form.aggregation_reset),
    ] {
        if parse_number(value).is_none() {
            errors.require(key, label, "");
        }
    }

    for step in &form.steps {
        for n in &step.notifications {
            let key = |field: &str| field_key(step.key, n.key, field);
            if form.dynamic {
                if dynamic_index(&n.dynamic_index).is_none() {
                    errors.require(key("dynamic_index"), "dynamic target", "");
                }
            } else {
                errors.require(key("role"), "role", &n.role);
                errors.require(key("target"), "target", &n.target);
            }
            errors.require(key("priority"), "priority", &n.priority);
            errors.require(key("template"), "template", &n.template);
            if parse_number(&n.wait).filter(|w| *w >= 0.0).is_none() {
                errors.require(key("wait"), "wait", "");
            }
            if parse_number(&n.count).filter(|c| *c >= 1.0 && c.fract() == 0.0).is_none() {
                errors.require(key("count"), "count", "");
            }
        }
    }

    PlanValidation {
        errors,
        duration_exceeded: plan_duration(form) > MAX_PLAN_MINUTES,
    }
}

fn seconds(minutes: &str) -> i64 {
    (parse_number(minutes).unwrap_or(0.0) * 60.0).round() as i64
}

/// Body of `POST /v0/plans`. Steps without notifications are dropped.
pub fn to_new_plan(form: &PlanForm, creator: &str) -> NewPlanDto {
    NewPlanDto {
        creator: creator.to_string(),
        name: form.name.trim().to_string(),
        description: form.description.clone(),
        threshold_window: seconds(&form.threshold_window),
        threshold_count: parse_number(&form.threshold_count).unwrap_or(0.0) as i64,
        aggregation_window: seconds(&form.aggregation_window),
        aggregation_reset: seconds(&form.aggregation_reset),
        steps: form
            .steps
            .iter()
            .filter(|s| !s.notifications.is_empty())
            .map(|s| {
                s.notifications
                    .iter()
                    .map(|n| NewPlanNotification {
                        role: (!form.dynamic).then(|| n.role.clone()),
                        target: (!form.dynamic).then(|| n.target.trim().to_string()),
                        priority: n.priority.clone(),
                        wait: seconds(&n.wait),
                        repeat: parse_number(&n.count).unwrap_or(1.0) as i64 - 1,
                        template: n.template.clone(),
                        dynamic_index: if form.dynamic { dynamic_index(&n.dynamic_index) } else { None },
                    })
                    .collect()
            })
            .collect(),
        tracking_type: form.tracking_type.clone(),
        tracking_key: form.tracking_key.clone(),
        tracking_template: form.tracking_template.clone(),
    }
}

/// Blank role/target rows for the test incident of a dynamic plan
pub fn test_target_slots(form: &PlanForm, data: &AppData) -> Vec<DynamicTarget> {
    let role = data
        .target_roles
        .first()
        .map(|r| r.name.clone())
        .unwrap_or_default();
    (0..form.dynamic_target_count())
        .map(|_| DynamicTarget {
            role: role.clone(),
            target: String::new(),
        })
        .collect()
}

/// Test incident body: the application's sample context plus one
/// role/target pair per dynamic slot
pub fn test_incident_dto(plan: &str, application: &str, data: &AppData, targets: &[DynamicTarget]) -> NewIncidentDto {
    let context = data
        .find_application(application)
        .and_then(|a| a.sample_context.as_deref())
        .and_then(|c| serde_json::from_str(c).ok())
        .unwrap_or_else(|| serde_json::json!({}));
    NewIncidentDto {
        application: application.to_string(),
        context,
        plan: plan.to_string(),
        dynamic_targets: targets
            .iter()
            .map(|t| DynamicTarget {
                role: t.role.clone(),
                target: t.target.trim().to_string(),
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::shared::app_data::{ApplicationInfo, TargetRole};

    fn data() -> AppData {
        AppData {
            user: "alice".into(),
            target_roles: vec![TargetRole {
                name: "user".into(),
                url_type: "user".into(),
            }],
            ..Default::default()
        }
    }

    fn fetched() -> Plan {
        serde_json::from_str(
            r#"{"id": 42, "name": "db", "created": 1, "creator": "bob", "active": 1,
                "threshold_window": 900, "threshold_count": 10,
                "aggregation_window": 300, "aggregation_reset": 90,
                "steps": [[{"role": "user", "target": "alice", "priority": "urgent",
                            "wait": 600, "repeat": 2, "template": "default"},
                           {"role": "team", "target": "ops", "priority": "high",
                            "wait": 300, "repeat": 0, "template": "default"}]]}"#,
        )
        .unwrap()
    }

    fn filled(data: &AppData) -> PlanForm {
        let mut form = PlanForm::blank(data);
        form.name = "db".into();
        let n = form.notification_mut(0, 0).unwrap();
        n.target = "alice".into();
        n.priority = "urgent".into();
        n.wait = "5".into();
        n.template = "default".into();
        form
    }

    #[test]
    fn test_blank_uses_first_role() {
        let form = PlanForm::blank(&data());
        assert_eq!(form.steps.len(), 1);
        assert_eq!(form.steps[0].notifications[0].role, "user");
        assert_eq!(form.steps[0].notifications[0].count, "1");
        assert_eq!(form.threshold_window, "15");
        assert_eq!(form.aggregation_reset, "5");
        assert_eq!(form.id, None);
    }

    #[test]
    fn test_from_plan_maps_repeat_and_wait() {
        let form = PlanForm::from_plan(&fetched());
        let n = &form.steps[0].notifications[0];
        assert_eq!(n.count, "3");
        assert_eq!(n.wait, "10");
        assert_eq!(form.aggregation_reset, "1.5");
        assert_eq!(form.id, Some(42));
    }

    #[test]
    fn test_step_time() {
        let form = PlanForm::from_plan(&fetched());
        // min(10 × 3, 5 × 1)
        assert_eq!(step_time(&form.steps[0]), Some(5.0));

        let mut form = PlanForm::blank(&data());
        form.steps[0].notifications[0].wait = "0".into();
        assert_eq!(step_time(&form.steps[0]), Some(1.0));

        form.steps[0].notifications.clear();
        assert_eq!(step_time(&form.steps[0]), None);
        assert_eq!(plan_duration(&form), 0);
    }

    #[test]
    fn test_publish_round_trip() {
        let plan = fetched();
        let dto = to_new_plan(&PlanForm::from_plan(&plan), "carol");
        assert_eq!(dto.creator, "carol");
        assert_eq!(dto.steps[0][0].repeat, 2);
        assert_eq!(dto.steps[0][0].wait, 600);
        assert_eq!(dto.steps[0][1].target.as_deref(), Some("ops"));
        assert_eq!(dto.steps[0][1].dynamic_index, None);
        assert_eq!(dto.aggregation_reset, 90);
        assert_eq!(dto.threshold_count, 10);
    }

    #[test]
    fn test_validate_blank() {
        let result = validate(&PlanForm::blank(&data()));
        assert!(!result.is_valid());
        let missing = result.errors.missing();
        assert_eq!(missing[0], "Plan name");
        assert!(missing.contains(&"target".to_string()));
        assert!(missing.contains(&"wait".to_string()));
        assert!(!missing.contains(&"role".to_string()));
    }

    #[test]
    fn test_validate_filled() {
        let data = data();
        let result = validate(&filled(&data));
        assert!(result.is_valid(), "{:?}", result);
    }

    #[test]
    fn test_validate_no_notifications() {
        let data = data();
        let mut form = filled(&data);
        form.remove_notification(0, 0);
        let result = validate(&form);
        assert_eq!(
            result.errors.missing_message().as_deref(),
            Some("Missing fields: steps/notifications")
        );
    }

    #[test]
    fn test_validate_duration() {
        let data = data();
        let mut form = filled(&data);
        form.notification_mut(0, 0).unwrap().wait = "1441".into();
        let result = validate(&form);
        assert!(result.errors.is_empty());
        assert!(result.duration_exceeded);

        form.notification_mut(0, 0).unwrap().wait = "720".into();
        form.add_step(&data);
        let n = form.notification_mut(1, 0).unwrap();
        n.target = "bob".into();
        n.priority = "low".into();
        n.wait = "720".into();
        n.template = "default".into();
        assert!(validate(&form).is_valid());
    }

    #[test]
    fn test_invalid_count() {
        let data = data();
        let mut form = filled(&data);
        form.notification_mut(0, 0).unwrap().count = "0".into();
        let result = validate(&form);
        let step = &form.steps[0];
        assert!(result
            .errors
            .is_invalid(&field_key(step.key, step.notifications[0].key, "count")));
    }

    #[test]
    fn test_lookup_by_key_survives_removal() {
        let data = data();
        let mut form = PlanForm::blank(&data);
        form.add_step(&data);
        let step_key = form.steps[1].key;
        let key = form.steps[1].notifications[0].key;
        form.remove_step(0);
        assert_eq!(form.step_position(step_key), Some(0));
        assert_eq!(form.notification_position(step_key, key), Some((0, 0)));
        form.find_notification_mut(step_key, key).unwrap().target = "ops".into();
        assert_eq!(form.find_notification(step_key, key).unwrap().target, "ops");
        assert_eq!(form.find_notification(step_key, key + 100), None);
    }

    #[test]
    fn test_keys_unique() {
        let data = data();
        let mut form = PlanForm::blank(&data);
        form.add_notification(0, &data);
        form.add_step(&data);
        let mut keys: Vec<u32> = form
            .steps
            .iter()
            .flat_map(|s| std::iter::once(s.key).chain(s.notifications.iter().map(|n| n.key)))
            .collect();
        let len = keys.len();
        keys.sort();
        keys.dedup();
        assert_eq!(keys.len(), len);
    }

    fn dynamic_plan() -> Plan {
        serde_json::from_str(
            r#"{"id": 43, "name": "dyn", "created": 1, "creator": "bob", "active": 1,
                "threshold_window": 900, "threshold_count": 10,
                "aggregation_window": 300, "aggregation_reset": 300,
                "steps": [[{"role": null, "target": null, "priority": "high",
                            "wait": 60, "repeat": 0, "template": "default", "dynamic_index": 0}],
                          [{"priority": "urgent", "wait": 60, "repeat": 0,
                            "template": "default", "dynamic_index": 2}]]}"#,
        )
        .unwrap()
    }

    #[test]
    fn test_dynamic_plan_maps_indexes() {
        let form = PlanForm::from_plan(&dynamic_plan());
        assert!(form.dynamic);
        assert_eq!(form.steps[1].notifications[0].dynamic_index, "2");
        assert_eq!(form.dynamic_target_count(), 3);
        assert_eq!(dynamic_label(&form.steps[1].notifications[0].dynamic_index), "Dynamic target #2");

        assert!(!PlanForm::from_plan(&fetched()).dynamic);
        assert_eq!(PlanForm::from_plan(&fetched()).dynamic_target_count(), 0);
    }

    #[test]
    fn test_dynamic_plan_needs_no_target() {
        let data = data();
        let mut form = filled(&data);
        form.dynamic = true;
        let n = form.notification_mut(0, 0).unwrap();
        n.target.clear();
        n.role.clear();
        n.dynamic_index = "1".into();
        assert!(validate(&form).is_valid());

        let dto = to_new_plan(&form, "alice");
        assert_eq!(dto.steps[0][0].dynamic_index, Some(1));
        assert_eq!(dto.steps[0][0].role, None);
        assert_eq!(dto.steps[0][0].target, None);
        let body = serde_json::to_value(&dto.steps[0][0]).unwrap();
        assert!(body.get("target").is_none());

        form.notification_mut(0, 0).unwrap().dynamic_index = "-1".into();
        let result = validate(&form);
        assert_eq!(
            result.errors.missing_message().as_deref(),
            Some("Missing fields: dynamic target")
        );
    }

    #[test]
    fn test_incident_carries_dynamic_targets() {
        let mut data = data();
        data.applications = vec![ApplicationInfo {
            name: "nodes".into(),
            sample_context: Some(r#"{"host": "db1"}"#.into()),
            ..Default::default()
        }];

        let form = PlanForm::from_plan(&dynamic_plan());
        let mut slots = test_target_slots(&form, &data);
        assert_eq!(slots.len(), 3);
        assert!(slots.iter().all(|t| t.role == "user" && t.target.is_empty()));
        slots[0].target = " alice ".into();
        slots[2].role = "team".into();
        slots[2].target = "ops".into();

        let dto = test_incident_dto("dyn", "nodes", &data, &slots);
        assert_eq!(dto.context, serde_json::json!({"host": "db1"}));
        assert_eq!(
            dto.dynamic_targets,
            vec![
                DynamicTarget { role: "user".into(), target: "alice".into() },
                DynamicTarget { role: "user".into(), target: String::new() },
                DynamicTarget { role: "team".into(), target: "ops".into() },
            ]
        );

        let plain = PlanForm::from_plan(&fetched());
        assert!(test_target_slots(&plain, &data).is_empty());
        let dto = test_incident_dto("db", "missing", &data, &[]);
        assert_eq!(dto.context, serde_json::json!({}));
        let body = serde_json::to_value(&dto).unwrap();
        assert!(body.get("dynamic_targets").is_none());
    }
}

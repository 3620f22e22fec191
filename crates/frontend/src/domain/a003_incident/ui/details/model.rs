use crate::shared::list_utils::{cmp_opt, cmp_text, Sortable};
use crate::shared::summary_template::{display, render};
use contracts::domain::a001_plan::aggregate::Plan;
use contracts::domain::a003_incident::aggregate::{Incident, IncidentStep};
use serde_json::Value;
use std::cmp::Ordering;

impl Sortable for IncidentStep {
    fn compare_by_field(&self, other: &Self, field: &str) -> Ordering {
        match field {
            "name" => cmp_text(&self.name, &other.name),
            "mode" => cmp_text(&self.mode, &other.mode),
            "priority" => cmp_text(&self.priority, &other.priority),
            "step" => self.step.cmp(&other.step),
            "sent" => cmp_opt(&self.sent, &other.sent),
            _ => self.id.cmp(&other.id),
        }
    }
}

/// How the context block of an incident is shown
#[derive(Debug, Clone, PartialEq)]
pub enum ContextDisplay {
    /// Application `context_template` rendered against the incident
    Rendered(String),
    /// Context keys in order, for applications without a template
    Pairs(Vec<(String, String)>),
}

pub fn context_display(template: Option<&str>, incident: &Incident) -> ContextDisplay {
    if let Some(template) = template.filter(|t| !t.trim().is_empty()) {
        let root = serde_json::to_value(incident).unwrap_or_default();
        match render(template, &root) {
            Ok(text) => return ContextDisplay::Rendered(text),
            Err(e) => log::warn!("context template of {} failed: {}", incident.application, e),
        }
    }
    let pairs = match &incident.context {
        Value::Object(map) => {
            let mut pairs: Vec<(String, String)> =
                map.iter().map(|(k, v)| (k.clone(), display(v))).collect();
            pairs.sort_by(|a, b| a.0.cmp(&b.0));
            pairs
        }
        Value::Null => Vec::new(),
        other => vec![("context".to_string(), display(other))],
    };
    ContextDisplay::Pairs(pairs)
}

/// Claim button action: active incidents get claimed, the rest unclaimed
pub fn claim_owner(incident: &Incident, user: &str) -> Option<String> {
    incident.active.then(|| user.to_string())
}

pub fn claim_message(id: i64, owner: &Option<String>) -> String {
    match owner {
        Some(_) => format!("Incident {} claimed.", id),
        None => format!("Incident {} unclaimed.", id),
    }
}

/// Modes sent with a changed mode/target are flagged in the messages table
pub fn step_note(step: &IncidentStep) -> &'static str {
    match (step.mode_changed, step.target_changed) {
        (true, true) => "mode and target changed",
        (true, false) => "mode changed",
        (false, true) => "target changed",
        (false, false) => "",
    }
}

/// Comments posted on the original and on the new incident
pub fn reescalation_comments(original: i64, created: i64, user: &str) -> (String, String) {
    (
        format!(
            "Incident re-escalated as [incident {}](/incidents/{}) by {}",
            created, created, user
        ),
        format!(
            "Incident re-escalated from [incident {}](/incidents/{}) by {}",
            original, original, user
        ),
    )
}

/// Piece of a comment: plain text or a `[text](href)` link
#[derive(Debug, Clone, PartialEq)]
pub enum CommentPart {
    Text(String),
    Link { text: String, href: String },
}

pub fn comment_parts(content: &str) -> Vec<CommentPart> {
    let mut parts = Vec::new();
    let mut rest = content;
    while let Some(open) = rest.find('[') {
        let after = &rest[open + 1..];
        let link = after.find("](").and_then(|mid| {
            let close = after[mid + 2..].find(')')?;
            Some((mid, mid + 2 + close))
        });
        let Some((mid, close)) = link else {
            break;
        };
        if open > 0 {
            parts.push(CommentPart::Text(rest[..open].to_string()));
        }
        parts.push(CommentPart::Link {
            text: after[..mid].to_string(),
            href: after[mid + 2..close].to_string(),
        });
        rest = &after[close + 1..];
    }
    if !rest.is_empty() {
        parts.push(CommentPart::Text(rest.to_string()));
    }
    parts
}

/// Id of the incident created by `POST /v0/incidents`
pub fn created_id(response: &Value) -> Option<i64> {
    match response {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().trim_start_matches("/incidents/").parse().ok(),
        _ => None,
    }
}

/// Re-escalation dialog
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Reescalation {
    pub open: bool,
    /// Plan name typed or picked
    pub query: String,
    /// Previewed plan; re-escalation is enabled only when set
    pub plan: Option<Plan>,
}

impl Reescalation {
    pub fn opened() -> Self {
        Self {
            open: true,
            ..Default::default()
        }
    }

    pub fn reset_preview(&mut self) {
        self.plan = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn incident() -> Incident {
        serde_json::from_value(json!({
            "id": 12,
            "application": "nodes",
            "plan": "page-oncall",
            "created": 100,
            "active": 1,
            "context": {"zone": "east", "host": "db1", "load": 3}
        }))
        .unwrap()
    }

    #[test]
    fn test_context_pairs_sorted() {
        let display = context_display(None, &incident());
        assert_eq!(
            display,
            ContextDisplay::Pairs(vec![
                ("host".into(), "db1".into()),
                ("load".into(), "3".into()),
                ("zone".into(), "east".into()),
            ])
        );
    }

    #[test]
    fn test_context_template() {
        let display = context_display(Some("{{context.host}} in {{context.zone}}"), &incident());
        assert_eq!(display, ContextDisplay::Rendered("db1 in east".into()));
        assert!(matches!(context_display(Some("  "), &incident()), ContextDisplay::Pairs(_)));
        assert!(matches!(context_display(Some("{{#if x}}"), &incident()), ContextDisplay::Pairs(_)));
    }

    #[test]
    fn test_claim_owner_and_message() {
        let mut inc = incident();
        assert_eq!(claim_owner(&inc, "alice"), Some("alice".to_string()));
        inc.active = false;
        assert_eq!(claim_owner(&inc, "alice"), None);
        assert_eq!(claim_message(12, &Some("alice".into())), "Incident 12 claimed.");
        assert_eq!(claim_message(12, &None), "Incident 12 unclaimed.");
    }

    #[test]
    fn test_reescalation_comments() {
        let (original, created) = reescalation_comments(12, 40, "alice");
        assert_eq!(original, "Incident re-escalated as [incident 40](/incidents/40) by alice");
        assert_eq!(created, "Incident re-escalated from [incident 12](/incidents/12) by alice");
    }

    #[test]
    fn test_comment_links() {
        let parts = comment_parts("Incident re-escalated as [incident 40](/incidents/40) by alice");
        assert_eq!(
            parts,
            vec![
                CommentPart::Text("Incident re-escalated as ".into()),
                CommentPart::Link {
                    text: "incident 40".into(),
                    href: "/incidents/40".into()
                },
                CommentPart::Text(" by alice".into()),
            ]
        );
        assert_eq!(comment_parts("a [b] c"), vec![CommentPart::Text("a [b] c".into())]);
        assert!(comment_parts("").is_empty());
    }

    #[test]
    fn test_created_id() {
        assert_eq!(created_id(&json!(40)), Some(40));
        assert_eq!(created_id(&json!("40")), Some(40));
        assert_eq!(created_id(&json!("/incidents/40")), Some(40));
        assert_eq!(created_id(&json!(null)), None);
    }

    #[test]
    fn test_step_note() {
        let mut step: IncidentStep = serde_json::from_value(json!({"id": 1})).unwrap();
        assert_eq!(step_note(&step), "");
        step.mode_changed = true;
        assert_eq!(step_note(&step), "mode changed");
    }
}

use crate::shared::serde_utils::bool_from_any;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// application → mode → content
pub type TemplateContentMap = BTreeMap<String, BTreeMap<String, TemplateContent>>;

/// Строка списка шаблонов (`GET /v0/templates`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateSummary {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub creator: String,
    #[serde(default)]
    pub created: i64,
    #[serde(default, deserialize_with = "bool_from_any")]
    pub active: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TemplateContent {
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub body: String,
}

/// Plan that references a template by name
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanRef {
    pub id: i64,
    pub name: String,
}

/// `GET /v0/templates/<id>`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Template {
    pub id: i64,
    pub name: String,
    #[serde(default, deserialize_with = "bool_from_any")]
    pub active: bool,
    #[serde(default)]
    pub creator: String,
    #[serde(default)]
    pub created: i64,
    #[serde(default)]
    pub content: TemplateContentMap,
    #[serde(default)]
    pub plans: Vec<PlanRef>,
}

/// Тело `POST /v0/templates`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewTemplateDto {
    pub creator: String,
    pub name: String,
    pub content: TemplateContentMap,
}

/// Result of `POST /validate/jinja`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TemplatePreview {
    #[serde(default)]
    pub template_subject: Option<String>,
    #[serde(default)]
    pub template_body: Option<String>,
}

/// Error body of `POST /validate/jinja`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TemplatePreviewError {
    #[serde(default)]
    pub lineno: Option<i64>,
    #[serde(default)]
    pub error: Option<String>,
}

impl TemplatePreviewError {
    pub fn describe(&self) -> String {
        match (&self.lineno, &self.error) {
            (Some(line), Some(err)) => format!("Line: {}\nError: {}", line, err),
            (None, Some(err)) => format!("Error: {}", err),
            _ => "Invalid template".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_template_deserialize() {
        let t: Template = serde_json::from_str(
            r#"{"id": 42, "name": "default", "active": 1, "creator": "alice", "created": 1,
                "content": {"app": {"sms": {"subject": "", "body": "{{title}}"}}},
                "plans": [{"id": 7, "name": "oncall"}]}"#,
        )
        .unwrap();
        assert!(t.active);
        assert_eq!(t.content["app"]["sms"].body, "{{title}}");
        assert_eq!(t.plans[0].name, "oncall");
    }

    #[test]
    fn test_preview_error_describe() {
        let e = TemplatePreviewError { lineno: Some(3), error: Some("bad".into()) };
        assert_eq!(e.describe(), "Line: 3\nError: bad");
        let e = TemplatePreviewError { lineno: None, error: Some("bad".into()) };
        assert_eq!(e.describe(), "Error: bad");
        assert_eq!(TemplatePreviewError::default().describe(), "Invalid template");
    }
}

//! Template editor model.
//!
//! Ответ API хранит только заполненные режимы; форма всегда показывает
//! все режимы из bootstrap-данных, недостающие - пустыми.

use crate::shared::validation::FieldErrors;
use contracts::domain::a002_template::aggregate::{
    NewTemplateDto, PlanRef, Template, TemplateContent, TemplateContentMap,
};
use contracts::shared::app_data::AppData;
use std::collections::BTreeMap;

/// Only email carries a subject
pub const SUBJECT_MODE: &str = "email";

pub const DUPLICATE_APPLICATION: &str = "Please pick a unique application for each template.";

#[derive(Debug, Clone, PartialEq)]
pub struct ModeContent {
    pub mode: String,
    pub subject: String,
    pub body: String,
}

impl ModeContent {
    fn empty(mode: &str) -> Self {
        Self {
            mode: mode.to_string(),
            subject: String::new(),
            body: String::new(),
        }
    }

    pub fn has_subject(&self) -> bool {
        self.mode == SUBJECT_MODE
    }
}

/// One application section of a template
#[derive(Debug, Clone, PartialEq)]
pub struct AppBlock {
    pub key: u32,
    pub application: String,
    pub modes: Vec<ModeContent>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TemplateForm {
    pub id: Option<i64>,
    pub name: String,
    pub creator: String,
    pub created: Option<i64>,
    pub active: bool,
    pub blocks: Vec<AppBlock>,
    /// Plans using this template
    pub plans: Vec<PlanRef>,
    next_key: u32,
}

fn padded(modes: &[String], content: Option<&BTreeMap<String, TemplateContent>>) -> Vec<ModeContent> {
    let mut out: Vec<ModeContent> = modes
        .iter()
        .map(|mode| match content.and_then(|c| c.get(mode)) {
            Some(c) => ModeContent {
                mode: mode.clone(),
                subject: c.subject.clone(),
                body: c.body.clone(),
            },
            None => ModeContent::empty(mode),
        })
        .collect();
    // режимы, которых уже нет в bootstrap, не теряем
    if let Some(content) = content {
        for (mode, c) in content {
            if !modes.contains(mode) {
                out.push(ModeContent {
                    mode: mode.clone(),
                    subject: c.subject.clone(),
                    body: c.body.clone(),
                });
            }
        }
    }
    out
}

impl TemplateForm {
    pub fn blank(data: &AppData) -> Self {
        let mut form = Self {
            id: None,
            name: String::new(),
            creator: data.user.clone(),
            created: None,
            active: false,
            blocks: Vec::new(),
            plans: Vec::new(),
            next_key: 0,
        };
        form.add_block(&data.modes);
        form
    }

    pub fn from_template(template: &Template, modes: &[String]) -> Self {
        let blocks: Vec<AppBlock> = template
            .content
            .iter()
            .enumerate()
            .map(|(i, (application, content))| AppBlock {
                key: i as u32 + 1,
                application: application.clone(),
                modes: padded(modes, Some(content)),
            })
            .collect();
        let next_key = blocks.len() as u32;
        Self {
            id: Some(template.id),
            name: template.name.clone(),
            creator: template.creator.clone(),
            created: Some(template.created),
            active: template.active,
            blocks,
            plans: template.plans.clone(),
            next_key,
        }
    }

    pub fn add_block(&mut self, modes: &[String]) {
        self.next_key += 1;
        self.blocks.push(AppBlock {
            key: self.next_key,
            application: String::new(),
            modes: padded(modes, None),
        });
    }

    pub fn remove_block(&mut self, key: u32) {
        self.blocks.retain(|b| b.key != key);
    }

    pub fn block_mut(&mut self, key: u32) -> Option<&mut AppBlock> {
        self.blocks.iter_mut().find(|b| b.key == key)
    }

    pub fn block(&self, key: u32) -> Option<&AppBlock> {
        self.blocks.iter().find(|b| b.key == key)
    }

    pub fn mode_mut(&mut self, key: u32, mode: &str) -> Option<&mut ModeContent> {
        self.block_mut(key)?.modes.iter_mut().find(|m| m.mode == mode)
    }
}

/// Variables of an application; `true` marks the required ones
pub fn variables_for(data: &AppData, application: &str) -> Vec<(String, bool)> {
    data.applications
        .iter()
        .find(|a| a.name == application)
        .map(|app| {
            app.variables
                .iter()
                .map(|v| (v.clone(), app.required_variables.contains(v)))
                .collect()
        })
        .unwrap_or_default()
}

pub fn application_key(block: u32) -> String {
    format!("block-{}-application", block)
}

pub fn content_key(block: u32, mode: &str, part: &str) -> String {
    format!("block-{}-{}-{}", block, mode, part)
}

#[derive(Debug, Clone, PartialEq)]
pub struct TemplateValidation {
    pub errors: FieldErrors,
    pub duplicate_application: bool,
}

impl TemplateValidation {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty() && !self.duplicate_application
    }
}

pub fn validate(form: &TemplateForm) -> TemplateValidation {
    let mut errors = FieldErrors::new();
    errors.require("template-name", "Template name", &form.name);

    for block in &form.blocks {
        errors.require(application_key(block.key), "application", &block.application);
        for m in &block.modes {
            if m.has_subject() {
                errors.require(
                    content_key(block.key, &m.mode, "subject"),
                    &format!("{} subject", m.mode),
                    &m.subject,
                );
            }
            errors.require(
                content_key(block.key, &m.mode, "body"),
                &format!("{} body", m.mode),
                &m.body,
            );
        }
    }

    let mut duplicate_application = false;
    if errors.is_empty() {
        let mut seen: Vec<&str> = Vec::new();
        for block in &form.blocks {
            if seen.contains(&block.application.as_str()) {
                errors.mark(application_key(block.key));
                duplicate_application = true;
            } else {
                seen.push(&block.application);
            }
        }
    }

    TemplateValidation {
        errors,
        duplicate_application,
    }
}

/// Body of `POST /v0/templates`. Non-email modes never send a subject.
pub fn to_new_template(form: &TemplateForm, creator: &str) -> NewTemplateDto {
    let mut content = TemplateContentMap::new();
    for block in &form.blocks {
        let modes = content.entry(block.application.clone()).or_default();
        for m in &block.modes {
            modes.insert(
                m.mode.clone(),
                TemplateContent {
                    subject: if m.has_subject() { m.subject.clone() } else { String::new() },
                    body: m.body.clone(),
                },
            );
        }
    }
    NewTemplateDto {
        creator: creator.to_string(),
        name: form.name.trim().to_string(),
        content,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::shared::app_data::ApplicationInfo;

    fn data() -> AppData {
        AppData {
            user: "alice".into(),
            modes: vec!["sms".into(), "email".into()],
            applications: vec![ApplicationInfo {
                name: "nodes".into(),
                variables: vec!["host".into(), "zone".into()],
                required_variables: vec!["host".into()],
                ..Default::default()
            }],
            ..Default::default()
        }
    }

    fn fetched() -> Template {
        serde_json::from_str(
            r#"{"id": 7, "name": "default", "active": 1, "creator": "bob", "created": 10,
                "content": {"nodes": {"email": {"subject": "{{host}}", "body": "down"},
                                      "slack": {"subject": "", "body": "x"}}},
                "plans": []}"#,
        )
        .unwrap()
    }

    fn filled(data: &AppData) -> TemplateForm {
        let mut form = TemplateForm::blank(data);
        form.name = "default".into();
        let key = form.blocks[0].key;
        form.block_mut(key).unwrap().application = "nodes".into();
        for m in &mut form.block_mut(key).unwrap().modes {
            m.body = "{{host}} down".into();
            m.subject = "alert".into();
        }
        form
    }

    #[test]
    fn test_blank_has_every_mode() {
        let form = TemplateForm::blank(&data());
        assert_eq!(form.blocks.len(), 1);
        let modes: Vec<&str> = form.blocks[0].modes.iter().map(|m| m.mode.as_str()).collect();
        assert_eq!(modes, vec!["sms", "email"]);
        assert!(form.blocks[0].modes.iter().all(|m| m.body.is_empty()));
    }

    #[test]
    fn test_from_template_pads_modes() {
        let form = TemplateForm::from_template(&fetched(), &data().modes);
        let modes: Vec<&str> = form.blocks[0].modes.iter().map(|m| m.mode.as_str()).collect();
        assert_eq!(modes, vec!["sms", "email", "slack"]);
        assert_eq!(form.blocks[0].modes[0].body, "");
        assert_eq!(form.blocks[0].modes[1].subject, "{{host}}");
    }

    #[test]
    fn test_variables_for() {
        assert_eq!(
            variables_for(&data(), "nodes"),
            vec![("host".to_string(), true), ("zone".to_string(), false)]
        );
        assert!(variables_for(&data(), "other").is_empty());
    }

    #[test]
    fn test_validate_blank() {
        let result = validate(&TemplateForm::blank(&data()));
        let missing = result.errors.missing();
        assert_eq!(missing[0], "Template name");
        assert!(missing.contains(&"email subject".to_string()));
        assert!(!missing.contains(&"sms subject".to_string()));
    }

    #[test]
    fn test_duplicate_application() {
        let data = data();
        let mut form = filled(&data);
        assert!(validate(&form).is_valid());

        form.blocks.push(AppBlock {
            key: 99,
            ..form.blocks[0].clone()
        });
        let result = validate(&form);
        assert!(result.duplicate_application);
        assert!(result.errors.is_invalid(&application_key(99)));
        assert!(!result.errors.is_invalid(&application_key(form.blocks[0].key)));
    }

    #[test]
    fn test_subject_only_for_email() {
        let data = data();
        let dto = to_new_template(&filled(&data), "carol");
        assert_eq!(dto.creator, "carol");
        assert_eq!(dto.content["nodes"]["sms"].subject, "");
        assert_eq!(dto.content["nodes"]["email"].subject, "alert");
    }

    #[test]
    fn test_remove_block() {
        let data = data();
        let mut form = TemplateForm::blank(&data);
        form.add_block(&data.modes);
        let key = form.blocks[0].key;
        form.remove_block(key);
        assert_eq!(form.blocks.len(), 1);
        assert!(form.block(key).is_none());
    }
}

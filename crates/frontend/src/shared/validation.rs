//! Form validation helpers.
//!
//! `FieldErrors` пересчитывается с нуля на каждом проходе валидации:
//! старые пометки `invalid-input` не переживают повторную проверку.

use serde_json::Value;
use std::collections::BTreeSet;

pub const INVALID_CLASS: &str = "invalid-input";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldErrors {
    invalid: BTreeSet<String>,
    missing: Vec<String>,
}

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks `key` invalid and records `label` when `value` is blank.
    pub fn require(&mut self, key: impl Into<String>, label: &str, value: &str) -> bool {
        if !value.trim().is_empty() {
            return true;
        }
        self.mark(key);
        if !self.missing.iter().any(|m| m == label) {
            self.missing.push(label.to_string());
        }
        false
    }

    pub fn mark(&mut self, key: impl Into<String>) {
        self.invalid.insert(key.into());
    }

    pub fn is_invalid(&self, key: &str) -> bool {
        self.invalid.contains(key)
    }

    pub fn is_empty(&self) -> bool {
        self.invalid.is_empty() && self.missing.is_empty()
    }

    pub fn missing(&self) -> &[String] {
        &self.missing
    }

    /// "Missing fields: Plan name, Role"
    pub fn missing_message(&self) -> Option<String> {
        (!self.missing.is_empty()).then(|| format!("Missing fields: {}", self.missing.join(", ")))
    }

    pub fn class_for(&self, key: &str) -> &'static str {
        if self.is_invalid(key) {
            INVALID_CLASS
        } else {
            ""
        }
    }
}

pub fn is_valid_email(value: &str) -> bool {
    let value = value.trim();
    if value.chars().any(char::is_whitespace) {
        return false;
    }
    match value.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
        }
        None => false,
    }
}

/// Sample context of an application: blank means `{}`.
pub fn normalize_json(text: &str) -> Result<String, String> {
    if text.trim().is_empty() {
        return Ok("{}".to_string());
    }
    serde_json::from_str::<Value>(text)
        .map(|_| text.to_string())
        .map_err(|e| e.to_string())
}

/// Adds a trimmed entry to a list of names; `what` is "variable", "owner"...
pub fn add_unique(list: &mut Vec<String>, item: &str, what: &str) -> Result<(), String> {
    let item = item.trim();
    if item.is_empty() {
        return Err(format!("Cannot add empty {}", what));
    }
    if list.iter().any(|existing| existing == item) {
        return Err(format!("That {} \"{}\" already exists", what, item));
    }
    list.push(item.to_string());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_collects_missing_once() {
        let mut errors = FieldErrors::new();
        assert!(errors.require("plan-name", "Plan name", "db"));
        assert!(!errors.require("step-0-0-role", "Role", ""));
        assert!(!errors.require("step-1-0-role", "Role", "  "));
        assert!(errors.is_invalid("step-1-0-role"));
        assert!(!errors.is_invalid("plan-name"));
        assert_eq!(errors.missing_message().as_deref(), Some("Missing fields: Role"));
        assert_eq!(errors.class_for("step-0-0-role"), INVALID_CLASS);
    }

    #[test]
    fn test_fresh_pass_has_no_stale_marks() {
        let mut errors = FieldErrors::new();
        errors.require("name", "Name", "");
        errors = FieldErrors::new();
        errors.require("name", "Name", "fixed");
        assert!(errors.is_empty());
        assert_eq!(errors.missing_message(), None);
    }

    #[test]
    fn test_email() {
        assert!(is_valid_email("oncall@example.com"));
        assert!(!is_valid_email("oncall"));
        assert!(!is_valid_email("@example.com"));
        assert!(!is_valid_email("a@b"));
        assert!(!is_valid_email("a b@example.com"));
        assert!(!is_valid_email("a@@example.com"));
    }

    #[test]
    fn test_normalize_json() {
        assert_eq!(normalize_json("").unwrap(), "{}");
        assert_eq!(normalize_json("{\"a\": 1}").unwrap(), "{\"a\": 1}");
        assert!(normalize_json("{a: 1}").is_err());
    }

    #[test]
    fn test_add_unique() {
        let mut vars = vec!["title".to_string()];
        assert_eq!(
            add_unique(&mut vars, "", "variable").unwrap_err(),
            "Cannot add empty variable"
        );
        assert_eq!(
            add_unique(&mut vars, "title", "variable").unwrap_err(),
            "That variable \"title\" already exists"
        );
        assert!(add_unique(&mut vars, " host ", "variable").is_ok());
        assert_eq!(vars, vec!["title", "host"]);
    }
}

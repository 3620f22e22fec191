//! Application summary, context and mobile templates.
//!
//! Шаблоны пишутся в Handlebars; рендерим без HTML-экранирования, результат
//! вставляется как текст.

use handlebars::{no_escape, Handlebars, Template};
use serde_json::{json, Value};

fn registry() -> Handlebars<'static> {
    let mut hb = Handlebars::new();
    hb.register_escape_fn(no_escape);
    hb
}

pub fn display(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Renders `template` against `root`; missing paths render empty.
pub fn render(template: &str, root: &Value) -> Result<String, String> {
    registry()
        .render_template(template, root)
        .map_err(|e| e.to_string())
}

/// Syntax check used before saving an application: the template must compile
/// and render against an empty context.
pub fn validate_template(template: &str) -> Result<(), String> {
    Template::compile(template).map_err(|e| e.to_string())?;
    render(template, &json!({})).map(|_| ())
}

/// `key: value` lines of an incident context, keys sorted
pub fn default_summary(context: &Value) -> String {
    match context {
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            keys.iter()
                .map(|k| format!("{}: {}", k, display(&map[k.as_str()])))
                .collect::<Vec<_>>()
                .join("\n")
        }
        Value::Null => String::new(),
        other => display(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_paths() {
        let item = json!({"id": 7, "application": "nodes", "context": {"host": "db1", "load": 3.5}});
        assert_eq!(
            render("{{application}}: {{ context.host }} at {{{context.load}}}", &item).unwrap(),
            "nodes: db1 at 3.5"
        );
        assert_eq!(render("{{context.missing}}!", &item).unwrap(), "!");
        assert_eq!(render("<b>{{context.host}}</b>", &json!({"context": {"host": "a&b"}})).unwrap(), "<b>a&b</b>");
    }

    #[test]
    fn test_render_block_helpers() {
        let item = json!({"context": {"host": "db1", "down": true, "items": ["a", "b"]}});
        assert_eq!(
            render("{{#if context.down}}{{context.host}} down{{else}}up{{/if}}", &item).unwrap(),
            "db1 down"
        );
        assert_eq!(render("{{#each context.items}}{{this}},{{/each}}", &item).unwrap(), "a,b,");
    }

    #[test]
    fn test_broken_template_is_an_error() {
        assert!(render("a {{b", &json!({})).is_err());
        assert!(render("{{#if x}}open", &json!({})).is_err());
    }

    #[test]
    fn test_validate_template() {
        assert!(validate_template("").is_ok());
        assert!(validate_template("{{#each context.items}}{{this}}{{/each}}").is_ok());
        assert!(validate_template("{{#if x}}unclosed").is_err());
        assert!(validate_template("{{/each}}").is_err());
    }

    #[test]
    fn test_default_summary() {
        let ctx = json!({"zone": "us", "host": "db1", "n": null});
        assert_eq!(default_summary(&ctx), "host: db1\nn: \nzone: us");
    }
}

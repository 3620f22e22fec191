//! Filter form ⇄ URL query ⇄ API parameters.
//!
//! Имя поля формы - `filter-<key>`; в адресную строку попадает `<key>`,
//! в API - параметр из `param`.

use crate::shared::api_utils::{FetchParams, ParamValue};
use std::collections::HashMap;

pub const FILTER_PREFIX: &str = "filter-";

pub const ACTIVE_CHOICES: &[&str] = &["active", "inactive", "all"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlKind {
    /// Radio group; value must be one of the choices, otherwise `all`
    ChoiceGroup(&'static [&'static str]),
    /// `MM/DD/YYYY h:mm A`, sent to the API as unix time
    DateTime,
    /// Target typeahead; the value is the field's fixed target type
    Typeahead(&'static str),
    /// `<select>` filled from bootstrap data
    Select(SelectSource),
    Plain,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectSource {
    Applications,
    Priorities,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilterField {
    /// Form name, `filter-target`
    pub name: &'static str,
    pub label: &'static str,
    pub kind: ControlKind,
    /// API parameter; `None` when the field is mapped separately (`active`)
    pub param: Option<&'static str>,
}

impl FilterField {
    pub const fn new(
        name: &'static str,
        label: &'static str,
        kind: ControlKind,
        param: Option<&'static str>,
    ) -> Self {
        Self {
            name,
            label,
            kind,
            param,
        }
    }

    /// Query-string key: the name without its 7-char prefix
    pub fn key(&self) -> &'static str {
        self.name.get(FILTER_PREFIX.len()..).unwrap_or(self.name)
    }
}

/// Parsed `location.search`
pub type QueryMap = HashMap<String, String>;

/// Current values of the filter form, keyed by field name
pub type FilterValues = HashMap<&'static str, String>;

/// Form → query string (without `?`). Form order, empty values dropped.
pub fn serialize_filters(fields: &[FilterField], values: &FilterValues) -> String {
    fields
        .iter()
        .filter_map(|field| {
            let value = values.get(field.name)?;
            if value.is_empty() {
                return None;
            }
            Some(format!("{}={}", field.key(), urlencoding::encode(value)))
        })
        .collect::<Vec<_>>()
        .join("&")
}

fn parse_query_fallback(search: &str) -> QueryMap {
    search
        .split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| {
            let (k, v) = pair.split_once('=').unwrap_or((pair, ""));
            let decode = |s: &str| {
                let s = s.replace('+', " ");
                urlencoding::decode(&s)
                    .map(|d| d.into_owned())
                    .unwrap_or(s)
            };
            (decode(k), decode(v))
        })
        .collect()
}

pub fn parse_query(search: &str) -> QueryMap {
    let search = search.trim_start_matches('?');
    if search.is_empty() {
        return QueryMap::new();
    }
    match serde_qs::from_str::<QueryMap>(search) {
        Ok(map) => map,
        Err(e) => {
            log::debug!("serde_qs could not parse {:?}: {}", search, e);
            parse_query_fallback(search)
        }
    }
}

/// Filters of a page opened without a query string
pub fn default_query(user: &str, incident_start: String) -> QueryMap {
    QueryMap::from([
        ("active".to_string(), "active".to_string()),
        ("target".to_string(), user.to_string()),
        ("incidentStart".to_string(), incident_start),
    ])
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct RestoredFilters {
    pub values: FilterValues,
    pub params: FetchParams,
}

/// Query → form values and API parameters.
///
/// `to_unix` parses a `DateTime` value; unparsable dates send nothing.
pub fn restore_filters(
    fields: &[FilterField],
    query: &QueryMap,
    to_unix: impl Fn(&str) -> Option<i64>,
) -> RestoredFilters {
    let mut restored = RestoredFilters::default();

    for field in fields {
        let raw = query.get(field.key()).cloned().unwrap_or_default();
        let value = match field.kind {
            ControlKind::ChoiceGroup(choices) => {
                if choices.contains(&raw.as_str()) {
                    raw
                } else {
                    "all".to_string()
                }
            }
            _ => raw,
        };

        if let Some(param) = field.param {
            match field.kind {
                ControlKind::DateTime => {
                    if !value.is_empty() {
                        if let Some(ts) = to_unix(&value) {
                            restored.params.insert(param.to_string(), ParamValue::Int(ts));
                        }
                    }
                }
                ControlKind::ChoiceGroup(_) => {}
                ControlKind::Typeahead(_) | ControlKind::Select(_) | ControlKind::Plain => {
                    if !value.is_empty() {
                        restored
                            .params
                            .insert(param.to_string(), ParamValue::Str(value.clone()));
                    }
                }
            }
        }

        restored.values.insert(field.name, value);
    }

    let has_active = fields.iter().any(|f| f.key() == "active");
    match query.get("active").map(String::as_str).filter(|_| has_active) {
        Some("active") => {
            restored.params.insert("active".into(), ParamValue::Int(1));
        }
        Some("inactive") => {
            restored.params.insert("active".into(), ParamValue::Int(0));
        }
        _ => {}
    }

    restored
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIELDS: &[FilterField] = &[
        FilterField::new("filter-name", "Name", ControlKind::Plain, Some("name__contains")),
        FilterField::new("filter-target", "Creator", ControlKind::Typeahead("user"), Some("target")),
        FilterField::new(
            "filter-incidentStart",
            "Since",
            ControlKind::DateTime,
            Some("created__ge"),
        ),
        FilterField::new("filter-active", "Active", ControlKind::ChoiceGroup(ACTIVE_CHOICES), None),
    ];

    fn no_dates(_: &str) -> Option<i64> {
        None
    }

    #[test]
    fn test_key_strips_prefix() {
        assert_eq!(FIELDS[1].key(), "target");
        assert_eq!(FIELDS[2].key(), "incidentStart");
    }

    #[test]
    fn test_serialize_inactive_and_target() {
        let values = FilterValues::from([
            ("filter-active", "inactive".to_string()),
            ("filter-target", "alice".to_string()),
        ]);
        assert_eq!(serialize_filters(FIELDS, &values), "target=alice&active=inactive");

        let only = &[FIELDS[3], FIELDS[1]];
        assert_eq!(serialize_filters(only, &values), "active=inactive&target=alice");
    }

    #[test]
    fn test_serialize_drops_empty_and_encodes() {
        let values = FilterValues::from([
            ("filter-name", String::new()),
            ("filter-incidentStart", "04/13/2017 9:05 AM".to_string()),
        ]);
        assert_eq!(
            serialize_filters(FIELDS, &values),
            "incidentStart=04%2F13%2F2017%209%3A05%20AM"
        );
    }

    #[test]
    fn test_restore_active_inactive_target() {
        let query = parse_query("?active=inactive&target=alice");
        let restored = restore_filters(FIELDS, &query, no_dates);
        assert_eq!(restored.params.get("active"), Some(&ParamValue::Int(0)));
        assert_eq!(
            restored.params.get("target"),
            Some(&ParamValue::Str("alice".into()))
        );
        assert_eq!(restored.params.len(), 2);
        assert_eq!(restored.values["filter-active"], "inactive");
    }

    #[test]
    fn test_restore_choice_falls_back_to_all() {
        let restored = restore_filters(FIELDS, &QueryMap::new(), no_dates);
        assert_eq!(restored.values["filter-active"], "all");
        assert!(restored.params.is_empty());

        let query = parse_query("active=bogus");
        let restored = restore_filters(FIELDS, &query, no_dates);
        assert_eq!(restored.values["filter-active"], "all");
        assert!(!restored.params.contains_key("active"));
    }

    #[test]
    fn test_restore_active_maps_to_one() {
        let restored = restore_filters(FIELDS, &parse_query("active=active"), no_dates);
        assert_eq!(restored.params.get("active"), Some(&ParamValue::Int(1)));
    }

    #[test]
    fn test_restore_ignores_active_without_control() {
        let fields = &[FIELDS[1]];
        let restored = restore_filters(fields, &parse_query("active=active&target=bob"), no_dates);
        assert!(!restored.params.contains_key("active"));
        assert_eq!(restored.params.len(), 1);
    }

    #[test]
    fn test_restore_datetime_param_is_unix() {
        let query = parse_query("incidentStart=04%2F13%2F2017%209%3A05%20AM");
        let restored = restore_filters(FIELDS, &query, |v| {
            assert_eq!(v, "04/13/2017 9:05 AM");
            Some(1492074300)
        });
        assert_eq!(restored.values["filter-incidentStart"], "04/13/2017 9:05 AM");
        assert_eq!(
            restored.params.get("created__ge"),
            Some(&ParamValue::Int(1492074300))
        );
    }

    #[test]
    fn test_default_query() {
        let query = default_query("alice", "04/13/2017 9:05 AM".into());
        assert_eq!(query["active"], "active");
        assert_eq!(query["target"], "alice");
        assert_eq!(query["incidentStart"], "04/13/2017 9:05 AM");
    }

    #[test]
    fn test_form_query_form_round_trip() {
        let values = FilterValues::from([
            ("filter-name", "db & cache".to_string()),
            ("filter-target", "alice".to_string()),
            ("filter-incidentStart", "04/13/2017 9:05 AM".to_string()),
            ("filter-active", "inactive".to_string()),
        ]);
        let query = parse_query(&serialize_filters(FIELDS, &values));
        let restored = restore_filters(FIELDS, &query, no_dates);
        assert_eq!(restored.values, values);
    }

    #[test]
    fn test_parse_query_plus_is_space() {
        let query = parse_query("name=db+cache");
        assert_eq!(query["name"], "db cache");
    }
}

//! Typeahead input for targets and plans.
//!
//! Источник подсказок выбирается при привязке: явный тип поля, тип от
//! вызывающего кода или тип роли, выбранной в соседнем select. Смена
//! источника сбрасывает подсказки и отменяет запросы в полёте.

use crate::layout::global_context::use_app_context;
use crate::shared::api_utils::get_json;
use crate::shared::config::AppConfig;
use crate::shared::request_tracker::RequestTracker;
use contracts::shared::app_data::AppData;
use gloo_timers::future::TimeoutFuture;
use leptos::prelude::*;
use leptos::task::spawn_local;
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeaheadSource {
    /// `/v0/targets/<type>`: user, team, roster, mailing_list...
    Target(String),
    /// Active plans by name prefix
    Plan,
    /// Plans of one application, for re-escalation
    ApplicationPlans(String),
}

impl TypeaheadSource {
    pub fn suggestion_url(&self, config: &AppConfig, query: &str) -> String {
        let q = urlencoding::encode(query);
        match self {
            TypeaheadSource::Target(kind) => config.api(&format!(
                "targets/{}?startswith={}&active=1",
                urlencoding::encode(kind),
                q
            )),
            TypeaheadSource::Plan => config.api(&format!("plans?name__startswith={}&active=1", q)),
            TypeaheadSource::ApplicationPlans(app) => config.api(&format!(
                "applications/{}/plans?name__contains={}",
                urlencoding::encode(app),
                q
            )),
        }
    }
}

/// Where a target input takes its target type from
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TargetTypeDescriptor {
    /// Fixed type of the field itself
    pub override_type: Option<String>,
    /// Type passed by the page
    pub caller_type: Option<String>,
    /// Role currently selected next to the field
    pub sibling_role: Option<String>,
}

impl TargetTypeDescriptor {
    pub fn fixed(kind: &str) -> Self {
        Self {
            override_type: Some(kind.to_string()),
            ..Default::default()
        }
    }

    pub fn for_role(role: &str) -> Self {
        Self {
            sibling_role: Some(role.to_string()),
            ..Default::default()
        }
    }

    pub fn resolve(&self, data: &AppData) -> Option<TypeaheadSource> {
        let non_empty = |s: &Option<String>| s.clone().filter(|v| !v.is_empty());
        non_empty(&self.override_type)
            .or_else(|| non_empty(&self.caller_type))
            .or_else(|| {
                self.sibling_role
                    .as_deref()
                    .and_then(|role| data.role_url_type(role))
                    .map(str::to_string)
            })
            .map(TypeaheadSource::Target)
    }
}

/// Targets come back as strings, plans as objects with `name`.
pub fn suggestions_from(response: &Value) -> Vec<String> {
    response
        .as_array()
        .map(|items| {
            items
                .iter()
                .filter_map(|item| match item {
                    Value::String(s) => Some(s.clone()),
                    Value::Object(obj) => obj.get("name").and_then(|n| n.as_str()).map(str::to_string),
                    _ => None,
                })
                .collect()
        })
        .unwrap_or_default()
}

#[component]
pub fn Typeahead(
    #[prop(into)] source: Signal<Option<TypeaheadSource>>,
    #[prop(into)] value: Signal<String>,
    on_change: Callback<String>,
    /// Fired when a suggestion is picked
    #[prop(optional)]
    on_select: Option<Callback<String>>,
    #[prop(optional, into)] placeholder: String,
    #[prop(optional, into)] class: MaybeProp<String>,
    #[prop(optional, into)] disabled: MaybeProp<bool>,
) -> impl IntoView {
    let ctx = use_app_context();
    let config = StoredValue::new(ctx.config());
    let suggestions = RwSignal::new(Vec::<String>::new());
    let open = RwSignal::new(false);
    let tracker = StoredValue::new(RequestTracker::new());

    // rebinding
    Effect::new(move |_| {
        source.track();
        tracker.with_value(|t| t.invalidate());
        suggestions.set(Vec::new());
    });

    let request = move |query: String| {
        let token = tracker.with_value(|t| t.next());
        let Some(src) = source.get_untracked() else {
            return;
        };
        if query.trim().is_empty() {
            suggestions.set(Vec::new());
            return;
        }
        let delay = config.with_value(|c| c.typeahead_debounce_ms);
        spawn_local(async move {
            TimeoutFuture::new(delay).await;
            if !tracker.with_value(|t| t.is_current(token)) {
                return;
            }
            let url = config.with_value(|c| src.suggestion_url(c, &query));
            match get_json::<Value>(&url).await {
                Ok(response) => {
                    if tracker.with_value(|t| t.is_current(token)) {
                        suggestions.set(suggestions_from(&response));
                        open.set(true);
                    }
                }
                Err(e) => log::warn!("typeahead {} failed: {}", url, e),
            }
        });
    };

    let pick = move |choice: String| {
        on_change.run(choice.clone());
        if let Some(cb) = on_select {
            cb.run(choice);
        }
        open.set(false);
        suggestions.set(Vec::new());
    };

    view! {
        <span class="twitter-typeahead">
            <input
                type="text"
                class=move || format!("form-control typeahead {}", class.get().unwrap_or_default())
                placeholder=placeholder
                autocomplete="off"
                disabled=move || disabled.get().unwrap_or(false)
                prop:value=move || value.get()
                on:input=move |ev| {
                    let text = event_target_value(&ev);
                    on_change.run(text.clone());
                    request(text);
                }
                on:blur=move |_| open.set(false)
            />
            <Show when=move || open.get() && !suggestions.with(|s| s.is_empty())>
                <div class="tt-menu">
                    <For
                        each=move || suggestions.get()
                        key=|s| s.clone()
                        children=move |s| {
                            let label = s.clone();
                            view! {
                                <div
                                    class="tt-suggestion"
                                    on:mousedown=move |ev| {
                                        ev.prevent_default();
                                        pick(s.clone());
                                    }
                                >
                                    {label}
                                </div>
                            }
                        }
                    />
                </div>
            </Show>
        </span>
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::shared::app_data::TargetRole;

    fn data() -> AppData {
        AppData {
            target_roles: vec![
                TargetRole {
                    name: "user".into(),
                    url_type: "user".into(),
                },
                TargetRole {
                    name: "oncall-primary".into(),
                    url_type: "team".into(),
                },
            ],
            ..Default::default()
        }
    }

    #[test]
    fn test_resolution_order() {
        let data = data();
        let mut desc = TargetTypeDescriptor {
            override_type: Some("mailing_list".into()),
            caller_type: Some("user".into()),
            sibling_role: Some("oncall-primary".into()),
        };
        assert_eq!(
            desc.resolve(&data),
            Some(TypeaheadSource::Target("mailing_list".into()))
        );
        desc.override_type = None;
        assert_eq!(desc.resolve(&data), Some(TypeaheadSource::Target("user".into())));
        desc.caller_type = Some(String::new());
        assert_eq!(desc.resolve(&data), Some(TypeaheadSource::Target("team".into())));
        desc.sibling_role = Some("unknown".into());
        assert_eq!(desc.resolve(&data), None);
    }

    #[test]
    fn test_suggestion_urls() {
        let config = AppConfig::default();
        assert_eq!(
            TypeaheadSource::Target("user".into()).suggestion_url(&config, "al"),
            "/v0/targets/user?startswith=al&active=1"
        );
        assert_eq!(
            TypeaheadSource::Plan.suggestion_url(&config, "db plan"),
            "/v0/plans?name__startswith=db%20plan&active=1"
        );
        assert_eq!(
            TypeaheadSource::ApplicationPlans("my app".into()).suggestion_url(&config, "x"),
            "/v0/applications/my%20app/plans?name__contains=x"
        );
    }

    #[test]
    fn test_suggestions_from() {
        let targets = serde_json::json!(["alice", "albert"]);
        assert_eq!(suggestions_from(&targets), vec!["alice", "albert"]);
        let plans = serde_json::json!([{"id": 1, "name": "db"}, {"id": 2}]);
        assert_eq!(suggestions_from(&plans), vec!["db"]);
        assert!(suggestions_from(&serde_json::json!({"error": 1})).is_empty());
    }
}

//! TopHeader - brand, section links and the signed-in user.

use crate::layout::global_context::use_app_context;
use crate::routes::navigation::current_pathname;
use crate::shared::icons::icon;
use leptos::prelude::*;

/// (path, label, icon)
const SECTIONS: &[(&str, &str, &str)] = &[
    ("/incidents/", "Incidents", "incidents"),
    ("/plans/", "Plans", "plans"),
    ("/templates/", "Templates", "templates"),
    ("/messages/", "Messages", "messages"),
    ("/applications/", "Applications", "applications"),
    ("/stats/", "Stats", "stats"),
];

/// Section of the first path segment, `/plans/42` → `/plans/`
fn section_of(pathname: &str) -> String {
    let first = pathname.trim_matches('/').split('/').next().unwrap_or_default();
    format!("/{}/", first)
}

#[component]
pub fn TopHeader() -> impl IntoView {
    let ctx = use_app_context();
    // Навигация полной перезагрузкой, раздел вычисляется один раз
    let active = section_of(&current_pathname());

    let links = SECTIONS
        .iter()
        .map(|(path, label, name)| {
            let class = if active == *path {
                "top-header__link top-header__link--active"
            } else {
                "top-header__link"
            };
            view! {
                <a class=class href=*path>
                    {icon(name)}
                    <span>{*label}</span>
                </a>
            }
        })
        .collect_view();

    view! {
        <div class="top-header">
            <div class="top-header__brand">
                <a class="top-header__title" href="/">"Iris"</a>
            </div>
            <nav class="top-header__nav">{links}</nav>
            <div class="top-header__actions">
                <a class="top-header__user" href="/user/" title="Settings">
                    {icon("user")}
                    <span>{ctx.user()}</span>
                </a>
            </div>
        </div>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_section_of() {
        assert_eq!(section_of("/plans/42"), "/plans/");
        assert_eq!(section_of("/incidents/"), "/incidents/");
    }
}

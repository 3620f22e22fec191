use crate::dashboards::d400_stats::{StatsKind, StatsView};
use crate::domain::a001_plan::ui::details::PlanView;
use crate::domain::a001_plan::ui::list::PlansView;
use crate::domain::a002_template::ui::details::TemplateView;
use crate::domain::a002_template::ui::list::TemplatesView;
use crate::domain::a003_incident::ui::details::IncidentView;
use crate::domain::a003_incident::ui::list::IncidentsView;
use crate::domain::a004_message::ui::details::MessageView;
use crate::domain::a004_message::ui::list::MessagesView;
use crate::domain::a005_application::ui::details::ApplicationView;
use crate::domain::a005_application::ui::list::ApplicationsView;
use crate::layout::global_context::{use_app_context, AppContext};
use crate::routes::navigation::current_pathname;
use crate::shared::view_module::{EntityRef, ViewModule};
use crate::system::unsubscribe::UnsubscribeView;
use crate::system::user_settings::UserSettingsView;
use leptos::prelude::*;

/// Страница, выбранная по пути. Одна и та же серверная страница отдаётся
/// на любой путь, модуль выбирается на клиенте.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Plans,
    Plan(String),
    Templates,
    Template(String),
    Incidents,
    Incident(String),
    Messages,
    Message(String),
    Applications,
    Application(String),
    Stats,
    Stat(String),
    SingleStat(String),
    User,
    Unsubscribe(String),
}

fn decode_segment(segment: &str) -> String {
    urlencoding::decode(segment)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| segment.to_string())
}

/// `/plans/42/` → `Plan("42")`; unknown shapes give `None`.
pub fn parse_route(pathname: &str) -> Option<Route> {
    let path = pathname.strip_prefix('/').unwrap_or(pathname);
    let path = path.strip_suffix('/').unwrap_or(path);
    if path.is_empty() {
        return None;
    }

    let segments: Vec<String> = path.split('/').map(decode_segment).collect();
    match segments.as_slice() {
        [collection] => match collection.as_str() {
            "plans" => Some(Route::Plans),
            "templates" => Some(Route::Templates),
            "incidents" => Some(Route::Incidents),
            "messages" => Some(Route::Messages),
            "applications" => Some(Route::Applications),
            "stats" => Some(Route::Stats),
            "user" => Some(Route::User),
            _ => None,
        },
        [collection, id] => {
            let id = id.clone();
            match collection.as_str() {
                "unsubscribe" => Some(Route::Unsubscribe(id)),
                "plans" => Some(Route::Plan(id)),
                "templates" => Some(Route::Template(id)),
                "incidents" => Some(Route::Incident(id)),
                "messages" => Some(Route::Message(id)),
                "applications" => Some(Route::Application(id)),
                "stats" => Some(Route::Stat(id)),
                "singlestats" => Some(Route::SingleStat(id)),
                _ => None,
            }
        }
        _ => None,
    }
}

fn mount<M: ViewModule>(module: M) -> AnyView {
    module.init();
    module.view()
}

fn dispatch(route: Route, ctx: AppContext) -> AnyView {
    match route {
        Route::Plans => mount(PlansView::new(ctx)),
        Route::Plan(id) => mount(PlanView::new(ctx, EntityRef::parse(&id))),
        Route::Templates => mount(TemplatesView::new(ctx)),
        Route::Template(id) => mount(TemplateView::new(ctx, EntityRef::parse(&id))),
        Route::Incidents => mount(IncidentsView::new(ctx)),
        Route::Incident(id) => mount(IncidentView::new(ctx, id)),
        Route::Messages => mount(MessagesView::new(ctx)),
        Route::Message(id) => mount(MessageView::new(ctx, id)),
        Route::Applications => mount(ApplicationsView::new(ctx)),
        Route::Application(name) => mount(ApplicationView::new(ctx, name)),
        Route::Stats => mount(StatsView::new(ctx, StatsKind::All)),
        Route::Stat(app) => mount(StatsView::new(ctx, StatsKind::Application(app))),
        Route::SingleStat(name) => mount(StatsView::new(ctx, StatsKind::Single(name))),
        Route::User => mount(UserSettingsView::new(ctx)),
        Route::Unsubscribe(app) => mount(UnsubscribeView::new(ctx, app)),
    }
}

/// Renders the module of the current path; re-evaluated on `popstate`.
#[component]
pub fn RouteOutlet() -> impl IntoView {
    let ctx = use_app_context();
    let route = RwSignal::new(parse_route(&current_pathname()));

    let handle = window_event_listener(leptos::ev::popstate, move |_| {
        route.set(parse_route(&current_pathname()));
    });
    on_cleanup(move || handle.remove());

    move || match route.get() {
        Some(r) => {
            log::debug!("route: {:?}", r);
            dispatch(r, ctx)
        }
        None => {
            log::debug!("no route for {}", current_pathname());
            ().into_any()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collections() {
        assert_eq!(parse_route("/plans/"), Some(Route::Plans));
        assert_eq!(parse_route("/plans"), Some(Route::Plans));
        assert_eq!(parse_route("/templates"), Some(Route::Templates));
        assert_eq!(parse_route("/incidents/"), Some(Route::Incidents));
        assert_eq!(parse_route("/messages"), Some(Route::Messages));
        assert_eq!(parse_route("/applications/"), Some(Route::Applications));
        assert_eq!(parse_route("/stats"), Some(Route::Stats));
        assert_eq!(parse_route("/user/"), Some(Route::User));
    }

    #[test]
    fn test_entities_are_singularized() {
        assert_eq!(parse_route("/plans/42"), Some(Route::Plan("42".into())));
        assert_eq!(parse_route("/plans/new/"), Some(Route::Plan("new".into())));
        assert_eq!(
            parse_route("/templates/42"),
            Some(Route::Template("42".into()))
        );
        assert_eq!(
            parse_route("/incidents/7"),
            Some(Route::Incident("7".into()))
        );
        assert_eq!(parse_route("/messages/9"), Some(Route::Message("9".into())));
        assert_eq!(
            parse_route("/applications/foo"),
            Some(Route::Application("foo".into()))
        );
        assert_eq!(parse_route("/stats/foo"), Some(Route::Stat("foo".into())));
        assert_eq!(
            parse_route("/singlestats/total_plans"),
            Some(Route::SingleStat("total_plans".into()))
        );
    }

    #[test]
    fn test_unsubscribe_keeps_its_name() {
        assert_eq!(
            parse_route("/unsubscribe/app"),
            Some(Route::Unsubscribe("app".into()))
        );
        assert_eq!(parse_route("/unsubscribe"), None);
    }

    #[test]
    fn test_segments_are_decoded() {
        assert_eq!(
            parse_route("/applications/my%20app"),
            Some(Route::Application("my app".into()))
        );
    }

    #[test]
    fn test_unknown_paths() {
        assert_eq!(parse_route("/"), None);
        assert_eq!(parse_route(""), None);
        assert_eq!(parse_route("/foo"), None);
        assert_eq!(parse_route("/foo/1"), None);
        assert_eq!(parse_route("/plans/1/edit"), None);
        assert_eq!(parse_route("/incident/1"), None);
    }
}

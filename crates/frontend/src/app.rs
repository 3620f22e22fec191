use crate::layout::global_context::AppContext;
use crate::layout::Shell;
use crate::routes::routes::RouteOutlet;
use leptos::prelude::*;

#[component]
pub fn App() -> impl IntoView {
    // Bootstrap data is read once from the page and shared via context.
    let ctx = AppContext::bootstrap();
    provide_context(ctx);

    // Alerts are used both through AppContext and `use_alerts()`.
    provide_context(ctx.alerts);

    view! {
        <Shell>
            <RouteOutlet />
        </Shell>
    }
}

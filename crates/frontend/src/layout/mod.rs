pub mod global_context;
pub mod top_header;

use crate::shared::alert::{AlertAnchor, AlertTarget};
use leptos::prelude::*;
use top_header::TopHeader;

/// Main application shell.
///
/// ```text
/// +------------------------------------------+
/// |              TopHeader                    |
/// +------------------------------------------+
/// |  alerts + current page                    |
/// +------------------------------------------+
/// ```
#[component]
pub fn Shell(children: Children) -> impl IntoView {
    view! {
        <div class="app-layout">
            <TopHeader />
            <div class="app-main">
                <AlertAnchor target=AlertTarget::Main class="content">
                    {children()}
                </AlertAnchor>
            </div>
        </div>
    }
}

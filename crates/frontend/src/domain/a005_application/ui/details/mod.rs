pub mod model;
pub mod view;
pub mod view_model;

use crate::layout::global_context::AppContext;
use crate::shared::view_module::{ModuleLifecycle, ViewModule};
use leptos::prelude::*;
use view::ApplicationDetailsView;
use view_model::ApplicationDetailsViewModel;

/// `/applications/<name>`
pub struct ApplicationView {
    ctx: AppContext,
    name: String,
    lifecycle: ModuleLifecycle,
    vm: ApplicationDetailsViewModel,
}

impl ApplicationView {
    pub fn new(ctx: AppContext, name: String) -> Self {
        Self {
            ctx,
            name,
            lifecycle: ModuleLifecycle::new(),
            vm: ApplicationDetailsViewModel::new(ctx),
        }
    }
}

impl ViewModule for ApplicationView {
    fn title(&self) -> String {
        let name = self
            .ctx
            .with_data(|d| d.find_application(&self.name).map(|a| a.name.clone()))
            .unwrap_or_else(|| self.name.clone());
        format!("Application {}", name)
    }

    fn lifecycle(&self) -> &ModuleLifecycle {
        &self.lifecycle
    }

    fn events(&self) {
        let vm = self.vm;
        let handle = window_event_listener(leptos::ev::beforeunload, move |ev| {
            if vm.guards_unload() {
                ev.prevent_default();
                ev.set_return_value("You have unsaved changes.");
            }
        });
        on_cleanup(move || handle.remove());
    }

    fn load(&self) {
        self.vm.load(&self.name);
    }

    fn view(&self) -> AnyView {
        view! { <ApplicationDetailsView vm=self.vm /> }.into_any()
    }
}

pub mod model;
pub mod view;
pub mod view_model;

use crate::layout::global_context::AppContext;
use crate::shared::view_module::{ModuleLifecycle, ViewModule};
use leptos::prelude::*;
use view::UserSettingsPage;
use view_model::UserSettingsViewModel;

/// `/user`: notification modes, timezone, overrides, reprioritization
pub struct UserSettingsView {
    lifecycle: ModuleLifecycle,
    vm: UserSettingsViewModel,
}

impl UserSettingsView {
    pub fn new(ctx: AppContext) -> Self {
        Self {
            lifecycle: ModuleLifecycle::new(),
            vm: UserSettingsViewModel::new(ctx),
        }
    }
}

impl ViewModule for UserSettingsView {
    fn title(&self) -> String {
        "Settings".to_string()
    }

    fn lifecycle(&self) -> &ModuleLifecycle {
        &self.lifecycle
    }

    fn load(&self) {
        self.vm.load();
    }

    fn view(&self) -> AnyView {
        view! { <UserSettingsPage vm=self.vm /> }.into_any()
    }
}

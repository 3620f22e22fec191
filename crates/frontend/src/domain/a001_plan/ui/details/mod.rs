pub mod model;
pub mod view;
pub mod view_model;

use crate::layout::global_context::AppContext;
use crate::shared::view_module::{EntityRef, ModuleLifecycle, ViewModule};
use leptos::prelude::*;
use view::PlanDetailsView;
use view_model::PlanDetailsViewModel;

/// `/plans/<id>` and `/plans/new`
pub struct PlanView {
    entity: EntityRef,
    lifecycle: ModuleLifecycle,
    vm: PlanDetailsViewModel,
}

impl PlanView {
    pub fn new(ctx: AppContext, entity: EntityRef) -> Self {
        Self {
            entity,
            lifecycle: ModuleLifecycle::new(),
            vm: PlanDetailsViewModel::new(ctx),
        }
    }
}

impl ViewModule for PlanView {
    fn title(&self) -> String {
        match &self.entity {
            EntityRef::New => "New plan".to_string(),
            EntityRef::Id(_) => "Plan".to_string(),
        }
    }

    fn lifecycle(&self) -> &ModuleLifecycle {
        &self.lifecycle
    }

    fn events(&self) {
        let vm = self.vm;
        let handle = window_event_listener(leptos::ev::beforeunload, move |ev| {
            if vm.guards_unload() {
                ev.prevent_default();
                ev.set_return_value("You have unpublished changes.");
            }
        });
        on_cleanup(move || handle.remove());
    }

    fn load(&self) {
        self.vm.load(&self.entity);
    }

    fn view(&self) -> AnyView {
        view! { <PlanDetailsView vm=self.vm /> }.into_any()
    }
}

pub mod model;
pub mod view;
pub mod view_model;

use crate::layout::global_context::AppContext;
use crate::shared::table::TableController;
use crate::shared::view_module::{ModuleLifecycle, ViewModule};
use contracts::domain::a003_incident::aggregate::IncidentStep;
use leptos::prelude::*;
use view::IncidentDetailsView;
use view_model::IncidentDetailsViewModel;

/// `/incidents/<id>`
pub struct IncidentView {
    id: String,
    lifecycle: ModuleLifecycle,
    steps: TableController<IncidentStep>,
    vm: IncidentDetailsViewModel,
}

impl IncidentView {
    pub fn new(ctx: AppContext, id: String) -> Self {
        let steps = TableController::new(&ctx, ("id", false));
        Self {
            id,
            lifecycle: ModuleLifecycle::new(),
            vm: IncidentDetailsViewModel::new(ctx, steps.table),
            steps,
        }
    }
}

impl ViewModule for IncidentView {
    fn title(&self) -> String {
        format!("Incident #{}", self.id)
    }

    fn lifecycle(&self) -> &ModuleLifecycle {
        &self.lifecycle
    }

    fn events(&self) {
        self.steps.bind_arrow_keys();
    }

    fn load(&self) {
        self.vm.load(self.id.clone());
    }

    fn view(&self) -> AnyView {
        view! { <IncidentDetailsView vm=self.vm steps=self.steps.clone() /> }.into_any()
    }
}

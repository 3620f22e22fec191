//! `/unsubscribe/<app>`: drop every message of one application.

use crate::domain::a005_application::api as app_api;
use crate::layout::global_context::AppContext;
use crate::shared::view_module::{ModuleLifecycle, ViewModule};
use crate::system::user_settings::model::{unsubscribe_dto, DROP_MODE};
use crate::system::users::api;
use contracts::shared::app_data::ApplicationInfo;
use contracts::system::users::User;
use leptos::prelude::*;
use thaw::*;

fn is_eligible(app: &ApplicationInfo) -> bool {
    app.supported_modes.iter().any(|m| m == DROP_MODE)
}

pub struct UnsubscribeView {
    ctx: AppContext,
    app: String,
    lifecycle: ModuleLifecycle,
    loaded: RwSignal<Option<(ApplicationInfo, User)>>,
    busy: RwSignal<bool>,
}

impl UnsubscribeView {
    pub fn new(ctx: AppContext, app: String) -> Self {
        Self {
            ctx,
            app,
            lifecycle: ModuleLifecycle::new(),
            loaded: RwSignal::new(None),
            busy: RwSignal::new(false),
        }
    }
}

impl ViewModule for UnsubscribeView {
    fn title(&self) -> String {
        "Unsubscribe".to_string()
    }

    fn lifecycle(&self) -> &ModuleLifecycle {
        &self.lifecycle
    }

    fn load(&self) {
        let ctx = self.ctx;
        let loaded = self.loaded;
        let name = self.app.clone();
        let user = ctx.user();
        let cfg = ctx.config();
        wasm_bindgen_futures::spawn_local(async move {
            let (app, user) = futures::join!(
                app_api::fetch_application(&cfg, &name),
                api::fetch_user(&cfg, &user)
            );
            match (app, user) {
                (Ok(app), Ok(user)) => loaded.set(Some((app, user))),
                (Err(e), _) | (Ok(_), Err(e)) => {
                    log::warn!("unsubscribe page for {} failed to load: {}", name, e);
                    ctx.alerts.danger("Failed to fetch application data");
                }
            }
        });
    }

    fn view(&self) -> AnyView {
        let ctx = self.ctx;
        let loaded = self.loaded;
        let busy = self.busy;

        let unsubscribe = move || {
            let Some(dto) = loaded.with_untracked(|l| {
                l.as_ref()
                    .map(|(app, user)| ctx.with_data(|d| unsubscribe_dto(user, d, &app.name)))
            }) else {
                return;
            };
            let user = ctx.user();
            let cfg = ctx.config();
            busy.set(true);
            wasm_bindgen_futures::spawn_local(async move {
                match api::save_modes(&cfg, &user, &dto).await {
                    Ok(()) => ctx
                        .alerts
                        .success("Successfully unsubscribed from all messages sent by this app!"),
                    Err(e) => ctx.alerts.danger(format!("Failed to unsubscribe: {}", e)),
                }
                busy.set(false);
            });
        };

        let body = move || {
            loaded.get().map(|(app, _)| {
                let eligible = is_eligible(&app);
                let owners = app.owners.join(", ");
                view! {
                    <h1 class="page__title">{format!("Unsubscribe from {}", app.name)}</h1>
                    <p>{format!("Owners: {}", owners)}</p>
                    {if eligible {
                        view! {
                            <Button
                                appearance=ButtonAppearance::Primary
                                disabled=busy
                                on_click=move |_| unsubscribe()
                            >
                                "Unsubscribe"
                            </Button>
                        }
                        .into_any()
                    } else {
                        view! {
                            <p class="unsub-ineligible">
                                "This application does not allow unsubscribing. Contact its owners."
                            </p>
                        }
                        .into_any()
                    }}
                }
            })
        };

        view! { <div class="unsub">{body}</div> }.into_any()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_eligible_only_with_drop_mode() {
        let mut app = ApplicationInfo {
            name: "nodes".into(),
            supported_modes: vec!["sms".into()],
            ..Default::default()
        };
        assert!(!is_eligible(&app));
        app.supported_modes.push("drop".into());
        assert!(is_eligible(&app));
    }
}

use super::model::{application_key, content_key, variables_for, ModeContent, TemplateForm};
use super::view_model::{Preview, TemplateDetailsViewModel};
use crate::shared::date_utils::{format_opt_unix, version_label};
use crate::shared::icons::icon;
use crate::shared::view_module::DetailState;
use leptos::prelude::*;
use thaw::*;

fn current(state: &Option<DetailState<TemplateForm>>) -> Option<&TemplateForm> {
    state.as_ref().and_then(|s| s.current())
}

#[component]
pub fn TemplateDetailsView(vm: TemplateDetailsViewModel) -> impl IntoView {
    let state = vm.state;
    let editing = Memo::new(move |_| vm.is_editing());
    let loaded = Memo::new(move |_| state.with(|s| s.is_some()));
    let block_keys = move || {
        state.with(|s| {
            current(s)
                .map(|t| t.blocks.iter().map(|b| b.key).collect::<Vec<_>>())
                .unwrap_or_default()
        })
    };
    let name = move || state.with(|s| current(s).map(|t| t.name.clone()).unwrap_or_default());
    let errors = vm.errors;

    move || {
        if !loaded.get() {
            return view! { <div class="page__loading">"Loading..."</div> }.into_any();
        }
        view! {
            <div class="template-details" id="template-details">
                {header(vm, editing)}
                <div class="form__group">
                    <Label>"Name"</Label>
                    <input
                        type="text"
                        id="template-name"
                        class=move || format!("form__input {}", errors.with(|e| e.class_for("template-name")))
                        disabled=move || !editing.get()
                        prop:value=name
                        on:input=move |ev| {
                            let v = event_target_value(&ev);
                            vm.update(|t| t.name = v);
                        }
                    />
                </div>
                <div class="template-steps">
                    <For each=block_keys key=|k| *k children=move |key| block_editor(vm, editing, key) />
                </div>
                <Show when=move || editing.get()>
                    <button type="button" class="button" on:click=move |_| vm.add_block()>
                        {icon("plus")}
                        " Add application"
                    </button>
                </Show>
                {related_plans(vm)}
            </div>
        }
        .into_any()
    }
}

fn header(vm: TemplateDetailsViewModel, editing: Memo<bool>) -> impl IntoView {
    let state = vm.state;
    let versions = vm.versions;
    let busy = vm.busy;

    let saved = move || state.with(|s| s.as_ref().and_then(|s| s.saved()).cloned());
    let title = move || {
        state.with(|s| match current(s) {
            Some(t) if !t.name.is_empty() => format!("Template: {}", t.name),
            _ => "New template".to_string(),
        })
    };
    let selected_version = move || saved().and_then(|t| t.id).map(|id| id.to_string()).unwrap_or_default();
    let can_activate = move || saved().is_some_and(|t| !t.active);
    let meta = move || {
        saved().map(|t| {
            format!(
                "Created by {} on {}{}",
                t.creator,
                format_opt_unix(t.created),
                if t.active { " (active)" } else { "" }
            )
        })
    };

    view! {
        <div class="page__header">
            <h1 class="page__title">{title}</h1>
            <p class="page__meta">{meta}</p>
            <Show when=move || !versions.with(|v| v.is_empty())>
                <label class="form__label">
                    "Version "
                    <select
                        class="form__select version-select"
                        prop:value=selected_version
                        on:change=move |ev| {
                            if let Ok(id) = event_target_value(&ev).parse::<i64>() {
                                vm.switch_version(id);
                            }
                        }
                    >
                        <For
                            each=move || versions.get()
                            key=|v| v.id
                            children=move |v| {
                                let value = v.id.to_string();
                                let selected = value.clone();
                                view! {
                                    <option value=value selected=move || selected_version() == selected>
                                        {version_label(v.id, v.created, &v.creator)}
                                    </option>
                                }
                            }
                        />
                    </select>
                </label>
            </Show>
            <div class="page__actions">
                {move || {
                    if editing.get() {
                        view! {
                            <Button
                                appearance=ButtonAppearance::Primary
                                disabled=busy
                                on_click=move |_| vm.publish()
                            >
                                {icon("save")}
                                " Publish"
                            </Button>
                            <Button on_click=move |_| vm.discard()>{icon("x")} " Discard"</Button>
                        }
                        .into_any()
                    } else {
                        view! {
                            <Button appearance=ButtonAppearance::Primary on_click=move |_| vm.edit()>
                                {icon("copy")}
                                " Clone"
                            </Button>
                            <Show when=can_activate>
                                <Button on_click=move |_| vm.activate()>{icon("check")} " Activate"</Button>
                            </Show>
                            <Button on_click=move |_| vm.show_related.update(|v| *v = !*v)>
                                {icon("plans")}
                                " View related plans"
                            </Button>
                        }
                        .into_any()
                    }
                }}
            </div>
        </div>
    }
}

fn block_editor(vm: TemplateDetailsViewModel, editing: Memo<bool>, key: u32) -> impl IntoView {
    let ctx = vm.ctx();
    let state = vm.state;
    let errors = vm.errors;
    let application = Signal::derive(move || {
        state.with(|s| {
            current(s)
                .and_then(|t| t.block(key))
                .map(|b| b.application.clone())
                .unwrap_or_default()
        })
    });
    let modes = move || {
        state.with(|s| {
            current(s)
                .and_then(|t| t.block(key))
                .map(|b| b.modes.iter().map(|m| m.mode.clone()).collect::<Vec<_>>())
                .unwrap_or_default()
        })
    };
    let variables = move || {
        let app = application.get();
        ctx.with_data(|d| variables_for(d, &app))
            .into_iter()
            .map(|(name, required)| {
                view! {
                    <li class=if required { "variable variable--required" } else { "variable" }>
                        {format!("{{{{{}}}}}", name)}
                    </li>
                }
            })
            .collect_view()
    };
    let applications = ctx.with_data(|d| d.applications.iter().map(|a| a.name.clone()).collect::<Vec<_>>());

    view! {
        <div class="step template-step">
            <div class="template-step__header">
                <select
                    class=move || format!("form__select template-application {}",
                        errors.with(|e| e.class_for(&application_key(key))))
                    disabled=move || !editing.get()
                    prop:value=move || application.get()
                    on:change=move |ev| {
                        let v = event_target_value(&ev);
                        vm.update(|t| {
                            if let Some(b) = t.block_mut(key) {
                                b.application = v;
                            }
                        });
                    }
                >
                    <option value="">"Application"</option>
                    {applications.into_iter().map(|name| {
                        let selected = name.clone();
                        let option_value = name.clone();
                        view! {
                            <option value=option_value selected=move || application.get() == selected>{name}</option>
                        }
                    }).collect_view()}
                </select>
                <Show when=move || editing.get()>
                    <button
                        type="button"
                        class="button button--danger remove-step"
                        on:click=move |_| vm.update(|t| t.remove_block(key))
                    >
                        {icon("x")}
                        " Remove"
                    </button>
                </Show>
            </div>
            <ul class="variables">{variables}</ul>
            <For each=modes key=|m| m.clone() children=move |mode| mode_editor(vm, editing, key, mode) />
        </div>
    }
}

fn mode_editor(vm: TemplateDetailsViewModel, editing: Memo<bool>, key: u32, mode: String) -> impl IntoView {
    let state = vm.state;
    let errors = vm.errors;
    let mode = StoredValue::new(mode);

    let content = move |get: fn(&ModeContent) -> String| {
        move || {
            state.with(|s| {
                current(s)
                    .and_then(|t| t.block(key))
                    .and_then(|b| mode.with_value(|m| b.modes.iter().find(|c| &c.mode == m).map(get)))
                    .unwrap_or_default()
            })
        }
    };
    let set = move |apply: fn(&mut ModeContent, String), value: String| {
        let name = mode.get_value();
        vm.update(|t| {
            if let Some(m) = t.mode_mut(key, &name) {
                apply(m, value);
            }
        });
    };
    let class = move |base: &'static str, part: &'static str| {
        move || {
            let field = mode.with_value(|m| content_key(key, m, part));
            format!("{} {}", base, errors.with(|e| e.class_for(&field)))
        }
    };
    let has_subject = mode.with_value(|m| m == super::model::SUBJECT_MODE);

    let preview = move || {
        vm.preview.with(|p| {
            p.as_ref()
                .filter(|p| p.block == key && mode.with_value(|m| &p.mode == m))
                .map(|p| p.preview.clone())
        })
    };
    let preview_view = move || {
        preview().map(|p| {
            let body = match p {
                Preview::Loading => view! { <i class="loader"></i> }.into_any(),
                Preview::Rendered { subject, body } => view! {
                    {subject.map(|s| view! { <div class="preview-subject" style="white-space: pre-line;">{s}</div> })}
                    <div class="preview-body" style="white-space: pre-line;">{body}</div>
                }
                .into_any(),
                Preview::Failed(message) => view! {
                    <div class="alert alert-danger" style="white-space: pre-line;">{message}</div>
                }
                .into_any(),
            };
            view! {
                <div class="template-preview">
                    <button type="button" class="close" aria-label="Close" on:click=move |_| vm.close_preview()>
                        "×"
                    </button>
                    {body}
                </div>
            }
        })
    };

    view! {
        <div class="template-notification">
            <h5 class="template-notification__mode">{mode.get_value()}</h5>
            {has_subject.then(|| view! {
                <input
                    type="text"
                    placeholder="Subject"
                    class=class("form__input template-subject", "subject")
                    disabled=move || !editing.get()
                    prop:value=content(|m| m.subject.clone())
                    on:input=move |ev| set(|m, v| m.subject = v, event_target_value(&ev))
                />
            })}
            <textarea
                placeholder="Body"
                class=class("form__textarea template-body", "body")
                disabled=move || !editing.get()
                prop:value=content(|m| m.body.clone())
                on:input=move |ev| set(|m, v| m.body = v, event_target_value(&ev))
            ></textarea>
            <button
                type="button"
                class="button preview-template"
                on:click=move |_| vm.preview(key, mode.get_value())
            >
                "Preview"
            </button>
            {preview_view}
        </div>
    }
}

fn related_plans(vm: TemplateDetailsViewModel) -> impl IntoView {
    let state = vm.state;
    let shown = vm.show_related;
    move || {
        if !shown.get() {
            return ().into_any();
        }
        let plans = state.with(|s| {
            s.as_ref()
                .and_then(|s| s.saved())
                .map(|t| t.plans.clone())
                .unwrap_or_default()
        });
        if plans.is_empty() {
            return view! {
                <p class="related-plans">"No plans are currently using this template."</p>
            }
            .into_any();
        }
        view! {
            <ul class="related-plans">
                {plans.into_iter().map(|p| view! {
                    <li class="border-bottom">
                        <a href=format!("/plans/{}", p.id)>{format!("{} - ID {}", p.name, p.id)}</a>
                    </li>
                }).collect_view()}
            </ul>
        }
        .into_any()
    }
}

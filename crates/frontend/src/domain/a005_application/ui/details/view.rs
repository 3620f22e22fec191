use super::model::{ApplicationForm, QuotaForm};
use super::view_model::{ApplicationDetailsViewModel, DangerAction};
use crate::shared::icons::icon;
use crate::shared::typeahead::{Typeahead, TypeaheadSource};
use crate::shared::view_module::DetailState;
use leptos::prelude::*;
use thaw::*;

fn current(state: &Option<DetailState<ApplicationForm>>) -> Option<&ApplicationForm> {
    state.as_ref().and_then(|s| s.current())
}

#[component]
pub fn ApplicationDetailsView(vm: ApplicationDetailsViewModel) -> impl IntoView {
    let state = vm.state;
    let editing = Memo::new(move |_| vm.is_editing());
    let loaded = Memo::new(move |_| state.with(|s| s.is_some()));

    move || {
        if !loaded.get() {
            return view! { <div class="page__loading">"Loading..."</div> }.into_any();
        }
        view! {
            <div class="application-details">
                {header(vm, editing)}
                <div class="application-settings">
                    {template_field(vm, editing, "Context template", |f| &mut f.context_template, |f| f.context_template.clone())}
                    {template_field(vm, editing, "Summary template", |f| &mut f.summary_template, |f| f.summary_template.clone())}
                    {template_field(vm, editing, "Mobile template", |f| &mut f.mobile_template, |f| f.mobile_template.clone())}
                    {template_field(vm, editing, "Sample context", |f| &mut f.sample_context, |f| f.sample_context.clone())}
                </div>
                {variables(vm, editing)}
                {owners(vm, editing)}
                {supported_modes(vm, editing)}
                {default_modes(vm, editing)}
                {email_incidents(vm, editing)}
                {categories(vm, editing)}
                {quota(vm, editing)}
                {keys(vm)}
                {dangerous_actions(vm)}
            </div>
        }
        .into_any()
    }
}

fn header(vm: ApplicationDetailsViewModel, editing: Memo<bool>) -> impl IntoView {
    let flags = vm.flags;
    let busy = vm.busy;
    let actions = move || {
        if !flags.with(|f| f.is_editable()) {
            return ().into_any();
        }
        if editing.get() {
            view! {
                <Button appearance=ButtonAppearance::Primary disabled=busy on_click=move |_| vm.save()>
                    {icon("save")}
                    " Save"
                </Button>
                <Button on_click=move |_| vm.discard()>{icon("x")} " Discard"</Button>
            }
            .into_any()
        } else {
            view! {
                <Button appearance=ButtonAppearance::Primary on_click=move |_| vm.edit()>"Edit"</Button>
            }
            .into_any()
        }
    };

    view! {
        <div class="page__header">
            <h1 class="page__title">{move || format!("Application: {}", vm.name())}</h1>
            <div class="page__actions">{actions}</div>
        </div>
    }
}

fn template_field(
    vm: ApplicationDetailsViewModel,
    editing: Memo<bool>,
    label: &'static str,
    field: fn(&mut ApplicationForm) -> &mut String,
    read: fn(&ApplicationForm) -> String,
) -> impl IntoView {
    let state = vm.state;
    let value = move || state.with(|s| current(s).map(read).unwrap_or_default());
    view! {
        <div class="form__group">
            <Label>{label}</Label>
            <textarea
                class="form__textarea"
                disabled=move || !editing.get()
                prop:value=value
                on:input=move |ev| {
                    let v = event_target_value(&ev);
                    vm.update(|f| *field(f) = v);
                }
            ></textarea>
        </div>
    }
}

fn variables(vm: ApplicationDetailsViewModel, editing: Memo<bool>) -> impl IntoView {
    let state = vm.state;
    let draft = RwSignal::new(String::new());
    let list = move || state.with(|s| current(s).map(|f| f.variables.clone()).unwrap_or_default());
    let title = move || state.with(|s| current(s).and_then(|f| f.title_variable.clone()).unwrap_or_default());
    let add = move || {
        let v = draft.get_untracked();
        if vm.try_update(|f| f.add_variable(&v)) {
            draft.set(String::new());
        }
    };

    view! {
        <div class="application-variables">
            <h4>"Variables"</h4>
            <ul>
                {move || list().into_iter().map(|v| {
                    let name = v.clone();
                    view! {
                        <li>
                            {v}
                            <Show when=move || editing.get()>
                                {
                                    let name = name.clone();
                                    view! {
                                        <button type="button" class="remove-variable" on:click=move |_| {
                                            let name = name.clone();
                                            vm.update(|f| f.remove_variable(&name));
                                        }>{icon("x")}</button>
                                    }
                                }
                            </Show>
                        </li>
                    }
                }).collect_view()}
            </ul>
            <Show when=move || editing.get()>
                <div class="form__inline">
                    <input
                        id="add-variable-box"
                        class="form__input"
                        prop:value=move || draft.get()
                        on:input=move |ev| draft.set(event_target_value(&ev))
                    />
                    <Button on_click=move |_| add()>{icon("plus")} " Add variable"</Button>
                </div>
                <label class="form__label">
                    "Title variable "
                    <select
                        id="title-variable-select"
                        class="form__select"
                        prop:value=title
                        on:change=move |ev| {
                            let v = event_target_value(&ev);
                            vm.update(|f| f.title_variable = (!v.is_empty()).then_some(v));
                        }
                    >
                        <option value="">"None"</option>
                        {move || list().into_iter().map(|v| {
                            let value = v.clone();
                            view! { <option value=value>{v}</option> }
                        }).collect_view()}
                    </select>
                </label>
            </Show>
        </div>
    }
}

fn owners(vm: ApplicationDetailsViewModel, editing: Memo<bool>) -> impl IntoView {
    let state = vm.state;
    let flags = vm.flags;
    let user = vm.ctx().user();
    let draft = RwSignal::new(String::new());
    let source = Signal::derive(|| Some(TypeaheadSource::Target("user".to_string())));
    let add = move || {
        let v = draft.get_untracked();
        if vm.try_update(|f| f.add_owner(&v)) {
            draft.set(String::new());
        }
    };

    let list = move || {
        let user = user.clone();
        state
            .with(|s| current(s).map(|f| f.owners.clone()).unwrap_or_default())
            .into_iter()
            .map(|owner| {
                let removable = flags.with(|f| f.can_remove_owner(&owner, &user));
                let name = owner.clone();
                let remove = (editing.get() && removable).then(|| {
                    view! {
                        <button type="button" class="remove-owner" on:click=move |_| {
                            let name = name.clone();
                            vm.update(|f| f.remove_owner(&name));
                        }>{icon("x")}</button>
                    }
                });
                view! { <li>{owner} {remove}</li> }
            })
            .collect_view()
    };

    view! {
        <div class="application-owners">
            <h4>"Owners"</h4>
            <ul>{list}</ul>
            <Show when=move || editing.get()>
                <div class="form__inline">
                    <Typeahead
                        source=source
                        value=Signal::derive(move || draft.get())
                        on_change=Callback::new(move |v: String| draft.set(v))
                        placeholder="Owner"
                        class="form__input".to_string()
                    />
                    <Button on_click=move |_| add()>{icon("plus")} " Add owner"</Button>
                </div>
            </Show>
        </div>
    }
}

fn supported_modes(vm: ApplicationDetailsViewModel, editing: Memo<bool>) -> impl IntoView {
    let state = vm.state;
    let flags = vm.flags;
    let modes = vm.ctx().with_data(|d| d.modes.clone());
    let can_edit = move || editing.get() && flags.with(|f| f.can_edit_supported_modes());

    view! {
        <div class="application-modes">
            <h4>"Supported modes"</h4>
            {modes.into_iter().map(|mode| {
                let checked_mode = mode.clone();
                let toggled_mode = mode.clone();
                view! {
                    <label class="form__checkbox">
                        <input
                            type="checkbox"
                            name="supported_modes"
                            disabled=move || !can_edit()
                            prop:checked=move || state.with(|s| {
                                current(s).is_some_and(|f| f.supported_modes.contains(&checked_mode))
                            })
                            on:change=move |ev| {
                                let on = event_target_checked(&ev);
                                let mode = toggled_mode.clone();
                                vm.update(|f| f.toggle_mode(&mode, on));
                            }
                        />
                        " "
                        {mode}
                    </label>
                }
            }).collect_view()}
        </div>
    }
}

fn default_modes(vm: ApplicationDetailsViewModel, editing: Memo<bool>) -> impl IntoView {
    let state = vm.state;
    let priorities = vm.ctx().with_data(|d| d.priority_names());
    let priority = RwSignal::new(String::new());
    let mode = RwSignal::new(String::new());
    let add = move || {
        let (p, m) = (priority.get_untracked(), mode.get_untracked());
        if vm.try_update(|f| f.add_default_mode(&p, &m)) {
            priority.set(String::new());
            mode.set(String::new());
        }
    };

    let rows = move || {
        state
            .with(|s| current(s).map(|f| f.default_modes.clone()).unwrap_or_default())
            .into_iter()
            .map(|(p, m)| {
                let key = p.clone();
                let remove = editing.get().then(|| {
                    view! {
                        <button type="button" class="delete-default-mode-button" on:click=move |_| {
                            let key = key.clone();
                            vm.update(|f| {
                                f.default_modes.remove(&key);
                            });
                        }>{icon("x")}</button>
                    }
                });
                view! { <li>{format!("{}: {}", p, m)} {remove}</li> }
            })
            .collect_view()
    };

    let mode_options = move || {
        state
            .with(|s| current(s).map(|f| f.supported_modes.clone()).unwrap_or_default())
            .into_iter()
            .map(|m| {
                let value = m.clone();
                view! { <option value=value>{m}</option> }
            })
            .collect_view()
    };

    view! {
        <div class="application-default-modes">
            <h4>"Default modes"</h4>
            <ul>{rows}</ul>
            <Show when=move || editing.get()>
                <div class="form__inline">
                    <select
                        class="form__select"
                        prop:value=move || priority.get()
                        on:change=move |ev| priority.set(event_target_value(&ev))
                    >
                        <option value="">"Priority"</option>
                        {priorities.iter().map(|p| {
                            let value = p.clone();
                            view! { <option value=value>{p.clone()}</option> }
                        }).collect_view()}
                    </select>
                    <select
                        class="form__select"
                        prop:value=move || mode.get()
                        on:change=move |ev| mode.set(event_target_value(&ev))
                    >
                        <option value="">"Mode"</option>
                        {mode_options}
                    </select>
                    <Button on_click=move |_| add()>{icon("plus")} " Add"</Button>
                </div>
            </Show>
        </div>
    }
}

fn email_incidents(vm: ApplicationDetailsViewModel, editing: Memo<bool>) -> impl IntoView {
    let state = vm.state;
    let flags = vm.flags;
    let email = RwSignal::new(String::new());
    let plan = RwSignal::new(String::new());
    let plan_source = Signal::derive(|| Some(TypeaheadSource::Plan));
    let add = move || {
        let (e, p) = (email.get_untracked(), plan.get_untracked());
        if vm.try_update(|f| f.add_email_incident(&e, &p)) {
            email.set(String::new());
            plan.set(String::new());
        }
    };

    let rows = move || {
        state
            .with(|s| current(s).map(|f| f.email_incidents.clone()).unwrap_or_default())
            .into_iter()
            .map(|(address, plan_name)| {
                let key = address.clone();
                let remove = editing.get().then(|| {
                    view! {
                        <button type="button" class="delete-email-incident-button" on:click=move |_| {
                            let key = key.clone();
                            vm.update(|f| {
                                f.email_incidents.remove(&key);
                            });
                        }>{icon("x")}</button>
                    }
                });
                view! { <li>{format!("{} → {}", address, plan_name)} {remove}</li> }
            })
            .collect_view()
    };

    view! {
        <Show when=move || flags.with(|f| f.is_editable())>
            <div class="application-email-incidents">
                <h4>"Email incidents"</h4>
                <ul>{rows}</ul>
                <Show when=move || editing.get()>
                    <div class="form__inline">
                        <input
                            id="add-email-incident-email"
                            class="form__input"
                            placeholder="Email address"
                            prop:value=move || email.get()
                            on:input=move |ev| email.set(event_target_value(&ev))
                        />
                        <Typeahead
                            source=plan_source
                            value=Signal::derive(move || plan.get())
                            on_change=Callback::new(move |v: String| plan.set(v))
                            placeholder="Plan"
                            class="form__input".to_string()
                        />
                        <Button on_click=move |_| add()>{icon("plus")} " Add"</Button>
                    </div>
                </Show>
            </div>
        </Show>
    }
}

fn categories(vm: ApplicationDetailsViewModel, editing: Memo<bool>) -> impl IntoView {
    let state = vm.state;
    let name = RwSignal::new(String::new());
    let description = RwSignal::new(String::new());
    let mode = RwSignal::new(String::new());
    let add = move || {
        let (n, d, m) = (name.get_untracked(), description.get_untracked(), mode.get_untracked());
        if vm.try_update(|f| f.add_category(&n, &d, &m)) {
            name.set(String::new());
            description.set(String::new());
        }
    };

    let rows = move || {
        state
            .with(|s| current(s).map(|f| f.categories.clone()).unwrap_or_default())
            .into_iter()
            .map(|c| {
                let key = c.name.clone();
                let remove = editing.get().then(|| {
                    view! {
                        <button type="button" class="delete-custom-category-button" on:click=move |_| {
                            let key = key.clone();
                            vm.update(|f| f.remove_category(&key));
                        }>{icon("x")}</button>
                    }
                });
                view! {
                    <tr>
                        <td>{c.name}</td>
                        <td>{c.description}</td>
                        <td>{c.mode}</td>
                        <td>{remove}</td>
                    </tr>
                }
            })
            .collect_view()
    };

    let mode_options = move || {
        state
            .with(|s| current(s).map(|f| f.supported_modes.clone()).unwrap_or_default())
            .into_iter()
            .map(|m| {
                let value = m.clone();
                view! { <option value=value>{m}</option> }
            })
            .collect_view()
    };

    view! {
        <div class="application-categories">
            <h4>"Notification categories"</h4>
            <table class="table">
                <thead>
                    <tr>
                        <th>"Category"</th>
                        <th>"Description"</th>
                        <th>"Default mode"</th>
                        <th></th>
                    </tr>
                </thead>
                <tbody>{rows}</tbody>
            </table>
            <Show when=move || editing.get()>
                <div class="form__inline" id="add-custom-category-form">
                    <input
                        id="add-custom-category"
                        class="form__input"
                        placeholder="Category"
                        prop:value=move || name.get()
                        on:input=move |ev| name.set(event_target_value(&ev))
                    />
                    <input
                        id="add-custom-category-description"
                        class="form__input"
                        placeholder="Description"
                        prop:value=move || description.get()
                        on:input=move |ev| description.set(event_target_value(&ev))
                    />
                    <select
                        id="category-default-mode"
                        class="form__select"
                        prop:value=move || mode.get()
                        on:change=move |ev| mode.set(event_target_value(&ev))
                    >
                        <option value="">"Mode"</option>
                        {mode_options}
                    </select>
                    <Button on_click=move |_| add()>{icon("plus")} " Add category"</Button>
                </div>
            </Show>
        </div>
    }
}

fn quota_input(
    vm: ApplicationDetailsViewModel,
    can_edit: Signal<bool>,
    label: &'static str,
    read: fn(&QuotaForm) -> String,
    write: fn(&mut QuotaForm, String),
) -> impl IntoView {
    let state = vm.state;
    let value = move || state.with(|s| current(s).map(|f| read(&f.quota)).unwrap_or_default());
    view! {
        <label class="form__label">
            {label}
            <input
                class="form__input"
                disabled=move || !can_edit.get()
                prop:value=value
                on:input=move |ev| {
                    let v = event_target_value(&ev);
                    vm.update(|f| write(&mut f.quota, v));
                }
            />
        </label>
    }
}

/// Только админ меняет квоту; остальные видят её, если она задана
fn quota(vm: ApplicationDetailsViewModel, editing: Memo<bool>) -> impl IntoView {
    let state = vm.state;
    let flags = vm.flags;
    let can_edit = Signal::derive(move || editing.get() && flags.with(|f| f.can_edit_quota()));
    let visible = move || {
        flags.with(|f| f.can_edit_quota())
            || state.with(|s| current(s).is_some_and(|f| f.quota != QuotaForm::default()))
    };

    view! {
        <Show when=visible>
            <div class="application-quota">
                <h4>"Quota"</h4>
                <div class="form__inline">
                    {quota_input(vm, can_edit, "Hard quota threshold",
                        |q| q.hard_threshold.clone(), |q, v| q.hard_threshold = v)}
                    {quota_input(vm, can_edit, "Hard quota duration (minutes)",
                        |q| q.hard_duration.clone(), |q, v| q.hard_duration = v)}
                </div>
                <div class="form__inline">
                    {quota_input(vm, can_edit, "Soft quota threshold",
                        |q| q.soft_threshold.clone(), |q, v| q.soft_threshold = v)}
                    {quota_input(vm, can_edit, "Soft quota duration (minutes)",
                        |q| q.soft_duration.clone(), |q, v| q.soft_duration = v)}
                </div>
                <div class="form__inline">
                    {quota_input(vm, can_edit, "Plan", |q| q.plan_name.clone(), |q, v| q.plan_name = v)}
                    {quota_input(vm, can_edit, "Target", |q| q.target_name.clone(), |q, v| q.target_name = v)}
                </div>
            </div>
        </Show>
    }
}

fn keys(vm: ApplicationDetailsViewModel) -> impl IntoView {
    let flags = vm.flags;
    let api_key = vm.api_key;
    let secondary = vm.secondary_key;
    view! {
        <Show when=move || flags.with(|f| f.is_editable())>
            <div class="application-keys">
                <h4>"API keys"</h4>
                {move || match api_key.get() {
                    Some(key) => view! { <code class="api-key">{key}</code> }.into_any(),
                    None => view! {
                        <Button on_click=move |_| vm.show_key()>"Show API key"</Button>
                    }
                    .into_any(),
                }}
                {move || match secondary.get() {
                    Some(key) => view! { <code class="api-key">{key}</code> }.into_any(),
                    None => view! {
                        <Button on_click=move |_| vm.show_secondary_key()>"Show secondary key"</Button>
                    }
                    .into_any(),
                }}
            </div>
        </Show>
    }
}

fn danger_prompt(action: DangerAction) -> &'static str {
    match action {
        DangerAction::Rename => "New application name",
        DangerAction::Delete => "Delete this application? This cannot be undone.",
        DangerAction::Rekey => "Generate a new API key? The current key stops working.",
        DangerAction::SecondaryKey => "Generate a new secondary key?",
    }
}

fn dangerous_actions(vm: ApplicationDetailsViewModel) -> impl IntoView {
    let flags = vm.flags;
    let danger = vm.danger;
    let rename_to = vm.rename_to;
    let busy = vm.busy;
    let expanded = RwSignal::new(false);

    let confirm = move || {
        danger.get().map(|action| {
            let rename = (action == DangerAction::Rename).then(|| {
                view! {
                    <input
                        id="app-new-name-box"
                        class="form__input"
                        prop:value=move || rename_to.get()
                        on:input=move |ev| rename_to.set(event_target_value(&ev))
                    />
                }
            });
            view! {
                <div class="danger-confirm">
                    <p>{danger_prompt(action)}</p>
                    {rename}
                    <Button appearance=ButtonAppearance::Primary disabled=busy on_click=move |_| vm.confirm()>
                        "Confirm"
                    </Button>
                    <Button on_click=move |_| vm.cancel()>"Cancel"</Button>
                </div>
            }
        })
    };

    view! {
        <Show when=move || flags.with(|f| f.is_editable())>
            <div class=move || if expanded.get() { "application-dangerous-actions active" } else { "application-dangerous-actions" }>
                <h4 on:click=move |_| expanded.update(|e| *e = !*e)>"Dangerous actions"</h4>
                <Show when=move || expanded.get()>
                    <div class="page__actions">
                        <Button on_click=move |_| vm.ask(DangerAction::Rename)>"Rename"</Button>
                        <Button on_click=move |_| vm.ask(DangerAction::Rekey)>"Rekey"</Button>
                        <Button on_click=move |_| vm.ask(DangerAction::SecondaryKey)>"Generate secondary key"</Button>
                        <Button on_click=move |_| vm.ask(DangerAction::Delete)>{icon("delete")} " Delete"</Button>
                    </div>
                    {confirm}
                </Show>
            </div>
        </Show>
    }
}

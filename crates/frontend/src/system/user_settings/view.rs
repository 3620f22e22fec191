use super::model::{
    addable_apps, app_mode_options, category_mode_options, timezone_options, ReprioritizationDraft, DEFAULT_MODE,
};
use super::view_model::UserSettingsViewModel;
use crate::shared::icons::icon;
use leptos::prelude::*;
use thaw::*;

fn mode_select(
    selected: String,
    options: Vec<String>,
    on_pick: impl Fn(String) + Send + Sync + 'static,
) -> impl IntoView {
    view! {
        <select class="form__select" on:change=move |ev| on_pick(event_target_value(&ev))>
            {options.into_iter().map(|mode| {
                let is_selected = mode == selected;
                let value = mode.clone();
                view! { <option value=value selected=is_selected>{mode}</option> }
            }).collect_view()}
        </select>
    }
}

#[component]
pub fn UserSettingsPage(vm: UserSettingsViewModel) -> impl IntoView {
    view! {
        <div class="user-settings">
            <div class="page__header">
                <h1 class="page__title">"Settings"</h1>
            </div>
            {priority_table(vm)}
            {timezone(vm)}
            {sms_override(vm)}
            {categories(vm)}
            {reprioritization(vm)}
        </div>
    }
}

fn priority_table(vm: UserSettingsViewModel) -> impl IntoView {
    let ctx = vm.ctx();
    let form = vm.form;
    let busy = vm.busy;
    let priorities = ctx.with_data(|d| d.priority_names());
    let global_options: Vec<String> = std::iter::once(DEFAULT_MODE.to_string())
        .chain(ctx.with_data(|d| d.modes.clone()))
        .collect();
    let new_app = RwSignal::new(String::new());

    let header = priorities
        .clone()
        .into_iter()
        .map(|p| view! { <TableHeaderCell>{p}</TableHeaderCell> })
        .collect_view();

    let body = {
        let priorities = priorities.clone();
        move || {
            let Some(current) = form.get() else {
                return view! { <TableRow><TableCell>"Loading..."</TableCell></TableRow> }.into_any();
            };
            let global = priorities
                .clone()
                .into_iter()
                .map(|priority| {
                    let select = mode_select(current.global_mode(&priority), global_options.clone(), move |mode| {
                        vm.update(|f| f.set_global(&priority, &mode));
                    });
                    view! { <TableCell>{select}</TableCell> }
                })
                .collect_view();

            let app_names: Vec<String> = current.per_app_modes.keys().cloned().collect();
            let apps = app_names
                .into_iter()
                .map(|app| {
                    let options = ctx.with_data(|d| app_mode_options(d, &app));
                    let cells = priorities
                        .clone()
                        .into_iter()
                        .map(|priority| {
                            let app = app.clone();
                            let select = mode_select(current.app_mode(&app, &priority), options.clone(), move |mode| {
                                vm.update(|f| f.set_app(&app, &priority, &mode));
                            });
                            view! { <TableCell>{select}</TableCell> }
                        })
                        .collect_view();
                    let removed = app.clone();
                    view! {
                        <TableRow class="app-row">
                            <TableCell>
                                {app}
                                " "
                                <button type="button" class="delete-app-button" on:click=move |_| {
                                    let removed = removed.clone();
                                    vm.update(|f| f.remove_app(&removed));
                                }>{icon("x")}</button>
                            </TableCell>
                            {cells}
                        </TableRow>
                    }
                })
                .collect_view();

            view! {
                <TableRow>
                    <TableCell>"Global"</TableCell>
                    {global}
                </TableRow>
                {apps}
            }
            .into_any()
        }
    };

    let addable = move || {
        form.with(|f| f.as_ref().map(|f| ctx.with_data(|d| addable_apps(d, f))))
            .unwrap_or_default()
            .into_iter()
            .map(|name| {
                let value = name.clone();
                view! { <option value=value>{name}</option> }
            })
            .collect_view()
    };
    let add_app = move || {
        let app = new_app.get_untracked();
        vm.update(|f| f.add_app(&app));
        new_app.set(String::new());
    };
    let clean = Signal::derive(move || busy.get() || !form.with(|f| f.as_ref().is_some_and(|f| f.dirty)));

    view! {
        <div class="priority-settings" id="priority-table">
            <h3>"Notification modes"</h3>
            <Table class="table">
                <TableHeader>
                    <TableRow>
                        <TableHeaderCell>""</TableHeaderCell>
                        {header}
                    </TableRow>
                </TableHeader>
                <TableBody>{body}</TableBody>
            </Table>
            <div class="form__inline">
                <select
                    id="add-application-select"
                    class="form__select"
                    prop:value=move || new_app.get()
                    on:change=move |ev| new_app.set(event_target_value(&ev))
                >
                    <option value="">"Add Application"</option>
                    {addable}
                </select>
                <Button
                    disabled=Signal::derive(move || new_app.with(|a| a.is_empty()))
                    on_click=move |_| add_app()
                >
                    {icon("plus")}
                </Button>
                <Button appearance=ButtonAppearance::Primary disabled=clean on_click=move |_| vm.save_modes()>
                    {icon("save")}
                    " Save"
                </Button>
            </div>
        </div>
    }
}

fn timezone(vm: UserSettingsViewModel) -> impl IntoView {
    let configured = vm.ctx().with_data(|d| d.user_settings.timezone.clone());
    let zones = vm.timezones;
    let selected = vm.timezone;
    let options = move || {
        zones.with(|z| timezone_options(configured.as_deref(), z))
            .into_iter()
            .map(|(value, label)| {
                let is_selected = selected.with_untracked(|s| *s == value);
                view! { <option value=value selected=is_selected>{label}</option> }
            })
            .collect_view()
    };

    view! {
        <div class="timezone-settings">
            <h3>"Timezone"</h3>
            <div class="form__inline">
                <select
                    id="timezone-select"
                    class="form__select"
                    on:change=move |ev| selected.set(event_target_value(&ev))
                >
                    {options}
                </select>
                <Button
                    disabled=Signal::derive(move || selected.with(|s| s.is_empty()))
                    on_click=move |_| vm.save_timezone()
                >
                    "Save"
                </Button>
            </div>
        </div>
    }
}

fn sms_override(vm: UserSettingsViewModel) -> impl IntoView {
    let enabled = vm.sms_override;
    view! {
        <div class="sms-override-settings">
            <h3>"SMS template override"</h3>
            <div class="form__inline">
                <select
                    id="sms-override-select"
                    class="form__select"
                    prop:value=move || if enabled.get() { "enabled" } else { "disabled" }
                    on:change=move |ev| enabled.set(event_target_value(&ev) == "enabled")
                >
                    <option value="enabled">"Enabled"</option>
                    <option value="disabled">"Disabled"</option>
                </select>
                <Button on_click=move |_| vm.save_sms_override()>"Save"</Button>
            </div>
        </div>
    }
}

/// Per-application notification category overrides
fn categories(vm: UserSettingsViewModel) -> impl IntoView {
    let overrides = vm.category_overrides;
    let apps = vm.category_apps;
    let editor = vm.category_editor;
    let pending_delete = vm.category_delete;
    let busy = vm.busy;
    let mode_options = vm.ctx().with_data(category_mode_options);
    let new_app = RwSignal::new(String::new());

    let rows = move || {
        let names: Vec<String> = overrides.with(|o| o.keys().cloned().collect());
        names
            .into_iter()
            .map(|app| {
                let edit_app = app.clone();
                let delete_app = app.clone();
                view! {
                    <TableRow>
                        <TableCell>{app}</TableCell>
                        <TableCell>
                            <button type="button" on:click=move |_| vm.edit_categories(edit_app.clone())>
                                {icon("edit")}
                            </button>
                            <button
                                type="button"
                                on:click=move |_| pending_delete.set(Some(delete_app.clone()))
                            >
                                {icon("delete")}
                            </button>
                        </TableCell>
                    </TableRow>
                }
            })
            .collect_view()
    };

    let app_options = move || {
        apps.get()
            .into_iter()
            .map(|app| {
                let value = app.clone();
                view! { <option value=value>{app}</option> }
            })
            .collect_view()
    };

    let delete_prompt = move || {
        pending_delete.get().map(|app| {
            view! {
                <div class="danger-confirm">
                    <span>{format!("Delete category settings for {}?", app)}</span>
                    <Button appearance=ButtonAppearance::Primary on_click=move |_| vm.delete_categories()>
                        "Delete"
                    </Button>
                    <Button on_click=move |_| pending_delete.set(None)>"Cancel"</Button>
                </div>
            }
        })
    };

    let editor_panel = move || {
        let current = editor.get()?;
        let options = mode_options.clone();
        let body = current
            .rows
            .into_iter()
            .map(|row| {
                let category = row.category.clone();
                let select = mode_select(row.mode.clone(), options.clone(), move |mode| {
                    editor.update(|e| {
                        if let Some(e) = e {
                            e.set_mode(&category, &mode);
                        }
                    });
                });
                view! {
                    <TableRow>
                        <TableCell>{row.category}</TableCell>
                        <TableCell>{row.description}</TableCell>
                        <TableCell>{select}</TableCell>
                    </TableRow>
                }
            })
            .collect_view();
        Some(view! {
            <div class="category-editor">
                <h4>{current.application}</h4>
                <Table class="table">
                    <TableHeader>
                        <TableRow>
                            <TableHeaderCell>"Category"</TableHeaderCell>
                            <TableHeaderCell>"Description"</TableHeaderCell>
                            <TableHeaderCell>"Mode"</TableHeaderCell>
                        </TableRow>
                    </TableHeader>
                    <TableBody>{body}</TableBody>
                </Table>
                <div class="form__actions">
                    <Button on_click=move |_| vm.close_categories()>"Cancel"</Button>
                    <Button appearance=ButtonAppearance::Primary disabled=busy on_click=move |_| vm.save_categories()>
                        {icon("save")}
                        " Save"
                    </Button>
                </div>
            </div>
        })
    };

    view! {
        <div class="category-settings">
            <h3>"Notification categories"</h3>
            <Show when=move || !overrides.with(|o| o.is_empty())>
                <Table class="table">
                    <TableHeader>
                        <TableRow>
                            <TableHeaderCell>"Application"</TableHeaderCell>
                            <TableHeaderCell>""</TableHeaderCell>
                        </TableRow>
                    </TableHeader>
                    <TableBody>{rows}</TableBody>
                </Table>
            </Show>
            {delete_prompt}
            <div class="form__inline">
                <select
                    class="form__select"
                    prop:value=move || new_app.get()
                    on:change=move |ev| new_app.set(event_target_value(&ev))
                >
                    <option value="">"Add Application"</option>
                    {app_options}
                </select>
                <Button
                    disabled=Signal::derive(move || new_app.with(|a| a.is_empty()))
                    on_click=move |_| vm.edit_categories(new_app.get_untracked())
                >
                    "Edit"
                </Button>
            </div>
            {editor_panel}
        </div>
    }
}

fn reprioritization(vm: UserSettingsViewModel) -> impl IntoView {
    let rules = vm.rules;
    let draft = vm.draft;
    let busy = vm.busy;
    let modes = vm.ctx().with_data(|d| d.modes.clone());
    let expanded = RwSignal::new(false);

    let rows = move || {
        rules
            .get()
            .into_iter()
            .map(|rule| {
                let src = rule.src_mode.clone();
                view! {
                    <TableRow>
                        <TableCell>{rule.src_mode}</TableCell>
                        <TableCell>{rule.dst_mode}</TableCell>
                        <TableCell>{rule.count}</TableCell>
                        <TableCell>{format!("{} min", rule.duration / 60)}</TableCell>
                        <TableCell>
                            <button type="button" on:click=move |_| vm.delete_rule(src.clone())>
                                {icon("delete")}
                            </button>
                        </TableCell>
                    </TableRow>
                }
            })
            .collect_view()
    };

    let select = move |read: fn(&ReprioritizationDraft) -> String, write: fn(&mut ReprioritizationDraft, String)| {
        let options = modes
            .iter()
            .map(|m| {
                let value = m.clone();
                let label = m.clone();
                view! { <option value=value>{label}</option> }
            })
            .collect_view();
        view! {
            <select
                class="form__select"
                prop:value=move || draft.with(read)
                on:change=move |ev| {
                    let v = event_target_value(&ev);
                    draft.update(|d| write(d, v));
                }
            >
                {options}
            </select>
        }
    };
    let src = select(|d| d.src_mode.clone(), |d, v| d.src_mode = v);
    let dst = select(|d| d.dst_mode.clone(), |d, v| d.dst_mode = v);

    view! {
        <div class=move || if expanded.get() { "reprioritization active" } else { "reprioritization" } id="reprioritization">
            <h4 on:click=move |_| expanded.update(|e| *e = !*e)>"Reprioritization"</h4>
            <Show when=move || expanded.get()>
                <Show when=move || !rules.with(|r| r.is_empty())>
                    <Table class="table">
                        <TableHeader>
                            <TableRow>
                                <TableHeaderCell>"From"</TableHeaderCell>
                                <TableHeaderCell>"To"</TableHeaderCell>
                                <TableHeaderCell>"Count"</TableHeaderCell>
                                <TableHeaderCell>"Within"</TableHeaderCell>
                                <TableHeaderCell>""</TableHeaderCell>
                            </TableRow>
                        </TableHeader>
                        <TableBody>{rows}</TableBody>
                    </Table>
                </Show>
            </Show>
            <div class="form__inline" style:display=move || if expanded.get() { "" } else { "none" }>
                {src}
                {dst}
                <input
                    class="form__input"
                    placeholder="Count"
                    prop:value=move || draft.with(|d| d.count.clone())
                    on:input=move |ev| {
                        let v = event_target_value(&ev);
                        draft.update(|d| d.count = v);
                    }
                />
                <input
                    class="form__input"
                    placeholder="Minutes"
                    prop:value=move || draft.with(|d| d.duration_minutes.clone())
                    on:input=move |ev| {
                        let v = event_target_value(&ev);
                        draft.update(|d| d.duration_minutes = v);
                    }
                />
                <Button disabled=busy on_click=move |_| vm.add_rule()>{icon("plus")} " Add"</Button>
            </div>
        </div>
    }
}

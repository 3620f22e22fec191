use super::model::{dynamic_label, field_key, minutes, step_time, NotificationForm, PlanForm};
use super::view_model::PlanDetailsViewModel;
use crate::shared::date_utils::{format_opt_unix, version_label};
use crate::shared::icons::icon;
use crate::shared::typeahead::{TargetTypeDescriptor, Typeahead};
use crate::shared::view_module::DetailState;
use leptos::prelude::*;
use thaw::*;

type PlanState = Option<DetailState<PlanForm>>;

fn current(state: &PlanState) -> Option<&PlanForm> {
    state.as_ref().and_then(|s| s.current())
}

fn step_title(index: usize, time: Option<f64>) -> String {
    match time {
        Some(t) => format!("Step {} ({} min)", index + 1, minutes((t * 60.0).round() as i64)),
        None => format!("Step {}", index + 1),
    }
}

#[component]
pub fn PlanDetailsView(vm: PlanDetailsViewModel) -> impl IntoView {
    let state = vm.state;
    let editing = Memo::new(move |_| vm.is_editing());
    let loaded = Memo::new(move |_| state.with(|s| s.is_some()));

    let steps = move || {
        if editing.get() {
            steps_editor(vm).into_any()
        } else {
            steps_viewer(vm).into_any()
        }
    };

    move || {
        if !loaded.get() {
            return view! { <div class="page__loading">"Loading..."</div> }.into_any();
        }
        view! {
            <div class="plan-details" id="plan-details">
                {header(vm, editing)}
                {settings(vm, editing)}
                {steps}
                {move || (!editing.get()).then(|| test_panel(vm))}
            </div>
        }
        .into_any()
    }
}

fn header(vm: PlanDetailsViewModel, editing: Memo<bool>) -> impl IntoView {
    let state = vm.state;
    let versions = vm.versions;
    let busy = vm.busy;

    let title = move || {
        state.with(|s| match current(s) {
            Some(p) if !p.name.is_empty() => format!("Plan: {}", p.name),
            _ => "New plan".to_string(),
        })
    };
    let saved = move || state.with(|s| s.as_ref().and_then(|s| s.saved()).cloned());
    let is_active = move || saved().is_some_and(|p| p.active);
    let has_saved = move || state.with(|s| s.as_ref().is_some_and(|s| s.saved().is_some()));
    let selected_version = move || saved().and_then(|p| p.id).map(|id| id.to_string()).unwrap_or_default();
    let meta = move || {
        saved().map(|p| {
            format!(
                "Created by {} on {}{}",
                p.creator,
                format_opt_unix(p.created),
                if p.active { " (active)" } else { "" }
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
                        class="form__select plan-versions"
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
                            <Show when=move || has_saved() && !is_active()>
                                <Button on_click=move |_| vm.activate()>{icon("check")} " Activate"</Button>
                            </Show>
                            <Button on_click=move |_| vm.delete()>{icon("delete")} " Delete"</Button>
                        }
                        .into_any()
                    }
                }}
            </div>
        </div>
    }
}

fn plan_field(
    vm: PlanDetailsViewModel,
    editing: Memo<bool>,
    label: &'static str,
    key: &'static str,
    get: fn(&PlanForm) -> String,
    set: fn(&mut PlanForm, String),
) -> impl IntoView {
    let state = vm.state;
    let errors = vm.errors;
    let value = move || state.with(|s| current(s).map(get).unwrap_or_default());

    view! {
        <div class="form__group">
            <Label>{label}</Label>
            <input
                type="text"
                id=key
                class=move || format!("form__input {}", errors.with(|e| e.class_for(key)))
                disabled=move || !editing.get()
                prop:value=value
                on:input=move |ev| {
                    let v = event_target_value(&ev);
                    vm.update(|f| set(f, v));
                }
            />
        </div>
    }
}

fn settings(vm: PlanDetailsViewModel, editing: Memo<bool>) -> impl IntoView {
    let state = vm.state;
    let description = move || state.with(|s| current(s).map(|p| p.description.clone()).unwrap_or_default());

    view! {
        <div class="plan-settings">
            {plan_field(vm, editing, "Name", "plan-name", |p| p.name.clone(), |p, v| p.name = v)}
            <div class="form__group">
                <Label>"Description"</Label>
                <textarea
                    class="form__textarea"
                    disabled=move || !editing.get()
                    prop:value=description
                    on:input=move |ev| {
                        let v = event_target_value(&ev);
                        vm.update(|f| f.description = v);
                    }
                ></textarea>
            </div>
            <div class="plan-settings__row">
                {plan_field(vm, editing, "Threshold window (minutes)", "threshold-window",
                    |p| p.threshold_window.clone(), |p, v| p.threshold_window = v)}
                {plan_field(vm, editing, "Threshold count", "threshold-count",
                    |p| p.threshold_count.clone(), |p, v| p.threshold_count = v)}
                {plan_field(vm, editing, "Aggregation window (minutes)", "aggregation-window",
                    |p| p.aggregation_window.clone(), |p, v| p.aggregation_window = v)}
                {plan_field(vm, editing, "Aggregation reset (minutes)", "aggregation-reset",
                    |p| p.aggregation_reset.clone(), |p, v| p.aggregation_reset = v)}
            </div>
        </div>
    }
}

fn steps_viewer(vm: PlanDetailsViewModel) -> impl IntoView {
    let state = vm.state;
    move || {
        let Some(plan) = state.with(|s| current(s).cloned()) else {
            return ().into_any();
        };
        let dynamic = plan.dynamic;
        let steps = plan
            .steps
            .into_iter()
            .enumerate()
            .map(|(i, step)| {
                let title = step_title(i, step_time(&step));
                let rows = step
                    .notifications
                    .iter()
                    .map(|n| {
                        let (role, target) = if dynamic {
                            (dynamic_label(&n.dynamic_index), String::new())
                        } else {
                            (n.role.clone(), n.target.clone())
                        };
                        let priority = n.priority.clone();
                        let wait = n.wait.clone();
                        let count = n.count.clone();
                        let href = format!("/templates/?name={}", urlencoding::encode(&n.template));
                        let template = n.template.clone();
                        view! {
                            <TableRow>
                                <TableCell>{role}</TableCell>
                                <TableCell>{target}</TableCell>
                                <TableCell>{priority}</TableCell>
                                <TableCell>{wait}</TableCell>
                                <TableCell>{count}</TableCell>
                                <TableCell>
                                    <a href=href>
                                        {template}
                                    </a>
                                </TableCell>
                            </TableRow>
                        }
                    })
                    .collect_view();
                view! {
                    <div class="plan-step">
                        <h4 class="plan-step__title">{title}</h4>
                        <Table class="table">
                            <TableHeader>
                                <TableRow>
                                    <TableHeaderCell>"Role"</TableHeaderCell>
                                    <TableHeaderCell>"Target"</TableHeaderCell>
                                    <TableHeaderCell>"Priority"</TableHeaderCell>
                                    <TableHeaderCell>"Wait (minutes)"</TableHeaderCell>
                                    <TableHeaderCell>"Count"</TableHeaderCell>
                                    <TableHeaderCell>"Template"</TableHeaderCell>
                                </TableRow>
                            </TableHeader>
                            <TableBody>{rows}</TableBody>
                        </Table>
                    </div>
                }
            })
            .collect_view();
        steps.into_any()
    }
}

fn steps_editor(vm: PlanDetailsViewModel) -> impl IntoView {
    let state = vm.state;
    let step_keys = move || {
        state.with(|s| {
            current(s)
                .map(|p| p.steps.iter().map(|step| step.key).collect::<Vec<_>>())
                .unwrap_or_default()
        })
    };

    let dynamic = move || state.with(|s| current(s).is_some_and(|p| p.dynamic));

    view! {
        <div class="plan-steps">
            <label class="plan-steps__dynamic">
                <input
                    type="checkbox"
                    class="toggle-dynamic"
                    prop:checked=dynamic
                    on:change=move |ev| {
                        let on = event_target_checked(&ev);
                        vm.update(|f| f.dynamic = on);
                    }
                />
                " Dynamic targets"
            </label>
            <For each=step_keys key=|k| *k children=move |step_key| step_editor(vm, step_key) />
            <button type="button" class="button" on:click=move |_| vm.add_step()>
                {icon("plus")}
                " Add step"
            </button>
        </div>
    }
}

fn step_editor(vm: PlanDetailsViewModel, step_key: u32) -> impl IntoView {
    let state = vm.state;
    let title = move || {
        state.with(|s| {
            let plan = current(s)?;
            let index = plan.step_position(step_key)?;
            Some(step_title(index, step_time(&plan.steps[index])))
        })
    };
    let keys = move || {
        state.with(|s| {
            current(s)
                .and_then(|p| p.step_position(step_key).map(|i| &p.steps[i]))
                .map(|step| step.notifications.iter().map(|n| n.key).collect::<Vec<_>>())
                .unwrap_or_default()
        })
    };
    let position = move || state.with_untracked(|s| current(s).and_then(|p| p.step_position(step_key)));
    let dynamic = move || state.with(|s| current(s).is_some_and(|p| p.dynamic));

    view! {
        <div class="plan-step plan-step--editing">
            <div class="plan-step__header">
                <h4 class="plan-step__title">{title}</h4>
                <button
                    type="button"
                    class="button button--danger"
                    on:click=move |_| {
                        if let Some(i) = position() {
                            vm.update(|f| f.remove_step(i));
                        }
                    }
                >
                    {icon("x")}
                    " Remove step"
                </button>
            </div>
            <table class="table plan-step__notifications">
                <thead>
                    <tr>
                        {move || {
                            if dynamic() {
                                view! { <th colspan="2">"Dynamic target"</th> }.into_any()
                            } else {
                                view! { <th>"Role"</th><th>"Target"</th> }.into_any()
                            }
                        }}
                        <th>"Priority"</th>
                        <th>"Wait (minutes)"</th>
                        <th>"Count"</th>
                        <th>"Template"</th>
                        <th></th>
                    </tr>
                </thead>
                <tbody>
                    <For each=keys key=|k| *k children=move |key| notification_row(vm, step_key, key) />
                </tbody>
            </table>
            <button
                type="button"
                class="button"
                on:click=move |_| {
                    if let Some(i) = position() {
                        vm.add_notification(i);
                    }
                }
            >
                {icon("plus")}
                " Add notification"
            </button>
        </div>
    }
}

fn options(names: Vec<String>, value: Signal<String>) -> impl IntoView {
    names
        .into_iter()
        .map(|name| {
            let selected = name.clone();
            let option_value = name.clone();
            view! { <option value=option_value selected=move || value.get() == selected>{name}</option> }
        })
        .collect_view()
}

fn notification_row(vm: PlanDetailsViewModel, step_key: u32, key: u32) -> impl IntoView {
    let ctx = vm.ctx();
    let state = vm.state;
    let errors = vm.errors;

    let field = move |get: fn(&NotificationForm) -> String| {
        Signal::derive(move || {
            state.with(|s| {
                current(s)
                    .and_then(|p| p.find_notification(step_key, key))
                    .map(get)
                    .unwrap_or_default()
            })
        })
    };
    let set = move |apply: fn(&mut NotificationForm, String), value: String| {
        vm.update(|f| {
            if let Some(n) = f.find_notification_mut(step_key, key) {
                apply(n, value);
            }
        });
    };
    let class = move |base: &'static str, name: &'static str| {
        move || format!("{} {}", base, errors.with(|e| e.class_for(&field_key(step_key, key, name))))
    };

    let role = field(|n| n.role.clone());
    let target = field(|n| n.target.clone());
    let priority = field(|n| n.priority.clone());
    let wait = field(|n| n.wait.clone());
    let count = field(|n| n.count.clone());
    let template = field(|n| n.template.clone());
    let dynamic_index = field(|n| n.dynamic_index.clone());
    let dynamic = Signal::derive(move || state.with(|s| current(s).is_some_and(|p| p.dynamic)));

    let source = Signal::derive(move || {
        let role = role.get();
        ctx.with_data(|d| TargetTypeDescriptor::for_role(&role).resolve(d))
    });
    let target_placeholder = move || {
        let role = role.get();
        ctx.with_data(|d| d.role_url_type(&role).map(|t| format!("{} name", t)))
            .unwrap_or_default()
    };

    let roles = ctx.with_data(|d| d.target_roles.iter().map(|r| r.name.clone()).collect::<Vec<_>>());
    let priorities = ctx.with_data(|d| d.priority_names());
    let templates = ctx.with_data(|d| d.active_template_names());

    let target_cells = move || {
        if dynamic.get() {
            return view! {
                <td colspan="2">
                    <span class="plan-notification__dynamic">"Dynamic target #"</span>
                    <input
                        type="number"
                        min="0"
                        class=class("form__input", "dynamic_index")
                        prop:value=move || dynamic_index.get()
                        on:input=move |ev| set(|n, v| n.dynamic_index = v, event_target_value(&ev))
                    />
                </td>
            }
            .into_any();
        }
        let roles = roles.clone();
        view! {
            <td>
                <select
                    class=class("form__select", "role")
                    prop:value=move || role.get()
                    on:change=move |ev| {
                        let v = event_target_value(&ev);
                        // the old target belongs to another target type
                        vm.update(|f| {
                            if let Some(n) = f.find_notification_mut(step_key, key) {
                                n.role = v;
                                n.target.clear();
                            }
                        });
                    }
                >
                    {options(roles, role)}
                </select>
            </td>
            <td>
                {move || {
                    view! {
                        <Typeahead
                            source=source
                            value=target
                            on_change=Callback::new(move |v| set(|n, v| n.target = v, v))
                            placeholder=target_placeholder()
                            class=Signal::derive(class("", "target"))
                        />
                    }
                }}
            </td>
        }
        .into_any()
    };

    view! {
        <tr class="plan-notification">
            {target_cells}
            <td>
                <select
                    class=class("form__select", "priority")
                    prop:value=move || priority.get()
                    on:change=move |ev| set(|n, v| n.priority = v, event_target_value(&ev))
                >
                    <option value="">"Priority"</option>
                    {options(priorities, priority)}
                </select>
            </td>
            <td>
                <input
                    type="number"
                    min="0"
                    class=class("form__input", "wait")
                    prop:value=move || wait.get()
                    on:input=move |ev| set(|n, v| n.wait = v, event_target_value(&ev))
                />
            </td>
            <td>
                <input
                    type="number"
                    min="1"
                    class=class("form__input", "count")
                    prop:value=move || count.get()
                    on:input=move |ev| set(|n, v| n.count = v, event_target_value(&ev))
                />
            </td>
            <td>
                <select
                    class=class("form__select", "template")
                    prop:value=move || template.get()
                    on:change=move |ev| set(|n, v| n.template = v, event_target_value(&ev))
                >
                    <option value="">"Template"</option>
                    {options(templates, template)}
                </select>
            </td>
            <td>
                <button
                    type="button"
                    class="button button--icon"
                    title="Remove notification"
                    on:click=move |_| {
                        let position = state.with_untracked(|s| {
                            current(s).and_then(|p| p.notification_position(step_key, key))
                        });
                        if let Some((step, index)) = position {
                            vm.update(|f| f.remove_notification(step, index));
                        }
                    }
                >
                    {icon("x")}
                </button>
            </td>
        </tr>
    }
}

fn test_panel(vm: PlanDetailsViewModel) -> impl IntoView {
    let application = vm.test_application;
    let targets = vm.test_targets;
    let applications = vm
        .ctx()
        .with_data(|d| d.applications.iter().map(|a| a.name.clone()).collect::<Vec<_>>());
    let slots = move || targets.with(|t| t.len());

    view! {
        <div class="plan-test">
            <h4>"Test this plan"</h4>
            <p class="plan-test__hint">
                "Creates an incident with the application's sample context."
            </p>
            <select
                class="form__select"
                prop:value=move || application.get()
                on:change=move |ev| application.set(event_target_value(&ev))
            >
                {options(applications, application.into())}
            </select>
            {move || (0..slots()).map(|index| test_target_row(vm, index)).collect_view()}
            <Button on_click=move |_| vm.test_incident()>{icon("send")} " Test plan"</Button>
        </div>
    }
}

/// Role and target for one dynamic slot of the test incident
fn test_target_row(vm: PlanDetailsViewModel, index: usize) -> impl IntoView {
    let ctx = vm.ctx();
    let targets = vm.test_targets;
    let role = Signal::derive(move || {
        targets.with(|t| t.get(index).map(|t| t.role.clone()).unwrap_or_default())
    });
    let target = Signal::derive(move || {
        targets.with(|t| t.get(index).map(|t| t.target.clone()).unwrap_or_default())
    });
    let source = Signal::derive(move || {
        let role = role.get();
        ctx.with_data(|d| TargetTypeDescriptor::for_role(&role).resolve(d))
    });
    let placeholder = move || {
        let role = role.get();
        ctx.with_data(|d| d.role_url_type(&role).map(|t| format!("{} name", t)))
            .unwrap_or_default()
    };
    let roles = ctx.with_data(|d| d.target_roles.iter().map(|r| r.name.clone()).collect::<Vec<_>>());

    view! {
        <div class="plan-test__target">
            <span>{dynamic_label(&index.to_string())}</span>
            <select
                class="form__select"
                prop:value=move || role.get()
                on:change=move |ev| {
                    let v = event_target_value(&ev);
                    targets.update(|t| {
                        if let Some(t) = t.get_mut(index) {
                            t.role = v;
                            t.target.clear();
                        }
                    });
                }
            >
                {options(roles, role)}
            </select>
            {move || {
                view! {
                    <Typeahead
                        source=source
                        value=target
                        on_change=Callback::new(move |v: String| {
                            targets.update(|t| {
                                if let Some(t) = t.get_mut(index) {
                                    t.target = v;
                                }
                            });
                        })
                        placeholder=placeholder()
                    />
                }
            }}
        </div>
    }
}

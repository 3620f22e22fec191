use super::model::{comment_parts, context_display, step_note, CommentPart, ContextDisplay};
use super::view_model::{IncidentDetailsViewModel, COMMENT_REGION, REESCALATE_REGION};
use crate::routes::navigation::follow_link;
use crate::shared::alert::{AlertAnchor, AlertTarget};
use crate::shared::components::table::SortableHeaderCell;
use crate::shared::date_utils::{format_opt_unix, format_unix};
use crate::shared::icons::icon;
use crate::shared::table::TableController;
use crate::shared::typeahead::{Typeahead, TypeaheadSource};
use contracts::domain::a003_incident::aggregate::{Comment, Incident, IncidentStep};
use leptos::prelude::*;
use thaw::*;

#[component]
pub fn IncidentDetailsView(vm: IncidentDetailsViewModel, steps: TableController<IncidentStep>) -> impl IntoView {
    let incident = vm.incident;
    let loaded = Memo::new(move |_| incident.with(|i| i.is_some()));
    let steps = StoredValue::new(steps);

    move || {
        if !loaded.get() {
            return view! { <div class="page__loading">"Loading..."</div> }.into_any();
        }
        view! {
            <div class="incident-details" id="incident-details">
                {header(vm)}
                {context(vm)}
                {messages(steps.get_value())}
                {comments(vm)}
                {reescalation(vm)}
            </div>
        }
        .into_any()
    }
}

fn header(vm: IncidentDetailsViewModel) -> impl IntoView {
    let incident = vm.incident;
    let field = move |get: fn(&Incident) -> String| {
        move || incident.with(|i| i.as_ref().map(get).unwrap_or_default())
    };
    let active = move || incident.with(|i| i.as_ref().is_some_and(|i| i.active));
    let plan_link = move || {
        incident.with(|i| {
            i.as_ref().map(|i| {
                let href = i.plan_id.map(|id| format!("/plans/{}", id)).unwrap_or_default();
                view! { <a href=href>{i.plan.clone()}</a> }
            })
        })
    };

    view! {
        <div class="page__header">
            <h1 class="page__title">{field(|i| format!("Incident #{}", i.id))}</h1>
            <dl class="incident-meta">
                <dt>"Application"</dt>
                <dd>{field(|i| i.application.clone())}</dd>
                <dt>"Plan"</dt>
                <dd>{plan_link}</dd>
                <dt>"Created"</dt>
                <dd>{field(|i| format_unix(i.created))}</dd>
                <dt>"Updated"</dt>
                <dd>{field(|i| format_opt_unix(i.updated))}</dd>
                <dt>"Owner"</dt>
                <dd>{field(|i| i.owner.clone().unwrap_or_default())}</dd>
                <dt>"Status"</dt>
                <dd>{move || if active() { "active" } else { "inactive" }}</dd>
            </dl>
            <div class="page__actions">
                <Button
                    appearance=ButtonAppearance::Primary
                    disabled=vm.claiming
                    on_click=move |_| vm.claim()
                >
                    {icon("check")}
                    {move || if active() { " Claim" } else { " Unclaim" }}
                </Button>
                <Button on_click=move |_| vm.open_reescalation()>{icon("send")} " Re-escalate"</Button>
            </div>
        </div>
    }
}

fn context(vm: IncidentDetailsViewModel) -> impl IntoView {
    let incident = vm.incident;
    let template = vm.context_template;
    move || {
        let display = incident.with(|i| {
            i.as_ref()
                .map(|i| template.with(|t| context_display(t.as_deref(), i)))
        })?;
        Some(match display {
            ContextDisplay::Rendered(text) => view! {
                <div class="incident-context" style="white-space: pre-line;">{text}</div>
            }
            .into_any(),
            ContextDisplay::Pairs(pairs) => view! {
                <table class="incident-context table">
                    <tbody>
                        {pairs.into_iter().map(|(k, v)| view! {
                            <tr>
                                <th>{k}</th>
                                <td>{v}</td>
                            </tr>
                        }).collect_view()}
                    </tbody>
                </table>
            }
            .into_any(),
        })
    }
}

fn messages(controller: TableController<IncidentStep>) -> impl IntoView {
    let table = controller.table;
    let sort = Signal::derive(move || table.with(|t| t.sort()));
    let on_sort = Callback::new({
        let controller = controller.clone();
        move |field| controller.sort_by(field)
    });

    let rows = {
        let controller = controller.clone();
        move || {
            if controller.is_empty() {
                return view! {
                    <TableRow>
                        <TableCell>"No messages have been sent for this incident."</TableCell>
                    </TableRow>
                }
                .into_any();
            }
            controller
                .page_rows()
                .into_iter()
                .map(|step| {
                    let path = format!("/messages/{}", step.id);
                    let note = step_note(&step);
                    view! {
                        <TableRow class="clickable" on:click=move |ev| follow_link(&path, &ev)>
                            <TableCell>{step.id}</TableCell>
                            <TableCell>{step.name.clone()}</TableCell>
                            <TableCell>{step.mode.clone()}</TableCell>
                            <TableCell>{step.priority.clone()}</TableCell>
                            <TableCell>{step.step}</TableCell>
                            <TableCell>{format_opt_unix(step.sent)}</TableCell>
                            <TableCell>{note}</TableCell>
                        </TableRow>
                    }
                })
                .collect_view()
                .into_any()
        }
    };

    view! {
        <div class="incident-messages">
            <h3>"Messages"</h3>
            {controller.pager()}
            <Table class="table">
                <TableHeader>
                    <TableRow>
                        <SortableHeaderCell label="ID" sort_field="id" sort=sort on_sort=on_sort />
                        <SortableHeaderCell label="Target" sort_field="name" sort=sort on_sort=on_sort />
                        <SortableHeaderCell label="Mode" sort_field="mode" sort=sort on_sort=on_sort />
                        <SortableHeaderCell label="Priority" sort_field="priority" sort=sort on_sort=on_sort />
                        <SortableHeaderCell label="Step" sort_field="step" sort=sort on_sort=on_sort />
                        <SortableHeaderCell label="Sent" sort_field="sent" sort=sort on_sort=on_sort />
                        <TableHeaderCell>""</TableHeaderCell>
                    </TableRow>
                </TableHeader>
                <TableBody>{rows}</TableBody>
            </Table>
        </div>
    }
}

fn comment_view(comment: Comment) -> impl IntoView {
    let created = format_opt_unix(comment.created.map(|c| c as i64));
    let content = comment_parts(&comment.content)
        .into_iter()
        .map(|part| match part {
            CommentPart::Text(text) => text.into_any(),
            CommentPart::Link { text, href } => view! { <a href=href>{text}</a> }.into_any(),
        })
        .collect_view();
    view! {
        <li class="comment">
            <div class="comment__meta">
                <strong>{comment.author}</strong>
                " "
                <span class="light">{created}</span>
            </div>
            <div class="comment__content" style="white-space: pre-line;">{content}</div>
        </li>
    }
}

fn comments(vm: IncidentDetailsViewModel) -> impl IntoView {
    let incident = vm.incident;
    let draft = vm.comment;
    let list = move || {
        let comments = incident.with(|i| i.as_ref().map(|i| i.comments.clone()).unwrap_or_default());
        if comments.is_empty() {
            return view! { <p class="no-comments">"No comments"</p> }.into_any();
        }
        view! {
            <ul class="comment-list">{comments.into_iter().map(comment_view).collect_view()}</ul>
        }
        .into_any()
    };

    let composing = Memo::new(move |_| draft.with(|d| d.is_some()));
    let composer = move || {
        if !composing.get() {
            return view! {
                <Button on_click=move |_| vm.show_comment()>{icon("plus")} " Add comment"</Button>
            }
            .into_any();
        }
        view! {
            <AlertAnchor target=AlertTarget::Region(COMMENT_REGION) class="add-comment">
                <textarea
                    id="comment-body"
                    class="form__textarea"
                    prop:value=move || draft.get().unwrap_or_default()
                    on:input=move |ev| draft.set(Some(event_target_value(&ev)))
                ></textarea>
                <div class="form__actions">
                    <Button appearance=ButtonAppearance::Primary on_click=move |_| vm.add_comment()>
                        "Comment"
                    </Button>
                    <Button on_click=move |_| vm.hide_comment()>"Cancel"</Button>
                </div>
            </AlertAnchor>
        }
        .into_any()
    };

    view! {
        <div class="incident-comments">
            <h3>"Comments"</h3>
            {list}
            {composer}
        </div>
    }
}

fn reescalation(vm: IncidentDetailsViewModel) -> impl IntoView {
    let state = vm.reescalation;
    let incident = vm.incident;
    let source = Signal::derive(move || {
        incident.with(|i| i.as_ref().map(|i| TypeaheadSource::ApplicationPlans(i.application.clone())))
    });
    let query = Signal::derive(move || state.with(|r| r.query.clone()));
    let ready = Signal::derive(move || state.with(|r| r.plan.is_some()));

    let preview = move || {
        state.with(|r| {
            r.plan.as_ref().map(|plan| {
                let steps = plan
                    .steps
                    .iter()
                    .enumerate()
                    .map(|(i, step)| {
                        let targets = step
                            .iter()
                            .map(|n| {
                                format!(
                                    "{} {} ({}, {})",
                                    n.role,
                                    n.target.clone().unwrap_or_default(),
                                    n.priority,
                                    n.template
                                )
                            })
                            .collect::<Vec<_>>()
                            .join("; ");
                        view! { <li>{format!("Step {}: {}", i + 1, targets)}</li> }
                    })
                    .collect_view();
                view! {
                    <div class="re-escalate-plan-container">
                        <h4>{plan.name.clone()}</h4>
                        <ol>{steps}</ol>
                    </div>
                }
            })
        })
    };

    move || {
        if !state.with(|r| r.open) {
            return ().into_any();
        }
        view! {
            <div class="re-escalate" id="re-escalate-modal">
                <AlertAnchor target=AlertTarget::Region(REESCALATE_REGION) class="modal-body">
                    <h3>"Re-escalate incident"</h3>
                    <div class="form__group">
                        <Typeahead
                            source=source
                            value=query
                            on_change=Callback::new(move |v: String| vm.set_plan_query(v))
                            on_select=Callback::new(move |v: String| vm.pick_plan(v))
                            placeholder="Plan name"
                            class="form__input".to_string()
                        />
                        <Button on_click=move |_| vm.select_plan()>"Select plan"</Button>
                    </div>
                    {preview}
                    <div class="form__actions">
                        <Button
                            appearance=ButtonAppearance::Primary
                            disabled=Signal::derive(move || !ready.get() || vm.busy.get())
                            on_click=move |_| vm.reescalate()
                        >
                            "Re-escalate"
                        </Button>
                        <Button on_click=move |_| vm.close_reescalation()>"Cancel"</Button>
                    </div>
                </AlertAnchor>
            </div>
        }
        .into_any()
    }
}

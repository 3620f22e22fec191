pub mod model;

use crate::domain::a004_message::api;
use crate::layout::global_context::AppContext;
use crate::shared::date_utils::{format_opt_unix, format_unix};
use crate::shared::view_module::{ModuleLifecycle, ViewModule};
use contracts::domain::a004_message::aggregate::Message;
use leptos::prelude::*;
use model::{sent_status, ChangeRow};
use thaw::*;

/// `/messages/<id>`: the message and its audit log
pub struct MessageView {
    ctx: AppContext,
    id: String,
    lifecycle: ModuleLifecycle,
    message: RwSignal<Option<Message>>,
    changes: RwSignal<Vec<ChangeRow>>,
}

impl MessageView {
    pub fn new(ctx: AppContext, id: String) -> Self {
        Self {
            ctx,
            id,
            lifecycle: ModuleLifecycle::new(),
            message: RwSignal::new(None),
            changes: RwSignal::new(Vec::new()),
        }
    }
}

impl ViewModule for MessageView {
    fn title(&self) -> String {
        format!("Message #{}", self.id)
    }

    fn lifecycle(&self) -> &ModuleLifecycle {
        &self.lifecycle
    }

    fn load(&self) {
        let ctx = self.ctx;
        let id = self.id.clone();
        let message = self.message;
        let changes = self.changes;
        let cfg = ctx.config();
        wasm_bindgen_futures::spawn_local(async move {
            let found = match api::fetch_message(&cfg, &id).await {
                Ok(m) => m,
                Err(e) => {
                    log::warn!("message {} failed to load: {}", id, e);
                    ctx.alerts.danger("Message not found");
                    return;
                }
            };
            // без аудита сообщение всё равно показываем
            match api::fetch_auditlog(&cfg, &id).await {
                Ok(log) => changes.set(log.into_iter().map(ChangeRow::from).collect()),
                Err(e) => log::warn!("audit log of message {} failed to load: {}", id, e),
            }
            message.set(Some(found));
        });
    }

    fn view(&self) -> AnyView {
        let message = self.message;
        let changes = self.changes;

        let details = move || {
            message.get().map(|m| {
                let status = sent_status(&m);
                let incident = m.incident_id.map(|id| {
                    view! { <a href=format!("/incidents/{}", id)>{id}</a> }
                });
                view! {
                    <div class="page__header">
                        <h1 class="page__title">{format!("Message #{}", m.id)}</h1>
                    </div>
                    <dl class="message-meta">
                        <dt>"Application"</dt>
                        <dd>{m.application.clone()}</dd>
                        <dt>"Incident"</dt>
                        <dd>{incident}</dd>
                        <dt>"Target"</dt>
                        <dd>{m.target.clone()}</dd>
                        <dt>"Destination"</dt>
                        <dd>{m.destination.clone().unwrap_or_default()}</dd>
                        <dt>"Priority"</dt>
                        <dd>{m.priority.clone()}</dd>
                        <dt>"Mode"</dt>
                        <dd>{m.mode.clone()}</dd>
                        <dt>"Batch"</dt>
                        <dd>{m.batch.clone().unwrap_or_default()}</dd>
                        <dt>"Created"</dt>
                        <dd>{format_opt_unix(m.created)}</dd>
                        <dt>"Sent"</dt>
                        <dd>{format_opt_unix(m.sent)}</dd>
                        {m.twilio_delivery_status.clone().map(|s| view! {
                            <dt>"Delivery status"</dt>
                            <dd>{s}</dd>
                        })}
                        {status.map(|s| view! {
                            <dt>"Status"</dt>
                            <dd>{s}</dd>
                        })}
                    </dl>
                    <div class="message-content">
                        <h4 class="message-subject">{m.subject.clone().unwrap_or_default()}</h4>
                        <div class="message-body" style="white-space: pre-line;">
                            {m.body.clone().unwrap_or_default()}
                        </div>
                    </div>
                }
            })
        };

        let audit = move || {
            let rows = changes.get();
            if rows.is_empty() {
                return None;
            }
            Some(view! {
                <h3>"Changes"</h3>
                <Table class="table">
                    <TableHeader>
                        <TableRow>
                            <TableHeaderCell>"Date"</TableHeaderCell>
                            <TableHeaderCell>"Change"</TableHeaderCell>
                            <TableHeaderCell>"Old"</TableHeaderCell>
                            <TableHeaderCell>"New"</TableHeaderCell>
                            <TableHeaderCell>"Description"</TableHeaderCell>
                        </TableRow>
                    </TableHeader>
                    <TableBody>
                        {rows.into_iter().map(|c| {
                            let old = match c.old_role {
                                Some(role) => format!("{} ({})", c.old, role),
                                None => c.old,
                            };
                            view! {
                                <TableRow>
                                    <TableCell>{format_unix(c.date)}</TableCell>
                                    <TableCell>{c.change_type}</TableCell>
                                    <TableCell>{old}</TableCell>
                                    <TableCell>{c.new}</TableCell>
                                    <TableCell>{c.description}</TableCell>
                                </TableRow>
                            }
                        }).collect_view()}
                    </TableBody>
                </Table>
            })
        };

        view! {
            <div class="message-details">
                {details}
                {audit}
            </div>
        }
        .into_any()
    }
}

//! Single-slot alert utility.
//!
//! На странице одновременно живёт не больше одного `#iris-alert`: новое
//! сообщение заменяет предыдущее, закрытие удаляет его. Таймеров нет.

use leptos::prelude::*;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AlertKind {
    #[default]
    Danger,
    Warning,
    Info,
    Success,
}

impl AlertKind {
    pub fn css_class(&self) -> &'static str {
        match self {
            AlertKind::Danger => "alert-danger",
            AlertKind::Warning => "alert-warning",
            AlertKind::Info => "alert-info",
            AlertKind::Success => "alert-success",
        }
    }
}

/// Region of the page an alert is attached to
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AlertTarget {
    #[default]
    Main,
    /// Named region, e.g. `plan-details` or a modal body
    Region(&'static str),
}

/// Where the alert goes relative to its target
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Placement {
    /// First child of the target
    #[default]
    Prepend,
    /// Last child of the target
    Append,
    /// Sibling before the target
    Before,
    /// Sibling after the target
    After,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlertLink {
    pub href: String,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alert {
    pub text: String,
    pub kind: AlertKind,
    pub target: AlertTarget,
    pub placement: Placement,
    /// Absolutely positioned at the top of the screen
    pub fixed: bool,
    pub link: Option<AlertLink>,
}

impl Alert {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            kind: AlertKind::default(),
            target: AlertTarget::default(),
            placement: Placement::default(),
            fixed: false,
            link: None,
        }
    }

    pub fn kind(mut self, kind: AlertKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn at(mut self, target: AlertTarget) -> Self {
        self.target = target;
        self
    }

    pub fn placement(mut self, placement: Placement) -> Self {
        self.placement = placement;
        self
    }

    pub fn fixed(mut self) -> Self {
        self.fixed = true;
        self
    }

    pub fn link(mut self, href: impl Into<String>, text: impl Into<String>) -> Self {
        self.link = Some(AlertLink {
            href: href.into(),
            text: text.into(),
        });
        self
    }
}

/// Holds at most one alert.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AlertBoard {
    current: Option<Alert>,
}

impl AlertBoard {
    pub fn show(&mut self, alert: Alert) {
        self.current = Some(alert);
    }

    pub fn dismiss(&mut self) {
        self.current = None;
    }

    pub fn current(&self) -> Option<&Alert> {
        self.current.as_ref()
    }

    /// Alert to render in a slot, if the slot matches the alert's anchor
    pub fn visible_in(&self, target: AlertTarget, placement: Placement) -> Option<&Alert> {
        self.current
            .as_ref()
            .filter(|a| a.target == target && a.placement == placement)
    }
}

#[derive(Clone, Copy)]
pub struct AlertService {
    board: RwSignal<AlertBoard>,
}

impl AlertService {
    pub fn new() -> Self {
        Self {
            board: RwSignal::new(AlertBoard::default()),
        }
    }

    pub fn show(&self, alert: Alert) {
        log::debug!("alert: {:?} {}", alert.kind, alert.text);
        self.board.update(|b| b.show(alert));
    }

    pub fn danger(&self, text: impl Into<String>) {
        self.show(Alert::new(text));
    }

    pub fn success(&self, text: impl Into<String>) {
        self.show(Alert::new(text).kind(AlertKind::Success));
    }

    pub fn dismiss(&self) {
        self.board.update(|b| b.dismiss());
    }

    pub fn current(&self) -> Option<Alert> {
        self.board.with(|b| b.current().cloned())
    }

    fn slot(&self, target: AlertTarget, placement: Placement) -> Option<Alert> {
        self.board.with(|b| b.visible_in(target, placement).cloned())
    }
}

impl Default for AlertService {
    fn default() -> Self {
        Self::new()
    }
}

pub fn use_alerts() -> AlertService {
    use_context::<AlertService>().expect("AlertService not found in context")
}

fn alert_slot(alerts: AlertService, target: AlertTarget, placement: Placement) -> impl IntoView {
    move || {
        alerts.slot(target, placement).map(|alert| {
            let class = format!(
                "alert {} alert-dismissible{}",
                alert.kind.css_class(),
                if alert.fixed { " fixed" } else { "" }
            );
            view! {
                <div id="iris-alert" class=class role="alert">
                    <button
                        type="button"
                        class="close"
                        aria-label="Close"
                        on:click=move |_| alerts.dismiss()
                    >
                        <span aria-hidden="true">"×"</span>
                    </button>
                    <span class="alert-content" style="white-space: pre-line;">
                        {alert.text}
                        {alert.link.map(|link| view! {
                            " "
                            <a href=link.href>{link.text}</a>
                        })}
                    </span>
                </div>
            }
        })
    }
}

/// Wraps a page region and renders the alert slots around and inside it.
#[component]
pub fn AlertAnchor(
    #[prop(optional)] target: AlertTarget,
    #[prop(optional, into)] class: String,
    children: Children,
) -> impl IntoView {
    let alerts = use_alerts();

    view! {
        {alert_slot(alerts, target, Placement::Before)}
        <div class=class>
            {alert_slot(alerts, target, Placement::Prepend)}
            {children()}
            {alert_slot(alerts, target, Placement::Append)}
        </div>
        {alert_slot(alerts, target, Placement::After)}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_alert_replaces_first() {
        let mut board = AlertBoard::default();
        board.show(Alert::new("No plans found"));
        board.show(Alert::new("Settings saved").kind(AlertKind::Success));
        let current = board.current().unwrap();
        assert_eq!(current.text, "Settings saved");
        assert_eq!(current.kind, AlertKind::Success);
    }

    #[test]
    fn test_dismiss() {
        let mut board = AlertBoard::default();
        board.show(Alert::new("x"));
        board.dismiss();
        assert!(board.current().is_none());
        board.dismiss();
        assert!(board.current().is_none());
    }

    #[test]
    fn test_defaults() {
        let alert = Alert::new("Incident not found");
        assert_eq!(alert.kind, AlertKind::Danger);
        assert_eq!(alert.target, AlertTarget::Main);
        assert_eq!(alert.placement, Placement::Prepend);
        assert!(!alert.fixed);
    }

    #[test]
    fn test_only_matching_slot_renders() {
        let mut board = AlertBoard::default();
        board.show(
            Alert::new("Missing fields: Plan name")
                .at(AlertTarget::Region("plan-details"))
                .placement(Placement::Append),
        );
        assert!(board.visible_in(AlertTarget::Main, Placement::Prepend).is_none());
        assert!(board
            .visible_in(AlertTarget::Region("plan-details"), Placement::Prepend)
            .is_none());
        assert!(board
            .visible_in(AlertTarget::Region("plan-details"), Placement::Append)
            .is_some());
    }
}

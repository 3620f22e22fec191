use crate::shared::serde_utils::{bool_from_any, opt_bool_from_any};
use serde::{Deserialize, Serialize};

pub const MESSAGE_LIST_FIELDS: &[&str] = &[
    "id",
    "batch",
    "target",
    "subject",
    "incident_id",
    "priority",
    "application",
    "mode",
    "sent",
    "mode_changed",
    "target_changed",
];

/// Строка списка сообщений (`GET /v0/messages`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageSummary {
    pub id: i64,
    #[serde(default)]
    pub batch: Option<String>,
    #[serde(default)]
    pub target: String,
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default)]
    pub incident_id: Option<i64>,
    #[serde(default)]
    pub priority: String,
    #[serde(default)]
    pub application: String,
    #[serde(default)]
    pub mode: String,
    #[serde(default)]
    pub sent: Option<i64>,
    #[serde(default, deserialize_with = "bool_from_any")]
    pub mode_changed: bool,
    #[serde(default, deserialize_with = "bool_from_any")]
    pub target_changed: bool,
}

/// `GET /v0/messages/<id>`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: i64,
    #[serde(default, deserialize_with = "bool_from_any")]
    pub active: bool,
    #[serde(default)]
    pub batch: Option<String>,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub created: Option<i64>,
    #[serde(default)]
    pub sent: Option<i64>,
    #[serde(default)]
    pub destination: Option<String>,
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default)]
    pub incident_id: Option<i64>,
    #[serde(default)]
    pub mode: String,
    #[serde(default)]
    pub application: String,
    #[serde(default)]
    pub priority: String,
    #[serde(default)]
    pub target: String,
    #[serde(default)]
    pub twilio_delivery_status: Option<String>,
    #[serde(default, deserialize_with = "opt_bool_from_any")]
    pub generic_message_sent_status: Option<bool>,
}

/// `GET /v0/messages/<id>/auditlog`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageChange {
    pub id: i64,
    #[serde(default)]
    pub date: i64,
    #[serde(default)]
    pub old: String,
    #[serde(default)]
    pub new: String,
    #[serde(default)]
    pub change_type: String,
    #[serde(default)]
    pub description: String,
}

use contracts::domain::a004_message::aggregate::{
    Message, MessageChange, MessageSummary, MESSAGE_LIST_FIELDS,
};

use crate::shared::api_utils::{get_json, with_query, ApiError, FetchParams, ParamValue};
use crate::shared::config::AppConfig;

pub async fn fetch_messages(cfg: &AppConfig, params: FetchParams) -> Result<Vec<MessageSummary>, ApiError> {
    let mut params = params;
    params.insert("fields".into(), ParamValue::from(MESSAGE_LIST_FIELDS));
    get_json(&with_query(&cfg.api("messages"), &params)).await
}

pub async fn fetch_message(cfg: &AppConfig, id: &str) -> Result<Message, ApiError> {
    get_json(&cfg.api(&format!("messages/{}", urlencoding::encode(id)))).await
}

pub async fn fetch_auditlog(cfg: &AppConfig, id: &str) -> Result<Vec<MessageChange>, ApiError> {
    get_json(&cfg.api(&format!("messages/{}/auditlog", urlencoding::encode(id)))).await
}

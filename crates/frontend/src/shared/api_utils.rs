//! API utilities for talking to the Iris REST API
//!
//! Helpers for building query strings and making JSON requests through
//! `gloo-net`. Every helper returns [`ApiError`] so views can show the
//! server's explanation in an alert.

use gloo_net::http::{Request, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ApiError {
    #[error("network error: {0}")]
    Network(String),
    #[error("{message}")]
    Status { status: u16, message: String },
    #[error("failed to parse response: {0}")]
    Decode(String),
    #[error("failed to serialize request: {0}")]
    Encode(String),
}

impl ApiError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Значение параметра запроса. `List` кодируется повторением ключа
/// (`fields=id&fields=name`).
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    Int(i64),
    Str(String),
    List(Vec<String>),
}

impl From<i64> for ParamValue {
    fn from(v: i64) -> Self {
        ParamValue::Int(v)
    }
}

impl From<&str> for ParamValue {
    fn from(v: &str) -> Self {
        ParamValue::Str(v.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(v: String) -> Self {
        ParamValue::Str(v)
    }
}

impl From<&[&str]> for ParamValue {
    fn from(v: &[&str]) -> Self {
        ParamValue::List(v.iter().map(|s| s.to_string()).collect())
    }
}

/// API parameters of a list request
pub type FetchParams = BTreeMap<String, ParamValue>;

/// Builds `a=1&b=x&fields=id&fields=name`; values are percent-encoded.
pub fn query_string(params: &FetchParams) -> String {
    let mut parts = Vec::new();
    for (key, value) in params {
        let key = urlencoding::encode(key);
        match value {
            ParamValue::Int(v) => parts.push(format!("{}={}", key, v)),
            ParamValue::Str(v) => parts.push(format!("{}={}", key, urlencoding::encode(v))),
            ParamValue::List(items) => {
                for item in items {
                    parts.push(format!("{}={}", key, urlencoding::encode(item)));
                }
            }
        }
    }
    parts.join("&")
}

pub fn with_query(url: &str, params: &FetchParams) -> String {
    if params.is_empty() {
        url.to_string()
    } else {
        format!("{}?{}", url, query_string(params))
    }
}

/// Extracts a human readable message from an error body.
///
/// Falcon errors carry `title` and `description`, the template validator
/// answers with `error`; anything else is shown as-is.
pub fn error_message(status: u16, body: &str) -> String {
    if let Ok(json) = serde_json::from_str::<serde_json::Value>(body) {
        let title = json.get("title").and_then(|v| v.as_str());
        let description = json.get("description").and_then(|v| v.as_str());
        match (title, description) {
            (Some(t), Some(d)) if !d.is_empty() => return format!("{} - {}", t, d),
            (Some(t), _) => return t.to_string(),
            _ => {}
        }
        if let Some(err) = json.get("error").and_then(|v| v.as_str()) {
            return err.to_string();
        }
    }
    let trimmed = body.trim();
    if trimmed.is_empty() {
        format!("HTTP {}", status)
    } else {
        trimmed.to_string()
    }
}

/// Page of an entity the API just created.
///
/// Создание отвечает идентификатором (`42`) или путём (`/plans/42`).
pub fn created_path(collection: &str, response: &serde_json::Value) -> Option<String> {
    let id = match response {
        serde_json::Value::Number(n) => n.to_string(),
        serde_json::Value::String(s) if s.starts_with('/') => return Some(s.clone()),
        serde_json::Value::String(s) if !s.trim().is_empty() => s.trim().to_string(),
        _ => return None,
    };
    Some(format!("/{}/{}", collection, id))
}

async fn send(builder: RequestBuilder) -> Result<Response, ApiError> {
    let response = builder
        .send()
        .await
        .map_err(|e| ApiError::Network(e.to_string()))?;
    check(response).await
}

async fn send_body<B: Serialize>(builder: RequestBuilder, body: &B) -> Result<Response, ApiError> {
    let request: Request = builder
        .json(body)
        .map_err(|e| ApiError::Encode(e.to_string()))?;
    let response = request
        .send()
        .await
        .map_err(|e| ApiError::Network(e.to_string()))?;
    check(response).await
}

async fn check(response: Response) -> Result<Response, ApiError> {
    if response.ok() {
        return Ok(response);
    }
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    log::warn!("API {} failed with {}: {}", response.url(), status, body);
    Err(ApiError::Status {
        status,
        message: error_message(status, &body),
    })
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
    response
        .json::<T>()
        .await
        .map_err(|e| ApiError::Decode(e.to_string()))
}

pub async fn get_json<T: DeserializeOwned>(url: &str) -> Result<T, ApiError> {
    let response = send(Request::get(url)).await?;
    decode(response).await
}

pub async fn post_json<B: Serialize, T: DeserializeOwned>(url: &str, body: &B) -> Result<T, ApiError> {
    let response = send_body(Request::post(url), body).await?;
    decode(response).await
}

/// POST whose response body is ignored
pub async fn post_json_unit<B: Serialize>(url: &str, body: &B) -> Result<(), ApiError> {
    send_body(Request::post(url), body).await.map(|_| ())
}

pub async fn post_empty(url: &str) -> Result<(), ApiError> {
    send(Request::post(url).header("Content-Type", "application/json"))
        .await
        .map(|_| ())
}

pub async fn put_json_unit<B: Serialize>(url: &str, body: &B) -> Result<(), ApiError> {
    send_body(Request::put(url), body).await.map(|_| ())
}

pub async fn delete(url: &str) -> Result<(), ApiError> {
    send(Request::delete(url)).await.map(|_| ())
}

/// Form-encoded POST. Returns status and raw body whatever the status is:
/// callers that need the error payload parse it themselves.
pub async fn post_form_raw(url: &str, fields: &[(&str, &str)]) -> Result<(u16, String), ApiError> {
    let body = fields
        .iter()
        .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
        .collect::<Vec<_>>()
        .join("&");
    let request = Request::post(url)
        .header("Content-Type", "application/x-www-form-urlencoded; charset=UTF-8")
        .body(body)
        .map_err(|e| ApiError::Encode(e.to_string()))?;
    let response = request
        .send()
        .await
        .map_err(|e| ApiError::Network(e.to_string()))?;
    let status = response.status();
    let text = response
        .text()
        .await
        .map_err(|e| ApiError::Decode(e.to_string()))?;
    Ok((status, text))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_string_repeats_lists() {
        let mut params = FetchParams::new();
        params.insert("limit".into(), ParamValue::Int(500));
        params.insert("fields".into(), ParamValue::from(&["id", "name"][..]));
        params.insert("target".into(), ParamValue::from("alice smith"));
        assert_eq!(
            query_string(&params),
            "fields=id&fields=name&limit=500&target=alice%20smith"
        );
    }

    #[test]
    fn test_with_query_empty() {
        assert_eq!(with_query("/v0/stats", &FetchParams::new()), "/v0/stats");
    }

    #[test]
    fn test_error_message_title_description() {
        let body = r#"{"title": "Invalid plan", "description": "steps missing"}"#;
        assert_eq!(error_message(400, body), "Invalid plan - steps missing");
        assert_eq!(error_message(400, r#"{"title": "Forbidden"}"#), "Forbidden");
    }

    #[test]
    fn test_error_message_fallbacks() {
        assert_eq!(error_message(400, r#"{"error": "bad"}"#), "bad");
        assert_eq!(error_message(502, "Bad Gateway"), "Bad Gateway");
        assert_eq!(error_message(500, ""), "HTTP 500");
    }

    #[test]
    fn test_created_path() {
        use serde_json::json;
        assert_eq!(created_path("plans", &json!(42)).as_deref(), Some("/plans/42"));
        assert_eq!(created_path("incidents", &json!("7")).as_deref(), Some("/incidents/7"));
        assert_eq!(
            created_path("plans", &json!("/plans/43")).as_deref(),
            Some("/plans/43")
        );
        assert_eq!(created_path("plans", &json!(null)), None);
    }

    #[test]
    fn test_status_display() {
        let err = ApiError::Status {
            status: 404,
            message: "Not found".into(),
        };
        assert_eq!(err.to_string(), "Not found");
        assert_eq!(err.status(), Some(404));
    }
}

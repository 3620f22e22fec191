use contracts::domain::a001_plan::aggregate::{ActivateDto, PlanVersion};
use contracts::domain::a002_template::aggregate::{
    NewTemplateDto, Template, TemplatePreview, TemplatePreviewError, TemplateSummary,
};
use serde_json::Value;

use crate::shared::api_utils::{
    get_json, post_form_raw, post_json, post_json_unit, with_query, ApiError, FetchParams, ParamValue,
};
use crate::shared::config::AppConfig;

pub async fn fetch_templates(cfg: &AppConfig, params: FetchParams) -> Result<Vec<TemplateSummary>, ApiError> {
    get_json(&with_query(&cfg.api("templates"), &params)).await
}

pub fn template_url(cfg: &AppConfig, id: &str) -> String {
    cfg.api(&format!("templates/{}", urlencoding::encode(id)))
}

pub async fn fetch_template(cfg: &AppConfig, id: &str) -> Result<Template, ApiError> {
    get_json(&template_url(cfg, id)).await
}

/// Every version of a template, oldest first
pub async fn fetch_versions(cfg: &AppConfig, name: &str) -> Result<Vec<PlanVersion>, ApiError> {
    let mut params = FetchParams::new();
    params.insert("name".into(), ParamValue::from(name));
    params.insert("fields".into(), ParamValue::from(&["id", "created", "creator"][..]));
    get_json(&with_query(&cfg.api("templates"), &params)).await
}

/// Publishes a new version; the response identifies it
pub async fn create_template(cfg: &AppConfig, dto: &NewTemplateDto) -> Result<Value, ApiError> {
    post_json(&cfg.api("templates"), dto).await
}

pub async fn activate_template(cfg: &AppConfig, id: i64) -> Result<(), ApiError> {
    post_json_unit(&cfg.api(&format!("templates/{}", id)), &ActivateDto::activate()).await
}

/// Renders a subject/body pair against the application's sample context.
///
/// `Err(String)` несёт текст для алерта: номер строки и ошибку jinja,
/// либо "Invalid template".
pub async fn preview(
    application: &str,
    subject: &str,
    body: &str,
) -> Result<Result<TemplatePreview, String>, ApiError> {
    // пустой subject сервер считает ошибкой
    let subject = if subject.is_empty() { " " } else { subject };
    let (status, text) = post_form_raw(
        "/validate/jinja",
        &[
            ("application", application),
            ("templateSubject", subject),
            ("templateBody", body),
        ],
    )
    .await?;
    Ok(preview_result(status, &text))
}

pub fn preview_result(status: u16, body: &str) -> Result<TemplatePreview, String> {
    if (200..300).contains(&status) {
        return match serde_json::from_str::<TemplatePreview>(body) {
            Ok(p) if p.template_subject.is_some() || p.template_body.is_some() => Ok(p),
            _ => Err("Invalid template".to_string()),
        };
    }
    Err(serde_json::from_str::<TemplatePreviewError>(body)
        .unwrap_or_default()
        .describe())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preview_result() {
        let ok = preview_result(200, r#"{"template_subject": "", "template_body": "db1 down"}"#).unwrap();
        assert_eq!(ok.template_body.as_deref(), Some("db1 down"));

        assert_eq!(preview_result(200, "{}").unwrap_err(), "Invalid template");
        assert_eq!(
            preview_result(400, r#"{"lineno": 2, "error": "unexpected '}'"}"#).unwrap_err(),
            "Line: 2\nError: unexpected '}'"
        );
        assert_eq!(preview_result(500, "oops").unwrap_err(), "Invalid template");
    }
}

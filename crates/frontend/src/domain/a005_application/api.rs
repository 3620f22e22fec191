use contracts::domain::a005_application::aggregate::{
    ApplicationKey, ApplicationQuota, ApplicationUpdateDto, EmailIncidents, NewApplicationDto,
    NotificationCategory, RenameApplicationDto,
};
use contracts::shared::app_data::ApplicationInfo;

use crate::shared::api_utils::{delete, get_json, post_empty, post_json_unit, put_json_unit, ApiError};
use crate::shared::config::AppConfig;

fn app_url(cfg: &AppConfig, name: &str, suffix: &str) -> String {
    cfg.api(&format!("applications/{}{}", urlencoding::encode(name), suffix))
}

pub async fn fetch_application(cfg: &AppConfig, name: &str) -> Result<ApplicationInfo, ApiError> {
    get_json(&app_url(cfg, name, "")).await
}

pub async fn update_application(cfg: &AppConfig, name: &str, dto: &ApplicationUpdateDto) -> Result<(), ApiError> {
    put_json_unit(&app_url(cfg, name, ""), dto).await
}

pub async fn fetch_email_incidents(cfg: &AppConfig, name: &str) -> Result<EmailIncidents, ApiError> {
    get_json(&app_url(cfg, name, "/incident_emails")).await
}

pub async fn update_email_incidents(cfg: &AppConfig, name: &str, emails: &EmailIncidents) -> Result<(), ApiError> {
    put_json_unit(&app_url(cfg, name, "/incident_emails"), emails).await
}

pub async fn fetch_key(cfg: &AppConfig, name: &str) -> Result<ApplicationKey, ApiError> {
    get_json(&app_url(cfg, name, "/key")).await
}

/// `key: None` when no secondary key exists
pub async fn fetch_secondary_key(cfg: &AppConfig, name: &str) -> Result<ApplicationKey, ApiError> {
    get_json(&app_url(cfg, name, "/secondary")).await
}

pub async fn create_secondary_key(cfg: &AppConfig, name: &str) -> Result<(), ApiError> {
    post_empty(&app_url(cfg, name, "/secondary")).await
}

pub async fn rekey(cfg: &AppConfig, name: &str) -> Result<(), ApiError> {
    post_empty(&app_url(cfg, name, "/rekey")).await
}

pub async fn rename(cfg: &AppConfig, name: &str, new_name: &str) -> Result<(), ApiError> {
    let dto = RenameApplicationDto {
        new_name: new_name.to_string(),
    };
    put_json_unit(&app_url(cfg, name, "/rename"), &dto).await
}

pub async fn delete_application(cfg: &AppConfig, name: &str) -> Result<(), ApiError> {
    delete(&app_url(cfg, name, "")).await
}

pub async fn create_application(cfg: &AppConfig, name: &str) -> Result<(), ApiError> {
    let dto = NewApplicationDto {
        name: name.to_string(),
    };
    post_json_unit(&cfg.api("applications/"), &dto).await
}

pub async fn fetch_quota(cfg: &AppConfig, name: &str) -> Result<ApplicationQuota, ApiError> {
    get_json(&app_url(cfg, name, "/quota")).await
}

pub async fn save_quota(cfg: &AppConfig, name: &str, quota: &ApplicationQuota) -> Result<(), ApiError> {
    post_json_unit(&app_url(cfg, name, "/quota"), quota).await
}

pub async fn delete_quota(cfg: &AppConfig, name: &str) -> Result<(), ApiError> {
    delete(&app_url(cfg, name, "/quota")).await
}

fn categories_url(cfg: &AppConfig, name: &str) -> String {
    cfg.api(&format!("categories/{}", urlencoding::encode(name)))
}

pub async fn fetch_categories(cfg: &AppConfig, name: &str) -> Result<Vec<NotificationCategory>, ApiError> {
    get_json(&categories_url(cfg, name)).await
}

/// Every application's categories; `/v0/categories/`
pub async fn fetch_all_categories(cfg: &AppConfig) -> Result<Vec<NotificationCategory>, ApiError> {
    get_json(&categories_url(cfg, "")).await
}

/// Replaces the whole list
pub async fn save_categories(cfg: &AppConfig, name: &str, categories: &[NotificationCategory]) -> Result<(), ApiError> {
    post_json_unit(&categories_url(cfg, name), &categories).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_url_encodes_name() {
        let cfg = AppConfig::default();
        assert_eq!(app_url(&cfg, "Alert manager", "/key"), "/v0/applications/Alert%20manager/key");
        assert_eq!(app_url(&cfg, "nodes", ""), "/v0/applications/nodes");
    }

    #[test]
    fn test_categories_url() {
        let cfg = AppConfig::default();
        assert_eq!(categories_url(&cfg, "Alert manager"), "/v0/categories/Alert%20manager");
        assert_eq!(categories_url(&cfg, ""), "/v0/categories/");
    }
}

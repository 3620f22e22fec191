use contracts::system::users::{
    CategoryOverride, ReprioritizationRule, TemplateOverridesDto, TimezoneDto, User, UserModesDto,
};
use std::collections::BTreeMap;

use crate::shared::api_utils::{delete, get_json, post_json_unit, put_json_unit, ApiError};
use crate::shared::config::AppConfig;

fn user_url(cfg: &AppConfig, section: &str, user: &str) -> String {
    cfg.api(&format!("users/{}{}", section, urlencoding::encode(user)))
}

pub async fn fetch_user(cfg: &AppConfig, user: &str) -> Result<User, ApiError> {
    get_json(&user_url(cfg, "", user)).await
}

/// Replaces global and per-application modes at once
pub async fn save_modes(cfg: &AppConfig, user: &str, dto: &UserModesDto) -> Result<(), ApiError> {
    post_json_unit(&user_url(cfg, "modes/", user), dto).await
}

pub async fn fetch_timezones(cfg: &AppConfig) -> Result<Vec<String>, ApiError> {
    get_json(&cfg.api("timezones")).await
}

pub async fn save_timezone(cfg: &AppConfig, user: &str, timezone: &str) -> Result<(), ApiError> {
    let dto = TimezoneDto {
        timezone: timezone.to_string(),
    };
    put_json_unit(&user_url(cfg, "settings/", user), &dto).await
}

pub async fn save_sms_override(cfg: &AppConfig, user: &str, enabled: bool) -> Result<(), ApiError> {
    post_json_unit(&user_url(cfg, "overrides/", user), &TemplateOverridesDto::sms(enabled)).await
}

pub async fn fetch_reprioritization(cfg: &AppConfig, user: &str) -> Result<Vec<ReprioritizationRule>, ApiError> {
    get_json(&user_url(cfg, "reprioritization/", user)).await
}

pub async fn add_reprioritization(cfg: &AppConfig, user: &str, rule: &ReprioritizationRule) -> Result<(), ApiError> {
    post_json_unit(&user_url(cfg, "reprioritization/", user), rule).await
}

pub async fn delete_reprioritization(cfg: &AppConfig, user: &str, src_mode: &str) -> Result<(), ApiError> {
    let url = format!(
        "{}/{}",
        user_url(cfg, "reprioritization/", user),
        urlencoding::encode(src_mode)
    );
    delete(&url).await
}

/// `/v0/users/<user>/categories[/<app>]`
fn categories_url(cfg: &AppConfig, user: &str, app: Option<&str>) -> String {
    let base = format!("{}/categories", user_url(cfg, "", user));
    match app {
        Some(app) => format!("{}/{}", base, urlencoding::encode(app)),
        None => base,
    }
}

pub async fn fetch_category_overrides(cfg: &AppConfig, user: &str) -> Result<Vec<CategoryOverride>, ApiError> {
    get_json(&categories_url(cfg, user, None)).await
}

/// category → mode, replaces the user's overrides of one application
pub async fn save_category_overrides(
    cfg: &AppConfig,
    user: &str,
    app: &str,
    modes: &BTreeMap<String, String>,
) -> Result<(), ApiError> {
    post_json_unit(&categories_url(cfg, user, Some(app)), modes).await
}

pub async fn delete_category_overrides(cfg: &AppConfig, user: &str, app: &str) -> Result<(), ApiError> {
    delete(&categories_url(cfg, user, Some(app))).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_urls() {
        let cfg = AppConfig::default();
        assert_eq!(user_url(&cfg, "", "alice"), "/v0/users/alice");
        assert_eq!(user_url(&cfg, "modes/", "alice"), "/v0/users/modes/alice");
        assert_eq!(
            user_url(&cfg, "reprioritization/", "a b"),
            "/v0/users/reprioritization/a%20b"
        );
    }

    #[test]
    fn test_category_urls() {
        let cfg = AppConfig::default();
        assert_eq!(categories_url(&cfg, "alice", None), "/v0/users/alice/categories");
        assert_eq!(
            categories_url(&cfg, "alice", Some("Alert manager")),
            "/v0/users/alice/categories/Alert%20manager"
        );
    }
}

use contracts::system::stats::StatsMap;

use crate::shared::api_utils::{get_json, ApiError};
use crate::shared::config::AppConfig;

/// `/v0/stats`
pub async fn fetch_stats(cfg: &AppConfig) -> Result<StatsMap, ApiError> {
    get_json(&cfg.api("stats")).await
}

/// `/v0/applications/<app>/stats`
pub async fn fetch_app_stats(cfg: &AppConfig, app: &str) -> Result<StatsMap, ApiError> {
    get_json(&cfg.api(&format!("applications/{}/stats", urlencoding::encode(app)))).await
}

/// `/v0/singlestats/<name>`
pub async fn fetch_single_stat(cfg: &AppConfig, name: &str) -> Result<StatsMap, ApiError> {
    get_json(&cfg.api(&format!("singlestats/{}", urlencoding::encode(name)))).await
}

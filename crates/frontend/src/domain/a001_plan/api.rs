use contracts::domain::a001_plan::aggregate::{ActivateDto, NewPlanDto, Plan, PlanSummary, PlanVersion};
use serde_json::Value;

use crate::shared::api_utils::{delete, get_json, post_json, post_json_unit, with_query, ApiError, FetchParams, ParamValue};
use crate::shared::config::AppConfig;

/// Fetch plans matching the list filters
pub async fn fetch_plans(cfg: &AppConfig, params: FetchParams) -> Result<Vec<PlanSummary>, ApiError> {
    get_json(&with_query(&cfg.api("plans"), &params)).await
}

pub async fn fetch_plan(cfg: &AppConfig, id: &str) -> Result<Plan, ApiError> {
    get_json(&cfg.api(&format!("plans/{}", urlencoding::encode(id)))).await
}

/// Every version of a plan, oldest first
pub async fn fetch_versions(cfg: &AppConfig, name: &str) -> Result<Vec<PlanVersion>, ApiError> {
    let mut params = FetchParams::new();
    params.insert("name".into(), ParamValue::from(name));
    params.insert("fields".into(), ParamValue::from(&["id", "created", "creator"][..]));
    get_json(&with_query(&cfg.api("plans"), &params)).await
}

/// Active plan with exactly this name
pub async fn find_active_plan(cfg: &AppConfig, name: &str) -> Result<Vec<PlanSummary>, ApiError> {
    let mut params = FetchParams::new();
    params.insert("name".into(), ParamValue::from(name));
    params.insert("active".into(), ParamValue::Int(1));
    get_json(&with_query(&cfg.api("plans"), &params)).await
}

/// Publishes a new version; the response identifies it
pub async fn create_plan(cfg: &AppConfig, dto: &NewPlanDto) -> Result<Value, ApiError> {
    post_json(&cfg.api("plans"), dto).await
}

pub async fn activate_plan(cfg: &AppConfig, id: i64) -> Result<(), ApiError> {
    post_json_unit(&cfg.api(&format!("plans/{}", id)), &ActivateDto::activate()).await
}

pub async fn delete_plan(cfg: &AppConfig, id: i64) -> Result<(), ApiError> {
    delete(&cfg.api(&format!("plans/{}", id))).await
}

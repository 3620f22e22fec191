use contracts::domain::a003_incident::aggregate::{
    ClaimAllDto, ClaimAllResult, ClaimDto, ClaimResult, Incident, IncidentContext, IncidentSummary,
    NewCommentDto, NewIncidentDto, INCIDENT_LIST_FIELDS,
};
use serde_json::Value;

use crate::shared::api_utils::{
    get_json, post_json, post_json_unit, with_query, ApiError, FetchParams, ParamValue,
};
use crate::shared::config::AppConfig;

pub async fn fetch_incidents(cfg: &AppConfig, params: FetchParams) -> Result<Vec<IncidentSummary>, ApiError> {
    let mut params = params;
    params.insert("fields".into(), ParamValue::from(INCIDENT_LIST_FIELDS));
    get_json(&with_query(&cfg.api("incidents/"), &params)).await
}

/// `id__in` query for contexts the summary column has not seen yet
pub fn context_params(ids: &[i64]) -> FetchParams {
    let mut params = FetchParams::new();
    params.insert("fields".into(), ParamValue::from(&["id", "context", "application"][..]));
    params.insert(
        "id__in".into(),
        ParamValue::Str(ids.iter().map(|id| id.to_string()).collect::<Vec<_>>().join(",")),
    );
    params
}

pub async fn fetch_contexts(cfg: &AppConfig, ids: &[i64]) -> Result<Vec<IncidentContext>, ApiError> {
    get_json(&with_query(&cfg.api("incidents/"), &context_params(ids))).await
}

pub async fn fetch_incident(cfg: &AppConfig, id: &str) -> Result<Incident, ApiError> {
    get_json(&cfg.api(&format!("incidents/{}", urlencoding::encode(id)))).await
}

/// `owner: None` unclaims
pub async fn claim_incident(cfg: &AppConfig, id: i64, owner: Option<String>) -> Result<ClaimResult, ApiError> {
    post_json(&cfg.api(&format!("incidents/{}", id)), &ClaimDto { owner }).await
}

pub async fn claim_all(cfg: &AppConfig, owner: &str, ids: Vec<i64>) -> Result<ClaimAllResult, ApiError> {
    let dto = ClaimAllDto {
        owner: owner.to_string(),
        incident_ids: ids,
    };
    post_json(&cfg.api("incidents/claim"), &dto).await
}

/// Responds with the new incident's id
pub async fn create_incident(cfg: &AppConfig, dto: &NewIncidentDto) -> Result<Value, ApiError> {
    post_json(&cfg.api("incidents"), dto).await
}

pub async fn add_comment(cfg: &AppConfig, id: i64, author: &str, content: &str) -> Result<(), ApiError> {
    let dto = NewCommentDto {
        author: author.to_string(),
        content: content.to_string(),
    };
    post_json_unit(&cfg.api(&format!("incidents/{}/comments", id)), &dto).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::api_utils::query_string;

    #[test]
    fn test_context_params() {
        let qs = query_string(&context_params(&[3, 5, 8]));
        assert!(qs.contains("fields=id&fields=context&fields=application"));
        assert!(qs.contains("id__in=3%2C5%2C8"));
    }
}

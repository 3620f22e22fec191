use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Ответ `/v0/stats`, `/v0/applications/<app>/stats` и `/v0/singlestats/<name>`:
/// имя метрики → значение (число или null)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StatsMap(pub BTreeMap<String, serde_json::Value>);

#[derive(Debug, Clone, PartialEq)]
pub struct StatRow {
    pub name: String,
    pub value: String,
}

impl StatsMap {
    /// Rows sorted by name; `null` shows as an empty cell
    pub fn rows(&self) -> Vec<StatRow> {
        self.0
            .iter()
            .map(|(name, value)| StatRow {
                name: name.clone(),
                value: match value {
                    serde_json::Value::Null => String::new(),
                    serde_json::Value::String(s) => s.clone(),
                    other => other.to_string(),
                },
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rows() {
        let stats: StatsMap = serde_json::from_str(
            r#"{"total_plans": 12, "pct_incidents_claimed_last_month": 42.5,
                "median_seconds_to_claim_last_month": null}"#,
        )
        .unwrap();
        let rows = stats.rows();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].name, "median_seconds_to_claim_last_month");
        assert_eq!(rows[0].value, "");
        assert_eq!(rows[2].value, "12");
    }
}

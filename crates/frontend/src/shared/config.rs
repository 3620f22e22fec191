//! Client configuration.
//!
//! Значения по умолчанию совпадают с серверной страницей; bootstrap-данные
//! могут переопределить лимит строк таблицы.

use contracts::shared::app_data::AppData;

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    /// Prefix of every REST call, e.g. `/v0/plans`
    pub api_prefix: String,
    /// Rows requested from list endpoints (`limit=`)
    pub table_entry_limit: usize,
    /// Rows per table page
    pub page_size: usize,
    pub page_size_options: Vec<usize>,
    pub typeahead_debounce_ms: u32,
    /// Default lookback of the `incidentStart` filter
    pub default_lookback_hours: i64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_prefix: "/v0".to_string(),
            table_entry_limit: 500,
            page_size: 25,
            page_size_options: vec![10, 25, 50, 100],
            typeahead_debounce_ms: 200,
            default_lookback_hours: 24,
        }
    }
}

impl AppConfig {
    pub fn from_app_data(data: &AppData) -> Self {
        let mut config = Self::default();
        if let Some(limit) = data.table_entry_limit.filter(|l| *l > 0) {
            config.table_entry_limit = limit;
        }
        config
    }

    /// `api("plans/42")` → `/v0/plans/42`
    pub fn api(&self, path: &str) -> String {
        format!("{}/{}", self.api_prefix, path.trim_start_matches('/'))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.table_entry_limit, 500);
        assert_eq!(config.page_size, 25);
        assert_eq!(config.api("/plans"), "/v0/plans");
        assert_eq!(config.api("incidents/claim"), "/v0/incidents/claim");
    }

    #[test]
    fn test_limit_override() {
        let data = AppData {
            table_entry_limit: Some(100),
            ..Default::default()
        };
        assert_eq!(AppConfig::from_app_data(&data).table_entry_limit, 100);

        let data = AppData {
            table_entry_limit: Some(0),
            ..Default::default()
        };
        assert_eq!(AppConfig::from_app_data(&data).table_entry_limit, 500);
    }
}

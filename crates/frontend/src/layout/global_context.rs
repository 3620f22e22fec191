use crate::shared::alert::AlertService;
use crate::shared::config::AppConfig;
use contracts::shared::app_data::AppData;
use leptos::prelude::*;
use wasm_bindgen::JsValue;
use web_sys::window;

/// Shared client state: bootstrap data, config and the alert slot.
///
/// Создаётся один раз в `App` и раздаётся через context. Модули получают
/// его копией в конструкторе.
#[derive(Clone, Copy)]
pub struct AppContext {
    data: StoredValue<AppData>,
    config: StoredValue<AppConfig>,
    pub alerts: AlertService,
}

impl AppContext {
    pub fn new(data: AppData) -> Self {
        let config = AppConfig::from_app_data(&data);
        Self {
            data: StoredValue::new(data),
            config: StoredValue::new(config),
            alerts: AlertService::new(),
        }
    }

    pub fn bootstrap() -> Self {
        Self::new(read_app_data())
    }

    pub fn user(&self) -> String {
        self.data.with_value(|d| d.user.clone())
    }

    pub fn is_admin(&self) -> bool {
        self.data.with_value(|d| d.user_admin)
    }

    pub fn with_data<R>(&self, f: impl FnOnce(&AppData) -> R) -> R {
        self.data.with_value(f)
    }

    pub fn config(&self) -> AppConfig {
        self.config.get_value()
    }

    /// `api("plans")` → `/v0/plans`
    pub fn api(&self, path: &str) -> String {
        self.config.with_value(|c| c.api(path))
    }
}

pub fn use_app_context() -> AppContext {
    use_context::<AppContext>().expect("AppContext not found in context")
}

/// Reads `window.appData`; falls back to an empty bootstrap.
pub fn read_app_data() -> AppData {
    let Some(w) = window() else {
        return AppData::default();
    };
    let raw = match js_sys::Reflect::get(&w, &JsValue::from_str("appData")) {
        Ok(v) if !v.is_undefined() && !v.is_null() => v,
        _ => {
            log::warn!("window.appData is missing, using empty bootstrap");
            return AppData::default();
        }
    };
    match serde_wasm_bindgen::from_value::<AppData>(raw) {
        Ok(data) => data,
        Err(e) => {
            log::warn!("failed to read window.appData: {}", e);
            AppData::default()
        }
    }
}

pub fn document_title(title: &str) -> String {
    format!("{} - Iris", title)
}

pub fn change_title(title: &str) {
    // на хосте (cargo test) DOM нет
    #[cfg(target_arch = "wasm32")]
    if let Some(doc) = window().and_then(|w| w.document()) {
        doc.set_title(&document_title(title));
    }
    #[cfg(not(target_arch = "wasm32"))]
    log::debug!("title: {}", document_title(title));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_title() {
        assert_eq!(document_title("Plans"), "Plans - Iris");
        assert_eq!(document_title("Incident #42"), "Incident #42 - Iris");
    }
}

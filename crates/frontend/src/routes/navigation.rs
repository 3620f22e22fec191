//! Browser location helpers.
//!
//! Переходы между модулями - полная загрузка страницы; фильтры и номер
//! страницы таблицы пишутся через `history.replaceState`.

use wasm_bindgen::JsValue;
use web_sys::window;

pub fn current_pathname() -> String {
    window()
        .and_then(|w| w.location().pathname().ok())
        .unwrap_or_default()
}

/// `?a=1&b=2` without the leading `?`
pub fn current_search() -> String {
    window()
        .and_then(|w| w.location().search().ok())
        .map(|s| s.trim_start_matches('?').to_string())
        .unwrap_or_default()
}

pub fn current_hash() -> String {
    window()
        .and_then(|w| w.location().hash().ok())
        .unwrap_or_default()
}

pub fn navigate_to(path: &str) {
    if let Some(w) = window() {
        if let Err(e) = w.location().set_href(path) {
            log::error!("navigation to {} failed: {:?}", path, e);
        }
    }
}

pub fn open_in_new_tab(path: &str) {
    if let Some(w) = window() {
        if let Err(e) = w.open_with_url(path) {
            log::error!("failed to open {}: {:?}", path, e);
        }
    }
}

/// Row click: ctrl/meta opens a new tab, otherwise navigates.
pub fn follow_link(path: &str, ev: &web_sys::MouseEvent) {
    if ev.ctrl_key() || ev.meta_key() {
        open_in_new_tab(path);
    } else {
        navigate_to(path);
    }
}

/// Replaces the current history entry, keeping the page loaded.
pub fn replace_url(url: &str) {
    if let Some(w) = window() {
        if let Ok(history) = w.history() {
            if let Err(e) = history.replace_state_with_url(&JsValue::NULL, "", Some(url)) {
                log::warn!("replaceState failed: {:?}", e);
            }
        }
    }
}

/// Focus is in a text control; arrow keys belong to it.
pub fn focus_in_text_entry() -> bool {
    window()
        .and_then(|w| w.document())
        .and_then(|d| d.active_element())
        .map(|el| crate::shared::table::state::is_text_entry(&el.node_name()))
        .unwrap_or(false)
}

pub mod alert;
pub mod api_utils;
pub mod components;
pub mod config;
pub mod date_utils;
pub mod icons;
pub mod list_utils;
pub mod request_tracker;
pub mod summary_template;
pub mod table;
pub mod typeahead;
pub mod validation;
pub mod view_module;

pub mod app_data;
pub mod serde_utils;

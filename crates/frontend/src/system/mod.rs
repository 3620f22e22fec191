pub mod unsubscribe;
pub mod user_settings;
pub mod users;

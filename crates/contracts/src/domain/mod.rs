pub mod a001_plan;
pub mod a002_template;
pub mod a003_incident;
pub mod a004_message;
pub mod a005_application;

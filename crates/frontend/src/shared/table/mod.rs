pub mod controller;
pub mod filter_form;
pub mod filters;
pub mod state;

pub use controller::{list_params, ListView, TableController};
pub use filter_form::FilterForm;
pub use filters::{ControlKind, FilterField, SelectSource, ACTIVE_CHOICES};

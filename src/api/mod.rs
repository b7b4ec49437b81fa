pub mod rest;
pub mod view;

pub use rest::{create_rest_router, AppState};
pub use view::TableView;

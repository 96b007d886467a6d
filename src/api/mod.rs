//! HTTP surface: routes under `/api`, bearer auth, and the extractors that
//! run every body, query and path id through the validation layer.

pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod openapi;
pub mod routes;
pub mod state;

pub use openapi::ApiDoc;
pub use routes::create_router;
pub use state::AppState;

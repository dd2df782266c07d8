//! Web server module
//!
//! Exposes the search service as a JSON API.

mod handlers;
mod routes;
mod state;

pub use handlers::ApiError;
pub use routes::create_router;
pub use state::{AppState, DEFAULT_CONTEXT_ID};

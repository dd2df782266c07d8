//! Search orchestration module
//!
//! Forwards searches to the provider active for an execution context and
//! runs the deep search pipeline: parallel retrieval, optional rerank and
//! fan-out page fetching.

mod models;
mod service;

pub use models::*;
pub use service::WebSearchService;

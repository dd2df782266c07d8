//! HTTP networking module
//!
//! Provides the HTTP client used by providers to reach search backends and
//! fetch pages.

mod client;

pub use client::{HttpClient, HttpRequest, HttpResponse};

//! Web search providers
//!
//! Defines the provider trait, the registry that tracks which provider a
//! context uses, and the bundled provider implementations.

mod loader;
mod registry;
mod traits;

pub mod markdown;
pub mod searxng;

#[cfg(test)]
pub(crate) mod testing;

pub use loader::ProviderLoader;
pub use registry::{ProviderHandle, ProviderRegistry};
pub use traits::*;

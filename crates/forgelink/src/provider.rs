//! Platform-neutral provider layer: error taxonomy, unified data model, and
//! the [`Provider`] trait the platform adapters implement.

pub mod errors;
pub mod types;

pub use errors::{ProviderError, Result};
pub use types::{Organization, PaginationOptions, Provider, Repo};

//! GitHub provider: REST v3 over the shared transport, with App
//! installation-token support.

mod client;
mod convert;
mod error;
mod types;

pub use client::{GitHubProvider, DEFAULT_BASE_URL};
pub use error::GitHubError;

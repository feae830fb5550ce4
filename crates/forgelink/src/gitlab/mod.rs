//! GitLab provider: v4 REST API over the shared transport.

mod client;
mod convert;
mod error;
mod types;

pub use client::{GitLabProvider, DEFAULT_BASE_URL};
pub use error::GitLabError;

//! Bitbucket provider: Cloud (API 2.0) and Server (REST 1.0) behind one
//! client, selected by base URL.

mod client;
mod convert;
mod error;
mod types;

pub use client::{BitbucketProvider, DEFAULT_BASE_URL};
pub use error::BitbucketError;

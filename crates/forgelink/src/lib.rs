//! Unified read-only client for GitHub, GitLab, and Bitbucket.
//!
//! One [`Provider`] trait covers repository metadata, user and organization
//! repository listings, organization discovery, and branch/tag listings
//! across all three platforms. Behind it sits a shared retry engine with
//! exponential backoff and jitter, per-platform error normalization into
//! [`ProviderError`], and pagination that accumulates across pages under a
//! uniform item cap.
//!
//! ```no_run
//! use forgelink::{create_provider, AuthConfig, Platform, ProviderConfig};
//!
//! # async fn run() -> forgelink::Result<()> {
//! let config = ProviderConfig::new(
//!     Platform::GitHub,
//!     AuthConfig::Token { token: "ghp_...".to_string() },
//! );
//! let provider = create_provider(&config)?;
//! let repo = provider.get_repo_metadata("octocat/hello-world").await?;
//! println!("{} (default branch {})", repo.full_name, repo.default_branch);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod factory;
pub mod provider;
pub mod retry;
pub mod transport;

#[cfg(feature = "bitbucket")]
pub mod bitbucket;
#[cfg(feature = "github")]
pub mod github;
#[cfg(feature = "gitlab")]
pub mod gitlab;

pub use config::{AuthConfig, Platform, ProviderConfig};
pub use factory::{create_provider, create_provider_with_organizations};
pub use provider::{Organization, PaginationOptions, Provider, ProviderError, Repo, Result};
pub use retry::RetryPolicy;

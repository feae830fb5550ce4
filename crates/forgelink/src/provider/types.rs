//! Unified data model shared by all provider adapters.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::provider::errors::{ProviderError, Result};

/// A repository, normalized across platforms.
///
/// Values are constructed fresh for each call and never cached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Repo {
    /// Platform-native identifier, stringified.
    pub id: String,
    /// Short name without the namespace.
    pub name: String,
    /// Namespace-qualified name, e.g. `octocat/hello-world`. For Bitbucket
    /// this is workspace- or project-key-qualified.
    pub full_name: String,
    pub description: Option<String>,
    /// Default branch; `"main"` when the platform omits it.
    pub default_branch: String,
    pub is_private: bool,
    pub web_url: Option<String>,
    pub ssh_url: Option<String>,
    pub http_url: Option<String>,
}

/// An organization, group, workspace, or project, depending on platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Organization {
    pub id: String,
    /// The addressing key accepted by
    /// [`Provider::get_organization_repos`]: GitHub login, GitLab full path,
    /// Bitbucket Cloud workspace slug, Bitbucket Server project key.
    pub name: String,
    pub display_name: Option<String>,
    pub description: Option<String>,
    pub web_url: Option<String>,
    /// Caller's role in the organization, best effort. Some platforms only
    /// expose membership implicitly, in which case this is a constant.
    pub role: Option<String>,
}

/// Paging controls for listing operations.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PaginationOptions {
    /// Requested page size; clamped to the platform maximum.
    pub per_page: Option<u32>,
    /// Total cap on returned items across all pages. Unbounded when `None`.
    pub max_items: Option<usize>,
}

impl PaginationOptions {
    /// Effective page size: the requested size clamped to `platform_max`, or
    /// `platform_max` when unset.
    #[must_use]
    pub fn page_size(&self, platform_max: u32) -> u32 {
        self.per_page
            .map_or(platform_max, |n| n.clamp(1, platform_max))
    }

    /// Whether an accumulator holding `len` items has reached the cap.
    #[must_use]
    pub fn reached(&self, len: usize) -> bool {
        self.max_items.is_some_and(|max| len >= max)
    }
}

/// Split `namespace/name` on the last separator.
///
/// Splitting on the last `/` keeps GitLab subgroup namespaces intact
/// (`group/subgroup/project` splits into `group/subgroup` and `project`).
/// Fails with a Configuration error before any network call when the
/// separator is missing or either side is empty.
pub fn split_full_name(full_name: &str) -> Result<(&str, &str)> {
    match full_name.rsplit_once('/') {
        Some((namespace, name)) if !namespace.is_empty() && !name.is_empty() => {
            Ok((namespace, name))
        }
        _ => Err(ProviderError::configuration(format!(
            "invalid repository name '{full_name}': expected 'namespace/name'"
        ))),
    }
}

/// Read-only repository host operations, implemented once per platform.
#[async_trait]
pub trait Provider: Send + Sync + std::fmt::Debug {
    /// Fetch a single repository by its namespace-qualified name.
    async fn get_repo_metadata(&self, full_name: &str) -> Result<Repo>;

    /// List repositories visible to the authenticated identity, optionally
    /// filtered by a platform-side search term.
    async fn get_user_repos(
        &self,
        search: Option<&str>,
        options: PaginationOptions,
    ) -> Result<Vec<Repo>>;

    /// List organizations the authenticated identity belongs to.
    async fn get_organizations(&self, options: PaginationOptions) -> Result<Vec<Organization>>;

    /// List an organization's repositories, optionally filtered.
    async fn get_organization_repos(
        &self,
        org: &str,
        search: Option<&str>,
        options: PaginationOptions,
    ) -> Result<Vec<Repo>>;

    /// List branch names for a repository.
    async fn get_repo_branches(
        &self,
        full_name: &str,
        options: PaginationOptions,
    ) -> Result<Vec<String>>;

    /// List tag names for a repository.
    async fn get_repo_tags(
        &self,
        full_name: &str,
        options: PaginationOptions,
    ) -> Result<Vec<String>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_full_name_uses_the_last_separator() {
        assert_eq!(
            split_full_name("octocat/hello-world").unwrap(),
            ("octocat", "hello-world")
        );
        // GitLab subgroups keep the full namespace on the left.
        assert_eq!(
            split_full_name("group/subgroup/project").unwrap(),
            ("group/subgroup", "project")
        );
    }

    #[test]
    fn split_full_name_rejects_malformed_input() {
        for bad in ["", "no-separator", "/name", "namespace/", "/"] {
            let err = split_full_name(bad).expect_err("should reject");
            assert!(
                matches!(err, ProviderError::Configuration { .. }),
                "{bad}: {err:?}"
            );
        }
    }

    #[test]
    fn page_size_clamps_to_platform_max() {
        let opts = PaginationOptions {
            per_page: Some(500),
            max_items: None,
        };
        assert_eq!(opts.page_size(100), 100);

        let opts = PaginationOptions {
            per_page: Some(30),
            max_items: None,
        };
        assert_eq!(opts.page_size(100), 30);

        assert_eq!(PaginationOptions::default().page_size(100), 100);

        let opts = PaginationOptions {
            per_page: Some(0),
            max_items: None,
        };
        assert_eq!(opts.page_size(100), 1);
    }

    #[test]
    fn reached_respects_unbounded_default() {
        assert!(!PaginationOptions::default().reached(usize::MAX));

        let opts = PaginationOptions {
            per_page: None,
            max_items: Some(150),
        };
        assert!(!opts.reached(149));
        assert!(opts.reached(150));
        assert!(opts.reached(151));
    }
}

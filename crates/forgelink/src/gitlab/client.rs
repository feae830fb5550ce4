//! GitLab provider implementation.

use std::sync::Arc;

use async_trait::async_trait;
use serde::de::DeserializeOwned;

use crate::config::AuthConfig;
use crate::gitlab::convert;
use crate::gitlab::error::{self, GitLabError};
use crate::gitlab::types::{GroupResponse, ProjectResponse, RefResponse};
use crate::provider::errors::ProviderError;
use crate::provider::types::{split_full_name, Organization, PaginationOptions, Provider, Repo};
use crate::provider::Result;
use crate::retry::{retryable_status, with_retry, RetryPolicy};
use crate::transport::{HttpRequest, HttpResponse, HttpTransport};

/// Public GitLab endpoint; overridable for self-hosted instances.
pub const DEFAULT_BASE_URL: &str = "https://gitlab.com";

const MAX_PAGE_SIZE: u32 = 100;

/// Read-only GitLab client.
#[derive(Debug)]
pub struct GitLabProvider {
    transport: Arc<dyn HttpTransport>,
    /// API root including the `/api/v4` suffix.
    api_url: String,
    /// Prepared auth header, `(name, value)`. Built eagerly; no GitLab auth
    /// kind needs a network exchange.
    auth_header: (String, String),
    retry: RetryPolicy,
}

impl GitLabProvider {
    /// Create a client over the given transport.
    ///
    /// Supported auth kinds are `token` (PRIVATE-TOKEN), `oauth` (Bearer),
    /// and `job_token` (JOB-TOKEN); anything else is rejected here.
    pub fn new(
        transport: Arc<dyn HttpTransport>,
        auth: &AuthConfig,
        base_url: Option<&str>,
    ) -> Result<Self> {
        let auth_header = match auth {
            AuthConfig::Token { token } => ("PRIVATE-TOKEN".to_string(), token.clone()),
            AuthConfig::OAuth { token } => {
                ("Authorization".to_string(), format!("Bearer {token}"))
            }
            AuthConfig::JobToken { token } => ("JOB-TOKEN".to_string(), token.clone()),
            other => {
                return Err(ProviderError::configuration(format!(
                    "gitlab does not support {} authentication",
                    other.kind()
                )));
            }
        };

        let base = base_url.unwrap_or(DEFAULT_BASE_URL).trim_end_matches('/');
        Ok(Self {
            transport,
            api_url: format!("{base}/api/v4"),
            auth_header,
            retry: RetryPolicy::default(),
        })
    }

    /// Override the retry policy.
    #[must_use]
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    async fn execute(
        &self,
        request: HttpRequest,
    ) -> std::result::Result<HttpResponse, GitLabError> {
        let (name, value) = &self.auth_header;
        let request = request.header(name.clone(), value.clone());
        with_retry(
            &self.retry,
            || {
                let request = request.clone();
                async move {
                    let resp = self.transport.send(request).await?;
                    if resp.is_success() {
                        Ok(resp)
                    } else {
                        Err(GitLabError::Api(error::status_error(&resp)))
                    }
                }
            },
            |err: &GitLabError| retryable_status(err.status()),
        )
        .await
    }

    async fn get_json<T: DeserializeOwned>(&self, url: String, resource: &str) -> Result<T> {
        let resp = self
            .execute(HttpRequest::get(url))
            .await
            .map_err(|e| e.into_provider(resource))?;
        serde_json::from_slice(&resp.body)
            .map_err(|e| GitLabError::from(e).into_provider(resource))
    }

    fn list_url(&self, path: &str, params: &[(&str, &str)], per_page: u32, page: u32) -> String {
        let mut url = format!("{}{}", self.api_url, path);
        let mut sep = '?';
        for (key, value) in params {
            url.push(sep);
            sep = '&';
            url.push_str(key);
            url.push('=');
            url.push_str(&urlencoding::encode(value));
        }
        url.push(sep);
        url.push_str(&format!("per_page={per_page}&page={page}"));
        url
    }

    /// Paged accumulation driven by the `x-next-page` header. The item cap is
    /// checked per item so the result never exceeds `max_items` and a cap hit
    /// at a page boundary does not fetch another page.
    async fn fetch_paged<T, U, F>(
        &self,
        path: &str,
        params: &[(&str, &str)],
        options: PaginationOptions,
        resource: &str,
        map: F,
    ) -> Result<Vec<U>>
    where
        T: DeserializeOwned,
        F: Fn(T) -> U,
    {
        let per_page = options.page_size(MAX_PAGE_SIZE);
        let mut items = Vec::new();
        let mut page = 1u32;

        loop {
            let url = self.list_url(path, params, per_page, page);
            tracing::debug!(%url, page, accumulated = items.len(), "fetching page");
            let resp = self
                .execute(HttpRequest::get(url))
                .await
                .map_err(|e| e.into_provider(resource))?;
            let raw: Vec<T> = serde_json::from_slice(&resp.body)
                .map_err(|e| GitLabError::from(e).into_provider(resource))?;

            if raw.is_empty() {
                break;
            }
            let count = raw.len();
            for item in raw {
                if options.reached(items.len()) {
                    return Ok(items);
                }
                items.push(map(item));
            }
            if options.reached(items.len()) {
                break;
            }

            // An empty x-next-page means the last page; a missing header
            // (stripped by a proxy) falls back to the page-size heuristic.
            let has_next = match resp.header("x-next-page") {
                Some(next) => !next.trim().is_empty(),
                None => count as u32 == per_page,
            };
            if !has_next {
                break;
            }
            page += 1;
        }

        Ok(items)
    }

    /// Project path segment with `/` escaped, as the v4 API requires.
    fn encode_project(full_name: &str) -> String {
        urlencoding::encode(full_name).into_owned()
    }
}

#[async_trait]
impl Provider for GitLabProvider {
    async fn get_repo_metadata(&self, full_name: &str) -> Result<Repo> {
        split_full_name(full_name)?;
        let resource = format!("project {full_name}");
        let url = format!(
            "{}/projects/{}",
            self.api_url,
            Self::encode_project(full_name)
        );
        let raw: ProjectResponse = self.get_json(url, &resource).await?;
        Ok(convert::to_repo(raw))
    }

    async fn get_user_repos(
        &self,
        search: Option<&str>,
        options: PaginationOptions,
    ) -> Result<Vec<Repo>> {
        let mut params: Vec<(&str, &str)> = vec![("membership", "true")];
        if let Some(term) = search {
            params.push(("search", term));
        }
        self.fetch_paged("/projects", &params, options, "user projects", convert::to_repo)
            .await
    }

    async fn get_organizations(&self, options: PaginationOptions) -> Result<Vec<Organization>> {
        self.fetch_paged::<GroupResponse, _, _>(
            "/groups",
            &[],
            options,
            "groups",
            convert::to_organization,
        )
        .await
    }

    async fn get_organization_repos(
        &self,
        org: &str,
        search: Option<&str>,
        options: PaginationOptions,
    ) -> Result<Vec<Repo>> {
        let mut params: Vec<(&str, &str)> = vec![("include_subgroups", "true")];
        if let Some(term) = search {
            params.push(("search", term));
        }
        let path = format!("/groups/{}/projects", Self::encode_project(org));
        let resource = format!("group {org}");
        self.fetch_paged(&path, &params, options, &resource, convert::to_repo)
            .await
    }

    async fn get_repo_branches(
        &self,
        full_name: &str,
        options: PaginationOptions,
    ) -> Result<Vec<String>> {
        split_full_name(full_name)?;
        let path = format!(
            "/projects/{}/repository/branches",
            Self::encode_project(full_name)
        );
        let resource = format!("project {full_name}");
        self.fetch_paged(&path, &[], options, &resource, |r: RefResponse| r.name)
            .await
    }

    async fn get_repo_tags(
        &self,
        full_name: &str,
        options: PaginationOptions,
    ) -> Result<Vec<String>> {
        split_full_name(full_name)?;
        let path = format!(
            "/projects/{}/repository/tags",
            Self::encode_project(full_name)
        );
        let resource = format!("project {full_name}");
        self.fetch_paged(&path, &[], options, &resource, |r: RefResponse| r.name)
            .await
    }
}

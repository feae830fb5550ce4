//! Bitbucket provider implementation.
//!
//! One client serves both products. A `base_url` that is unset or points at
//! bitbucket.org selects Cloud (API 2.0); any other host is treated as a
//! self-hosted Bitbucket Server / Data Center instance (REST 1.0).

use std::sync::Arc;

use async_trait::async_trait;
use base64::Engine as _;
use serde::de::DeserializeOwned;

use crate::bitbucket::convert;
use crate::bitbucket::error::{self, BitbucketError};
use crate::bitbucket::types::{
    CloudPage, CloudRefResponse, CloudRepoResponse, ServerPage, ServerProjectResponse,
    ServerRefResponse, ServerRepoResponse, WorkspaceResponse,
};
use crate::config::AuthConfig;
use crate::provider::errors::ProviderError;
use crate::provider::types::{split_full_name, Organization, PaginationOptions, Provider, Repo};
use crate::provider::Result;
use crate::retry::{retryable_status, with_retry, RetryPolicy};
use crate::transport::{HttpRequest, HttpResponse, HttpTransport};

/// Public Bitbucket Cloud API endpoint.
pub const DEFAULT_BASE_URL: &str = "https://api.bitbucket.org";

const MAX_PAGE_SIZE: u32 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Cloud,
    Server,
}

/// Read-only Bitbucket client.
#[derive(Debug)]
pub struct BitbucketProvider {
    transport: Arc<dyn HttpTransport>,
    /// API root including the product suffix (`/2.0` or `/rest/api/1.0`).
    api_url: String,
    mode: Mode,
    auth_header: (String, String),
    /// Cloud workspace for user repository listing.
    workspace: Option<String>,
    retry: RetryPolicy,
}

impl BitbucketProvider {
    /// Create a client over the given transport.
    ///
    /// Supported auth kinds are `token`, `oauth` (both Bearer), and `basic`
    /// (app passwords included); anything else is rejected here.
    pub fn new(
        transport: Arc<dyn HttpTransport>,
        auth: &AuthConfig,
        base_url: Option<&str>,
        workspace: Option<&str>,
    ) -> Result<Self> {
        let auth_header = match auth {
            AuthConfig::Token { token } | AuthConfig::OAuth { token } => {
                ("Authorization".to_string(), format!("Bearer {token}"))
            }
            AuthConfig::Basic { username, password } => {
                let encoded = base64::engine::general_purpose::STANDARD
                    .encode(format!("{username}:{password}"));
                ("Authorization".to_string(), format!("Basic {encoded}"))
            }
            other => {
                return Err(ProviderError::configuration(format!(
                    "bitbucket does not support {} authentication",
                    other.kind()
                )));
            }
        };

        let (mode, api_url) = match base_url {
            None => (Mode::Cloud, format!("{DEFAULT_BASE_URL}/2.0")),
            Some(url) if url.contains("bitbucket.org") => {
                (Mode::Cloud, format!("{}/2.0", url.trim_end_matches('/')))
            }
            Some(url) => (
                Mode::Server,
                format!("{}/rest/api/1.0", url.trim_end_matches('/')),
            ),
        };

        Ok(Self {
            transport,
            api_url,
            mode,
            auth_header,
            workspace: workspace.map(str::to_string),
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
    ) -> std::result::Result<HttpResponse, BitbucketError> {
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
                        Err(BitbucketError::Api(error::status_error(&resp)))
                    }
                }
            },
            |err: &BitbucketError| retryable_status(err.status()),
        )
        .await
    }

    async fn get_json<T: DeserializeOwned>(&self, url: String, resource: &str) -> Result<T> {
        let resp = self
            .execute(HttpRequest::get(url))
            .await
            .map_err(|e| e.into_provider(resource))?;
        serde_json::from_slice(&resp.body)
            .map_err(|e| BitbucketError::from(e).into_provider(resource))
    }

    /// Cloud accumulation: follow the envelope's `next` URL. The item cap is
    /// checked per item so the result never exceeds `max_items` and a cap hit
    /// at a page boundary does not fetch another page.
    async fn fetch_cloud_paged<T, U, F>(
        &self,
        first_url: String,
        options: PaginationOptions,
        resource: &str,
        map: F,
    ) -> Result<Vec<U>>
    where
        T: DeserializeOwned,
        F: Fn(T) -> U,
    {
        let mut items = Vec::new();
        let mut url = Some(first_url);
        while let Some(current) = url {
            tracing::debug!(url = %current, accumulated = items.len(), "fetching page");
            let page: CloudPage<T> = self.get_json(current, resource).await?;
            if page.values.is_empty() {
                break;
            }
            for value in page.values {
                if options.reached(items.len()) {
                    return Ok(items);
                }
                items.push(map(value));
            }
            if options.reached(items.len()) {
                break;
            }
            url = page.next;
        }
        Ok(items)
    }

    /// Server accumulation: offset paging via `isLastPage`/`nextPageStart`.
    async fn fetch_server_paged<T, U, F>(
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
        let limit = options.page_size(MAX_PAGE_SIZE);
        let mut items = Vec::new();
        let mut start = 0u64;
        loop {
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
            url.push_str(&format!("limit={limit}&start={start}"));

            tracing::debug!(%url, start, accumulated = items.len(), "fetching page");
            let page: ServerPage<T> = self.get_json(url, resource).await?;
            if page.values.is_empty() {
                break;
            }
            for value in page.values {
                if options.reached(items.len()) {
                    return Ok(items);
                }
                items.push(map(value));
            }
            if options.reached(items.len()) {
                break;
            }
            match (page.is_last_page, page.next_page_start) {
                (false, Some(next)) => start = next,
                _ => break,
            }
        }
        Ok(items)
    }

    fn cloud_list_url(&self, path: &str, params: &[(&str, &str)], pagelen: u32) -> String {
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
        url.push_str(&format!("pagelen={pagelen}"));
        url
    }

    async fn cloud_refs(
        &self,
        full_name: &str,
        kind: &str,
        options: PaginationOptions,
    ) -> Result<Vec<String>> {
        let resource = format!("repository {full_name}");
        let first = self.cloud_list_url(
            &format!("/repositories/{full_name}/refs/{kind}"),
            &[],
            options.page_size(MAX_PAGE_SIZE),
        );
        self.fetch_cloud_paged(first, options, &resource, |r: CloudRefResponse| r.name)
            .await
    }

    async fn server_refs(
        &self,
        project: &str,
        slug: &str,
        kind: &str,
        options: PaginationOptions,
    ) -> Result<Vec<String>> {
        let resource = format!("repository {project}/{slug}");
        self.fetch_server_paged(
            &format!("/projects/{project}/repos/{slug}/{kind}"),
            &[],
            options,
            &resource,
            |r: ServerRefResponse| r.display_id,
        )
        .await
    }
}

#[async_trait]
impl Provider for BitbucketProvider {
    async fn get_repo_metadata(&self, full_name: &str) -> Result<Repo> {
        let (namespace, slug) = split_full_name(full_name)?;
        let resource = format!("repository {full_name}");
        match self.mode {
            Mode::Cloud => {
                let url = format!("{}/repositories/{full_name}", self.api_url);
                let raw: CloudRepoResponse = self.get_json(url, &resource).await?;
                Ok(convert::cloud_repo(raw))
            }
            Mode::Server => {
                let url = format!("{}/projects/{namespace}/repos/{slug}", self.api_url);
                let raw: ServerRepoResponse = self.get_json(url, &resource).await?;
                Ok(convert::server_repo(raw))
            }
        }
    }

    async fn get_user_repos(
        &self,
        search: Option<&str>,
        options: PaginationOptions,
    ) -> Result<Vec<Repo>> {
        match self.mode {
            Mode::Cloud => {
                // Cloud has no cross-workspace repository listing.
                let Some(workspace) = &self.workspace else {
                    return Err(ProviderError::configuration(
                        "bitbucket cloud needs a workspace to list user repositories; \
                         discover available workspaces with get_organizations and configure one",
                    ));
                };
                let query;
                let mut params: Vec<(&str, &str)> = Vec::new();
                if let Some(term) = search {
                    query = format!("name~\"{term}\"");
                    params.push(("q", &query));
                }
                let first = self.cloud_list_url(
                    &format!("/repositories/{workspace}"),
                    &params,
                    options.page_size(MAX_PAGE_SIZE),
                );
                let resource = format!("workspace {workspace}");
                self.fetch_cloud_paged(first, options, &resource, convert::cloud_repo)
                    .await
            }
            Mode::Server => {
                let mut params: Vec<(&str, &str)> = Vec::new();
                if let Some(term) = search {
                    params.push(("name", term));
                }
                self.fetch_server_paged(
                    "/repos",
                    &params,
                    options,
                    "repositories",
                    convert::server_repo,
                )
                .await
            }
        }
    }

    async fn get_organizations(&self, options: PaginationOptions) -> Result<Vec<Organization>> {
        match self.mode {
            Mode::Cloud => {
                let first = self.cloud_list_url(
                    "/workspaces",
                    &[("role", "member")],
                    options.page_size(MAX_PAGE_SIZE),
                );
                self.fetch_cloud_paged(first, options, "workspaces", convert::workspace)
                    .await
            }
            Mode::Server => {
                // Project listing needs broader permissions than repository
                // access on some installations; degrade to an empty list
                // instead of failing the caller.
                match self
                    .fetch_server_paged::<ServerProjectResponse, _, _>(
                        "/projects",
                        &[],
                        options,
                        "projects",
                        convert::server_project,
                    )
                    .await
                {
                    Ok(projects) => Ok(projects),
                    Err(err) => {
                        tracing::warn!(error = %err, "project listing failed, returning no organizations");
                        Ok(Vec::new())
                    }
                }
            }
        }
    }

    async fn get_organization_repos(
        &self,
        org: &str,
        search: Option<&str>,
        options: PaginationOptions,
    ) -> Result<Vec<Repo>> {
        match self.mode {
            Mode::Cloud => {
                let query;
                let mut params: Vec<(&str, &str)> = Vec::new();
                if let Some(term) = search {
                    query = format!("name~\"{term}\"");
                    params.push(("q", &query));
                }
                let first = self.cloud_list_url(
                    &format!("/repositories/{org}"),
                    &params,
                    options.page_size(MAX_PAGE_SIZE),
                );
                let resource = format!("workspace {org}");
                self.fetch_cloud_paged(first, options, &resource, convert::cloud_repo)
                    .await
            }
            Mode::Server => {
                let mut params: Vec<(&str, &str)> = Vec::new();
                if let Some(term) = search {
                    params.push(("name", term));
                }
                let resource = format!("project {org}");
                self.fetch_server_paged(
                    &format!("/projects/{org}/repos"),
                    &params,
                    options,
                    &resource,
                    convert::server_repo,
                )
                .await
            }
        }
    }

    async fn get_repo_branches(
        &self,
        full_name: &str,
        options: PaginationOptions,
    ) -> Result<Vec<String>> {
        let (namespace, slug) = split_full_name(full_name)?;
        match self.mode {
            Mode::Cloud => self.cloud_refs(full_name, "branches", options).await,
            Mode::Server => self.server_refs(namespace, slug, "branches", options).await,
        }
    }

    async fn get_repo_tags(
        &self,
        full_name: &str,
        options: PaginationOptions,
    ) -> Result<Vec<String>> {
        let (namespace, slug) = split_full_name(full_name)?;
        match self.mode {
            Mode::Cloud => self.cloud_refs(full_name, "tags", options).await,
            Mode::Server => self.server_refs(namespace, slug, "tags", options).await,
        }
    }
}

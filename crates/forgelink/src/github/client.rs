//! GitHub provider implementation.

use std::sync::Arc;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use tokio::sync::OnceCell;

use crate::config::AuthConfig;
use crate::github::convert;
use crate::github::error::{self, GitHubError};
use crate::github::types::{InstallationTokenResponse, OrgResponse, RefResponse, RepoResponse};
use crate::provider::errors::ProviderError;
use crate::provider::types::{split_full_name, Organization, PaginationOptions, Provider, Repo};
use crate::provider::Result;
use crate::retry::{retryable_status, with_retry, RetryPolicy};
use crate::transport::{HttpRequest, HttpResponse, HttpTransport};

/// Public GitHub API endpoint; overridable for GitHub Enterprise Server.
pub const DEFAULT_BASE_URL: &str = "https://api.github.com";

const MAX_PAGE_SIZE: u32 = 100;

/// How the client authenticates each request. Token and OAuth credentials
/// yield a ready header; App credentials are exchanged for an installation
/// token lazily on first use.
#[derive(Debug)]
enum Credential {
    Header(String),
    App {
        app_jwt: String,
        installation_id: u64,
        token: OnceCell<String>,
    },
}

/// Read-only GitHub client.
#[derive(Debug)]
pub struct GitHubProvider {
    transport: Arc<dyn HttpTransport>,
    base_url: String,
    credential: Credential,
    retry: RetryPolicy,
}

impl GitHubProvider {
    /// Create a client over the given transport.
    ///
    /// Supported auth kinds are `token`, `oauth`, and `app`; anything else is
    /// rejected here, before any network traffic.
    pub fn new(
        transport: Arc<dyn HttpTransport>,
        auth: &AuthConfig,
        base_url: Option<&str>,
    ) -> Result<Self> {
        let credential = match auth {
            AuthConfig::Token { token } | AuthConfig::OAuth { token } => {
                Credential::Header(format!("Bearer {token}"))
            }
            AuthConfig::App {
                app_jwt,
                installation_id,
            } => Credential::App {
                app_jwt: app_jwt.clone(),
                installation_id: *installation_id,
                token: OnceCell::new(),
            },
            other => {
                return Err(ProviderError::configuration(format!(
                    "github does not support {} authentication",
                    other.kind()
                )));
            }
        };

        Ok(Self {
            transport,
            base_url: base_url
                .unwrap_or(DEFAULT_BASE_URL)
                .trim_end_matches('/')
                .to_string(),
            credential,
            retry: RetryPolicy::default(),
        })
    }

    /// Override the retry policy.
    #[must_use]
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// The Authorization header value, exchanging App credentials for an
    /// installation token on first use. The cell is set only after a full
    /// successful exchange; concurrent first callers coalesce on it.
    async fn auth_header(&self) -> std::result::Result<&str, GitHubError> {
        match &self.credential {
            Credential::Header(header) => Ok(header.as_str()),
            Credential::App {
                app_jwt,
                installation_id,
                token,
            } => token
                .get_or_try_init(|| async {
                    let url = format!(
                        "{}/app/installations/{installation_id}/access_tokens",
                        self.base_url
                    );
                    let request = HttpRequest::post(url, Vec::new())
                        .header("Authorization", format!("Bearer {app_jwt}"))
                        .header("Accept", "application/vnd.github+json");
                    tracing::debug!(installation_id, "exchanging app JWT for installation token");
                    let resp = self.send_with_retry(request).await?;
                    let body: InstallationTokenResponse = serde_json::from_slice(&resp.body)?;
                    Ok(format!("Bearer {}", body.token))
                })
                .await
                .map(String::as_str),
        }
    }

    /// Send one request through the retry engine, without adding auth
    /// headers. Non-2xx responses become typed status errors so the retry
    /// predicate can see the code.
    async fn send_with_retry(
        &self,
        request: HttpRequest,
    ) -> std::result::Result<HttpResponse, GitHubError> {
        with_retry(
            &self.retry,
            || {
                let request = request.clone();
                async move {
                    let resp = self.transport.send(request).await?;
                    if resp.is_success() {
                        Ok(resp)
                    } else {
                        Err(GitHubError::Api(error::status_error(&resp)))
                    }
                }
            },
            |err: &GitHubError| retryable_status(err.status()),
        )
        .await
    }

    /// Authenticated request returning the raw response.
    async fn execute(
        &self,
        request: HttpRequest,
    ) -> std::result::Result<HttpResponse, GitHubError> {
        let auth = self.auth_header().await?.to_string();
        let request = request
            .header("Authorization", auth)
            .header("Accept", "application/vnd.github+json")
            .header("X-GitHub-Api-Version", "2022-11-28");
        self.send_with_retry(request).await
    }

    /// Authenticated GET decoding a JSON body, with errors terminated into
    /// the unified taxonomy under `resource`.
    async fn get_json<T: DeserializeOwned>(&self, url: String, resource: &str) -> Result<T> {
        let resp = self
            .execute(HttpRequest::get(url))
            .await
            .map_err(|e| e.into_provider(resource))?;
        serde_json::from_slice(&resp.body)
            .map_err(|e| GitHubError::from(e).into_provider(resource))
    }

    fn list_url(&self, path: &str, params: &[(&str, &str)], per_page: u32, page: u32) -> String {
        let mut url = format!("{}{}", self.base_url, path);
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

    /// Accumulate a paginated listing, stopping on an empty page, a missing
    /// next-page signal, or the item cap. The cap is checked per item so a
    /// page straddling the boundary is partially consumed, and a cap reached
    /// exactly at a page boundary does not trigger another fetch.
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
                .map_err(|e| GitHubError::from(e).into_provider(resource))?;

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

            let has_next = resp
                .header("link")
                .and_then(parse_link_next)
                .is_some()
                || count as u32 == per_page;
            if !has_next {
                break;
            }
            page += 1;
        }

        Ok(items)
    }
}

/// Extract the `rel="next"` target from a Link header.
fn parse_link_next(value: &str) -> Option<String> {
    for part in value.split(',') {
        let Some((target, params)) = part.trim().split_once(';') else {
            continue;
        };
        if params.contains("rel=\"next\"") {
            return target
                .trim()
                .strip_prefix('<')
                .and_then(|t| t.strip_suffix('>'))
                .map(str::to_string);
        }
    }
    None
}

#[async_trait]
impl Provider for GitHubProvider {
    async fn get_repo_metadata(&self, full_name: &str) -> Result<Repo> {
        split_full_name(full_name)?;
        let resource = format!("repository {full_name}");
        let url = format!("{}/repos/{full_name}", self.base_url);
        let raw: RepoResponse = self.get_json(url, &resource).await?;
        Ok(convert::to_repo(raw))
    }

    async fn get_user_repos(
        &self,
        search: Option<&str>,
        options: PaginationOptions,
    ) -> Result<Vec<Repo>> {
        let mut params: Vec<(&str, &str)> = Vec::new();
        if let Some(term) = search {
            params.push(("q", term));
        }
        self.fetch_paged("/user/repos", &params, options, "user repositories", convert::to_repo)
            .await
    }

    async fn get_organizations(&self, options: PaginationOptions) -> Result<Vec<Organization>> {
        self.fetch_paged::<OrgResponse, _, _>(
            "/user/orgs",
            &[],
            options,
            "organizations",
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
        let mut params: Vec<(&str, &str)> = Vec::new();
        if let Some(term) = search {
            params.push(("q", term));
        }
        let path = format!("/orgs/{org}/repos");
        let resource = format!("organization {org}");
        self.fetch_paged(&path, &params, options, &resource, convert::to_repo)
            .await
    }

    async fn get_repo_branches(
        &self,
        full_name: &str,
        options: PaginationOptions,
    ) -> Result<Vec<String>> {
        split_full_name(full_name)?;
        let path = format!("/repos/{full_name}/branches");
        let resource = format!("repository {full_name}");
        self.fetch_paged(&path, &[], options, &resource, |r: RefResponse| r.name)
            .await
    }

    async fn get_repo_tags(
        &self,
        full_name: &str,
        options: PaginationOptions,
    ) -> Result<Vec<String>> {
        split_full_name(full_name)?;
        let path = format!("/repos/{full_name}/tags");
        let resource = format!("repository {full_name}");
        self.fetch_paged(&path, &[], options, &resource, |r: RefResponse| r.name)
            .await
    }
}

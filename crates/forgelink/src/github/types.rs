//! GitHub REST v3 response shapes.
//!
//! Only the fields the crate reads are declared, so additions to the API
//! payloads never break deserialization.

use serde::Deserialize;

/// A repository as returned by `/repos/{owner}/{repo}` and list endpoints.
#[derive(Debug, Deserialize)]
pub struct RepoResponse {
    pub id: u64,
    pub name: String,
    pub full_name: String,
    pub description: Option<String>,
    pub default_branch: Option<String>,
    pub private: bool,
    pub html_url: Option<String>,
    pub ssh_url: Option<String>,
    pub clone_url: Option<String>,
}

/// An organization as returned by `/user/orgs`.
#[derive(Debug, Deserialize)]
pub struct OrgResponse {
    pub id: u64,
    pub login: String,
    pub description: Option<String>,
}

/// A branch or tag; both endpoints return objects with a `name`.
#[derive(Debug, Deserialize)]
pub struct RefResponse {
    pub name: String,
}

/// Response to the App installation-token exchange.
#[derive(Debug, Deserialize)]
pub struct InstallationTokenResponse {
    pub token: String,
}

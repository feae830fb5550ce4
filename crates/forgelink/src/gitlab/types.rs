//! GitLab v4 API response shapes.

use serde::Deserialize;

/// A project from `/projects` endpoints.
#[derive(Debug, Deserialize)]
pub struct ProjectResponse {
    pub id: u64,
    /// Short project name (path component).
    pub path: String,
    pub path_with_namespace: String,
    pub description: Option<String>,
    pub default_branch: Option<String>,
    /// `public`, `internal`, or `private`. Absent on some self-hosted
    /// instances with visibility features disabled.
    pub visibility: Option<String>,
    pub web_url: Option<String>,
    pub ssh_url_to_repo: Option<String>,
    pub http_url_to_repo: Option<String>,
}

/// A group from `/groups`. Subgroups carry their ancestry in `full_path`.
#[derive(Debug, Deserialize)]
pub struct GroupResponse {
    pub id: u64,
    pub name: String,
    pub full_path: String,
    pub description: Option<String>,
    pub web_url: Option<String>,
}

/// A branch or tag from `/repository/branches` and `/repository/tags`.
#[derive(Debug, Deserialize)]
pub struct RefResponse {
    pub name: String,
}

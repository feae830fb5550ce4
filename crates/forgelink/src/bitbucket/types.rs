//! Bitbucket response shapes, Cloud (API 2.0) and Server (REST 1.0).
//!
//! The two products share almost nothing: Cloud paginates with a `next` URL
//! in the body envelope, Server with `isLastPage`/`nextPageStart` offsets.

use serde::Deserialize;

// ---------- Cloud (api.bitbucket.org/2.0) ----------

/// Cloud collection envelope. `next` is a full URL to the following page.
#[derive(Debug, Deserialize)]
pub struct CloudPage<T> {
    pub values: Vec<T>,
    pub next: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CloudRepoResponse {
    pub uuid: String,
    pub name: String,
    /// `workspace/slug`.
    pub full_name: String,
    pub description: Option<String>,
    #[serde(default)]
    pub is_private: bool,
    pub mainbranch: Option<CloudMainBranch>,
    pub links: Option<CloudRepoLinks>,
}

#[derive(Debug, Deserialize)]
pub struct CloudMainBranch {
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CloudRepoLinks {
    pub html: Option<CloudLink>,
    #[serde(default)]
    pub clone: Vec<CloudCloneLink>,
}

#[derive(Debug, Deserialize)]
pub struct CloudLink {
    pub href: String,
}

/// Clone endpoint; `name` is `"https"` or `"ssh"`.
#[derive(Debug, Deserialize)]
pub struct CloudCloneLink {
    pub name: String,
    pub href: String,
}

#[derive(Debug, Deserialize)]
pub struct WorkspaceResponse {
    pub uuid: String,
    pub slug: String,
    pub name: Option<String>,
    pub links: Option<CloudWorkspaceLinks>,
}

#[derive(Debug, Deserialize)]
pub struct CloudWorkspaceLinks {
    pub html: Option<CloudLink>,
}

/// A branch or tag under `/refs/`.
#[derive(Debug, Deserialize)]
pub struct CloudRefResponse {
    pub name: String,
}

// ---------- Server (/rest/api/1.0) ----------

/// Server collection envelope.
#[derive(Debug, Deserialize)]
pub struct ServerPage<T> {
    pub values: Vec<T>,
    #[serde(rename = "isLastPage", default)]
    pub is_last_page: bool,
    #[serde(rename = "nextPageStart")]
    pub next_page_start: Option<u64>,
}

#[derive(Debug, Deserialize)]
pub struct ServerRepoResponse {
    pub id: u64,
    pub slug: String,
    pub name: String,
    pub description: Option<String>,
    #[serde(default)]
    pub public: bool,
    pub project: ServerProjectRef,
    pub links: Option<ServerRepoLinks>,
}

#[derive(Debug, Deserialize)]
pub struct ServerProjectRef {
    pub key: String,
}

#[derive(Debug, Deserialize)]
pub struct ServerRepoLinks {
    #[serde(rename = "self", default)]
    pub self_links: Vec<CloudLink>,
    #[serde(default)]
    pub clone: Vec<CloudCloneLink>,
}

#[derive(Debug, Deserialize)]
pub struct ServerProjectResponse {
    pub id: u64,
    pub key: String,
    pub name: Option<String>,
    pub description: Option<String>,
}

/// A branch or tag; `displayId` is the short ref name.
#[derive(Debug, Deserialize)]
pub struct ServerRefResponse {
    #[serde(rename = "displayId")]
    pub display_id: String,
}

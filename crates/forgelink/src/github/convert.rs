//! Conversions from GitHub response shapes to the unified data model.

use crate::github::types::{OrgResponse, RepoResponse};
use crate::provider::types::{Organization, Repo};

pub(crate) fn to_repo(resp: RepoResponse) -> Repo {
    Repo {
        id: resp.id.to_string(),
        name: resp.name,
        full_name: resp.full_name,
        description: resp.description,
        default_branch: resp.default_branch.unwrap_or_else(|| "main".to_string()),
        is_private: resp.private,
        web_url: resp.html_url,
        ssh_url: resp.ssh_url,
        http_url: resp.clone_url,
    }
}

pub(crate) fn to_organization(resp: OrgResponse) -> Organization {
    Organization {
        id: resp.id.to_string(),
        name: resp.login,
        display_name: None,
        description: resp.description,
        web_url: None,
        // /user/orgs only returns orgs the caller belongs to.
        role: Some("member".to_string()),
    }
}

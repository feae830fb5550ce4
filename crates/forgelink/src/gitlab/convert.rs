//! Conversions from GitLab response shapes to the unified data model.

use crate::gitlab::types::{GroupResponse, ProjectResponse};
use crate::provider::types::{Organization, Repo};

pub(crate) fn to_repo(resp: ProjectResponse) -> Repo {
    Repo {
        id: resp.id.to_string(),
        name: resp.path,
        full_name: resp.path_with_namespace,
        description: resp.description,
        default_branch: resp.default_branch.unwrap_or_else(|| "main".to_string()),
        // Instances with visibility disabled omit the field; treat as private.
        is_private: resp.visibility.as_deref() != Some("public"),
        web_url: resp.web_url,
        ssh_url: resp.ssh_url_to_repo,
        http_url: resp.http_url_to_repo,
    }
}

pub(crate) fn to_organization(resp: GroupResponse) -> Organization {
    Organization {
        id: resp.id.to_string(),
        // full_path addresses subgroups unambiguously.
        name: resp.full_path,
        display_name: Some(resp.name),
        description: resp.description,
        web_url: resp.web_url,
        role: None,
    }
}

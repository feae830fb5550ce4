//! Conversions from Bitbucket response shapes to the unified data model.

use crate::bitbucket::types::{
    CloudCloneLink, CloudRepoResponse, ServerProjectResponse, ServerRepoResponse,
    WorkspaceResponse,
};
use crate::provider::types::{Organization, Repo};

fn clone_href<'a>(links: &'a [CloudCloneLink], scheme: &str) -> Option<&'a str> {
    links
        .iter()
        .find(|l| l.name.eq_ignore_ascii_case(scheme))
        .map(|l| l.href.as_str())
}

pub(crate) fn cloud_repo(resp: CloudRepoResponse) -> Repo {
    let (web_url, ssh_url, http_url) = match &resp.links {
        Some(links) => (
            links.html.as_ref().map(|l| l.href.clone()),
            clone_href(&links.clone, "ssh").map(str::to_string),
            clone_href(&links.clone, "https").map(str::to_string),
        ),
        None => (None, None, None),
    };
    Repo {
        id: resp.uuid,
        name: resp.name,
        full_name: resp.full_name,
        description: resp.description,
        default_branch: resp
            .mainbranch
            .and_then(|b| b.name)
            .unwrap_or_else(|| "main".to_string()),
        is_private: resp.is_private,
        web_url,
        ssh_url,
        http_url,
    }
}

pub(crate) fn workspace(resp: WorkspaceResponse) -> Organization {
    Organization {
        id: resp.uuid,
        name: resp.slug,
        display_name: resp.name,
        description: None,
        web_url: resp.links.and_then(|l| l.html).map(|l| l.href),
        // The listing is filtered to role=member.
        role: Some("member".to_string()),
    }
}

pub(crate) fn server_repo(resp: ServerRepoResponse) -> Repo {
    let (web_url, ssh_url, http_url) = match &resp.links {
        Some(links) => (
            links.self_links.first().map(|l| l.href.clone()),
            clone_href(&links.clone, "ssh").map(str::to_string),
            clone_href(&links.clone, "http").map(str::to_string),
        ),
        None => (None, None, None),
    };
    Repo {
        id: resp.id.to_string(),
        full_name: format!("{}/{}", resp.project.key, resp.slug),
        name: resp.name,
        description: resp.description,
        // Server repo listings do not carry the default branch.
        default_branch: "main".to_string(),
        is_private: !resp.public,
        web_url,
        ssh_url,
        http_url,
    }
}

pub(crate) fn server_project(resp: ServerProjectResponse) -> Organization {
    Organization {
        id: resp.id.to_string(),
        name: resp.key,
        display_name: resp.name,
        description: resp.description,
        web_url: None,
        role: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bitbucket::types::{CloudLink, CloudMainBranch, CloudRepoLinks, ServerProjectRef};

    #[test]
    fn cloud_repo_picks_clone_links_by_scheme() {
        let repo = cloud_repo(CloudRepoResponse {
            uuid: "{123}".to_string(),
            name: "app".to_string(),
            full_name: "team/app".to_string(),
            description: None,
            is_private: true,
            mainbranch: Some(CloudMainBranch {
                name: Some("develop".to_string()),
            }),
            links: Some(CloudRepoLinks {
                html: Some(CloudLink {
                    href: "https://bitbucket.org/team/app".to_string(),
                }),
                clone: vec![
                    CloudCloneLink {
                        name: "https".to_string(),
                        href: "https://bitbucket.org/team/app.git".to_string(),
                    },
                    CloudCloneLink {
                        name: "ssh".to_string(),
                        href: "git@bitbucket.org:team/app.git".to_string(),
                    },
                ],
            }),
        });
        assert_eq!(repo.default_branch, "develop");
        assert_eq!(repo.ssh_url.as_deref(), Some("git@bitbucket.org:team/app.git"));
        assert_eq!(
            repo.http_url.as_deref(),
            Some("https://bitbucket.org/team/app.git")
        );
    }

    #[test]
    fn server_repo_is_project_key_qualified() {
        let repo = server_repo(ServerRepoResponse {
            id: 9,
            slug: "app".to_string(),
            name: "App".to_string(),
            description: None,
            public: false,
            project: ServerProjectRef {
                key: "PLAT".to_string(),
            },
            links: None,
        });
        assert_eq!(repo.full_name, "PLAT/app");
        assert!(repo.is_private);
        assert_eq!(repo.default_branch, "main");
    }

    #[test]
    fn workspace_addressing_key_is_the_slug() {
        let org = workspace(WorkspaceResponse {
            uuid: "{ws}".to_string(),
            slug: "team".to_string(),
            name: Some("The Team".to_string()),
            links: None,
        });
        assert_eq!(org.name, "team");
        assert_eq!(org.role.as_deref(), Some("member"));
    }

    #[test]
    fn server_project_addressing_key_is_the_key() {
        let org = server_project(ServerProjectResponse {
            id: 2,
            key: "PLAT".to_string(),
            name: Some("Platform".to_string()),
            description: None,
        });
        assert_eq!(org.name, "PLAT");
        assert_eq!(org.role, None);
    }
}

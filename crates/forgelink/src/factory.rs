//! Provider construction from configuration.

use std::sync::Arc;

use crate::config::{Platform, ProviderConfig};
use crate::provider::errors::ProviderError;
use crate::provider::types::{Organization, PaginationOptions, Provider};
use crate::provider::Result;
use crate::transport::reqwest_transport::ReqwestTransport;
use crate::transport::HttpTransport;

/// Build a provider for the configured platform.
///
/// Pure dispatch: no network traffic happens here. Requesting a platform
/// whose cargo feature is compiled out is a Configuration error naming the
/// feature.
pub fn create_provider(config: &ProviderConfig) -> Result<Arc<dyn Provider>> {
    let transport: Arc<dyn HttpTransport> = Arc::new(
        ReqwestTransport::build(config.timeout(), &config.user_agent).map_err(|e| {
            ProviderError::configuration(format!("failed to build http transport: {e}"))
        })?,
    );
    build_provider(transport, config)
}

fn build_provider(
    transport: Arc<dyn HttpTransport>,
    config: &ProviderConfig,
) -> Result<Arc<dyn Provider>> {
    match config.platform {
        #[cfg(feature = "github")]
        Platform::GitHub => Ok(Arc::new(crate::github::GitHubProvider::new(
            transport,
            &config.auth,
            config.base_url.as_deref(),
        )?)),
        #[cfg(feature = "gitlab")]
        Platform::GitLab => Ok(Arc::new(crate::gitlab::GitLabProvider::new(
            transport,
            &config.auth,
            config.base_url.as_deref(),
        )?)),
        #[cfg(feature = "bitbucket")]
        Platform::Bitbucket => Ok(Arc::new(crate::bitbucket::BitbucketProvider::new(
            transport,
            &config.auth,
            config.base_url.as_deref(),
            config.workspace.as_deref(),
        )?)),
        #[allow(unreachable_patterns)]
        other => Err(ProviderError::configuration(format!(
            "support for {other} is not compiled in; enable the '{other}' cargo feature"
        ))),
    }
}

/// Build a provider and discover its organizations in one step.
///
/// Discovery is best effort: a failure is logged and an empty list returned,
/// never propagated.
pub async fn create_provider_with_organizations(
    config: &ProviderConfig,
) -> Result<(Arc<dyn Provider>, Vec<Organization>)> {
    let provider = create_provider(config)?;
    let organizations = discover_organizations(provider.as_ref()).await;
    Ok((provider, organizations))
}

/// One `get_organizations` call with default paging, tolerating failure.
pub async fn discover_organizations(provider: &dyn Provider) -> Vec<Organization> {
    match provider.get_organizations(PaginationOptions::default()).await {
        Ok(organizations) => organizations,
        Err(err) => {
            tracing::warn!(error = %err, "organization discovery failed, continuing without organizations");
            Vec::new()
        }
    }
}

#[cfg(all(test, feature = "github", feature = "gitlab", feature = "bitbucket"))]
mod tests {
    use super::*;
    use crate::config::AuthConfig;
    use crate::github::GitHubProvider;
    use crate::transport::{HttpMethod, MockTransport};

    fn token() -> AuthConfig {
        AuthConfig::Token {
            token: "t".to_string(),
        }
    }

    #[test]
    fn create_provider_dispatches_on_platform() {
        for platform in [Platform::GitHub, Platform::GitLab, Platform::Bitbucket] {
            create_provider(&ProviderConfig::new(platform, token())).expect("provider");
        }
    }

    #[test]
    fn create_provider_surfaces_construction_errors() {
        let config = ProviderConfig::new(
            Platform::GitHub,
            AuthConfig::Basic {
                username: "u".to_string(),
                password: "p".to_string(),
            },
        );
        let err = create_provider(&config).expect_err("unsupported auth");
        assert!(matches!(err, ProviderError::Configuration { .. }));
    }

    #[tokio::test]
    async fn discovery_returns_organizations_on_success() {
        let transport = MockTransport::new();
        transport.push_json(
            HttpMethod::Get,
            "https://api.github.com/user/orgs?per_page=100&page=1",
            200,
            r#"[{"id": 1, "login": "octo-org", "description": null}]"#,
        );
        let provider =
            GitHubProvider::new(Arc::new(transport), &token(), None).expect("provider");

        let orgs = discover_organizations(&provider).await;
        assert_eq!(orgs.len(), 1);
        assert_eq!(orgs[0].name, "octo-org");
    }

    #[tokio::test(start_paused = true)]
    async fn discovery_failure_yields_an_empty_list() {
        // No mock response registered: every attempt fails without a status
        // and the retry budget is spent before discovery gives up.
        let transport = MockTransport::new();
        let provider =
            GitHubProvider::new(Arc::new(transport.clone()), &token(), None).expect("provider");

        let orgs = discover_organizations(&provider).await;
        assert!(orgs.is_empty());
        assert_eq!(transport.request_count(), 4);
    }
}

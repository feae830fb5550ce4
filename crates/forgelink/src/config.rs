//! Provider configuration.
//!
//! Everything here derives serde so callers can load configuration from
//! whatever format they use; the crate itself does no file I/O.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Default User-Agent sent with every request.
pub const DEFAULT_USER_AGENT: &str = concat!("forgelink/", env!("CARGO_PKG_VERSION"));

/// The platforms a provider can be created for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    GitHub,
    GitLab,
    Bitbucket,
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Platform::GitHub => "github",
            Platform::GitLab => "gitlab",
            Platform::Bitbucket => "bitbucket",
        };
        f.write_str(name)
    }
}

/// Credential kinds. Exactly one variant is active; adapters reject kinds
/// they do not support with a Configuration error at construction time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AuthConfig {
    /// Personal access token.
    Token { token: String },
    /// OAuth 2 bearer token.
    #[serde(rename = "oauth")]
    OAuth { token: String },
    /// GitHub App credentials: a pre-signed app JWT and the installation to
    /// exchange it for an installation token.
    App {
        app_jwt: String,
        installation_id: u64,
    },
    /// Username and password, Bitbucket app passwords included.
    Basic { username: String, password: String },
    /// GitLab CI job token.
    JobToken { token: String },
}

impl AuthConfig {
    /// Short name for error messages.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            AuthConfig::Token { .. } => "token",
            AuthConfig::OAuth { .. } => "oauth",
            AuthConfig::App { .. } => "app",
            AuthConfig::Basic { .. } => "basic",
            AuthConfig::JobToken { .. } => "job_token",
        }
    }
}

/// Everything needed to construct a provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderConfig {
    pub platform: Platform,
    pub auth: AuthConfig,
    /// Override for self-hosted installations. `None` selects the public
    /// cloud endpoint for the platform.
    #[serde(default)]
    pub base_url: Option<String>,
    /// Bitbucket Cloud workspace slug. Required there for user repository
    /// listing; ignored by the other platforms.
    #[serde(default)]
    pub workspace: Option<String>,
    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT.as_secs()
}

fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}

impl ProviderConfig {
    /// Minimal configuration for a platform and credential; everything else
    /// takes defaults.
    pub fn new(platform: Platform, auth: AuthConfig) -> Self {
        Self {
            platform,
            auth,
            base_url: None,
            workspace: None,
            timeout_secs: default_timeout_secs(),
            user_agent: default_user_agent(),
        }
    }

    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    #[must_use]
    pub fn with_workspace(mut self, workspace: impl Into<String>) -> Self {
        self.workspace = Some(workspace.into());
        self
    }

    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auth_config_deserializes_by_kind_tag() {
        let auth: AuthConfig =
            serde_json::from_str(r#"{"kind": "token", "token": "abc"}"#).unwrap();
        assert_eq!(
            auth,
            AuthConfig::Token {
                token: "abc".to_string()
            }
        );

        let auth: AuthConfig =
            serde_json::from_str(r#"{"kind": "oauth", "token": "xyz"}"#).unwrap();
        assert_eq!(
            auth,
            AuthConfig::OAuth {
                token: "xyz".to_string()
            }
        );

        let auth: AuthConfig = serde_json::from_str(
            r#"{"kind": "app", "app_jwt": "jwt", "installation_id": 42}"#,
        )
        .unwrap();
        assert_eq!(
            auth,
            AuthConfig::App {
                app_jwt: "jwt".to_string(),
                installation_id: 42
            }
        );

        let auth: AuthConfig =
            serde_json::from_str(r#"{"kind": "job_token", "token": "ci"}"#).unwrap();
        assert_eq!(
            auth,
            AuthConfig::JobToken {
                token: "ci".to_string()
            }
        );
    }

    #[test]
    fn provider_config_fills_defaults() {
        let config: ProviderConfig = serde_json::from_str(
            r#"{"platform": "gitlab", "auth": {"kind": "token", "token": "t"}}"#,
        )
        .unwrap();
        assert_eq!(config.platform, Platform::GitLab);
        assert_eq!(config.base_url, None);
        assert_eq!(config.workspace, None);
        assert_eq!(config.timeout(), DEFAULT_TIMEOUT);
        assert_eq!(config.user_agent, DEFAULT_USER_AGENT);
    }

    #[test]
    fn builder_helpers_set_overrides() {
        let config = ProviderConfig::new(
            Platform::Bitbucket,
            AuthConfig::Basic {
                username: "u".to_string(),
                password: "p".to_string(),
            },
        )
        .with_base_url("https://bitbucket.example.com")
        .with_workspace("team");

        assert_eq!(
            config.base_url.as_deref(),
            Some("https://bitbucket.example.com")
        );
        assert_eq!(config.workspace.as_deref(), Some("team"));
    }
}

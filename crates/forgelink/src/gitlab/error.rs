//! GitLab error types and mapping into the unified taxonomy.

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::provider::errors::{self, HttpStatusError, ProviderError};
use crate::transport::{HttpResponse, TransportError};

/// Errors from GitLab API operations.
#[derive(Debug, Error)]
pub enum GitLabError {
    #[error("GitLab API error: {0}")]
    Api(#[from] HttpStatusError),

    #[error("GitLab request failed: {0}")]
    Transport(#[from] TransportError),

    #[error("failed to decode GitLab response: {0}")]
    Decode(#[from] serde_json::Error),
}

impl GitLabError {
    pub(crate) fn status(&self) -> Option<u16> {
        errors::probe_status(self)
    }

    pub(crate) fn into_provider(self, resource: &str) -> ProviderError {
        errors::map_opaque_error(resource, Box::new(self))
    }
}

/// Typed status error from a failed response; 429 picks up the reset time
/// from `RateLimit-Reset` (epoch) or `Retry-After` (seconds).
pub(crate) fn status_error(resp: &HttpResponse) -> HttpStatusError {
    let mut err = HttpStatusError::new(resp.status, resp.body_text());
    if resp.status == 429 {
        err = err.with_reset_at(parse_reset(resp));
    }
    err
}

fn parse_reset(resp: &HttpResponse) -> Option<DateTime<Utc>> {
    if let Some(epoch) = resp
        .header("ratelimit-reset")
        .and_then(|v| v.trim().parse::<i64>().ok())
    {
        return DateTime::from_timestamp(epoch, 0);
    }
    resp.header("retry-after")
        .and_then(|v| v.trim().parse::<i64>().ok())
        .map(|secs| Utc::now() + chrono::Duration::seconds(secs))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rate_limit_reset_prefers_epoch_header() {
        let resp = HttpResponse {
            status: 429,
            headers: vec![
                ("RateLimit-Reset".to_string(), "1735689600".to_string()),
                ("Retry-After".to_string(), "60".to_string()),
            ],
            body: Vec::new(),
        };
        assert_eq!(
            status_error(&resp).reset_at,
            DateTime::from_timestamp(1_735_689_600, 0)
        );
    }

    #[test]
    fn retry_after_is_relative_to_now() {
        let resp = HttpResponse {
            status: 429,
            headers: vec![("Retry-After".to_string(), "60".to_string())],
            body: Vec::new(),
        };
        let reset = status_error(&resp).reset_at.expect("reset");
        let delta = reset - Utc::now();
        assert!(delta <= chrono::Duration::seconds(61));
        assert!(delta >= chrono::Duration::seconds(58));
    }

    #[test]
    fn into_provider_maps_auth_statuses() {
        let err = GitLabError::Api(HttpStatusError::new(403, "forbidden"))
            .into_provider("project g/p");
        assert!(matches!(err, ProviderError::Auth { .. }));
    }
}

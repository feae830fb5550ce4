//! GitHub error types and mapping into the unified taxonomy.

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::provider::errors::{self, HttpStatusError, ProviderError};
use crate::transport::{HttpResponse, TransportError};

/// Errors from GitHub API operations.
#[derive(Debug, Error)]
pub enum GitHubError {
    /// Non-2xx response from the API.
    #[error("GitHub API error: {0}")]
    Api(#[from] HttpStatusError),

    /// Failure below the HTTP layer.
    #[error("GitHub request failed: {0}")]
    Transport(#[from] TransportError),

    /// Response body did not match the expected shape.
    #[error("failed to decode GitHub response: {0}")]
    Decode(#[from] serde_json::Error),
}

impl GitHubError {
    /// HTTP status recovered through the probe chain, if any.
    pub(crate) fn status(&self) -> Option<u16> {
        errors::probe_status(self)
    }

    /// Terminate into the unified taxonomy, labeling the resource for
    /// not-found messages.
    pub(crate) fn into_provider(self, resource: &str) -> ProviderError {
        errors::map_opaque_error(resource, Box::new(self))
    }
}

/// Build a typed status error from a failed response, picking up the
/// rate-limit reset timestamp on 429.
pub(crate) fn status_error(resp: &HttpResponse) -> HttpStatusError {
    let mut err = HttpStatusError::new(resp.status, resp.body_text());
    if resp.status == 429 {
        err = err.with_reset_at(parse_reset(resp));
    }
    err
}

/// `x-ratelimit-reset` is a Unix timestamp; `retry-after` is seconds.
fn parse_reset(resp: &HttpResponse) -> Option<DateTime<Utc>> {
    if let Some(epoch) = resp
        .header("x-ratelimit-reset")
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

    fn response(status: u16, headers: Vec<(String, String)>) -> HttpResponse {
        HttpResponse {
            status,
            headers,
            body: b"limited".to_vec(),
        }
    }

    #[test]
    fn status_error_reads_reset_epoch_on_429() {
        let resp = response(
            429,
            vec![("x-ratelimit-reset".to_string(), "1735689600".to_string())],
        );
        let err = status_error(&resp);
        assert_eq!(err.status, 429);
        assert_eq!(
            err.reset_at,
            DateTime::from_timestamp(1_735_689_600, 0)
        );
    }

    #[test]
    fn status_error_ignores_reset_headers_off_429() {
        let resp = response(
            403,
            vec![("x-ratelimit-reset".to_string(), "1735689600".to_string())],
        );
        assert_eq!(status_error(&resp).reset_at, None);
    }

    #[test]
    fn api_error_exposes_status_via_source_chain() {
        let err = GitHubError::Api(HttpStatusError::new(404, "missing"));
        assert_eq!(err.status(), Some(404));
    }

    #[test]
    fn transport_error_has_no_status() {
        let err = GitHubError::Transport(TransportError::Transport(
            "connection refused".to_string(),
        ));
        assert_eq!(err.status(), None);
    }

    #[test]
    fn into_provider_maps_404_to_not_found() {
        let err = GitHubError::Api(HttpStatusError::new(404, "missing"))
            .into_provider("repository a/b");
        assert!(matches!(err, ProviderError::NotFound { .. }));
    }
}

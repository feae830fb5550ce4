//! The unified error taxonomy and the status-probe chain behind it.
//!
//! Vendor transport failures arrive in heterogeneous shapes: a status field on
//! the error itself, a status buried in the `source()` chain, or only a
//! message substring. [`probe_status`] tries an explicit, ordered list of
//! extractors so the fallback order is visible and testable independent of
//! which shape a platform presents.

use chrono::{DateTime, Utc};
use thiserror::Error;

pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors surfaced by every provider operation.
///
/// Transport failures are mapped to exactly one of these kinds at the adapter
/// boundary; callers never see a raw transport error. The original cause is
/// attached as `source` for diagnostics where one exists.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The requested repository, organization, or ref does not exist.
    #[error("not found: {resource}")]
    NotFound {
        resource: String,
        #[source]
        cause: Option<BoxError>,
    },

    /// Authentication failed or the credential lacks access (401/403).
    #[error("authentication failed: {message}")]
    Auth {
        message: String,
        #[source]
        cause: Option<BoxError>,
    },

    /// Rate limit exceeded; `reset_at` is populated when the platform says so.
    #[error("rate limit exceeded")]
    RateLimited {
        reset_at: Option<DateTime<Utc>>,
        #[source]
        cause: Option<BoxError>,
    },

    /// Network or server-side failure, potentially transient.
    #[error("network error: {message}")]
    Network {
        message: String,
        #[source]
        cause: Option<BoxError>,
    },

    /// Caller or setup mistake: wrong auth kind, malformed repo identifier,
    /// missing workspace. Never retried.
    #[error("configuration error: {message}")]
    Configuration { message: String },
}

impl ProviderError {
    #[inline]
    pub fn not_found(resource: impl Into<String>, cause: Option<BoxError>) -> Self {
        Self::NotFound {
            resource: resource.into(),
            cause,
        }
    }

    #[inline]
    pub fn auth(message: impl Into<String>, cause: Option<BoxError>) -> Self {
        Self::Auth {
            message: message.into(),
            cause,
        }
    }

    #[inline]
    pub fn rate_limited(reset_at: Option<DateTime<Utc>>, cause: Option<BoxError>) -> Self {
        Self::RateLimited { reset_at, cause }
    }

    #[inline]
    pub fn network(message: impl Into<String>, cause: Option<BoxError>) -> Self {
        Self::Network {
            message: message.into(),
            cause,
        }
    }

    #[inline]
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }
}

/// Result type for provider operations.
pub type Result<T> = std::result::Result<T, ProviderError>;

/// A typed HTTP failure carrying the status code.
///
/// Platform error enums embed this as the `source` of their API variants so
/// the probe chain can recover the status by walking `source()` links.
#[derive(Debug, Error)]
#[error("http status {status}: {message}")]
pub struct HttpStatusError {
    pub status: u16,
    pub message: String,
    pub reset_at: Option<DateTime<Utc>>,
}

impl HttpStatusError {
    pub fn new(status: u16, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            reset_at: None,
        }
    }

    #[must_use]
    pub fn with_reset_at(mut self, reset_at: Option<DateTime<Utc>>) -> Self {
        self.reset_at = reset_at;
        self
    }
}

/// One attempt at recovering an HTTP status from an opaque error.
pub type StatusProbe = fn(&(dyn std::error::Error + 'static)) -> Option<u16>;

/// The ordered fallback chain. First match wins.
pub const STATUS_PROBES: &[StatusProbe] = &[direct_status, source_chain_status, message_status];

/// (a) The error itself is a typed status error.
fn direct_status(err: &(dyn std::error::Error + 'static)) -> Option<u16> {
    err.downcast_ref::<HttpStatusError>().map(|e| e.status)
}

/// (b) A typed status error somewhere in the cause chain.
fn source_chain_status(err: &(dyn std::error::Error + 'static)) -> Option<u16> {
    let mut current = err.source();
    while let Some(cause) = current {
        if let Some(status) = cause.downcast_ref::<HttpStatusError>() {
            return Some(status.status);
        }
        current = cause.source();
    }
    None
}

/// (c) Last resort: message substrings.
fn message_status(err: &(dyn std::error::Error + 'static)) -> Option<u16> {
    status_from_message(&err.to_string())
}

/// Substring heuristics for SDKs that only expose failures as text.
#[must_use]
pub fn status_from_message(message: &str) -> Option<u16> {
    let lower = message.to_lowercase();
    if lower.contains("401") || lower.contains("unauthorized") {
        Some(401)
    } else if lower.contains("403") || lower.contains("forbidden") {
        Some(403)
    } else if lower.contains("404") || lower.contains("not found") {
        Some(404)
    } else if lower.contains("429") || lower.contains("rate limit") {
        Some(429)
    } else {
        None
    }
}

/// Run the probe chain over an opaque error.
#[must_use]
pub fn probe_status(err: &(dyn std::error::Error + 'static)) -> Option<u16> {
    STATUS_PROBES.iter().find_map(|probe| probe(err))
}

/// Walk the cause chain for a rate-limit reset timestamp.
#[must_use]
pub fn probe_reset_at(err: &(dyn std::error::Error + 'static)) -> Option<DateTime<Utc>> {
    if let Some(status) = err.downcast_ref::<HttpStatusError>() {
        return status.reset_at;
    }
    let mut current = err.source();
    while let Some(cause) = current {
        if let Some(status) = cause.downcast_ref::<HttpStatusError>() {
            return status.reset_at;
        }
        current = cause.source();
    }
    None
}

/// Uniform status-to-kind mapping shared by all platforms.
///
/// 401/403 are auth failures, 404 is not-found for `resource`, 429 is a rate
/// limit (with `reset_at` when known), 5xx is a server-side network error,
/// and any other 4xx is a client-side network error.
#[must_use]
pub fn from_status(
    status: u16,
    resource: &str,
    message: String,
    reset_at: Option<DateTime<Utc>>,
    cause: Option<BoxError>,
) -> ProviderError {
    match status {
        401 | 403 => ProviderError::auth(message, cause),
        404 => ProviderError::not_found(resource, cause),
        429 => ProviderError::rate_limited(reset_at, cause),
        500..=599 => ProviderError::network(format!("server error ({status}): {message}"), cause),
        _ => ProviderError::network(format!("client error ({status}): {message}"), cause),
    }
}

/// Map an opaque transport failure to a domain error via the probe chain.
///
/// Errors with no recoverable status default to `Network`, wrapping the
/// original for diagnostics.
#[must_use]
pub fn map_opaque_error(resource: &str, err: BoxError) -> ProviderError {
    let message = err.to_string();
    let status = probe_status(err.as_ref());
    let reset_at = probe_reset_at(err.as_ref());
    match status {
        Some(status) => from_status(status, resource, message, reset_at, Some(err)),
        None => ProviderError::network(message, Some(err)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // An error whose only signal is a nested HttpStatusError cause.
    #[derive(Debug, Error)]
    #[error("request failed")]
    struct Wrapped {
        #[source]
        source: HttpStatusError,
    }

    // An error whose only signal is its message text.
    #[derive(Debug, Error)]
    #[error("{0}")]
    struct MessageOnly(String);

    #[test]
    fn direct_status_wins_over_message_text() {
        // The message says 404 but the typed status says 503.
        let err = HttpStatusError::new(503, "Not Found");
        assert_eq!(probe_status(&err), Some(503));
    }

    #[test]
    fn source_chain_status_wins_over_message_text() {
        let err = Wrapped {
            source: HttpStatusError::new(502, "rate limit exceeded"),
        };
        assert_eq!(probe_status(&err), Some(502));
    }

    #[test]
    fn message_heuristics_are_the_last_resort() {
        assert_eq!(
            probe_status(&MessageOnly("Unauthorized".to_string())),
            Some(401)
        );
        assert_eq!(
            probe_status(&MessageOnly("resource Not Found".to_string())),
            Some(404)
        );
        assert_eq!(
            probe_status(&MessageOnly("API rate limit exceeded".to_string())),
            Some(429)
        );
        assert_eq!(
            probe_status(&MessageOnly("connection reset by peer".to_string())),
            None
        );
    }

    #[test]
    fn status_from_message_table() {
        assert_eq!(status_from_message("got 401 back"), Some(401));
        assert_eq!(status_from_message("Forbidden"), Some(403));
        assert_eq!(status_from_message("HTTP 404"), Some(404));
        assert_eq!(status_from_message("Rate Limit hit"), Some(429));
        assert_eq!(status_from_message("timed out"), None);
    }

    #[test]
    fn from_status_maps_uniformly() {
        assert!(matches!(
            from_status(401, "r", "m".into(), None, None),
            ProviderError::Auth { .. }
        ));
        assert!(matches!(
            from_status(403, "r", "m".into(), None, None),
            ProviderError::Auth { .. }
        ));
        assert!(matches!(
            from_status(404, "r", "m".into(), None, None),
            ProviderError::NotFound { .. }
        ));
        assert!(matches!(
            from_status(429, "r", "m".into(), None, None),
            ProviderError::RateLimited { .. }
        ));
        assert!(matches!(
            from_status(500, "r", "m".into(), None, None),
            ProviderError::Network { .. }
        ));
        assert!(matches!(
            from_status(418, "r", "m".into(), None, None),
            ProviderError::Network { .. }
        ));
    }

    #[test]
    fn from_status_keeps_reset_timestamp() {
        let reset = Utc::now();
        match from_status(429, "r", "m".into(), Some(reset), None) {
            ProviderError::RateLimited { reset_at, .. } => assert_eq!(reset_at, Some(reset)),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn map_opaque_error_defaults_to_network() {
        let err = map_opaque_error(
            "repository a/b",
            Box::new(MessageOnly("connection reset".to_string())),
        );
        match err {
            ProviderError::Network { message, cause } => {
                assert_eq!(message, "connection reset");
                assert!(cause.is_some());
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn map_opaque_error_recovers_status_from_chain() {
        let err = map_opaque_error(
            "repository a/b",
            Box::new(Wrapped {
                source: HttpStatusError::new(404, "missing"),
            }),
        );
        match err {
            ProviderError::NotFound { resource, cause } => {
                assert_eq!(resource, "repository a/b");
                assert!(cause.is_some());
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn probe_reset_at_walks_the_chain() {
        let reset = Utc::now();
        let err = Wrapped {
            source: HttpStatusError::new(429, "slow down").with_reset_at(Some(reset)),
        };
        assert_eq!(probe_reset_at(&err), Some(reset));
    }
}

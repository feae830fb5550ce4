//! Bitbucket error types and mapping into the unified taxonomy.

use chrono::Utc;
use thiserror::Error;

use crate::provider::errors::{self, HttpStatusError, ProviderError};
use crate::transport::{HttpResponse, TransportError};

/// Errors from Bitbucket API operations, Cloud or Server.
#[derive(Debug, Error)]
pub enum BitbucketError {
    #[error("Bitbucket API error: {0}")]
    Api(#[from] HttpStatusError),

    #[error("Bitbucket request failed: {0}")]
    Transport(#[from] TransportError),

    #[error("failed to decode Bitbucket response: {0}")]
    Decode(#[from] serde_json::Error),
}

impl BitbucketError {
    pub(crate) fn status(&self) -> Option<u16> {
        errors::probe_status(self)
    }

    pub(crate) fn into_provider(self, resource: &str) -> ProviderError {
        errors::map_opaque_error(resource, Box::new(self))
    }
}

/// Typed status error from a failed response. Bitbucket only communicates
/// rate-limit recovery through `Retry-After`.
pub(crate) fn status_error(resp: &HttpResponse) -> HttpStatusError {
    let mut err = HttpStatusError::new(resp.status, resp.body_text());
    if resp.status == 429 {
        let reset = resp
            .header("retry-after")
            .and_then(|v| v.trim().parse::<i64>().ok())
            .map(|secs| Utc::now() + chrono::Duration::seconds(secs));
        err = err.with_reset_at(reset);
    }
    err
}

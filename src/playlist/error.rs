//! Error type for playlist extraction.

use thiserror::Error;

use crate::extract::ShapeError;
use crate::transport::TransportError;

/// Fatal failure of one playlist extraction run; no partial record survives it.
#[derive(Debug, Error)]
pub enum PlaylistError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Shape(#[from] ShapeError),

    /// A continuation payload lacks one of its two markup fields.
    #[error(
        "continuation payload from {url} has no string field '{key}'\n  Suggestion: The continuation format may have changed"
    )]
    MissingPayloadKey {
        /// Continuation URL.
        url: String,
        /// Missing field name.
        key: &'static str,
    },
}

impl PlaylistError {
    #[must_use]
    pub fn missing_payload_key(url: impl Into<String>, key: &'static str) -> Self {
        Self::MissingPayloadKey {
            url: url.into(),
            key,
        }
    }

    /// Whether the failure comes from the document layout rather than the network.
    #[must_use]
    pub fn is_shape_error(&self) -> bool {
        matches!(self, Self::Shape(_) | Self::MissingPayloadKey { .. })
    }
}

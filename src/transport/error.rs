//! Error types for the transport layer.

use thiserror::Error;

/// Errors raised while issuing a request or reading its body.
///
/// Every variant is fatal for the extraction run that hit it.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The HTTP client could not be constructed.
    #[error("failed to build HTTP client: {detail}")]
    ClientBuild {
        /// Builder failure description.
        detail: String,
    },

    /// Network-level error (DNS resolution, connection refused, TLS errors, etc.)
    #[error("network error fetching {url}: {source}")]
    Network {
        /// The URL being fetched.
        url: String,
        /// The underlying network error.
        #[source]
        source: reqwest::Error,
    },

    /// Connect or read timed out.
    #[error("timeout fetching {url}\n  Suggestion: Raise --connect-timeout/--read-timeout or retry later")]
    Timeout {
        /// The URL that timed out.
        url: String,
    },

    /// Any status other than 200.
    #[error("HTTP {status} fetching {url}\n  Suggestion: Check that the id exists and is public")]
    HttpStatus {
        /// The URL that returned the status.
        url: String,
        /// The HTTP status code.
        status: u16,
    },

    /// The response media type differs from the one requested.
    #[error(
        "unexpected content type from {url}: expected {expected}, got {actual}\n  Suggestion: The site may be serving a consent or error page; retry later"
    )]
    ContentType {
        /// The URL being fetched.
        url: String,
        /// Required media type.
        expected: &'static str,
        /// Media type actually declared (or `(none)`).
        actual: String,
    },

    /// The declared charset is not a known encoding label.
    #[error("unrecognized charset '{label}' from {url}")]
    UnrecognizedEncoding {
        /// The URL being fetched.
        url: String,
        /// Charset label as declared.
        label: String,
    },

    /// A request URL could not be built.
    #[error("invalid URL: {url}")]
    InvalidUrl {
        /// The offending URL or reference.
        url: String,
    },

    /// The body could not be decoded into the expected payload.
    #[error("malformed payload from {url}: {detail}")]
    Payload {
        /// The URL being fetched.
        url: String,
        /// Decoder message.
        detail: String,
    },
}

impl TransportError {
    /// Classifies a reqwest error as timeout or network failure.
    #[must_use]
    pub fn from_reqwest(url: impl Into<String>, source: reqwest::Error) -> Self {
        let url = url.into();
        if source.is_timeout() {
            Self::Timeout { url }
        } else {
            Self::Network { url, source }
        }
    }

    #[must_use]
    pub fn http_status(url: impl Into<String>, status: u16) -> Self {
        Self::HttpStatus {
            url: url.into(),
            status,
        }
    }

    #[must_use]
    pub fn content_type(url: impl Into<String>, expected: &'static str, actual: Option<&str>) -> Self {
        Self::ContentType {
            url: url.into(),
            expected,
            actual: actual.unwrap_or("(none)").to_string(),
        }
    }

    #[must_use]
    pub fn unrecognized_encoding(url: impl Into<String>, label: impl Into<String>) -> Self {
        Self::UnrecognizedEncoding {
            url: url.into(),
            label: label.into(),
        }
    }

    #[must_use]
    pub fn invalid_url(url: impl Into<String>) -> Self {
        Self::InvalidUrl { url: url.into() }
    }

    #[must_use]
    pub fn payload(url: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::Payload {
            url: url.into(),
            detail: detail.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_status_message() {
        let error = TransportError::http_status("https://example.com/playlist", 404);
        let message = error.to_string();
        assert!(message.starts_with("HTTP 404 fetching https://example.com/playlist"));
        assert!(message.contains("Suggestion:"));
    }

    #[test]
    fn test_content_type_without_header() {
        let error = TransportError::content_type("u", "text/html", None);
        assert!(error.to_string().contains("expected text/html, got (none)"));
    }
}

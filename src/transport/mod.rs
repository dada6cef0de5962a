//! Request/response plumbing behind an injectable trait.
//!
//! The pipelines only see [`Transport`]; [`HttpTransport`] is the production
//! implementation and tests substitute scripted ones.

mod error;
mod http_client;

use async_trait::async_trait;
use serde_json::Value;
use url::Url;

pub use error::TransportError;
pub use http_client::{HttpTransport, MediaType, parse_media_type};

/// Media type required for the initial playlist page.
pub const MARKUP_MEDIA_TYPE: &str = "text/html";
/// Media type required for continuation payloads.
pub const JSON_MEDIA_TYPE: &str = "application/json";
/// Media type required for the video info body.
pub const FORM_MEDIA_TYPE: &str = "application/x-www-form-urlencoded";

/// Decoded markup body, read incrementally.
#[async_trait]
pub trait MarkupStream: Send {
    /// Next piece of decoded text; `None` once the body is exhausted.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError`] when reading the body fails.
    async fn next_chunk(&mut self) -> Result<Option<String>, TransportError>;
}

/// GET requests with status, media type and charset enforcement.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Requests `text/html` and returns the body as a decoded chunk stream.
    ///
    /// # Errors
    ///
    /// Fails on non-200 status, another media type, or an unknown charset.
    async fn open_markup(&self, url: &Url) -> Result<Box<dyn MarkupStream>, TransportError>;

    /// Requests `application/json` and returns the parsed document.
    ///
    /// # Errors
    ///
    /// Fails on non-200 status, another media type, or invalid JSON.
    async fn get_json(&self, url: &Url) -> Result<Value, TransportError>;

    /// Requests `application/x-www-form-urlencoded` and returns the raw body.
    ///
    /// # Errors
    ///
    /// Fails on non-200 status or another media type.
    async fn get_form(&self, url: &Url) -> Result<String, TransportError>;
}

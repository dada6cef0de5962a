//! Single-video metadata: one request, one embedded JSON document.

use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info};
use url::Url;

use crate::config::FetchOptions;
use crate::transport::{HttpTransport, Transport, TransportError};
use crate::util::{Seg, int_or, list_or_empty, lookup, lookup_keys, str_or, string_list};

/// Form field carrying the player JSON document.
pub const PLAYER_RESPONSE_FIELD: &str = "player_response";

/// Errors from a video metadata fetch.
#[derive(Debug, Error)]
pub enum VideoError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The form body has no `player_response` field.
    #[error(
        "video info for {id} has no 'player_response' field\n  Suggestion: The video may be private, removed or region-locked"
    )]
    MissingPlayerResponse {
        /// Video id.
        id: String,
    },

    /// `player_response` is not valid JSON.
    #[error("video info for {id} carries malformed player JSON: {source}")]
    MalformedPlayerResponse {
        /// Video id.
        id: String,
        /// JSON decoder error.
        #[source]
        source: serde_json::Error,
    },
}

/// Channel that published a video.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct VideoUploader {
    pub name: Option<String>,
    #[serde(rename = "channelId")]
    pub channel_id: Option<String>,
    /// Never derived; kept for shape parity with playlist uploaders.
    pub url: Option<String>,
}

/// Metadata of one video.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VideoRecord {
    pub id: String,
    pub title: Option<String>,
    #[serde(rename = "lengthSeconds")]
    pub length_seconds: Option<i64>,
    pub keywords: Vec<String>,
    #[serde(rename = "shortDescription")]
    pub short_description: Option<String>,
    /// Thumbnail descriptors exactly as served.
    pub thumbnails: Vec<Value>,
    pub views: Option<i64>,
    pub uploader: VideoUploader,
    /// Caption track descriptors exactly as served.
    #[serde(rename = "captionTracks")]
    pub caption_tracks: Vec<Value>,
}

impl VideoRecord {
    /// Copies fields out of a decoded player document.
    #[must_use]
    pub fn from_player_response(id: &str, player: &Value) -> Self {
        let details = player.get("videoDetails").unwrap_or(&Value::Null);
        Self {
            id: id.to_string(),
            title: str_or(details.get("title")),
            length_seconds: int_or(details.get("lengthSeconds"), 10),
            keywords: string_list(details.get("keywords")),
            short_description: str_or(details.get("shortDescription")),
            thumbnails: list_or_empty(lookup(
                details,
                &[Seg::Key("thumbnail"), Seg::Key("thumbnails")],
            )),
            views: int_or(details.get("viewCount"), 10),
            uploader: VideoUploader {
                name: str_or(details.get("author")),
                channel_id: str_or(details.get("channelId")),
                url: None,
            },
            caption_tracks: list_or_empty(lookup_keys(
                player,
                &["captions", "playerCaptionsTracklistRenderer", "captionTracks"],
            )),
        }
    }
}

/// URL of the video info endpoint.
///
/// # Errors
///
/// Returns [`TransportError::InvalidUrl`] if the URL cannot be built.
pub fn video_info_url(origin: &Url, id: &str) -> Result<Url, TransportError> {
    let path = format!("/get_video_info?video_id={}", urlencoding::encode(id));
    origin
        .join(&path)
        .map_err(|_| TransportError::invalid_url(path))
}

/// Runs video metadata fetches against one transport.
#[derive(Clone)]
pub struct VideoFetcher {
    transport: Arc<dyn Transport>,
    options: FetchOptions,
}

impl std::fmt::Debug for VideoFetcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VideoFetcher")
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl VideoFetcher {
    #[must_use]
    pub fn new(transport: Arc<dyn Transport>, options: FetchOptions) -> Self {
        Self { transport, options }
    }

    /// Builds a fetcher over a fresh [`HttpTransport`].
    ///
    /// # Errors
    ///
    /// Returns [`VideoError::Transport`] when the HTTP client cannot be built.
    pub fn over_http(options: FetchOptions) -> Result<Self, VideoError> {
        let transport = HttpTransport::new(&options)?;
        Ok(Self::new(Arc::new(transport), options))
    }

    /// Fetches metadata for video `id`.
    ///
    /// # Errors
    ///
    /// Fails on transport errors, a missing `player_response` field, or
    /// malformed player JSON.
    #[tracing::instrument(skip(self, id), fields(video_id = %id))]
    pub async fn fetch(&self, id: &str) -> Result<VideoRecord, VideoError> {
        let url = video_info_url(&self.options.origin, id)?;
        let body = self.transport.get_form(&url).await?;
        debug!(bytes = body.len(), "Video info received");

        let player = player_response(&body).ok_or_else(|| VideoError::MissingPlayerResponse {
            id: id.to_string(),
        })?;
        let player: Value = serde_json::from_str(&player).map_err(|source| {
            VideoError::MalformedPlayerResponse {
                id: id.to_string(),
                source,
            }
        })?;

        let record = VideoRecord::from_player_response(id, &player);
        info!(title = ?record.title, "Video extracted");
        Ok(record)
    }
}

/// First `player_response` value of a form-encoded body.
fn player_response(body: &str) -> Option<String> {
    url::form_urlencoded::parse(body.as_bytes())
        .find(|(key, _)| key == PLAYER_RESPONSE_FIELD)
        .map(|(_, value)| value.into_owned())
}

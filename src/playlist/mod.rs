//! Playlist extraction: paginated markup in, one [`PlaylistRecord`] out.

mod controller;
mod error;
mod record;

pub use controller::{CONTENT_HTML_KEY, LOAD_MORE_WIDGET_KEY, PlaylistFetcher, playlist_url};
pub use error::PlaylistError;
pub(crate) use record::PlaylistAssembler;
pub use record::{
    PaginationSummary, PlaylistHeader, PlaylistItem, PlaylistRecord, Termination, UploaderRef,
};

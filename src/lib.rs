//! tubemeta core library
//!
//! Extracts playlist and video metadata from public video pages. The playlist
//! pipeline streams the first page through an incremental markup parser,
//! trims everything it has already looked at, reads fields positionally and
//! then follows continuation references until none is left.
//!
//! # Architecture
//!
//! - [`util`] - never-failing JSON lookups and numeric coercion
//! - [`transport`] - HTTP requests behind the [`Transport`] trait
//! - [`markup`] - chunk-fed pull parser over an arena tree
//! - [`extract`] - locator table and field readers
//! - [`playlist`] - pagination state machine and record assembly
//! - [`video`] - single-video metadata
//! - [`batch`] - ordered, isolated batch runs

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod batch;
pub mod config;
pub mod extract;
pub mod markup;
pub mod playlist;
pub mod transport;
mod user_agent;
pub mod util;
pub mod video;

// Re-export commonly used types
pub use batch::{BatchStats, MAX_CONCURRENCY, run_batch};
pub use config::FetchOptions;
pub use extract::ShapeError;
pub use playlist::{
    PaginationSummary, PlaylistError, PlaylistFetcher, PlaylistItem, PlaylistRecord, Termination,
    UploaderRef,
};
pub use transport::{HttpTransport, MarkupStream, Transport, TransportError};
pub use video::{VideoError, VideoFetcher, VideoRecord};

//! Pagination controller.
//!
//! One run walks `Start -> CheckContinuation -> FetchContinuation* -> Done`.
//! Only the presence of a continuation reference keeps it going; there is no
//! round limit.

use std::sync::{Arc, LazyLock};

use regex::Regex;
use serde_json::Value;
use tracing::{debug, info, warn};
use url::Url;

use crate::config::FetchOptions;
use crate::extract::contract::{
    CONTENT_ROLE, HEADER, ITEMS_CONTAINER, LOAD_MORE, LOAD_MORE_HREF_ATTR, ROW_TAG,
};
use crate::extract::{ShapeError, extract_header, extract_item, is_content_node};
use crate::markup::{Event, NodeId, PullParser, Tree, decode_entities};
use crate::transport::{HttpTransport, MarkupStream, Transport, TransportError};
use crate::util::compile_static_regex;

use super::{PaginationSummary, PlaylistAssembler, PlaylistError, PlaylistRecord, Termination};

/// Continuation payload field holding the next batch of rows.
pub const CONTENT_HTML_KEY: &str = "content_html";
/// Continuation payload field holding the next "load more" widget.
pub const LOAD_MORE_WIDGET_KEY: &str = "load_more_widget_html";

static LOAD_MORE_HREF_RE: LazyLock<Regex> =
    LazyLock::new(|| compile_static_regex(r#"data-uix-load-more-href="(.+?)""#));

/// URL of the initial playlist page.
///
/// # Errors
///
/// Returns [`TransportError::InvalidUrl`] if the URL cannot be built.
pub fn playlist_url(origin: &Url, id: &str) -> Result<Url, TransportError> {
    let path = format!("/playlist?list={}", urlencoding::encode(id));
    origin
        .join(&path)
        .map_err(|_| TransportError::invalid_url(path))
}

/// State of the "load more" control on the initial page.
#[derive(Debug, Clone, PartialEq, Eq)]
enum LoadMore {
    Absent,
    WithoutReference,
    Reference(String),
}

enum State {
    Start,
    CheckContinuation {
        assembler: PlaylistAssembler,
        control: LoadMore,
    },
    FetchContinuation {
        assembler: PlaylistAssembler,
        reference: String,
    },
    Done {
        assembler: PlaylistAssembler,
        termination: Termination,
    },
}

/// Rows and next reference from one continuation payload.
struct Batch {
    rows: usize,
    next: Option<String>,
    peak_nodes: usize,
}

/// Runs playlist extractions against one transport.
#[derive(Clone)]
pub struct PlaylistFetcher {
    transport: Arc<dyn Transport>,
    options: FetchOptions,
}

impl std::fmt::Debug for PlaylistFetcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlaylistFetcher")
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl PlaylistFetcher {
    #[must_use]
    pub fn new(transport: Arc<dyn Transport>, options: FetchOptions) -> Self {
        Self { transport, options }
    }

    /// Builds a fetcher over a fresh [`HttpTransport`] (own cookie session).
    ///
    /// # Errors
    ///
    /// Returns [`PlaylistError::Transport`] when the HTTP client cannot be built.
    pub fn over_http(options: FetchOptions) -> Result<Self, PlaylistError> {
        let transport = HttpTransport::new(&options)?;
        Ok(Self::new(Arc::new(transport), options))
    }

    /// Extracts the complete playlist `id`.
    ///
    /// # Errors
    ///
    /// Any transport failure, layout mismatch or malformed continuation payload
    /// aborts the run; nothing partial is returned.
    #[tracing::instrument(skip(self, id), fields(playlist_id = %id))]
    pub async fn fetch(&self, id: &str) -> Result<PlaylistRecord, PlaylistError> {
        let mut summary = PaginationSummary::default();
        let mut state = State::Start;

        loop {
            state = match state {
                State::Start => {
                    let (assembler, control, peak) = self.read_initial_page(id).await?;
                    summary.initial_peak_nodes = peak;
                    debug!(items = assembler.item_count(), "Initial page extracted");
                    State::CheckContinuation { assembler, control }
                }
                State::CheckContinuation { assembler, control } => match control {
                    LoadMore::Absent => State::Done {
                        assembler,
                        termination: Termination::NoLoadMoreControl,
                    },
                    LoadMore::WithoutReference => State::Done {
                        assembler,
                        termination: Termination::ControlWithoutReference,
                    },
                    LoadMore::Reference(reference) => State::FetchContinuation {
                        assembler,
                        reference,
                    },
                },
                State::FetchContinuation {
                    mut assembler,
                    reference,
                } => {
                    summary.continuation_requests += 1;
                    let batch = self.read_continuation(&reference, &mut assembler).await?;
                    summary.continuation_peak_nodes =
                        summary.continuation_peak_nodes.max(batch.peak_nodes);
                    debug!(
                        round = summary.continuation_requests,
                        rows = batch.rows,
                        "Continuation batch extracted"
                    );
                    match batch.next {
                        Some(reference) => State::FetchContinuation {
                            assembler,
                            reference,
                        },
                        None if batch.rows == 0 => State::Done {
                            assembler,
                            termination: Termination::WidgetExhausted,
                        },
                        None => State::Done {
                            assembler,
                            termination: Termination::WidgetWithoutReference {
                                last_batch: batch.rows,
                            },
                        },
                    }
                }
                State::Done {
                    assembler,
                    termination,
                } => {
                    summary.termination = termination;
                    if termination.possibly_truncated() {
                        warn!(
                            ?termination,
                            items = assembler.item_count(),
                            "Continuation widget had no reference after a non-empty batch; playlist may be truncated"
                        );
                    }
                    info!(
                        items = assembler.item_count(),
                        continuation_requests = summary.continuation_requests,
                        "Playlist extracted"
                    );
                    return Ok(assembler.finish(summary));
                }
            };
        }
    }

    /// Streams the initial page until the content region closes, then extracts it.
    async fn read_initial_page(
        &self,
        id: &str,
    ) -> Result<(PlaylistAssembler, LoadMore, usize), PlaylistError> {
        let url = playlist_url(&self.options.origin, id)?;
        let mut body = self.transport.open_markup(&url).await?;
        let mut parser = PullParser::new();
        let mut cursor = DiscardCursor::default();

        let content = loop {
            if let Some(content) = cursor.advance(&mut parser) {
                break content;
            }
            if !feed_next(body.as_mut(), &mut parser).await? {
                parser.finish();
                break cursor
                    .advance(&mut parser)
                    .ok_or(ShapeError::NotFound { role: CONTENT_ROLE })?;
            }
        };

        let tree = parser.tree();
        let (assembler, control) = self.extract_content(tree, content, id)?;
        Ok((assembler, control, tree.peak_live_count()))
    }

    fn extract_content(
        &self,
        tree: &Tree,
        content: NodeId,
        id: &str,
    ) -> Result<(PlaylistAssembler, LoadMore), PlaylistError> {
        let origin = &self.options.origin;
        let header_node = HEADER.locate(tree, content)?;
        let header = extract_header(tree, header_node, origin)?;
        let container = ITEMS_CONTAINER.locate(tree, content)?;

        let mut assembler = PlaylistAssembler::new(id, header);
        for &row in tree.children(container) {
            if tree.tag(row) == Some(ROW_TAG) {
                assembler.push(extract_item(tree, row, origin)?);
            }
        }

        let control = match LOAD_MORE.locate_optional(tree, content)? {
            None => LoadMore::Absent,
            Some(button) => match tree.attr(button, LOAD_MORE_HREF_ATTR) {
                Some(reference) if !reference.is_empty() => {
                    LoadMore::Reference(reference.to_string())
                }
                _ => LoadMore::WithoutReference,
            },
        };
        Ok((assembler, control))
    }

    /// Fetches one continuation payload and appends its rows.
    async fn read_continuation(
        &self,
        reference: &str,
        assembler: &mut PlaylistAssembler,
    ) -> Result<Batch, PlaylistError> {
        let url = self
            .options
            .origin
            .join(reference)
            .map_err(|_| TransportError::invalid_url(reference))?;
        let payload = self.transport.get_json(&url).await?;
        let content_html = payload_field(&payload, CONTENT_HTML_KEY, &url)?;
        let widget_html = payload_field(&payload, LOAD_MORE_WIDGET_KEY, &url)?;

        let mut parser = PullParser::new();
        let mut rows = 0;
        for piece in char_chunks(content_html, self.options.chunk_size) {
            parser.feed(piece);
            rows += self.take_rows(&mut parser, assembler)?;
        }
        parser.finish();
        rows += self.take_rows(&mut parser, assembler)?;

        Ok(Batch {
            rows,
            next: continuation_reference(widget_html),
            peak_nodes: parser.tree().peak_live_count(),
        })
    }

    /// Extracts and releases every row closed since the last call.
    fn take_rows(
        &self,
        parser: &mut PullParser,
        assembler: &mut PlaylistAssembler,
    ) -> Result<usize, PlaylistError> {
        let mut rows = 0;
        while let Some(event) = parser.next_event() {
            let Event::Close(node) = event else {
                continue;
            };
            if parser.tree().tag(node) != Some(ROW_TAG) {
                continue;
            }
            assembler.push(extract_item(parser.tree(), node, &self.options.origin)?);
            rows += 1;
            let tree = parser.tree_mut();
            tree.discard_processed(node);
            tree.release(node);
        }
        Ok(rows)
    }
}

/// Tracks the discard phase of the initial page.
///
/// Until the content region opens, every closed node is trimmed; once it
/// opens, nodes are kept until it closes.
#[derive(Debug, Default)]
struct DiscardCursor {
    content: Option<NodeId>,
}

impl DiscardCursor {
    /// Consumes pending events; returns the content node once it has closed.
    fn advance(&mut self, parser: &mut PullParser) -> Option<NodeId> {
        while let Some(event) = parser.next_event() {
            match (event, self.content) {
                (Event::Open(node), None) if is_content_node(parser.tree(), node) => {
                    self.content = Some(node);
                }
                (Event::Close(node), None) => parser.tree_mut().discard_processed(node),
                (Event::Close(node), Some(content)) if node == content => return Some(content),
                _ => {}
            }
        }
        None
    }
}

/// Feeds the next body chunk; `false` once the body is exhausted.
async fn feed_next(
    body: &mut dyn MarkupStream,
    parser: &mut PullParser,
) -> Result<bool, TransportError> {
    match body.next_chunk().await? {
        Some(chunk) => {
            parser.feed(&chunk);
            Ok(true)
        }
        None => Ok(false),
    }
}

fn payload_field<'v>(payload: &'v Value, key: &'static str, url: &Url) -> Result<&'v str, PlaylistError> {
    payload
        .get(key)
        .and_then(Value::as_str)
        .ok_or_else(|| PlaylistError::missing_payload_key(url.as_str(), key))
}

/// First continuation reference in a "load more" widget, entity-decoded.
fn continuation_reference(widget_html: &str) -> Option<String> {
    LOAD_MORE_HREF_RE
        .captures(widget_html)
        .and_then(|captures| captures.get(1))
        .map(|reference| decode_entities(reference.as_str()).into_owned())
}

/// Splits `text` into pieces of about `size` bytes on char boundaries.
fn char_chunks(text: &str, size: usize) -> impl Iterator<Item = &str> {
    let size = size.max(1);
    let mut rest = text;
    std::iter::from_fn(move || {
        if rest.is_empty() {
            return None;
        }
        let mut end = size.min(rest.len());
        while !rest.is_char_boundary(end) {
            end += 1;
        }
        let (head, tail) = rest.split_at(end);
        rest = tail;
        Some(head)
    })
}

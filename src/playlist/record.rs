//! Playlist output records and the assembler that builds them.

use serde::Serialize;

/// Display name and absolute channel URL of an uploader.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UploaderRef {
    pub name: Option<String>,
    pub url: Option<String>,
}

/// One entry of a playlist, in page-arrival order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PlaylistItem {
    pub id: Option<String>,
    pub title: Option<String>,
    pub thumbnail: Option<String>,
    pub uploader: UploaderRef,
    #[serde(rename = "lengthSeconds")]
    pub length_seconds: Option<u64>,
}

/// Fields read from the playlist header.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlaylistHeader {
    pub title: Option<String>,
    pub description: Option<String>,
    pub thumbnail: Option<String>,
    /// Leniently parsed integer from the header statistics (video count).
    pub length: Option<u64>,
    pub views: Option<u64>,
    pub uploader: UploaderRef,
}

/// Why pagination stopped.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Termination {
    /// The first page had no "load more" control.
    #[default]
    NoLoadMoreControl,
    /// The first page's control carried no continuation reference.
    ControlWithoutReference,
    /// The last continuation returned no rows and no further reference.
    WidgetExhausted,
    /// The last continuation returned rows but its widget had no reference.
    ///
    /// More items may exist; the page gives no way to tell.
    WidgetWithoutReference {
        /// Rows in the final batch.
        last_batch: usize,
    },
}

impl Termination {
    /// Whether the playlist may have been cut short.
    #[must_use]
    pub fn possibly_truncated(self) -> bool {
        matches!(self, Self::WidgetWithoutReference { .. })
    }
}

/// How many continuation rounds ran and how they ended.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PaginationSummary {
    pub continuation_requests: usize,
    pub termination: Termination,
    /// Most nodes held at once while parsing the initial page.
    pub initial_peak_nodes: usize,
    /// Most nodes held at once while parsing any continuation batch.
    pub continuation_peak_nodes: usize,
}

/// Complete playlist metadata returned by one extraction run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlaylistRecord {
    pub id: String,
    pub title: Option<String>,
    pub description: Option<String>,
    pub thumbnail: Option<String>,
    pub length: Option<u64>,
    pub views: Option<u64>,
    pub uploader: UploaderRef,
    pub items: Vec<PlaylistItem>,
    #[serde(skip)]
    pub pagination: PaginationSummary,
}

/// Accumulates items for one run; consumed by [`PlaylistAssembler::finish`].
#[derive(Debug)]
pub(crate) struct PlaylistAssembler {
    id: String,
    header: PlaylistHeader,
    items: Vec<PlaylistItem>,
}

impl PlaylistAssembler {
    pub(crate) fn new(id: impl Into<String>, header: PlaylistHeader) -> Self {
        Self {
            id: id.into(),
            header,
            items: Vec::new(),
        }
    }

    pub(crate) fn push(&mut self, item: PlaylistItem) {
        self.items.push(item);
    }

    pub(crate) fn item_count(&self) -> usize {
        self.items.len()
    }

    pub(crate) fn finish(self, pagination: PaginationSummary) -> PlaylistRecord {
        let PlaylistHeader {
            title,
            description,
            thumbnail,
            length,
            views,
            uploader,
        } = self.header;
        PlaylistRecord {
            id: self.id,
            title,
            description,
            thumbnail,
            length,
            views,
            uploader,
            items: self.items,
            pagination,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_record_serializes_in_output_shape() {
        let mut assembler = PlaylistAssembler::new(
            "PL1",
            PlaylistHeader {
                title: Some("Mix".to_string()),
                views: Some(10),
                ..PlaylistHeader::default()
            },
        );
        assembler.push(PlaylistItem {
            id: Some("v1".to_string()),
            length_seconds: Some(61),
            ..PlaylistItem::default()
        });
        let record = assembler.finish(PaginationSummary::default());

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["id"], "PL1");
        assert_eq!(json["title"], "Mix");
        assert_eq!(json["views"], 10);
        assert!(json["description"].is_null());
        assert!(json["uploader"]["url"].is_null());
        assert_eq!(json["items"][0]["lengthSeconds"], 61);
        assert!(json.get("pagination").is_none());
    }

    #[test]
    fn test_assembler_preserves_push_order() {
        let mut assembler = PlaylistAssembler::new("PL", PlaylistHeader::default());
        for id in ["c", "a", "b", "a"] {
            assembler.push(PlaylistItem {
                id: Some(id.to_string()),
                ..PlaylistItem::default()
            });
        }
        assert_eq!(assembler.item_count(), 4);
        let ids: Vec<_> = assembler
            .finish(PaginationSummary::default())
            .items
            .into_iter()
            .map(|item| item.id.unwrap())
            .collect();
        assert_eq!(ids, vec!["c", "a", "b", "a"]);
    }

    #[test]
    fn test_only_widget_without_reference_is_possibly_truncated() {
        assert!(Termination::WidgetWithoutReference { last_batch: 3 }.possibly_truncated());
        assert!(!Termination::WidgetExhausted.possibly_truncated());
        assert!(!Termination::NoLoadMoreControl.possibly_truncated());
    }
}

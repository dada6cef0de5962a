//! Field readers for the playlist header and item rows.

use url::Url;

use crate::markup::{NodeId, Tree};
use crate::playlist::{PlaylistHeader, PlaylistItem, UploaderRef};
use crate::util::{parse_int_lenient, parse_timestamp};

use super::ShapeError;
use super::contract::{
    HEADER_DESCRIPTION, HEADER_LENGTH, HEADER_THUMBNAIL, HEADER_TITLE, HEADER_UPLOADER,
    HEADER_VIEWS, LINK_ATTR, ROW_ID_ATTR, ROW_LENGTH, ROW_THUMBNAIL, ROW_THUMBNAIL_ATTR,
    ROW_TITLE, ROW_UPLOADER, THUMBNAIL_SRC_ATTR,
};

/// Reads every header field from the `pl-header` node.
///
/// # Errors
///
/// Returns [`ShapeError`] when any field's node is missing or has the wrong tag.
pub fn extract_header(tree: &Tree, header: NodeId, origin: &Url) -> Result<PlaylistHeader, ShapeError> {
    let thumbnail = HEADER_THUMBNAIL.locate(tree, header)?;
    let title = HEADER_TITLE.locate(tree, header)?;
    let uploader = HEADER_UPLOADER.locate(tree, header)?;
    let length = HEADER_LENGTH.locate(tree, header)?;
    let views = HEADER_VIEWS.locate(tree, header)?;
    let description = HEADER_DESCRIPTION.locate(tree, header)?;

    Ok(PlaylistHeader {
        thumbnail: owned_attr(tree, thumbnail, THUMBNAIL_SRC_ATTR),
        title: trimmed_text(tree, title),
        uploader: uploader_ref(tree, uploader, origin),
        length: tree.text(length).and_then(|text| parse_int_lenient(text, 10)),
        views: tree.text(views).and_then(|text| parse_int_lenient(text, 10)),
        description: trimmed_text(tree, description),
    })
}

/// Reads one playlist row (`<tr data-video-id=...>`).
///
/// # Errors
///
/// Returns [`ShapeError`] when any field's node is missing or has the wrong tag.
pub fn extract_item(tree: &Tree, row: NodeId, origin: &Url) -> Result<PlaylistItem, ShapeError> {
    let thumbnail = ROW_THUMBNAIL.locate(tree, row)?;
    let title = ROW_TITLE.locate(tree, row)?;
    let uploader = ROW_UPLOADER.locate(tree, row)?;
    let length = ROW_LENGTH.locate(tree, row)?;

    Ok(PlaylistItem {
        id: owned_attr(tree, row, ROW_ID_ATTR),
        title: trimmed_text(tree, title),
        thumbnail: owned_attr(tree, thumbnail, ROW_THUMBNAIL_ATTR),
        uploader: uploader_ref(tree, uploader, origin),
        length_seconds: tree.text(length).and_then(parse_timestamp),
    })
}

/// Resolves a site-relative link against the site origin.
#[must_use]
pub fn absolutize(href: &str, origin: &Url) -> Option<String> {
    origin.join(href).ok().map(String::from)
}

fn uploader_ref(tree: &Tree, anchor: NodeId, origin: &Url) -> UploaderRef {
    UploaderRef {
        name: trimmed_text(tree, anchor),
        url: tree
            .attr(anchor, LINK_ATTR)
            .and_then(|href| absolutize(href, origin)),
    }
}

fn trimmed_text(tree: &Tree, node: NodeId) -> Option<String> {
    tree.text(node)
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .map(str::to_string)
}

fn owned_attr(tree: &Tree, node: NodeId, name: &str) -> Option<String> {
    tree.attr(node, name).map(str::to_string)
}

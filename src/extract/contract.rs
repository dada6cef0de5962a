//! Locator table: where each field lives in the known page layout.
//!
//! A layout change should only require editing the constants in this file.

use crate::markup::{NodeId, Tree};

use super::ShapeError;

/// What the node at the end of a locator path must look like.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expect {
    /// Element with this tag name.
    Tag(&'static str),
    /// Element carrying `attr="value"`.
    Marker {
        /// Attribute name.
        attr: &'static str,
        /// Required attribute value.
        value: &'static str,
    },
}

/// A role-named path of child indices from a base node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Locator {
    /// Human-readable role, used in errors and logs.
    pub role: &'static str,
    /// Child positions to follow, outermost first.
    pub path: &'static [usize],
    /// Check applied to the final node.
    pub expect: Expect,
}

impl Locator {
    /// Follows the path from `base` and checks the final node.
    ///
    /// # Errors
    ///
    /// Returns [`ShapeError`] when a step leaves the tree or the node fails its check.
    pub fn locate(&self, tree: &Tree, base: NodeId) -> Result<NodeId, ShapeError> {
        let node = self.walk(tree, base)?;
        self.check(tree, node)?;
        Ok(node)
    }

    /// Like [`Locator::locate`], but a path that leaves the tree yields `None`.
    ///
    /// A node that exists but fails its check is still an error.
    ///
    /// # Errors
    ///
    /// Returns [`ShapeError`] when the node exists with the wrong shape.
    pub fn locate_optional(&self, tree: &Tree, base: NodeId) -> Result<Option<NodeId>, ShapeError> {
        match self.walk(tree, base) {
            Ok(node) => self.check(tree, node).map(|()| Some(node)),
            Err(ShapeError::MissingChild { .. }) => Ok(None),
            Err(other) => Err(other),
        }
    }

    /// Checks that `node` satisfies this locator's expectation.
    ///
    /// # Errors
    ///
    /// Returns [`ShapeError`] describing the mismatch.
    pub fn check(&self, tree: &Tree, node: NodeId) -> Result<(), ShapeError> {
        match self.expect {
            Expect::Tag(expected) => {
                let found = tree.tag(node).unwrap_or_default();
                if found == expected {
                    Ok(())
                } else {
                    Err(ShapeError::UnexpectedTag {
                        role: self.role,
                        expected,
                        found: found.to_string(),
                    })
                }
            }
            Expect::Marker { attr, value } => {
                let found = tree.attr(node, attr);
                if found == Some(value) {
                    Ok(())
                } else {
                    Err(ShapeError::MissingMarker {
                        role: self.role,
                        attr,
                        value,
                        found: found.map(str::to_string),
                    })
                }
            }
        }
    }

    fn walk(&self, tree: &Tree, base: NodeId) -> Result<NodeId, ShapeError> {
        self.path
            .iter()
            .enumerate()
            .try_fold(base, |node, (step, &index)| {
                tree.child(node, index).ok_or(ShapeError::MissingChild {
                    role: self.role,
                    step,
                    index,
                })
            })
    }
}

/// Tag of the node enclosing header and items (`<div id="">`).
pub const CONTENT_TAG: &str = "div";
/// The content node's `id` is present and empty.
pub const CONTENT_ID: &str = "";
/// Role name used when the content node never appears.
pub const CONTENT_ROLE: &str = "playlist content";

/// Whether `node` is the content region that ends the discard phase.
#[must_use]
pub fn is_content_node(tree: &Tree, node: NodeId) -> bool {
    tree.tag(node) == Some(CONTENT_TAG) && tree.attr(node, "id") == Some(CONTENT_ID)
}

// Relative to the content node.

pub const HEADER: Locator = Locator {
    role: "playlist header",
    path: &[0],
    expect: Expect::Marker {
        attr: "id",
        value: "pl-header",
    },
};

pub const ITEMS_CONTAINER: Locator = Locator {
    role: "playlist items container",
    path: &[1, 0, 0, 0, 0],
    expect: Expect::Marker {
        attr: "id",
        value: "pl-load-more-destination",
    },
};

pub const LOAD_MORE: Locator = Locator {
    role: "load more control",
    path: &[1, 0, 0, 1],
    expect: Expect::Tag("button"),
};

// Relative to the header node.

pub const HEADER_THUMBNAIL: Locator = Locator {
    role: "playlist thumbnail",
    path: &[0, 0],
    expect: Expect::Tag("img"),
};

pub const HEADER_TITLE: Locator = Locator {
    role: "playlist title",
    path: &[1, 0],
    expect: Expect::Tag("h1"),
};

pub const HEADER_UPLOADER: Locator = Locator {
    role: "playlist uploader",
    path: &[1, 1, 0, 0],
    expect: Expect::Tag("a"),
};

pub const HEADER_LENGTH: Locator = Locator {
    role: "playlist length",
    path: &[1, 1, 1],
    expect: Expect::Tag("li"),
};

pub const HEADER_VIEWS: Locator = Locator {
    role: "playlist views",
    path: &[1, 1, 2],
    expect: Expect::Tag("li"),
};

pub const HEADER_DESCRIPTION: Locator = Locator {
    role: "playlist description",
    path: &[1, 2, 0],
    expect: Expect::Tag("span"),
};

// Relative to an item row.

/// Tag of an item row.
pub const ROW_TAG: &str = "tr";

pub const ROW_THUMBNAIL: Locator = Locator {
    role: "item thumbnail",
    path: &[2, 0, 0, 0, 0, 0, 0],
    expect: Expect::Tag("img"),
};

pub const ROW_TITLE: Locator = Locator {
    role: "item title",
    path: &[3, 0],
    expect: Expect::Tag("a"),
};

pub const ROW_UPLOADER: Locator = Locator {
    role: "item uploader",
    path: &[3, 1, 0],
    expect: Expect::Tag("a"),
};

pub const ROW_LENGTH: Locator = Locator {
    role: "item length",
    path: &[6, 0, 0, 0],
    expect: Expect::Tag("span"),
};

// Attribute names.

pub const THUMBNAIL_SRC_ATTR: &str = "src";
pub const ROW_ID_ATTR: &str = "data-video-id";
pub const ROW_THUMBNAIL_ATTR: &str = "data-thumb";
pub const LINK_ATTR: &str = "href";
pub const LOAD_MORE_HREF_ATTR: &str = "data-uix-load-more-href";

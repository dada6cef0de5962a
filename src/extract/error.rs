//! Error types for structural extraction.
//!
//! Every variant means the document no longer has the shape the locator table
//! describes. Extraction never falls back to a default in that case, since a
//! value read from the wrong node is worse than no value.

use thiserror::Error;

/// The document does not match the expected layout.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ShapeError {
    /// A path step pointed past the last child.
    #[error(
        "unexpected document shape: {role} has no child #{index} at path step {step}\n  Suggestion: The page layout may have changed; update the locator table"
    )]
    MissingChild {
        /// Role of the node being located.
        role: &'static str,
        /// Zero-based step in the locator path.
        step: usize,
        /// Child index that was requested.
        index: usize,
    },

    /// The located node has a different tag than expected.
    #[error(
        "unexpected document shape: {role} should be <{expected}> but found <{found}>\n  Suggestion: The page layout may have changed; update the locator table"
    )]
    UnexpectedTag {
        /// Role of the node being located.
        role: &'static str,
        /// Expected tag name.
        expected: &'static str,
        /// Tag name actually found.
        found: String,
    },

    /// The located node lacks its marker attribute value.
    #[error(
        "missing marker: {role} should carry {attr}=\"{value}\" but found {found:?}\n  Suggestion: The page layout may have changed; update the locator table"
    )]
    MissingMarker {
        /// Role of the node being located.
        role: &'static str,
        /// Marker attribute name.
        attr: &'static str,
        /// Expected marker value.
        value: &'static str,
        /// Actual attribute value, if any.
        found: Option<String>,
    },

    /// The region of interest never appeared in the document.
    #[error(
        "document ended before {role} was found\n  Suggestion: Check that the identifier is correct and the resource is public"
    )]
    NotFound {
        /// Role of the region that was searched for.
        role: &'static str,
    },
}

impl ShapeError {
    /// Role of the node the error refers to.
    #[must_use]
    pub fn role(&self) -> &'static str {
        match self {
            Self::MissingChild { role, .. }
            | Self::UnexpectedTag { role, .. }
            | Self::MissingMarker { role, .. }
            | Self::NotFound { role } => role,
        }
    }
}

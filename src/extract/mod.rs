//! Positional field extraction for one known page layout.
//!
//! The layout is described by the [`Locator`] constants in [`contract`]; the
//! readers in this module only decide how a located node becomes a value.

pub mod contract;
mod error;
mod fields;

pub use contract::{Expect, Locator, is_content_node};
pub use error::ShapeError;
pub use fields::{absolutize, extract_header, extract_item};

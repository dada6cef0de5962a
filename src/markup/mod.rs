//! Incremental markup parsing with bounded memory.
//!
//! - [`Tokenizer`] turns arbitrary text chunks into tags and text.
//! - [`PullParser`] builds an arena [`Tree`] from the tokens and queues
//!   [`Event::Open`] / [`Event::Close`] events.
//! - [`Tree`] exposes the release operations that keep memory bounded while a
//!   large document streams through.

mod parser;
mod tokenizer;
mod tree;

pub use parser::{DOCUMENT_TAG, Event, PullParser};
pub use tokenizer::{Token, Tokenizer, decode_entities};
pub use tree::{NodeId, Tree};

//! Safe-access and coercion helpers shared by the extraction pipelines.
//!
//! Everything in here is stateless: lookups return `None` (or a caller-given
//! default) instead of failing, and numeric parsing distinguishes "zero" from
//! "no value".

mod lookup;
mod numeric;
mod sequence;

pub use lookup::{
    Seg, float_or, int_or, list_or_empty, lookup, lookup_keys, lookup_or, string_list, str_or,
};
pub use numeric::{parse_int, parse_int_lenient, parse_timestamp};
pub use sequence::unique_by;

use regex::Regex;

/// Compiles a regex at static init; panics on invalid pattern.
pub(crate) fn compile_static_regex(pattern: &str) -> Regex {
    Regex::new(pattern).unwrap_or_else(|e| panic!("invalid static regex '{pattern}': {e}"))
}

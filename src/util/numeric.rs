//! Integer and timestamp parsing for human-formatted page text.

use std::sync::LazyLock;

use regex::Regex;

use super::compile_static_regex;

/// `h+:mm:ss` or `m:ss`/`mm:ss`, anchored at the start of the (trimmed) text.
static TIMESTAMP_RE: LazyLock<Regex> =
    LazyLock::new(|| compile_static_regex(r"^(?:(\d+):)?(\d{1,2}):(\d{2})"));

/// Parses `text` as an integer in `base` after trimming surrounding whitespace.
///
/// Returns `None` for bases outside `2..=36` or when the text is not a number.
#[must_use]
pub fn parse_int(text: &str, base: u32) -> Option<i64> {
    if !(2..=36).contains(&base) {
        return None;
    }
    i64::from_str_radix(text.trim(), base).ok()
}

/// Parses an integer after dropping every character that is not a digit of `base`.
///
/// Letters count as digits for bases above 10, in either case. Only use this
/// when `text` is known to hold exactly one number, e.g. `"1,234 views"`.
///
/// Returns `None` (never zero) when no digit survives the filter, when the base
/// is outside `2..=36`, or when the value overflows.
#[must_use]
pub fn parse_int_lenient(text: &str, base: u32) -> Option<u64> {
    if !(2..=36).contains(&base) {
        return None;
    }
    let digits: String = text.chars().filter(|c| c.is_digit(base)).collect();
    if digits.is_empty() {
        return None;
    }
    u64::from_str_radix(&digits, base).ok()
}

/// Converts a `h:mm:ss` or `mm:ss` timestamp into whole seconds.
///
/// Minute or second components above 60 are rejected.
#[must_use]
pub fn parse_timestamp(text: &str) -> Option<u64> {
    let caps = TIMESTAMP_RE.captures(text.trim())?;
    let component = |index: usize| -> Option<u64> {
        caps.get(index)
            .map_or(Some(0), |m| m.as_str().parse::<u64>().ok())
    };

    let hours = component(1)?;
    let minutes = component(2)?;
    let seconds = component(3)?;
    if minutes > 60 || seconds > 60 {
        return None;
    }

    hours
        .checked_mul(3600)?
        .checked_add(minutes * 60 + seconds)
}

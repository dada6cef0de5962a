//! Multi-level lookups into JSON documents that never fail.

use serde_json::Value;

use super::numeric::parse_int;

/// One step of a lookup path: an object key or an array index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Seg<'a> {
    /// Object member name.
    Key(&'a str),
    /// Array position.
    Index(usize),
}

impl<'a> From<&'a str> for Seg<'a> {
    fn from(key: &'a str) -> Self {
        Self::Key(key)
    }
}

impl From<usize> for Seg<'_> {
    fn from(index: usize) -> Self {
        Self::Index(index)
    }
}

/// Follows `path` into `value`.
///
/// Returns `None` when any level is missing, has the wrong type (a key into an
/// array, an index into an object or scalar), or is out of range.
#[must_use]
pub fn lookup<'v>(value: &'v Value, path: &[Seg<'_>]) -> Option<&'v Value> {
    path.iter().try_fold(value, |current, seg| match *seg {
        Seg::Key(key) => current.as_object()?.get(key),
        Seg::Index(index) => current.as_array()?.get(index),
    })
}

/// Like [`lookup`] for paths made only of object keys.
#[must_use]
pub fn lookup_keys<'v>(value: &'v Value, keys: &[&str]) -> Option<&'v Value> {
    keys.iter()
        .try_fold(value, |current, key| current.as_object()?.get(*key))
}

/// Like [`lookup`], returning `default` instead of `None`.
#[must_use]
pub fn lookup_or<'v>(value: &'v Value, path: &[Seg<'_>], default: &'v Value) -> &'v Value {
    lookup(value, path).unwrap_or(default)
}

/// Coerces a looked-up value to a string. `null` and absence give `None`.
#[must_use]
pub fn str_or(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::Null => None,
        Value::String(text) => Some(text.clone()),
        other => Some(other.to_string()),
    }
}

/// Coerces a looked-up value to an integer.
///
/// Integral JSON numbers are taken as-is; strings are parsed in `base`.
#[must_use]
pub fn int_or(value: Option<&Value>, base: u32) -> Option<i64> {
    match value? {
        Value::Number(number) => number.as_i64(),
        Value::String(text) => parse_int(text, base),
        _ => None,
    }
}

/// Coerces a looked-up value to a float (numbers or numeric strings).
#[must_use]
pub fn float_or(value: Option<&Value>) -> Option<f64> {
    match value? {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().parse().ok(),
        _ => None,
    }
}

/// Copies a looked-up array, or returns an empty list when it is not one.
#[must_use]
pub fn list_or_empty(value: Option<&Value>) -> Vec<Value> {
    value
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default()
}

/// Copies the string members of a looked-up array; other members are skipped.
#[must_use]
pub fn string_list(value: Option<&Value>) -> Vec<String> {
    value
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(|item| item.as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default()
}

//! Iterator helpers for post-processing extracted item lists.

use std::collections::HashSet;
use std::hash::Hash;

/// Yields every item whose key has not been seen before, preserving order.
pub fn unique_by<I, K, F>(items: I, mut key: F) -> impl Iterator<Item = I::Item>
where
    I: IntoIterator,
    K: Eq + Hash,
    F: FnMut(&I::Item) -> K,
{
    let mut seen = HashSet::new();
    items.into_iter().filter(move |item| seen.insert(key(item)))
}

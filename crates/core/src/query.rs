//! Helpers for the in-memory queries services run over cached snapshots

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

/// Direction of a sort
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Ascending,
    Descending,
}

impl SortOrder {
    /// Turn an ascending comparison into this order
    pub fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            Self::Ascending => ordering,
            Self::Descending => ordering.reverse(),
        }
    }
}

/// Stable sort of `items` by `key` in the given direction
pub fn sort_by_key<T, K, F>(items: &mut [T], order: SortOrder, mut key: F)
where
    K: Ord,
    F: FnMut(&T) -> K,
{
    items.sort_by(|a, b| order.apply(key(a).cmp(&key(b))));
}

/// Case-insensitive substring match; a blank needle matches everything
pub fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    let needle = needle.trim();
    needle.is_empty() || haystack.to_lowercase().contains(&needle.to_lowercase())
}

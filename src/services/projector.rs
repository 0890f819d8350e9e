//! Search and sort for the entry list

use crate::types::{Entry, SortKey};

/// Produces the display order of the entry list.
///
/// Each call filters from the collection it is handed; projecting an
/// already-projected list with a new term narrows that list, it does not
/// re-widen to the full store.
pub struct ListProjector;

impl ListProjector {
    /// Filter by `search_term` then order by `sort_key`. Never mutates input.
    pub fn project(entries: &[Entry], search_term: &str, sort_key: SortKey) -> Vec<Entry> {
        let needle = search_term.trim().to_lowercase();

        let mut result: Vec<Entry> = entries
            .iter()
            .filter(|entry| needle.is_empty() || Self::matches(entry, &needle))
            .cloned()
            .collect();

        // Stable sorts: ties keep filtered order. Unparsable dates sort as oldest.
        match sort_key {
            SortKey::DateDesc => result.sort_by_key(|e| std::cmp::Reverse(e.timestamp())),
            SortKey::DateAsc => result.sort_by_key(|e| e.timestamp()),
            SortKey::RatingDesc => result.sort_by_key(|e| std::cmp::Reverse(e.rating)),
            SortKey::RatingAsc => result.sort_by_key(|e| e.rating),
        }

        result
    }

    /// Case-insensitive substring match on title, author or website.
    /// `needle` must already be trimmed and lower-cased.
    fn matches(entry: &Entry, needle: &str) -> bool {
        [&entry.title, &entry.author, &entry.website]
            .iter()
            .any(|field| field.to_lowercase().contains(needle))
    }
}

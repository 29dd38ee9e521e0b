//! Token → posting list inverted index.

use crate::text::Token;
use std::collections::HashMap;

/// Maps a stemmed token to the ascending, duplicate-free list of internal
/// document ids that contain it.
///
/// `next_index` assignment is the one piece of state that must remain
/// correct under concurrent callers per the source; the engine above this
/// type serializes all access through a single mutex, so this type itself
/// does not need interior synchronization.
#[derive(Debug, Default, serde::Serialize, serde::Deserialize)]
pub struct InvertedIndex {
    table: HashMap<Token, Vec<u64>>,
    next_index: u64,
}

impl InvertedIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Increments and returns the next internal document id.
    pub fn next_index(&mut self) -> u64 {
        self.next_index += 1;
        self.next_index
    }

    /// Returns the current counter without incrementing, used only for the
    /// `next_internal_id > max(uid)` invariant check in tests.
    pub fn current_index(&self) -> u64 {
        self.next_index
    }

    pub fn add(&mut self, token: &Token, uid: u64) {
        let postings = self.table.entry(token.clone()).or_default();
        let needs_sort = postings.last().is_some_and(|&last| last > uid);
        postings.push(uid);
        if needs_sort {
            postings.sort_unstable();
        }
    }

    pub fn remove(&mut self, token: &Token, uid: u64) {
        if let Some(postings) = self.table.get_mut(token)
            && let Ok(idx) = postings.binary_search(&uid)
        {
            postings.remove(idx);
        }
    }

    pub fn get(&self, token: &Token) -> &[u64] {
        self.table.get(token).map_or(&[], Vec::as_slice)
    }

    pub fn table(&self) -> &HashMap<Token, Vec<u64>> {
        &self.table
    }

    pub fn set_table(&mut self, table: HashMap<Token, Vec<u64>>) {
        self.table = table;
    }

    pub fn set_next_index(&mut self, next_index: u64) {
        self.next_index = next_index;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert2::check;

    #[test]
    fn next_index_increments() {
        let mut idx = InvertedIndex::new();
        check!(idx.next_index() == 1);
        check!(idx.next_index() == 2);
    }

    #[test]
    fn add_and_get_roundtrip() {
        let mut idx = InvertedIndex::new();
        idx.add(&"dog".to_string(), 3);
        idx.add(&"dog".to_string(), 1);
        idx.add(&"dog".to_string(), 2);
        check!(idx.get(&"dog".to_string()) == [1, 2, 3]);
    }

    #[test]
    fn remove_deletes_posting() {
        let mut idx = InvertedIndex::new();
        idx.add(&"dog".to_string(), 1);
        idx.add(&"dog".to_string(), 2);
        idx.remove(&"dog".to_string(), 1);
        check!(idx.get(&"dog".to_string()) == [2]);
    }

    #[test]
    fn remove_unknown_uid_is_noop() {
        let mut idx = InvertedIndex::new();
        idx.add(&"dog".to_string(), 1);
        idx.remove(&"dog".to_string(), 99);
        check!(idx.get(&"dog".to_string()) == [1]);
    }

    #[test]
    fn get_on_missing_token_is_empty() {
        let idx = InvertedIndex::new();
        check!(idx.get(&"missing".to_string()).is_empty());
    }
}

//! Bounded undo/redo history.
//!
//! Each entry snapshots the rendered text (committed text plus any pending
//! composed character), the selection, and the raw composition symbols. Both
//! stacks are capped; when full, the oldest entry is evicted first.

use crate::buffer::Selection;
use std::collections::VecDeque;

/// One history snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    pub text: String,
    pub selection: Selection,
    pub composition: Vec<char>,
}

impl HistoryEntry {
    pub fn new<T: Into<String>>(text: T, selection: Selection, composition: Vec<char>) -> Self {
        Self {
            text: text.into(),
            selection,
            composition,
        }
    }
}

/// Linear undo/redo history with FIFO eviction.
#[derive(Debug, Clone)]
pub struct History {
    undo: VecDeque<HistoryEntry>,
    redo: VecDeque<HistoryEntry>,
    limit: usize,
}

impl History {
    /// Create a history capped at `limit` entries per stack.
    pub fn with_limit(limit: usize) -> Self {
        Self {
            undo: VecDeque::new(),
            redo: VecDeque::new(),
            limit: limit.max(1),
        }
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn undo_len(&self) -> usize {
        self.undo.len()
    }

    pub fn redo_len(&self) -> usize {
        self.redo.len()
    }

    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    /// Record the state before a mutation. Clears the redo stack.
    pub fn push(&mut self, entry: HistoryEntry) {
        Self::push_bounded(&mut self.undo, entry, self.limit);
        self.redo.clear();
    }

    /// Pop the latest undo entry, recording `current` for redo.
    ///
    /// Returns `None` (and records nothing) if there is nothing to undo.
    pub fn undo(&mut self, current: HistoryEntry) -> Option<HistoryEntry> {
        let entry = self.undo.pop_back()?;
        Self::push_bounded(&mut self.redo, current, self.limit);
        Some(entry)
    }

    /// Pop the latest redo entry, recording `current` for undo.
    ///
    /// The redo stack is left intact apart from the popped entry.
    pub fn redo(&mut self, current: HistoryEntry) -> Option<HistoryEntry> {
        let entry = self.redo.pop_back()?;
        Self::push_bounded(&mut self.undo, current, self.limit);
        Some(entry)
    }

    /// Drop all entries.
    pub fn clear(&mut self) {
        self.undo.clear();
        self.redo.clear();
    }

    fn push_bounded(stack: &mut VecDeque<HistoryEntry>, entry: HistoryEntry, limit: usize) {
        while stack.len() >= limit {
            stack.pop_front();
        }
        stack.push_back(entry);
    }
}

impl Default for History {
    fn default() -> Self {
        Self::with_limit(crate::MAX_HISTORY_SIZE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(text: &str) -> HistoryEntry {
        HistoryEntry::new(text, Selection::caret(text.chars().count()), Vec::new())
    }

    #[test]
    fn test_undo_redo_inverse() {
        let mut h = History::default();
        h.push(entry("a"));
        // current state is "ab"
        let undone = h.undo(entry("ab")).unwrap();
        assert_eq!(undone.text, "a");
        let redone = h.redo(entry("a")).unwrap();
        assert_eq!(redone.text, "ab");
        assert_eq!(h.undo_len(), 1);
        assert_eq!(h.redo_len(), 0);
    }

    #[test]
    fn test_push_clears_redo() {
        let mut h = History::default();
        h.push(entry(""));
        h.undo(entry("x"));
        assert!(h.can_redo());
        h.push(entry(""));
        assert!(!h.can_redo());
    }

    #[test]
    fn test_empty_stacks_are_noops() {
        let mut h = History::default();
        assert!(h.undo(entry("x")).is_none());
        assert!(h.redo(entry("x")).is_none());
        assert_eq!(h.redo_len(), 0);
        assert_eq!(h.undo_len(), 0);
    }

    #[test]
    fn test_bounded_eviction_drops_oldest() {
        let mut h = History::with_limit(3);
        for t in ["1", "2", "3", "4"] {
            h.push(entry(t));
        }
        assert_eq!(h.undo_len(), 3);
        assert_eq!(h.undo(entry("5")).unwrap().text, "4");
        assert_eq!(h.undo(entry("4")).unwrap().text, "3");
        assert_eq!(h.undo(entry("3")).unwrap().text, "2");
        assert!(h.undo(entry("2")).is_none());
    }
}

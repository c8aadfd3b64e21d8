//! Tag candidate types for autocomplete.
//!
//! This module provides:
//! - `TagCandidate`: A tag returned by the external lookup, plus ranking data
//! - `CandidateList`: Ranked list with a circular highlight cursor

use serde::{Deserialize, Serialize};

/// Tag category used by tag databases for character names.
pub const CATEGORY_CHARACTER: u32 = 4;

/// A single tag candidate.
///
/// Lookup results are read-only and ephemeral: they are replaced wholesale by
/// the next lookup. `score` and `highlight` are filled in by the ranker.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TagCandidate {
    pub word: String,
    pub normalized: String,
    /// Canonical tag this one aliases, empty when none
    pub redirect: String,
    pub freq: u64,
    pub category: u32,
    pub priority: i32,

    /// Ranking cost from the matcher; lower is better
    #[serde(skip)]
    pub score: u32,
    /// Char indices of `word` to render emphasized
    #[serde(skip)]
    pub highlight: Vec<usize>,
}

impl TagCandidate {
    pub fn new<T: Into<String>>(word: T) -> Self {
        Self {
            word: word.into(),
            ..Self::default()
        }
    }

    pub fn with_freq(mut self, freq: u64) -> Self {
        self.freq = freq;
        self
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_category(mut self, category: u32) -> Self {
        self.category = category;
        self
    }

    pub fn with_redirect<T: Into<String>>(mut self, redirect: T) -> Self {
        self.redirect = redirect.into();
        self
    }

    /// Text inserted into the buffer when this candidate is committed.
    pub fn commit_text(&self, follow_redirect: bool) -> &str {
        if follow_redirect && !self.redirect.is_empty() {
            &self.redirect
        } else {
            &self.word
        }
    }

    /// Parse a JSON array of tags, as produced by tag database dumps.
    pub fn parse_list(json: &str) -> anyhow::Result<Vec<TagCandidate>> {
        Ok(serde_json::from_str(json)?)
    }
}

/// A ranked candidate list with a circular cursor.
#[derive(Debug, Clone, Default)]
pub struct CandidateList {
    candidates: Vec<TagCandidate>,
    cursor: usize,
}

impl CandidateList {
    /// Create a new empty candidate list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the candidates, resetting the cursor to the first one.
    pub fn set_candidates(&mut self, candidates: Vec<TagCandidate>) {
        self.candidates = candidates;
        self.cursor = 0;
    }

    /// Get all candidates.
    pub fn candidates(&self) -> &[TagCandidate] {
        &self.candidates
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    /// Index of the highlighted candidate.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Get the highlighted candidate.
    pub fn selected_candidate(&self) -> Option<&TagCandidate> {
        self.candidates.get(self.cursor)
    }

    /// Move the cursor up, wrapping to the last candidate.
    /// Returns false if the list is empty.
    pub fn cursor_up(&mut self) -> bool {
        if self.candidates.is_empty() {
            return false;
        }
        self.cursor = if self.cursor == 0 {
            self.candidates.len() - 1
        } else {
            self.cursor - 1
        };
        true
    }

    /// Move the cursor down, wrapping to the first candidate.
    /// Returns false if the list is empty.
    pub fn cursor_down(&mut self) -> bool {
        if self.candidates.is_empty() {
            return false;
        }
        self.cursor = (self.cursor + 1) % self.candidates.len();
        true
    }

    /// Clear the candidate list.
    pub fn clear(&mut self) {
        self.candidates.clear();
        self.cursor = 0;
    }
}

//! In-memory tag database.

use crate::compose::TagLookup;
use ahash::AHashMap;
use anyhow::Context;
use libhangul::calc_gap_match;
use sdprompt_core::{TagCandidate, TagSearch};
use std::future::Future;
use std::path::Path;

/// Tags loaded from a JSON dump, searchable by gap match.
#[derive(Debug, Clone, Default)]
pub struct TagIndex {
    tags: Vec<TagCandidate>,
    by_word: AHashMap<String, usize>,
}

impl TagIndex {
    pub fn new(tags: Vec<TagCandidate>) -> Self {
        let by_word = tags
            .iter()
            .enumerate()
            .map(|(i, t)| (t.word.clone(), i))
            .collect();
        Self { tags, by_word }
    }

    pub fn from_json_str(json: &str) -> anyhow::Result<Self> {
        Ok(Self::new(TagCandidate::parse_list(json)?))
    }

    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read tags {}", path.display()))?;
        Self::from_json_str(&json)
            .with_context(|| format!("failed to parse tags {}", path.display()))
    }

    pub fn get(&self, word: &str) -> Option<&TagCandidate> {
        self.by_word.get(word).map(|&i| &self.tags[i])
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    /// Tags `query` embeds in, in database order.
    pub fn matching(&self, query: &str) -> Vec<TagCandidate> {
        self.tags
            .iter()
            .filter(|t| calc_gap_match(query, &t.word).is_match())
            .cloned()
            .collect()
    }
}

impl TagLookup for TagIndex {
    fn category(&self, word: &str) -> Option<u32> {
        self.get(word).map(|t| t.category)
    }
}

impl TagSearch for TagIndex {
    fn search(
        &self,
        query: String,
    ) -> impl Future<Output = anyhow::Result<Vec<TagCandidate>>> + Send {
        let found = self.matching(&query);
        async move { Ok(found) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DUMP: &str = r#"[
        {"word": "hatsune miku", "category": 4, "freq": 900},
        {"word": "blue hair", "freq": 5000},
        {"word": "blush", "freq": 7000}
    ]"#;

    #[test]
    fn test_lookup_category() {
        let index = TagIndex::from_json_str(DUMP).unwrap();
        assert_eq!(index.len(), 3);
        assert_eq!(index.category("hatsune miku"), Some(4));
        assert_eq!(index.category("blush"), Some(0));
        assert_eq!(index.category("unknown"), None);
    }

    #[test]
    fn test_matching_filters() {
        let index = TagIndex::from_json_str(DUMP).unwrap();
        let words: Vec<String> = index.matching("bl").into_iter().map(|t| t.word).collect();
        assert_eq!(words, vec!["blue hair", "blush"]);
    }
}

//! Autocomplete controller.
//!
//! Watches the word under the caret, issues numbered lookup requests when it
//! changes, applies only the response to the latest request, ranks the
//! results, tracks the highlighted candidate and produces the replacement
//! text on commit.

use crate::buffer::{word_bounds, Selection};
use crate::candidate::{CandidateList, TagCandidate};
use crate::context::{LookupRequest, Overlay};
use crate::utils::{char_len, trim_span};
use crate::Config;
use std::sync::Arc;

const ARTIST_PREFIX: &str = "artist:";

/// Ranking seam for lookup results.
pub trait Ranker: Send + Sync {
    /// Order `candidates` for `query`, best first. Candidates that do not
    /// match at all may be dropped.
    fn rank(&self, query: &str, candidates: Vec<TagCandidate>) -> Vec<TagCandidate>;
}

/// Keeps lookup order.
#[derive(Debug, Clone, Copy, Default)]
pub struct LookupOrder;

impl Ranker for LookupOrder {
    fn rank(&self, _query: &str, candidates: Vec<TagCandidate>) -> Vec<TagCandidate> {
        candidates
    }
}

/// The word under the caret, split into decoration and searchable core.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    /// Char offset of the trimmed word in the text
    pub start: usize,
    /// Char offset one past the trimmed word
    pub end: usize,
    /// Leading decoration such as `{{` or `[artist:`
    pub prefix: String,
    /// Text sent to the lookup
    pub core: String,
    /// Trailing decoration such as `}}`
    pub suffix: String,
}

impl Query {
    /// Extract the query around `caret`. Returns `None` for blank words.
    pub fn extract(text: &str, caret: usize, strip_decorations: bool) -> Option<Query> {
        let (ws, we) = word_bounds(text, caret);
        let chars: Vec<char> = text.chars().collect();
        let word = &chars[ws..we];
        let (left, right) = trim_span(word)?;
        let trimmed = &word[left..right];

        let (mut lo, mut hi) = (0, trimmed.len());
        if strip_decorations {
            while lo < hi && matches!(trimmed[lo], '{' | '[') {
                lo += 1;
            }
            let rest: String = trimmed[lo..hi].iter().collect();
            if rest.starts_with(ARTIST_PREFIX) {
                lo += char_len(ARTIST_PREFIX);
                while lo < hi && crate::utils::is_whitespace(trimmed[lo]) {
                    lo += 1;
                }
            }
            while hi > lo && matches!(trimmed[hi - 1], '}' | ']') {
                hi -= 1;
            }
        }

        Some(Query {
            start: ws + left,
            end: ws + right,
            prefix: trimmed[..lo].iter().collect(),
            core: trimmed[lo..hi].iter().collect(),
            suffix: trimmed[hi..].iter().collect(),
        })
    }

    /// The word with its core replaced, decorations preserved.
    pub fn splice(&self, replacement: &str) -> String {
        format!("{}{}{}", self.prefix, replacement, self.suffix)
    }
}

/// Autocomplete overlay controller.
pub struct Autocomplete {
    ranker: Arc<dyn Ranker>,
    list: CandidateList,
    open: bool,
    /// Last issued request id
    issued: u64,
    /// Id whose response may still be applied; 0 when none
    latest: u64,
    query: Option<Query>,
    /// Query was just committed; its word must not trigger a lookup
    settled: bool,
    anchor: usize,
    max_candidates: usize,
    min_query_len: usize,
    strip_decorations: bool,
    commit_redirect: bool,
}

impl Autocomplete {
    pub fn new(ranker: Arc<dyn Ranker>, config: &Config) -> Self {
        Self {
            ranker,
            list: CandidateList::new(),
            open: false,
            issued: 0,
            latest: 0,
            query: None,
            settled: false,
            anchor: 0,
            max_candidates: config.max_candidates.max(1),
            min_query_len: config.min_query_len,
            strip_decorations: config.strip_decorations,
            commit_redirect: config.commit_redirect,
        }
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn candidates(&self) -> &CandidateList {
        &self.list
    }

    /// Current query, if a word is under the caret.
    pub fn query(&self) -> Option<&Query> {
        self.query.as_ref()
    }

    /// Observe the text after an edit. Returns a lookup request when the word
    /// under the caret changed; closes the overlay when there is no word.
    pub fn observe(&mut self, text: &str, selection: Selection) -> Option<LookupRequest> {
        let query = if selection.is_collapsed() {
            Query::extract(text, selection.end, self.strip_decorations)
        } else {
            None
        };

        let query = match query {
            Some(q) if char_len(&q.core) >= self.min_query_len && !q.core.is_empty() => q,
            _ => {
                self.close();
                return None;
            }
        };

        let unchanged = self
            .query
            .as_ref()
            .map(|q| q.core == query.core)
            .unwrap_or(false);
        self.anchor = selection.end;
        if unchanged && (self.open || self.latest != 0 || self.settled) {
            // Same word; keep offsets current for commit.
            self.query = Some(query);
            return None;
        }

        self.settled = false;
        self.issued += 1;
        self.latest = self.issued;
        let request = LookupRequest {
            id: self.issued,
            query: query.core.clone(),
        };
        tracing::debug!(id = request.id, query = %request.query, "tag lookup issued");
        self.query = Some(query);
        Some(request)
    }

    /// Apply lookup results. Responses to anything but the latest request are
    /// discarded. Returns true if the overlay state changed.
    pub fn apply(&mut self, id: u64, results: Vec<TagCandidate>) -> bool {
        if id == 0 || id != self.latest {
            tracing::debug!(id, latest = self.latest, "stale tag lookup discarded");
            return false;
        }
        let core = match &self.query {
            Some(q) => q.core.clone(),
            None => return false,
        };
        let mut ranked = self.ranker.rank(&core, results);
        ranked.truncate(self.max_candidates);
        if ranked.is_empty() {
            self.close();
        } else {
            self.list.set_candidates(ranked);
            self.open = true;
        }
        true
    }

    /// A failed lookup closes the overlay if it was the latest one.
    pub fn fail(&mut self, id: u64) -> bool {
        if id == 0 || id != self.latest {
            return false;
        }
        self.close();
        true
    }

    /// Close the overlay and invalidate in-flight lookups.
    pub fn close(&mut self) {
        self.open = false;
        self.list.clear();
        self.latest = 0;
        self.query = None;
        self.settled = false;
    }

    /// Close the overlay after a commit, remembering the committed word so
    /// that observing it again issues no lookup.
    pub fn settle(&mut self, text: &str, selection: Selection) {
        self.close();
        self.query = Query::extract(text, selection.end, self.strip_decorations);
        self.settled = self.query.is_some();
    }

    pub fn cursor_up(&mut self) -> bool {
        self.open && self.list.cursor_up()
    }

    pub fn cursor_down(&mut self) -> bool {
        self.open && self.list.cursor_down()
    }

    /// Replacement for the highlighted candidate: the char span of the current
    /// word and the text to put there.
    pub fn commit(&self) -> Option<(usize, usize, String)> {
        if !self.open {
            return None;
        }
        let query = self.query.as_ref()?;
        let candidate = self.list.selected_candidate()?;
        let text = query.splice(candidate.commit_text(self.commit_redirect));
        Some((query.start, query.end, text))
    }

    /// Overlay snapshot for the host, `None` when closed.
    pub fn overlay(&self) -> Option<Overlay> {
        if !self.open {
            return None;
        }
        Some(Overlay {
            candidates: self.list.candidates().to_vec(),
            cursor: self.list.cursor(),
            anchor: self.anchor,
        })
    }
}

impl std::fmt::Debug for Autocomplete {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Autocomplete")
            .field("open", &self.open)
            .field("issued", &self.issued)
            .field("latest", &self.latest)
            .field("query", &self.query)
            .field("candidates", &self.list.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn controller() -> Autocomplete {
        Autocomplete::new(Arc::new(LookupOrder), &Config::default())
    }

    fn tags(words: &[&str]) -> Vec<TagCandidate> {
        words.iter().map(|w| TagCandidate::new(*w)).collect()
    }

    #[test]
    fn test_extract_strips_decorations() {
        let q = Query::extract("1girl, {{artist:ixy}}", 20, true).unwrap();
        assert_eq!(q.prefix, "{{artist:");
        assert_eq!(q.core, "ixy");
        assert_eq!(q.suffix, "}}");
        assert_eq!((q.start, q.end), (7, 21));
        assert_eq!(q.splice("wlop"), "{{artist:wlop}}");
    }

    #[test]
    fn test_extract_without_stripping() {
        let q = Query::extract("[blue]", 3, false).unwrap();
        assert_eq!(q.core, "[blue]");
        assert!(q.prefix.is_empty());
    }

    #[test]
    fn test_extract_blank_word() {
        assert!(Query::extract("a,  ,b", 3, true).is_none());
    }

    #[test]
    fn test_only_latest_response_applies() {
        let mut ac = controller();
        let r1 = ac.observe("r", Selection::caret(1)).unwrap();
        let r2 = ac.observe("re", Selection::caret(2)).unwrap();
        let r3 = ac.observe("red", Selection::caret(3)).unwrap();
        assert_eq!((r1.id, r2.id, r3.id), (1, 2, 3));

        assert!(ac.apply(r3.id, tags(&["red hair"])));
        assert!(!ac.apply(r1.id, tags(&["rabbit"])));
        assert!(!ac.apply(r2.id, tags(&["reading"])));
        let overlay = ac.overlay().unwrap();
        assert_eq!(overlay.candidates.len(), 1);
        assert_eq!(overlay.candidates[0].word, "red hair");
    }

    #[test]
    fn test_unchanged_word_does_not_reissue() {
        let mut ac = controller();
        assert!(ac.observe("red", Selection::caret(3)).is_some());
        assert!(ac.observe("red", Selection::caret(2)).is_none());
    }

    #[test]
    fn test_empty_results_close() {
        let mut ac = controller();
        let r = ac.observe("zz", Selection::caret(2)).unwrap();
        assert!(ac.apply(r.id, vec![]));
        assert!(!ac.is_open());
    }

    #[test]
    fn test_empty_query_invalidates_in_flight() {
        let mut ac = controller();
        let r = ac.observe("red", Selection::caret(3)).unwrap();
        assert!(ac.observe("red,", Selection::caret(4)).is_none());
        assert!(!ac.apply(r.id, tags(&["red hair"])));
        assert!(!ac.is_open());
    }

    #[test]
    fn test_commit_preserves_decoration() {
        let mut ac = controller();
        let text = "solo, {bl}";
        let r = ac.observe(text, Selection::caret(9)).unwrap();
        assert_eq!(r.query, "bl");
        ac.apply(r.id, tags(&["black hair", "blush"]));
        ac.cursor_down();
        let (start, end, replacement) = ac.commit().unwrap();
        assert_eq!((start, end), (6, 10));
        assert_eq!(replacement, "{blush}");
    }

    #[test]
    fn test_settled_word_does_not_reissue() {
        let mut ac = controller();
        ac.settle("solo, blush", Selection::caret(11));
        assert!(ac.observe("solo, blush", Selection::caret(11)).is_none());
        assert!(ac.observe("solo, blushe", Selection::caret(12)).is_some());
    }
}

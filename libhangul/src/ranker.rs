//! Gap-match ranking for autocomplete candidates.

use crate::gap::calc_gap_match;
use sdprompt_core::{Ranker, TagCandidate};
use tracing::debug;

/// Ranks candidates by gap-match cost against the typed query.
///
/// Candidates the query does not embed in are dropped. Ties go to the higher
/// `priority`, then the higher `freq`; the sort is stable so the lookup order
/// decides what is left.
#[derive(Debug, Clone, Copy, Default)]
pub struct GapMatchRanker;

impl GapMatchRanker {
    pub fn new() -> Self {
        Self
    }
}

impl Ranker for GapMatchRanker {
    fn rank(&self, query: &str, candidates: Vec<TagCandidate>) -> Vec<TagCandidate> {
        let total = candidates.len();
        let mut ranked: Vec<TagCandidate> = candidates
            .into_iter()
            .filter_map(|mut candidate| {
                let m = calc_gap_match(query, &candidate.word);
                if !m.is_match() {
                    return None;
                }
                candidate.score = m.result;
                candidate.highlight = m.path;
                Some(candidate)
            })
            .collect();

        ranked.sort_by(|a, b| {
            a.score
                .cmp(&b.score)
                .then_with(|| b.priority.cmp(&a.priority))
                .then_with(|| b.freq.cmp(&a.freq))
        });
        debug!(query, total, kept = ranked.len(), "ranked candidates");
        ranked
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(list: &[TagCandidate]) -> Vec<&str> {
        list.iter().map(|c| c.word.as_str()).collect()
    }

    #[test]
    fn test_drops_non_matching() {
        let ranked = GapMatchRanker.rank(
            "bl",
            vec![TagCandidate::new("red hair"), TagCandidate::new("blue eyes")],
        );
        assert_eq!(words(&ranked), vec!["blue eyes"]);
        assert_eq!(ranked[0].highlight, vec![0, 1]);
        assert_eq!(ranked[0].score, 1);
    }

    #[test]
    fn test_tighter_match_first() {
        // "bh" needs two runs in "black hair" but one in "bh_tag"
        let ranked = GapMatchRanker.rank(
            "bh",
            vec![
                TagCandidate::new("black hair").with_freq(1000),
                TagCandidate::new("bh_tag"),
            ],
        );
        assert_eq!(words(&ranked), vec!["bh_tag", "black hair"]);
    }

    #[test]
    fn test_ties_by_priority_then_freq() {
        let ranked = GapMatchRanker.rank(
            "hair",
            vec![
                TagCandidate::new("hair ornament").with_freq(10),
                TagCandidate::new("hair bow").with_freq(50),
                TagCandidate::new("hair ribbon").with_priority(1),
            ],
        );
        assert_eq!(
            words(&ranked),
            vec!["hair ribbon", "hair bow", "hair ornament"]
        );
    }

    #[test]
    fn test_hangul_query_against_hangul_word() {
        let ranked = GapMatchRanker.rank(
            "ㄱㅇ",
            vec![TagCandidate::new("고양이"), TagCandidate::new("사자")],
        );
        assert_eq!(words(&ranked), vec!["고양이"]);
        assert_eq!(ranked[0].highlight, vec![0, 1]);
    }
}

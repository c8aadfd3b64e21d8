//! Fuzzy gap matcher.
//!
//! Aligns a typed fragment as a subsequence of a candidate word, both
//! normalized, and counts how many separate runs the matched symbols form in
//! the candidate. Fewer runs means a tighter match. Symbols of the fragment
//! are never skipped; if the fragment cannot embed, the result is `INF`.

use crate::normalize::normalize;

/// Cost of a fragment that does not embed in the word.
pub const INF: u32 = 1_000_000_000;

/// Match cost and the char indices of the word that were matched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GapMatch {
    pub result: u32,
    /// Ascending, deduplicated char indices into the word
    pub path: Vec<usize>,
}

impl GapMatch {
    pub fn is_match(&self) -> bool {
        self.result < INF
    }
}

type Step = Option<(usize, usize, usize)>;

/// Match `small` against `large`.
///
/// State 0 is "outside a matched run", state 1 "just matched". Entering a
/// run costs one; extending it or skipping symbols of `large` is free. Ties
/// keep the first transition found in fill order.
pub fn calc_gap_match(small: &str, large: &str) -> GapMatch {
    let s = normalize(small);
    let l = normalize(large);
    let (m, n) = (s.len(), l.len());

    let mut dp = vec![vec![[INF; 2]; n + 1]; m + 1];
    let mut back: Vec<Vec<[Step; 2]>> = vec![vec![[None; 2]; n + 1]; m + 1];
    dp[0][0][0] = 0;

    for i in 0..=m {
        for j in 0..n {
            if i < m && s.symbols[i] == l.symbols[j] {
                if dp[i][j][0].saturating_add(1) < dp[i + 1][j + 1][1] {
                    dp[i + 1][j + 1][1] = dp[i][j][0] + 1;
                    back[i + 1][j + 1][1] = Some((i, j, 0));
                }
                if dp[i][j][1] < dp[i + 1][j + 1][1] {
                    dp[i + 1][j + 1][1] = dp[i][j][1];
                    back[i + 1][j + 1][1] = Some((i, j, 1));
                }
            }
            if dp[i][j][0] < dp[i][j + 1][0] {
                dp[i][j + 1][0] = dp[i][j][0];
                back[i][j + 1][0] = Some((i, j, 0));
            }
            if dp[i][j][1] < dp[i][j + 1][0] {
                dp[i][j + 1][0] = dp[i][j][1];
                back[i][j + 1][0] = Some((i, j, 1));
            }
        }
    }

    let result = dp[m][n][0].min(dp[m][n][1]);
    if result >= INF {
        return GapMatch {
            result: INF,
            path: Vec::new(),
        };
    }

    let mut path = Vec::new();
    let (mut i, mut j) = (m, n);
    let mut k = if dp[m][n][0] < dp[m][n][1] { 0 } else { 1 };
    while i != 0 || j != 0 {
        let Some((pi, pj, pk)) = back[i][j][k] else {
            break;
        };
        if pi + 1 == i && pj + 1 == j {
            path.push(l.mapping[j - 1]);
        }
        (i, j, k) = (pi, pj, pk);
    }
    path.reverse();
    path.dedup();

    GapMatch { result, path }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initials_match_syllables() {
        let m = calc_gap_match("ㅎㄱ", "한국");
        assert!(m.is_match());
        assert_eq!(m.result, 2);
        assert_eq!(m.path, vec![0, 1]);
    }

    #[test]
    fn test_contiguous_is_one_run() {
        let m = calc_gap_match("hai", "hair");
        assert_eq!(m.result, 1);
        assert_eq!(m.path, vec![0, 1, 2]);
    }

    #[test]
    fn test_prefers_fewer_runs() {
        // "bl" first forms a single run inside "bubble"
        let m = calc_gap_match("bl", "bubble blue");
        assert_eq!(m.result, 1);
        assert_eq!(m.path, vec![3, 4]);
        assert_eq!(calc_gap_match("ㅂㄹ", "blonde 블론드").result, 2);
    }

    #[test]
    fn test_case_insensitive() {
        assert_eq!(calc_gap_match("RED", "red hair").result, 1);
    }

    #[test]
    fn test_no_embedding_is_inf() {
        let m = calc_gap_match("xyz", "red");
        assert_eq!(m.result, INF);
        assert!(m.path.is_empty());
        assert!(!calc_gap_match("reds", "red").is_match());
    }

    #[test]
    fn test_empty_fragment_matches_free() {
        let m = calc_gap_match("", "anything");
        assert_eq!(m.result, 0);
        assert!(m.path.is_empty());
    }
}

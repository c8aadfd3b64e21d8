//! PARR tokenization: a prompt as its list of trimmed, non-empty fragments.

/// Token that switches interleaving between front and middle prompts.
pub const SPLIT_TOKEN: &str = "|";

/// Split `text` on commas and newlines, trim every fragment and drop the
/// empty ones.
pub fn to_parr(text: &str) -> Vec<String> {
    text.split([',', '\n'])
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Canonical spelling of a prompt: fragments joined by `", "`.
pub fn reformat(text: &str) -> String {
    to_parr(text).join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_splits_commas_and_lines() {
        assert_eq!(
            to_parr(" 1girl,, solo\nred hair ,\n\n"),
            vec!["1girl", "solo", "red hair"]
        );
    }

    #[test]
    fn test_blank_input() {
        assert!(to_parr("").is_empty());
        assert!(to_parr(" , \n ,").is_empty());
    }

    #[test]
    fn test_nbsp_is_trimmed() {
        assert_eq!(to_parr("\u{a0}smile\u{a0}, x"), vec!["smile", "x"]);
    }

    #[test]
    fn test_reformat() {
        assert_eq!(reformat("a,b ,\nc"), "a, b, c");
    }
}

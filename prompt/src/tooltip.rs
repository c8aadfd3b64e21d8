//! Hover text for highlighted words.

use crate::error::{ErrorContext, GrammarError};
use crate::library::{expand_piece, is_multi, PieceSource};
use crate::parr::SPLIT_TOKEN;

/// Explanation shown when hovering the split token.
pub const SPLIT_HELP: &str = "Interleaves prompts.\n\
Example:\n\
front prompt: 1girl, |, character\n\
middle prompt: style, |, pose\n\
gives 1girl, style, character, pose.";

/// Header of a multi piece tooltip.
pub const MULTI_HEADER: &str = "One line chosen at random:";

/// Tooltip text for `word`: the split help, the lines of a multi piece (at
/// most `max_lines`) after a header, or a piece's full expansion.
pub fn tooltip_text(
    source: Option<&dyn PieceSource>,
    word: &str,
    max_lines: usize,
) -> Result<String, GrammarError> {
    if word == SPLIT_TOKEN {
        return Ok(SPLIT_HELP.to_string());
    }
    let source = source.ok_or_else(|| GrammarError::PiecesUnavailable {
        token: word.to_string(),
    })?;
    let expanded = expand_piece(source, word, &ErrorContext::default())?;
    if !is_multi(source, word) {
        return Ok(expanded);
    }
    let mut text = String::from(MULTI_HEADER);
    for line in expanded.split('\n').take(max_lines) {
        text.push('\n');
        text.push_str(line);
    }
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::library::{Library, Piece};

    #[test]
    fn test_split_help() {
        assert_eq!(tooltip_text(None, "|", 32).unwrap(), SPLIT_HELP);
    }

    #[test]
    fn test_plain_piece_full_text() {
        let mut lib = Library::new();
        lib.add_piece("a", Piece::new("b", "x, y\nz"));
        assert_eq!(tooltip_text(Some(&lib), "<a.b>", 1).unwrap(), "x, y\nz");
    }

    #[test]
    fn test_multi_piece_capped() {
        let mut lib = Library::new();
        let lines: Vec<String> = (0..40).map(|i| format!("opt{i}")).collect();
        lib.add_piece("a", Piece::multi("m", lines.join("\n")));
        let text = tooltip_text(Some(&lib), "<a.m>", 32).unwrap();
        let shown: Vec<&str> = text.lines().collect();
        assert_eq!(shown[0], MULTI_HEADER);
        assert_eq!(shown.len(), 33);
        assert_eq!(shown[32], "opt31");
    }

    #[test]
    fn test_failures() {
        let lib = Library::new();
        assert!(tooltip_text(Some(&lib), "<a.b>", 32).is_err());
        assert!(tooltip_text(Some(&lib), "plain", 32).is_err());
        assert!(tooltip_text(None, "<a.b>", 32).is_err());
    }
}

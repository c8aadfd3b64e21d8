//! Bracket balance checking.
//!
//! Checks `()`, `[]`, `{}` and `<>` pairs. Emoticon words such as `:)` or
//! `><` are not structure and are skipped when a whole comma-separated word
//! is one of them.

use sdprompt_core::utils::trim_span;

/// Emoticon words whose brackets are ignored.
const EXPRESSIONS: [&str; 13] = [
    ":<", ";<", ":>", ";>", ":(", ";(", ":)", ";)", ":{", ";{", ":}", ";}", "><",
];

const OPENERS: [char; 4] = ['(', '[', '{', '<'];
const CLOSERS: [char; 4] = [')', ']', '}', '>'];

/// Result of a balance check. Positions are char offsets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParenStatus {
    Balanced,
    /// First offending delimiter: an unexpected closer, the opener a
    /// mismatched closer tried to close, or the innermost opener left open.
    Unmatched(usize),
}

impl ParenStatus {
    pub fn is_balanced(&self) -> bool {
        matches!(self, ParenStatus::Balanced)
    }

    /// Offending position, if any.
    pub fn position(&self) -> Option<usize> {
        match self {
            ParenStatus::Balanced => None,
            ParenStatus::Unmatched(pos) => Some(*pos),
        }
    }
}

/// Replace the brackets of emoticon words with neutral chars. The char count
/// is unchanged.
fn neutralize_expressions(chars: &mut [char]) {
    let mut start = 0;
    while start <= chars.len() {
        let end = chars[start..]
            .iter()
            .position(|&c| c == ',')
            .map(|i| start + i)
            .unwrap_or(chars.len());
        if let Some((left, right)) = trim_span(&chars[start..end]) {
            let word: String = chars[start + left..start + right].iter().collect();
            if EXPRESSIONS.contains(&word.as_str()) {
                for c in &mut chars[start + left..start + right] {
                    *c = 'x';
                }
            }
        }
        start = end + 1;
    }
}

/// Check that all bracket pairs in `text` balance.
pub fn paren_check(text: &str) -> ParenStatus {
    let mut chars: Vec<char> = text.chars().collect();
    neutralize_expressions(&mut chars);

    let mut stack: Vec<(usize, usize)> = Vec::new();
    for (pos, &c) in chars.iter().enumerate() {
        if let Some(kind) = OPENERS.iter().position(|&o| o == c) {
            stack.push((kind, pos));
        } else if let Some(kind) = CLOSERS.iter().position(|&o| o == c) {
            let Some((open_kind, open_pos)) = stack.pop() else {
                return ParenStatus::Unmatched(pos);
            };
            if open_kind != kind {
                return ParenStatus::Unmatched(open_pos);
            }
        }
    }
    match stack.pop() {
        Some((_, pos)) => ParenStatus::Unmatched(pos),
        None => ParenStatus::Balanced,
    }
}

//! Committed text buffer and caret selection.
//!
//! The buffer stores the logical prompt text (newlines are literal `\n`) and
//! exposes editing primitives addressed by char offsets. The selection lives
//! beside it in the editor because, while a character is being composed, the
//! caret is expressed in rendered coordinates that include the pending char.

use crate::utils::{byte_index, char_len, char_slice};

/// A pair of char offsets `[start, end]`; collapsed when equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Selection {
    pub start: usize,
    pub end: usize,
}

impl Selection {
    /// Create a selection, ordering the endpoints.
    pub fn new(start: usize, end: usize) -> Self {
        if start <= end {
            Self { start, end }
        } else {
            Self { start: end, end: start }
        }
    }

    /// Collapsed selection at `offset`.
    pub fn caret(offset: usize) -> Self {
        Self { start: offset, end: offset }
    }

    pub fn is_collapsed(&self) -> bool {
        self.start == self.end
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.is_collapsed()
    }

    /// Clamp both endpoints into `0..=len`.
    pub fn clamp(self, len: usize) -> Self {
        Self::new(self.start.min(len), self.end.min(len))
    }
}

/// Text buffer addressed by char offsets.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TextBuffer {
    text: String,
}

impl TextBuffer {
    /// Create a new empty buffer.
    pub fn new() -> Self {
        Self { text: String::new() }
    }

    /// Create a buffer holding `text`.
    pub fn from_text<T: Into<String>>(text: T) -> Self {
        Self { text: text.into() }
    }

    /// Get the text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Length in chars.
    pub fn len(&self) -> usize {
        char_len(&self.text)
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Replace the whole text.
    pub fn set_text<T: Into<String>>(&mut self, text: T) {
        self.text = text.into();
    }

    /// Text between two char offsets.
    pub fn slice(&self, start: usize, end: usize) -> &str {
        char_slice(&self.text, start, end)
    }

    /// Replace chars `[start, end)` with `replacement`. Offsets are clamped.
    pub fn replace(&mut self, start: usize, end: usize, replacement: &str) {
        let sel = Selection::new(start, end);
        let from = byte_index(&self.text, sel.start);
        let to = byte_index(&self.text, sel.end);
        self.text.replace_range(from..to, replacement);
    }

    /// Insert `s` at char offset `at`.
    pub fn insert(&mut self, at: usize, s: &str) {
        self.replace(at, at, s);
    }

    /// Remove chars `[start, end)`.
    pub fn remove(&mut self, start: usize, end: usize) {
        self.replace(start, end, "");
    }

    /// Text as it would render with `pending` shown at char offset `at`.
    pub fn with_pending(&self, at: usize, pending: &str) -> String {
        let idx = byte_index(&self.text, at);
        let mut out = String::with_capacity(self.text.len() + pending.len());
        out.push_str(&self.text[..idx]);
        out.push_str(pending);
        out.push_str(&self.text[idx..]);
        out
    }
}

/// Line index and column (both in chars) of `offset` in `text`.
pub fn line_col(text: &str, offset: usize) -> (usize, usize) {
    let mut line = 0;
    let mut col = 0;
    for ch in text.chars().take(offset) {
        if ch == '\n' {
            line += 1;
            col = 0;
        } else {
            col += 1;
        }
    }
    (line, col)
}

/// Offset of `(line, col)` in `text`; the column is clamped to the line end and
/// lines past the end clamp to the text end.
pub fn offset_at(text: &str, line: usize, col: usize) -> usize {
    let mut offset = 0;
    for (i, l) in text.split('\n').enumerate() {
        let len = char_len(l);
        if i == line {
            return offset + col.min(len);
        }
        offset += len + 1;
    }
    char_len(text)
}

/// Offset one visual line above `offset`, keeping the column when possible.
pub fn offset_up(text: &str, offset: usize) -> usize {
    let (line, col) = line_col(text, offset);
    if line == 0 {
        0
    } else {
        offset_at(text, line - 1, col)
    }
}

/// Offset one visual line below `offset`, keeping the column when possible.
pub fn offset_down(text: &str, offset: usize) -> usize {
    let (line, col) = line_col(text, offset);
    let lines = text.split('\n').count();
    if line + 1 >= lines {
        char_len(text)
    } else {
        offset_at(text, line + 1, col)
    }
}

/// Start and end of the current line around `offset`.
pub fn line_bounds(text: &str, offset: usize) -> (usize, usize) {
    let chars: Vec<char> = text.chars().collect();
    let offset = offset.min(chars.len());
    let mut start = offset;
    while start > 0 && chars[start - 1] != '\n' {
        start -= 1;
    }
    let mut end = offset;
    while end < chars.len() && chars[end] != '\n' {
        end += 1;
    }
    (start, end)
}

/// Char span of the word around `caret`: the run between the nearest comma or
/// newline on either side.
pub fn word_bounds(text: &str, caret: usize) -> (usize, usize) {
    let chars: Vec<char> = text.chars().collect();
    let caret = caret.min(chars.len());
    let is_sep = |c: char| c == ',' || c == '\n';
    let mut start = caret;
    while start > 0 && !is_sep(chars[start - 1]) {
        start -= 1;
    }
    let mut end = caret;
    while end < chars.len() && !is_sep(chars[end]) {
        end += 1;
    }
    (start, end)
}

//! sdprompt-core
//!
//! Language-agnostic editing machinery shared by the prompt editor crates
//! (libhangul, sdprompt).
//!
//! The editor keeps one flat text buffer with char-offset selections. Rendering
//! is delegated to a `Highlighter`, multi-keystroke input to a `Composer`, and
//! candidate ranking to a `Ranker`; the language crates plug those in.
//!
//! Public API:
//! - `CursorEditor` - Event-driven editor state machine
//! - `TextBuffer` / `Selection` - Committed text and caret offsets
//! - `History` - Bounded undo/redo stacks
//! - `Composition` / `Composer` - Pending multi-keystroke character
//! - `Autocomplete` / `CandidateList` / `TagCandidate` - Tag completion overlay
//! - `Surface` - Caret mapping between flat offsets and rendered markup
//! - `EditorSession` - Async wrapper serializing events through a fair lock
//! - `Config` - Configuration and feature flags
use serde::{Deserialize, Serialize};

pub mod buffer;
pub use buffer::{Selection, TextBuffer};

pub mod history;
pub use history::{History, HistoryEntry};

pub mod candidate;
pub use candidate::{CandidateList, TagCandidate};

pub mod composition;
pub use composition::{Composer, Composition, CompositionStep};

pub mod context;
pub use context::{EditorContext, LookupRequest, Overlay, TooltipEvent};

pub mod autocomplete;
pub use autocomplete::{Autocomplete, Query, Ranker};

pub mod surface;
pub use surface::{Node, Surface, SurfacePosition};

pub mod editor;
pub use editor::{CursorEditor, Highlighter, KeyEvent, KeyResult};

pub mod session;
pub use session::{EditorSession, TagSearch};

/// Default cap for each of the undo and redo stacks.
pub const MAX_HISTORY_SIZE: usize = 4096;

/// Generic configuration for the editor core.
///
/// Only language-agnostic options live here. Prompt-specific options belong in
/// `PromptConfig` in the `sdprompt` crate, which flattens this struct.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// Maximum entries kept in each of the undo and redo stacks
    pub history_limit: usize,

    // Autocomplete
    /// Candidates kept after ranking
    pub max_candidates: usize,
    /// Queries shorter than this (in chars) close the overlay without a lookup
    pub min_query_len: usize,
    /// Commit a candidate's redirect target instead of the word when present
    pub commit_redirect: bool,
    /// Strip `{}` / `[]` / `artist:` around the query and restore them on commit
    pub strip_decorations: bool,

    // Tooltips
    /// Lines shown for a multi-line piece tooltip
    pub tooltip_max_lines: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            history_limit: MAX_HISTORY_SIZE,
            max_candidates: 20,
            min_query_len: 1,
            commit_redirect: true,
            strip_decorations: true,
            tooltip_max_lines: 32,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load_toml<P: AsRef<std::path::Path>>(path: P) -> anyhow::Result<Self> {
        use anyhow::Context;
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("read config {}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("parse config {}", path.display()))?;
        Ok(config)
    }

    /// Save configuration to a TOML file.
    pub fn save_toml<P: AsRef<std::path::Path>>(&self, path: P) -> anyhow::Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Load configuration from TOML string.
    pub fn from_toml_str(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Serialize configuration to TOML string.
    pub fn to_toml_string(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}

/// Utility helpers.
pub mod utils {
    use unicode_normalization::UnicodeNormalization;

    /// Non-breaking space, which contenteditable surfaces emit for typed spaces.
    pub const NBSP: char = '\u{a0}';

    /// Whitespace as the prompt grammar sees it: ASCII space or NBSP.
    pub fn is_whitespace(c: char) -> bool {
        c == ' ' || c == NBSP
    }

    /// Char span `[left, right)` of `word` with surrounding prompt whitespace
    /// removed, or `None` if the word is blank.
    pub fn trim_span(word: &[char]) -> Option<(usize, usize)> {
        let left = word.iter().position(|&c| !is_whitespace(c))?;
        let right = word.iter().rposition(|&c| !is_whitespace(c))? + 1;
        Some((left, right))
    }

    /// Compose text into NFC so decomposed Hangul (common in pasted text)
    /// lands in the buffer as precomposed syllables.
    pub fn normalize(s: &str) -> String {
        s.nfc().collect::<String>()
    }

    /// Escape text for inclusion in markup.
    pub fn escape_markup(s: &str) -> String {
        let mut out = String::with_capacity(s.len());
        for ch in s.chars() {
            match ch {
                '<' => out.push_str("&lt;"),
                '>' => out.push_str("&gt;"),
                '&' => out.push_str("&amp;"),
                '"' => out.push_str("&quot;"),
                '\'' => out.push_str("&#39;"),
                _ => out.push(ch),
            }
        }
        out
    }

    /// Number of chars in `s`; all buffer offsets are char offsets.
    pub fn char_len(s: &str) -> usize {
        s.chars().count()
    }

    /// Byte index of char offset `offset` in `s`, clamped to the end.
    pub fn byte_index(s: &str, offset: usize) -> usize {
        s.char_indices()
            .nth(offset)
            .map(|(i, _)| i)
            .unwrap_or(s.len())
    }

    /// Slice `s` by char offsets, clamped to the string.
    pub fn char_slice(s: &str, start: usize, end: usize) -> &str {
        let start = byte_index(s, start);
        let end = byte_index(s, end).max(start);
        &s[start..end]
    }
}

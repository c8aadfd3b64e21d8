//! The prompt editor: the core editor wired with Hangul composition, prompt
//! highlighting and gap-match ranking.

use crate::config::PromptConfig;
use crate::highlight::highlight_prompt;
use crate::library::SharedLibrary;
use crate::parr::SPLIT_TOKEN;
use crate::tooltip::tooltip_text;
use libhangul::{GapMatchRanker, HangulComposer};
use sdprompt_core::{CursorEditor, EditorSession, Highlighter, TagSearch};
use std::sync::Arc;

/// Highlights prompts against a live piece library.
#[derive(Debug, Clone)]
pub struct PromptHighlighter {
    library: SharedLibrary,
    tooltip_max_lines: usize,
}

impl PromptHighlighter {
    pub fn new(library: SharedLibrary, tooltip_max_lines: usize) -> Self {
        Self {
            library,
            tooltip_max_lines,
        }
    }

    pub fn library(&self) -> &SharedLibrary {
        &self.library
    }
}

impl Highlighter for PromptHighlighter {
    fn render(&self, text: &str) -> String {
        highlight_prompt(Some(&*self.library), text)
    }

    fn tooltip(&self, word: &str) -> Option<String> {
        if word != SPLIT_TOKEN && crate::library::reference_body(word).is_none() {
            return None;
        }
        match tooltip_text(Some(&*self.library), word, self.tooltip_max_lines) {
            Ok(text) => Some(text),
            Err(err) => {
                tracing::warn!(error = %err, "no tooltip for hovered word");
                None
            }
        }
    }
}

pub type PromptEditor = CursorEditor<HangulComposer, PromptHighlighter>;

pub type PromptSession<S> = EditorSession<HangulComposer, PromptHighlighter, S>;

/// Build a prompt editor reading `library` live.
pub fn prompt_editor(library: SharedLibrary, config: &PromptConfig) -> PromptEditor {
    let highlighter = PromptHighlighter::new(library, config.base().tooltip_max_lines);
    CursorEditor::with_ranker(
        HangulComposer,
        highlighter,
        Arc::new(GapMatchRanker),
        config.base(),
    )
}

/// Build a prompt editor session running lookups through `search`.
pub fn prompt_session<S: TagSearch>(
    library: SharedLibrary,
    config: &PromptConfig,
    search: S,
) -> PromptSession<S> {
    EditorSession::new(prompt_editor(library, config), search)
}

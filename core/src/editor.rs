//! Event-driven editor state machine.
//!
//! `CursorEditor` owns the committed text, the caret, the pending composition,
//! the undo/redo history and the autocomplete controller. The host feeds it
//! key, composition, paste and mouse events and reads the resulting
//! `EditorContext` after each one.
//!
//! Offsets in the selection are rendered offsets: while a character is being
//! composed it is shown at the composition anchor and the caret sits right
//! after it. Every operation other than composable input, backspace and
//! overlay navigation flushes the composition first, after which rendered and
//! committed offsets coincide.

use crate::autocomplete::{Autocomplete, LookupOrder, Ranker};
use crate::buffer::{line_bounds, offset_down, offset_up, Selection, TextBuffer};
use crate::candidate::TagCandidate;
use crate::composition::{Composer, Composition, CompositionStep};
use crate::context::{EditorContext, TooltipEvent};
use crate::history::{History, HistoryEntry};
use crate::surface::{Surface, SurfacePosition};
use crate::utils::{char_len, escape_markup, normalize};
use crate::Config;
use std::sync::Arc;

/// Rendering seam: turns buffer text into surface markup.
///
/// Implementations must be pure and cheap enough to run on every keystroke,
/// and the text content of the markup must equal the input text so caret
/// offsets map one to one.
pub trait Highlighter {
    fn render(&self, text: &str) -> String;

    /// Hover text for a rendered word, if it has one.
    fn tooltip(&self, _word: &str) -> Option<String> {
        None
    }
}

/// Escapes text without any highlighting.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainMarkup;

impl Highlighter for PlainMarkup {
    fn render(&self, text: &str) -> String {
        escape_markup(text)
    }
}

/// Key event types the editor can process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyEvent {
    /// Character input
    Char(char),
    Backspace,
    /// Forward delete
    Delete,
    Left,
    Right,
    /// Caret up one line, or highlight the previous candidate
    Up,
    /// Caret down one line, or highlight the next candidate
    Down,
    SelectLeft,
    SelectRight,
    SelectUp,
    SelectDown,
    Home,
    End,
    /// Newline, or commit the highlighted candidate
    Enter,
    /// Flush the composition, or close the overlay
    Escape,
    /// Ctrl (or Cmd) + character
    Ctrl(char),
    /// Ctrl + Shift + character
    CtrlShift(char),
}

/// Result of processing an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyResult {
    /// The editor consumed the event
    Handled,
    /// The host should apply its default behavior
    NotHandled,
}

/// State captured at the start of an event to derive its outputs.
struct EventStart {
    committed: String,
    rendered: String,
    selection: Selection,
}

/// Composition-aware text editor.
///
/// Generic over the script-specific `Composer` and the `Highlighter` that
/// renders markup.
pub struct CursorEditor<C: Composer, H: Highlighter> {
    composer: C,
    highlighter: H,
    buffer: TextBuffer,
    selection: Selection,
    /// Fixed end of a keyboard-extended selection
    sel_anchor: usize,
    composition: Composition,
    history: History,
    autocomplete: Autocomplete,
    context: EditorContext,
}

impl<C: Composer, H: Highlighter> CursorEditor<C, H> {
    /// Create an editor that keeps lookup results in lookup order.
    pub fn new(composer: C, highlighter: H, config: &Config) -> Self {
        Self::with_ranker(composer, highlighter, Arc::new(LookupOrder), config)
    }

    /// Create an editor ranking lookup results with `ranker`.
    pub fn with_ranker(
        composer: C,
        highlighter: H,
        ranker: Arc<dyn Ranker>,
        config: &Config,
    ) -> Self {
        let mut editor = Self {
            composer,
            highlighter,
            buffer: TextBuffer::new(),
            selection: Selection::default(),
            sel_anchor: 0,
            composition: Composition::new(),
            history: History::with_limit(config.history_limit),
            autocomplete: Autocomplete::new(ranker, config),
            context: EditorContext::new(),
        };
        editor.refresh();
        editor
    }

    /// Start with `text` and the caret at its end.
    pub fn with_text<T: Into<String>>(mut self, text: T) -> Self {
        self.buffer.set_text(text);
        self.set_caret(self.buffer.len());
        self.refresh();
        self
    }

    /// Get a reference to the context for reading editor state.
    pub fn context(&self) -> &EditorContext {
        &self.context
    }

    /// Get a mutable reference to the context.
    pub fn context_mut(&mut self) -> &mut EditorContext {
        &mut self.context
    }

    /// Committed text.
    pub fn text(&self) -> &str {
        self.buffer.text()
    }

    /// Committed text with the pending character shown at its anchor.
    pub fn rendered_text(&self) -> String {
        if self.composition.is_empty() {
            self.buffer.text().to_string()
        } else {
            let pending = self.composition.assembled(&self.composer);
            self.buffer.with_pending(self.composition.anchor(), &pending)
        }
    }

    pub fn selection(&self) -> Selection {
        self.selection
    }

    pub fn is_composing(&self) -> bool {
        !self.composition.is_empty()
    }

    pub fn composition(&self) -> &Composition {
        &self.composition
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn autocomplete(&self) -> &Autocomplete {
        &self.autocomplete
    }

    pub fn composer(&self) -> &C {
        &self.composer
    }

    pub fn highlighter(&self) -> &H {
        &self.highlighter
    }

    /// Re-render markup and republish state, e.g. after the data the
    /// highlighter reads has changed.
    pub fn refresh(&mut self) {
        let rendered = self.rendered_text();
        self.context.markup = self.highlighter.render(&rendered);
        self.publish(rendered);
    }

    /// Process a key event.
    ///
    /// While the autocomplete overlay is open, Up/Down move the highlighted
    /// candidate, Enter commits it and Escape closes the overlay.
    pub fn process_key(&mut self, key: KeyEvent) -> KeyResult {
        let start = self.begin();
        let result = self.dispatch(key);
        self.finish(start);
        result
    }

    fn dispatch(&mut self, key: KeyEvent) -> KeyResult {
        if self.autocomplete.is_open() {
            match key {
                KeyEvent::Up => {
                    self.autocomplete.cursor_up();
                    return KeyResult::Handled;
                }
                KeyEvent::Down => {
                    self.autocomplete.cursor_down();
                    return KeyResult::Handled;
                }
                KeyEvent::Enter => {
                    self.commit_candidate();
                    return KeyResult::Handled;
                }
                KeyEvent::Escape => {
                    self.autocomplete.close();
                    return KeyResult::Handled;
                }
                _ => {}
            }
        }

        match key {
            KeyEvent::Char(ch) => {
                self.push_history();
                self.delete_selection();
                self.feed(ch);
            }
            KeyEvent::Backspace => self.backspace(),
            KeyEvent::Delete => self.delete_forward(),
            KeyEvent::Left => {
                self.flush_composition();
                let to = if self.selection.is_collapsed() {
                    self.selection.end.saturating_sub(1)
                } else {
                    self.selection.start
                };
                self.set_caret(to);
            }
            KeyEvent::Right => {
                self.flush_composition();
                let to = if self.selection.is_collapsed() {
                    (self.selection.end + 1).min(self.buffer.len())
                } else {
                    self.selection.end
                };
                self.set_caret(to);
            }
            KeyEvent::Up => self.move_caret(offset_up),
            KeyEvent::Down => self.move_caret(offset_down),
            KeyEvent::SelectLeft => self.extend_selection(|_, o| o.saturating_sub(1)),
            KeyEvent::SelectRight => self.extend_selection(|t, o| (o + 1).min(char_len(t))),
            KeyEvent::SelectUp => self.extend_selection(offset_up),
            KeyEvent::SelectDown => self.extend_selection(offset_down),
            KeyEvent::Home => self.move_caret(|t, o| line_bounds(t, o).0),
            KeyEvent::End => self.move_caret(|t, o| line_bounds(t, o).1),
            KeyEvent::Enter => {
                self.push_history();
                self.flush_composition();
                self.delete_selection();
                let at = self.selection.end;
                self.buffer.insert(at, "\n");
                self.set_caret(at + 1);
            }
            KeyEvent::Escape => {
                self.flush_composition();
            }
            KeyEvent::Ctrl(ch) => return self.shortcut(ch, false),
            KeyEvent::CtrlShift(ch) => return self.shortcut(ch, true),
        }
        KeyResult::Handled
    }

    fn shortcut(&mut self, ch: char, shift: bool) -> KeyResult {
        match (ch.to_ascii_lowercase(), shift) {
            ('z', false) => {
                self.undo_inner();
            }
            ('z', true) | ('y', false) => {
                self.redo_inner();
            }
            ('x', false) => self.cut(),
            ('c', false) => self.copy(),
            ('a', false) => {
                self.flush_composition();
                self.selection = Selection::new(0, self.buffer.len());
                self.sel_anchor = 0;
            }
            _ => return KeyResult::NotHandled,
        }
        KeyResult::Handled
    }

    /// Composition update from a platform input method. Each char of `data`
    /// is fed as if typed.
    pub fn composition_update(&mut self, data: &str) -> KeyResult {
        if data.is_empty() {
            return KeyResult::NotHandled;
        }
        let start = self.begin();
        self.push_history();
        self.delete_selection();
        for ch in data.chars() {
            self.feed(ch);
        }
        self.finish(start);
        KeyResult::Handled
    }

    /// Text about to be inserted by the platform. Composable input arrives
    /// through key events instead and is left to them.
    pub fn before_input(&mut self, data: &str) -> KeyResult {
        if data.is_empty() || data.chars().any(|c| self.composer.is_composable(c)) {
            return KeyResult::NotHandled;
        }
        let start = self.begin();
        self.insert_text(data);
        self.finish(start);
        KeyResult::Handled
    }

    /// Paste `text` over the selection. The text is NFC-normalized.
    pub fn paste(&mut self, text: &str) -> KeyResult {
        let start = self.begin();
        let text = normalize(text);
        self.insert_text(&text);
        self.finish(start);
        KeyResult::Handled
    }

    /// A mouse-down anywhere in the window commits the composition.
    pub fn window_mouse_down(&mut self) -> KeyResult {
        let start = self.begin();
        self.flush_composition();
        self.finish(start);
        KeyResult::Handled
    }

    /// Commit the pending composition, if any.
    pub fn flush(&mut self) -> bool {
        let start = self.begin();
        let flushed = self.flush_composition();
        self.finish(start);
        flushed
    }

    /// Place the selection. `anchor` stays fixed for keyboard extension.
    pub fn set_selection(&mut self, anchor: usize, focus: usize) {
        let start = self.begin();
        self.flush_composition();
        let len = self.buffer.len();
        self.selection = Selection::new(anchor.min(len), focus.min(len));
        self.sel_anchor = anchor.min(len);
        self.finish(start);
    }

    /// Place the selection from surface positions.
    pub fn select_surface(&mut self, anchor: &SurfacePosition, focus: &SurfacePosition) {
        let surface = self.surface();
        let anchor = surface.offset_from_surface_position(anchor);
        let focus = surface.offset_from_surface_position(focus);
        self.set_selection(anchor, focus);
    }

    /// Current markup as a surface tree.
    pub fn surface(&self) -> Surface {
        Surface::from_markup(&self.context.markup)
    }

    /// Surface positions of the selection endpoints, for re-applying the caret
    /// after the host renders new markup.
    pub fn surface_selection(&self) -> (SurfacePosition, SurfacePosition) {
        self.surface().surface_selection(self.selection)
    }

    /// Replace the whole text from outside (e.g. the host's value changed).
    /// Not recorded in history.
    pub fn set_text(&mut self, text: &str) {
        if self.composition.is_empty() && self.buffer.text() == text {
            return;
        }
        let start = self.begin();
        self.composition.clear();
        self.buffer.set_text(text);
        let sel = self.selection.clamp(self.buffer.len());
        self.selection = sel;
        self.sel_anchor = self.sel_anchor.min(self.buffer.len());
        self.finish(start);
    }

    /// Undo the last edit. Returns false if there was nothing to undo.
    pub fn undo(&mut self) -> bool {
        let start = self.begin();
        let undone = self.undo_inner();
        self.finish(start);
        undone
    }

    /// Redo the last undone edit. Returns false if there was nothing to redo.
    pub fn redo(&mut self) -> bool {
        let start = self.begin();
        let redone = self.redo_inner();
        self.finish(start);
        redone
    }

    /// Apply tag lookup results. Stale responses are discarded.
    pub fn apply_lookup(&mut self, id: u64, results: Vec<TagCandidate>) -> bool {
        self.context.clear_transient();
        let applied = self.autocomplete.apply(id, results);
        self.context.overlay = self.autocomplete.overlay();
        applied
    }

    /// A tag lookup failed.
    pub fn fail_lookup(&mut self, id: u64) -> bool {
        self.context.clear_transient();
        let closed = self.autocomplete.fail(id);
        self.context.overlay = self.autocomplete.overlay();
        closed
    }

    /// Hover over a rendered word at screen position `(x, y)`.
    pub fn hover(&mut self, word: &str, x: f32, y: f32) {
        self.context.clear_transient();
        if let Some(text) = self.highlighter.tooltip(word.trim()) {
            self.context.tooltip = Some(TooltipEvent::Show { text, x, y });
        }
    }

    /// Hover over the rendered span covering `offset`.
    pub fn hover_at(&mut self, offset: usize, x: f32, y: f32) {
        match self.surface().span_at(offset) {
            Some(span) => self.hover(&span.text, x, y),
            None => self.context.clear_transient(),
        }
    }

    pub fn hover_out(&mut self) {
        self.context.clear_transient();
        self.context.tooltip = Some(TooltipEvent::Clear);
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    fn begin(&mut self) -> EventStart {
        self.context.clear_transient();
        EventStart {
            committed: self.buffer.text().to_string(),
            rendered: self.rendered_text(),
            selection: self.selection,
        }
    }

    fn finish(&mut self, start: EventStart) {
        let rendered = self.rendered_text();
        let text_changed = rendered != start.rendered;
        if text_changed {
            self.context.lookup = self.autocomplete.observe(&rendered, self.selection);
            self.context.markup = self.highlighter.render(&rendered);
        } else if self.selection != start.selection {
            self.autocomplete.close();
        }
        self.context.changed = self.buffer.text() != start.committed;
        if self.context.changed {
            tracing::debug!(len = self.buffer.len(), "committed text changed");
        }
        self.publish(rendered);
    }

    fn publish(&mut self, rendered: String) {
        self.context.text = rendered;
        self.context.committed = self.buffer.text().to_string();
        self.context.selection = self.selection;
        self.context.overlay = self.autocomplete.overlay();
    }

    fn set_caret(&mut self, offset: usize) {
        self.selection = Selection::caret(offset);
        self.sel_anchor = offset;
    }

    fn snapshot(&self) -> HistoryEntry {
        HistoryEntry::new(
            self.rendered_text(),
            self.selection,
            self.composition.symbols().to_vec(),
        )
    }

    fn push_history(&mut self) {
        let entry = self.snapshot();
        self.history.push(entry);
    }

    fn restore(&mut self, entry: HistoryEntry) {
        self.composition.clear();
        self.buffer.set_text(entry.text);
        let sel = entry.selection.clamp(self.buffer.len());
        self.selection = sel;
        self.sel_anchor = sel.start;
    }

    fn undo_inner(&mut self) -> bool {
        let current = self.snapshot();
        match self.history.undo(current) {
            Some(entry) => {
                self.restore(entry);
                tracing::debug!(
                    undo = self.history.undo_len(),
                    redo = self.history.redo_len(),
                    "undo"
                );
                true
            }
            None => false,
        }
    }

    fn redo_inner(&mut self) -> bool {
        let current = self.snapshot();
        match self.history.redo(current) {
            Some(entry) => {
                self.restore(entry);
                tracing::debug!(
                    undo = self.history.undo_len(),
                    redo = self.history.redo_len(),
                    "redo"
                );
                true
            }
            None => false,
        }
    }

    /// Commit the pending character in place. The caret does not move.
    fn flush_composition(&mut self) -> bool {
        if self.composition.is_empty() {
            return false;
        }
        let anchor = self.composition.anchor();
        let text = self.composition.take(&self.composer);
        self.buffer.insert(anchor, &text);
        tracing::debug!(composer = self.composer.name(), %text, "composition flushed");
        true
    }

    fn delete_selection(&mut self) -> bool {
        if self.selection.is_collapsed() {
            return false;
        }
        self.flush_composition();
        let Selection { start, end } = self.selection;
        self.buffer.remove(start, end);
        self.set_caret(start);
        true
    }

    /// Feed one typed char at the caret.
    fn feed(&mut self, ch: char) {
        if self.composer.is_composable(ch) {
            if self.composition.is_empty() {
                self.composition.begin(self.selection.end);
            }
            let anchor = self.composition.anchor();
            if let CompositionStep::Overflow { committed, .. } =
                self.composition.push(&self.composer, ch)
            {
                self.buffer.insert(anchor, &committed);
            }
            self.set_caret(self.composition.anchor() + 1);
        } else {
            self.flush_composition();
            let at = self.selection.end;
            let mut utf8 = [0u8; 4];
            self.buffer.insert(at, ch.encode_utf8(&mut utf8));
            self.set_caret(at + 1);
        }
    }

    fn insert_text(&mut self, text: &str) {
        self.push_history();
        self.flush_composition();
        self.delete_selection();
        let at = self.selection.end;
        self.buffer.insert(at, text);
        self.set_caret(at + char_len(text));
    }

    fn backspace(&mut self) {
        if !self.selection.is_collapsed() {
            self.push_history();
            self.delete_selection();
            return;
        }
        let caret = self.selection.end;
        if caret == 0 {
            return;
        }
        self.push_history();
        if !self.composition.is_empty() {
            if self.composition.pop(&self.composer).is_empty() {
                self.set_caret(self.composition.anchor());
            }
        } else {
            self.buffer.remove(caret - 1, caret);
            self.set_caret(caret - 1);
        }
    }

    fn delete_forward(&mut self) {
        self.flush_composition();
        if !self.selection.is_collapsed() {
            self.push_history();
            self.delete_selection();
            return;
        }
        let caret = self.selection.end;
        if caret < self.buffer.len() {
            self.push_history();
            self.buffer.remove(caret, caret + 1);
        }
    }

    fn move_caret(&mut self, motion: fn(&str, usize) -> usize) {
        self.flush_composition();
        let to = motion(self.buffer.text(), self.selection.end);
        self.set_caret(to);
    }

    fn extend_selection(&mut self, motion: fn(&str, usize) -> usize) {
        self.flush_composition();
        let focus = if self.selection.start == self.sel_anchor {
            self.selection.end
        } else {
            self.selection.start
        };
        let focus = motion(self.buffer.text(), focus);
        self.selection = Selection::new(self.sel_anchor, focus);
    }

    fn cut(&mut self) {
        self.flush_composition();
        if self.selection.is_collapsed() {
            return;
        }
        self.push_history();
        let Selection { start, end } = self.selection;
        self.context.clipboard = Some(self.buffer.slice(start, end).to_string());
        self.delete_selection();
    }

    fn copy(&mut self) {
        self.flush_composition();
        if !self.selection.is_collapsed() {
            let Selection { start, end } = self.selection;
            self.context.clipboard = Some(self.buffer.slice(start, end).to_string());
        }
    }

    fn commit_candidate(&mut self) {
        self.flush_composition();
        let Some((start, end, replacement)) = self.autocomplete.commit() else {
            self.autocomplete.close();
            return;
        };
        self.push_history();
        self.buffer.replace(start, end, &replacement);
        self.set_caret(start + char_len(&replacement));
        let text = self.buffer.text().to_string();
        self.autocomplete.settle(&text, self.selection);
        tracing::debug!(%replacement, "candidate committed");
    }
}

impl<C: Composer, H: Highlighter> std::fmt::Debug for CursorEditor<C, H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CursorEditor")
            .field("text", &self.buffer.text())
            .field("selection", &self.selection)
            .field("composition", &self.composition)
            .field("autocomplete", &self.autocomplete)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Uppercase letters compose in pairs into the lowercase of the first.
    struct PairComposer;

    impl Composer for PairComposer {
        fn is_composable(&self, ch: char) -> bool {
            ch.is_ascii_uppercase()
        }

        fn assemble(&self, symbols: &[char]) -> String {
            symbols
                .chunks(2)
                .map(|c| {
                    if c.len() == 2 {
                        c[0].to_ascii_lowercase()
                    } else {
                        c[0]
                    }
                })
                .collect()
        }
    }

    /// Wraps `<...>` words and knows one tooltip.
    struct TestMarkup;

    impl Highlighter for TestMarkup {
        fn render(&self, text: &str) -> String {
            text.split(',')
                .map(|w| {
                    if w.trim().starts_with('<') {
                        format!("<span class=\"syntax-wildcard\">{}</span>", escape_markup(w))
                    } else {
                        escape_markup(w)
                    }
                })
                .collect::<Vec<_>>()
                .join(",")
        }

        fn tooltip(&self, word: &str) -> Option<String> {
            (word == "<a.b>").then(|| "expanded".to_string())
        }
    }

    type Editor = CursorEditor<PairComposer, TestMarkup>;

    fn editor() -> Editor {
        CursorEditor::new(PairComposer, TestMarkup, &Config::default())
    }

    fn type_str(ed: &mut Editor, s: &str) {
        for ch in s.chars() {
            ed.process_key(KeyEvent::Char(ch));
        }
    }

    #[test]
    fn test_plain_typing() {
        let mut ed = editor();
        type_str(&mut ed, "ab");
        assert_eq!(ed.text(), "ab");
        assert_eq!(ed.selection(), Selection::caret(2));
        assert!(ed.context().changed);
        assert_eq!(ed.context().committed, "ab");
    }

    #[test]
    fn test_composition_pending_and_overflow() {
        let mut ed = editor().with_text("x");
        ed.process_key(KeyEvent::Char('A'));
        assert_eq!(ed.text(), "x");
        assert_eq!(ed.context().text, "xA");
        assert!(!ed.context().changed);
        ed.process_key(KeyEvent::Char('B'));
        assert_eq!(ed.context().text, "xa");
        ed.process_key(KeyEvent::Char('C'));
        assert_eq!(ed.text(), "xa");
        assert_eq!(ed.context().text, "xaC");
        assert_eq!(ed.selection(), Selection::caret(3));
        assert!(ed.context().changed);
    }

    #[test]
    fn test_non_composable_flushes() {
        let mut ed = editor();
        type_str(&mut ed, "AB,");
        assert_eq!(ed.text(), "a,");
        assert!(!ed.is_composing());
        assert_eq!(ed.selection(), Selection::caret(2));
    }

    #[test]
    fn test_backspace_while_composing() {
        let mut ed = editor().with_text("x");
        type_str(&mut ed, "AB");
        ed.process_key(KeyEvent::Backspace);
        assert_eq!(ed.context().text, "xA");
        assert_eq!(ed.selection(), Selection::caret(2));
        ed.process_key(KeyEvent::Backspace);
        assert_eq!(ed.context().text, "x");
        assert_eq!(ed.selection(), Selection::caret(1));
        assert!(!ed.is_composing());
    }

    #[test]
    fn test_window_mouse_down_flushes() {
        let mut ed = editor();
        type_str(&mut ed, "AB");
        ed.window_mouse_down();
        assert_eq!(ed.text(), "a");
        assert!(ed.context().changed);
    }

    #[test]
    fn test_undo_redo_inverse() {
        let mut ed = editor();
        type_str(&mut ed, "ab");
        ed.process_key(KeyEvent::Enter);
        let after = (ed.rendered_text(), ed.selection());
        assert!(ed.undo());
        assert_eq!(ed.text(), "ab");
        assert_eq!(ed.selection(), Selection::caret(2));
        assert!(ed.redo());
        assert_eq!((ed.rendered_text(), ed.selection()), after);
        assert!(!ed.redo());
    }

    #[test]
    fn test_undo_with_ctrl_keys() {
        let mut ed = editor();
        type_str(&mut ed, "a");
        assert_eq!(ed.process_key(KeyEvent::Ctrl('z')), KeyResult::Handled);
        assert_eq!(ed.text(), "");
        ed.process_key(KeyEvent::CtrlShift('Z'));
        assert_eq!(ed.text(), "a");
        assert_eq!(ed.process_key(KeyEvent::Ctrl('q')), KeyResult::NotHandled);
    }

    #[test]
    fn test_undo_restores_composed_text() {
        let mut ed = editor();
        type_str(&mut ed, "A");
        type_str(&mut ed, "B");
        assert!(ed.undo());
        assert_eq!(ed.text(), "A");
        assert!(!ed.is_composing());
    }

    #[test]
    fn test_cut_and_copy() {
        let mut ed = editor().with_text("hello");
        ed.set_selection(1, 4);
        ed.process_key(KeyEvent::Ctrl('c'));
        assert_eq!(ed.context().clipboard.as_deref(), Some("ell"));
        assert_eq!(ed.text(), "hello");
        ed.process_key(KeyEvent::Ctrl('x'));
        assert_eq!(ed.context().clipboard.as_deref(), Some("ell"));
        assert_eq!(ed.text(), "ho");
        assert_eq!(ed.selection(), Selection::caret(1));
    }

    #[test]
    fn test_select_extension_and_typing_replaces() {
        let mut ed = editor().with_text("abcd");
        ed.set_selection(2, 2);
        ed.process_key(KeyEvent::SelectLeft);
        ed.process_key(KeyEvent::SelectLeft);
        assert_eq!(ed.selection(), Selection::new(0, 2));
        ed.process_key(KeyEvent::SelectRight);
        assert_eq!(ed.selection(), Selection::new(1, 2));
        ed.process_key(KeyEvent::Char('z'));
        assert_eq!(ed.text(), "azcd");
    }

    #[test]
    fn test_home_end_and_vertical() {
        let mut ed = editor().with_text("ab\ncdef");
        ed.process_key(KeyEvent::Home);
        assert_eq!(ed.selection(), Selection::caret(3));
        ed.process_key(KeyEvent::Up);
        assert_eq!(ed.selection(), Selection::caret(0));
        ed.process_key(KeyEvent::End);
        assert_eq!(ed.selection(), Selection::caret(2));
    }

    #[test]
    fn test_delete_forward() {
        let mut ed = editor().with_text("abc");
        ed.set_selection(1, 1);
        ed.process_key(KeyEvent::Delete);
        assert_eq!(ed.text(), "ac");
        ed.set_selection(2, 2);
        ed.process_key(KeyEvent::Delete);
        assert_eq!(ed.text(), "ac");
    }

    #[test]
    fn test_paste_normalizes() {
        let mut ed = editor().with_text("x");
        ed.paste("\u{1112}\u{1161}\u{11ab}");
        assert_eq!(ed.text(), "x한");
        assert_eq!(ed.selection(), Selection::caret(2));
    }

    #[test]
    fn test_before_input_defers_composable() {
        let mut ed = editor();
        assert_eq!(ed.before_input("A"), KeyResult::NotHandled);
        assert_eq!(ed.before_input("ok"), KeyResult::Handled);
        assert_eq!(ed.text(), "ok");
    }

    #[test]
    fn test_overlay_navigation_and_commit() {
        let mut ed = editor().with_text("solo, ");
        type_str(&mut ed, "{bl");
        let req = ed.context().lookup.clone().unwrap();
        assert_eq!(req.query, "bl");
        ed.apply_lookup(
            req.id,
            vec![TagCandidate::new("black hair"), TagCandidate::new("blush")],
        );
        assert!(ed.context().overlay_open());

        ed.process_key(KeyEvent::Down);
        assert_eq!(ed.context().overlay.as_ref().unwrap().cursor, 1);
        ed.process_key(KeyEvent::Enter);
        assert_eq!(ed.text(), "solo, {blush");
        assert!(!ed.context().overlay_open());
        assert!(ed.context().lookup.is_none());
    }

    #[test]
    fn test_escape_closes_overlay_first() {
        let mut ed = editor();
        type_str(&mut ed, "re");
        let id = ed.context().lookup.as_ref().unwrap().id;
        ed.apply_lookup(id, vec![TagCandidate::new("red")]);
        ed.process_key(KeyEvent::Escape);
        assert!(!ed.context().overlay_open());
        assert_eq!(ed.text(), "re");
        ed.process_key(KeyEvent::Enter);
        assert_eq!(ed.text(), "re\n");
    }

    #[test]
    fn test_caret_move_closes_overlay() {
        let mut ed = editor();
        type_str(&mut ed, "re");
        let id = ed.context().lookup.as_ref().unwrap().id;
        ed.apply_lookup(id, vec![TagCandidate::new("red")]);
        ed.process_key(KeyEvent::Left);
        assert!(!ed.context().overlay_open());
        assert!(!ed.apply_lookup(id, vec![TagCandidate::new("red")]));
    }

    #[test]
    fn test_hover_emits_tooltip() {
        let mut ed = editor().with_text("x,<a.b>");
        ed.hover_at(4, 1.0, 2.0);
        assert_eq!(
            ed.context().tooltip,
            Some(TooltipEvent::Show {
                text: "expanded".into(),
                x: 1.0,
                y: 2.0
            })
        );
        ed.hover_out();
        assert_eq!(ed.context().tooltip, Some(TooltipEvent::Clear));
        ed.hover("x", 0.0, 0.0);
        assert!(ed.context().tooltip.is_none());
    }

    #[test]
    fn test_select_surface_round_trip() {
        let mut ed = editor().with_text("x,<a.b>");
        ed.set_selection(1, 5);
        let (a, f) = ed.surface_selection();
        ed.set_selection(0, 0);
        ed.select_surface(&a, &f);
        assert_eq!(ed.selection(), Selection::new(1, 5));
    }

    #[test]
    fn test_set_text_not_in_history() {
        let mut ed = editor();
        ed.set_text("external");
        assert_eq!(ed.text(), "external");
        assert!(!ed.history().can_undo());
    }
}

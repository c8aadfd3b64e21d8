//! Editor context for host communication.
//!
//! The `EditorContext` struct is a plain data container. After each event the
//! host reads these fields to update the rendered surface, persist the text,
//! issue tag lookups and show the autocomplete overlay or tooltips.

use crate::buffer::Selection;
use crate::candidate::TagCandidate;

/// A tag lookup the host should run asynchronously.
///
/// `id` increases monotonically; only the result for the latest id is applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupRequest {
    pub id: u64,
    pub query: String,
}

/// Autocomplete overlay state.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Overlay {
    /// Ranked candidates, best first
    pub candidates: Vec<TagCandidate>,
    /// Highlighted candidate index
    pub cursor: usize,
    /// Caret offset the overlay is anchored at
    pub anchor: usize,
}

/// Tooltip channel output.
#[derive(Debug, Clone, PartialEq)]
pub enum TooltipEvent {
    Show { text: String, x: f32, y: f32 },
    Clear,
}

/// Editor context for host communication.
///
/// - `markup`: highlighted rendering of `text`
/// - `text`: committed text plus any pending composed char, as rendered
/// - `committed`: committed text (what the host persists)
/// - `selection`: caret offsets into `text`
/// - `changed`: whether `committed` changed during the last event
/// - `clipboard`: text produced by cut/copy during the last event
/// - `lookup`: tag lookup to issue, if the current word changed
/// - `overlay`: autocomplete overlay, `None` when closed
/// - `tooltip`: tooltip event produced by hover handling
#[derive(Debug, Clone, Default)]
pub struct EditorContext {
    pub markup: String,
    pub text: String,
    pub committed: String,
    pub selection: Selection,
    pub changed: bool,
    pub clipboard: Option<String>,
    pub lookup: Option<LookupRequest>,
    pub overlay: Option<Overlay>,
    pub tooltip: Option<TooltipEvent>,
}

impl EditorContext {
    /// Create a new empty context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset the per-event outputs. Rendered state is kept.
    pub fn clear_transient(&mut self) {
        self.changed = false;
        self.clipboard = None;
        self.lookup = None;
        self.tooltip = None;
    }

    /// Take the pending lookup request, if any.
    pub fn take_lookup(&mut self) -> Option<LookupRequest> {
        self.lookup.take()
    }

    /// Whether the autocomplete overlay is shown.
    pub fn overlay_open(&self) -> bool {
        self.overlay.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clear_transient_keeps_render_state() {
        let mut ctx = EditorContext::new();
        ctx.markup = "a".into();
        ctx.changed = true;
        ctx.clipboard = Some("x".into());
        ctx.lookup = Some(LookupRequest { id: 1, query: "a".into() });
        ctx.overlay = Some(Overlay::default());
        ctx.clear_transient();
        assert_eq!(ctx.markup, "a");
        assert!(!ctx.changed);
        assert!(ctx.clipboard.is_none());
        assert!(ctx.lookup.is_none());
        assert!(ctx.overlay_open());
    }
}

//! Async editor session.
//!
//! Host event callbacks may fire concurrently (composition and key events can
//! race). `EditorSession` serializes them through one FIFO-fair async lock
//! around the editor. Each handler runs under the lock, yields one tick for
//! the host to lay out the new markup before the caret is re-applied, and
//! spawns the tag lookup it produced without awaiting it. Lookup completion
//! re-acquires the lock; the editor discards stale responses by request id.

use crate::candidate::TagCandidate;
use crate::composition::Composer;
use crate::context::{EditorContext, LookupRequest};
use crate::editor::{CursorEditor, Highlighter, KeyEvent, KeyResult};
use std::future::Future;
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::task::JoinSet;

/// Asynchronous tag lookup. May be called faster than it resolves.
pub trait TagSearch: Send + Sync + 'static {
    fn search(
        &self,
        query: String,
    ) -> impl Future<Output = anyhow::Result<Vec<TagCandidate>>> + Send;
}

/// Editor behind a fair async lock, with spawned tag lookups.
pub struct EditorSession<C, H, S>
where
    C: Composer + Send + 'static,
    H: Highlighter + Send + 'static,
    S: TagSearch,
{
    editor: Arc<Mutex<CursorEditor<C, H>>>,
    search: Arc<S>,
    lookups: Mutex<JoinSet<()>>,
}

impl<C, H, S> EditorSession<C, H, S>
where
    C: Composer + Send + 'static,
    H: Highlighter + Send + 'static,
    S: TagSearch,
{
    pub fn new(editor: CursorEditor<C, H>, search: S) -> Self {
        Self {
            editor: Arc::new(Mutex::new(editor)),
            search: Arc::new(search),
            lookups: Mutex::new(JoinSet::new()),
        }
    }

    /// Shared handle to the editor.
    pub fn editor(&self) -> Arc<Mutex<CursorEditor<C, H>>> {
        Arc::clone(&self.editor)
    }

    /// Snapshot of the editor context.
    pub async fn context(&self) -> EditorContext {
        self.editor.lock().await.context().clone()
    }

    pub async fn process_key(&self, key: KeyEvent) -> (KeyResult, EditorContext) {
        self.run(|ed| ed.process_key(key)).await
    }

    pub async fn composition_update(&self, data: &str) -> (KeyResult, EditorContext) {
        self.run(|ed| ed.composition_update(data)).await
    }

    pub async fn before_input(&self, data: &str) -> (KeyResult, EditorContext) {
        self.run(|ed| ed.before_input(data)).await
    }

    pub async fn paste(&self, text: &str) -> (KeyResult, EditorContext) {
        self.run(|ed| ed.paste(text)).await
    }

    pub async fn window_mouse_down(&self) -> (KeyResult, EditorContext) {
        self.run(|ed| ed.window_mouse_down()).await
    }

    pub async fn set_selection(&self, anchor: usize, focus: usize) -> EditorContext {
        self.run(|ed| ed.set_selection(anchor, focus)).await.1
    }

    pub async fn set_text(&self, text: &str) -> EditorContext {
        self.run(|ed| ed.set_text(text)).await.1
    }

    pub async fn undo(&self) -> (bool, EditorContext) {
        self.run(|ed| ed.undo()).await
    }

    pub async fn redo(&self) -> (bool, EditorContext) {
        self.run(|ed| ed.redo()).await
    }

    pub async fn flush(&self) -> (bool, EditorContext) {
        self.run(|ed| ed.flush()).await
    }

    /// Wait for every spawned lookup to finish.
    pub async fn settle(&self) {
        let mut lookups = self.lookups.lock().await;
        while let Some(joined) = lookups.join_next().await {
            if let Err(err) = joined {
                tracing::warn!(error = %err, "tag lookup task aborted");
            }
        }
    }

    async fn run<R>(
        &self,
        handler: impl FnOnce(&mut CursorEditor<C, H>) -> R,
    ) -> (R, EditorContext) {
        let (result, context, lookup) = {
            let mut editor = self.editor.lock().await;
            let result = handler(&mut editor);
            let context = editor.context().clone();
            let lookup = editor.context_mut().take_lookup();
            // Caret re-application waits for the host to render the markup.
            tokio::task::yield_now().await;
            (result, context, lookup)
        };
        if let Some(request) = lookup {
            self.spawn_lookup(request).await;
        }
        (result, context)
    }

    async fn spawn_lookup(&self, request: LookupRequest) {
        let editor = Arc::clone(&self.editor);
        let search = Arc::clone(&self.search);
        let LookupRequest { id, query } = request;
        let mut lookups = self.lookups.lock().await;
        // Reap finished lookups so the set only holds in-flight ones.
        while let Some(joined) = lookups.try_join_next() {
            if let Err(err) = joined {
                tracing::warn!(error = %err, "tag lookup task aborted");
            }
        }
        lookups.spawn(async move {
            match search.search(query).await {
                Ok(results) => {
                    let mut editor = editor.lock().await;
                    if !editor.apply_lookup(id, results) {
                        tracing::debug!(id, "tag lookup superseded");
                    }
                }
                Err(err) => {
                    tracing::warn!(id, error = %err, "tag lookup failed");
                    editor.lock().await.fail_lookup(id);
                }
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::composition::Composer;
    use crate::editor::PlainMarkup;
    use crate::Config;
    use std::time::Duration;

    struct NoCompose;

    impl Composer for NoCompose {
        fn is_composable(&self, _ch: char) -> bool {
            false
        }

        fn assemble(&self, symbols: &[char]) -> String {
            symbols.iter().collect()
        }
    }

    /// Answers after a delay that depends on the query length.
    struct DelayedSearch;

    impl TagSearch for DelayedSearch {
        fn search(
            &self,
            query: String,
        ) -> impl Future<Output = anyhow::Result<Vec<TagCandidate>>> + Send {
            async move {
                let delay = match query.len() {
                    1 => 30,
                    2 => 40,
                    _ => 10,
                };
                tokio::time::sleep(Duration::from_millis(delay)).await;
                if query == "x" {
                    anyhow::bail!("backend unavailable");
                }
                Ok(vec![TagCandidate::new(format!("{query} tag"))])
            }
        }
    }

    fn session() -> EditorSession<NoCompose, PlainMarkup, DelayedSearch> {
        let editor = CursorEditor::new(NoCompose, PlainMarkup, &Config::default());
        EditorSession::new(editor, DelayedSearch)
    }

    #[tokio::test(start_paused = true)]
    async fn test_out_of_order_lookups_show_latest_only() {
        let s = session();
        for ch in "red".chars() {
            s.process_key(KeyEvent::Char(ch)).await;
        }
        // "red" resolves first, then "r", then "re"
        s.settle().await;
        let ctx = s.context().await;
        let overlay = ctx.overlay.expect("overlay open");
        assert_eq!(overlay.candidates.len(), 1);
        assert_eq!(overlay.candidates[0].word, "red tag");
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_lookup_closes_overlay() {
        let s = session();
        s.process_key(KeyEvent::Char('x')).await;
        s.settle().await;
        assert!(s.context().await.overlay.is_none());
        assert_eq!(s.context().await.committed, "x");
    }

    /// Answers immediately with one tag.
    struct InstantSearch;

    impl TagSearch for InstantSearch {
        fn search(
            &self,
            query: String,
        ) -> impl Future<Output = anyhow::Result<Vec<TagCandidate>>> + Send {
            async move { Ok(vec![TagCandidate::new(query)]) }
        }
    }

    #[tokio::test]
    async fn test_finished_lookups_are_reaped() {
        let editor = CursorEditor::new(NoCompose, PlainMarkup, &Config::default());
        let s = EditorSession::new(editor, InstantSearch);
        for _ in 0..500 {
            s.process_key(KeyEvent::Char('a')).await;
            for _ in 0..4 {
                tokio::task::yield_now().await;
            }
        }
        assert!(s.lookups.lock().await.len() <= 2);
        s.settle().await;
        assert_eq!(s.context().await.committed.chars().count(), 500);
    }

    #[tokio::test]
    async fn test_waiting_events_apply_in_arrival_order() {
        let s = Arc::new(session());
        let editor = s.editor();
        let held = editor.lock().await;
        let mut handles = Vec::new();
        for ch in ['d', 'a', 'c', 'b'] {
            let s = Arc::clone(&s);
            handles.push(tokio::spawn(async move {
                s.before_input(&ch.to_string()).await;
            }));
            // Let the task run until it queues on the editor lock.
            for _ in 0..4 {
                tokio::task::yield_now().await;
            }
        }
        drop(held);
        for h in handles {
            h.await.unwrap();
        }
        assert_eq!(s.context().await.committed, "dacb");
    }

    #[tokio::test]
    async fn test_events_are_serialized() {
        let s = Arc::new(session());
        let mut handles = Vec::new();
        for ch in ['a', 'b', 'c', 'd'] {
            let s = Arc::clone(&s);
            handles.push(tokio::spawn(async move {
                s.before_input(&ch.to_string()).await;
            }));
        }
        for h in handles {
            h.await.unwrap();
        }
        let ctx = s.context().await;
        assert_eq!(ctx.committed.chars().count(), 4);
        assert_eq!(ctx.selection.end, 4);
    }
}

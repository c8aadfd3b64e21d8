//! Pending composition of a multi-keystroke character.
//!
//! Raw input symbols (e.g. Hangul jamo) accumulate in the composition buffer
//! and are assembled into one displayable character by a `Composer`. The
//! pending character renders at `anchor`, a char offset into the committed
//! text; it only becomes part of the committed text when the composition
//! overflows into a second character, or when it is flushed.

/// Script-specific assembly of raw input symbols.
pub trait Composer {
    /// Whether `ch` is a raw symbol that enters composition.
    fn is_composable(&self, ch: char) -> bool;

    /// Assemble raw symbols into displayable text. Must be deterministic, and
    /// assembling a prefix of the input must never yield more chars than
    /// assembling the whole input.
    fn assemble(&self, symbols: &[char]) -> String;

    /// Raw symbols typed to produce `ch`. Precomposed input may stand for
    /// several symbols; by default a char is its own single symbol.
    fn keystrokes(&self, ch: char) -> Vec<char> {
        vec![ch]
    }

    /// Human-readable name (for logging).
    fn name(&self) -> &'static str {
        "composer"
    }
}

/// Outcome of appending a symbol to the composition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompositionStep {
    /// The symbols still assemble to a single pending character.
    Pending(String),
    /// The pending character overflowed. `committed` must be inserted into
    /// the committed text at the anchor; `pending` is the new pending char.
    Overflow { committed: String, pending: String },
}

/// Composition buffer with the committed-text offset of its pending char.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Composition {
    symbols: Vec<char>,
    anchor: usize,
}

impl Composition {
    /// Create a new empty composition.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether no character is being composed.
    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// Raw symbols accumulated so far.
    pub fn symbols(&self) -> &[char] {
        &self.symbols
    }

    /// Committed-text offset the pending character renders at.
    pub fn anchor(&self) -> usize {
        self.anchor
    }

    /// Start composing at `anchor`. Only meaningful while empty.
    pub fn begin(&mut self, anchor: usize) {
        debug_assert!(self.symbols.is_empty());
        self.anchor = anchor;
    }

    /// Assembled form of the pending symbols.
    pub fn assembled<C: Composer + ?Sized>(&self, composer: &C) -> String {
        if self.symbols.is_empty() {
            String::new()
        } else {
            composer.assemble(&self.symbols)
        }
    }

    /// Append a raw symbol, expanded into its keystrokes.
    ///
    /// When the symbols assemble to two or more chars, every char but the last
    /// is committed: the buffer keeps only the shortest suffix of symbols that
    /// follows a prefix assembling exactly to the committed text, and the
    /// anchor advances past the committed chars.
    pub fn push<C: Composer + ?Sized>(&mut self, composer: &C, symbol: char) -> CompositionStep {
        self.symbols.extend(composer.keystrokes(symbol));
        let assembled: Vec<char> = composer.assemble(&self.symbols).chars().collect();
        if assembled.len() < 2 {
            return CompositionStep::Pending(assembled.into_iter().collect());
        }

        let split_at = assembled.len() - 1;
        let committed: String = assembled[..split_at].iter().collect();
        let pending: String = assembled[split_at..].iter().collect();
        let prefix = (1..self.symbols.len())
            .find(|&i| composer.assemble(&self.symbols[..i]) == committed)
            // No prefix reproduces the committed text; keep only the new symbol.
            .unwrap_or(self.symbols.len() - 1);
        self.symbols.drain(..prefix);
        self.anchor += split_at;

        tracing::debug!(
            composer = composer.name(),
            %committed,
            %pending,
            "composition overflowed"
        );
        CompositionStep::Overflow { committed, pending }
    }

    /// Remove the last raw symbol, returning the new assembled form
    /// (empty when nothing is left).
    pub fn pop<C: Composer + ?Sized>(&mut self, composer: &C) -> String {
        self.symbols.pop();
        self.assembled(composer)
    }

    /// Clear the composition, returning its assembled form.
    pub fn take<C: Composer + ?Sized>(&mut self, composer: &C) -> String {
        let text = self.assembled(composer);
        self.symbols.clear();
        text
    }

    /// Drop all symbols without assembling.
    pub fn clear(&mut self) {
        self.symbols.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Pairs of lowercase letters assemble into the uppercase of the first.
    struct PairComposer;

    impl Composer for PairComposer {
        fn is_composable(&self, ch: char) -> bool {
            ch.is_ascii_lowercase()
        }

        fn assemble(&self, symbols: &[char]) -> String {
            symbols
                .chunks(2)
                .map(|c| {
                    if c.len() == 2 {
                        c[0].to_ascii_uppercase()
                    } else {
                        c[0]
                    }
                })
                .collect()
        }
    }

    #[test]
    fn test_new() {
        let comp = Composition::new();
        assert!(comp.is_empty());
        assert_eq!(comp.anchor(), 0);
        assert_eq!(comp.assembled(&PairComposer), "");
    }

    #[test]
    fn test_pending_then_overflow() {
        let mut comp = Composition::new();
        comp.begin(3);
        assert_eq!(comp.push(&PairComposer, 'a'), CompositionStep::Pending("a".into()));
        assert_eq!(comp.push(&PairComposer, 'b'), CompositionStep::Pending("A".into()));
        assert_eq!(
            comp.push(&PairComposer, 'c'),
            CompositionStep::Overflow {
                committed: "A".into(),
                pending: "c".into()
            }
        );
        assert_eq!(comp.symbols(), &['c']);
        assert_eq!(comp.anchor(), 4);
    }

    #[test]
    fn test_pop_to_empty() {
        let mut comp = Composition::new();
        comp.push(&PairComposer, 'a');
        comp.push(&PairComposer, 'b');
        assert_eq!(comp.pop(&PairComposer), "a");
        assert_eq!(comp.pop(&PairComposer), "");
        assert!(comp.is_empty());
    }

    #[test]
    fn test_take_clears() {
        let mut comp = Composition::new();
        comp.push(&PairComposer, 'x');
        comp.push(&PairComposer, 'y');
        assert_eq!(comp.take(&PairComposer), "X");
        assert!(comp.is_empty());
    }
}

//! Hangul composer for the editor core.

use crate::assemble::assemble;
use crate::jamo::{is_jamo, is_syllable, push_keystrokes};
use sdprompt_core::Composer;

/// Composes typed compatibility jamo into syllables.
///
/// Precomposed syllables (as delivered by platform input methods) also enter
/// composition; they are split into their jamo so a following keystroke can
/// still extend or split them.
#[derive(Debug, Clone, Copy, Default)]
pub struct HangulComposer;

impl HangulComposer {
    pub fn new() -> Self {
        Self
    }
}

impl Composer for HangulComposer {
    fn is_composable(&self, ch: char) -> bool {
        is_jamo(ch) || is_syllable(ch)
    }

    fn assemble(&self, symbols: &[char]) -> String {
        assemble(symbols)
    }

    fn keystrokes(&self, ch: char) -> Vec<char> {
        let mut keys = Vec::with_capacity(3);
        push_keystrokes(ch, &mut keys);
        keys
    }

    fn name(&self) -> &'static str {
        "hangul"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sdprompt_core::{Composition, CompositionStep};

    #[test]
    fn test_composable_ranges() {
        let c = HangulComposer;
        assert!(c.is_composable('ㄱ'));
        assert!(c.is_composable('ㅣ'));
        assert!(c.is_composable('한'));
        assert!(!c.is_composable('a'));
        assert!(!c.is_composable('|'));
    }

    #[test]
    fn test_overflow_keeps_second_syllable_jamo() {
        let c = HangulComposer;
        let mut comp = Composition::new();
        for j in ['ㄱ', 'ㅏ', 'ㄴ'] {
            comp.push(&c, j);
        }
        assert_eq!(comp.assembled(&c), "간");
        let step = comp.push(&c, 'ㅏ');
        assert_eq!(
            step,
            CompositionStep::Overflow {
                committed: "가".into(),
                pending: "나".into()
            }
        );
        assert_eq!(comp.symbols(), &['ㄴ', 'ㅏ']);
        assert_eq!(comp.anchor(), 1);
    }

    #[test]
    fn test_compound_final_overflow() {
        let c = HangulComposer;
        let mut comp = Composition::new();
        for j in ['ㄷ', 'ㅏ', 'ㄹ', 'ㄱ'] {
            comp.push(&c, j);
        }
        assert_eq!(comp.assembled(&c), "닭");
        comp.push(&c, 'ㅏ');
        assert_eq!(comp.symbols(), &['ㄱ', 'ㅏ']);
        assert_eq!(comp.assembled(&c), "가");
    }

    #[test]
    fn test_precomposed_symbol_expands() {
        let c = HangulComposer;
        let mut comp = Composition::new();
        comp.push(&c, '간');
        assert_eq!(comp.symbols(), &['ㄱ', 'ㅏ', 'ㄴ']);
        comp.push(&c, 'ㅏ');
        assert_eq!(comp.assembled(&c), "나");
    }
}

//! Matching normalization.
//!
//! Produces the symbol stream the gap matcher compares: ASCII letters
//! lower-cased, Hangul syllables split into initial, medial and final jamo
//! (compound medials into their two vowels), everything else kept as is. A
//! parallel mapping records, for every emitted symbol, the char index of the
//! source character it came from.

use crate::jamo::{decompose_syllable, split_vowel, CHOSEONG, JONGSEONG, JUNGSEONG};

/// Normalized symbols plus their source char indices.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Normalized {
    pub symbols: Vec<char>,
    pub mapping: Vec<usize>,
}

impl Normalized {
    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// Symbols as a string.
    pub fn as_string(&self) -> String {
        self.symbols.iter().collect()
    }

    fn push(&mut self, symbol: char, source: usize) {
        self.symbols.push(symbol);
        self.mapping.push(source);
    }
}

/// Normalize `text` for matching. Total over all input.
pub fn normalize(text: &str) -> Normalized {
    let mut out = Normalized::default();
    for (index, c) in text.chars().enumerate() {
        if c.is_ascii_uppercase() {
            out.push(c.to_ascii_lowercase(), index);
        } else if let Some((cho, jung, jong)) = decompose_syllable(c) {
            out.push(CHOSEONG[cho as usize], index);
            push_vowel(&mut out, JUNGSEONG[jung as usize], index);
            if let Some(fin) = JONGSEONG[jong as usize] {
                out.push(fin, index);
            }
        } else if split_vowel(c).is_some() {
            // A standalone compound vowel matches its syllable form.
            push_vowel(&mut out, c, index);
        } else {
            out.push(c, index);
        }
    }
    out
}

fn push_vowel(out: &mut Normalized, vowel: char, index: usize) {
    match split_vowel(vowel) {
        Some((a, b)) => {
            out.push(a, index);
            out.push(b, index);
        }
        None => out.push(vowel, index),
    }
}

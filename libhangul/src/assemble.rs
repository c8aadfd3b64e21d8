//! Jamo assembly.
//!
//! Turns a sequence of typed jamo into text the way a 2-set Korean keyboard
//! does: consonant + vowel (+ final) build a syllable, two vowels may merge
//! into a compound vowel, two finals into a compound final, and a vowel after
//! a final steals it (or its second half) as the next syllable's initial.
//! Precomposed syllables in the input are first split back into jamo.

use crate::jamo::{
    cho_index, combine_final, combine_vowel, compose_syllable, is_consonant, is_vowel,
    jong_index, jung_index, push_keystrokes, split_final,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Empty,
    /// Lone vowel, possibly compound
    Vowel(char),
    Initial(char),
    Syllable { cho: char, jung: char },
    WithFinal { cho: char, jung: char, jong: char },
}

struct Assembler {
    state: State,
    output: String,
}

impl Assembler {
    fn new() -> Self {
        Self {
            state: State::Empty,
            output: String::new(),
        }
    }

    fn feed(&mut self, c: char) {
        if is_consonant(c) && cho_index(c).is_some() {
            self.feed_consonant(c);
        } else if is_vowel(c) && jung_index(c).is_some() {
            self.feed_vowel(c);
        } else if split_final(c).is_some() {
            self.feed_compound_final(c);
        } else {
            self.flush();
            self.output.push(c);
        }
    }

    fn feed_consonant(&mut self, c: char) {
        let state = self.state;
        self.state = match state {
            State::Syllable { cho, jung } if jong_index(c).is_some() => {
                State::WithFinal { cho, jung, jong: c }
            }
            State::WithFinal { cho, jung, jong } => match combine_final(jong, c) {
                Some(compound) => State::WithFinal {
                    cho,
                    jung,
                    jong: compound,
                },
                None => {
                    self.flush();
                    State::Initial(c)
                }
            },
            _ => {
                self.flush();
                State::Initial(c)
            }
        };
    }

    /// A compound final typed whole ends an open syllable, or stands alone.
    fn feed_compound_final(&mut self, c: char) {
        if let State::Syllable { cho, jung } = self.state {
            self.state = State::WithFinal { cho, jung, jong: c };
        } else {
            self.flush();
            self.output.push(c);
        }
    }

    fn feed_vowel(&mut self, v: char) {
        let state = self.state;
        self.state = match state {
            State::Empty => State::Vowel(v),
            State::Vowel(prev) => match combine_vowel(prev, v) {
                Some(compound) => State::Vowel(compound),
                None => {
                    self.flush();
                    State::Vowel(v)
                }
            },
            State::Initial(cho) => State::Syllable { cho, jung: v },
            State::Syllable { cho, jung } => match combine_vowel(jung, v) {
                Some(compound) => State::Syllable { cho, jung: compound },
                None => {
                    self.flush();
                    State::Vowel(v)
                }
            },
            State::WithFinal { cho, jung, jong } => {
                // The final (or the second half of a compound final) moves to
                // the next syllable.
                let (kept, moved) = match split_final(jong) {
                    Some((first, second)) => (Some(first), second),
                    None => (None, jong),
                };
                self.state = match kept {
                    Some(first) => State::WithFinal {
                        cho,
                        jung,
                        jong: first,
                    },
                    None => State::Syllable { cho, jung },
                };
                self.flush();
                State::Syllable { cho: moved, jung: v }
            }
        };
    }

    fn flush(&mut self) {
        match self.state {
            State::Empty => {}
            State::Vowel(v) => self.output.push(v),
            State::Initial(c) => self.output.push(c),
            State::Syllable { cho, jung } => self.push_syllable(cho, jung, None),
            State::WithFinal { cho, jung, jong } => self.push_syllable(cho, jung, Some(jong)),
        }
        self.state = State::Empty;
    }

    fn push_syllable(&mut self, cho: char, jung: char, jong: Option<char>) {
        let composed = match (cho_index(cho), jung_index(jung)) {
            (Some(ci), Some(vi)) => {
                let fi = match jong {
                    Some(f) => jong_index(f),
                    None => Some(0),
                };
                fi.and_then(|fi| compose_syllable(ci, vi, fi))
            }
            _ => None,
        };
        match composed {
            Some(s) => self.output.push(s),
            None => {
                self.output.push(cho);
                self.output.push(jung);
                if let Some(f) = jong {
                    self.output.push(f);
                }
            }
        }
    }

    fn finish(mut self) -> String {
        self.flush();
        self.output
    }
}

/// Assemble typed jamo into text.
pub fn assemble(symbols: &[char]) -> String {
    let mut keys = Vec::with_capacity(symbols.len());
    for &c in symbols {
        push_keystrokes(c, &mut keys);
    }
    let mut asm = Assembler::new();
    for c in keys {
        asm.feed(c);
    }
    asm.finish()
}

/// Assemble the chars of a string.
pub fn assemble_str(s: &str) -> String {
    let symbols: Vec<char> = s.chars().collect();
    assemble(&symbols)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn asm(s: &str) -> String {
        assemble_str(s)
    }

    #[test]
    fn test_basic_syllables() {
        assert_eq!(asm("ㄱㅏ"), "가");
        assert_eq!(asm("ㄱㅏㄴ"), "간");
        assert_eq!(asm("ㅎㅏㄴㄱㅜㄱ"), "한국");
    }

    #[test]
    fn test_final_moves_to_next_syllable() {
        assert_eq!(asm("ㄱㅏㄴㅏ"), "가나");
        assert_eq!(asm("ㅇㅏㄴㅈㅣ"), "안지");
    }

    #[test]
    fn test_compound_vowels() {
        assert_eq!(asm("ㅇㅗㅏ"), "와");
        assert_eq!(asm("ㅇㅡㅣ"), "의");
        assert_eq!(asm("ㅗㅏ"), "ㅘ");
    }

    #[test]
    fn test_compound_final_split_by_vowel() {
        assert_eq!(asm("ㄷㅏㄹㄱ"), "닭");
        assert_eq!(asm("ㄷㅏㄹㄱㅏ"), "달가");
    }

    #[test]
    fn test_lone_jamo_and_passthrough() {
        assert_eq!(asm("ㄱ"), "ㄱ");
        assert_eq!(asm("ㄱㄴ"), "ㄱㄴ");
        assert_eq!(asm("ㅏ"), "ㅏ");
        assert_eq!(asm("ㄱㅏ1ㄴㅏ"), "가1나");
        assert_eq!(asm(""), "");
    }

    #[test]
    fn test_precomposed_input_reassembles() {
        assert_eq!(asm("가ㄴ"), "간");
        assert_eq!(asm("간ㅏ"), "가나");
        assert_eq!(asm("와"), "와");
    }

    #[test]
    fn test_typed_compound_final() {
        assert_eq!(asm("ㄺ"), "ㄺ");
        assert_eq!(asm("가ㄺ"), "갉");
        assert_eq!(asm("가ㄺㅏ"), "갈가");
        assert_eq!(asm("ㄳㄱ"), "ㄳㄱ");
    }

    #[test]
    fn test_non_final_consonant_starts_new_syllable() {
        // ㄸ cannot end a syllable
        assert_eq!(asm("ㄱㅏㄸㅏ"), "가따");
    }
}

//! Hangul jamo tables and syllable arithmetic.
//!
//! Jamo are handled as Hangul Compatibility Jamo (U+3131..U+3163), which is
//! what keyboards emit. A precomposed syllable is
//! `0xAC00 + (cho * 21 + jung) * 28 + jong`, with `jong == 0` meaning no final.

use phf::phf_map;

pub const SYLLABLE_BASE: u32 = 0xAC00;
pub const SYLLABLE_LAST: u32 = 0xD7A3;
pub const JUNG_COUNT: u32 = 21;
pub const JONG_COUNT: u32 = 28;

/// Initial consonants, in syllable index order.
pub const CHOSEONG: [char; 19] = [
    'ㄱ', 'ㄲ', 'ㄴ', 'ㄷ', 'ㄸ', 'ㄹ', 'ㅁ', 'ㅂ', 'ㅃ', 'ㅅ', 'ㅆ', 'ㅇ', 'ㅈ', 'ㅉ', 'ㅊ',
    'ㅋ', 'ㅌ', 'ㅍ', 'ㅎ',
];

/// Medial vowels, in syllable index order.
pub const JUNGSEONG: [char; 21] = [
    'ㅏ', 'ㅐ', 'ㅑ', 'ㅒ', 'ㅓ', 'ㅔ', 'ㅕ', 'ㅖ', 'ㅗ', 'ㅘ', 'ㅙ', 'ㅚ', 'ㅛ', 'ㅜ', 'ㅝ',
    'ㅞ', 'ㅟ', 'ㅠ', 'ㅡ', 'ㅢ', 'ㅣ',
];

/// Final consonants; index 0 is "no final".
pub const JONGSEONG: [Option<char>; 28] = [
    None,
    Some('ㄱ'),
    Some('ㄲ'),
    Some('ㄳ'),
    Some('ㄴ'),
    Some('ㄵ'),
    Some('ㄶ'),
    Some('ㄷ'),
    Some('ㄹ'),
    Some('ㄺ'),
    Some('ㄻ'),
    Some('ㄼ'),
    Some('ㄽ'),
    Some('ㄾ'),
    Some('ㄿ'),
    Some('ㅀ'),
    Some('ㅁ'),
    Some('ㅂ'),
    Some('ㅄ'),
    Some('ㅅ'),
    Some('ㅆ'),
    Some('ㅇ'),
    Some('ㅈ'),
    Some('ㅊ'),
    Some('ㅋ'),
    Some('ㅌ'),
    Some('ㅍ'),
    Some('ㅎ'),
];

/// Compound vowels and the two vowels they are typed as.
static COMPOUND_VOWELS: phf::Map<char, (char, char)> = phf_map! {
    'ㅘ' => ('ㅗ', 'ㅏ'),
    'ㅙ' => ('ㅗ', 'ㅐ'),
    'ㅚ' => ('ㅗ', 'ㅣ'),
    'ㅝ' => ('ㅜ', 'ㅓ'),
    'ㅞ' => ('ㅜ', 'ㅔ'),
    'ㅟ' => ('ㅜ', 'ㅣ'),
    'ㅢ' => ('ㅡ', 'ㅣ'),
};

/// Compound finals and the two consonants they are typed as.
static COMPOUND_FINALS: phf::Map<char, (char, char)> = phf_map! {
    'ㄳ' => ('ㄱ', 'ㅅ'),
    'ㄵ' => ('ㄴ', 'ㅈ'),
    'ㄶ' => ('ㄴ', 'ㅎ'),
    'ㄺ' => ('ㄹ', 'ㄱ'),
    'ㄻ' => ('ㄹ', 'ㅁ'),
    'ㄼ' => ('ㄹ', 'ㅂ'),
    'ㄽ' => ('ㄹ', 'ㅅ'),
    'ㄾ' => ('ㄹ', 'ㅌ'),
    'ㄿ' => ('ㄹ', 'ㅍ'),
    'ㅀ' => ('ㄹ', 'ㅎ'),
    'ㅄ' => ('ㅂ', 'ㅅ'),
};

pub fn is_syllable(c: char) -> bool {
    (SYLLABLE_BASE..=SYLLABLE_LAST).contains(&(c as u32))
}

/// Compatibility jamo, consonant or vowel.
pub fn is_jamo(c: char) -> bool {
    ('\u{3131}'..='\u{3163}').contains(&c)
}

pub fn is_consonant(c: char) -> bool {
    ('\u{3131}'..='\u{314E}').contains(&c)
}

pub fn is_vowel(c: char) -> bool {
    ('\u{314F}'..='\u{3163}').contains(&c)
}

pub fn cho_index(c: char) -> Option<u32> {
    CHOSEONG.iter().position(|&x| x == c).map(|i| i as u32)
}

pub fn jung_index(c: char) -> Option<u32> {
    JUNGSEONG.iter().position(|&x| x == c).map(|i| i as u32)
}

/// Final index (1-based) of a consonant that can end a syllable.
pub fn jong_index(c: char) -> Option<u32> {
    JONGSEONG.iter().position(|&x| x == Some(c)).map(|i| i as u32)
}

pub fn compose_syllable(cho: u32, jung: u32, jong: u32) -> Option<char> {
    if cho as usize >= CHOSEONG.len() || jung >= JUNG_COUNT || jong >= JONG_COUNT {
        return None;
    }
    char::from_u32(SYLLABLE_BASE + (cho * JUNG_COUNT + jung) * JONG_COUNT + jong)
}

/// Split a precomposed syllable into `(cho, jung, jong)` indices.
pub fn decompose_syllable(c: char) -> Option<(u32, u32, u32)> {
    if !is_syllable(c) {
        return None;
    }
    let offset = c as u32 - SYLLABLE_BASE;
    Some((
        offset / (JUNG_COUNT * JONG_COUNT),
        (offset % (JUNG_COUNT * JONG_COUNT)) / JONG_COUNT,
        offset % JONG_COUNT,
    ))
}

/// The two simple vowels of a compound vowel.
pub fn split_vowel(c: char) -> Option<(char, char)> {
    COMPOUND_VOWELS.get(&c).copied()
}

/// The two consonants of a compound final.
pub fn split_final(c: char) -> Option<(char, char)> {
    COMPOUND_FINALS.get(&c).copied()
}

pub fn combine_vowel(first: char, second: char) -> Option<char> {
    COMPOUND_VOWELS
        .entries()
        .find(|(_, pair)| **pair == (first, second))
        .map(|(c, _)| *c)
}

pub fn combine_final(first: char, second: char) -> Option<char> {
    COMPOUND_FINALS
        .entries()
        .find(|(_, pair)| **pair == (first, second))
        .map(|(c, _)| *c)
}

/// Push the typed jamo of `c` onto `out`: syllables decompose fully and
/// compound vowels split into their parts. A standalone compound final stays
/// one symbol; it only splits inside a syllable.
pub fn push_keystrokes(c: char, out: &mut Vec<char>) {
    if let Some((cho, jung, jong)) = decompose_syllable(c) {
        out.push(CHOSEONG[cho as usize]);
        push_keystrokes(JUNGSEONG[jung as usize], out);
        match JONGSEONG[jong as usize].map(|f| (f, split_final(f))) {
            Some((_, Some((a, b)))) => out.extend([a, b]),
            Some((f, None)) => out.push(f),
            None => {}
        }
    } else if let Some((a, b)) = split_vowel(c) {
        out.push(a);
        out.push(b);
    } else {
        out.push(c);
    }
}

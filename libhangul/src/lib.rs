//! libhangul crate root
//!
//! Hangul support for the prompt editor: jamo tables, the matching
//! normalizer, a 2-set keyboard style syllable assembler, the `Composer`
//! the editor core drives during composition, and the gap matcher used to
//! rank autocomplete candidates.
//!
//! Public API exported here:
//! - `normalize` / `Normalized` from `normalize`
//! - `assemble` / `assemble_str` from `assemble`
//! - `HangulComposer` from `composer`
//! - `calc_gap_match` / `GapMatch` / `INF` from `gap`
//! - `GapMatchRanker` from `ranker`

pub mod assemble;
pub mod composer;
pub mod gap;
pub mod jamo;
pub mod normalize;
pub mod ranker;

pub use sdprompt_core::{
    Composer, Composition, CompositionStep, CursorEditor, EditorContext, KeyEvent, KeyResult,
    Ranker, TagCandidate,
};

pub use assemble::{assemble, assemble_str};
pub use composer::HangulComposer;
pub use gap::{calc_gap_match, GapMatch, INF};
pub use normalize::{normalize, Normalized};
pub use ranker::GapMatchRanker;

//! sdprompt crate root
//!
//! Prompt-side pieces of the editor: PARR tokenization, piece libraries, the
//! prompt grammar and resolver, final prompt assembly with interleaving,
//! bracket checking, syntax highlighting, hover tooltips and the fully wired
//! `PromptEditor`.
//!
//! Public API exported here:
//! - `to_parr` / `reformat` from `parr`
//! - `Library`, `Piece`, `PieceGroup`, `PieceSource`, `SharedLibrary` from `library`
//! - `PromptNode` / `lower_prompt_node` from `node`
//! - `Resolver` / `parse_word` from `grammar`
//! - `PromptAssembler`, `interleave` and the scene types from `compose`
//! - `paren_check` / `ParenStatus` from `paren`
//! - `highlight_prompt` from `highlight`
//! - `PromptEditor`, `PromptHighlighter` from `editor`

pub mod compose;
pub mod config;
pub mod editor;
pub mod error;
pub mod grammar;
pub mod highlight;
pub mod library;
pub mod node;
pub mod paren;
pub mod parr;
pub mod tags;
pub mod tooltip;

pub use sdprompt_core::{
    Config, CursorEditor, EditorContext, EditorSession, KeyEvent, KeyResult, LookupRequest,
    Overlay, Selection, TagCandidate, TooltipEvent,
};

pub use compose::{
    interleave, is_count_tag, NoTags, Preset, PromptAssembler, Scene, SlotPiece, StyleBlock,
    TagLookup,
};
pub use config::PromptConfig;
pub use editor::{prompt_editor, prompt_session, PromptEditor, PromptHighlighter, PromptSession};
pub use error::{ErrorContext, GrammarError};
pub use grammar::{parse_word, Resolver};
pub use highlight::highlight_prompt;
pub use library::{
    expand_piece, is_multi, shared, Library, Piece, PieceGroup, PieceSource, SharedLibrary,
};
pub use node::{lower_prompt_node, pick_random, PromptNode};
pub use paren::{paren_check, ParenStatus};
pub use parr::{reformat, to_parr, SPLIT_TOKEN};
pub use tags::TagIndex;
pub use tooltip::tooltip_text;

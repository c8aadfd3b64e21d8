//! Prompt grammar: parsing words into node trees.
//!
//! A word is either literal text or a `<group.piece>` reference. References
//! expand recursively through the piece library into a group node; pieces
//! flagged multi expand into a random node with one group per line.

use crate::error::{ErrorContext, GrammarError};
use crate::library::{expand_piece, is_multi, reference_body, PieceSource};
use crate::node::PromptNode;
use crate::parr::to_parr;
use ahash::AHashSet;

/// Parses words against a piece library.
///
/// A resolver without a source is used for style prompts, where any piece
/// reference is an error.
#[derive(Clone, Copy)]
pub struct Resolver<'a> {
    source: Option<&'a dyn PieceSource>,
    context: &'a ErrorContext,
}

impl<'a> Resolver<'a> {
    pub fn new(source: &'a dyn PieceSource, context: &'a ErrorContext) -> Self {
        Self {
            source: Some(source),
            context,
        }
    }

    pub fn without_pieces(context: &'a ErrorContext) -> Self {
        Self {
            source: None,
            context,
        }
    }

    /// Parse one word into a node tree.
    pub fn parse_word(&self, word: &str) -> Result<PromptNode, GrammarError> {
        let mut expanding = AHashSet::new();
        self.parse_nested(word, &mut expanding)
    }

    /// Parse every word of `text` into one group.
    pub fn parse_prompt(&self, text: &str) -> Result<PromptNode, GrammarError> {
        let children = to_parr(text)
            .iter()
            .map(|word| self.parse_word(word))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(PromptNode::group(children))
    }

    fn parse_nested(
        &self,
        word: &str,
        expanding: &mut AHashSet<String>,
    ) -> Result<PromptNode, GrammarError> {
        if reference_body(word).is_none() {
            return Ok(PromptNode::text(word));
        }
        let source = self.source.ok_or_else(|| GrammarError::PiecesUnavailable {
            token: word.to_string(),
        })?;
        if !expanding.insert(word.to_string()) {
            return Err(GrammarError::Cyclic {
                token: word.to_string(),
                context: self.context.clone(),
            });
        }

        let expanded = expand_piece(source, word, self.context)?;
        let node = if is_multi(source, word) {
            let options = expanded
                .split('\n')
                .map(|line| self.parse_words(&to_parr(line), expanding))
                .collect::<Result<Vec<_>, _>>()?;
            tracing::debug!(token = word, options = options.len(), "multi piece expanded");
            PromptNode::group(vec![PromptNode::random(options)])
        } else {
            self.parse_words(&to_parr(&expanded), expanding)?
        };

        expanding.remove(word);
        Ok(node)
    }

    fn parse_words(
        &self,
        words: &[String],
        expanding: &mut AHashSet<String>,
    ) -> Result<PromptNode, GrammarError> {
        let children = words
            .iter()
            .map(|w| self.parse_nested(w, expanding))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(PromptNode::group(children))
    }
}

/// Parse `word` against `source` with a fresh set of references in
/// expansion.
pub fn parse_word(
    source: Option<&dyn PieceSource>,
    word: &str,
    context: &ErrorContext,
) -> Result<PromptNode, GrammarError> {
    match source {
        Some(source) => Resolver::new(source, context).parse_word(word),
        None => Resolver::without_pieces(context).parse_word(word),
    }
}

//! Prompt node tree and lowering to text.

use crate::parr::reformat;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// A parsed prompt.
///
/// Built fresh for every expansion and owned by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum PromptNode {
    /// Literal prompt text
    Text { text: String },
    /// All children, in order
    Group { children: Vec<PromptNode> },
    /// One option chosen at random on every lowering
    Random { options: Vec<PromptNode> },
}

impl PromptNode {
    pub fn text<T: Into<String>>(text: T) -> Self {
        PromptNode::Text { text: text.into() }
    }

    pub fn group(children: Vec<PromptNode>) -> Self {
        PromptNode::Group { children }
    }

    pub fn random(options: Vec<PromptNode>) -> Self {
        PromptNode::Random { options }
    }

    /// Flatten to a prompt string. Each call may choose different random
    /// options.
    pub fn lower<R: Rng + ?Sized>(&self, rng: &mut R) -> String {
        lower_prompt_node(self, rng)
    }
}

/// Choose one element uniformly.
pub fn pick_random<'a, T, R: Rng + ?Sized>(rng: &mut R, items: &'a [T]) -> Option<&'a T> {
    items.choose(rng)
}

/// Flatten `node` to text: text leaves as is, random nodes through one
/// uniformly chosen option, groups as their lowered children re-tokenized and
/// joined with `", "`.
pub fn lower_prompt_node<R: Rng + ?Sized>(node: &PromptNode, rng: &mut R) -> String {
    match node {
        PromptNode::Text { text } => text.clone(),
        PromptNode::Random { options } => match pick_random(rng, options) {
            Some(option) => lower_prompt_node(option, rng),
            None => String::new(),
        },
        PromptNode::Group { children } => {
            let lowered: Vec<String> = children
                .iter()
                .map(|child| lower_prompt_node(child, rng))
                .collect();
            reformat(&lowered.join(","))
        }
    }
}

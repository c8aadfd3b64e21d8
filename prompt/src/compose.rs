//! Final prompt assembly.
//!
//! A scene has slots, each holding alternative prompt pieces. Every
//! combination of enabled pieces, one per slot, yields one prompt: the
//! preset's front prompt interleaved with the pieces' middle prompt at split
//! tokens, followed by the style background and the preset's back prompt.

use crate::config::PromptConfig;
use crate::error::{ErrorContext, GrammarError};
use crate::grammar::Resolver;
use crate::library::PieceSource;
use crate::node::PromptNode;
use crate::parr::to_parr;
use once_cell::sync::Lazy;
use regex::Regex;
use sdprompt_core::candidate::CATEGORY_CHARACTER;
use serde::{Deserialize, Serialize};

static COUNT_TAG: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\d+(boy|girl|other)s?$").expect("count tag pattern is valid")
});

const MULTIPLE_TAGS: [&str; 3] = ["multiple girls", "multiple boys", "multiple others"];

/// Front and back prompts shared by every scene.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Preset {
    pub front_prompt: String,
    pub back_prompt: String,
}

/// Character and background prompts of a drawing style.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StyleBlock {
    pub character_prompt: String,
    pub background_prompt: String,
}

/// One alternative of a scene slot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotPiece {
    pub prompt: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
}

impl SlotPiece {
    pub fn new<T: Into<String>>(prompt: T) -> Self {
        Self {
            prompt: prompt.into(),
            enabled: None,
        }
    }

    pub fn disabled<T: Into<String>>(prompt: T) -> Self {
        Self {
            enabled: Some(false),
            ..Self::new(prompt)
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.unwrap_or(true)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Scene {
    pub name: String,
    pub inpaint: bool,
    pub slots: Vec<Vec<SlotPiece>>,
}

/// Tag category lookup used to move character tags to the front.
pub trait TagLookup {
    fn category(&self, word: &str) -> Option<u32>;
}

/// Lookup that knows no tags.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoTags;

impl TagLookup for NoTags {
    fn category(&self, _word: &str) -> Option<u32> {
        None
    }
}

/// Merge `front` and `middle`, switching source at every split token.
///
/// Starts in front. Split tokens are dropped, and a split token the new
/// source is sitting on right after a switch pairs with the one that caused
/// it. Once either list runs out the rest of the other is appended.
pub fn interleave<S: AsRef<str>>(front: &[S], middle: &[S], split: &str) -> Vec<String> {
    let (mut left, mut right) = (0, 0);
    let mut from_front = true;
    let mut out = Vec::with_capacity(front.len() + middle.len());

    while left < front.len() && right < middle.len() {
        let word = if from_front {
            left += 1;
            front[left - 1].as_ref()
        } else {
            right += 1;
            middle[right - 1].as_ref()
        };
        if word != split {
            out.push(word.to_string());
            continue;
        }
        from_front = !from_front;
        let (list, next) = if from_front {
            (front, &mut left)
        } else {
            (middle, &mut right)
        };
        if list.get(*next).map(|w| w.as_ref() == split).unwrap_or(false) {
            *next += 1;
        }
    }
    for word in front[left..].iter().chain(&middle[right..]) {
        if word.as_ref() != split {
            out.push(word.as_ref().to_string());
        }
    }
    out
}

/// Whether `word` counts characters, like `1girl` or `multiple boys`.
pub fn is_count_tag(word: &str) -> bool {
    COUNT_TAG.is_match(word) || MULTIPLE_TAGS.contains(&word)
}

/// Builds the prompts of a scene.
pub struct PromptAssembler<'a> {
    source: &'a dyn PieceSource,
    tags: &'a dyn TagLookup,
    session: String,
    split_token: String,
    character_first: bool,
}

impl<'a> PromptAssembler<'a> {
    pub fn new(source: &'a dyn PieceSource, config: &PromptConfig) -> Self {
        Self {
            source,
            tags: &NoTags,
            session: String::new(),
            split_token: config.split_token.clone(),
            character_first: config.character_first,
        }
    }

    pub fn with_tags(mut self, tags: &'a dyn TagLookup) -> Self {
        self.tags = tags;
        self
    }

    /// Session name reported in errors.
    pub fn with_session<S: Into<String>>(mut self, session: S) -> Self {
        self.session = session.into();
        self
    }

    /// One group node per enabled slot combination, in depth-first order.
    pub fn create_prompts(
        &self,
        preset: &Preset,
        style: Option<&StyleBlock>,
        scene: &Scene,
    ) -> Result<Vec<PromptNode>, GrammarError> {
        let context = ErrorContext::new(self.session.clone(), scene.name.clone())
            .with_inpaint(scene.inpaint);
        let resolver = Resolver::new(self.source, &context);
        let front = self.front_words(preset, style);

        let mut prompts = Vec::new();
        let mut chosen: Vec<&str> = Vec::with_capacity(scene.slots.len());
        self.combine(
            &scene.slots,
            &mut chosen,
            &mut |chosen: &[&str]| -> Result<(), GrammarError> {
                let middle: Vec<String> = chosen.iter().flat_map(|p| to_parr(p)).collect();
                let mut words = interleave(&front, &middle, &self.split_token);
                if let Some(style) = style {
                    words.extend(to_parr(&style.background_prompt));
                }
                words.extend(to_parr(&preset.back_prompt));
                let children = words
                    .iter()
                    .map(|w| resolver.parse_word(w))
                    .collect::<Result<Vec<_>, _>>()?;
                prompts.push(PromptNode::group(children));
                Ok(())
            },
        )?;
        tracing::debug!(scene = %scene.name, prompts = prompts.len(), "prompts created");
        Ok(prompts)
    }

    fn front_words(&self, preset: &Preset, style: Option<&StyleBlock>) -> Vec<String> {
        let mut front = to_parr(&preset.front_prompt);
        let Some(style) = style else {
            return front;
        };
        front.extend(to_parr(&style.character_prompt));
        if !self.character_first {
            return front;
        }
        let (mut first, rest): (Vec<String>, Vec<String>) =
            front.into_iter().partition(|word| {
                is_count_tag(word) || self.tags.category(word) == Some(CATEGORY_CHARACTER)
            });
        first.extend(rest);
        first
    }

    fn combine<'s>(
        &self,
        slots: &'s [Vec<SlotPiece>],
        chosen: &mut Vec<&'s str>,
        emit: &mut dyn FnMut(&[&str]) -> Result<(), GrammarError>,
    ) -> Result<(), GrammarError> {
        let Some((slot, rest)) = slots.split_first() else {
            return emit(chosen);
        };
        for piece in slot.iter().filter(|p| p.is_enabled()) {
            chosen.push(&piece.prompt);
            self.combine(rest, chosen, emit)?;
            chosen.pop();
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::library::{Library, Piece};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn lower_all(nodes: &[PromptNode]) -> Vec<String> {
        let mut rng = StdRng::seed_from_u64(11);
        nodes.iter().map(|n| n.lower(&mut rng)).collect()
    }

    #[test]
    fn test_interleave_switches_at_split() {
        let merged = interleave(&["1girl", "|", "solo"], &["|", "red hair"], "|");
        assert_eq!(merged, vec!["1girl", "red hair", "solo"]);
    }

    #[test]
    fn test_interleave_alternates_runs() {
        let merged = interleave(&["1girl", "|", "char"], &["style", "|", "pose"], "|");
        assert_eq!(merged, vec!["1girl", "style", "char", "pose"]);
    }

    #[test]
    fn test_interleave_leftovers_skip_split() {
        let merged = interleave(&["a", "|", "b", "|", "c"], &["x"], "|");
        assert_eq!(merged, vec!["a", "x", "b", "c"]);
        let merged = interleave::<&str>(&[], &["|", "x"], "|");
        assert_eq!(merged, vec!["x"]);
    }

    #[test]
    fn test_count_tags() {
        assert!(is_count_tag("1girl"));
        assert!(is_count_tag("2boys"));
        assert!(is_count_tag("multiple others"));
        assert!(!is_count_tag("girl"));
        assert!(!is_count_tag("1girl solo"));
    }

    #[test]
    fn test_combinations_depth_first_skip_disabled() {
        let lib = Library::new();
        let config = PromptConfig::default();
        let scene = Scene {
            name: "s".into(),
            inpaint: false,
            slots: vec![
                vec![SlotPiece::new("a"), SlotPiece::disabled("b"), SlotPiece::new("c")],
                vec![SlotPiece::new("x"), SlotPiece::new("y")],
            ],
        };
        let preset = Preset {
            front_prompt: "1girl".into(),
            back_prompt: "best quality".into(),
        };
        let prompts = PromptAssembler::new(&lib, &config)
            .create_prompts(&preset, None, &scene)
            .unwrap();
        assert_eq!(
            lower_all(&prompts),
            vec![
                "1girl, a, x, best quality",
                "1girl, a, y, best quality",
                "1girl, c, x, best quality",
                "1girl, c, y, best quality",
            ]
        );
    }

    struct Characters;

    impl TagLookup for Characters {
        fn category(&self, word: &str) -> Option<u32> {
            (word == "hatsune miku").then_some(CATEGORY_CHARACTER)
        }
    }

    #[test]
    fn test_style_moves_characters_first() {
        let lib = Library::new();
        let config = PromptConfig::default();
        let preset = Preset {
            front_prompt: "masterpiece, |".into(),
            back_prompt: String::new(),
        };
        let style = StyleBlock {
            character_prompt: "hatsune miku, 1girl".into(),
            background_prompt: "simple background".into(),
        };
        let scene = Scene {
            name: "s".into(),
            inpaint: false,
            slots: vec![vec![SlotPiece::new("smile")]],
        };
        let prompts = PromptAssembler::new(&lib, &config)
            .with_tags(&Characters)
            .create_prompts(&preset, Some(&style), &scene)
            .unwrap();
        assert_eq!(
            lower_all(&prompts),
            vec!["hatsune miku, 1girl, masterpiece, smile, simple background"]
        );
    }

    #[test]
    fn test_errors_name_scene() {
        let mut lib = Library::new();
        lib.add_piece("g", Piece::new("k", "v"));
        let config = PromptConfig::default();
        let scene = Scene {
            name: "night".into(),
            inpaint: true,
            slots: vec![vec![SlotPiece::new("<g.missing>")]],
        };
        let err = PromptAssembler::new(&lib, &config)
            .with_session("proj")
            .create_prompts(&Preset::default(), None, &scene)
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "piece not found \"<g.missing>\" (project:proj, scene:night[inpaint])"
        );
    }

    #[test]
    fn test_scene_without_slots_yields_one_prompt() {
        let lib = Library::new();
        let config = PromptConfig::default();
        let preset = Preset {
            front_prompt: "a, |, b".into(),
            back_prompt: "z".into(),
        };
        let prompts = PromptAssembler::new(&lib, &config)
            .create_prompts(&preset, None, &Scene::default())
            .unwrap();
        assert_eq!(lower_all(&prompts), vec!["a, b, z"]);
    }
}

//! Piece libraries.
//!
//! A piece is a named, user-authored prompt fragment. Pieces are grouped into
//! libraries and referenced from prompts as `<group.piece>`. A piece flagged
//! `multi` holds one alternative per line, one of which is chosen at random
//! on every expansion.
//!
//! Libraries are owned by the host and may change at any time, so nothing
//! here caches a resolution: every lookup reads the current contents.

use crate::error::{ErrorContext, GrammarError};
use ahash::AHashMap;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::{Arc, RwLock};

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Piece {
    pub name: String,
    pub prompt: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub multi: Option<bool>,
}

impl Piece {
    pub fn new<N: Into<String>, P: Into<String>>(name: N, prompt: P) -> Self {
        Self {
            name: name.into(),
            prompt: prompt.into(),
            multi: None,
        }
    }

    /// A piece whose lines are alternatives.
    pub fn multi<N: Into<String>, P: Into<String>>(name: N, prompt: P) -> Self {
        Self {
            multi: Some(true),
            ..Self::new(name, prompt)
        }
    }

    pub fn is_multi(&self) -> bool {
        self.multi.unwrap_or(false)
    }
}

fn default_version() -> u32 {
    1
}

/// A named group of pieces.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PieceGroup {
    #[serde(default = "default_version")]
    pub version: u32,
    pub name: String,
    #[serde(default)]
    pub pieces: Vec<Piece>,
}

impl PieceGroup {
    pub fn new<N: Into<String>>(name: N) -> Self {
        Self {
            version: default_version(),
            name: name.into(),
            pieces: Vec::new(),
        }
    }

    pub fn with_piece(mut self, piece: Piece) -> Self {
        self.add(piece);
        self
    }

    /// Add a piece, replacing one with the same name.
    pub fn add(&mut self, piece: Piece) {
        match self.pieces.iter_mut().find(|p| p.name == piece.name) {
            Some(existing) => *existing = piece,
            None => self.pieces.push(piece),
        }
    }

    pub fn piece(&self, name: &str) -> Option<&Piece> {
        self.pieces.iter().find(|p| p.name == name)
    }
}

/// Read access to piece libraries.
///
/// Called synchronously and repeatedly while rendering, so implementations
/// must not block on I/O.
pub trait PieceSource {
    fn has_group(&self, group: &str) -> bool;

    /// Prompt text of `group.piece`.
    fn resolve(&self, group: &str, piece: &str) -> Option<String>;

    fn is_multi(&self, group: &str, piece: &str) -> bool;
}

/// All piece groups of a session, keyed by name.
///
/// Serialized as a list of groups.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "Vec<PieceGroup>", into = "Vec<PieceGroup>")]
pub struct Library {
    groups: AHashMap<String, PieceGroup>,
}

impl From<Vec<PieceGroup>> for Library {
    fn from(groups: Vec<PieceGroup>) -> Self {
        let mut library = Library::new();
        for group in groups {
            library.insert_group(group);
        }
        library
    }
}

impl From<Library> for Vec<PieceGroup> {
    fn from(library: Library) -> Self {
        let mut groups: Vec<PieceGroup> = library.groups.into_iter().map(|(_, g)| g).collect();
        groups.sort_by(|a, b| a.name.cmp(&b.name));
        groups
    }
}

/// TOML layout: `[[library]]` tables.
#[derive(Debug, Default, Serialize, Deserialize)]
struct LibraryFile {
    #[serde(default)]
    library: Vec<PieceGroup>,
}

impl Library {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a group, replacing any group with the same name.
    pub fn insert_group(&mut self, group: PieceGroup) -> Option<PieceGroup> {
        self.groups.insert(group.name.clone(), group)
    }

    pub fn group(&self, name: &str) -> Option<&PieceGroup> {
        self.groups.get(name)
    }

    /// Add a piece to `group`, creating the group if needed.
    pub fn add_piece(&mut self, group: &str, piece: Piece) {
        self.groups
            .entry(group.to_string())
            .or_insert_with(|| PieceGroup::new(group))
            .add(piece);
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn from_json_str(content: &str) -> anyhow::Result<Self> {
        Ok(serde_json::from_str(content)?)
    }

    pub fn to_json_string(&self) -> anyhow::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_toml_str(content: &str) -> anyhow::Result<Self> {
        let file: LibraryFile = toml::from_str(content)?;
        Ok(file.library.into())
    }

    pub fn to_toml_string(&self) -> anyhow::Result<String> {
        let file = LibraryFile {
            library: self.clone().into(),
        };
        Ok(toml::to_string_pretty(&file)?)
    }

    /// Load a library file; `.toml` files are TOML, anything else JSON.
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read library {}", path.display()))?;
        let is_toml = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.eq_ignore_ascii_case("toml"))
            .unwrap_or(false);
        let library = if is_toml {
            Self::from_toml_str(&content)
        } else {
            Self::from_json_str(&content)
        };
        let library =
            library.with_context(|| format!("failed to parse library {}", path.display()))?;
        tracing::debug!(path = %path.display(), groups = library.len(), "library loaded");
        Ok(library)
    }
}

impl PieceSource for Library {
    fn has_group(&self, group: &str) -> bool {
        self.groups.contains_key(group)
    }

    fn resolve(&self, group: &str, piece: &str) -> Option<String> {
        self.group(group)?.piece(piece).map(|p| p.prompt.clone())
    }

    fn is_multi(&self, group: &str, piece: &str) -> bool {
        self.group(group)
            .and_then(|g| g.piece(piece))
            .map(Piece::is_multi)
            .unwrap_or(false)
    }
}

/// A library shared with the host, read live on every call.
pub type SharedLibrary = Arc<RwLock<Library>>;

pub fn shared(library: Library) -> SharedLibrary {
    Arc::new(RwLock::new(library))
}

fn read<R>(library: &RwLock<Library>, f: impl FnOnce(&Library) -> R) -> R {
    match library.read() {
        Ok(guard) => f(&guard),
        // Poisoned by a panicking writer; read anyway.
        Err(poisoned) => f(&poisoned.into_inner()),
    }
}

impl PieceSource for RwLock<Library> {
    fn has_group(&self, group: &str) -> bool {
        read(self, |l| l.has_group(group))
    }

    fn resolve(&self, group: &str, piece: &str) -> Option<String> {
        read(self, |l| l.resolve(group, piece))
    }

    fn is_multi(&self, group: &str, piece: &str) -> bool {
        read(self, |l| l.is_multi(group, piece))
    }
}

/// Inner text of a `<...>` token.
pub fn reference_body(token: &str) -> Option<&str> {
    if token.len() >= 2 && token.starts_with('<') && token.ends_with('>') {
        Some(&token[1..token.len() - 1])
    } else {
        None
    }
}

/// Split a `<group.piece>` token into its two names.
fn split_reference<'t>(
    token: &'t str,
    context: &ErrorContext,
) -> Result<(&'t str, &'t str), GrammarError> {
    let body = reference_body(token).ok_or_else(|| GrammarError::NotAPiece {
        token: token.to_string(),
        context: context.clone(),
    })?;
    let mut parts = body.split('.');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(group), Some(piece), None) => Ok((group, piece)),
        _ => Err(GrammarError::InvalidReference {
            token: token.to_string(),
            context: context.clone(),
        }),
    }
}

/// Prompt text of the piece a `<group.piece>` token names.
pub fn expand_piece(
    source: &dyn PieceSource,
    token: &str,
    context: &ErrorContext,
) -> Result<String, GrammarError> {
    let (group, piece) = split_reference(token, context)?;
    if !source.has_group(group) {
        return Err(GrammarError::LibraryNotFound {
            token: token.to_string(),
            context: context.clone(),
        });
    }
    source
        .resolve(group, piece)
        .ok_or_else(|| GrammarError::PieceNotFound {
            token: token.to_string(),
            context: context.clone(),
        })
}

/// Whether a token names an existing piece flagged multi.
pub fn is_multi(source: &dyn PieceSource, token: &str) -> bool {
    match split_reference(token, &ErrorContext::default()) {
        Ok((group, piece)) => source.is_multi(group, piece),
        Err(_) => false,
    }
}

//! Grammar errors raised while resolving piece references.

use std::fmt;
use thiserror::Error;

/// Where a prompt came from, rendered into error messages so the user can
/// find the offending prompt.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorContext {
    pub session: String,
    pub scene: String,
    pub inpaint: bool,
}

impl ErrorContext {
    pub fn new<S: Into<String>, T: Into<String>>(session: S, scene: T) -> Self {
        Self {
            session: session.into(),
            scene: scene.into(),
            inpaint: false,
        }
    }

    pub fn with_inpaint(mut self, inpaint: bool) -> Self {
        self.inpaint = inpaint;
        self
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "project:{}, scene:{}", self.session, self.scene)?;
        if self.inpaint {
            write!(f, "[inpaint]")?;
        }
        Ok(())
    }
}

/// Piece reference resolution errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GrammarError {
    #[error("not a piece reference \"{token}\" ({context})")]
    NotAPiece { token: String, context: ErrorContext },

    #[error("invalid piece reference \"{token}\" ({context})")]
    InvalidReference { token: String, context: ErrorContext },

    #[error("library not found \"{token}\" ({context})")]
    LibraryNotFound { token: String, context: ErrorContext },

    #[error("piece not found \"{token}\" ({context})")]
    PieceNotFound { token: String, context: ErrorContext },

    #[error("cyclic reference at {token} ({context})")]
    Cyclic { token: String, context: ErrorContext },

    /// Style prompts are resolved without a piece library.
    #[error("pieces cannot be used here \"{token}\"")]
    PiecesUnavailable { token: String },
}

impl GrammarError {
    /// The token that failed to resolve.
    pub fn token(&self) -> &str {
        match self {
            GrammarError::NotAPiece { token, .. }
            | GrammarError::InvalidReference { token, .. }
            | GrammarError::LibraryNotFound { token, .. }
            | GrammarError::PieceNotFound { token, .. }
            | GrammarError::Cyclic { token, .. }
            | GrammarError::PiecesUnavailable { token } => token,
        }
    }
}

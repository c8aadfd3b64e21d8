//! Prompt editor configuration that extends the base `Config` from core.
//!
//! This configuration includes:
//! - All generic options from `sdprompt_core::Config` (flattened via serde)
//! - The token that switches prompt interleaving
//! - Whether character tags move to the front of style prompts
//!
//! # Example
//!
//! ```rust
//! use sdprompt::PromptConfig;
//!
//! let config = PromptConfig::from_toml_str("max_candidates = 8\n").unwrap();
//! assert_eq!(config.base.max_candidates, 8);
//! assert_eq!(config.split_token, "|");
//! ```

use crate::parr::SPLIT_TOKEN;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct PromptConfig {
    /// Base configuration fields (history, autocomplete, tooltips)
    #[serde(flatten)]
    pub base: sdprompt_core::Config,

    /// Token that switches between front and middle prompts
    pub split_token: String,

    /// Move count tags (`1girl`) and character tags first when a style
    /// supplies a character prompt
    pub character_first: bool,
}

impl Default for PromptConfig {
    fn default() -> Self {
        Self {
            base: sdprompt_core::Config::default(),
            split_token: SPLIT_TOKEN.to_string(),
            character_first: true,
        }
    }
}

impl PromptConfig {
    pub fn base(&self) -> &sdprompt_core::Config {
        &self.base
    }

    pub fn from_toml_str(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    pub fn to_toml_string(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    pub fn load_toml<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        Self::from_toml_str(&content)
            .with_context(|| format!("failed to parse config {}", path.display()))
    }
}

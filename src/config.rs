// src/config.rs
//! Engine configuration.
//!
//! Every field has a default, so a config file only needs the keys it
//! changes:
//!
//! ```
//! use homophone_core::config::EngineConfig;
//!
//! let config: EngineConfig =
//!     serde_json::from_str(r#"{"char_dictionaries": ["dicts/chars.txt"], "han_only": true}"#).unwrap();
//! assert_eq!(config.attempt_factor, 5);
//! assert!(config.han_only);
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::core::converter::SubstitutionOptions;
use crate::core::selector::SelectorKind;
use crate::error::{HomophoneError, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Single-character homophone dictionaries.
    pub char_dictionaries: Vec<PathBuf>,
    /// Word/phrase dictionaries, merged into the same table.
    pub word_dictionaries: Vec<PathBuf>,
    /// Compiled table. Loaded instead of the dictionaries when present.
    pub snapshot: Option<PathBuf>,
    pub selector: SelectorKind,
    pub attempt_factor: usize,
    pub parallel_threshold: usize,
    pub chunk_size: usize,
    pub han_only: bool,
    /// Largest enumeration the engine facade will produce.
    pub max_combinations: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        let options = SubstitutionOptions::default();
        Self {
            char_dictionaries: Vec::new(),
            word_dictionaries: Vec::new(),
            snapshot: None,
            selector: SelectorKind::default(),
            attempt_factor: options.attempt_factor,
            parallel_threshold: options.parallel_threshold,
            chunk_size: options.chunk_size,
            han_only: options.han_only,
            max_combinations: 10_000,
        }
    }
}

impl EngineConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .map_err(|e| HomophoneError::config(format!("{}: {}", path.display(), e)))?;
        let config: EngineConfig = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.attempt_factor == 0 {
            return Err(HomophoneError::config("attempt_factor must be at least 1"));
        }
        if self.chunk_size == 0 {
            return Err(HomophoneError::config("chunk_size must be at least 1"));
        }
        Ok(())
    }

    pub fn has_sources(&self) -> bool {
        !self.char_dictionaries.is_empty() || !self.word_dictionaries.is_empty()
    }

    pub fn substitution_options(&self) -> SubstitutionOptions {
        SubstitutionOptions {
            attempt_factor: self.attempt_factor,
            parallel_threshold: self.parallel_threshold,
            chunk_size: self.chunk_size,
            han_only: self.han_only,
        }
    }
}

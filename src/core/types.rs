// src/core/types.rs
use serde::{Deserialize, Serialize};

use crate::error::{HomophoneError, Result};

/// The alternates recorded for one key, in insertion order.
pub type Alternates = Vec<String>;

/// Which kind of dictionary a source was loaded as.
/// Both kinds feed the same table; the distinction only matters for stats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DictionaryKind {
    Char,
    Word,
}

/// Build statistics for a single dictionary source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceStats {
    pub name: String,
    pub kind: DictionaryKind,
    /// Non-blank lines seen.
    pub lines: usize,
    /// Lines that formed a homophone group.
    pub groups: usize,
    /// Malformed lines that were dropped.
    pub skipped: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    #[default]
    Once,
    Many,
    All,
}

/// A conversion request as received from a collaborator.
///
/// `text` is optional so that a missing field can be reported as
/// [`HomophoneError::InvalidInput`] instead of a deserialization failure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConversionRequest {
    #[serde(default)]
    pub mode: Mode,
    pub text: Option<String>,
    pub count: Option<usize>,
    pub seed: Option<u64>,
}

impl ConversionRequest {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Self::default()
        }
    }

    pub fn with_mode(mut self, mode: Mode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_count(mut self, count: usize) -> Self {
        self.count = Some(count);
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Checks the request and returns the text and the effective count.
    pub fn validate(&self) -> Result<(&str, usize)> {
        let text = self
            .text
            .as_deref()
            .ok_or_else(|| HomophoneError::invalid_input("text is required"))?;
        let count = self.count.unwrap_or(1);
        if count == 0 {
            return Err(HomophoneError::invalid_input("count must be at least 1"));
        }
        Ok((text, count))
    }
}

/// The outcome of one conversion call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionResult {
    pub original: String,
    pub results: Vec<String>,
    /// Base seed the results were derived from; `None` for enumeration.
    pub seed: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_defaults_to_single_result() {
        let request = ConversionRequest::new("妈");
        let (text, count) = request.validate().unwrap();
        assert_eq!(text, "妈");
        assert_eq!(count, 1);
        assert_eq!(request.mode, Mode::Once);
    }

    #[test]
    fn test_request_without_text_is_invalid() {
        let request: ConversionRequest = serde_json::from_str(r#"{"mode":"many"}"#).unwrap();
        assert!(matches!(
            request.validate(),
            Err(HomophoneError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_request_with_zero_count_is_invalid() {
        let request = ConversionRequest::new("妈").with_count(0);
        assert!(matches!(
            request.validate(),
            Err(HomophoneError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_empty_text_is_valid() {
        let request = ConversionRequest::new("");
        assert!(request.validate().is_ok());
    }
}

// src/core/table.rs
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::core::types::{Alternates, SourceStats};

/// An immutable homophone relation: key -> alternates, never containing the key.
///
/// Only [`DictionaryBuilder`](crate::core::dictionary::DictionaryBuilder) and
/// snapshot loading produce tables, so every table that exists has been built.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HomophoneTable {
    entries: HashMap<String, Alternates>,
    sources: Vec<SourceStats>,
}

impl HomophoneTable {
    pub(crate) fn from_parts(entries: HashMap<String, Alternates>, sources: Vec<SourceStats>) -> Self {
        Self { entries, sources }
    }

    /// Alternates for a key, in insertion order. Empty when the key is unknown.
    pub fn lookup(&self, key: &str) -> &[String] {
        self.entries.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn lookup_char(&self, c: char) -> &[String] {
        let mut buf = [0u8; 4];
        self.lookup(c.encode_utf8(&mut buf))
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Number of distinct keys. Used as the readiness signal.
    pub fn size(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    /// Length of the longest alternate list.
    pub fn max_alternates(&self) -> usize {
        self.entries.values().map(Vec::len).max().unwrap_or(0)
    }

    pub fn sources(&self) -> &[SourceStats] {
        &self.sources
    }

    /// Checks that the relation is symmetric with no self-references and no
    /// duplicate alternates. Builder output always passes; deserialized
    /// tables may not.
    pub fn verify(&self) -> Result<(), String> {
        for (key, alternates) in &self.entries {
            for (i, alt) in alternates.iter().enumerate() {
                if alt == key {
                    return Err(format!("'{key}' lists itself"));
                }
                if alternates[..i].contains(alt) {
                    return Err(format!("'{key}' lists '{alt}' twice"));
                }
                if !self.lookup(alt).contains(key) {
                    return Err(format!("'{key}' -> '{alt}' has no reverse entry"));
                }
            }
        }
        Ok(())
    }
}

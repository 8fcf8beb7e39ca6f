// src/core/dictionary.rs
use log::{debug, info};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::core::table::HomophoneTable;
use crate::core::types::{Alternates, DictionaryKind, SourceStats};
use crate::error::{HomophoneError, Result};

pub const FIELD_DELIMITER: char = '\t';

/// Splits one dictionary line into its homophone group.
///
/// Field 0 is the pronunciation key and is dropped. Returns `None` for a
/// malformed line: fewer than two fields, or no member left after trimming.
pub fn parse_line(line: &str) -> Option<Vec<&str>> {
    let fields: Vec<&str> = line.split(FIELD_DELIMITER).collect();
    if fields.len() < 2 {
        return None;
    }
    let members: Vec<&str> = fields[1..]
        .iter()
        .map(|f| f.trim())
        .filter(|m| !m.is_empty())
        .collect();
    if members.is_empty() {
        return None;
    }
    Some(members)
}

/// Accumulates homophone groups from one or more sources.
///
/// Every pair (a, b) of distinct members in a group adds `b` to `a`'s
/// alternates once, which keeps the relation symmetric and free of
/// self-references.
#[derive(Debug, Default)]
pub struct DictionaryBuilder {
    entries: HashMap<String, Alternates>,
    sources: Vec<SourceStats>,
}

impl DictionaryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses an in-memory source. Malformed lines are skipped.
    pub fn add_source(&mut self, name: &str, kind: DictionaryKind, text: &str) -> SourceStats {
        let mut stats = SourceStats {
            name: name.to_string(),
            kind,
            lines: 0,
            groups: 0,
            skipped: 0,
        };

        for (idx, line) in text.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            stats.lines += 1;
            match parse_line(line) {
                Some(members) => {
                    self.add_group(&members);
                    stats.groups += 1;
                }
                None => {
                    debug!("{}:{}: skipping malformed line {:?}", name, idx + 1, line);
                    stats.skipped += 1;
                }
            }
        }

        info!(
            "loaded {:?} dictionary '{}': {} groups, {} skipped",
            kind, name, stats.groups, stats.skipped
        );
        self.sources.push(stats.clone());
        stats
    }

    /// Reads and parses a dictionary file.
    pub fn add_file<P: AsRef<Path>>(&mut self, path: P, kind: DictionaryKind) -> Result<SourceStats> {
        let path = path.as_ref();
        let text =
            fs::read_to_string(path).map_err(|e| HomophoneError::source_unavailable(path, e))?;
        Ok(self.add_source(&path.display().to_string(), kind, &text))
    }

    fn add_group(&mut self, members: &[&str]) {
        for &a in members {
            // a member with no homophones is still a key
            self.entries.entry(a.to_owned()).or_default();
            for &b in members {
                if a == b {
                    continue;
                }
                let alternates = self.entries.entry(a.to_owned()).or_default();
                if !alternates.iter().any(|existing| existing == b) {
                    alternates.push(b.to_owned());
                }
            }
        }
    }

    pub fn key_count(&self) -> usize {
        self.entries.len()
    }

    pub fn build(self) -> HomophoneTable {
        info!(
            "homophone table ready: {} keys from {} sources",
            self.entries.len(),
            self.sources.len()
        );
        HomophoneTable::from_parts(self.entries, self.sources)
    }
}

/// Builds a table from raw character-dictionary texts.
pub fn build_table<S: AsRef<str>>(sources: &[S]) -> HomophoneTable {
    let mut builder = DictionaryBuilder::new();
    for (i, source) in sources.iter().enumerate() {
        builder.add_source(&format!("source-{i}"), DictionaryKind::Char, source.as_ref());
    }
    builder.build()
}

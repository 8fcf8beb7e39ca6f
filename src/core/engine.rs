use log::{info, warn};
use std::path::Path;
use std::sync::Arc;

use crate::config::EngineConfig;
use crate::core::converter::SubstitutionEngine;
use crate::core::dictionary::DictionaryBuilder;
use crate::core::selector::SelectorKind;
use crate::core::table::HomophoneTable;
use crate::core::types::{
    ConversionRequest, ConversionResult, DictionaryKind, Mode, SourceStats,
};
use crate::error::{HomophoneError, Result};
use crate::persistence::{load_snapshot, save_snapshot};

// The engine owns a shared, read-only table plus the policy it was configured with.
// Cloning is cheap, so one engine can be handed to any number of readers.
#[derive(Debug, Clone)]
pub struct HomophoneEngine {
    table: Arc<HomophoneTable>,
    config: EngineConfig,
}

impl HomophoneEngine {
    pub fn new(table: HomophoneTable, config: EngineConfig) -> Self {
        Self {
            table: Arc::new(table),
            config,
        }
    }

    /// Loads the configured snapshot if there is one, otherwise builds the
    /// table from the configured dictionaries.
    pub fn from_config(config: EngineConfig) -> Result<Self> {
        config.validate()?;

        if let Some(path) = config.snapshot.clone().filter(|p| p.exists()) {
            match load_snapshot(&path) {
                Ok(table) => return Ok(Self::new(table, config)),
                Err(e) if config.has_sources() => {
                    warn!("ignoring unreadable snapshot {}: {}", path.display(), e);
                }
                Err(e) => return Err(e),
            }
        }

        let table = build_from_sources(&config)?;
        Ok(Self::new(table, config))
    }

    pub fn table(&self) -> &HomophoneTable {
        &self.table
    }

    pub fn shared_table(&self) -> Arc<HomophoneTable> {
        Arc::clone(&self.table)
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn table_size(&self) -> usize {
        self.table.size()
    }

    pub fn sources(&self) -> &[SourceStats] {
        self.table.sources()
    }

    fn substitution(&self) -> SubstitutionEngine<'_, SelectorKind> {
        SubstitutionEngine::with_selector(&self.table, self.config.selector)
            .with_options(self.config.substitution_options())
    }

    pub fn convert_once(&self, text: &str, seed: u64) -> String {
        self.substitution().single(text, seed)
    }

    /// Several distinct substitutions. `count` is capped at `max_combinations`.
    pub fn convert_many(&self, text: &str, count: usize, seed: u64) -> Vec<String> {
        let limit = usize::try_from(self.config.max_combinations).unwrap_or(usize::MAX);
        self.substitution().multiple(text, count.min(limit), seed)
    }

    /// Full enumeration, refused when it would exceed `max_combinations`.
    pub fn enumerate_all(&self, text: &str) -> Result<Vec<String>> {
        let engine = self.substitution();
        let limit = self.config.max_combinations;
        match engine.combination_count(text) {
            Some(count) if count <= limit as u128 => Ok(engine.all_combinations(text)),
            count => Err(HomophoneError::TooManyCombinations {
                count: count.unwrap_or(u128::MAX),
                limit,
            }),
        }
    }

    /// Runs a collaborator request. `fallback_seed` is used when the
    /// request does not carry its own seed.
    pub fn handle(
        &self,
        request: &ConversionRequest,
        fallback_seed: u64,
    ) -> Result<ConversionResult> {
        let (text, count) = request.validate()?;
        let seed = request.seed.unwrap_or(fallback_seed);

        let (results, seed) = match request.mode {
            Mode::Once => (vec![self.convert_once(text, seed)], Some(seed)),
            Mode::Many => (self.convert_many(text, count, seed), Some(seed)),
            Mode::All => (self.enumerate_all(text)?, None),
        };

        Ok(ConversionResult {
            original: text.to_string(),
            results,
            seed,
        })
    }

    /// Writes the table to the configured snapshot path, if any.
    pub fn save_snapshot(&self) -> Result<()> {
        match &self.config.snapshot {
            Some(path) => save_snapshot(&self.table, path),
            None => Ok(()), // Don't error if no path is set
        }
    }

    pub fn save_snapshot_to(&self, path: &Path) -> Result<()> {
        save_snapshot(&self.table, path)
    }
}

fn build_from_sources(config: &EngineConfig) -> Result<HomophoneTable> {
    if !config.has_sources() {
        return Err(HomophoneError::config("no dictionary sources or snapshot configured"));
    }

    let mut builder = DictionaryBuilder::new();
    for path in &config.char_dictionaries {
        builder.add_file(path, DictionaryKind::Char)?;
    }
    for path in &config.word_dictionaries {
        builder.add_file(path, DictionaryKind::Word)?;
    }
    info!(
        "built table from {} dictionaries",
        config.char_dictionaries.len() + config.word_dictionaries.len()
    );
    Ok(builder.build())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::dictionary::build_table;

    fn engine() -> HomophoneEngine {
        let table = build_table(&["ma1\t妈\t马\t骂\nma5\t吗\t嘛"]);
        HomophoneEngine::new(table, EngineConfig::default())
    }

    #[test]
    fn test_handle_once() {
        let result = engine()
            .handle(&ConversionRequest::new("妈").with_seed(3), 0)
            .unwrap();
        assert_eq!(result.original, "妈");
        assert_eq!(result.results.len(), 1);
        assert_ne!(result.results[0], "妈");
        assert_eq!(result.seed, Some(3));
    }

    #[test]
    fn test_handle_uses_fallback_seed() {
        let engine = engine();
        let request = ConversionRequest::new("妈吗").with_mode(Mode::Many).with_count(2);
        let result = engine.handle(&request, 77).unwrap();
        assert_eq!(result.seed, Some(77));
        assert_eq!(result.results, engine.convert_many("妈吗", 2, 77));
    }

    #[test]
    fn test_handle_all() {
        let request = ConversionRequest::new("妈").with_mode(Mode::All);
        let result = engine().handle(&request, 0).unwrap();
        assert_eq!(result.results.len(), 3);
        assert_eq!(result.seed, None);
    }

    #[test]
    fn test_handle_rejects_missing_text() {
        let request = ConversionRequest::default();
        assert!(matches!(
            engine().handle(&request, 0),
            Err(HomophoneError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_enumeration_ceiling() {
        let table = build_table(&["ma1\t妈\t马\t骂"]);
        let config = EngineConfig {
            max_combinations: 8,
            ..EngineConfig::default()
        };
        let engine = HomophoneEngine::new(table, config);
        assert_eq!(engine.enumerate_all("妈").unwrap().len(), 3);
        match engine.enumerate_all("妈妈") {
            Err(HomophoneError::TooManyCombinations { count, limit }) => {
                assert_eq!(count, 9);
                assert_eq!(limit, 8);
            }
            other => panic!("expected ceiling error, got {other:?}"),
        }
    }

    #[test]
    fn test_many_count_is_capped() {
        let table = build_table(&["ma1\t妈\t马\t骂\t码\t玛\t蚂"]);
        let config = EngineConfig {
            max_combinations: 3,
            ..EngineConfig::default()
        };
        let engine = HomophoneEngine::new(table, config);
        let request = ConversionRequest::new("妈妈")
            .with_mode(Mode::Many)
            .with_count(usize::MAX);
        assert_eq!(engine.handle(&request, 9).unwrap().results.len(), 3);
    }

    #[test]
    fn test_from_config_without_sources() {
        let err = HomophoneEngine::from_config(EngineConfig::default()).unwrap_err();
        assert!(matches!(err, HomophoneError::Config(_)));
    }

    #[test]
    fn test_from_config_missing_dictionary() {
        let config = EngineConfig {
            char_dictionaries: vec!["/nonexistent/chars.txt".into()],
            ..EngineConfig::default()
        };
        let err = HomophoneEngine::from_config(config).unwrap_err();
        assert!(matches!(err, HomophoneError::SourceUnavailable { .. }));
    }

    #[test]
    fn test_clones_share_table() {
        let engine = engine();
        let other = engine.clone();
        assert!(Arc::ptr_eq(&engine.shared_table(), &other.shared_table()));
        assert_eq!(other.table_size(), 5);
    }
}

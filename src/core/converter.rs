// src/core/converter.rs
use log::debug;
use rayon::prelude::*;
use std::collections::HashSet;

use crate::core::selector::{attempt_seed, choose, position_seed, MixSelector, Selector};
use crate::core::table::HomophoneTable;

/// First and last code points of the CJK range treated as Han when
/// `han_only` is set.
const HAN_FIRST: char = '\u{4E00}';
const HAN_LAST: char = '\u{9FA5}';

pub fn is_han(c: char) -> bool {
    (HAN_FIRST..=HAN_LAST).contains(&c)
}

/// Tunable policy for a [`SubstitutionEngine`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubstitutionOptions {
    /// `multiple` gives up after `attempt_factor * count` attempts.
    pub attempt_factor: usize,
    /// Texts with at least this many code points are converted in parallel chunks.
    pub parallel_threshold: usize,
    pub chunk_size: usize,
    /// Only substitute CJK Unified Ideographs.
    pub han_only: bool,
}

impl Default for SubstitutionOptions {
    fn default() -> Self {
        Self {
            attempt_factor: 5,
            parallel_threshold: 4096,
            chunk_size: 1000,
            han_only: false,
        }
    }
}

/// Per-character homophone substitution over a borrowed table.
pub struct SubstitutionEngine<'t, S = MixSelector> {
    table: &'t HomophoneTable,
    selector: S,
    options: SubstitutionOptions,
}

impl<'t> SubstitutionEngine<'t, MixSelector> {
    pub fn new(table: &'t HomophoneTable) -> Self {
        Self::with_selector(table, MixSelector)
    }
}

impl<'t, S: Selector> SubstitutionEngine<'t, S> {
    pub fn with_selector(table: &'t HomophoneTable, selector: S) -> Self {
        Self {
            table,
            selector,
            options: SubstitutionOptions::default(),
        }
    }

    pub fn with_options(mut self, options: SubstitutionOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> &SubstitutionOptions {
        &self.options
    }

    /// Alternates eligible for `c` under the current options.
    pub fn alternates(&self, c: char) -> &'t [String] {
        if self.options.han_only && !is_han(c) {
            return &[];
        }
        self.table.lookup_char(c)
    }

    /// One randomized substitution. Unmapped characters pass through.
    ///
    /// Seeds are derived from the global code point position, so the
    /// chunked path returns exactly what the sequential path would.
    pub fn single(&self, text: &str, base_seed: u64) -> String {
        let chars: Vec<char> = text.chars().collect();
        let chunk_size = self.options.chunk_size.max(1);
        if chars.len() < self.options.parallel_threshold || chars.len() <= chunk_size {
            return self.convert_chunk(&chars, 0, base_seed);
        }

        debug!("converting {} chars in chunks of {}", chars.len(), chunk_size);
        chars
            .par_chunks(chunk_size)
            .enumerate()
            .map(|(i, chunk)| self.convert_chunk(chunk, i * chunk_size, base_seed))
            .collect::<Vec<String>>()
            .concat()
    }

    fn convert_chunk(&self, chunk: &[char], offset: usize, base_seed: u64) -> String {
        let mut out = String::with_capacity(chunk.len() * 3);
        let mut buf = [0u8; 4];
        for (i, &c) in chunk.iter().enumerate() {
            let alternates = self.alternates(c);
            if alternates.is_empty() {
                out.push(c);
                continue;
            }
            let original = c.encode_utf8(&mut buf);
            let seed = position_seed(base_seed, offset + i);
            let pick: &String = choose(&self.selector, alternates, original, seed);
            out.push_str(pick);
        }
        out
    }

    /// Up to `count` distinct substitutions, none equal to `text`.
    ///
    /// Attempts are bounded by `attempt_factor * count`; returning fewer
    /// results than asked for is normal when the homophone space is small.
    pub fn multiple(&self, text: &str, count: usize, base_seed: u64) -> Vec<String> {
        let mut results = Vec::new();
        if count == 0 || self.combination_count(text) == Some(1) {
            return results;
        }

        // every mapped position is always substituted, so this many outputs exist at most
        let reachable = self.substitution_count(text);
        let max_attempts = count.saturating_mul(self.options.attempt_factor.max(1));
        let mut seen = HashSet::new();
        let mut attempts = 0;
        while results.len() < count
            && attempts < max_attempts
            && reachable.map_or(true, |r| (results.len() as u128) < r)
        {
            let candidate = self.single(text, attempt_seed(base_seed, attempts as u64));
            attempts += 1;
            if candidate != text && seen.insert(candidate.clone()) {
                results.push(candidate);
            }
        }

        debug!(
            "collected {}/{} variants in {} attempts",
            results.len(),
            count,
            attempts
        );
        results
    }

    /// Size of the full enumeration, or `None` if it does not fit in a u128.
    pub fn combination_count(&self, text: &str) -> Option<u128> {
        text.chars().try_fold(1u128, |acc, c| {
            let alternates = self.alternates(c).len();
            let choices = if alternates == 0 { 1 } else { alternates + 1 };
            acc.checked_mul(choices as u128)
        })
    }

    /// Number of distinct outputs `single` can produce for `text`, or `None`
    /// on overflow. Unlike [`combination_count`](Self::combination_count) the
    /// original character is not a choice at mapped positions.
    pub fn substitution_count(&self, text: &str) -> Option<u128> {
        text.chars().try_fold(1u128, |acc, c| {
            let alternates = self.alternates(c).len();
            acc.checked_mul(alternates.max(1) as u128)
        })
    }

    /// Lazily walks the Cartesian product of every position's choices.
    pub fn combinations(&self, text: &str) -> Combinations<'t> {
        let slots: Vec<(char, &'t [String])> =
            text.chars().map(|c| (c, self.alternates(c))).collect();
        let cursor = vec![0; slots.len()];
        Combinations {
            slots,
            cursor,
            done: false,
        }
    }

    /// Every combination, the original text first. Uncapped: the output
    /// grows with the product of the per-character choice counts.
    pub fn all_combinations(&self, text: &str) -> Vec<String> {
        self.combinations(text).collect()
    }
}

/// Iterator over all substitutions of a text, in odometer order with the
/// last position varying fastest. Choice 0 at each position is the
/// original character.
pub struct Combinations<'t> {
    slots: Vec<(char, &'t [String])>,
    cursor: Vec<usize>,
    done: bool,
}

impl Combinations<'_> {
    fn current(&self) -> String {
        let mut out = String::new();
        for (&(c, alternates), &choice) in self.slots.iter().zip(&self.cursor) {
            if choice == 0 {
                out.push(c);
            } else {
                out.push_str(&alternates[choice - 1]);
            }
        }
        out
    }

    fn advance(&mut self) {
        for pos in (0..self.slots.len()).rev() {
            self.cursor[pos] += 1;
            if self.cursor[pos] <= self.slots[pos].1.len() {
                return;
            }
            self.cursor[pos] = 0;
        }
        self.done = true;
    }
}

impl Iterator for Combinations<'_> {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        if self.done {
            return None;
        }
        let item = self.current();
        self.advance();
        Some(item)
    }
}

/// One substitution of `text` with the default selector.
pub fn convert_once(table: &HomophoneTable, text: &str, seed: u64) -> String {
    SubstitutionEngine::new(table).single(text, seed)
}

pub fn convert_many(table: &HomophoneTable, text: &str, count: usize, seed: u64) -> Vec<String> {
    SubstitutionEngine::new(table).multiple(text, count, seed)
}

pub fn enumerate_all(table: &HomophoneTable, text: &str) -> Vec<String> {
    SubstitutionEngine::new(table).all_combinations(text)
}

pub fn table_size(table: &HomophoneTable) -> usize {
    table.size()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::dictionary::build_table;
    use crate::core::selector::SineSelector;

    const DICT: &str = "ma1\t妈\t马\t骂\nma5\t吗\t嘛\nshi4\t是\t事\t市\nA\tA\tB";

    fn sorted(mut v: Vec<String>) -> Vec<String> {
        v.sort();
        v
    }

    #[test]
    fn test_identity_on_empty_and_unmapped() {
        let table = build_table(&[DICT]);
        assert_eq!(convert_once(&table, "", 7), "");
        assert_eq!(convert_once(&table, "abc123", 7), "abc123");
    }

    #[test]
    fn test_single_never_returns_original_for_mapped_char() {
        let table = build_table(&[DICT]);
        for seed in 0..200 {
            let out = convert_once(&table, "妈", seed);
            assert!(out == "马" || out == "骂", "unexpected {out}");
        }
    }

    #[test]
    fn test_single_is_deterministic() {
        let table = build_table(&[DICT]);
        let text = "妈妈说是吗, ok";
        assert_eq!(convert_once(&table, text, 99), convert_once(&table, text, 99));
    }

    #[test]
    fn test_single_keeps_unmapped_in_place() {
        let table = build_table(&[DICT]);
        let out = convert_once(&table, "x妈y", 3);
        let chars: Vec<char> = out.chars().collect();
        assert_eq!(chars.len(), 3);
        assert_eq!(chars[0], 'x');
        assert_eq!(chars[2], 'y');
    }

    #[test]
    fn test_chunked_matches_sequential() {
        let table = build_table(&[DICT]);
        let text: String = "妈吗是，马事 ".repeat(500);
        let sequential = SubstitutionEngine::new(&table).with_options(SubstitutionOptions {
            parallel_threshold: usize::MAX,
            ..SubstitutionOptions::default()
        });
        let chunked = SubstitutionEngine::new(&table).with_options(SubstitutionOptions {
            parallel_threshold: 10,
            chunk_size: 37,
            ..SubstitutionOptions::default()
        });
        assert_eq!(sequential.single(&text, 1234), chunked.single(&text, 1234));
    }

    #[test]
    fn test_positions_get_distinct_seeds() {
        let table = build_table(&["ma1\t妈\t马\t骂\t码\t玛\t蚂\t犸"]);
        let out = convert_once(&table, &"妈".repeat(40), 5);
        let distinct: HashSet<char> = out.chars().collect();
        assert!(distinct.len() > 1, "every position chose the same alternate");
    }

    #[test]
    fn test_han_only_skips_other_scripts() {
        let table = build_table(&[DICT]);
        let engine = SubstitutionEngine::new(&table).with_options(SubstitutionOptions {
            han_only: true,
            ..SubstitutionOptions::default()
        });
        assert_eq!(engine.single("A", 1), "A");
        assert_ne!(engine.single("妈", 1), "妈");
        assert_eq!(convert_once(&table, "A", 1), "B");
    }

    #[test]
    fn test_multiple_distinct_and_bounded() {
        let table = build_table(&[DICT]);
        let text = "妈是吗";
        let results = convert_many(&table, text, 10, 42);
        assert!(results.len() <= 10);
        assert!(!results.is_empty());
        let unique: HashSet<&String> = results.iter().collect();
        assert_eq!(unique.len(), results.len());
        assert!(results.iter().all(|r| r != text));
    }

    #[test]
    fn test_multiple_underfills_small_space() {
        let table = build_table(&["ma1\t妈\t马\t骂\nma5\t吗\t嘛"]);
        let results = convert_many(&table, "妈吗", 10, 1);
        // 3 non-original combinations, but 吗 is always replaced by 嘛, so only 2 are reachable
        assert_eq!(sorted(results), vec!["马嘛".to_string(), "骂嘛".to_string()]);
    }

    #[test]
    fn test_multiple_stops_when_space_exhausted() {
        let table = build_table(&["ma1\t妈\t马\t骂"]);
        let engine = SubstitutionEngine::new(&table);
        assert_eq!(engine.substitution_count("妈x妈"), Some(4));
        let results = engine.multiple("妈", usize::MAX, 1);
        assert_eq!(sorted(results), vec!["马".to_string(), "骂".to_string()]);
    }

    #[test]
    fn test_multiple_on_unmapped_text_is_empty() {
        let table = build_table(&[DICT]);
        assert!(convert_many(&table, "hello", 5, 1).is_empty());
        assert!(convert_many(&table, "妈", 0, 1).is_empty());
    }

    #[test]
    fn test_multiple_is_deterministic() {
        let table = build_table(&[DICT]);
        assert_eq!(
            convert_many(&table, "妈是吗", 4, 8),
            convert_many(&table, "妈是吗", 4, 8)
        );
    }

    #[test]
    fn test_enumerate_single_char() {
        let table = build_table(&["ma1\t妈\t马\t骂"]);
        assert_eq!(
            sorted(enumerate_all(&table, "妈")),
            sorted(vec!["妈".into(), "马".into(), "骂".into()])
        );
    }

    #[test]
    fn test_enumerate_count_matches_product() {
        let table = build_table(&[DICT]);
        let text = "妈x是吗";
        let engine = SubstitutionEngine::new(&table);
        let all = engine.all_combinations(text);
        // (2 + 1) * 1 * (2 + 1) * (1 + 1)
        assert_eq!(all.len(), 18);
        assert_eq!(engine.combination_count(text), Some(18));
        assert_eq!(all[0], text);
        let unique: HashSet<&String> = all.iter().collect();
        assert_eq!(unique.len(), all.len());
    }

    #[test]
    fn test_enumerate_empty_text() {
        let table = build_table(&[DICT]);
        assert_eq!(enumerate_all(&table, ""), vec![String::new()]);
    }

    #[test]
    fn test_combinations_is_lazy() {
        let table = build_table(&["ma1\t妈\t马\t骂"]);
        let engine = SubstitutionEngine::new(&table);
        let text = "妈".repeat(60);
        assert_eq!(engine.combination_count(&text), Some(3u128.pow(60)));
        assert_eq!(engine.combinations(&text).take(5).count(), 5);
    }

    #[test]
    fn test_combination_count_overflow() {
        let table = build_table(&["ma1\t妈\t马\t骂"]);
        let engine = SubstitutionEngine::new(&table);
        assert_eq!(engine.combination_count(&"妈".repeat(100)), None);
    }

    #[test]
    fn test_sine_selector_engine() {
        let table = build_table(&[DICT]);
        let engine = SubstitutionEngine::with_selector(&table, SineSelector::default());
        for seed in 0..50 {
            let out = engine.single("妈", seed);
            assert!(out == "马" || out == "骂");
        }
    }

    #[test]
    fn test_table_size() {
        let table = build_table(&[DICT]);
        assert_eq!(table_size(&table), 10);
    }
}

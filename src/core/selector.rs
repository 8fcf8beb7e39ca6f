// src/core/selector.rs
//! Deterministic choice of one alternate from a seed.
//!
//! A [`Selector`] only maps a seed to a value in `[0, 1)`; [`choose`] turns
//! that value into an index and applies self-avoidance. Nothing here reads
//! the clock, so equal inputs always give equal choices.

use serde::{Deserialize, Serialize};

const GOLDEN_GAMMA: u64 = 0x9E37_79B9_7F4A_7C15;

/// Maps a seed onto the unit interval `[0, 1)`.
pub trait Selector: Sync {
    fn unit(&self, seed: u64) -> f64;

    /// Index into a list of `len` items. `len` must be non-zero.
    fn index(&self, len: usize, seed: u64) -> usize {
        let idx = (self.unit(seed) * len as f64).floor() as usize;
        idx.min(len - 1)
    }
}

/// SplitMix64 finalizer scaled to 53 bits. Adjacent seeds spread well.
#[derive(Debug, Clone, Copy, Default)]
pub struct MixSelector;

impl Selector for MixSelector {
    fn unit(&self, seed: u64) -> f64 {
        (splitmix64(seed) >> 11) as f64 / (1u64 << 53) as f64
    }
}

/// Fractional part of `sin(seed) * K`.
#[derive(Debug, Clone, Copy)]
pub struct SineSelector {
    pub scale: f64,
}

impl Default for SineSelector {
    fn default() -> Self {
        Self { scale: 10_000.0 }
    }
}

impl Selector for SineSelector {
    fn unit(&self, seed: u64) -> f64 {
        let x = (seed as f64).sin() * self.scale;
        let frac = x - x.floor();
        // floor() of a huge or NaN product can leave us outside [0, 1)
        if frac.is_finite() && (0.0..1.0).contains(&frac) {
            frac
        } else {
            0.0
        }
    }
}

/// Selector named in configuration files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SelectorKind {
    #[default]
    Mix,
    Sine,
}

impl Selector for SelectorKind {
    fn unit(&self, seed: u64) -> f64 {
        match self {
            SelectorKind::Mix => MixSelector.unit(seed),
            SelectorKind::Sine => SineSelector::default().unit(seed),
        }
    }
}

/// Picks an alternate for `original` from a non-empty list.
///
/// If the pick equals `original` and other choices exist, the next index
/// (cyclically) is taken instead.
pub fn choose<'a, S, T>(selector: &S, alternates: &'a [T], original: &str, seed: u64) -> &'a T
where
    S: Selector + ?Sized,
    T: AsRef<str>,
{
    assert!(!alternates.is_empty(), "choose() needs at least one alternate");
    let idx = selector.index(alternates.len(), seed);
    if alternates[idx].as_ref() == original && alternates.len() > 1 {
        return &alternates[(idx + 1) % alternates.len()];
    }
    &alternates[idx]
}

pub fn splitmix64(seed: u64) -> u64 {
    let mut z = seed.wrapping_add(GOLDEN_GAMMA);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

/// Seed for the code point at `position` (global, not chunk-relative).
pub fn position_seed(base: u64, position: usize) -> u64 {
    base.wrapping_add(position as u64)
}

/// Base seed for attempt `attempt` of a multi-result conversion.
pub fn attempt_seed(base: u64, attempt: u64) -> u64 {
    splitmix64(base ^ attempt.wrapping_mul(GOLDEN_GAMMA))
}

//! Random layer assignment for new nodes.
//!
//! Layers follow an exponentially decaying distribution,
//! `floor(-ln(uniform(0, 1)) * level_mult)` with `level_mult = 1 / ln(M)`, so each
//! layer holds roughly `1/M` of the nodes of the layer below it.

use rand::{Rng, RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::fmt;

/// Draws node layers from an owned random source.
///
/// The source is injected at construction; there is no global generator, so a
/// fixed seed and a fixed insertion order reproduce the exact same graph.
pub struct LevelGenerator {
    rng: Box<dyn RngCore + Send + Sync>,
    level_mult: f64,
    max_level: usize,
}

impl LevelGenerator {
    /// Creates a generator for the given `m`, capping levels at `max_layers - 1`.
    ///
    /// `m = 1` would make `1 / ln(m)` infinite, so `m` is clamped to at least 2
    /// when computing the multiplier.
    pub fn new(rng: Box<dyn RngCore + Send + Sync>, m: usize, max_layers: usize) -> Self {
        Self {
            rng,
            level_mult: 1.0 / (m.max(2) as f64).ln(),
            max_level: max_layers.saturating_sub(1),
        }
    }

    /// Generator backed by ChaCha8 seeded from `seed`, or from OS entropy when `None`.
    pub fn from_seed(seed: Option<u64>, m: usize, max_layers: usize) -> Self {
        let rng = match seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };
        Self::new(Box::new(rng), m, max_layers)
    }

    /// The level multiplier `1 / ln(M)`.
    pub fn level_mult(&self) -> f64 {
        self.level_mult
    }

    /// Draw the layer for the next node.
    pub fn next_level(&mut self) -> usize {
        // gen::<f64>() is in [0, 1); 1 - r is in (0, 1] so ln never sees zero
        let r: f64 = 1.0 - self.rng.gen::<f64>();
        let level = (-r.ln() * self.level_mult).floor() as usize;
        level.min(self.max_level)
    }
}

impl fmt::Debug for LevelGenerator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LevelGenerator")
            .field("level_mult", &self.level_mult)
            .field("max_level", &self.max_level)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_seed_same_levels() {
        let mut a = LevelGenerator::from_seed(Some(42), 16, 16);
        let mut b = LevelGenerator::from_seed(Some(42), 16, 16);
        let la: Vec<usize> = (0..1000).map(|_| a.next_level()).collect();
        let lb: Vec<usize> = (0..1000).map(|_| b.next_level()).collect();
        assert_eq!(la, lb);
    }

    #[test]
    fn test_level_distribution_decays() {
        let mut levels = LevelGenerator::from_seed(Some(1), 16, 16);
        let mut counts = [0usize; 16];
        for _ in 0..100_000 {
            counts[levels.next_level()] += 1;
        }
        // P(level >= 1) = 1/M = 6.25%
        let upper = 100_000 - counts[0];
        assert!(
            (5_000..7_500).contains(&upper),
            "expected ~6250 nodes above layer 0, got {upper}"
        );
        assert!(counts[1] > counts[2]);
    }

    #[test]
    fn test_max_layers_cap() {
        let mut levels = LevelGenerator::from_seed(Some(3), 2, 2);
        for _ in 0..10_000 {
            assert!(levels.next_level() <= 1);
        }
    }

    #[test]
    fn test_m_one_is_finite() {
        let levels = LevelGenerator::from_seed(Some(0), 1, 16);
        assert!(levels.level_mult().is_finite());
    }
}

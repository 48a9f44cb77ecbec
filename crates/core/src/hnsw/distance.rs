//! Distance metric implementations for HNSW search.
//!
//! Supports three distance functions: squared euclidean (L2²), cosine, and dot product.
//! Loops run over fixed-width chunks so the compiler can auto-vectorize them.

use serde::{Deserialize, Serialize};

const LANES: usize = 8;

/// Distance metric used for vector similarity computation.
///
/// Fixed when the index is created. All metrics return a distance value where
/// **lower is better** (more similar).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DistanceMetric {
    /// Squared Euclidean distance (L2²). Range: \[0, ∞). No square root; used only for ordering.
    #[default]
    Euclidean,
    /// Cosine distance: `1 - cosine_similarity`. Range: \[0, 2\].
    Cosine,
    /// Negative dot product: `-dot(a, b)`. Lower = higher similarity.
    DotProduct,
}

impl DistanceMetric {
    /// Distance between two f32 slices of equal length.
    #[inline]
    pub fn distance(&self, a: &[f32], b: &[f32]) -> f32 {
        debug_assert_eq!(a.len(), b.len());
        match self {
            DistanceMetric::Euclidean => euclidean_sq(a, b),
            DistanceMetric::Cosine => 1.0 - cosine_similarity(a, b),
            DistanceMetric::DotProduct => -dot_product(a, b),
        }
    }
}

/// Squared Euclidean distance between two f32 slices.
#[inline]
pub fn euclidean_sq(a: &[f32], b: &[f32]) -> f32 {
    let mut acc = [0.0f32; LANES];
    let a_chunks = a.chunks_exact(LANES);
    let b_chunks = b.chunks_exact(LANES);
    let tail: f32 = a_chunks
        .remainder()
        .iter()
        .zip(b_chunks.remainder())
        .map(|(x, y)| (x - y) * (x - y))
        .sum();
    for (ca, cb) in a_chunks.zip(b_chunks) {
        for i in 0..LANES {
            let d = ca[i] - cb[i];
            acc[i] += d * d;
        }
    }
    acc.iter().sum::<f32>() + tail
}

/// Dot product between two f32 slices.
#[inline]
pub fn dot_product(a: &[f32], b: &[f32]) -> f32 {
    let mut acc = [0.0f32; LANES];
    let a_chunks = a.chunks_exact(LANES);
    let b_chunks = b.chunks_exact(LANES);
    let tail: f32 = a_chunks
        .remainder()
        .iter()
        .zip(b_chunks.remainder())
        .map(|(x, y)| x * y)
        .sum();
    for (ca, cb) in a_chunks.zip(b_chunks) {
        for i in 0..LANES {
            acc[i] += ca[i] * cb[i];
        }
    }
    acc.iter().sum::<f32>() + tail
}

/// Cosine similarity between two f32 slices. Returns value in \[-1, 1\], or 0 for zero vectors.
#[inline]
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let denom = dot_product(a, a).sqrt() * dot_product(b, b).sqrt();
    if denom < 1e-10 {
        return 0.0;
    }
    dot_product(a, b) / denom
}

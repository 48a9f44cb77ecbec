//! Hierarchical Navigable Small World (HNSW) approximate nearest neighbor index.
//!
//! Vectors are stored as raw f32 values in one contiguous arena indexed by node id.
//! The graph uses a Struct-of-Arrays (SoA) layout: separate arrays for the vector
//! arena, layer assignments, and per-layer neighbor lists. Neighbor lists hold
//! plain `u32` ids, so back-references between nodes need no shared ownership.

/// Distance metrics: squared euclidean, cosine, and dot product.
pub mod distance;
/// HNSW graph structure, configuration, and data storage.
pub mod graph;
/// HNSW insertion algorithm with symmetric connections and heuristic pruning.
pub mod insert;
/// Random layer assignment from an injectable, seedable source.
pub mod level;
/// HNSW search: greedy descent, single-layer beam search, and multi-layer KNN.
pub mod search;
/// Generation-based visited set for efficient graph traversal.
pub mod visited;

pub use distance::DistanceMetric;
pub use graph::{HnswConfig, HnswIndex};
pub use level::LevelGenerator;
pub use search::Neighbor;

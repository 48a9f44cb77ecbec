//! # annbench-core
//!
//! In-memory HNSW (Hierarchical Navigable Small World) approximate nearest
//! neighbor index, built from scratch, with the helpers a recall benchmark needs.
//!
//! ```
//! use annbench_core::hnsw::{HnswConfig, HnswIndex};
//!
//! let config = HnswConfig { seed: Some(7), ..HnswConfig::default() };
//! let mut index = HnswIndex::new(2, config).unwrap();
//! index.insert(&[0.0, 0.0]).unwrap();
//! let far = index.insert(&[5.0, 5.0]).unwrap();
//!
//! let hits = index.search(&[4.5, 5.0], 1).unwrap();
//! assert_eq!(hits[0].id, far);
//! ```

/// Global configuration constants: defaults and limits.
pub mod config;
/// Error type shared by all index operations.
pub mod error;
/// Exact brute-force k-NN and recall@k measurement.
pub mod ground_truth;
/// HNSW approximate nearest neighbor index: graph, search, insertion and distance metrics.
pub mod hnsw;
/// Thread-safe handle over an index: parallel readers, exclusive writer.
pub mod shared;

pub use error::{HnswError, Result};
pub use hnsw::{DistanceMetric, HnswConfig, HnswIndex, Neighbor};
pub use shared::SharedIndex;

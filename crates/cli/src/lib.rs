//! # annbench
//!
//! Benchmark driver around `annbench-core`: reads a vector dataset from disk,
//! builds an HNSW index, searches one query and writes the neighbor ids.
//!
//! ```text
//! train/query files → dataset → HnswIndex (insert all) → search(query, k) → output.txt
//!                                                      ↘ recall@k vs ground truth
//! ```

/// Vector and ground-truth file readers (`.fvecs`, `.ivecs`, flat binary).
pub mod dataset;
/// Result sink: one id per line.
pub mod output;
/// End-to-end run: load, build, search, write.
pub mod run;

pub use run::{
    load_config, resolve_config, run, BenchParams, BenchReport, ConfigOverrides, RunError,
};

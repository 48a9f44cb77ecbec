//! Global configuration constants for annbench.
//!
//! Index tuning defaults and benchmark driver defaults are defined here.
//! These are compile-time constants; runtime configuration is handled through
//! [`HnswConfig`](crate::hnsw::HnswConfig), an optional JSON file, and CLI arguments.

/// Default number of bidirectional links per HNSW node.
///
/// Higher values improve recall but increase memory and build time.
/// Typical range: 8–64. Default: 16.
pub const HNSW_DEFAULT_M: usize = 16;

/// Default ef parameter during HNSW index construction.
///
/// Controls the size of the dynamic candidate list during insertion.
/// Higher values produce a better graph but slow down build time.
pub const HNSW_DEFAULT_EF_CONSTRUCTION: usize = 200;

/// Default ef parameter during HNSW search.
///
/// Controls the size of the dynamic candidate list during query.
/// Higher values improve recall at the cost of latency.
pub const HNSW_DEFAULT_EF_SEARCH: usize = 200;

/// Maximum number of layers in the HNSW graph.
///
/// Layer assignment is capped at `HNSW_DEFAULT_MAX_LAYERS - 1`. With M=16 the
/// chance of a node reaching layer 15 is about 16^-15, so the cap never binds
/// in practice.
pub const HNSW_DEFAULT_MAX_LAYERS: usize = 16;

/// Hard upper bound on the layer count; layers are stored as `u8`.
pub const HNSW_MAX_LAYERS_LIMIT: usize = 256;

/// Default number of nearest neighbors returned by the benchmark driver.
pub const DEFAULT_K: usize = 10;

/// Default path the benchmark driver writes result ids to.
pub const DEFAULT_OUTPUT_PATH: &str = "output.txt";

//! Error types for the index.

use thiserror::Error;

/// Errors returned by [`HnswIndex`](crate::hnsw::HnswIndex) operations.
///
/// Every error aborts a single operation and leaves the index unchanged.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum HnswError {
    /// Vector length differs from the index dimension.
    #[error("dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// The index dimension.
        expected: usize,
        /// The length of the rejected vector.
        actual: usize,
    },

    /// Search on an index with no nodes.
    #[error("index is empty")]
    EmptyIndex,

    /// Rejected configuration parameter.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// NaN or infinite component in an inserted or queried vector.
    #[error("invalid value at index {index}: {value}")]
    InvalidValue {
        /// Position of the offending component.
        index: usize,
        /// The offending value.
        value: f32,
    },

    /// The u32 id space is exhausted.
    #[error("index capacity exceeded: at most {max} nodes")]
    CapacityExceeded {
        /// Maximum number of nodes.
        max: usize,
    },
}

/// Result alias for index operations.
pub type Result<T> = std::result::Result<T, HnswError>;

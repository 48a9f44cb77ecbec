//! HNSW graph structure and configuration.
//!
//! [`HnswConfig`] defines tuning parameters (M, ef_construction, ef_search, distance metric).
//! [`HnswIndex`] stores the graph using Struct-of-Arrays layout for cache efficiency.

use crate::config;
use crate::error::{HnswError, Result};
use crate::hnsw::distance::DistanceMetric;
use crate::hnsw::level::LevelGenerator;
use rand::RngCore;
use serde::{Deserialize, Serialize};

/// Configuration parameters for an HNSW index.
///
/// Controls the trade-off between build speed, search speed, recall, and memory usage.
/// Every field has a default, so a JSON config file may set any subset of them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HnswConfig {
    /// Number of bidirectional links per node at layers >= 1. Layer 0 allows `2 * m`.
    pub m: usize,
    /// Candidate list size during index construction.
    pub ef_construction: usize,
    /// Candidate list size during search (higher = better recall, slower).
    pub ef_search: usize,
    /// Maximum number of layers in the graph.
    pub max_layers: usize,
    /// Distance function for similarity computation.
    pub distance_metric: DistanceMetric,
    /// Fill unused neighbor slots with the closest candidates the heuristic rejected.
    pub keep_pruned: bool,
    /// Seed for layer assignment. `None` seeds from OS entropy.
    pub seed: Option<u64>,
}

impl Default for HnswConfig {
    fn default() -> Self {
        Self {
            m: config::HNSW_DEFAULT_M,
            ef_construction: config::HNSW_DEFAULT_EF_CONSTRUCTION,
            ef_search: config::HNSW_DEFAULT_EF_SEARCH,
            max_layers: config::HNSW_DEFAULT_MAX_LAYERS,
            distance_metric: DistanceMetric::Euclidean,
            keep_pruned: true,
            seed: None,
        }
    }
}

impl HnswConfig {
    /// Maximum links per node at `layer`: `2 * m` at layer 0, `m` above.
    #[inline]
    pub fn max_degree(&self, layer: usize) -> usize {
        if layer == 0 {
            self.m * 2
        } else {
            self.m
        }
    }

    /// Check all parameters, returning the first violation.
    pub fn validate(&self) -> Result<()> {
        if self.m < 1 {
            return Err(HnswError::InvalidConfiguration("m must be at least 1".into()));
        }
        if self.ef_construction < 1 {
            return Err(HnswError::InvalidConfiguration(
                "ef_construction must be at least 1".into(),
            ));
        }
        if self.ef_search < 1 {
            return Err(HnswError::InvalidConfiguration(
                "ef_search must be at least 1".into(),
            ));
        }
        if self.max_layers < 1 || self.max_layers > config::HNSW_MAX_LAYERS_LIMIT {
            return Err(HnswError::InvalidConfiguration(format!(
                "max_layers must be in 1..={}, got {}",
                config::HNSW_MAX_LAYERS_LIMIT,
                self.max_layers
            )));
        }
        Ok(())
    }
}

/// HNSW Index using Struct-of-Arrays (SoA) layout for cache-friendly access.
/// Vector data is stored contiguously in an arena. No HnswNode struct.
///
/// `insert` needs `&mut self` and `search` only `&self`; the index is `Send + Sync`,
/// so any number of threads may search concurrently while no insert is running.
#[derive(Debug)]
pub struct HnswIndex {
    pub(crate) config: HnswConfig,
    // SoA: raw f32 vector arena, `dimension` floats per node
    pub(crate) vectors: Vec<f32>,
    // SoA: graph structure
    pub(crate) neighbors: Vec<Vec<Vec<u32>>>, // [node_id][layer][neighbor_ids]
    pub(crate) layers: Vec<u8>,
    // Index metadata
    pub(crate) entry_point: Option<u32>,
    pub(crate) max_layer: usize,
    /// `None` until the first insert when the dimension is inferred.
    pub(crate) dimension: Option<usize>,
    pub(crate) levels: LevelGenerator,
}

impl HnswIndex {
    /// Creates a new empty HNSW index with a fixed dimension.
    ///
    /// Layers are drawn from ChaCha8 seeded with `config.seed`.
    pub fn new(dimension: usize, config: HnswConfig) -> Result<Self> {
        if dimension == 0 {
            return Err(HnswError::InvalidConfiguration(
                "dimension must be at least 1".into(),
            ));
        }
        Self::build(Some(dimension), config, None)
    }

    /// Creates a new empty index whose dimension is taken from the first inserted vector.
    pub fn with_inferred_dimension(config: HnswConfig) -> Result<Self> {
        Self::build(None, config, None)
    }

    /// Creates a new empty index drawing layers from the given random source.
    /// `config.seed` is ignored.
    pub fn with_rng(
        dimension: usize,
        config: HnswConfig,
        rng: Box<dyn RngCore + Send + Sync>,
    ) -> Result<Self> {
        if dimension == 0 {
            return Err(HnswError::InvalidConfiguration(
                "dimension must be at least 1".into(),
            ));
        }
        Self::build(Some(dimension), config, Some(rng))
    }

    /// Creates a new empty index with default configuration (euclidean, M=16, ef_c=200).
    pub fn with_default_config(dimension: usize) -> Result<Self> {
        Self::new(dimension, HnswConfig::default())
    }

    fn build(
        dimension: Option<usize>,
        config: HnswConfig,
        rng: Option<Box<dyn RngCore + Send + Sync>>,
    ) -> Result<Self> {
        config.validate()?;
        let levels = match rng {
            Some(rng) => LevelGenerator::new(rng, config.m, config.max_layers),
            None => LevelGenerator::from_seed(config.seed, config.m, config.max_layers),
        };
        Ok(Self {
            config,
            vectors: Vec::new(),
            neighbors: Vec::new(),
            layers: Vec::new(),
            entry_point: None,
            max_layer: 0,
            dimension,
            levels,
        })
    }

    /// Returns the number of nodes in the index.
    #[inline]
    pub fn len(&self) -> usize {
        self.layers.len()
    }

    /// Returns `true` if the index contains no nodes.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// The vector dimension, or `None` if it is still to be inferred.
    pub fn dimension(&self) -> Option<usize> {
        self.dimension
    }

    pub fn config(&self) -> &HnswConfig {
        &self.config
    }

    /// Id of the node every traversal starts from.
    pub fn entry_point(&self) -> Option<u32> {
        self.entry_point
    }

    /// Highest occupied layer (0 for an empty index).
    pub fn max_layer(&self) -> usize {
        self.max_layer
    }

    /// Set the default beam width used by [`HnswIndex::search`].
    pub fn set_ef_search(&mut self, ef_search: usize) -> Result<()> {
        if ef_search < 1 {
            return Err(HnswError::InvalidConfiguration(
                "ef_search must be at least 1".into(),
            ));
        }
        self.config.ef_search = ef_search;
        Ok(())
    }

    /// Stored vector of a node. O(1) slice into the contiguous arena.
    ///
    /// # Panics
    /// Panics if `id` is not a node of this index.
    #[inline]
    pub fn vector(&self, id: u32) -> &[f32] {
        let dim = self.dimension.unwrap_or(0);
        let start = id as usize * dim;
        &self.vectors[start..start + dim]
    }

    /// Returns the layer assignment of the given node.
    ///
    /// # Panics
    /// Panics if `id` is not a node of this index.
    #[inline]
    pub fn get_layer(&self, id: u32) -> u8 {
        self.layers[id as usize]
    }

    /// Neighbor ids of `id` at `layer`; empty above the node's own layer.
    ///
    /// # Panics
    /// Panics if `id` is not a node of this index.
    #[inline]
    pub fn neighbors(&self, id: u32, layer: usize) -> &[u32] {
        self.neighbors[id as usize]
            .get(layer)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// The flat vector arena, `len() * dimension` floats in id order.
    pub fn vectors(&self) -> &[f32] {
        &self.vectors
    }

    /// Distance from `query` to the stored vector of `id`.
    #[inline]
    pub(crate) fn distance_to(&self, query: &[f32], id: u32) -> f32 {
        self.config.distance_metric.distance(query, self.vector(id))
    }

    /// Distance between two stored nodes.
    #[inline]
    pub(crate) fn distance_between(&self, a: u32, b: u32) -> f32 {
        self.config
            .distance_metric
            .distance(self.vector(a), self.vector(b))
    }

    /// Check a query or insert vector against the index dimension and reject
    /// NaN/infinite components. When the dimension is not yet fixed any
    /// non-empty length is accepted.
    pub(crate) fn check_vector(&self, vector: &[f32]) -> Result<()> {
        match self.dimension {
            Some(expected) if vector.len() != expected => {
                return Err(HnswError::DimensionMismatch {
                    expected,
                    actual: vector.len(),
                });
            }
            None if vector.is_empty() => {
                return Err(HnswError::DimensionMismatch {
                    expected: 1,
                    actual: 0,
                });
            }
            _ => {}
        }
        if let Some((index, &value)) = vector.iter().enumerate().find(|(_, v)| !v.is_finite()) {
            return Err(HnswError::InvalidValue { index, value });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = HnswConfig::default();
        assert_eq!(config.m, 16);
        assert_eq!(config.ef_construction, 200);
        assert_eq!(config.ef_search, 200);
        assert_eq!(config.distance_metric, DistanceMetric::Euclidean);
        assert_eq!(config.max_degree(0), 32);
        assert_eq!(config.max_degree(3), 16);
    }

    #[test]
    fn test_invalid_configuration() {
        for config in [
            HnswConfig { m: 0, ..HnswConfig::default() },
            HnswConfig { ef_construction: 0, ..HnswConfig::default() },
            HnswConfig { ef_search: 0, ..HnswConfig::default() },
            HnswConfig { max_layers: 0, ..HnswConfig::default() },
        ] {
            assert!(matches!(
                HnswIndex::new(4, config),
                Err(HnswError::InvalidConfiguration(_))
            ));
        }
        assert!(matches!(
            HnswIndex::with_default_config(0),
            Err(HnswError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_config_from_partial_json() {
        let config: HnswConfig =
            serde_json::from_str(r#"{"m": 8, "distance_metric": "cosine", "seed": 9}"#).unwrap();
        assert_eq!(config.m, 8);
        assert_eq!(config.ef_construction, 200);
        assert_eq!(config.distance_metric, DistanceMetric::Cosine);
        assert_eq!(config.seed, Some(9));
    }

    #[test]
    fn test_new_index_is_empty() {
        let index = HnswIndex::with_default_config(3).unwrap();
        assert!(index.is_empty());
        assert_eq!(index.len(), 0);
        assert_eq!(index.entry_point(), None);
        assert_eq!(index.dimension(), Some(3));
    }

    #[test]
    fn test_set_ef_search() {
        let mut index = HnswIndex::with_default_config(3).unwrap();
        index.set_ef_search(17).unwrap();
        assert_eq!(index.config().ef_search, 17);
        assert!(index.set_ef_search(0).is_err());
        assert_eq!(index.config().ef_search, 17);
    }

    #[test]
    fn test_check_vector_rejects_nan() {
        let index = HnswIndex::with_default_config(3).unwrap();
        assert_eq!(
            index.check_vector(&[0.0, f32::NAN, 1.0]).map_err(|e| match e {
                HnswError::InvalidValue { index, .. } => index,
                _ => usize::MAX,
            }),
            Err(1)
        );
    }
}

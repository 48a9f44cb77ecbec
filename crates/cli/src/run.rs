//! Benchmark driver: load a dataset, build the index, search one query, write the ids.

use crate::dataset::{self, DatasetError};
use crate::output;
use annbench_core::ground_truth::recall_at_k;
use annbench_core::{HnswConfig, HnswError, HnswIndex, Neighbor};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;
use thiserror::Error;

/// Log build progress every this many inserted vectors.
const PROGRESS_EVERY: usize = 100_000;

#[derive(Debug, Error)]
pub enum RunError {
    #[error(transparent)]
    Dataset(#[from] DatasetError),
    #[error("index error: {0}")]
    Index(#[from] HnswError),
    #[error("failed to read config {}: {source}", path.display())]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config {}: {source}", path.display())]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("query index {index} out of range ({count} queries)")]
    QueryOutOfRange { index: usize, count: usize },
    #[error("failed to write {}: {source}", path.display())]
    Output {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Inputs of one benchmark run.
#[derive(Debug, Clone)]
pub struct BenchParams {
    pub train: PathBuf,
    pub queries: PathBuf,
    /// Row of the query file to search with.
    pub query_index: usize,
    pub k: usize,
    pub config: HnswConfig,
    pub ground_truth: Option<PathBuf>,
    pub output: PathBuf,
}

/// What a run produced and how long it took.
#[derive(Debug, Clone)]
pub struct BenchReport {
    pub hits: Vec<Neighbor>,
    pub nodes: usize,
    pub max_layer: usize,
    pub build_secs: f64,
    pub query_micros: f64,
    /// Recall@k against the ground-truth row of the query, when ground truth was given.
    pub recall: Option<f64>,
}

impl BenchReport {
    pub fn ids(&self) -> Vec<u32> {
        self.hits.iter().map(|h| h.id).collect()
    }
}

/// Per-run parameter overrides, e.g. from command-line flags. `None` keeps the base value.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub m: Option<usize>,
    pub ef_construction: Option<usize>,
    pub ef_search: Option<usize>,
    pub seed: Option<u64>,
}

impl ConfigOverrides {
    pub fn apply(&self, config: &mut HnswConfig) {
        if let Some(m) = self.m {
            config.m = m;
        }
        if let Some(ef) = self.ef_construction {
            config.ef_construction = ef;
        }
        if let Some(ef) = self.ef_search {
            config.ef_search = ef;
        }
        if self.seed.is_some() {
            config.seed = self.seed;
        }
    }
}

/// Defaults, then the JSON file if any, then `overrides`.
pub fn resolve_config(
    file: Option<&Path>,
    overrides: &ConfigOverrides,
) -> Result<HnswConfig, RunError> {
    let mut config = match file {
        Some(path) => load_config(path)?,
        None => HnswConfig::default(),
    };
    overrides.apply(&mut config);
    Ok(config)
}

/// Parse an [`HnswConfig`] from a JSON file. Missing fields take their defaults.
pub fn load_config(path: &Path) -> Result<HnswConfig, RunError> {
    let text = fs::read_to_string(path).map_err(|source| RunError::ConfigRead {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&text).map_err(|source| RunError::ConfigParse {
        path: path.to_path_buf(),
        source,
    })
}

/// Build an index over every train vector and run a single top-k query.
pub fn run(params: &BenchParams) -> Result<BenchReport, RunError> {
    let train = dataset::read_vectors(&params.train)?;
    tracing::info!(
        vectors = train.len(),
        dim = train.dim,
        path = %params.train.display(),
        "loaded train vectors"
    );

    let queries = dataset::read_vectors(&params.queries)?;
    let query = queries
        .row(params.query_index)
        .ok_or(RunError::QueryOutOfRange {
            index: params.query_index,
            count: queries.len(),
        })?;

    // Validate the config and the query dimension before spending time on the build
    let mut index = HnswIndex::with_inferred_dimension(params.config.clone())?;
    if queries.dim != train.dim {
        return Err(HnswError::DimensionMismatch {
            expected: train.dim,
            actual: queries.dim,
        }
        .into());
    }

    tracing::info!(
        m = params.config.m,
        ef_construction = params.config.ef_construction,
        ef_search = params.config.ef_search,
        metric = ?params.config.distance_metric,
        "building index"
    );
    let t0 = Instant::now();
    for (i, row) in train.rows().enumerate() {
        index.insert(row)?;
        if (i + 1) % PROGRESS_EVERY == 0 {
            let rate = (i + 1) as f64 / t0.elapsed().as_secs_f64();
            tracing::info!(inserted = i + 1, total = train.len(), rate, "build progress");
        }
    }
    let build_secs = t0.elapsed().as_secs_f64();
    tracing::info!(nodes = index.len(), max_layer = index.max_layer(), build_secs, "index built");

    let t0 = Instant::now();
    let hits = index.search(query, params.k)?;
    let query_micros = t0.elapsed().as_secs_f64() * 1e6;

    let ids: Vec<u32> = hits.iter().map(|h| h.id).collect();
    let recall = match &params.ground_truth {
        Some(path) => {
            let truth = dataset::read_ground_truth(path)?;
            let row = truth.get(params.query_index).ok_or(RunError::QueryOutOfRange {
                index: params.query_index,
                count: truth.len(),
            })?;
            Some(recall_at_k(&ids, row, params.k))
        }
        None => None,
    };
    tracing::info!(
        k = params.k,
        returned = hits.len(),
        query_micros,
        recall = ?recall,
        "query complete"
    );

    output::write_ids(&params.output, &ids).map_err(|source| RunError::Output {
        path: params.output.clone(),
        source,
    })?;
    tracing::info!(path = %params.output.display(), "wrote top-{} neighbor ids", ids.len());

    Ok(BenchReport {
        hits,
        nodes: index.len(),
        max_layer: index.max_layer(),
        build_secs,
        query_micros,
        recall,
    })
}

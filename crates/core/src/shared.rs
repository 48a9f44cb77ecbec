//! Thread-safe shared handle over an [`HnswIndex`].
//!
//! Searches only read graph state and run in parallel under a read lock;
//! inserts mutate neighbor lists and the entry point, so they take the write lock.

use crate::error::Result;
use crate::hnsw::{HnswIndex, Neighbor};
use parking_lot::RwLock;
use std::sync::Arc;

/// Cloneable handle; all clones refer to the same index.
#[derive(Debug, Clone)]
pub struct SharedIndex {
    inner: Arc<RwLock<HnswIndex>>,
}

impl SharedIndex {
    pub fn new(index: HnswIndex) -> Self {
        Self {
            inner: Arc::new(RwLock::new(index)),
        }
    }

    /// Insert under the write lock. Blocks until running searches finish.
    pub fn insert(&self, vector: &[f32]) -> Result<u32> {
        self.inner.write().insert(vector)
    }

    /// Insert a batch under a single write lock, returning the assigned ids.
    /// Stops at the first invalid vector; vectors before it stay inserted.
    pub fn insert_batch<'a, I>(&self, vectors: I) -> Result<Vec<u32>>
    where
        I: IntoIterator<Item = &'a [f32]>,
    {
        let mut index = self.inner.write();
        vectors.into_iter().map(|v| index.insert(v)).collect()
    }

    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<Neighbor>> {
        self.inner.read().search(query, k)
    }

    pub fn search_with_ef(&self, query: &[f32], k: usize, ef: usize) -> Result<Vec<Neighbor>> {
        self.inner.read().search_with_ef(query, k, ef)
    }

    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }

    /// Run `f` with shared access to the index, e.g. to inspect the graph.
    pub fn read<T>(&self, f: impl FnOnce(&HnswIndex) -> T) -> T {
        f(&self.inner.read())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::HnswError;
    use crate::hnsw::HnswConfig;
    use std::thread;

    fn shared(dim: usize) -> SharedIndex {
        let config = HnswConfig {
            m: 8,
            ef_construction: 64,
            seed: Some(21),
            ..HnswConfig::default()
        };
        SharedIndex::new(HnswIndex::new(dim, config).unwrap())
    }

    #[test]
    fn test_clones_share_state() {
        let a = shared(2);
        let b = a.clone();
        a.insert(&[1.0, 1.0]).unwrap();
        assert_eq!(b.len(), 1);
        assert!(!b.is_empty());
    }

    #[test]
    fn test_insert_batch_stops_at_first_error() {
        let index = shared(2);
        let rows: Vec<Vec<f32>> = vec![vec![0.0, 0.0], vec![1.0], vec![2.0, 2.0]];
        let err = index.insert_batch(rows.iter().map(|r| r.as_slice()));
        assert!(matches!(err, Err(HnswError::DimensionMismatch { .. })));
        assert_eq!(index.len(), 1);
    }

    #[test]
    fn test_concurrent_searches_match_sequential() {
        let index = shared(3);
        let rows: Vec<Vec<f32>> = (0..300)
            .map(|i| {
                let t = i as f32;
                vec![(t * 0.1).sin(), (t * 0.07).cos(), t / 300.0]
            })
            .collect();
        index.insert_batch(rows.iter().map(|r| r.as_slice())).unwrap();

        let expected: Vec<Vec<Neighbor>> =
            rows.iter().step_by(10).map(|q| index.search(q, 5).unwrap()).collect();

        thread::scope(|s| {
            let handles: Vec<_> = (0..4)
                .map(|_| {
                    let index = index.clone();
                    let rows = &rows;
                    s.spawn(move || {
                        rows.iter()
                            .step_by(10)
                            .map(|q| index.search(q, 5).unwrap())
                            .collect::<Vec<_>>()
                    })
                })
                .collect();
            for handle in handles {
                assert_eq!(handle.join().unwrap(), expected);
            }
        });
    }

    #[test]
    fn test_search_while_inserting() {
        let index = shared(2);
        index.insert(&[0.0, 0.0]).unwrap();
        thread::scope(|s| {
            let writer = index.clone();
            s.spawn(move || {
                for i in 1..200 {
                    writer.insert(&[i as f32, 0.0]).unwrap();
                }
            });
            for _ in 0..50 {
                let hits = index.search(&[0.0, 0.0], 1).unwrap();
                assert_eq!(hits[0].id, 0);
            }
        });
        assert_eq!(index.len(), 200);
        index.read(|inner| assert_eq!(inner.len(), 200));
    }
}

//! HNSW search algorithms: greedy descent, single-layer beam search, and multi-layer KNN.
//!
//! All orderings use the `(distance, id)` pair, so equal distances resolve to the
//! lower id and repeated runs over the same graph return identical results.

use crate::error::{HnswError, Result};
use crate::hnsw::graph::HnswIndex;
use crate::hnsw::visited::VisitedSet;
use ordered_float::OrderedFloat;
use std::cell::RefCell;
use std::cmp::Ordering;
use std::collections::BinaryHeap;

thread_local! {
    /// Thread-local VisitedSet pool shared by search and insert.
    /// Reused across traversals on the same thread, so queries do not allocate per call.
    static VISITED: RefCell<VisitedSet> = RefCell::new(VisitedSet::default());
}

/// Run `f` with this thread's pooled visited set.
pub(crate) fn with_visited<T>(f: impl FnOnce(&mut VisitedSet) -> T) -> T {
    VISITED.with(|cell| f(&mut cell.borrow_mut()))
}

/// One search hit: a node id and its distance to the query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbor {
    pub id: u32,
    /// Distance under the index metric (squared for euclidean). Lower is closer.
    pub distance: f32,
}

/// An unexpanded node during beam search. Reversed order: `BinaryHeap` pops the closest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Candidate {
    distance: OrderedFloat<f32>,
    id: u32,
}

impl Ord for Candidate {
    fn cmp(&self, other: &Self) -> Ordering {
        (other.distance, other.id).cmp(&(self.distance, self.id))
    }
}

impl PartialOrd for Candidate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// A result entry. Max-heap by `(distance, id)`: the worst result sits on top for eviction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ResultEntry {
    distance: OrderedFloat<f32>,
    id: u32,
}

impl Ord for ResultEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.distance, self.id).cmp(&(other.distance, other.id))
    }
}

impl PartialOrd for ResultEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Greedy single-best-neighbor walk at one layer.
///
/// Starting from `start = (distance, id)`, repeatedly moves to the closest neighbor
/// of the current node until no neighbor improves on it. Returns the local minimum.
pub(crate) fn greedy_closest(
    index: &HnswIndex,
    query: &[f32],
    start: (f32, u32),
    layer: usize,
) -> (f32, u32) {
    let (mut best_dist, mut best) = start;
    loop {
        let mut moved = false;
        for &neighbor_id in index.neighbors(best, layer) {
            let dist = index.distance_to(query, neighbor_id);
            if (OrderedFloat(dist), neighbor_id) < (OrderedFloat(best_dist), best) {
                best_dist = dist;
                best = neighbor_id;
                moved = true;
            }
        }
        if !moved {
            return (best_dist, best);
        }
    }
}

/// Search a single layer of the HNSW graph.
///
/// Bounded best-first traversal from `entry_points`. Returns up to `ef` closest nodes
/// as `(distance, id)`, sorted ascending. `visited` is reset at the start of each call.
pub fn search_layer(
    index: &HnswIndex,
    query: &[f32],
    entry_points: &[u32],
    ef: usize,
    layer: usize,
    visited: &mut VisitedSet,
) -> Vec<(f32, u32)> {
    visited.reset(index.len());
    // Never more results than nodes
    let ef = ef.min(index.len()).max(1);
    let mut candidates: BinaryHeap<Candidate> = BinaryHeap::with_capacity(ef * 2);
    let mut results: BinaryHeap<ResultEntry> = BinaryHeap::with_capacity(ef + 1);

    for &ep in entry_points {
        if !visited.insert(ep) {
            continue;
        }
        let entry = ResultEntry {
            distance: OrderedFloat(index.distance_to(query, ep)),
            id: ep,
        };
        candidates.push(Candidate {
            distance: entry.distance,
            id: ep,
        });
        results.push(entry);
        if results.len() > ef {
            results.pop();
        }
    }

    while let Some(candidate) = candidates.pop() {
        // Closest unexpanded candidate is worse than everything kept: nothing left to improve
        if results.len() >= ef {
            if let Some(worst) = results.peek() {
                if (candidate.distance, candidate.id) > (worst.distance, worst.id) {
                    break;
                }
            }
        }

        for &neighbor_id in index.neighbors(candidate.id, layer) {
            if !visited.insert(neighbor_id) {
                continue;
            }
            let entry = ResultEntry {
                distance: OrderedFloat(index.distance_to(query, neighbor_id)),
                id: neighbor_id,
            };
            let should_add =
                results.len() < ef || results.peek().is_some_and(|worst| entry < *worst);
            if should_add {
                candidates.push(Candidate {
                    distance: entry.distance,
                    id: neighbor_id,
                });
                results.push(entry);
                if results.len() > ef {
                    results.pop(); // remove worst
                }
            }
        }
    }

    results
        .into_sorted_vec()
        .into_iter()
        .map(|r| (r.distance.0, r.id))
        .collect()
}

impl HnswIndex {
    /// Approximate k nearest neighbors of `query`, nearest first.
    ///
    /// Uses `ef = max(ef_search, k)` at layer 0.
    ///
    /// # Errors
    /// [`HnswError::EmptyIndex`] when no node has been inserted,
    /// [`HnswError::DimensionMismatch`] when `query.len()` differs from the index dimension.
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<Neighbor>> {
        self.search_with_ef(query, k, self.config.ef_search)
    }

    /// Same as [`HnswIndex::search`] with an explicit layer-0 beam width.
    pub fn search_with_ef(&self, query: &[f32], k: usize, ef: usize) -> Result<Vec<Neighbor>> {
        let entry_point = self.entry_point.ok_or(HnswError::EmptyIndex)?;
        self.check_vector(query)?;
        if ef < 1 {
            return Err(HnswError::InvalidConfiguration(
                "ef must be at least 1".into(),
            ));
        }
        if k == 0 {
            return Ok(Vec::new());
        }

        // Traverse from top layer down to layer 1 with single-best-neighbor walks
        let mut current = (self.distance_to(query, entry_point), entry_point);
        for layer in (1..=self.max_layer).rev() {
            current = greedy_closest(self, query, current, layer);
        }

        let ef = ef.max(k).min(self.len());
        let mut results = with_visited(|visited| {
            search_layer(self, query, &[current.1], ef, 0, visited)
        });
        results.truncate(k);

        tracing::trace!(k, ef, returned = results.len(), "knn search");
        Ok(results
            .into_iter()
            .map(|(distance, id)| Neighbor { id, distance })
            .collect())
    }
}

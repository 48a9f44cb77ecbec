//! Exact nearest neighbors by linear scan, and recall measurement against them.

use crate::hnsw::{DistanceMetric, Neighbor};
use ordered_float::OrderedFloat;
use std::collections::{BinaryHeap, HashSet};

/// Exact k nearest neighbors of `query` among `vectors` (flat, `dim` floats per row).
///
/// Row `i` has id `i`. Returns at most `k` hits sorted by `(distance, id)`.
pub fn brute_force_knn(
    vectors: &[f32],
    dim: usize,
    query: &[f32],
    k: usize,
    metric: DistanceMetric,
) -> Vec<Neighbor> {
    if k == 0 || dim == 0 {
        return Vec::new();
    }
    // Max-heap of the k best so far; the worst is on top
    let capacity = k.min(vectors.len() / dim) + 1;
    let mut heap: BinaryHeap<(OrderedFloat<f32>, u32)> = BinaryHeap::with_capacity(capacity);
    for (id, row) in vectors.chunks_exact(dim).enumerate() {
        heap.push((OrderedFloat(metric.distance(query, row)), id as u32));
        if heap.len() > k {
            heap.pop();
        }
    }
    heap.into_sorted_vec()
        .into_iter()
        .map(|(distance, id)| Neighbor {
            id,
            distance: distance.0,
        })
        .collect()
}

/// Compute Recall@k: fraction of the first `k` true neighbors found in the first `k` predictions.
///
/// The denominator is `min(k, truth.len())`; an empty truth set gives 1.0.
pub fn recall_at_k(predicted: &[u32], truth: &[u32], k: usize) -> f64 {
    let truth_set: HashSet<u32> = truth.iter().take(k).copied().collect();
    if truth_set.is_empty() {
        return 1.0;
    }
    let found = predicted
        .iter()
        .take(k)
        .filter(|id| truth_set.contains(id))
        .count();
    found as f64 / truth_set.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_brute_force_order_and_ties() {
        // ids 1 and 3 are equidistant from the query
        let vectors = vec![0.0, 2.0, 5.0, 4.0, 9.0];
        let hits = brute_force_knn(&vectors, 1, &[3.0], 3, DistanceMetric::Euclidean);
        let ids: Vec<u32> = hits.iter().map(|h| h.id).collect();
        assert_eq!(ids, vec![1, 3, 2]);
        assert_eq!(hits[0].distance, 1.0);
    }

    #[test]
    fn test_brute_force_k_exceeds_rows() {
        let vectors = vec![1.0, 1.0, 2.0, 2.0];
        let hits = brute_force_knn(&vectors, 2, &[0.0, 0.0], 10, DistanceMetric::Euclidean);
        assert_eq!(hits.len(), 2);
    }

    #[test]
    fn test_brute_force_unbounded_k() {
        let vectors = vec![3.0, 1.0, 2.0];
        let hits = brute_force_knn(&vectors, 1, &[0.0], usize::MAX, DistanceMetric::Euclidean);
        let ids: Vec<u32> = hits.iter().map(|h| h.id).collect();
        assert_eq!(ids, vec![1, 2, 0]);
    }

    #[test]
    fn test_recall_at_k() {
        assert_eq!(recall_at_k(&[1, 2, 3], &[1, 2, 3], 3), 1.0);
        assert_eq!(recall_at_k(&[1, 9, 8, 2], &[1, 2, 3, 4], 4), 0.5);
        // Only the first k predictions count
        assert_eq!(recall_at_k(&[9, 1], &[1, 2], 1), 0.0);
        assert_eq!(recall_at_k(&[], &[], 10), 1.0);
    }
}

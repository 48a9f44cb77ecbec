//! HNSW insertion algorithm.
//!
//! Inserts a vector into the HNSW graph with symmetric connections and
//! heuristic neighbor pruning (Algorithm 4 from the HNSW paper, without
//! candidate extension). Edges are kept symmetric: whenever pruning drops
//! `a -> b`, it also drops `b -> a`.

use crate::error::{HnswError, Result};
use crate::hnsw::graph::HnswIndex;
use crate::hnsw::search::{greedy_closest, search_layer, with_visited};
use ordered_float::OrderedFloat;

impl HnswIndex {
    /// Insert a vector and return its id. Ids are assigned in insertion order from 0.
    ///
    /// The vector is validated before anything is mutated: on error the graph, the
    /// vector arena and the random source are left untouched.
    ///
    /// # Errors
    /// [`HnswError::DimensionMismatch`] for a wrong-length vector (or an empty first
    /// vector when the dimension is inferred), [`HnswError::InvalidValue`] for NaN or
    /// infinite components, [`HnswError::CapacityExceeded`] once `u32` ids run out.
    pub fn insert(&mut self, vector: &[f32]) -> Result<u32> {
        self.check_vector(vector)?;
        if self.len() >= u32::MAX as usize {
            return Err(HnswError::CapacityExceeded {
                max: u32::MAX as usize,
            });
        }

        let internal_id = self.len() as u32;
        if self.dimension.is_none() {
            self.dimension = Some(vector.len());
            tracing::debug!(dimension = vector.len(), "dimension inferred from first vector");
        }
        let level = self.levels.next_level();

        // First node: becomes the entry point with empty neighbor lists
        let Some(entry_point) = self.entry_point else {
            self.push_node(vector, level, vec![Vec::new(); level + 1]);
            self.entry_point = Some(internal_id);
            self.max_layer = level;
            return Ok(internal_id);
        };

        // Phase 1: Greedily descend from the top layer down to the node's level + 1
        let mut current = (self.distance_to(vector, entry_point), entry_point);
        for layer in (level + 1..=self.max_layer).rev() {
            current = greedy_closest(self, vector, current, layer);
        }

        // Phase 2: Beam-search each shared layer and select neighbors for the new node.
        // The node is not in the graph yet, so every search sees the previous state.
        let top = level.min(self.max_layer);
        let mut node_neighbors: Vec<Vec<u32>> = vec![Vec::new(); level + 1];
        with_visited(|visited| {
            let mut layer_eps: Vec<u32> = vec![current.1];
            for layer in (0..=top).rev() {
                let candidates = search_layer(
                    self,
                    vector,
                    &layer_eps,
                    self.config.ef_construction,
                    layer,
                    visited,
                );
                let selected = select_neighbors(
                    &candidates,
                    self.config.max_degree(layer),
                    self.config.keep_pruned,
                    &[],
                    |a, b| self.distance_between(a, b),
                );
                node_neighbors[layer] = selected.iter().map(|&(_, id)| id).collect();

                // Candidates of this layer seed the search one layer down
                layer_eps.clear();
                layer_eps.extend(candidates.iter().map(|&(_, id)| id));
            }
        });

        self.push_node(vector, level, node_neighbors);

        // Phase 3: Add back-links and prune neighbors that went over capacity
        for layer in 0..=top {
            let max_degree = self.config.max_degree(layer);
            let my_neighbors = self.neighbors[internal_id as usize][layer].clone();
            for neighbor_id in my_neighbors {
                let list = &mut self.neighbors[neighbor_id as usize][layer];
                list.push(internal_id);
                if list.len() > max_degree {
                    self.shrink_neighbors(neighbor_id, layer);
                }
            }
        }

        // Update entry point if new node has higher layer
        if level > self.max_layer {
            tracing::debug!(
                node = internal_id,
                from = self.max_layer,
                to = level,
                "entry point promoted"
            );
            self.max_layer = level;
            self.entry_point = Some(internal_id);
        }

        Ok(internal_id)
    }

    /// Append a node's vector, layer and neighbor lists to the SoA arrays.
    fn push_node(&mut self, vector: &[f32], level: usize, neighbors: Vec<Vec<u32>>) {
        self.vectors.extend_from_slice(vector);
        // level < max_layers <= 256
        self.layers.push(level as u8);
        self.neighbors.push(neighbors);
    }

    /// Prune `node`'s list at `layer` back to the degree bound.
    ///
    /// Neighbors whose only edge at this layer points to `node` are kept ahead of the
    /// heuristic. Every dropped edge is removed from both endpoints.
    fn shrink_neighbors(&mut self, node: u32, layer: usize) {
        let max_degree = self.config.max_degree(layer);
        let current = std::mem::take(&mut self.neighbors[node as usize][layer]);
        let candidates: Vec<(f32, u32)> = current
            .iter()
            .map(|&cid| (self.distance_between(node, cid), cid))
            .collect();
        let protected: Vec<u32> = current
            .iter()
            .copied()
            .filter(|&cid| self.neighbors(cid, layer).len() == 1)
            .collect();

        let kept: Vec<u32> = select_neighbors(
            &candidates,
            max_degree,
            self.config.keep_pruned,
            &protected,
            |a, b| self.distance_between(a, b),
        )
        .into_iter()
        .map(|(_, id)| id)
        .collect();

        for &dropped in current.iter().filter(|&&id| !kept.contains(&id)) {
            let back = &mut self.neighbors[dropped as usize][layer];
            back.retain(|&id| id != node);
            if back.is_empty() {
                self.relink_orphan(dropped, &kept, layer);
            }
        }
        self.neighbors[node as usize][layer] = kept;
    }

    /// Reconnect a node that lost its last edge at `layer` to the closest of
    /// `near` that still has room.
    fn relink_orphan(&mut self, orphan: u32, near: &[u32], layer: usize) {
        let max_degree = self.config.max_degree(layer);
        let target = near
            .iter()
            .copied()
            .filter(|&id| id != orphan && self.neighbors(id, layer).len() < max_degree)
            .min_by_key(|&id| (OrderedFloat(self.distance_between(orphan, id)), id));

        match target {
            Some(target) => {
                self.neighbors[orphan as usize][layer].push(target);
                self.neighbors[target as usize][layer].push(orphan);
            }
            None => {
                tracing::debug!(
                    node = orphan,
                    layer,
                    "no neighbor with spare capacity, node left without edges"
                );
            }
        }
    }
}

/// Heuristic neighbor selection (Algorithm 4 from the HNSW paper).
///
/// Visits `candidates` (`(distance_to_base, id)`) in ascending `(distance, id)` order and
/// accepts a candidate unless it is strictly closer to an already accepted neighbor than to
/// the base. `protected` ids are accepted first, before any other candidate. With
/// `keep_pruned`, free slots are filled with the closest rejected candidates.
///
/// Returns at most `m` entries sorted by `(distance, id)`.
pub fn select_neighbors<D>(
    candidates: &[(f32, u32)],
    m: usize,
    keep_pruned: bool,
    protected: &[u32],
    distance_between: D,
) -> Vec<(f32, u32)>
where
    D: Fn(u32, u32) -> f32,
{
    let key = |&(dist, id): &(f32, u32)| (OrderedFloat(dist), id);
    let mut sorted = candidates.to_vec();
    sorted.sort_unstable_by_key(key);

    let mut selected: Vec<(f32, u32)> = Vec::with_capacity(m);
    for &candidate in sorted.iter().filter(|(_, id)| protected.contains(id)) {
        if selected.len() >= m {
            break;
        }
        selected.push(candidate);
    }

    let mut rejected: Vec<(f32, u32)> = Vec::new();
    for &(dist_to_base, cid) in &sorted {
        if selected.len() >= m {
            break;
        }
        if protected.contains(&cid) {
            continue;
        }
        let is_diverse = selected
            .iter()
            .all(|&(_, sid)| dist_to_base <= distance_between(cid, sid));
        if is_diverse {
            selected.push((dist_to_base, cid));
        } else {
            rejected.push((dist_to_base, cid));
        }
    }

    if keep_pruned {
        let free = m.saturating_sub(selected.len());
        selected.extend(rejected.into_iter().take(free));
    }

    selected.sort_unstable_by_key(key);
    selected
}

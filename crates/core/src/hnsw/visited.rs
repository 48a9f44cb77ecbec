//! Epoch-stamped visited set for HNSW graph traversal.
//!
//! A `HashSet<u32>` would hash every expanded id and reallocate per query. Here each
//! node id indexes a stamp array; a node counts as visited when its stamp equals the
//! current epoch, so starting a new traversal is a single increment.

#[derive(Debug, Default)]
pub struct VisitedSet {
    stamps: Vec<u32>,
    epoch: u32,
}

impl VisitedSet {
    pub fn new(capacity: usize) -> Self {
        Self {
            stamps: vec![0; capacity],
            epoch: 1,
        }
    }

    /// Start a new traversal over ids `0..node_count`.
    ///
    /// Grows the stamp array when the index has grown since the last call and
    /// advances the epoch. Stamps are zeroed only when the epoch wraps.
    pub fn reset(&mut self, node_count: usize) {
        if node_count > self.stamps.len() {
            self.stamps.resize(node_count, 0);
        }
        if self.epoch == u32::MAX {
            self.stamps.fill(0);
            self.epoch = 1;
        } else {
            self.epoch += 1;
        }
    }

    /// Mark `id` as visited. Returns `true` if it was not visited before in this traversal.
    #[inline]
    pub fn insert(&mut self, id: u32) -> bool {
        let slot = &mut self.stamps[id as usize];
        if *slot == self.epoch {
            false
        } else {
            *slot = self.epoch;
            true
        }
    }

    #[inline]
    pub fn contains(&self, id: u32) -> bool {
        self.stamps[id as usize] == self.epoch
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_and_reset() {
        let mut vs = VisitedSet::new(4);
        vs.reset(4);
        assert!(vs.insert(0));
        assert!(!vs.insert(0));
        assert!(vs.contains(0));
        assert!(!vs.contains(3));

        vs.reset(4);
        assert!(!vs.contains(0));
        assert!(vs.insert(0));
    }

    #[test]
    fn test_reset_grows() {
        let mut vs = VisitedSet::default();
        vs.reset(10);
        assert!(vs.insert(9));
    }

    #[test]
    fn test_epoch_wraparound() {
        let mut vs = VisitedSet::new(8);
        vs.epoch = u32::MAX - 1;
        vs.reset(8);
        assert_eq!(vs.epoch, u32::MAX);
        vs.insert(5);

        // Next reset zeroes the stamps and restarts at 1
        vs.reset(8);
        assert_eq!(vs.epoch, 1);
        assert!(vs.insert(5));
    }
}

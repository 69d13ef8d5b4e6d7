use std::collections::VecDeque;

/// Default number of sale ids remembered between poll cycles.
pub const DEFAULT_CAPACITY: usize = 100;

/// Bounded, insertion-ordered memory of recently seen sale ids.
///
/// `record` appends without checking for duplicates and never evicts; only
/// `trim` drops entries, oldest first. An id that has been trimmed away is
/// treated as new if the feed sends it again.
#[derive(Debug, Clone)]
pub struct DedupWindow {
    ids: VecDeque<i64>,
    capacity: usize,
}

impl DedupWindow {
    pub fn new(capacity: usize) -> Self {
        Self {
            ids: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn seen(&self, id: i64) -> bool {
        self.ids.contains(&id)
    }

    pub fn record(&mut self, id: i64) {
        self.ids.push_back(id);
    }

    /// Keeps the most recently recorded `capacity` ids and returns how many
    /// were evicted.
    pub fn trim(&mut self) -> usize {
        let excess = self.ids.len().saturating_sub(self.capacity);
        self.ids.drain(..excess);
        excess
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Oldest first.
    pub fn iter(&self) -> impl Iterator<Item = i64> + '_ {
        self.ids.iter().copied()
    }
}

impl Default for DedupWindow {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

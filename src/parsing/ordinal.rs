use std::collections::HashMap;
use std::hash::Hash;

/// Picks the Nth occurrence of each field from a stream of repeated,
/// unaddressed blocks.
///
/// Counters are kept per field because MegaCLI does not group fields
/// uniformly: a block may omit one field or print another twice, and a
/// single shared counter would drift.
#[derive(Debug, Clone)]
pub struct OrdinalSelector<F> {
    target: usize,
    counters: HashMap<F, usize>,
}

impl<F: Copy + Eq + Hash> OrdinalSelector<F> {
    pub fn new(target: usize) -> Self {
        Self {
            target,
            counters: HashMap::new(),
        }
    }

    /// Record one occurrence of `field`. Returns true when this occurrence
    /// is the requested one and its value should be committed.
    pub fn offer(&mut self, field: F) -> bool {
        let counter = self.counters.entry(field).or_insert(0);
        let selected = *counter == self.target;
        *counter += 1;
        selected
    }

    /// Occurrences of `field` seen so far
    pub fn occurrences(&self, field: F) -> usize {
        self.counters.get(&field).copied().unwrap_or(0)
    }
}

//! Set of touched stops with O(touched) clearing.

/// A set of stop indices that remembers insertion order.
///
/// Clearing only resets the stops that were inserted, so a round that
/// touches a handful of stops does not pay for the whole network.
#[derive(Debug, Clone, Default)]
pub struct StopSet {
    marked: Vec<bool>,
    stops: Vec<usize>,
}

impl StopSet {
    pub fn new(number_of_stops: usize) -> Self {
        Self {
            marked: vec![false; number_of_stops],
            stops: Vec::new(),
        }
    }

    /// Insert `stop`, returning true if it was not already present.
    pub fn insert(&mut self, stop: usize) -> bool {
        if self.marked[stop] {
            return false;
        }
        self.marked[stop] = true;
        self.stops.push(stop);
        true
    }

    pub fn contains(&self, stop: usize) -> bool {
        self.marked.get(stop).copied().unwrap_or(false)
    }

    pub fn clear(&mut self) {
        for stop in self.stops.drain(..) {
            self.marked[stop] = false;
        }
    }

    pub fn is_empty(&self) -> bool {
        self.stops.is_empty()
    }

    pub fn len(&self) -> usize {
        self.stops.len()
    }

    pub fn as_slice(&self) -> &[usize] {
        &self.stops
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_is_idempotent() {
        let mut set = StopSet::new(4);
        assert!(set.insert(2));
        assert!(!set.insert(2));
        assert!(set.insert(0));
        assert_eq!(set.as_slice(), &[2, 0]);
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn clear_resets_membership() {
        let mut set = StopSet::new(3);
        set.insert(1);
        set.clear();
        assert!(set.is_empty());
        assert!(!set.contains(1));
        assert!(set.insert(1));
    }

    #[test]
    fn contains_out_of_range_is_false() {
        let set = StopSet::new(1);
        assert!(!set.contains(9));
    }
}

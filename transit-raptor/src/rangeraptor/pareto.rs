//! Pareto sets over arbitrary criteria.
//!
//! Dominance is expressed through a single predicate,
//! `left_dominance_exist(l, r)`: true if `l` is strictly better than `r` in
//! at least one criterion. When a value is added each existing element is
//! compared both ways:
//!
//! - both have an advantage: they are mutually non-dominating, keep both;
//! - only the new value has one: the existing element is dropped;
//! - otherwise (the new value is worse or equal): the new value is rejected.
//!
//! Rejecting equal values keeps re-insertion idempotent.

/// Dominance predicate for a Pareto set.
pub trait ParetoComparator<T> {
    /// True if `left` is strictly better than `right` in at least one
    /// criterion.
    fn left_dominance_exist(&self, left: &T, right: &T) -> bool;
}

impl<T, F> ParetoComparator<T> for F
where
    F: Fn(&T, &T) -> bool,
{
    fn left_dominance_exist(&self, left: &T, right: &T) -> bool {
        self(left, right)
    }
}

/// Observer for changes in a Pareto set, used for debugging.
pub trait ParetoSetEventListener<T> {
    fn accepted(&mut self, _value: &T) {}
    fn rejected(&mut self, _value: &T, _rejected_by: &T) {}
    fn dropped(&mut self, _value: &T, _dropped_by: &T) {}
}

impl<T> ParetoSetEventListener<T> for () {}

/// A set where no element dominates another.
#[derive(Debug, Clone)]
pub struct ParetoSet<T> {
    elements: Vec<T>,
}

impl<T> Default for ParetoSet<T> {
    fn default() -> Self {
        Self {
            elements: Vec::new(),
        }
    }
}

impl<T> ParetoSet<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `value`, returning true if it was accepted.
    pub fn add<C>(&mut self, value: T, comparator: &C) -> bool
    where
        C: ParetoComparator<T>,
    {
        self.add_with(value, comparator, &mut ())
    }

    /// Add `value`, reporting accepted, rejected and dropped elements.
    pub fn add_with<C, L>(&mut self, value: T, comparator: &C, listener: &mut L) -> bool
    where
        C: ParetoComparator<T>,
        L: ParetoSetEventListener<T>,
    {
        if let Some(existing) = self
            .elements
            .iter()
            .find(|e| !comparator.left_dominance_exist(&value, e))
        {
            listener.rejected(&value, existing);
            return false;
        }
        self.elements.retain(|e| {
            let keep = comparator.left_dominance_exist(e, &value);
            if !keep {
                listener.dropped(e, &value);
            }
            keep
        });
        listener.accepted(&value);
        self.elements.push(value);
        true
    }

    /// True if `value` would be accepted, without adding it.
    pub fn qualify<C>(&self, value: &T, comparator: &C) -> bool
    where
        C: ParetoComparator<T>,
    {
        self.elements
            .iter()
            .all(|e| comparator.left_dominance_exist(value, e))
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.elements.iter()
    }

    pub fn as_slice(&self) -> &[T] {
        &self.elements
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn clear(&mut self) {
        self.elements.clear();
    }
}

impl<'a, T> IntoIterator for &'a ParetoSet<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.elements.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// (time, cost): lower is better for both.
    fn two_criteria(l: &(i32, i32), r: &(i32, i32)) -> bool {
        l.0 < r.0 || l.1 < r.1
    }

    #[derive(Default)]
    struct Recorder {
        accepted: Vec<(i32, i32)>,
        rejected: Vec<(i32, i32)>,
        dropped: Vec<(i32, i32)>,
    }

    impl ParetoSetEventListener<(i32, i32)> for Recorder {
        fn accepted(&mut self, value: &(i32, i32)) {
            self.accepted.push(*value);
        }
        fn rejected(&mut self, value: &(i32, i32), _: &(i32, i32)) {
            self.rejected.push(*value);
        }
        fn dropped(&mut self, value: &(i32, i32), _: &(i32, i32)) {
            self.dropped.push(*value);
        }
    }

    #[test]
    fn keeps_mutually_non_dominating() {
        let mut set = ParetoSet::new();
        assert!(set.add((10, 5), &two_criteria));
        assert!(set.add((5, 10), &two_criteria));
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn drops_dominated_and_rejects_worse() {
        let mut set = ParetoSet::new();
        let mut recorder = Recorder::default();
        set.add_with((10, 10), &two_criteria, &mut recorder);
        set.add_with((20, 20), &two_criteria, &mut recorder);
        set.add_with((5, 5), &two_criteria, &mut recorder);

        assert_eq!(set.as_slice(), &[(5, 5)]);
        assert_eq!(recorder.accepted, vec![(10, 10), (5, 5)]);
        assert_eq!(recorder.rejected, vec![(20, 20)]);
        assert_eq!(recorder.dropped, vec![(10, 10)]);
    }

    #[test]
    fn equal_value_is_rejected() {
        let mut set = ParetoSet::new();
        assert!(set.add((1, 1), &two_criteria));
        assert!(!set.add((1, 1), &two_criteria));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn qualify_does_not_modify() {
        let mut set = ParetoSet::new();
        set.add((3, 3), &two_criteria);
        assert!(set.qualify(&(2, 9), &two_criteria));
        assert!(!set.qualify(&(3, 4), &two_criteria));
        assert_eq!(set.len(), 1);
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        fn dominates(l: &(i32, i32), r: &(i32, i32)) -> bool {
            l.0 <= r.0 && l.1 <= r.1 && l != r
        }

        proptest! {
            #[test]
            fn no_element_dominates_another(values in prop::collection::vec((0..50i32, 0..50i32), 0..40)) {
                let mut set = ParetoSet::new();
                for v in &values {
                    set.add(*v, &two_criteria);
                }
                for a in set.iter() {
                    for b in set.iter() {
                        prop_assert!(!dominates(a, b));
                    }
                }
            }

            #[test]
            fn every_value_is_covered(values in prop::collection::vec((0..50i32, 0..50i32), 1..40)) {
                let mut set = ParetoSet::new();
                for v in &values {
                    set.add(*v, &two_criteria);
                }
                for v in &values {
                    prop_assert!(set.iter().any(|e| e == v || dominates(e, v)));
                }
            }

            #[test]
            fn re_adding_is_idempotent(values in prop::collection::vec((0..50i32, 0..50i32), 1..40)) {
                let mut set = ParetoSet::new();
                for v in &values {
                    set.add(*v, &two_criteria);
                }
                let before = set.as_slice().to_vec();
                for v in &values {
                    set.add(*v, &two_criteria);
                }
                prop_assert_eq!(before, set.as_slice().to_vec());
            }
        }
    }
}

//! The second cost criterion (c2).

use std::fmt;

use crate::domain::TripPattern;

/// Computes and compares the c2 criterion.
///
/// c2 is opaque to the search: it is seeded at the access, updated on every
/// boarding and compared only through `dominates`.
pub trait C2Calculator: Send + Sync + fmt::Debug {
    /// Value at the start of a journey.
    fn initial_value(&self) -> i32;

    /// Value after boarding a trip of `pattern`.
    fn on_board(&self, c2: i32, pattern: &TripPattern) -> i32;

    /// True if `left` is strictly better than `right`.
    fn dominates(&self, left: i32, right: i32) -> bool;
}

/// Highest bit used for a priority group.
const MAX_GROUP_BIT: u32 = 28;

/// c2 as the set of transit priority groups a journey has used.
///
/// Each group sets one bit. Two journeys only compete on the other criteria
/// when they used exactly the same groups, so the result keeps at least one
/// journey per combination of groups. Patterns without a group leave c2
/// unchanged; groups above 28 share the top bit.
#[derive(Debug, Clone, Copy, Default)]
pub struct TransitGroupPriority;

impl C2Calculator for TransitGroupPriority {
    fn initial_value(&self) -> i32 {
        0
    }

    fn on_board(&self, c2: i32, pattern: &TripPattern) -> i32 {
        match pattern.priority_group_id() {
            Some(group) => c2 | (1 << group.min(MAX_GROUP_BIT)),
            None => c2,
        }
    }

    fn dominates(&self, left: i32, right: i32) -> bool {
        left != right
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn groups_accumulate_as_bits() {
        let calc = TransitGroupPriority;
        let bus = TripPattern::new(0, vec![0, 1], 0, "bus").unwrap().with_priority_group(0);
        let rail = TripPattern::new(1, vec![1, 2], 0, "rail").unwrap().with_priority_group(3);
        let plain = TripPattern::new(2, vec![2, 3], 0, "plain").unwrap();

        let c2 = calc.on_board(calc.initial_value(), &bus);
        let c2 = calc.on_board(c2, &rail);
        assert_eq!(c2, 0b1001);
        assert_eq!(calc.on_board(c2, &plain), c2);
        assert_eq!(calc.on_board(c2, &bus), c2);
    }

    #[test]
    fn different_groups_never_dominate_each_other_away() {
        let calc = TransitGroupPriority;
        assert!(calc.dominates(1, 2) && calc.dominates(2, 1));
        assert!(!calc.dominates(3, 3));
    }

    #[test]
    fn high_groups_stay_in_real_range() {
        let calc = TransitGroupPriority;
        let pattern = TripPattern::new(0, vec![0, 1], 0, "P").unwrap().with_priority_group(40);
        assert_eq!(calc.on_board(0, &pattern), 1 << 28);
    }
}

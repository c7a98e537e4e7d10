//! Access and egress paths grouped the way the worker consumes them.

use std::collections::HashMap;

use crate::domain::AccessEgress;

/// Access paths grouped by the round in which they are added.
///
/// A plain walking access lands in round 0. An access that includes rides
/// (flex) lands in the round equal to its ride count: on-board ones right
/// after transit, so transfers can follow them, and on-street ones at the
/// end of the round.
#[derive(Debug, Clone, Default)]
pub struct AccessPaths {
    on_street: Vec<Vec<AccessEgress>>,
    on_board: Vec<Vec<AccessEgress>>,
}

impl AccessPaths {
    pub fn new(paths: &[AccessEgress]) -> Self {
        let mut access = Self::default();
        for path in paths {
            let by_round = if path.stop_reached_on_board && path.has_rides() {
                &mut access.on_board
            } else {
                &mut access.on_street
            };
            if by_round.len() <= path.num_rides {
                by_round.resize_with(path.num_rides + 1, Vec::new);
            }
            by_round[path.num_rides].push(*path);
        }
        access
    }

    pub fn arrived_on_street(&self, round: usize) -> &[AccessEgress] {
        self.on_street.get(round).map_or(&[], Vec::as_slice)
    }

    pub fn arrived_on_board(&self, round: usize) -> &[AccessEgress] {
        self.on_board.get(round).map_or(&[], Vec::as_slice)
    }

    /// Highest ride count of any access path. The worker keeps running
    /// rounds until these have all been added.
    pub fn max_number_of_rides(&self) -> usize {
        self.on_street.len().max(self.on_board.len()).saturating_sub(1)
    }
}

/// Egress paths indexed by the stop they start from.
#[derive(Debug, Clone, Default)]
pub struct EgressPaths {
    by_stop: HashMap<usize, Vec<AccessEgress>>,
}

impl EgressPaths {
    pub fn new(paths: &[AccessEgress]) -> Self {
        let mut by_stop: HashMap<usize, Vec<AccessEgress>> = HashMap::new();
        for path in paths {
            by_stop.entry(path.stop).or_default().push(*path);
        }
        Self { by_stop }
    }

    pub fn egress_at(&self, stop: usize) -> &[AccessEgress] {
        self.by_stop.get(&stop).map_or(&[], Vec::as_slice)
    }

    pub fn is_egress_stop(&self, stop: usize) -> bool {
        self.by_stop.contains_key(&stop)
    }

    pub fn stops(&self) -> impl Iterator<Item = usize> + '_ {
        self.by_stop.keys().copied()
    }

    pub fn paths(&self) -> impl Iterator<Item = &AccessEgress> {
        self.by_stop.values().flatten()
    }
}

/// True if `egress` may start from an arrival that did or did not come in on
/// board. Two consecutive walks are not allowed, so a walking egress needs
/// an on-board arrival; an egress starting with a ride can follow anything.
pub fn egress_allowed(egress: &AccessEgress, arrived_on_board: bool) -> bool {
    arrived_on_board || egress.has_rides()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn groups_access_by_rides() {
        let walk = AccessEgress::new(1, 60, 0);
        let flex_on_board = AccessEgress::new(2, 600, 0).with_rides(1, true);
        let flex_on_street = AccessEgress::new(3, 900, 0).with_rides(2, false);
        let paths = AccessPaths::new(&[walk, flex_on_board, flex_on_street]);

        assert_eq!(paths.arrived_on_street(0), &[walk]);
        assert_eq!(paths.arrived_on_board(1), &[flex_on_board]);
        assert_eq!(paths.arrived_on_street(2), &[flex_on_street]);
        assert!(paths.arrived_on_board(0).is_empty());
        assert!(paths.arrived_on_street(7).is_empty());
        assert_eq!(paths.max_number_of_rides(), 2);
    }

    #[test]
    fn indexes_egress_by_stop() {
        let egress = EgressPaths::new(&[AccessEgress::new(4, 30, 0), AccessEgress::new(4, 90, 0)]);

        assert!(egress.is_egress_stop(4));
        assert!(!egress.is_egress_stop(5));
        assert_eq!(egress.egress_at(4).len(), 2);
        assert_eq!(egress.paths().count(), 2);
    }

    #[test]
    fn walking_egress_requires_on_board_arrival() {
        let walk = AccessEgress::new(4, 30, 0);
        let flex = AccessEgress::new(4, 300, 0).with_rides(1, true);

        assert!(egress_allowed(&walk, true));
        assert!(!egress_allowed(&walk, false));
        assert!(egress_allowed(&flex, false));
    }
}

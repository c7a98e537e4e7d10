//! Constrained transfers (stay-seated, guaranteed, allowed, not-allowed).

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use super::TripRef;

/// How a constrained transfer overrides regular boarding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransferDisposition {
    /// The transfer is allowed without board slack.
    Allowed,
    /// The passenger stays in the vehicle (interlining).
    StaySeated,
    /// The connecting trip waits for the feeder.
    Guaranteed,
    /// The transfer is explicitly forbidden.
    NotAllowed,
}

impl TransferDisposition {
    /// Boarding is allowed at the feeder's arrival time, with the feeder's
    /// alight slack removed.
    pub fn is_seated_or_guaranteed(self) -> bool {
        matches!(self, Self::StaySeated | Self::Guaranteed)
    }

    pub fn is_not_allowed(self) -> bool {
        self == Self::NotAllowed
    }

    /// Stay-seated and guaranteed transfers carry no transfer cost.
    pub fn is_free(self) -> bool {
        self.is_seated_or_guaranteed()
    }
}

/// A rule binding one trip/stop-position pair to another.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConstrainedTransfer {
    pub from_trip: TripRef,
    pub from_stop_pos: usize,
    pub to_trip: TripRef,
    pub to_stop_pos: usize,
    pub disposition: TransferDisposition,
}

/// Constrained transfers indexed by their source `(trip, stop position)`.
#[derive(Debug, Clone, Default)]
pub struct ConstrainedTransferIndex {
    by_source: HashMap<(TripRef, usize), Vec<ConstrainedTransfer>>,
    targets: HashSet<(usize, usize)>,
    len: usize,
}

impl ConstrainedTransferIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, transfer: ConstrainedTransfer) {
        self.targets
            .insert((transfer.to_trip.route, transfer.to_stop_pos));
        self.by_source
            .entry((transfer.from_trip, transfer.from_stop_pos))
            .or_default()
            .push(transfer);
        self.len += 1;
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Fast check used before any source lookup: does any constrained
    /// transfer lead to this route at this stop position?
    pub fn transfer_exist_to(&self, route: usize, to_stop_pos: usize) -> bool {
        self.targets.contains(&(route, to_stop_pos))
    }

    /// All constrained transfers from a feeder trip/position to a route position.
    pub fn find(
        &self,
        from_trip: TripRef,
        from_stop_pos: usize,
        to_route: usize,
        to_stop_pos: usize,
    ) -> impl Iterator<Item = &ConstrainedTransfer> {
        self.by_source
            .get(&(from_trip, from_stop_pos))
            .into_iter()
            .flatten()
            .filter(move |tx| tx.to_trip.route == to_route && tx.to_stop_pos == to_stop_pos)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tx(from: (usize, usize, usize), to: (usize, usize, usize), d: TransferDisposition) -> ConstrainedTransfer {
        ConstrainedTransfer {
            from_trip: TripRef::new(from.0, from.1),
            from_stop_pos: from.2,
            to_trip: TripRef::new(to.0, to.1),
            to_stop_pos: to.2,
            disposition: d,
        }
    }

    #[test]
    fn lookup_by_source_and_target() {
        let mut index = ConstrainedTransferIndex::new();
        index.add(tx((0, 0, 2), (1, 0, 0), TransferDisposition::StaySeated));
        index.add(tx((0, 0, 2), (2, 3, 1), TransferDisposition::NotAllowed));

        assert_eq!(index.len(), 2);
        assert!(index.transfer_exist_to(1, 0));
        assert!(index.transfer_exist_to(2, 1));
        assert!(!index.transfer_exist_to(1, 1));

        let found: Vec<_> = index.find(TripRef::new(0, 0), 2, 1, 0).collect();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].disposition, TransferDisposition::StaySeated);

        assert_eq!(index.find(TripRef::new(0, 1), 2, 1, 0).count(), 0);
        assert_eq!(index.find(TripRef::new(0, 0), 1, 1, 0).count(), 0);
    }

    #[test]
    fn disposition_flags() {
        assert!(TransferDisposition::StaySeated.is_seated_or_guaranteed());
        assert!(TransferDisposition::Guaranteed.is_free());
        assert!(!TransferDisposition::Allowed.is_seated_or_guaranteed());
        assert!(TransferDisposition::NotAllowed.is_not_allowed());
    }

    #[test]
    fn disposition_deserializes_from_screaming_case() {
        let d: TransferDisposition = serde_json::from_str("\"STAY_SEATED\"").unwrap();
        assert_eq!(d, TransferDisposition::StaySeated);
        let d: TransferDisposition = serde_json::from_str("\"NOT_ALLOWED\"").unwrap();
        assert_eq!(d, TransferDisposition::NotAllowed);
    }
}

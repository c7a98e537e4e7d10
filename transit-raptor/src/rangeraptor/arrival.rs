//! Stop arrivals and the arena that owns them.
//!
//! Each arrival points back at the arrival it was reached from, forming a
//! DAG rooted at access arrivals. Arrivals are stored in an append-only
//! [`ArrivalArena`] and referenced by [`ArrivalId`], so a back-pointer is a
//! plain index and paths are rebuilt by walking indices.

use std::fmt;

use crate::domain::{AccessEgress, DomainError, Transfer, TransferDisposition, TripRef};

/// Index of an arrival in its [`ArrivalArena`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ArrivalId(u32);

impl ArrivalId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for ArrivalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The ride that produced a transit arrival.
///
/// Stops, positions and times are in search order: in a reverse search the
/// "board" stop is where the trip is left in real time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransitLeg {
    pub trip: TripRef,
    pub board_stop: usize,
    pub board_stop_pos: usize,
    pub alight_stop_pos: usize,
    /// Schedule time at the board stop.
    pub board_time: i32,
    /// Schedule time at the alight stop, without alight slack.
    pub alight_time: i32,
    /// Set when the trip was boarded through a constrained transfer.
    pub disposition: Option<TransferDisposition>,
}

/// How an arrival was reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArrivalKind {
    Access(AccessEgress),
    Transit(TransitLeg),
    Transfer(Transfer),
    Egress(AccessEgress),
}

impl ArrivalKind {
    pub fn name(&self) -> &'static str {
        match self {
            ArrivalKind::Access(_) => "access",
            ArrivalKind::Transit(_) => "transit",
            ArrivalKind::Transfer(_) => "transfer",
            ArrivalKind::Egress(_) => "egress",
        }
    }
}

/// Arrival at a stop (or, for egress, at the destination).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StopArrival {
    stop: usize,
    round: usize,
    time: i32,
    c1: i32,
    c2: i32,
    previous: Option<ArrivalId>,
    kind: ArrivalKind,
}

impl StopArrival {
    /// Root arrival created from an access path.
    pub fn access(access: AccessEgress, time: i32, c1: i32, c2: i32) -> Self {
        Self {
            stop: access.stop,
            round: access.num_rides,
            time,
            c1,
            c2,
            previous: None,
            kind: ArrivalKind::Access(access),
        }
    }

    /// Arrival following `previous`; the round is given by the caller.
    #[allow(clippy::too_many_arguments)]
    pub fn following(
        previous: ArrivalId,
        stop: usize,
        round: usize,
        time: i32,
        c1: i32,
        c2: i32,
        kind: ArrivalKind,
    ) -> Self {
        Self {
            stop,
            round,
            time,
            c1,
            c2,
            previous: Some(previous),
            kind,
        }
    }

    pub fn stop(&self) -> usize {
        self.stop
    }

    /// Number of trips ridden to get here, including rides inside flex
    /// access or egress paths.
    pub fn round(&self) -> usize {
        self.round
    }

    pub fn arrival_time(&self) -> i32 {
        self.time
    }

    pub fn c1(&self) -> i32 {
        self.c1
    }

    pub fn c2(&self) -> i32 {
        self.c2
    }

    pub fn previous(&self) -> Option<ArrivalId> {
        self.previous
    }

    pub fn kind(&self) -> &ArrivalKind {
        &self.kind
    }

    pub fn is_access(&self) -> bool {
        matches!(self.kind, ArrivalKind::Access(_))
    }

    pub fn is_transit(&self) -> bool {
        matches!(self.kind, ArrivalKind::Transit(_))
    }

    /// True if the stop was reached on board a vehicle: by transit or by a
    /// flex access that ends on board.
    pub fn arrived_on_board(&self) -> bool {
        match &self.kind {
            ArrivalKind::Transit(_) => true,
            ArrivalKind::Access(access) => access.stop_reached_on_board && access.has_rides(),
            ArrivalKind::Transfer(_) | ArrivalKind::Egress(_) => false,
        }
    }

    pub fn transit(&self) -> Result<&TransitLeg, DomainError> {
        match &self.kind {
            ArrivalKind::Transit(leg) => Ok(leg),
            other => Err(self.mismatch("transit", other)),
        }
    }

    pub fn transfer(&self) -> Result<&Transfer, DomainError> {
        match &self.kind {
            ArrivalKind::Transfer(transfer) => Ok(transfer),
            other => Err(self.mismatch("transfer", other)),
        }
    }

    pub fn access_path(&self) -> Result<&AccessEgress, DomainError> {
        match &self.kind {
            ArrivalKind::Access(path) => Ok(path),
            other => Err(self.mismatch("access", other)),
        }
    }

    pub fn egress_path(&self) -> Result<&AccessEgress, DomainError> {
        match &self.kind {
            ArrivalKind::Egress(path) => Ok(path),
            other => Err(self.mismatch("egress", other)),
        }
    }

    fn mismatch(&self, expected: &'static str, found: &ArrivalKind) -> DomainError {
        DomainError::ArrivalKindMismatch {
            expected,
            found: found.name(),
        }
    }
}

/// Append-only storage for the arrivals of one search.
///
/// The arena lives for the whole search: arrivals from earlier iterations
/// stay valid back-pointer targets for later ones.
#[derive(Debug, Clone, Default)]
pub struct ArrivalArena {
    arrivals: Vec<StopArrival>,
}

impl ArrivalArena {
    pub fn new() -> Self {
        Self::default()
    }

    /// Id the next pushed arrival will get.
    pub fn next_id(&self) -> ArrivalId {
        ArrivalId(self.arrivals.len() as u32)
    }

    pub fn push(&mut self, arrival: StopArrival) -> ArrivalId {
        let id = self.next_id();
        debug_assert!(arrival.previous.is_none_or(|p| p < id));
        self.arrivals.push(arrival);
        id
    }

    pub fn get(&self, id: ArrivalId) -> &StopArrival {
        &self.arrivals[id.index()]
    }

    pub fn len(&self) -> usize {
        self.arrivals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arrivals.is_empty()
    }

    /// All arrivals in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (ArrivalId, &StopArrival)> {
        self.arrivals
            .iter()
            .enumerate()
            .map(|(i, a)| (ArrivalId(i as u32), a))
    }

    /// Iterate from `id` back to its access arrival, `id` first.
    pub fn chain(&self, id: ArrivalId) -> Chain<'_> {
        Chain {
            arena: self,
            next: Some(id),
        }
    }

    /// The nearest transit arrival on the chain starting at `id` (itself
    /// included). `None` if the chain holds only street legs back to the
    /// access.
    pub fn most_recent_transit(&self, id: ArrivalId) -> Option<(ArrivalId, &StopArrival)> {
        self.chain(id).find(|(_, arrival)| arrival.is_transit())
    }

    /// The access arrival the chain starting at `id` is rooted at.
    pub fn root(&self, id: ArrivalId) -> &StopArrival {
        let mut arrival = self.get(id);
        while let Some(previous) = arrival.previous {
            arrival = self.get(previous);
        }
        arrival
    }

    /// Stops visited from the access to `id`, in search order.
    pub fn stops_on_path(&self, id: ArrivalId) -> Vec<usize> {
        let mut stops: Vec<usize> = self.chain(id).map(|(_, a)| a.stop).collect();
        stops.reverse();
        stops
    }
}

/// Iterator over an arrival chain, newest first.
pub struct Chain<'a> {
    arena: &'a ArrivalArena,
    next: Option<ArrivalId>,
}

impl<'a> Iterator for Chain<'a> {
    type Item = (ArrivalId, &'a StopArrival);

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.next?;
        let arrival = self.arena.get(id);
        self.next = arrival.previous;
        Some((id, arrival))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leg() -> TransitLeg {
        TransitLeg {
            trip: TripRef::new(0, 0),
            board_stop: 1,
            board_stop_pos: 0,
            alight_stop_pos: 1,
            board_time: 100,
            alight_time: 200,
            disposition: None,
        }
    }

    fn sample() -> (ArrivalArena, ArrivalId, ArrivalId, ArrivalId) {
        let mut arena = ArrivalArena::new();
        let access = arena.push(StopArrival::access(AccessEgress::new(1, 60, 0), 60, 0, 0));
        let transit = arena.push(StopArrival::following(
            access,
            2,
            1,
            200,
            0,
            0,
            ArrivalKind::Transit(leg()),
        ));
        let transfer = arena.push(StopArrival::following(
            transit,
            3,
            1,
            260,
            0,
            0,
            ArrivalKind::Transfer(Transfer::new(2, 3, 60, 0)),
        ));
        (arena, access, transit, transfer)
    }

    #[test]
    fn chain_walks_back_to_access() {
        let (arena, access, transit, transfer) = sample();
        let ids: Vec<_> = arena.chain(transfer).map(|(id, _)| id).collect();
        assert_eq!(ids, vec![transfer, transit, access]);
        assert_eq!(arena.stops_on_path(transfer), vec![1, 2, 3]);
        assert!(arena.root(transfer).is_access());
    }

    #[test]
    fn most_recent_transit_skips_street_legs() {
        let (arena, access, transit, transfer) = sample();
        assert_eq!(arena.most_recent_transit(transfer).map(|(id, _)| id), Some(transit));
        assert_eq!(arena.most_recent_transit(transit).map(|(id, _)| id), Some(transit));
        assert!(arena.most_recent_transit(access).is_none());
    }

    #[test]
    fn typed_accessors_check_the_kind() {
        let (arena, _, transit, transfer) = sample();
        assert_eq!(arena.get(transit).transit().unwrap().alight_time, 200);
        assert_eq!(
            arena.get(transfer).transit(),
            Err(DomainError::ArrivalKindMismatch {
                expected: "transit",
                found: "transfer"
            })
        );
        assert!(arena.get(transfer).transfer().is_ok());
        assert!(arena.get(transfer).egress_path().is_err());
    }

    #[test]
    fn on_board_flags() {
        let (arena, access, transit, transfer) = sample();
        assert!(!arena.get(access).arrived_on_board());
        assert!(arena.get(transit).arrived_on_board());
        assert!(!arena.get(transfer).arrived_on_board());

        let flex = StopArrival::access(AccessEgress::new(4, 600, 0).with_rides(1, true), 600, 0, 0);
        assert!(flex.arrived_on_board());
        assert_eq!(flex.round(), 1);
    }
}

//! Journeys rebuilt from destination arrivals, plus ranking.

use std::collections::HashSet;
use std::fmt;

use serde::Serialize;

use super::arrival::{ArrivalArena, ArrivalKind, StopArrival};
use super::calculator::TransitCalculator;
use super::destination::DestinationArrival;
use crate::domain::{DomainError, TransferDisposition, format_time};

/// One leg of a journey, in real (forward) time.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PathLeg {
    Access {
        to_stop: usize,
        departure_time: i32,
        arrival_time: i32,
        num_rides: usize,
    },
    Transit {
        from_stop: usize,
        to_stop: usize,
        route: usize,
        trip: usize,
        departure_time: i32,
        arrival_time: i32,
        disposition: Option<TransferDisposition>,
    },
    Transfer {
        from_stop: usize,
        to_stop: usize,
        departure_time: i32,
        arrival_time: i32,
    },
    Egress {
        from_stop: usize,
        departure_time: i32,
        arrival_time: i32,
        num_rides: usize,
    },
}

impl PathLeg {
    pub fn departure_time(&self) -> i32 {
        match self {
            PathLeg::Access { departure_time, .. }
            | PathLeg::Transit { departure_time, .. }
            | PathLeg::Transfer { departure_time, .. }
            | PathLeg::Egress { departure_time, .. } => *departure_time,
        }
    }

    pub fn arrival_time(&self) -> i32 {
        match self {
            PathLeg::Access { arrival_time, .. }
            | PathLeg::Transit { arrival_time, .. }
            | PathLeg::Transfer { arrival_time, .. }
            | PathLeg::Egress { arrival_time, .. } => *arrival_time,
        }
    }

    pub fn is_transit(&self) -> bool {
        matches!(self, PathLeg::Transit { .. })
    }
}

impl fmt::Display for PathLeg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let dep = format_time(self.departure_time());
        let arr = format_time(self.arrival_time());
        match self {
            PathLeg::Access { to_stop, .. } => write!(f, "{dep} access to S{to_stop} {arr}"),
            PathLeg::Transit {
                from_stop,
                to_stop,
                route,
                trip,
                ..
            } => write!(f, "{dep} S{from_stop} ~ R{route}#{trip} ~ S{to_stop} {arr}"),
            PathLeg::Transfer {
                from_stop, to_stop, ..
            } => write!(f, "{dep} walk S{from_stop} -> S{to_stop} {arr}"),
            PathLeg::Egress { from_stop, .. } => write!(f, "{dep} egress from S{from_stop} {arr}"),
        }
    }
}

/// A complete journey from origin to destination.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Path {
    pub legs: Vec<PathLeg>,
    pub departure_time: i32,
    pub arrival_time: i32,
    /// Trips ridden, including rides inside flex access and egress.
    pub rounds: usize,
    pub number_of_transfers: usize,
    pub c1: i32,
    pub c2: i32,
    /// Start time of the iteration that found the journey.
    pub iteration_departure_time: i32,
}

impl Path {
    /// Rebuild the journey ending in `destination` by walking its
    /// back-pointers. Legs come out in real time order for both search
    /// directions.
    pub fn from_destination(
        arena: &ArrivalArena,
        destination: &DestinationArrival,
        calc: &TransitCalculator,
    ) -> Result<Self, DomainError> {
        let mut chain: Vec<&StopArrival> = arena.chain(destination.arrival).map(|(_, a)| a).collect();
        // The chain runs egress first; both ends must be street paths.
        if let Some(last) = chain.first() {
            last.egress_path()?;
        }
        if let Some(root) = chain.last() {
            root.access_path()?;
        }
        let legs = if calc.search_forward() {
            chain.reverse();
            chain.iter().map(|a| forward_leg(a)).collect()
        } else {
            chain.iter().map(|a| reverse_leg(a)).collect::<Vec<_>>()
        };
        Ok(Self::from_legs(legs, destination))
    }

    fn from_legs(legs: Vec<PathLeg>, destination: &DestinationArrival) -> Self {
        let departure_time = legs.first().map_or(0, PathLeg::departure_time);
        let arrival_time = legs.last().map_or(0, PathLeg::arrival_time);
        Self {
            legs,
            departure_time,
            arrival_time,
            rounds: destination.rounds,
            number_of_transfers: destination.rounds.saturating_sub(1),
            c1: destination.c1,
            c2: destination.c2,
            iteration_departure_time: destination.departure_time,
        }
    }

    pub fn duration(&self) -> i32 {
        self.arrival_time - self.departure_time
    }

    pub fn transit_legs(&self) -> impl Iterator<Item = &PathLeg> {
        self.legs.iter().filter(|leg| leg.is_transit())
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let legs: Vec<String> = self.legs.iter().map(ToString::to_string).collect();
        write!(
            f,
            "{} [transfers: {}, c1: {}]",
            legs.join(" | "),
            self.number_of_transfers,
            self.c1
        )
    }
}

fn forward_leg(arrival: &StopArrival) -> PathLeg {
    let time = arrival.arrival_time();
    match arrival.kind() {
        ArrivalKind::Access(path) => PathLeg::Access {
            to_stop: arrival.stop(),
            departure_time: time - path.duration,
            arrival_time: time,
            num_rides: path.num_rides,
        },
        ArrivalKind::Transit(leg) => PathLeg::Transit {
            from_stop: leg.board_stop,
            to_stop: arrival.stop(),
            route: leg.trip.route,
            trip: leg.trip.trip,
            departure_time: leg.board_time,
            arrival_time: leg.alight_time,
            disposition: leg.disposition,
        },
        ArrivalKind::Transfer(transfer) => PathLeg::Transfer {
            from_stop: transfer.from_stop,
            to_stop: transfer.to_stop,
            departure_time: time - transfer.duration,
            arrival_time: time,
        },
        ArrivalKind::Egress(path) => PathLeg::Egress {
            from_stop: arrival.stop(),
            departure_time: time - path.duration,
            arrival_time: time,
            num_rides: path.num_rides,
        },
    }
}

/// In a reverse search access paths end at the destination and egress
/// paths start at the origin, and every time is where the leg starts.
fn reverse_leg(arrival: &StopArrival) -> PathLeg {
    let time = arrival.arrival_time();
    match arrival.kind() {
        ArrivalKind::Egress(path) => PathLeg::Access {
            to_stop: arrival.stop(),
            departure_time: time,
            arrival_time: time + path.duration,
            num_rides: path.num_rides,
        },
        ArrivalKind::Transit(leg) => PathLeg::Transit {
            from_stop: arrival.stop(),
            to_stop: leg.board_stop,
            route: leg.trip.route,
            trip: leg.trip.trip,
            departure_time: leg.alight_time,
            arrival_time: leg.board_time,
            disposition: leg.disposition,
        },
        ArrivalKind::Transfer(transfer) => PathLeg::Transfer {
            from_stop: transfer.from_stop,
            to_stop: transfer.to_stop,
            departure_time: time,
            arrival_time: time + transfer.duration,
        },
        ArrivalKind::Access(path) => PathLeg::Egress {
            from_stop: arrival.stop(),
            departure_time: time,
            arrival_time: time + path.duration,
            num_rides: path.num_rides,
        },
    }
}

/// Rank paths by preference.
///
/// Paths are ranked by:
/// 1. Arrival time (earlier is better)
/// 2. Number of transfers (fewer is better)
/// 3. Departure time (later is better)
/// 4. Generalized cost (lower is better)
///
/// Returns paths sorted best-first.
pub fn rank_paths(mut paths: Vec<Path>) -> Vec<Path> {
    paths.sort_by(|a, b| {
        a.arrival_time
            .cmp(&b.arrival_time)
            .then(a.number_of_transfers.cmp(&b.number_of_transfers))
            .then(b.departure_time.cmp(&a.departure_time))
            .then(a.c1.cmp(&b.c1))
    });
    paths
}

/// Drop paths whose legs are identical to an earlier path in the list.
///
/// Keeps the first occurrence, so rank before deduplicating to keep the
/// cheapest copy.
pub fn deduplicate(mut paths: Vec<Path>) -> Vec<Path> {
    let mut seen = HashSet::new();
    paths.retain(|path| seen.insert(path.legs.clone()));
    paths
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{AccessEgress, Transfer, TripRef};
    use crate::rangeraptor::arrival::{ArrivalId, TransitLeg};
    use crate::rangeraptor::calculator::SearchDirection;

    fn forward_journey() -> (ArrivalArena, ArrivalId) {
        let mut arena = ArrivalArena::new();
        let access = arena.push(StopArrival::access(AccessEgress::new(0, 60, 0), 160, 6_000, 0));
        let transit = arena.push(StopArrival::following(
            access,
            1,
            1,
            500,
            40_000,
            0,
            ArrivalKind::Transit(TransitLeg {
                trip: TripRef::new(2, 0),
                board_stop: 0,
                board_stop_pos: 0,
                alight_stop_pos: 1,
                board_time: 200,
                alight_time: 500,
                disposition: None,
            }),
        ));
        let transfer = arena.push(StopArrival::following(
            transit,
            2,
            1,
            560,
            46_000,
            0,
            ArrivalKind::Transfer(Transfer::new(1, 2, 60, 6_000)),
        ));
        let egress = arena.push(StopArrival::following(
            transfer,
            2,
            1,
            590,
            46_000,
            0,
            ArrivalKind::Egress(AccessEgress::new(2, 30, 0).with_rides(1, false)),
        ));
        (arena, egress)
    }

    fn destination(arrival: ArrivalId) -> DestinationArrival {
        DestinationArrival {
            arrival,
            departure_time: 100,
            arrival_time: 590,
            rounds: 2,
            c1: 46_000,
            c2: 0,
        }
    }

    #[test]
    fn forward_path_in_time_order() {
        let (arena, egress) = forward_journey();
        let calc = TransitCalculator::new(SearchDirection::Forward, 100, 0, 60);
        let path = Path::from_destination(&arena, &destination(egress), &calc).unwrap();

        assert_eq!(path.legs.len(), 4);
        assert_eq!(path.departure_time, 100);
        assert_eq!(path.arrival_time, 590);
        assert_eq!(path.number_of_transfers, 1);
        assert_eq!(path.transit_legs().count(), 1);
        assert!(matches!(
            path.legs[1],
            PathLeg::Transit {
                from_stop: 0,
                to_stop: 1,
                departure_time: 200,
                arrival_time: 500,
                ..
            }
        ));
        assert!(matches!(
            path.legs[2],
            PathLeg::Transfer {
                departure_time: 500,
                arrival_time: 560,
                ..
            }
        ));
    }

    #[test]
    fn reverse_chain_is_already_in_time_order() {
        // Reverse search from the destination at stop 1 back to the origin
        // at stop 0.
        let mut arena = ArrivalArena::new();
        let access = arena.push(StopArrival::access(AccessEgress::new(1, 60, 0), 940, 0, 0));
        let transit = arena.push(StopArrival::following(
            access,
            0,
            1,
            300,
            0,
            0,
            ArrivalKind::Transit(TransitLeg {
                trip: TripRef::new(0, 3),
                board_stop: 1,
                board_stop_pos: 1,
                alight_stop_pos: 0,
                board_time: 900,
                alight_time: 300,
                disposition: None,
            }),
        ));
        let egress = arena.push(StopArrival::following(
            transit,
            0,
            1,
            240,
            0,
            0,
            ArrivalKind::Egress(AccessEgress::new(0, 60, 0)),
        ));
        let calc = TransitCalculator::new(SearchDirection::Reverse, 1_000, 0, 60);
        let dest = DestinationArrival {
            arrival: egress,
            departure_time: 1_000,
            arrival_time: 240,
            rounds: 1,
            c1: 0,
            c2: 0,
        };
        let path = Path::from_destination(&arena, &dest, &calc).unwrap();

        assert_eq!(path.departure_time, 240);
        assert_eq!(path.arrival_time, 1_000);
        assert!(matches!(path.legs[0], PathLeg::Access { to_stop: 0, .. }));
        assert!(matches!(
            path.legs[1],
            PathLeg::Transit {
                from_stop: 0,
                to_stop: 1,
                departure_time: 300,
                arrival_time: 900,
                ..
            }
        ));
        assert!(matches!(path.legs[2], PathLeg::Egress { from_stop: 1, .. }));
    }

    #[test]
    fn chain_without_egress_is_an_error() {
        let (arena, _) = forward_journey();
        let calc = TransitCalculator::new(SearchDirection::Forward, 100, 0, 60);
        let (first, _) = arena.iter().nth(1).unwrap();
        let result = Path::from_destination(&arena, &destination(first), &calc);
        assert!(matches!(result, Err(DomainError::ArrivalKindMismatch { .. })));
    }

    fn simple_path(departure_time: i32, arrival_time: i32, transfers: usize, c1: i32) -> Path {
        Path {
            legs: vec![PathLeg::Transfer {
                from_stop: 0,
                to_stop: 1,
                departure_time,
                arrival_time,
            }],
            departure_time,
            arrival_time,
            rounds: transfers + 1,
            number_of_transfers: transfers,
            c1,
            c2: 0,
            iteration_departure_time: departure_time,
        }
    }

    #[test]
    fn rank_by_arrival_then_transfers() {
        let ranked = rank_paths(vec![
            simple_path(0, 500, 0, 0),
            simple_path(0, 400, 2, 0),
            simple_path(0, 400, 1, 0),
        ]);
        let keys: Vec<_> = ranked.iter().map(|p| (p.arrival_time, p.number_of_transfers)).collect();
        assert_eq!(keys, vec![(400, 1), (400, 2), (500, 0)]);
    }

    #[test]
    fn deduplicate_keeps_first_copy() {
        let paths = deduplicate(vec![
            simple_path(0, 400, 0, 10),
            simple_path(0, 400, 0, 20),
            simple_path(100, 400, 0, 10),
        ]);
        assert_eq!(paths.len(), 2);
        assert_eq!(paths[0].c1, 10);
    }
}

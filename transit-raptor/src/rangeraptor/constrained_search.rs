//! Resolving constrained transfers when boarding.

use super::arrival::TransitLeg;
use crate::domain::{ConstrainedTransferIndex, Timetable, TransferDisposition};

/// Result of looking up constrained transfers for one boarding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConstrainedBoarding {
    /// No constraint applies; board normally.
    Regular,
    /// Board this trip, ignoring board slack. The regular boarding that
    /// competes with it must skip `excluded`.
    Board {
        trip_index: usize,
        board_time: i32,
        disposition: TransferDisposition,
        excluded: Vec<usize>,
    },
    /// Board normally but never these trips.
    Exclude(Vec<usize>),
}

/// Looks up constrained transfers from a feeder trip to the pattern being
/// scanned. Only used by forward searches.
#[derive(Debug, Clone, Copy)]
pub struct ConstrainedBoardingSearch<'a> {
    index: &'a ConstrainedTransferIndex,
}

impl<'a> ConstrainedBoardingSearch<'a> {
    pub fn new(index: &'a ConstrainedTransferIndex) -> Self {
        Self { index }
    }

    pub fn transfer_exist_to(&self, route: usize, stop_pos: usize) -> bool {
        self.index.transfer_exist_to(route, stop_pos)
    }

    /// Find the trip to board at `target_pos` of `target_route` coming from
    /// the feeder `source`.
    ///
    /// Stay-seated and guaranteed transfers may depart as soon as the feeder
    /// arrives, without alight or board slack. Allowed transfers may depart
    /// at `prev_arrival_time` without board slack. Not-allowed transfers
    /// exclude their target trip. When several constraints match, the
    /// earliest departure wins.
    pub fn find(
        &self,
        source: &TransitLeg,
        target_route: usize,
        timetable: &Timetable,
        target_pos: usize,
        prev_arrival_time: i32,
    ) -> ConstrainedBoarding {
        let mut best: Option<(usize, i32, TransferDisposition)> = None;
        let mut excluded = Vec::new();
        for tx in self
            .index
            .find(source.trip, source.alight_stop_pos, target_route, target_pos)
        {
            let trip_index = tx.to_trip.trip;
            if trip_index >= timetable.number_of_trip_schedules() {
                continue;
            }
            if tx.disposition.is_not_allowed() {
                excluded.push(trip_index);
                continue;
            }
            let earliest = if tx.disposition.is_seated_or_guaranteed() {
                source.alight_time
            } else {
                prev_arrival_time
            };
            let departure = timetable.trip_schedule(trip_index).departure(target_pos);
            if departure < earliest {
                continue;
            }
            if best.is_none_or(|(_, t, _)| departure < t) {
                best = Some((trip_index, departure, tx.disposition));
            }
        }
        match best {
            Some((trip_index, board_time, disposition)) => ConstrainedBoarding::Board {
                trip_index,
                board_time,
                disposition,
                excluded,
            },
            None if excluded.is_empty() => ConstrainedBoarding::Regular,
            None => ConstrainedBoarding::Exclude(excluded),
        }
    }
}

//! Trips boarded while scanning one pattern.

use std::sync::Arc;

use super::c2::C2Calculator;
use crate::domain::{TransferDisposition, TripRef};
use crate::rangeraptor::arrival::ArrivalId;
use crate::rangeraptor::calculator::TransitCalculator;
use crate::rangeraptor::pareto::ParetoComparator;

/// A boarded trip, carried along the pattern until the scan ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PatternRide {
    /// The arrival the trip was boarded from.
    pub previous: ArrivalId,
    pub board_stop: usize,
    pub board_pos: usize,
    pub board_time: i32,
    pub trip_index: usize,
    pub trip: TripRef,
    /// c1 right after boarding.
    pub board_c1: i32,
    /// `board_c1` with the ride cost up to the board time taken out, so
    /// rides boarded at different stops compare fairly at any later stop.
    pub relative_c1: i32,
    pub c2: i32,
    pub disposition: Option<TransferDisposition>,
}

/// Better trip (earlier forward, later in reverse), lower relative c1, or
/// better c2.
#[derive(Debug, Clone)]
pub struct PatternRideComparator {
    calc: TransitCalculator,
    c2: Option<Arc<dyn C2Calculator>>,
}

impl PatternRideComparator {
    pub fn new(calc: TransitCalculator, c2: Option<Arc<dyn C2Calculator>>) -> Self {
        Self { calc, c2 }
    }
}

impl ParetoComparator<PatternRide> for PatternRideComparator {
    fn left_dominance_exist(&self, l: &PatternRide, r: &PatternRide) -> bool {
        self.calc.is_better_trip(l.trip_index, r.trip_index)
            || l.relative_c1 < r.relative_c1
            || self.c2.as_ref().is_some_and(|c2| c2.dominates(l.c2, r.c2))
    }
}

//! Incremental construction of a [`TransitNetwork`].

use crate::domain::{
    ConstrainedTransfer, ConstrainedTransferIndex, DomainError, Route, Transfer, TripPattern,
    TripSchedule, is_sentinel,
};

use super::{NetworkError, TransitNetwork};

/// Builds a network, validating every index as it goes.
#[derive(Debug, Default)]
pub struct TransitNetworkBuilder {
    stop_names: Vec<String>,
    routes: Vec<Route>,
    transfers: Vec<Transfer>,
    constrained: ConstrainedTransferIndex,
}

impl TransitNetworkBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a stop, returning its index.
    pub fn add_stop(&mut self, name: impl Into<String>) -> usize {
        self.stop_names.push(name.into());
        self.stop_names.len() - 1
    }

    /// Add `count` stops named `S0`, `S1`, ...
    pub fn with_stops(mut self, count: usize) -> Self {
        for _ in 0..count {
            let index = self.stop_names.len();
            self.add_stop(format!("S{index}"));
        }
        self
    }

    /// Index the next route will get; pass it to [`TripPattern::new`].
    pub fn next_route_index(&self) -> usize {
        self.routes.len()
    }

    /// Add a route, returning its index.
    pub fn add_route(
        &mut self,
        pattern: TripPattern,
        trips: Vec<TripSchedule>,
    ) -> Result<usize, NetworkError> {
        let expected = self.next_route_index();
        if pattern.index() != expected {
            return Err(NetworkError::PatternIndex {
                label: pattern.debug_info().to_string(),
                expected,
                actual: pattern.index(),
            });
        }
        for &stop in pattern.stops() {
            self.check_stop(stop)?;
        }
        self.routes.push(Route::new(pattern, trips)?);
        Ok(expected)
    }

    /// Add a route boarding and alighting everywhere, with slack index 0.
    pub fn add_simple_route(
        &mut self,
        label: &str,
        stops: Vec<usize>,
        trips: Vec<TripSchedule>,
    ) -> Result<usize, NetworkError> {
        let pattern = TripPattern::new(self.next_route_index(), stops, 0, label)?;
        self.add_route(pattern, trips)
    }

    pub fn add_transfer(&mut self, transfer: Transfer) -> Result<(), NetworkError> {
        self.check_stop(transfer.from_stop)?;
        self.check_stop(transfer.to_stop)?;
        if transfer.duration < 0 || is_sentinel(transfer.duration) {
            return Err(DomainError::ValueOutOfRange {
                what: "transfer duration",
                value: transfer.duration,
            }
            .into());
        }
        self.transfers.push(transfer);
        Ok(())
    }

    pub fn add_constrained_transfer(
        &mut self,
        transfer: ConstrainedTransfer,
    ) -> Result<(), NetworkError> {
        let from = transfer.from_trip;
        let to = transfer.to_trip;
        self.check_trip_position(from.route, from.trip, transfer.from_stop_pos)?;
        self.check_trip_position(to.route, to.trip, transfer.to_stop_pos)?;
        self.constrained.add(transfer);
        Ok(())
    }

    pub fn route(&self, index: usize) -> Result<&Route, NetworkError> {
        self.routes.get(index).ok_or(NetworkError::UnknownRoute(index))
    }

    pub fn build(self) -> TransitNetwork {
        TransitNetwork::new(self.stop_names, self.routes, self.transfers, self.constrained)
    }

    fn check_stop(&self, stop: usize) -> Result<(), NetworkError> {
        if stop >= self.stop_names.len() {
            return Err(NetworkError::UnknownStop {
                stop,
                number_of_stops: self.stop_names.len(),
            });
        }
        Ok(())
    }

    fn check_trip_position(
        &self,
        route: usize,
        trip: usize,
        pos: usize,
    ) -> Result<(), NetworkError> {
        let r = self.route(route)?;
        if trip >= r.timetable().number_of_trip_schedules() {
            return Err(NetworkError::UnknownTrip {
                route,
                trip: trip.to_string(),
            });
        }
        if pos >= r.pattern().number_of_stops_in_pattern() {
            return Err(NetworkError::UnknownStopPosition { route, pos });
        }
        Ok(())
    }
}

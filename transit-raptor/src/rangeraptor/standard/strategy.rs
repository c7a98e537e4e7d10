//! Boarding and alighting for the standard profile.

use crate::domain::{Route, TransferDisposition, TripRef};
use crate::rangeraptor::arrival::{ArrivalId, TransitLeg};
use crate::rangeraptor::calculator::TransitCalculator;
use crate::rangeraptor::constrained_search::{ConstrainedBoarding, ConstrainedBoardingSearch};
use crate::rangeraptor::strategy::{RoutingStrategy, WorkerState};
use crate::rangeraptor::trip_search::TripScheduleSearch;

use super::state::StdWorkerState;

#[derive(Debug, Clone, Copy)]
struct OnTrip {
    trip_index: usize,
    board_time: i32,
    board_stop: usize,
    board_pos: usize,
    previous: ArrivalId,
    disposition: Option<TransferDisposition>,
}

/// Classic RAPTOR pattern scan: ride the best trip boarded so far and
/// switch to a better one whenever a stop reached in the previous round
/// allows it.
#[derive(Debug)]
pub struct ArrivalTimeRoutingStrategy<'a> {
    calc: TransitCalculator,
    state: StdWorkerState,
    route_index: usize,
    route: Option<&'a Route>,
    on_trip: Option<OnTrip>,
}

impl<'a> ArrivalTimeRoutingStrategy<'a> {
    pub fn new(state: StdWorkerState) -> Self {
        Self {
            calc: *state.calculator(),
            state,
            route_index: 0,
            route: None,
            on_trip: None,
        }
    }

    pub fn into_state(self) -> StdWorkerState {
        self.state
    }

    fn board_regular(
        &mut self,
        stop: usize,
        stop_pos: usize,
        board_slack: i32,
        previous: ArrivalId,
        excluded: &[usize],
    ) {
        let Some(route) = self.route else {
            return;
        };
        let prev_time = self.state.arena().get(previous).arrival_time();
        let earliest = self.calc.plus_duration(prev_time, board_slack);
        let search = TripScheduleSearch::new(route.timetable(), self.calc.direction());
        let on_trip = self.on_trip.map(|t| t.trip_index);
        if let Some(found) = search.search(earliest, stop_pos, on_trip, excluded) {
            self.on_trip = Some(OnTrip {
                trip_index: found.trip_index,
                board_time: found.board_time,
                board_stop: stop,
                board_pos: stop_pos,
                previous,
                disposition: None,
            });
        }
    }
}

impl<'a> RoutingStrategy<'a> for ArrivalTimeRoutingStrategy<'a> {
    type State = StdWorkerState;

    fn state(&self) -> &StdWorkerState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut StdWorkerState {
        &mut self.state
    }

    fn prepare_for_transit_with(&mut self, route_index: usize, route: &'a Route) {
        self.route_index = route_index;
        self.route = Some(route);
        self.on_trip = None;
    }

    fn alight_only_regular_transfer_exist(
        &mut self,
        stop_index: usize,
        stop_pos: usize,
        alight_slack: i32,
    ) {
        let (Some(route), Some(on_trip)) = (self.route, self.on_trip) else {
            return;
        };
        let trip = route.timetable().trip_schedule(on_trip.trip_index);
        let alight_time = self.calc.trip_alight_time(trip, stop_pos);
        let arrival_time = self.calc.plus_duration(alight_time, alight_slack);
        let leg = TransitLeg {
            trip: TripRef::new(self.route_index, on_trip.trip_index),
            board_stop: on_trip.board_stop,
            board_stop_pos: on_trip.board_pos,
            alight_stop_pos: stop_pos,
            board_time: on_trip.board_time,
            alight_time,
            disposition: on_trip.disposition,
        };
        self.state
            .transit_to_stop(on_trip.previous, stop_index, arrival_time, leg);
    }

    fn board_with_regular_transfer(&mut self, stop_index: usize, stop_pos: usize, board_slack: i32) {
        let Some(previous) = self.state.previous_round_arrival(stop_index) else {
            return;
        };
        self.board_regular(stop_index, stop_pos, board_slack, previous, &[]);
    }

    fn board_with_constrained_transfer(
        &mut self,
        stop_index: usize,
        stop_pos: usize,
        board_slack: i32,
        search: &ConstrainedBoardingSearch<'_>,
    ) {
        let Some(previous) = self.state.previous_round_arrival(stop_index) else {
            return;
        };
        let Some(route) = self.route else {
            return;
        };
        let arena = self.state.arena();
        let prev_time = arena.get(previous).arrival_time();
        let source = arena
            .most_recent_transit(previous)
            .and_then(|(_, arrival)| arrival.transit().ok().copied());
        let boarding = source.map_or(ConstrainedBoarding::Regular, |leg| {
            search.find(&leg, self.route_index, route.timetable(), stop_pos, prev_time)
        });
        match boarding {
            ConstrainedBoarding::Board {
                trip_index,
                board_time,
                disposition,
                excluded,
            } => {
                let better = self
                    .on_trip
                    .is_none_or(|t| self.calc.is_better_trip(trip_index, t.trip_index));
                if better {
                    self.on_trip = Some(OnTrip {
                        trip_index,
                        board_time,
                        board_stop: stop_index,
                        board_pos: stop_pos,
                        previous,
                        disposition: Some(disposition),
                    });
                }
                self.board_regular(stop_index, stop_pos, board_slack, previous, &excluded);
            }
            ConstrainedBoarding::Exclude(excluded) => {
                self.board_regular(stop_index, stop_pos, board_slack, previous, &excluded);
            }
            ConstrainedBoarding::Regular => {
                self.board_regular(stop_index, stop_pos, board_slack, previous, &[]);
            }
        }
    }
}

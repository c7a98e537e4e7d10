//! Boarding and alighting for the multi-criteria profile.

use super::ride::{PatternRide, PatternRideComparator};
use super::state::{McEntry, McWorkerState};
use crate::domain::{Route, TransferDisposition, TripRef};
use crate::rangeraptor::calculator::TransitCalculator;
use crate::rangeraptor::constrained_search::{ConstrainedBoarding, ConstrainedBoardingSearch};
use crate::rangeraptor::cost::{add_cost, cost_of};
use crate::rangeraptor::pareto::ParetoSet;
use crate::rangeraptor::strategy::{RoutingStrategy, WorkerState};
use crate::rangeraptor::trip_search::TripScheduleSearch;

/// Pattern scan that keeps a Pareto set of boarded trips instead of a
/// single one. Every previous-round arrival at a stop gets its own trip
/// search, so a slower but cheaper arrival can still board.
#[derive(Debug)]
pub struct MultiCriteriaRoutingStrategy<'a> {
    calc: TransitCalculator,
    state: McWorkerState,
    route_index: usize,
    route: Option<&'a Route>,
    rides: ParetoSet<PatternRide>,
    comparator: PatternRideComparator,
}

impl<'a> MultiCriteriaRoutingStrategy<'a> {
    pub fn new(state: McWorkerState) -> Self {
        let calc = *state.calculator();
        let comparator = PatternRideComparator::new(calc, state.c2_calculator().cloned());
        Self {
            calc,
            state,
            route_index: 0,
            route: None,
            rides: ParetoSet::new(),
            comparator,
        }
    }

    pub fn into_state(self) -> McWorkerState {
        self.state
    }

    fn board_regular(
        &mut self,
        stop: usize,
        stop_pos: usize,
        board_slack: i32,
        previous: &McEntry,
        excluded: &[usize],
    ) {
        let Some(route) = self.route else {
            return;
        };
        let earliest = self.calc.plus_duration(previous.time, board_slack);
        let search = TripScheduleSearch::new(route.timetable(), self.calc.direction());
        if let Some(found) = search.search(earliest, stop_pos, None, excluded) {
            self.add_ride(
                previous,
                stop,
                stop_pos,
                found.trip_index,
                found.board_time,
                None,
            );
        }
    }

    fn add_ride(
        &mut self,
        previous: &McEntry,
        stop: usize,
        stop_pos: usize,
        trip_index: usize,
        board_time: i32,
        disposition: Option<TransferDisposition>,
    ) {
        let Some(route) = self.route else {
            return;
        };
        let pattern = route.pattern();
        let cost = self.state.cost();
        let wait = self.calc.duration(previous.time, board_time).max(0);
        let first_boarding = previous.round == 0;
        let board_c1 = add_cost(
            previous.c1,
            cost.boarding_cost(first_boarding, wait, disposition),
        );
        let relative_c1 = add_cost(
            board_c1,
            -cost_of(
                cost.transit_factor(pattern.slack_index()),
                self.calc.duration(0, board_time),
            ),
        );
        let c2 = self
            .state
            .c2_calculator()
            .map_or(previous.c2, |c2| c2.on_board(previous.c2, pattern));
        let ride = PatternRide {
            previous: previous.id,
            board_stop: stop,
            board_pos: stop_pos,
            board_time,
            trip_index,
            trip: TripRef::new(self.route_index, trip_index),
            board_c1,
            relative_c1,
            c2,
            disposition,
        };
        self.rides.add(ride, &self.comparator);
    }
}

impl<'a> RoutingStrategy<'a> for MultiCriteriaRoutingStrategy<'a> {
    type State = McWorkerState;

    fn state(&self) -> &McWorkerState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut McWorkerState {
        &mut self.state
    }

    fn prepare_for_transit_with(&mut self, route_index: usize, route: &'a Route) {
        self.route_index = route_index;
        self.route = Some(route);
        self.rides.clear();
    }

    fn alight_only_regular_transfer_exist(
        &mut self,
        stop_index: usize,
        stop_pos: usize,
        alight_slack: i32,
    ) {
        let Some(route) = self.route else {
            return;
        };
        let slack_index = route.pattern().slack_index();
        for ride in self.rides.iter() {
            let trip = route.timetable().trip_schedule(ride.trip_index);
            let alight_time = self.calc.trip_alight_time(trip, stop_pos);
            self.state.transit_to_stop(
                ride,
                stop_index,
                stop_pos,
                alight_time,
                alight_slack,
                slack_index,
            );
        }
    }

    fn board_with_regular_transfer(&mut self, stop_index: usize, stop_pos: usize, board_slack: i32) {
        for previous in self.state.previous_round_arrivals(stop_index) {
            self.board_regular(stop_index, stop_pos, board_slack, &previous, &[]);
        }
    }

    fn board_with_constrained_transfer(
        &mut self,
        stop_index: usize,
        stop_pos: usize,
        board_slack: i32,
        search: &ConstrainedBoardingSearch<'_>,
    ) {
        let Some(route) = self.route else {
            return;
        };
        for previous in self.state.previous_round_arrivals(stop_index) {
            let source = self
                .state
                .arena()
                .most_recent_transit(previous.id)
                .and_then(|(_, arrival)| arrival.transit().ok().copied());
            let boarding = source.map_or(ConstrainedBoarding::Regular, |leg| {
                search.find(&leg, self.route_index, route.timetable(), stop_pos, previous.time)
            });
            match boarding {
                ConstrainedBoarding::Board {
                    trip_index,
                    board_time,
                    disposition,
                    excluded,
                } => {
                    self.add_ride(
                        &previous,
                        stop_index,
                        stop_pos,
                        trip_index,
                        board_time,
                        Some(disposition),
                    );
                    self.board_regular(stop_index, stop_pos, board_slack, &previous, &excluded);
                }
                ConstrainedBoarding::Exclude(excluded) => {
                    self.board_regular(stop_index, stop_pos, board_slack, &previous, &excluded);
                }
                ConstrainedBoarding::Regular => {
                    self.board_regular(stop_index, stop_pos, board_slack, &previous, &[]);
                }
            }
        }
    }
}

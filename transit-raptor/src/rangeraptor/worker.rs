//! The Range-Raptor round loop.
//!
//! One worker runs one search. For every departure time in the window,
//! latest first, it seeds the access arrivals and runs rounds until no stop
//! improves or the round limit is hit. Everything criteria-specific goes
//! through the [`RoutingStrategy`] and its [`WorkerState`].

use serde::Serialize;
use tracing::{debug, trace};

use super::access_paths::AccessPaths;
use super::calculator::TransitCalculator;
use super::cancel::CancellationToken;
use super::constrained_search::ConstrainedBoardingSearch;
use super::round::RoundTracker;
use super::slack::SlackProvider;
use super::strategy::{RoutingStrategy, WorkerState};
use super::transit_data::TransitDataProvider;
use crate::domain::{AccessEgress, format_time};

/// How a search ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchStatus {
    Completed,
    /// Stopped between iterations; results cover the iterations run.
    Cancelled { iterations_completed: usize },
}

impl SearchStatus {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, SearchStatus::Cancelled { .. })
    }
}

/// Counters for one search.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct WorkerStats {
    pub iterations: usize,
    pub rounds: usize,
    pub routes_scanned: usize,
    pub arrivals: usize,
    pub anomalies: usize,
}

/// Runs the range search over a transit view with one routing strategy.
pub struct RangeRaptorWorker<'a, D, S>
where
    D: TransitDataProvider + ?Sized,
    S: RoutingStrategy<'a>,
{
    data: &'a D,
    strategy: S,
    calc: TransitCalculator,
    slack: &'a dyn SlackProvider,
    access: AccessPaths,
    rounds: RoundTracker,
    constraints: Option<ConstrainedBoardingSearch<'a>>,
    cancel: CancellationToken,
    stats: WorkerStats,
}

impl<'a, D, S> RangeRaptorWorker<'a, D, S>
where
    D: TransitDataProvider + ?Sized,
    S: RoutingStrategy<'a>,
{
    pub fn new(
        data: &'a D,
        strategy: S,
        calc: TransitCalculator,
        slack: &'a dyn SlackProvider,
        access: &[AccessEgress],
        rounds: RoundTracker,
    ) -> Self {
        Self {
            data,
            strategy,
            calc,
            slack,
            access: AccessPaths::new(access),
            rounds,
            constraints: None,
            cancel: CancellationToken::new(),
            stats: WorkerStats::default(),
        }
    }

    /// Resolve constrained transfers from `data` when boarding.
    pub fn with_constrained_transfers(mut self, enabled: bool) -> Self {
        self.constraints = if enabled {
            self.data
                .constrained_transfers()
                .filter(|index| !index.is_empty())
                .map(ConstrainedBoardingSearch::new)
        } else {
            None
        };
        self
    }

    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn stats(&self) -> WorkerStats {
        self.stats
    }

    pub fn strategy(&self) -> &S {
        &self.strategy
    }

    pub fn into_strategy(self) -> S {
        self.strategy
    }

    /// Run every iteration of the search window.
    pub fn route(&mut self) -> SearchStatus {
        let times = self.calc.iteration_departure_times();
        let mut status = SearchStatus::Completed;
        for (completed, departure_time) in times.into_iter().enumerate() {
            if self.cancel.is_cancelled() {
                status = SearchStatus::Cancelled {
                    iterations_completed: completed,
                };
                break;
            }
            self.run_raptor_for_minute(departure_time);
            self.stats.iterations += 1;
        }
        let state = self.strategy.state();
        self.stats.arrivals = state.arena().len();
        self.stats.anomalies = state.anomalies();
        debug!(
            iterations = self.stats.iterations,
            rounds = self.stats.rounds,
            routes = self.stats.routes_scanned,
            arrivals = self.stats.arrivals,
            destinations = state.destination_arrivals().len(),
            cancelled = status.is_cancelled(),
            "range raptor search complete"
        );
        status
    }

    fn run_raptor_for_minute(&mut self, departure_time: i32) {
        trace!(departure = %format_time(departure_time), "iteration");
        self.strategy.state_mut().setup_iteration(departure_time);
        self.rounds.setup_iteration();

        add_access_paths(
            self.access.arrived_on_street(0),
            &self.calc,
            self.strategy.state_mut(),
            departure_time,
        );

        while self.has_more_rounds() {
            let round = self.rounds.next_round();
            self.stats.rounds += 1;
            self.strategy.state_mut().prepare_for_next_round(round);

            self.find_transit_for_round(round);

            add_access_paths(
                self.access.arrived_on_board(round),
                &self.calc,
                self.strategy.state_mut(),
                departure_time,
            );

            self.find_transfers_for_round();

            if self.strategy.state().is_destination_reached_in_current_round() {
                self.rounds.notify_destination_reached();
            }

            add_access_paths(
                self.access.arrived_on_street(round),
                &self.calc,
                self.strategy.state_mut(),
                departure_time,
            );
        }
    }

    fn has_more_rounds(&self) -> bool {
        self.rounds.has_more_rounds()
            && (self.rounds.round() < self.access.max_number_of_rides()
                || self.strategy.state().is_new_round_available())
    }

    fn find_transit_for_round(&mut self, round: usize) {
        let data = self.data;
        let stops = self.strategy.state().stops_touched_previous_round();
        let transfer_slack = if round > 1 {
            self.slack.transfer_slack()
        } else {
            0
        };

        for route_index in data.route_indexes_for_stops(&stops) {
            let route = data.route(route_index);
            let pattern = route.pattern();
            let slack_index = pattern.slack_index();
            let alight_slack = self.calc.alight_slack(self.slack, slack_index);
            let board_slack = self.calc.board_slack(self.slack, slack_index) + transfer_slack;

            self.strategy.prepare_for_transit_with(route_index, route);
            self.stats.routes_scanned += 1;

            for pos in self
                .calc
                .pattern_stop_positions(pattern.number_of_stops_in_pattern())
            {
                let stop = pattern.stop_index(pos);

                if self.calc.alighting_possible_at(pattern, pos) {
                    if self.constraints.is_some() {
                        self.strategy
                            .alight_constrained_transfer_exist(stop, pos, alight_slack);
                    } else {
                        self.strategy
                            .alight_only_regular_transfer_exist(stop, pos, alight_slack);
                    }
                }

                if self.calc.boarding_possible_at(pattern, pos) {
                    match self.constraints {
                        Some(search) if search.transfer_exist_to(route_index, pos) => {
                            self.strategy
                                .board_with_constrained_transfer(stop, pos, board_slack, &search);
                        }
                        _ => self
                            .strategy
                            .board_with_regular_transfer(stop, pos, board_slack),
                    }
                }
            }
        }
    }

    fn find_transfers_for_round(&mut self) {
        let data = self.data;
        for stop in self.strategy.state().stops_touched_by_transit_current_round() {
            let transfers = self.calc.transfers(data, stop);
            if !transfers.is_empty() {
                self.strategy.state_mut().transfer_to_stops(stop, transfers);
            }
        }
    }
}

/// Seed `state` with `paths`, skipping those whose opening hours do not fit
/// the iteration.
fn add_access_paths<W: WorkerState>(
    paths: &[AccessEgress],
    calc: &TransitCalculator,
    state: &mut W,
    iteration_departure_time: i32,
) {
    for path in paths {
        if let Some(departure) = calc.departure_time(path, iteration_departure_time) {
            state.set_access_to_stop(path, departure);
        }
    }
}

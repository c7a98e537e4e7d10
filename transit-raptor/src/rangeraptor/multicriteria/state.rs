//! Multi-criteria state: a Pareto set of arrivals per stop.

use std::sync::Arc;

use tracing::warn;

use super::c2::C2Calculator;
use super::ride::PatternRide;
use crate::domain::{AccessEgress, NOT_SET, Transfer};
use crate::rangeraptor::access_paths::{EgressPaths, egress_allowed};
use crate::rangeraptor::arrival::{ArrivalArena, ArrivalId, ArrivalKind, StopArrival, TransitLeg};
use crate::rangeraptor::calculator::TransitCalculator;
use crate::rangeraptor::cost::{CostCalculator, add_cost};
use crate::rangeraptor::debug::{RateLimitedLog, StopArrivalDebugHandler};
use crate::rangeraptor::destination::{DestinationArrival, DestinationArrivals};
use crate::rangeraptor::error::RaptorError;
use crate::rangeraptor::heuristics::Heuristics;
use crate::rangeraptor::pareto::{ParetoComparator, ParetoSet, ParetoSetEventListener};
use crate::rangeraptor::stop_set::StopSet;
use crate::rangeraptor::strategy::WorkerState;

/// The criteria of a stop arrival, as stored in a stop's Pareto set.
///
/// `generation` identifies the round (of which iteration) the arrival was
/// made in; boarding only looks at arrivals of the previous generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) struct McEntry {
    pub id: ArrivalId,
    pub time: i32,
    pub c1: i32,
    pub c2: i32,
    pub round: usize,
    pub on_board: bool,
    pub generation: u32,
}

/// Arrival time, rounds, c1, arrived on board, and c2 when enabled.
///
/// Being on board is a criterion so that a walk never removes the transit
/// arrival it would have to transfer from.
#[derive(Debug, Clone)]
struct McArrivalComparator {
    calc: TransitCalculator,
    c2: Option<Arc<dyn C2Calculator>>,
}

impl ParetoComparator<McEntry> for McArrivalComparator {
    fn left_dominance_exist(&self, l: &McEntry, r: &McEntry) -> bool {
        self.calc.is_best(l.time, r.time)
            || l.round < r.round
            || l.c1 < r.c1
            || (l.on_board && !r.on_board)
            || self.c2.as_ref().is_some_and(|c2| c2.dominates(l.c2, r.c2))
    }
}

/// Reports Pareto set changes for a watched stop.
struct McDebugListener<'s> {
    arena: &'s ArrivalArena,
    debug: &'s mut StopArrivalDebugHandler,
    candidate: &'s StopArrival,
}

impl ParetoSetEventListener<McEntry> for McDebugListener<'_> {
    fn rejected(&mut self, _value: &McEntry, rejected_by: &McEntry) {
        let by = self.arena.get(rejected_by.id);
        self.debug
            .rejected(self.arena, self.candidate, Some(by), "dominated");
    }

    fn dropped(&mut self, value: &McEntry, _dropped_by: &McEntry) {
        let dropped = self.arena.get(value.id);
        self.debug
            .dropped(self.arena, dropped, Some(self.candidate), "dominated");
    }
}

/// Options for building a [`McWorkerState`].
#[derive(Debug, Clone, Default)]
pub struct McStateOptions {
    /// Include c2 in dominance. Requires `c2_calculator`.
    pub include_c2: bool,
    pub c2_calculator: Option<Arc<dyn C2Calculator>>,
    /// Lower bounds from the destination, used to prune arrivals.
    pub heuristics: Option<Arc<Heuristics>>,
    pub time_limit: Option<i32>,
}

/// State for the multi-criteria profile.
#[derive(Debug)]
pub struct McWorkerState {
    calc: TransitCalculator,
    cost: CostCalculator,
    arena: ArrivalArena,
    sets: Vec<ParetoSet<McEntry>>,
    comparator: McArrivalComparator,
    generation: u32,
    round: usize,
    iteration_departure_time: i32,
    touched_current: StopSet,
    touched_previous: StopSet,
    touched_by_transit: StopSet,
    egress: EgressPaths,
    destination: DestinationArrivals,
    heuristics: Option<Arc<Heuristics>>,
    c2: Option<Arc<dyn C2Calculator>>,
    time_limit: Option<i32>,
    debug: Option<StopArrivalDebugHandler>,
    anomalies: RateLimitedLog,
}

impl McWorkerState {
    /// Create the state. Fails if c2 is requested without a calculator.
    pub fn new(
        number_of_stops: usize,
        calc: TransitCalculator,
        cost: CostCalculator,
        egress: EgressPaths,
        options: McStateOptions,
    ) -> Result<Self, RaptorError> {
        let c2 = if options.include_c2 {
            Some(options.c2_calculator.ok_or_else(|| {
                RaptorError::UnsupportedCriteria(
                    "c2 requested but no c2 calculator configured".to_string(),
                )
            })?)
        } else {
            None
        };
        Ok(Self {
            calc,
            cost,
            arena: ArrivalArena::new(),
            sets: vec![ParetoSet::new(); number_of_stops],
            comparator: McArrivalComparator {
                calc,
                c2: c2.clone(),
            },
            generation: 0,
            round: 0,
            iteration_departure_time: 0,
            touched_current: StopSet::new(number_of_stops),
            touched_previous: StopSet::new(number_of_stops),
            touched_by_transit: StopSet::new(number_of_stops),
            egress,
            destination: DestinationArrivals::new(calc, true, c2.clone()),
            heuristics: options.heuristics,
            c2,
            time_limit: options.time_limit,
            debug: None,
            anomalies: RateLimitedLog::default(),
        })
    }

    pub fn with_debug(mut self, debug: Option<StopArrivalDebugHandler>) -> Self {
        self.debug = debug;
        self
    }

    pub fn calculator(&self) -> &TransitCalculator {
        &self.calc
    }

    pub fn cost(&self) -> &CostCalculator {
        &self.cost
    }

    pub fn c2_calculator(&self) -> Option<&Arc<dyn C2Calculator>> {
        self.c2.as_ref()
    }

    /// Arrivals at `stop` made in the previous round of this iteration.
    pub(super) fn previous_round_arrivals(&self, stop: usize) -> Vec<McEntry> {
        if !self.touched_previous.contains(stop) {
            return Vec::new();
        }
        let previous = self.generation.saturating_sub(1);
        self.sets[stop]
            .iter()
            .filter(|e| e.generation == previous)
            .copied()
            .collect()
    }

    /// Number of arrivals currently kept at `stop`.
    pub fn arrivals_at(&self, stop: usize) -> usize {
        self.sets[stop].len()
    }

    /// Leave the trip of `ride` at `alight_stop`. `alight_time` is the
    /// schedule time, without slack.
    pub(super) fn transit_to_stop(
        &mut self,
        ride: &PatternRide,
        alight_stop: usize,
        alight_pos: usize,
        alight_time: i32,
        alight_slack: i32,
        slack_index: usize,
    ) {
        if self.calc.is_before(alight_time, ride.board_time) {
            if self.anomalies.allow() {
                warn!(
                    trip = %ride.trip,
                    board_time = ride.board_time,
                    alight_time,
                    "trip arrives before it departs; skipping alighting"
                );
            }
            return;
        }
        let time = self.calc.plus_duration(alight_time, alight_slack);
        let transit_time = self.calc.duration(ride.board_time, alight_time);
        let c1 = self
            .cost
            .transit_arrival_cost(ride.board_c1, transit_time, alight_slack, slack_index);
        let leg = TransitLeg {
            trip: ride.trip,
            board_stop: ride.board_stop,
            board_stop_pos: ride.board_pos,
            alight_stop_pos: alight_pos,
            board_time: ride.board_time,
            alight_time,
            disposition: ride.disposition,
        };
        let arrival = StopArrival::following(
            ride.previous,
            alight_stop,
            self.round,
            time,
            c1,
            ride.c2,
            ArrivalKind::Transit(leg),
        );
        if let Some(id) = self.add_stop_arrival(arrival) {
            self.arrive_at_destination(id);
        }
    }

    fn add_stop_arrival(&mut self, arrival: StopArrival) -> Option<ArrivalId> {
        let stop = arrival.stop();
        if self
            .calc
            .exceeds_time_limit(arrival.arrival_time(), self.time_limit)
        {
            self.reject(&arrival, "time limit");
            return None;
        }
        if !self.qualify_by_heuristics(&arrival) {
            self.reject(&arrival, "heuristic");
            return None;
        }
        let entry = McEntry {
            id: self.arena.next_id(),
            time: arrival.arrival_time(),
            c1: arrival.c1(),
            c2: arrival.c2(),
            round: arrival.round(),
            on_board: arrival.arrived_on_board(),
            generation: self.generation,
        };
        let accepted = match self.debug.as_mut() {
            Some(debug) if debug.is_debug(stop) => {
                let mut listener = McDebugListener {
                    arena: &self.arena,
                    debug,
                    candidate: &arrival,
                };
                self.sets[stop].add_with(entry, &self.comparator, &mut listener)
            }
            _ => self.sets[stop].add(entry, &self.comparator),
        };
        if !accepted {
            return None;
        }
        let id = self.arena.push(arrival);
        self.touched_current.insert(stop);
        if entry.on_board {
            self.touched_by_transit.insert(stop);
        }
        if let Some(debug) = &mut self.debug {
            debug.accepted(&self.arena, self.arena.get(id));
        }
        Some(id)
    }

    /// False if no journey through `arrival` can beat the destination
    /// arrivals already found.
    fn qualify_by_heuristics(&self, arrival: &StopArrival) -> bool {
        let Some(heuristics) = &self.heuristics else {
            return true;
        };
        let stop = arrival.stop();
        if !heuristics.is_reached(stop) {
            return false;
        }
        // c2 only settles at the destination, so no bound on it exists and
        // any destination arrival may end up in a bucket of its own.
        if self.destination.is_empty() || self.c2.is_some() {
            return true;
        }
        // The wait before the first boarding is free, so access arrivals
        // get no cost bound.
        let c1 = if arrival.is_access() {
            arrival.c1()
        } else {
            add_cost(arrival.c1(), heuristics.min_cost(stop))
        };
        let candidate = DestinationArrival {
            arrival: self.arena.next_id(),
            departure_time: self.iteration_departure_time,
            arrival_time: self
                .calc
                .plus_duration(arrival.arrival_time(), heuristics.min_travel_duration(stop)),
            rounds: arrival.round() + heuristics.min_rides(stop),
            c1,
            c2: arrival.c2(),
        };
        self.destination.qualify(&candidate)
    }

    fn reject(&mut self, arrival: &StopArrival, reason: &str) {
        if let Some(debug) = self.debug.as_mut().filter(|d| d.is_debug(arrival.stop())) {
            debug.rejected(&self.arena, arrival, None, reason);
        }
    }

    fn arrive_at_destination(&mut self, id: ArrivalId) {
        let arrival = *self.arena.get(id);
        for egress in self.egress.egress_at(arrival.stop()) {
            if !egress_allowed(egress, arrival.arrived_on_board()) {
                continue;
            }
            let Some(departure) = self.calc.departure_time(egress, arrival.arrival_time()) else {
                continue;
            };
            let time = self.calc.plus_duration(departure, egress.duration);
            if self.calc.exceeds_time_limit(time, self.time_limit) {
                continue;
            }
            let wait = self.calc.duration(arrival.arrival_time(), departure);
            let c1 = add_cost(
                add_cost(arrival.c1(), egress.c1),
                self.cost.wait_cost(wait),
            );
            let rounds = arrival.round() + egress.num_rides;
            let candidate = DestinationArrival {
                arrival: self.arena.next_id(),
                departure_time: self.iteration_departure_time,
                arrival_time: time,
                rounds,
                c1,
                c2: arrival.c2(),
            };
            if self.destination.add(candidate) {
                self.arena.push(StopArrival::following(
                    id,
                    arrival.stop(),
                    rounds,
                    time,
                    c1,
                    arrival.c2(),
                    ArrivalKind::Egress(*egress),
                ));
            }
        }
    }
}

impl WorkerState for McWorkerState {
    fn setup_iteration(&mut self, iteration_departure_time: i32) {
        self.iteration_departure_time = iteration_departure_time;
        self.round = 0;
        self.generation += 1;
        self.touched_current.clear();
        self.touched_previous.clear();
        self.touched_by_transit.clear();
        self.destination.new_round();
        if let Some(debug) = &mut self.debug {
            debug.set_iteration(iteration_departure_time);
        }
    }

    fn prepare_for_next_round(&mut self, round: usize) {
        self.round = round;
        self.generation += 1;
        std::mem::swap(&mut self.touched_previous, &mut self.touched_current);
        self.touched_current.clear();
        self.touched_by_transit.clear();
        self.destination.new_round();
    }

    fn set_access_to_stop(&mut self, access: &AccessEgress, departure_time: i32) {
        let time = self.calc.plus_duration(departure_time, access.duration);
        let c2 = self.c2.as_ref().map_or(NOT_SET, |c2| c2.initial_value());
        let arrival = StopArrival::access(*access, time, access.c1, c2);
        if let Some(id) = self.add_stop_arrival(arrival) {
            self.arrive_at_destination(id);
        }
    }

    fn is_new_round_available(&self) -> bool {
        !self.touched_current.is_empty()
    }

    fn stops_touched_previous_round(&self) -> Vec<usize> {
        self.touched_previous.as_slice().to_vec()
    }

    fn stops_touched_by_transit_current_round(&self) -> Vec<usize> {
        self.touched_by_transit.as_slice().to_vec()
    }

    fn transfer_to_stops(&mut self, from_stop: usize, transfers: &[Transfer]) {
        let generation = self.generation;
        let sources: Vec<McEntry> = self.sets[from_stop]
            .iter()
            .filter(|e| e.generation == generation && e.on_board)
            .copied()
            .collect();
        for source in sources {
            for transfer in transfers {
                let arrival = StopArrival::following(
                    source.id,
                    self.calc.transfer_target(transfer),
                    self.round,
                    self.calc.plus_duration(source.time, transfer.duration),
                    add_cost(source.c1, transfer.c1),
                    source.c2,
                    ArrivalKind::Transfer(*transfer),
                );
                if let Some(id) = self.add_stop_arrival(arrival) {
                    self.arrive_at_destination(id);
                }
            }
        }
    }

    fn is_destination_reached_in_current_round(&self) -> bool {
        self.destination.reached_current_round()
    }

    fn destination_arrivals(&self) -> &DestinationArrivals {
        &self.destination
    }

    fn arena(&self) -> &ArrivalArena {
        &self.arena
    }

    fn anomalies(&self) -> usize {
        self.anomalies.seen()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rangeraptor::calculator::SearchDirection;
    use crate::rangeraptor::config::CostConfig;
    use crate::rangeraptor::multicriteria::TransitGroupPriority;

    fn state(options: McStateOptions) -> McWorkerState {
        let calc = TransitCalculator::new(SearchDirection::Forward, 0, 0, 60);
        McWorkerState::new(
            4,
            calc,
            CostCalculator::new(&CostConfig::default()),
            EgressPaths::new(&[AccessEgress::new(3, 60, 0)]),
            options,
        )
        .unwrap()
    }

    #[test]
    fn c2_without_calculator_is_rejected() {
        let calc = TransitCalculator::new(SearchDirection::Forward, 0, 0, 60);
        let result = McWorkerState::new(
            1,
            calc,
            CostCalculator::new(&CostConfig::default()),
            EgressPaths::default(),
            McStateOptions {
                include_c2: true,
                ..McStateOptions::default()
            },
        );
        assert!(matches!(result, Err(RaptorError::UnsupportedCriteria(_))));
    }

    #[test]
    fn c2_calculator_seeds_access() {
        let mut state = state(McStateOptions {
            include_c2: true,
            c2_calculator: Some(Arc::new(TransitGroupPriority)),
            ..McStateOptions::default()
        });
        state.setup_iteration(0);
        state.set_access_to_stop(&AccessEgress::new(0, 60, 100), 0);
        let (_, access) = state.arena().iter().next().unwrap();
        assert_eq!(access.c2(), 0);
    }

    #[test]
    fn keeps_faster_and_cheaper_access_arrivals() {
        let mut state = state(McStateOptions::default());
        state.setup_iteration(0);
        state.set_access_to_stop(&AccessEgress::new(0, 60, 1_000), 0);
        state.set_access_to_stop(&AccessEgress::new(0, 120, 500), 0);
        state.set_access_to_stop(&AccessEgress::new(0, 180, 2_000), 0);
        assert_eq!(state.arrivals_at(0), 2);
    }

    #[test]
    fn previous_round_arrivals_use_generation() {
        let mut state = state(McStateOptions::default());
        state.setup_iteration(0);
        state.set_access_to_stop(&AccessEgress::new(0, 60, 0), 0);
        assert!(state.previous_round_arrivals(0).is_empty());

        state.prepare_for_next_round(1);
        assert_eq!(state.previous_round_arrivals(0).len(), 1);

        state.prepare_for_next_round(2);
        assert!(state.previous_round_arrivals(0).is_empty());
    }

    #[test]
    fn re_adding_same_arrival_is_rejected() {
        let mut state = state(McStateOptions::default());
        state.setup_iteration(60);
        state.set_access_to_stop(&AccessEgress::new(0, 60, 0), 60);
        state.setup_iteration(0);
        state.set_access_to_stop(&AccessEgress::new(0, 60, 0), 60);
        assert_eq!(state.arrivals_at(0), 1);
        assert_eq!(state.arena().len(), 1);
    }
}

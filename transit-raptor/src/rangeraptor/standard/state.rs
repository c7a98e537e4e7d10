//! Arrival-time-only state: one best arrival per stop and round.

use tracing::warn;

use crate::domain::{AccessEgress, NOT_SET, Transfer};
use crate::rangeraptor::access_paths::{EgressPaths, egress_allowed};
use crate::rangeraptor::arrival::{ArrivalArena, ArrivalId, ArrivalKind, StopArrival, TransitLeg};
use crate::rangeraptor::calculator::TransitCalculator;
use crate::rangeraptor::debug::{RateLimitedLog, StopArrivalDebugHandler};
use crate::rangeraptor::destination::{DestinationArrival, DestinationArrivals};
use crate::rangeraptor::heuristics::HeuristicsCollector;
use crate::rangeraptor::stop_set::StopSet;
use crate::rangeraptor::strategy::WorkerState;

/// State for the standard profile.
///
/// Best times persist across iterations, which is what makes the range
/// search cheap: a later iteration only records arrivals that beat every
/// earlier one. Each stop keeps two best times, overall and by transit,
/// so a transit arrival that loses to a walk can still be transferred from.
#[derive(Debug)]
pub struct StdWorkerState {
    calc: TransitCalculator,
    arena: ArrivalArena,
    best_times: Vec<i32>,
    best_transit_times: Vec<i32>,
    arrivals: Vec<Vec<Option<ArrivalId>>>,
    transit_arrivals: Vec<Vec<Option<ArrivalId>>>,
    reached_current: StopSet,
    reached_previous: StopSet,
    reached_by_transit: StopSet,
    round: usize,
    iteration_departure_time: i32,
    egress: EgressPaths,
    destination: DestinationArrivals,
    time_limit: Option<i32>,
    debug: Option<StopArrivalDebugHandler>,
    anomalies: RateLimitedLog,
    collector: Option<HeuristicsCollector>,
}

impl StdWorkerState {
    pub fn new(
        number_of_stops: usize,
        max_rounds: usize,
        calc: TransitCalculator,
        egress: EgressPaths,
        time_limit: Option<i32>,
    ) -> Self {
        let unreached = calc.unreached_time();
        Self {
            calc,
            arena: ArrivalArena::new(),
            best_times: vec![unreached; number_of_stops],
            best_transit_times: vec![unreached; number_of_stops],
            arrivals: vec![vec![None; number_of_stops]; max_rounds + 1],
            transit_arrivals: vec![vec![None; number_of_stops]; max_rounds + 1],
            reached_current: StopSet::new(number_of_stops),
            reached_previous: StopSet::new(number_of_stops),
            reached_by_transit: StopSet::new(number_of_stops),
            round: 0,
            iteration_departure_time: 0,
            egress,
            destination: DestinationArrivals::new(calc, false, None),
            time_limit,
            debug: None,
            anomalies: RateLimitedLog::default(),
            collector: None,
        }
    }

    pub fn with_debug(mut self, debug: Option<StopArrivalDebugHandler>) -> Self {
        self.debug = debug;
        self
    }

    /// Record the best travel duration to every stop while searching.
    pub fn with_heuristics_collector(mut self, number_of_stops: usize) -> Self {
        self.collector = Some(HeuristicsCollector::new(number_of_stops));
        self
    }

    pub fn collector(&self) -> Option<&HeuristicsCollector> {
        self.collector.as_ref()
    }

    pub fn calculator(&self) -> &TransitCalculator {
        &self.calc
    }

    pub fn is_stop_reached_in_previous_round(&self, stop: usize) -> bool {
        self.reached_previous.contains(stop)
    }

    /// The arrival at `stop` recorded in the previous round.
    pub fn previous_round_arrival(&self, stop: usize) -> Option<ArrivalId> {
        if !self.is_stop_reached_in_previous_round(stop) {
            return None;
        }
        let round = self.round.checked_sub(1)?;
        self.arrivals.get(round)?[stop]
    }

    pub fn best_time_previous_round(&self, stop: usize) -> i32 {
        self.previous_round_arrival(stop)
            .map_or(self.calc.unreached_time(), |id| {
                self.arena.get(id).arrival_time()
            })
    }

    /// Best time at `stop` over all rounds and iterations.
    pub fn best_time(&self, stop: usize) -> i32 {
        self.best_times[stop]
    }

    /// Record leaving a trip at `alight_stop` at `arrival_time` (alight
    /// slack included), boarded from `previous`.
    pub fn transit_to_stop(
        &mut self,
        previous: ArrivalId,
        alight_stop: usize,
        arrival_time: i32,
        leg: TransitLeg,
    ) {
        if self.calc.is_before(leg.alight_time, leg.board_time) {
            if self.anomalies.allow() {
                warn!(
                    trip = %leg.trip,
                    board_time = leg.board_time,
                    alight_time = leg.alight_time,
                    "trip arrives before it departs; skipping alighting"
                );
            }
            return;
        }
        let arrival = StopArrival::following(
            previous,
            alight_stop,
            self.round,
            arrival_time,
            0,
            NOT_SET,
            ArrivalKind::Transit(leg),
        );
        if self.calc.exceeds_time_limit(arrival_time, self.time_limit) {
            self.reject(&arrival, "time limit");
            return;
        }
        if !self.calc.is_best(arrival_time, self.best_transit_times[alight_stop]) {
            self.reject(&arrival, "not best transit time");
            return;
        }
        let id = self.record(arrival, true);
        self.arrive_at_destination(id);
    }

    /// Push `arrival`, updating best times. `on_board` arrivals also update
    /// the transit best time so transfers can follow them.
    fn record(&mut self, arrival: StopArrival, on_board: bool) -> ArrivalId {
        let stop = arrival.stop();
        let time = arrival.arrival_time();
        let round = arrival.round();
        let id = self.arena.push(arrival);
        if on_board {
            self.best_transit_times[stop] = time;
            self.transit_arrivals[round][stop] = Some(id);
            self.reached_by_transit.insert(stop);
        }
        if self.calc.is_best(time, self.best_times[stop]) {
            self.best_times[stop] = time;
            self.arrivals[round][stop] = Some(id);
            self.reached_current.insert(stop);
        }
        if let Some(debug) = &mut self.debug {
            debug.accepted(&self.arena, self.arena.get(id));
        }
        if let Some(collector) = &mut self.collector {
            collector.record(&self.arena, id, &self.calc);
        }
        id
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
            let rounds = arrival.round() + egress.num_rides;
            let candidate = DestinationArrival {
                arrival: self.arena.next_id(),
                departure_time: self.iteration_departure_time,
                arrival_time: time,
                rounds,
                c1: 0,
                c2: NOT_SET,
            };
            if self.destination.add(candidate) {
                self.arena.push(StopArrival::following(
                    id,
                    arrival.stop(),
                    rounds,
                    time,
                    0,
                    NOT_SET,
                    ArrivalKind::Egress(*egress),
                ));
            }
        }
    }
}

impl WorkerState for StdWorkerState {
    fn setup_iteration(&mut self, iteration_departure_time: i32) {
        self.iteration_departure_time = iteration_departure_time;
        self.round = 0;
        self.reached_current.clear();
        self.reached_previous.clear();
        self.reached_by_transit.clear();
        self.destination.new_round();
        if let Some(debug) = &mut self.debug {
            debug.set_iteration(iteration_departure_time);
        }
    }

    fn prepare_for_next_round(&mut self, round: usize) {
        self.round = round;
        std::mem::swap(&mut self.reached_previous, &mut self.reached_current);
        self.reached_current.clear();
        self.reached_by_transit.clear();
        self.destination.new_round();
    }

    fn set_access_to_stop(&mut self, access: &AccessEgress, departure_time: i32) {
        if access.num_rides >= self.arrivals.len() {
            return;
        }
        let time = self.calc.plus_duration(departure_time, access.duration);
        let arrival = StopArrival::access(*access, time, 0, NOT_SET);
        if self.calc.exceeds_time_limit(time, self.time_limit) {
            self.reject(&arrival, "time limit");
            return;
        }
        let on_board = arrival.arrived_on_board();
        let best = self.calc.is_best(time, self.best_times[access.stop]);
        let best_on_board =
            on_board && self.calc.is_best(time, self.best_transit_times[access.stop]);
        if !best && !best_on_board {
            self.reject(&arrival, "not best time");
            return;
        }
        let id = self.record(arrival, best_on_board);
        self.arrive_at_destination(id);
    }

    fn is_new_round_available(&self) -> bool {
        !self.reached_current.is_empty()
    }

    fn stops_touched_previous_round(&self) -> Vec<usize> {
        self.reached_previous.as_slice().to_vec()
    }

    fn stops_touched_by_transit_current_round(&self) -> Vec<usize> {
        self.reached_by_transit.as_slice().to_vec()
    }

    fn transfer_to_stops(&mut self, from_stop: usize, transfers: &[Transfer]) {
        let Some(from) = self.transit_arrivals[self.round][from_stop] else {
            return;
        };
        let from_time = self.arena.get(from).arrival_time();
        for transfer in transfers {
            let target = self.calc.transfer_target(transfer);
            let time = self.calc.plus_duration(from_time, transfer.duration);
            let arrival = StopArrival::following(
                from,
                target,
                self.round,
                time,
                0,
                NOT_SET,
                ArrivalKind::Transfer(*transfer),
            );
            if self.calc.exceeds_time_limit(time, self.time_limit) {
                self.reject(&arrival, "time limit");
                continue;
            }
            if !self.calc.is_best(time, self.best_times[target]) {
                self.reject(&arrival, "not best time");
                continue;
            }
            let id = self.record(arrival, false);
            self.arrive_at_destination(id);
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
    use crate::domain::TripRef;
    use crate::rangeraptor::calculator::SearchDirection;

    fn state() -> StdWorkerState {
        let calc = TransitCalculator::new(SearchDirection::Forward, 0, 0, 60);
        StdWorkerState::new(4, 3, calc, EgressPaths::new(&[AccessEgress::new(3, 60, 0)]), None)
    }

    fn leg(board_time: i32, alight_time: i32) -> TransitLeg {
        TransitLeg {
            trip: TripRef::new(0, 0),
            board_stop: 0,
            board_stop_pos: 0,
            alight_stop_pos: 1,
            board_time,
            alight_time,
            disposition: None,
        }
    }

    #[test]
    fn access_marks_stop_for_next_round() {
        let mut state = state();
        state.setup_iteration(0);
        state.set_access_to_stop(&AccessEgress::new(0, 120, 0), 0);
        state.prepare_for_next_round(1);

        assert!(state.is_stop_reached_in_previous_round(0));
        assert_eq!(state.best_time_previous_round(0), 120);
        assert_eq!(state.stops_touched_previous_round(), vec![0]);
    }

    #[test]
    fn only_better_times_are_recorded() {
        let mut state = state();
        state.setup_iteration(0);
        state.set_access_to_stop(&AccessEgress::new(0, 120, 0), 0);
        state.prepare_for_next_round(1);
        let from = state.previous_round_arrival(0).unwrap();

        state.transit_to_stop(from, 1, 500, leg(200, 500));
        state.transit_to_stop(from, 1, 600, leg(200, 600));
        assert_eq!(state.best_time(1), 500);
        assert_eq!(state.stops_touched_by_transit_current_round(), vec![1]);
    }

    #[test]
    fn time_travel_is_skipped_and_counted() {
        let mut state = state();
        state.setup_iteration(0);
        state.set_access_to_stop(&AccessEgress::new(0, 120, 0), 0);
        state.prepare_for_next_round(1);
        let from = state.previous_round_arrival(0).unwrap();

        state.transit_to_stop(from, 1, 100, leg(200, 100));
        assert_eq!(state.best_time(1), state.calculator().unreached_time());
        assert_eq!(state.anomalies(), 1);
    }

    #[test]
    fn transit_to_egress_stop_reaches_destination() {
        let mut state = state();
        state.setup_iteration(0);
        state.set_access_to_stop(&AccessEgress::new(0, 120, 0), 0);
        state.prepare_for_next_round(1);
        let from = state.previous_round_arrival(0).unwrap();

        state.transit_to_stop(from, 3, 500, leg(200, 500));
        assert!(state.is_destination_reached_in_current_round());
        let arrivals = state.destination_arrivals().arrivals();
        assert_eq!(arrivals.len(), 1);
        assert_eq!(arrivals[0].arrival_time, 560);
        assert_eq!(arrivals[0].rounds, 1);
    }

    #[test]
    fn walking_access_at_egress_stop_is_not_a_journey() {
        let mut state = state();
        state.setup_iteration(0);
        state.set_access_to_stop(&AccessEgress::new(3, 120, 0), 0);
        assert!(state.destination_arrivals().is_empty());
    }

    #[test]
    fn transfers_follow_transit_arrivals() {
        let mut state = state();
        state.setup_iteration(0);
        state.set_access_to_stop(&AccessEgress::new(0, 120, 0), 0);
        state.prepare_for_next_round(1);
        let from = state.previous_round_arrival(0).unwrap();
        state.transit_to_stop(from, 1, 500, leg(200, 500));

        state.transfer_to_stops(1, &[Transfer::new(1, 2, 90, 0)]);
        assert_eq!(state.best_time(2), 590);
        assert!(state.is_new_round_available());
    }
}

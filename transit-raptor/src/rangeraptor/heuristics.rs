//! Per-stop lower bounds used to prune the multi-criteria search.
//!
//! Heuristics come from an arrival-time-only search run in the opposite
//! direction of the search they serve, starting from its egress stops. The
//! standard state records the best duration from the egress side to every
//! stop; a time-independent sweep over the patterns gives the fewest rides.
//! Every value is a lower bound: pruning with an overestimate would drop
//! optimal journeys.

use serde::Serialize;

use super::arrival::{ArrivalArena, ArrivalId};
use super::calculator::TransitCalculator;
use super::cost::{add_cost, cost_of};
use super::transit_data::TransitDataProvider;
use crate::domain::{AccessEgress, NOT_FOUND, UNREACHED_HIGH};

/// Records the shortest duration to every stop while a standard search
/// runs.
#[derive(Debug, Clone)]
pub struct HeuristicsCollector {
    durations: Vec<i32>,
}

impl HeuristicsCollector {
    pub fn new(number_of_stops: usize) -> Self {
        Self {
            durations: vec![UNREACHED_HIGH; number_of_stops],
        }
    }

    /// Account for the arrival `id`, measured from when its access path
    /// started.
    pub fn record(&mut self, arena: &ArrivalArena, id: ArrivalId, calc: &TransitCalculator) {
        let arrival = arena.get(id);
        let root = arena.root(id);
        let Ok(access) = root.access_path() else {
            return;
        };
        let start = calc.minus_duration(root.arrival_time(), access.duration);
        let duration = calc.duration(start, arrival.arrival_time());
        let best = &mut self.durations[arrival.stop()];
        if duration < *best {
            *best = duration;
        }
    }

    pub fn duration(&self, stop: usize) -> Option<i32> {
        let duration = self.durations[stop];
        (duration != UNREACHED_HIGH).then_some(duration)
    }

    pub fn number_of_stops(&self) -> usize {
        self.durations.len()
    }
}

/// Lower bounds on the remaining duration, rides and cost from each stop to
/// the far end of the search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Heuristics {
    #[serde(skip)]
    durations: Vec<Option<i32>>,
    #[serde(skip)]
    rides: Vec<Option<usize>>,
    min_cost_factor: i32,
    best_overall_duration: i32,
    best_overall_rides: i32,
    best_overall_cost: i32,
}

impl Heuristics {
    /// Build from a finished heuristic search.
    ///
    /// `iteration_step` is the step of that search: a journey can start up
    /// to one step less than a minute-grid iteration, so durations are
    /// reduced by `step - 1`. `rides` comes from [`min_rides_to_stops`].
    /// `destination_paths` are the paths at the end the heuristic search
    /// walks towards, used for the overall best values.
    pub fn new(
        collector: &HeuristicsCollector,
        rides: Vec<Option<usize>>,
        iteration_step: i32,
        min_cost_factor: i32,
        destination_paths: &[AccessEgress],
    ) -> Self {
        let slack = (iteration_step - 1).max(0);
        let durations = (0..collector.number_of_stops())
            .map(|stop| collector.duration(stop).map(|d| (d - slack).max(0)))
            .collect();
        let mut heuristics = Self {
            durations,
            rides,
            min_cost_factor,
            best_overall_duration: NOT_FOUND,
            best_overall_rides: NOT_FOUND,
            best_overall_cost: NOT_FOUND,
        };
        heuristics.compute_overall_best(destination_paths);
        heuristics
    }

    fn compute_overall_best(&mut self, paths: &[AccessEgress]) {
        let mut duration = None::<i32>;
        let mut rides = None::<usize>;
        let mut cost = None::<i32>;
        for path in paths {
            if !self.is_reached(path.stop) {
                continue;
            }
            let d = self.min_travel_duration(path.stop) + path.duration;
            let r = self.min_rides(path.stop) + path.num_rides;
            let c = add_cost(self.min_cost(path.stop), path.c1);
            duration = Some(duration.map_or(d, |best| best.min(d)));
            rides = Some(rides.map_or(r, |best| best.min(r)));
            cost = Some(cost.map_or(c, |best| best.min(c)));
        }
        self.best_overall_duration = duration.unwrap_or(NOT_FOUND);
        self.best_overall_rides = rides.map_or(NOT_FOUND, |r| r as i32);
        self.best_overall_cost = cost.unwrap_or(NOT_FOUND);
    }

    pub fn number_of_stops(&self) -> usize {
        self.durations.len()
    }

    pub fn is_reached(&self, stop: usize) -> bool {
        self.durations.get(stop).is_some_and(Option::is_some)
    }

    /// Minimum duration from `stop` to the end, or 0 if unreached.
    pub fn min_travel_duration(&self, stop: usize) -> i32 {
        self.durations.get(stop).copied().flatten().unwrap_or(0)
    }

    /// Minimum rides from `stop` to the end, counting rides inside the
    /// final street path.
    pub fn min_rides(&self, stop: usize) -> usize {
        self.rides.get(stop).copied().flatten().unwrap_or(0)
    }

    pub fn min_cost(&self, stop: usize) -> i32 {
        cost_of(self.min_cost_factor, self.min_travel_duration(stop))
    }

    /// Any stop reached at all.
    pub fn any_reached(&self) -> bool {
        self.durations.iter().any(Option::is_some)
    }

    /// Best journey duration, `NOT_FOUND` if the heuristic search never got
    /// from one end to the other.
    pub fn best_overall_duration(&self) -> i32 {
        self.best_overall_duration
    }

    pub fn best_overall_rides(&self) -> i32 {
        self.best_overall_rides
    }

    pub fn best_overall_cost(&self) -> i32 {
        self.best_overall_cost
    }

    pub fn best_travel_duration_to_int_array(&self, unreached: i32) -> Vec<i32> {
        self.to_int_array(unreached, |h, stop| h.min_travel_duration(stop))
    }

    /// Remaining rides per stop; the number of transfers still needed when
    /// the stop is reached on board.
    pub fn best_num_of_transfers_to_int_array(&self, unreached: i32) -> Vec<i32> {
        self.to_int_array(unreached, |h, stop| h.min_rides(stop) as i32)
    }

    pub fn best_generalized_cost_to_int_array(&self, unreached: i32) -> Vec<i32> {
        self.to_int_array(unreached, Self::min_cost)
    }

    fn to_int_array(&self, unreached: i32, value: impl Fn(&Self, usize) -> i32) -> Vec<i32> {
        (0..self.number_of_stops())
            .map(|stop| {
                if self.is_reached(stop) {
                    value(self, stop)
                } else {
                    unreached
                }
            })
            .collect()
    }
}

/// Fewest rides from the `seeds` to every stop, ignoring time.
///
/// Patterns are scanned in `calc`'s direction and honour board/alight
/// permissions; transfers cost no ride. Runs to a fixed point, so the
/// result is exact for the time-independent graph and a lower bound for
/// any timetable.
pub fn min_rides_to_stops<D: TransitDataProvider + ?Sized>(
    data: &D,
    calc: &TransitCalculator,
    seeds: &[AccessEgress],
) -> Vec<Option<usize>> {
    let mut rides = vec![None; data.number_of_stops()];
    for seed in seeds {
        relax(&mut rides, seed.stop, seed.num_rides);
    }
    let mut changed = true;
    while changed {
        changed = false;
        for stop in 0..rides.len() {
            let Some(current) = rides[stop] else {
                continue;
            };
            for transfer in calc.transfers(data, stop) {
                changed |= relax(&mut rides, calc.transfer_target(transfer), current);
            }
        }
        for route_index in 0..data.number_of_routes() {
            let pattern = data.route(route_index).pattern();
            let mut on_board: Option<usize> = None;
            for pos in calc.pattern_stop_positions(pattern.number_of_stops_in_pattern()) {
                let stop = pattern.stop_index(pos);
                if let Some(boarded) = on_board {
                    if calc.alighting_possible_at(pattern, pos) {
                        changed |= relax(&mut rides, stop, boarded + 1);
                    }
                }
                if calc.boarding_possible_at(pattern, pos) {
                    if let Some(here) = rides[stop] {
                        on_board = Some(on_board.map_or(here, |b| b.min(here)));
                    }
                }
            }
        }
    }
    rides
}

fn relax(rides: &mut [Option<usize>], stop: usize, value: usize) -> bool {
    match rides[stop] {
        Some(current) if current <= value => false,
        _ => {
            rides[stop] = Some(value);
            true
        }
    }
}

/// Cheapest cost per second over the network's transfers and the given
/// street paths. Zero-length legs are ignored; `i32::MAX` if there are none.
pub fn street_cost_factor<D: TransitDataProvider + ?Sized>(
    data: &D,
    street_paths: &[AccessEgress],
) -> i32 {
    let transfers = (0..data.number_of_stops())
        .flat_map(|stop| data.transfers_from_stop(stop))
        .map(|t| (t.c1, t.duration));
    let paths = street_paths.iter().map(|p| (p.c1, p.duration));
    transfers
        .chain(paths)
        .filter(|(_, duration)| *duration > 0)
        .map(|(c1, duration)| c1.max(0) / duration)
        .min()
        .unwrap_or(i32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Route, Transfer, TripPattern, TripRef, TripSchedule};
    use crate::rangeraptor::arrival::{ArrivalKind, StopArrival, TransitLeg};
    use crate::rangeraptor::calculator::SearchDirection;

    struct Line {
        routes: Vec<Route>,
        transfers: Vec<Vec<Transfer>>,
        empty: Vec<Transfer>,
    }

    impl TransitDataProvider for Line {
        fn number_of_stops(&self) -> usize {
            5
        }

        fn route_indexes_for_stops(&self, _stops: &[usize]) -> Vec<usize> {
            (0..self.routes.len()).collect()
        }

        fn number_of_routes(&self) -> usize {
            self.routes.len()
        }

        fn route(&self, index: usize) -> &Route {
            &self.routes[index]
        }

        fn transfers_from_stop(&self, stop: usize) -> &[Transfer] {
            &self.transfers[stop]
        }

        fn transfers_to_stop(&self, _stop: usize) -> &[Transfer] {
            &self.empty
        }
    }

    fn line() -> Line {
        // 0 -> 1 -> 2 on route 0, 3 -> 4 on route 1, walk 2 -> 3.
        let r0 = Route::new(
            TripPattern::new(0, vec![0, 1, 2], 0, "A").unwrap(),
            vec![TripSchedule::from_times("a", vec![0, 100, 200]).unwrap()],
        )
        .unwrap();
        let r1 = Route::new(
            TripPattern::new(1, vec![3, 4], 0, "B").unwrap(),
            vec![TripSchedule::from_times("b", vec![300, 400]).unwrap()],
        )
        .unwrap();
        let mut transfers = vec![Vec::new(); 5];
        transfers[2].push(Transfer::new(2, 3, 60, 3_000));
        Line {
            routes: vec![r0, r1],
            transfers,
            empty: Vec::new(),
        }
    }

    #[test]
    fn min_rides_follow_patterns_and_transfers() {
        let data = line();
        let calc = TransitCalculator::new(SearchDirection::Forward, 0, 0, 60);
        let rides = min_rides_to_stops(&data, &calc, &[AccessEgress::new(0, 0, 0)]);
        assert_eq!(rides, vec![Some(0), Some(1), Some(1), Some(1), Some(2)]);
    }

    #[test]
    fn min_rides_start_from_flex_ride_count() {
        let data = line();
        let calc = TransitCalculator::new(SearchDirection::Forward, 0, 0, 60);
        let seed = AccessEgress::new(3, 600, 0).with_rides(1, true);
        let rides = min_rides_to_stops(&data, &calc, &[seed]);
        assert_eq!(rides, vec![None, None, None, Some(1), Some(2)]);
    }

    #[test]
    fn street_factor_is_cheapest_per_second() {
        let data = line();
        let walk = AccessEgress::new(4, 100, 2_000);
        assert_eq!(street_cost_factor(&data, &[walk]), 20);
        assert_eq!(street_cost_factor(&data, &[]), 50);
    }

    fn collector_with_arrival() -> HeuristicsCollector {
        let calc = TransitCalculator::new(SearchDirection::Forward, 0, 0, 60);
        let mut arena = ArrivalArena::new();
        let access = arena.push(StopArrival::access(AccessEgress::new(0, 60, 0), 160, 0, 0));
        let transit = arena.push(StopArrival::following(
            access,
            2,
            1,
            500,
            0,
            0,
            ArrivalKind::Transit(TransitLeg {
                trip: TripRef::new(0, 0),
                board_stop: 0,
                board_stop_pos: 0,
                alight_stop_pos: 2,
                board_time: 200,
                alight_time: 500,
                disposition: None,
            }),
        ));
        let mut collector = HeuristicsCollector::new(5);
        collector.record(&arena, access, &calc);
        collector.record(&arena, transit, &calc);
        collector
    }

    #[test]
    fn collector_measures_from_access_start() {
        let collector = collector_with_arrival();
        assert_eq!(collector.duration(0), Some(60));
        assert_eq!(collector.duration(2), Some(400));
        assert_eq!(collector.duration(1), None);
    }

    #[test]
    fn durations_are_reduced_by_iteration_step() {
        let collector = collector_with_arrival();
        let rides = vec![Some(0), None, Some(1), None, None];
        let heuristics = Heuristics::new(&collector, rides, 60, 100, &[]);
        assert_eq!(heuristics.min_travel_duration(0), 1);
        assert_eq!(heuristics.min_travel_duration(2), 341);
        assert_eq!(heuristics.min_cost(2), 34_100);
        assert_eq!(heuristics.best_overall_duration(), NOT_FOUND);
    }

    #[test]
    fn int_arrays_fill_unreached() {
        let collector = collector_with_arrival();
        let rides = vec![Some(0), None, Some(1), None, None];
        let heuristics = Heuristics::new(&collector, rides, 1, 100, &[]);
        assert_eq!(
            heuristics.best_travel_duration_to_int_array(-1),
            vec![60, -1, 400, -1, -1]
        );
        assert_eq!(
            heuristics.best_num_of_transfers_to_int_array(-1),
            vec![0, -1, 1, -1, -1]
        );
        assert_eq!(
            heuristics.best_generalized_cost_to_int_array(-1),
            vec![6_000, -1, 40_000, -1, -1]
        );
    }

    #[test]
    fn overall_best_uses_destination_paths() {
        let collector = collector_with_arrival();
        let rides = vec![Some(0), None, Some(1), None, None];
        let paths = [AccessEgress::new(2, 30, 500), AccessEgress::new(1, 10, 0)];
        let heuristics = Heuristics::new(&collector, rides, 1, 100, &paths);
        assert_eq!(heuristics.best_overall_duration(), 430);
        assert_eq!(heuristics.best_overall_rides(), 1);
        assert_eq!(heuristics.best_overall_cost(), 40_500);
        assert!(heuristics.any_reached());
        assert!(!heuristics.is_reached(1));
    }
}

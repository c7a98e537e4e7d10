//! Direction-aware time arithmetic.
//!
//! Every comparison and time adjustment in the search goes through
//! [`TransitCalculator`], so the same worker, state and strategy code runs
//! both forward (depart after, minimise arrival) and in reverse (arrive
//! before, maximise departure).

use serde::{Deserialize, Serialize};

use super::slack::SlackProvider;
use super::transit_data::TransitDataProvider;
use crate::domain::{
    AccessEgress, Transfer, TripPattern, TripSchedule, UNREACHED_HIGH, UNREACHED_LOW, add_guarded,
    sub_guarded,
};

/// Which way the search walks through time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchDirection {
    #[default]
    Forward,
    Reverse,
}

impl SearchDirection {
    pub fn is_forward(self) -> bool {
        self == SearchDirection::Forward
    }

    pub fn opposite(self) -> Self {
        match self {
            SearchDirection::Forward => SearchDirection::Reverse,
            SearchDirection::Reverse => SearchDirection::Forward,
        }
    }
}

/// Time arithmetic for one search direction and window.
///
/// `search_time` is the earliest departure for a forward search and the
/// latest arrival for a reverse search. Iterations cover
/// `search_time..=search_time + window` (forward, latest first) or
/// `search_time - window..=search_time` (reverse, earliest first).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransitCalculator {
    direction: SearchDirection,
    search_time: i32,
    search_window: i32,
    iteration_step: i32,
}

impl TransitCalculator {
    pub fn new(
        direction: SearchDirection,
        search_time: i32,
        search_window: i32,
        iteration_step: i32,
    ) -> Self {
        Self {
            direction,
            search_time,
            search_window: search_window.max(0),
            iteration_step: iteration_step.max(1),
        }
    }

    pub fn direction(&self) -> SearchDirection {
        self.direction
    }

    pub fn search_forward(&self) -> bool {
        self.direction.is_forward()
    }

    pub fn iteration_step(&self) -> i32 {
        self.iteration_step
    }

    /// Move `time` forward along the search by `duration`.
    pub fn plus_duration(&self, time: i32, duration: i32) -> i32 {
        if self.search_forward() {
            add_guarded(time, duration)
        } else {
            sub_guarded(time, duration)
        }
    }

    /// Move `time` backward along the search by `duration`.
    pub fn minus_duration(&self, time: i32, duration: i32) -> i32 {
        if self.search_forward() {
            sub_guarded(time, duration)
        } else {
            add_guarded(time, duration)
        }
    }

    /// Elapsed search time from `start` to `end`; positive when `end` is
    /// later in the search.
    pub fn duration(&self, start: i32, end: i32) -> i32 {
        if self.search_forward() {
            end - start
        } else {
            start - end
        }
    }

    /// True if `a` comes strictly before `b` in search order.
    pub fn is_before(&self, a: i32, b: i32) -> bool {
        if self.search_forward() { a < b } else { a > b }
    }

    /// True if `a` comes strictly after `b` in search order.
    pub fn is_after(&self, a: i32, b: i32) -> bool {
        self.is_before(b, a)
    }

    /// True if arriving at `a` is better than arriving at `b`.
    pub fn is_best(&self, a: i32, b: i32) -> bool {
        self.is_before(a, b)
    }

    /// Time value meaning "not reached yet" for this direction.
    pub fn unreached_time(&self) -> i32 {
        if self.search_forward() {
            UNREACHED_HIGH
        } else {
            UNREACHED_LOW
        }
    }

    /// True if `time` lies beyond `limit` in search order.
    pub fn exceeds_time_limit(&self, time: i32, limit: Option<i32>) -> bool {
        limit.is_some_and(|limit| self.is_after(time, limit))
    }

    /// Iteration start times in the order the range search runs them.
    ///
    /// Forward searches run the latest departure first; reverse searches run
    /// the earliest arrival first. Either way every later iteration is a
    /// superset of the earlier ones, which is what lets state persist.
    pub fn iteration_departure_times(&self) -> Vec<i32> {
        let n = self.search_window / self.iteration_step;
        if self.search_forward() {
            (0..=n)
                .rev()
                .map(|i| self.search_time + i * self.iteration_step)
                .collect()
        } else {
            (0..=n)
                .rev()
                .map(|i| self.search_time - i * self.iteration_step)
                .collect()
        }
    }

    /// Stop positions in the order a pattern is scanned.
    pub fn pattern_stop_positions(&self, number_of_stops: usize) -> StopPositions {
        if self.search_forward() {
            StopPositions {
                next: 0,
                remaining: number_of_stops,
                step: 1,
            }
        } else {
            StopPositions {
                next: number_of_stops as isize - 1,
                remaining: number_of_stops,
                step: -1,
            }
        }
    }

    pub fn boarding_possible_at(&self, pattern: &TripPattern, pos: usize) -> bool {
        if self.search_forward() {
            pattern.boarding_possible_at(pos)
        } else {
            pattern.alighting_possible_at(pos)
        }
    }

    pub fn alighting_possible_at(&self, pattern: &TripPattern, pos: usize) -> bool {
        if self.search_forward() {
            pattern.alighting_possible_at(pos)
        } else {
            pattern.boarding_possible_at(pos)
        }
    }

    /// Slack applied before boarding, in search order.
    pub fn board_slack(&self, slack: &dyn SlackProvider, slack_index: usize) -> i32 {
        if self.search_forward() {
            slack.board_slack(slack_index)
        } else {
            slack.alight_slack(slack_index)
        }
    }

    /// Slack applied after alighting, in search order.
    pub fn alight_slack(&self, slack: &dyn SlackProvider, slack_index: usize) -> i32 {
        if self.search_forward() {
            slack.alight_slack(slack_index)
        } else {
            slack.board_slack(slack_index)
        }
    }

    /// Schedule time at which the search boards `trip` at `pos`.
    pub fn trip_board_time(&self, trip: &TripSchedule, pos: usize) -> i32 {
        if self.search_forward() {
            trip.departure(pos)
        } else {
            trip.arrival(pos)
        }
    }

    /// Schedule time at which the search leaves `trip` at `pos`.
    pub fn trip_alight_time(&self, trip: &TripSchedule, pos: usize) -> i32 {
        if self.search_forward() {
            trip.arrival(pos)
        } else {
            trip.departure(pos)
        }
    }

    /// Stop the search reaches by following `transfer`.
    pub fn transfer_target(&self, transfer: &Transfer) -> usize {
        if self.search_forward() {
            transfer.to_stop
        } else {
            transfer.from_stop
        }
    }

    /// Transfers to follow out of `stop`.
    pub fn transfers<'a, D: TransitDataProvider + ?Sized>(
        &self,
        data: &'a D,
        stop: usize,
    ) -> &'a [Transfer] {
        if self.search_forward() {
            data.transfers_from_stop(stop)
        } else {
            data.transfers_to_stop(stop)
        }
    }

    /// When a street path can start, given the time the search wants to
    /// start it. Respects opening hours; `None` if it never opens in time.
    pub fn departure_time(&self, path: &AccessEgress, requested: i32) -> Option<i32> {
        if self.search_forward() {
            path.earliest_departure_time(requested)
        } else {
            path.latest_arrival_time(requested)
        }
    }

    /// Better trip in search order: earlier index when searching forward.
    pub fn is_better_trip(&self, a: usize, b: usize) -> bool {
        if self.search_forward() { a < b } else { a > b }
    }
}

/// Iterator over pattern stop positions in search order.
#[derive(Debug, Clone)]
pub struct StopPositions {
    next: isize,
    remaining: usize,
    step: isize,
}

impl Iterator for StopPositions {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        if self.remaining == 0 {
            return None;
        }
        let pos = self.next as usize;
        self.next += self.step;
        self.remaining -= 1;
        Some(pos)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for StopPositions {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::NOT_SET;

    fn forward() -> TransitCalculator {
        TransitCalculator::new(SearchDirection::Forward, 28_800, 180, 60)
    }

    fn reverse() -> TransitCalculator {
        TransitCalculator::new(SearchDirection::Reverse, 36_000, 180, 60)
    }

    #[test]
    fn forward_iterations_run_latest_first() {
        assert_eq!(
            forward().iteration_departure_times(),
            vec![28_980, 28_920, 28_860, 28_800]
        );
    }

    #[test]
    fn reverse_iterations_run_earliest_first() {
        assert_eq!(
            reverse().iteration_departure_times(),
            vec![35_820, 35_880, 35_940, 36_000]
        );
    }

    #[test]
    fn zero_window_has_single_iteration() {
        let calc = TransitCalculator::new(SearchDirection::Forward, 100, 0, 60);
        assert_eq!(calc.iteration_departure_times(), vec![100]);
    }

    #[test]
    fn comparisons_follow_direction() {
        assert!(forward().is_before(1, 2));
        assert!(reverse().is_before(2, 1));
        assert!(forward().is_best(10, 20));
        assert!(reverse().is_best(20, 10));
        assert_eq!(forward().duration(100, 160), 60);
        assert_eq!(reverse().duration(160, 100), 60);
    }

    #[test]
    fn durations_move_with_direction_and_keep_sentinels() {
        assert_eq!(forward().plus_duration(100, 30), 130);
        assert_eq!(reverse().plus_duration(100, 30), 70);
        assert_eq!(forward().plus_duration(NOT_SET, 30), NOT_SET);
        assert_eq!(reverse().minus_duration(100, 30), 130);
    }

    #[test]
    fn stop_positions_follow_direction() {
        assert_eq!(forward().pattern_stop_positions(3).collect::<Vec<_>>(), vec![0, 1, 2]);
        assert_eq!(reverse().pattern_stop_positions(3).collect::<Vec<_>>(), vec![2, 1, 0]);
        assert_eq!(reverse().pattern_stop_positions(0).count(), 0);
    }

    #[test]
    fn time_limit_is_directional() {
        assert!(forward().exceeds_time_limit(101, Some(100)));
        assert!(!forward().exceeds_time_limit(100, Some(100)));
        assert!(reverse().exceeds_time_limit(99, Some(100)));
        assert!(!reverse().exceeds_time_limit(99, None));
    }

    #[test]
    fn unreached_matches_direction() {
        assert_eq!(forward().unreached_time(), UNREACHED_HIGH);
        assert_eq!(reverse().unreached_time(), UNREACHED_LOW);
    }
}

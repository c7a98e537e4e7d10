//! Finding the trip to board at a stop position.

use super::calculator::SearchDirection;
use crate::domain::Timetable;

/// A trip found by [`TripScheduleSearch`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TripSearchResult {
    /// Index of the trip in the timetable.
    pub trip_index: usize,
    /// Schedule time at which the trip is boarded, in search terms:
    /// departure for forward searches, arrival for reverse searches.
    pub board_time: i32,
}

/// Binary search over a timetable for the best trip to board.
///
/// Forward, that is the first trip departing at or after the requested time
/// (board search). In reverse, it is the last trip arriving at or before it
/// (alight search). Trips never overtake each other within a route, so times
/// are sorted at every stop position.
#[derive(Debug, Clone, Copy)]
pub struct TripScheduleSearch<'a> {
    timetable: &'a Timetable,
    direction: SearchDirection,
}

impl<'a> TripScheduleSearch<'a> {
    pub fn new(timetable: &'a Timetable, direction: SearchDirection) -> Self {
        Self {
            timetable,
            direction,
        }
    }

    /// Search for a trip at `stop_pos` reachable from `earliest_board_time`.
    ///
    /// If `on_trip` is set, only trips strictly better than it are
    /// considered; a trip with the same board time is not an improvement.
    /// Trips listed in `excluded` are skipped.
    pub fn search(
        &self,
        earliest_board_time: i32,
        stop_pos: usize,
        on_trip: Option<usize>,
        excluded: &[usize],
    ) -> Option<TripSearchResult> {
        let found = match self.direction {
            SearchDirection::Forward => {
                self.board_search(earliest_board_time, stop_pos, on_trip, excluded)
            }
            SearchDirection::Reverse => {
                self.alight_search(earliest_board_time, stop_pos, on_trip, excluded)
            }
        }?;
        if let Some(current) = on_trip {
            let current_time = self.board_time(current, stop_pos);
            if current_time == found.board_time {
                return None;
            }
        }
        Some(found)
    }

    fn board_time(&self, trip_index: usize, stop_pos: usize) -> i32 {
        let trip = self.timetable.trip_schedule(trip_index);
        match self.direction {
            SearchDirection::Forward => trip.departure(stop_pos),
            SearchDirection::Reverse => trip.arrival(stop_pos),
        }
    }

    fn board_search(
        &self,
        earliest: i32,
        stop_pos: usize,
        on_trip: Option<usize>,
        excluded: &[usize],
    ) -> Option<TripSearchResult> {
        let trips = self.timetable.trips();
        let upper = on_trip.unwrap_or(trips.len()).min(trips.len());
        let first = trips[..upper].partition_point(|t| t.departure(stop_pos) < earliest);
        (first..upper)
            .find(|i| !excluded.contains(i))
            .map(|trip_index| TripSearchResult {
                trip_index,
                board_time: trips[trip_index].departure(stop_pos),
            })
    }

    fn alight_search(
        &self,
        latest: i32,
        stop_pos: usize,
        on_trip: Option<usize>,
        excluded: &[usize],
    ) -> Option<TripSearchResult> {
        let trips = self.timetable.trips();
        let lower = on_trip.map_or(0, |i| i + 1);
        let end = trips.partition_point(|t| t.arrival(stop_pos) <= latest);
        (lower..end)
            .rev()
            .find(|i| !excluded.contains(i))
            .map(|trip_index| TripSearchResult {
                trip_index,
                board_time: trips[trip_index].arrival(stop_pos),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Route, TripPattern, TripSchedule};

    fn route() -> Route {
        let pattern = TripPattern::new(0, vec![0, 1], 0, "P").unwrap();
        Route::new(
            pattern,
            vec![
                TripSchedule::from_times("a", vec![100, 200]).unwrap(),
                TripSchedule::from_times("b", vec![300, 400]).unwrap(),
                TripSchedule::from_times("c", vec![500, 600]).unwrap(),
            ],
        )
        .unwrap()
    }

    #[test]
    fn board_search_finds_first_departure_at_or_after() {
        let route = route();
        let search = TripScheduleSearch::new(route.timetable(), SearchDirection::Forward);
        assert_eq!(
            search.search(300, 0, None, &[]),
            Some(TripSearchResult {
                trip_index: 1,
                board_time: 300
            })
        );
        assert_eq!(search.search(301, 0, None, &[]).map(|r| r.trip_index), Some(2));
        assert_eq!(search.search(501, 0, None, &[]), None);
    }

    #[test]
    fn board_search_only_improves_on_current_trip() {
        let route = route();
        let search = TripScheduleSearch::new(route.timetable(), SearchDirection::Forward);
        assert_eq!(search.search(400, 0, Some(2), &[]), None);
        assert_eq!(search.search(250, 0, Some(2), &[]).map(|r| r.trip_index), Some(1));
    }

    #[test]
    fn board_search_skips_excluded_trips() {
        let route = route();
        let search = TripScheduleSearch::new(route.timetable(), SearchDirection::Forward);
        assert_eq!(search.search(100, 0, None, &[0]).map(|r| r.trip_index), Some(1));
        assert_eq!(search.search(100, 0, None, &[0, 1, 2]), None);
    }

    #[test]
    fn alight_search_finds_last_arrival_at_or_before() {
        let route = route();
        let search = TripScheduleSearch::new(route.timetable(), SearchDirection::Reverse);
        assert_eq!(
            search.search(450, 1, None, &[]),
            Some(TripSearchResult {
                trip_index: 1,
                board_time: 400
            })
        );
        assert_eq!(search.search(199, 1, None, &[]), None);
        assert_eq!(search.search(1000, 1, Some(2), &[]), None);
        assert_eq!(search.search(450, 1, Some(0), &[1]), None);
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        fn timetable(mut departures: Vec<i32>) -> Route {
            departures.sort_unstable();
            let trips = departures
                .iter()
                .enumerate()
                .map(|(i, &dep)| TripSchedule::from_times(format!("t{i}"), vec![dep, dep + 600]))
                .collect::<Result<Vec<_>, _>>()
                .unwrap();
            Route::new(TripPattern::new(0, vec![0, 1], 0, "P").unwrap(), trips).unwrap()
        }

        proptest! {
            #[test]
            fn board_search_matches_linear_scan(
                departures in prop::collection::vec(0..2_000i32, 1..12),
                time in 0..2_200i32,
                excluded in prop::collection::vec(0..12usize, 0..3),
            ) {
                let route = timetable(departures);
                let trips = route.timetable().trips();
                let expected = (0..trips.len())
                    .find(|i| trips[*i].departure(0) >= time && !excluded.contains(i));

                let search = TripScheduleSearch::new(route.timetable(), SearchDirection::Forward);
                let found = search.search(time, 0, None, &excluded).map(|r| r.trip_index);
                prop_assert_eq!(found, expected);
            }

            #[test]
            fn alight_search_matches_linear_scan(
                departures in prop::collection::vec(0..2_000i32, 1..12),
                time in 0..3_000i32,
                excluded in prop::collection::vec(0..12usize, 0..3),
            ) {
                let route = timetable(departures);
                let trips = route.timetable().trips();
                let expected = (0..trips.len())
                    .rev()
                    .find(|i| trips[*i].arrival(1) <= time && !excluded.contains(i));

                let search = TripScheduleSearch::new(route.timetable(), SearchDirection::Reverse);
                let found = search.search(time, 1, None, &excluded).map(|r| r.trip_index);
                prop_assert_eq!(found, expected);
            }
        }
    }
}

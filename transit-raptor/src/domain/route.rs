//! Routes: a pattern plus the timetable of trips running it.

use std::fmt;

use super::{DomainError, TripPattern, is_sentinel};

/// Reference to one trip: its route index and its index in the timetable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TripRef {
    pub route: usize,
    pub trip: usize,
}

impl TripRef {
    pub fn new(route: usize, trip: usize) -> Self {
        Self { route, trip }
    }
}

impl fmt::Display for TripRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "R{}#{}", self.route, self.trip)
    }
}

/// One trip's arrival and departure time at every stop position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TripSchedule {
    label: String,
    arrivals: Vec<i32>,
    departures: Vec<i32>,
}

impl TripSchedule {
    /// Create a schedule from per-position arrival and departure times.
    ///
    /// Times are not required to be increasing: non-monotonic feeds are
    /// caught (and logged) by the search instead of failing the whole
    /// network.
    pub fn new(
        label: impl Into<String>,
        arrivals: Vec<i32>,
        departures: Vec<i32>,
    ) -> Result<Self, DomainError> {
        let label = label.into();
        if arrivals.len() != departures.len() {
            return Err(DomainError::LengthMismatch {
                pattern: label,
                what: "departure times",
                expected: arrivals.len(),
                actual: departures.len(),
            });
        }
        if let Some(&value) = arrivals.iter().chain(&departures).find(|t| is_sentinel(**t)) {
            return Err(DomainError::ValueOutOfRange {
                what: "schedule time",
                value,
            });
        }
        Ok(Self {
            label,
            arrivals,
            departures,
        })
    }

    /// Create a schedule where arrival and departure coincide at each stop.
    pub fn from_times(label: impl Into<String>, times: Vec<i32>) -> Result<Self, DomainError> {
        Self::new(label, times.clone(), times)
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn arrival(&self, pos: usize) -> i32 {
        self.arrivals[pos]
    }

    pub fn departure(&self, pos: usize) -> i32 {
        self.departures[pos]
    }

    pub fn number_of_stops(&self) -> usize {
        self.arrivals.len()
    }
}

/// The trips of a route, sorted by departure from the first stop.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Timetable {
    trips: Vec<TripSchedule>,
}

impl Timetable {
    pub fn number_of_trip_schedules(&self) -> usize {
        self.trips.len()
    }

    pub fn trip_schedule(&self, index: usize) -> &TripSchedule {
        &self.trips[index]
    }

    pub fn trips(&self) -> &[TripSchedule] {
        &self.trips
    }
}

/// A pattern together with its timetable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    pattern: TripPattern,
    timetable: Timetable,
}

impl Route {
    /// Create a route, sorting its trips by first departure.
    ///
    /// Every trip must have one time per stop in the pattern, and trips may
    /// not overtake each other: the trip search relies on times being
    /// non-decreasing by trip index at every stop position.
    pub fn new(pattern: TripPattern, mut trips: Vec<TripSchedule>) -> Result<Self, DomainError> {
        let n = pattern.number_of_stops_in_pattern();
        for trip in &trips {
            if trip.number_of_stops() != n {
                return Err(DomainError::LengthMismatch {
                    pattern: format!("{}/{}", pattern.debug_info(), trip.label()),
                    what: "trip times",
                    expected: n,
                    actual: trip.number_of_stops(),
                });
            }
        }
        trips.sort_by_key(|t| (t.departure(0), t.arrival(n - 1)));
        for pair in trips.windows(2) {
            for pos in 0..n {
                if pair[1].departure(pos) < pair[0].departure(pos)
                    || pair[1].arrival(pos) < pair[0].arrival(pos)
                {
                    return Err(DomainError::OvertakingTrips {
                        pattern: pattern.debug_info().to_string(),
                        first: pair[0].label().to_string(),
                        second: pair[1].label().to_string(),
                        pos,
                    });
                }
            }
        }
        Ok(Self {
            pattern,
            timetable: Timetable { trips },
        })
    }

    pub fn pattern(&self) -> &TripPattern {
        &self.pattern
    }

    pub fn timetable(&self) -> &Timetable {
        &self.timetable
    }

    /// Look up a trip's timetable index by its label.
    pub fn trip_index_by_label(&self, label: &str) -> Option<usize> {
        self.timetable.trips.iter().position(|t| t.label() == label)
    }
}

//! Access and egress paths.

use serde::Deserialize;

use super::{DomainError, is_sentinel};

/// Time window in which an access/egress path may be started.
///
/// Both bounds are seconds since midnight of the service day, inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct OpeningHours {
    pub open: i32,
    pub close: i32,
}

/// A street (or flex) path between the origin/destination and a stop.
///
/// Produced by the street router; the search consumes only its stop,
/// duration and cost, the number of transit rides embedded in it (flex), and
/// whether it arrives at the stop on board a vehicle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct AccessEgress {
    pub stop: usize,
    /// Duration in seconds.
    pub duration: i32,
    #[serde(default)]
    pub c1: i32,
    #[serde(default)]
    pub num_rides: usize,
    #[serde(default)]
    pub stop_reached_on_board: bool,
    #[serde(default)]
    pub opening_hours: Option<OpeningHours>,
}

impl AccessEgress {
    /// Create a plain walking access/egress path.
    pub fn new(stop: usize, duration: i32, c1: i32) -> Self {
        Self {
            stop,
            duration,
            c1,
            num_rides: 0,
            stop_reached_on_board: false,
            opening_hours: None,
        }
    }

    /// A path with transit rides embedded (e.g. flex), optionally arriving on board.
    pub fn with_rides(mut self, num_rides: usize, stop_reached_on_board: bool) -> Self {
        self.num_rides = num_rides;
        self.stop_reached_on_board = stop_reached_on_board;
        self
    }

    /// Restrict when the path can be started.
    pub fn with_opening_hours(mut self, open: i32, close: i32) -> Result<Self, DomainError> {
        if close < open {
            return Err(DomainError::InvalidOpeningHours { open, close });
        }
        self.opening_hours = Some(OpeningHours { open, close });
        Ok(self)
    }

    /// Check the values are usable by the search.
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.duration < 0 || is_sentinel(self.duration) {
            return Err(DomainError::ValueOutOfRange {
                what: "access/egress duration",
                value: self.duration,
            });
        }
        if is_sentinel(self.c1) {
            return Err(DomainError::ValueOutOfRange {
                what: "access/egress cost",
                value: self.c1,
            });
        }
        if let Some(oh) = self.opening_hours {
            if oh.close < oh.open {
                return Err(DomainError::InvalidOpeningHours {
                    open: oh.open,
                    close: oh.close,
                });
            }
        }
        Ok(())
    }

    pub fn has_rides(&self) -> bool {
        self.num_rides > 0
    }

    pub fn has_opening_hours(&self) -> bool {
        self.opening_hours.is_some()
    }

    /// Earliest time at or after `requested` the path can be started.
    ///
    /// Returns `None` if the path is closed for the rest of the day.
    pub fn earliest_departure_time(&self, requested: i32) -> Option<i32> {
        match self.opening_hours {
            None => Some(requested),
            Some(oh) if requested < oh.open => Some(oh.open),
            Some(oh) if requested <= oh.close => Some(requested),
            Some(_) => None,
        }
    }

    /// Latest time at or before `requested` the path can end.
    ///
    /// Returns `None` if the path could only be started before it opens.
    pub fn latest_arrival_time(&self, requested: i32) -> Option<i32> {
        let Some(oh) = self.opening_hours else {
            return Some(requested);
        };
        let departure = requested - self.duration;
        if departure > oh.close {
            Some(oh.close + self.duration)
        } else if departure >= oh.open {
            Some(requested)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn without_opening_hours_time_is_unchanged() {
        let a = AccessEgress::new(3, 300, 600);
        assert_eq!(a.earliest_departure_time(1000), Some(1000));
        assert_eq!(a.latest_arrival_time(1000), Some(1000));
    }

    #[test]
    fn opening_hours_shift_departure_forward() {
        let a = AccessEgress::new(3, 300, 0)
            .with_opening_hours(8 * 3600, 9 * 3600)
            .unwrap();
        assert_eq!(a.earliest_departure_time(7 * 3600), Some(8 * 3600));
        assert_eq!(a.earliest_departure_time(8 * 3600 + 60), Some(8 * 3600 + 60));
        assert_eq!(a.earliest_departure_time(9 * 3600), Some(9 * 3600));
        assert_eq!(a.earliest_departure_time(9 * 3600 + 1), None);
    }

    #[test]
    fn opening_hours_shift_arrival_backward() {
        let a = AccessEgress::new(3, 300, 0)
            .with_opening_hours(8 * 3600, 9 * 3600)
            .unwrap();
        // Departing 09:30 is too late, the latest possible is 09:00 + 5 min.
        assert_eq!(a.latest_arrival_time(9 * 3600 + 1800), Some(9 * 3600 + 300));
        assert_eq!(a.latest_arrival_time(8 * 3600 + 600), Some(8 * 3600 + 600));
        assert_eq!(a.latest_arrival_time(8 * 3600 + 60), None);
    }

    #[test]
    fn invalid_opening_hours_rejected() {
        assert!(AccessEgress::new(0, 0, 0).with_opening_hours(10, 5).is_err());
    }

    #[test]
    fn validate_rejects_negative_duration() {
        let a = AccessEgress::new(0, -1, 0);
        assert!(matches!(
            a.validate(),
            Err(DomainError::ValueOutOfRange { .. })
        ));
        assert!(AccessEgress::new(0, 60, 120).validate().is_ok());
    }

    #[test]
    fn deserializes_with_defaults() {
        let a: AccessEgress = serde_json::from_str(r#"{"stop": 4, "duration": 120}"#).unwrap();
        assert_eq!(a, AccessEgress::new(4, 120, 0));
    }
}

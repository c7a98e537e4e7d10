//! Search requests.

use serde::de::{self, Deserializer};
use serde::Deserialize;

use super::calculator::SearchDirection;
use super::debug::DebugRequest;
use super::error::RaptorError;
use crate::domain::{AccessEgress, ClockTime};

/// Which criteria the search optimises.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchProfile {
    /// Arrival time and number of transfers only.
    Standard,
    /// Pareto set over arrival time, transfers, generalized cost and
    /// optionally c2.
    #[default]
    MultiCriteria,
}

/// Request for a range raptor search.
///
/// `access` paths always start at the origin and `egress` paths always end
/// at the destination, whichever way the search runs.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SearchRequest {
    /// Earliest departure from the origin; required for forward searches.
    #[serde(default, deserialize_with = "deserialize_time")]
    pub earliest_departure_time: Option<i32>,

    /// Latest arrival at the destination; required for reverse searches.
    /// Bounds forward searches when set.
    #[serde(default, deserialize_with = "deserialize_time")]
    pub latest_arrival_time: Option<i32>,

    /// Overrides the configured search window.
    #[serde(default)]
    pub search_window_mins: Option<i64>,

    pub access: Vec<AccessEgress>,

    pub egress: Vec<AccessEgress>,

    #[serde(default)]
    pub profile: SearchProfile,

    #[serde(default)]
    pub direction: SearchDirection,

    /// Add the c2 criterion (transit priority groups unless the caller
    /// supplies a calculator).
    #[serde(default)]
    pub include_c2: bool,

    /// Resolve constrained transfers when boarding.
    #[serde(default)]
    pub constrained_transfers: bool,

    #[serde(default)]
    pub debug: Option<DebugRequest>,
}

impl SearchRequest {
    /// Forward multi-criteria search departing at `earliest_departure_time`.
    pub fn forward(
        earliest_departure_time: i32,
        access: Vec<AccessEgress>,
        egress: Vec<AccessEgress>,
    ) -> Self {
        Self {
            earliest_departure_time: Some(earliest_departure_time),
            latest_arrival_time: None,
            search_window_mins: None,
            access,
            egress,
            profile: SearchProfile::default(),
            direction: SearchDirection::Forward,
            include_c2: false,
            constrained_transfers: false,
            debug: None,
        }
    }

    /// Reverse multi-criteria search arriving by `latest_arrival_time`.
    pub fn reverse(
        latest_arrival_time: i32,
        access: Vec<AccessEgress>,
        egress: Vec<AccessEgress>,
    ) -> Self {
        Self {
            earliest_departure_time: None,
            latest_arrival_time: Some(latest_arrival_time),
            direction: SearchDirection::Reverse,
            ..Self::forward(0, access, egress)
        }
    }

    pub fn with_profile(mut self, profile: SearchProfile) -> Self {
        self.profile = profile;
        self
    }

    pub fn with_search_window(mut self, minutes: i64) -> Self {
        self.search_window_mins = Some(minutes);
        self
    }

    pub fn with_latest_arrival(mut self, time: i32) -> Self {
        self.latest_arrival_time = Some(time);
        self
    }

    pub fn with_c2(mut self) -> Self {
        self.include_c2 = true;
        self
    }

    pub fn with_constrained_transfers(mut self) -> Self {
        self.constrained_transfers = true;
        self
    }

    pub fn with_debug(mut self, debug: DebugRequest) -> Self {
        self.debug = Some(debug);
        self
    }

    /// Validate the search request against a network with
    /// `number_of_stops` stops.
    pub fn validate(&self, number_of_stops: usize) -> Result<(), RaptorError> {
        match self.direction {
            SearchDirection::Forward if self.earliest_departure_time.is_none() => {
                return Err(RaptorError::InvalidRequest(
                    "forward search needs an earliest departure time".to_string(),
                ));
            }
            SearchDirection::Reverse if self.latest_arrival_time.is_none() => {
                return Err(RaptorError::InvalidRequest(
                    "reverse search needs a latest arrival time".to_string(),
                ));
            }
            _ => {}
        }

        if let (Some(edt), Some(lat)) = (self.earliest_departure_time, self.latest_arrival_time) {
            if lat <= edt {
                return Err(RaptorError::InvalidRequest(
                    "latest arrival must be after earliest departure".to_string(),
                ));
            }
        }

        if self.search_window_mins.is_some_and(|w| w < 0) {
            return Err(RaptorError::InvalidRequest(
                "search window must not be negative".to_string(),
            ));
        }

        if self.access.is_empty() || self.egress.is_empty() {
            return Err(RaptorError::InvalidRequest(
                "at least one access and one egress path are required".to_string(),
            ));
        }

        for path in self.access.iter().chain(&self.egress) {
            path.validate()?;
            if path.stop >= number_of_stops {
                return Err(RaptorError::InvalidRequest(format!(
                    "street path to unknown stop {}",
                    path.stop
                )));
            }
        }

        Ok(())
    }

    /// Paths the search starts from, in search order.
    pub fn search_access(&self) -> &[AccessEgress] {
        if self.direction.is_forward() {
            &self.access
        } else {
            &self.egress
        }
    }

    /// Paths the search ends with, in search order.
    pub fn search_egress(&self) -> &[AccessEgress] {
        if self.direction.is_forward() {
            &self.egress
        } else {
            &self.access
        }
    }
}

/// Accept either seconds since midnight or `HH:MM[:SS]`.
fn deserialize_time<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<i32>, D::Error> {
    Option::<ClockTime>::deserialize(deserializer)?
        .map(|value| value.seconds().map_err(de::Error::custom))
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::DomainError;

    fn walk(stop: usize) -> AccessEgress {
        AccessEgress::new(stop, 60, 0)
    }

    #[test]
    fn forward_request_is_valid() {
        let request = SearchRequest::forward(28_800, vec![walk(0)], vec![walk(2)]);
        assert!(request.validate(3).is_ok());
        assert_eq!(request.search_access()[0].stop, 0);
    }

    #[test]
    fn reverse_swaps_search_ends() {
        let request = SearchRequest::reverse(36_000, vec![walk(0)], vec![walk(2)]);
        assert!(request.validate(3).is_ok());
        assert_eq!(request.search_access()[0].stop, 2);
        assert_eq!(request.search_egress()[0].stop, 0);
    }

    #[test]
    fn missing_times_are_rejected() {
        let mut request = SearchRequest::forward(0, vec![walk(0)], vec![walk(1)]);
        request.earliest_departure_time = None;
        assert!(matches!(
            request.validate(2),
            Err(RaptorError::InvalidRequest(_))
        ));

        let mut request = SearchRequest::reverse(0, vec![walk(0)], vec![walk(1)]);
        request.latest_arrival_time = None;
        assert!(request.validate(2).is_err());
    }

    #[test]
    fn empty_or_unknown_paths_are_rejected() {
        let request = SearchRequest::forward(0, vec![], vec![walk(1)]);
        assert!(request.validate(2).is_err());

        let request = SearchRequest::forward(0, vec![walk(0)], vec![walk(5)]);
        assert!(request.validate(2).is_err());

        let bad = AccessEgress::new(0, -5, 0);
        let request = SearchRequest::forward(0, vec![bad], vec![walk(1)]);
        assert!(matches!(
            request.validate(2),
            Err(RaptorError::Domain(DomainError::ValueOutOfRange { .. }))
        ));
    }

    #[test]
    fn latest_arrival_must_follow_departure() {
        let request =
            SearchRequest::forward(36_000, vec![walk(0)], vec![walk(1)]).with_latest_arrival(30_000);
        assert!(request.validate(2).is_err());
    }

    #[test]
    fn deserializes_clock_times() {
        let json = r#"{
            "earliest_departure_time": "08:00",
            "latest_arrival_time": 36000,
            "access": [{"stop": 0, "duration": 60}],
            "egress": [{"stop": 1, "duration": 0, "c1": 0}],
            "profile": "standard"
        }"#;
        let request: SearchRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.earliest_departure_time, Some(28_800));
        assert_eq!(request.latest_arrival_time, Some(36_000));
        assert_eq!(request.profile, SearchProfile::Standard);
        assert_eq!(request.direction, SearchDirection::Forward);
        assert!(request.validate(2).is_ok());
    }

    #[test]
    fn invalid_clock_time_fails_to_parse() {
        let json = r#"{"earliest_departure_time": "8am", "access": [], "egress": []}"#;
        assert!(serde_json::from_str::<SearchRequest>(json).is_err());
    }
}

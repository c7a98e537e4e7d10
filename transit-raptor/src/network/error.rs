//! Network loading error types.

use crate::domain::{DomainError, TimeError};

/// Errors that can occur when building or loading a transit network.
#[derive(Debug, thiserror::Error)]
pub enum NetworkError {
    /// Failed to read the network file
    #[error("failed to read network: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to parse network JSON
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// A time string could not be parsed
    #[error("route {route}: {source}")]
    Time {
        route: String,
        #[source]
        source: TimeError,
    },

    /// A pattern, schedule or path violated a model invariant
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// A stop index is not part of the network
    #[error("unknown stop {stop} (network has {number_of_stops} stops)")]
    UnknownStop { stop: usize, number_of_stops: usize },

    /// A route index is not part of the network
    #[error("unknown route {0}")]
    UnknownRoute(usize),

    /// A trip label is not part of its route's timetable
    #[error("route {route} has no trip {trip}")]
    UnknownTrip { route: usize, trip: String },

    /// A pattern index does not match its position in the network
    #[error("pattern {label} has index {actual}, expected {expected}")]
    PatternIndex {
        label: String,
        expected: usize,
        actual: usize,
    },

    /// A constrained transfer refers to a position the pattern doesn't have
    #[error("route {route} has no stop position {pos}")]
    UnknownStopPosition { route: usize, pos: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = NetworkError::UnknownStop {
            stop: 9,
            number_of_stops: 3,
        };
        assert_eq!(err.to_string(), "unknown stop 9 (network has 3 stops)");

        let err = NetworkError::UnknownTrip {
            route: 1,
            trip: "t7".into(),
        };
        assert_eq!(err.to_string(), "route 1 has no trip t7");

        let err = NetworkError::Domain(DomainError::PatternTooShort("P".into()));
        assert_eq!(err.to_string(), "pattern P must have at least two stops");
    }
}

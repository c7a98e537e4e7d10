//! Domain error types.
//!
//! These errors represent data inconsistencies in the transit model and
//! programming errors such as reading the transit payload of a transfer
//! arrival. They are distinct from request/configuration errors.

/// Domain-level errors for validation and data consistency.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DomainError {
    /// An accessor was called on the wrong kind of stop arrival
    #[error("arrival discriminant mismatch: expected {expected}, found {found}")]
    ArrivalKindMismatch {
        expected: &'static str,
        found: &'static str,
    },

    /// Stop position is out of bounds for the pattern
    #[error("stop position {pos} out of bounds for pattern with {len} stops")]
    StopPositionOutOfBounds { pos: usize, len: usize },

    /// Per-position data does not match the number of stops in the pattern
    #[error("pattern {pattern}: {what} has {actual} entries, expected {expected}")]
    LengthMismatch {
        pattern: String,
        what: &'static str,
        expected: usize,
        actual: usize,
    },

    /// A pattern must visit at least two stops
    #[error("pattern {0} must have at least two stops")]
    PatternTooShort(String),

    /// A time or cost lies in the reserved sentinel range
    #[error("{what} value {value} is outside the supported range")]
    ValueOutOfRange { what: &'static str, value: i32 },

    /// Two trips in the same pattern overtake each other
    #[error("pattern {pattern}: trip {second} overtakes {first} at stop position {pos}")]
    OvertakingTrips {
        pattern: String,
        first: String,
        second: String,
        pos: usize,
    },

    /// Opening hours close before they open
    #[error("opening hours close ({close}) before they open ({open})")]
    InvalidOpeningHours { open: i32, close: i32 },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = DomainError::ArrivalKindMismatch {
            expected: "TRANSFER",
            found: "TRANSIT",
        };
        assert_eq!(
            err.to_string(),
            "arrival discriminant mismatch: expected TRANSFER, found TRANSIT"
        );

        let err = DomainError::StopPositionOutOfBounds { pos: 7, len: 3 };
        assert_eq!(
            err.to_string(),
            "stop position 7 out of bounds for pattern with 3 stops"
        );

        let err = DomainError::LengthMismatch {
            pattern: "P1".into(),
            what: "arrival times",
            expected: 3,
            actual: 2,
        };
        assert_eq!(
            err.to_string(),
            "pattern P1: arrival times has 2 entries, expected 3"
        );

        let err = DomainError::PatternTooShort("P9".into());
        assert_eq!(err.to_string(), "pattern P9 must have at least two stops");

        let err = DomainError::InvalidOpeningHours {
            open: 100,
            close: 50,
        };
        assert_eq!(
            err.to_string(),
            "opening hours close (50) before they open (100)"
        );
    }
}

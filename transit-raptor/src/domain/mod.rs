//! Domain types for the transit search core.
//!
//! This module holds the immutable transit model consumed by the search:
//! patterns, trip schedules, transfers, access/egress paths and constrained
//! transfers, plus the reserved integer sentinels shared by every part of the
//! search. Types validate their invariants at construction time, so the hot
//! search loop can index into them without re-checking.

mod access_egress;
mod constants;
mod constrained;
mod error;
mod pattern;
mod route;
mod time;
mod transfer;

pub use access_egress::{AccessEgress, OpeningHours};
pub use constants::{
    MAX_REAL_VALUE, NOT_FOUND, NOT_SET, UNREACHED_HIGH, UNREACHED_LOW, add_guarded, is_sentinel,
    sub_guarded,
};
pub use constrained::{ConstrainedTransfer, ConstrainedTransferIndex, TransferDisposition};
pub use error::DomainError;
pub use pattern::TripPattern;
pub use route::{Route, Timetable, TripRef, TripSchedule};
pub use time::{ClockTime, TimeError, format_duration, format_time, parse_time};
pub use transfer::Transfer;

//! Stop-to-stop transfers.

use serde::Deserialize;

/// A non-transit edge between two stops, typically a walk.
///
/// The street router produces these; the search only needs the duration and
/// the generalized cost (`c1`, in the same units as the search's c1).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct Transfer {
    pub from_stop: usize,
    pub to_stop: usize,
    /// Duration in seconds.
    pub duration: i32,
    #[serde(default)]
    pub c1: i32,
}

impl Transfer {
    pub fn new(from_stop: usize, to_stop: usize, duration: i32, c1: i32) -> Self {
        Self {
            from_stop,
            to_stop,
            duration,
            c1,
        }
    }
}

//! The read-only transit view a search runs against.

use crate::domain::{ConstrainedTransferIndex, Route, Transfer};

/// Trait for providing the transit network to the search.
///
/// Implementations must not change while a search runs; several searches may
/// share one provider across threads.
pub trait TransitDataProvider {
    /// Number of stops; stop indices are `0..number_of_stops()`.
    fn number_of_stops(&self) -> usize;

    /// Routes visiting at least one of the given stops, each listed once.
    fn route_indexes_for_stops(&self, stops: &[usize]) -> Vec<usize>;

    /// Number of routes; route indices are `0..number_of_routes()`.
    fn number_of_routes(&self) -> usize;

    /// Route by index.
    fn route(&self, index: usize) -> &Route;

    /// Transfers starting at `stop`.
    fn transfers_from_stop(&self, stop: usize) -> &[Transfer];

    /// Transfers ending at `stop`, used by reverse searches.
    fn transfers_to_stop(&self, stop: usize) -> &[Transfer];

    /// Constrained transfers, if the network has any.
    fn constrained_transfers(&self) -> Option<&ConstrainedTransferIndex> {
        None
    }

    /// Human-readable stop name for logs and debug output.
    fn stop_name(&self, stop: usize) -> String {
        format!("S{stop}")
    }
}

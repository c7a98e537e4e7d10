//! The seams between the worker, the per-profile state and the routing
//! strategy.
//!
//! The worker owns the round loop and pattern scan. Everything that depends
//! on the criteria in use lives behind [`WorkerState`] and
//! [`RoutingStrategy`], with one implementation each for the standard and
//! multi-criteria profiles.

use super::arrival::ArrivalArena;
use super::constrained_search::ConstrainedBoardingSearch;
use super::destination::DestinationArrivals;
use crate::domain::{AccessEgress, Route, Transfer};

/// Per-search arrival state.
pub trait WorkerState {
    /// Start a new iteration departing at `iteration_departure_time`.
    fn setup_iteration(&mut self, iteration_departure_time: i32);

    /// Make the current round's arrivals the previous round's.
    fn prepare_for_next_round(&mut self, round: usize);

    /// Add an access arrival. `departure_time` is when the access path
    /// starts, after any opening-hours adjustment.
    fn set_access_to_stop(&mut self, access: &AccessEgress, departure_time: i32);

    /// True if the current round reached any stop.
    fn is_new_round_available(&self) -> bool;

    fn stops_touched_previous_round(&self) -> Vec<usize>;

    fn stops_touched_by_transit_current_round(&self) -> Vec<usize>;

    /// Follow `transfers` from the transit arrivals at `from_stop`.
    fn transfer_to_stops(&mut self, from_stop: usize, transfers: &[Transfer]);

    fn is_destination_reached_in_current_round(&self) -> bool;

    fn destination_arrivals(&self) -> &DestinationArrivals;

    fn arena(&self) -> &ArrivalArena;

    /// Number of malformed-data anomalies seen so far.
    fn anomalies(&self) -> usize;
}

/// Boarding and alighting while scanning one pattern.
pub trait RoutingStrategy<'a> {
    type State: WorkerState;

    fn state(&self) -> &Self::State;

    fn state_mut(&mut self) -> &mut Self::State;

    /// Reset before scanning `route`.
    fn prepare_for_transit_with(&mut self, route_index: usize, route: &'a Route);

    /// Leave the boarded trip(s) at this stop position.
    fn alight_only_regular_transfer_exist(
        &mut self,
        stop_index: usize,
        stop_pos: usize,
        alight_slack: i32,
    );

    /// Alight where constrained transfers may start. Constraints are
    /// resolved on boarding, so this is the same as a regular alighting.
    fn alight_constrained_transfer_exist(
        &mut self,
        stop_index: usize,
        stop_pos: usize,
        alight_slack: i32,
    ) {
        self.alight_only_regular_transfer_exist(stop_index, stop_pos, alight_slack);
    }

    /// Board at this stop position from arrivals of the previous round.
    fn board_with_regular_transfer(&mut self, stop_index: usize, stop_pos: usize, board_slack: i32);

    /// Board where a constrained transfer may lead to this pattern; falls
    /// back to a regular boarding for arrivals without a matching
    /// constraint.
    fn board_with_constrained_transfer(
        &mut self,
        stop_index: usize,
        stop_pos: usize,
        board_slack: i32,
        search: &ConstrainedBoardingSearch<'_>,
    );
}

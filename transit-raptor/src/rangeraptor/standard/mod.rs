//! The standard profile: earliest arrival only, no generalized cost.
//!
//! Used for plain arrival-time searches and for the heuristic pass of
//! multi-criteria searches.

mod state;
mod strategy;

pub use state::StdWorkerState;
pub use strategy::ArrivalTimeRoutingStrategy;

//! The multi-criteria profile: Pareto-optimal journeys over arrival time,
//! number of transfers, generalized cost (c1) and optionally a second cost
//! (c2).

mod c2;
mod ride;
mod state;
mod strategy;

pub use c2::{C2Calculator, TransitGroupPriority};
pub use ride::{PatternRide, PatternRideComparator};
pub use state::{McStateOptions, McWorkerState};
pub use strategy::MultiCriteriaRoutingStrategy;

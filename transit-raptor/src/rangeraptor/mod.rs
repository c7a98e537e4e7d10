//! Range-Raptor transit search.
//!
//! A round-based search over a time window: for each departure minute,
//! latest first, round `k` finds every stop reachable with `k` trips, and
//! state kept between minutes makes the whole window cost little more than
//! one minute. Two profiles share the worker: a standard (arrival time
//! only) profile, and a multi-criteria profile keeping a Pareto set of
//! arrivals per stop. A cheap standard pass in the opposite direction
//! supplies the heuristics that prune the multi-criteria search.

mod access_paths;
mod arrival;
mod calculator;
mod cancel;
mod config;
mod constrained_search;
mod cost;
mod debug;
mod destination;
mod error;
mod heuristics;
mod multicriteria;
mod pareto;
mod path;
mod request;
mod round;
mod router;
mod slack;
mod standard;
mod stop_set;
mod strategy;
mod transit_data;
mod trip_search;
mod worker;


pub use access_paths::{AccessPaths, EgressPaths, egress_allowed};
pub use arrival::{ArrivalArena, ArrivalId, ArrivalKind, StopArrival, TransitLeg};
pub use calculator::{SearchDirection, TransitCalculator};
pub use cancel::CancellationToken;
pub use config::{CostConfig, SearchConfig, SlackConfig};
pub use constrained_search::{ConstrainedBoarding, ConstrainedBoardingSearch};
pub use cost::{COST_UNIT, CostCalculator, add_cost, cost_of, to_raptor_cost};
pub use debug::{
    ArrivalSnapshot, DebugAction, DebugEvent, DebugEventCollector, DebugEventListener,
    DebugRequest, StopArrivalDebugHandler, TracingDebugLogger,
};
pub use destination::{DestinationArrival, DestinationArrivals};
pub use error::RaptorError;
pub use heuristics::{Heuristics, HeuristicsCollector, min_rides_to_stops, street_cost_factor};
pub use multicriteria::{
    C2Calculator, McStateOptions, McWorkerState, MultiCriteriaRoutingStrategy, TransitGroupPriority,
};
pub use pareto::{ParetoComparator, ParetoSet, ParetoSetEventListener};
pub use path::{Path, PathLeg, deduplicate, rank_paths};
pub use request::{SearchProfile, SearchRequest};
pub use round::RoundTracker;
pub use router::{RangeRaptorService, RaptorResponse, SearchContext};
pub use slack::{SlackProvider, ZeroSlack};
pub use standard::{ArrivalTimeRoutingStrategy, StdWorkerState};
pub use strategy::{RoutingStrategy, WorkerState};
pub use transit_data::TransitDataProvider;
pub use trip_search::{TripScheduleSearch, TripSearchResult};
pub use worker::{RangeRaptorWorker, SearchStatus, WorkerStats};

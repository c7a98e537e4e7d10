//! The search facade: validate, pick a worker, run it, build paths.

use std::sync::Arc;

use chrono::Duration;
use serde::Serialize;
use tracing::{debug, info};

use super::access_paths::EgressPaths;
use super::arrival::ArrivalArena;
use super::calculator::{SearchDirection, TransitCalculator};
use super::cancel::CancellationToken;
use super::config::SearchConfig;
use super::cost::CostCalculator;
use super::debug::{DebugEventListener, StopArrivalDebugHandler, TracingDebugLogger};
use super::destination::DestinationArrivals;
use super::error::RaptorError;
use super::heuristics::{
    Heuristics, HeuristicsCollector, min_rides_to_stops, street_cost_factor,
};
use super::multicriteria::{
    C2Calculator, McStateOptions, McWorkerState, MultiCriteriaRoutingStrategy,
    TransitGroupPriority,
};
use super::path::{Path, deduplicate, rank_paths};
use super::request::{SearchProfile, SearchRequest};
use super::round::RoundTracker;
use super::slack::ZeroSlack;
use super::standard::{ArrivalTimeRoutingStrategy, StdWorkerState};
use super::strategy::WorkerState;
use super::transit_data::TransitDataProvider;
use super::worker::{RangeRaptorWorker, SearchStatus, WorkerStats};
use crate::domain::{MAX_REAL_VALUE, add_guarded, format_duration, sub_guarded};

/// Result of a search.
#[derive(Debug, Clone, Serialize)]
pub struct RaptorResponse {
    /// Pareto-optimal paths, ranked best-first.
    pub paths: Vec<Path>,
    pub status: SearchStatus,
    pub stats: WorkerStats,
    /// Heuristics the search pruned with, if any.
    #[serde(skip)]
    pub heuristics: Option<Arc<Heuristics>>,
}

impl RaptorResponse {
    fn empty(heuristics: Option<Arc<Heuristics>>) -> Self {
        Self {
            paths: Vec::new(),
            status: SearchStatus::Completed,
            stats: WorkerStats::default(),
            heuristics,
        }
    }
}

/// Per-call collaborators that are not part of the request itself.
#[derive(Default)]
pub struct SearchContext {
    pub cancel: CancellationToken,
    /// Used when the request includes c2; defaults to transit priority
    /// groups.
    pub c2_calculator: Option<Arc<dyn C2Calculator>>,
    /// Receives debug events; defaults to the tracing logger.
    pub debug_listener: Option<Box<dyn DebugEventListener>>,
    /// Precomputed heuristics for this request and direction.
    pub heuristics: Option<Arc<Heuristics>>,
}

/// The time span a request covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct SearchBounds {
    earliest_departure: i32,
    latest_arrival: i32,
    window: i32,
}

impl SearchBounds {
    fn of(request: &SearchRequest, config: &SearchConfig) -> Self {
        let window = request
            .search_window_mins
            .map_or(config.search_window(), Duration::minutes);
        let window = seconds(window);
        let span = add_guarded(window, seconds(config.max_journey()));
        let (earliest_departure, latest_arrival) =
            match (request.earliest_departure_time, request.latest_arrival_time) {
                (Some(edt), Some(lat)) => (edt, lat),
                (Some(edt), None) => (edt, add_guarded(edt, span)),
                (None, Some(lat)) => (sub_guarded(lat, span), lat),
                (None, None) => (0, span),
            };
        Self {
            earliest_departure,
            latest_arrival,
            window,
        }
    }

    fn calculator(&self, direction: SearchDirection, step: i32) -> TransitCalculator {
        match direction {
            SearchDirection::Forward => {
                TransitCalculator::new(direction, self.earliest_departure, self.window, step)
            }
            SearchDirection::Reverse => {
                TransitCalculator::new(direction, self.latest_arrival, self.window, step)
            }
        }
    }

    /// Calculator iterating over the whole span, for heuristic passes.
    fn full_span_calculator(&self, direction: SearchDirection, step: i32) -> TransitCalculator {
        let span = self.latest_arrival - self.earliest_departure;
        let time = match direction {
            SearchDirection::Forward => self.earliest_departure,
            SearchDirection::Reverse => self.latest_arrival,
        };
        TransitCalculator::new(direction, time, span, step)
    }

    fn time_limit(&self, direction: SearchDirection) -> i32 {
        match direction {
            SearchDirection::Forward => self.latest_arrival,
            SearchDirection::Reverse => self.earliest_departure,
        }
    }
}

fn seconds(duration: Duration) -> i32 {
    duration
        .num_seconds()
        .clamp(0, i64::from(MAX_REAL_VALUE)) as i32
}

/// Range raptor search over one transit view and configuration.
pub struct RangeRaptorService<'a, D: TransitDataProvider + ?Sized> {
    data: &'a D,
    config: &'a SearchConfig,
}

impl<'a, D: TransitDataProvider + ?Sized> RangeRaptorService<'a, D> {
    /// Create a new service.
    pub fn new(data: &'a D, config: &'a SearchConfig) -> Self {
        Self { data, config }
    }

    /// Search with default collaborators.
    pub fn route(&self, request: &SearchRequest) -> Result<RaptorResponse, RaptorError> {
        self.route_with(request, SearchContext::default())
    }

    /// Search for the Pareto-optimal paths of `request`.
    ///
    /// Finding nothing is a valid, empty result. A cancelled search returns
    /// the paths found so far with a `Cancelled` status.
    pub fn route_with(
        &self,
        request: &SearchRequest,
        context: SearchContext,
    ) -> Result<RaptorResponse, RaptorError> {
        self.validate(request)?;

        let cancel = match self.config.timeout() {
            Some(timeout) => context.cancel.deadline_after(timeout),
            None => context.cancel,
        };
        let debug = request
            .debug
            .as_ref()
            .filter(|d| !d.is_empty())
            .map(|d| {
                let listener = context
                    .debug_listener
                    .unwrap_or_else(|| Box::new(TracingDebugLogger));
                StopArrivalDebugHandler::new(d.clone(), listener)
            });

        info!(
            profile = ?request.profile,
            direction = ?request.direction,
            access = request.access.len(),
            egress = request.egress.len(),
            "range raptor search"
        );

        match request.profile {
            SearchProfile::Standard => self.route_standard(request, cancel, debug),
            SearchProfile::MultiCriteria => {
                let heuristics = match (self.config.use_heuristics, context.heuristics) {
                    (false, _) => None,
                    (true, Some(heuristics)) => Some(heuristics),
                    (true, None) => Some(Arc::new(
                        self.heuristics_for(request, request.direction.opposite()),
                    )),
                };
                if let Some(heuristics) = &heuristics {
                    let reachable = request
                        .search_access()
                        .iter()
                        .any(|a| heuristics.is_reached(a.stop));
                    if !reachable {
                        debug!("no access stop can reach the destination");
                        return Ok(RaptorResponse::empty(Some(heuristics.clone())));
                    }
                }
                let c2 = if request.include_c2 {
                    Some(
                        context
                            .c2_calculator
                            .unwrap_or_else(|| Arc::new(TransitGroupPriority)),
                    )
                } else {
                    None
                };
                self.route_multi_criteria(request, cancel, debug, heuristics, c2)
            }
        }
    }

    /// Compute heuristics by running an arrival-time search in `direction`
    /// over the whole span of `request`. The result prunes searches running
    /// the opposite way.
    pub fn compute_heuristics(
        &self,
        request: &SearchRequest,
        direction: SearchDirection,
    ) -> Result<Heuristics, RaptorError> {
        self.validate(request)?;
        Ok(self.heuristics_for(request, direction))
    }

    fn validate(&self, request: &SearchRequest) -> Result<(), RaptorError> {
        self.config.validate()?;
        request.validate(self.data.number_of_stops())?;
        if request.constrained_transfers && !request.direction.is_forward() {
            return Err(RaptorError::UnsupportedCriteria(
                "constrained transfers are only supported in forward searches".to_string(),
            ));
        }
        Ok(())
    }

    fn heuristics_for(&self, request: &SearchRequest, direction: SearchDirection) -> Heuristics {
        let data = self.data;
        let config = self.config;
        let n = data.number_of_stops();
        let bounds = SearchBounds::of(request, config);
        let calc = bounds.full_span_calculator(direction, config.iteration_step_secs);
        let (access, egress) = if direction.is_forward() {
            (&request.access, &request.egress)
        } else {
            (&request.egress, &request.access)
        };

        let state = StdWorkerState::new(
            n,
            config.max_rounds(),
            calc,
            EgressPaths::new(egress),
            Some(bounds.time_limit(direction)),
        )
        .with_heuristics_collector(n);
        // No slack, constraints or cancellation: the bounds must stay
        // admissible.
        let mut worker = RangeRaptorWorker::new(
            data,
            ArrivalTimeRoutingStrategy::new(state),
            calc,
            &ZeroSlack,
            access,
            RoundTracker::new(config.max_rounds(), None),
        );
        worker.route();
        let state = worker.into_strategy().into_state();

        let rides = min_rides_to_stops(data, &calc, access);
        let min_factor =
            CostCalculator::new(&config.cost).min_cost_factor(street_cost_factor(data, access));
        let empty = HeuristicsCollector::new(n);
        let heuristics = Heuristics::new(
            state.collector().unwrap_or(&empty),
            rides,
            config.iteration_step_secs,
            min_factor,
            egress,
        );
        debug!(
            direction = ?direction,
            best_duration = %format_duration(heuristics.best_overall_duration().max(0)),
            best_rides = heuristics.best_overall_rides(),
            "heuristics computed"
        );
        heuristics
    }

    fn route_standard(
        &self,
        request: &SearchRequest,
        cancel: CancellationToken,
        debug: Option<StopArrivalDebugHandler>,
    ) -> Result<RaptorResponse, RaptorError> {
        let data = self.data;
        let config = self.config;
        let direction = request.direction;
        let bounds = SearchBounds::of(request, config);
        let calc = bounds.calculator(direction, config.iteration_step_secs);

        let state = StdWorkerState::new(
            data.number_of_stops(),
            config.max_rounds(),
            calc,
            EgressPaths::new(request.search_egress()),
            Some(bounds.time_limit(direction)),
        )
        .with_debug(debug);
        let mut worker = RangeRaptorWorker::new(
            data,
            ArrivalTimeRoutingStrategy::new(state),
            calc,
            &config.slack,
            request.search_access(),
            RoundTracker::new(config.max_rounds(), config.additional_transfers),
        )
        .with_constrained_transfers(request.constrained_transfers)
        .with_cancellation(cancel);
        let status = worker.route();
        let stats = worker.stats();
        let state = worker.into_strategy().into_state();

        Ok(RaptorResponse {
            paths: collect_paths(state.arena(), state.destination_arrivals(), &calc)?,
            status,
            stats,
            heuristics: None,
        })
    }

    fn route_multi_criteria(
        &self,
        request: &SearchRequest,
        cancel: CancellationToken,
        debug: Option<StopArrivalDebugHandler>,
        heuristics: Option<Arc<Heuristics>>,
        c2: Option<Arc<dyn C2Calculator>>,
    ) -> Result<RaptorResponse, RaptorError> {
        let data = self.data;
        let config = self.config;
        let direction = request.direction;
        let bounds = SearchBounds::of(request, config);
        let calc = bounds.calculator(direction, config.iteration_step_secs);

        let options = McStateOptions {
            include_c2: c2.is_some(),
            c2_calculator: c2,
            heuristics: heuristics.clone(),
            time_limit: Some(bounds.time_limit(direction)),
        };
        let state = McWorkerState::new(
            data.number_of_stops(),
            calc,
            CostCalculator::new(&config.cost),
            EgressPaths::new(request.search_egress()),
            options,
        )?
        .with_debug(debug);
        let mut worker = RangeRaptorWorker::new(
            data,
            MultiCriteriaRoutingStrategy::new(state),
            calc,
            &config.slack,
            request.search_access(),
            RoundTracker::new(config.max_rounds(), config.additional_transfers),
        )
        .with_constrained_transfers(request.constrained_transfers)
        .with_cancellation(cancel);
        let status = worker.route();
        let stats = worker.stats();
        let state = worker.into_strategy().into_state();

        Ok(RaptorResponse {
            paths: collect_paths(state.arena(), state.destination_arrivals(), &calc)?,
            status,
            stats,
            heuristics,
        })
    }
}

fn collect_paths(
    arena: &ArrivalArena,
    destination: &DestinationArrivals,
    calc: &TransitCalculator,
) -> Result<Vec<Path>, RaptorError> {
    let paths = destination
        .arrivals()
        .iter()
        .map(|arrival| Path::from_destination(arena, arrival, calc))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(deduplicate(rank_paths(paths)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounds_fill_latest_arrival_from_config() {
        let config = SearchConfig::new(3, 30, 60, 120);
        let request = SearchRequest::forward(28_800, vec![], vec![]);
        let bounds = SearchBounds::of(&request, &config);
        assert_eq!(bounds.window, 1_800);
        assert_eq!(bounds.latest_arrival, 28_800 + 1_800 + 7_200);
        assert_eq!(bounds.time_limit(SearchDirection::Forward), bounds.latest_arrival);
    }

    #[test]
    fn bounds_fill_earliest_departure_for_reverse() {
        let config = SearchConfig::new(3, 30, 60, 120);
        let request = SearchRequest::reverse(36_000, vec![], vec![]).with_search_window(10);
        let bounds = SearchBounds::of(&request, &config);
        assert_eq!(bounds.window, 600);
        assert_eq!(bounds.earliest_departure, 36_000 - 600 - 7_200);
        let calc = bounds.full_span_calculator(SearchDirection::Forward, 60);
        assert_eq!(calc.iteration_departure_times().len(), 7_800 / 60 + 1);
    }
}

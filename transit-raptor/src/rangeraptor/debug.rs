//! Debug events for stop arrivals, and rate-limited anomaly logging.
//!
//! A [`DebugRequest`] names stops or a stop path to watch. Arrivals at those
//! stops are reported to a [`DebugEventListener`] when they are accepted,
//! rejected or dropped. With no request the states never build events, so
//! the cost in normal searches is one `Option` check.

use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::arrival::{ArrivalArena, StopArrival};
use crate::domain::format_time;

/// Which arrivals to report.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DebugRequest {
    /// Report every arrival at these stops.
    pub stops: Vec<usize>,
    /// Report arrivals whose stop path, from the origin, is a prefix of
    /// this path.
    pub path: Vec<usize>,
    /// Only report path arrivals that have visited more than this many
    /// stops of `path`.
    pub path_start_index: usize,
}

impl DebugRequest {
    pub fn is_empty(&self) -> bool {
        self.stops.is_empty() && self.path.is_empty()
    }

    fn may_match(&self, stop: usize) -> bool {
        self.stops.contains(&stop) || self.path.contains(&stop)
    }

    fn matches(&self, stop: usize, path: &[usize]) -> bool {
        self.stops.contains(&stop)
            || (path.len() > self.path_start_index && self.path.starts_with(path))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DebugAction {
    Accept,
    Reject,
    Drop,
}

/// Criteria and path of an arrival at the time of the event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArrivalSnapshot {
    pub stop: usize,
    pub round: usize,
    pub time: i32,
    pub c1: i32,
    pub c2: i32,
    pub kind: &'static str,
    /// Stops from the origin to this arrival, in search order.
    pub path: Vec<usize>,
}

impl ArrivalSnapshot {
    pub fn of(arena: &ArrivalArena, arrival: &StopArrival) -> Self {
        let mut path = arrival
            .previous()
            .map(|p| arena.stops_on_path(p))
            .unwrap_or_default();
        path.push(arrival.stop());
        Self {
            stop: arrival.stop(),
            round: arrival.round(),
            time: arrival.arrival_time(),
            c1: arrival.c1(),
            c2: arrival.c2(),
            kind: arrival.kind().name(),
            path,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DebugEvent {
    pub action: DebugAction,
    pub iteration_departure_time: i32,
    pub element: ArrivalSnapshot,
    /// The arrival that caused a rejection or drop, if any.
    pub other: Option<ArrivalSnapshot>,
    pub reason: String,
}

/// Receives debug events.
pub trait DebugEventListener: Send {
    fn on_event(&mut self, event: &DebugEvent);
}

/// Writes each event as a `debug!` record.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingDebugLogger;

impl DebugEventListener for TracingDebugLogger {
    fn on_event(&mut self, event: &DebugEvent) {
        debug!(
            action = ?event.action,
            iteration = %format_time(event.iteration_departure_time),
            stop = event.element.stop,
            round = event.element.round,
            time = %format_time(event.element.time),
            c1 = event.element.c1,
            kind = event.element.kind,
            path = ?event.element.path,
            by = ?event.other.as_ref().map(|o| (o.stop, o.round, o.time, o.c1)),
            reason = %event.reason,
            "stop arrival"
        );
    }
}

/// Keeps every event in memory; clones share the same buffer.
#[derive(Debug, Clone, Default)]
pub struct DebugEventCollector {
    events: Arc<Mutex<Vec<DebugEvent>>>,
}

impl DebugEventCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<DebugEvent> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }
}

impl DebugEventListener for DebugEventCollector {
    fn on_event(&mut self, event: &DebugEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event.clone());
        }
    }
}

/// Filters arrivals against a [`DebugRequest`] and forwards events.
pub struct StopArrivalDebugHandler {
    request: DebugRequest,
    listener: Box<dyn DebugEventListener>,
    iteration_departure_time: i32,
}

impl StopArrivalDebugHandler {
    pub fn new(request: DebugRequest, listener: Box<dyn DebugEventListener>) -> Self {
        Self {
            request,
            listener,
            iteration_departure_time: 0,
        }
    }

    pub fn set_iteration(&mut self, departure_time: i32) {
        self.iteration_departure_time = departure_time;
    }

    /// Cheap pre-check before building snapshots.
    pub fn is_debug(&self, stop: usize) -> bool {
        self.request.may_match(stop)
    }

    pub fn accepted(&mut self, arena: &ArrivalArena, arrival: &StopArrival) {
        self.event(DebugAction::Accept, arena, arrival, None, "");
    }

    pub fn rejected(
        &mut self,
        arena: &ArrivalArena,
        arrival: &StopArrival,
        rejected_by: Option<&StopArrival>,
        reason: &str,
    ) {
        self.event(DebugAction::Reject, arena, arrival, rejected_by, reason);
    }

    pub fn dropped(
        &mut self,
        arena: &ArrivalArena,
        arrival: &StopArrival,
        dropped_by: Option<&StopArrival>,
        reason: &str,
    ) {
        self.event(DebugAction::Drop, arena, arrival, dropped_by, reason);
    }

    fn event(
        &mut self,
        action: DebugAction,
        arena: &ArrivalArena,
        arrival: &StopArrival,
        other: Option<&StopArrival>,
        reason: &str,
    ) {
        if !self.is_debug(arrival.stop()) {
            return;
        }
        let element = ArrivalSnapshot::of(arena, arrival);
        if !self.request.matches(element.stop, &element.path) {
            return;
        }
        let event = DebugEvent {
            action,
            iteration_departure_time: self.iteration_departure_time,
            element,
            other: other.map(|o| ArrivalSnapshot::of(arena, o)),
            reason: reason.to_string(),
        };
        self.listener.on_event(&event);
    }
}

impl std::fmt::Debug for StopArrivalDebugHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StopArrivalDebugHandler")
            .field("request", &self.request)
            .finish_non_exhaustive()
    }
}

/// Counts anomalies and allows only the first few to be logged.
#[derive(Debug, Clone)]
pub struct RateLimitedLog {
    limit: usize,
    seen: usize,
}

impl RateLimitedLog {
    pub fn new(limit: usize) -> Self {
        Self { limit, seen: 0 }
    }

    /// Record an anomaly; true if it should be logged.
    pub fn allow(&mut self) -> bool {
        self.seen += 1;
        self.seen <= self.limit
    }

    /// Total anomalies seen, logged or not.
    pub fn seen(&self) -> usize {
        self.seen
    }
}

impl Default for RateLimitedLog {
    fn default() -> Self {
        Self::new(3)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{AccessEgress, Transfer};
    use crate::rangeraptor::arrival::ArrivalKind;

    fn arena_with_path() -> (ArrivalArena, StopArrival) {
        let mut arena = ArrivalArena::new();
        let access = arena.push(StopArrival::access(AccessEgress::new(1, 60, 0), 60, 0, 0));
        let transfer = StopArrival::following(
            access,
            2,
            0,
            120,
            0,
            0,
            ArrivalKind::Transfer(Transfer::new(1, 2, 60, 0)),
        );
        (arena, transfer)
    }

    #[test]
    fn reports_watched_stops() {
        let (arena, arrival) = arena_with_path();
        let collector = DebugEventCollector::new();
        let request = DebugRequest {
            stops: vec![2],
            ..DebugRequest::default()
        };
        let mut handler = StopArrivalDebugHandler::new(request, Box::new(collector.clone()));
        handler.set_iteration(30);
        handler.accepted(&arena, &arrival);
        handler.rejected(&arena, &arrival, None, "heuristic");

        let events = collector.events();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].action, DebugAction::Accept);
        assert_eq!(events[0].element.path, vec![1, 2]);
        assert_eq!(events[0].iteration_departure_time, 30);
        assert_eq!(events[1].reason, "heuristic");
    }

    #[test]
    fn path_filter_requires_prefix_and_start_index() {
        let (arena, arrival) = arena_with_path();
        let collector = DebugEventCollector::new();
        let request = DebugRequest {
            path: vec![1, 2, 5],
            path_start_index: 1,
            ..DebugRequest::default()
        };
        let mut handler = StopArrivalDebugHandler::new(request, Box::new(collector.clone()));
        handler.accepted(&arena, &arrival);
        handler.accepted(&arena, arena.get(arrival.previous().unwrap()));

        let events = collector.events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].element.stop, 2);
    }

    #[test]
    fn unrelated_stops_are_ignored() {
        let (arena, arrival) = arena_with_path();
        let collector = DebugEventCollector::new();
        let request = DebugRequest {
            stops: vec![9],
            ..DebugRequest::default()
        };
        let mut handler = StopArrivalDebugHandler::new(request, Box::new(collector.clone()));
        assert!(!handler.is_debug(2));
        handler.dropped(&arena, &arrival, None, "");
        assert!(collector.events().is_empty());
    }

    #[test]
    fn rate_limited_log_allows_first_three() {
        let mut log = RateLimitedLog::default();
        let allowed: Vec<bool> = (0..5).map(|_| log.allow()).collect();
        assert_eq!(allowed, vec![true, true, true, false, false]);
        assert_eq!(log.seen(), 5);
    }
}

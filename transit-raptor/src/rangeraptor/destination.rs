//! Arrivals at the destination, kept as a Pareto set.

use std::sync::Arc;

use super::arrival::ArrivalId;
use super::calculator::TransitCalculator;
use super::multicriteria::C2Calculator;
use super::pareto::{ParetoComparator, ParetoSet};

/// A journey end found by the search.
///
/// `departure_time` is the iteration start time; `arrival_time` is when the
/// egress ends. In a reverse search both are in search terms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DestinationArrival {
    /// The egress arrival in the arena.
    pub arrival: ArrivalId,
    pub departure_time: i32,
    pub arrival_time: i32,
    pub rounds: usize,
    pub c1: i32,
    pub c2: i32,
}

/// Dominance for destination arrivals: later iteration start, earlier
/// arrival, fewer rounds, and optionally lower c1 and better c2.
#[derive(Debug, Clone)]
pub struct DestinationComparator {
    calc: TransitCalculator,
    include_c1: bool,
    c2: Option<Arc<dyn C2Calculator>>,
}

impl ParetoComparator<DestinationArrival> for DestinationComparator {
    fn left_dominance_exist(&self, l: &DestinationArrival, r: &DestinationArrival) -> bool {
        self.calc.is_after(l.departure_time, r.departure_time)
            || self.calc.is_best(l.arrival_time, r.arrival_time)
            || l.rounds < r.rounds
            || (self.include_c1 && l.c1 < r.c1)
            || self.c2.as_ref().is_some_and(|c2| c2.dominates(l.c2, r.c2))
    }
}

/// Pareto set of destination arrivals for the whole search.
#[derive(Debug, Clone)]
pub struct DestinationArrivals {
    set: ParetoSet<DestinationArrival>,
    comparator: DestinationComparator,
    reached_current_round: bool,
}

impl DestinationArrivals {
    pub fn new(
        calc: TransitCalculator,
        include_c1: bool,
        c2: Option<Arc<dyn C2Calculator>>,
    ) -> Self {
        Self {
            set: ParetoSet::new(),
            comparator: DestinationComparator {
                calc,
                include_c1,
                c2,
            },
            reached_current_round: false,
        }
    }

    /// Add an arrival; true if it is a new Pareto-optimal journey.
    pub fn add(&mut self, arrival: DestinationArrival) -> bool {
        let accepted = self.set.add(arrival, &self.comparator);
        if accepted {
            self.reached_current_round = true;
        }
        accepted
    }

    /// True if `candidate` would be accepted.
    pub fn qualify(&self, candidate: &DestinationArrival) -> bool {
        self.set.qualify(candidate, &self.comparator)
    }

    pub fn reached_current_round(&self) -> bool {
        self.reached_current_round
    }

    pub fn new_round(&mut self) {
        self.reached_current_round = false;
    }

    pub fn is_empty(&self) -> bool {
        self.set.is_empty()
    }

    pub fn len(&self) -> usize {
        self.set.len()
    }

    pub fn arrivals(&self) -> &[DestinationArrival] {
        self.set.as_slice()
    }
}

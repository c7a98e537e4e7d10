//! Trip patterns.

use super::DomainError;

/// An ordered sequence of stops shared by a group of trips.
///
/// All trips of a pattern visit the same stops in the same order. Each stop
/// position carries its own boarding/alighting permission, and the pattern's
/// slack index selects which board/alight slack (and transit reluctance)
/// applies to its trips.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TripPattern {
    index: usize,
    stops: Vec<usize>,
    boarding: Vec<bool>,
    alighting: Vec<bool>,
    slack_index: usize,
    priority_group_id: Option<u32>,
    label: String,
}

impl TripPattern {
    /// Create a pattern where boarding and alighting are possible everywhere.
    pub fn new(
        index: usize,
        stops: Vec<usize>,
        slack_index: usize,
        label: impl Into<String>,
    ) -> Result<Self, DomainError> {
        let label = label.into();
        if stops.len() < 2 {
            return Err(DomainError::PatternTooShort(label));
        }
        let n = stops.len();
        Ok(Self {
            index,
            stops,
            boarding: vec![true; n],
            alighting: vec![true; n],
            slack_index,
            priority_group_id: None,
            label,
        })
    }

    /// Restrict boarding/alighting per stop position.
    pub fn with_restrictions(
        mut self,
        boarding: Vec<bool>,
        alighting: Vec<bool>,
    ) -> Result<Self, DomainError> {
        self.check_len("boarding flags", boarding.len())?;
        self.check_len("alighting flags", alighting.len())?;
        self.boarding = boarding;
        self.alighting = alighting;
        Ok(self)
    }

    /// Assign the pattern to a transit priority group.
    pub fn with_priority_group(mut self, group_id: u32) -> Self {
        self.priority_group_id = Some(group_id);
        self
    }

    fn check_len(&self, what: &'static str, actual: usize) -> Result<(), DomainError> {
        if actual != self.stops.len() {
            return Err(DomainError::LengthMismatch {
                pattern: self.label.clone(),
                what,
                expected: self.stops.len(),
                actual,
            });
        }
        Ok(())
    }

    /// Pattern identity (its route index in the transit view).
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn number_of_stops_in_pattern(&self) -> usize {
        self.stops.len()
    }

    /// Stop index at a stop position.
    ///
    /// Panics if `pos` is out of bounds; positions always come from
    /// iterating this pattern.
    pub fn stop_index(&self, pos: usize) -> usize {
        self.stops[pos]
    }

    pub fn stops(&self) -> &[usize] {
        &self.stops
    }

    pub fn boarding_possible_at(&self, pos: usize) -> bool {
        self.boarding[pos]
    }

    pub fn alighting_possible_at(&self, pos: usize) -> bool {
        self.alighting[pos]
    }

    pub fn slack_index(&self) -> usize {
        self.slack_index
    }

    pub fn priority_group_id(&self) -> Option<u32> {
        self.priority_group_id
    }

    /// Label used in logs and debug events.
    pub fn debug_info(&self) -> &str {
        &self.label
    }

    /// Find the first position at or after `start_pos` that visits `stop`.
    ///
    /// A pattern may visit the same stop twice (loops), so the lookup is
    /// always anchored at a known position.
    pub fn find_stop_position_after(&self, start_pos: usize, stop: usize) -> Option<usize> {
        self.stops
            .iter()
            .enumerate()
            .skip(start_pos)
            .find(|&(_, &s)| s == stop)
            .map(|(pos, _)| pos)
    }

    /// Find the last position at or before `end_pos` that visits `stop`.
    pub fn find_stop_position_before(&self, end_pos: usize, stop: usize) -> Option<usize> {
        let end = end_pos.min(self.stops.len().saturating_sub(1));
        (0..=end).rev().find(|&pos| self.stops[pos] == stop)
    }
}

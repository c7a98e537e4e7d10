//! Round bookkeeping for one iteration.

/// Tracks the current round and when the iteration should stop.
///
/// Round 0 holds the access arrivals; round `k` holds arrivals after `k`
/// trips. Reaching the destination can lower the limit when
/// `additional_transfers` is configured.
#[derive(Debug, Clone)]
pub struct RoundTracker {
    round: usize,
    max_rounds: usize,
    round_limit: usize,
    additional_transfers: Option<usize>,
}

impl RoundTracker {
    pub fn new(max_rounds: usize, additional_transfers: Option<usize>) -> Self {
        Self {
            round: 0,
            max_rounds,
            round_limit: max_rounds,
            additional_transfers,
        }
    }

    /// Reset before a new iteration.
    pub fn setup_iteration(&mut self) {
        self.round = 0;
        self.round_limit = self.max_rounds;
    }

    /// Advance to the next round and return it.
    pub fn next_round(&mut self) -> usize {
        self.round += 1;
        self.round
    }

    pub fn round(&self) -> usize {
        self.round
    }

    pub fn is_first_round(&self) -> bool {
        self.round == 1
    }

    pub fn has_more_rounds(&self) -> bool {
        self.round < self.round_limit
    }

    /// The destination was reached in the current round.
    pub fn notify_destination_reached(&mut self) {
        if let Some(extra) = self.additional_transfers {
            self.round_limit = self.round_limit.min(self.round + extra);
        }
    }
}

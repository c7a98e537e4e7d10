//! Search configuration for the router.

use chrono::Duration;
use serde::Deserialize;

use super::error::RaptorError;
use super::slack::SlackProvider;

/// Configuration parameters for a range raptor search.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Maximum number of transfers; the search runs at most
    /// `max_transfers + 1` transit rounds.
    pub max_transfers: usize,

    /// Once the destination is reached in round `r`, stop after round
    /// `r + additional_transfers`. `None` runs every allowed round.
    pub additional_transfers: Option<usize>,

    /// Width of the departure window (minutes), used when the request does
    /// not set one.
    pub search_window_mins: i64,

    /// Distance between iteration start times (seconds).
    pub iteration_step_secs: i32,

    /// Maximum journey duration (minutes).
    /// Bounds the reverse heuristic search and the arrival time limit.
    pub max_journey_mins: i64,

    /// Whether multi-criteria searches prune with a heuristic pass.
    pub use_heuristics: bool,

    /// Cancel the search after this many milliseconds.
    pub timeout_ms: Option<u64>,

    pub slack: SlackConfig,

    pub cost: CostConfig,
}

impl SearchConfig {
    /// Create a new configuration with the given round and window limits.
    pub fn new(
        max_transfers: usize,
        search_window_mins: i64,
        iteration_step_secs: i32,
        max_journey_mins: i64,
    ) -> Self {
        Self {
            max_transfers,
            search_window_mins,
            iteration_step_secs,
            max_journey_mins,
            ..Self::default()
        }
    }

    /// Number of transit rounds a search may run.
    pub fn max_rounds(&self) -> usize {
        self.max_transfers + 1
    }

    /// Returns the search window as a Duration.
    pub fn search_window(&self) -> Duration {
        Duration::minutes(self.search_window_mins)
    }

    /// Returns the maximum journey time as a Duration.
    pub fn max_journey(&self) -> Duration {
        Duration::minutes(self.max_journey_mins)
    }

    /// Returns the timeout as a std Duration, for the async runtime.
    pub fn timeout(&self) -> Option<std::time::Duration> {
        self.timeout_ms.map(std::time::Duration::from_millis)
    }

    /// Check the configuration before a search starts.
    pub fn validate(&self) -> Result<(), RaptorError> {
        if self.iteration_step_secs <= 0 {
            return Err(RaptorError::InvalidConfig(
                "iteration step must be positive".to_string(),
            ));
        }
        if self.search_window_mins < 0 || self.max_journey_mins <= 0 {
            return Err(RaptorError::InvalidConfig(
                "search window and maximum journey time must not be negative".to_string(),
            ));
        }
        self.slack.validate()?;
        self.cost.validate()
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_transfers: 5,
            additional_transfers: None,
            search_window_mins: 60,
            iteration_step_secs: 60,
            max_journey_mins: 720, // 12 hours
            use_heuristics: true,
            timeout_ms: None,
            slack: SlackConfig::default(),
            cost: CostConfig::default(),
        }
    }
}

/// Slack times in seconds, optionally overridden per slack index.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SlackConfig {
    pub board_slack_secs: i32,
    pub alight_slack_secs: i32,
    pub transfer_slack_secs: i32,
    /// Board slack by pattern slack index; missing entries use the default.
    pub board_slack_by_index: Vec<i32>,
    /// Alight slack by pattern slack index; missing entries use the default.
    pub alight_slack_by_index: Vec<i32>,
}

impl SlackConfig {
    pub fn new(board_slack_secs: i32, alight_slack_secs: i32, transfer_slack_secs: i32) -> Self {
        Self {
            board_slack_secs,
            alight_slack_secs,
            transfer_slack_secs,
            board_slack_by_index: Vec::new(),
            alight_slack_by_index: Vec::new(),
        }
    }

    fn validate(&self) -> Result<(), RaptorError> {
        let negative = [
            self.board_slack_secs,
            self.alight_slack_secs,
            self.transfer_slack_secs,
        ]
        .iter()
        .chain(&self.board_slack_by_index)
        .chain(&self.alight_slack_by_index)
        .any(|s| *s < 0);
        if negative {
            return Err(RaptorError::InvalidConfig(
                "slack must not be negative".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for SlackConfig {
    fn default() -> Self {
        Self::new(0, 0, 60)
    }
}

impl SlackProvider for SlackConfig {
    fn board_slack(&self, slack_index: usize) -> i32 {
        self.board_slack_by_index
            .get(slack_index)
            .copied()
            .unwrap_or(self.board_slack_secs)
    }

    fn alight_slack(&self, slack_index: usize) -> i32 {
        self.alight_slack_by_index
            .get(slack_index)
            .copied()
            .unwrap_or(self.alight_slack_secs)
    }

    fn transfer_slack(&self) -> i32 {
        self.transfer_slack_secs
    }
}

/// Generalized cost parameters. Costs are given in seconds of equivalent
/// travel time and reluctances as multipliers of elapsed time.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct CostConfig {
    /// Cost of every boarding.
    pub board_cost_secs: i32,
    /// Extra cost of every boarding after the first one.
    pub transfer_cost_secs: i32,
    /// Multiplier for time spent waiting at stops.
    pub wait_reluctance: f64,
    /// Multiplier for time spent on board, used when no per-index value is set.
    pub transit_reluctance: f64,
    /// Transit reluctance by pattern slack index.
    pub transit_reluctance_by_index: Vec<f64>,
}

impl CostConfig {
    fn validate(&self) -> Result<(), RaptorError> {
        let bad_factor = std::iter::once(self.wait_reluctance)
            .chain(std::iter::once(self.transit_reluctance))
            .chain(self.transit_reluctance_by_index.iter().copied())
            .any(|f| !f.is_finite() || f < 0.0);
        if bad_factor || self.board_cost_secs < 0 || self.transfer_cost_secs < 0 {
            return Err(RaptorError::InvalidConfig(
                "costs and reluctances must be finite and not negative".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for CostConfig {
    fn default() -> Self {
        Self {
            board_cost_secs: 600,
            transfer_cost_secs: 0,
            wait_reluctance: 1.0,
            transit_reluctance: 1.0,
            transit_reluctance_by_index: Vec::new(),
        }
    }
}

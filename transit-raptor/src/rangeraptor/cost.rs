//! Generalized cost (c1).
//!
//! Costs are integers in centi-seconds: one second of travel at reluctance
//! 1.0 costs 100. Factors are stored the same way, so `factor * seconds`
//! yields a cost directly. Every product is clamped to the real value range
//! so the sentinels are never reached by accident.

use super::config::CostConfig;
use crate::domain::{MAX_REAL_VALUE, TransferDisposition};

/// Cost units per second at reluctance 1.0.
pub const COST_UNIT: i32 = 100;

/// Convert seconds (or a reluctance factor) into raptor cost units.
pub fn to_raptor_cost(value: f64) -> i32 {
    let cost = (value * f64::from(COST_UNIT)).round();
    cost.clamp(-f64::from(MAX_REAL_VALUE), f64::from(MAX_REAL_VALUE)) as i32
}

/// `factor * seconds`, clamped to the real value range.
pub fn cost_of(factor: i32, seconds: i32) -> i32 {
    let cost = i64::from(factor) * i64::from(seconds);
    cost.clamp(-i64::from(MAX_REAL_VALUE), i64::from(MAX_REAL_VALUE)) as i32
}

/// Sum of two costs, clamped to the real value range.
pub fn add_cost(a: i32, b: i32) -> i32 {
    (i64::from(a) + i64::from(b)).clamp(-i64::from(MAX_REAL_VALUE), i64::from(MAX_REAL_VALUE))
        as i32
}

/// Computes boarding and riding costs for the multi-criteria search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CostCalculator {
    board_cost: i32,
    transfer_cost: i32,
    wait_factor: i32,
    transit_factor: i32,
    transit_factor_by_index: Vec<i32>,
}

impl CostCalculator {
    pub fn new(config: &CostConfig) -> Self {
        Self {
            board_cost: to_raptor_cost(f64::from(config.board_cost_secs)),
            transfer_cost: to_raptor_cost(f64::from(config.transfer_cost_secs)),
            wait_factor: to_raptor_cost(config.wait_reluctance),
            transit_factor: to_raptor_cost(config.transit_reluctance),
            transit_factor_by_index: config
                .transit_reluctance_by_index
                .iter()
                .map(|f| to_raptor_cost(*f))
                .collect(),
        }
    }

    /// Cost of boarding a trip after `wait_time` seconds at the stop.
    ///
    /// The first boarding pays the board cost only; the wait before it
    /// belongs to the access and is not costed. Later boardings add the
    /// transfer cost and the wait, except that a stay-seated transfer costs
    /// only its wait and a guaranteed one skips the transfer cost.
    pub fn boarding_cost(
        &self,
        first_boarding: bool,
        wait_time: i32,
        disposition: Option<TransferDisposition>,
    ) -> i32 {
        if first_boarding {
            return self.board_cost;
        }
        let wait = self.wait_cost(wait_time);
        match disposition {
            Some(TransferDisposition::StaySeated) => wait,
            Some(TransferDisposition::Guaranteed) => add_cost(self.board_cost, wait),
            _ => add_cost(add_cost(self.board_cost, self.transfer_cost), wait),
        }
    }

    /// Cost at the stop a trip is left at, given the cost when it was
    /// boarded.
    pub fn transit_arrival_cost(
        &self,
        board_c1: i32,
        transit_time: i32,
        alight_slack: i32,
        slack_index: usize,
    ) -> i32 {
        let ride = cost_of(self.transit_factor(slack_index), transit_time);
        add_cost(
            add_cost(board_c1, ride),
            cost_of(self.wait_factor, alight_slack),
        )
    }

    pub fn wait_cost(&self, seconds: i32) -> i32 {
        cost_of(self.wait_factor, seconds)
    }

    pub fn transit_factor(&self, slack_index: usize) -> i32 {
        self.transit_factor_by_index
            .get(slack_index)
            .copied()
            .unwrap_or(self.transit_factor)
    }

    /// Smallest cost per second any part of a journey can have.
    ///
    /// `street_factor` is the cheapest cost per second of the street legs
    /// (transfers and egress) in the network.
    pub fn min_cost_factor(&self, street_factor: i32) -> i32 {
        self.transit_factor_by_index
            .iter()
            .copied()
            .chain([self.wait_factor, self.transit_factor, street_factor])
            .min()
            .unwrap_or(0)
            .max(0)
    }
}

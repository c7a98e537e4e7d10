//! Board, alight and transfer slack.

/// Minimum buffer times applied around boarding and alighting.
///
/// The slack index comes from the pattern, so different modes can have
/// different slack.
pub trait SlackProvider {
    /// Seconds required between arriving at a stop and boarding.
    fn board_slack(&self, slack_index: usize) -> i32;

    /// Seconds added after alighting before the stop counts as reached.
    fn alight_slack(&self, slack_index: usize) -> i32;

    /// Extra seconds added to the board slack for every boarding after the
    /// first one.
    fn transfer_slack(&self) -> i32;
}

/// A slack provider where every slack is zero.
///
/// Heuristic searches use it: with no slack the bound stays a lower bound
/// even for stay-seated and guaranteed transfers.
#[derive(Debug, Clone, Copy, Default)]
pub struct ZeroSlack;

impl SlackProvider for ZeroSlack {
    fn board_slack(&self, _slack_index: usize) -> i32 {
        0
    }

    fn alight_slack(&self, _slack_index: usize) -> i32 {
        0
    }

    fn transfer_slack(&self) -> i32 {
        0
    }
}

//! Proposal lifecycle captions
//!
//! Every proposal row shows a short status label ("Voting ends") followed by
//! a time expression, either a relative phrase ("in 3 days") or a calendar
//! date ("Mar 05, 2024"). Which pair is shown depends on the proposal state,
//! whether its payload executes on another chain, and the current time.

pub mod relative;

use serde::{Deserialize, Serialize};
use std::fmt;

pub use relative::{from_now, DateFormatter};

/// Extra delay before a cross-chain payload lands on the destination chain (48h)
pub const CROSS_CHAIN_EXECUTION_DELAY: i64 = 172_800;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProposalState {
    Pending,
    Canceled,
    Active,
    Failed,
    Succeeded,
    Queued,
    Expired,
    Executed,
    /// Any state this build does not know about
    #[serde(other)]
    Unknown,
}

impl ProposalState {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProposalState::Pending => "Pending",
            ProposalState::Canceled => "Canceled",
            ProposalState::Active => "Active",
            ProposalState::Failed => "Failed",
            ProposalState::Succeeded => "Succeeded",
            ProposalState::Queued => "Queued",
            ProposalState::Expired => "Expired",
            ProposalState::Executed => "Executed",
            ProposalState::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for ProposalState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Timestamps (Unix seconds) needed to caption a proposal
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProposalTiming {
    pub state: ProposalState,
    pub start_timestamp: i64,
    pub execution_time: i64,
    pub expiration_timestamp: i64,
    pub execution_time_with_grace_period: i64,
    /// Payload executes on another chain after the bridge delay
    #[serde(default)]
    pub cross_chain: bool,
}

impl ProposalTiming {
    /// When the payload can run on its destination chain
    pub fn cross_chain_execution_time(&self) -> i64 {
        if self.cross_chain {
            self.execution_time.saturating_add(CROSS_CHAIN_EXECUTION_DELAY)
        } else {
            self.execution_time
        }
    }

    pub fn can_be_executed(&self, now: i64) -> bool {
        now > self.cross_chain_execution_time()
    }

    /// Executed proposals are dated by execution, everything else by expiration
    fn closing_time(&self) -> i64 {
        if self.state == ProposalState::Executed {
            self.execution_time
        } else {
            self.expiration_timestamp
        }
    }
}

/// How the time half of a caption is rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "at", rename_all = "snake_case")]
pub enum TimeExpr {
    /// Phrase relative to now, e.g. "in 3 days"
    Relative(i64),
    /// Calendar date, e.g. "Mar 05, 2024"
    Date(i64),
}

impl TimeExpr {
    pub fn render(&self, now: i64, dates: &DateFormatter) -> String {
        match *self {
            TimeExpr::Relative(at) => from_now(at, now),
            TimeExpr::Date(at) => dates.date(at),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProposalCaption {
    /// Secondary text, hidden on narrow layouts
    pub label: String,
    pub time: TimeExpr,
    /// `time` rendered against the clock sample used for this caption
    pub text: String,
}

/// Pick the label and time expression for a proposal at `now`
pub fn select(timing: &ProposalTiming, now: i64) -> (String, TimeExpr) {
    let cross_chain_execution_time = timing.cross_chain_execution_time();
    let can_be_executed = timing.can_be_executed(now);

    match timing.state {
        ProposalState::Pending => (
            "Voting starts".to_string(),
            TimeExpr::Relative(timing.start_timestamp),
        ),
        ProposalState::Active => (
            "Voting ends".to_string(),
            TimeExpr::Relative(timing.expiration_timestamp),
        ),
        // Adds the clock sample to an absolute timestamp
        ProposalState::Succeeded => (
            "Expected execution on".to_string(),
            TimeExpr::Date(now.saturating_add(timing.expiration_timestamp)),
        ),
        ProposalState::Canceled
        | ProposalState::Expired
        | ProposalState::Failed
        | ProposalState::Executed
            if !timing.cross_chain =>
        {
            (format!("{} on", timing.state), TimeExpr::Date(timing.closing_time()))
        }
        _ => {
            let label = match (can_be_executed, timing.cross_chain) {
                (true, true) => "Executed",
                (true, false) => "Expected Execution",
                (false, true) => "Cross-chain execution",
                (false, false) => "Can be executed",
            };
            let time = if !timing.cross_chain {
                TimeExpr::Date(timing.closing_time())
            } else if can_be_executed && !timing.cross_chain {
                // never taken: the grace period only applies to same-chain payloads
                TimeExpr::Relative(timing.execution_time_with_grace_period)
            } else {
                TimeExpr::Relative(cross_chain_execution_time)
            };
            (label.to_string(), time)
        }
    }
}

/// Caption a proposal against a clock sample
pub fn caption(timing: &ProposalTiming, now: i64, dates: &DateFormatter) -> ProposalCaption {
    let (label, time) = select(timing, now);
    let text = time.render(now, dates);
    ProposalCaption { label, time, text }
}

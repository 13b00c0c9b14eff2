//! State machine for join requests
//!
//! A join request moves from `pending` to exactly one of `approved` or
//! `rejected`; both are terminal. There is no revoke path.

use serde::{Deserialize, Serialize};

pub use atelier_common::StateError;

/// Join request status. Stored directly; `pending` is the only
/// non-terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, Default)]
#[sqlx(type_name = "join_request_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum JoinRequestStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

impl JoinRequestStatus {
    /// Check if this is a terminal state
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Approved | Self::Rejected)
    }

    /// Get all valid next states from current state
    pub fn valid_transitions(&self) -> &'static [JoinRequestStatus] {
        match self {
            Self::Pending => &[Self::Approved, Self::Rejected],
            Self::Approved => &[],
            Self::Rejected => &[],
        }
    }
}

impl std::fmt::Display for JoinRequestStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Approved => write!(f, "approved"),
            Self::Rejected => write!(f, "rejected"),
        }
    }
}

/// Events that trigger join request state transitions
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum JoinRequestEvent {
    /// Lead approves the request; the requester joins the roster
    Approve,
    /// Lead rejects the request; nothing else changes
    Reject,
}

impl std::fmt::Display for JoinRequestEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Approve => write!(f, "approve"),
            Self::Reject => write!(f, "reject"),
        }
    }
}

/// Join request state machine
pub struct JoinRequestStateMachine;

impl JoinRequestStateMachine {
    /// Attempt a state transition
    pub fn transition(
        current: JoinRequestStatus,
        event: JoinRequestEvent,
    ) -> Result<JoinRequestStatus, StateError> {
        if current.is_terminal() {
            return Err(StateError::TerminalState(current.to_string()));
        }

        match (current, event) {
            (JoinRequestStatus::Pending, JoinRequestEvent::Approve) => {
                Ok(JoinRequestStatus::Approved)
            }
            (JoinRequestStatus::Pending, JoinRequestEvent::Reject) => {
                Ok(JoinRequestStatus::Rejected)
            }
            _ => Err(StateError::InvalidTransition {
                from: current.to_string(),
                to: "unknown".to_string(),
                event: event.to_string(),
            }),
        }
    }

    /// Check if a transition is valid without applying it
    pub fn can_transition(current: JoinRequestStatus, event: JoinRequestEvent) -> bool {
        Self::transition(current, event).is_ok()
    }
}

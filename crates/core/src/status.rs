//! Session linking lifecycle.
//!
//! A session starts in `connecting` and moves along a small, enforced graph:
//!
//! ```text
//! connecting ──► active ──► inactive
//!     │
//!     └────────► failed
//! ```
//!
//! `active`, `inactive`, and `failed` are terminal for the poller: clients
//! stop polling once they observe any of them. Identity transitions are
//! always legal so that repeated writes of the same status stay idempotent
//! (the store still refreshes `updated_at`).

use serde::{Deserialize, Serialize};

/// Current phase of a session's linking process.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    Connecting,
    Active,
    Inactive,
    Failed,
}

impl SessionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Connecting => "connecting",
            Self::Active => "active",
            Self::Inactive => "inactive",
            Self::Failed => "failed",
        }
    }

    /// A terminal status ends client-side polling. Everything except
    /// `connecting` is terminal: `active` is success, `failed` is failure,
    /// `inactive` is idle-but-settled.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Connecting)
    }
}

impl std::fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown session status {0:?}")]
pub struct StatusParseError(pub String);

impl std::str::FromStr for SessionStatus {
    type Err = StatusParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "connecting" => Ok(Self::Connecting),
            "active" => Ok(Self::Active),
            "inactive" => Ok(Self::Inactive),
            "failed" => Ok(Self::Failed),
            other => Err(StatusParseError(other.to_string())),
        }
    }
}

/// Rejection for an edge outside the lifecycle graph.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("illegal status transition {from} -> {to}")]
pub struct TransitionError {
    pub from: SessionStatus,
    pub to: SessionStatus,
}

/// Validate a status transition against the lifecycle graph.
///
/// Legal edges: any identity transition, `connecting -> active`,
/// `connecting -> failed`, and `active -> inactive` (the free-form
/// administrative edge). Everything else is rejected.
pub fn validate_transition(
    from: SessionStatus,
    to: SessionStatus,
) -> Result<(), TransitionError> {
    use SessionStatus::*;
    match (from, to) {
        (a, b) if a == b => Ok(()),
        (Connecting, Active) | (Connecting, Failed) | (Active, Inactive) => Ok(()),
        (from, to) => Err(TransitionError { from, to }),
    }
}

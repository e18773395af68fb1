//! Lifecycle state machines for launches and phases.
//!
//! Both state machines are **monotonic along their happy path**: a launch
//! never returns to SUPPLYING once scheduling begins, and a phase never
//! returns to CREATED once scheduled. The only cycle is ACTIVE ⇄ PAUSED.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// LaunchState
// ---------------------------------------------------------------------------

/// The lifecycle state of a launch.
///
/// ```text
///   ┌───────────┐    ┌────────────┐    ┌────────┐     ┌───────────┐
///   │ SUPPLYING ├───▶│ SCHEDULING ├───▶│ ACTIVE ├────▶│ COMPLETED │
///   └───────────┘    └────────────┘    └───┬────┘     └───────────┘
///                                      ▲   │               ▲
///                                      │   ▼               │
///                                     ┌┴───────┐           │
///                                     │ PAUSED ├───────────┘
///                                     └────────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LaunchState {
    /// Accepting items into the pool, up to the declared target supply.
    Supplying,
    /// Pool fully supplied; phases are being configured and scheduled.
    Scheduling,
    /// Open for allocation against the currently-admissible phase.
    Active,
    /// Allocation frozen; the minted counter is preserved.
    Paused,
    /// Distribution finished. Terminal apart from teardown.
    Completed,
}

impl LaunchState {
    /// Can this launch transition to the given target state?
    #[must_use]
    pub fn can_transition_to(&self, target: Self) -> bool {
        matches!(
            (self, target),
            (Self::Supplying, Self::Scheduling)
                | (Self::Scheduling | Self::Paused, Self::Active)
                | (Self::Active, Self::Paused)
                | (Self::Active | Self::Paused, Self::Completed)
        )
    }

    /// Whether allocation calls are currently legal.
    #[must_use]
    pub fn is_active(&self) -> bool {
        *self == Self::Active
    }

    /// Whether this is the terminal state.
    #[must_use]
    pub fn is_completed(&self) -> bool {
        *self == Self::Completed
    }
}

impl fmt::Display for LaunchState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Supplying => write!(f, "SUPPLYING"),
            Self::Scheduling => write!(f, "SCHEDULING"),
            Self::Active => write!(f, "ACTIVE"),
            Self::Paused => write!(f, "PAUSED"),
            Self::Completed => write!(f, "COMPLETED"),
        }
    }
}

// ---------------------------------------------------------------------------
// PhaseState
// ---------------------------------------------------------------------------

/// The lifecycle state of a phase.
///
/// `Scheduled` carries the admission window; rescheduling replaces the
/// window in place and is only legal before the window starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PhaseState {
    /// Configurable; not yet bound to a time window.
    Created,
    /// Bound to the half-open admission window `[start, end)`.
    Scheduled {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },
}

impl PhaseState {
    /// Whether the phase has a window.
    #[must_use]
    pub fn is_scheduled(&self) -> bool {
        matches!(self, Self::Scheduled { .. })
    }

    /// The window, if scheduled.
    #[must_use]
    pub fn window(&self) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
        match self {
            Self::Created => None,
            Self::Scheduled { start, end } => Some((*start, *end)),
        }
    }
}

impl fmt::Display for PhaseState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Created => write!(f, "CREATED"),
            Self::Scheduled { .. } => write!(f, "SCHEDULED"),
        }
    }
}

// ---------------------------------------------------------------------------
// PhaseKind
// ---------------------------------------------------------------------------

/// Eligibility rule for a phase: open to anyone, or gated by single-use
/// tickets. The whitelist variant carries its issuance counters
/// (informational — redemption is bounded by the phase quotas, not by
/// these counters).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PhaseKind {
    /// Anyone may mint, subject to quotas and payment.
    Public,
    /// Only holders of tickets bound to this phase may mint.
    Whitelist {
        /// Tickets issued for this phase since creation.
        issued: u64,
        /// Tickets burned by successful redemptions.
        redeemed: u64,
    },
}

impl PhaseKind {
    /// A fresh whitelist kind with zeroed counters.
    #[must_use]
    pub fn whitelist() -> Self {
        Self::Whitelist {
            issued: 0,
            redeemed: 0,
        }
    }

    /// Whether admission requires tickets.
    #[must_use]
    pub fn is_gated(&self) -> bool {
        matches!(self, Self::Whitelist { .. })
    }
}

impl fmt::Display for PhaseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Public => write!(f, "PUBLIC"),
            Self::Whitelist { .. } => write!(f, "WHITELIST"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn launch_happy_path() {
        assert!(LaunchState::Supplying.can_transition_to(LaunchState::Scheduling));
        assert!(LaunchState::Scheduling.can_transition_to(LaunchState::Active));
        assert!(LaunchState::Active.can_transition_to(LaunchState::Paused));
        assert!(LaunchState::Paused.can_transition_to(LaunchState::Active));
        assert!(LaunchState::Active.can_transition_to(LaunchState::Completed));
        assert!(LaunchState::Paused.can_transition_to(LaunchState::Completed));
    }

    #[test]
    fn launch_illegal_transitions() {
        assert!(!LaunchState::Supplying.can_transition_to(LaunchState::Active));
        assert!(!LaunchState::Scheduling.can_transition_to(LaunchState::Supplying));
        assert!(!LaunchState::Completed.can_transition_to(LaunchState::Active));
        assert!(!LaunchState::Paused.can_transition_to(LaunchState::Scheduling));
    }

    #[test]
    fn launch_state_display() {
        assert_eq!(format!("{}", LaunchState::Supplying), "SUPPLYING");
        assert_eq!(format!("{}", LaunchState::Scheduling), "SCHEDULING");
        assert_eq!(format!("{}", LaunchState::Active), "ACTIVE");
        assert_eq!(format!("{}", LaunchState::Paused), "PAUSED");
        assert_eq!(format!("{}", LaunchState::Completed), "COMPLETED");
    }

    #[test]
    fn phase_state_window() {
        assert_eq!(PhaseState::Created.window(), None);
        let start = Utc::now();
        let end = start + chrono::Duration::hours(1);
        let s = PhaseState::Scheduled { start, end };
        assert!(s.is_scheduled());
        assert_eq!(s.window(), Some((start, end)));
    }

    #[test]
    fn phase_kind_gating() {
        assert!(!PhaseKind::Public.is_gated());
        assert!(PhaseKind::whitelist().is_gated());
    }

    #[test]
    fn state_serde_roundtrip() {
        let state = LaunchState::Paused;
        let json = serde_json::to_string(&state).unwrap();
        let back: LaunchState = serde_json::from_str(&json).unwrap();
        assert_eq!(state, back);

        let kind = PhaseKind::Whitelist {
            issued: 5,
            redeemed: 2,
        };
        let json = serde_json::to_string(&kind).unwrap();
        let back: PhaseKind = serde_json::from_str(&json).unwrap();
        assert_eq!(kind, back);
    }
}

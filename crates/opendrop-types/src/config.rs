//! Policy knobs for launch and phase behavior.
//!
//! The source history of this engine disagrees with itself in two places:
//! how an over-quota mint request resolves, and when a scheduled phase may
//! be destroyed. Both are surfaced here as explicit, documented
//! configuration rather than silently picking one behavior.

use std::fmt;

use serde::{Deserialize, Serialize};

/// How an allocation request larger than the caller's remaining quota
/// resolves.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum QuantityPolicy {
    /// Reject the whole request when it exceeds the participant's remaining
    /// quota or the phase total. Recommended: every allocation in the audit
    /// trail is exactly what the caller asked for.
    #[default]
    Strict,
    /// Silently reduce the quantity to what the quotas (and pool) allow and
    /// refund the unused payment.
    Clamp,
}

impl fmt::Display for QuantityPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Strict => write!(f, "STRICT"),
            Self::Clamp => write!(f, "CLAMP"),
        }
    }
}

/// When a scheduled phase may be destroyed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum DestroyPolicy {
    /// Destruction is legal whenever now is outside `[start, end]`.
    #[default]
    OutsideWindow,
    /// Destruction after the window has fully elapsed is unconditional;
    /// before that it additionally requires zero consumed mints.
    ZeroMintsBeforeElapse,
}

impl fmt::Display for DestroyPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OutsideWindow => write!(f, "OUTSIDE_WINDOW"),
            Self::ZeroMintsBeforeElapse => write!(f, "ZERO_MINTS_BEFORE_ELAPSE"),
        }
    }
}

/// Per-phase policy bundle, fixed at phase creation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhasePolicies {
    /// Over-quota resolution.
    pub quantity: QuantityPolicy,
    /// Destroy gating for scheduled phases.
    pub destroy: DestroyPolicy,
}

//! Capability and obligation tokens for launch administration.
//!
//! Authorization is a value, not a lookup: holding a token whose embedded
//! launch id matches the target *is* the permission. None of these types
//! are `Clone` or serde-constructible — the only way to hold one is to have
//! received it from [`Launch::create`](crate::Launch::create) or
//! [`Launch::request_operator`](crate::Launch::request_operator).

use opendrop_types::{CapabilityId, LaunchId, OpendropError, Result};

// ---------------------------------------------------------------------------
// AdminCapability
// ---------------------------------------------------------------------------

/// Administrative token for one launch: authorizes revenue withdrawal,
/// allow-list management, and final teardown.
///
/// The token itself is destructible only once the launch's revenue ledger
/// has drained to empty — either through withdrawals or through
/// [`Launch::destroy`](crate::Launch::destroy), both of which set the
/// `revenue_withdrawn` flag.
#[derive(Debug)]
pub struct AdminCapability {
    id: CapabilityId,
    launch_id: LaunchId,
    revenue_withdrawn: bool,
}

impl AdminCapability {
    pub(crate) fn issue(launch_id: LaunchId) -> Self {
        Self {
            id: CapabilityId::new(),
            launch_id,
            revenue_withdrawn: false,
        }
    }

    #[must_use]
    pub fn id(&self) -> CapabilityId {
        self.id
    }

    /// The launch this capability is scoped to.
    #[must_use]
    pub fn launch_id(&self) -> LaunchId {
        self.launch_id
    }

    /// Whether the scoped launch's revenue ledger has drained to empty.
    #[must_use]
    pub fn revenue_withdrawn(&self) -> bool {
        self.revenue_withdrawn
    }

    pub(crate) fn mark_revenue_withdrawn(&mut self) {
        self.revenue_withdrawn = true;
    }

    /// Consume the token.
    ///
    /// # Errors
    /// Returns [`OpendropError::RevenueNotWithdrawn`] while the scoped
    /// launch still holds revenue; the token survives the failed call only
    /// in the sense that the host substrate rolls the whole operation back.
    pub fn destroy(self) -> Result<()> {
        if !self.revenue_withdrawn {
            return Err(OpendropError::RevenueNotWithdrawn);
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// OperatorCapability
// ---------------------------------------------------------------------------

/// Operational token for one launch: authorizes supply, scheduling, and
/// pricing mutations. Held long-term by the creator, or requested on
/// demand by an allow-listed identity.
#[derive(Debug)]
pub struct OperatorCapability {
    id: CapabilityId,
    launch_id: LaunchId,
}

impl OperatorCapability {
    pub(crate) fn issue(launch_id: LaunchId) -> Self {
        Self {
            id: CapabilityId::new(),
            launch_id,
        }
    }

    #[must_use]
    pub fn id(&self) -> CapabilityId {
        self.id
    }

    /// The launch this capability is scoped to.
    #[must_use]
    pub fn launch_id(&self) -> LaunchId {
        self.launch_id
    }
}

// ---------------------------------------------------------------------------
// ShareObligation
// ---------------------------------------------------------------------------

/// Completion token returned by [`Launch::create`](crate::Launch::create).
///
/// The launch is unusable until this obligation is moved into
/// [`Launch::publish`](crate::Launch::publish), which verifies the embedded
/// id and consumes the token. There is no other way to discharge it: the
/// type is not `Clone`, and every constructor is crate-private.
#[derive(Debug)]
#[must_use = "a created launch must be published by consuming its obligation"]
pub struct ShareObligation {
    launch_id: LaunchId,
}

impl ShareObligation {
    pub(crate) fn new(launch_id: LaunchId) -> Self {
        Self { launch_id }
    }

    /// The launch this obligation belongs to.
    #[must_use]
    pub fn launch_id(&self) -> LaunchId {
        self.launch_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admin_destroy_blocked_until_withdrawn() {
        let cap = AdminCapability::issue(LaunchId::new());
        assert!(!cap.revenue_withdrawn());
        let err = cap.destroy().unwrap_err();
        assert!(matches!(err, OpendropError::RevenueNotWithdrawn));
    }

    #[test]
    fn admin_destroy_after_withdrawal_flag() {
        let mut cap = AdminCapability::issue(LaunchId::new());
        cap.mark_revenue_withdrawn();
        assert!(cap.destroy().is_ok());
    }

    #[test]
    fn tokens_embed_their_target() {
        let launch_id = LaunchId::new();
        let admin = AdminCapability::issue(launch_id);
        let operator = OperatorCapability::issue(launch_id);
        let obligation = ShareObligation::new(launch_id);
        assert_eq!(admin.launch_id(), launch_id);
        assert_eq!(operator.launch_id(), launch_id);
        assert_eq!(obligation.launch_id(), launch_id);
        assert_ne!(admin.id(), operator.id());
    }
}

//! Whitelist tickets: single-use eligibility credentials bound to one
//! phase.
//!
//! A ticket grants exactly one allocation unit in its bound phase and is
//! destroyed on redemption or explicit revocation. The type is not
//! `Clone` and has no public constructor, so exactly-once consumption is
//! enforced by ownership: once the protocol burns a ticket, nothing can
//! present it again.

use opendrop_launch::{Launch, OperatorCapability};
use opendrop_phase::Phase;
use opendrop_types::{
    LaunchId, OpendropError, ParticipantId, PhaseId, Result, TicketId, constants,
};

/// Single-use eligibility credential for one whitelist-gated phase.
#[derive(Debug)]
#[must_use = "an unredeemed ticket should be held or explicitly revoked"]
pub struct WhitelistTicket {
    id: TicketId,
    launch_id: LaunchId,
    phase_id: PhaseId,
}

impl WhitelistTicket {
    fn issue(launch_id: LaunchId, phase_id: PhaseId) -> Self {
        Self {
            id: TicketId::new(),
            launch_id,
            phase_id,
        }
    }

    #[must_use]
    pub fn id(&self) -> TicketId {
        self.id
    }

    /// The launch this ticket was issued under.
    #[must_use]
    pub fn launch_id(&self) -> LaunchId {
        self.launch_id
    }

    /// The only phase this ticket can redeem in.
    #[must_use]
    pub fn phase_id(&self) -> PhaseId {
        self.phase_id
    }

    /// Explicitly destroy the ticket without redeeming it.
    pub fn revoke(self) {
        drop(self);
    }
}

/// Dummy ticket for testing. **Never use in production.**
#[cfg(any(test, feature = "test-helpers"))]
impl WhitelistTicket {
    #[must_use]
    pub fn dummy(launch_id: LaunchId, phase_id: PhaseId) -> Self {
        Self::issue(launch_id, phase_id)
    }
}

/// Mint `count` tickets bound to `(launch, phase)`.
///
/// Operator-authorized. Bumps the phase's issued counter — informational
/// only; redemption is bounded by the phase quotas, not by issuance.
///
/// # Errors
/// - `CapabilityMismatch` / `PhaseLaunchMismatch` on binding mismatches
/// - `NotWhitelistPhase` for a public phase
/// - `ZeroQuantity` / `TicketBatchTooLarge` on a bad count
pub fn issue_tickets(
    launch: &Launch,
    phase: &mut Phase,
    operator: &OperatorCapability,
    count: u64,
) -> Result<Vec<WhitelistTicket>> {
    launch.authorize_operator(operator)?;
    if phase.launch_id() != launch.id() {
        return Err(OpendropError::PhaseLaunchMismatch {
            bound: phase.launch_id(),
            target: launch.id(),
        });
    }
    if !phase.is_published() {
        return Err(OpendropError::PhaseNotPublished(phase.id()));
    }
    if count == 0 {
        return Err(OpendropError::ZeroQuantity);
    }
    if count > constants::MAX_TICKETS_PER_ISSUE {
        return Err(OpendropError::TicketBatchTooLarge {
            requested: count,
            max: constants::MAX_TICKETS_PER_ISSUE,
        });
    }
    phase.record_issued(operator, count)?;
    Ok((0..count)
        .map(|_| WhitelistTicket::issue(launch.id(), phase.id()))
        .collect())
}

/// Bulk issuance: one ticket batch per recipient, with per-recipient
/// quantities. All-or-nothing — the counts are validated up front.
pub fn issue_bulk(
    launch: &Launch,
    phase: &mut Phase,
    operator: &OperatorCapability,
    recipients: &[(ParticipantId, u64)],
) -> Result<Vec<(ParticipantId, Vec<WhitelistTicket>)>> {
    let total: u64 = recipients.iter().map(|(_, n)| n).sum();
    if total == 0 {
        return Err(OpendropError::ZeroQuantity);
    }
    if total > constants::MAX_TICKETS_PER_ISSUE {
        return Err(OpendropError::TicketBatchTooLarge {
            requested: total,
            max: constants::MAX_TICKETS_PER_ISSUE,
        });
    }
    // Delegates the binding/authorization checks to the single-batch path.
    let mut pool = issue_tickets(launch, phase, operator, total)?;
    let mut out = Vec::with_capacity(recipients.len());
    for (recipient, n) in recipients {
        let rest = pool.split_off(usize::try_from(*n).unwrap_or(pool.len()));
        out.push((*recipient, pool));
        pool = rest;
    }
    debug_assert!(pool.is_empty());
    Ok(out)
}

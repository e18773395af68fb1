//! The allocation protocol.
//!
//! One call crosses both aggregates: the launch supplies the pool, the
//! minted counter, and the revenue ledger; the phase supplies admission,
//! quotas, and pricing. The protocol never touches either aggregate's
//! internals — every mutation goes through the aggregate's own entry
//! points, which re-run their invariant checks.

use chrono::{DateTime, Utc};
use opendrop_launch::Launch;
use opendrop_phase::Phase;
use opendrop_types::{
    AllocationEvent, AllocationId, Clock, CustodyRequirement, CustodyVault, ItemId,
    NotificationSink, OpendropError, ParticipantId, PaymentInstrument, QuantityPolicy,
    RandomnessSource, Result,
};
use rust_decimal::Decimal;

use crate::ticket::WhitelistTicket;

/// What a successful allocation call produced.
#[derive(Debug)]
pub struct MintOutcome {
    /// The items assigned, in draw order. When the launch declares a
    /// custody requirement, the same items were also routed through the
    /// vault.
    pub items: Vec<ItemId>,
    /// Units actually allocated — equals the request under the strict
    /// policy, and at most the request under the clamping policy.
    pub allocated: u64,
    /// Exactly what was deposited into the revenue ledger.
    pub paid: Decimal,
}

/// Allocate `quantity` items to `participant` from an uncustodied launch.
///
/// The payment instrument and ticket vector are borrowed mutably: on
/// success exactly the owed amount is split out of the instrument and
/// exactly `allocated` tickets are drained; on any rejection both are
/// left untouched, as are the pool, the counters, and the ledgers.
///
/// # Errors
/// Rejects with [`OpendropError::CustodyMismatch`] when the launch
/// declares `PLACE` or `LOCK` custody — use [`mint_into_vault`].
#[allow(clippy::too_many_arguments)]
pub fn mint(
    launch: &mut Launch,
    phase: &mut Phase,
    participant: ParticipantId,
    quantity: u64,
    payment: &mut PaymentInstrument,
    tickets: &mut Vec<WhitelistTicket>,
    clock: &dyn Clock,
    rng: &mut dyn RandomnessSource,
    sink: &dyn NotificationSink,
) -> Result<MintOutcome> {
    if launch.custody() != CustodyRequirement::None {
        return Err(OpendropError::CustodyMismatch {
            required: launch.custody(),
        });
    }
    mint_inner(
        launch,
        phase,
        participant,
        quantity,
        payment,
        tickets,
        clock,
        rng,
        sink,
        None,
    )
}

/// Allocate `quantity` items, routing each through the participant's
/// custody vault per the launch's `PLACE` or `LOCK` requirement.
///
/// # Errors
/// Rejects with [`OpendropError::CustodyMismatch`] when the launch
/// declares no custody requirement — use [`mint`].
#[allow(clippy::too_many_arguments)]
pub fn mint_into_vault(
    launch: &mut Launch,
    phase: &mut Phase,
    participant: ParticipantId,
    quantity: u64,
    payment: &mut PaymentInstrument,
    tickets: &mut Vec<WhitelistTicket>,
    clock: &dyn Clock,
    rng: &mut dyn RandomnessSource,
    sink: &dyn NotificationSink,
    vault: &mut dyn CustodyVault,
) -> Result<MintOutcome> {
    if launch.custody() == CustodyRequirement::None {
        return Err(OpendropError::CustodyMismatch {
            required: launch.custody(),
        });
    }
    mint_inner(
        launch,
        phase,
        participant,
        quantity,
        payment,
        tickets,
        clock,
        rng,
        sink,
        Some(vault),
    )
}

#[allow(clippy::too_many_arguments)]
fn mint_inner(
    launch: &mut Launch,
    phase: &mut Phase,
    participant: ParticipantId,
    quantity: u64,
    payment: &mut PaymentInstrument,
    tickets: &mut Vec<WhitelistTicket>,
    clock: &dyn Clock,
    rng: &mut dyn RandomnessSource,
    sink: &dyn NotificationSink,
    mut vault: Option<&mut dyn CustodyVault>,
) -> Result<MintOutcome> {
    // ---- Eligibility gates -------------------------------------------
    launch.assert_mintable()?;
    if phase.launch_id() != launch.id() {
        return Err(OpendropError::PhaseLaunchMismatch {
            bound: phase.launch_id(),
            target: launch.id(),
        });
    }
    let now = clock.now();
    phase.assert_is_mintable(now)?;

    if quantity == 0 {
        return Err(OpendropError::ZeroQuantity);
    }
    if !phase.bulk_mint_allowed() && quantity != 1 {
        return Err(OpendropError::BulkMintDisabled {
            requested: quantity,
        });
    }

    // ---- Quantity resolution -----------------------------------------
    let allocated = match phase.policies().quantity {
        QuantityPolicy::Strict => {
            phase.check_mint(participant, quantity)?;
            if quantity > launch.pool_len() {
                return Err(OpendropError::PoolDepleted {
                    requested: quantity,
                    available: launch.pool_len(),
                });
            }
            quantity
        }
        QuantityPolicy::Clamp => {
            let clamped = phase
                .clamp_quantity(participant, quantity)
                .min(launch.pool_len());
            if clamped == 0 {
                return Err(OpendropError::ParticipantQuotaExceeded {
                    requested: quantity,
                    remaining: 0,
                });
            }
            clamped
        }
    };

    // ---- Ticket validation -------------------------------------------
    if phase.is_gated() {
        let supplied = tickets.len() as u64;
        if supplied < allocated {
            return Err(OpendropError::TicketShortfall {
                needed: allocated,
                supplied,
            });
        }
        // A ticket is not fungible across phases (or launches): any
        // mismatched ticket in the batch is a hard rejection, surplus
        // included.
        for ticket in tickets.iter() {
            if ticket.launch_id() != launch.id() {
                return Err(OpendropError::TicketLaunchMismatch {
                    ticket: ticket.id(),
                    bound: ticket.launch_id(),
                    target: launch.id(),
                });
            }
            if ticket.phase_id() != phase.id() {
                return Err(OpendropError::TicketPhaseMismatch {
                    ticket: ticket.id(),
                    bound: ticket.phase_id(),
                    target: phase.id(),
                });
            }
        }
    }

    // ---- Payment check -----------------------------------------------
    let unit_price = phase.unit_price(payment.kind())?;
    let required = unit_price * Decimal::from(allocated);
    if payment.value() < required {
        return Err(OpendropError::PaymentInsufficient {
            needed: required,
            available: payment.value(),
        });
    }

    // ---- Commit point ------------------------------------------------
    // Every precondition above has passed; nothing below can fail.
    let collected = payment.split(required)?;
    launch.deposit_revenue(collected);
    phase.record_mint(participant, allocated)?;

    if phase.is_gated() {
        tickets.drain(..usize::try_from(allocated).unwrap_or(tickets.len()));
        phase.record_redeemed(allocated)?;
    }

    let mut items = Vec::with_capacity(usize::try_from(allocated).unwrap_or(0));
    for _ in 0..allocated {
        let item = launch.draw_item(rng)?;
        deliver(&mut vault, launch.custody(), participant, item);
        emit_allocation(
            sink,
            launch,
            phase,
            participant,
            item,
            payment.kind(),
            unit_price,
            now,
        );
        items.push(item);
    }

    tracing::info!(
        launch = %launch.id(),
        phase = %phase.id(),
        participant = %participant,
        allocated,
        %required,
        "allocation committed"
    );

    Ok(MintOutcome {
        items,
        allocated,
        paid: required,
    })
}

fn deliver(
    vault: &mut Option<&mut dyn CustodyVault>,
    custody: CustodyRequirement,
    participant: ParticipantId,
    item: ItemId,
) {
    if let Some(vault) = vault.as_deref_mut() {
        match custody {
            CustodyRequirement::Place => vault.place(participant, item),
            CustodyRequirement::Lock => vault.lock(participant, item),
            // Unreachable: the entry points pair the vault argument with
            // the custody requirement before any draw.
            CustodyRequirement::None => {}
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn emit_allocation(
    sink: &dyn NotificationSink,
    launch: &Launch,
    phase: &Phase,
    participant: ParticipantId,
    item: ItemId,
    payment_kind: &str,
    unit_price: Decimal,
    now: DateTime<Utc>,
) {
    sink.emit(&AllocationEvent {
        allocation_id: AllocationId::deterministic(launch.id(), launch.minted()),
        launch_id: launch.id(),
        phase_id: phase.id(),
        item_id: item,
        participant,
        payment_kind: payment_kind.to_string(),
        unit_price,
        occurred_at: now,
    });
}

//! Error types for the OpenDrop allocation engine.
//!
//! All errors use the `OD_ERR_` prefix convention for easy grepping in logs.
//! Error codes are grouped by subsystem:
//! - 1xx: State violations
//! - 2xx: Authorization / obligation errors
//! - 3xx: Temporal / scheduling errors
//! - 4xx: Quota / supply errors
//! - 5xx: Payment errors
//! - 6xx: Ticket errors
//! - 7xx: Configuration errors
//! - 9xx: General / internal errors

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use thiserror::Error;

use crate::{
    CustodyRequirement, ItemId, LaunchId, LaunchState, ParticipantId, PhaseId, TicketId,
};

/// Central error enum for all OpenDrop operations.
///
/// Every failure is a synchronous abort with no side effects: an operation
/// either satisfies all of its preconditions or has no effect at all.
#[derive(Debug, Error)]
pub enum OpendropError {
    // =================================================================
    // State Violations (1xx)
    // =================================================================
    /// The launch is in the wrong lifecycle state for this operation.
    #[error("OD_ERR_100: Launch is {actual}, operation requires {expected}")]
    LaunchStateViolation {
        expected: LaunchState,
        actual: LaunchState,
    },

    /// The phase is in the wrong lifecycle state for this operation.
    #[error("OD_ERR_101: Phase state violation: {reason}")]
    PhaseStateViolation { reason: String },

    /// The launch was created but never published via its share obligation.
    #[error("OD_ERR_102: Launch not published: {0}")]
    LaunchNotPublished(LaunchId),

    /// The phase was created but never published via its register obligation.
    #[error("OD_ERR_103: Phase not published: {0}")]
    PhaseNotPublished(PhaseId),

    /// The launch's item pool is empty.
    #[error("OD_ERR_104: Item pool is empty")]
    PoolEmpty,

    /// The phase is not registered on the target launch.
    #[error("OD_ERR_105: Phase not registered: {0}")]
    PhaseNotRegistered(PhaseId),

    /// A phase with this ID is already registered on the launch.
    #[error("OD_ERR_106: Phase already registered: {0}")]
    PhaseAlreadyRegistered(PhaseId),

    /// An item with this ID is already in the pool.
    #[error("OD_ERR_107: Item already pooled: {0}")]
    DuplicateItem(ItemId),

    /// The phase belongs to a different launch than the one supplied.
    #[error("OD_ERR_108: Phase is bound to {bound}, target launch is {target}")]
    PhaseLaunchMismatch { bound: LaunchId, target: LaunchId },

    /// A whitelist-only operation was invoked on a public phase.
    #[error("OD_ERR_109: Phase is not whitelist-gated: {0}")]
    NotWhitelistPhase(PhaseId),

    /// Launch teardown preconditions are not met.
    #[error("OD_ERR_110: Teardown blocked: {reason}")]
    TeardownBlocked { reason: String },

    // =================================================================
    // Authorization / Obligation Errors (2xx)
    // =================================================================
    /// The capability's embedded target ID does not match the launch.
    #[error("OD_ERR_200: Capability is scoped to {held}, target is {target}")]
    CapabilityMismatch { held: LaunchId, target: LaunchId },

    /// The identity is not on the launch's operator allow-list.
    #[error("OD_ERR_201: Identity not on operator allow-list: {0}")]
    NotAllowlisted(ParticipantId),

    /// A share obligation was presented for the wrong launch.
    #[error("OD_ERR_202: Share obligation is for {held}, publishing {target}")]
    ShareObligationMismatch { held: LaunchId, target: LaunchId },

    /// A register obligation was presented for the wrong phase.
    #[error("OD_ERR_203: Register obligation is for {held}, publishing {target}")]
    RegisterObligationMismatch { held: PhaseId, target: PhaseId },

    /// The admin capability cannot be destroyed while revenue is unwithdrawn.
    #[error("OD_ERR_204: Revenue ledger has not been fully withdrawn")]
    RevenueNotWithdrawn,

    // =================================================================
    // Temporal Errors (3xx)
    // =================================================================
    /// A window's start time is not strictly in the future.
    #[error("OD_ERR_300: Start {start} is not in the future (now {now})")]
    StartNotFuture {
        start: DateTime<Utc>,
        now: DateTime<Utc>,
    },

    /// A window's end time is not strictly after its start.
    #[error("OD_ERR_301: End {end} is not after start {start}")]
    EndNotAfterStart {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },

    /// A reschedule targeted the identical range.
    #[error("OD_ERR_302: Reschedule must change the window")]
    UnchangedWindow,

    /// The requested window overlaps an already-registered phase.
    #[error("OD_ERR_303: Window overlaps scheduled phase {existing}")]
    WindowOverlap { existing: PhaseId },

    /// The phase's window is not currently open for minting.
    #[error("OD_ERR_304: Phase window not open: now {now}, window [{start}, {end})")]
    PhaseNotOpen {
        now: DateTime<Utc>,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },

    /// The window has already started; the operation is only legal before it.
    #[error("OD_ERR_305: Window already started at {start}")]
    WindowStarted { start: DateTime<Utc> },

    /// The window is currently open; the operation is only legal outside it.
    #[error("OD_ERR_306: Window [{start}, {end}] is currently open")]
    WindowOpen {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },

    /// The launch's schedule has not fully elapsed.
    #[error("OD_ERR_307: Schedule has not elapsed")]
    ScheduleNotElapsed,

    // =================================================================
    // Quota / Supply Errors (4xx)
    // =================================================================
    /// The participant's per-phase quota would be exceeded.
    #[error("OD_ERR_400: Participant quota exceeded: requested {requested}, remaining {remaining}")]
    ParticipantQuotaExceeded { requested: u64, remaining: u64 },

    /// The phase's total quota would be exceeded.
    #[error("OD_ERR_401: Phase quota exceeded: requested {requested}, remaining {remaining}")]
    PhaseQuotaExceeded { requested: u64, remaining: u64 },

    /// Adding supply would push the pool past the declared target.
    #[error("OD_ERR_402: Supply bound exceeded: pool would hold {would_hold}, target is {target}")]
    SupplyExceeded { would_hold: u64, target: u64 },

    /// Quota ordering invariant violated.
    #[error("OD_ERR_403: max_per_participant {per_participant} exceeds max_total {max_total}")]
    QuotaOrdering {
        per_participant: u64,
        max_total: u64,
    },

    /// The phase's quota exceeds the launch's declared supply.
    #[error("OD_ERR_404: Phase max_total {max_total} exceeds launch supply {supply}")]
    PhaseQuotaOverSupply { max_total: u64, supply: u64 },

    /// Bulk minting is disabled; the requested quantity must be exactly 1.
    #[error("OD_ERR_405: Bulk minting disabled, requested {requested}")]
    BulkMintDisabled { requested: u64 },

    /// The requested quantity is zero.
    #[error("OD_ERR_406: Quantity must be positive")]
    ZeroQuantity,

    /// The pool holds fewer items than the requested quantity.
    #[error("OD_ERR_407: Pool depleted: requested {requested}, available {available}")]
    PoolDepleted { requested: u64, available: u64 },

    // =================================================================
    // Payment Errors (5xx)
    // =================================================================
    /// The payment instrument's value is below the required amount.
    #[error("OD_ERR_500: Insufficient payment: need {needed}, instrument holds {available}")]
    PaymentInsufficient { needed: Decimal, available: Decimal },

    /// A split was requested for more than the instrument holds.
    #[error("OD_ERR_501: Split of {requested} exceeds instrument value {available}")]
    SplitExceedsValue {
        requested: Decimal,
        available: Decimal,
    },

    /// Two instruments of different payment kinds were combined.
    #[error("OD_ERR_502: Payment kind mismatch: expected {expected}, got {actual}")]
    PaymentKindMismatch { expected: String, actual: String },

    // =================================================================
    // Ticket Errors (6xx)
    // =================================================================
    /// A supplied ticket is bound to a different phase.
    #[error("OD_ERR_600: Ticket {ticket} is bound to {bound}, target phase is {target}")]
    TicketPhaseMismatch {
        ticket: TicketId,
        bound: PhaseId,
        target: PhaseId,
    },

    /// Fewer tickets were supplied than the requested quantity.
    #[error("OD_ERR_601: Not enough tickets: need {needed}, supplied {supplied}")]
    TicketShortfall { needed: u64, supplied: u64 },

    /// A supplied ticket is bound to a different launch.
    #[error("OD_ERR_602: Ticket {ticket} is bound to {bound}, target launch is {target}")]
    TicketLaunchMismatch {
        ticket: TicketId,
        bound: LaunchId,
        target: LaunchId,
    },

    /// One issuance call asked for more tickets than the batch bound.
    #[error("OD_ERR_603: Ticket batch too large: {requested} exceeds max {max}")]
    TicketBatchTooLarge { requested: u64, max: u64 },

    // =================================================================
    // Configuration Errors (7xx)
    // =================================================================
    /// The requested payment kind has no registered unit price.
    #[error("OD_ERR_700: Payment kind not registered: {kind}")]
    PaymentKindUnknown { kind: String },

    /// The phase's price registry is at capacity.
    #[error("OD_ERR_701: Price registry full (max {max})")]
    PriceRegistryFull { max: usize },

    /// The phase has no registered payment kinds.
    #[error("OD_ERR_702: Phase has no registered payment kinds")]
    NoPaymentKinds,

    /// The mint entry point does not match the launch's custody requirement.
    #[error("OD_ERR_703: Custody requirement mismatch: launch requires {required}")]
    CustodyMismatch { required: CustodyRequirement },

    /// A negative unit price was supplied.
    #[error("OD_ERR_704: Invalid unit price: {price}")]
    InvalidPrice { price: Decimal },

    /// A display field exceeds its configured length bound.
    #[error("OD_ERR_705: {what} too long: {len} exceeds max {max}")]
    TextTooLong {
        what: &'static str,
        len: usize,
        max: usize,
    },

    // =================================================================
    // General / Internal (9xx)
    // =================================================================
    /// Unrecoverable internal error.
    #[error("OD_ERR_900: Internal error: {0}")]
    Internal(String),
}

/// Crate-wide `Result` alias.
pub type Result<T> = std::result::Result<T, OpendropError>;

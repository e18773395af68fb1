//! # opendrop-phase
//!
//! The **Phase** aggregate: one admission-controlled time window over a
//! launch's pool.
//!
//! ## Flow
//!
//! ```text
//! Phase::create → set prices / quotas → publish (consumes the
//! RegisterObligation, registers on the launch) → schedule (inserts the
//! window into the launch's time-ordered registry) → minting via
//! opendrop-mint → destroy
//! ```
//!
//! A phase is logically owned by exactly one launch — by id, not by
//! embedding — and records its own participant ledger. The allocation
//! protocol never reaches into the counters directly; it goes through
//! [`Phase::record_mint`] and friends, which re-run the invariant checks.

pub mod obligation;
pub mod phase;

pub use obligation::RegisterObligation;
pub use phase::Phase;

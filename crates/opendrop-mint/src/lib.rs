//! # opendrop-mint
//!
//! The cross-cutting **allocation protocol** and whitelist ticket
//! issuance.
//!
//! ## Allocation flow
//!
//! ```text
//! mint / mint_into_vault
//!   → Launch gate (ACTIVE, pool non-empty)
//!   → Phase gate (window open, quota headroom)
//!   → quantity policy (strict reject / clamp)
//!   → ticket validation (count + per-ticket binding)
//!   → payment check (unit_price * quantity)
//!   ── commit point ──
//!   → split payment into the revenue ledger
//!   → burn exactly `quantity` tickets
//!   → draw uniformly from the shrinking pool, emit one event per item
//!   → deliver directly or through the custody vault
//! ```
//!
//! Every fallible check runs before the commit point, so a rejected call
//! leaves the pool, counters, ledgers, tickets, and payment untouched.

pub mod mint;
pub mod ticket;

pub use mint::{MintOutcome, mint, mint_into_vault};
pub use ticket::{WhitelistTicket, issue_bulk, issue_tickets};

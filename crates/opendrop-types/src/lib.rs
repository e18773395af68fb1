//! # opendrop-types
//!
//! Shared types, errors, and configuration for the **OpenDrop** allocation
//! engine.
//!
//! This crate is the leaf dependency of the workspace — every other crate
//! depends on it. It defines:
//!
//! - **Identifiers**: [`LaunchId`], [`PhaseId`], [`TicketId`], [`ItemId`], [`CapabilityId`], [`ParticipantId`], [`AllocationId`]
//! - **State machines**: [`LaunchState`], [`PhaseState`], [`PhaseKind`]
//! - **Interval model**: [`IntervalKey`] and the paired sorter [`sort_paired`]
//! - **Payment model**: [`PaymentInstrument`], [`PaymentKind`]
//! - **Collaborator contracts**: [`Clock`], [`RandomnessSource`], [`CustodyVault`], [`NotificationSink`]
//! - **Events**: [`AllocationEvent`]
//! - **Configuration**: [`PhasePolicies`], [`QuantityPolicy`], [`DestroyPolicy`], [`CustodyRequirement`]
//! - **Errors**: [`OpendropError`] with `OD_ERR_` prefix codes
//! - **Constants**: system-wide limits and defaults

pub mod config;
pub mod constants;
pub mod custody;
pub mod error;
pub mod event;
pub mod ids;
pub mod interval;
pub mod oracle;
pub mod payment;
pub mod state;

// Re-export all primary types at crate root for ergonomic imports:
//   use opendrop_types::{LaunchState, IntervalKey, PaymentInstrument, ...};

pub use config::*;
pub use custody::*;
pub use error::*;
pub use event::*;
pub use ids::*;
pub use interval::*;
pub use oracle::*;
pub use payment::*;
pub use state::*;

// Constants are accessed via `opendrop_types::constants::FOO`
// (not re-exported to avoid name collisions).

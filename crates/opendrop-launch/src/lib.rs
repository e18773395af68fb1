//! # opendrop-launch
//!
//! The **Launch** aggregate: the owning side of one distribution campaign.
//!
//! ## Architecture
//!
//! A launch exclusively owns:
//! 1. **Item pool**: the unallocated items, drawn from without replacement
//! 2. **Phase registry**: registered phase ids plus the time-ordered
//!    schedule (packed interval keys kept sorted by the paired sorter)
//! 3. **Revenue ledger**: accumulated value per payment kind
//! 4. **Operator allow-list**: identities that may request an
//!    [`OperatorCapability`] on demand
//!
//! ## Authorization
//!
//! Every mutating operation takes a capability token and verifies its
//! embedded launch id against the target before touching state. Creation
//! returns the launch together with its [`AdminCapability`], an initial
//! [`OperatorCapability`], and a [`ShareObligation`] that must be consumed
//! by [`Launch::publish`] before the launch is usable.

pub mod capability;
pub mod launch;

pub use capability::{AdminCapability, OperatorCapability, ShareObligation};
pub use launch::Launch;

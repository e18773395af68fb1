//! Custody requirement and the external vault contract.
//!
//! A launch declares at creation where awarded items must land: directly
//! with the participant, placed into their custody vault, or placed and
//! locked under the vault's transfer policy. The vault itself is an
//! external service; the core only routes items to it.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{ItemId, ParticipantId};

/// Where allocated items must be delivered. Fixed at launch creation; the
/// mint entry point used must match it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CustodyRequirement {
    /// Items transfer directly to the participant.
    #[default]
    None,
    /// Items are placed into the participant's vault.
    Place,
    /// Items are placed and locked under the vault's policy.
    Lock,
}

impl CustodyRequirement {
    /// Whether allocation must route through a vault.
    #[must_use]
    pub fn requires_vault(&self) -> bool {
        !matches!(self, Self::None)
    }
}

impl fmt::Display for CustodyRequirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => write!(f, "NONE"),
            Self::Place => write!(f, "PLACE"),
            Self::Lock => write!(f, "LOCK"),
        }
    }
}

/// External custody vault contract.
pub trait CustodyVault {
    /// Place an item into the participant's vault.
    fn place(&mut self, owner: ParticipantId, item: ItemId);

    /// Place an item and lock it under the vault's transfer policy.
    fn lock(&mut self, owner: ParticipantId, item: ItemId);
}

/// In-memory vault for tests. **Never use in production.**
#[cfg(any(test, feature = "test-helpers"))]
#[derive(Debug, Default)]
pub struct MemoryVault {
    placed: Vec<(ParticipantId, ItemId)>,
    locked: Vec<(ParticipantId, ItemId)>,
}

#[cfg(any(test, feature = "test-helpers"))]
impl MemoryVault {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Items placed (unlocked) so far.
    #[must_use]
    pub fn placed(&self) -> &[(ParticipantId, ItemId)] {
        &self.placed
    }

    /// Items placed and locked so far.
    #[must_use]
    pub fn locked(&self) -> &[(ParticipantId, ItemId)] {
        &self.locked
    }
}

#[cfg(any(test, feature = "test-helpers"))]
impl CustodyVault for MemoryVault {
    fn place(&mut self, owner: ParticipantId, item: ItemId) {
        self.placed.push((owner, item));
    }

    fn lock(&mut self, owner: ParticipantId, item: ItemId) {
        self.locked.push((owner, item));
    }
}

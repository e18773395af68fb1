//! The phase-side completion token.

use opendrop_types::PhaseId;

/// Completion token returned by [`Phase::create`](crate::Phase::create).
///
/// The phase cannot be scheduled or minted against until this obligation
/// is moved into [`Phase::publish`](crate::Phase::publish), which verifies
/// the embedded id, registers the phase on its launch, and consumes the
/// token. Not `Clone`; crate-private constructor.
#[derive(Debug)]
#[must_use = "a created phase must be published by consuming its obligation"]
pub struct RegisterObligation {
    phase_id: PhaseId,
}

impl RegisterObligation {
    pub(crate) fn new(phase_id: PhaseId) -> Self {
        Self { phase_id }
    }

    /// The phase this obligation belongs to.
    #[must_use]
    pub fn phase_id(&self) -> PhaseId {
        self.phase_id
    }
}

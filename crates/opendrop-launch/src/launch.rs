//! The Launch aggregate.
//!
//! Owns the item pool, the phase schedule registry, and the revenue ledger
//! for one distribution campaign. Every mutator authorizes its capability
//! argument first and validates every precondition before touching state,
//! so a failed call leaves the aggregate byte-for-byte unchanged.

use std::collections::{HashMap, HashSet};

use opendrop_types::{
    Clock, CustodyRequirement, IntervalKey, ItemId, LaunchId, LaunchState, OpendropError,
    ParticipantId, PaymentInstrument, PaymentKind, PhaseId, RandomnessSource, Result, to_millis,
};
use rust_decimal::Decimal;

use crate::capability::{AdminCapability, OperatorCapability, ShareObligation};

/// One distribution campaign: a fixed pool of items handed out across
/// scheduled phases.
#[derive(Debug)]
pub struct Launch {
    id: LaunchId,
    state: LaunchState,
    published: bool,
    target_supply: u64,
    /// Items allocated so far. Monotonic while the launch lives.
    minted: u64,
    /// Unallocated items. Swap-removed on draw, so order is not preserved.
    pool: Vec<ItemId>,
    /// Every phase registered (published) against this launch.
    phases: HashSet<PhaseId>,
    /// Scheduled windows, kept sorted: `schedule_phases[i]` owns
    /// `schedule_keys[i]`.
    schedule_keys: Vec<IntervalKey>,
    schedule_phases: Vec<PhaseId>,
    /// Accumulated deposits per payment kind.
    revenue: HashMap<PaymentKind, Decimal>,
    custody: CustodyRequirement,
    /// Identities that may request an operator capability on demand.
    operators: HashSet<ParticipantId>,
}

impl Launch {
    // =================================================================
    // Creation and publication
    // =================================================================

    /// Create a launch targeting `target_supply` items.
    ///
    /// Returns the launch together with its admin capability, an initial
    /// operator capability, and the share obligation that
    /// [`Launch::publish`] must consume before anything else is legal.
    ///
    /// # Errors
    /// Returns [`OpendropError::ZeroQuantity`] for a zero target supply.
    pub fn create(
        target_supply: u64,
        custody: CustodyRequirement,
    ) -> Result<(Self, AdminCapability, OperatorCapability, ShareObligation)> {
        if target_supply == 0 {
            return Err(OpendropError::ZeroQuantity);
        }
        let id = LaunchId::new();
        let launch = Self {
            id,
            state: LaunchState::Supplying,
            published: false,
            target_supply,
            minted: 0,
            pool: Vec::with_capacity(usize::try_from(target_supply).unwrap_or(0)),
            phases: HashSet::new(),
            schedule_keys: Vec::new(),
            schedule_phases: Vec::new(),
            revenue: HashMap::new(),
            custody,
            operators: HashSet::new(),
        };
        Ok((
            launch,
            AdminCapability::issue(id),
            OperatorCapability::issue(id),
            ShareObligation::new(id),
        ))
    }

    /// Consume the share obligation and make the launch usable.
    ///
    /// # Errors
    /// Returns [`OpendropError::ShareObligationMismatch`] if the obligation
    /// was issued for a different launch.
    pub fn publish(&mut self, obligation: ShareObligation) -> Result<()> {
        if obligation.launch_id() != self.id {
            return Err(OpendropError::ShareObligationMismatch {
                held: obligation.launch_id(),
                target: self.id,
            });
        }
        self.published = true;
        Ok(())
    }

    // =================================================================
    // Queries
    // =================================================================

    #[must_use]
    pub fn id(&self) -> LaunchId {
        self.id
    }

    #[must_use]
    pub fn state(&self) -> LaunchState {
        self.state
    }

    #[must_use]
    pub fn is_published(&self) -> bool {
        self.published
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.state.is_active()
    }

    #[must_use]
    pub fn custody(&self) -> CustodyRequirement {
        self.custody
    }

    #[must_use]
    pub fn target_supply(&self) -> u64 {
        self.target_supply
    }

    /// Items allocated so far.
    #[must_use]
    pub fn minted(&self) -> u64 {
        self.minted
    }

    /// Unallocated items remaining in the pool.
    #[must_use]
    pub fn pool_len(&self) -> u64 {
        self.pool.len() as u64
    }

    /// Accumulated revenue for one payment kind.
    #[must_use]
    pub fn revenue(&self, kind: &str) -> Decimal {
        self.revenue.get(kind).copied().unwrap_or(Decimal::ZERO)
    }

    /// Whether the revenue ledger holds nothing.
    #[must_use]
    pub fn revenue_is_empty(&self) -> bool {
        self.revenue.is_empty()
    }

    /// Number of registered phases.
    #[must_use]
    pub fn phase_count(&self) -> usize {
        self.phases.len()
    }

    #[must_use]
    pub fn has_phase(&self, phase_id: PhaseId) -> bool {
        self.phases.contains(&phase_id)
    }

    /// Scheduled phases in admission order (earliest window first).
    #[must_use]
    pub fn scheduled_order(&self) -> &[PhaseId] {
        &self.schedule_phases
    }

    /// The scheduled window of a phase, if any.
    #[must_use]
    pub fn window_of(&self, phase_id: PhaseId) -> Option<IntervalKey> {
        self.schedule_phases
            .iter()
            .position(|p| *p == phase_id)
            .map(|i| self.schedule_keys[i])
    }

    #[must_use]
    pub fn is_operator(&self, identity: ParticipantId) -> bool {
        self.operators.contains(&identity)
    }

    // =================================================================
    // Authorization
    // =================================================================

    /// Verify an admin capability targets this launch.
    ///
    /// # Errors
    /// Returns [`OpendropError::CapabilityMismatch`] on target mismatch.
    pub fn authorize_admin(&self, cap: &AdminCapability) -> Result<()> {
        if cap.launch_id() != self.id {
            return Err(OpendropError::CapabilityMismatch {
                held: cap.launch_id(),
                target: self.id,
            });
        }
        Ok(())
    }

    /// Verify an operator capability targets this launch.
    ///
    /// # Errors
    /// Returns [`OpendropError::CapabilityMismatch`] on target mismatch.
    pub fn authorize_operator(&self, cap: &OperatorCapability) -> Result<()> {
        if cap.launch_id() != self.id {
            return Err(OpendropError::CapabilityMismatch {
                held: cap.launch_id(),
                target: self.id,
            });
        }
        Ok(())
    }

    fn assert_published(&self) -> Result<()> {
        if !self.published {
            return Err(OpendropError::LaunchNotPublished(self.id));
        }
        Ok(())
    }

    fn assert_state(&self, expected: LaunchState) -> Result<()> {
        if self.state != expected {
            return Err(OpendropError::LaunchStateViolation {
                expected,
                actual: self.state,
            });
        }
        Ok(())
    }

    // =================================================================
    // Supply (SUPPLYING only)
    // =================================================================

    /// Add one item to the pool.
    pub fn add_item(&mut self, cap: &OperatorCapability, item: ItemId) -> Result<()> {
        self.assert_published()?;
        self.authorize_operator(cap)?;
        self.assert_state(LaunchState::Supplying)?;
        if self.pool_len() + 1 > self.target_supply {
            return Err(OpendropError::SupplyExceeded {
                would_hold: self.pool_len() + 1,
                target: self.target_supply,
            });
        }
        if self.pool.contains(&item) {
            return Err(OpendropError::DuplicateItem(item));
        }
        self.pool.push(item);
        Ok(())
    }

    /// Add a batch of items to the pool. All-or-nothing.
    pub fn add_items(&mut self, cap: &OperatorCapability, items: Vec<ItemId>) -> Result<()> {
        self.assert_published()?;
        self.authorize_operator(cap)?;
        self.assert_state(LaunchState::Supplying)?;
        let would_hold = self.pool_len() + items.len() as u64;
        if would_hold > self.target_supply {
            return Err(OpendropError::SupplyExceeded {
                would_hold,
                target: self.target_supply,
            });
        }
        for (i, item) in items.iter().enumerate() {
            if self.pool.contains(item) || items[..i].contains(item) {
                return Err(OpendropError::DuplicateItem(*item));
            }
        }
        self.pool.extend(items);
        Ok(())
    }

    /// Remove `count` items from the pool (most recently added first).
    pub fn remove_items(&mut self, cap: &OperatorCapability, count: u64) -> Result<Vec<ItemId>> {
        self.assert_published()?;
        self.authorize_operator(cap)?;
        self.assert_state(LaunchState::Supplying)?;
        if count > self.pool_len() {
            return Err(OpendropError::PoolDepleted {
                requested: count,
                available: self.pool_len(),
            });
        }
        let at = self.pool.len() - usize::try_from(count).unwrap_or(self.pool.len());
        Ok(self.pool.split_off(at))
    }

    // =================================================================
    // Lifecycle
    // =================================================================

    /// SUPPLYING → SCHEDULING. Requires the pool to hold exactly the
    /// target supply.
    pub fn begin_scheduling(&mut self, cap: &OperatorCapability) -> Result<()> {
        self.assert_published()?;
        self.authorize_operator(cap)?;
        self.assert_state(LaunchState::Supplying)?;
        if self.pool_len() != self.target_supply {
            return Err(OpendropError::SupplyExceeded {
                would_hold: self.pool_len(),
                target: self.target_supply,
            });
        }
        self.state = LaunchState::Scheduling;
        Ok(())
    }

    /// SCHEDULING → ACTIVE: open the launch for allocation.
    pub fn activate(&mut self, cap: &OperatorCapability) -> Result<()> {
        self.assert_published()?;
        self.authorize_operator(cap)?;
        self.assert_state(LaunchState::Scheduling)?;
        self.state = LaunchState::Active;
        tracing::info!(launch = %self.id, supply = self.target_supply, "launch activated");
        Ok(())
    }

    /// ACTIVE → PAUSED: freeze allocation, preserving the minted counter.
    pub fn pause(&mut self, cap: &OperatorCapability) -> Result<()> {
        self.assert_published()?;
        self.authorize_operator(cap)?;
        self.assert_state(LaunchState::Active)?;
        self.state = LaunchState::Paused;
        Ok(())
    }

    /// PAUSED → ACTIVE: resume allocation with the minted counter intact.
    pub fn resume(&mut self, cap: &OperatorCapability) -> Result<()> {
        self.assert_published()?;
        self.authorize_operator(cap)?;
        self.assert_state(LaunchState::Paused)?;
        self.state = LaunchState::Active;
        Ok(())
    }

    /// ACTIVE | PAUSED → COMPLETED. Legal once the pool is empty, or once
    /// every scheduled window has elapsed.
    pub fn complete(&mut self, cap: &OperatorCapability, clock: &dyn Clock) -> Result<()> {
        self.assert_published()?;
        self.authorize_operator(cap)?;
        if !matches!(self.state, LaunchState::Active | LaunchState::Paused) {
            return Err(OpendropError::LaunchStateViolation {
                expected: LaunchState::Active,
                actual: self.state,
            });
        }
        if !self.pool.is_empty() && !self.schedule_elapsed(clock) {
            return Err(OpendropError::ScheduleNotElapsed);
        }
        self.state = LaunchState::Completed;
        tracing::info!(
            launch = %self.id,
            minted = self.minted,
            remaining = self.pool.len(),
            "launch completed"
        );
        Ok(())
    }

    fn schedule_elapsed(&self, clock: &dyn Clock) -> bool {
        // Windows are pairwise disjoint, so the last (max-start) window
        // also carries the maximum end.
        match self.schedule_keys.last() {
            Some(last) => to_millis(clock.now()) >= last.end_ms(),
            None => false,
        }
    }

    /// Tear the launch down. Requires COMPLETED, every phase unregistered,
    /// and an empty pool and revenue ledger. Marks the admin capability's
    /// revenue flag so the token itself becomes destructible.
    pub fn destroy(self, admin: &mut AdminCapability) -> Result<()> {
        self.authorize_admin(admin)?;
        self.assert_state(LaunchState::Completed)?;
        if !self.phases.is_empty() {
            return Err(OpendropError::TeardownBlocked {
                reason: format!("{} phase(s) still registered", self.phases.len()),
            });
        }
        if !self.pool.is_empty() {
            return Err(OpendropError::TeardownBlocked {
                reason: format!("pool still holds {} item(s)", self.pool.len()),
            });
        }
        if !self.revenue.is_empty() {
            return Err(OpendropError::TeardownBlocked {
                reason: "revenue ledger not empty".to_string(),
            });
        }
        admin.mark_revenue_withdrawn();
        Ok(())
    }

    // =================================================================
    // Operator allow-list
    // =================================================================

    /// Grant an identity the right to request operator capabilities.
    pub fn grant_operator(
        &mut self,
        admin: &AdminCapability,
        identity: ParticipantId,
    ) -> Result<()> {
        self.assert_published()?;
        self.authorize_admin(admin)?;
        self.operators.insert(identity);
        Ok(())
    }

    /// Revoke an identity's grant. Returns whether it was present.
    /// Capabilities already issued to the identity remain valid — a grant
    /// gates issuance, not use.
    pub fn revoke_operator(
        &mut self,
        admin: &AdminCapability,
        identity: ParticipantId,
    ) -> Result<bool> {
        self.assert_published()?;
        self.authorize_admin(admin)?;
        Ok(self.operators.remove(&identity))
    }

    /// Issue an operator capability to an allow-listed identity.
    ///
    /// # Errors
    /// Returns [`OpendropError::NotAllowlisted`] for unknown identities.
    pub fn request_operator(&self, identity: ParticipantId) -> Result<OperatorCapability> {
        self.assert_published()?;
        if !self.operators.contains(&identity) {
            return Err(OpendropError::NotAllowlisted(identity));
        }
        Ok(OperatorCapability::issue(self.id))
    }

    // =================================================================
    // Revenue ledger
    // =================================================================

    /// Absorb a payment into the revenue ledger under its kind.
    ///
    /// Only the allocation protocol deposits here; the instrument has
    /// already been split to exactly the owed amount.
    pub fn deposit_revenue(&mut self, instrument: PaymentInstrument) {
        *self
            .revenue
            .entry(instrument.kind().to_string())
            .or_insert(Decimal::ZERO) += instrument.value();
    }

    /// Withdraw the full accumulated value of one payment kind.
    ///
    /// Once the ledger drains to empty the admin capability's revenue flag
    /// is set, making the token destructible.
    pub fn withdraw_revenue(
        &mut self,
        admin: &mut AdminCapability,
        kind: &str,
    ) -> Result<PaymentInstrument> {
        self.authorize_admin(admin)?;
        let value = self
            .revenue
            .remove(kind)
            .ok_or_else(|| OpendropError::PaymentKindUnknown {
                kind: kind.to_string(),
            })?;
        if self.revenue.is_empty() {
            admin.mark_revenue_withdrawn();
        }
        tracing::info!(launch = %self.id, kind, %value, "revenue withdrawn");
        Ok(PaymentInstrument::new(kind, value))
    }

    // =================================================================
    // Phase registry
    // =================================================================

    /// Register a phase id against this launch. Called by the phase's
    /// publish step; legal while the launch is SCHEDULING or ACTIVE.
    pub fn register_phase(&mut self, cap: &OperatorCapability, phase_id: PhaseId) -> Result<()> {
        self.assert_published()?;
        self.authorize_operator(cap)?;
        if !matches!(self.state, LaunchState::Scheduling | LaunchState::Active) {
            return Err(OpendropError::LaunchStateViolation {
                expected: LaunchState::Scheduling,
                actual: self.state,
            });
        }
        if !self.phases.insert(phase_id) {
            return Err(OpendropError::PhaseAlreadyRegistered(phase_id));
        }
        Ok(())
    }

    /// Remove a phase (and its window, if scheduled) from the registry.
    pub fn unregister_phase(&mut self, phase_id: PhaseId) -> Result<()> {
        if !self.phases.remove(&phase_id) {
            return Err(OpendropError::PhaseNotRegistered(phase_id));
        }
        if let Some(i) = self.schedule_phases.iter().position(|p| *p == phase_id) {
            self.schedule_keys.remove(i);
            self.schedule_phases.remove(i);
        }
        Ok(())
    }

    /// Insert a phase's window into the time-ordered registry, validating
    /// pairwise disjointness against every other scheduled phase.
    pub fn register_window(&mut self, phase_id: PhaseId, key: IntervalKey) -> Result<()> {
        if !self.phases.contains(&phase_id) {
            return Err(OpendropError::PhaseNotRegistered(phase_id));
        }
        if self.schedule_phases.contains(&phase_id) {
            return Err(OpendropError::Internal(format!(
                "window already registered for {phase_id}"
            )));
        }
        self.check_disjoint(key, None)?;
        self.schedule_keys.push(key);
        self.schedule_phases.push(phase_id);
        self.resort_schedule();
        Ok(())
    }

    /// Replace a phase's window, re-validating disjointness against every
    /// other scheduled phase.
    pub fn reschedule_window(&mut self, phase_id: PhaseId, key: IntervalKey) -> Result<()> {
        let Some(i) = self.schedule_phases.iter().position(|p| *p == phase_id) else {
            return Err(OpendropError::PhaseNotRegistered(phase_id));
        };
        self.check_disjoint(key, Some(phase_id))?;
        self.schedule_keys[i] = key;
        self.resort_schedule();
        Ok(())
    }

    fn check_disjoint(&self, key: IntervalKey, exempt: Option<PhaseId>) -> Result<()> {
        for (other_key, other_phase) in self.schedule_keys.iter().zip(&self.schedule_phases) {
            if Some(*other_phase) == exempt {
                continue;
            }
            if key.overlaps(*other_key) {
                return Err(OpendropError::WindowOverlap {
                    existing: *other_phase,
                });
            }
        }
        Ok(())
    }

    fn resort_schedule(&mut self) {
        opendrop_types::sort_paired(&mut self.schedule_keys, &mut self.schedule_phases);
    }

    // =================================================================
    // Allocation-facing
    // =================================================================

    /// Gate for the allocation protocol: published, ACTIVE, non-empty pool.
    pub fn assert_mintable(&self) -> Result<()> {
        self.assert_published()?;
        if !self.state.is_active() {
            return Err(OpendropError::LaunchStateViolation {
                expected: LaunchState::Active,
                actual: self.state,
            });
        }
        if self.pool.is_empty() {
            return Err(OpendropError::PoolEmpty);
        }
        Ok(())
    }

    /// Draw one item uniformly at random from the current pool.
    ///
    /// Swap-remove keeps the draw O(1); order inside the pool is
    /// irrelevant because every draw is uniform over what remains.
    pub fn draw_item(&mut self, rng: &mut dyn RandomnessSource) -> Result<ItemId> {
        if !self.state.is_active() {
            return Err(OpendropError::LaunchStateViolation {
                expected: LaunchState::Active,
                actual: self.state,
            });
        }
        if self.pool.is_empty() {
            return Err(OpendropError::PoolEmpty);
        }
        let index = rng.uniform(self.pool.len());
        let item = self.pool.swap_remove(index);
        self.minted += 1;
        Ok(item)
    }
}

//! Allocation events and the fire-and-forget notification sink.
//!
//! The core emits one [`AllocationEvent`] per allocated item. The sink is
//! an external collaborator: no acknowledgment, no error channel, never
//! blocks the core.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{AllocationId, ItemId, LaunchId, ParticipantId, PaymentKind, PhaseId};

/// Record of one item leaving the pool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllocationEvent {
    /// Deterministic per-draw identifier (dedupe key for consumers).
    pub allocation_id: AllocationId,
    /// The launch that owned the item.
    pub launch_id: LaunchId,
    /// The phase the allocation was admitted through.
    pub phase_id: PhaseId,
    /// The item assigned.
    pub item_id: ItemId,
    /// Who received it.
    pub participant: ParticipantId,
    /// The payment kind settled against.
    pub payment_kind: PaymentKind,
    /// The unit price charged.
    pub unit_price: Decimal,
    /// When the allocation was committed.
    pub occurred_at: DateTime<Utc>,
}

/// Fire-and-forget event publication.
pub trait NotificationSink {
    /// Publish an event. Must not block and must not fail the caller.
    fn emit(&self, event: &AllocationEvent);
}

/// Sink that discards every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl NotificationSink for NullSink {
    fn emit(&self, _event: &AllocationEvent) {}
}

/// Sink that records events for assertions. **Never use in production.**
#[cfg(any(test, feature = "test-helpers"))]
#[derive(Debug, Default)]
pub struct RecordingSink {
    events: std::cell::RefCell<Vec<AllocationEvent>>,
}

#[cfg(any(test, feature = "test-helpers"))]
impl RecordingSink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything emitted so far.
    #[must_use]
    pub fn events(&self) -> Vec<AllocationEvent> {
        self.events.borrow().clone()
    }

    /// Number of events emitted.
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.borrow().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.borrow().is_empty()
    }
}

#[cfg(any(test, feature = "test-helpers"))]
impl NotificationSink for RecordingSink {
    fn emit(&self, event: &AllocationEvent) {
        self.events.borrow_mut().push(event.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_event() -> AllocationEvent {
        AllocationEvent {
            allocation_id: AllocationId::new(),
            launch_id: LaunchId::new(),
            phase_id: PhaseId::new(),
            item_id: ItemId::new(),
            participant: ParticipantId::dummy(1),
            payment_kind: "USDC".to_string(),
            unit_price: Decimal::ONE,
            occurred_at: Utc::now(),
        }
    }

    #[test]
    fn null_sink_swallows_events() {
        let sink = NullSink;
        sink.emit(&make_event());
    }

    #[test]
    fn recording_sink_captures_in_order() {
        let sink = RecordingSink::new();
        assert!(sink.is_empty());
        let a = make_event();
        let b = make_event();
        sink.emit(&a);
        sink.emit(&b);
        assert_eq!(sink.len(), 2);
        let events = sink.events();
        assert_eq!(events[0], a);
        assert_eq!(events[1], b);
    }

    #[test]
    fn event_serde_roundtrip() {
        let event = make_event();
        let json = serde_json::to_string(&event).unwrap();
        let back: AllocationEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(event, back);
    }
}

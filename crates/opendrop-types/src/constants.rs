//! System-wide constants for the OpenDrop allocation engine.

/// Maximum number of payment kinds registrable on a single phase.
pub const MAX_PAYMENT_KINDS: usize = 50;

/// Maximum length of a phase's display name.
pub const MAX_NAME_LEN: usize = 128;

/// Maximum length of a phase's description.
pub const MAX_DESCRIPTION_LEN: usize = 1024;

/// Maximum tickets mintable in one issuance call (anti-fat-finger bound).
pub const MAX_TICKETS_PER_ISSUE: u64 = 10_000;

/// Default per-participant quota when none is configured.
pub const DEFAULT_MAX_PER_PARTICIPANT: u64 = 1;

/// Version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Engine name.
pub const ENGINE_NAME: &str = "OpenDrop";

//! Injected oracles: the time source and the randomness source.
//!
//! The core never reads the wall clock or an RNG directly. Both are
//! synchronous injected dependencies so the host substrate controls them
//! and tests can script them.

use chrono::{DateTime, Utc};

/// Monotonic, read-only time source.
pub trait Clock {
    /// The current time.
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time source for production use.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Unbiased randomness source, unpredictable to participants at call time.
pub trait RandomnessSource {
    /// A uniform draw from `0..bound`.
    ///
    /// `bound` is always positive — callers check for an empty population
    /// before drawing.
    fn uniform(&mut self, bound: usize) -> usize;
}

/// Thread-RNG randomness for production use.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadRandomness;

impl RandomnessSource for ThreadRandomness {
    fn uniform(&mut self, bound: usize) -> usize {
        use rand::Rng;
        rand::thread_rng().gen_range(0..bound)
    }
}

// ---------------------------------------------------------------------------
// Test oracles. **Never use in production.**
// ---------------------------------------------------------------------------

/// Manually-advanced clock for tests.
#[cfg(any(test, feature = "test-helpers"))]
#[derive(Debug)]
pub struct ManualClock {
    now: std::cell::Cell<DateTime<Utc>>,
}

#[cfg(any(test, feature = "test-helpers"))]
impl ManualClock {
    /// Start the clock at `now`.
    #[must_use]
    pub fn starting_at(now: DateTime<Utc>) -> Self {
        Self {
            now: std::cell::Cell::new(now),
        }
    }

    /// Move the clock forward.
    pub fn advance(&self, by: chrono::Duration) {
        self.now.set(self.now.get() + by);
    }

    /// Jump the clock to an absolute time.
    pub fn set(&self, to: DateTime<Utc>) {
        self.now.set(to);
    }
}

#[cfg(any(test, feature = "test-helpers"))]
impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        self.now.get()
    }
}

/// Scripted randomness for tests: replays a fixed sequence of draws,
/// reduced modulo the requested bound, then repeats the last entry.
#[cfg(any(test, feature = "test-helpers"))]
#[derive(Debug)]
pub struct ScriptedRandomness {
    draws: Vec<usize>,
    cursor: usize,
}

#[cfg(any(test, feature = "test-helpers"))]
impl ScriptedRandomness {
    /// Script the given draws. An empty script always draws 0.
    #[must_use]
    pub fn new(draws: Vec<usize>) -> Self {
        Self { draws, cursor: 0 }
    }
}

#[cfg(any(test, feature = "test-helpers"))]
impl RandomnessSource for ScriptedRandomness {
    fn uniform(&mut self, bound: usize) -> usize {
        let raw = self.draws.get(self.cursor).copied().unwrap_or(0);
        if self.cursor + 1 < self.draws.len() {
            self.cursor += 1;
        }
        raw % bound
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn system_clock_advances() {
        let clock = SystemClock;
        let a = clock.now();
        let b = clock.now();
        assert!(b >= a);
    }

    #[test]
    fn thread_randomness_respects_bound() {
        let mut rng = ThreadRandomness;
        for bound in 1..=64 {
            let draw = rng.uniform(bound);
            assert!(draw < bound);
        }
    }

    #[test]
    fn manual_clock_is_scriptable() {
        let clock = ManualClock::starting_at(Utc::now());
        let t0 = clock.now();
        clock.advance(chrono::Duration::hours(3));
        assert_eq!(clock.now(), t0 + chrono::Duration::hours(3));
    }

    #[test]
    fn scripted_randomness_replays_then_repeats() {
        let mut rng = ScriptedRandomness::new(vec![5, 1]);
        assert_eq!(rng.uniform(10), 5);
        assert_eq!(rng.uniform(10), 1);
        assert_eq!(rng.uniform(10), 1, "last entry repeats");
        assert_eq!(rng.uniform(1), 0, "reduced modulo the bound");
    }
}

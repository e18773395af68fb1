//! Interval codec and paired sorter for the phase schedule registry.
//!
//! A scheduled window `(start, end)` is packed into one 128-bit key whose
//! `Ord` is exactly lexicographic `(start, end)` order, so a launch can keep
//! its registry sorted by comparing keys alone. The paired sorter reorders a
//! key array and a parallel phase-id array in lock-step, keeping each key
//! attached to its owning id.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A `(start, end)` window packed into one sortable key.
///
/// High 64 bits: start, low 64 bits: end, both in milliseconds since the
/// UNIX epoch. Windows are half-open for admission (`[start, end)`) but the
/// disjointness predicate treats them as closed-open pairs:
/// `a` and `b` are disjoint iff `a.end <= b.start || a.start >= b.end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct IntervalKey(pub u128);

impl IntervalKey {
    /// Pack a start/end millisecond pair.
    #[must_use]
    pub fn pack(start_ms: u64, end_ms: u64) -> Self {
        Self((u128::from(start_ms) << 64) | u128::from(end_ms))
    }

    /// Pack a chrono window. Pre-epoch timestamps clamp to zero.
    #[must_use]
    pub fn from_window(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self::pack(to_millis(start), to_millis(end))
    }

    /// The window's start, in milliseconds since the UNIX epoch.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn start_ms(self) -> u64 {
        (self.0 >> 64) as u64
    }

    /// The window's end, in milliseconds since the UNIX epoch.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn end_ms(self) -> u64 {
        self.0 as u64
    }

    /// Pairwise interval disjointness.
    #[must_use]
    pub fn disjoint(self, other: Self) -> bool {
        self.end_ms() <= other.start_ms() || self.start_ms() >= other.end_ms()
    }

    /// Inverse of [`IntervalKey::disjoint`].
    #[must_use]
    pub fn overlaps(self, other: Self) -> bool {
        !self.disjoint(other)
    }
}

/// Convert a timestamp to milliseconds since the UNIX epoch, clamping
/// pre-epoch values to zero.
#[must_use]
#[allow(clippy::cast_sign_loss)]
pub fn to_millis(ts: DateTime<Utc>) -> u64 {
    ts.timestamp_millis().max(0) as u64
}

// ---------------------------------------------------------------------------
// Paired sorter
// ---------------------------------------------------------------------------

/// Sort `keys` ascending while mirroring every swap into `vals`, so
/// `vals[i]` stays attached to `keys[i]` throughout.
///
/// Lomuto-partition quicksort with standard two-sided recursion. The
/// registry this serves is small (one entry per scheduled phase), so the
/// worst case on pre-sorted input is irrelevant in practice.
///
/// # Panics
/// Panics if the slices differ in length.
pub fn sort_paired<K: Ord + Copy, V: Copy>(keys: &mut [K], vals: &mut [V]) {
    assert_eq!(
        keys.len(),
        vals.len(),
        "paired sort requires equal-length arrays"
    );
    if keys.len() > 1 {
        quicksort(keys, vals, 0, keys.len() - 1);
    }
}

fn quicksort<K: Ord + Copy, V: Copy>(keys: &mut [K], vals: &mut [V], lo: usize, hi: usize) {
    if lo >= hi {
        return;
    }
    let p = partition(keys, vals, lo, hi);
    if p > lo {
        quicksort(keys, vals, lo, p - 1);
    }
    if p < hi {
        quicksort(keys, vals, p + 1, hi);
    }
}

/// Lomuto partition around `keys[hi]`; every swap is mirrored into `vals`.
fn partition<K: Ord + Copy, V: Copy>(keys: &mut [K], vals: &mut [V], lo: usize, hi: usize) -> usize {
    let pivot = keys[hi];
    let mut i = lo;
    for j in lo..hi {
        if keys[j] <= pivot {
            keys.swap(i, j);
            vals.swap(i, j);
            i += 1;
        }
    }
    keys.swap(i, hi);
    vals.swap(i, hi);
    i
}

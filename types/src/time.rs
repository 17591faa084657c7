//! Header-time arithmetic for slot assignment and idle tracking.
//!
//! The governance core reads time from two places: block header timestamps
//! (which pin the producer's slot and drive idle detection) and, once at
//! startup, the wall clock (to seed last-active entries). Everything is
//! whole unix seconds; slot math divides by the slot width and idle checks
//! subtract last-seen times, so no finer resolution is needed.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

/// A block-header or wall-clock time, in unix seconds (UTC).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Timestamp(u64);

impl Timestamp {
    pub fn from_secs(secs: u64) -> Self {
        Self(secs)
    }

    pub fn as_secs(&self) -> u64 {
        self.0
    }

    /// Index of the production slot this time falls in, for slots
    /// `slot_width_secs` wide. `None` when the width is zero.
    pub fn slot(&self, slot_width_secs: u64) -> Option<u64> {
        if slot_width_secs == 0 {
            return None;
        }
        Some(self.0 / slot_width_secs)
    }

    /// Seconds elapsed since `earlier`. Saturates to zero when `earlier` is
    /// ahead of this time, so skewed member clocks never underflow an idle
    /// measurement.
    pub fn since(&self, earlier: Timestamp) -> u64 {
        self.0.saturating_sub(earlier.0)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unix:{}", self.0)
    }
}

/// Source of "now" for components that read the wall clock.
///
/// Production code uses [`SystemClock`]; tests use the nullable clock so
/// idle-detection behaviour is deterministic.
pub trait Clock: Send + Sync {
    fn now(&self) -> Timestamp;
}

/// The real system clock.
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        let secs = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system clock before Unix epoch")
            .as_secs();
        Timestamp::from_secs(secs)
    }
}

//! Microsecond-precision timestamp type
//!
//! Timestamps are stored as microseconds relative to the Unix epoch
//! (1970-01-01 00:00:00 UTC). The count is signed so dates before the
//! epoch remain representable; applications store arbitrary calendar
//! dates in mixed fields, not just event times.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

/// Microsecond-precision point in time
///
/// ## Invariants
///
/// - Always in microseconds
/// - Comparable and orderable
/// - The zero timestamp is the Unix epoch
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Timestamp(i64);

impl Timestamp {
    /// Unix epoch (1970-01-01 00:00:00 UTC)
    pub const EPOCH: Timestamp = Timestamp(0);

    /// Maximum representable timestamp
    pub const MAX: Timestamp = Timestamp(i64::MAX);

    /// Minimum representable timestamp
    pub const MIN: Timestamp = Timestamp(i64::MIN);

    /// Create a timestamp for the current moment
    pub fn now() -> Self {
        match SystemTime::now().duration_since(UNIX_EPOCH) {
            Ok(after) => Timestamp(after.as_micros() as i64),
            Err(before) => Timestamp(-(before.duration().as_micros() as i64)),
        }
    }

    /// Create a timestamp from microseconds since epoch
    pub const fn from_micros(micros: i64) -> Self {
        Timestamp(micros)
    }

    /// Create a timestamp from milliseconds since epoch
    pub const fn from_millis(millis: i64) -> Self {
        Timestamp(millis * 1_000)
    }

    /// Create a timestamp from seconds since epoch
    pub const fn from_secs(secs: i64) -> Self {
        Timestamp(secs * 1_000_000)
    }

    /// Microseconds since epoch
    pub const fn as_micros(self) -> i64 {
        self.0
    }

    /// Milliseconds since epoch (truncating)
    pub const fn as_millis(self) -> i64 {
        self.0 / 1_000
    }

    /// Seconds since epoch (truncating)
    pub const fn as_secs(self) -> i64 {
        self.0 / 1_000_000
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}us", self.0)
    }
}

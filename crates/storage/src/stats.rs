//! Pack-construction counters
//!
//! Packing a value is the one non-trivial storage operation the value
//! layer triggers, and callers memoize it. This module keeps a
//! process-global count of pack constructions so tests can assert the
//! construct-at-most-once guarantee. Decoding an existing encoding does
//! not count; only producing a new packed representation does.

use std::sync::atomic::{AtomicU64, Ordering};

static PACKS: AtomicU64 = AtomicU64::new(0);

/// Number of pack constructions performed by this process
pub fn packs_performed() -> u64 {
    PACKS.load(Ordering::Relaxed)
}

pub(crate) fn record_pack() {
    PACKS.fetch_add(1, Ordering::Relaxed);
}

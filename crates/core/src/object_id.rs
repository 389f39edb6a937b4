//! 12-byte ordered object identifier
//!
//! Identifiers sort by creation time: a 4-byte big-endian seconds
//! timestamp, 5 bytes of per-process entropy, and a 3-byte big-endian
//! counter seeded randomly at startup. Two identifiers generated by the
//! same process in the same second still differ through the counter.

use crate::timestamp::Timestamp;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicU32, Ordering};
use thiserror::Error;

static PROCESS_ENTROPY: Lazy<[u8; 5]> = Lazy::new(rand::random);
static COUNTER: Lazy<AtomicU32> = Lazy::new(|| AtomicU32::new(rand::random::<u32>()));

/// Error parsing an ObjectId from its hex representation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid ObjectId hex string: {reason}")]
pub struct ObjectIdParseError {
    /// What made the input invalid
    pub reason: &'static str,
}

/// 12-byte ordered object identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ObjectId([u8; 12]);

impl ObjectId {
    /// Generate a new identifier for the current moment
    pub fn new() -> Self {
        Self::with_timestamp(Timestamp::now())
    }

    /// Generate a new identifier carrying the given creation time
    pub fn with_timestamp(ts: Timestamp) -> Self {
        let seconds = ts.as_secs().clamp(0, u32::MAX as i64) as u32;
        let count = COUNTER.fetch_add(1, Ordering::Relaxed);

        let mut bytes = [0u8; 12];
        bytes[0..4].copy_from_slice(&seconds.to_be_bytes());
        bytes[4..9].copy_from_slice(&*PROCESS_ENTROPY);
        bytes[9..12].copy_from_slice(&count.to_be_bytes()[1..4]);
        ObjectId(bytes)
    }

    /// Create from raw bytes
    pub const fn from_bytes(bytes: [u8; 12]) -> Self {
        ObjectId(bytes)
    }

    /// The raw bytes
    pub const fn bytes(&self) -> [u8; 12] {
        self.0
    }

    /// The embedded creation time, at second precision
    pub fn timestamp(&self) -> Timestamp {
        let seconds = u32::from_be_bytes([self.0[0], self.0[1], self.0[2], self.0[3]]);
        Timestamp::from_secs(seconds as i64)
    }

    /// Parse from a 24-character lowercase or uppercase hex string
    pub fn from_hex(hex: &str) -> Result<Self, ObjectIdParseError> {
        if hex.len() != 24 {
            return Err(ObjectIdParseError {
                reason: "expected 24 hex characters",
            });
        }
        let mut bytes = [0u8; 12];
        for (i, chunk) in hex.as_bytes().chunks(2).enumerate() {
            let pair = std::str::from_utf8(chunk).map_err(|_| ObjectIdParseError {
                reason: "non-ASCII input",
            })?;
            bytes[i] = u8::from_str_radix(pair, 16).map_err(|_| ObjectIdParseError {
                reason: "non-hex character",
            })?;
        }
        Ok(ObjectId(bytes))
    }

    /// Render as a 24-character lowercase hex string
    pub fn to_hex(&self) -> String {
        let mut out = String::with_capacity(24);
        for byte in self.0 {
            out.push_str(&format!("{byte:02x}"));
        }
        out
    }
}

impl Default for ObjectId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

//! Addressing newtypes for the Loam object database
//!
//! This module defines the identifiers used to address stored data:
//! - TableKey: Engine-assigned key of a table
//! - RowKey: Key of a row within its owning table
//! - SessionId: Identity of a live session instance

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Engine-assigned key of a table
///
/// Table keys are stable for the lifetime of a session and are the unit
/// an object link is addressed by on the storage side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TableKey(u32);

impl TableKey {
    /// Create a table key from its raw value
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    /// Get the raw value
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl fmt::Display for TableKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "table#{}", self.0)
    }
}

/// Key of a row within its owning table
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RowKey(u64);

impl RowKey {
    /// Create a row key from its raw value
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Get the raw value
    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for RowKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "row#{}", self.0)
    }
}

/// Identity of a live session instance
///
/// Two sessions are the same session if and only if their ids are equal;
/// object references are only valid within the session that produced them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(Uuid);

impl SessionId {
    /// Create a new random SessionId using UUID v4
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Get the raw bytes of this SessionId
    pub fn as_bytes(&self) -> &[u8; 16] {
        self.0.as_bytes()
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_key_roundtrip() {
        let key = TableKey::new(7);
        assert_eq!(key.raw(), 7);
        assert_eq!(key, TableKey::new(7));
        assert_ne!(key, TableKey::new(8));
    }

    #[test]
    fn test_row_key_ordering() {
        assert!(RowKey::new(1) < RowKey::new(2));
        assert_eq!(RowKey::new(42).raw(), 42);
    }

    #[test]
    fn test_session_id_unique() {
        let a = SessionId::new();
        let b = SessionId::new();
        assert_ne!(a, b);
    }

    #[test]
    fn test_display() {
        assert_eq!(TableKey::new(3).to_string(), "table#3");
        assert_eq!(RowKey::new(9).to_string(), "row#9");
    }
}

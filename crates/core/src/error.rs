//! Error types for the Loam object database
//!
//! This module defines all error types used throughout the system.
//! We use `thiserror` for automatic `Display` and `Error` trait
//! implementations.
//!
//! Construction from a well-formed packed value never fails; errors are
//! deferred to the operation that cannot proceed (decode, value
//! retrieval, reference validation) and reported synchronously. Nothing
//! here is transient, so nothing is retried.

use crate::kind::MixedKind;
use crate::types::RowKey;
use thiserror::Error;

/// Result type alias for Loam operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for the Loam object database
#[derive(Debug, Error)]
pub enum Error {
    /// A packed value reported a tag outside the closed kind set.
    /// Indicates a version mismatch between the value layer and the
    /// storage layer; not recoverable.
    #[error("unrecognized value tag {tag:#04x}")]
    UnrecognizedTag {
        /// The offending tag byte
        tag: u8,
    },

    /// A caller requested a payload type incompatible with the stored kind
    #[error("type mismatch: requested {requested:?} from a {stored:?} value")]
    TypeMismatch {
        /// Kind the caller asked for
        requested: MixedKind,
        /// Kind actually stored
        stored: MixedKind,
    },

    /// An object reference points at a deleted row or a never-persisted
    /// instance
    #[error("invalid object reference: {0}")]
    InvalidReference(String),

    /// An object reference belongs to a different session than the one
    /// validating it
    #[error("object belongs to a different session")]
    CrossSession,

    /// No model class is registered for a table; recoverable by dynamic
    /// resolution
    #[error("no model class registered for table {table:?}")]
    ClassNotFound {
        /// Internal table name that missed
        table: String,
    },

    /// Table lookup failed, by key or by class name
    #[error("table not found: {0}")]
    TableNotFound(String),

    /// Row lookup failed
    #[error("row not found: {row} in table {table:?}")]
    RowNotFound {
        /// Internal name of the owning table
        table: String,
        /// Missing row
        row: RowKey,
    },

    /// Field lookup failed
    #[error("field not found: {0:?}")]
    FieldNotFound(String),

    /// Packed payload is structurally malformed (wrong length, invalid UTF-8)
    #[error("malformed value encoding: {0}")]
    Corruption(String),

    /// Invalid operation or state
    #[error("invalid operation: {0}")]
    InvalidOperation(String),
}

//! Core types for the Loam object database
//!
//! This crate defines the foundational types used throughout the system:
//! - MixedKind: Closed tag set for dynamically-typed field values
//! - TableKey / RowKey / SessionId: Addressing newtypes
//! - Timestamp: Microsecond-precision point in time
//! - Decimal128: High-precision decimal payload
//! - ObjectId: 12-byte ordered object identifier
//! - Error: Error type hierarchy

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod decimal;
pub mod error;
pub mod kind;
pub mod object_id;
pub mod timestamp;
pub mod types;

pub use decimal::Decimal128;
pub use error::{Error, Result};
pub use kind::MixedKind;
pub use object_id::{ObjectId, ObjectIdParseError};
pub use timestamp::Timestamp;
pub use types::{RowKey, SessionId, TableKey};

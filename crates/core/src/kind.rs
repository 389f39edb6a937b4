//! Kind tags for dynamically-typed field values
//!
//! A mixed field stores exactly one payload at a time, discriminated by
//! a `MixedKind` tag. The tag set is closed: the storage layer and the
//! value layer agree on these twelve kinds and nothing else. A packed
//! value reporting any other tag is a contract violation between the
//! two layers, not a recoverable condition.

use serde::{Deserialize, Serialize};

/// Closed set of kinds a mixed field value can hold
///
/// The kind of a value is fixed at construction and never changes.
/// Integral payloads of any width normalize to `Int`; absence of a
/// value normalizes to `Null`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MixedKind {
    /// No value
    Null,
    /// Boolean
    Bool,
    /// 64-bit signed integer (narrower widths widen on construction)
    Int,
    /// 32-bit IEEE-754 float
    Float,
    /// 64-bit IEEE-754 float
    Double,
    /// UTF-8 string
    String,
    /// Raw bytes
    Binary,
    /// Point in time, microsecond precision
    Timestamp,
    /// IEEE 754-2008 decimal128
    Decimal128,
    /// 12-byte ordered object identifier
    ObjectId,
    /// 128-bit universally unique identifier
    Uuid,
    /// Reference to an object row in another table
    Object,
}

impl MixedKind {
    /// Every kind, in tag order
    ///
    /// Used by tests that must cover the whole closed set.
    pub const ALL: [MixedKind; 12] = [
        MixedKind::Null,
        MixedKind::Bool,
        MixedKind::Int,
        MixedKind::Float,
        MixedKind::Double,
        MixedKind::String,
        MixedKind::Binary,
        MixedKind::Timestamp,
        MixedKind::Decimal128,
        MixedKind::ObjectId,
        MixedKind::Uuid,
        MixedKind::Object,
    ];

    /// Get the kind name as a string
    pub fn type_name(&self) -> &'static str {
        match self {
            MixedKind::Null => "Null",
            MixedKind::Bool => "Bool",
            MixedKind::Int => "Int",
            MixedKind::Float => "Float",
            MixedKind::Double => "Double",
            MixedKind::String => "String",
            MixedKind::Binary => "Binary",
            MixedKind::Timestamp => "Timestamp",
            MixedKind::Decimal128 => "Decimal128",
            MixedKind::ObjectId => "ObjectId",
            MixedKind::Uuid => "Uuid",
            MixedKind::Object => "Object",
        }
    }

    /// Whether values of this kind participate in coerced numeric comparison
    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            MixedKind::Int | MixedKind::Float | MixedKind::Double | MixedKind::Decimal128
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_covers_every_kind() {
        // ALL is the closed set; each entry is distinct
        for (i, a) in MixedKind::ALL.iter().enumerate() {
            for b in MixedKind::ALL.iter().skip(i + 1) {
                assert_ne!(a, b);
            }
        }
        assert_eq!(MixedKind::ALL.len(), 12);
    }

    #[test]
    fn test_type_name() {
        assert_eq!(MixedKind::Null.type_name(), "Null");
        assert_eq!(MixedKind::Int.type_name(), "Int");
        assert_eq!(MixedKind::Decimal128.type_name(), "Decimal128");
        assert_eq!(MixedKind::Object.type_name(), "Object");
    }

    #[test]
    fn test_numeric_kinds() {
        assert!(MixedKind::Int.is_numeric());
        assert!(MixedKind::Float.is_numeric());
        assert!(MixedKind::Double.is_numeric());
        assert!(MixedKind::Decimal128.is_numeric());
        assert!(!MixedKind::Bool.is_numeric());
        assert!(!MixedKind::String.is_numeric());
        assert!(!MixedKind::Object.is_numeric());
    }
}

//! Packed value encoding
//!
//! A `PackedValue` is the engine-level representation of a mixed field
//! value: one tag byte followed by a kind-specific payload.
//!
//! # Format
//!
//! ```text
//! Value Layout:
//! ┌──────────────────┬──────────────────────────────────────────────┐
//! │ Tag (1 byte)     │ Payload (kind-specific)                      │
//! └──────────────────┴──────────────────────────────────────────────┘
//!
//! Payloads:
//!   Null        —  empty
//!   Bool        —  1 byte (0x00 / 0x01)
//!   Int         —  8 bytes LE i64
//!   Float       —  4 bytes LE f32
//!   Double      —  8 bytes LE f64
//!   String      —  UTF-8 bytes
//!   Binary      —  raw bytes
//!   Timestamp   —  8 bytes LE i64 (microseconds since epoch)
//!   Decimal128  —  16 bytes LE bit pattern
//!   ObjectId    —  12 raw bytes
//!   Uuid        —  16 raw bytes
//!   Object      —  4 bytes LE table key + 8 bytes LE row key
//! ```
//!
//! The tag set is closed. `kind()` reports `UnrecognizedTag` for any
//! other tag so the value layer can refuse the handle at construction;
//! payload accessors report `Corruption` for structurally malformed
//! payloads and `TypeMismatch` when asked to read a different kind.

use byteorder::{ByteOrder, LittleEndian};
use loam_core::{Decimal128, Error, MixedKind, ObjectId, Result, RowKey, TableKey, Timestamp};
use uuid::Uuid;

use crate::stats;

/// Kind tag bytes
const TAG_NULL: u8 = 0x00;
const TAG_BOOL: u8 = 0x01;
const TAG_INT: u8 = 0x02;
const TAG_FLOAT: u8 = 0x03;
const TAG_DOUBLE: u8 = 0x04;
const TAG_STRING: u8 = 0x05;
const TAG_BINARY: u8 = 0x06;
const TAG_TIMESTAMP: u8 = 0x07;
const TAG_DECIMAL128: u8 = 0x08;
const TAG_OBJECT_ID: u8 = 0x09;
const TAG_UUID: u8 = 0x0A;
const TAG_OBJECT: u8 = 0x0B;

/// Packed representation of a mixed field value
///
/// The buffer is immutable once constructed; every accessor decodes
/// from the same bytes. Comparing two packed values with
/// [`coerced_equals`](PackedValue::coerced_equals) is meaningful across
/// sessions because nothing here refers to live in-memory state — an
/// object link is a (table, row) address, not a pointer.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PackedValue {
    buf: Vec<u8>,
}

impl PackedValue {
    fn alloc(tag: u8, payload_len: usize) -> Vec<u8> {
        stats::record_pack();
        let mut buf = vec![0u8; 1 + payload_len];
        buf[0] = tag;
        buf
    }

    /// Pack the null value
    pub fn null() -> Self {
        PackedValue {
            buf: Self::alloc(TAG_NULL, 0),
        }
    }

    /// Pack a boolean
    pub fn from_bool(value: bool) -> Self {
        let mut buf = Self::alloc(TAG_BOOL, 1);
        buf[1] = value as u8;
        PackedValue { buf }
    }

    /// Pack a 64-bit integer
    pub fn from_i64(value: i64) -> Self {
        let mut buf = Self::alloc(TAG_INT, 8);
        LittleEndian::write_i64(&mut buf[1..], value);
        PackedValue { buf }
    }

    /// Pack a 32-bit float
    pub fn from_f32(value: f32) -> Self {
        let mut buf = Self::alloc(TAG_FLOAT, 4);
        LittleEndian::write_f32(&mut buf[1..], value);
        PackedValue { buf }
    }

    /// Pack a 64-bit float
    pub fn from_f64(value: f64) -> Self {
        let mut buf = Self::alloc(TAG_DOUBLE, 8);
        LittleEndian::write_f64(&mut buf[1..], value);
        PackedValue { buf }
    }

    /// Pack a UTF-8 string
    pub fn from_str(value: &str) -> Self {
        let mut buf = Self::alloc(TAG_STRING, value.len());
        buf[1..].copy_from_slice(value.as_bytes());
        PackedValue { buf }
    }

    /// Pack raw bytes
    pub fn from_binary(value: &[u8]) -> Self {
        let mut buf = Self::alloc(TAG_BINARY, value.len());
        buf[1..].copy_from_slice(value);
        PackedValue { buf }
    }

    /// Pack a timestamp
    pub fn from_timestamp(value: Timestamp) -> Self {
        let mut buf = Self::alloc(TAG_TIMESTAMP, 8);
        LittleEndian::write_i64(&mut buf[1..], value.as_micros());
        PackedValue { buf }
    }

    /// Pack a decimal128 bit pattern
    pub fn from_decimal128(value: Decimal128) -> Self {
        let mut buf = Self::alloc(TAG_DECIMAL128, 16);
        LittleEndian::write_u128(&mut buf[1..], value.to_bits());
        PackedValue { buf }
    }

    /// Pack an object identifier
    pub fn from_object_id(value: ObjectId) -> Self {
        let mut buf = Self::alloc(TAG_OBJECT_ID, 12);
        buf[1..].copy_from_slice(&value.bytes());
        PackedValue { buf }
    }

    /// Pack a UUID
    pub fn from_uuid(value: Uuid) -> Self {
        let mut buf = Self::alloc(TAG_UUID, 16);
        buf[1..].copy_from_slice(value.as_bytes());
        PackedValue { buf }
    }

    /// Pack a link to an object row
    pub fn from_object_link(table: TableKey, row: RowKey) -> Self {
        let mut buf = Self::alloc(TAG_OBJECT, 12);
        LittleEndian::write_u32(&mut buf[1..5], table.raw());
        LittleEndian::write_u64(&mut buf[5..13], row.raw());
        PackedValue { buf }
    }

    /// Wrap an already-encoded buffer read back from storage
    ///
    /// Only the framing is checked here (a tag byte must be present);
    /// tag validity surfaces through `kind()` so the value layer rejects
    /// unknown tags at its own construction boundary, and payload shape
    /// is checked by the accessor that decodes it.
    pub fn from_encoded(buf: Vec<u8>) -> Result<Self> {
        if buf.is_empty() {
            return Err(Error::Corruption("empty value encoding".to_string()));
        }
        Ok(PackedValue { buf })
    }

    /// The raw encoded bytes
    pub fn encoded(&self) -> &[u8] {
        &self.buf
    }

    fn tag(&self) -> u8 {
        self.buf[0]
    }

    fn payload(&self) -> &[u8] {
        &self.buf[1..]
    }

    /// The kind this value holds
    ///
    /// # Errors
    /// `UnrecognizedTag` when the tag byte is outside the closed set.
    pub fn kind(&self) -> Result<MixedKind> {
        match self.tag() {
            TAG_NULL => Ok(MixedKind::Null),
            TAG_BOOL => Ok(MixedKind::Bool),
            TAG_INT => Ok(MixedKind::Int),
            TAG_FLOAT => Ok(MixedKind::Float),
            TAG_DOUBLE => Ok(MixedKind::Double),
            TAG_STRING => Ok(MixedKind::String),
            TAG_BINARY => Ok(MixedKind::Binary),
            TAG_TIMESTAMP => Ok(MixedKind::Timestamp),
            TAG_DECIMAL128 => Ok(MixedKind::Decimal128),
            TAG_OBJECT_ID => Ok(MixedKind::ObjectId),
            TAG_UUID => Ok(MixedKind::Uuid),
            TAG_OBJECT => Ok(MixedKind::Object),
            tag => Err(Error::UnrecognizedTag { tag }),
        }
    }

    fn expect_kind(&self, tag: u8, requested: MixedKind) -> Result<&[u8]> {
        if self.tag() != tag {
            return Err(Error::TypeMismatch {
                requested,
                stored: self.kind()?,
            });
        }
        Ok(self.payload())
    }

    fn fixed_payload(&self, tag: u8, requested: MixedKind, len: usize) -> Result<&[u8]> {
        let payload = self.expect_kind(tag, requested)?;
        if payload.len() != len {
            return Err(Error::Corruption(format!(
                "{:?} payload is {} bytes, expected {len}",
                requested,
                payload.len()
            )));
        }
        Ok(payload)
    }

    /// Extract a boolean
    pub fn as_bool(&self) -> Result<bool> {
        let payload = self.fixed_payload(TAG_BOOL, MixedKind::Bool, 1)?;
        match payload[0] {
            0 => Ok(false),
            1 => Ok(true),
            other => Err(Error::Corruption(format!("bad boolean byte {other:#04x}"))),
        }
    }

    /// Extract a 64-bit integer
    pub fn as_i64(&self) -> Result<i64> {
        let payload = self.fixed_payload(TAG_INT, MixedKind::Int, 8)?;
        Ok(LittleEndian::read_i64(payload))
    }

    /// Extract a 32-bit float
    pub fn as_f32(&self) -> Result<f32> {
        let payload = self.fixed_payload(TAG_FLOAT, MixedKind::Float, 4)?;
        Ok(LittleEndian::read_f32(payload))
    }

    /// Extract a 64-bit float
    pub fn as_f64(&self) -> Result<f64> {
        let payload = self.fixed_payload(TAG_DOUBLE, MixedKind::Double, 8)?;
        Ok(LittleEndian::read_f64(payload))
    }

    /// Extract a string slice
    pub fn as_str(&self) -> Result<&str> {
        let payload = self.expect_kind(TAG_STRING, MixedKind::String)?;
        std::str::from_utf8(payload)
            .map_err(|e| Error::Corruption(format!("string payload is not UTF-8: {e}")))
    }

    /// Extract the raw binary payload
    pub fn as_binary(&self) -> Result<&[u8]> {
        self.expect_kind(TAG_BINARY, MixedKind::Binary)
    }

    /// Extract a timestamp
    pub fn as_timestamp(&self) -> Result<Timestamp> {
        let payload = self.fixed_payload(TAG_TIMESTAMP, MixedKind::Timestamp, 8)?;
        Ok(Timestamp::from_micros(LittleEndian::read_i64(payload)))
    }

    /// Extract a decimal128 bit pattern
    pub fn as_decimal128(&self) -> Result<Decimal128> {
        let payload = self.fixed_payload(TAG_DECIMAL128, MixedKind::Decimal128, 16)?;
        Ok(Decimal128::from_bits(LittleEndian::read_u128(payload)))
    }

    /// Extract an object identifier
    pub fn as_object_id(&self) -> Result<ObjectId> {
        let payload = self.fixed_payload(TAG_OBJECT_ID, MixedKind::ObjectId, 12)?;
        let mut bytes = [0u8; 12];
        bytes.copy_from_slice(payload);
        Ok(ObjectId::from_bytes(bytes))
    }

    /// Extract a UUID
    pub fn as_uuid(&self) -> Result<Uuid> {
        let payload = self.fixed_payload(TAG_UUID, MixedKind::Uuid, 16)?;
        let mut bytes = [0u8; 16];
        bytes.copy_from_slice(payload);
        Ok(Uuid::from_bytes(bytes))
    }

    /// Table key of an object link
    pub fn object_table_key(&self) -> Result<TableKey> {
        let payload = self.fixed_payload(TAG_OBJECT, MixedKind::Object, 12)?;
        Ok(TableKey::new(LittleEndian::read_u32(&payload[0..4])))
    }

    /// Row key of an object link
    pub fn object_row_key(&self) -> Result<RowKey> {
        let payload = self.fixed_payload(TAG_OBJECT, MixedKind::Object, 12)?;
        Ok(RowKey::new(LittleEndian::read_u64(&payload[4..12])))
    }

    /// Compare two packed representations, coercing numeric kinds
    ///
    /// Byte-identical encodings are equal. Otherwise the numeric kinds
    /// (Int, Float, Double, and exponent-zero Decimal128) unify before
    /// comparing, so an integer stored narrow in one session equals the
    /// same number stored wide in another. Everything else compares by
    /// encoding only.
    pub fn coerced_equals(&self, other: &PackedValue) -> bool {
        if self.buf == other.buf {
            return true;
        }
        match (self.numeric_value(), other.numeric_value()) {
            (Some(a), Some(b)) => numeric_eq(a, b),
            _ => false,
        }
    }

    fn numeric_value(&self) -> Option<Numeric> {
        match self.tag() {
            TAG_INT => self.as_i64().ok().map(Numeric::Int),
            TAG_FLOAT => self.as_f32().ok().map(|f| Numeric::Double(f64::from(f))),
            TAG_DOUBLE => self.as_f64().ok().map(Numeric::Double),
            TAG_DECIMAL128 => self
                .as_decimal128()
                .ok()
                .and_then(Decimal128::to_i64)
                .map(Numeric::Int),
            _ => None,
        }
    }
}

/// A numeric payload lifted to a common representation
#[derive(Debug, Clone, Copy)]
enum Numeric {
    Int(i64),
    Double(f64),
}

// The i64 → f64 conversion rounds past 2^53, so equality between huge
// integers and doubles is approximate there.
fn numeric_eq(a: Numeric, b: Numeric) -> bool {
    match (a, b) {
        (Numeric::Int(x), Numeric::Int(y)) => x == y,
        (Numeric::Double(x), Numeric::Double(y)) => x == y,
        (Numeric::Int(x), Numeric::Double(y)) | (Numeric::Double(y), Numeric::Int(x)) => {
            x as f64 == y
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_reports_tag() {
        assert_eq!(PackedValue::null().kind().unwrap(), MixedKind::Null);
        assert_eq!(PackedValue::from_i64(1).kind().unwrap(), MixedKind::Int);
        assert_eq!(
            PackedValue::from_object_link(TableKey::new(1), RowKey::new(2))
                .kind()
                .unwrap(),
            MixedKind::Object
        );
    }

    #[test]
    fn test_unknown_tag_rejected() {
        let packed = PackedValue::from_encoded(vec![0x7F, 1, 2, 3]).unwrap();
        match packed.kind() {
            Err(Error::UnrecognizedTag { tag }) => assert_eq!(tag, 0x7F),
            other => panic!("expected UnrecognizedTag, got {other:?}"),
        }
    }

    #[test]
    fn test_empty_encoding_rejected() {
        assert!(matches!(
            PackedValue::from_encoded(vec![]),
            Err(Error::Corruption(_))
        ));
    }

    #[test]
    fn test_extraction_checks_kind() {
        let packed = PackedValue::from_str("hello");
        match packed.as_bool() {
            Err(Error::TypeMismatch { requested, stored }) => {
                assert_eq!(requested, MixedKind::Bool);
                assert_eq!(stored, MixedKind::String);
            }
            other => panic!("expected TypeMismatch, got {other:?}"),
        }
    }

    #[test]
    fn test_truncated_payload_is_corruption() {
        let packed = PackedValue::from_encoded(vec![TAG_INT, 1, 2]).unwrap();
        assert!(matches!(packed.as_i64(), Err(Error::Corruption(_))));
    }

    #[test]
    fn test_invalid_utf8_is_corruption() {
        let packed = PackedValue::from_encoded(vec![TAG_STRING, 0xFF, 0xFE]).unwrap();
        assert!(matches!(packed.as_str(), Err(Error::Corruption(_))));
    }

    #[test]
    fn test_string_extraction() {
        let packed = PackedValue::from_str("hello");
        assert_eq!(packed.as_str().unwrap(), "hello");
        // decode what storage would hand back
        let read = PackedValue::from_encoded(packed.encoded().to_vec()).unwrap();
        assert_eq!(read.as_str().unwrap(), "hello");
    }

    #[test]
    fn test_object_link_extraction() {
        let packed = PackedValue::from_object_link(TableKey::new(3), RowKey::new(77));
        assert_eq!(packed.object_table_key().unwrap(), TableKey::new(3));
        assert_eq!(packed.object_row_key().unwrap(), RowKey::new(77));
    }

    #[test]
    fn test_scalar_extraction() {
        assert!(PackedValue::from_bool(true).as_bool().unwrap());
        assert_eq!(PackedValue::from_i64(-5).as_i64().unwrap(), -5);
        assert_eq!(PackedValue::from_f32(1.5).as_f32().unwrap(), 1.5);
        assert_eq!(PackedValue::from_f64(-2.25).as_f64().unwrap(), -2.25);
        let ts = Timestamp::from_millis(1_600_000_000_000);
        assert_eq!(PackedValue::from_timestamp(ts).as_timestamp().unwrap(), ts);
        let dec = Decimal128::from_i64(314);
        assert_eq!(
            PackedValue::from_decimal128(dec).as_decimal128().unwrap(),
            dec
        );
        let oid = ObjectId::new();
        assert_eq!(PackedValue::from_object_id(oid).as_object_id().unwrap(), oid);
        let id = Uuid::new_v4();
        assert_eq!(PackedValue::from_uuid(id).as_uuid().unwrap(), id);
        assert_eq!(PackedValue::from_binary(&[9, 8]).as_binary().unwrap(), &[9, 8]);
    }

    #[test]
    fn test_bad_boolean_byte() {
        let packed = PackedValue::from_encoded(vec![TAG_BOOL, 0x02]).unwrap();
        assert!(matches!(packed.as_bool(), Err(Error::Corruption(_))));
    }

    #[test]
    fn test_coerced_equals_identical_bytes() {
        let a = PackedValue::from_str("same");
        let b = PackedValue::from_str("same");
        assert!(a.coerced_equals(&b));
        assert!(b.coerced_equals(&a));
    }

    #[test]
    fn test_coerced_equals_numeric_kinds() {
        let int = PackedValue::from_i64(12);
        let double = PackedValue::from_f64(12.0);
        let float = PackedValue::from_f32(12.0);
        let dec = PackedValue::from_decimal128(Decimal128::from_i64(12));
        assert!(int.coerced_equals(&double));
        assert!(double.coerced_equals(&int));
        assert!(int.coerced_equals(&float));
        assert!(int.coerced_equals(&dec));
        assert!(float.coerced_equals(&dec));
        assert!(!int.coerced_equals(&PackedValue::from_f64(12.5)));
    }

    #[test]
    fn test_coerced_equals_distinct_non_numeric() {
        let s = PackedValue::from_str("12");
        let i = PackedValue::from_i64(12);
        assert!(!s.coerced_equals(&i));
        let b = PackedValue::from_binary(b"same");
        let t = PackedValue::from_str("same");
        // same payload bytes, different tag
        assert!(!b.coerced_equals(&t));
    }

    #[test]
    fn test_scaled_decimal_compares_by_bits_only() {
        // 1E1 and 10: numerically equal, but the scaled form opts out of
        // integer unification
        let scaled = PackedValue::from_decimal128(Decimal128::from_bits((6177u128) << 113 | 1));
        let ten = PackedValue::from_i64(10);
        assert!(!scaled.coerced_equals(&ten));
        assert!(scaled.coerced_equals(&scaled.clone()));
    }
}

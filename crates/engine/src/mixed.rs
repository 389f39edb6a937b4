//! Dynamically-typed field values
//!
//! A `Mixed` holds exactly one payload out of the closed kind set and
//! binds it lazily to its packed representation. The kind is fixed at
//! construction; the packed handle is built at most once per instance
//! and reused for every later read or comparison.
//!
//! Two comparators live here. In-memory equality (`PartialEq`/`Hash`)
//! is kind-specific: integers compare over the widened 64-bit value,
//! binary payloads byte-for-byte, object references by the identity of
//! the referenced object. Coerced equality compares packed
//! representations instead and is the right tool when the operands may
//! come from different sessions, where in-memory identity means
//! nothing.
//!
//! Object references resolve lazily: a value decoded from storage only
//! remembers (session, table, row) until the first payload access, then
//! resolves to a statically-typed model object when the schema declares
//! one, or to a generically-typed object otherwise. Liveness is never
//! part of resolution — `check_valid_object` re-checks it on every
//! call, because a concurrent writer in the same session can delete the
//! row at any time.

use crate::object::{LiveObject, ObjectClass, ObjectIdentity};
use crate::schema::{class_name_for_table, ModelType};
use crate::session::{Session, SessionMode};
use loam_core::{Decimal128, Error, MixedKind, ObjectId, Result, RowKey, TableKey, Timestamp};
use loam_storage::PackedValue;
use once_cell::sync::OnceCell;
use std::fmt;
use std::hash::{Hash, Hasher};
use tracing::debug;
use uuid::Uuid;

/// The externally-visible type of a mixed value
///
/// For every kind but `Object` this is determined by the tag alone; for
/// object references it is the referenced object's own declared class,
/// which takes resolving the reference to know.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypedClass {
    /// Payload type fixed by the kind tag
    Primitive(MixedKind),
    /// Statically-resolved model class
    Model(ModelType),
    /// Dynamically-resolved object, known by class name
    Dynamic(String),
}

#[derive(Debug, Clone)]
enum ObjectRef {
    /// Application-wrapped object, resolved from the start
    Wrapped(LiveObject),
    /// Decoded link, resolved on first payload access
    Deferred {
        session: Session,
        table: TableKey,
        row: RowKey,
        target: OnceCell<LiveObject>,
    },
}

impl ObjectRef {
    fn resolve(&self) -> Result<&LiveObject> {
        match self {
            ObjectRef::Wrapped(object) => Ok(object),
            ObjectRef::Deferred {
                session,
                table,
                row,
                target,
            } => target.get_or_try_init(|| resolve_row(session, *table, *row)),
        }
    }

    fn identity(&self) -> ObjectIdentity {
        match self {
            ObjectRef::Wrapped(object) => object.identity(),
            ObjectRef::Deferred {
                session,
                table,
                row,
                ..
            } => ObjectIdentity::Managed(session.id(), *table, *row),
        }
    }
}

/// Resolve a stored link to an object wrapper
///
/// Static resolution first on typed sessions; only a `ClassNotFound`
/// miss falls back to a dynamically-typed object — any other failure
/// propagates.
fn resolve_row(session: &Session, table: TableKey, row: RowKey) -> Result<LiveObject> {
    let internal = session.table_name(table)?;
    if session.mode() == SessionMode::Typed {
        match session.schema().model_for_table(&internal) {
            Ok(model) => {
                return Ok(session.object_for_row(ObjectClass::Model(model), table, row));
            }
            Err(Error::ClassNotFound { table: missed }) => {
                debug!(table = %missed, "no model class for table, resolving dynamically");
            }
            Err(other) => return Err(other),
        }
    }
    let class_name = class_name_for_table(&internal).to_string();
    Ok(session.object_for_row(ObjectClass::Dynamic(class_name), table, row))
}

#[derive(Debug, Clone)]
enum Payload {
    Null,
    Bool(bool),
    Int(i64),
    Float(f32),
    Double(f64),
    String(String),
    Binary(Vec<u8>),
    Timestamp(Timestamp),
    Decimal128(Decimal128),
    ObjectId(ObjectId),
    Uuid(Uuid),
    Object(ObjectRef),
}

/// A dynamically-typed field value
#[derive(Debug, Clone)]
pub struct Mixed {
    payload: Payload,
    native: OnceCell<PackedValue>,
}

impl Mixed {
    fn from_payload(payload: Payload) -> Self {
        Mixed {
            payload,
            native: OnceCell::new(),
        }
    }

    /// The null value
    pub fn null() -> Self {
        Self::from_payload(Payload::Null)
    }

    /// Whether this is the null value
    pub fn is_null(&self) -> bool {
        matches!(self.payload, Payload::Null)
    }

    /// The kind this value holds
    pub fn kind(&self) -> MixedKind {
        match &self.payload {
            Payload::Null => MixedKind::Null,
            Payload::Bool(_) => MixedKind::Bool,
            Payload::Int(_) => MixedKind::Int,
            Payload::Float(_) => MixedKind::Float,
            Payload::Double(_) => MixedKind::Double,
            Payload::String(_) => MixedKind::String,
            Payload::Binary(_) => MixedKind::Binary,
            Payload::Timestamp(_) => MixedKind::Timestamp,
            Payload::Decimal128(_) => MixedKind::Decimal128,
            Payload::ObjectId(_) => MixedKind::ObjectId,
            Payload::Uuid(_) => MixedKind::Uuid,
            Payload::Object(_) => MixedKind::Object,
        }
    }

    /// Decode a packed value into an in-memory one
    ///
    /// Primitive payloads are extracted eagerly; an object link only
    /// records where it points and resolves on first payload access.
    /// The packed handle is kept, so no repacking ever happens for a
    /// decoded value.
    ///
    /// # Errors
    /// `UnrecognizedTag` when the handle reports a tag outside the
    /// closed set — a contract violation with the storage layer, not a
    /// recoverable condition.
    pub fn from_packed(session: &Session, packed: PackedValue) -> Result<Self> {
        let payload = match packed.kind()? {
            MixedKind::Null => Payload::Null,
            MixedKind::Bool => Payload::Bool(packed.as_bool()?),
            MixedKind::Int => Payload::Int(packed.as_i64()?),
            MixedKind::Float => Payload::Float(packed.as_f32()?),
            MixedKind::Double => Payload::Double(packed.as_f64()?),
            MixedKind::String => Payload::String(packed.as_str()?.to_string()),
            MixedKind::Binary => Payload::Binary(packed.as_binary()?.to_vec()),
            MixedKind::Timestamp => Payload::Timestamp(packed.as_timestamp()?),
            MixedKind::Decimal128 => Payload::Decimal128(packed.as_decimal128()?),
            MixedKind::ObjectId => Payload::ObjectId(packed.as_object_id()?),
            MixedKind::Uuid => Payload::Uuid(packed.as_uuid()?),
            MixedKind::Object => Payload::Object(ObjectRef::Deferred {
                session: session.clone(),
                table: packed.object_table_key()?,
                row: packed.object_row_key()?,
                target: OnceCell::new(),
            }),
        };
        Ok(Mixed {
            payload,
            native: OnceCell::with_value(packed),
        })
    }

    /// Retrieve the payload as a concrete type
    ///
    /// # Errors
    /// `TypeMismatch` when `T` does not match the stored kind. Asking
    /// for a [`LiveObject`] resolves the reference first.
    pub fn get<T: FromMixed>(&self) -> Result<T> {
        T::from_mixed(self)
    }

    /// The externally-visible type of this value
    ///
    /// Object references report the referenced object's declared class,
    /// resolving it if this is the first payload access.
    pub fn typed_class(&self) -> Result<TypedClass> {
        match &self.payload {
            Payload::Object(reference) => Ok(match reference.resolve()?.class() {
                ObjectClass::Model(model) => TypedClass::Model(*model),
                ObjectClass::Dynamic(name) => TypedClass::Dynamic(name.clone()),
            }),
            _ => Ok(TypedClass::Primitive(self.kind())),
        }
    }

    /// The packed representation, built on first use
    ///
    /// Construction runs at most once per instance; concurrent callers
    /// either find the finished handle or block until it is built.
    /// Values decoded from storage return the handle they were decoded
    /// from.
    ///
    /// # Errors
    /// `InvalidOperation` when an object reference targets a standalone
    /// instance — only managed objects have a storable address.
    pub fn packed(&self) -> Result<&PackedValue> {
        self.native.get_or_try_init(|| self.pack_payload())
    }

    fn pack_payload(&self) -> Result<PackedValue> {
        match &self.payload {
            Payload::Null => Ok(PackedValue::null()),
            Payload::Bool(v) => Ok(PackedValue::from_bool(*v)),
            Payload::Int(v) => Ok(PackedValue::from_i64(*v)),
            Payload::Float(v) => Ok(PackedValue::from_f32(*v)),
            Payload::Double(v) => Ok(PackedValue::from_f64(*v)),
            Payload::String(v) => Ok(PackedValue::from_str(v)),
            Payload::Binary(v) => Ok(PackedValue::from_binary(v)),
            Payload::Timestamp(v) => Ok(PackedValue::from_timestamp(*v)),
            Payload::Decimal128(v) => Ok(PackedValue::from_decimal128(*v)),
            Payload::ObjectId(v) => Ok(PackedValue::from_object_id(*v)),
            Payload::Uuid(v) => Ok(PackedValue::from_uuid(*v)),
            Payload::Object(reference) => {
                let object = reference.resolve()?;
                match (object.table_key(), object.row_key()) {
                    (Some(table), Some(row)) => Ok(PackedValue::from_object_link(table, row)),
                    _ => Err(Error::InvalidOperation(
                        "only managed objects can be stored in a mixed field".to_string(),
                    )),
                }
            }
        }
    }

    /// Compare the packed representations of two values
    ///
    /// Meaningful across sessions: the comparison never consults
    /// in-memory identity, and numeric kinds unify before comparing.
    /// Realizes both handles, so the same errors as [`packed`](Self::packed)
    /// apply.
    pub fn coerced_equals(&self, other: &Mixed) -> Result<bool> {
        Ok(self.packed()?.coerced_equals(other.packed()?))
    }

    /// Validate the object reference held by this value
    ///
    /// A no-op for every kind but `Object`. For references, both checks
    /// run on every call — never cached — because validity and session
    /// membership can change between construction and use:
    /// a deleted or never-persisted target fails `InvalidReference`, a
    /// target owned by a session other than `session` fails
    /// `CrossSession`.
    pub fn check_valid_object(&self, session: &Session) -> Result<()> {
        let reference = match &self.payload {
            Payload::Object(reference) => reference,
            _ => return Ok(()),
        };
        let object = reference.resolve()?;
        if !object.is_managed() || !object.is_valid() {
            return Err(Error::InvalidReference(
                "referenced object is deleted or was never persisted".to_string(),
            ));
        }
        match object.session() {
            Some(owner) if owner.id() == session.id() => Ok(()),
            _ => Err(Error::CrossSession),
        }
    }
}

impl PartialEq for Mixed {
    fn eq(&self, other: &Self) -> bool {
        match (&self.payload, &other.payload) {
            (Payload::Null, Payload::Null) => true,
            (Payload::Bool(a), Payload::Bool(b)) => a == b,
            // both sides already widened to i64 at construction
            (Payload::Int(a), Payload::Int(b)) => a == b,
            // IEEE-754: NaN != NaN, -0.0 == 0.0
            (Payload::Float(a), Payload::Float(b)) => a == b,
            (Payload::Double(a), Payload::Double(b)) => a == b,
            (Payload::String(a), Payload::String(b)) => a == b,
            (Payload::Binary(a), Payload::Binary(b)) => a == b,
            (Payload::Timestamp(a), Payload::Timestamp(b)) => a == b,
            (Payload::Decimal128(a), Payload::Decimal128(b)) => a == b,
            (Payload::ObjectId(a), Payload::ObjectId(b)) => a == b,
            (Payload::Uuid(a), Payload::Uuid(b)) => a == b,
            (Payload::Object(a), Payload::Object(b)) => a.identity() == b.identity(),
            _ => false,
        }
    }
}

impl Hash for Mixed {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.kind().hash(state);
        match &self.payload {
            // fixed sentinel; every null hashes alike
            Payload::Null => 0u8.hash(state),
            Payload::Bool(v) => v.hash(state),
            Payload::Int(v) => v.hash(state),
            Payload::Float(v) => normalize_f32(*v).to_bits().hash(state),
            Payload::Double(v) => normalize_f64(*v).to_bits().hash(state),
            Payload::String(v) => v.hash(state),
            Payload::Binary(v) => v.hash(state),
            Payload::Timestamp(v) => v.hash(state),
            Payload::Decimal128(v) => v.to_bits().hash(state),
            Payload::ObjectId(v) => v.hash(state),
            Payload::Uuid(v) => v.hash(state),
            Payload::Object(v) => v.identity().hash(state),
        }
    }
}

// -0.0 == 0.0 under PartialEq, so both must hash to the same bits
fn normalize_f32(v: f32) -> f32 {
    if v == 0.0 {
        0.0
    } else {
        v
    }
}

fn normalize_f64(v: f64) -> f64 {
    if v == 0.0 {
        0.0
    } else {
        v
    }
}

impl fmt::Display for Mixed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.payload {
            Payload::Null => write!(f, "null"),
            Payload::Bool(v) => write!(f, "{v}"),
            Payload::Int(v) => write!(f, "{v}"),
            Payload::Float(v) => write!(f, "{v}"),
            Payload::Double(v) => write!(f, "{v}"),
            Payload::String(v) => write!(f, "{v}"),
            Payload::Binary(v) => {
                write!(f, "0x")?;
                for byte in v {
                    write!(f, "{byte:02x}")?;
                }
                Ok(())
            }
            Payload::Timestamp(v) => write!(f, "{v}"),
            Payload::Decimal128(v) => write!(f, "{v}"),
            Payload::ObjectId(v) => write!(f, "{v}"),
            Payload::Uuid(v) => write!(f, "{v}"),
            Payload::Object(ObjectRef::Wrapped(object)) => write!(f, "{object}"),
            Payload::Object(ObjectRef::Deferred {
                table,
                row,
                target,
                ..
            }) => match target.get() {
                Some(object) => write!(f, "{object}"),
                None => write!(f, "object({table}, {row})"),
            },
        }
    }
}

// ============================================================================
// Construction from typed values
// ============================================================================

impl From<bool> for Mixed {
    fn from(v: bool) -> Self {
        Self::from_payload(Payload::Bool(v))
    }
}

impl From<i8> for Mixed {
    fn from(v: i8) -> Self {
        Self::from_payload(Payload::Int(i64::from(v)))
    }
}

impl From<i16> for Mixed {
    fn from(v: i16) -> Self {
        Self::from_payload(Payload::Int(i64::from(v)))
    }
}

impl From<i32> for Mixed {
    fn from(v: i32) -> Self {
        Self::from_payload(Payload::Int(i64::from(v)))
    }
}

impl From<i64> for Mixed {
    fn from(v: i64) -> Self {
        Self::from_payload(Payload::Int(v))
    }
}

impl From<f32> for Mixed {
    fn from(v: f32) -> Self {
        Self::from_payload(Payload::Float(v))
    }
}

impl From<f64> for Mixed {
    fn from(v: f64) -> Self {
        Self::from_payload(Payload::Double(v))
    }
}

impl From<&str> for Mixed {
    fn from(v: &str) -> Self {
        Self::from_payload(Payload::String(v.to_string()))
    }
}

impl From<String> for Mixed {
    fn from(v: String) -> Self {
        Self::from_payload(Payload::String(v))
    }
}

impl From<Vec<u8>> for Mixed {
    fn from(v: Vec<u8>) -> Self {
        Self::from_payload(Payload::Binary(v))
    }
}

impl From<&[u8]> for Mixed {
    fn from(v: &[u8]) -> Self {
        Self::from_payload(Payload::Binary(v.to_vec()))
    }
}

impl From<Timestamp> for Mixed {
    fn from(v: Timestamp) -> Self {
        Self::from_payload(Payload::Timestamp(v))
    }
}

impl From<Decimal128> for Mixed {
    fn from(v: Decimal128) -> Self {
        Self::from_payload(Payload::Decimal128(v))
    }
}

impl From<ObjectId> for Mixed {
    fn from(v: ObjectId) -> Self {
        Self::from_payload(Payload::ObjectId(v))
    }
}

impl From<Uuid> for Mixed {
    fn from(v: Uuid) -> Self {
        Self::from_payload(Payload::Uuid(v))
    }
}

impl From<LiveObject> for Mixed {
    fn from(v: LiveObject) -> Self {
        Self::from_payload(Payload::Object(ObjectRef::Wrapped(v)))
    }
}

impl<T: Into<Mixed>> From<Option<T>> for Mixed {
    fn from(v: Option<T>) -> Self {
        match v {
            Some(value) => value.into(),
            None => Mixed::null(),
        }
    }
}

// ============================================================================
// Typed retrieval
// ============================================================================

/// Payload types retrievable from a [`Mixed`] value
///
/// One implementation per payload type, each checking the stored kind;
/// the `Option` implementation additionally maps the null kind to
/// `None`.
pub trait FromMixed: Sized {
    /// The kind this type reads from
    const KIND: MixedKind;

    /// Extract the payload, failing `TypeMismatch` on a kind mismatch
    fn from_mixed(value: &Mixed) -> Result<Self>;
}

fn mismatch<T: FromMixed>(value: &Mixed) -> Error {
    Error::TypeMismatch {
        requested: T::KIND,
        stored: value.kind(),
    }
}

impl FromMixed for bool {
    const KIND: MixedKind = MixedKind::Bool;

    fn from_mixed(value: &Mixed) -> Result<Self> {
        match &value.payload {
            Payload::Bool(v) => Ok(*v),
            _ => Err(mismatch::<Self>(value)),
        }
    }
}

impl FromMixed for i64 {
    const KIND: MixedKind = MixedKind::Int;

    fn from_mixed(value: &Mixed) -> Result<Self> {
        match &value.payload {
            Payload::Int(v) => Ok(*v),
            _ => Err(mismatch::<Self>(value)),
        }
    }
}

impl FromMixed for f32 {
    const KIND: MixedKind = MixedKind::Float;

    fn from_mixed(value: &Mixed) -> Result<Self> {
        match &value.payload {
            Payload::Float(v) => Ok(*v),
            _ => Err(mismatch::<Self>(value)),
        }
    }
}

impl FromMixed for f64 {
    const KIND: MixedKind = MixedKind::Double;

    fn from_mixed(value: &Mixed) -> Result<Self> {
        match &value.payload {
            Payload::Double(v) => Ok(*v),
            _ => Err(mismatch::<Self>(value)),
        }
    }
}

impl FromMixed for String {
    const KIND: MixedKind = MixedKind::String;

    fn from_mixed(value: &Mixed) -> Result<Self> {
        match &value.payload {
            Payload::String(v) => Ok(v.clone()),
            _ => Err(mismatch::<Self>(value)),
        }
    }
}

impl FromMixed for Vec<u8> {
    const KIND: MixedKind = MixedKind::Binary;

    fn from_mixed(value: &Mixed) -> Result<Self> {
        match &value.payload {
            Payload::Binary(v) => Ok(v.clone()),
            _ => Err(mismatch::<Self>(value)),
        }
    }
}

impl FromMixed for Timestamp {
    const KIND: MixedKind = MixedKind::Timestamp;

    fn from_mixed(value: &Mixed) -> Result<Self> {
        match &value.payload {
            Payload::Timestamp(v) => Ok(*v),
            _ => Err(mismatch::<Self>(value)),
        }
    }
}

impl FromMixed for Decimal128 {
    const KIND: MixedKind = MixedKind::Decimal128;

    fn from_mixed(value: &Mixed) -> Result<Self> {
        match &value.payload {
            Payload::Decimal128(v) => Ok(*v),
            _ => Err(mismatch::<Self>(value)),
        }
    }
}

impl FromMixed for ObjectId {
    const KIND: MixedKind = MixedKind::ObjectId;

    fn from_mixed(value: &Mixed) -> Result<Self> {
        match &value.payload {
            Payload::ObjectId(v) => Ok(*v),
            _ => Err(mismatch::<Self>(value)),
        }
    }
}

impl FromMixed for Uuid {
    const KIND: MixedKind = MixedKind::Uuid;

    fn from_mixed(value: &Mixed) -> Result<Self> {
        match &value.payload {
            Payload::Uuid(v) => Ok(*v),
            _ => Err(mismatch::<Self>(value)),
        }
    }
}

impl FromMixed for LiveObject {
    const KIND: MixedKind = MixedKind::Object;

    fn from_mixed(value: &Mixed) -> Result<Self> {
        match &value.payload {
            Payload::Object(reference) => reference.resolve().cloned(),
            _ => Err(mismatch::<Self>(value)),
        }
    }
}

impl<T: FromMixed> FromMixed for Option<T> {
    const KIND: MixedKind = T::KIND;

    fn from_mixed(value: &Mixed) -> Result<Self> {
        if value.is_null() {
            return Ok(None);
        }
        T::from_mixed(value).map(Some)
    }
}

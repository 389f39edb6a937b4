//! LoamDB - Embedded object database with dynamically-typed mixed fields
//!
//! A mixed field stores a value whose type is not fixed at
//! schema-definition time: one of twelve kinds, from null and integers
//! through decimals and UUIDs up to references to other objects.
//!
//! # Quick Start
//!
//! ```
//! use loamdb::{Mixed, ModelType, Schema, Session};
//!
//! let session = Session::typed(Schema::with_models([ModelType::new("Person")]));
//! let person = session.create_object("Person")?;
//!
//! // Store a string today, an integer tomorrow
//! session.set_mixed(&person, "detail", &Mixed::from("hello"))?;
//! let value = session.get_mixed(&person, "detail")?;
//! assert_eq!(value.get::<String>()?, "hello");
//! # Ok::<(), loamdb::Error>(())
//! ```
//!
//! # Architecture
//!
//! The workspace splits along the same seam the engine does: `loam-core`
//! owns the kind tags, scalar payload types and errors; `loam-storage`
//! owns the packed representation a value binds to lazily; `loam-engine`
//! owns sessions, schema mediation and the [`Mixed`] value itself.

pub use loam_core::{
    Decimal128, Error, MixedKind, ObjectId, ObjectIdParseError, Result, RowKey, SessionId,
    TableKey, Timestamp,
};
pub use loam_engine::{
    class_name_for_table, FromMixed, LiveObject, Mixed, ModelType, ObjectClass, Schema, Session,
    SessionMode, TypedClass,
};
pub use loam_storage::{stats, PackedValue};

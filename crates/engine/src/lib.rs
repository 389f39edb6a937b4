//! Sessions, schema mediation and mixed field values
//!
//! This crate hosts the live layer of the Loam object database:
//! - Schema / ModelType: maps stored tables to declared model classes
//! - Session: an open database instance with tables and rows
//! - LiveObject: wrapper around a row, managed or standalone
//! - Mixed: the dynamically-typed field value and its reference resolver

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod mixed;
pub mod object;
pub mod schema;
pub mod session;
mod table;

pub use mixed::{FromMixed, Mixed, TypedClass};
pub use object::{LiveObject, ObjectClass};
pub use schema::{class_name_for_table, ModelType, Schema};
pub use session::{Session, SessionMode};

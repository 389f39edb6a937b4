//! Live session over in-memory object tables
//!
//! A `Session` is an open database instance: a set of object tables,
//! the schema declared for them, and an identity that object references
//! are scoped to. Handles are cheap `Arc` clones of shared state; the
//! table store sits behind a `parking_lot::RwLock` so readers never
//! contend with each other.
//!
//! The session decides how object references resolve through its
//! `SessionMode`: a typed session consults the schema for declared
//! model classes, a dynamic session only ever produces generically
//! typed objects. The mode is a plain capability flag so the resolver
//! branches on data, not on the concrete type of the session.

use crate::mixed::Mixed;
use crate::object::{LiveObject, ObjectClass};
use crate::schema::{internal_table_name, Schema};
use crate::table::Table;
use loam_core::{Error, Result, RowKey, SessionId, TableKey};
use loam_storage::PackedValue;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// How a session resolves object references
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionMode {
    /// Schema-first: resolve references to declared model classes,
    /// falling back to dynamic objects for unknown tables
    Typed,
    /// Name-only: every reference resolves to a generically-typed object
    Dynamic,
}

#[derive(Default)]
struct TableStore {
    by_key: HashMap<TableKey, Table>,
    by_name: HashMap<String, TableKey>,
    next_table: u32,
}

impl TableStore {
    fn add(&mut self, internal: String) -> TableKey {
        if let Some(existing) = self.by_name.get(&internal) {
            return *existing;
        }
        let key = TableKey::new(self.next_table);
        self.next_table += 1;
        self.by_name.insert(internal.clone(), key);
        self.by_key.insert(key, Table::new(internal));
        key
    }
}

struct SessionInner {
    id: SessionId,
    mode: SessionMode,
    schema: Schema,
    tables: RwLock<TableStore>,
}

/// Handle to an open session
///
/// Clones share the same underlying session; two handles are the same
/// session if and only if their [`SessionId`]s are equal.
#[derive(Clone)]
pub struct Session {
    inner: Arc<SessionInner>,
}

impl Session {
    fn open(mode: SessionMode, schema: Schema) -> Self {
        let session = Session {
            inner: Arc::new(SessionInner {
                id: SessionId::new(),
                mode,
                schema,
                tables: RwLock::new(TableStore::default()),
            }),
        };
        {
            let mut tables = session.inner.tables.write();
            for model in session.inner.schema.models() {
                tables.add(model.internal_table_name());
            }
        }
        debug!(id = %session.id(), ?mode, "opened session");
        session
    }

    /// Open a typed session over the given schema
    ///
    /// One table per registered model is created up front.
    pub fn typed(schema: Schema) -> Self {
        Self::open(SessionMode::Typed, schema)
    }

    /// Open a dynamic session over the given schema
    ///
    /// Tables still exist for registered models, but references always
    /// resolve generically.
    pub fn dynamic(schema: Schema) -> Self {
        Self::open(SessionMode::Dynamic, schema)
    }

    /// This session's identity
    pub fn id(&self) -> SessionId {
        self.inner.id
    }

    /// How this session resolves object references
    pub fn mode(&self) -> SessionMode {
        self.inner.mode
    }

    /// The schema this session was opened with
    pub fn schema(&self) -> &Schema {
        &self.inner.schema
    }

    /// Create the table for a class name, returning the existing key if
    /// the table is already present
    pub fn add_table(&self, class_name: &str) -> TableKey {
        let internal = internal_table_name(class_name);
        self.inner.tables.write().add(internal)
    }

    /// Key of the table backing a class name
    pub fn table_key(&self, class_name: &str) -> Result<TableKey> {
        let internal = internal_table_name(class_name);
        self.inner
            .tables
            .read()
            .by_name
            .get(&internal)
            .copied()
            .ok_or_else(|| Error::TableNotFound(internal))
    }

    /// Internal name of a table
    pub fn table_name(&self, table: TableKey) -> Result<String> {
        self.inner
            .tables
            .read()
            .by_key
            .get(&table)
            .map(|t| t.name().to_string())
            .ok_or_else(|| Error::TableNotFound(table.to_string()))
    }

    /// Whether a row currently exists
    pub fn row_exists(&self, table: TableKey, row: RowKey) -> bool {
        self.inner
            .tables
            .read()
            .by_key
            .get(&table)
            .is_some_and(|t| t.contains_row(row))
    }

    fn class_for(&self, class_name: &str) -> ObjectClass {
        if self.inner.mode == SessionMode::Typed {
            let internal = internal_table_name(class_name);
            if let Ok(model) = self.inner.schema.model_for_table(&internal) {
                return ObjectClass::Model(model);
            }
        }
        ObjectClass::Dynamic(class_name.to_string())
    }

    /// Create a new object of the given class
    ///
    /// Typed sessions only create objects of registered model classes;
    /// dynamic sessions create the table on demand.
    pub fn create_object(&self, class_name: &str) -> Result<LiveObject> {
        let table = match self.inner.mode {
            SessionMode::Typed => {
                let internal = internal_table_name(class_name);
                self.inner.schema.model_for_table(&internal)?;
                self.table_key(class_name)?
            }
            SessionMode::Dynamic => self.add_table(class_name),
        };
        let row = {
            let mut tables = self.inner.tables.write();
            let slot = tables
                .by_key
                .get_mut(&table)
                .ok_or_else(|| Error::TableNotFound(table.to_string()))?;
            slot.insert_row()
        };
        debug!(class = class_name, %table, %row, "created object");
        Ok(LiveObject::managed(
            self.class_for(class_name),
            self.clone(),
            table,
            row,
        ))
    }

    /// Delete the row backing a managed object
    ///
    /// The wrapper stays usable afterwards; `is_valid` turns false.
    pub fn delete_object(&self, object: &LiveObject) -> Result<()> {
        let (table, row) = self.expect_managed_here(object)?;
        let deleted = {
            let mut tables = self.inner.tables.write();
            tables
                .by_key
                .get_mut(&table)
                .ok_or_else(|| Error::TableNotFound(table.to_string()))?
                .delete_row(row)
        };
        if !deleted {
            return Err(Error::RowNotFound {
                table: self.table_name(table)?,
                row,
            });
        }
        debug!(%table, %row, "deleted object");
        Ok(())
    }

    /// Retrieve an object wrapper by class name and row key
    ///
    /// Construction is side-effect-free and does not check that the row
    /// exists; validity is the caller's question to ask, and the answer
    /// can change between calls.
    pub fn get_object(&self, class_name: &str, row: RowKey) -> Result<LiveObject> {
        let table = self.table_key(class_name)?;
        Ok(LiveObject::managed(
            self.class_for(class_name),
            self.clone(),
            table,
            row,
        ))
    }

    pub(crate) fn object_for_row(
        &self,
        class: ObjectClass,
        table: TableKey,
        row: RowKey,
    ) -> LiveObject {
        LiveObject::managed(class, self.clone(), table, row)
    }

    fn expect_managed_here(&self, object: &LiveObject) -> Result<(TableKey, RowKey)> {
        match (object.session(), object.table_key(), object.row_key()) {
            (Some(session), Some(table), Some(row)) => {
                if session.id() != self.id() {
                    return Err(Error::CrossSession);
                }
                Ok((table, row))
            }
            _ => Err(Error::InvalidReference(
                "object is not managed by any session".to_string(),
            )),
        }
    }

    /// Store a mixed value into a field of a managed object
    ///
    /// Object-reference values are validated against this session
    /// before anything is written.
    pub fn set_mixed(&self, object: &LiveObject, field: &str, value: &Mixed) -> Result<()> {
        let (table, row) = self.expect_managed_here(object)?;
        value.check_valid_object(self)?;
        let encoded = value.packed()?.encoded().to_vec();
        let mut tables = self.inner.tables.write();
        tables
            .by_key
            .get_mut(&table)
            .ok_or_else(|| Error::TableNotFound(table.to_string()))?
            .set_field(row, field, encoded)
    }

    /// Read a mixed value back from a field of a managed object
    pub fn get_mixed(&self, object: &LiveObject, field: &str) -> Result<Mixed> {
        let (table, row) = self.expect_managed_here(object)?;
        let encoded = {
            let tables = self.inner.tables.read();
            tables
                .by_key
                .get(&table)
                .ok_or_else(|| Error::TableNotFound(table.to_string()))?
                .field(row, field)?
                .to_vec()
        };
        let packed = PackedValue::from_encoded(encoded)?;
        Mixed::from_packed(self, packed)
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("id", &self.inner.id)
            .field("mode", &self.inner.mode)
            .finish_non_exhaustive()
    }
}

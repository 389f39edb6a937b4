//! Managed object wrappers
//!
//! A `LiveObject` wraps either a row backed by a session table
//! (managed) or a free-standing instance that was never persisted
//! (standalone). Validity and session membership are looked up live on
//! every call: a managed object can be deleted out from under its
//! wrapper by another writer in the same session, so nothing here is
//! allowed to cache a liveness answer.

use crate::schema::ModelType;
use crate::session::Session;
use loam_core::{RowKey, SessionId, TableKey};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_INSTANCE: AtomicU64 = AtomicU64::new(0);

/// The declared class of an object, statically or dynamically typed
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ObjectClass {
    /// An application-declared model class
    Model(ModelType),
    /// A generically-typed object known only by class name
    Dynamic(String),
}

impl ObjectClass {
    /// The class name
    pub fn name(&self) -> &str {
        match self {
            ObjectClass::Model(model) => model.name(),
            ObjectClass::Dynamic(name) => name,
        }
    }
}

#[derive(Debug, Clone)]
enum ObjectState {
    Managed {
        session: Session,
        table: TableKey,
        row: RowKey,
    },
    Standalone {
        instance: u64,
    },
}

/// Wrapper around an object instance, managed or standalone
///
/// Equality is identity equality: managed wrappers are equal when they
/// address the same row of the same table in the same session;
/// standalone wrappers are equal only to their own clones.
#[derive(Debug, Clone)]
pub struct LiveObject {
    class: ObjectClass,
    state: ObjectState,
}

/// Identity of an object, derivable without touching the row
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) enum ObjectIdentity {
    Managed(SessionId, TableKey, RowKey),
    Standalone(u64),
}

impl LiveObject {
    /// Create a free-standing instance that is not backed by any row
    pub fn standalone(class: ObjectClass) -> Self {
        LiveObject {
            class,
            state: ObjectState::Standalone {
                instance: NEXT_INSTANCE.fetch_add(1, Ordering::Relaxed),
            },
        }
    }

    pub(crate) fn managed(
        class: ObjectClass,
        session: Session,
        table: TableKey,
        row: RowKey,
    ) -> Self {
        LiveObject {
            class,
            state: ObjectState::Managed {
                session,
                table,
                row,
            },
        }
    }

    /// The declared class of this object
    pub fn class(&self) -> &ObjectClass {
        &self.class
    }

    /// Whether this wrapper is backed by a session row
    pub fn is_managed(&self) -> bool {
        matches!(self.state, ObjectState::Managed { .. })
    }

    /// Whether the backing row currently exists
    ///
    /// Standalone instances are never valid. The row is looked up on
    /// every call; the answer can change between calls.
    pub fn is_valid(&self) -> bool {
        match &self.state {
            ObjectState::Managed {
                session,
                table,
                row,
            } => session.row_exists(*table, *row),
            ObjectState::Standalone { .. } => false,
        }
    }

    /// The owning session, when managed
    pub fn session(&self) -> Option<&Session> {
        match &self.state {
            ObjectState::Managed { session, .. } => Some(session),
            ObjectState::Standalone { .. } => None,
        }
    }

    /// The backing table key, when managed
    pub fn table_key(&self) -> Option<TableKey> {
        match &self.state {
            ObjectState::Managed { table, .. } => Some(*table),
            ObjectState::Standalone { .. } => None,
        }
    }

    /// The backing row key, when managed
    pub fn row_key(&self) -> Option<RowKey> {
        match &self.state {
            ObjectState::Managed { row, .. } => Some(*row),
            ObjectState::Standalone { .. } => None,
        }
    }

    pub(crate) fn identity(&self) -> ObjectIdentity {
        match &self.state {
            ObjectState::Managed {
                session,
                table,
                row,
            } => ObjectIdentity::Managed(session.id(), *table, *row),
            ObjectState::Standalone { instance } => ObjectIdentity::Standalone(*instance),
        }
    }
}

impl PartialEq for LiveObject {
    fn eq(&self, other: &Self) -> bool {
        self.identity() == other.identity()
    }
}

impl Eq for LiveObject {}

impl Hash for LiveObject {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.identity().hash(state);
    }
}

impl fmt::Display for LiveObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.state {
            ObjectState::Managed { row, .. } => write!(f, "{}({})", self.class.name(), row),
            ObjectState::Standalone { .. } => write!(f, "{}(standalone)", self.class.name()),
        }
    }
}

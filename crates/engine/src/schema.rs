//! Schema mediation
//!
//! The storage side addresses object tables by an internal name carrying
//! the `cls_` prefix; applications declare model classes by their plain
//! name. `Schema` is the registry bridging the two: given an internal
//! table name it produces the declared [`ModelType`], or fails with
//! `ClassNotFound` — the one mediation failure the reference resolver
//! treats as recoverable.

use loam_core::{Error, Result};
use std::collections::HashMap;

/// Prefix storage puts in front of every object table name
pub const TABLE_NAME_PREFIX: &str = "cls_";

/// Internal table name for a declared class name
pub fn internal_table_name(class_name: &str) -> String {
    format!("{TABLE_NAME_PREFIX}{class_name}")
}

/// Declared class name for an internal table name
///
/// Names without the prefix pass through unchanged.
pub fn class_name_for_table(internal: &str) -> &str {
    internal.strip_prefix(TABLE_NAME_PREFIX).unwrap_or(internal)
}

/// Descriptor of an application-declared model class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ModelType {
    name: &'static str,
}

impl ModelType {
    /// Declare a model class by name
    pub const fn new(name: &'static str) -> Self {
        Self { name }
    }

    /// The declared class name
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// The internal table name backing this class
    pub fn internal_table_name(&self) -> String {
        internal_table_name(self.name)
    }
}

/// Registry of declared model classes, keyed by internal table name
#[derive(Debug, Clone, Default)]
pub struct Schema {
    by_table: HashMap<String, ModelType>,
}

impl Schema {
    /// Create an empty schema
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a schema holding the given models
    pub fn with_models(models: impl IntoIterator<Item = ModelType>) -> Self {
        let mut schema = Self::new();
        for model in models {
            schema.register(model);
        }
        schema
    }

    /// Register a model class
    pub fn register(&mut self, model: ModelType) {
        self.by_table.insert(model.internal_table_name(), model);
    }

    /// Look up the model class declared for an internal table name
    ///
    /// # Errors
    /// `ClassNotFound` when no model is registered for the table.
    pub fn model_for_table(&self, internal: &str) -> Result<ModelType> {
        self.by_table
            .get(internal)
            .copied()
            .ok_or_else(|| Error::ClassNotFound {
                table: internal.to_string(),
            })
    }

    /// Iterate over the registered models
    pub fn models(&self) -> impl Iterator<Item = ModelType> + '_ {
        self.by_table.values().copied()
    }
}

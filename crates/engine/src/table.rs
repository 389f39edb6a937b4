//! In-memory table storage
//!
//! A table is a bag of rows keyed by `RowKey`; a row is a set of named
//! fields holding encoded packed values. Row keys are never reused
//! within a session, so a deleted row's key stays dangling rather than
//! silently pointing at new data.

use loam_core::{Error, Result, RowKey};
use std::collections::HashMap;

#[derive(Debug, Default)]
struct Row {
    fields: HashMap<String, Vec<u8>>,
}

#[derive(Debug)]
pub(crate) struct Table {
    name: String,
    rows: HashMap<RowKey, Row>,
    next_row: u64,
}

impl Table {
    pub(crate) fn new(name: String) -> Self {
        Self {
            name,
            rows: HashMap::new(),
            next_row: 0,
        }
    }

    pub(crate) fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn insert_row(&mut self) -> RowKey {
        let key = RowKey::new(self.next_row);
        self.next_row += 1;
        self.rows.insert(key, Row::default());
        key
    }

    pub(crate) fn delete_row(&mut self, row: RowKey) -> bool {
        self.rows.remove(&row).is_some()
    }

    pub(crate) fn contains_row(&self, row: RowKey) -> bool {
        self.rows.contains_key(&row)
    }

    pub(crate) fn set_field(
        &mut self,
        row: RowKey,
        field: &str,
        encoded: Vec<u8>,
    ) -> Result<()> {
        let slot = self.rows.get_mut(&row).ok_or_else(|| Error::RowNotFound {
            table: self.name.clone(),
            row,
        })?;
        slot.fields.insert(field.to_string(), encoded);
        Ok(())
    }

    pub(crate) fn field(&self, row: RowKey, field: &str) -> Result<&[u8]> {
        let slot = self.rows.get(&row).ok_or_else(|| Error::RowNotFound {
            table: self.name.clone(),
            row,
        })?;
        slot.fields
            .get(field)
            .map(Vec::as_slice)
            .ok_or_else(|| Error::FieldNotFound(field.to_string()))
    }
}

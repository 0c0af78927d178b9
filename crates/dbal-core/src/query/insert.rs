//! INSERT collector.

use super::upsert;
use crate::dialect::{Dialect, DialectKind};
use crate::error::Result;
use crate::expr::Identifier;
use crate::value::{ToValue, Value};

/// An INSERT statement under construction.
///
/// Each row keeps its keys in insertion order. The compiled column list is
/// the first-seen union of all row keys; a row missing a key renders
/// `NULL` in that position.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Insert {
    pub(crate) table: Option<Identifier>,
    pub(crate) rows: Vec<Vec<(String, Value)>>,
    pub(crate) returning: Option<String>,
    pub(crate) dialect: Option<DialectKind>,
}

impl Insert {
    /// Creates a new INSERT builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Specifies the table to insert into.
    #[must_use]
    pub fn into_table(mut self, table: impl Into<Identifier>) -> Self {
        self.table = Some(table.into());
        self
    }

    /// Adds a row.
    #[must_use]
    pub fn values<I, K, V>(mut self, row: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: ToValue,
    {
        let mut entries = vec![];
        for (key, value) in row {
            upsert(&mut entries, key.into(), value.to_value());
        }
        self.rows.push(entries);
        self
    }

    /// Merges the entries into the last row, or starts the first row.
    #[must_use]
    pub fn values_merge<I, K, V>(mut self, row: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: ToValue,
    {
        if self.rows.is_empty() {
            self.rows.push(vec![]);
        }
        if let Some(last) = self.rows.last_mut() {
            for (key, value) in row {
                upsert(last, key.into(), value.to_value());
            }
        }
        self
    }

    /// Names the generated-id column to return (Postgres `RETURNING`).
    #[must_use]
    pub fn returning(mut self, id_field: impl Into<String>) -> Self {
        self.returning = Some(id_field.into());
        self
    }

    /// Returns the first-seen union of the row keys.
    #[must_use]
    pub fn columns(&self) -> Vec<&str> {
        let mut columns: Vec<&str> = vec![];
        for (key, _) in self.rows.iter().flatten() {
            if !columns.contains(&key.as_str()) {
                columns.push(key);
            }
        }
        columns
    }

    /// Compiles the statement.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Configuration`] without a table or rows.
    pub fn compile<D: Dialect + ?Sized>(&self, dialect: &D) -> Result<String> {
        dialect.compile_insert(self)
    }
}

//! Schema manager.
//!
//! [`SchemaManager`] reads the live schema through a [`Connection`], lets
//! callers describe changes on a [`TableDefinition`], and runs the DDL the
//! differ produces. The live snapshot is fetched lazily and cached until
//! the manager executes DDL.

use std::sync::{Arc, PoisonError, RwLock};

use tracing::{debug, info};

use super::diff::diff;
use super::table::TableDefinition;
use crate::connection::{Connection, Params};
use crate::error::{Error, Result};

type Snapshot = Arc<Vec<TableDefinition>>;

/// Schema operations against one connection.
pub struct SchemaManager<'c, C: Connection + ?Sized> {
    connection: &'c C,
    cache: RwLock<Option<Snapshot>>,
}

impl<'c, C: Connection + ?Sized> SchemaManager<'c, C> {
    /// Creates a manager with an empty cache.
    pub const fn new(connection: &'c C) -> Self {
        Self {
            connection,
            cache: RwLock::new(None),
        }
    }

    /// Returns the live schema, fetching it on first use.
    ///
    /// # Errors
    ///
    /// Returns whatever the connection reports while introspecting.
    pub fn snapshot(&self) -> Result<Snapshot> {
        if let Some(snapshot) = self
            .cache
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
        {
            return Ok(Arc::clone(snapshot));
        }

        let fresh = Arc::new(self.connection.schema_snapshot()?);
        debug!(tables = fresh.len(), "Schema snapshot loaded");
        *self.cache.write().unwrap_or_else(PoisonError::into_inner) = Some(Arc::clone(&fresh));
        Ok(fresh)
    }

    /// Drops the cached snapshot.
    pub fn invalidate(&self) {
        *self.cache.write().unwrap_or_else(PoisonError::into_inner) = None;
        debug!("Schema cache invalidated");
    }

    /// Returns the live definition of a table.
    ///
    /// # Errors
    ///
    /// Returns whatever the connection reports while introspecting.
    pub fn table(&self, name: &str) -> Result<Option<TableDefinition>> {
        Ok(self.snapshot()?.iter().find(|t| t.name == name).cloned())
    }

    /// Whether the table exists.
    ///
    /// # Errors
    ///
    /// Returns whatever the connection reports while introspecting.
    pub fn has_table(&self, name: &str) -> Result<bool> {
        Ok(self.snapshot()?.iter().any(|t| t.name == name))
    }

    /// Whether the table exists and has the column.
    ///
    /// # Errors
    ///
    /// Returns whatever the connection reports while introspecting.
    pub fn has_column(&self, table: &str, column: &str) -> Result<bool> {
        Ok(self
            .snapshot()?
            .iter()
            .find(|t| t.name == table)
            .is_some_and(|t| t.column(column).is_some()))
    }

    /// Lists table names in snapshot order.
    ///
    /// # Errors
    ///
    /// Returns whatever the connection reports while introspecting.
    pub fn list_table_names(&self) -> Result<Vec<String>> {
        Ok(self.snapshot()?.iter().map(|t| t.name.clone()).collect())
    }

    /// Lists the columns of a table in declaration order.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] if the table does not exist.
    pub fn list_column_names(&self, table: &str) -> Result<Vec<String>> {
        let definition = self.existing(table)?;
        Ok(definition.columns.iter().map(|c| c.name.clone()).collect())
    }

    /// Creates a table described by `build`.
    ///
    /// Returns the statements that were executed.
    ///
    /// # Errors
    ///
    /// Returns any error raised by `build`, the differ, or the connection.
    pub fn create_table<F>(&self, name: &str, build: F) -> Result<Vec<String>>
    where
        F: FnOnce(&mut TableDefinition) -> Result<()>,
    {
        let mut definition = TableDefinition::new(name);
        build(&mut definition)?;
        let statements = diff(None, Some(&definition), self.connection.dialect().schema_dialect())?;
        self.run_commands(&definition.name, &statements)?;
        Ok(statements)
    }

    /// Alters an existing table. `build` receives the live definition and
    /// edits it into the desired one.
    ///
    /// Returns the statements that were executed.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] if the table does not exist, or any
    /// error raised by `build`, the differ, or the connection.
    pub fn alter_table<F>(&self, name: &str, build: F) -> Result<Vec<String>>
    where
        F: FnOnce(&mut TableDefinition) -> Result<()>,
    {
        let before = self.existing(name)?;
        let mut after = before.clone();
        build(&mut after)?;
        let statements = diff(
            Some(&before),
            Some(&after),
            self.connection.dialect().schema_dialect(),
        )?;
        self.run_commands(name, &statements)?;
        Ok(statements)
    }

    /// Drops a table.
    ///
    /// # Errors
    ///
    /// Returns whatever the connection reports.
    pub fn drop_table(&self, name: &str) -> Result<Vec<String>> {
        self.drop(name, false)
    }

    /// Drops a table if it exists.
    ///
    /// # Errors
    ///
    /// Returns whatever the connection reports.
    pub fn drop_table_if_exists(&self, name: &str) -> Result<Vec<String>> {
        self.drop(name, true)
    }

    /// Renames a table.
    ///
    /// # Errors
    ///
    /// Returns whatever the connection reports.
    pub fn rename_table(&self, from: &str, to: &str) -> Result<Vec<String>> {
        let statements = vec![self
            .connection
            .dialect()
            .schema_dialect()
            .rename_table(from, to)?];
        self.run_commands(from, &statements)?;
        Ok(statements)
    }

    /// Executes DDL statements in order, then invalidates the cache.
    ///
    /// Stops at the first failure; the cache is still invalidated since
    /// earlier statements may have changed the schema.
    ///
    /// # Errors
    ///
    /// Returns the first error the connection reports.
    pub fn run_commands(&self, table: &str, statements: &[String]) -> Result<()> {
        if statements.is_empty() {
            return Ok(());
        }

        let params = Params::new();
        let outcome = statements.iter().try_for_each(|sql| {
            debug!(sql = %sql, "Executing DDL");
            self.connection.execute(sql, &params).map(|_| ())
        });
        self.invalidate();
        outcome?;

        info!(table, statements = statements.len(), "Schema updated");
        Ok(())
    }

    fn drop(&self, name: &str, if_exists: bool) -> Result<Vec<String>> {
        let statements = vec![self
            .connection
            .dialect()
            .schema_dialect()
            .drop_table(name, if_exists)?];
        self.run_commands(name, &statements)?;
        Ok(statements)
    }

    fn existing(&self, name: &str) -> Result<TableDefinition> {
        self.table(name)?
            .ok_or_else(|| Error::configuration(format!("table '{name}' does not exist")))
    }
}

impl<C: Connection + ?Sized> std::fmt::Debug for SchemaManager<'_, C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SchemaManager")
            .field("dialect", &self.connection.dialect())
            .finish_non_exhaustive()
    }
}

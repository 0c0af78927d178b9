//! SQLite DDL.
//!
//! SQLite cannot alter a column or a primary key in place, and every index
//! lives outside `CREATE TABLE` except the primary key.

use super::{checked_enum, Ddl, SchemaDialect};
use crate::dialect::{Dialect, SqliteDialect};
use crate::error::{Error, Result};
use crate::schema::column::{ColumnDefinition, ColumnType};
use crate::schema::table::{IndexDefinition, IndexKind};

impl SchemaDialect for SqliteDialect {
    fn column_type(&self, column: &ColumnDefinition) -> Result<String> {
        if column.auto_increment && column.ty.is_integer() {
            return Ok(String::from("INTEGER"));
        }
        match &column.ty {
            ColumnType::Enum(options) => checked_enum(self, "TEXT", column, options),
            _ => super::base_column_type(self, column),
        }
    }

    fn auto_increment_clause(&self, column: &ColumnDefinition) -> Option<&'static str> {
        column
            .auto_increment
            .then_some("PRIMARY KEY AUTOINCREMENT")
    }

    fn auto_increment_is_primary_key(&self) -> bool {
        true
    }

    fn index_constraint(&self, table: &str, index: &IndexDefinition) -> Result<Ddl> {
        match index.kind {
            IndexKind::Primary => Ok(Ddl::Clause(format!(
                "PRIMARY KEY ({})",
                self.quote_columns(&index.columns)?
            ))),
            IndexKind::Unique | IndexKind::Plain => {
                Ok(Ddl::Statement(self.create_index(table, index)?))
            }
            IndexKind::Fulltext => Err(Error::unsupported(self.name(), "fulltext index")),
        }
    }

    fn modify_column(
        &self,
        before: &ColumnDefinition,
        after: &ColumnDefinition,
    ) -> Result<Vec<String>> {
        // Compares only what SQLite persists.
        if storage_type(self, before)? != storage_type(self, after)?
            || before.nullable != after.nullable
            || self.default_clause(before)? != self.default_clause(after)?
            || before.auto_increment != after.auto_increment
        {
            return Err(Error::unsupported(self.name(), "modify column"));
        }
        Ok(Vec::new())
    }

    fn add_index(&self, table: &str, index: &IndexDefinition) -> Result<Ddl> {
        match index.kind {
            IndexKind::Primary => Err(Error::unsupported(self.name(), "add primary key")),
            IndexKind::Fulltext => Err(Error::unsupported(self.name(), "fulltext index")),
            IndexKind::Unique | IndexKind::Plain => {
                Ok(Ddl::Statement(self.create_index(table, index)?))
            }
        }
    }

    fn drop_index(
        &self,
        _table: &str,
        _original_table: &str,
        index: &IndexDefinition,
    ) -> Result<Ddl> {
        if index.kind == IndexKind::Primary {
            return Err(Error::unsupported(self.name(), "drop primary key"));
        }
        Ok(Ddl::Statement(format!(
            "DROP INDEX {}",
            self.quote_name(&index.name)?
        )))
    }

    fn separate_alter_clauses(&self) -> bool {
        true
    }
}

/// The declared type as SQLite reports it back, without `CHECK`.
fn storage_type(dialect: &SqliteDialect, column: &ColumnDefinition) -> Result<String> {
    let declared = dialect.column_type(column)?;
    Ok(declared
        .split_once(" CHECK")
        .map_or(declared.as_str(), |(ty, _)| ty)
        .to_string())
}

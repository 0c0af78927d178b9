//! SQL Server DDL.

use super::{checked_enum, type_changed, Ddl, SchemaDialect};
use crate::dialect::{Dialect, SqlServerDialect};
use crate::error::{Error, Result};
use crate::schema::column::{ColumnDefinition, ColumnType};
use crate::schema::table::{IndexDefinition, IndexKind};

impl SchemaDialect for SqlServerDialect {
    fn column_type(&self, column: &ColumnDefinition) -> Result<String> {
        Ok(match &column.ty {
            ColumnType::TinyInt => String::from("TINYINT"),
            ColumnType::SmallInt => String::from("SMALLINT"),
            ColumnType::Integer => String::from("INT"),
            ColumnType::BigInt => String::from("BIGINT"),
            ColumnType::String => format!("NVARCHAR({})", column.length.unwrap_or(255)),
            ColumnType::Char => format!("NCHAR({})", column.length.unwrap_or(1)),
            ColumnType::Text => String::from("NVARCHAR(MAX)"),
            ColumnType::Boolean => String::from("BIT"),
            ColumnType::Double => String::from("FLOAT(53)"),
            ColumnType::DateTime => String::from("DATETIME2"),
            ColumnType::Binary => String::from("VARBINARY(MAX)"),
            ColumnType::Enum(options) => checked_enum(self, "NVARCHAR(255)", column, options)?,
            _ => super::base_column_type(self, column)?,
        })
    }

    fn auto_increment_clause(&self, column: &ColumnDefinition) -> Option<&'static str> {
        column.auto_increment.then_some("IDENTITY(1,1)")
    }

    fn rename_table(&self, from: &str, to: &str) -> Result<String> {
        Ok(format!(
            "EXEC sp_rename {}, {}",
            self.quote_string(from),
            self.quote_string(to)
        ))
    }

    fn add_column(&self, column: &ColumnDefinition) -> Result<String> {
        Ok(format!("ADD {}", self.column_definition(column, false)?))
    }

    fn modify_column(
        &self,
        before: &ColumnDefinition,
        after: &ColumnDefinition,
    ) -> Result<Vec<String>> {
        if before.default != after.default {
            return Err(Error::unsupported(self.name(), "change column default"));
        }
        if before.auto_increment != after.auto_increment {
            return Err(Error::unsupported(self.name(), "toggle auto increment"));
        }
        if !type_changed(before, after) && before.nullable == after.nullable {
            return Ok(Vec::new());
        }
        let null = if after.nullable { "NULL" } else { "NOT NULL" };
        Ok(vec![format!(
            "ALTER COLUMN {} {} {null}",
            self.quote_name(&after.name)?,
            self.column_type(after)?
        )])
    }

    fn drop_index(
        &self,
        table: &str,
        _original_table: &str,
        index: &IndexDefinition,
    ) -> Result<Ddl> {
        match index.kind {
            IndexKind::Plain => Ok(Ddl::Statement(format!(
                "DROP INDEX {} ON {}",
                self.quote_name(&index.name)?,
                self.quote_name(table)?
            ))),
            IndexKind::Primary => Err(Error::unsupported(self.name(), "drop primary key")),
            IndexKind::Unique => Ok(Ddl::Clause(format!(
                "DROP CONSTRAINT {}",
                self.quote_name(&index.name)?
            ))),
            IndexKind::Fulltext => Err(Error::unsupported(self.name(), "fulltext index")),
        }
    }

    fn separate_alter_clauses(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::table::TableDefinition;

    #[test]
    fn test_sqlserver_create_table() {
        let mut table = TableDefinition::new("users");
        table.increment("id");
        table.string("name", 50);
        table.boolean("admin");

        assert_eq!(
            SqlServerDialect::new().create_table(&table).unwrap(),
            vec![
                "CREATE TABLE \"users\" (\"id\" INT NOT NULL IDENTITY(1,1), \
                 \"name\" NVARCHAR(50) NOT NULL, \"admin\" BIT NOT NULL, PRIMARY KEY (\"id\"))"
            ]
        );
    }

    #[test]
    fn test_sqlserver_alter_column() {
        let before = ColumnDefinition::new("name", ColumnType::String);
        let mut after = before.clone();
        after.length(80).nullable();
        assert_eq!(
            SqlServerDialect::new().modify_column(&before, &after).unwrap(),
            vec!["ALTER COLUMN \"name\" NVARCHAR(80) NULL"]
        );
    }

    #[test]
    fn test_sqlserver_rename_table() {
        assert_eq!(
            SqlServerDialect::new().rename_table("a", "b").unwrap(),
            "EXEC sp_rename 'a', 'b'"
        );
    }
}

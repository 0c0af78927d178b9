//! DDL generation.
//!
//! [`SchemaDialect`] extends [`Dialect`] with the statements that create,
//! alter, and drop tables. The default methods produce ANSI-flavoured
//! DDL; each database overrides the pieces it spells differently.

mod mysql;
mod postgres;
mod sqlite;
mod sqlserver;

use tracing::warn;

use super::column::{ColumnDefinition, ColumnType, Position};
use super::table::{IndexDefinition, IndexKind, TableDefinition, TableOptions};
use crate::dialect::Dialect;
use crate::error::{Error, Result};

/// A piece of DDL produced for an index or column change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Ddl {
    /// A clause that goes inside `CREATE TABLE (...)` or after `ALTER TABLE t`.
    Clause(String),
    /// A statement of its own.
    Statement(String),
}

/// Trait for dialect-specific DDL generation.
pub trait SchemaDialect: Dialect {
    /// Maps a column type to SQL.
    ///
    /// # Errors
    ///
    /// Returns an error if an enumeration option cannot be quoted.
    fn column_type(&self, column: &ColumnDefinition) -> Result<String> {
        base_column_type(self, column)
    }

    /// Generates a column definition.
    ///
    /// Placement (`FIRST`, `AFTER x`) is only rendered when `placement` is
    /// set, since `CREATE TABLE` never takes it.
    ///
    /// # Errors
    ///
    /// Returns an error if the default value cannot be quoted.
    fn column_definition(&self, column: &ColumnDefinition, placement: bool) -> Result<String> {
        let mut parts = vec![self.quote_name(&column.name)?, self.column_type(column)?];

        if let Some(charset) = self.charset_clause(column) {
            parts.push(charset);
        }
        if let Some(unsigned) = self.unsigned_clause(column) {
            parts.push(String::from(unsigned));
        }
        parts.push(String::from(if column.nullable {
            "NULL"
        } else {
            "NOT NULL"
        }));
        if let Some(default) = self.default_clause(column)? {
            parts.push(default);
        }
        if let Some(auto) = self.auto_increment_clause(column) {
            parts.push(String::from(auto));
        }
        if placement {
            if let Some(position) = self.position_clause(column)? {
                parts.push(position);
            }
        }
        if let Some(comment) = column.comment.as_deref() {
            if let Some(comment) = self.inline_comment(comment) {
                parts.push(comment);
            }
        }

        Ok(parts.join(" "))
    }

    /// Column-level character set and collation.
    fn charset_clause(&self, _column: &ColumnDefinition) -> Option<String> {
        None
    }

    /// `UNSIGNED` / `UNSIGNED ZEROFILL`.
    fn unsigned_clause(&self, _column: &ColumnDefinition) -> Option<&'static str> {
        None
    }

    /// Renders `DEFAULT value`.
    ///
    /// # Errors
    ///
    /// Returns an error if the value cannot be quoted.
    fn default_clause(&self, column: &ColumnDefinition) -> Result<Option<String>> {
        if column.auto_increment {
            return Ok(None);
        }
        column
            .default
            .as_ref()
            .map(|d| Ok(format!("DEFAULT {}", self.quote(&d.to_value())?)))
            .transpose()
    }

    /// The auto-increment keyword, when it is not part of the type.
    fn auto_increment_clause(&self, _column: &ColumnDefinition) -> Option<&'static str> {
        None
    }

    /// `FIRST` or `AFTER column`.
    ///
    /// # Errors
    ///
    /// Returns an error if the reference column name cannot be quoted.
    fn position_clause(&self, _column: &ColumnDefinition) -> Result<Option<String>> {
        Ok(None)
    }

    /// Whether comments are part of column and table definitions.
    fn inline_comments(&self) -> bool {
        false
    }

    /// Renders an inline column comment.
    fn inline_comment(&self, _comment: &str) -> Option<String> {
        None
    }

    /// Statement setting or clearing a table comment.
    ///
    /// # Errors
    ///
    /// Returns an error if a name cannot be quoted.
    fn table_comment(&self, _table: &str, _comment: Option<&str>) -> Result<Option<String>> {
        Ok(None)
    }

    /// Statement setting or clearing a column comment.
    ///
    /// # Errors
    ///
    /// Returns an error if a name cannot be quoted.
    fn column_comment(
        &self,
        _table: &str,
        _column: &str,
        _comment: Option<&str>,
    ) -> Result<Option<String>> {
        Ok(None)
    }

    /// Renders table options after the closing parenthesis of `CREATE TABLE`.
    fn table_options(&self, options: &TableOptions) -> Option<String> {
        warn_ignored_options(self.name(), options);
        None
    }

    /// Renders an index inside `CREATE TABLE`, or as a statement after it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedOperation`] for index kinds the database
    /// lacks.
    fn index_constraint(&self, table: &str, index: &IndexDefinition) -> Result<Ddl> {
        let columns = self.quote_columns(&index.columns)?;
        match index.kind {
            IndexKind::Primary => Ok(Ddl::Clause(format!("PRIMARY KEY ({columns})"))),
            IndexKind::Unique => Ok(Ddl::Clause(format!(
                "CONSTRAINT {} UNIQUE ({columns})",
                self.quote_name(&index.name)?
            ))),
            IndexKind::Plain => Ok(Ddl::Statement(self.create_index(table, index)?)),
            IndexKind::Fulltext => Err(Error::unsupported(self.name(), "fulltext index")),
        }
    }

    /// Whether the auto-increment keyword already declares the primary key.
    fn auto_increment_is_primary_key(&self) -> bool {
        false
    }

    /// Generates `CREATE [UNIQUE] INDEX`.
    ///
    /// # Errors
    ///
    /// Returns an error if a name cannot be quoted.
    fn create_index(&self, table: &str, index: &IndexDefinition) -> Result<String> {
        let unique = if index.kind == IndexKind::Unique {
            "UNIQUE "
        } else {
            ""
        };
        Ok(format!(
            "CREATE {unique}INDEX {} ON {} ({})",
            self.quote_name(&index.name)?,
            self.quote_name(table)?,
            self.quote_columns(&index.columns)?
        ))
    }

    /// Generates the statements creating a table.
    ///
    /// # Errors
    ///
    /// Returns an error if any column or index cannot be rendered.
    fn create_table(&self, table: &TableDefinition) -> Result<Vec<String>> {
        let mut definitions = Vec::new();
        for column in &table.columns {
            definitions.push(self.column_definition(column, false)?);
        }

        let mut after = Vec::new();
        for index in &table.indexes {
            if index.kind == IndexKind::Primary
                && self.auto_increment_is_primary_key()
                && matches!(index.columns.as_slice(), [c] if table.column(c).is_some_and(|c| c.auto_increment))
            {
                continue;
            }
            match self.index_constraint(&table.name, index)? {
                Ddl::Clause(clause) => definitions.push(clause),
                Ddl::Statement(statement) => after.push(statement),
            }
        }

        let if_not_exists = if table.if_not_exists {
            "IF NOT EXISTS "
        } else {
            ""
        };
        let mut sql = format!(
            "CREATE TABLE {if_not_exists}{} ({})",
            self.quote_name(&table.name)?,
            definitions.join(", ")
        );
        if let Some(options) = self.table_options(&table.options) {
            sql.push(' ');
            sql.push_str(&options);
        }

        let mut statements = vec![sql];
        statements.extend(after);
        if !self.inline_comments() {
            if let Some(comment) = table.options.comment.as_deref() {
                statements.extend(self.table_comment(&table.name, Some(comment))?);
            }
            for column in &table.columns {
                if let Some(comment) = column.comment.as_deref() {
                    statements.extend(self.column_comment(&table.name, &column.name, Some(comment))?);
                }
            }
        }
        Ok(statements)
    }

    /// Generates `DROP TABLE`.
    ///
    /// # Errors
    ///
    /// Returns an error if the name cannot be quoted.
    fn drop_table(&self, name: &str, if_exists: bool) -> Result<String> {
        let if_exists = if if_exists { "IF EXISTS " } else { "" };
        Ok(format!("DROP TABLE {if_exists}{}", self.quote_name(name)?))
    }

    /// Generates the statement renaming a table.
    ///
    /// # Errors
    ///
    /// Returns an error if a name cannot be quoted.
    fn rename_table(&self, from: &str, to: &str) -> Result<String> {
        Ok(format!(
            "ALTER TABLE {} RENAME TO {}",
            self.quote_name(from)?,
            self.quote_name(to)?
        ))
    }

    /// `ALTER TABLE` clause adding a column.
    ///
    /// # Errors
    ///
    /// Returns an error if the column cannot be rendered.
    fn add_column(&self, column: &ColumnDefinition) -> Result<String> {
        Ok(format!("ADD COLUMN {}", self.column_definition(column, true)?))
    }

    /// `ALTER TABLE` clauses changing a column in place.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedOperation`] for changes the database
    /// cannot make in place.
    fn modify_column(
        &self,
        before: &ColumnDefinition,
        after: &ColumnDefinition,
    ) -> Result<Vec<String>> {
        if before.auto_increment != after.auto_increment {
            return Err(Error::unsupported(self.name(), "toggle auto increment"));
        }

        let name = self.quote_name(&after.name)?;
        let mut clauses = Vec::new();
        if type_changed(before, after) {
            clauses.push(format!(
                "ALTER COLUMN {name} TYPE {}",
                self.column_type(after)?
            ));
        }
        if before.nullable != after.nullable {
            let action = if after.nullable { "DROP" } else { "SET" };
            clauses.push(format!("ALTER COLUMN {name} {action} NOT NULL"));
        }
        if before.default != after.default {
            match self.default_clause(after)? {
                Some(default) => clauses.push(format!("ALTER COLUMN {name} SET {default}")),
                None => clauses.push(format!("ALTER COLUMN {name} DROP DEFAULT")),
            }
        }
        Ok(clauses)
    }

    /// `ALTER TABLE` clause dropping a column.
    ///
    /// # Errors
    ///
    /// Returns an error if the name cannot be quoted.
    fn drop_column(&self, name: &str) -> Result<String> {
        Ok(format!("DROP COLUMN {}", self.quote_name(name)?))
    }

    /// DDL adding an index to an existing table.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedOperation`] for index kinds the database
    /// lacks.
    fn add_index(&self, table: &str, index: &IndexDefinition) -> Result<Ddl> {
        match self.index_constraint(table, index)? {
            Ddl::Clause(clause) => Ok(Ddl::Clause(format!("ADD {clause}"))),
            statement @ Ddl::Statement(_) => Ok(statement),
        }
    }

    /// DDL dropping an index from an existing table.
    ///
    /// `table` is the current name of the table. `original_table` is its
    /// name before any rename in the same diff; the primary key constraint
    /// is still named after it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedOperation`] for index kinds the database
    /// lacks.
    fn drop_index(
        &self,
        _table: &str,
        original_table: &str,
        index: &IndexDefinition,
    ) -> Result<Ddl> {
        match index.kind {
            IndexKind::Primary => Ok(Ddl::Clause(format!(
                "DROP CONSTRAINT {}",
                self.quote_name(&format!("{original_table}_pkey"))?
            ))),
            IndexKind::Unique => Ok(Ddl::Clause(format!(
                "DROP CONSTRAINT {}",
                self.quote_name(&index.name)?
            ))),
            IndexKind::Plain => Ok(Ddl::Statement(format!(
                "DROP INDEX {}",
                self.quote_name(&index.name)?
            ))),
            IndexKind::Fulltext => Err(Error::unsupported(self.name(), "fulltext index")),
        }
    }

    /// Statements applying changed table options.
    ///
    /// # Errors
    ///
    /// Returns an error if a name or value cannot be quoted.
    fn alter_table_options(
        &self,
        _table: &str,
        before: &TableOptions,
        after: &TableOptions,
    ) -> Result<Vec<String>> {
        if before.engine != after.engine
            || before.charset != after.charset
            || before.collation != after.collation
        {
            warn!(
                dialect = self.name(),
                "Ignoring table storage options (unsupported by this database)"
            );
        }
        Ok(Vec::new())
    }

    /// Whether every `ALTER TABLE` clause needs a statement of its own.
    fn separate_alter_clauses(&self) -> bool {
        false
    }

    /// Quotes and comma-joins column names.
    ///
    /// # Errors
    ///
    /// Returns an error if a name cannot be quoted.
    fn quote_columns(&self, columns: &[String]) -> Result<String> {
        let quoted = columns
            .iter()
            .map(|c| self.quote_name(c))
            .collect::<Result<Vec<_>>>()?;
        Ok(quoted.join(", "))
    }
}

/// ANSI type names; integer lengths and custom lengths are appended.
fn base_column_type<D: SchemaDialect + ?Sized>(
    dialect: &D,
    column: &ColumnDefinition,
) -> Result<String> {
    let sized = |name: &str| match column.length {
        Some(n) => format!("{name}({n})"),
        None => String::from(name),
    };
    Ok(match &column.ty {
        ColumnType::TinyInt => sized("TINYINT"),
        ColumnType::SmallInt => sized("SMALLINT"),
        ColumnType::Integer => sized("INTEGER"),
        ColumnType::BigInt => sized("BIGINT"),
        ColumnType::String => format!("VARCHAR({})", column.length.unwrap_or(255)),
        ColumnType::Char => format!("CHAR({})", column.length.unwrap_or(1)),
        ColumnType::Text => String::from("TEXT"),
        ColumnType::Boolean => String::from("BOOLEAN"),
        ColumnType::Decimal => decimal(column),
        ColumnType::Float => String::from("FLOAT"),
        ColumnType::Double => String::from("DOUBLE"),
        ColumnType::Date => String::from("DATE"),
        ColumnType::DateTime => String::from("DATETIME"),
        ColumnType::Timestamp => String::from("TIMESTAMP"),
        ColumnType::Time => String::from("TIME"),
        ColumnType::Binary => String::from("BLOB"),
        ColumnType::Enum(options) => format!("ENUM({})", quote_options(dialect, options)),
        ColumnType::Custom(name) => sized(name),
    })
}

/// `DECIMAL(p, s)`, `DECIMAL(p)`, or `DECIMAL`.
pub(crate) fn decimal(column: &ColumnDefinition) -> String {
    match (column.precision, column.scale) {
        (Some(p), Some(s)) => format!("DECIMAL({p}, {s})"),
        (Some(p), None) => format!("DECIMAL({p})"),
        _ => String::from("DECIMAL"),
    }
}

/// Quotes enumeration options as string literals.
pub(crate) fn quote_options<D: Dialect + ?Sized>(dialect: &D, options: &[String]) -> String {
    options
        .iter()
        .map(|o| dialect.quote_string(o))
        .collect::<Vec<_>>()
        .join(", ")
}

/// An enumeration emulated with a `CHECK` constraint.
pub(crate) fn checked_enum<D: Dialect + ?Sized>(
    dialect: &D,
    base: &str,
    column: &ColumnDefinition,
    options: &[String],
) -> Result<String> {
    Ok(format!(
        "{base} CHECK ({} IN ({}))",
        dialect.quote_name(&column.name)?,
        quote_options(dialect, options)
    ))
}

/// Whether anything that shapes the stored type differs.
pub(crate) fn type_changed(before: &ColumnDefinition, after: &ColumnDefinition) -> bool {
    before.ty != after.ty
        || before.length != after.length
        || before.precision != after.precision
        || before.scale != after.scale
        || before.unsigned != after.unsigned
        || before.zerofill != after.zerofill
        || before.charset != after.charset
        || before.collation != after.collation
}

/// Renders `FIRST` / `AFTER x` placement.
pub(crate) fn placement<D: Dialect + ?Sized>(
    dialect: &D,
    column: &ColumnDefinition,
) -> Result<Option<String>> {
    match &column.position {
        Some(Position::First) => Ok(Some(String::from("FIRST"))),
        Some(Position::After(after)) => Ok(Some(format!("AFTER {}", dialect.quote_name(after)?))),
        None => Ok(None),
    }
}

fn warn_ignored_options(dialect: &str, options: &TableOptions) {
    if options.engine.is_some() || options.charset.is_some() || options.collation.is_some() {
        warn!(
            dialect,
            "Ignoring table storage options (unsupported by this database)"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::{PostgresDialect, SqlServerDialect};

    fn users() -> TableDefinition {
        let mut table = TableDefinition::new("users");
        table.increment("id");
        table.string("email", 100);
        table.boolean("active").default(true);
        table.unique(["email"]);
        table
    }

    #[test]
    fn test_column_definition() {
        let mut column = ColumnDefinition::new("price", ColumnType::Decimal);
        column.precision(10, 2).nullable().default(0);
        assert_eq!(
            SqlServerDialect::new().column_definition(&column, true).unwrap(),
            "\"price\" DECIMAL(10, 2) NULL DEFAULT 0"
        );
    }

    #[test]
    fn test_modify_column_clauses() {
        let before = ColumnDefinition::new("name", ColumnType::String);
        let mut after = before.clone();
        after.length(50).nullable().default("x");

        let clauses = PostgresDialect::new().modify_column(&before, &after).unwrap();
        assert_eq!(
            clauses,
            vec![
                "ALTER COLUMN \"name\" TYPE VARCHAR(50)",
                "ALTER COLUMN \"name\" DROP NOT NULL",
                "ALTER COLUMN \"name\" SET DEFAULT 'x'",
            ]
        );

        let mut cleared = after.clone();
        cleared.no_default();
        assert_eq!(
            PostgresDialect::new().modify_column(&after, &cleared).unwrap(),
            vec!["ALTER COLUMN \"name\" DROP DEFAULT"]
        );
    }

    #[test]
    fn test_drop_table() {
        let dialect = PostgresDialect::new();
        assert_eq!(dialect.drop_table("users", false).unwrap(), "DROP TABLE \"users\"");
        assert_eq!(
            dialect.drop_table("users", true).unwrap(),
            "DROP TABLE IF EXISTS \"users\""
        );
    }

    #[test]
    fn test_plain_index_is_separate_statement() {
        let mut table = users();
        table.index(["active"]);
        let statements = SqlServerDialect::new().create_table(&table).unwrap();
        assert_eq!(statements.len(), 2);
        assert_eq!(
            statements[1],
            "CREATE INDEX \"active_index\" ON \"users\" (\"active\")"
        );
        assert!(statements[0].contains("CONSTRAINT \"email_unique\" UNIQUE (\"email\")"));
    }

    #[test]
    fn test_fulltext_unsupported() {
        let mut table = users();
        table.fulltext(["email"]);
        assert!(matches!(
            PostgresDialect::new().create_table(&table),
            Err(Error::UnsupportedOperation { .. })
        ));
    }
}

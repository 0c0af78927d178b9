//! Schema diff engine.
//!
//! Compares a "before" (live) and "after" (desired) [`TableDefinition`] and
//! produces the ordered DDL statements that turn one into the other.
//!
//! Either side may be absent: `(None, Some)` creates the table,
//! `(Some, None)` drops it. When both are present, every column and index
//! change for the table is folded into one `ALTER TABLE` statement, except
//! where the dialect needs statements of their own.

use std::collections::BTreeMap;

use super::dialect::{Ddl, SchemaDialect};
use super::table::{IndexDefinition, TableDefinition};
use crate::error::Result;

/// Computes the DDL converting `before` into `after`.
///
/// `after` is validated first, so no statement is produced for a
/// definition that refers to missing columns.
///
/// # Errors
///
/// Returns [`crate::Error::Configuration`] for an invalid `after`
/// definition and [`crate::Error::UnsupportedOperation`] for changes the
/// dialect cannot express.
pub fn diff<D: SchemaDialect + ?Sized>(
    before: Option<&TableDefinition>,
    after: Option<&TableDefinition>,
    dialect: &D,
) -> Result<Vec<String>> {
    match (before, after) {
        (None, None) => Ok(Vec::new()),
        (None, Some(after)) => {
            after.validate()?;
            dialect.create_table(after)
        }
        (Some(before), None) => Ok(vec![dialect.drop_table(&before.name, false)?]),
        (Some(before), Some(after)) => {
            after.validate()?;
            alter(before, after, dialect)
        }
    }
}

fn alter<D: SchemaDialect + ?Sized>(
    before: &TableDefinition,
    after: &TableDefinition,
    dialect: &D,
) -> Result<Vec<String>> {
    let mut statements = Vec::new();
    if before.name != after.name {
        statements.push(dialect.rename_table(&before.name, &after.name)?);
    }
    let table = after.name.as_str();

    let old_indexes: BTreeMap<&str, &IndexDefinition> = before
        .indexes
        .iter()
        .map(|i| (i.name.as_str(), i))
        .collect();
    let new_indexes: BTreeMap<&str, &IndexDefinition> = after
        .indexes
        .iter()
        .map(|i| (i.name.as_str(), i))
        .collect();

    let mut leading = Vec::new();
    let mut clauses = Vec::new();
    let mut trailing = Vec::new();

    // Indexes that vanished or changed go first, before their columns do.
    for index in &before.indexes {
        if new_indexes.get(index.name.as_str()) != Some(&index) {
            match dialect.drop_index(table, &before.name, index)? {
                Ddl::Clause(clause) => clauses.push(clause),
                Ddl::Statement(statement) => leading.push(statement),
            }
        }
    }

    for column in &after.columns {
        if before.column(&column.name).is_none() {
            clauses.push(dialect.add_column(column)?);
        }
    }

    for column in &after.columns {
        if let Some(old) = before.column(&column.name) {
            if !old.same_shape(column) {
                clauses.extend(dialect.modify_column(old, column)?);
            }
        }
    }

    for column in &before.columns {
        if after.column(&column.name).is_none() {
            clauses.push(dialect.drop_column(&column.name)?);
        }
    }

    for index in &after.indexes {
        if old_indexes.get(index.name.as_str()) != Some(&index) {
            match dialect.add_index(table, index)? {
                Ddl::Clause(clause) => clauses.push(clause),
                Ddl::Statement(statement) => trailing.push(statement),
            }
        }
    }

    statements.extend(leading);
    if !clauses.is_empty() {
        let quoted = dialect.quote_name(table)?;
        if dialect.separate_alter_clauses() {
            statements.extend(
                clauses
                    .iter()
                    .map(|clause| format!("ALTER TABLE {quoted} {clause}")),
            );
        } else {
            statements.push(format!("ALTER TABLE {quoted} {}", clauses.join(", ")));
        }
    }
    statements.extend(trailing);
    statements.extend(dialect.alter_table_options(table, &before.options, &after.options)?);

    if !dialect.inline_comments() {
        if before.options.comment != after.options.comment {
            statements.extend(dialect.table_comment(table, after.options.comment.as_deref())?);
        }
        for column in &after.columns {
            let old_comment = before.column(&column.name).and_then(|c| c.comment.as_deref());
            if old_comment != column.comment.as_deref() {
                statements.extend(dialect.column_comment(
                    table,
                    &column.name,
                    column.comment.as_deref(),
                )?);
            }
        }
    }

    Ok(statements)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::{MysqlDialect, PostgresDialect, SqliteDialect};
    use crate::error::Error;

    fn users() -> TableDefinition {
        let mut table = TableDefinition::new("users");
        table.increment("id");
        table.string("email", 255);
        table.string("name", 100).nullable();
        table.unique(["email"]);
        table
    }

    #[test]
    fn test_identical_tables_produce_nothing() {
        let table = users();
        assert!(diff(Some(&table), Some(&table), &MysqlDialect::new())
            .unwrap()
            .is_empty());
        assert!(diff(None, None, &MysqlDialect::new()).unwrap().is_empty());
    }

    #[test]
    fn test_create_then_drop() {
        let table = users();
        let dialect = MysqlDialect::new();
        let create = diff(None, Some(&table), &dialect).unwrap();
        assert!(create[0].starts_with("CREATE TABLE `users`"));
        assert_eq!(
            diff(Some(&table), None, &dialect).unwrap(),
            vec!["DROP TABLE `users`"]
        );
    }

    #[test]
    fn test_single_alter_statement() {
        let before = users();
        let mut after = before.clone();
        after.integer("age").nullable().after("name");
        after.change("name").unwrap().length(150);
        after.drop("email").unwrap();

        assert_eq!(
            diff(Some(&before), Some(&after), &MysqlDialect::new()).unwrap(),
            vec![
                "ALTER TABLE `users` DROP INDEX `email_unique`, \
                 ADD `age` INTEGER NULL AFTER `name`, \
                 MODIFY `name` VARCHAR(150) NULL, \
                 DROP COLUMN `email`"
            ]
        );
    }

    #[test]
    fn test_rename_is_copy_then_drop() {
        let before = users();
        let mut after = before.clone();
        after.rename("email", "mail").unwrap();

        assert_eq!(
            diff(Some(&before), Some(&after), &MysqlDialect::new()).unwrap(),
            vec![
                "ALTER TABLE `users` DROP INDEX `email_unique`, \
                 ADD `mail` VARCHAR(255) NOT NULL AFTER `id`, \
                 DROP COLUMN `email`, \
                 ADD UNIQUE INDEX `email_unique` (`mail`)"
            ]
        );
    }

    #[test]
    fn test_sqlite_splits_clauses() {
        let before = users();
        let mut after = before.clone();
        after.text("bio").nullable();
        after.index(["name"]);

        assert_eq!(
            diff(Some(&before), Some(&after), &SqliteDialect::new()).unwrap(),
            vec![
                "ALTER TABLE \"users\" ADD COLUMN \"bio\" TEXT NULL",
                "CREATE INDEX \"name_index\" ON \"users\" (\"name\")",
            ]
        );
    }

    #[test]
    fn test_table_rename_comes_first() {
        let before = users();
        let mut after = before.clone();
        after.rename_to("members");
        after.boolean("active").default(false);

        assert_eq!(
            diff(Some(&before), Some(&after), &PostgresDialect::new()).unwrap(),
            vec![
                "ALTER TABLE \"users\" RENAME TO \"members\"",
                "ALTER TABLE \"members\" ADD COLUMN \"active\" BOOLEAN NOT NULL DEFAULT '0'",
            ]
        );
    }

    #[test]
    fn test_primary_key_keeps_original_constraint_name() {
        let before = users();
        let mut after = before.clone();
        after.rename_to("members");
        after.primary(["id", "email"]);

        assert_eq!(
            diff(Some(&before), Some(&after), &PostgresDialect::new()).unwrap(),
            vec![
                "ALTER TABLE \"users\" RENAME TO \"members\"",
                "ALTER TABLE \"members\" DROP CONSTRAINT \"users_pkey\", \
                 ADD PRIMARY KEY (\"id\", \"email\")",
            ]
        );
    }

    #[test]
    fn test_postgres_comment_changes() {
        let before = users();
        let mut after = before.clone();
        after.change("name").unwrap().comment("full name");
        after.comment("accounts");

        assert_eq!(
            diff(Some(&before), Some(&after), &PostgresDialect::new()).unwrap(),
            vec![
                "COMMENT ON TABLE \"users\" IS 'accounts'",
                "COMMENT ON COLUMN \"users\".\"name\" IS 'full name'",
            ]
        );
    }

    #[test]
    fn test_invalid_after_fails_fast() {
        let before = users();
        let mut after = before.clone();
        after.index(["missing"]);
        assert!(matches!(
            diff(Some(&before), Some(&after), &MysqlDialect::new()),
            Err(Error::Configuration(_))
        ));
        assert!(matches!(
            diff(None, Some(&after), &MysqlDialect::new()),
            Err(Error::Configuration(_))
        ));
    }
}

//! Schema manager and differ behaviour against a recording connection.

mod common;

use common::{users_table, MemoryConnection};
use dbal_core::dialect::MysqlDialect;
use dbal_core::schema::ColumnType;
use dbal_core::{diff, Database, DialectKind, Error};

#[test]
fn test_diff_of_identical_tables_is_empty() {
    let table = users_table();
    for kind in [
        DialectKind::Mysql,
        DialectKind::Postgres,
        DialectKind::SqlServer,
        DialectKind::Sqlite,
    ] {
        assert!(
            diff(Some(&table), Some(&table), kind.schema_dialect())
                .unwrap()
                .is_empty(),
            "{kind}"
        );
    }
}

#[test]
fn test_create_then_drop() {
    let db = Database::new(MemoryConnection::new(DialectKind::Mysql));
    let schema = db.schema();

    let created = schema
        .create_table("users", |t| {
            t.increment("id");
            t.string("email", 255).comment("login");
            t.unique(["email"]);
            t.engine("InnoDB");
            Ok(())
        })
        .unwrap();
    assert_eq!(
        created,
        vec![
            "CREATE TABLE `users` (`id` INTEGER UNSIGNED NOT NULL AUTO_INCREMENT, \
             `email` VARCHAR(255) NOT NULL COMMENT 'login', PRIMARY KEY (`id`), \
             UNIQUE KEY `email_unique` (`email`)) ENGINE = InnoDB"
        ]
    );

    schema.drop_table("users").unwrap();
    schema.drop_table_if_exists("users").unwrap();
    assert_eq!(
        db.connection().executed()[1..],
        ["DROP TABLE `users`", "DROP TABLE IF EXISTS `users`"]
    );
}

#[test]
fn test_rename_column_is_add_then_drop() {
    let connection = MemoryConnection::with_tables(DialectKind::Mysql, vec![users_table()]);
    let db = Database::new(&connection);

    let statements = db
        .schema()
        .alter_table("users", |t| {
            t.rename("name", "full_name")?;
            Ok(())
        })
        .unwrap();

    assert_eq!(
        statements,
        vec![
            "ALTER TABLE `users` ADD `full_name` VARCHAR(100) NULL AFTER `email`, DROP COLUMN `name`"
        ]
    );
    assert_eq!(connection.executed(), statements);
}

#[test]
fn test_alter_missing_table_fails() {
    let db = Database::new(MemoryConnection::new(DialectKind::Postgres));
    let result = db.schema().alter_table("ghost", |_| Ok(()));
    assert!(matches!(result, Err(Error::Configuration(_))));
    assert!(db.connection().executed().is_empty());
}

#[test]
fn test_snapshot_is_cached_until_ddl_runs() {
    let connection = MemoryConnection::with_tables(DialectKind::Sqlite, vec![users_table()]);
    let db = Database::new(&connection);
    let schema = db.schema();

    assert!(schema.has_table("users").unwrap());
    assert!(schema.has_column("users", "email").unwrap());
    assert!(!schema.has_column("users", "missing").unwrap());
    assert_eq!(schema.list_table_names().unwrap(), vec!["users"]);
    assert_eq!(
        schema.list_column_names("users").unwrap(),
        vec!["id", "email", "name"]
    );
    assert_eq!(connection.snapshot_count(), 1);

    schema
        .alter_table("users", |t| {
            t.column_of("age", ColumnType::Integer).nullable();
            Ok(())
        })
        .unwrap();
    assert_eq!(
        connection.executed(),
        vec!["ALTER TABLE \"users\" ADD COLUMN \"age\" INTEGER NULL"]
    );

    let mut altered = users_table();
    altered.integer("age").nullable();
    connection.set_tables(vec![altered]);
    assert!(schema.has_column("users", "age").unwrap());
    assert_eq!(connection.snapshot_count(), 2);
}

#[test]
fn test_unchanged_alter_runs_nothing() {
    let connection = MemoryConnection::with_tables(DialectKind::Postgres, vec![users_table()]);
    let db = Database::new(&connection);
    let statements = db.schema().alter_table("users", |_| Ok(())).unwrap();
    assert!(statements.is_empty());
    assert!(connection.executed().is_empty());
}

#[test]
fn test_rename_table() {
    let db = Database::new(MemoryConnection::new(DialectKind::Mysql));
    db.schema().rename_table("users", "members").unwrap();
    assert_eq!(
        db.connection().executed(),
        vec!["RENAME TABLE `users` TO `members`"]
    );
}

#[test]
fn test_index_over_missing_column_emits_nothing() {
    let db = Database::new(MemoryConnection::new(DialectKind::Mysql));
    let result = db.schema().create_table("broken", |t| {
        t.integer("a");
        t.index(["b"]);
        Ok(())
    });
    assert!(matches!(result, Err(Error::Configuration(_))));
    assert!(db.connection().executed().is_empty());
}

#[test]
fn test_create_then_drop_diff_restores_nothing() {
    let table = users_table();
    let dialect = MysqlDialect::new();
    let create = diff(None, Some(&table), &dialect).unwrap();
    let drop = diff(Some(&table), None, &dialect).unwrap();
    assert_eq!(create.len(), 1);
    assert_eq!(drop, vec!["DROP TABLE `users`"]);
}

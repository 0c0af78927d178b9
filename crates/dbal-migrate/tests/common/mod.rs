#![allow(dead_code)]

use std::path::{Path, PathBuf};

use dbal_core::{Database, TableDefinition};
use dbal_migrate::SqliteConnection;

/// A database facade over a fresh in-memory SQLite database.
pub fn memory_db() -> Database<SqliteConnection> {
    Database::new(SqliteConnection::connect("sqlite::memory:").unwrap())
}

/// The `users` table most tests start from.
pub fn users_table() -> TableDefinition {
    let mut table = TableDefinition::new("users");
    table.increment("id");
    table.string("email", 255);
    table.string("name", 100).nullable();
    table.boolean("active").default(true);
    table.unique(["email"]);
    table
}

/// Writes a definition as JSON into `dir`.
pub fn write_definition(dir: &Path, definition: &TableDefinition) -> PathBuf {
    let path = dir.join(format!("{}.json", definition.name));
    std::fs::write(&path, serde_json::to_string_pretty(definition).unwrap()).unwrap();
    path
}

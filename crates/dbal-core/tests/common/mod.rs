#![allow(dead_code)]

use std::cell::{Cell, RefCell};

use dbal_core::{Connection, DialectKind, Params, QueryResult, Result, TableDefinition};

/// A connection that records every statement instead of running it.
pub struct MemoryConnection {
    dialect: DialectKind,
    executed: RefCell<Vec<String>>,
    tables: RefCell<Vec<TableDefinition>>,
    snapshots: Cell<usize>,
}

impl MemoryConnection {
    pub fn new(dialect: DialectKind) -> Self {
        Self {
            dialect,
            executed: RefCell::new(Vec::new()),
            tables: RefCell::new(Vec::new()),
            snapshots: Cell::new(0),
        }
    }

    pub fn with_tables(dialect: DialectKind, tables: Vec<TableDefinition>) -> Self {
        let connection = Self::new(dialect);
        *connection.tables.borrow_mut() = tables;
        connection
    }

    /// Replaces the live schema the next snapshot will report.
    pub fn set_tables(&self, tables: Vec<TableDefinition>) {
        *self.tables.borrow_mut() = tables;
    }

    pub fn executed(&self) -> Vec<String> {
        self.executed.borrow().clone()
    }

    pub fn snapshot_count(&self) -> usize {
        self.snapshots.get()
    }
}

impl Connection for MemoryConnection {
    fn dialect(&self) -> DialectKind {
        self.dialect
    }

    fn execute(&self, sql: &str, _params: &Params) -> Result<QueryResult> {
        self.executed.borrow_mut().push(sql.to_string());
        Ok(QueryResult::Affected(0))
    }

    fn schema_snapshot(&self) -> Result<Vec<TableDefinition>> {
        self.snapshots.set(self.snapshots.get() + 1);
        Ok(self.tables.borrow().clone())
    }
}

/// `users(id, email unique, name nullable)`.
pub fn users_table() -> TableDefinition {
    let mut table = TableDefinition::new("users");
    table.increment("id");
    table.string("email", 255);
    table.string("name", 100).nullable();
    table.unique(["email"]);
    table
}

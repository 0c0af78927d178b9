//! The connection seam and the [`Database`] entry point.
//!
//! Nothing in this crate talks to a database. A [`Connection`] does: it
//! names its dialect, executes SQL, and introspects the live schema.
//! [`Database`] wraps one and hands out builders, compiles them with the
//! connection's dialect, and executes the result.

use std::collections::BTreeMap;

use tracing::debug;

use crate::dialect::{Dialect, DialectKind};
use crate::error::Result;
use crate::expr::Identifier;
use crate::query::{Delete, Insert, Query, Select, Update};
use crate::schema::{SchemaManager, TableDefinition};
use crate::value::{ToValue, Value};

/// Named parameters bound at execution time (`:name` placeholders).
pub type Params = BTreeMap<String, Value>;

/// One result row, keyed by column name.
pub type Row = BTreeMap<String, Value>;

/// What executing a statement produced.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryResult {
    /// Rows returned by a SELECT.
    Rows(Vec<Row>),
    /// Rows touched by an UPDATE, DELETE, or DDL statement.
    Affected(u64),
    /// The outcome of an INSERT.
    Inserted {
        last_id: Option<i64>,
        affected: u64,
    },
}

impl QueryResult {
    /// Returns the rows of a SELECT, or an empty slice.
    #[must_use]
    pub fn rows(&self) -> &[Row] {
        match self {
            Self::Rows(rows) => rows,
            _ => &[],
        }
    }

    /// Returns the number of rows affected.
    #[must_use]
    pub fn affected(&self) -> u64 {
        match self {
            Self::Rows(rows) => rows.len() as u64,
            Self::Affected(n) | Self::Inserted { affected: n, .. } => *n,
        }
    }
}

/// A live database connection.
///
/// Implementations wrap driver failures in [`crate::Error::Execution`].
pub trait Connection {
    /// The dialect statements must be compiled with.
    fn dialect(&self) -> DialectKind;

    /// Executes one statement.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Execution`] when the driver fails.
    fn execute(&self, sql: &str, params: &Params) -> Result<QueryResult>;

    /// Introspects every table of the live schema.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Execution`] when the driver fails.
    fn schema_snapshot(&self) -> Result<Vec<TableDefinition>>;

    /// Quotes a scalar for inline use.
    ///
    /// # Errors
    ///
    /// Returns an error for values the dialect cannot render.
    fn quote_scalar(&self, value: &Value) -> Result<String> {
        self.dialect().dialect().quote(value)
    }
}

impl<C: Connection + ?Sized> Connection for &C {
    fn dialect(&self) -> DialectKind {
        (**self).dialect()
    }

    fn execute(&self, sql: &str, params: &Params) -> Result<QueryResult> {
        (**self).execute(sql, params)
    }

    fn schema_snapshot(&self) -> Result<Vec<TableDefinition>> {
        (**self).schema_snapshot()
    }

    fn quote_scalar(&self, value: &Value) -> Result<String> {
        (**self).quote_scalar(value)
    }
}

/// The connection's dialect with scalar escaping handed to the driver.
struct DriverDialect<'c, C: ?Sized> {
    connection: &'c C,
    inner: &'static dyn Dialect,
}

impl<C: Connection + ?Sized> Dialect for DriverDialect<'_, C> {
    fn name(&self) -> &'static str {
        self.inner.name()
    }

    fn identifier_quote(&self) -> char {
        self.inner.identifier_quote()
    }

    fn quote_string(&self, value: &str) -> String {
        self.inner.quote_string(value)
    }

    fn quote_blob(&self, bytes: &[u8]) -> String {
        self.inner.quote_blob(bytes)
    }

    fn escape_scalar(&self, value: &Value) -> Result<String> {
        self.connection.quote_scalar(value)
    }

    fn compile_returning(&self, insert: &Insert) -> Result<Option<String>> {
        self.inner.compile_returning(insert)
    }

    fn join_concat(&self, parts: &[String]) -> String {
        self.inner.join_concat(parts)
    }
}

/// Builder factory and executor bound to one connection.
#[derive(Debug)]
pub struct Database<C> {
    connection: C,
}

impl<C: Connection> Database<C> {
    /// Wraps a connection.
    #[must_use]
    pub const fn new(connection: C) -> Self {
        Self { connection }
    }

    /// Returns the underlying connection.
    #[must_use]
    pub const fn connection(&self) -> &C {
        &self.connection
    }

    /// Unwraps the connection.
    #[must_use]
    pub fn into_inner(self) -> C {
        self.connection
    }

    /// Returns the connection's dialect.
    #[must_use]
    pub fn dialect(&self) -> DialectKind {
        self.connection.dialect()
    }

    /// Starts a SELECT of the given columns; none selects `*`.
    ///
    /// Every builder handed out here is bound to the connection's dialect.
    #[must_use]
    pub fn select<I, T>(&self, columns: I) -> Select
    where
        I: IntoIterator<Item = T>,
        T: Into<Identifier>,
    {
        Select::new().columns(columns).with_dialect(self.dialect())
    }

    /// Starts an INSERT into `table`.
    #[must_use]
    pub fn insert(&self, table: impl Into<Identifier>) -> Insert {
        Insert::new().into_table(table).with_dialect(self.dialect())
    }

    /// Starts an UPDATE of `table`.
    #[must_use]
    pub fn update(&self, table: impl Into<Identifier>) -> Update {
        Update::new().table(table).with_dialect(self.dialect())
    }

    /// Starts a DELETE from `table`.
    #[must_use]
    pub fn delete(&self, table: impl Into<Identifier>) -> Delete {
        Delete::new().from(table).with_dialect(self.dialect())
    }

    /// Quotes a value the way the connection would.
    ///
    /// # Errors
    ///
    /// Returns an error for values the dialect cannot render.
    pub fn quote(&self, value: impl ToValue) -> Result<String> {
        self.connection.quote_scalar(&value.to_value())
    }

    /// Compiles a query with the connection's dialect. Text and blob
    /// values are escaped by [`Connection::quote_scalar`].
    ///
    /// # Errors
    ///
    /// Returns an error if the query is malformed.
    pub fn compile(&self, query: impl Into<Query>) -> Result<String> {
        let dialect = DriverDialect {
            connection: &self.connection,
            inner: self.dialect().dialect(),
        };
        query.into().compile(&dialect)
    }

    /// Compiles and executes a query.
    ///
    /// # Errors
    ///
    /// Returns a compilation error, or whatever the connection reports.
    pub fn execute(&self, query: impl Into<Query>, params: &Params) -> Result<QueryResult> {
        let sql = self.compile(query)?;
        debug!(sql = %sql, "Executing query");
        self.connection.execute(&sql, params)
    }

    /// Returns a schema manager over this connection.
    #[must_use]
    pub fn schema(&self) -> SchemaManager<'_, C> {
        SchemaManager::new(&self.connection)
    }
}

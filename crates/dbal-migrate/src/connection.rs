//! Blocking SQLite connection.
//!
//! [`SqliteConnection`] adapts an sqlx pool to the synchronous
//! [`Connection`] trait by driving it on a runtime it owns. The pool keeps
//! a single connection alive for the lifetime of the value, so
//! `sqlite::memory:` databases survive between statements.

use std::str::FromStr;

use dbal_core::connection::{Connection, Params, QueryResult, Row};
use dbal_core::schema::TableDefinition;
use dbal_core::{DialectKind, Value};
use sqlx::query::Query;
use sqlx::sqlite::{
    SqliteArguments, SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow,
};
use sqlx::{Column, Row as _, Sqlite, TypeInfo, ValueRef};
use tokio::runtime::{Builder, Runtime};
use tracing::debug;

use crate::error::{MigrateError, Result};
use crate::introspect;

/// A [`Connection`] to one SQLite database.
#[derive(Debug)]
pub struct SqliteConnection {
    runtime: Runtime,
    pool: SqlitePool,
}

impl SqliteConnection {
    /// Opens `url` (`sqlite::memory:`, `sqlite:app.db`, ...), creating the
    /// database file if it is missing.
    ///
    /// # Errors
    ///
    /// Returns [`MigrateError::UnsupportedDriver`] for a non-SQLite URL, or
    /// the error raised while starting the runtime or connecting.
    pub fn connect(url: &str) -> Result<Self> {
        if !url.starts_with("sqlite:") {
            return Err(MigrateError::UnsupportedDriver(url.to_string()));
        }

        let runtime = Builder::new_current_thread().enable_all().build()?;
        let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true);
        let pool = runtime.block_on(
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
                .connect_with(options),
        )?;

        debug!(url, "Connected to SQLite");
        Ok(Self { runtime, pool })
    }

    /// The underlying pool.
    #[must_use]
    pub const fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Closes the pool, waiting for the connection to finish.
    pub fn close(self) {
        self.runtime.block_on(self.pool.close());
    }

    async fn run(&self, sql: &str, params: &Params) -> Result<QueryResult> {
        let (sql, names) = number_placeholders(sql);

        let mut query = sqlx::query(&sql);
        for name in &names {
            let value = params.get(name).ok_or_else(|| {
                dbal_core::Error::configuration(format!("missing value for parameter ':{name}'"))
            })?;
            query = bind(query, name, value)?;
        }

        if returns_rows(&sql) {
            let rows = query.fetch_all(&self.pool).await?;
            let rows = rows.iter().map(decode_row).collect::<Result<Vec<_>>>()?;
            return Ok(QueryResult::Rows(rows));
        }

        let done = query.execute(&self.pool).await?;
        if leading_keyword(&sql) == "INSERT" {
            Ok(QueryResult::Inserted {
                last_id: Some(done.last_insert_rowid()),
                affected: done.rows_affected(),
            })
        } else {
            Ok(QueryResult::Affected(done.rows_affected()))
        }
    }
}

impl Connection for SqliteConnection {
    fn dialect(&self) -> DialectKind {
        DialectKind::Sqlite
    }

    fn execute(&self, sql: &str, params: &Params) -> dbal_core::Result<QueryResult> {
        self.runtime
            .block_on(self.run(sql, params))
            .map_err(Into::into)
    }

    fn schema_snapshot(&self) -> dbal_core::Result<Vec<TableDefinition>> {
        self.runtime
            .block_on(introspect::snapshot(&self.pool))
            .map_err(Into::into)
    }
}

/// Rewrites `:name` placeholders to SQLite's numbered `?N` form.
///
/// Returns the rewritten SQL and the distinct names in numbering order.
/// Quoted strings and identifiers are left alone, as is a `::` cast.
fn number_placeholders(sql: &str) -> (String, Vec<String>) {
    let mut out = String::with_capacity(sql.len());
    let mut names: Vec<String> = Vec::new();
    let mut quote: Option<char> = None;
    let mut chars = sql.chars().peekable();
    let mut previous = '\0';

    while let Some(c) = chars.next() {
        if let Some(q) = quote {
            if c == q {
                quote = None;
            }
            out.push(c);
            previous = c;
            continue;
        }

        match c {
            '\'' | '"' | '`' => {
                quote = Some(c);
                out.push(c);
            }
            ':' if previous != ':'
                && chars
                    .peek()
                    .is_some_and(|n| n.is_ascii_alphabetic() || *n == '_') =>
            {
                let mut name = String::new();
                while let Some(&n) = chars.peek() {
                    if n.is_ascii_alphanumeric() || n == '_' {
                        name.push(n);
                        chars.next();
                    } else {
                        break;
                    }
                }
                let index = names.iter().position(|known| *known == name).map_or_else(
                    || {
                        names.push(name);
                        names.len()
                    },
                    |i| i + 1,
                );
                out.push('?');
                out.push_str(&index.to_string());
                previous = '0';
                continue;
            }
            _ => out.push(c),
        }
        previous = c;
    }

    (out, names)
}

fn bind<'q>(
    query: Query<'q, Sqlite, SqliteArguments<'q>>,
    name: &str,
    value: &Value,
) -> Result<Query<'q, Sqlite, SqliteArguments<'q>>> {
    Ok(match value {
        Value::Null => query.bind(None::<i64>),
        Value::Bool(b) => query.bind(*b),
        Value::Int(i) => query.bind(*i),
        Value::Float(f) => query.bind(*f),
        Value::Text(s) => query.bind(s.clone()),
        Value::Blob(bytes) => query.bind(bytes.clone()),
        Value::List(_) | Value::Expr(_) | Value::Query(_) => {
            return Err(dbal_core::Error::configuration(format!(
                "parameter ':{name}' must be a scalar"
            ))
            .into());
        }
    })
}

fn leading_keyword(sql: &str) -> String {
    sql.trim_start()
        .split(|c: char| c.is_whitespace() || c == '(')
        .next()
        .unwrap_or_default()
        .to_ascii_uppercase()
}

fn returns_rows(sql: &str) -> bool {
    matches!(
        leading_keyword(sql).as_str(),
        "SELECT" | "PRAGMA" | "WITH" | "VALUES" | "EXPLAIN"
    ) || sql.to_ascii_uppercase().contains(" RETURNING ")
}

fn decode_row(row: &SqliteRow) -> Result<Row> {
    let mut decoded = Row::new();
    for (i, column) in row.columns().iter().enumerate() {
        let raw = row.try_get_raw(i)?;
        let value = if raw.is_null() {
            Value::Null
        } else {
            let ty = raw.type_info().name().to_ascii_uppercase();
            match ty.as_str() {
                "INTEGER" | "INT" | "INT8" | "BIGINT" | "BOOLEAN" => {
                    Value::Int(row.try_get_unchecked::<i64, _>(i)?)
                }
                "REAL" | "FLOAT" | "DOUBLE" => Value::Float(row.try_get_unchecked::<f64, _>(i)?),
                "BLOB" => Value::Blob(row.try_get_unchecked::<Vec<u8>, _>(i)?),
                _ => Value::Text(row.try_get_unchecked::<String, _>(i)?),
            }
        };
        decoded.insert(column.name().to_string(), value);
    }
    Ok(decoded)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_number_placeholders() {
        let (sql, names) = number_placeholders(
            "UPDATE \"users\" SET \"name\" = :name WHERE \"id\" = :id OR \"parent\" = :id",
        );
        assert_eq!(
            sql,
            "UPDATE \"users\" SET \"name\" = ?1 WHERE \"id\" = ?2 OR \"parent\" = ?2"
        );
        assert_eq!(names, vec!["name", "id"]);
    }

    #[test]
    fn test_placeholders_skip_quotes_and_casts() {
        let (sql, names) =
            number_placeholders("SELECT ':not' AS \"a:b\", x::text FROM t WHERE y = :y");
        assert_eq!(sql, "SELECT ':not' AS \"a:b\", x::text FROM t WHERE y = ?1");
        assert_eq!(names, vec!["y"]);
    }

    #[test]
    fn test_statement_classification() {
        assert!(returns_rows("select 1"));
        assert!(returns_rows("  PRAGMA table_info(\"users\")"));
        assert!(returns_rows(
            "INSERT INTO \"users\" (\"name\") VALUES ('a') RETURNING \"id\""
        ));
        assert!(!returns_rows("INSERT INTO \"users\" (\"name\") VALUES ('a')"));
        assert_eq!(leading_keyword("\ninsert into t"), "INSERT");
    }

    #[test]
    fn test_rejects_other_drivers() {
        assert!(matches!(
            SqliteConnection::connect("postgres://localhost/app"),
            Err(MigrateError::UnsupportedDriver(_))
        ));
    }
}

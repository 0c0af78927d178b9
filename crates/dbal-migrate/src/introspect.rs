//! Reads the live SQLite schema back into table definitions.
//!
//! Column types are recovered from the declared type text, so a table
//! created from a [`TableDefinition`] reads back with the same types,
//! lengths, nullability and defaults. What SQLite does not store
//! (comments, unsigned, placement) reads back empty.

use dbal_core::dialect::{Dialect, SqliteDialect};
use dbal_core::schema::{
    ColumnDefinition, ColumnType, DefaultValue, IndexDefinition, IndexKind, TableDefinition,
};
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{MigrateError, Result};

/// Reads every user table, ordered by name.
///
/// # Errors
///
/// Returns a database error, or [`MigrateError::Introspection`] for a
/// table that cannot be mapped.
pub async fn snapshot(pool: &SqlitePool) -> Result<Vec<TableDefinition>> {
    let names: Vec<String> = sqlx::query_scalar(
        "SELECT name FROM sqlite_master \
         WHERE type = 'table' AND name NOT LIKE 'sqlite_%' \
         ORDER BY name",
    )
    .fetch_all(pool)
    .await?;

    let mut tables = Vec::with_capacity(names.len());
    for name in &names {
        if let Some(table) = table(pool, name).await? {
            tables.push(table);
        }
    }
    debug!(tables = tables.len(), "Introspected SQLite schema");
    Ok(tables)
}

/// Reads one table, or `None` if it does not exist.
///
/// # Errors
///
/// Returns a database error, or [`MigrateError::Introspection`] for a
/// column type or index that cannot be mapped.
pub async fn table(pool: &SqlitePool, name: &str) -> Result<Option<TableDefinition>> {
    let create_sql: Option<Option<String>> =
        sqlx::query_scalar("SELECT sql FROM sqlite_master WHERE type = 'table' AND name = ?")
            .bind(name)
            .fetch_optional(pool)
            .await?;
    let Some(create_sql) = create_sql else {
        return Ok(None);
    };
    let autoincrement = create_sql
        .unwrap_or_default()
        .to_ascii_uppercase()
        .contains("AUTOINCREMENT");

    let quoted = SqliteDialect::new().wrap_identifier(name);
    let mut definition = TableDefinition::new(name);

    let columns: Vec<(i64, String, String, i64, Option<String>, i64)> =
        sqlx::query_as(&format!("PRAGMA table_info({quoted})"))
            .fetch_all(pool)
            .await?;

    let mut primary: Vec<(i64, String)> = Vec::new();
    for (_, column_name, declared, not_null, default, pk) in columns {
        let (ty, length, precision, scale) = parse_column_type(name, &declared)?;
        let mut column = ColumnDefinition::new(column_name.clone(), ty);
        column.length = length;
        column.precision = precision;
        column.scale = scale;
        column.nullable = not_null == 0;
        column.default = default.as_deref().map(parse_default);
        definition.add(column);
        if pk > 0 {
            primary.push((pk, column_name));
        }
    }

    primary.sort();
    if let [(_, only)] = primary.as_slice() {
        if autoincrement {
            if let Some(column) = definition.columns.iter_mut().find(|c| c.name == *only) {
                column.auto_increment = true;
                column.default = None;
            }
        }
    }
    if !primary.is_empty() {
        definition.primary(primary.into_iter().map(|(_, column)| column));
    }

    let indexes: Vec<(i64, String, i64, String, i64)> =
        sqlx::query_as(&format!("PRAGMA index_list({quoted})"))
            .fetch_all(pool)
            .await?;

    for (_, index_name, unique, origin, _) in indexes {
        if origin == "pk" {
            continue;
        }
        let parts: Vec<(i64, i64, Option<String>)> = sqlx::query_as(&format!(
            "PRAGMA index_info({})",
            SqliteDialect::new().wrap_identifier(&index_name)
        ))
        .fetch_all(pool)
        .await?;

        let mut parts = parts;
        parts.sort_by_key(|(seqno, _, _)| *seqno);
        let columns = parts
            .into_iter()
            .map(|(_, _, column)| {
                column.ok_or_else(|| MigrateError::Introspection {
                    table: name.to_string(),
                    message: format!("index '{index_name}' is over an expression"),
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let kind = if unique == 0 {
            IndexKind::Plain
        } else {
            IndexKind::Unique
        };
        definition.add_index(IndexDefinition {
            name: index_name,
            kind,
            columns,
        });
    }

    Ok(Some(definition))
}

type ParsedType = (ColumnType, Option<u32>, Option<u32>, Option<u32>);

/// Maps a declared column type such as `VARCHAR(100)` or `DECIMAL(8,2)`
/// to a column type with its length, precision and scale.
///
/// # Errors
///
/// Returns [`MigrateError::Introspection`] for malformed arguments.
pub fn parse_column_type(table: &str, declared: &str) -> Result<ParsedType> {
    let trimmed = declared.trim();
    let upper = trimmed.to_ascii_uppercase();
    let (base, args) = match upper.split_once('(') {
        Some((base, rest)) => {
            let args = rest
                .trim_end_matches(')')
                .split(',')
                .map(|arg| {
                    arg.trim().parse::<u32>().map_err(|_| MigrateError::Introspection {
                        table: table.to_string(),
                        message: format!("unreadable type arguments in '{trimmed}'"),
                    })
                })
                .collect::<Result<Vec<u32>>>()?;
            (base.trim(), args)
        }
        None => (upper.as_str(), Vec::new()),
    };

    let ty = match base {
        "TINYINT" => ColumnType::TinyInt,
        "SMALLINT" => ColumnType::SmallInt,
        "INT" | "INTEGER" | "MEDIUMINT" => ColumnType::Integer,
        "BIGINT" => ColumnType::BigInt,
        "VARCHAR" | "NVARCHAR" => ColumnType::String,
        "CHAR" | "NCHAR" => ColumnType::Char,
        "TEXT" | "CLOB" => ColumnType::Text,
        "BOOLEAN" | "BOOL" => ColumnType::Boolean,
        "DECIMAL" | "NUMERIC" => {
            return Ok((
                ColumnType::Decimal,
                None,
                args.first().copied(),
                args.get(1).copied(),
            ));
        }
        "FLOAT" | "REAL" => ColumnType::Float,
        "DOUBLE" => ColumnType::Double,
        "DATE" => ColumnType::Date,
        "DATETIME" => ColumnType::DateTime,
        "TIMESTAMP" => ColumnType::Timestamp,
        "TIME" => ColumnType::Time,
        "BLOB" => ColumnType::Binary,
        _ => return Ok((ColumnType::Custom(trimmed.to_string()), None, None, None)),
    };

    let length = if ty.is_integer() || matches!(ty, ColumnType::String | ColumnType::Char) {
        args.first().copied()
    } else {
        None
    };
    Ok((ty, length, None, None))
}

/// Maps the default expression SQLite stores as text.
#[must_use]
pub fn parse_default(stored: &str) -> DefaultValue {
    let stored = stored.trim();
    if stored.eq_ignore_ascii_case("NULL") {
        return DefaultValue::Null;
    }
    if stored.len() >= 2 && stored.starts_with('\'') && stored.ends_with('\'') {
        return DefaultValue::String(stored[1..stored.len() - 1].replace("''", "'"));
    }
    if let Ok(i) = stored.parse::<i64>() {
        return DefaultValue::Integer(i);
    }
    if let Ok(f) = stored.parse::<f64>() {
        return DefaultValue::Float(f);
    }
    DefaultValue::Expression(stored.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use dbal_core::schema::diff;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn create_test_pool() -> SqlitePool {
        SqlitePoolOptions::new()
            .max_connections(1)
            .connect(":memory:")
            .await
            .expect("Failed to create in-memory SQLite pool")
    }

    async fn create(pool: &SqlitePool, definition: &TableDefinition) {
        for sql in diff(None, Some(definition), &SqliteDialect::new()).unwrap() {
            sqlx::query(&sql).execute(pool).await.unwrap();
        }
    }

    #[test]
    fn test_parse_column_type() {
        assert_eq!(
            parse_column_type("t", "VARCHAR(100)").unwrap(),
            (ColumnType::String, Some(100), None, None)
        );
        assert_eq!(
            parse_column_type("t", "decimal(8, 2)").unwrap(),
            (ColumnType::Decimal, None, Some(8), Some(2))
        );
        assert_eq!(
            parse_column_type("t", "INTEGER").unwrap(),
            (ColumnType::Integer, None, None, None)
        );
        assert_eq!(
            parse_column_type("t", "jsonb").unwrap(),
            (ColumnType::Custom(String::from("jsonb")), None, None, None)
        );
        assert!(matches!(
            parse_column_type("t", "VARCHAR(abc)"),
            Err(MigrateError::Introspection { .. })
        ));
    }

    #[test]
    fn test_parse_default() {
        assert_eq!(parse_default("NULL"), DefaultValue::Null);
        assert_eq!(
            parse_default("'o''neil'"),
            DefaultValue::String(String::from("o'neil"))
        );
        assert_eq!(parse_default("42"), DefaultValue::Integer(42));
        assert_eq!(parse_default("1.5"), DefaultValue::Float(1.5));
        assert_eq!(
            parse_default("CURRENT_TIMESTAMP"),
            DefaultValue::Expression(String::from("CURRENT_TIMESTAMP"))
        );
    }

    #[tokio::test]
    async fn test_table_round_trip() {
        let pool = create_test_pool().await;
        let mut users = TableDefinition::new("users");
        users.increment("id");
        users.string("email", 255);
        users.string("name", 100).nullable().default("anon");
        users.decimal("balance", 8, 2).default(0);
        users.unique(["email"]);
        users.index(["name"]);
        create(&pool, &users).await;

        let live = table(&pool, "users").await.unwrap().unwrap();
        assert_eq!(live.column_names(), vec!["id", "email", "name", "balance"]);

        let id = live.column("id").unwrap();
        assert!(id.auto_increment);
        assert!(!id.nullable);
        assert_eq!(live.primary_key().unwrap().columns, vec!["id"]);

        let name = live.column("name").unwrap();
        assert_eq!(name.length, Some(100));
        assert!(name.nullable);
        assert_eq!(name.default, Some(DefaultValue::String(String::from("anon"))));

        let balance = live.column("balance").unwrap();
        assert_eq!((balance.precision, balance.scale), (Some(8), Some(2)));

        assert_eq!(
            live.index_named("email_unique").unwrap().kind,
            IndexKind::Unique
        );
        assert_eq!(live.index_named("name_index").unwrap().kind, IndexKind::Plain);

        assert!(diff(Some(&live), Some(&users), &SqliteDialect::new())
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_snapshot_skips_internal_tables() {
        let pool = create_test_pool().await;
        let mut posts = TableDefinition::new("posts");
        posts.increment("id");
        posts.text("body");
        create(&pool, &posts).await;

        let mut authors = TableDefinition::new("authors");
        authors.increment("id");
        create(&pool, &authors).await;

        // AUTOINCREMENT creates sqlite_sequence.
        let tables = snapshot(&pool).await.unwrap();
        let names: Vec<&str> = tables.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["authors", "posts"]);
    }

    #[tokio::test]
    async fn test_missing_table() {
        let pool = create_test_pool().await;
        assert!(table(&pool, "nope").await.unwrap().is_none());
    }
}

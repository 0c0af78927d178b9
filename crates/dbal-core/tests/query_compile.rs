//! End-to-end query compilation across dialects.

mod common;

use common::MemoryConnection;
use dbal_core::dialect::{MysqlDialect, PostgresDialect, SqlServerDialect, SqliteDialect};
use dbal_core::expr::{self, Expression};
use dbal_core::{
    Connection, Database, DialectKind, Dialect, Filter, Insert, Params, QueryResult, Result,
    Select, TableDefinition, Value,
};

fn mysql() -> MysqlDialect {
    MysqlDialect::new()
}

/// A connection whose driver escapes text and blobs its own way.
struct DriverEscaping(MemoryConnection);

impl Connection for DriverEscaping {
    fn dialect(&self) -> DialectKind {
        self.0.dialect()
    }

    fn execute(&self, sql: &str, params: &Params) -> Result<QueryResult> {
        self.0.execute(sql, params)
    }

    fn schema_snapshot(&self) -> Result<Vec<TableDefinition>> {
        self.0.schema_snapshot()
    }

    fn quote_scalar(&self, value: &Value) -> Result<String> {
        Ok(match value {
            Value::Text(s) => format!("DRIVER<{s}>"),
            Value::Blob(bytes) => format!("DRIVER<{} bytes>", bytes.len()),
            other => format!("DRIVER<{other:?}>"),
        })
    }
}

// ============================================================================
// Conditions
// ============================================================================

#[test]
fn test_select_with_grouped_condition() {
    let sql = Select::new()
        .columns(["id", "name"])
        .from("users")
        .where_clause("age", ">=", 18)
        .where_group(|g| {
            g.and("status", "=", "active").or("status", "=", "pending");
        })
        .compile(&mysql())
        .unwrap();

    assert_eq!(
        sql,
        "SELECT `id`, `name` FROM `users` WHERE `age` >= 18 AND (`status` = 'active' OR `status` = 'pending')"
    );
}

#[test]
fn test_null_comparisons_become_is() {
    let sql = Select::new()
        .from("users")
        .where_clause("deleted_at", "=", Value::Null)
        .or_where("banned_at", "!=", Value::Null)
        .compile(&mysql())
        .unwrap();

    assert_eq!(
        sql,
        "SELECT * FROM `users` WHERE `deleted_at` IS NULL OR `banned_at` IS NOT NULL"
    );
}

#[test]
fn test_in_list() {
    let sql = Select::new()
        .from("users")
        .where_clause("id", "IN", vec![1, 2, 3])
        .compile(&mysql())
        .unwrap();

    assert_eq!(sql, "SELECT * FROM `users` WHERE `id` IN (1, 2, 3)");
}

#[test]
fn test_negated_group_wraps_whole_group() {
    let sql = Select::new()
        .from("t")
        .not_where_group(|g| {
            g.and("a", "=", 1).and("b", "=", 2);
        })
        .compile(&mysql())
        .unwrap();

    assert_eq!(sql, "SELECT * FROM `t` WHERE NOT (`a` = 1 AND `b` = 2)");
}

#[test]
fn test_parentheses_balance_with_nesting() {
    let sql = Select::new()
        .from("t")
        .where_group(|g| {
            g.and("a", "=", 1).or_group(|inner| {
                inner.and("b", "=", 2).and_not_group(|deepest| {
                    deepest.and("c", "=", 3).or("d", "=", 4);
                });
            });
        })
        .compile(&mysql())
        .unwrap();

    assert_eq!(
        sql,
        "SELECT * FROM `t` WHERE (`a` = 1 OR (`b` = 2 AND NOT (`c` = 3 OR `d` = 4)))"
    );
    assert_eq!(
        sql.matches('(').count(),
        sql.matches(')').count()
    );
}

// ============================================================================
// Insert / update / expressions
// ============================================================================

#[test]
fn test_insert_fills_missing_columns_with_null() {
    let sql = Insert::new()
        .into_table("t")
        .values([("a", 1), ("b", 2)])
        .values([("a", 3)])
        .compile(&mysql())
        .unwrap();

    assert_eq!(sql, "INSERT INTO `t` (`a`, `b`) VALUES (1, 2), (3, NULL)");
}

#[test]
fn test_match_expand_clears_boolean() {
    let m = expr::match_fields(["name"])
        .against("age")
        .boolean(true)
        .expand(true);

    assert_eq!(
        Expression::from(m).render(&mysql()).unwrap(),
        "MATCH (`name`) AGAINST ('age' WITH QUERY EXPANSION)"
    );
}

#[test]
fn test_increment_signs() {
    assert_eq!(
        expr::increment("name", -5).render(&mysql()).unwrap(),
        "`name` - 5"
    );
    assert_eq!(
        expr::increment("name", 5).render(&mysql()).unwrap(),
        "`name` + 5"
    );
}

// ============================================================================
// Dialects
// ============================================================================

#[test]
fn test_same_query_across_dialects() {
    let select = Select::new()
        .columns(["id"])
        .from("users")
        .where_clause("name", "=", "o'neil")
        .limit(5);

    assert_eq!(
        select.compile(&mysql()).unwrap(),
        "SELECT `id` FROM `users` WHERE `name` = 'o\\'neil' LIMIT 5"
    );
    for expected in [
        select.compile(&PostgresDialect::new()).unwrap(),
        select.compile(&SqliteDialect::new()).unwrap(),
        select.compile(&SqlServerDialect::new()).unwrap(),
    ] {
        assert_eq!(
            expected,
            "SELECT \"id\" FROM \"users\" WHERE \"name\" = 'o''neil' LIMIT 5"
        );
    }
}

#[test]
fn test_dialect_kind_round_trip() {
    for name in ["mysql", "pgsql", "sqlsrv", "sqlite"] {
        let kind: DialectKind = name.parse().unwrap();
        assert_eq!(kind.as_str(), name);
    }
    assert_eq!(DialectKind::Mysql.dialect().name(), "mysql");
    assert!("oracle".parse::<DialectKind>().is_err());
}

// ============================================================================
// Database facade
// ============================================================================

#[test]
fn test_database_compiles_with_connection_dialect() {
    let db = Database::new(MemoryConnection::new(DialectKind::Postgres));

    let insert = db
        .insert("users")
        .values([("email", "a@example.com")])
        .returning("id");
    assert_eq!(
        db.compile(insert).unwrap(),
        "INSERT INTO \"users\" (\"email\") VALUES ('a@example.com') RETURNING \"id\""
    );

    let update = db.update("users").set("active", true).where_eq("id", 7);
    db.execute(update, &Params::new()).unwrap();

    let delete = db.delete("users").where_clause("id", "=", expr::param("id"));
    db.execute(delete, &Params::new()).unwrap();

    assert_eq!(
        db.connection().executed(),
        vec![
            "UPDATE \"users\" SET \"active\" = '1' WHERE \"id\" = 7",
            "DELETE FROM \"users\" WHERE \"id\" = :id",
        ]
    );
    assert_eq!(db.quote("it's").unwrap(), "'it''s'");
}

#[test]
fn test_select_through_database() {
    let db = Database::new(MemoryConnection::new(DialectKind::Sqlite));
    let select = db
        .select(["id", "name"])
        .from("users")
        .order_by_dir("id", "DESC");

    assert_eq!(
        db.compile(select).unwrap(),
        "SELECT \"id\", \"name\" FROM \"users\" ORDER BY \"id\" DESC"
    );
}

#[test]
fn test_builders_carry_connection_dialect() {
    let db = Database::new(MemoryConnection::new(DialectKind::Mysql));
    let select = db.select(["id"]).from("users").where_eq("id", 3);

    assert_eq!(select.dialect(), Some(DialectKind::Mysql));
    assert_eq!(
        select.to_sql().unwrap(),
        "SELECT `id` FROM `users` WHERE `id` = 3"
    );
    assert_eq!(db.insert("users").dialect(), Some(DialectKind::Mysql));
    assert_eq!(db.update("users").dialect(), Some(DialectKind::Mysql));
    assert_eq!(db.delete("users").dialect(), Some(DialectKind::Mysql));
}

#[test]
fn test_compile_escapes_through_driver() {
    let db = Database::new(DriverEscaping(MemoryConnection::new(DialectKind::Mysql)));
    let orders = Select::new()
        .columns(["user_id"])
        .from("orders")
        .where_eq("state", "paid");
    let select = db
        .select(["id"])
        .from("users")
        .where_eq("name", "o'neil")
        .where_eq("age", 30)
        .where_clause("token", "=", &b"\x01\x02"[..])
        .where_clause("email", "=", "?")
        .where_clause("id", "in", orders);

    assert_eq!(
        db.compile(select).unwrap(),
        "SELECT `id` FROM `users` WHERE `name` = DRIVER<o'neil> AND `age` = 30 \
         AND `token` = DRIVER<2 bytes> AND `email` = ? \
         AND `id` IN (SELECT `user_id` FROM `orders` WHERE `state` = DRIVER<paid>)"
    );
    assert_eq!(db.quote("o'neil").unwrap(), "DRIVER<o'neil>");

    let update = db.update("users").set("name", "x").increment("logins", 1);
    db.execute(update, &Params::new()).unwrap();
    assert_eq!(
        db.connection().0.executed(),
        vec!["UPDATE `users` SET `name` = DRIVER<x>, `logins` = `logins` + 1"]
    );
}

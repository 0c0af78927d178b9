//! SQL Dialect support.
//!
//! Different databases have slightly different SQL syntax. The [`Dialect`]
//! trait carries the ANSI rendering of every clause as default methods;
//! each database overrides only what it does differently.

mod mysql;
mod postgres;
mod sqlite;
mod sqlserver;

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

pub use mysql::MysqlDialect;
pub use postgres::PostgresDialect;
pub use sqlite::SqliteDialect;
pub use sqlserver::SqlServerDialect;

use crate::condition::ConditionTree;
use crate::error::{Error, Result};
use crate::expr::{Case, Command, Identifier, Match, MatchMode};
use crate::query::{Clause, Delete, Insert, Join, OrderBy, QueryKind, Select, Statement, Update};
use crate::schema::SchemaDialect;
use crate::value::Value;

/// `"`-quoted spans inside a raw name, such as `COUNT("id")`.
static QUOTED_SPANS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""(.+?)""#).expect("quoted span pattern is valid"));

/// Trait for SQL dialect-specific behavior.
pub trait Dialect {
    /// Returns the name of the dialect.
    fn name(&self) -> &'static str;

    /// Returns the identifier quote character (e.g., `"` for standard SQL, `` ` `` for MySQL).
    fn identifier_quote(&self) -> char {
        '"'
    }

    /// Escapes and quotes a string literal.
    fn quote_string(&self, value: &str) -> String {
        format!("'{}'", value.replace('\'', "''"))
    }

    /// Renders a blob literal.
    fn quote_blob(&self, bytes: &[u8]) -> String {
        let hex: String = bytes.iter().map(|b| format!("{b:02X}")).collect();
        format!("X'{hex}'")
    }

    /// Quotes a value.
    ///
    /// # Errors
    ///
    /// Returns an error if a nested expression or sub-query fails to
    /// compile, or for non-finite floats.
    fn quote(&self, value: &Value) -> Result<String> {
        match value {
            Value::Null => Ok(String::from("NULL")),
            Value::Bool(b) => Ok(String::from(if *b { "'1'" } else { "'0'" })),
            Value::Int(i) => Ok(i.to_string()),
            Value::Float(f) if f.is_finite() => Ok(f.to_string()),
            Value::Float(f) => Err(Error::configuration(format!(
                "{f} has no SQL literal"
            ))),
            Value::Text(s) if s == "?" => Ok(s.clone()),
            Value::Text(_) | Value::Blob(_) => self.escape_scalar(value),
            Value::List(items) => {
                let quoted = items
                    .iter()
                    .map(|v| self.quote(v))
                    .collect::<Result<Vec<_>>>()?;
                Ok(format!("({})", quoted.join(", ")))
            }
            Value::Expr(expr) => expr.render(self),
            Value::Query(query) => Ok(format!("({})", self.compile(query.statement())?)),
        }
    }

    /// Escapes a text or blob scalar.
    ///
    /// A connection-backed dialect hands this to the driver. Other values
    /// go through [`Dialect::quote`].
    ///
    /// # Errors
    ///
    /// Returns an error if the driver rejects the value.
    fn escape_scalar(&self, value: &Value) -> Result<String> {
        match value {
            Value::Text(s) => Ok(self.quote_string(s)),
            Value::Blob(bytes) => Ok(self.quote_blob(bytes)),
            other => self.quote(other),
        }
    }

    /// Wraps one identifier segment in the quote character.
    fn wrap_identifier(&self, segment: &str) -> String {
        if segment == "*" {
            return String::from("*");
        }
        let q = self.identifier_quote();
        let escaped = segment.replace(q, &format!("{q}{q}"));
        format!("{q}{escaped}{q}")
    }

    /// Quotes a plain or dotted name.
    ///
    /// Names carrying `"`-quoted spans (`COUNT("id")`) have each span
    /// re-quoted and everything else left alone.
    ///
    /// # Errors
    ///
    /// The default never fails; overrides may reject a name.
    fn quote_name(&self, name: &str) -> Result<String> {
        if name == "*" {
            return Ok(String::from("*"));
        }
        if name.contains('"') {
            let quoted = QUOTED_SPANS.replace_all(name, |caps: &regex::Captures<'_>| {
                quote_segments(self, &caps[1])
            });
            return Ok(quoted.into_owned());
        }
        Ok(quote_segments(self, name))
    }

    /// Quotes an identifier, alias, expression, or sub-query.
    ///
    /// # Errors
    ///
    /// Returns an error if a nested expression or sub-query fails to
    /// compile.
    fn quote_identifier(&self, ident: &Identifier) -> Result<String> {
        match ident {
            Identifier::Name(name) => self.quote_name(name),
            Identifier::Alias(inner, alias) => Ok(format!(
                "{} AS {}",
                self.quote_identifier(inner)?,
                self.quote_name(alias)?
            )),
            Identifier::Expr(expr) => expr.render(self),
            Identifier::Query(query) => Ok(format!("({})", self.compile(query.statement())?)),
        }
    }

    /// Compiles any statement.
    ///
    /// # Errors
    ///
    /// Returns an error if the statement is malformed.
    fn compile(&self, statement: &Statement) -> Result<String> {
        match statement {
            Statement::Select(s) => self.compile_select(s),
            Statement::Insert(i) => self.compile_insert(i),
            Statement::Update(u) => self.compile_update(u),
            Statement::Delete(d) => self.compile_delete(d),
            Statement::Plain(sql) => Ok(sql.clone()),
        }
    }

    /// Compiles a SELECT.
    ///
    /// # Errors
    ///
    /// Returns an error if a condition tree is malformed.
    fn compile_select(&self, select: &Select) -> Result<String> {
        assemble(QueryKind::Select, |clause| match clause {
            Clause::Select => self.compile_columns(select.distinct, &select.columns).map(Some),
            Clause::From => self.compile_from(&select.tables),
            Clause::Join => self.compile_joins(&select.joins),
            Clause::Where => self.compile_conditions("WHERE", &select.conditions),
            Clause::GroupBy => self.compile_group_by(&select.group_by),
            Clause::Having => self.compile_conditions("HAVING", &select.having),
            Clause::OrderBy => self.compile_order_by(&select.order_by),
            Clause::LimitOffset => Ok(self.compile_limit_offset(select.limit, select.offset)),
            _ => Ok(None),
        })
    }

    /// Compiles an INSERT.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] without a table or rows.
    fn compile_insert(&self, insert: &Insert) -> Result<String> {
        let table = require_table(insert.table.as_ref(), "insert")?;
        if insert.rows.is_empty() {
            return Err(Error::configuration("insert without values"));
        }
        assemble(QueryKind::Insert, |clause| match clause {
            Clause::Insert => Ok(Some(format!("INSERT INTO {}", self.quote_identifier(table)?))),
            Clause::Values => self.compile_values(insert).map(Some),
            Clause::Returning => self.compile_returning(insert),
            _ => Ok(None),
        })
    }

    /// Compiles an UPDATE.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] without a table or assignments.
    fn compile_update(&self, update: &Update) -> Result<String> {
        let table = require_table(update.table.as_ref(), "update")?;
        if update.assignments.is_empty() {
            return Err(Error::configuration("update without assignments"));
        }
        assemble(QueryKind::Update, |clause| match clause {
            Clause::Update => Ok(Some(format!("UPDATE {}", self.quote_identifier(table)?))),
            Clause::Set => self.compile_set(&update.assignments).map(Some),
            Clause::Where => self.compile_conditions("WHERE", &update.conditions),
            Clause::OrderBy => self.compile_order_by(&update.order_by),
            Clause::LimitOffset => Ok(self.compile_limit_offset(update.limit, update.offset)),
            _ => Ok(None),
        })
    }

    /// Compiles a DELETE.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] without a table.
    fn compile_delete(&self, delete: &Delete) -> Result<String> {
        let table = require_table(delete.table.as_ref(), "delete")?;
        assemble(QueryKind::Delete, |clause| match clause {
            Clause::Delete => Ok(Some(format!("DELETE FROM {}", self.quote_identifier(table)?))),
            Clause::Where => self.compile_conditions("WHERE", &delete.conditions),
            Clause::OrderBy => self.compile_order_by(&delete.order_by),
            Clause::LimitOffset => Ok(self.compile_limit_offset(delete.limit, delete.offset)),
            _ => Ok(None),
        })
    }

    /// `SELECT [DISTINCT ]cols`, `*` when no columns are given.
    ///
    /// # Errors
    ///
    /// Returns an error if a column expression fails to render.
    fn compile_columns(&self, distinct: bool, columns: &[Identifier]) -> Result<String> {
        let mut sql = String::from("SELECT ");
        if distinct {
            sql.push_str("DISTINCT ");
        }
        if columns.is_empty() {
            sql.push('*');
        } else {
            sql.push_str(&self.quote_list(columns)?);
        }
        Ok(sql)
    }

    /// `FROM tables`.
    ///
    /// # Errors
    ///
    /// Returns an error if a table expression fails to render.
    fn compile_from(&self, tables: &[Identifier]) -> Result<Option<String>> {
        if tables.is_empty() {
            return Ok(None);
        }
        Ok(Some(format!("FROM {}", self.quote_list(tables)?)))
    }

    /// Renders every join in order.
    ///
    /// # Errors
    ///
    /// Returns an error if a join identifier fails to render.
    fn compile_joins(&self, joins: &[Join]) -> Result<Option<String>> {
        if joins.is_empty() {
            return Ok(None);
        }
        let mut parts = Vec::with_capacity(joins.len());
        for join in joins {
            let mut sql = String::new();
            if let Some(kind) = &join.kind {
                sql.push_str(&kind.to_uppercase());
                sql.push(' ');
            }
            sql.push_str("JOIN ");
            sql.push_str(&self.quote_identifier(&join.table)?);

            let mut on = String::new();
            for (i, cond) in join.conditions.iter().enumerate() {
                if i > 0 {
                    on.push(' ');
                    on.push_str(cond.chain.keyword());
                    on.push(' ');
                }
                on.push_str(&self.quote_identifier(&cond.left)?);
                let op = cond.operator.trim();
                if !op.is_empty() {
                    on.push(' ');
                    on.push_str(&op.to_uppercase());
                }
                on.push(' ');
                on.push_str(&self.quote_identifier(&cond.right)?);
            }
            if !on.is_empty() {
                sql.push_str(" ON (");
                sql.push_str(&on);
                sql.push(')');
            }
            parts.push(sql);
        }
        Ok(Some(parts.join(" ")))
    }

    /// `WHERE ...` / `HAVING ...`, omitted for an empty tree.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] for a malformed tree.
    fn compile_conditions(&self, keyword: &str, tree: &ConditionTree) -> Result<Option<String>> {
        if tree.is_empty() {
            return Ok(None);
        }
        Ok(Some(format!("{keyword} {}", tree.compile(self)?)))
    }

    /// `GROUP BY cols`.
    ///
    /// # Errors
    ///
    /// Returns an error if a column expression fails to render.
    fn compile_group_by(&self, columns: &[Identifier]) -> Result<Option<String>> {
        if columns.is_empty() {
            return Ok(None);
        }
        Ok(Some(format!("GROUP BY {}", self.quote_list(columns)?)))
    }

    /// `ORDER BY col [DIR], ...`.
    ///
    /// # Errors
    ///
    /// Returns an error if a column expression fails to render.
    fn compile_order_by(&self, order_by: &[OrderBy]) -> Result<Option<String>> {
        if order_by.is_empty() {
            return Ok(None);
        }
        let parts = order_by
            .iter()
            .map(|o| {
                let col = self.quote_identifier(&o.column)?;
                Ok(match &o.direction {
                    Some(dir) => format!("{col} {}", dir.to_uppercase()),
                    None => col,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Some(format!("ORDER BY {}", parts.join(", "))))
    }

    /// `LIMIT n OFFSET m`, either part optional.
    fn compile_limit_offset(&self, limit: Option<u64>, offset: Option<u64>) -> Option<String> {
        let parts: Vec<String> = [
            limit.map(|n| format!("LIMIT {n}")),
            offset.map(|n| format!("OFFSET {n}")),
        ]
        .into_iter()
        .flatten()
        .collect();
        if parts.is_empty() {
            None
        } else {
            Some(parts.join(" "))
        }
    }

    /// `(cols) VALUES (row), (row)`.
    ///
    /// # Errors
    ///
    /// Returns an error if a value fails to render.
    fn compile_values(&self, insert: &Insert) -> Result<String> {
        let columns = insert.columns();
        let names = columns
            .iter()
            .map(|c| self.quote_name(c))
            .collect::<Result<Vec<_>>>()?;

        let mut rows = Vec::with_capacity(insert.rows.len());
        for row in &insert.rows {
            let values = columns
                .iter()
                .map(|col| {
                    row.iter()
                        .find(|(k, _)| k.as_str() == *col)
                        .map_or_else(|| Ok(String::from("NULL")), |(_, v)| self.quote(v))
                })
                .collect::<Result<Vec<_>>>()?;
            rows.push(format!("({})", values.join(", ")));
        }

        Ok(format!("({}) VALUES {}", names.join(", "), rows.join(", ")))
    }

    /// Nothing by default; Postgres renders `RETURNING`.
    ///
    /// # Errors
    ///
    /// Returns an error if the id field fails to render.
    fn compile_returning(&self, _insert: &Insert) -> Result<Option<String>> {
        Ok(None)
    }

    /// `SET col = value, ...`.
    ///
    /// # Errors
    ///
    /// Returns an error if a value fails to render.
    fn compile_set(&self, assignments: &[(String, Value)]) -> Result<String> {
        let parts = assignments
            .iter()
            .map(|(col, value)| Ok(format!("{} = {}", self.quote_name(col)?, self.quote(value)?)))
            .collect::<Result<Vec<_>>>()?;
        Ok(format!("SET {}", parts.join(", ")))
    }

    /// `field + amount` / `field - amount`.
    ///
    /// # Errors
    ///
    /// Returns an error if the field fails to quote.
    fn compile_increment(&self, field: &str, subtract: bool, amount: u64) -> Result<String> {
        let sign = if subtract { '-' } else { '+' };
        Ok(format!("{} {sign} {amount}", self.quote_name(field)?))
    }

    /// `CASE field WHEN a THEN b ... ELSE c END`.
    ///
    /// # Errors
    ///
    /// Returns an error if a value fails to render.
    fn compile_case(&self, case: &Case) -> Result<String> {
        let mut sql = format!("CASE {}", self.quote_identifier(&case.value)?);
        for (when, then) in &case.arms {
            sql.push_str(&format!(" WHEN {} THEN {}", self.quote(when)?, self.quote(then)?));
        }
        sql.push_str(&format!(" ELSE {} END", self.quote(&case.otherwise)?));
        Ok(sql)
    }

    /// `MATCH (fields) AGAINST (value[ modifier])`.
    ///
    /// # Errors
    ///
    /// Returns an error if a field or the search value fails to render.
    fn compile_match(&self, m: &Match) -> Result<String> {
        let modifier = match m.mode {
            MatchMode::Natural => "",
            MatchMode::Boolean => " IN BOOLEAN MODE",
            MatchMode::Expansion => " WITH QUERY EXPANSION",
        };
        Ok(format!(
            "MATCH ({}) AGAINST ({}{modifier})",
            self.quote_list(&m.fields)?,
            self.quote(&m.against)?
        ))
    }

    /// `NAME(args)[ AS alias]`; `concat` goes through
    /// [`Dialect::compile_concat`].
    ///
    /// # Errors
    ///
    /// Returns an error if an argument fails to render.
    fn compile_command(&self, cmd: &Command) -> Result<String> {
        let mut sql = if cmd.name.eq_ignore_ascii_case("concat") {
            self.compile_concat(&cmd.args)?
        } else {
            let args = cmd
                .args
                .iter()
                .map(|a| self.quote(a))
                .collect::<Result<Vec<_>>>()?;
            format!("{}({})", cmd.name.to_uppercase(), args.join(", "))
        };
        if let Some(alias) = &cmd.alias {
            sql.push_str(" AS ");
            sql.push_str(alias);
        }
        Ok(sql)
    }

    /// `a || b || ...`; text arguments are treated as column names.
    ///
    /// # Errors
    ///
    /// Returns an error if an argument fails to render.
    fn compile_concat(&self, args: &[Value]) -> Result<String> {
        Ok(self.join_concat(&self.concat_args(args)?))
    }

    /// Joins rendered concat arguments.
    fn join_concat(&self, parts: &[String]) -> String {
        parts.join(" || ")
    }

    /// Renders concat arguments, quoting text as identifiers.
    ///
    /// # Errors
    ///
    /// Returns an error if an argument fails to render.
    fn concat_args(&self, args: &[Value]) -> Result<Vec<String>> {
        args.iter()
            .map(|arg| match arg {
                Value::Text(name) => self.quote_name(name),
                other => self.quote(other),
            })
            .collect()
    }

    /// Comma-joined quoted identifiers.
    ///
    /// # Errors
    ///
    /// Returns an error if an identifier fails to render.
    fn quote_list(&self, idents: &[Identifier]) -> Result<String> {
        Ok(idents
            .iter()
            .map(|i| self.quote_identifier(i))
            .collect::<Result<Vec<_>>>()?
            .join(", "))
    }
}

fn quote_segments<D: Dialect + ?Sized>(dialect: &D, name: &str) -> String {
    name.split('.')
        .map(|segment| dialect.wrap_identifier(segment))
        .collect::<Vec<_>>()
        .join(".")
}

fn require_table<'a>(table: Option<&'a Identifier>, kind: &str) -> Result<&'a Identifier> {
    table.ok_or_else(|| Error::configuration(format!("{kind} without a table")))
}

/// Walks the clause list of `kind`, skipping empty clauses, and joins the
/// rest with single spaces.
fn assemble<F>(kind: QueryKind, mut clause: F) -> Result<String>
where
    F: FnMut(Clause) -> Result<Option<String>>,
{
    let mut parts = vec![];
    for c in kind.clauses() {
        if let Some(part) = clause(*c)? {
            if !part.is_empty() {
                parts.push(part);
            }
        }
    }
    Ok(parts.join(" "))
}

/// The supported database dialects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DialectKind {
    Mysql,
    Postgres,
    SqlServer,
    Sqlite,
}

static MYSQL: MysqlDialect = MysqlDialect;
static POSTGRES: PostgresDialect = PostgresDialect;
static SQLSERVER: SqlServerDialect = SqlServerDialect;
static SQLITE: SqliteDialect = SqliteDialect;

impl DialectKind {
    /// Returns the query compiler.
    #[must_use]
    pub fn dialect(self) -> &'static dyn Dialect {
        match self {
            Self::Mysql => &MYSQL,
            Self::Postgres => &POSTGRES,
            Self::SqlServer => &SQLSERVER,
            Self::Sqlite => &SQLITE,
        }
    }

    /// Returns the DDL compiler.
    #[must_use]
    pub fn schema_dialect(self) -> &'static dyn SchemaDialect {
        match self {
            Self::Mysql => &MYSQL,
            Self::Postgres => &POSTGRES,
            Self::SqlServer => &SQLSERVER,
            Self::Sqlite => &SQLITE,
        }
    }

    /// Returns the canonical driver name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Mysql => "mysql",
            Self::Postgres => "pgsql",
            Self::SqlServer => "sqlsrv",
            Self::Sqlite => "sqlite",
        }
    }
}

impl fmt::Display for DialectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DialectKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "mysql" | "mariadb" => Ok(Self::Mysql),
            "pgsql" | "postgres" | "postgresql" => Ok(Self::Postgres),
            "sqlsrv" | "sqlserver" | "mssql" => Ok(Self::SqlServer),
            "sqlite" | "sqlite3" => Ok(Self::Sqlite),
            other => Err(Error::configuration(format!("unknown dialect '{other}'"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr;
    use crate::query::Query;

    #[test]
    fn test_quote_values() {
        let d = PostgresDialect::new();
        assert_eq!(d.quote(&Value::Null).unwrap(), "NULL");
        assert_eq!(d.quote(&Value::Bool(true)).unwrap(), "'1'");
        assert_eq!(d.quote(&Value::Bool(false)).unwrap(), "'0'");
        assert_eq!(d.quote(&Value::Int(-7)).unwrap(), "-7");
        assert_eq!(d.quote(&Value::Float(1.5)).unwrap(), "1.5");
        assert_eq!(d.quote(&Value::placeholder()).unwrap(), "?");
        assert_eq!(d.quote(&Value::Text(String::from("it's"))).unwrap(), "'it''s'");
        assert_eq!(d.quote(&Value::Blob(vec![0xde, 0xad])).unwrap(), "X'DEAD'");
        assert!(d.quote(&Value::Float(f64::NAN)).is_err());
    }

    #[test]
    fn test_quote_nested() {
        let d = MysqlDialect::new();
        let list = Value::List(vec![Value::Int(1), Value::Text(String::from("a"))]);
        assert_eq!(d.quote(&list).unwrap(), "(1, 'a')");

        let sub = Query::from(Select::new().columns(["id"]).from("t"));
        assert_eq!(
            d.quote(&Value::Query(Box::new(sub))).unwrap(),
            "(SELECT `id` FROM `t`)"
        );
        assert_eq!(
            d.quote(&Value::Expr(Box::new(expr::raw("NOW()")))).unwrap(),
            "NOW()"
        );
    }

    #[test]
    fn test_quote_identifiers() {
        let d = PostgresDialect::new();
        let q = |s: &str| d.quote_identifier(&Identifier::from(s)).unwrap();
        assert_eq!(q("*"), "*");
        assert_eq!(q("users.*"), "\"users\".*");
        assert_eq!(q("name"), "\"name\"");
        assert_eq!(q("schema.table.col"), "\"schema\".\"table\".\"col\"");
        assert_eq!(q("COUNT(\"id\")"), "COUNT(\"id\")");

        let m = MysqlDialect::new();
        assert_eq!(
            m.quote_identifier(&Identifier::from("COUNT(\"t.id\")")).unwrap(),
            "COUNT(`t`.`id`)"
        );
        assert_eq!(
            m.quote_identifier(&Identifier::from("weird`name")).unwrap(),
            "`weird``name`"
        );
    }

    #[test]
    fn test_quoted_spans_repeat() {
        let m = MysqlDialect::new();
        for _ in 0..3 {
            assert_eq!(
                m.quote_name("COALESCE(\"a\", \"b.c\")").unwrap(),
                "COALESCE(`a`, `b`.`c`)"
            );
        }
    }

    #[test]
    fn test_dialect_kind_parsing() {
        assert_eq!("mysql".parse::<DialectKind>().unwrap(), DialectKind::Mysql);
        assert_eq!("PgSQL".parse::<DialectKind>().unwrap(), DialectKind::Postgres);
        assert_eq!("sqlsrv".parse::<DialectKind>().unwrap(), DialectKind::SqlServer);
        assert_eq!("sqlite".parse::<DialectKind>().unwrap(), DialectKind::Sqlite);
        assert!(matches!(
            "oracle".parse::<DialectKind>(),
            Err(Error::Configuration(_))
        ));
        assert_eq!(DialectKind::Postgres.dialect().name(), "postgres");
        assert_eq!(DialectKind::Mysql.to_string(), "mysql");
    }

    #[test]
    fn test_sqlserver_matches_base_shape() {
        let select = Select::new().from("t").limit(5);
        assert_eq!(
            select.compile(&SqlServerDialect::new()).unwrap(),
            select.compile(&SqliteDialect::new()).unwrap()
        );
    }
}

//! Query collectors.
//!
//! Each builder records the clauses of one statement. Nothing is rendered
//! until a [`Dialect`] compiles it.
//!
//! # Example
//!
//! ```rust
//! use dbal_core::dialect::MysqlDialect;
//! use dbal_core::query::{Filter, Select};
//!
//! let sql = Select::new()
//!     .columns(["id", "name"])
//!     .from("users")
//!     .where_clause("age", ">=", 18)
//!     .where_group(|g| {
//!         g.and("status", "=", "active").or("status", "=", "pending");
//!     })
//!     .compile(&MysqlDialect::new())
//!     .unwrap();
//!
//! assert_eq!(
//!     sql,
//!     "SELECT `id`, `name` FROM `users` WHERE `age` >= 18 AND (`status` = 'active' OR `status` = 'pending')"
//! );
//! ```

mod delete;
mod insert;
mod join;
mod select;
mod update;

pub use delete::Delete;
pub use insert::Insert;
pub use join::{Join, JoinCondition};
pub use select::Select;
pub use update::Update;

use crate::condition::{Chain, ConditionTree};
use crate::dialect::{Dialect, DialectKind};
use crate::error::{Error, Result};
use crate::expr::Identifier;
use crate::value::ToValue;

/// The statement kind of a collector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryKind {
    Select,
    Insert,
    Update,
    Delete,
    Plain,
}

/// A clause of a compiled statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Clause {
    Select,
    From,
    Join,
    Where,
    GroupBy,
    Having,
    OrderBy,
    LimitOffset,
    Insert,
    Values,
    Returning,
    Update,
    Set,
    Delete,
}

impl QueryKind {
    /// The fixed clause order for this kind of statement.
    #[must_use]
    pub const fn clauses(self) -> &'static [Clause] {
        match self {
            Self::Select => &[
                Clause::Select,
                Clause::From,
                Clause::Join,
                Clause::Where,
                Clause::GroupBy,
                Clause::Having,
                Clause::OrderBy,
                Clause::LimitOffset,
            ],
            Self::Insert => &[Clause::Insert, Clause::Values, Clause::Returning],
            Self::Update => &[
                Clause::Update,
                Clause::Set,
                Clause::Where,
                Clause::OrderBy,
                Clause::LimitOffset,
            ],
            Self::Delete => &[
                Clause::Delete,
                Clause::Where,
                Clause::OrderBy,
                Clause::LimitOffset,
            ],
            Self::Plain => &[],
        }
    }
}

/// One `ORDER BY` entry.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderBy {
    pub column: Identifier,
    pub direction: Option<String>,
}

/// The collected statement.
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    Select(Select),
    Insert(Insert),
    Update(Update),
    Delete(Delete),
    /// Raw SQL, passed through untouched.
    Plain(String),
}

impl Statement {
    /// Returns the statement kind.
    #[must_use]
    pub const fn kind(&self) -> QueryKind {
        match self {
            Self::Select(_) => QueryKind::Select,
            Self::Insert(_) => QueryKind::Insert,
            Self::Update(_) => QueryKind::Update,
            Self::Delete(_) => QueryKind::Delete,
            Self::Plain(_) => QueryKind::Plain,
        }
    }
}

/// A statement, optionally bound to the dialect that will compile it.
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    statement: Statement,
    dialect: Option<DialectKind>,
}

impl Query {
    /// Wraps raw SQL.
    #[must_use]
    pub fn plain(sql: impl Into<String>) -> Self {
        Self::from(Statement::Plain(sql.into()))
    }

    /// Returns the collected statement.
    #[must_use]
    pub const fn statement(&self) -> &Statement {
        &self.statement
    }

    /// Returns the statement kind.
    #[must_use]
    pub const fn kind(&self) -> QueryKind {
        self.statement.kind()
    }

    /// Binds a dialect for [`Query::to_sql`].
    #[must_use]
    pub const fn with_dialect(mut self, dialect: DialectKind) -> Self {
        self.dialect = Some(dialect);
        self
    }

    /// Returns the bound dialect, if any.
    #[must_use]
    pub const fn dialect(&self) -> Option<DialectKind> {
        self.dialect
    }

    /// Compiles with the given dialect, ignoring any bound one.
    ///
    /// # Errors
    ///
    /// Returns an error if the statement is malformed.
    pub fn compile<D: Dialect + ?Sized>(&self, dialect: &D) -> Result<String> {
        dialect.compile(&self.statement)
    }

    /// Compiles with the bound dialect.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Compilation`] when no dialect is bound.
    pub fn to_sql(&self) -> Result<String> {
        let kind = self.dialect.ok_or_else(|| {
            Error::Compilation(String::from("no dialect bound to the query"))
        })?;
        kind.dialect().compile(&self.statement)
    }
}

impl From<Statement> for Query {
    fn from(statement: Statement) -> Self {
        Self {
            statement,
            dialect: None,
        }
    }
}

macro_rules! statement_to_query {
    ($($t:ident),*) => {
        $(
            impl $t {
                /// Binds a dialect for `to_sql`; it carries over into
                /// [`Query`].
                #[must_use]
                pub const fn with_dialect(mut self, dialect: DialectKind) -> Self {
                    self.dialect = Some(dialect);
                    self
                }

                /// Returns the bound dialect, if any.
                #[must_use]
                pub const fn dialect(&self) -> Option<DialectKind> {
                    self.dialect
                }

                /// Compiles with the bound dialect.
                ///
                /// # Errors
                ///
                /// Returns [`Error::Compilation`] when no dialect is bound.
                pub fn to_sql(&self) -> Result<String> {
                    let kind = self.dialect.ok_or_else(|| {
                        Error::Compilation(String::from("no dialect bound to the query"))
                    })?;
                    self.compile(kind.dialect())
                }
            }

            impl From<$t> for Query {
                fn from(query: $t) -> Self {
                    let dialect = query.dialect;
                    Self {
                        statement: Statement::$t(query),
                        dialect,
                    }
                }
            }
        )*
    };
}

statement_to_query!(Select, Insert, Update, Delete);

/// `WHERE` builders shared by select, update, and delete.
pub trait Filter: Sized {
    /// Returns the `WHERE` tree.
    fn conditions_mut(&mut self) -> &mut ConditionTree;

    /// `AND field op value`.
    #[must_use]
    fn where_clause(self, field: impl Into<Identifier>, op: &str, value: impl ToValue) -> Self {
        self.and_where(field, op, value)
    }

    /// `AND field = value`, or `IN` for list values.
    #[must_use]
    fn where_eq(mut self, field: impl Into<Identifier>, value: impl ToValue) -> Self {
        self.conditions_mut().and_eq(field, value);
        self
    }

    /// `AND field op value`.
    #[must_use]
    fn and_where(mut self, field: impl Into<Identifier>, op: &str, value: impl ToValue) -> Self {
        self.conditions_mut().and(field, op, value);
        self
    }

    /// `OR field op value`.
    #[must_use]
    fn or_where(mut self, field: impl Into<Identifier>, op: &str, value: impl ToValue) -> Self {
        self.conditions_mut().or(field, op, value);
        self
    }

    /// `OR field = value`, or `IN` for list values.
    #[must_use]
    fn or_where_eq(mut self, field: impl Into<Identifier>, value: impl ToValue) -> Self {
        self.conditions_mut().or_eq(field, value);
        self
    }

    /// `AND NOT field op value`.
    #[must_use]
    fn not_where(mut self, field: impl Into<Identifier>, op: &str, value: impl ToValue) -> Self {
        self.conditions_mut().and_not(field, op, value);
        self
    }

    /// Alias of [`Filter::not_where`].
    #[must_use]
    fn and_not_where(self, field: impl Into<Identifier>, op: &str, value: impl ToValue) -> Self {
        self.not_where(field, op, value)
    }

    /// `OR NOT field op value`.
    #[must_use]
    fn or_not_where(
        mut self,
        field: impl Into<Identifier>,
        op: &str,
        value: impl ToValue,
    ) -> Self {
        self.conditions_mut().or_not(field, op, value);
        self
    }

    /// Adds several `AND field op value` predicates.
    #[must_use]
    fn where_all<I, F, V>(mut self, predicates: I) -> Self
    where
        I: IntoIterator<Item = (F, &'static str, V)>,
        F: Into<Identifier>,
        V: ToValue,
    {
        let tree = self.conditions_mut();
        for (field, op, value) in predicates {
            tree.and(field, op, value);
        }
        self
    }

    /// `AND (...)`.
    #[must_use]
    fn where_group<F: FnOnce(&mut ConditionTree)>(mut self, build: F) -> Self {
        self.conditions_mut().group(Chain::And, false, build);
        self
    }

    /// `OR (...)`.
    #[must_use]
    fn or_where_group<F: FnOnce(&mut ConditionTree)>(mut self, build: F) -> Self {
        self.conditions_mut().group(Chain::Or, false, build);
        self
    }

    /// `AND NOT (...)`.
    #[must_use]
    fn not_where_group<F: FnOnce(&mut ConditionTree)>(mut self, build: F) -> Self {
        self.conditions_mut().group(Chain::And, true, build);
        self
    }

    /// `OR NOT (...)`.
    #[must_use]
    fn or_not_where_group<F: FnOnce(&mut ConditionTree)>(mut self, build: F) -> Self {
        self.conditions_mut().group(Chain::Or, true, build);
        self
    }
}

/// Pushes an `ORDER BY` entry.
pub(crate) fn push_order(
    order_by: &mut Vec<OrderBy>,
    column: impl Into<Identifier>,
    direction: Option<&str>,
) {
    order_by.push(OrderBy {
        column: column.into(),
        direction: direction.map(String::from),
    });
}

/// Inserts or replaces `key` in an insertion-ordered list.
pub(crate) fn upsert<V>(entries: &mut Vec<(String, V)>, key: String, value: V) {
    if let Some(slot) = entries.iter_mut().find(|(k, _)| *k == key) {
        slot.1 = value;
    } else {
        entries.push((key, value));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clause_order() {
        assert_eq!(
            QueryKind::Insert.clauses(),
            &[Clause::Insert, Clause::Values, Clause::Returning]
        );
        assert_eq!(QueryKind::Select.clauses().first(), Some(&Clause::Select));
        assert_eq!(QueryKind::Select.clauses().last(), Some(&Clause::LimitOffset));
        assert!(QueryKind::Plain.clauses().is_empty());
    }

    #[test]
    fn test_to_sql_requires_dialect() {
        let query = Query::from(Select::new().from("users"));
        assert!(matches!(query.to_sql(), Err(Error::Compilation(_))));

        let query = query.with_dialect(DialectKind::Postgres);
        assert_eq!(query.to_sql().unwrap(), "SELECT * FROM \"users\"");
    }

    #[test]
    fn test_builder_dialect_carries_into_query() {
        let select = Select::new().from("users").with_dialect(DialectKind::Mysql);
        assert_eq!(select.to_sql().unwrap(), "SELECT * FROM `users`");

        let query = Query::from(select);
        assert_eq!(query.dialect(), Some(DialectKind::Mysql));
        assert_eq!(query.to_sql().unwrap(), "SELECT * FROM `users`");

        assert!(matches!(
            Delete::new().from("users").to_sql(),
            Err(Error::Compilation(_))
        ));
    }

    #[test]
    fn test_plain_passthrough() {
        let query = Query::plain("SELECT 1").with_dialect(DialectKind::Mysql);
        assert_eq!(query.kind(), QueryKind::Plain);
        assert_eq!(query.to_sql().unwrap(), "SELECT 1");
    }

    #[test]
    fn test_upsert_keeps_position() {
        let mut entries = vec![(String::from("a"), 1), (String::from("b"), 2)];
        upsert(&mut entries, String::from("a"), 3);
        upsert(&mut entries, String::from("c"), 4);
        assert_eq!(
            entries,
            vec![
                (String::from("a"), 3),
                (String::from("b"), 2),
                (String::from("c"), 4)
            ]
        );
    }
}

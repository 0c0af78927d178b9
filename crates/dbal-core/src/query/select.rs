//! SELECT collector.

use super::{push_order, Filter, Join, OrderBy};
use crate::condition::{Chain, ConditionTree};
use crate::dialect::{Dialect, DialectKind};
use crate::error::Result;
use crate::expr::Identifier;
use crate::value::ToValue;

/// A SELECT statement under construction.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Select {
    pub(crate) distinct: bool,
    pub(crate) columns: Vec<Identifier>,
    pub(crate) tables: Vec<Identifier>,
    pub(crate) joins: Vec<Join>,
    pub(crate) conditions: ConditionTree,
    pub(crate) group_by: Vec<Identifier>,
    pub(crate) having: ConditionTree,
    pub(crate) order_by: Vec<OrderBy>,
    pub(crate) limit: Option<u64>,
    pub(crate) offset: Option<u64>,
    pub(crate) dialect: Option<DialectKind>,
}

impl Select {
    /// Creates an empty SELECT (`SELECT *`).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds columns to select.
    #[must_use]
    pub fn columns<I, C>(mut self, cols: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<Identifier>,
    {
        self.columns.extend(cols.into_iter().map(Into::into));
        self
    }

    /// Adds one column, which may be an alias pair or an expression.
    #[must_use]
    pub fn column(mut self, col: impl Into<Identifier>) -> Self {
        self.columns.push(col.into());
        self
    }

    /// Sets DISTINCT.
    #[must_use]
    pub const fn distinct(mut self) -> Self {
        self.distinct = true;
        self
    }

    /// Adds a table to the FROM list.
    #[must_use]
    pub fn from(mut self, table: impl Into<Identifier>) -> Self {
        self.tables.push(table.into());
        self
    }

    /// Adds a join.
    #[must_use]
    pub fn join(mut self, join: Join) -> Self {
        self.joins.push(join);
        self
    }

    /// Adds GROUP BY columns; columns already present are skipped.
    #[must_use]
    pub fn group_by<I, C>(mut self, cols: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<Identifier>,
    {
        for col in cols {
            let col = col.into();
            if !self.group_by.contains(&col) {
                self.group_by.push(col);
            }
        }
        self
    }

    /// `HAVING ... AND field op value`.
    #[must_use]
    pub fn having(mut self, field: impl Into<Identifier>, op: &str, value: impl ToValue) -> Self {
        self.having.and(field, op, value);
        self
    }

    /// `HAVING ... OR field op value`.
    #[must_use]
    pub fn or_having(
        mut self,
        field: impl Into<Identifier>,
        op: &str,
        value: impl ToValue,
    ) -> Self {
        self.having.or(field, op, value);
        self
    }

    /// `HAVING ... AND NOT field op value`.
    #[must_use]
    pub fn not_having(
        mut self,
        field: impl Into<Identifier>,
        op: &str,
        value: impl ToValue,
    ) -> Self {
        self.having.and_not(field, op, value);
        self
    }

    /// `HAVING ... OR NOT field op value`.
    #[must_use]
    pub fn or_not_having(
        mut self,
        field: impl Into<Identifier>,
        op: &str,
        value: impl ToValue,
    ) -> Self {
        self.having.or_not(field, op, value);
        self
    }

    /// `HAVING ... AND (...)`.
    #[must_use]
    pub fn having_group<F: FnOnce(&mut ConditionTree)>(mut self, build: F) -> Self {
        self.having.group(Chain::And, false, build);
        self
    }

    /// `HAVING ... OR (...)`.
    #[must_use]
    pub fn or_having_group<F: FnOnce(&mut ConditionTree)>(mut self, build: F) -> Self {
        self.having.group(Chain::Or, false, build);
        self
    }

    /// `HAVING ... AND NOT (...)`.
    #[must_use]
    pub fn not_having_group<F: FnOnce(&mut ConditionTree)>(mut self, build: F) -> Self {
        self.having.group(Chain::And, true, build);
        self
    }

    /// `HAVING ... OR NOT (...)`.
    #[must_use]
    pub fn or_not_having_group<F: FnOnce(&mut ConditionTree)>(mut self, build: F) -> Self {
        self.having.group(Chain::Or, true, build);
        self
    }

    /// Adds an ORDER BY column without a direction.
    #[must_use]
    pub fn order_by(mut self, col: impl Into<Identifier>) -> Self {
        push_order(&mut self.order_by, col, None);
        self
    }

    /// Adds an ORDER BY column with a direction (`asc`, `desc`, ...).
    #[must_use]
    pub fn order_by_dir(mut self, col: impl Into<Identifier>, direction: &str) -> Self {
        push_order(&mut self.order_by, col, Some(direction));
        self
    }

    /// Adds several ORDER BY columns, each with an optional direction.
    #[must_use]
    pub fn order_by_all<I, C>(mut self, cols: I) -> Self
    where
        I: IntoIterator<Item = (C, Option<&'static str>)>,
        C: Into<Identifier>,
    {
        for (col, direction) in cols {
            push_order(&mut self.order_by, col, direction);
        }
        self
    }

    /// Sets LIMIT.
    #[must_use]
    pub const fn limit(mut self, n: u64) -> Self {
        self.limit = Some(n);
        self
    }

    /// Sets OFFSET.
    #[must_use]
    pub const fn offset(mut self, n: u64) -> Self {
        self.offset = Some(n);
        self
    }

    /// Compiles the statement.
    ///
    /// # Errors
    ///
    /// Returns an error if a condition tree is malformed.
    pub fn compile<D: Dialect + ?Sized>(&self, dialect: &D) -> Result<String> {
        dialect.compile_select(self)
    }
}

impl Filter for Select {
    fn conditions_mut(&mut self) -> &mut ConditionTree {
        &mut self.conditions
    }
}

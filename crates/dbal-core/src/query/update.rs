//! UPDATE collector.

use super::{push_order, upsert, Filter, OrderBy};
use crate::condition::ConditionTree;
use crate::dialect::{Dialect, DialectKind};
use crate::error::Result;
use crate::expr::{self, Identifier};
use crate::value::{ToValue, Value};

/// An UPDATE statement under construction.
///
/// Assignments keep insertion order; assigning a column twice replaces the
/// earlier value in place.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Update {
    pub(crate) table: Option<Identifier>,
    pub(crate) assignments: Vec<(String, Value)>,
    pub(crate) conditions: ConditionTree,
    pub(crate) order_by: Vec<OrderBy>,
    pub(crate) limit: Option<u64>,
    pub(crate) offset: Option<u64>,
    pub(crate) dialect: Option<DialectKind>,
}

impl Update {
    /// Creates a new UPDATE builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Specifies the table to update.
    #[must_use]
    pub fn table(mut self, table: impl Into<Identifier>) -> Self {
        self.table = Some(table.into());
        self
    }

    /// `SET column = value`.
    #[must_use]
    pub fn set(mut self, column: impl Into<String>, value: impl ToValue) -> Self {
        upsert(&mut self.assignments, column.into(), value.to_value());
        self
    }

    /// Several assignments at once.
    #[must_use]
    pub fn set_all<I, K, V>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: ToValue,
    {
        for (column, value) in values {
            upsert(&mut self.assignments, column.into(), value.to_value());
        }
        self
    }

    /// `SET column = column + amount`.
    #[must_use]
    pub fn increment(self, column: &str, amount: i64) -> Self {
        self.set(column, expr::increment(column, amount))
    }

    /// `SET column = column - amount`.
    #[must_use]
    pub fn decrement(self, column: &str, amount: i64) -> Self {
        self.set(column, expr::decrement(column, amount))
    }

    /// Adds an ORDER BY column.
    #[must_use]
    pub fn order_by(mut self, col: impl Into<Identifier>, direction: Option<&str>) -> Self {
        push_order(&mut self.order_by, col, direction);
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
    /// Returns [`crate::Error::Configuration`] without a table or
    /// assignments.
    pub fn compile<D: Dialect + ?Sized>(&self, dialect: &D) -> Result<String> {
        dialect.compile_update(self)
    }
}

impl Filter for Update {
    fn conditions_mut(&mut self) -> &mut ConditionTree {
        &mut self.conditions
    }
}

//! DELETE collector.

use super::{push_order, Filter, OrderBy};
use crate::condition::ConditionTree;
use crate::dialect::{Dialect, DialectKind};
use crate::error::Result;
use crate::expr::Identifier;

/// A DELETE statement under construction.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Delete {
    pub(crate) table: Option<Identifier>,
    pub(crate) conditions: ConditionTree,
    pub(crate) order_by: Vec<OrderBy>,
    pub(crate) limit: Option<u64>,
    pub(crate) offset: Option<u64>,
    pub(crate) dialect: Option<DialectKind>,
}

impl Delete {
    /// Creates a new DELETE builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Specifies the table to delete from.
    #[must_use]
    pub fn from(mut self, table: impl Into<Identifier>) -> Self {
        self.table = Some(table.into());
        self
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
    /// Returns [`crate::Error::Configuration`] without a table.
    pub fn compile<D: Dialect + ?Sized>(&self, dialect: &D) -> Result<String> {
        dialect.compile_delete(self)
    }
}

impl Filter for Delete {
    fn conditions_mut(&mut self) -> &mut ConditionTree {
        &mut self.conditions
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::MysqlDialect;
    use crate::error::Error;

    #[test]
    fn test_delete() {
        let delete = Delete::new()
            .from("sessions")
            .where_clause("expires_at", "<", "2024-01-01")
            .or_where("user_id", "=", crate::value::Value::Null)
            .limit(100);
        assert_eq!(
            delete.compile(&MysqlDialect::new()).unwrap(),
            "DELETE FROM `sessions` WHERE `expires_at` < '2024-01-01' OR `user_id` IS NULL LIMIT 100"
        );
    }

    #[test]
    fn test_delete_without_table() {
        assert!(matches!(
            Delete::new().compile(&MysqlDialect::new()),
            Err(Error::Configuration(_))
        ));
    }
}

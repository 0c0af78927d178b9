//! JOIN clauses.

use crate::condition::Chain;
use crate::expr::Identifier;

/// One `ON` comparison between two identifiers.
#[derive(Debug, Clone, PartialEq)]
pub struct JoinCondition {
    pub chain: Chain,
    pub left: Identifier,
    pub operator: String,
    pub right: Identifier,
}

/// A joined table with its `ON` conditions.
///
/// ```rust
/// use dbal_core::dialect::MysqlDialect;
/// use dbal_core::query::{Join, Select};
///
/// let sql = Select::new()
///     .from("users")
///     .join(Join::left("orders").on_eq("orders.user_id", "users.id"))
///     .compile(&MysqlDialect::new())
///     .unwrap();
///
/// assert_eq!(
///     sql,
///     "SELECT * FROM `users` LEFT JOIN `orders` ON (`orders`.`user_id` = `users`.`id`)"
/// );
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Join {
    pub(crate) table: Identifier,
    pub(crate) kind: Option<String>,
    pub(crate) conditions: Vec<JoinCondition>,
}

impl Join {
    /// A plain `JOIN`.
    #[must_use]
    pub fn new(table: impl Into<Identifier>) -> Self {
        Self {
            table: table.into(),
            kind: None,
            conditions: vec![],
        }
    }

    /// A join of any type (`natural`, `left outer`, ...).
    #[must_use]
    pub fn typed(kind: &str, table: impl Into<Identifier>) -> Self {
        Self {
            kind: Some(String::from(kind)),
            ..Self::new(table)
        }
    }

    /// `INNER JOIN`.
    #[must_use]
    pub fn inner(table: impl Into<Identifier>) -> Self {
        Self::typed("inner", table)
    }

    /// `LEFT JOIN`.
    #[must_use]
    pub fn left(table: impl Into<Identifier>) -> Self {
        Self::typed("left", table)
    }

    /// `RIGHT JOIN`.
    #[must_use]
    pub fn right(table: impl Into<Identifier>) -> Self {
        Self::typed("right", table)
    }

    /// `CROSS JOIN`.
    #[must_use]
    pub fn cross(table: impl Into<Identifier>) -> Self {
        Self::typed("cross", table)
    }

    /// `AND left op right`.
    #[must_use]
    pub fn on(self, left: impl Into<Identifier>, op: &str, right: impl Into<Identifier>) -> Self {
        self.push(Chain::And, left, op, right)
    }

    /// `AND left = right`.
    #[must_use]
    pub fn on_eq(self, left: impl Into<Identifier>, right: impl Into<Identifier>) -> Self {
        self.push(Chain::And, left, "=", right)
    }

    /// `OR left op right`.
    #[must_use]
    pub fn or_on(
        self,
        left: impl Into<Identifier>,
        op: &str,
        right: impl Into<Identifier>,
    ) -> Self {
        self.push(Chain::Or, left, op, right)
    }

    fn push(
        mut self,
        chain: Chain,
        left: impl Into<Identifier>,
        op: &str,
        right: impl Into<Identifier>,
    ) -> Self {
        self.conditions.push(JoinCondition {
            chain,
            left: left.into(),
            operator: String::from(op),
            right: right.into(),
        });
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::MysqlDialect;
    use crate::query::Select;

    #[test]
    fn test_join_with_mixed_connectors() {
        let sql = Select::new()
            .from("tbl")
            .join(
                Join::new("other")
                    .on_eq("a", "b")
                    .on("a", "<", "b")
                    .or_on("b", "=", "a"),
            )
            .compile(&MysqlDialect::new())
            .unwrap();
        assert_eq!(
            sql,
            "SELECT * FROM `tbl` JOIN `other` ON (`a` = `b` AND `a` < `b` OR `b` = `a`)"
        );
    }

    #[test]
    fn test_cross_join_without_conditions() {
        let sql = Select::new()
            .from("a")
            .join(Join::cross("b"))
            .join(Join::inner("c").on("c.id", "=", "a.c_id"))
            .compile(&MysqlDialect::new())
            .unwrap();
        assert_eq!(
            sql,
            "SELECT * FROM `a` CROSS JOIN `b` INNER JOIN `c` ON (`c`.`id` = `a`.`c_id`)"
        );
    }
}

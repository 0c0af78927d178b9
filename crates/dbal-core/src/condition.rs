//! Boolean condition trees for `WHERE` and `HAVING` clauses.
//!
//! A [`ConditionTree`] is a flat, ordered list of [`ConditionNode`]s. Groups
//! are opened and closed by closures, so a tree built through the public
//! API is always balanced:
//!
//! ```rust
//! use dbal_core::condition::ConditionTree;
//! use dbal_core::dialect::MysqlDialect;
//!
//! let mut tree = ConditionTree::new();
//! tree.and("age", ">=", 18).and_group(|g| {
//!     g.and("status", "=", "active").or("status", "=", "pending");
//! });
//!
//! assert_eq!(
//!     tree.compile(&MysqlDialect::new()).unwrap(),
//!     "`age` >= 18 AND (`status` = 'active' OR `status` = 'pending')"
//! );
//! ```

use crate::dialect::Dialect;
use crate::error::{Error, Result};
use crate::expr::Identifier;
use crate::value::{ToValue, Value};

/// How a node is connected to whatever precedes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Chain {
    /// `AND`
    And,
    /// `OR`
    Or,
}

impl Chain {
    /// Returns the SQL keyword.
    #[must_use]
    pub const fn keyword(self) -> &'static str {
        match self {
            Self::And => "AND",
            Self::Or => "OR",
        }
    }
}

/// One entry in a condition tree.
#[derive(Debug, Clone, PartialEq)]
pub enum ConditionNode {
    /// `field OPERATOR value`.
    Predicate {
        chain: Chain,
        field: Identifier,
        operator: String,
        value: Value,
        negate: bool,
    },
    /// Start of a parenthesised group.
    GroupOpen { chain: Chain, negate: bool },
    /// End of the innermost open group.
    GroupClose,
}

/// An ordered sequence of condition nodes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConditionTree {
    nodes: Vec<ConditionNode>,
}

impl ConditionTree {
    /// Creates an empty tree.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a tree from raw nodes. Nesting is checked at compile time.
    #[must_use]
    pub fn from_nodes(nodes: Vec<ConditionNode>) -> Self {
        Self { nodes }
    }

    /// Returns the nodes in order.
    #[must_use]
    pub fn nodes(&self) -> &[ConditionNode] {
        &self.nodes
    }

    /// Returns `true` if the tree has no nodes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Appends a predicate.
    pub fn push(
        &mut self,
        chain: Chain,
        negate: bool,
        field: impl Into<Identifier>,
        operator: &str,
        value: impl ToValue,
    ) -> &mut Self {
        self.nodes.push(ConditionNode::Predicate {
            chain,
            field: field.into(),
            operator: String::from(operator),
            value: value.to_value(),
            negate,
        });
        self
    }

    /// Appends a group whose contents are added by `build`.
    ///
    /// A group left empty by `build` is not recorded.
    pub fn group<F>(&mut self, chain: Chain, negate: bool, build: F) -> &mut Self
    where
        F: FnOnce(&mut Self),
    {
        let start = self.nodes.len();
        self.nodes.push(ConditionNode::GroupOpen { chain, negate });
        build(self);
        if self.nodes.len() == start + 1 {
            self.nodes.truncate(start);
        } else {
            self.nodes.push(ConditionNode::GroupClose);
        }
        self
    }

    /// `AND field op value`.
    pub fn and(&mut self, field: impl Into<Identifier>, op: &str, value: impl ToValue) -> &mut Self {
        self.push(Chain::And, false, field, op, value)
    }

    /// `OR field op value`.
    pub fn or(&mut self, field: impl Into<Identifier>, op: &str, value: impl ToValue) -> &mut Self {
        self.push(Chain::Or, false, field, op, value)
    }

    /// `AND NOT field op value`.
    pub fn and_not(
        &mut self,
        field: impl Into<Identifier>,
        op: &str,
        value: impl ToValue,
    ) -> &mut Self {
        self.push(Chain::And, true, field, op, value)
    }

    /// `OR NOT field op value`.
    pub fn or_not(
        &mut self,
        field: impl Into<Identifier>,
        op: &str,
        value: impl ToValue,
    ) -> &mut Self {
        self.push(Chain::Or, true, field, op, value)
    }

    /// `AND field = value`, or `AND field IN (...)` for list values.
    pub fn and_eq(&mut self, field: impl Into<Identifier>, value: impl ToValue) -> &mut Self {
        let value = value.to_value();
        let op = default_operator(&value);
        self.push(Chain::And, false, field, op, value)
    }

    /// `OR field = value`, or `OR field IN (...)` for list values.
    pub fn or_eq(&mut self, field: impl Into<Identifier>, value: impl ToValue) -> &mut Self {
        let value = value.to_value();
        let op = default_operator(&value);
        self.push(Chain::Or, false, field, op, value)
    }

    /// `AND (...)`.
    pub fn and_group<F: FnOnce(&mut Self)>(&mut self, build: F) -> &mut Self {
        self.group(Chain::And, false, build)
    }

    /// `OR (...)`.
    pub fn or_group<F: FnOnce(&mut Self)>(&mut self, build: F) -> &mut Self {
        self.group(Chain::Or, false, build)
    }

    /// `AND NOT (...)`.
    pub fn and_not_group<F: FnOnce(&mut Self)>(&mut self, build: F) -> &mut Self {
        self.group(Chain::And, true, build)
    }

    /// `OR NOT (...)`.
    pub fn or_not_group<F: FnOnce(&mut Self)>(&mut self, build: F) -> &mut Self {
        self.group(Chain::Or, true, build)
    }

    /// Compiles the tree into a boolean SQL expression.
    ///
    /// Connectors are suppressed for the first node and directly after an
    /// opening parenthesis. A negated group renders as `NOT (...)` around
    /// its whole content.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] for unbalanced groups or a
    /// malformed `BETWEEN` value.
    pub fn compile<D: Dialect + ?Sized>(&self, dialect: &D) -> Result<String> {
        let mut sql = String::new();
        let mut depth = 0_usize;
        let mut after_open = true;

        for node in &self.nodes {
            match node {
                ConditionNode::GroupOpen { chain, negate } => {
                    push_connector(&mut sql, *chain, after_open);
                    if *negate {
                        sql.push_str("NOT ");
                    }
                    sql.push('(');
                    depth += 1;
                    after_open = true;
                }
                ConditionNode::GroupClose => {
                    if depth == 0 {
                        return Err(Error::configuration(
                            "condition group closed without a matching open",
                        ));
                    }
                    depth -= 1;
                    sql.push(')');
                    after_open = false;
                }
                ConditionNode::Predicate {
                    chain,
                    field,
                    operator,
                    value,
                    negate,
                } => {
                    push_connector(&mut sql, *chain, after_open);
                    if *negate {
                        sql.push_str("NOT ");
                    }
                    sql.push_str(&compile_predicate(dialect, field, operator, value)?);
                    after_open = false;
                }
            }
        }

        if depth > 0 {
            return Err(Error::configuration(format!(
                "{depth} condition group(s) left open"
            )));
        }
        Ok(sql)
    }
}

/// `=` for scalars, `IN` for lists.
pub(crate) const fn default_operator(value: &Value) -> &'static str {
    if value.is_list() { "IN" } else { "=" }
}

fn push_connector(sql: &mut String, chain: Chain, after_open: bool) {
    if !after_open {
        sql.push(' ');
        sql.push_str(chain.keyword());
        sql.push(' ');
    }
}

/// Upper-cases the operator, turning `=`/`!=` against NULL into
/// `IS`/`IS NOT`.
#[must_use]
pub fn normalize_operator(operator: &str, value: &Value) -> String {
    let op = operator.trim();
    if value.is_null() {
        match op {
            "=" => return String::from("IS"),
            "!=" | "<>" => return String::from("IS NOT"),
            _ => {}
        }
    }
    op.to_uppercase()
}

fn compile_predicate<D: Dialect + ?Sized>(
    dialect: &D,
    field: &Identifier,
    operator: &str,
    value: &Value,
) -> Result<String> {
    let field = dialect.quote_identifier(field)?;
    let op = normalize_operator(operator, value);

    let rhs = if op == "BETWEEN" || op == "NOT BETWEEN" {
        match value {
            Value::List(bounds) if bounds.len() == 2 => format!(
                "{} AND {}",
                dialect.quote(&bounds[0])?,
                dialect.quote(&bounds[1])?
            ),
            _ => {
                return Err(Error::configuration(format!(
                    "{op} on {field} needs exactly two bounds"
                )));
            }
        }
    } else {
        dialect.quote(value)?
    };

    Ok(format!("{field} {op} {rhs}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::MysqlDialect;

    fn compile(tree: &ConditionTree) -> String {
        tree.compile(&MysqlDialect::new()).unwrap()
    }

    #[test]
    fn test_null_normalization() {
        let mut tree = ConditionTree::new();
        tree.and("deleted_at", "=", Value::Null);
        assert_eq!(compile(&tree), "`deleted_at` IS NULL");

        let mut tree = ConditionTree::new();
        tree.and("deleted_at", "!=", None::<i32>);
        assert_eq!(compile(&tree), "`deleted_at` IS NOT NULL");
    }

    #[test]
    fn test_operators_are_upper_cased() {
        let mut tree = ConditionTree::new();
        tree.and("name", "like", "%john%").and("id", "in", [1, 2, 3]);
        assert_eq!(
            compile(&tree),
            "`name` LIKE '%john%' AND `id` IN (1, 2, 3)"
        );
    }

    #[test]
    fn test_two_argument_form() {
        let mut tree = ConditionTree::new();
        tree.and_eq("id", vec![1, 2]).or_eq("name", "bob");
        assert_eq!(compile(&tree), "`id` IN (1, 2) OR `name` = 'bob'");
    }

    #[test]
    fn test_between() {
        let mut tree = ConditionTree::new();
        tree.and("age", "between", [1, 3]);
        assert_eq!(compile(&tree), "`age` BETWEEN 1 AND 3");

        let mut tree = ConditionTree::new();
        tree.and("age", "between", 1);
        assert!(matches!(
            tree.compile(&MysqlDialect::new()),
            Err(Error::Configuration(_))
        ));
    }

    #[test]
    fn test_negated_predicates() {
        let mut tree = ConditionTree::new();
        tree.and("a", "=", 1).and_not("a", "=", 3).or_not("b", "=", 4);
        assert_eq!(
            compile(&tree),
            "`a` = 1 AND NOT `a` = 3 OR NOT `b` = 4"
        );
    }

    #[test]
    fn test_not_wraps_whole_group() {
        let mut tree = ConditionTree::new();
        tree.and_not_group(|g| {
            g.and("a", "=", 1).and("b", "=", 2);
        });
        assert_eq!(compile(&tree), "NOT (`a` = 1 AND `b` = 2)");
    }

    #[test]
    fn test_nested_negated_groups() {
        let mut tree = ConditionTree::new();
        tree.and("x", "=", 0).or_not_group(|g| {
            g.and("a", "=", 1).and_not_group(|g| {
                g.and("b", "=", 2).or("c", "=", 3);
            });
        });
        assert_eq!(
            compile(&tree),
            "`x` = 0 OR NOT (`a` = 1 AND NOT (`b` = 2 OR `c` = 3))"
        );
    }

    #[test]
    fn test_empty_group_is_dropped() {
        let mut tree = ConditionTree::new();
        tree.and("a", "=", 1).and_group(|_| {});
        assert_eq!(tree.nodes().len(), 1);
        assert_eq!(compile(&tree), "`a` = 1");
    }

    #[test]
    fn test_unbalanced_nodes() {
        let open = ConditionTree::from_nodes(vec![ConditionNode::GroupOpen {
            chain: Chain::And,
            negate: false,
        }]);
        assert!(open.compile(&MysqlDialect::new()).is_err());

        let close = ConditionTree::from_nodes(vec![ConditionNode::GroupClose]);
        assert!(close.compile(&MysqlDialect::new()).is_err());
    }

    #[test]
    fn test_placeholder_passthrough() {
        let mut tree = ConditionTree::new();
        tree.and("id", "=", "?");
        assert_eq!(compile(&tree), "`id` = ?");
    }
}

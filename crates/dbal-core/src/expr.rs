//! Expressions: values that know how to render themselves against a
//! dialect.
//!
//! # Example
//!
//! ```rust
//! use dbal_core::dialect::{Dialect, MysqlDialect};
//! use dbal_core::expr;
//!
//! let dialect = MysqlDialect::new();
//! assert_eq!(expr::increment("name", -5).render(&dialect).unwrap(), "`name` - 5");
//! assert_eq!(expr::param("id").render(&dialect).unwrap(), ":id");
//! ```

use crate::dialect::Dialect;
use crate::error::Result;
use crate::query::{Delete, Insert, Query, Select, Update};
use crate::value::{ToValue, Value};

/// Something rendered through the identifier-quoting rule.
#[derive(Debug, Clone, PartialEq)]
pub enum Identifier {
    /// A plain or dotted (`table.column`) name. `*` is never quoted.
    Name(String),
    /// `identifier AS alias`.
    Alias(Box<Identifier>, String),
    /// An expression, rendered as is.
    Expr(Box<Expression>),
    /// A sub-query, rendered in parentheses.
    Query(Box<Query>),
}

impl Identifier {
    /// Wraps this identifier in an alias.
    #[must_use]
    pub fn alias(self, alias: impl Into<String>) -> Self {
        Self::Alias(Box::new(self), alias.into())
    }

    /// Returns the plain name, if this is a name.
    #[must_use]
    pub fn as_name(&self) -> Option<&str> {
        match self {
            Self::Name(name) => Some(name),
            _ => None,
        }
    }
}

impl From<&str> for Identifier {
    fn from(name: &str) -> Self {
        Self::Name(String::from(name))
    }
}

impl From<String> for Identifier {
    fn from(name: String) -> Self {
        Self::Name(name)
    }
}

impl From<&String> for Identifier {
    fn from(name: &String) -> Self {
        Self::Name(name.clone())
    }
}

impl<I: Into<Identifier>> From<(I, &str)> for Identifier {
    fn from((ident, alias): (I, &str)) -> Self {
        ident.into().alias(alias)
    }
}

impl From<Expression> for Identifier {
    fn from(expr: Expression) -> Self {
        Self::Expr(Box::new(expr))
    }
}

impl From<Query> for Identifier {
    fn from(query: Query) -> Self {
        Self::Query(Box::new(query))
    }
}

macro_rules! query_to_identifier {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Identifier {
                fn from(query: $t) -> Self {
                    Self::Query(Box::new(Query::from(query)))
                }
            }
        )*
    };
}

query_to_identifier!(Select, Insert, Update, Delete);

/// A polymorphic SQL expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    /// Already-safe SQL, rendered verbatim.
    Raw(String),
    /// A value rendered through the value-quoting rule.
    Value(Value),
    /// An identifier rendered through the identifier-quoting rule.
    Identifier(Identifier),
    /// A named placeholder, rendered as `:name`.
    Parameter(String),
    /// `field + amount` or `field - |amount|`.
    Increment(Increment),
    /// `CASE ... WHEN ... THEN ... ELSE ... END`.
    Case(Case),
    /// Full-text `MATCH (...) AGAINST (...)`.
    Match(Match),
    /// A function call such as `NOW()` or `CONCAT(a, b)`.
    Command(Command),
}

impl Expression {
    /// Renders the expression for the given dialect.
    ///
    /// Rendering never mutates the expression.
    pub fn render<D: Dialect + ?Sized>(&self, dialect: &D) -> Result<String> {
        match self {
            Self::Raw(sql) => Ok(sql.clone()),
            Self::Value(value) => dialect.quote(value),
            Self::Identifier(ident) => dialect.quote_identifier(ident),
            Self::Parameter(name) => Ok(format!(":{name}")),
            Self::Increment(inc) => {
                dialect.compile_increment(&inc.field, inc.subtract, inc.amount)
            }
            Self::Case(case) => dialect.compile_case(case),
            Self::Match(m) => dialect.compile_match(m),
            Self::Command(cmd) => dialect.compile_command(cmd),
        }
    }
}

/// An increment (or decrement) of a numeric column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Increment {
    /// The column being changed.
    pub field: String,
    /// Renders `-` instead of `+`.
    pub subtract: bool,
    /// Magnitude of the change.
    pub amount: u64,
}

/// A `CASE` expression over a discriminant column.
#[derive(Debug, Clone, PartialEq)]
pub struct Case {
    /// The discriminant.
    pub value: Identifier,
    /// `(when, then)` arms in insertion order.
    pub arms: Vec<(Value, Value)>,
    /// The `ELSE` value.
    pub otherwise: Value,
}

impl Case {
    /// Adds a `WHEN value THEN then` arm.
    #[must_use]
    pub fn is<W: ToValue, T: ToValue>(mut self, when: W, then: T) -> Self {
        self.arms.push((when.to_value(), then.to_value()));
        self
    }

    /// Sets the `ELSE` value.
    #[must_use]
    pub fn or_else<T: ToValue>(mut self, value: T) -> Self {
        self.otherwise = value.to_value();
        self
    }
}

/// Search modifier of a full-text `MATCH` expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MatchMode {
    /// Natural language mode (no modifier).
    #[default]
    Natural,
    /// `IN BOOLEAN MODE`.
    Boolean,
    /// `WITH QUERY EXPANSION`.
    Expansion,
}

/// A full-text `MATCH (...) AGAINST (...)` expression.
///
/// Boolean mode and query expansion are mutually exclusive: enabling one
/// clears the other.
#[derive(Debug, Clone, PartialEq)]
pub struct Match {
    /// Columns searched.
    pub fields: Vec<Identifier>,
    /// Search string.
    pub against: Value,
    /// Search modifier.
    pub mode: MatchMode,
}

impl Match {
    /// Sets the search string.
    #[must_use]
    pub fn against<T: ToValue>(mut self, value: T) -> Self {
        self.against = value.to_value();
        self
    }

    /// Enables or disables boolean mode.
    #[must_use]
    pub fn boolean(mut self, enabled: bool) -> Self {
        if enabled {
            self.mode = MatchMode::Boolean;
        } else if self.mode == MatchMode::Boolean {
            self.mode = MatchMode::Natural;
        }
        self
    }

    /// Enables or disables query expansion.
    #[must_use]
    pub fn expand(mut self, enabled: bool) -> Self {
        if enabled {
            self.mode = MatchMode::Expansion;
        } else if self.mode == MatchMode::Expansion {
            self.mode = MatchMode::Natural;
        }
        self
    }
}

/// A function call, rendered by the dialect.
#[derive(Debug, Clone, PartialEq)]
pub struct Command {
    /// Function name, upper-cased on render.
    pub name: String,
    /// Arguments in call order.
    pub args: Vec<Value>,
    /// Optional `AS alias`.
    pub alias: Option<String>,
}

impl Command {
    /// Appends an argument.
    #[must_use]
    pub fn arg<T: ToValue>(mut self, value: T) -> Self {
        self.args.push(value.to_value());
        self
    }

    /// Sets the alias.
    #[must_use]
    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }
}

impl From<Increment> for Expression {
    fn from(inc: Increment) -> Self {
        Self::Increment(inc)
    }
}

impl From<Case> for Expression {
    fn from(case: Case) -> Self {
        Self::Case(case)
    }
}

impl From<Match> for Expression {
    fn from(m: Match) -> Self {
        Self::Match(m)
    }
}

impl From<Command> for Expression {
    fn from(cmd: Command) -> Self {
        Self::Command(cmd)
    }
}

impl ToValue for Case {
    fn to_value(self) -> Value {
        Expression::from(self).to_value()
    }
}

impl ToValue for Match {
    fn to_value(self) -> Value {
        Expression::from(self).to_value()
    }
}

impl ToValue for Command {
    fn to_value(self) -> Value {
        Expression::from(self).to_value()
    }
}

impl From<Case> for Identifier {
    fn from(case: Case) -> Self {
        Expression::from(case).into()
    }
}

impl From<Match> for Identifier {
    fn from(m: Match) -> Self {
        Expression::from(m).into()
    }
}

impl From<Command> for Identifier {
    fn from(cmd: Command) -> Self {
        Expression::from(cmd).into()
    }
}

/// Raw SQL, rendered verbatim.
///
/// **Warning**: only use this for SQL fragments that don't contain user
/// input.
#[must_use]
pub fn raw(sql: impl Into<String>) -> Expression {
    Expression::Raw(sql.into())
}

/// A quoted value.
#[must_use]
pub fn value<T: ToValue>(value: T) -> Expression {
    Expression::Value(value.to_value())
}

/// A quoted identifier.
#[must_use]
pub fn identifier(ident: impl Into<Identifier>) -> Expression {
    Expression::Identifier(ident.into())
}

/// A named parameter placeholder (`:name`).
#[must_use]
pub fn param(name: impl Into<String>) -> Expression {
    Expression::Parameter(name.into())
}

/// `field + amount`, or `field - |amount|` for negative amounts.
#[must_use]
pub fn increment(field: impl Into<String>, amount: i64) -> Expression {
    Expression::Increment(Increment {
        field: field.into(),
        subtract: amount < 0,
        amount: amount.unsigned_abs(),
    })
}

/// `field - amount`, or `field + |amount|` for negative amounts.
#[must_use]
pub fn decrement(field: impl Into<String>, amount: i64) -> Expression {
    Expression::Increment(Increment {
        field: field.into(),
        subtract: amount >= 0,
        amount: amount.unsigned_abs(),
    })
}

/// Starts a `CASE` expression over `field`.
#[must_use]
pub fn when(field: impl Into<Identifier>) -> Case {
    Case {
        value: field.into(),
        arms: vec![],
        otherwise: Value::Null,
    }
}

/// Starts a full-text `MATCH` over the given columns.
#[must_use]
pub fn match_fields<I, F>(fields: I) -> Match
where
    I: IntoIterator<Item = F>,
    F: Into<Identifier>,
{
    Match {
        fields: fields.into_iter().map(Into::into).collect(),
        against: Value::Null,
        mode: MatchMode::Natural,
    }
}

/// Starts a function call.
#[must_use]
pub fn command(name: impl Into<String>) -> Command {
    Command {
        name: name.into(),
        args: vec![],
        alias: None,
    }
}

/// `CONCAT` of the given columns; the rendering is dialect-specific.
#[must_use]
pub fn concat<I, T>(args: I) -> Command
where
    I: IntoIterator<Item = T>,
    T: ToValue,
{
    Command {
        name: String::from("concat"),
        args: args.into_iter().map(ToValue::to_value).collect(),
        alias: None,
    }
}

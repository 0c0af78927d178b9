//! Values that can appear on the right-hand side of a condition, in an
//! insert row, or in an update assignment.
//!
//! A [`Value`] is quoted by the active [`Dialect`](crate::dialect::Dialect)
//! at compile time; nothing is escaped when the value is built.

use crate::expr::Expression;
use crate::query::{Delete, Insert, Query, Select, Update};

/// A value rendered through the dialect's value-quoting rule.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// NULL value.
    Null,
    /// Boolean value, rendered as the string literal `'1'` or `'0'`.
    Bool(bool),
    /// Integer value.
    Int(i64),
    /// Float value, always rendered with a `.` decimal separator.
    Float(f64),
    /// Text value, escaped by the dialect. The text `?` is passed through
    /// untouched as a positional placeholder.
    Text(String),
    /// Binary blob value.
    Blob(Vec<u8>),
    /// Parenthesised, comma-separated list (used by `IN` and `BETWEEN`).
    List(Vec<Value>),
    /// An expression that renders itself.
    Expr(Box<Expression>),
    /// A sub-query, rendered in parentheses.
    Query(Box<Query>),
}

impl Value {
    /// The positional placeholder `?`.
    #[must_use]
    pub fn placeholder() -> Self {
        Self::Text(String::from("?"))
    }

    /// Returns `true` for [`Value::Null`].
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Returns `true` for [`Value::List`].
    #[must_use]
    pub const fn is_list(&self) -> bool {
        matches!(self, Self::List(_))
    }

    /// Returns `true` for the positional placeholder `?`.
    #[must_use]
    pub fn is_placeholder(&self) -> bool {
        matches!(self, Self::Text(s) if s == "?")
    }
}

/// Trait for types that can be converted to a [`Value`].
pub trait ToValue {
    /// Converts the value to a `Value`.
    fn to_value(self) -> Value;
}

impl ToValue for Value {
    fn to_value(self) -> Value {
        self
    }
}

impl ToValue for bool {
    fn to_value(self) -> Value {
        Value::Bool(self)
    }
}

macro_rules! int_to_value {
    ($($t:ty),*) => {
        $(
            impl ToValue for $t {
                fn to_value(self) -> Value {
                    Value::Int(i64::from(self))
                }
            }
        )*
    };
}

int_to_value!(i8, i16, i32, i64, u8, u16, u32);

impl ToValue for f64 {
    fn to_value(self) -> Value {
        Value::Float(self)
    }
}

impl ToValue for f32 {
    fn to_value(self) -> Value {
        Value::Float(f64::from(self))
    }
}

impl ToValue for String {
    fn to_value(self) -> Value {
        Value::Text(self)
    }
}

impl ToValue for &str {
    fn to_value(self) -> Value {
        Value::Text(String::from(self))
    }
}

impl ToValue for &[u8] {
    fn to_value(self) -> Value {
        Value::Blob(self.to_vec())
    }
}

impl<T: ToValue> ToValue for Option<T> {
    fn to_value(self) -> Value {
        match self {
            Some(v) => v.to_value(),
            None => Value::Null,
        }
    }
}

impl<T: ToValue> ToValue for Vec<T> {
    fn to_value(self) -> Value {
        Value::List(self.into_iter().map(ToValue::to_value).collect())
    }
}

impl<T: ToValue, const N: usize> ToValue for [T; N] {
    fn to_value(self) -> Value {
        Value::List(self.into_iter().map(ToValue::to_value).collect())
    }
}

impl ToValue for Expression {
    fn to_value(self) -> Value {
        Value::Expr(Box::new(self))
    }
}

impl ToValue for Query {
    fn to_value(self) -> Value {
        Value::Query(Box::new(self))
    }
}

macro_rules! query_to_value {
    ($($t:ty),*) => {
        $(
            impl ToValue for $t {
                fn to_value(self) -> Value {
                    Value::Query(Box::new(Query::from(self)))
                }
            }
        )*
    };
}

query_to_value!(Select, Insert, Update, Delete);

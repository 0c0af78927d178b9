//! Column definitions and their capability interface.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::expr;
use crate::value::{ToValue, Value};

/// Portable column types.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnType {
    TinyInt,
    SmallInt,
    Integer,
    BigInt,
    String,
    Char,
    Text,
    Boolean,
    Decimal,
    Float,
    Double,
    Date,
    DateTime,
    Timestamp,
    Time,
    Binary,
    /// `ENUM('a', 'b', ...)`.
    Enum(Vec<String>),
    /// A type keyword rendered verbatim.
    Custom(String),
}

impl ColumnType {
    /// Returns `true` for the integer family.
    #[must_use]
    pub const fn is_integer(&self) -> bool {
        matches!(
            self,
            Self::TinyInt | Self::SmallInt | Self::Integer | Self::BigInt
        )
    }
}

/// Default value for a column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DefaultValue {
    /// NULL default.
    Null,
    /// Boolean default.
    Boolean(bool),
    /// Integer default.
    Integer(i64),
    /// Float default.
    Float(f64),
    /// String default.
    String(String),
    /// Raw SQL expression (e.g., `CURRENT_TIMESTAMP`).
    Expression(String),
}

impl DefaultValue {
    /// Converts the default into a value the dialect can quote.
    #[must_use]
    pub fn to_value(&self) -> Value {
        match self {
            Self::Null => Value::Null,
            Self::Boolean(b) => Value::Bool(*b),
            Self::Integer(i) => Value::Int(*i),
            Self::Float(f) => Value::Float(*f),
            Self::String(s) => Value::Text(s.clone()),
            Self::Expression(sql) => expr::raw(sql.as_str()).to_value(),
        }
    }

    fn from_json(value: &serde_json::Value) -> Result<Self> {
        match value {
            serde_json::Value::Null => Ok(Self::Null),
            serde_json::Value::Bool(b) => Ok(Self::Boolean(*b)),
            serde_json::Value::Number(n) => n
                .as_i64()
                .map(Self::Integer)
                .or_else(|| n.as_f64().map(Self::Float))
                .ok_or_else(|| Error::configuration(format!("unusable default {n}"))),
            serde_json::Value::String(s) => Ok(Self::String(s.clone())),
            other => Err(Error::configuration(format!("unusable default {other}"))),
        }
    }
}

impl From<bool> for DefaultValue {
    fn from(b: bool) -> Self {
        Self::Boolean(b)
    }
}

impl From<i64> for DefaultValue {
    fn from(i: i64) -> Self {
        Self::Integer(i)
    }
}

impl From<i32> for DefaultValue {
    fn from(i: i32) -> Self {
        Self::Integer(i64::from(i))
    }
}

impl From<f64> for DefaultValue {
    fn from(f: f64) -> Self {
        Self::Float(f)
    }
}

impl From<&str> for DefaultValue {
    fn from(s: &str) -> Self {
        Self::String(String::from(s))
    }
}

impl From<String> for DefaultValue {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

/// Where a column is placed by `ADD`/`MODIFY` (MySQL only).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Position {
    First,
    After(String),
}

/// A column definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnDefinition {
    /// Column name.
    pub name: String,
    /// Data type.
    #[serde(rename = "type")]
    pub ty: ColumnType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub length: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub precision: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale: Option<u32>,
    #[serde(default)]
    pub nullable: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<DefaultValue>,
    #[serde(default)]
    pub auto_increment: bool,
    #[serde(default)]
    pub unsigned: bool,
    #[serde(default)]
    pub zerofill: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub charset: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collation: Option<String>,
    /// Placement directive; not part of the column's shape.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<Position>,
}

impl ColumnDefinition {
    /// Creates a NOT NULL column without a default.
    #[must_use]
    pub fn new(name: impl Into<String>, ty: ColumnType) -> Self {
        Self {
            name: name.into(),
            ty,
            length: None,
            precision: None,
            scale: None,
            nullable: false,
            default: None,
            auto_increment: false,
            unsigned: false,
            zerofill: false,
            comment: None,
            charset: None,
            collation: None,
            position: None,
        }
    }

    /// Compares everything except the placement directive.
    #[must_use]
    pub fn same_shape(&self, other: &Self) -> bool {
        Self {
            position: None,
            ..self.clone()
        } == Self {
            position: None,
            ..other.clone()
        }
    }

    /// Allows NULL.
    pub fn nullable(&mut self) -> &mut Self {
        self.nullable = true;
        self
    }

    /// Disallows NULL.
    pub fn not_null(&mut self) -> &mut Self {
        self.nullable = false;
        self
    }

    /// Marks the column UNSIGNED.
    pub fn unsigned(&mut self) -> &mut Self {
        self.unsigned = true;
        self
    }

    /// Marks the column UNSIGNED ZEROFILL.
    pub fn zerofill(&mut self) -> &mut Self {
        self.unsigned = true;
        self.zerofill = true;
        self
    }

    /// Sets the default value.
    pub fn default(&mut self, value: impl Into<DefaultValue>) -> &mut Self {
        self.default = Some(value.into());
        self
    }

    /// Sets a raw SQL default such as `CURRENT_TIMESTAMP`.
    pub fn default_expression(&mut self, sql: impl Into<String>) -> &mut Self {
        self.default = Some(DefaultValue::Expression(sql.into()));
        self
    }

    /// Removes the default value.
    pub fn no_default(&mut self) -> &mut Self {
        self.default = None;
        self
    }

    /// Marks the column auto-incrementing.
    pub fn auto_increment(&mut self) -> &mut Self {
        self.auto_increment = true;
        self
    }

    /// Sets the column comment.
    pub fn comment(&mut self, comment: impl Into<String>) -> &mut Self {
        self.comment = Some(comment.into());
        self
    }

    /// Sets the character set. A `charset_collation` name such as
    /// `utf8_general_ci` sets both.
    pub fn charset(&mut self, charset: &str) -> &mut Self {
        let (charset, collation) = split_charset(charset);
        self.charset = Some(charset);
        if collation.is_some() {
            self.collation = collation;
        }
        self
    }

    /// Sets the collation.
    pub fn collation(&mut self, collation: impl Into<String>) -> &mut Self {
        self.collation = Some(collation.into());
        self
    }

    /// Places the column first.
    pub fn first(&mut self) -> &mut Self {
        self.position = Some(Position::First);
        self
    }

    /// Places the column after another one.
    pub fn after(&mut self, column: impl Into<String>) -> &mut Self {
        self.position = Some(Position::After(column.into()));
        self
    }

    /// Sets the length.
    pub fn length(&mut self, length: u32) -> &mut Self {
        self.length = Some(length);
        self
    }

    /// Sets precision and scale.
    pub fn precision(&mut self, precision: u32, scale: u32) -> &mut Self {
        self.precision = Some(precision);
        self.scale = Some(scale);
        self
    }

    /// Sets the scale alone.
    pub fn scale(&mut self, scale: u32) -> &mut Self {
        self.scale = Some(scale);
        self
    }

    /// Sets an option by name, as found in a JSON definition.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedOperation`] for an unknown option and
    /// [`Error::Configuration`] for a value of the wrong type.
    pub fn set_option(&mut self, name: &str, value: &serde_json::Value) -> Result<&mut Self> {
        match name {
            "nullable" | "null" => self.nullable = json_bool(name, value)?,
            "unsigned" => self.unsigned = json_bool(name, value)?,
            "zerofill" => {
                self.zerofill = json_bool(name, value)?;
                self.unsigned |= self.zerofill;
            }
            "auto_increment" | "increment" => self.auto_increment = json_bool(name, value)?,
            "default" => self.default = Some(DefaultValue::from_json(value)?),
            "comment" => self.comment = Some(json_string(name, value)?),
            "charset" => {
                let charset = json_string(name, value)?;
                self.charset(&charset);
            }
            "collation" | "collate" => self.collation = Some(json_string(name, value)?),
            "first" => {
                if json_bool(name, value)? {
                    self.position = Some(Position::First);
                }
            }
            "after" => self.position = Some(Position::After(json_string(name, value)?)),
            "length" => self.length = Some(json_u32(name, value)?),
            "precision" => self.precision = Some(json_u32(name, value)?),
            "scale" => self.scale = Some(json_u32(name, value)?),
            _ => return Err(Error::unsupported("column", format!("set_{name}"))),
        }
        Ok(self)
    }
}

/// Splits `utf8_general_ci` into `("utf8", Some("utf8_general_ci"))`.
pub(crate) fn split_charset(charset: &str) -> (String, Option<String>) {
    charset.find('_').map_or_else(
        || (String::from(charset), None),
        |pos| (String::from(&charset[..pos]), Some(String::from(charset))),
    )
}

pub(crate) fn json_bool(name: &str, value: &serde_json::Value) -> Result<bool> {
    value
        .as_bool()
        .ok_or_else(|| Error::configuration(format!("option '{name}' expects a boolean")))
}

pub(crate) fn json_string(name: &str, value: &serde_json::Value) -> Result<String> {
    value
        .as_str()
        .map(String::from)
        .ok_or_else(|| Error::configuration(format!("option '{name}' expects a string")))
}

fn json_u32(name: &str, value: &serde_json::Value) -> Result<u32> {
    value
        .as_u64()
        .and_then(|n| u32::try_from(n).ok())
        .ok_or_else(|| Error::configuration(format!("option '{name}' expects a small integer")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_capabilities_chain() {
        let mut col = ColumnDefinition::new("price", ColumnType::Decimal);
        col.precision(10, 2).unsigned().nullable().default(0).comment("in cents");
        assert_eq!(col.precision, Some(10));
        assert_eq!(col.scale, Some(2));
        assert!(col.unsigned && col.nullable);
        assert_eq!(col.default, Some(DefaultValue::Integer(0)));
        assert_eq!(col.comment.as_deref(), Some("in cents"));
    }

    #[test]
    fn test_charset_splits_collation() {
        let mut col = ColumnDefinition::new("name", ColumnType::String);
        col.charset("utf8_general_ci");
        assert_eq!(col.charset.as_deref(), Some("utf8"));
        assert_eq!(col.collation.as_deref(), Some("utf8_general_ci"));

        col.charset("latin1");
        assert_eq!(col.charset.as_deref(), Some("latin1"));
        assert_eq!(col.collation.as_deref(), Some("utf8_general_ci"));
    }

    #[test]
    fn test_set_option() {
        let mut col = ColumnDefinition::new("id", ColumnType::Integer);
        col.set_option("unsigned", &json!(true))
            .unwrap()
            .set_option("length", &json!(11))
            .unwrap()
            .set_option("default", &json!("x"))
            .unwrap();
        assert!(col.unsigned);
        assert_eq!(col.length, Some(11));
        assert_eq!(col.default, Some(DefaultValue::String(String::from("x"))));

        assert!(matches!(
            col.set_option("frobnicate", &json!(1)),
            Err(Error::UnsupportedOperation { .. })
        ));
        assert!(matches!(
            col.set_option("nullable", &json!("yes")),
            Err(Error::Configuration(_))
        ));
    }

    #[test]
    fn test_same_shape_ignores_position() {
        let a = ColumnDefinition::new("a", ColumnType::Text);
        let mut b = a.clone();
        b.first();
        assert!(a.same_shape(&b));
        b.nullable();
        assert!(!a.same_shape(&b));
    }

    #[test]
    fn test_serde_shape() {
        let col: ColumnDefinition = serde_json::from_value(json!({
            "name": "status",
            "type": {"enum": ["on", "off"]},
            "default": {"string": "on"}
        }))
        .unwrap();
        assert_eq!(col.ty, ColumnType::Enum(vec![String::from("on"), String::from("off")]));
        assert!(!col.nullable);
        assert_eq!(col.default, Some(DefaultValue::String(String::from("on"))));
    }
}

//! Table definitions.
//!
//! A [`TableDefinition`] describes the desired shape of one table. It is
//! usually filled in by a callback handed to the schema manager:
//!
//! ```rust
//! use dbal_core::schema::TableDefinition;
//!
//! let mut users = TableDefinition::new("users");
//! users.increment("id");
//! users.string("email", 255).comment("login");
//! users.boolean("active").default(true);
//! users.unique(["email"]);
//!
//! assert_eq!(users.column_names(), vec!["id", "email", "active"]);
//! ```

use serde::{Deserialize, Serialize};

use super::column::{json_string, split_charset, ColumnDefinition, ColumnType, Position};
use crate::error::{Error, Result};

/// Kind of index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IndexKind {
    Primary,
    Unique,
    Fulltext,
    Plain,
}

/// An index over one or more columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexDefinition {
    pub name: String,
    pub kind: IndexKind,
    pub columns: Vec<String>,
}

impl IndexDefinition {
    /// Name given to every primary key.
    pub const PRIMARY: &'static str = "PRIMARY";

    /// Creates an index with the conventional name
    /// (`PRIMARY`, `a_b_unique`, `a_b_index`, `a_b_fulltext`).
    #[must_use]
    pub fn new(kind: IndexKind, columns: Vec<String>) -> Self {
        let name = match kind {
            IndexKind::Primary => String::from(Self::PRIMARY),
            IndexKind::Unique => format!("{}_unique", columns.join("_")),
            IndexKind::Fulltext => format!("{}_fulltext", columns.join("_")),
            IndexKind::Plain => format!("{}_index", columns.join("_")),
        };
        Self {
            name,
            kind,
            columns,
        }
    }
}

/// Table-level options.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub engine: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub charset: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

/// The desired shape of a table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableDefinition {
    pub name: String,
    #[serde(default)]
    pub columns: Vec<ColumnDefinition>,
    #[serde(default)]
    pub indexes: Vec<IndexDefinition>,
    #[serde(default)]
    pub options: TableOptions,
    /// Renders `CREATE TABLE IF NOT EXISTS`; not part of the shape.
    #[serde(default)]
    pub if_not_exists: bool,
}

impl TableDefinition {
    /// Creates an empty definition.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: vec![],
            indexes: vec![],
            options: TableOptions::default(),
            if_not_exists: false,
        }
    }

    /// Looks up a column.
    #[must_use]
    pub fn column(&self, name: &str) -> Option<&ColumnDefinition> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Returns the column names in declaration order.
    #[must_use]
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    /// Looks up an index by name.
    #[must_use]
    pub fn index_named(&self, name: &str) -> Option<&IndexDefinition> {
        self.indexes.iter().find(|i| i.name == name)
    }

    /// Returns the primary key, if any.
    #[must_use]
    pub fn primary_key(&self) -> Option<&IndexDefinition> {
        self.indexes.iter().find(|i| i.kind == IndexKind::Primary)
    }

    /// Adds a column, replacing any column of the same name in place.
    pub fn add(&mut self, column: ColumnDefinition) -> &mut ColumnDefinition {
        let pos = match self.columns.iter().position(|c| c.name == column.name) {
            Some(pos) => {
                self.columns[pos] = column;
                pos
            }
            None => {
                self.columns.push(column);
                self.columns.len() - 1
            }
        };
        &mut self.columns[pos]
    }

    /// Adds a column of the given type.
    pub fn column_of(&mut self, name: &str, ty: ColumnType) -> &mut ColumnDefinition {
        self.add(ColumnDefinition::new(name, ty))
    }

    /// `VARCHAR(length)`.
    pub fn string(&mut self, name: &str, length: u32) -> &mut ColumnDefinition {
        self.column_of(name, ColumnType::String).length(length)
    }

    /// `CHAR(length)`.
    pub fn char(&mut self, name: &str, length: u32) -> &mut ColumnDefinition {
        self.column_of(name, ColumnType::Char).length(length)
    }

    /// `INT`.
    pub fn integer(&mut self, name: &str) -> &mut ColumnDefinition {
        self.column_of(name, ColumnType::Integer)
    }

    /// `BIGINT`.
    pub fn big_integer(&mut self, name: &str) -> &mut ColumnDefinition {
        self.column_of(name, ColumnType::BigInt)
    }

    /// An unsigned auto-incrementing integer primary key.
    pub fn increment(&mut self, name: &str) -> &mut ColumnDefinition {
        self.primary([name]);
        self.column_of(name, ColumnType::Integer)
            .unsigned()
            .auto_increment()
    }

    /// `TEXT`.
    pub fn text(&mut self, name: &str) -> &mut ColumnDefinition {
        self.column_of(name, ColumnType::Text)
    }

    /// Boolean column.
    pub fn boolean(&mut self, name: &str) -> &mut ColumnDefinition {
        self.column_of(name, ColumnType::Boolean)
    }

    /// `DECIMAL(precision, scale)`.
    pub fn decimal(&mut self, name: &str, precision: u32, scale: u32) -> &mut ColumnDefinition {
        self.column_of(name, ColumnType::Decimal)
            .precision(precision, scale)
    }

    /// `FLOAT`.
    pub fn float(&mut self, name: &str) -> &mut ColumnDefinition {
        self.column_of(name, ColumnType::Float)
    }

    /// `DOUBLE`.
    pub fn double(&mut self, name: &str) -> &mut ColumnDefinition {
        self.column_of(name, ColumnType::Double)
    }

    /// `DATE`.
    pub fn date(&mut self, name: &str) -> &mut ColumnDefinition {
        self.column_of(name, ColumnType::Date)
    }

    /// `DATETIME`.
    pub fn datetime(&mut self, name: &str) -> &mut ColumnDefinition {
        self.column_of(name, ColumnType::DateTime)
    }

    /// `TIMESTAMP`.
    pub fn timestamp(&mut self, name: &str) -> &mut ColumnDefinition {
        self.column_of(name, ColumnType::Timestamp)
    }

    /// `TIME`.
    pub fn time(&mut self, name: &str) -> &mut ColumnDefinition {
        self.column_of(name, ColumnType::Time)
    }

    /// Binary blob.
    pub fn binary(&mut self, name: &str) -> &mut ColumnDefinition {
        self.column_of(name, ColumnType::Binary)
    }

    /// `ENUM(options)`.
    pub fn enumeration<I, S>(&mut self, name: &str, options: I) -> &mut ColumnDefinition
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let options = options.into_iter().map(Into::into).collect();
        self.column_of(name, ColumnType::Enum(options))
    }

    /// Returns an existing column for modification.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] if the column does not exist.
    pub fn change(&mut self, name: &str) -> Result<&mut ColumnDefinition> {
        let table = &self.name;
        self.columns
            .iter_mut()
            .find(|c| c.name == name)
            .ok_or_else(|| Error::configuration(format!("no column '{name}' in '{table}'")))
    }

    /// Adds `to` carrying every attribute of `from`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] if `from` does not exist or `to`
    /// already does.
    pub fn copy(&mut self, from: &str, to: &str) -> Result<&mut ColumnDefinition> {
        if self.column(to).is_some() {
            return Err(Error::configuration(format!(
                "column '{to}' already exists in '{}'",
                self.name
            )));
        }
        let mut column = self.change(from)?.clone();
        column.name = String::from(to);
        column.position = Some(Position::After(String::from(from)));
        let at = self
            .columns
            .iter()
            .position(|c| c.name == from)
            .map_or(self.columns.len(), |i| i + 1);
        self.columns.insert(at, column);
        Ok(&mut self.columns[at])
    }

    /// Renames a column as copy-then-drop. Index membership follows the
    /// column to its new name.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] if `from` does not exist or `to`
    /// already does.
    pub fn rename(&mut self, from: &str, to: &str) -> Result<&mut Self> {
        let placement = match self.columns.iter().position(|c| c.name == from) {
            Some(0) | None => Position::First,
            Some(i) => Position::After(self.columns[i - 1].name.clone()),
        };
        self.copy(from, to)?.position = Some(placement);
        for index in &mut self.indexes {
            for column in &mut index.columns {
                if *column == from {
                    *column = String::from(to);
                }
            }
        }
        self.drop(from)
    }

    /// Drops a column, and any index left without columns.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] if the column does not exist.
    pub fn drop(&mut self, name: &str) -> Result<&mut Self> {
        let before = self.columns.len();
        self.columns.retain(|c| c.name != name);
        if self.columns.len() == before {
            return Err(Error::configuration(format!(
                "no column '{name}' in '{}'",
                self.name
            )));
        }
        for index in &mut self.indexes {
            index.columns.retain(|c| c != name);
        }
        self.indexes.retain(|i| !i.columns.is_empty());
        Ok(self)
    }

    /// Adds an index, replacing one of the same name.
    pub fn add_index(&mut self, index: IndexDefinition) -> &mut Self {
        self.indexes.retain(|i| i.name != index.name);
        self.indexes.push(index);
        self
    }

    /// Adds a plain index (`a_b_index`).
    pub fn index<I, S>(&mut self, columns: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.add_index(IndexDefinition::new(IndexKind::Plain, collect(columns)))
    }

    /// Adds a unique index (`a_b_unique`).
    pub fn unique<I, S>(&mut self, columns: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.add_index(IndexDefinition::new(IndexKind::Unique, collect(columns)))
    }

    /// Adds a fulltext index (`a_b_fulltext`).
    pub fn fulltext<I, S>(&mut self, columns: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.add_index(IndexDefinition::new(IndexKind::Fulltext, collect(columns)))
    }

    /// Sets the primary key, replacing any previous one.
    pub fn primary<I, S>(&mut self, columns: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.indexes.retain(|i| i.kind != IndexKind::Primary);
        self.add_index(IndexDefinition::new(IndexKind::Primary, collect(columns)))
    }

    /// Removes an index by name.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] if there is no such index.
    pub fn drop_index(&mut self, name: &str) -> Result<&mut Self> {
        let before = self.indexes.len();
        self.indexes.retain(|i| i.name != name);
        if self.indexes.len() == before {
            return Err(Error::configuration(format!(
                "no index '{name}' on '{}'",
                self.name
            )));
        }
        Ok(self)
    }

    /// Sets the storage engine (MySQL).
    pub fn engine(&mut self, engine: impl Into<String>) -> &mut Self {
        self.options.engine = Some(engine.into());
        self
    }

    /// Sets the default character set; `utf8_general_ci` style names set
    /// the collation too.
    pub fn charset(&mut self, charset: &str) -> &mut Self {
        let (charset, collation) = split_charset(charset);
        self.options.charset = Some(charset);
        if collation.is_some() {
            self.options.collation = collation;
        }
        self
    }

    /// Sets the default collation.
    pub fn collate(&mut self, collation: impl Into<String>) -> &mut Self {
        self.options.collation = Some(collation.into());
        self
    }

    /// Sets the table comment.
    pub fn comment(&mut self, comment: impl Into<String>) -> &mut Self {
        self.options.comment = Some(comment.into());
        self
    }

    /// Renders `CREATE TABLE IF NOT EXISTS`.
    pub fn if_not_exists(&mut self) -> &mut Self {
        self.if_not_exists = true;
        self
    }

    /// Renames the table.
    pub fn rename_to(&mut self, name: impl Into<String>) -> &mut Self {
        self.name = name.into();
        self
    }

    /// Sets a table option by name.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedOperation`] for an unknown option and
    /// [`Error::Configuration`] for a non-string value.
    pub fn set_option(&mut self, name: &str, value: &serde_json::Value) -> Result<&mut Self> {
        match name {
            "engine" => self.options.engine = Some(json_string(name, value)?),
            "charset" => {
                let charset = json_string(name, value)?;
                self.charset(&charset);
            }
            "collation" | "collate" => self.options.collation = Some(json_string(name, value)?),
            "comment" => self.options.comment = Some(json_string(name, value)?),
            _ => return Err(Error::unsupported("table", format!("set_{name}"))),
        }
        Ok(self)
    }

    /// Checks that every index and placement refers to a column of this
    /// table, and that names are unique.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] describing the first problem.
    pub fn validate(&self) -> Result<()> {
        for (i, column) in self.columns.iter().enumerate() {
            if self.columns[..i].iter().any(|c| c.name == column.name) {
                return Err(Error::configuration(format!(
                    "duplicate column '{}' in '{}'",
                    column.name, self.name
                )));
            }
            if let Some(Position::After(after)) = &column.position {
                if self.column(after).is_none() {
                    return Err(Error::configuration(format!(
                        "column '{}' is placed after missing column '{after}'",
                        column.name
                    )));
                }
            }
        }

        let mut primaries = 0;
        for (i, index) in self.indexes.iter().enumerate() {
            if index.columns.is_empty() {
                return Err(Error::configuration(format!(
                    "index '{}' has no columns",
                    index.name
                )));
            }
            if self.indexes[..i].iter().any(|other| other.name == index.name) {
                return Err(Error::configuration(format!(
                    "duplicate index '{}' on '{}'",
                    index.name, self.name
                )));
            }
            if let Some(missing) = index.columns.iter().find(|c| self.column(c).is_none()) {
                return Err(Error::configuration(format!(
                    "index '{}' references missing column '{missing}' in '{}'",
                    index.name, self.name
                )));
            }
            if index.kind == IndexKind::Primary {
                primaries += 1;
            }
        }
        if primaries > 1 {
            return Err(Error::configuration(format!(
                "'{}' declares more than one primary key",
                self.name
            )));
        }
        Ok(())
    }
}

fn collect<I, S>(columns: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    columns.into_iter().map(Into::into).collect()
}

//! Table definitions, DDL generation, and schema diffing.
//!
//! A [`TableDefinition`] is an in-memory description of a table. The
//! [`diff`] function compares two of them and returns the DDL that turns
//! one into the other, rendered by a [`SchemaDialect`]. The
//! [`SchemaManager`] ties this to a live connection.
//!
//! # Example
//!
//! ```rust
//! use dbal_core::dialect::MysqlDialect;
//! use dbal_core::schema::{diff, TableDefinition};
//!
//! let mut before = TableDefinition::new("users");
//! before.increment("id");
//! before.string("email", 255);
//!
//! let mut after = before.clone();
//! after.boolean("active").default(true);
//!
//! let statements = diff(Some(&before), Some(&after), &MysqlDialect::new()).unwrap();
//! assert_eq!(
//!     statements,
//!     vec!["ALTER TABLE `users` ADD `active` TINYINT(1) NOT NULL DEFAULT '1'"]
//! );
//! ```

mod column;
mod dialect;
mod diff;
mod manager;
mod table;

pub use column::{ColumnDefinition, ColumnType, DefaultValue, Position};
pub use dialect::{Ddl, SchemaDialect};
pub use diff::diff;
pub use manager::SchemaManager;
pub use table::{IndexDefinition, IndexKind, TableDefinition, TableOptions};

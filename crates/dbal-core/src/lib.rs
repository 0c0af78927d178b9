//! # dbal-core
//!
//! A fluent SQL query builder with dialect-aware compilation and schema
//! diffing.
//!
//! This crate provides:
//! - Collectors for SELECT, INSERT, UPDATE and DELETE that record clauses
//!   and are compiled to SQL by a [`Dialect`]
//! - A condition tree with nested AND/OR/NOT groups
//! - MySQL, PostgreSQL, SQL Server and SQLite dialects
//! - Table definitions, a schema differ that emits ordered DDL, and a
//!   schema manager that runs it through a [`Connection`]
//!
//! ## Building Queries
//!
//! ```rust
//! use dbal_core::dialect::PostgresDialect;
//! use dbal_core::query::{Filter, Select};
//! use dbal_core::value::Value;
//!
//! let sql = Select::new()
//!     .from("users")
//!     .where_clause("deleted_at", "=", Value::Null)
//!     .where_eq("role", vec!["admin", "owner"])
//!     .order_by_dir("name", "ASC")
//!     .limit(10)
//!     .compile(&PostgresDialect::new())
//!     .unwrap();
//!
//! assert_eq!(
//!     sql,
//!     "SELECT * FROM \"users\" WHERE \"deleted_at\" IS NULL AND \"role\" IN ('admin', 'owner') ORDER BY \"name\" ASC LIMIT 10"
//! );
//! ```
//!
//! ## Values Are Quoted
//!
//! Values are escaped by the dialect before they reach the SQL text, and
//! `?` or `:name` placeholders pass through for the driver to bind:
//!
//! ```rust
//! use dbal_core::dialect::MysqlDialect;
//! use dbal_core::query::{Filter, Select};
//!
//! let user_input = "'; DROP TABLE users; --";
//! let sql = Select::new()
//!     .columns(["id"])
//!     .from("users")
//!     .where_clause("name", "=", user_input)
//!     .compile(&MysqlDialect::new())
//!     .unwrap();
//!
//! assert_eq!(sql, "SELECT `id` FROM `users` WHERE `name` = '\\'; DROP TABLE users; --'");
//! ```

pub mod condition;
pub mod connection;
pub mod dialect;
pub mod error;
pub mod expr;
pub mod query;
pub mod schema;
pub mod value;

pub use condition::{Chain, ConditionNode, ConditionTree};
pub use connection::{Connection, Database, Params, QueryResult, Row};
pub use dialect::{Dialect, DialectKind};
pub use error::{Error, Result};
pub use expr::{Expression, Identifier};
pub use query::{Delete, Filter, Insert, Query, Select, Update};
pub use schema::{diff, SchemaDialect, SchemaManager, TableDefinition};
pub use value::{ToValue, Value};

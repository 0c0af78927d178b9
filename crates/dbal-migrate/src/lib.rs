//! SQLite driver and schema tooling for `dbal-core`.
//!
//! `dbal-migrate` provides the pieces `dbal-core` leaves to a driver:
//!
//! - **Connection** - [`SqliteConnection`], a blocking [`dbal_core::Connection`]
//!   over an sqlx pool and an owned tokio runtime
//! - **Introspection** - reads tables, columns and indexes back into
//!   [`dbal_core::TableDefinition`]s through SQLite PRAGMAs
//! - **CLI** - the `dbal` binary plans and applies JSON table definitions
//!
//! # Example
//!
//! ```rust,no_run
//! use dbal_core::Database;
//! use dbal_migrate::SqliteConnection;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let db = Database::new(SqliteConnection::connect("sqlite::memory:")?);
//!
//! db.schema().create_table("users", |t| {
//!     t.increment("id");
//!     t.string("email", 255);
//!     t.unique(["email"]);
//!     Ok(())
//! })?;
//!
//! assert!(db.schema().has_column("users", "email")?);
//! # Ok(())
//! # }
//! ```
//!
//! # CLI Usage
//!
//! ```bash
//! # Print the DDL creating a table
//! dbal --dialect mysql plan users.json
//!
//! # Converge a live SQLite database
//! dbal --database sqlite:app.db apply users.json
//!
//! # Inspect it
//! dbal --database sqlite:app.db tables
//! dbal --database sqlite:app.db columns users
//! ```

pub mod connection;
pub mod error;
pub mod introspect;

pub use connection::SqliteConnection;
pub use error::{MigrateError, Result};

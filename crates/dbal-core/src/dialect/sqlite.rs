//! SQLite dialect.

use super::Dialect;

/// SQLite: ANSI quoting and `||` concatenation.
#[derive(Debug, Default, Clone, Copy)]
pub struct SqliteDialect;

impl SqliteDialect {
    /// Creates a new SQLite dialect.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Dialect for SqliteDialect {
    fn name(&self) -> &'static str {
        "sqlite"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::{self, Expression};

    #[test]
    fn test_sqlite_dialect() {
        let d = SqliteDialect::new();
        assert_eq!(d.name(), "sqlite");
        assert_eq!(
            Expression::from(expr::concat(["first", "last"]).alias("full"))
                .render(&d)
                .unwrap(),
            "\"first\" || \"last\" AS full"
        );
    }
}

//! PostgreSQL dialect.

use super::Dialect;
use crate::error::Result;
use crate::query::Insert;

/// PostgreSQL: standard quoting, `RETURNING` for generated ids.
#[derive(Debug, Default, Clone, Copy)]
pub struct PostgresDialect;

impl PostgresDialect {
    /// Creates a new PostgreSQL dialect.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Dialect for PostgresDialect {
    fn name(&self) -> &'static str {
        "postgres"
    }

    fn quote_blob(&self, bytes: &[u8]) -> String {
        let hex: String = bytes.iter().map(|b| format!("{b:02x}")).collect();
        format!("'\\x{hex}'")
    }

    fn compile_returning(&self, insert: &Insert) -> Result<Option<String>> {
        insert
            .returning
            .as_deref()
            .map(|field| Ok(format!("RETURNING {}", self.quote_name(field)?)))
            .transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_postgres_dialect() {
        let d = PostgresDialect::new();
        assert_eq!(d.name(), "postgres");
        assert_eq!(d.identifier_quote(), '"');
        assert_eq!(d.quote_blob(&[0xca, 0xfe]), "'\\xcafe'");
        assert_eq!(d.compile_returning(&Insert::new()).unwrap(), None);
    }
}

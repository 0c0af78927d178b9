//! MySQL DDL.

use super::{placement, Ddl, SchemaDialect};
use crate::dialect::{Dialect, MysqlDialect};
use crate::error::Result;
use crate::schema::column::{ColumnDefinition, ColumnType};
use crate::schema::table::{IndexDefinition, IndexKind, TableOptions};

impl SchemaDialect for MysqlDialect {
    fn column_type(&self, column: &ColumnDefinition) -> Result<String> {
        if column.ty == ColumnType::Boolean {
            return Ok(String::from("TINYINT(1)"));
        }
        super::base_column_type(self, column)
    }

    fn charset_clause(&self, column: &ColumnDefinition) -> Option<String> {
        let mut parts = Vec::new();
        if let Some(charset) = &column.charset {
            parts.push(format!("CHARACTER SET {charset}"));
        }
        if let Some(collation) = &column.collation {
            parts.push(format!("COLLATE {collation}"));
        }
        (!parts.is_empty()).then(|| parts.join(" "))
    }

    fn unsigned_clause(&self, column: &ColumnDefinition) -> Option<&'static str> {
        if column.zerofill {
            Some("UNSIGNED ZEROFILL")
        } else if column.unsigned {
            Some("UNSIGNED")
        } else {
            None
        }
    }

    fn auto_increment_clause(&self, column: &ColumnDefinition) -> Option<&'static str> {
        column.auto_increment.then_some("AUTO_INCREMENT")
    }

    fn position_clause(&self, column: &ColumnDefinition) -> Result<Option<String>> {
        placement(self, column)
    }

    fn inline_comments(&self) -> bool {
        true
    }

    fn inline_comment(&self, comment: &str) -> Option<String> {
        Some(format!("COMMENT {}", self.quote_string(comment)))
    }

    fn table_options(&self, options: &TableOptions) -> Option<String> {
        let mut parts = Vec::new();
        if let Some(engine) = &options.engine {
            parts.push(format!("ENGINE = {engine}"));
        }
        if let Some(charset) = &options.charset {
            parts.push(format!("DEFAULT CHARACTER SET {charset}"));
        }
        if let Some(collation) = &options.collation {
            parts.push(format!("COLLATE {collation}"));
        }
        if let Some(comment) = &options.comment {
            parts.push(format!("COMMENT = {}", self.quote_string(comment)));
        }
        (!parts.is_empty()).then(|| parts.join(" "))
    }

    fn index_constraint(&self, _table: &str, index: &IndexDefinition) -> Result<Ddl> {
        let columns = self.quote_columns(&index.columns)?;
        let keyword = match index.kind {
            IndexKind::Primary => return Ok(Ddl::Clause(format!("PRIMARY KEY ({columns})"))),
            IndexKind::Unique => "UNIQUE KEY",
            IndexKind::Fulltext => "FULLTEXT KEY",
            IndexKind::Plain => "KEY",
        };
        Ok(Ddl::Clause(format!(
            "{keyword} {} ({columns})",
            self.quote_name(&index.name)?
        )))
    }

    fn rename_table(&self, from: &str, to: &str) -> Result<String> {
        Ok(format!(
            "RENAME TABLE {} TO {}",
            self.quote_name(from)?,
            self.quote_name(to)?
        ))
    }

    fn add_column(&self, column: &ColumnDefinition) -> Result<String> {
        Ok(format!("ADD {}", self.column_definition(column, true)?))
    }

    fn modify_column(
        &self,
        _before: &ColumnDefinition,
        after: &ColumnDefinition,
    ) -> Result<Vec<String>> {
        Ok(vec![format!("MODIFY {}", self.column_definition(after, true)?)])
    }

    fn add_index(&self, _table: &str, index: &IndexDefinition) -> Result<Ddl> {
        let columns = self.quote_columns(&index.columns)?;
        let keyword = match index.kind {
            IndexKind::Primary => return Ok(Ddl::Clause(format!("ADD PRIMARY KEY ({columns})"))),
            IndexKind::Unique => "ADD UNIQUE INDEX",
            IndexKind::Fulltext => "ADD FULLTEXT INDEX",
            IndexKind::Plain => "ADD INDEX",
        };
        Ok(Ddl::Clause(format!(
            "{keyword} {} ({columns})",
            self.quote_name(&index.name)?
        )))
    }

    fn drop_index(
        &self,
        _table: &str,
        _original_table: &str,
        index: &IndexDefinition,
    ) -> Result<Ddl> {
        if index.kind == IndexKind::Primary {
            return Ok(Ddl::Clause(String::from("DROP PRIMARY KEY")));
        }
        Ok(Ddl::Clause(format!(
            "DROP INDEX {}",
            self.quote_name(&index.name)?
        )))
    }

    fn alter_table_options(
        &self,
        table: &str,
        before: &TableOptions,
        after: &TableOptions,
    ) -> Result<Vec<String>> {
        let table = self.quote_name(table)?;
        let mut statements = Vec::new();
        if before.engine != after.engine {
            if let Some(engine) = &after.engine {
                statements.push(format!("ALTER TABLE {table} ENGINE = {engine}"));
            }
        }
        if before.charset != after.charset || before.collation != after.collation {
            let mut sql = format!("ALTER TABLE {table}");
            if let Some(charset) = &after.charset {
                sql.push_str(&format!(" DEFAULT CHARACTER SET {charset}"));
            }
            if let Some(collation) = &after.collation {
                sql.push_str(&format!(" COLLATE {collation}"));
            }
            if after.charset.is_some() || after.collation.is_some() {
                statements.push(sql);
            }
        }
        if before.comment != after.comment {
            let comment = after.comment.as_deref().unwrap_or_default();
            statements.push(format!(
                "ALTER TABLE {table} COMMENT = {}",
                self.quote_string(comment)
            ));
        }
        Ok(statements)
    }
}

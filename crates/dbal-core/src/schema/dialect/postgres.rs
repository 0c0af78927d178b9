//! PostgreSQL DDL.

use super::{checked_enum, SchemaDialect};
use crate::dialect::{Dialect, PostgresDialect};
use crate::error::Result;
use crate::schema::column::{ColumnDefinition, ColumnType};

impl SchemaDialect for PostgresDialect {
    fn column_type(&self, column: &ColumnDefinition) -> Result<String> {
        if column.auto_increment && column.ty.is_integer() {
            return Ok(String::from(match column.ty {
                ColumnType::BigInt => "BIGSERIAL",
                ColumnType::TinyInt | ColumnType::SmallInt => "SMALLSERIAL",
                _ => "SERIAL",
            }));
        }
        Ok(match &column.ty {
            ColumnType::TinyInt | ColumnType::SmallInt => String::from("SMALLINT"),
            ColumnType::Integer => String::from("INTEGER"),
            ColumnType::BigInt => String::from("BIGINT"),
            ColumnType::Float => String::from("REAL"),
            ColumnType::Double => String::from("DOUBLE PRECISION"),
            ColumnType::DateTime => String::from("TIMESTAMP"),
            ColumnType::Binary => String::from("BYTEA"),
            ColumnType::Enum(options) => checked_enum(self, "VARCHAR(255)", column, options)?,
            _ => super::base_column_type(self, column)?,
        })
    }

    fn table_comment(&self, table: &str, comment: Option<&str>) -> Result<Option<String>> {
        Ok(Some(format!(
            "COMMENT ON TABLE {} IS {}",
            self.quote_name(table)?,
            comment.map_or_else(|| String::from("NULL"), |c| self.quote_string(c))
        )))
    }

    fn column_comment(
        &self,
        table: &str,
        column: &str,
        comment: Option<&str>,
    ) -> Result<Option<String>> {
        Ok(Some(format!(
            "COMMENT ON COLUMN {}.{} IS {}",
            self.quote_name(table)?,
            self.quote_name(column)?,
            comment.map_or_else(|| String::from("NULL"), |c| self.quote_string(c))
        )))
    }
}

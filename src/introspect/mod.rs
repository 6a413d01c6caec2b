//! Database introspection
//!
//! This module provides functionality for reading table metadata from
//! databases. Each supported database has its own feature-gated submodule.

use crate::prelude::{Column, SqlgenError, Table};

/// Filters to apply to the listed tables
#[derive(Debug, Default, Clone)]
pub struct TableFilter {
    /// Only include these tables (if Some)
    pub include: Option<Vec<String>>,
    /// Exclude these tables
    pub exclude: Option<Vec<String>>,
}

impl TableFilter {
    /// Check if a table should be included
    pub fn should_include(&self, table_name: &str) -> bool {
        // Check include list
        if let Some(include) = &self.include {
            if !include.iter().any(|t| t == table_name) {
                return false;
            }
        }

        // Check exclude list
        if let Some(exclude) = &self.exclude {
            if exclude.iter().any(|t| t == table_name) {
                return false;
            }
        }

        true
    }

    /// Keep the tables that pass the filter, preserving their order
    pub fn apply(&self, table_names: Vec<String>) -> Vec<String> {
        table_names
            .into_iter()
            .filter(|name| self.should_include(name))
            .collect()
    }

    /// Tables named in the include list that are not in `available`
    pub fn missing<'a>(&'a self, available: &[String]) -> Vec<&'a str> {
        self.include
            .iter()
            .flatten()
            .filter(|name| !available.contains(name))
            .map(String::as_str)
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.include.is_none() && self.exclude.is_none()
    }
}

/// Trait for database schema providers
pub trait Introspector {
    /// List the table names in a schema, sorted by name
    fn list_tables(&mut self, schema_name: &str) -> Result<Vec<String>, SqlgenError>;

    /// Describe a table's columns in ordinal position order
    ///
    /// A table without columns yields an empty list, not an error.
    fn describe_columns(
        &mut self,
        schema_name: &str,
        table_name: &str,
    ) -> Result<Vec<Column>, SqlgenError>;

    /// Read a whole table
    fn read_table(&mut self, schema_name: &str, table_name: &str) -> Result<Table, SqlgenError> {
        let columns = self.describe_columns(schema_name, table_name)?;
        Ok(Table::new(table_name, columns))
    }
}

/// Check a full column type such as `int(10) unsigned zerofill` for the
/// unsigned modifier
pub fn is_unsigned_type(column_type: &str) -> bool {
    column_type
        .to_lowercase()
        .split_whitespace()
        .any(|word| word == "unsigned")
}

// Feature-gated database implementations
#[cfg(feature = "mysql")]
mod mysql;

#[cfg(feature = "mysql")]
pub use mysql::MysqlIntrospector;

use std::time::Duration;

use sqlx::mysql::{MySqlConnectOptions, MySqlPool, MySqlPoolOptions, MySqlRow};
use sqlx::Row;
use tokio::runtime::{Builder, Runtime};
use tracing::{debug, error, info, trace};

use super::{is_unsigned_type, Introspector};
use crate::config::DbConfig;
use crate::prelude::SqlgenError;
use crate::schema::{Column, KeyRole};

const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(30);

/// MySQL introspector
///
/// Owns a single-connection pool and a current-thread runtime that drives
/// it, so callers see a plain blocking API.
pub struct MysqlIntrospector {
    runtime: Runtime,
    pool: MySqlPool,
}

impl MysqlIntrospector {
    /// Connect and verify the connection
    pub fn connect(config: &DbConfig) -> Result<Self, SqlgenError> {
        info!(connection = ?config.redacted_connection_string(), "Connecting to MySQL");

        let runtime = Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| SqlgenError::Connection(format!("Failed to start runtime: {}", e)))?;

        let options = MySqlConnectOptions::new()
            .host(&config.host)
            .port(config.port)
            .username(&config.user)
            .password(&config.password)
            .database(&config.database);

        let pool = runtime
            .block_on(
                MySqlPoolOptions::new()
                    .max_connections(1)
                    .acquire_timeout(ACQUIRE_TIMEOUT)
                    .connect_with(options),
            )
            .map_err(|e| {
                error!(
                    connection = ?config.redacted_connection_string(),
                    error = ?e,
                    "Connection failed"
                );
                SqlgenError::Connection(format!(
                    "{} ({})",
                    e,
                    config.redacted_connection_string()
                ))
            })?;

        info!("Connected to database");
        Ok(Self { runtime, pool })
    }

    fn fetch_all(&self, sql: &str, binds: &[&str]) -> Result<Vec<MySqlRow>, sqlx::Error> {
        let mut query = sqlx::query(sql);
        for value in binds {
            query = query.bind(*value);
        }
        self.runtime.block_on(query.fetch_all(&self.pool))
    }
}

impl Drop for MysqlIntrospector {
    fn drop(&mut self) {
        self.runtime.block_on(self.pool.close());
    }
}

impl Introspector for MysqlIntrospector {
    fn list_tables(&mut self, schema_name: &str) -> Result<Vec<String>, SqlgenError> {
        trace!(schema = ?schema_name, "Querying tables");

        let sql = r#"
            SELECT CAST(TABLE_NAME AS CHAR) AS table_name
            FROM information_schema.TABLES
            WHERE TABLE_SCHEMA = ?
            ORDER BY TABLE_NAME
        "#;

        let rows = self.fetch_all(sql, &[schema_name]).map_err(|e| {
            error!(schema = ?schema_name, error = ?e, "Failed to query tables");
            SqlgenError::Introspection {
                schema: schema_name.to_string(),
                message: format!("Failed to query tables: {}", e),
            }
        })?;

        let tables = rows
            .iter()
            .map(|row| row.try_get::<String, _>("table_name"))
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| SqlgenError::Introspection {
                schema: schema_name.to_string(),
                message: format!("Failed to read table name: {}", e),
            })?;

        debug!(schema = ?schema_name, count = ?tables.len(), "Found tables");
        Ok(tables)
    }

    fn describe_columns(
        &mut self,
        schema_name: &str,
        table_name: &str,
    ) -> Result<Vec<Column>, SqlgenError> {
        trace!(schema = ?schema_name, table = ?table_name, "Querying columns");

        // information_schema columns can come back with a binary collation
        // on MySQL 8, hence the casts.
        let sql = r#"
            SELECT
                CAST(COLUMN_NAME AS CHAR) AS column_name,
                CAST(DATA_TYPE AS CHAR) AS data_type,
                CAST(COLUMN_TYPE AS CHAR) AS column_type,
                CAST(IS_NULLABLE AS CHAR) AS is_nullable,
                CAST(IFNULL(COLUMN_KEY, '') AS CHAR) AS column_key,
                CAST(IFNULL(EXTRA, '') AS CHAR) AS extra,
                CAST(IFNULL(COLUMN_COMMENT, '') AS CHAR) AS column_comment
            FROM information_schema.COLUMNS
            WHERE TABLE_SCHEMA = ? AND TABLE_NAME = ?
            ORDER BY ORDINAL_POSITION
        "#;

        let introspection_error = |message: String| SqlgenError::Introspection {
            schema: schema_name.to_string(),
            message,
        };

        let rows = self
            .fetch_all(sql, &[schema_name, table_name])
            .map_err(|e| {
                error!(
                    schema = ?schema_name,
                    table = ?table_name,
                    error = ?e,
                    "Failed to query columns"
                );
                introspection_error(format!(
                    "Failed to query columns for table '{}': {}",
                    table_name, e
                ))
            })?;

        let mut columns = Vec::with_capacity(rows.len());
        for row in &rows {
            let column = ColumnRow::from_row(row)
                .map_err(|e| {
                    introspection_error(format!(
                        "Failed to read column of table '{}': {}",
                        table_name, e
                    ))
                })?
                .into_column();

            trace!(
                table = ?table_name,
                column = ?column.name,
                raw_type = ?column.raw_type,
                nullable = ?column.nullable,
                unsigned = ?column.unsigned,
                key_role = ?column.key_role,
                "Parsed column"
            );
            columns.push(column);
        }

        debug!(table = ?table_name, columns = ?columns.len(), "Found columns");
        Ok(columns)
    }
}

/// One row of `information_schema.COLUMNS`, as selected above
#[derive(Debug, Clone)]
struct ColumnRow {
    column_name: String,
    data_type: String,
    column_type: String,
    is_nullable: String,
    column_key: String,
    extra: String,
    column_comment: String,
}

impl ColumnRow {
    fn from_row(row: &MySqlRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            column_name: row.try_get("column_name")?,
            data_type: row.try_get("data_type")?,
            column_type: row.try_get("column_type")?,
            is_nullable: row.try_get("is_nullable")?,
            column_key: row.try_get("column_key")?,
            extra: row.try_get("extra")?,
            column_comment: row.try_get("column_comment")?,
        })
    }

    fn into_column(self) -> Column {
        Column {
            unsigned: is_unsigned_type(&self.column_type),
            nullable: self.is_nullable.eq_ignore_ascii_case("YES"),
            key_role: KeyRole::from_column_key(&self.column_key),
            name: self.column_name,
            raw_type: self.data_type.to_lowercase(),
            extra: self.extra,
            comment: self.column_comment,
        }
    }
}

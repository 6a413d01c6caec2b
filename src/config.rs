//! Configuration loading
//!
//! Loads database connection configuration from command line overrides and
//! environment variables, optionally reading from a .env file first.

use crate::prelude::SqlgenError;
use std::{env, path::Path};
use tracing::{debug, error, trace, warn};

const DEFAULT_HOST: &str = "localhost";
const DEFAULT_PORT: u16 = 3306;
const DEFAULT_USER: &str = "root";

/// Connection settings given explicitly, e.g. on the command line.
/// Anything set here wins over the environment.
#[derive(Debug, Default, Clone)]
pub struct ConnectionOverrides {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub database: Option<String>,
    pub user: Option<String>,
    pub password: Option<String>,
}

/// Database connection configuration
#[derive(Debug, Clone)]
pub struct DbConfig {
    pub host: String,
    pub port: u16,
    pub database: String,
    pub user: String,
    pub password: String,
}

impl DbConfig {
    /// Load configuration from environment variables
    ///
    /// Expected variables:
    /// - DB_HOST (default: localhost)
    /// - DB_PORT (default: 3306)
    /// - DB_NAME (required unless overridden)
    /// - DB_USER (default: root)
    /// - DB_PASSWORD (default: empty)
    pub fn from_env(overrides: &ConnectionOverrides) -> Result<Self, SqlgenError> {
        debug!("Loading database configuration from environment");
        Self::from_lookup(|key| env::var(key).ok(), overrides)
    }

    /// Resolve configuration through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F, overrides: &ConnectionOverrides) -> Result<Self, SqlgenError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = overrides
            .host
            .clone()
            .or_else(|| lookup("DB_HOST"))
            .unwrap_or_else(|| {
                trace!("DB_HOST not set, using default");
                DEFAULT_HOST.to_string()
            });

        let port = match overrides.port {
            Some(port) => port,
            None => match lookup("DB_PORT") {
                Some(port_str) => port_str.trim().parse::<u16>().map_err(|e| {
                    error!(port = ?port_str, error = ?e, "Invalid DB_PORT value");
                    SqlgenError::Config("DB_PORT must be a valid port number".to_string())
                })?,
                None => {
                    trace!("DB_PORT not set, using default");
                    DEFAULT_PORT
                }
            },
        };

        let database = overrides
            .database
            .clone()
            .or_else(|| lookup("DB_NAME"))
            .filter(|name| !name.trim().is_empty())
            .ok_or_else(|| {
                error!("No database name given");
                SqlgenError::Config(
                    "database name is required (--database or DB_NAME)".to_string(),
                )
            })?;

        let user = overrides
            .user
            .clone()
            .or_else(|| lookup("DB_USER"))
            .unwrap_or_else(|| {
                trace!("DB_USER not set, using default");
                DEFAULT_USER.to_string()
            });

        let password = overrides
            .password
            .clone()
            .or_else(|| lookup("DB_PASSWORD"))
            .unwrap_or_default();

        debug!(
            host = ?host,
            port = ?port,
            database = ?database,
            user = ?user,
            "Configuration loaded"
        );

        Ok(Self {
            host,
            port,
            database,
            user,
            password,
        })
    }

    /// Load a .env file and then resolve configuration from overrides and environment
    pub fn load(env_file: &Path, overrides: &ConnectionOverrides) -> Result<Self, SqlgenError> {
        if env_file.exists() {
            debug!(path = ?env_file, "Loading environment file");
            dotenvy::from_path(env_file).map_err(|e| {
                error!(path = ?env_file, error = ?e, "Failed to load environment file");
                SqlgenError::Config(format!("Failed to load {}: {}", env_file.display(), e))
            })?;
        } else {
            warn!(path = ?env_file, "Environment file not found, using existing environment");
        }

        Self::from_env(overrides)
    }

    /// Build a connection string with password redacted (for logs and error messages)
    pub fn redacted_connection_string(&self) -> String {
        format!(
            "mysql://{}:***@{}:{}/{}",
            self.user, self.host, self.port, self.database
        )
    }
}

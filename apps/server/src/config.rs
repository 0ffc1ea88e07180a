//! # Server Configuration
//!
//! Environment-driven configuration with sane defaults. Every knob can be
//! left unset for local development.
//!
//! ## Variables
//! ```text
//! FUEL_HTTP_PORT        HTTP listen port            (default: 8080)
//! FUEL_DATABASE_PATH    SQLite database file        (default: ./fuel.db)
//! FUEL_DB_MAX_CONNS     Pool size                   (default: 5)
//! ```

use std::env;
use std::path::PathBuf;
use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value for {var}: {value}")]
    InvalidValue { var: String, value: String },
}

/// Runtime configuration for the server binary.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Port the HTTP listener binds on.
    pub http_port: u16,

    /// Path to the SQLite database file.
    pub database_path: PathBuf,

    /// Maximum pool connections.
    pub db_max_connections: u32,
}

impl ServerConfig {
    /// Loads configuration from environment variables, falling back to
    /// defaults for anything unset.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(ServerConfig {
            http_port: parse_var("FUEL_HTTP_PORT", 8080)?,
            database_path: env::var("FUEL_DATABASE_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("./fuel.db")),
            db_max_connections: parse_var("FUEL_DB_MAX_CONNS", 5)?,
        })
    }
}

fn parse_var<T: std::str::FromStr>(var: &str, default: T) -> Result<T, ConfigError> {
    match env::var(var) {
        Ok(value) => value.parse().map_err(|_| ConfigError::InvalidValue {
            var: var.to_string(),
            value,
        }),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        // No FUEL_* variables set in the test environment
        let config = ServerConfig::from_env().unwrap();
        assert_eq!(config.http_port, 8080);
        assert_eq!(config.db_max_connections, 5);
        assert_eq!(config.database_path, PathBuf::from("./fuel.db"));
    }
}

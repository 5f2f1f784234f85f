//! # API Configuration Module
//!
//! This module handles loading and managing configuration for the SIAGA API server.
//! It retrieves configuration values from environment variables and provides defaults
//! where appropriate.
//!
//! ## Environment Variables
//!
//! The following environment variables are used:
//!
//! - `API_HOST`: The host address to bind the server to (default: "0.0.0.0")
//! - `API_PORT`: The port to listen on (default: 3000)
//! - `DATABASE_URL`: PostgreSQL connection string (required)
//! - `LOG_LEVEL`: Logging level (default: "info")
//! - `API_CORS_ORIGINS`: Comma-separated list of allowed CORS origins
//! - `ROSTER_TIMEZONE`: IANA timezone for "today" computations (default: "Asia/Jakarta")
//! - `PANIC_DUPLICATE_POLICY`: "reject-same-day" (default) or "allow-multiple"

use chrono_tz::Tz;
use eyre::{eyre, Result, WrapErr};
use siaga_core::alerts::DuplicatePolicy;
use std::env;
use tracing::Level;

/// Configuration for the SIAGA API server
///
/// This struct encapsulates all configuration options for the API server,
/// including networking, database connections, and roster policy settings.
///
/// # Example
///
/// ```
/// use eyre::Result;
/// use siaga_api::config::ApiConfig;
///
/// fn example() -> Result<()> {
///     let config = ApiConfig::from_env()?;
///     println!("Starting server on {}:{}", config.host, config.port);
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Host address for the API server (e.g., "127.0.0.1", "0.0.0.0")
    pub host: String,

    /// Port for the API server to listen on
    pub port: u16,

    /// PostgreSQL database connection string
    pub database_url: String,

    /// Log level for the application
    pub log_level: Level,

    /// CORS allowed origins (optional)
    pub cors_origins: Option<Vec<String>>,

    /// Request timeout in seconds
    pub request_timeout: u64,

    /// Timezone used for every "today" and calendar-day computation
    pub roster_timezone: Tz,

    /// Whether a reporter may raise several alerts on the same local day
    pub duplicate_policy: DuplicatePolicy,
}

impl ApiConfig {
    /// Creates a new ApiConfig from environment variables
    ///
    /// This function loads configuration values from environment variables,
    /// providing sensible defaults where possible. Some values like DATABASE_URL
    /// are required and will cause an error if not set.
    ///
    /// # Errors
    ///
    /// This function will return an error if:
    /// - The DATABASE_URL environment variable is not set
    /// - The API_PORT value cannot be parsed as a u16
    /// - The ROSTER_TIMEZONE value is not a known IANA timezone
    pub fn from_env() -> Result<Self> {
        // Network settings
        let host = env::var("API_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = env::var("API_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse()
            .wrap_err("Invalid API_PORT value")?;

        // Database settings
        let database_url = env::var("DATABASE_URL")
            .wrap_err("DATABASE_URL environment variable must be set")?;

        // Logging settings
        let log_level = match env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()).as_str() {
            "trace" => Level::TRACE,
            "debug" => Level::DEBUG,
            "info" => Level::INFO,
            "warn" => Level::WARN,
            "error" => Level::ERROR,
            _ => Level::INFO,
        };

        // CORS settings
        let cors_origins = env::var("API_CORS_ORIGINS").ok().map(|origins| {
            origins.split(',').map(|s| s.trim().to_string()).collect()
        });

        // Performance settings
        let request_timeout = env::var("API_REQUEST_TIMEOUT_SECONDS")
            .unwrap_or_else(|_| "30".to_string())
            .parse()
            .unwrap_or(30);

        // Roster settings
        let roster_timezone = env::var("ROSTER_TIMEZONE")
            .unwrap_or_else(|_| "Asia/Jakarta".to_string())
            .parse::<Tz>()
            .map_err(|e| eyre!("Invalid ROSTER_TIMEZONE value: {e}"))?;

        // Alert policy settings
        let duplicate_policy = env::var("PANIC_DUPLICATE_POLICY")
            .ok()
            .and_then(|policy| policy.parse().ok())
            .unwrap_or_default();

        Ok(Self {
            host,
            port,
            database_url,
            log_level,
            cors_origins,
            request_timeout,
            roster_timezone,
            duplicate_policy,
        })
    }

    /// Returns the server address as a string
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

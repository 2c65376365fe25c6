//! Console app configuration.
//!
//! Configuration is loaded from environment variables with fallback to
//! defaults, so a bare `cargo run` works out of the box.

use std::env;

/// Console application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Path to the SQLite ledger file.
    pub database_path: String,

    /// Company-registry endpoint.
    pub registry_url: String,

    /// Company-registry API key.
    pub registry_api_key: String,
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn load() -> Self {
        AppConfig {
            database_path: env::var("LEDGER_DB_PATH").unwrap_or_else(|_| "ledger.db".to_string()),

            registry_url: env::var("REGISTRY_URL")
                .unwrap_or_else(|_| "https://api.checko.ru/v2/finances".to_string()),

            // Demo key; set REGISTRY_API_KEY for real lookups
            registry_api_key: env::var("REGISTRY_API_KEY")
                .unwrap_or_else(|_| "demo-key".to_string()),
        }
    }
}

// Centralized configuration management for the vitrina backend
// All environment variables are loaded once at startup; missing required
// values abort the boot rather than degrade at runtime.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingVar(String),
    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

/// Global application configuration loaded once at startup
pub static CONFIG: Lazy<AppConfig> = Lazy::new(|| {
    #[cfg(test)]
    dotenv::dotenv().ok();

    AppConfig::from_env().expect("Failed to load configuration")
});

/// Access the global configuration
pub fn config() -> &'static AppConfig {
    &CONFIG
}

/// Environment type
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum Environment {
    Development,
    Test,
    Staging,
    Production,
}

impl From<String> for Environment {
    fn from(s: String) -> Self {
        match s.to_lowercase().as_str() {
            "development" | "dev" => Environment::Development,
            "test" => Environment::Test,
            "staging" | "stage" => Environment::Staging,
            "production" | "prod" => Environment::Production,
            _ => Environment::Development,
        }
    }
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Staging => write!(f, "staging"),
            Environment::Production => write!(f, "production"),
        }
    }
}

/// Complete application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    // Server
    pub bind_address: String,
    pub port: u16,
    pub environment: Environment,

    // Database
    pub database_url: String,
    pub database_max_connections: u32,
    pub database_min_connections: u32,
    pub database_connect_timeout: u64,
    pub database_idle_timeout: u64,
    pub database_max_lifetime: u64,

    // JWT
    pub jwt_secret: String,
    pub jwt_access_expiry: u64,
    pub jwt_audience: String,
    pub jwt_issuer: String,

    // Object storage
    pub storage_root: String,
    pub storage_public_base_url: String,

    // CORS
    pub cors_allowed_origins: Vec<String>,

    // Features
    pub disable_embedded_migrations: bool,
}

impl AppConfig {
    /// Load all configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(AppConfig {
            bind_address: get_var_or("BIND_ADDRESS", "0.0.0.0"),
            port: parse_var_or("PORT", 8080)?,
            environment: Environment::from(get_var_or("ENVIRONMENT", "development")),

            database_url: require_var("DATABASE_URL")?,
            database_max_connections: parse_var_or("DATABASE_MAX_CONNECTIONS", 10)?,
            database_min_connections: parse_var_or("DATABASE_MIN_CONNECTIONS", 1)?,
            database_connect_timeout: parse_var_or("DATABASE_CONNECT_TIMEOUT", 30)?,
            database_idle_timeout: parse_var_or("DATABASE_IDLE_TIMEOUT", 600)?,
            database_max_lifetime: parse_var_or("DATABASE_MAX_LIFETIME", 1800)?,

            jwt_secret: require_var("JWT_SECRET")?,
            jwt_access_expiry: parse_var_or("JWT_ACCESS_EXPIRY", 3600)?,
            jwt_audience: get_var_or("JWT_AUDIENCE", "vitrina"),
            jwt_issuer: get_var_or("JWT_ISSUER", "vitrina"),

            storage_root: get_var_or("STORAGE_ROOT", "./storage"),
            storage_public_base_url: get_var_or("STORAGE_PUBLIC_BASE_URL", "/media"),

            cors_allowed_origins: get_var_or("CORS_ALLOWED_ORIGINS", "*")
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),

            disable_embedded_migrations: parse_var_or("DISABLE_EMBEDDED_MIGRATIONS", false)?,
        })
    }

    pub fn is_production(&self) -> bool {
        self.environment == Environment::Production
    }

    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.bind_address, self.port)
    }
}

fn get_var_or(name: &str, default: &str) -> String {
    env::var(name).unwrap_or_else(|_| default.to_string())
}

fn require_var(name: &str) -> Result<String, ConfigError> {
    env::var(name).map_err(|_| ConfigError::MissingVar(name.to_string()))
}

fn parse_var_or<T>(name: &str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(raw) => raw
            .parse::<T>()
            .map_err(|e| ConfigError::InvalidValue(name.to_string(), e.to_string())),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_environment_parsing() {
        assert_eq!(
            Environment::from("production".to_string()),
            Environment::Production
        );
        assert_eq!(Environment::from("dev".to_string()), Environment::Development);
        assert_eq!(
            Environment::from("garbage".to_string()),
            Environment::Development
        );
    }

    #[test]
    fn test_parse_var_or_defaults() {
        std::env::remove_var("VITRINA_TEST_UNSET");
        let v: u32 = parse_var_or("VITRINA_TEST_UNSET", 42).unwrap();
        assert_eq!(v, 42);
    }
}

/// Configuration management for Blog Service
///
/// Settings come from environment variables; `main` loads a `.env` file first
/// when one is present.
use crate::db::DbConfig;
use std::str::FromStr;

/// Main application configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub app: AppConfig,
    pub cors: CorsConfig,
    pub store: StoreBackend,
    pub database: DbConfig,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Application environment (development, staging, production)
    pub env: String,
    pub host: String,
    pub port: u16,
}

impl AppConfig {
    pub fn is_production(&self) -> bool {
        self.env.eq_ignore_ascii_case("production")
    }
}

#[derive(Debug, Clone)]
pub struct CorsConfig {
    /// Comma-separated list of allowed origins
    pub allowed_origins: String,
}

/// Which record store backs the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Postgres,
    Memory,
}

impl FromStr for StoreBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(StoreBackend::Postgres),
            "memory" => Ok(StoreBackend::Memory),
            other => Err(format!("unknown BLOG_STORE '{}'", other)),
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, String> {
        let app = AppConfig {
            env: std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
            host: std::env::var("BLOG_SERVICE_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: match std::env::var("BLOG_SERVICE_PORT") {
                Ok(raw) => raw
                    .parse()
                    .map_err(|e| format!("Failed to parse BLOG_SERVICE_PORT='{}': {}", raw, e))?,
                Err(_) => 8000,
            },
        };

        let allowed_origins = match std::env::var("CORS_ALLOWED_ORIGINS") {
            Ok(value) => value,
            Err(_) if app.is_production() => {
                return Err("CORS_ALLOWED_ORIGINS must be set in production".to_string())
            }
            Err(_) => "http://localhost:3000".to_string(),
        };
        if app.is_production() && allowed_origins.trim() == "*" {
            return Err("CORS_ALLOWED_ORIGINS cannot be '*' in production".to_string());
        }

        let store = match std::env::var("BLOG_STORE") {
            Ok(raw) => raw.parse()?,
            Err(_) => StoreBackend::Postgres,
        };
        if app.is_production() && store == StoreBackend::Memory {
            return Err("BLOG_STORE=memory is not allowed in production".to_string());
        }

        Ok(Config {
            app,
            cors: CorsConfig { allowed_origins },
            store,
            database: DbConfig::from_env(),
        })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.app.host, self.app.port)
    }
}

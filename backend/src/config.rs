use std::env;
use std::net::SocketAddr;

use anyhow::{Context, Result};

/// Server configuration, read from the environment with local-development
/// defaults.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    /// Origin allowed by the CORS layer.
    pub cors_origin: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
            database_url: "sqlite:family-planner.db".to_string(),
            cors_origin: "http://localhost:8080".to_string(),
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            host: env::var("PLANNER_HOST").unwrap_or(defaults.host),
            port: env::var("PLANNER_PORT")
                .ok()
                .and_then(|value| value.parse().ok())
                .unwrap_or(defaults.port),
            database_url: env::var("PLANNER_DATABASE_URL").unwrap_or(defaults.database_url),
            cors_origin: env::var("PLANNER_CORS_ORIGIN").unwrap_or(defaults.cors_origin),
        }
    }

    pub fn socket_addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .with_context(|| format!("Invalid listen address {}:{}", self.host, self.port))
    }
}

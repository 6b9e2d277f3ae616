use std::fmt;

use clap::Parser;

use crate::error::{GatewayError, Result};

pub const DEFAULT_CORS_ORIGIN: &str = "*";

/// Process-wide settings, parsed once at startup and shared with the router.
#[derive(Parser, Clone)]
#[command(name = "plan-gatewayd")]
#[command(about = "Authenticated HTTP gateway for plans and steps")]
pub struct Config {
    /// Shared secret every request must present in `X-API-Key`.
    #[arg(long, env = "API_KEY", hide_env_values = true)]
    pub api_key: String,

    /// SQLite database path, optionally prefixed with `sqlite://`.
    #[arg(long, env = "DATABASE_URL", default_value = "plan-gateway.db")]
    pub database_url: String,

    /// Value echoed in `Access-Control-Allow-Origin`.
    #[arg(long, env = "CORS_ORIGIN", default_value = DEFAULT_CORS_ORIGIN)]
    pub cors_origin: String,

    #[arg(long, env = "PLAN_GATEWAY_HOST", default_value = "127.0.0.1")]
    pub host: String,

    #[arg(long, env = "PLAN_GATEWAY_PORT", default_value_t = 8787)]
    pub port: u16,

    #[arg(long, env = "PLAN_GATEWAY_MAX_CONNECTIONS", default_value_t = 8)]
    pub max_connections: u32,
}

impl Config {
    pub fn new(api_key: impl Into<String>, database_url: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            database_url: database_url.into(),
            cors_origin: DEFAULT_CORS_ORIGIN.to_string(),
            host: "127.0.0.1".to_string(),
            port: 8787,
            max_connections: 8,
        }
    }

    pub fn with_cors_origin(mut self, origin: impl Into<String>) -> Self {
        self.cors_origin = origin.into();
        self
    }

    /// An empty `CORS_ORIGIN` falls back to the wildcard.
    pub fn cors_origin(&self) -> &str {
        if self.cors_origin.is_empty() {
            DEFAULT_CORS_ORIGIN
        } else {
            &self.cors_origin
        }
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn validate(&self) -> Result<()> {
        if self.api_key.trim().is_empty() {
            return Err(GatewayError::Config(
                "API_KEY must be set to a non-empty value".to_string(),
            ));
        }
        if self.database_url.trim().is_empty() {
            return Err(GatewayError::Config("DATABASE_URL must be set".to_string()));
        }
        Ok(())
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("api_key", &"<redacted>")
            .field("database_url", &self.database_url)
            .field("cors_origin", &self.cors_origin)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("max_connections", &self.max_connections)
            .finish()
    }
}

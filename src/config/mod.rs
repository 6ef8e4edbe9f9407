use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;
use thiserror::Error;
use url::Url;

/// Errors raised while assembling the runtime configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing configuration: {0}")]
    Missing(&'static str),

    #[error("Invalid auth domain '{0}'")]
    InvalidDomain(String),

    #[error("Invalid signing key set: {0}")]
    InvalidKeySet(String),

    #[error("Refusing to reset the drink table in {0:?} mode")]
    ResetForbidden(Environment),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub security: SecurityConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Postgres connection string. `None` selects the in-memory store.
    pub url: Option<String>,
    pub max_connections: u32,
    pub connection_timeout: u64,
    /// Drops and recreates the drink table on boot. Destroys all data.
    pub reset_on_boot: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    pub auth0_domain: String,
    pub api_audience: String,
    pub jwks_json: Option<String>,
    pub jwks_path: Option<PathBuf>,
    /// Clock skew tolerated on `exp`, in seconds
    pub leeway_secs: u64,
    pub cors_origins: Vec<String>,
}

impl SecurityConfig {
    /// Expected `iss` claim, derived from the identity provider domain
    pub fn issuer(&self) -> Result<String, ConfigError> {
        let domain = self.auth0_domain.trim().trim_end_matches('/');
        if domain.is_empty() {
            return Err(ConfigError::Missing("AUTH0_DOMAIN"));
        }
        let url = Url::parse(&format!("https://{}/", domain))
            .map_err(|_| ConfigError::InvalidDomain(self.auth0_domain.clone()))?;
        Ok(url.to_string())
    }

    /// Where the key set is published when no local copy is configured
    pub fn jwks_url(&self) -> Result<String, ConfigError> {
        Ok(format!("{}.well-known/jwks.json", self.issuer()?))
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        // Server overrides
        if let Ok(v) = env::var("DRINKS_API_HOST") {
            self.server.host = v;
        }
        if let Some(port) = env::var("DRINKS_API_PORT")
            .ok()
            .or_else(|| env::var("PORT").ok())
            .and_then(|s| s.parse::<u16>().ok())
        {
            self.server.port = port;
        }

        // Database overrides
        if let Ok(v) = env::var("DATABASE_URL") {
            self.database.url = Some(v).filter(|s| !s.trim().is_empty());
        }
        if let Ok(v) = env::var("DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = v.parse().unwrap_or(self.database.max_connections);
        }
        if let Ok(v) = env::var("DATABASE_CONNECTION_TIMEOUT") {
            self.database.connection_timeout = v.parse().unwrap_or(self.database.connection_timeout);
        }
        if let Ok(v) = env::var("DATABASE_RESET_ON_BOOT") {
            self.database.reset_on_boot = v.parse().unwrap_or(self.database.reset_on_boot);
        }

        // Security overrides
        if let Ok(v) = env::var("AUTH0_DOMAIN") {
            self.security.auth0_domain = v;
        }
        if let Ok(v) = env::var("API_AUDIENCE") {
            self.security.api_audience = v;
        }
        if let Ok(v) = env::var("AUTH_JWKS") {
            self.security.jwks_json = Some(v);
        }
        if let Ok(v) = env::var("AUTH_JWKS_PATH") {
            self.security.jwks_path = Some(PathBuf::from(v));
        }
        if let Ok(v) = env::var("AUTH_LEEWAY_SECS") {
            self.security.leeway_secs = v.parse().unwrap_or(self.security.leeway_secs);
        }
        if let Ok(v) = env::var("SECURITY_CORS_ORIGINS") {
            self.security.cors_origins = v
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }

        self
    }

    /// Rejects combinations that must never reach a running server
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.security.issuer()?;
        if self.security.api_audience.trim().is_empty() {
            return Err(ConfigError::Missing("API_AUDIENCE"));
        }
        if self.database.reset_on_boot && self.environment == Environment::Production {
            return Err(ConfigError::ResetForbidden(self.environment));
        }
        Ok(())
    }

    fn development() -> Self {
        Self {
            environment: Environment::Development,
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 3000,
            },
            database: DatabaseConfig {
                url: None,
                max_connections: 5,
                connection_timeout: 30,
                reset_on_boot: false,
            },
            security: SecurityConfig {
                auth0_domain: String::new(),
                api_audience: "drinks".to_string(),
                jwks_json: None,
                jwks_path: None,
                leeway_secs: 0,
                cors_origins: Vec::new(),
            },
        }
    }

    fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 3000,
            },
            database: DatabaseConfig {
                url: None,
                max_connections: 10,
                connection_timeout: 10,
                reset_on_boot: false,
            },
            security: SecurityConfig {
                auth0_domain: String::new(),
                api_audience: "drinks".to_string(),
                jwks_json: None,
                jwks_path: None,
                leeway_secs: 0,
                cors_origins: Vec::new(),
            },
        }
    }

    fn production() -> Self {
        Self {
            environment: Environment::Production,
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 8080,
            },
            database: DatabaseConfig {
                url: None,
                max_connections: 20,
                connection_timeout: 5,
                reset_on_boot: false,
            },
            security: SecurityConfig {
                auth0_domain: String::new(),
                api_audience: "drinks".to_string(),
                jwks_json: None,
                jwks_path: None,
                leeway_secs: 0,
                cors_origins: Vec::new(),
            },
        }
    }
}

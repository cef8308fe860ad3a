use serde::Serialize;
use std::env;
use std::fmt;
use thiserror::Error;

/// Errors raised while assembling the process-wide configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("JWT_SECRET is not set in the environment")]
    MissingJwtSecret,

    #[error("Invalid value for {name}: {value}")]
    InvalidValue { name: &'static str, value: String },

    #[error("Failed to build HTTP client: {0}")]
    HttpClient(String),
}

#[derive(Debug, Clone, Serialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub api: ApiConfig,
    pub security: SecurityConfig,
    pub export: ExportConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize)]
pub struct ServerConfig {
    pub bind_addr: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize)]
pub struct DatabaseConfig {
    #[serde(skip)]
    pub url: Option<String>,
    pub max_connections: u32,
    pub connection_timeout: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ApiConfig {
    pub default_page_limit: i64,
    pub max_page_limit: i64,
    pub max_request_size_bytes: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct SecurityConfig {
    #[serde(skip)]
    pub jwt_secret: SigningSecret,
    pub access_token_ttl_minutes: i64,
    pub refresh_token_ttl_days: i64,
    pub cookie_domain: Option<String>,
    pub cookie_secure: bool,
    pub cors_origins: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExportConfig {
    pub base_url: String,
    pub timeout_secs: u64,
}

/// HMAC signing secret. Never printed.
#[derive(Clone, Default)]
pub struct SigningSecret(String);

impl SigningSecret {
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Debug for SigningSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SigningSecret(***)")
    }
}

impl AppConfig {
    /// Load configuration from the environment. Fails when no signing secret is present.
    pub fn from_env() -> Result<Self, ConfigError> {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        // Set defaults based on environment, then override with specific env vars
        let mut config = match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()?;

        let secret = env::var("JWT_SECRET").unwrap_or_default();
        config.security.jwt_secret = SigningSecret::new(secret);
        config.validate()?;

        Ok(config)
    }

    pub fn with_jwt_secret(mut self, secret: impl Into<String>) -> Self {
        self.security.jwt_secret = SigningSecret::new(secret);
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.security.jwt_secret.is_empty() {
            return Err(ConfigError::MissingJwtSecret);
        }
        if self.security.access_token_ttl_minutes <= 0 {
            return Err(ConfigError::InvalidValue {
                name: "ACCESS_TOKEN_TTL_MINUTES",
                value: self.security.access_token_ttl_minutes.to_string(),
            });
        }
        if self.security.refresh_token_ttl_days <= 0 {
            return Err(ConfigError::InvalidValue {
                name: "REFRESH_TOKEN_TTL_DAYS",
                value: self.security.refresh_token_ttl_days.to_string(),
            });
        }
        if self.api.default_page_limit < 1 || self.api.max_page_limit < self.api.default_page_limit {
            return Err(ConfigError::InvalidValue {
                name: "API_MAX_PAGE_LIMIT",
                value: self.api.max_page_limit.to_string(),
            });
        }
        Ok(())
    }

    fn with_env_overrides(mut self) -> Result<Self, ConfigError> {
        // Server overrides
        if let Ok(v) = env::var("BIND_ADDR") {
            self.server.bind_addr = v;
        }
        if let Ok(v) = env::var("PORT") {
            self.server.port = v
                .parse()
                .map_err(|_| ConfigError::InvalidValue { name: "PORT", value: v })?;
        }

        // Database overrides
        if let Ok(v) = env::var("DATABASE_URL") {
            self.database.url = Some(v);
        }
        if let Ok(v) = env::var("DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = v.parse().unwrap_or(self.database.max_connections);
        }
        if let Ok(v) = env::var("DATABASE_CONNECTION_TIMEOUT") {
            self.database.connection_timeout = v.parse().unwrap_or(self.database.connection_timeout);
        }

        // API overrides
        if let Ok(v) = env::var("API_DEFAULT_PAGE_LIMIT") {
            self.api.default_page_limit = v.parse().unwrap_or(self.api.default_page_limit);
        }
        if let Ok(v) = env::var("API_MAX_PAGE_LIMIT") {
            self.api.max_page_limit = v.parse().unwrap_or(self.api.max_page_limit);
        }
        if let Ok(v) = env::var("API_MAX_REQUEST_SIZE_BYTES") {
            self.api.max_request_size_bytes = v.parse().unwrap_or(self.api.max_request_size_bytes);
        }

        // Security overrides
        if let Ok(v) = env::var("ACCESS_TOKEN_TTL_MINUTES") {
            self.security.access_token_ttl_minutes = v.parse().unwrap_or(self.security.access_token_ttl_minutes);
        }
        if let Ok(v) = env::var("REFRESH_TOKEN_TTL_DAYS") {
            self.security.refresh_token_ttl_days = v.parse().unwrap_or(self.security.refresh_token_ttl_days);
        }
        if let Ok(v) = env::var("COOKIE_DOMAIN") {
            self.security.cookie_domain = Some(v).filter(|d| !d.trim().is_empty());
        }
        if let Ok(v) = env::var("COOKIE_SECURE") {
            self.security.cookie_secure = v.parse().unwrap_or(self.security.cookie_secure);
        }
        if let Ok(v) = env::var("SECURITY_CORS_ORIGINS") {
            self.security.cors_origins = v
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }

        // Export service overrides
        if let Ok(v) = env::var("EXPORT_SERVICE_URL") {
            self.export.base_url = v;
        }
        if let Ok(v) = env::var("EXPORT_SERVICE_TIMEOUT_SECS") {
            self.export.timeout_secs = v.parse().unwrap_or(self.export.timeout_secs);
        }

        Ok(self)
    }

    pub fn development() -> Self {
        Self {
            environment: Environment::Development,
            server: ServerConfig {
                bind_addr: "0.0.0.0".to_string(),
                port: 8080,
            },
            database: DatabaseConfig {
                url: None,
                max_connections: 10,
                connection_timeout: 30,
            },
            api: ApiConfig {
                default_page_limit: 10,
                max_page_limit: 100,
                max_request_size_bytes: 10 * 1024 * 1024, // 10MB
            },
            security: SecurityConfig {
                jwt_secret: SigningSecret::default(),
                access_token_ttl_minutes: 15,
                refresh_token_ttl_days: 7,
                cookie_domain: None,
                cookie_secure: false,
                cors_origins: vec![],
            },
            export: ExportConfig {
                base_url: "http://localhost:8081".to_string(),
                timeout_secs: 30,
            },
        }
    }

    fn staging() -> Self {
        let mut config = Self::development();
        config.environment = Environment::Staging;
        config.database.max_connections = 20;
        config.database.connection_timeout = 10;
        config.api.max_request_size_bytes = 5 * 1024 * 1024; // 5MB
        config.security.cookie_secure = true;
        config
    }

    fn production() -> Self {
        let mut config = Self::development();
        config.environment = Environment::Production;
        config.database.max_connections = 50;
        config.database.connection_timeout = 5;
        config.api.max_request_size_bytes = 2 * 1024 * 1024; // 2MB
        config.security.cookie_secure = true;
        config.export.timeout_secs = 15;
        config
    }
}

//! Configuration management

use sqlx::types::BigDecimal;
use std::str::FromStr;

// ============================================================================
// Server Configuration Constants
// ============================================================================

/// Default server host binding.
pub const DEFAULT_SERVER_HOST: &str = "127.0.0.1";

/// Default server port.
pub const DEFAULT_SERVER_PORT: u16 = 8000;

/// Default shutdown timeout in seconds.
pub const DEFAULT_SHUTDOWN_TIMEOUT_SECS: u64 = 30;

/// Default database URL for local development.
pub const DEFAULT_DATABASE_URL: &str = "postgresql://localhost/linecheck";

/// Default maximum database connections in the pool.
pub const DEFAULT_DATABASE_MAX_CONNECTIONS: u32 = 10;

/// Default minimum database connections in the pool.
pub const DEFAULT_DATABASE_MIN_CONNECTIONS: u32 = 2;

/// Default database connection timeout in seconds.
pub const DEFAULT_DATABASE_CONNECT_TIMEOUT_SECS: u64 = 10;

/// Default database idle timeout in seconds (10 minutes).
pub const DEFAULT_DATABASE_IDLE_TIMEOUT_SECS: u64 = 600;

/// Default CORS allowed origin for local development.
pub const DEFAULT_CORS_ALLOWED_ORIGIN: &str = "http://localhost:3000";

/// Default validation-provider endpoint.
pub const DEFAULT_PROVIDER_BASE_URL: &str = "http://apilayer.net/api/validate";

/// Default per-call provider timeout in seconds.
pub const DEFAULT_PROVIDER_TIMEOUT_SECS: u64 = 10;

/// Numbers validated concurrently per batch.
pub const DEFAULT_VERIFY_BATCH_SIZE: usize = 50;

/// USDT debited per successfully verified number.
pub const DEFAULT_VERIFY_UNIT_COST: &str = "0.01";

/// Country code prepended to bare 10-digit numbers.
pub const DEFAULT_COUNTRY_CODE: &str = "+1";

/// Server configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub cors: CorsConfig,
    pub providers: ProviderConfig,
    pub verification: VerificationConfig,
}

/// Server-specific configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub shutdown_timeout_secs: u64,
}

/// Database configuration
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub connect_timeout_secs: u64,
    pub idle_timeout_secs: u64,
}

/// CORS configuration
#[derive(Debug, Clone)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
    pub allow_credentials: bool,
}

/// Validation-provider pool configuration
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    /// Endpoint queried for each number.
    pub base_url: String,
    /// One provider client is created per key; dispatch is round-robin.
    pub api_keys: Vec<String>,
    /// Per-call timeout enforced by the HTTP client.
    pub timeout_secs: u64,
    /// Inter-call pacing applied only when a single key is configured.
    pub single_key_delay_ms: u64,
}

/// Verification pipeline configuration
#[derive(Debug, Clone)]
pub struct VerificationConfig {
    pub batch_size: usize,
    pub unit_cost: BigDecimal,
    pub default_country_code: String,
}

impl Config {
    /// Load configuration from environment and defaults
    pub fn load() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let config = Config {
            server: ServerConfig {
                host: std::env::var("LINECHECK_HOST")
                    .unwrap_or_else(|_| DEFAULT_SERVER_HOST.to_string()),
                port: std::env::var("LINECHECK_PORT")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(DEFAULT_SERVER_PORT),
                shutdown_timeout_secs: std::env::var("LINECHECK_SHUTDOWN_TIMEOUT")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(DEFAULT_SHUTDOWN_TIMEOUT_SECS),
            },
            database: DatabaseConfig {
                url: std::env::var("DATABASE_URL")
                    .unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string()),
                max_connections: std::env::var("DATABASE_MAX_CONNECTIONS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(DEFAULT_DATABASE_MAX_CONNECTIONS),
                min_connections: std::env::var("DATABASE_MIN_CONNECTIONS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(DEFAULT_DATABASE_MIN_CONNECTIONS),
                connect_timeout_secs: std::env::var("DATABASE_CONNECT_TIMEOUT")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(DEFAULT_DATABASE_CONNECT_TIMEOUT_SECS),
                idle_timeout_secs: std::env::var("DATABASE_IDLE_TIMEOUT")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(DEFAULT_DATABASE_IDLE_TIMEOUT_SECS),
            },
            cors: CorsConfig {
                allowed_origins: std::env::var("CORS_ALLOWED_ORIGINS")
                    .unwrap_or_else(|_| DEFAULT_CORS_ALLOWED_ORIGIN.to_string())
                    .split(',')
                    .map(|s| s.trim().to_string())
                    .collect(),
                allow_credentials: std::env::var("CORS_ALLOW_CREDENTIALS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(true),
            },
            providers: ProviderConfig {
                base_url: std::env::var("PROVIDER_BASE_URL")
                    .unwrap_or_else(|_| DEFAULT_PROVIDER_BASE_URL.to_string()),
                api_keys: std::env::var("PROVIDER_API_KEYS")
                    .unwrap_or_default()
                    .split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect(),
                timeout_secs: std::env::var("PROVIDER_TIMEOUT_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(DEFAULT_PROVIDER_TIMEOUT_SECS),
                single_key_delay_ms: std::env::var("PROVIDER_SINGLE_KEY_DELAY_MS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(0),
            },
            verification: VerificationConfig {
                batch_size: std::env::var("VERIFY_BATCH_SIZE")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(DEFAULT_VERIFY_BATCH_SIZE),
                unit_cost: std::env::var("VERIFY_UNIT_COST")
                    .ok()
                    .and_then(|s| BigDecimal::from_str(&s).ok())
                    .unwrap_or_else(|| {
                        BigDecimal::from_str(DEFAULT_VERIFY_UNIT_COST)
                            .unwrap_or_else(|_| BigDecimal::from(0))
                    }),
                default_country_code: normalize_country_code(
                    &std::env::var("VERIFY_DEFAULT_COUNTRY_CODE")
                        .unwrap_or_else(|_| DEFAULT_COUNTRY_CODE.to_string()),
                ),
            },
        };

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        // Validate port
        if self.server.port == 0 {
            anyhow::bail!("Server port must be greater than 0");
        }

        // Validate database URL
        if self.database.url.is_empty() {
            anyhow::bail!("Database URL cannot be empty");
        }

        // Validate connection pool settings
        if self.database.max_connections == 0 {
            anyhow::bail!("Database max_connections must be greater than 0");
        }

        if self.database.min_connections > self.database.max_connections {
            anyhow::bail!(
                "Database min_connections ({}) cannot be greater than max_connections ({})",
                self.database.min_connections,
                self.database.max_connections
            );
        }

        // Validate provider settings
        if self.providers.api_keys.is_empty() {
            anyhow::bail!("PROVIDER_API_KEYS must contain at least one key");
        }

        if self.providers.base_url.is_empty() {
            anyhow::bail!("Provider base URL cannot be empty");
        }

        // Validate verification settings
        if self.verification.batch_size == 0 {
            anyhow::bail!("Verification batch size must be greater than 0");
        }

        if self.verification.unit_cost < BigDecimal::from(0) {
            anyhow::bail!("Verification unit cost cannot be negative");
        }

        if !self
            .verification
            .default_country_code
            .trim_start_matches('+')
            .chars()
            .all(|c| c.is_ascii_digit())
        {
            anyhow::bail!(
                "Default country code must be digits with an optional '+': {}",
                self.verification.default_country_code
            );
        }

        // Validate CORS origins
        if self.cors.allowed_origins.is_empty() {
            tracing::warn!("No CORS origins configured - all origins will be allowed");
        }

        Ok(())
    }
}

/// Ensure a country code carries its leading `+`.
fn normalize_country_code(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.starts_with('+') {
        trimmed.to_string()
    } else {
        format!("+{}", trimmed)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: DEFAULT_SERVER_HOST.to_string(),
                port: DEFAULT_SERVER_PORT,
                shutdown_timeout_secs: DEFAULT_SHUTDOWN_TIMEOUT_SECS,
            },
            database: DatabaseConfig {
                url: DEFAULT_DATABASE_URL.to_string(),
                max_connections: DEFAULT_DATABASE_MAX_CONNECTIONS,
                min_connections: DEFAULT_DATABASE_MIN_CONNECTIONS,
                connect_timeout_secs: DEFAULT_DATABASE_CONNECT_TIMEOUT_SECS,
                idle_timeout_secs: DEFAULT_DATABASE_IDLE_TIMEOUT_SECS,
            },
            cors: CorsConfig {
                allowed_origins: vec![DEFAULT_CORS_ALLOWED_ORIGIN.to_string()],
                allow_credentials: true,
            },
            providers: ProviderConfig {
                base_url: DEFAULT_PROVIDER_BASE_URL.to_string(),
                api_keys: Vec::new(),
                timeout_secs: DEFAULT_PROVIDER_TIMEOUT_SECS,
                single_key_delay_ms: 0,
            },
            verification: VerificationConfig::default(),
        }
    }
}

impl Default for VerificationConfig {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_VERIFY_BATCH_SIZE,
            unit_cost: BigDecimal::from_str(DEFAULT_VERIFY_UNIT_COST)
                .unwrap_or_else(|_| BigDecimal::from(0)),
            default_country_code: DEFAULT_COUNTRY_CODE.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_fails_validation_without_keys() {
        let config = Config::default();
        assert!(config.validate().is_err());
    }

    #[test]
    fn config_with_key_passes_validation() {
        let mut config = Config::default();
        config.providers.api_keys = vec!["test-key".to_string()];
        assert!(config.validate().is_ok());
    }

    #[test]
    fn zero_batch_size_is_rejected() {
        let mut config = Config::default();
        config.providers.api_keys = vec!["test-key".to_string()];
        config.verification.batch_size = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn country_code_gains_leading_plus() {
        assert_eq!(normalize_country_code("1"), "+1");
        assert_eq!(normalize_country_code("+44"), "+44");
        assert_eq!(normalize_country_code(" 91 "), "+91");
    }

    #[test]
    fn default_unit_cost_parses() {
        let config = VerificationConfig::default();
        assert_eq!(config.unit_cost, BigDecimal::from_str("0.01").unwrap());
    }
}

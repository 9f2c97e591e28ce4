use std::env;

use config::Config as ConfigBuilder;
use config::ConfigError;
use config::Environment;
use config::File;
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub database: DatabaseConfig,
    pub server: ServerConfig,
    pub auth: AuthConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub http_port: u16,
}

/// Secrets and work factor for the credential core.
///
/// Both secrets are required; the process refuses to start without them so
/// no request path ever reads an absent secret.
#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    pub session_secret: String,
    pub reset_secret: String,
    #[serde(default = "default_hash_cost")]
    pub hash_cost: u32,
}

fn default_hash_cost() -> u32 {
    auth::PasswordHasher::DEFAULT_COST
}

impl Config {
    /// Load configuration from files with environment variable overrides
    ///
    /// Priority (highest to lowest):
    /// 1. Environment variables (AUTH__SESSION_SECRET, SERVER__HTTP_PORT, etc.)
    /// 2. Environment-specific config file (config/{environment}.toml)
    /// 3. Default config file (config/default.toml)
    pub fn load() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let configuration = ConfigBuilder::builder()
            // Start with default configuration
            .add_source(File::with_name("config/default").required(false))
            // Layer on environment-specific configuration
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // Layer on environment variables (with __ as separator)
            // Example: AUTH__SESSION_SECRET=... overrides auth.session_secret
            .add_source(Environment::with_prefix("").separator("__"))
            .build()?;

        let config: Config = configuration.try_deserialize()?;
        config.validate()?;

        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.auth.session_secret.is_empty() {
            return Err(ConfigError::Message(
                "auth.session_secret must not be empty".to_string(),
            ));
        }

        if self.auth.reset_secret.is_empty() {
            return Err(ConfigError::Message(
                "auth.reset_secret must not be empty".to_string(),
            ));
        }

        // Distinct secrets keep session tokens unusable as reset capabilities
        if self.auth.session_secret == self.auth.reset_secret {
            return Err(ConfigError::Message(
                "auth.session_secret and auth.reset_secret must be distinct".to_string(),
            ));
        }

        Ok(())
    }
}

use anyhow::Result;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Application configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// `[database]` section
    pub database: DatabaseConfig,
    /// `[lookup]` section
    pub lookup: LookupConfig,
    /// `[security]` section
    pub security: SecurityConfig,
    /// `[logging]` section
    pub logging: LoggingConfig,
}

/// Where the SQLite file lives
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Database file, created on first run
    pub path: String,
}

/// OMDb client settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LookupConfig {
    /// Endpoint queried with `t` and `apikey`
    pub base_url: String,
    /// API key, overridden by `OMDB_API_KEY`
    pub api_key: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

/// Password hashing settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    /// bcrypt work factor, 4 to 31
    pub bcrypt_cost: u32,
}

/// Log output settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default filter when `RUST_LOG` is unset
    pub level: String,
    /// Optional daily rolling log file
    pub file_path: Option<String>,
    /// File log format
    pub format: String, // "json" or "text"
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database: DatabaseConfig {
                path: "data/movie_tracker.db".to_string(),
            },
            lookup: LookupConfig {
                base_url: "http://www.omdbapi.com/".to_string(),
                api_key: String::new(),
                timeout_secs: 10,
            },
            security: SecurityConfig {
                bcrypt_cost: bcrypt::DEFAULT_COST,
            },
            logging: LoggingConfig {
                level: "warn".to_string(),
                file_path: None,
                format: "text".to_string(),
            },
        }
    }
}

impl AppConfig {
    /// Load configuration from multiple sources with precedence
    ///
    /// Defaults, then `config/default`, `config/local`, then `config_file`
    /// when given, then `MOVIE_TRACKER__SECTION__KEY` environment variables.
    pub fn load(config_file: Option<&Path>) -> Result<Self> {
        let defaults = Config::try_from(&Self::default())
            .map_err(|e| anyhow::anyhow!("Failed to build default configuration: {}", e))?;

        let mut builder = Config::builder()
            // Start with default values
            .add_source(defaults)
            // Add config files if they exist
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false));

        if let Some(path) = config_file {
            builder = builder.add_source(File::from(path).required(true));
        }

        let config = builder
            // Add environment variables with prefix. Values stay strings so
            // keys like "00123" survive; numeric fields convert on deserialize.
            .add_source(Environment::with_prefix("MOVIE_TRACKER").separator("__"))
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to load configuration: {}", e))?;

        let app_config: Self = config
            .try_deserialize()
            .map_err(|e| anyhow::anyhow!("Failed to deserialize configuration: {}", e))?;

        // Validate configuration
        app_config.validate()?;

        Ok(app_config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        // Validate database config
        if self.database.path.trim().is_empty() {
            return Err(anyhow::anyhow!("database.path must not be empty"));
        }

        // Validate lookup config
        if self.lookup.timeout_secs == 0 {
            return Err(anyhow::anyhow!("lookup.timeout_secs must be greater than 0"));
        }
        reqwest::Url::parse(&self.lookup.base_url)
            .map_err(|e| anyhow::anyhow!("Invalid lookup.base_url {}: {}", self.lookup.base_url, e))?;

        // Validate security config
        if !(4..=31).contains(&self.security.bcrypt_cost) {
            return Err(anyhow::anyhow!(
                "security.bcrypt_cost must be between 4 and 31, got {}",
                self.security.bcrypt_cost
            ));
        }

        // Validate logging config
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.logging.level.as_str()) {
            return Err(anyhow::anyhow!(
                "Invalid log level: {}. Must be one of: {:?}",
                self.logging.level,
                valid_levels
            ));
        }

        let valid_formats = ["text", "json"];
        if !valid_formats.contains(&self.logging.format.as_str()) {
            return Err(anyhow::anyhow!(
                "Invalid log format: {}. Must be one of: {:?}",
                self.logging.format,
                valid_formats
            ));
        }

        Ok(())
    }

    /// Get the OMDb API key from environment or config
    pub fn get_api_key(&self) -> String {
        std::env::var("OMDB_API_KEY")
            .ok()
            .filter(|key| !key.is_empty())
            .unwrap_or_else(|| self.lookup.api_key.clone())
    }

    /// Get log level from environment or config
    pub fn get_log_level(&self) -> String {
        std::env::var("RUST_LOG")
            .unwrap_or_else(|_| self.logging.level.clone())
    }
}

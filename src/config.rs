//! Layered application configuration.

use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::validation::InputValidator;

/// Application configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Quota and input limits
    pub session: SessionConfig,
    /// Where replies come from
    pub reply: ReplyConfig,
    /// Log level and sinks
    pub logging: LoggingConfig,
}

/// Per-session limits
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Messages allowed before the paywall
    pub free_message_quota: u32,
    /// Longest accepted message, in characters
    pub max_message_length: usize,
}

/// Reply resolver settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplyConfig {
    /// "canned" or "remote"
    pub mode: String,
    /// Inference endpoint, required in remote mode
    pub endpoint: Option<String>,
    /// Delay before a canned reply, in milliseconds
    pub canned_delay_ms: u64,
    /// Per-request timeout for the endpoint; none waits indefinitely
    pub timeout_secs: Option<u64>,
}

/// Logging settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default filter level when `RUST_LOG` is unset
    pub level: String,
    /// Optional JSON log file, rotated daily
    pub file_path: Option<String>,
    /// Console format, "json" or "text"
    pub format: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            session: SessionConfig {
                free_message_quota: 10,
                max_message_length: 2000,
            },
            reply: ReplyConfig {
                mode: "canned".to_string(),
                endpoint: None,
                canned_delay_ms: 1200,
                timeout_secs: None,
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
    pub fn load() -> Result<Self> {
        let builder = Self::base_builder()?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            .add_source(File::with_name("companion").required(false))
            .add_source(Environment::with_prefix("COMPANION").separator("__"));

        Self::finish(builder)
    }

    /// Load defaults overlaid with a single explicit file
    pub fn load_from(path: &Path) -> Result<Self> {
        let builder = Self::base_builder()?.add_source(File::from(path).required(true));
        Self::finish(builder)
    }

    fn base_builder() -> Result<config::ConfigBuilder<config::builder::DefaultState>> {
        let defaults = Config::try_from(&Self::default())
            .context("Failed to build default configuration")?;
        Ok(Config::builder().add_source(defaults))
    }

    fn finish(builder: config::ConfigBuilder<config::builder::DefaultState>) -> Result<Self> {
        let config = builder
            .build()
            .context("Failed to load configuration")?;

        let app_config: Self = config
            .try_deserialize()
            .context("Failed to deserialize configuration")?;

        // Validate configuration
        app_config.validate()?;

        Ok(app_config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.session.max_message_length == 0 {
            return Err(anyhow::anyhow!("max_message_length must be greater than 0"));
        }

        let valid_modes = ["canned", "remote"];
        if !valid_modes.contains(&self.reply.mode.as_str()) {
            return Err(anyhow::anyhow!(
                "Invalid reply mode: {}. Must be one of: {:?}",
                self.reply.mode,
                valid_modes
            ));
        }

        if self.reply.mode == "remote" {
            let endpoint = self
                .reply
                .endpoint
                .as_deref()
                .ok_or_else(|| anyhow::anyhow!("remote reply mode requires reply.endpoint"))?;
            InputValidator::validate_endpoint(endpoint)?;
        }

        if self.reply.timeout_secs == Some(0) {
            return Err(anyhow::anyhow!("timeout_secs must be greater than 0 when set"));
        }

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

    /// Switch to the remote resolver for the given endpoint
    pub fn use_remote(&mut self, endpoint: &str) -> Result<()> {
        InputValidator::validate_endpoint(endpoint)?;
        self.reply.mode = "remote".to_string();
        self.reply.endpoint = Some(endpoint.trim().to_string());
        Ok(())
    }

    /// Delay before a canned reply is delivered
    pub const fn canned_delay(&self) -> Duration {
        Duration::from_millis(self.reply.canned_delay_ms)
    }

    /// Optional per-request timeout for the remote resolver
    pub fn reply_timeout(&self) -> Option<Duration> {
        self.reply.timeout_secs.map(Duration::from_secs)
    }

    /// Get log level from environment or config
    pub fn get_log_level(&self) -> String {
        std::env::var("RUST_LOG").unwrap_or_else(|_| self.logging.level.clone())
    }

    /// Render the effective configuration as YAML
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).context("Failed to serialize configuration")
    }
}

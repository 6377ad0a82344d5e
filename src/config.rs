use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::logging::LogFormat;

/// Complete clusto client configuration (loaded from `clusto.toml`)
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct ClustoConfig {
    /// Service base URL (e.g., "http://clusto.example.com:9996")
    #[serde(default)]
    pub url: Option<String>,

    /// Basic-auth credential as `user:password`
    #[serde(default)]
    pub auth: Option<String>,

    #[serde(default)]
    pub log: LogConfig,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LogConfig {
    /// Default level when RUST_LOG is unset (trace|debug|info|warn|error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output format: pretty, compact, json
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_log_level() -> String {
    "warn".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

/// Values supplied on the command line or through the environment
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub url: Option<String>,
    pub auth: Option<String>,
    pub log_level: Option<String>,
}

impl ClustoConfig {
    /// Load configuration from TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: ClustoConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;

        Ok(config)
    }

    /// Apply command-line / environment values on top of the file
    pub fn merge(mut self, overrides: ConfigOverrides) -> Self {
        if let Some(url) = overrides.url {
            self.url = Some(url);
        }
        if let Some(auth) = overrides.auth {
            self.auth = Some(auth);
        }
        if let Some(level) = overrides.log_level {
            self.log.level = level;
        }
        self
    }

    pub fn log_format(&self) -> LogFormat {
        LogFormat::resolve(Some(&self.log.format))
    }

    /// Generate example configuration as TOML string
    pub fn example() -> Result<String> {
        let config = ClustoConfig {
            url: Some("http://clusto.example.com:9996".to_string()),
            auth: Some("username:password".to_string()),
            log: LogConfig::default(),
        };

        Ok(toml::to_string_pretty(&config)?)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if let Some(url) = &self.url {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                anyhow::bail!("url must start with http:// or https://: {}", url);
            }
        }

        if let Some(auth) = &self.auth {
            if !auth.contains(':') {
                anyhow::bail!("auth must be in the form user:password");
            }
        }

        if !["trace", "debug", "info", "warn", "error"].contains(&self.log.level.as_str()) {
            anyhow::bail!("log.level must be one of: trace, debug, info, warn, error");
        }

        self.log
            .format
            .parse::<LogFormat>()
            .map_err(|e| anyhow::anyhow!("log.format: {}", e))?;

        Ok(())
    }

    /// Copy safe to print: the credential's password is masked
    pub fn redacted(&self) -> Self {
        let mut config = self.clone();
        if let Some(auth) = &config.auth {
            let user = auth.split(':').next().unwrap_or_default();
            config.auth = Some(format!("{}:********", user));
        }
        config
    }
}

//! Settings file management

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::errors::AggregatorError;
use crate::filesys::file::File;
use crate::logs::LogLevel;

/// Service settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    /// Logging configuration
    #[serde(default)]
    pub log: LogSettings,

    /// HTTP API configuration
    #[serde(default)]
    pub api: ApiSettings,

    /// API credentials
    #[serde(default)]
    pub authentication: AuthenticationSettings,

    /// Build loop configuration
    #[serde(default)]
    pub build: BuildSettings,

    /// Where the inventory comes from
    #[serde(default)]
    pub source: SourceSettings,
}

impl Settings {
    /// Read and validate a settings file
    pub async fn load(file: &File) -> Result<Self, AggregatorError> {
        let settings: Settings = file.read_json().await.map_err(|e| {
            AggregatorError::ConfigError(format!(
                "unable to read {}: {}",
                file.path().display(),
                e
            ))
        })?;
        settings.validate()?;
        Ok(settings)
    }

    /// Reject settings the service cannot run with
    pub fn validate(&self) -> Result<(), AggregatorError> {
        if self.build.interval_secs == 0 {
            return Err(AggregatorError::ConfigError(
                "build.interval_secs must be greater than 0".to_string(),
            ));
        }

        match &self.authentication.basic {
            Some(basic) if !basic.username.is_empty() && !basic.password.is_empty() => {}
            _ => {
                return Err(AggregatorError::ConfigError(
                    "authentication.basic username and password are required".to_string(),
                ))
            }
        }

        if let SourceSettings::Http { url, .. } = &self.source {
            url::Url::parse(url).map_err(|e| {
                AggregatorError::ConfigError(format!("invalid source url {}: {}", url, e))
            })?;
        }

        Ok(())
    }
}

/// Logging settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LogSettings {
    #[serde(default)]
    pub level: LogLevel,

    /// Emit JSON lines instead of human readable output
    #[serde(default)]
    pub json: bool,
}

/// HTTP API settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiSettings {
    #[serde(default = "default_listen_address")]
    pub listen_address: String,

    #[serde(default = "default_listen_port")]
    pub listen_port: u16,
}

fn default_listen_address() -> String {
    "0.0.0.0".to_string()
}

fn default_listen_port() -> u16 {
    1323
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            listen_address: default_listen_address(),
            listen_port: default_listen_port(),
        }
    }
}

/// Authentication settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuthenticationSettings {
    #[serde(default)]
    pub basic: Option<BasicAuthSettings>,
}

/// Basic auth credentials
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BasicAuthSettings {
    pub username: String,
    pub password: String,
}

/// Build loop settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildSettings {
    /// Seconds between two builds
    #[serde(default = "default_build_interval")]
    pub interval_secs: u64,

    /// Seconds allowed for fetch plus conversion, 0 disables the limit
    #[serde(default)]
    pub timeout_secs: u64,
}

fn default_build_interval() -> u64 {
    60
}

impl Default for BuildSettings {
    fn default() -> Self {
        Self {
            interval_secs: default_build_interval(),
            timeout_secs: 0,
        }
    }
}

/// Inventory source settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum SourceSettings {
    Http {
        url: String,

        #[serde(default)]
        token: Option<String>,

        #[serde(default = "default_source_timeout")]
        timeout_secs: u64,
    },
    File {
        path: PathBuf,
    },
}

fn default_source_timeout() -> u64 {
    30
}

impl Default for SourceSettings {
    fn default() -> Self {
        SourceSettings::File {
            path: PathBuf::from("inventory.json"),
        }
    }
}

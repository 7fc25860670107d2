//! Application configuration options

use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;

use crate::server::auth::BasicAuthCredentials;
use crate::source;
use crate::storage::settings::{Settings, SourceSettings};
use crate::workers::builder;

/// Main application options
#[derive(Debug, Clone)]
pub struct AppOptions {
    /// Lifecycle configuration
    pub lifecycle: LifecycleOptions,

    /// Server configuration
    pub server: ServerOptions,

    /// Build worker options
    pub builder: builder::Options,

    /// Credentials required on the `/v1` routes
    pub auth: BasicAuthCredentials,

    /// Inventory source
    pub source: SourceOptions,
}

impl AppOptions {
    /// Map validated settings to runtime options
    pub fn from_settings(settings: &Settings) -> Self {
        let auth = match &settings.authentication.basic {
            Some(basic) => BasicAuthCredentials {
                username: basic.username.clone(),
                password: SecretString::from(basic.password.clone()),
            },
            None => BasicAuthCredentials::default(),
        };

        let timeout = match settings.build.timeout_secs {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        };

        let source = match &settings.source {
            SourceSettings::Http {
                url,
                token,
                timeout_secs,
            } => SourceOptions::Http(source::http::Options {
                url: url.clone(),
                token: token.clone().map(SecretString::from),
                timeout: Duration::from_secs(*timeout_secs),
            }),
            SourceSettings::File { path } => SourceOptions::File(path.clone()),
        };

        Self {
            lifecycle: LifecycleOptions::default(),
            server: ServerOptions {
                host: settings.api.listen_address.clone(),
                port: settings.api.listen_port,
            },
            builder: builder::Options {
                interval: Duration::from_secs(settings.build.interval_secs),
                timeout,
            },
            auth,
            source,
        }
    }
}

/// Lifecycle options for the service
#[derive(Debug, Clone)]
pub struct LifecycleOptions {
    /// Maximum delay for graceful shutdown
    pub max_shutdown_delay: Duration,
}

impl Default for LifecycleOptions {
    fn default() -> Self {
        Self {
            max_shutdown_delay: Duration::from_secs(30),
        }
    }
}

/// HTTP server options
#[derive(Debug, Clone)]
pub struct ServerOptions {
    /// Host to bind to
    pub host: String,

    /// Port to listen on
    pub port: u16,
}

impl Default for ServerOptions {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 1323,
        }
    }
}

/// Where the build worker reads the inventory from
#[derive(Debug, Clone)]
pub enum SourceOptions {
    Http(source::http::Options),
    File(PathBuf),
}

//! Inventory fetched over HTTP

use std::time::Duration;

use async_trait::async_trait;
use inventory_models::Inventory;
use reqwest::{header, Client};
use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, error};

use crate::errors::AggregatorError;
use crate::source::SourceProvider;

/// HTTP source options
#[derive(Debug, Clone)]
pub struct Options {
    /// Inventory export URL
    pub url: String,

    /// Optional bearer token
    pub token: Option<SecretString>,

    /// Request timeout
    pub timeout: Duration,
}

/// Inventory served as a JSON document by an HTTP endpoint
pub struct HttpSource {
    client: Client,
    url: String,
    token: Option<SecretString>,
}

impl HttpSource {
    /// Create a new HTTP source
    pub fn new(options: Options) -> Result<Self, AggregatorError> {
        let client = Client::builder().timeout(options.timeout).build()?;

        Ok(Self {
            client,
            url: options.url,
            token: options.token,
        })
    }
}

#[async_trait]
impl SourceProvider for HttpSource {
    async fn fetch(&self) -> Result<Inventory, AggregatorError> {
        debug!("GET {}", self.url);

        let mut request = self
            .client
            .get(&self.url)
            .header(header::ACCEPT, "application/json");

        if let Some(token) = &self.token {
            request = request.header(
                header::AUTHORIZATION,
                format!("Bearer {}", token.expose_secret()),
            );
        }

        let response = request.send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            error!("Inventory GET failed: {} - {}", status, body);
            return Err(AggregatorError::SourceError(format!(
                "{} returned {}",
                self.url, status
            )));
        }

        let inventory = response.json().await?;
        Ok(inventory)
    }

    fn describe(&self) -> String {
        format!("http source {}", self.url)
    }
}

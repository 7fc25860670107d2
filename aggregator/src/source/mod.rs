//! Inventory sources

pub mod file;
pub mod http;

use async_trait::async_trait;
use inventory_models::Inventory;

use crate::errors::AggregatorError;

/// Source trait for testability
#[async_trait]
pub trait SourceProvider: Send + Sync {
    /// Fetch a complete snapshot of the inventory
    async fn fetch(&self) -> Result<Inventory, AggregatorError>;

    /// Short description for logs
    fn describe(&self) -> String;
}

//! Inventory read from a local file

use async_trait::async_trait;
use inventory_models::Inventory;

use crate::errors::AggregatorError;
use crate::filesys::file::File;
use crate::source::SourceProvider;

/// Inventory stored as a JSON document on disk
pub struct FileSource {
    file: File,
}

impl FileSource {
    pub fn new(file: File) -> Self {
        Self { file }
    }
}

#[async_trait]
impl SourceProvider for FileSource {
    async fn fetch(&self) -> Result<Inventory, AggregatorError> {
        if !self.file.exists().await {
            return Err(AggregatorError::SourceError(format!(
                "inventory file {} does not exist",
                self.file.path().display()
            )));
        }
        self.file.read_json().await
    }

    fn describe(&self) -> String {
        format!("file source {}", self.file.path().display())
    }
}

use crate::domain::ports::Storage;
use crate::utils::error::{HarvestError, Result};
use std::path::Path;
use tokio::io::AsyncWriteExt;

/// Writes into the local filesystem. Existing files are overwritten.
#[derive(Debug, Clone, Default)]
pub struct LocalStorage;

impl LocalStorage {
    pub fn new() -> Self {
        Self
    }
}

impl Storage for LocalStorage {
    async fn write_file(&self, path: &Path, data: &[u8]) -> Result<()> {
        let write_error = |source| HarvestError::Write {
            path: path.to_path_buf(),
            source,
        };

        let mut file = tokio::fs::File::create(path).await.map_err(write_error)?;
        file.write_all(data).await.map_err(write_error)?;
        // 確保內容落地後才回報成功
        file.flush().await.map_err(write_error)?;
        file.sync_all().await.map_err(write_error)?;
        Ok(())
    }
}

use crate::domain::model::{ContentType, ParsedEntity, UrlTarget};
use crate::utils::error::Result;
use async_trait::async_trait;
use std::path::Path;

pub trait Storage: Send + Sync {
    fn write_file(
        &self,
        path: &Path,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

/// Single-attempt download. `Ok(None)` means the server answered with a
/// non-success status and the record is dropped.
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, target: &UrlTarget, content_type: ContentType)
        -> Result<Option<Vec<u8>>>;
}

/// Derives the download target for one content type. `None` means skip.
pub trait UrlResolver: Send + Sync {
    fn content_type(&self) -> ContentType;
    fn resolve(&self, entity: &ParsedEntity) -> Option<UrlTarget>;
}

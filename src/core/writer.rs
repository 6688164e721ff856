use crate::domain::model::{ContentType, FetchedContent};
use crate::domain::ports::Storage;
use crate::utils::error::Result;

/// Persists fetched bytes and hands back the identifier. Storage errors are
/// fatal for the owning pipeline.
pub async fn write_content<S: Storage>(
    storage: &S,
    content: FetchedContent,
    content_type: ContentType,
) -> Result<String> {
    tracing::debug!(
        identifier = %content.identifier,
        "💾 try to write {} for GND identifier '{}' to '{}'",
        content_type,
        content.identifier,
        content.destination_path.display()
    );

    storage
        .write_file(&content.destination_path, &content.bytes)
        .await?;

    tracing::debug!(
        identifier = %content.identifier,
        "wrote {} for GND identifier '{}'",
        content_type,
        content.identifier
    );

    Ok(content.identifier)
}

use crate::domain::model::{ContentType, ParsedEntity, UrlTarget};
use crate::domain::ports::UrlResolver;
use serde_json::Value;

const ID_FIELD: &str = "@id";
const THUMBNAIL_FIELD: &str = "thumbnail";
const DOT: char = '.';
const QUESTION_MARK: char = '?';

/// Resolves the main image of a depiction.
#[derive(Debug, Default, Clone, Copy)]
pub struct PictureResolver;

/// Resolves the thumbnail nested inside a depiction.
#[derive(Debug, Default, Clone, Copy)]
pub struct ThumbnailResolver;

impl UrlResolver for PictureResolver {
    fn content_type(&self) -> ContentType {
        ContentType::Picture
    }

    fn resolve(&self, entity: &ParsedEntity) -> Option<UrlTarget> {
        let identifier = &entity.identifier;

        let Some(picture_url) = entity.depiction.get(ID_FIELD).and_then(Value::as_str) else {
            tracing::warn!(
                stage = "resolve-picture",
                identifier = %identifier,
                "⚠️ no picture URL for GND identifier '{}' in depiction information '{}'",
                identifier,
                entity.depiction
            );
            return None;
        };

        let Some(extension) = after_last_dot(picture_url).filter(|ext| !ext.is_empty()) else {
            tracing::warn!(
                stage = "resolve-picture",
                identifier = %identifier,
                "⚠️ no file ending found in picture URL '{}' of GND identifier '{}'",
                picture_url,
                identifier
            );
            return None;
        };

        tracing::info!(
            stage = "resolve-picture",
            identifier = %identifier,
            "🔗 found image URL of GND identifier '{}' in its depiction information",
            identifier
        );

        Some(UrlTarget {
            source_url: picture_url.to_string(),
            destination_filename: ContentType::Picture.file_name(identifier, extension),
            identifier: identifier.clone(),
        })
    }
}

impl UrlResolver for ThumbnailResolver {
    fn content_type(&self) -> ContentType {
        ContentType::Thumbnail
    }

    fn resolve(&self, entity: &ParsedEntity) -> Option<UrlTarget> {
        let identifier = &entity.identifier;

        let Some(thumbnail) = entity.depiction.get(THUMBNAIL_FIELD) else {
            tracing::warn!(
                stage = "resolve-thumbnail",
                identifier = %identifier,
                "⚠️ no thumbnail for GND identifier '{}' in depiction information '{}'",
                identifier,
                entity.depiction
            );
            return None;
        };

        let Some(thumbnail_url) = thumbnail.get(ID_FIELD).and_then(Value::as_str) else {
            tracing::warn!(
                stage = "resolve-thumbnail",
                identifier = %identifier,
                "⚠️ no thumbnail URL for GND identifier '{}' in thumbnail information '{}'",
                identifier,
                thumbnail
            );
            return None;
        };

        let Some(extension) = thumbnail_extension(thumbnail_url) else {
            tracing::warn!(
                stage = "resolve-thumbnail",
                identifier = %identifier,
                "⚠️ no file ending found in thumbnail URL '{}' of GND identifier '{}'",
                thumbnail_url,
                identifier
            );
            return None;
        };

        tracing::info!(
            stage = "resolve-thumbnail",
            identifier = %identifier,
            "🔗 found thumbnail URL of GND identifier '{}' in its depiction information",
            identifier
        );

        Some(UrlTarget {
            source_url: thumbnail_url.to_string(),
            destination_filename: ContentType::Thumbnail.file_name(identifier, extension),
            identifier: identifier.clone(),
        })
    }
}

/// Everything after the last '.'; a '.' at index 0 counts as absent.
fn after_last_dot(url: &str) -> Option<&str> {
    match url.rfind(DOT) {
        Some(index) if index > 0 => Some(&url[index + 1..]),
        _ => None,
    }
}

/// Takes the part after the last '.', then cuts it at the first '?'.
///
/// Thumbnail URLs are expected to carry a query string; without a '?' after
/// the last '.' there is no file ending. A query string containing a '.'
/// (e.g. `?v=1.5`) yields a wrong extension.
fn thumbnail_extension(url: &str) -> Option<&str> {
    let last_part = after_last_dot(url)?;
    let index = last_part.find(QUESTION_MARK)?;
    let extension = &last_part[..index];
    (!extension.is_empty()).then_some(extension)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn entity(depiction: Value) -> ParsedEntity {
        ParsedEntity {
            identifier: "118540238".to_string(),
            depiction,
        }
    }

    #[test]
    fn test_picture_target() {
        let target = PictureResolver
            .resolve(&entity(json!({
                "@id": "https://upload.wikimedia.org/wikipedia/commons/1/1e/Goethe.jpg"
            })))
            .unwrap();

        assert_eq!(
            target.source_url,
            "https://upload.wikimedia.org/wikipedia/commons/1/1e/Goethe.jpg"
        );
        assert_eq!(target.destination_filename, "image_118540238.jpg");
        assert_eq!(target.identifier, "118540238");
    }

    #[test]
    fn test_picture_without_url_is_skipped() {
        assert!(PictureResolver.resolve(&entity(json!({"thumbnail": {}}))).is_none());
        assert!(PictureResolver.resolve(&entity(json!("not an object"))).is_none());
    }

    #[test]
    fn test_picture_without_dot_is_skipped() {
        assert!(PictureResolver
            .resolve(&entity(json!({"@id": "http://localhost/picture"})))
            .is_none());
    }

    #[test]
    fn test_picture_extension_keeps_everything_after_last_dot() {
        let target = PictureResolver
            .resolve(&entity(json!({"@id": "http://host/a/b.tar.gz"})))
            .unwrap();
        assert_eq!(target.destination_filename, "image_118540238.gz");
    }

    #[test]
    fn test_thumbnail_query_string_is_excluded() {
        let target = ThumbnailResolver
            .resolve(&entity(json!({
                "@id": "http://host/path/pic.jpg",
                "thumbnail": {"@id": "http://host/path/thumb.jpg?size=100"}
            })))
            .unwrap();

        assert_eq!(target.source_url, "http://host/path/thumb.jpg?size=100");
        assert_eq!(target.destination_filename, "thumbnail_118540238.jpg");
    }

    #[test]
    fn test_thumbnail_without_query_is_skipped() {
        assert!(ThumbnailResolver
            .resolve(&entity(json!({"thumbnail": {"@id": "http://host/thumb.png"}})))
            .is_none());
    }

    #[test]
    fn test_thumbnail_dot_inside_query_string() {
        // known limitation of the suffix heuristic
        let target = ThumbnailResolver
            .resolve(&entity(json!({"thumbnail": {"@id": "http://host/thumb.jpg?v=1.5"}})))
            .unwrap();
        assert_eq!(target.destination_filename, "thumbnail_118540238.5");
    }

    #[test]
    fn test_thumbnail_missing_levels_are_skipped() {
        assert!(ThumbnailResolver
            .resolve(&entity(json!({"@id": "http://host/a.jpg"})))
            .is_none());
        assert!(ThumbnailResolver
            .resolve(&entity(json!({"thumbnail": {"width": 100}})))
            .is_none());
    }

    #[test]
    fn test_thumbnail_empty_extension_is_skipped() {
        assert!(ThumbnailResolver
            .resolve(&entity(json!({"thumbnail": {"@id": "http://host/thumb.?x=1"}})))
            .is_none());
    }

    #[test]
    fn test_content_types() {
        assert_eq!(PictureResolver.content_type(), ContentType::Picture);
        assert_eq!(ThumbnailResolver.content_type(), ContentType::Thumbnail);
    }
}

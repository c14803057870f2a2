//! Stores discovered avatar images as person-image assets.

use std::sync::Arc;

use gravatar_client::AvatarImage;
use tracing::debug;

use crate::error::EnrichmentError;
use crate::traits::AssetStore;
use crate::types::{AssetId, NewAsset, PersonRecord, PERSON_IMAGE_CLASSIFICATION};

const MAX_FILE_STEM_CHARS: usize = 100;

pub struct AssetPersister {
    assets: Arc<dyn AssetStore>,
}

impl AssetPersister {
    pub fn new(assets: Arc<dyn AssetStore>) -> Self {
        Self { assets }
    }

    /// Create a non-temporary person-image asset holding `image`.
    ///
    /// Nothing is created when the classification is not configured.
    pub async fn persist(
        &self,
        person: &PersonRecord,
        image: &AvatarImage,
    ) -> Result<AssetId, EnrichmentError> {
        let classification = self
            .assets
            .resolve_classification(PERSON_IMAGE_CLASSIFICATION)
            .await
            .map_err(EnrichmentError::Storage)?
            .ok_or_else(|| {
                EnrichmentError::MissingClassification(PERSON_IMAGE_CLASSIFICATION.to_string())
            })?;

        let file_name = photo_file_name(person, &image.mime_type);
        let asset = NewAsset {
            bytes: image.bytes.clone(),
            mime_type: image.mime_type.clone(),
            file_name: file_name.clone(),
            classification,
            is_temporary: false,
        };

        let id = self
            .assets
            .create_asset(asset)
            .await
            .map_err(EnrichmentError::Storage)?;
        debug!(person_id = %person.id, asset_id = %id, file_name = %file_name, "Photo asset created");
        Ok(id)
    }
}

/// `{first}{last}.{ext}`, sanitized; falls back to the person id. The
/// extension follows the image's MIME type.
pub fn photo_file_name(person: &PersonRecord, mime_type: &str) -> String {
    let raw = format!(
        "{}{}",
        person.first_name.as_deref().unwrap_or_default(),
        person.last_name.as_deref().unwrap_or_default()
    );
    let stem = sanitize_file_stem(&raw);
    let ext = image_extension(mime_type);
    if stem.is_empty() {
        format!("{}.{ext}", person.id)
    } else {
        format!("{stem}.{ext}")
    }
}

/// Unknown image types keep `jpg`, the format Gravatar serves by default.
pub fn image_extension(mime_type: &str) -> &'static str {
    match mime_type.trim().to_ascii_lowercase().as_str() {
        "image/png" => "png",
        "image/gif" => "gif",
        "image/webp" => "webp",
        _ => "jpg",
    }
}

/// Strip path separators, control and other non-printable characters, and
/// characters reserved on common filesystems. Leading dots and surrounding
/// whitespace are dropped so the result can never name a hidden or relative
/// path.
pub fn sanitize_file_stem(raw: &str) -> String {
    let cleaned: String = raw
        .chars()
        .filter(|c| !c.is_control())
        .filter(|c| !matches!(c, '/' | '\\' | '<' | '>' | ':' | '"' | '|' | '?' | '*'))
        .filter(|c| !is_invisible(*c))
        .take(MAX_FILE_STEM_CHARS)
        .collect();
    cleaned
        .trim()
        .trim_start_matches('.')
        .trim()
        .to_string()
}

fn is_invisible(c: char) -> bool {
    matches!(
        c,
        '\u{200B}'..='\u{200F}' | '\u{2028}'..='\u{202E}' | '\u{2060}'..='\u{2064}' | '\u{FEFF}'
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    const JPEG: &str = "image/jpeg";

    fn person(first: &str, last: &str) -> PersonRecord {
        let mut p = PersonRecord::new(None);
        p.first_name = Some(first.to_string());
        p.last_name = Some(last.to_string());
        p
    }

    #[test]
    fn concatenates_first_and_last_name() {
        assert_eq!(photo_file_name(&person("Jane", "Doe"), JPEG), "JaneDoe.jpg");
    }

    #[test]
    fn path_traversal_is_neutralised() {
        assert_eq!(
            photo_file_name(&person("../../etc/", "passwd"), JPEG),
            "etcpasswd.jpg"
        );
        assert_eq!(photo_file_name(&person("..\\win", ""), JPEG), "win.jpg");
    }

    #[test]
    fn control_and_reserved_characters_are_removed() {
        assert_eq!(sanitize_file_stem("Ja\u{0}ne\n<Doe>?*\u{200B}"), "JaneDoe");
    }

    #[test]
    fn empty_name_falls_back_to_person_id() {
        let p = person("", "");
        assert_eq!(photo_file_name(&p, JPEG), format!("{}.jpg", p.id));
        let dots = person("...", "/");
        assert_eq!(photo_file_name(&dots, JPEG), format!("{}.jpg", dots.id));
    }

    #[test]
    fn long_names_are_truncated() {
        let p = person(&"a".repeat(300), "");
        assert_eq!(photo_file_name(&p, JPEG).len(), MAX_FILE_STEM_CHARS + ".jpg".len());
    }

    #[test]
    fn extension_follows_mime_type() {
        let jane = person("Jane", "Doe");
        assert_eq!(photo_file_name(&jane, "image/png"), "JaneDoe.png");
        assert_eq!(photo_file_name(&jane, "image/gif"), "JaneDoe.gif");
        assert_eq!(photo_file_name(&jane, "image/x-unknown"), "JaneDoe.jpg");
        let blank = person("", "");
        assert_eq!(photo_file_name(&blank, "image/webp"), format!("{}.webp", blank.id));
    }
}

use std::path::PathBuf;
use std::sync::LazyLock;

use regex::Regex;

use crate::models::{ClassifiedInput, ImageSource, InputKind, RawInput, RawPayload};

/// Web links: http(s) scheme followed by at least one non-space character.
static URL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^https?://\S+").expect("valid regex"));

/// Filename extensions treated as label photos.
const IMAGE_EXTENSIONS: &[&str] = &[".png", ".jpg", ".jpeg", ".webp"];

/// Tag a raw input as free text, an image, or a web link.
///
/// Total and pure. Byte payloads are always images. For text, a URL match
/// wins over an image extension, and anything else is free text. An
/// `ImagePayload` hint turns non-URL text into an image path; no hint can
/// demote a URL.
pub fn classify(raw: &RawInput) -> ClassifiedInput {
    let text = match &raw.payload {
        RawPayload::Bytes(bytes) => {
            return ClassifiedInput::ImagePayload(ImageSource::Bytes(bytes.clone()))
        }
        RawPayload::Text(text) => text,
    };

    let trimmed = text.trim();

    if is_web_link(trimmed) {
        return ClassifiedInput::WebLink(trimmed.to_string());
    }

    if has_image_extension(trimmed) || raw.kind_hint == Some(InputKind::ImagePayload) {
        return ClassifiedInput::ImagePayload(ImageSource::Path(PathBuf::from(trimmed)));
    }

    ClassifiedInput::FreeText(trimmed.to_string())
}

pub fn is_web_link(text: &str) -> bool {
    URL_PATTERN.is_match(text)
}

fn has_image_extension(text: &str) -> bool {
    let lower = text.to_lowercase();
    IMAGE_EXTENSIONS.iter().any(|ext| lower.ends_with(ext))
}

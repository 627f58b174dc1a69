use base64::Engine as _;

use super::ExtractionError;
use crate::models::ImageSource;

/// Largest label photo accepted, before base64 encoding.
pub const MAX_IMAGE_BYTES: usize = 20 * 1024 * 1024;

/// Detect image format from magic bytes (NOT file extensions).
pub fn sniff_image_format(bytes: &[u8]) -> Option<&'static str> {
    match bytes {
        [0xFF, 0xD8, 0xFF, ..] => Some("image/jpeg"),
        [0x89, 0x50, 0x4E, 0x47, ..] => Some("image/png"),
        [b'R', b'I', b'F', b'F', _, _, _, _, b'W', b'E', b'B', b'P', ..] => Some("image/webp"),
        _ if bytes.len() >= 12 && &bytes[4..8] == b"ftyp" => Some("image/heic"),
        _ => None,
    }
}

/// Load an image from memory or disk and check it is a photo we can send.
pub fn load_image(source: &ImageSource) -> Result<Vec<u8>, ExtractionError> {
    let bytes = match source {
        ImageSource::Bytes(bytes) => bytes.clone(),
        ImageSource::Path(path) => {
            let len = std::fs::metadata(path)?.len() as usize;
            if len > MAX_IMAGE_BYTES {
                return Err(ExtractionError::ImageTooLarge(len));
            }
            std::fs::read(path)?
        }
    };

    if bytes.len() > MAX_IMAGE_BYTES {
        return Err(ExtractionError::ImageTooLarge(bytes.len()));
    }

    let format = sniff_image_format(&bytes).ok_or(ExtractionError::UnsupportedImage)?;
    tracing::debug!(format, size = bytes.len(), "Label image loaded");
    Ok(bytes)
}

/// Base64-encode image bytes for the inference capability.
pub fn encode_image(bytes: &[u8]) -> String {
    base64::engine::general_purpose::STANDARD.encode(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const PNG_HEADER: &[u8] = &[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];

    #[test]
    fn sniffs_common_label_formats() {
        assert_eq!(sniff_image_format(&[0xFF, 0xD8, 0xFF, 0xE0]), Some("image/jpeg"));
        assert_eq!(sniff_image_format(PNG_HEADER), Some("image/png"));
        assert_eq!(sniff_image_format(b"RIFF\0\0\0\0WEBPVP8 "), Some("image/webp"));
        assert_eq!(sniff_image_format(b"\0\0\0\x18ftypheic"), Some("image/heic"));
        assert_eq!(sniff_image_format(b"Sugar, Salt"), None);
    }

    #[test]
    fn loads_image_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(PNG_HEADER).unwrap();
        let bytes = load_image(&ImageSource::Path(file.path().to_path_buf())).unwrap();
        assert_eq!(bytes, PNG_HEADER);
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = load_image(&ImageSource::Path("/nonexistent/label.jpg".into())).unwrap_err();
        assert!(matches!(err, ExtractionError::Io(_)));
    }

    #[test]
    fn non_image_bytes_are_rejected() {
        let err = load_image(&ImageSource::Bytes(b"plain text".to_vec())).unwrap_err();
        assert!(matches!(err, ExtractionError::UnsupportedImage));
    }

    #[test]
    fn oversized_bytes_are_rejected() {
        let mut big = PNG_HEADER.to_vec();
        big.resize(MAX_IMAGE_BYTES + 1, 0);
        let err = load_image(&ImageSource::Bytes(big)).unwrap_err();
        assert!(matches!(err, ExtractionError::ImageTooLarge(_)));
    }

    #[test]
    fn encodes_base64() {
        assert_eq!(encode_image(b"hi"), "aGk=");
    }
}

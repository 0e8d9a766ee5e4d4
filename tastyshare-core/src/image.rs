//! Recipe image attachment checks.
//!
//! Attachments are vetted locally (type and size) before any request is
//! made, so a bad file never costs a round trip.

use std::path::Path;

use image::ImageFormat;
use thiserror::Error;

use crate::http::FilePart;

/// Allowed image formats for recipe photos.
pub const ALLOWED_FORMATS: &[ImageFormat] = &[
    ImageFormat::Jpeg,
    ImageFormat::Png,
    ImageFormat::Gif,
    ImageFormat::WebP,
];

/// Maximum file size for images (5MB).
pub const MAX_FILE_SIZE: usize = 5 * 1024 * 1024;

/// Multipart field name the server reads the image from.
pub const IMAGE_FIELD: &str = "recipe_image";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AttachmentError {
    #[error("Please select a valid image file (JPG, PNG, GIF, WebP)")]
    UnsupportedType,

    #[error("Image file must be less than 5MB")]
    TooLarge,

    #[error("Failed to read image: {0}")]
    Unreadable(String),
}

/// An image that passed the type and size checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageAttachment {
    pub file_name: String,
    pub content_type: String,
    pub data: Vec<u8>,
}

impl ImageAttachment {
    /// Validate an in-memory file.
    ///
    /// `declared_type` is the MIME type reported by whoever picked the file;
    /// without one the type is sniffed from the bytes.
    pub fn from_bytes(
        file_name: &str,
        declared_type: Option<&str>,
        data: Vec<u8>,
    ) -> Result<Self, AttachmentError> {
        let content_type = match declared_type {
            Some(mime) => allowed_mime(mime).ok_or(AttachmentError::UnsupportedType)?,
            None => {
                let format =
                    image::guess_format(&data).map_err(|_| AttachmentError::UnsupportedType)?;
                allowed_format(format).ok_or(AttachmentError::UnsupportedType)?
            }
        };

        if data.len() > MAX_FILE_SIZE {
            return Err(AttachmentError::TooLarge);
        }

        Ok(Self {
            file_name: file_name.to_string(),
            content_type: content_type.to_string(),
            data,
        })
    }

    /// Read and validate a file from disk.
    pub fn from_path(path: &Path) -> Result<Self, AttachmentError> {
        let unreadable = |e: std::io::Error| AttachmentError::Unreadable(e.to_string());
        let len = std::fs::metadata(path).map_err(unreadable)?.len();
        if len > MAX_FILE_SIZE as u64 {
            return Err(AttachmentError::TooLarge);
        }
        let data = std::fs::read(path).map_err(unreadable)?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "image".to_string());

        // Sniffed format wins; the extension only helps when the header is unknown.
        let declared = image::guess_format(&data)
            .or_else(|_| ImageFormat::from_path(path))
            .ok()
            .map(|f| f.to_mime_type());

        match declared {
            Some(mime) => Self::from_bytes(&file_name, Some(mime), data),
            None => Err(AttachmentError::UnsupportedType),
        }
    }

    pub fn size(&self) -> usize {
        self.data.len()
    }

    pub fn into_part(self) -> FilePart {
        FilePart {
            field: IMAGE_FIELD.to_string(),
            file_name: self.file_name,
            content_type: self.content_type,
            data: self.data,
        }
    }
}

fn allowed_format(format: ImageFormat) -> Option<&'static str> {
    ALLOWED_FORMATS
        .contains(&format)
        .then(|| format.to_mime_type())
}

fn allowed_mime(mime: &str) -> Option<&'static str> {
    let mime = mime.trim().to_ascii_lowercase();
    ALLOWED_FORMATS
        .iter()
        .map(|f| f.to_mime_type())
        .find(|allowed| *allowed == mime)
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG_HEADER: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0];

    #[test]
    fn test_accepts_declared_type() {
        let attachment =
            ImageAttachment::from_bytes("pie.webp", Some("image/webp"), vec![1, 2, 3]).unwrap();
        assert_eq!(attachment.content_type, "image/webp");
        assert_eq!(attachment.into_part().field, "recipe_image");
    }

    #[test]
    fn test_sniffs_type_without_declaration() {
        let attachment = ImageAttachment::from_bytes("pie", None, PNG_HEADER.to_vec()).unwrap();
        assert_eq!(attachment.content_type, "image/png");
    }

    #[test]
    fn test_rejects_other_types() {
        let err = ImageAttachment::from_bytes("notes.pdf", Some("application/pdf"), vec![0])
            .unwrap_err();
        assert_eq!(err, AttachmentError::UnsupportedType);
        assert_eq!(
            err.to_string(),
            "Please select a valid image file (JPG, PNG, GIF, WebP)"
        );

        let err = ImageAttachment::from_bytes("notes.txt", None, b"not an image".to_vec())
            .unwrap_err();
        assert_eq!(err, AttachmentError::UnsupportedType);
    }

    #[test]
    fn test_size_limit_is_inclusive() {
        let jpeg = Some("image/jpeg");
        assert!(ImageAttachment::from_bytes("a.jpg", jpeg, vec![0; MAX_FILE_SIZE]).is_ok());
        let err =
            ImageAttachment::from_bytes("a.jpg", jpeg, vec![0; MAX_FILE_SIZE + 1]).unwrap_err();
        assert_eq!(err.to_string(), "Image file must be less than 5MB");
    }

    #[test]
    fn test_from_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("photo.png");
        std::fs::write(&path, PNG_HEADER).unwrap();
        let attachment = ImageAttachment::from_path(&path).unwrap();
        assert_eq!(attachment.file_name, "photo.png");
        assert_eq!(attachment.size(), PNG_HEADER.len());
    }

    #[test]
    fn test_oversized_file_rejected_from_metadata() {
        let mut file = tempfile::Builder::new().suffix(".png").tempfile().unwrap();
        std::io::Write::write_all(&mut file, PNG_HEADER).unwrap();
        // Sparse: reports 4 GiB without allocating it.
        file.as_file().set_len(4 * 1024 * 1024 * 1024).unwrap();

        let err = ImageAttachment::from_path(file.path()).unwrap_err();
        assert_eq!(err, AttachmentError::TooLarge);
    }
}

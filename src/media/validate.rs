use thiserror::Error;

use super::FileUpload;
use crate::i18n::{tf, Locale};

/// Kind of media an upload field accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Image,
    Video,
}

const IMAGE_TYPES: &[&str] = &["image/jpeg", "image/jpg", "image/png", "image/webp"];
const VIDEO_TYPES: &[&str] = &["video/mp4", "video/webm", "video/ogg"];

impl MediaKind {
    /// Size ceiling in bytes.
    pub fn max_size(self) -> u64 {
        match self {
            MediaKind::Image => 10 * 1024 * 1024,
            MediaKind::Video => 50 * 1024 * 1024,
        }
    }

    pub fn allowed_types(self) -> &'static [&'static str] {
        match self {
            MediaKind::Image => IMAGE_TYPES,
            MediaKind::Video => VIDEO_TYPES,
        }
    }

    fn size_label(self) -> &'static str {
        match self {
            MediaKind::Image => "10MB",
            MediaKind::Video => "50MB",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("file is larger than {limit}")]
    TooLarge { limit: &'static str },
    #[error("unsupported file type {mime_type}; allowed: {}", .allowed.join(", "))]
    UnsupportedType {
        mime_type: String,
        allowed: &'static [&'static str],
    },
}

impl ValidationError {
    pub fn localized(&self, locale: Locale) -> String {
        match self {
            ValidationError::TooLarge { limit } => tf(locale, "validation.too_large", &[*limit]),
            ValidationError::UnsupportedType { allowed, .. } => {
                tf(locale, "validation.bad_type", &[allowed.join(", ").as_str()])
            }
        }
    }
}

/// Check a file against the size ceiling and type allow-list of `kind`.
/// Size is checked first.
pub fn validate_file(file: &FileUpload, kind: MediaKind) -> Result<(), ValidationError> {
    if file.size() > kind.max_size() {
        return Err(ValidationError::TooLarge {
            limit: kind.size_label(),
        });
    }

    if !kind.allowed_types().contains(&file.content_type.as_str()) {
        return Err(ValidationError::UnsupportedType {
            mime_type: file.content_type.clone(),
            allowed: kind.allowed_types(),
        });
    }

    Ok(())
}

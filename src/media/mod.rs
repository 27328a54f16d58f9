//! File storage gateway: validation and upload of media to the backend's
//! public buckets.

mod validate;

pub use validate::{validate_file, MediaKind, ValidationError};

use std::sync::Arc;

use bytes::Bytes;
use chrono::Utc;
use futures::future::try_join_all;
use thiserror::Error;

use crate::backend::{Backend, BackendError};
use crate::i18n::{t, tf, Locale};

/// Storage folders used inside the buckets.
pub mod folders {
    pub const BACKGROUNDS: &str = "backgrounds";
    pub const COLLECTIONS: &str = "collections";
    pub const PHOTOSETS: &str = "photosets";
    pub const THUMBNAILS: &str = "thumbnails";
    pub const VIDEOS: &str = "videos";
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bucket {
    Images,
    Videos,
}

impl Bucket {
    pub fn name(self) -> &'static str {
        match self {
            Bucket::Images => "website-images",
            Bucket::Videos => "website-videos",
        }
    }
}

/// A file received from an admin form.
#[derive(Debug, Clone)]
pub struct FileUpload {
    pub file_name: String,
    pub content_type: String,
    pub data: Bytes,
}

impl FileUpload {
    /// The declared content type wins unless it is missing or the generic
    /// `application/octet-stream`, in which case it is guessed from the name.
    pub fn new(file_name: &str, content_type: Option<&str>, data: Bytes) -> Self {
        let content_type = content_type
            .filter(|ct| !ct.is_empty() && *ct != "application/octet-stream")
            .map(str::to_string)
            .or_else(|| mime_guess::from_path(file_name).first().map(|m| m.to_string()))
            .unwrap_or_else(|| "application/octet-stream".to_string());

        Self {
            file_name: file_name.to_string(),
            content_type,
            data,
        }
    }

    pub fn size(&self) -> u64 {
        self.data.len() as u64
    }

    fn extension(&self) -> String {
        self.file_name
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_lowercase())
            .filter(|ext| !ext.is_empty())
            .or_else(|| {
                mime_guess::get_mime_extensions_str(&self.content_type)
                    .and_then(|exts| exts.first())
                    .map(|ext| ext.to_string())
            })
            .unwrap_or_else(|| "bin".to_string())
    }
}

/// Where an uploaded file ended up.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredFile {
    pub url: String,
    pub path: String,
}

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("bucket '{0}' does not exist")]
    MissingBucket(String),
    #[error("upload timed out")]
    Timeout,
    /// The storage service could not be reached or answered garbage.
    #[error("network error: {0}")]
    Network(String),
    #[error("upload failed: {0}")]
    Backend(String),
    #[error(transparent)]
    Invalid(#[from] ValidationError),
}

impl UploadError {
    pub fn localized(&self, locale: Locale) -> String {
        match self {
            UploadError::MissingBucket(bucket) => {
                tf(locale, "upload.missing_bucket", &[bucket.as_str()])
            }
            UploadError::Timeout => t(locale, "upload.timeout").to_string(),
            UploadError::Network(_) => t(locale, "upload.network").to_string(),
            UploadError::Backend(message) => tf(locale, "upload.failed", &[message.as_str()]),
            UploadError::Invalid(e) => e.localized(locale),
        }
    }

    /// Missing buckets are a setup problem; the admin UI shows instructions.
    pub fn is_missing_bucket(&self) -> bool {
        matches!(self, UploadError::MissingBucket(_))
    }
}

impl From<BackendError> for UploadError {
    fn from(e: BackendError) -> Self {
        match e {
            BackendError::BucketNotFound(bucket) => UploadError::MissingBucket(bucket),
            BackendError::Timeout(_) => UploadError::Timeout,
            BackendError::Transport(message) => UploadError::Network(message),
            other => {
                let message = other.to_string();
                if message.contains("timeout") || message.contains("Gateway") {
                    UploadError::Timeout
                } else {
                    UploadError::Backend(message)
                }
            }
        }
    }
}

/// Uploads validated files and hands back their public URLs.
#[derive(Clone)]
pub struct Gateway {
    storage: Arc<dyn Backend>,
}

impl Gateway {
    /// `storage` must be an authorized handle; anonymous uploads are refused
    /// by the backend.
    pub fn new(storage: Arc<dyn Backend>) -> Self {
        Self { storage }
    }

    /// `<unix-millis>-<random token>.<ext>`
    pub fn unique_name(file: &FileUpload) -> String {
        let token = uuid::Uuid::new_v4().simple().to_string();
        format!(
            "{}-{}.{}",
            Utc::now().timestamp_millis(),
            &token[..12],
            file.extension()
        )
    }

    /// Upload one file. Callers validate with [`validate_file`] first.
    pub async fn upload_file(
        &self,
        file: &FileUpload,
        bucket: Bucket,
        folder: Option<&str>,
    ) -> Result<StoredFile, UploadError> {
        let name = Self::unique_name(file);
        let path = match folder {
            Some(folder) => format!("{folder}/{name}"),
            None => name,
        };

        let stored = self
            .storage
            .upload(bucket.name(), &path, file.data.clone(), &file.content_type)
            .await
            .map_err(|e| {
                tracing::error!(bucket = bucket.name(), path = %path, error = %e, "Upload failed");
                UploadError::from(e)
            })?;

        tracing::debug!(bucket = bucket.name(), path = %stored, "Uploaded file");
        Ok(StoredFile {
            url: self.storage.public_url(bucket.name(), &stored),
            path: stored,
        })
    }

    /// Validate every file, then upload them concurrently. Any failure fails
    /// the whole batch; files already stored by then are left in the bucket.
    pub async fn upload_batch(
        &self,
        files: &[FileUpload],
        kind: MediaKind,
        bucket: Bucket,
        folder: Option<&str>,
    ) -> Result<Vec<StoredFile>, UploadError> {
        for file in files {
            validate_file(file, kind)?;
        }

        try_join_all(
            files
                .iter()
                .map(|file| self.upload_file(file, bucket, folder)),
        )
        .await
    }

    /// Best-effort removal. No retry.
    pub async fn delete_file(&self, bucket: Bucket, path: &str) -> Result<(), String> {
        self.storage
            .remove(bucket.name(), &[path.to_string()])
            .await
            .map_err(|e| {
                tracing::warn!(bucket = bucket.name(), path = %path, error = %e, "Failed to delete file");
                e.to_string()
            })
    }
}

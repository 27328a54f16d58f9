use std::marker::PhantomData;
use std::sync::Arc;

use chrono::Utc;
use serde_json::Value;
use thiserror::Error;

use super::forms::{Draft, DraftError};
use super::models::{Record, Setting};
use crate::backend::{Backend, BackendError, Query};
use crate::i18n::{tf, Locale};
use crate::media::UploadError;

#[derive(Debug, Error)]
pub enum ContentError {
    #[error("failed to load {table}: {source}")]
    Fetch {
        table: &'static str,
        source: BackendError,
    },
    #[error("failed to save to {table}: {source}")]
    Save {
        table: &'static str,
        source: BackendError,
    },
    #[error("failed to delete from {table}: {source}")]
    Delete {
        table: &'static str,
        source: BackendError,
    },
    #[error("unexpected row in {table}: {source}")]
    Decode {
        table: &'static str,
        source: serde_json::Error,
    },
    #[error(transparent)]
    Invalid(#[from] DraftError),
    #[error(transparent)]
    Upload(#[from] UploadError),
}

impl ContentError {
    pub fn localized(&self, locale: Locale) -> String {
        match self {
            ContentError::Fetch { table, source } => {
                tf(locale, &format!("fetch.{table}"), &[source.to_string().as_str()])
            }
            ContentError::Decode { table, source } => {
                tf(locale, &format!("fetch.{table}"), &[source.to_string().as_str()])
            }
            ContentError::Save { source, .. } => {
                tf(locale, "save.failed", &[source.to_string().as_str()])
            }
            ContentError::Delete { source, .. } => {
                tf(locale, "delete.failed", &[source.to_string().as_str()])
            }
            ContentError::Invalid(e) => e.localized(locale),
            ContentError::Upload(e) => e.localized(locale),
        }
    }

    /// Load failures get a retry action in the UI.
    pub fn is_fetch(&self) -> bool {
        matches!(self, ContentError::Fetch { .. } | ContentError::Decode { .. })
    }

    pub fn is_missing_bucket(&self) -> bool {
        matches!(self, ContentError::Upload(e) if e.is_missing_bucket())
    }
}

/// CRUD over one content table.
///
/// Every mutation is followed by a full re-fetch, and that fresh list is what
/// the caller gets back; nothing is updated optimistically.
pub struct ContentManager<R> {
    backend: Arc<dyn Backend>,
    _record: PhantomData<fn() -> R>,
}

impl<R: Record> ContentManager<R> {
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        Self {
            backend,
            _record: PhantomData,
        }
    }

    pub async fn list(&self) -> Result<Vec<R>, ContentError> {
        self.select(&R::list_query()).await
    }

    pub async fn get(&self, id: &str) -> Result<Option<R>, ContentError> {
        let mut rows = self.select(&Query::new().eq("id", id).limit(1)).await?;
        Ok(rows.pop())
    }

    pub async fn create<D>(&self, draft: &D) -> Result<Vec<R>, ContentError>
    where
        D: Draft<Record = R>,
    {
        draft.check(true)?;
        let row = to_row::<R, D>(draft)?;
        let stored = self
            .backend
            .insert(R::TABLE, row)
            .await
            .map_err(|source| ContentError::Save {
                table: R::TABLE,
                source,
            })?;
        tracing::debug!(table = R::TABLE, id = ?stored.get("id"), "Created row");
        self.list().await
    }

    pub async fn update<D>(&self, id: &str, draft: &D) -> Result<Vec<R>, ContentError>
    where
        D: Draft<Record = R>,
    {
        draft.check(false)?;
        let row = to_row::<R, D>(draft)?;
        self.backend
            .update(R::TABLE, id, row)
            .await
            .map_err(|source| ContentError::Save {
                table: R::TABLE,
                source,
            })?;
        tracing::debug!(table = R::TABLE, id = %id, "Updated row");
        self.list().await
    }

    /// Insert when `editing_id` is `None`, otherwise update that row.
    pub async fn save<D>(&self, editing_id: Option<&str>, draft: &D) -> Result<Vec<R>, ContentError>
    where
        D: Draft<Record = R>,
    {
        match editing_id {
            Some(id) => self.update(id, draft).await,
            None => self.create(draft).await,
        }
    }

    /// Remove a row. Confirmation is the caller's job.
    pub async fn delete(&self, id: &str) -> Result<Vec<R>, ContentError> {
        self.backend
            .delete(R::TABLE, id)
            .await
            .map_err(|source| ContentError::Delete {
                table: R::TABLE,
                source,
            })?;
        tracing::debug!(table = R::TABLE, id = %id, "Deleted row");
        self.list().await
    }

    async fn select(&self, query: &Query) -> Result<Vec<R>, ContentError> {
        let rows = self
            .backend
            .select(R::TABLE, query)
            .await
            .map_err(|source| ContentError::Fetch {
                table: R::TABLE,
                source,
            })?;

        rows.into_iter()
            .map(|row| {
                serde_json::from_value(row).map_err(|source| ContentError::Decode {
                    table: R::TABLE,
                    source,
                })
            })
            .collect()
    }
}

impl ContentManager<Setting> {
    /// Look up a single setting's value.
    pub async fn value(&self, key: &str) -> Result<Option<String>, ContentError> {
        let mut rows = self.select(&Query::new().eq("key", key).limit(1)).await?;
        Ok(rows.pop().map(|s| s.value))
    }

    /// Upsert `key` with a fresh `updated_at`, then re-fetch.
    pub async fn save_setting(&self, key: &str, value: &str) -> Result<Vec<Setting>, ContentError> {
        if key == Setting::BACKGROUND_IMAGE && value.trim().is_empty() {
            return Err(DraftError::BackgroundRequired.into());
        }

        let row = serde_json::json!({
            "key": key,
            "value": value,
            "updated_at": Utc::now().to_rfc3339(),
        });
        self.backend
            .upsert(Setting::TABLE, row, "key")
            .await
            .map_err(|source| ContentError::Save {
                table: Setting::TABLE,
                source,
            })?;
        tracing::info!(key = %key, "Setting saved");
        self.list().await
    }
}

fn to_row<R: Record, D: Draft<Record = R>>(draft: &D) -> Result<Value, ContentError> {
    serde_json::to_value(draft).map_err(|source| ContentError::Decode {
        table: R::TABLE,
        source,
    })
}

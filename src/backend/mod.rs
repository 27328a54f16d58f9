//! Client boundary for the hosted backend: authentication, row storage and
//! blob storage.
//!
//! The service only ever talks to the backend through the [`Backend`] trait.
//! [`SupabaseClient`] is the production implementation; [`MemoryBackend`]
//! keeps everything in process for tests and local development.

mod memory;
mod supabase;

pub use memory::MemoryBackend;
pub use supabase::SupabaseClient;

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("Invalid login credentials")]
    InvalidCredentials,
    #[error("Session is missing or expired")]
    Unauthorized,
    #[error("Bucket not found: {0}")]
    BucketNotFound(String),
    #[error("Request timed out: {0}")]
    Timeout(String),
    #[error("Network error: {0}")]
    Transport(String),
    #[error("Backend returned {status}: {message}")]
    Api { status: u16, message: String },
    #[error("Not found: {0}")]
    NotFound(String),
}

impl From<reqwest::Error> for BackendError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            BackendError::Timeout(e.to_string())
        } else if e.is_decode() {
            BackendError::Transport(format!("invalid response body: {e}"))
        } else {
            BackendError::Transport(e.to_string())
        }
    }
}

/// An authenticated user as reported by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
}

/// Session issued by the backend on sign-in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthSession {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    pub expires_at: DateTime<Utc>,
    pub user: User,
}

impl AuthSession {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    pub column: String,
    pub ascending: bool,
}

/// Row selection: equality filters plus an optional ordering and limit.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    pub filters: Vec<(String, String)>,
    pub order: Option<Order>,
    pub limit: Option<usize>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn eq(mut self, column: &str, value: &str) -> Self {
        self.filters.push((column.to_string(), value.to_string()));
        self
    }

    pub fn order_by(mut self, column: &str, ascending: bool) -> Self {
        self.order = Some(Order {
            column: column.to_string(),
            ascending,
        });
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

#[async_trait]
pub trait Auth: Send + Sync {
    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<AuthSession, BackendError>;

    /// Resolve the user behind an access token. `None` when the token is no
    /// longer valid.
    async fn get_user(&self, access_token: &str) -> Result<Option<User>, BackendError>;

    async fn sign_out(&self, access_token: &str) -> Result<(), BackendError>;
}

#[async_trait]
pub trait Tables: Send + Sync {
    async fn select(&self, table: &str, query: &Query) -> Result<Vec<Value>, BackendError>;

    /// Insert one row and return it as stored (with generated columns).
    async fn insert(&self, table: &str, row: Value) -> Result<Value, BackendError>;

    async fn update(&self, table: &str, id: &str, patch: Value) -> Result<(), BackendError>;

    async fn delete(&self, table: &str, id: &str) -> Result<(), BackendError>;

    /// Insert, or update the row whose `on_conflict` column matches.
    async fn upsert(&self, table: &str, row: Value, on_conflict: &str)
        -> Result<(), BackendError>;
}

#[async_trait]
pub trait Storage: Send + Sync {
    /// Store `data` under `path` and return the stored path.
    async fn upload(
        &self,
        bucket: &str,
        path: &str,
        data: Bytes,
        content_type: &str,
    ) -> Result<String, BackendError>;

    fn public_url(&self, bucket: &str, path: &str) -> String;

    async fn remove(&self, bucket: &str, paths: &[String]) -> Result<(), BackendError>;
}

/// The full backend surface.
pub trait Backend: Auth + Tables + Storage {
    /// A handle whose row and blob calls act on behalf of the signed-in user.
    fn authorized(&self, access_token: &str) -> Arc<dyn Backend>;
}

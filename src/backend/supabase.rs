use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{Duration, Utc};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use serde_json::Value;

use super::{Auth, AuthSession, Backend, BackendError, Query, Storage, Tables, User};
use crate::config::BackendConfig;

/// Supabase-compatible backend reached over HTTPS.
///
/// Row calls go to PostgREST (`/rest/v1`), auth to GoTrue (`/auth/v1`) and
/// blobs to the Storage API (`/storage/v1`). Every request carries the public
/// API key; the bearer token is the user's access token once
/// [`Backend::authorized`] has been called, otherwise the API key itself.
#[derive(Clone)]
pub struct SupabaseClient {
    base_url: String,
    anon_key: String,
    bearer: String,
    client: Client,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    expires_in: Option<i64>,
    #[serde(default)]
    expires_at: Option<i64>,
    user: User,
}

#[derive(Deserialize)]
struct UploadResponse {
    #[serde(rename = "Key")]
    key: String,
}

impl SupabaseClient {
    pub fn new(config: &BackendConfig) -> Result<Self, BackendError> {
        let client = Client::builder().build()?;

        Ok(Self {
            base_url: config.url.trim_end_matches('/').to_string(),
            anon_key: config.anon_key.clone(),
            bearer: config.anon_key.clone(),
            client,
        })
    }

    fn auth_url(&self, path: &str) -> String {
        format!("{}/auth/v1/{}", self.base_url, path)
    }

    fn rest_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    fn object_url(&self, bucket: &str, path: &str) -> String {
        format!("{}/storage/v1/object/{}/{}", self.base_url, bucket, path)
    }

    fn with_keys(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header("apikey", &self.anon_key)
            .bearer_auth(&self.bearer)
    }
}

#[async_trait]
impl Auth for SupabaseClient {
    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<AuthSession, BackendError> {
        let resp = self
            .client
            .post(self.auth_url("token"))
            .query(&[("grant_type", "password")])
            .header("apikey", &self.anon_key)
            .json(&serde_json::json!({ "email": email, "password": password }))
            .send()
            .await?;

        if resp.status() == StatusCode::BAD_REQUEST {
            let err = api_error(resp).await;
            return Err(match err {
                BackendError::Api { ref message, .. }
                    if message.contains("Invalid login credentials") =>
                {
                    BackendError::InvalidCredentials
                }
                other => other,
            });
        }
        let resp = check(resp).await?;
        let token: TokenResponse = resp.json().await?;

        let expires_at = match (token.expires_at, token.expires_in) {
            (Some(at), _) => chrono::DateTime::from_timestamp(at, 0).unwrap_or_else(Utc::now),
            (None, Some(secs)) => Utc::now() + Duration::seconds(secs),
            (None, None) => Utc::now() + Duration::hours(1),
        };

        Ok(AuthSession {
            access_token: token.access_token,
            refresh_token: token.refresh_token,
            expires_at,
            user: token.user,
        })
    }

    async fn get_user(&self, access_token: &str) -> Result<Option<User>, BackendError> {
        let resp = self
            .client
            .get(self.auth_url("user"))
            .header("apikey", &self.anon_key)
            .bearer_auth(access_token)
            .send()
            .await?;

        if matches!(
            resp.status(),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN
        ) {
            return Ok(None);
        }

        let resp = check(resp).await?;
        Ok(Some(resp.json().await?))
    }

    async fn sign_out(&self, access_token: &str) -> Result<(), BackendError> {
        let resp = self
            .client
            .post(self.auth_url("logout"))
            .header("apikey", &self.anon_key)
            .bearer_auth(access_token)
            .send()
            .await?;

        // An already-invalid token means there is nothing left to revoke
        if resp.status() == StatusCode::UNAUTHORIZED {
            return Ok(());
        }
        check(resp).await?;
        Ok(())
    }
}

#[async_trait]
impl Tables for SupabaseClient {
    async fn select(&self, table: &str, query: &Query) -> Result<Vec<Value>, BackendError> {
        let mut params: Vec<(String, String)> = vec![("select".to_string(), "*".to_string())];
        for (column, value) in &query.filters {
            params.push((column.clone(), format!("eq.{value}")));
        }
        if let Some(ref order) = query.order {
            let direction = if order.ascending { "asc" } else { "desc" };
            params.push(("order".to_string(), format!("{}.{direction}", order.column)));
        }
        if let Some(limit) = query.limit {
            params.push(("limit".to_string(), limit.to_string()));
        }

        let resp = self
            .with_keys(self.client.get(self.rest_url(table)))
            .query(&params)
            .send()
            .await?;

        let resp = check(resp).await?;
        Ok(resp.json().await?)
    }

    async fn insert(&self, table: &str, row: Value) -> Result<Value, BackendError> {
        let resp = self
            .with_keys(self.client.post(self.rest_url(table)))
            .header("Prefer", "return=representation")
            .json(&Value::Array(vec![row]))
            .send()
            .await?;

        let resp = check(resp).await?;
        let mut rows: Vec<Value> = resp.json().await?;
        rows.pop()
            .ok_or_else(|| BackendError::NotFound(format!("inserted row in {table}")))
    }

    async fn update(&self, table: &str, id: &str, patch: Value) -> Result<(), BackendError> {
        let resp = self
            .with_keys(self.client.patch(self.rest_url(table)))
            .query(&[("id", format!("eq.{id}"))])
            .json(&patch)
            .send()
            .await?;

        check(resp).await?;
        Ok(())
    }

    async fn delete(&self, table: &str, id: &str) -> Result<(), BackendError> {
        let resp = self
            .with_keys(self.client.delete(self.rest_url(table)))
            .query(&[("id", format!("eq.{id}"))])
            .send()
            .await?;

        check(resp).await?;
        Ok(())
    }

    async fn upsert(
        &self,
        table: &str,
        row: Value,
        on_conflict: &str,
    ) -> Result<(), BackendError> {
        let resp = self
            .with_keys(self.client.post(self.rest_url(table)))
            .query(&[("on_conflict", on_conflict)])
            .header("Prefer", "resolution=merge-duplicates")
            .json(&Value::Array(vec![row]))
            .send()
            .await?;

        check(resp).await?;
        Ok(())
    }
}

#[async_trait]
impl Storage for SupabaseClient {
    async fn upload(
        &self,
        bucket: &str,
        path: &str,
        data: Bytes,
        content_type: &str,
    ) -> Result<String, BackendError> {
        let resp = self
            .with_keys(self.client.post(self.object_url(bucket, path)))
            .header("Content-Type", content_type)
            .header("Cache-Control", "max-age=3600")
            .header("x-upsert", "false")
            .body(data)
            .send()
            .await?;

        let resp = match check(resp).await {
            Ok(resp) => resp,
            Err(BackendError::Api { message, .. }) if message.contains("Bucket not found") => {
                return Err(BackendError::BucketNotFound(bucket.to_string()));
            }
            Err(e) => return Err(e),
        };

        let uploaded: UploadResponse = resp.json().await?;
        // The returned key is prefixed with the bucket name
        let stored = uploaded
            .key
            .strip_prefix(&format!("{bucket}/"))
            .unwrap_or(&uploaded.key)
            .to_string();
        Ok(stored)
    }

    fn public_url(&self, bucket: &str, path: &str) -> String {
        format!(
            "{}/storage/v1/object/public/{}/{}",
            self.base_url, bucket, path
        )
    }

    async fn remove(&self, bucket: &str, paths: &[String]) -> Result<(), BackendError> {
        let resp = self
            .with_keys(
                self.client
                    .delete(format!("{}/storage/v1/object/{}", self.base_url, bucket)),
            )
            .json(&serde_json::json!({ "prefixes": paths }))
            .send()
            .await?;

        match check(resp).await {
            Ok(_) => Ok(()),
            Err(BackendError::Api { message, .. }) if message.contains("Bucket not found") => {
                Err(BackendError::BucketNotFound(bucket.to_string()))
            }
            Err(e) => Err(e),
        }
    }
}

impl Backend for SupabaseClient {
    fn authorized(&self, access_token: &str) -> Arc<dyn Backend> {
        let mut scoped = self.clone();
        scoped.bearer = access_token.to_string();
        Arc::new(scoped)
    }
}

/// Pass successful responses through; turn everything else into a
/// [`BackendError`].
async fn check(resp: Response) -> Result<Response, BackendError> {
    if resp.status().is_success() {
        Ok(resp)
    } else {
        Err(api_error(resp).await)
    }
}

async fn api_error(resp: Response) -> BackendError {
    let status = resp.status();
    let body = resp.text().await.unwrap_or_default();
    let message = error_message(&body);

    match status {
        StatusCode::GATEWAY_TIMEOUT | StatusCode::REQUEST_TIMEOUT => BackendError::Timeout(message),
        StatusCode::UNAUTHORIZED => BackendError::Unauthorized,
        _ => BackendError::Api {
            status: status.as_u16(),
            message,
        },
    }
}

/// Pull a human-readable message out of the error bodies the three APIs
/// produce (`message`, `msg`, `error_description` or `error`).
fn error_message(body: &str) -> String {
    let parsed: Option<Value> = serde_json::from_str(body).ok();
    parsed
        .as_ref()
        .and_then(|v| {
            ["message", "msg", "error_description", "error"]
                .iter()
                .find_map(|field| v.get(field).and_then(Value::as_str))
        })
        .map(str::to_string)
        .unwrap_or_else(|| body.trim().to_string())
}

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{Duration, SecondsFormat, Utc};
use serde_json::{Map, Value};

use super::{Auth, AuthSession, Backend, BackendError, Query, Storage, Tables, User};

const PUBLIC_BASE: &str = "http://localhost:54321/storage/v1/object/public";

/// In-process backend for development and testing.
///
/// Behaves like the hosted service where the site depends on it: writes and
/// uploads require a signed-in handle, unknown buckets are reported as
/// missing, and inserted rows receive an `id` and `created_at`.
#[derive(Clone, Default)]
pub struct MemoryBackend {
    state: Arc<Mutex<MemoryState>>,
    bearer: Option<String>,
}

#[derive(Default)]
struct MemoryState {
    users: HashMap<String, (String, User)>,
    tokens: HashMap<String, AuthSession>,
    tables: HashMap<String, Vec<Value>>,
    buckets: HashMap<String, HashMap<String, Bytes>>,
    unavailable: HashSet<String>,
    auth_down: bool,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register an account that can sign in with `email` / `password`.
    pub fn add_user(&self, email: &str, password: &str) -> User {
        let user = User {
            id: uuid::Uuid::new_v4().to_string(),
            email: Some(email.to_string()),
        };
        self.state().users.insert(
            email.to_lowercase(),
            (password.to_string(), user.clone()),
        );
        user
    }

    pub fn create_bucket(&self, bucket: &str) {
        self.state()
            .buckets
            .entry(bucket.to_string())
            .or_default();
    }

    /// Insert rows directly, bypassing authorization.
    pub fn seed(&self, table: &str, rows: Vec<Value>) {
        let mut state = self.state();
        let stored = state.tables.entry(table.to_string()).or_default();
        for row in rows {
            stored.push(with_defaults(row));
        }
    }

    /// Make every row call against `table` fail with a transport error.
    pub fn make_unavailable(&self, table: &str) {
        self.state().unavailable.insert(table.to_string());
    }

    /// While unavailable, session checks fail with a transport error.
    pub fn set_auth_available(&self, available: bool) {
        self.state().auth_down = !available;
    }

    pub fn rows(&self, table: &str) -> Vec<Value> {
        self.state().tables.get(table).cloned().unwrap_or_default()
    }

    pub fn object(&self, bucket: &str, path: &str) -> Option<Bytes> {
        self.state()
            .buckets
            .get(bucket)
            .and_then(|objects| objects.get(path).cloned())
    }

    pub fn object_count(&self, bucket: &str) -> usize {
        self.state().buckets.get(bucket).map_or(0, HashMap::len)
    }

    /// Access tokens issued so far.
    pub fn sessions(&self) -> Vec<String> {
        self.state().tokens.keys().cloned().collect()
    }

    /// Expire a previously issued access token.
    pub fn expire_token(&self, access_token: &str) {
        if let Some(session) = self.state().tokens.get_mut(access_token) {
            session.expires_at = Utc::now() - Duration::seconds(1);
        }
    }

    fn require_user(&self, state: &MemoryState) -> Result<(), BackendError> {
        let valid = self
            .bearer
            .as_deref()
            .and_then(|token| state.tokens.get(token))
            .is_some_and(|session| !session.is_expired(Utc::now()));
        if valid {
            Ok(())
        } else {
            Err(BackendError::Unauthorized)
        }
    }

    fn check_available(state: &MemoryState, table: &str) -> Result<(), BackendError> {
        if state.unavailable.contains(table) {
            return Err(BackendError::Transport(format!(
                "connection refused while querying {table}"
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl Auth for MemoryBackend {
    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<AuthSession, BackendError> {
        let mut state = self.state();
        let user = match state.users.get(&email.to_lowercase()) {
            Some((expected, user)) if expected == password => user.clone(),
            _ => return Err(BackendError::InvalidCredentials),
        };

        let session = AuthSession {
            access_token: uuid::Uuid::new_v4().to_string(),
            refresh_token: Some(uuid::Uuid::new_v4().to_string()),
            expires_at: Utc::now() + Duration::hours(1),
            user,
        };
        state
            .tokens
            .insert(session.access_token.clone(), session.clone());
        Ok(session)
    }

    async fn get_user(&self, access_token: &str) -> Result<Option<User>, BackendError> {
        let state = self.state();
        if state.auth_down {
            return Err(BackendError::Transport(
                "connection reset while checking session".to_string(),
            ));
        }
        Ok(state
            .tokens
            .get(access_token)
            .filter(|session| !session.is_expired(Utc::now()))
            .map(|session| session.user.clone()))
    }

    async fn sign_out(&self, access_token: &str) -> Result<(), BackendError> {
        self.state().tokens.remove(access_token);
        Ok(())
    }
}

#[async_trait]
impl Tables for MemoryBackend {
    async fn select(&self, table: &str, query: &Query) -> Result<Vec<Value>, BackendError> {
        let state = self.state();
        Self::check_available(&state, table)?;

        let mut rows: Vec<Value> = state
            .tables
            .get(table)
            .map(|rows| {
                rows.iter()
                    .filter(|row| {
                        query
                            .filters
                            .iter()
                            .all(|(column, value)| column_text(row, column).as_deref() == Some(value))
                    })
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();

        if let Some(ref order) = query.order {
            rows.sort_by(|a, b| column_text(a, &order.column).cmp(&column_text(b, &order.column)));
            // Reversing after a stable sort keeps ties newest-first
            if !order.ascending {
                rows.reverse();
            }
        }
        if let Some(limit) = query.limit {
            rows.truncate(limit);
        }
        Ok(rows)
    }

    async fn insert(&self, table: &str, row: Value) -> Result<Value, BackendError> {
        let mut state = self.state();
        Self::check_available(&state, table)?;
        self.require_user(&state)?;

        let row = with_defaults(row);
        state
            .tables
            .entry(table.to_string())
            .or_default()
            .push(row.clone());
        Ok(row)
    }

    async fn update(&self, table: &str, id: &str, patch: Value) -> Result<(), BackendError> {
        let mut state = self.state();
        Self::check_available(&state, table)?;
        self.require_user(&state)?;

        if let Some(row) = state
            .tables
            .get_mut(table)
            .and_then(|rows| rows.iter_mut().find(|r| column_text(r, "id").as_deref() == Some(id)))
        {
            merge(row, patch);
        }
        Ok(())
    }

    async fn delete(&self, table: &str, id: &str) -> Result<(), BackendError> {
        let mut state = self.state();
        Self::check_available(&state, table)?;
        self.require_user(&state)?;

        if let Some(rows) = state.tables.get_mut(table) {
            rows.retain(|r| column_text(r, "id").as_deref() != Some(id));
        }
        Ok(())
    }

    async fn upsert(
        &self,
        table: &str,
        row: Value,
        on_conflict: &str,
    ) -> Result<(), BackendError> {
        let mut state = self.state();
        Self::check_available(&state, table)?;
        self.require_user(&state)?;

        let key = column_text(&row, on_conflict);
        let rows = state.tables.entry(table.to_string()).or_default();
        match rows
            .iter_mut()
            .find(|r| key.is_some() && column_text(r, on_conflict) == key)
        {
            Some(existing) => merge(existing, row),
            None => rows.push(with_defaults(row)),
        }
        Ok(())
    }
}

#[async_trait]
impl Storage for MemoryBackend {
    async fn upload(
        &self,
        bucket: &str,
        path: &str,
        data: Bytes,
        _content_type: &str,
    ) -> Result<String, BackendError> {
        let mut state = self.state();
        self.require_user(&state)?;

        let objects = state
            .buckets
            .get_mut(bucket)
            .ok_or_else(|| BackendError::BucketNotFound(bucket.to_string()))?;
        if objects.contains_key(path) {
            return Err(BackendError::Api {
                status: 409,
                message: "The resource already exists".to_string(),
            });
        }
        objects.insert(path.to_string(), data);
        Ok(path.to_string())
    }

    fn public_url(&self, bucket: &str, path: &str) -> String {
        format!("{PUBLIC_BASE}/{bucket}/{path}")
    }

    async fn remove(&self, bucket: &str, paths: &[String]) -> Result<(), BackendError> {
        let mut state = self.state();
        self.require_user(&state)?;

        let objects = state
            .buckets
            .get_mut(bucket)
            .ok_or_else(|| BackendError::BucketNotFound(bucket.to_string()))?;
        for path in paths {
            objects.remove(path);
        }
        Ok(())
    }
}

impl Backend for MemoryBackend {
    fn authorized(&self, access_token: &str) -> Arc<dyn Backend> {
        Arc::new(Self {
            state: Arc::clone(&self.state),
            bearer: Some(access_token.to_string()),
        })
    }
}

fn column_text(row: &Value, column: &str) -> Option<String> {
    match row.get(column)? {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

fn with_defaults(row: Value) -> Value {
    let mut object = match row {
        Value::Object(map) => map,
        _ => Map::new(),
    };
    object
        .entry("id")
        .or_insert_with(|| Value::String(uuid::Uuid::new_v4().to_string()));
    object.entry("created_at").or_insert_with(|| {
        Value::String(Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true))
    });
    Value::Object(object)
}

fn merge(target: &mut Value, patch: Value) {
    if let (Value::Object(target), Value::Object(patch)) = (target, patch) {
        for (key, value) in patch {
            target.insert(key, value);
        }
    }
}

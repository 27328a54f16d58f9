//! Shared helpers for unit tests.

use std::sync::Arc;

use serde_json::json;

use crate::backend::{Auth, Backend, MemoryBackend};
use crate::config::Config;
use crate::media::Bucket;

/// Configuration pointing at a local backend with default settings.
pub fn test_config() -> Config {
    Config::from_lookup(|key| match key {
        "SUPABASE_URL" => Some("http://localhost:54321".to_string()),
        "SUPABASE_ANON_KEY" => Some("anon-key".to_string()),
        _ => None,
    })
    .expect("test configuration is valid")
}

/// A backend with both buckets and a little content in every table.
pub fn seeded_backend() -> MemoryBackend {
    let backend = MemoryBackend::new();
    backend.create_bucket(Bucket::Images.name());
    backend.create_bucket(Bucket::Videos.name());

    backend.seed(
        "collections",
        vec![
            json!({"id": "c1", "title": "Winter", "season": "FW24", "images": ["https://cdn/w.jpg"], "featured": true, "created_at": "2024-10-01T10:00:00Z"}),
            json!({"id": "c2", "title": "Spring", "season": "SS25", "images": [], "featured": false, "created_at": "2025-03-01T10:00:00Z"}),
        ],
    );
    backend.seed(
        "photosets",
        vec![
            json!({"id": "p1", "title": "Moscow", "category": "editorial", "images": [], "created_at": "2025-01-01T10:00:00Z"}),
            json!({"id": "p2", "title": "Coast", "category": "campaign", "images": [], "created_at": "2025-02-01T10:00:00Z"}),
            json!({"id": "p3", "title": "Studio", "category": "lookbook", "images": [], "created_at": "2025-03-01T10:00:00Z"}),
        ],
    );
    backend.seed(
        "videos",
        vec![json!({
            "id": "v1",
            "title": "Runway",
            "thumbnail": "https://cdn/t.jpg",
            "video_path": "https://cdn/v.mp4",
            "redirect_url": "https://youtube.com/watch?v=1",
            "created_at": "2025-01-15T10:00:00Z"
        })],
    );
    backend
}

/// A handle on `backend` acting as a freshly signed-in admin.
pub async fn signed_in(backend: &MemoryBackend) -> Arc<dyn Backend> {
    backend.add_user("admin@brand.com", "secret");
    let session = backend
        .sign_in_with_password("admin@brand.com", "secret")
        .await
        .expect("seeded user signs in");
    backend.authorized(&session.access_token)
}

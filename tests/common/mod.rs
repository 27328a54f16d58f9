#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, Response, StatusCode};
use axum::Router;
use tower::ServiceExt;

use atelier_site::api::create_router;
use atelier_site::backend::MemoryBackend;
use atelier_site::config::Config;
use atelier_site::AppState;

pub const ADMIN_EMAIL: &str = "admin@brand.com";
pub const ADMIN_PASSWORD: &str = "correct horse";

const BOUNDARY: &str = "----atelier-test-boundary";

pub fn config(extra: &[(&str, &str)]) -> Config {
    let extra: Vec<(String, String)> = extra
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    Config::from_lookup(move |key| match key {
        "SUPABASE_URL" => Some("http://localhost:54321".to_string()),
        "SUPABASE_ANON_KEY" => Some("anon-key".to_string()),
        _ => extra
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.clone()),
    })
    .unwrap()
}

pub fn app_with(backend: &MemoryBackend, config: Config) -> Router {
    let state = AppState::new(config, Arc::new(backend.clone())).unwrap();
    create_router(Arc::new(state))
}

pub fn app(backend: &MemoryBackend) -> Router {
    app_with(backend, config(&[]))
}

/// A backend with both buckets, the admin account and some content.
pub fn backend() -> MemoryBackend {
    let backend = MemoryBackend::new();
    backend.create_bucket("website-images");
    backend.create_bucket("website-videos");
    backend.add_user(ADMIN_EMAIL, ADMIN_PASSWORD);

    backend.seed(
        "collections",
        vec![serde_json::json!({
            "id": "c1",
            "title": "Winter Tales",
            "season": "FW24",
            "images": ["https://cdn.example.com/winter.jpg"],
            "featured": true,
            "created_at": "2024-10-01T10:00:00Z"
        })],
    );
    backend.seed(
        "photosets",
        vec![
            serde_json::json!({"id": "p1", "title": "Moscow Nights", "category": "editorial", "location": "Moscow", "images": [], "created_at": "2025-01-01T10:00:00Z"}),
            serde_json::json!({"id": "p2", "title": "Coastline", "category": "campaign", "location": "Sochi", "images": [], "created_at": "2025-02-01T10:00:00Z"}),
            serde_json::json!({"id": "p3", "title": "Studio Light", "category": "lookbook", "images": [], "created_at": "2025-03-01T10:00:00Z"}),
        ],
    );
    backend.seed(
        "videos",
        vec![serde_json::json!({
            "id": "v1",
            "title": "Runway 2025",
            "caption": "Backstage",
            "thumbnail": "https://cdn.example.com/thumb.jpg",
            "video_path": "https://cdn.example.com/runway.mp4",
            "redirect_url": "https://youtube.com/watch?v=runway",
            "created_at": "2025-01-15T10:00:00Z"
        })],
    );
    backend
}

pub struct FilePart<'a> {
    pub field: &'a str,
    pub file_name: &'a str,
    pub content_type: &'a str,
    pub data: &'a [u8],
}

pub fn multipart_body(fields: &[(&str, &str)], files: &[FilePart<'_>]) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
    }
    for file in files {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: {}\r\n\r\n",
                file.field, file.file_name, file.content_type
            )
            .as_bytes(),
        );
        body.extend_from_slice(file.data);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

pub fn get(uri: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::empty()).unwrap()
}

pub fn post_form(
    uri: &str,
    cookie: Option<&str>,
    fields: &[(&str, &str)],
    files: &[FilePart<'_>],
) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        );
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder
        .body(Body::from(multipart_body(fields, files)))
        .unwrap()
}

pub async fn send(app: &Router, request: Request<Body>) -> Response<Body> {
    app.clone().oneshot(request).await.unwrap()
}

pub async fn body_text(response: Response<Body>) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    serde_json::from_str(&body_text(response).await).unwrap()
}

/// `name=value` from a response's `Set-Cookie` header.
pub fn session_cookie(response: &Response<Body>) -> Option<String> {
    response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(';').next())
        .map(str::to_string)
}

/// Sign in as `email` and return the session cookie.
pub async fn sign_in_as(app: &Router, email: &str, password: &str) -> String {
    let response = send(
        app,
        post_form(
            "/admin/login",
            None,
            &[("action", "sign-in"), ("email", email), ("password", password)],
            &[],
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    session_cookie(&response).expect("sign-in sets a session cookie")
}

pub async fn sign_in(app: &Router) -> String {
    sign_in_as(app, ADMIN_EMAIL, ADMIN_PASSWORD).await
}

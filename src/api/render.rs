//! Server-side page rendering.

use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use minijinja::{Environment, Value};
use thiserror::Error;

use crate::i18n::{t, Locale};

const TEMPLATES: &[(&str, &str)] = &[
    ("base.html", include_str!("../../templates/base.html")),
    ("public.html", include_str!("../../templates/public.html")),
    ("login.html", include_str!("../../templates/login.html")),
    ("guard.html", include_str!("../../templates/guard.html")),
    ("dashboard.html", include_str!("../../templates/dashboard.html")),
    ("admin_layout.html", include_str!("../../templates/admin_layout.html")),
    ("row_actions.html", include_str!("../../templates/row_actions.html")),
    ("collections.html", include_str!("../../templates/collections.html")),
    ("photosets.html", include_str!("../../templates/photosets.html")),
    ("videos.html", include_str!("../../templates/videos.html")),
    ("settings.html", include_str!("../../templates/settings.html")),
];

#[derive(Debug, Error)]
#[error("template error: {0}")]
pub struct RenderError(#[from] minijinja::Error);

impl IntoResponse for RenderError {
    fn into_response(self) -> Response {
        tracing::error!(error = %self.0, "Failed to render page");
        (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
    }
}

/// Compiled page templates. Templates look up text with `t(locale, key)`.
pub struct Templates {
    env: Environment<'static>,
}

impl Templates {
    pub fn new() -> Result<Self, RenderError> {
        let mut env = Environment::new();
        for &(name, source) in TEMPLATES {
            env.add_template(name, source)?;
        }
        env.add_function("t", translate);
        env.add_filter("date", date);
        Ok(Self { env })
    }

    pub fn render(&self, name: &str, ctx: Value) -> Result<String, RenderError> {
        Ok(self.env.get_template(name)?.render(ctx)?)
    }

    pub fn page(&self, status: StatusCode, name: &str, ctx: Value) -> Result<Response, RenderError> {
        Ok((status, Html(self.render(name, ctx)?)).into_response())
    }
}

fn translate(locale: &str, key: &str) -> String {
    t(Locale::parse(locale).unwrap_or(Locale::Ru), key).to_string()
}

/// `2025-03-01T10:00:00Z` -> `2025-03-01`
fn date(value: &str) -> String {
    value.get(..10).unwrap_or(value).to_string()
}

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Response;
use chrono::{Datelike, Utc};
use minijinja::context;
use serde::Deserialize;

use super::locale;
use crate::api::render::RenderError;
use crate::api::response::AppQuery;
use crate::content::Category;
use crate::site::{filter_photosets, CategoryFilter, SiteContent};
use crate::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct SiteParams {
    pub category: Option<String>,
}

/// The single-page public site. Each content section renders its own error
/// panel so one failing table does not take the page down.
pub async fn public_site(
    State(state): State<Arc<AppState>>,
    AppQuery(params): AppQuery<SiteParams>,
) -> Result<Response, RenderError> {
    let locale = locale(&state);
    let content = SiteContent::load(&state.backend).await;
    let filter = CategoryFilter::parse(params.category.as_deref());

    let photosets = content
        .photosets
        .as_ref()
        .ok()
        .map(|photosets| filter_photosets(photosets, filter));
    let category_options: Vec<&str> = std::iter::once(CategoryFilter::All.as_str())
        .chain(Category::ALL.iter().map(|c| c.as_str()))
        .collect();

    state.templates.page(
        StatusCode::OK,
        "public.html",
        context! {
            locale => locale.code(),
            background_image => content.background_image,
            collections => content.collections.as_ref().ok(),
            collections_error => content.collections.as_ref().err().map(|e| e.localized(locale)),
            photosets => photosets,
            photosets_error => content.photosets.as_ref().err().map(|e| e.localized(locale)),
            videos => content.videos.as_ref().ok(),
            videos_error => content.videos.as_ref().err().map(|e| e.localized(locale)),
            category_options => category_options,
            active_category => filter.as_str(),
            year => Utc::now().year(),
        },
    )
}

//! Read-only data for the public site.

use std::sync::Arc;

use serde::Serialize;

use crate::backend::Backend;
use crate::content::{Category, Collection, ContentError, ContentManager, Photoset, Setting, Video};

/// Background used when the `background_image` setting is absent or
/// cannot be read.
pub const DEFAULT_BACKGROUND_URL: &str =
    "https://images.pexels.com/photos/1040945/pexels-photo-1040945.jpeg?auto=compress&cs=tinysrgb&w=1920";

/// Photoset category selector. Applied to an already-fetched list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum CategoryFilter {
    #[default]
    All,
    Only(Category),
}

impl CategoryFilter {
    /// Unknown or missing values select everything.
    pub fn parse(value: Option<&str>) -> Self {
        value
            .and_then(Category::parse)
            .map(CategoryFilter::Only)
            .unwrap_or(CategoryFilter::All)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            CategoryFilter::All => "all",
            CategoryFilter::Only(category) => category.as_str(),
        }
    }

    pub fn matches(self, photoset: &Photoset) -> bool {
        match self {
            CategoryFilter::All => true,
            CategoryFilter::Only(category) => photoset.category == category,
        }
    }
}

pub fn filter_photosets(photosets: &[Photoset], filter: CategoryFilter) -> Vec<Photoset> {
    photosets
        .iter()
        .filter(|p| filter.matches(p))
        .cloned()
        .collect()
}

/// Current background image URL, falling back to [`DEFAULT_BACKGROUND_URL`].
pub async fn background_image(backend: &Arc<dyn Backend>) -> String {
    let settings = ContentManager::<Setting>::new(Arc::clone(backend));
    match settings.value(Setting::BACKGROUND_IMAGE).await {
        Ok(Some(url)) if !url.trim().is_empty() => url,
        Ok(_) => DEFAULT_BACKGROUND_URL.to_string(),
        Err(e) => {
            tracing::warn!(error = %e, "Falling back to default background image");
            DEFAULT_BACKGROUND_URL.to_string()
        }
    }
}

/// Everything the home page shows. Each section fails independently.
pub struct SiteContent {
    pub background_image: String,
    pub collections: Result<Vec<Collection>, ContentError>,
    pub photosets: Result<Vec<Photoset>, ContentError>,
    pub videos: Result<Vec<Video>, ContentError>,
}

impl SiteContent {
    pub async fn load(backend: &Arc<dyn Backend>) -> Self {
        let collections = ContentManager::<Collection>::new(Arc::clone(backend));
        let photosets = ContentManager::<Photoset>::new(Arc::clone(backend));
        let videos = ContentManager::<Video>::new(Arc::clone(backend));

        let (background_image, collections, photosets, videos) = tokio::join!(
            background_image(backend),
            collections.list(),
            photosets.list(),
            videos.list(),
        );

        for (section, result) in [
            ("collections", collections.as_ref().err()),
            ("photosets", photosets.as_ref().err()),
            ("videos", videos.as_ref().err()),
        ] {
            if let Some(e) = result {
                tracing::error!(section, error = %e, "Failed to load site section");
            }
        }

        Self {
            background_image,
            collections,
            photosets,
            videos,
        }
    }
}

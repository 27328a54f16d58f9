//! atelier-site - Bilingual brand website with a content admin
//!
//! This crate serves the public site and the admin panel with:
//! - Content (collections, photosets, videos, settings) kept in a hosted
//!   backend's tables and read over its REST API
//! - Media uploads validated locally and stored in public buckets
//! - Cookie sessions holding the backend-issued admin session
//! - Server-rendered pages in one configured locale (ru or en)

pub mod api;
pub mod auth;
pub mod backend;
pub mod config;
pub mod content;
pub mod i18n;
pub mod media;
pub mod site;
#[cfg(test)]
pub mod testutil;

use std::sync::Arc;

use api::render::{RenderError, Templates};
use auth::AdminPolicy;
use backend::Backend;
use config::Config;

/// Shared application state
pub struct AppState {
    pub config: Config,
    /// Anonymous backend handle; per-request handles act as the signed-in user.
    pub backend: Arc<dyn Backend>,
    pub policy: Arc<dyn AdminPolicy>,
    pub templates: Templates,
}

impl AppState {
    pub fn new(config: Config, backend: Arc<dyn Backend>) -> Result<Self, RenderError> {
        let policy = auth::policy_from_config(&config.site);
        let templates = Templates::new()?;
        Ok(Self {
            config,
            backend,
            policy,
            templates,
        })
    }
}

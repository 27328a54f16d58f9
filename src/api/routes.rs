use axum::{
    extract::{DefaultBodyLimit, Multipart, State},
    routing::get,
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tower_sessions::{MemoryStore, Session, SessionManagerLayer};

use super::handlers::{self, PageParams};
use super::response::AppQuery;
use crate::AppState;

/// Admin pages behind the guard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdminPage {
    Dashboard,
    Collections,
    Photosets,
    Videos,
    Settings,
}

/// Every routed page. Paths match exactly; anything else is the public site.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Login,
    Admin(AdminPage),
}

impl Page {
    pub const ALL: [Page; 6] = [
        Page::Login,
        Page::Admin(AdminPage::Dashboard),
        Page::Admin(AdminPage::Collections),
        Page::Admin(AdminPage::Photosets),
        Page::Admin(AdminPage::Videos),
        Page::Admin(AdminPage::Settings),
    ];

    pub fn path(self) -> &'static str {
        match self {
            Page::Login => "/admin/login",
            Page::Admin(AdminPage::Dashboard) => "/admin",
            Page::Admin(AdminPage::Collections) => "/admin/collections",
            Page::Admin(AdminPage::Photosets) => "/admin/photosets",
            Page::Admin(AdminPage::Videos) => "/admin/videos",
            Page::Admin(AdminPage::Settings) => "/admin/settings",
        }
    }

    pub fn resolve(path: &str) -> Option<Page> {
        Self::ALL.into_iter().find(|page| page.path() == path)
    }
}

impl AdminPage {
    pub fn path(self) -> &'static str {
        Page::Admin(self).path()
    }
}

pub fn create_router(state: Arc<AppState>) -> Router {
    let upload_limit = state.config.max_upload_size as usize;

    let sessions = SessionManagerLayer::new(MemoryStore::default())
        .with_secure(state.config.server.secure_cookies);

    let mut router = Router::new()
        // Public content as JSON
        .route("/api/collections", get(handlers::api_collections))
        .route("/api/photosets", get(handlers::api_photosets))
        .route("/api/videos", get(handlers::api_videos))
        .route("/api/background", get(handlers::api_background))
        // Internal
        .route("/_internal/health", get(handlers::health));

    for page in Page::ALL {
        router = router.route(
            page.path(),
            get(
                move |State(state): State<Arc<AppState>>,
                      session: Session,
                      AppQuery(params): AppQuery<PageParams>| {
                    handlers::show_page(page, state, session, params)
                },
            )
            .post(
                move |State(state): State<Arc<AppState>>,
                      session: Session,
                      multipart: Multipart| {
                    handlers::submit_page(page, state, session, multipart)
                },
            )
            .layer(DefaultBodyLimit::max(upload_limit)),
        );
    }

    router
        .fallback(handlers::public_site)
        .layer(sessions)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

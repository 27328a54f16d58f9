use std::sync::Arc;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Redirect, Response};
use minijinja::context;
use serde::Serialize;
use tower_sessions::Session;

use super::{locale, Admin, PageError};
use crate::api::render::RenderError;
use crate::api::routes::AdminPage;
use crate::api::session;
use crate::auth::{Access, AuthContext};
use crate::backend::Backend;
use crate::content::forms::FormData;
use crate::content::{Collection, ContentManager, Photoset, Record, Video};
use crate::AppState;

#[derive(Debug, Serialize)]
struct DashboardCard {
    href: &'static str,
    label: &'static str,
    /// `None` when the table could not be read.
    count: Option<usize>,
}

/// The guard's view for anything short of [`Access::Granted`].
pub(super) fn guard_page(state: &AppState, access: &Access) -> Result<Response, RenderError> {
    let (status, name) = match access {
        Access::Checking => (StatusCode::OK, "checking"),
        Access::Denied => (StatusCode::UNAUTHORIZED, "denied"),
        Access::Forbidden(user) => {
            tracing::info!(user_id = %user.id, "Signed-in user is not an admin");
            (StatusCode::FORBIDDEN, "forbidden")
        }
        Access::Granted(_) => (StatusCode::OK, "granted"),
    };

    state.templates.page(
        status,
        "guard.html",
        context! { locale => locale(state).code(), access => name },
    )
}

/// Already-signed-in admins skip the form.
pub(super) fn login_page(state: &AppState, ctx: &AuthContext) -> Result<Response, RenderError> {
    if ctx.is_admin() {
        return Ok(Redirect::to(AdminPage::Dashboard.path()).into_response());
    }
    render_login(state, StatusCode::OK, None, "")
}

pub(super) async fn sign_in(
    state: &AppState,
    session: &Session,
    ctx: &AuthContext,
    form: &FormData,
) -> Result<Response, PageError> {
    let email = form.text("email");
    let password = form.text("password");

    let mut changes = ctx.subscribe();
    match ctx.sign_in(&email, &password).await {
        Ok(()) => {
            let auth = changes.borrow_and_update().clone();
            session::persist(session, &auth).await?;
            Ok(Redirect::to(AdminPage::Dashboard.path()).into_response())
        }
        Err(e) => {
            let message = e.localized(locale(state));
            Ok(render_login(
                state,
                StatusCode::UNAUTHORIZED,
                Some(message),
                &email,
            )?)
        }
    }
}

fn render_login(
    state: &AppState,
    status: StatusCode,
    error: Option<String>,
    email: &str,
) -> Result<Response, RenderError> {
    state.templates.page(
        status,
        "login.html",
        context! { locale => locale(state).code(), error => error, email => email },
    )
}

pub(super) async fn dashboard(state: &AppState, admin: &Admin) -> Result<Response, RenderError> {
    let (collections, photosets, videos) = tokio::join!(
        count::<Collection>(&admin.backend),
        count::<Photoset>(&admin.backend),
        count::<Video>(&admin.backend),
    );

    let cards = vec![
        DashboardCard {
            href: AdminPage::Collections.path(),
            label: "admin.collections",
            count: collections,
        },
        DashboardCard {
            href: AdminPage::Photosets.path(),
            label: "admin.photosets",
            count: photosets,
        },
        DashboardCard {
            href: AdminPage::Videos.path(),
            label: "admin.videos",
            count: videos,
        },
    ];

    state.templates.page(
        StatusCode::OK,
        "dashboard.html",
        context! {
            locale => locale(state).code(),
            user_email => admin.user.email.as_deref().unwrap_or(&admin.user.id),
            cards => cards,
        },
    )
}

async fn count<R: Record>(backend: &Arc<dyn Backend>) -> Option<usize> {
    match ContentManager::<R>::new(Arc::clone(backend)).list().await {
        Ok(rows) => Some(rows.len()),
        Err(e) => {
            tracing::warn!(table = R::TABLE, error = %e, "Failed to count rows");
            None
        }
    }
}

/// The dashboard's only action is signing out.
pub(super) async fn submit_dashboard(
    session: &Session,
    ctx: &AuthContext,
    form: &FormData,
) -> Result<Response, PageError> {
    if form.text("action") != "sign-out" {
        return Ok(Redirect::to(AdminPage::Dashboard.path()).into_response());
    }

    ctx.sign_out().await;
    session::persist(session, &ctx.state()).await?;
    Ok(Redirect::to("/").into_response())
}

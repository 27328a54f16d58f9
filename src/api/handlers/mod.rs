mod admin;
mod content;
mod json;
mod public;

use std::sync::Arc;

use axum::extract::multipart::MultipartError;
use axum::extract::Multipart;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Deserialize;
use thiserror::Error;
use tower_sessions::Session;

use crate::api::render::RenderError;
use crate::api::routes::{AdminPage, Page};
use crate::api::session;
use crate::auth::Access;
use crate::backend::{Backend, User};
use crate::content::forms::FormData;
use crate::content::{Collection, Photoset, Video};
use crate::i18n::Locale;
use crate::media::FileUpload;
use crate::AppState;

pub use json::{api_background, api_collections, api_photosets, api_videos, health};
pub use public::public_site;

/// Query parameters understood by admin pages.
#[derive(Debug, Default, Deserialize)]
pub struct PageParams {
    /// Open the form pre-filled with this row.
    pub edit: Option<String>,
    /// Open an empty form.
    pub new: Option<String>,
}

#[derive(Debug, Error)]
pub enum PageError {
    #[error(transparent)]
    Render(#[from] RenderError),
    #[error("invalid form submission: {0}")]
    Form(#[from] MultipartError),
    #[error("session store error: {0}")]
    Session(#[from] tower_sessions::session::Error),
}

impl IntoResponse for PageError {
    fn into_response(self) -> Response {
        match self {
            PageError::Render(e) => e.into_response(),
            PageError::Form(e) => (e.status(), e.body_text()).into_response(),
            PageError::Session(e) => {
                tracing::error!(error = %e, "Session store failed");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
            }
        }
    }
}

/// A signed-in admin and a backend handle acting as them.
pub(crate) struct Admin {
    pub user: User,
    pub backend: Arc<dyn Backend>,
}

fn locale(state: &AppState) -> Locale {
    state.config.site.locale
}

pub async fn show_page(
    page: Page,
    state: Arc<AppState>,
    session: Session,
    params: PageParams,
) -> Result<Response, PageError> {
    let ctx = session::load_context(&state, &session).await;

    let admin_page = match page {
        Page::Login => return Ok(admin::login_page(&state, &ctx)?),
        Page::Admin(admin_page) => admin_page,
    };

    let access = Access::evaluate(&ctx.state());
    let (Access::Granted(user), Some(backend)) = (&access, ctx.authorized_backend()) else {
        return Ok(admin::guard_page(&state, &access)?);
    };
    let admin = Admin {
        user: user.clone(),
        backend,
    };

    let response = match admin_page {
        AdminPage::Dashboard => admin::dashboard(&state, &admin).await?,
        AdminPage::Collections => content::show::<Collection>(&state, &admin, params).await?,
        AdminPage::Photosets => content::show::<Photoset>(&state, &admin, params).await?,
        AdminPage::Videos => content::show::<Video>(&state, &admin, params).await?,
        AdminPage::Settings => content::show_settings(&state, &admin).await?,
    };
    Ok(response)
}

pub async fn submit_page(
    page: Page,
    state: Arc<AppState>,
    session: Session,
    multipart: Multipart,
) -> Result<Response, PageError> {
    let form = read_form(multipart).await?;
    let ctx = session::load_context(&state, &session).await;

    let admin_page = match page {
        Page::Login => return admin::sign_in(&state, &session, &ctx, &form).await,
        Page::Admin(admin_page) => admin_page,
    };

    let access = Access::evaluate(&ctx.state());
    let (Access::Granted(user), Some(backend)) = (&access, ctx.authorized_backend()) else {
        return Ok(admin::guard_page(&state, &access)?);
    };
    let admin = Admin {
        user: user.clone(),
        backend,
    };

    let response = match admin_page {
        AdminPage::Dashboard => admin::submit_dashboard(&session, &ctx, &form).await?,
        AdminPage::Collections => content::submit::<Collection>(&state, &admin, &form).await?,
        AdminPage::Photosets => content::submit::<Photoset>(&state, &admin, &form).await?,
        AdminPage::Videos => content::submit::<Video>(&state, &admin, &form).await?,
        AdminPage::Settings => content::submit_settings(&state, &admin, &form).await?,
    };
    Ok(response)
}

/// Collect a multipart submission. File inputs left empty arrive as parts
/// with no data and are skipped.
async fn read_form(mut multipart: Multipart) -> Result<FormData, MultipartError> {
    let mut form = FormData::new();

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();
        match field.file_name().map(str::to_string) {
            Some(file_name) => {
                let content_type = field.content_type().map(str::to_string);
                let data = field.bytes().await?;
                if data.is_empty() {
                    continue;
                }
                form.push_file(
                    &name,
                    FileUpload::new(&file_name, content_type.as_deref(), data),
                );
            }
            None => {
                let value = field.text().await?;
                form.push_field(&name, value);
            }
        }
    }

    Ok(form)
}

//! Admin list/edit pages for the content tables.

use std::sync::Arc;

use async_trait::async_trait;
use axum::http::StatusCode;
use axum::response::Response;
use minijinja::context;
use serde::Serialize;

use super::{locale, Admin, PageParams};
use crate::api::render::RenderError;
use crate::api::routes::AdminPage;
use crate::content::{
    Category, Collection, CollectionDraft, ContentError, ContentManager, Draft, DraftError,
    FormData, Photoset, PhotosetDraft, Record, Setting, Video, VideoDraft,
};
use crate::i18n::Locale;
use crate::media::{folders, validate_file, Bucket, Gateway, MediaKind, UploadError};
use crate::AppState;

/// A table with an admin page: how its form is read and which uploads feed
/// into the draft.
#[async_trait]
pub(super) trait Managed: Record {
    type Draft: Draft<Record = Self>;

    const PAGE: AdminPage;
    const TEMPLATE: &'static str;
    const HEADING: &'static str;

    fn read_draft(form: &FormData) -> Result<Self::Draft, DraftError>;

    /// Upload any attached files and point the draft at them.
    async fn attach_uploads(
        gateway: &Gateway,
        form: &FormData,
        draft: &mut Self::Draft,
    ) -> Result<(), UploadError>;

    /// Shown in the delete confirmation.
    fn title(&self) -> &str;
}

#[async_trait]
impl Managed for Collection {
    type Draft = CollectionDraft;

    const PAGE: AdminPage = AdminPage::Collections;
    const TEMPLATE: &'static str = "collections.html";
    const HEADING: &'static str = "admin.collections";

    fn read_draft(form: &FormData) -> Result<CollectionDraft, DraftError> {
        Ok(CollectionDraft::from_form(form))
    }

    async fn attach_uploads(
        gateway: &Gateway,
        form: &FormData,
        draft: &mut CollectionDraft,
    ) -> Result<(), UploadError> {
        let stored = gateway
            .upload_batch(
                form.files("image_files"),
                MediaKind::Image,
                Bucket::Images,
                Some(folders::COLLECTIONS),
            )
            .await?;
        draft.images.extend(stored.into_iter().map(|file| file.url));
        Ok(())
    }

    fn title(&self) -> &str {
        &self.title
    }
}

#[async_trait]
impl Managed for Photoset {
    type Draft = PhotosetDraft;

    const PAGE: AdminPage = AdminPage::Photosets;
    const TEMPLATE: &'static str = "photosets.html";
    const HEADING: &'static str = "admin.photosets";

    fn read_draft(form: &FormData) -> Result<PhotosetDraft, DraftError> {
        PhotosetDraft::from_form(form)
    }

    async fn attach_uploads(
        gateway: &Gateway,
        form: &FormData,
        draft: &mut PhotosetDraft,
    ) -> Result<(), UploadError> {
        let stored = gateway
            .upload_batch(
                form.files("image_files"),
                MediaKind::Image,
                Bucket::Images,
                Some(folders::PHOTOSETS),
            )
            .await?;
        draft.images.extend(stored.into_iter().map(|file| file.url));
        Ok(())
    }

    fn title(&self) -> &str {
        &self.title
    }
}

#[async_trait]
impl Managed for Video {
    type Draft = VideoDraft;

    const PAGE: AdminPage = AdminPage::Videos;
    const TEMPLATE: &'static str = "videos.html";
    const HEADING: &'static str = "admin.videos";

    fn read_draft(form: &FormData) -> Result<VideoDraft, DraftError> {
        Ok(VideoDraft::from_form(form))
    }

    /// The video file and its thumbnail upload side by side once both pass
    /// validation.
    async fn attach_uploads(
        gateway: &Gateway,
        form: &FormData,
        draft: &mut VideoDraft,
    ) -> Result<(), UploadError> {
        let video = form.file("video_file");
        let thumbnail = form.file("thumbnail_file");
        if let Some(file) = video {
            validate_file(file, MediaKind::Video)?;
        }
        if let Some(file) = thumbnail {
            validate_file(file, MediaKind::Image)?;
        }

        let (video, thumbnail) = tokio::try_join!(
            async {
                match video {
                    Some(file) => gateway
                        .upload_file(file, Bucket::Videos, Some(folders::VIDEOS))
                        .await
                        .map(Some),
                    None => Ok(None),
                }
            },
            async {
                match thumbnail {
                    Some(file) => gateway
                        .upload_file(file, Bucket::Images, Some(folders::THUMBNAILS))
                        .await
                        .map(Some),
                    None => Ok(None),
                }
            },
        )?;

        if let Some(stored) = video {
            draft.video_path = stored.url;
        }
        if let Some(stored) = thumbnail {
            draft.thumbnail = stored.url;
        }
        Ok(())
    }

    fn title(&self) -> &str {
        &self.title
    }
}

#[derive(Debug, Serialize)]
struct PendingDelete {
    id: String,
    title: String,
}

#[derive(Debug, Serialize)]
struct FormView {
    editing_id: Option<String>,
}

#[derive(Debug, Serialize)]
struct ManagerView<R: Serialize> {
    rows: Vec<R>,
    error: Option<String>,
    /// Offer a reload; set for load failures.
    retry: bool,
    missing_bucket: bool,
    notice: Option<&'static str>,
    confirm_delete: Option<PendingDelete>,
    form: Option<FormView>,
}

impl<R: Serialize> ManagerView<R> {
    fn new(rows: Vec<R>) -> Self {
        Self {
            rows,
            error: None,
            retry: false,
            missing_bucket: false,
            notice: None,
            confirm_delete: None,
            form: None,
        }
    }

    fn failed(rows: Vec<R>, error: &ContentError, locale: Locale) -> Self {
        Self {
            error: Some(error.localized(locale)),
            retry: error.is_fetch(),
            missing_bucket: error.is_missing_bucket(),
            ..Self::new(rows)
        }
    }
}

fn error_status(error: &ContentError) -> StatusCode {
    match error {
        ContentError::Invalid(_) | ContentError::Upload(UploadError::Invalid(_)) => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        ContentError::Upload(UploadError::Timeout) => StatusCode::GATEWAY_TIMEOUT,
        _ => StatusCode::BAD_GATEWAY,
    }
}

pub(super) async fn show<R: Managed>(
    state: &AppState,
    admin: &Admin,
    params: PageParams,
) -> Result<Response, RenderError> {
    let manager = ContentManager::<R>::new(Arc::clone(&admin.backend));
    let mut view = match manager.list().await {
        Ok(rows) => ManagerView::new(rows),
        Err(e) => {
            tracing::error!(table = R::TABLE, error = %e, "Failed to load admin list");
            ManagerView::failed(Vec::new(), &e, locale(state))
        }
    };

    let mut draft = None;
    if let Some(id) = params.edit {
        match view.rows.iter().find(|row| row.id() == id) {
            Some(row) => {
                draft = Some(R::Draft::from_record(row));
                view.form = Some(FormView {
                    editing_id: Some(id),
                });
            }
            None => tracing::debug!(table = R::TABLE, id = %id, "Edit target not in list"),
        }
    } else if params.new.is_some() {
        draft = Some(R::Draft::default());
        view.form = Some(FormView { editing_id: None });
    }

    render::<R>(state, StatusCode::OK, view, draft)
}

pub(super) async fn submit<R: Managed>(
    state: &AppState,
    admin: &Admin,
    form: &FormData,
) -> Result<Response, RenderError> {
    let manager = ContentManager::<R>::new(Arc::clone(&admin.backend));
    match form.text("action").as_str() {
        "delete" => delete::<R>(state, &manager, form).await,
        _ => save::<R>(state, admin, &manager, form).await,
    }
}

/// Upload, write, then show the re-fetched list with the form cleared. On
/// failure the form stays open with what was submitted.
async fn save<R: Managed>(
    state: &AppState,
    admin: &Admin,
    manager: &ContentManager<R>,
    form: &FormData,
) -> Result<Response, RenderError> {
    let editing_id = form.optional("editing_id");

    let mut draft = match R::read_draft(form) {
        Ok(draft) => draft,
        Err(e) => {
            return render_failure::<R>(state, manager, e.into(), editing_id, R::Draft::default())
                .await;
        }
    };

    let gateway = Gateway::new(Arc::clone(&admin.backend));
    let result = match R::attach_uploads(&gateway, form, &mut draft).await {
        Ok(()) => manager.save(editing_id.as_deref(), &draft).await,
        Err(e) => Err(e.into()),
    };

    match result {
        Ok(rows) => {
            tracing::info!(
                table = R::TABLE,
                editing = editing_id.is_some(),
                user_id = %admin.user.id,
                "Saved entry"
            );
            let mut view = ManagerView::new(rows);
            view.notice = Some("form.saved");
            render::<R>(state, StatusCode::OK, view, None)
        }
        Err(e) => render_failure::<R>(state, manager, e, editing_id, draft).await,
    }
}

/// Deleting takes two submissions: the first asks for confirmation, the
/// second (with `confirmed`) removes the row.
async fn delete<R: Managed>(
    state: &AppState,
    manager: &ContentManager<R>,
    form: &FormData,
) -> Result<Response, RenderError> {
    let id = form.text("id");

    if !form.checked("confirmed") {
        let mut view = match manager.list().await {
            Ok(rows) => ManagerView::new(rows),
            Err(e) => ManagerView::failed(Vec::new(), &e, locale(state)),
        };
        view.confirm_delete = view
            .rows
            .iter()
            .find(|row| row.id() == id)
            .map(|row| PendingDelete {
                id: id.clone(),
                title: row.title().to_string(),
            });
        return render::<R>(state, StatusCode::OK, view, None);
    }

    match manager.delete(&id).await {
        Ok(rows) => {
            tracing::info!(table = R::TABLE, id = %id, "Deleted entry");
            let mut view = ManagerView::new(rows);
            view.notice = Some("form.deleted");
            render::<R>(state, StatusCode::OK, view, None)
        }
        Err(e) => {
            tracing::error!(table = R::TABLE, id = %id, error = %e, "Delete failed");
            let rows = manager.list().await.unwrap_or_default();
            let view = ManagerView::failed(rows, &e, locale(state));
            render::<R>(state, error_status(&e), view, None)
        }
    }
}

async fn render_failure<R: Managed>(
    state: &AppState,
    manager: &ContentManager<R>,
    error: ContentError,
    editing_id: Option<String>,
    draft: R::Draft,
) -> Result<Response, RenderError> {
    tracing::warn!(table = R::TABLE, error = %error, "Save rejected");
    let rows = manager.list().await.unwrap_or_default();
    let mut view = ManagerView::failed(rows, &error, locale(state));
    view.retry = false;
    view.form = Some(FormView { editing_id });
    render::<R>(state, error_status(&error), view, Some(draft))
}

fn render<R: Managed>(
    state: &AppState,
    status: StatusCode,
    view: ManagerView<R>,
    draft: Option<R::Draft>,
) -> Result<Response, RenderError> {
    let categories: Vec<&str> = Category::ALL.iter().map(|c| c.as_str()).collect();
    state.templates.page(
        status,
        R::TEMPLATE,
        context! {
            locale => locale(state).code(),
            heading => R::HEADING,
            path => R::PAGE.path(),
            show_add => view.form.is_none(),
            categories => categories,
            draft => draft,
            view => view,
        },
    )
}

pub(super) async fn show_settings(state: &AppState, admin: &Admin) -> Result<Response, RenderError> {
    let manager = ContentManager::<Setting>::new(Arc::clone(&admin.backend));
    match manager.list().await {
        Ok(settings) => render_settings(state, StatusCode::OK, settings, None, None),
        Err(e) => {
            tracing::error!(error = %e, "Failed to load settings");
            render_settings(state, StatusCode::OK, Vec::new(), None, Some(&e))
        }
    }
}

/// Save the background image: an uploaded file wins over a typed URL.
pub(super) async fn submit_settings(
    state: &AppState,
    admin: &Admin,
    form: &FormData,
) -> Result<Response, RenderError> {
    let manager = ContentManager::<Setting>::new(Arc::clone(&admin.backend));

    match save_background(admin, &manager, form).await {
        Ok(settings) => render_settings(state, StatusCode::OK, settings, Some("settings.saved"), None),
        Err(e) => {
            tracing::warn!(error = %e, "Background update rejected");
            let settings = manager.list().await.unwrap_or_default();
            render_settings(state, error_status(&e), settings, None, Some(&e))
        }
    }
}

async fn save_background(
    admin: &Admin,
    manager: &ContentManager<Setting>,
    form: &FormData,
) -> Result<Vec<Setting>, ContentError> {
    let value = match form.file("background_file") {
        Some(file) => {
            validate_file(file, MediaKind::Image).map_err(UploadError::from)?;
            Gateway::new(Arc::clone(&admin.backend))
                .upload_file(file, Bucket::Images, Some(folders::BACKGROUNDS))
                .await?
                .url
        }
        None => form.text("background_image"),
    };
    manager.save_setting(Setting::BACKGROUND_IMAGE, &value).await
}

fn render_settings(
    state: &AppState,
    status: StatusCode,
    settings: Vec<Setting>,
    notice: Option<&'static str>,
    error: Option<&ContentError>,
) -> Result<Response, RenderError> {
    let locale = locale(state);
    let background_image = settings
        .iter()
        .find(|s| s.key == Setting::BACKGROUND_IMAGE)
        .map(|s| s.value.clone())
        .unwrap_or_default();

    state.templates.page(
        status,
        "settings.html",
        context! {
            locale => locale.code(),
            background_image => background_image,
            settings => settings,
            notice => notice,
            error => error.map(|e| e.localized(locale)),
            missing_bucket => error.is_some_and(ContentError::is_missing_bucket),
        },
    )
}

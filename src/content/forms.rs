use std::collections::HashMap;

use serde::Serialize;
use thiserror::Error;

use super::models::{Category, Collection, Photoset, Record, Video};
use crate::i18n::{t, tf, Locale};
use crate::media::FileUpload;

/// Decoded admin form submission: text fields plus attached files, both keyed
/// by field name. Empty file inputs are not recorded.
#[derive(Debug, Clone, Default)]
pub struct FormData {
    fields: HashMap<String, Vec<String>>,
    files: HashMap<String, Vec<FileUpload>>,
}

impl FormData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_field(&mut self, name: &str, value: String) {
        self.fields.entry(name.to_string()).or_default().push(value);
    }

    pub fn push_file(&mut self, name: &str, file: FileUpload) {
        self.files.entry(name.to_string()).or_default().push(file);
    }

    /// Last value of a text field, trimmed. Missing fields read as empty.
    pub fn text(&self, name: &str) -> String {
        self.fields
            .get(name)
            .and_then(|values| values.last())
            .map(|v| v.trim().to_string())
            .unwrap_or_default()
    }

    /// Non-empty value of a text field.
    pub fn optional(&self, name: &str) -> Option<String> {
        Some(self.text(name)).filter(|v| !v.is_empty())
    }

    pub fn checked(&self, name: &str) -> bool {
        matches!(self.text(name).as_str(), "on" | "true" | "1")
    }

    /// Every value of a repeated field plus each line of multi-line values,
    /// with blank entries dropped.
    pub fn lines(&self, name: &str) -> Vec<String> {
        self.fields
            .get(name)
            .map(|values| {
                values
                    .iter()
                    .flat_map(|v| v.lines())
                    .map(str::trim)
                    .filter(|v| !v.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn files(&self, name: &str) -> &[FileUpload] {
        self.files.get(name).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn file(&self, name: &str) -> Option<&FileUpload> {
        self.files(name).first()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DraftError {
    #[error("title is required")]
    TitleRequired,
    #[error("video and thumbnail are required")]
    VideoIncomplete,
    #[error("a background image is required")]
    BackgroundRequired,
    #[error("invalid value for {0}")]
    InvalidField(String),
}

impl DraftError {
    pub fn localized(&self, locale: Locale) -> String {
        match self {
            DraftError::TitleRequired => t(locale, "draft.title_required").to_string(),
            DraftError::VideoIncomplete => t(locale, "draft.video_incomplete").to_string(),
            DraftError::BackgroundRequired => t(locale, "draft.background_required").to_string(),
            DraftError::InvalidField(field) => {
                tf(locale, "draft.invalid_form", &[field.as_str()])
            }
        }
    }
}

/// Editable fields of a record, as held by the shared create/edit form.
pub trait Draft: Serialize + Default + Send + Sync {
    type Record: Record;

    fn from_record(record: &Self::Record) -> Self;

    /// Checks run before writing. `creating` is false when editing.
    fn check(&self, creating: bool) -> Result<(), DraftError>;
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CollectionDraft {
    pub title: String,
    pub description: String,
    pub season: String,
    pub images: Vec<String>,
    pub featured: bool,
}

impl CollectionDraft {
    pub fn from_form(form: &FormData) -> Self {
        Self {
            title: form.text("title"),
            description: form.text("description"),
            season: form.text("season"),
            images: form.lines("images"),
            featured: form.checked("featured"),
        }
    }
}

impl Draft for CollectionDraft {
    type Record = Collection;

    fn from_record(record: &Collection) -> Self {
        Self {
            title: record.title.clone(),
            description: record.description.clone(),
            season: record.season.clone(),
            images: record.images.clone(),
            featured: record.featured,
        }
    }

    fn check(&self, _creating: bool) -> Result<(), DraftError> {
        require_title(&self.title)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PhotosetDraft {
    pub title: String,
    pub description: String,
    pub location: String,
    pub photographer: String,
    pub images: Vec<String>,
    pub category: Category,
}

impl PhotosetDraft {
    pub fn from_form(form: &FormData) -> Result<Self, DraftError> {
        let category = match form.optional("category") {
            Some(value) => Category::parse(&value)
                .ok_or_else(|| DraftError::InvalidField("category".to_string()))?,
            None => Category::default(),
        };

        Ok(Self {
            title: form.text("title"),
            description: form.text("description"),
            location: form.text("location"),
            photographer: form.text("photographer"),
            images: form.lines("images"),
            category,
        })
    }
}

impl Draft for PhotosetDraft {
    type Record = Photoset;

    fn from_record(record: &Photoset) -> Self {
        Self {
            title: record.title.clone(),
            description: record.description.clone(),
            location: record.location.clone(),
            photographer: record.photographer.clone(),
            images: record.images.clone(),
            category: record.category,
        }
    }

    fn check(&self, _creating: bool) -> Result<(), DraftError> {
        require_title(&self.title)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct VideoDraft {
    pub title: String,
    pub description: String,
    pub caption: String,
    pub thumbnail: String,
    pub video_path: String,
    pub redirect_url: String,
}

impl VideoDraft {
    pub fn from_form(form: &FormData) -> Self {
        Self {
            title: form.text("title"),
            description: form.text("description"),
            caption: form.text("caption"),
            thumbnail: form.text("thumbnail"),
            video_path: form.text("video_path"),
            redirect_url: form.text("redirect_url"),
        }
    }
}

impl Draft for VideoDraft {
    type Record = Video;

    fn from_record(record: &Video) -> Self {
        Self {
            title: record.title.clone(),
            description: record.description.clone(),
            caption: record.caption.clone(),
            thumbnail: record.thumbnail.clone(),
            video_path: record.video_path.clone(),
            redirect_url: record.redirect_url.clone(),
        }
    }

    /// A new video needs both media files; edits keep whatever is stored.
    fn check(&self, creating: bool) -> Result<(), DraftError> {
        require_title(&self.title)?;
        if creating && (self.video_path.is_empty() || self.thumbnail.is_empty()) {
            return Err(DraftError::VideoIncomplete);
        }
        Ok(())
    }
}

fn require_title(title: &str) -> Result<(), DraftError> {
    if title.trim().is_empty() {
        Err(DraftError::TitleRequired)
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(pairs: &[(&str, &str)]) -> FormData {
        let mut form = FormData::new();
        for (name, value) in pairs {
            form.push_field(name, value.to_string());
        }
        form
    }

    #[test]
    fn test_collection_draft_drops_blank_images() {
        let draft = CollectionDraft::from_form(&form(&[
            ("title", "  Autumn  "),
            ("images", "https://a/1.jpg\n\n  \nhttps://a/2.jpg"),
            ("images", ""),
            ("featured", "on"),
        ]));
        assert_eq!(draft.title, "Autumn");
        assert_eq!(draft.images, vec!["https://a/1.jpg", "https://a/2.jpg"]);
        assert!(draft.featured);
    }

    #[test]
    fn test_photoset_draft_rejects_unknown_category() {
        let err = PhotosetDraft::from_form(&form(&[("title", "x"), ("category", "street")]))
            .unwrap_err();
        assert_eq!(err, DraftError::InvalidField("category".into()));
    }

    #[test]
    fn test_photoset_draft_defaults_to_editorial() {
        let draft = PhotosetDraft::from_form(&form(&[("title", "x")])).unwrap();
        assert_eq!(draft.category, Category::Editorial);
    }

    #[test]
    fn test_new_video_needs_media() {
        let mut draft = VideoDraft::from_form(&form(&[("title", "Runway")]));
        assert_eq!(draft.check(true), Err(DraftError::VideoIncomplete));
        assert_eq!(draft.check(false), Ok(()));

        draft.video_path = "https://cdn/v.mp4".into();
        draft.thumbnail = "https://cdn/t.jpg".into();
        assert_eq!(draft.check(true), Ok(()));
    }

    #[test]
    fn test_title_is_required() {
        let draft = CollectionDraft::default();
        assert_eq!(draft.check(true), Err(DraftError::TitleRequired));
    }
}

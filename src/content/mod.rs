//! Content tables and the managers that edit them.

pub mod forms;
mod manager;
pub mod models;

pub use forms::{CollectionDraft, Draft, DraftError, FormData, PhotosetDraft, VideoDraft};
pub use manager::{ContentError, ContentManager};
pub use models::{Category, Collection, Photoset, Record, Setting, Video};

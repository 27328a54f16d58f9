use chrono::{DateTime, Utc};
use serde::de::Deserializer;
use serde::{Deserialize, Serialize};

use crate::backend::Query;

/// A row type stored in one of the content tables.
pub trait Record: for<'de> Deserialize<'de> + Serialize + Clone + Send + Sync + 'static {
    const TABLE: &'static str;

    /// Selection used for list views.
    fn list_query() -> Query {
        Query::new().order_by("created_at", false)
    }

    fn id(&self) -> &str;
}

/// Treat `null` columns as the type's default.
fn null_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Categories outside the known set (or `null`) fall back to the default
/// rather than failing the whole list.
fn lenient_category<'de, D>(deserializer: D) -> Result<Category, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(match raw.as_deref().map(Category::parse) {
        Some(Some(category)) => category,
        Some(None) => {
            tracing::warn!(category = ?raw, "Unknown photoset category");
            Category::default()
        }
        None => Category::default(),
    })
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Collection {
    pub id: String,
    #[serde(default, deserialize_with = "null_default")]
    pub title: String,
    #[serde(default, deserialize_with = "null_default")]
    pub description: String,
    #[serde(default, deserialize_with = "null_default")]
    pub season: String,
    #[serde(default, deserialize_with = "null_default")]
    pub images: Vec<String>,
    #[serde(default, deserialize_with = "null_default")]
    pub featured: bool,
    pub created_at: DateTime<Utc>,
}

impl Record for Collection {
    const TABLE: &'static str = "collections";

    fn id(&self) -> &str {
        &self.id
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    #[default]
    Editorial,
    Campaign,
    Lookbook,
}

impl Category {
    pub const ALL: [Category; 3] = [Category::Editorial, Category::Campaign, Category::Lookbook];

    pub fn as_str(self) -> &'static str {
        match self {
            Category::Editorial => "editorial",
            Category::Campaign => "campaign",
            Category::Lookbook => "lookbook",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.as_str() == value)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Photoset {
    pub id: String,
    #[serde(default, deserialize_with = "null_default")]
    pub title: String,
    #[serde(default, deserialize_with = "null_default")]
    pub description: String,
    #[serde(default, deserialize_with = "null_default")]
    pub location: String,
    #[serde(default, deserialize_with = "null_default")]
    pub photographer: String,
    #[serde(default, deserialize_with = "null_default")]
    pub images: Vec<String>,
    #[serde(default, deserialize_with = "lenient_category")]
    pub category: Category,
    pub created_at: DateTime<Utc>,
}

impl Record for Photoset {
    const TABLE: &'static str = "photosets";

    fn id(&self) -> &str {
        &self.id
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Video {
    pub id: String,
    #[serde(default, deserialize_with = "null_default")]
    pub title: String,
    #[serde(default, deserialize_with = "null_default")]
    pub description: String,
    #[serde(default, deserialize_with = "null_default")]
    pub caption: String,
    #[serde(default, deserialize_with = "null_default")]
    pub thumbnail: String,
    #[serde(default, deserialize_with = "null_default")]
    pub video_path: String,
    /// Where a click on the tile sends the visitor.
    #[serde(default, deserialize_with = "null_default")]
    pub redirect_url: String,
    pub created_at: DateTime<Utc>,
}

impl Record for Video {
    const TABLE: &'static str = "videos";

    fn id(&self) -> &str {
        &self.id
    }
}

/// Generic key/value row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Setting {
    pub id: String,
    pub key: String,
    #[serde(default, deserialize_with = "null_default")]
    pub value: String,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Setting {
    pub const BACKGROUND_IMAGE: &'static str = "background_image";
}

impl Record for Setting {
    const TABLE: &'static str = "settings";

    fn list_query() -> Query {
        Query::new().order_by("key", true)
    }

    fn id(&self) -> &str {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_collection_tolerates_null_columns() {
        let collection: Collection = serde_json::from_value(json!({
            "id": "c1",
            "title": "Spring",
            "description": null,
            "season": "SS25",
            "images": null,
            "featured": null,
            "created_at": "2025-03-01T10:00:00.123456+00:00"
        }))
        .unwrap();
        assert_eq!(collection.description, "");
        assert!(collection.images.is_empty());
        assert!(!collection.featured);
    }

    #[test]
    fn test_photoset_tolerates_odd_category_and_title() {
        let photosets: Vec<Photoset> = serde_json::from_value(json!([
            {"id": "p1", "title": null, "category": null, "created_at": "2025-01-01T10:00:00Z"},
            {"id": "p2", "title": "Night", "category": "backstage", "created_at": "2025-01-02T10:00:00Z"},
            {"id": "p3", "category": "lookbook", "created_at": "2025-01-03T10:00:00Z"}
        ]))
        .unwrap();
        assert_eq!(photosets[0].title, "");
        assert_eq!(photosets[0].category, Category::Editorial);
        assert_eq!(photosets[1].category, Category::Editorial);
        assert_eq!(photosets[2].category, Category::Lookbook);
        assert_eq!(photosets[2].title, "");
    }

    #[test]
    fn test_category_wire_format() {
        assert_eq!(serde_json::to_value(Category::Lookbook).unwrap(), json!("lookbook"));
        assert_eq!(Category::parse("campaign"), Some(Category::Campaign));
        assert_eq!(Category::parse("all"), None);
    }

    #[test]
    fn test_video_optional_fields_default_empty() {
        let video: Video = serde_json::from_value(json!({
            "id": "v1",
            "title": "Runway",
            "video_path": "https://cdn/v.mp4",
            "created_at": "2025-03-01T10:00:00Z"
        }))
        .unwrap();
        assert_eq!(video.thumbnail, "");
        assert_eq!(video.redirect_url, "");
    }

    #[test]
    fn test_settings_list_by_key() {
        let query = Setting::list_query();
        let order = query.order.unwrap();
        assert_eq!(order.column, "key");
        assert!(order.ascending);
    }
}

use std::fmt;

/// Label the backend assigns to photos that were never categorised.
pub const DEFAULT_CATEGORY: &str = "Non catégorisé";

pub type CategoryLabel = String;

/// Photo identifiers are integers on some backends and opaque strings on others.
#[derive(Clone, Debug, PartialEq, Eq, Hash, serde::Deserialize, serde::Serialize)]
#[serde(untagged)]
pub enum PhotoId {
    Number(i64),
    Text(String),
}

impl PhotoId {
    /// Compares against user input, where numeric and textual ids look the same.
    pub fn matches(&self, raw: &str) -> bool {
        match self {
            PhotoId::Number(n) => raw.trim().parse::<i64>().map_or(false, |r| r == *n),
            PhotoId::Text(s) => s == raw.trim(),
        }
    }
}

impl fmt::Display for PhotoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PhotoId::Number(n) => write!(f, "{}", n),
            PhotoId::Text(s) => write!(f, "{}", s),
        }
    }
}

#[derive(Clone, Debug, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(from = "RawPhotoRecord")]
pub struct PhotoRecord {
    pub id: PhotoId,
    pub url: String,
    pub title: Option<String>,
    pub description: Option<String>,
    pub categories: Vec<CategoryLabel>,
}

impl PhotoRecord {
    /// Records without a url cannot be drawn and are skipped by the grid.
    pub fn has_image(&self) -> bool {
        !self.url.trim().is_empty()
    }

    pub fn in_category(&self, category: &str) -> bool {
        self.categories.iter().any(|c| c == category)
    }
}

#[derive(serde::Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

impl OneOrMany {
    fn into_labels(self) -> Vec<CategoryLabel> {
        let labels = match self {
            OneOrMany::One(label) => vec![label],
            OneOrMany::Many(labels) => labels,
        };
        labels.into_iter().filter(|l| !l.is_empty()).collect()
    }
}

// Older records carry a single `category` next to (or instead of) `categories`.
#[derive(serde::Deserialize)]
struct RawPhotoRecord {
    id: PhotoId,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    categories: Option<OneOrMany>,
    #[serde(default)]
    category: Option<OneOrMany>,
}

impl From<RawPhotoRecord> for PhotoRecord {
    fn from(raw: RawPhotoRecord) -> Self {
        // An explicit `categories` list is kept as sent, even when empty.
        let categories = match (raw.categories, raw.category) {
            (Some(categories), _) => categories.into_labels(),
            (None, legacy) => {
                let labels = legacy.map(OneOrMany::into_labels).unwrap_or_default();
                if labels.is_empty() {
                    vec![DEFAULT_CATEGORY.to_string()]
                } else {
                    labels
                }
            },
        };

        PhotoRecord {
            id: raw.id,
            url: raw.url.unwrap_or_default(),
            title: raw.title,
            description: raw.description,
            categories,
        }
    }
}

/// One element of a gallery listing. Elements that are not photo records
/// decode as `Malformed` so the rest of the listing survives.
#[derive(Debug, serde::Deserialize)]
#[serde(untagged)]
pub enum GalleryEntry {
    Photo(PhotoRecord),
    Malformed(serde::de::IgnoredAny),
}

#[derive(Debug, Default, serde::Deserialize, serde::Serialize)]
pub struct GalleryQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<CategoryLabel>,
}

use vitrine_api_structs::{PhotoId, PhotoRecord};

pub mod store;

pub use store::{Applied, FetchTicket, GalleryStore};

/// Photos as last returned by the server, oldest first.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GallerySnapshot {
    photos: Vec<PhotoRecord>,
}

impl GallerySnapshot {
    pub fn new(photos: Vec<PhotoRecord>) -> Self {
        GallerySnapshot { photos }
    }

    pub fn photos(&self) -> &[PhotoRecord] {
        &self.photos
    }

    pub fn len(&self) -> usize {
        self.photos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.photos.is_empty()
    }

    pub fn find(&self, id: &PhotoId) -> Option<&PhotoRecord> {
        self.photos.iter().find(|p| &p.id == id)
    }

    /// The `n` newest photos, newest first.
    pub fn most_recent(&self, n: usize) -> Vec<PhotoRecord> {
        let start = self.photos.len().saturating_sub(n);
        self.photos[start..].iter().rev().cloned().collect()
    }
}

impl From<Vec<PhotoRecord>> for GallerySnapshot {
    fn from(photos: Vec<PhotoRecord>) -> Self {
        GallerySnapshot::new(photos)
    }
}

/// Keeps the photos whose title contains `query`, ignoring case.
///
/// A blank query keeps everything. The query is otherwise matched as typed.
pub fn filter_by_text(snapshot: &GallerySnapshot, query: &str) -> GallerySnapshot {
    if query.trim().is_empty() {
        return snapshot.clone();
    }

    let needle = query.to_lowercase();
    snapshot
        .photos
        .iter()
        .filter(|photo| {
            photo
                .title
                .as_deref()
                .unwrap_or("")
                .to_lowercase()
                .contains(&needle)
        })
        .cloned()
        .collect::<Vec<_>>()
        .into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::testing::{photo, photos};

    fn mixed() -> GallerySnapshot {
        vec![
            photo(1, Some("Sunset over Lyon")),
            photo(2, None),
            photo(3, Some("SUNRISE")),
            photo(4, Some("")),
            photo(5, Some("Harbour at dusk")),
        ]
        .into()
    }

    #[test]
    fn blank_query_returns_input_unchanged() {
        let snapshot = mixed();
        assert_eq!(filter_by_text(&snapshot, ""), snapshot);
        assert_eq!(filter_by_text(&snapshot, "   \t"), snapshot);
    }

    #[test]
    fn matches_titles_case_insensitively() {
        let filtered = filter_by_text(&mixed(), "sUn");
        let ids: Vec<_> = filtered.photos().iter().map(|p| p.id.clone()).collect();
        assert_eq!(ids, vec![PhotoId::Number(1), PhotoId::Number(3)]);
    }

    #[test]
    fn results_contain_query_and_come_from_input() {
        let snapshot = mixed();
        for query in &["s", "at", " dusk", "o", "zzz", "Lyon"] {
            let filtered = filter_by_text(&snapshot, query);
            for p in filtered.photos() {
                let title = p.title.as_deref().unwrap_or("").to_lowercase();
                assert!(title.contains(&query.to_lowercase()));
                assert!(snapshot.photos().contains(p));
            }
        }
    }

    #[test]
    fn filtering_is_idempotent_and_pure() {
        let snapshot = mixed();
        let before = snapshot.clone();
        let once = filter_by_text(&snapshot, "sun");
        let twice = filter_by_text(&once, "sun");

        assert_eq!(once, twice);
        assert_eq!(snapshot, before);
    }

    #[test]
    fn most_recent_takes_reversed_suffix() {
        let snapshot: GallerySnapshot = photos(8).into();
        let recent = snapshot.most_recent(6);

        assert_eq!(recent.len(), 6);
        assert_eq!(recent[0].id, PhotoId::Number(8));
        assert_eq!(recent[5].id, PhotoId::Number(3));

        let small: GallerySnapshot = photos(2).into();
        assert_eq!(small.most_recent(6).len(), 2);
        assert!(GallerySnapshot::default().most_recent(6).is_empty());
    }
}

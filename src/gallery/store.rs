use tracing::{debug, info, instrument, warn};

use super::GallerySnapshot;
use crate::api::{GalleryApi, NetworkError};
use vitrine_api_structs::CategoryLabel;

/// Identifies one gallery request. Only the newest ticket may update the store.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FetchTicket {
    generation: u64,
    category: Option<CategoryLabel>,
}

impl FetchTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn category(&self) -> Option<&str> {
        self.category.as_deref()
    }
}

/// What happened when a fetch result was handed back to the store.
#[derive(Debug, PartialEq)]
pub enum Applied<'a> {
    Replaced(&'a GallerySnapshot),
    Failed(NetworkError),
    /// A newer request was issued since; the result was dropped.
    Stale,
}

#[derive(Debug, Default)]
pub struct GalleryStore {
    snapshot: Option<GallerySnapshot>,
    generation: u64,
}

impl GalleryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// The most recently completed snapshot, if any fetch has succeeded yet.
    pub fn snapshot(&self) -> Option<&GallerySnapshot> {
        self.snapshot.as_ref()
    }

    pub fn request(&mut self, category: Option<CategoryLabel>) -> FetchTicket {
        self.generation += 1;
        debug!(generation = self.generation, ?category, "gallery request issued");
        FetchTicket {
            generation: self.generation,
            category: category.filter(|c| !c.is_empty()),
        }
    }

    pub fn is_latest(&self, ticket: &FetchTicket) -> bool {
        ticket.generation == self.generation
    }

    pub fn complete(
        &mut self,
        ticket: &FetchTicket,
        result: Result<GallerySnapshot, NetworkError>,
    ) -> Applied<'_> {
        if !self.is_latest(ticket) {
            debug!(
                generation = ticket.generation,
                latest = self.generation,
                "dropping stale gallery response"
            );
            return Applied::Stale;
        }

        match result {
            Ok(snapshot) => {
                info!(
                    photos = snapshot.len(),
                    category = ?ticket.category,
                    "gallery snapshot replaced"
                );
                Applied::Replaced(self.snapshot.insert(snapshot))
            },
            Err(err) => {
                warn!(%err, "gallery fetch failed, keeping previous snapshot");
                Applied::Failed(err)
            },
        }
    }

    #[instrument(skip(api))]
    pub async fn fetch_categories(api: &dyn GalleryApi) -> Result<Vec<CategoryLabel>, NetworkError> {
        let categories = api.get_categories().await?;
        debug!(count = categories.len(), "categories fetched");
        Ok(categories)
    }

    #[instrument(skip(api))]
    pub async fn fetch_gallery(
        api: &dyn GalleryApi,
        ticket: &FetchTicket,
    ) -> Result<GallerySnapshot, NetworkError> {
        let photos = api.get_gallery(ticket.category()).await?;
        Ok(photos.into())
    }

    /// Issues a request and applies its result in one go.
    pub async fn refresh(
        &mut self,
        api: &dyn GalleryApi,
        category: Option<CategoryLabel>,
    ) -> Result<&GallerySnapshot, NetworkError> {
        let ticket = self.request(category);
        let result = Self::fetch_gallery(api, &ticket).await;
        match self.complete(&ticket, result) {
            Applied::Replaced(snapshot) => Ok(snapshot),
            Applied::Failed(err) => Err(err),
            Applied::Stale => unreachable!("no request can be issued while refresh holds the store"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::testing::{offline, photos, CannedApi};

    #[test]
    fn later_request_wins_over_late_response() {
        let mut store = GalleryStore::new();
        let first = store.request(Some("Paysage".into()));
        let second = store.request(Some("Portrait".into()));

        let newer = GallerySnapshot::new(photos(2));
        assert_eq!(
            store.complete(&second, Ok(newer.clone())),
            Applied::Replaced(&newer)
        );
        assert_eq!(store.complete(&first, Ok(photos(5).into())), Applied::Stale);
        assert_eq!(store.snapshot(), Some(&newer));
    }

    #[test]
    fn stale_response_is_dropped_even_when_it_arrives_first() {
        let mut store = GalleryStore::new();
        let first = store.request(None);
        let second = store.request(Some("Portrait".into()));

        assert_eq!(store.complete(&first, Ok(photos(5).into())), Applied::Stale);
        assert_eq!(store.snapshot(), None);

        store.complete(&second, Ok(photos(1).into()));
        assert_eq!(store.snapshot().map(GallerySnapshot::len), Some(1));
    }

    #[test]
    fn failure_keeps_previous_snapshot() {
        let mut store = GalleryStore::new();
        let ticket = store.request(None);
        store.complete(&ticket, Ok(photos(3).into()));

        let ticket = store.request(Some("Nature".into()));
        assert_eq!(store.complete(&ticket, Err(offline())), Applied::Failed(offline()));
        assert_eq!(store.snapshot().map(GallerySnapshot::len), Some(3));
    }

    #[test]
    fn empty_category_means_full_list() {
        let mut store = GalleryStore::new();
        assert_eq!(store.request(Some(String::new())).category(), None);
        assert_eq!(store.request(Some("Nature".into())).category(), Some("Nature"));
    }

    #[async_std::test]
    async fn refresh_fetches_requested_category() {
        let api = CannedApi::default().with_gallery(Ok(photos(4)));
        let mut store = GalleryStore::new();

        let snapshot = store.refresh(&api, Some("Nature".into())).await.unwrap();
        assert_eq!(snapshot.len(), 4);
        assert_eq!(*api.requested.lock().unwrap(), vec![Some("Nature".to_string())]);
    }

    #[async_std::test]
    async fn fetch_errors_are_returned_not_raised() {
        let api = CannedApi::default();
        assert!(GalleryStore::fetch_categories(&api).await.is_err());

        let mut store = GalleryStore::new();
        assert_eq!(store.refresh(&api, None).await, Err(offline()));
        assert_eq!(store.snapshot(), None);
    }
}

use serde::de::DeserializeOwned;
use tracing::{debug, instrument, warn};
use url::Url;

use super::{GalleryApi, NetworkError};
use vitrine_api_structs::{CategoryLabel, GalleryEntry, GalleryQuery, PhotoRecord};

/// `GalleryApi` backed by the gallery's JSON endpoints.
#[derive(Clone, Debug)]
pub struct HttpGalleryApi {
    client: surf::Client,
    base_url: Url,
}

impl HttpGalleryApi {
    pub fn new(endpoint: &str) -> Result<Self, NetworkError> {
        let mut base_url = Url::parse(endpoint)?;
        // `Url::join` replaces the last path segment unless the path ends in a slash.
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        Ok(HttpGalleryApi {
            client: surf::Client::new(),
            base_url,
        })
    }

    pub fn categories_url(&self) -> Result<Url, NetworkError> {
        Ok(self.base_url.join("categories")?)
    }

    pub fn gallery_url(&self, category: Option<&str>) -> Result<Url, NetworkError> {
        let mut url = self.base_url.join("gallery")?;

        let query = GalleryQuery {
            category: category
                .filter(|c| !c.is_empty())
                .map(str::to_string),
        };
        let qs = serde_qs::to_string(&query).map_err(|e| NetworkError::Query(e.to_string()))?;
        if !qs.is_empty() {
            url.set_query(Some(&qs));
        }

        Ok(url)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, NetworkError> {
        let mut res = self
            .client
            .get(url.as_str())
            .await
            .map_err(|e| NetworkError::Transport {
                url: url.to_string(),
                reason: e.to_string(),
            })?;

        let status = res.status();
        debug!(%url, status = u16::from(status), "gallery API responded");
        if !status.is_success() {
            return Err(NetworkError::Status {
                url: url.to_string(),
                status: status.into(),
            });
        }

        res.body_json().await.map_err(|e| NetworkError::Decode {
            url: url.to_string(),
            reason: e.to_string(),
        })
    }
}

#[async_trait::async_trait]
impl GalleryApi for HttpGalleryApi {
    #[instrument(skip(self))]
    async fn get_categories(&self) -> Result<Vec<CategoryLabel>, NetworkError> {
        let url = self.categories_url()?;
        self.get_json(url).await
    }

    #[instrument(skip(self))]
    async fn get_gallery(
        &self,
        category: Option<&str>,
    ) -> Result<Vec<PhotoRecord>, NetworkError> {
        let url = self.gallery_url(category)?;
        let entries: Vec<GalleryEntry> = self.get_json(url).await?;
        Ok(keep_photos(entries))
    }
}

/// Drops listing elements that are not valid photo records.
fn keep_photos(entries: Vec<GalleryEntry>) -> Vec<PhotoRecord> {
    let total = entries.len();
    let photos: Vec<_> = entries
        .into_iter()
        .filter_map(|entry| match entry {
            GalleryEntry::Photo(photo) => Some(photo),
            GalleryEntry::Malformed(_) => None,
        })
        .collect();

    if photos.len() < total {
        warn!(skipped = total - photos.len(), "ignoring malformed gallery entries");
    }
    photos
}

use thiserror::Error;

use vitrine_api_structs::{CategoryLabel, PhotoRecord};

pub mod http;

pub use http::HttpGalleryApi;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum NetworkError {
    #[error("request to {url} failed: {reason}")]
    Transport { url: String, reason: String },
    #[error("{url} responded with status {status}")]
    Status { url: String, status: u16 },
    #[error("could not decode response from {url}: {reason}")]
    Decode { url: String, reason: String },
    #[error("invalid endpoint url: {0}")]
    Url(#[from] url::ParseError),
    #[error("could not encode query string: {0}")]
    Query(String),
}

/// Read side of the gallery backend.
#[async_trait::async_trait]
pub trait GalleryApi: Send + Sync {
    async fn get_categories(&self) -> Result<Vec<CategoryLabel>, NetworkError>;

    /// Lists photos oldest first, restricted to `category` when given.
    async fn get_gallery(&self, category: Option<&str>)
        -> Result<Vec<PhotoRecord>, NetworkError>;
}

#[cfg(test)]
pub(crate) mod testing {
    use std::collections::VecDeque;
    use std::sync::Mutex;

    use vitrine_api_structs::{PhotoId, PhotoRecord};

    use super::{GalleryApi, NetworkError};

    pub(crate) fn photo(id: i64, title: Option<&str>) -> PhotoRecord {
        PhotoRecord {
            id: PhotoId::Number(id),
            url: format!("https://media.example/{}.jpg", id),
            title: title.map(str::to_string),
            description: None,
            categories: Vec::new(),
        }
    }

    pub(crate) fn photos(n: i64) -> Vec<PhotoRecord> {
        (1..=n).map(|i| photo(i, Some(&format!("photo {}", i)))).collect()
    }

    /// Serves canned responses in order and records what was asked for.
    #[derive(Default)]
    pub(crate) struct CannedApi {
        pub categories: Mutex<VecDeque<Result<Vec<String>, NetworkError>>>,
        pub galleries: Mutex<VecDeque<Result<Vec<PhotoRecord>, NetworkError>>>,
        pub requested: Mutex<Vec<Option<String>>>,
    }

    impl CannedApi {
        pub(crate) fn with_gallery(self, gallery: Result<Vec<PhotoRecord>, NetworkError>) -> Self {
            self.galleries.lock().unwrap().push_back(gallery);
            self
        }

        pub(crate) fn with_categories(self, categories: Result<Vec<String>, NetworkError>) -> Self {
            self.categories.lock().unwrap().push_back(categories);
            self
        }
    }

    pub(crate) fn offline() -> NetworkError {
        NetworkError::Transport {
            url: "http://gallery.test/gallery".into(),
            reason: "connection refused".into(),
        }
    }

    #[async_trait::async_trait]
    impl GalleryApi for CannedApi {
        async fn get_categories(&self) -> Result<Vec<String>, NetworkError> {
            self.categories
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(offline()))
        }

        async fn get_gallery(
            &self,
            category: Option<&str>,
        ) -> Result<Vec<PhotoRecord>, NetworkError> {
            self.requested
                .lock()
                .unwrap()
                .push(category.map(str::to_string));
            self.galleries
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(offline()))
        }
    }
}

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use shared::{
    error::GalleryError,
    protocol::{decode_user_images, ImageRecord, UserImagesQuery, USER_IMAGES_PATH},
};
use tracing::debug;

/// Remote source of a user's captured images.
#[async_trait]
pub trait GalleryService: Send + Sync {
    async fn fetch_user_images(&self, user_id: &str) -> Result<Vec<ImageRecord>, GalleryError>;
}

pub struct MissingGalleryService;

#[async_trait]
impl GalleryService for MissingGalleryService {
    async fn fetch_user_images(&self, _user_id: &str) -> Result<Vec<ImageRecord>, GalleryError> {
        Err(GalleryError::Transport(
            "gallery service is unavailable".to_string(),
        ))
    }
}

pub struct HttpGalleryService {
    http: Client,
    base_url: String,
}

impl HttpGalleryService {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_timeout(
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, GalleryError> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| GalleryError::Transport(err.to_string()))?;
        Ok(Self::with_client(http, base_url))
    }

    pub fn with_client(http: Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { http, base_url }
    }

    pub fn endpoint(&self) -> String {
        format!("{}{USER_IMAGES_PATH}", self.base_url)
    }
}

#[async_trait]
impl GalleryService for HttpGalleryService {
    async fn fetch_user_images(&self, user_id: &str) -> Result<Vec<ImageRecord>, GalleryError> {
        let endpoint = self.endpoint();
        debug!(%endpoint, user_id, "requesting user images");

        let response = self
            .http
            .get(&endpoint)
            .query(&UserImagesQuery { user_id })
            .send()
            .await
            .map_err(|err| GalleryError::Transport(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(GalleryError::Status(status.as_u16()));
        }

        let body = response
            .bytes()
            .await
            .map_err(|err| GalleryError::Transport(err.to_string()))?;
        decode_user_images(&body)
    }
}

#[cfg(test)]
#[path = "tests/service_tests.rs"]
mod tests;

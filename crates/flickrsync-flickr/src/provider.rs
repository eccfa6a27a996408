//! FlickrGateway - IRemoteGateway implementation for the Flickr API
//!
//! Wraps the [`FlickrClient`] to fulfil the [`IRemoteGateway`] port contract.
//!
//! ## Design Notes
//!
//! - Uploads are retried exactly once, after a fixed back-off, when the
//!   failure is transient (Flickr's upload endpoint intermittently answers
//!   HTTP 500). Nothing else is retried.
//! - Flickr error 3 from `flickr.photosets.addPhoto` ("Photo already in set")
//!   is reported as [`AlbumMembership::AlreadyMember`], not as an error.

use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::{debug, info, instrument, warn};

use flickrsync_core::config::FlickrConfig;
use flickrsync_core::domain::{AlbumId, AlbumMembership, PhotoId, PhotoPath};
use flickrsync_core::ports::IRemoteGateway;

use crate::client::FlickrClient;
use crate::oauth::{ConsumerCredentials, OAuthToken};
use crate::rate_limit::RequestPacer;
use crate::{FlickrError, PHOTO_ALREADY_IN_SET};

/// Default back-off before retrying a failed upload
const DEFAULT_UPLOAD_RETRY_DELAY: Duration = Duration::from_secs(20);

// ============================================================================
// Flickr API response types
// ============================================================================

/// Reply of `flickr.photosets.create`
#[derive(Debug, Deserialize)]
struct CreatePhotosetResponse {
    photoset: PhotosetRef,
}

#[derive(Debug, Deserialize)]
struct PhotosetRef {
    id: String,
}

// ============================================================================
// FlickrGateway
// ============================================================================

/// Flickr implementation of the remote gateway port
pub struct FlickrGateway {
    client: FlickrClient,
    upload_tags: Vec<String>,
    upload_retry_delay: Duration,
}

impl FlickrGateway {
    /// Creates a gateway around an already configured client
    pub fn new(client: FlickrClient) -> Self {
        Self {
            client,
            upload_tags: Vec::new(),
            upload_retry_delay: DEFAULT_UPLOAD_RETRY_DELAY,
        }
    }

    /// Builds a gateway from the `flickr` config section and an access token
    pub fn from_config(config: &FlickrConfig, token: OAuthToken) -> Self {
        let consumer = ConsumerCredentials::new(&config.api_key, &config.api_secret);
        let client = FlickrClient::new(consumer, token)
            .with_pacer(RequestPacer::from_millis(config.request_delay_ms));

        Self::new(client)
            .with_upload_tags(config.upload_tags.clone())
            .with_upload_retry_delay(Duration::from_secs(config.upload_retry_delay_secs))
    }

    /// Sets the tags attached to every upload
    pub fn with_upload_tags(mut self, tags: Vec<String>) -> Self {
        self.upload_tags = tags;
        self
    }

    /// Sets the back-off before the single upload retry
    pub fn with_upload_retry_delay(mut self, delay: Duration) -> Self {
        self.upload_retry_delay = delay;
        self
    }

    /// Returns a reference to the underlying client
    pub fn client(&self) -> &FlickrClient {
        &self.client
    }
}

#[async_trait::async_trait]
impl IRemoteGateway for FlickrGateway {
    #[instrument(skip(self), fields(path = %path))]
    async fn upload_photo(&self, path: &PhotoPath) -> Result<PhotoId> {
        let raw_id = match self.client.upload(path.as_path(), &self.upload_tags).await {
            Ok(id) => id,
            Err(e) if e.is_transient() => {
                warn!(
                    error = %e,
                    retry_in_secs = self.upload_retry_delay.as_secs(),
                    "Upload failed with a transient error, retrying once"
                );
                tokio::time::sleep(self.upload_retry_delay).await;
                self.client
                    .upload(path.as_path(), &self.upload_tags)
                    .await
                    .with_context(|| format!("Failed to upload {path} (after one retry)"))?
            }
            Err(e) => return Err(e).with_context(|| format!("Failed to upload {path}")),
        };

        let photo_id = PhotoId::new(raw_id)
            .with_context(|| format!("Flickr returned an invalid photo id for {path}"))?;
        info!(photo_id = %photo_id, "Photo uploaded");
        Ok(photo_id)
    }

    #[instrument(skip(self), fields(photo_id = %photo_id))]
    async fn delete_photo(&self, photo_id: &PhotoId) -> Result<()> {
        self.client
            .call("flickr.photos.delete", &[("photo_id", photo_id.as_str())])
            .await
            .with_context(|| format!("Failed to delete photo {photo_id}"))?;

        debug!("Photo deleted");
        Ok(())
    }

    #[instrument(skip(self), fields(album = %name, primary_photo = %primary_photo))]
    async fn create_album(&self, name: &str, primary_photo: &PhotoId) -> Result<AlbumId> {
        let reply = self
            .client
            .call(
                "flickr.photosets.create",
                &[("title", name), ("primary_photo_id", primary_photo.as_str())],
            )
            .await
            .with_context(|| format!("Failed to create album '{name}'"))?;

        let created: CreatePhotosetResponse = serde_json::from_value(reply)
            .with_context(|| format!("Unexpected reply creating album '{name}'"))?;
        let album_id = AlbumId::new(created.photoset.id)
            .with_context(|| format!("Flickr returned an invalid album id for '{name}'"))?;

        info!(album_id = %album_id, "Album created");
        Ok(album_id)
    }

    #[instrument(skip(self), fields(photo_id = %photo_id, album_id = %album_id))]
    async fn add_to_album(&self, photo_id: &PhotoId, album_id: &AlbumId) -> Result<AlbumMembership> {
        let result = self
            .client
            .call(
                "flickr.photosets.addPhoto",
                &[
                    ("photoset_id", album_id.as_str()),
                    ("photo_id", photo_id.as_str()),
                ],
            )
            .await;

        match result {
            Ok(_) => {
                debug!("Photo added to album");
                Ok(AlbumMembership::Added)
            }
            Err(FlickrError::Api { code, message }) if code == PHOTO_ALREADY_IN_SET => {
                debug!(%message, "Photo already in album");
                Ok(AlbumMembership::AlreadyMember)
            }
            Err(e) => Err(e)
                .with_context(|| format!("Failed to add photo {photo_id} to album {album_id}")),
        }
    }
}

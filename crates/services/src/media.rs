//! Media uploads and retrieval.

use bytes::Bytes;
use domains::{AppError, ImageId, Result};
use tracing::{info, instrument};

use crate::MicroblogService;

impl MicroblogService {
    /// Stores the bytes in the media store, then records a detached image
    /// pointing at them. If the row insert fails the blob stays behind as an
    /// orphan.
    #[instrument(skip(self, data), fields(size = data.len()))]
    pub async fn attach_media(&self, data: Bytes, filename: &str) -> Result<ImageId> {
        if data.is_empty() {
            return Err(AppError::ValidationError("uploaded file is empty".into()));
        }

        let name = self.media.save_upload(data, filename).await?;
        let url = self.media.url_for(&name);

        let mut tx = self.store.begin_write().await?;
        let image_id = tx.insert_image(&url).await?;
        tx.commit().await?;

        info!(image_id, %url, "media stored");
        Ok(image_id)
    }

    /// Reads back the bytes of a stored upload by its public name.
    #[instrument(skip(self))]
    pub async fn fetch_media(&self, name: &str) -> Result<Bytes> {
        self.media
            .load(name)
            .await?
            .ok_or_else(|| AppError::not_found("Image", name))
    }
}

//! Asynchronous collaborator seams
//!
//! Image loading and selection persistence are the only suspension points.
//! Both are invoked from spawned tasks; their failures are converted to
//! degraded state by the caller and never reach the host's event loop.

use crate::error::{PersistError, ThumbnailError};
use crate::types::{ImageRef, Raster, SelectionUpdateRequest, SelectionUpdateResponse};
use async_trait::async_trait;

/// Fetches and decodes thumbnails
#[async_trait]
pub trait ImageLoader: Send + Sync {
    /// Load one image
    ///
    /// # Errors
    /// `ThumbnailError` when the image cannot be fetched or decoded
    async fn load(&self, image: &ImageRef) -> Result<Raster, ThumbnailError>;
}

/// Authoritative selection store
#[async_trait]
pub trait SelectionBackend: Send + Sync {
    /// Persist a pending selection
    ///
    /// The response may carry a sanitized selection that overrides the one
    /// sent.
    ///
    /// # Errors
    /// `PersistError` on transport, status or decoding failures
    async fn update_selection(
        &self,
        request: SelectionUpdateRequest,
    ) -> Result<SelectionUpdateResponse, PersistError>;
}

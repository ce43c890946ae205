use async_trait::async_trait;
use bytes::Bytes;
use std::sync::Arc;
use tokio::sync::mpsc;

use super::errors::FileTransferError;
use crate::ids::ResourceKey;

/// Byte-progress events for a single upload, as a percentage 0–100.
pub type ProgressSender = mpsc::UnboundedSender<u8>;

/// Raw bytes of a fetched resource plus the content type the server
/// reported, if any.
#[derive(Debug, Clone)]
pub struct FetchedResource {
    pub bytes: Bytes,
    pub content_type: Option<String>,
}

/// A locally stored file queued for upload.
#[derive(Debug, Clone)]
pub struct LocalFile {
    /// Local URI (filesystem path on desktop).
    pub uri: String,
    pub file_name: String,
    pub content_type: String,
}

#[async_trait]
pub trait FileTransferPort: Send + Sync {
    /// Fetch the binary content of a backend-stored resource.
    async fn fetch_resource(&self, key: &ResourceKey)
        -> Result<FetchedResource, FileTransferError>;

    /// Upload one file, reporting byte progress through `progress`.
    ///
    /// Returns the backend-assigned key for the stored file. Progress sends
    /// are fire-and-forget: a dropped receiver must not fail the upload.
    async fn upload_file(
        &self,
        file: LocalFile,
        progress: ProgressSender,
    ) -> Result<ResourceKey, FileTransferError>;
}

#[async_trait]
impl<T: FileTransferPort + ?Sized> FileTransferPort for Arc<T> {
    async fn fetch_resource(
        &self,
        key: &ResourceKey,
    ) -> Result<FetchedResource, FileTransferError> {
        (**self).fetch_resource(key).await
    }

    async fn upload_file(
        &self,
        file: LocalFile,
        progress: ProgressSender,
    ) -> Result<ResourceKey, FileTransferError> {
        (**self).upload_file(file, progress).await
    }
}

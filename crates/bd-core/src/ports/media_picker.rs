use async_trait::async_trait;
use std::sync::Arc;

use super::errors::MediaPickError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaKind {
    Image,
    Video,
}

/// Which media kinds a pick request admits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MediaKinds {
    pub image: bool,
    pub video: bool,
}

impl MediaKinds {
    pub fn images() -> Self {
        Self { image: true, video: false }
    }

    pub fn videos() -> Self {
        Self { image: false, video: true }
    }

    pub fn all() -> Self {
        Self { image: true, video: true }
    }

    pub fn allows(&self, kind: MediaKind) -> bool {
        match kind {
            MediaKind::Image => self.image,
            MediaKind::Video => self.video,
        }
    }
}

#[derive(Debug, Clone)]
pub struct PickRequest {
    pub multiple: bool,
    pub kinds: MediaKinds,
}

/// One asset selected by the user, with its size already resolved.
#[derive(Debug, Clone)]
pub struct PickedMedia {
    pub uri: String,
    pub display_name: String,
    pub kind: MediaKind,
    pub size_bytes: u64,
}

#[async_trait]
pub trait MediaPickerPort: Send + Sync {
    /// Let the user select media. A dismissed picker yields an empty list,
    /// not an error.
    async fn pick(&self, request: PickRequest) -> Result<Vec<PickedMedia>, MediaPickError>;
}

#[async_trait]
impl<T: MediaPickerPort + ?Sized> MediaPickerPort for Arc<T> {
    async fn pick(&self, request: PickRequest) -> Result<Vec<PickedMedia>, MediaPickError> {
        (**self).pick(request).await
    }
}

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use log::debug;
use tokio::fs;

use bd_core::ports::{MediaKind, MediaPickError, MediaPickerPort, PickRequest, PickedMedia};

/// Media picker backed by a preselected list of local paths.
///
/// Desktop stand-in for an OS media dialog: the caller (or a file dialog
/// upstream) supplies the candidate paths, this adapter resolves their
/// kind and size and applies the request's kind filter.
pub struct FsMediaSource {
    paths: Vec<PathBuf>,
}

impl FsMediaSource {
    pub fn new(paths: Vec<PathBuf>) -> Self {
        Self { paths }
    }
}

#[async_trait]
impl MediaPickerPort for FsMediaSource {
    async fn pick(&self, request: PickRequest) -> Result<Vec<PickedMedia>, MediaPickError> {
        let mut picked = Vec::new();
        for path in &self.paths {
            let Some(kind) = kind_for_path(path) else {
                debug!("skipping non-media path {:?}", path);
                continue;
            };
            if !request.kinds.allows(kind) {
                continue;
            }
            let meta = fs::metadata(path)
                .await
                .map_err(|e| MediaPickError::Io(e.to_string()))?;
            picked.push(PickedMedia {
                uri: path.to_string_lossy().into_owned(),
                display_name: path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default(),
                kind,
                size_bytes: meta.len(),
            });
            if !request.multiple {
                break;
            }
        }
        Ok(picked)
    }
}

fn kind_for_path(path: &Path) -> Option<MediaKind> {
    let extension = path.extension()?.to_str()?.to_ascii_lowercase();
    match extension.as_str() {
        "jpg" | "jpeg" | "png" | "gif" | "webp" => Some(MediaKind::Image),
        "mp4" | "mov" | "webm" => Some(MediaKind::Video),
        _ => None,
    }
}

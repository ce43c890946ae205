//! Pick-and-upload pipeline.
//!
//! Each picked file becomes an [`UploadSlot`] that walks
//! Picked → Uploading → {Completed | Failed}. Uploads run strictly one at
//! a time, trading throughput for deterministic slot mutation and a
//! predictable aggregate error report. A change detector over the
//! completed-key set keeps the external callback quiet during progress
//! ticks.

use std::pin::pin;
use std::sync::Mutex;

use log::{info, warn};
use thiserror::Error;
use tokio::sync::mpsc;

use bd_core::ids::ResourceKey;
use bd_core::ports::{
    FileTransferPort, LocalFile, MediaKinds, MediaPickError, MediaPickerPort, PickRequest,
    PickedMedia,
};

use crate::data_uri;

#[derive(Debug, Error)]
pub enum PipelineError {
    /// Single-upload mode already holds a completed slot; the picker is
    /// not even opened.
    #[error("a file is already attached; remove it before adding another")]
    SingleSlotOccupied,

    #[error(transparent)]
    Picker(#[from] MediaPickError),
}

#[derive(Debug, Clone, PartialEq)]
pub enum SlotState {
    Picked,
    Uploading { progress: u8 },
    Completed { key: ResourceKey },
    Failed { message: String },
}

/// Per-file tracking record of the pipeline.
#[derive(Debug, Clone)]
pub struct UploadSlot {
    pub uri: String,
    pub display_name: String,
    pub state: SlotState,
}

impl UploadSlot {
    pub fn is_completed(&self) -> bool {
        matches!(self.state, SlotState::Completed { .. })
    }

    pub fn is_uploading(&self) -> bool {
        matches!(
            self.state,
            SlotState::Picked | SlotState::Uploading { .. }
        )
    }

    pub fn key(&self) -> Option<&ResourceKey> {
        match &self.state {
            SlotState::Completed { key } => Some(key),
            _ => None,
        }
    }

    pub fn progress(&self) -> u8 {
        match self.state {
            SlotState::Picked => 0,
            SlotState::Uploading { progress } => progress,
            SlotState::Completed { .. } => 100,
            SlotState::Failed { .. } => 0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct UploadOptions {
    pub multiple: bool,
    pub max_size_bytes: u64,
    pub kinds: MediaKinds,
    pub max_count: usize,
}

/// Aggregate outcome of one pick-and-upload round, used to build the
/// single user-facing alert instead of one message per file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UploadReport {
    pub uploaded: usize,
    /// Display names excluded before any request was sent.
    pub oversize: Vec<String>,
    /// Display names whose upload failed.
    pub failed: Vec<String>,
}

impl UploadReport {
    pub fn oversize_alert(&self, max_size_bytes: u64) -> Option<String> {
        if self.oversize.is_empty() {
            return None;
        }
        Some(format!(
            "{} exceeds the maximum size of {} MB",
            self.oversize.join(", "),
            max_size_bytes / 1_000_000
        ))
    }

    pub fn failure_alert(&self) -> Option<String> {
        if self.failed.is_empty() {
            return None;
        }
        Some(format!("Failed to upload {}", self.failed.join(", ")))
    }
}

type ChangeCallback = Box<dyn Fn(&[ResourceKey]) + Send + Sync>;

#[derive(Default)]
struct PipelineState {
    slots: Vec<UploadSlot>,
    /// Completed keys joined into one string at the last callback, the
    /// change detector's comparison value.
    last_emitted: String,
}

pub struct UploadPipeline<T: FileTransferPort, P: MediaPickerPort> {
    transport: T,
    picker: P,
    options: UploadOptions,
    state: Mutex<PipelineState>,
    on_change: Mutex<Option<ChangeCallback>>,
}

impl<T: FileTransferPort, P: MediaPickerPort> UploadPipeline<T, P> {
    pub fn new(transport: T, picker: P, options: UploadOptions) -> Self {
        Self {
            transport,
            picker,
            options,
            state: Mutex::new(PipelineState::default()),
            on_change: Mutex::new(None),
        }
    }

    /// Registers the callback fired whenever the set of completed keys
    /// actually changes. Progress ticks never fire it.
    pub fn set_on_change(&self, callback: ChangeCallback) {
        *self.on_change.lock().unwrap_or_else(|e| e.into_inner()) = Some(callback);
    }

    pub fn slots(&self) -> Vec<UploadSlot> {
        self.lock().slots.clone()
    }

    pub fn completed_keys(&self) -> Vec<ResourceKey> {
        self.lock()
            .slots
            .iter()
            .filter_map(|s| s.key().cloned())
            .collect()
    }

    /// Opens the picker and uploads the accepted files sequentially.
    ///
    /// Oversize files are excluded before any request and reported in one
    /// aggregated message; a failed upload does not abort the loop for the
    /// files behind it.
    pub async fn pick_and_upload(&self) -> Result<UploadReport, PipelineError> {
        {
            let state = self.lock();
            if !self.options.multiple && state.slots.iter().any(UploadSlot::is_completed) {
                return Err(PipelineError::SingleSlotOccupied);
            }
        }

        let picked = self
            .picker
            .pick(PickRequest {
                multiple: self.options.multiple,
                kinds: self.options.kinds,
            })
            .await?;

        let mut report = UploadReport::default();
        let mut accepted: Vec<PickedMedia> = Vec::new();
        for media in picked {
            if media.size_bytes > self.options.max_size_bytes {
                report.oversize.push(media.display_name);
            } else {
                accepted.push(media);
            }
        }

        let capacity = if self.options.multiple {
            self.options.max_count.saturating_sub(self.lock().slots.len())
        } else {
            1
        };
        accepted.truncate(capacity);

        // One upload at a time. The next request is not issued until the
        // previous slot has finalized.
        for media in accepted {
            let index = self.push_slot(&media);
            match self.upload_slot(index, &media).await {
                Ok(key) => {
                    info!("uploaded {} as {}", media.display_name, key);
                    self.finalize(index, SlotState::Completed { key });
                    report.uploaded += 1;
                }
                Err(err) => {
                    warn!("upload of {} failed: {}", media.display_name, err);
                    self.finalize(
                        index,
                        SlotState::Failed {
                            message: err.to_string(),
                        },
                    );
                    report.failed.push(media.display_name.clone());
                }
            }
        }

        Ok(report)
    }

    /// Removes a slot outright. Out-of-range indexes are ignored.
    pub fn remove_slot(&self, index: usize) {
        {
            let mut state = self.lock();
            if index >= state.slots.len() {
                return;
            }
            state.slots.remove(index);
        }
        self.emit_if_changed();
    }

    async fn upload_slot(
        &self,
        index: usize,
        media: &PickedMedia,
    ) -> Result<ResourceKey, bd_core::ports::FileTransferError> {
        self.set_state(index, SlotState::Uploading { progress: 0 });

        let file = LocalFile {
            uri: media.uri.clone(),
            file_name: media.display_name.clone(),
            content_type: data_uri::mime_for_name(&media.display_name).to_string(),
        };
        let (tx, mut rx) = mpsc::unbounded_channel::<u8>();
        let mut upload = pin!(self.transport.upload_file(file, tx));

        loop {
            tokio::select! {
                progress = rx.recv() => match progress {
                    Some(p) => self.bump_progress(index, p),
                    // Sender dropped early; just wait for the transfer.
                    None => break upload.as_mut().await,
                },
                result = upload.as_mut() => break result,
            }
        }
    }

    fn push_slot(&self, media: &PickedMedia) -> usize {
        let mut state = self.lock();
        state.slots.push(UploadSlot {
            uri: media.uri.clone(),
            display_name: media.display_name.clone(),
            state: SlotState::Picked,
        });
        state.slots.len() - 1
    }

    /// Progress is monotonic per slot; stale or out-of-order events are
    /// dropped.
    fn bump_progress(&self, index: usize, progress: u8) {
        let mut state = self.lock();
        if let Some(slot) = state.slots.get_mut(index) {
            let current = match slot.state {
                SlotState::Uploading { progress } => progress,
                _ => return,
            };
            let next = progress.min(100);
            if next > current {
                slot.state = SlotState::Uploading { progress: next };
            }
        }
    }

    fn set_state(&self, index: usize, new_state: SlotState) {
        let mut state = self.lock();
        if let Some(slot) = state.slots.get_mut(index) {
            slot.state = new_state;
        }
    }

    fn finalize(&self, index: usize, new_state: SlotState) {
        self.set_state(index, new_state);
        self.emit_if_changed();
    }

    fn emit_if_changed(&self) {
        let keys: Vec<ResourceKey> = {
            let mut state = self.lock();
            let keys: Vec<ResourceKey> =
                state.slots.iter().filter_map(|s| s.key().cloned()).collect();
            let joined = keys
                .iter()
                .map(ResourceKey::as_str)
                .collect::<Vec<_>>()
                .join(",");
            if joined == state.last_emitted {
                return;
            }
            state.last_emitted = joined;
            keys
        };
        if let Some(callback) = self
            .on_change
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .as_ref()
        {
            callback(&keys);
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, PipelineState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

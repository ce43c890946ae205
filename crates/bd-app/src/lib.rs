//! # bd-app
//!
//! Application services for the bizdesk client, built only against the
//! ports defined in `bd-core`. Concrete transports and pickers are
//! injected at assembly time.

pub mod data_uri;
pub mod resource_cache;
pub mod upload_pipeline;

pub use resource_cache::ResourceCache;
pub use upload_pipeline::{
    PipelineError, SlotState, UploadOptions, UploadPipeline, UploadReport, UploadSlot,
};

//! # bizdesk
//!
//! Client core for the bizdesk business-management app: authenticated
//! resource fetching with caching, the pick-and-upload pipeline, form
//! validation and the client session containers, assembled over the
//! workspace crates.

mod client;
mod deps;

pub use client::Client;
pub use deps::ClientDeps;

pub use bd_app::{
    PipelineError, ResourceCache, SlotState, UploadOptions, UploadPipeline, UploadReport,
    UploadSlot,
};
pub use bd_core::ports::{MediaKind, MediaKinds};
pub use bd_core::{
    validate, validate_field, ActiveBranch, ActiveCompany, CurrentUser, FieldKind, FieldRule,
    FormSchema, OwnerId, PermissionSet, ResourceKey, Session, ValidationOutcome,
};
pub use bd_infra::{ApiConfig, FsMediaSource, HttpFileTransport};

//! Port interfaces for the application layer
//!
//! Ports define the contract between the application services and the
//! infrastructure implementations. The application crate depends only on
//! these traits; concrete transports and pickers live in the infra crate
//! and are injected at assembly time.

mod credentials;
mod errors;
mod file_transfer;
mod media_picker;

pub use credentials::CredentialsPort;
pub use errors::{FileTransferError, MediaPickError};
pub use file_transfer::{FetchedResource, FileTransferPort, LocalFile, ProgressSender};
pub use media_picker::{MediaKind, MediaKinds, MediaPickerPort, PickRequest, PickedMedia};

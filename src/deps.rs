//! Client dependency grouping.
//!
//! This is NOT a builder: no build steps, no defaults, no hidden logic.
//! Just the parameters the client assembly needs, grouped.

use std::sync::Arc;

use bd_core::ports::{FileTransferPort, MediaPickerPort};

/// Everything the client needs from the infrastructure layer.
pub struct ClientDeps {
    pub transport: Arc<dyn FileTransferPort>,
    pub picker: Arc<dyn MediaPickerPort>,
}

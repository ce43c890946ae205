use std::sync::Arc;

use anyhow::Result;

use bd_app::{ResourceCache, UploadOptions, UploadPipeline};
use bd_core::ports::{CredentialsPort, FileTransferPort, MediaPickerPort};
use bd_core::Session;
use bd_infra::{ApiConfig, HttpFileTransport};

use crate::deps::ClientDeps;

/// Assembled bizdesk client: session, resource cache and pipeline factory
/// wired over the injected transport and picker.
pub struct Client {
    session: Arc<Session>,
    deps: ClientDeps,
    resources: Arc<ResourceCache<Arc<dyn FileTransferPort>>>,
}

impl Client {
    /// The constructor signature is the dependency manifest: everything is
    /// required, nothing is defaulted.
    pub fn new(deps: ClientDeps, session: Arc<Session>) -> Self {
        let resources = Arc::new(ResourceCache::new(deps.transport.clone()));
        Self {
            session,
            deps,
            resources,
        }
    }

    /// Assembles a client against the configured API domain, with the
    /// session acting as the credentials capability.
    pub fn from_config(
        config: &ApiConfig,
        session: Arc<Session>,
        picker: Arc<dyn MediaPickerPort>,
    ) -> Result<Self> {
        let credentials: Arc<dyn CredentialsPort> = session.clone();
        let transport = Arc::new(HttpFileTransport::new(
            config.base_url.as_str(),
            credentials,
        )?);
        Ok(Self::new(
            ClientDeps {
                transport,
                picker,
            },
            session,
        ))
    }

    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    /// Shared resource cache; screens resolve thumbnails through it.
    pub fn resources(&self) -> &Arc<ResourceCache<Arc<dyn FileTransferPort>>> {
        &self.resources
    }

    /// A fresh pipeline per form, so slot state stays screen-local.
    pub fn upload_pipeline(
        &self,
        options: UploadOptions,
    ) -> UploadPipeline<Arc<dyn FileTransferPort>, Arc<dyn MediaPickerPort>> {
        UploadPipeline::new(self.deps.transport.clone(), self.deps.picker.clone(), options)
    }
}

use std::sync::Arc;

/// Capability for reading the current bearer token.
///
/// Transports must call this at request time, never at construction time,
/// so a token refresh is observed by the next call.
pub trait CredentialsPort: Send + Sync {
    fn bearer_token(&self) -> Option<String>;
}

impl<T: CredentialsPort + ?Sized> CredentialsPort for Arc<T> {
    fn bearer_token(&self) -> Option<String> {
        (**self).bearer_token()
    }
}

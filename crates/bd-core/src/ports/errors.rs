use thiserror::Error;

#[derive(Debug, Error)]
pub enum FileTransferError {
    /// Connection-level failure before a status line was received.
    #[error("network error: {0}")]
    Network(String),

    /// Non-2xx response. 401/403 are deliberately not split out here;
    /// callers that care inspect the code.
    #[error("unexpected status: {0}")]
    Status(u16),

    /// 2xx response whose body could not be used (unparsable JSON,
    /// missing identifier field).
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// The local file backing an upload could not be read.
    #[error("local file error: {0}")]
    LocalFile(String),
}

#[derive(Debug, Error)]
pub enum MediaPickError {
    #[error("picker unavailable: {0}")]
    Unavailable(String),

    #[error("io error: {0}")]
    Io(String),
}

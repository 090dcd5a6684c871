use thiserror::Error;

/// All errors produced by the badge relay.
#[derive(Error, Debug)]
pub enum RelayError {
    /// The listener bind port was not configured.
    #[error("server port not set")]
    PortNotSet,

    /// The status-file base directory was not configured.
    #[error("status directory not set")]
    StatusDirNotSet,

    /// A request path did not encode a source identifier.
    #[error("invalid request path: {0:?}")]
    InvalidPath(String),

    /// A request could not be framed as an HTTP request.
    #[error("malformed request: {0}")]
    MalformedRequest(String),

    /// A request body exceeded the accepted size.
    #[error("request body too large: {0} bytes")]
    BodyTooLarge(usize),

    /// A request body could not be decoded as a notification payload.
    #[error("failed to decode notification payload: {0}")]
    PayloadDecode(#[from] serde_json::Error),

    /// Pass-through for raw I/O errors.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Convenience alias used throughout the relay crates.
pub type Result<T> = std::result::Result<T, RelayError>;

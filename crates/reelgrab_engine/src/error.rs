use std::fmt;

use reelgrab_core::OrchestrationError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    /// Service answered with a non-success status.
    HttpStatus(u16),
    InvalidUrl,
    Timeout,
    Network,
    /// Body was not the JSON the contract promises.
    Decode,
    TooLarge { max_bytes: u64, actual: Option<u64> },
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            FailureKind::InvalidUrl => write!(f, "invalid url"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::Network => write!(f, "network error"),
            FailureKind::Decode => write!(f, "malformed response"),
            FailureKind::TooLarge { max_bytes, actual } => {
                write!(f, "response too large (max {max_bytes}, actual {actual:?})")
            }
        }
    }
}

/// Failure talking to the conversion service.
///
/// `message` is what the user gets to see: the service's own `error` field,
/// an endpoint-specific fallback, or the transport error text.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct ClientError {
    pub kind: FailureKind,
    pub message: String,
}

impl ClientError {
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn is_remote(&self) -> bool {
        matches!(self.kind, FailureKind::HttpStatus(_))
    }
}

impl From<ClientError> for OrchestrationError {
    fn from(err: ClientError) -> Self {
        if err.is_remote() {
            OrchestrationError::remote(err.message)
        } else {
            OrchestrationError::transport(err.message)
        }
    }
}

use thiserror::Error;

pub const EMPTY_URL_MESSAGE: &str = "Por favor, ingrese una URL de Instagram";
pub const METADATA_FALLBACK_MESSAGE: &str = "Error verificando contenido";
pub const JOB_FALLBACK_MESSAGE: &str = "Error en la descarga";
pub const FORMAT_ABORTED_MESSAGE: &str = "Selección de formato cancelada";

/// Where a failure came from. Never changes what the user is shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    Remote,
    Transport,
    Delivery,
    Cancelled,
}

/// The single error surfaced to the user: a message and where it came from.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct OrchestrationError {
    pub kind: ErrorKind,
    pub message: String,
}

impl OrchestrationError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Validation, message)
    }

    pub fn remote(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Remote, message)
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Transport, message)
    }

    pub fn delivery(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Delivery, message)
    }

    pub fn cancelled(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Cancelled, message)
    }
}

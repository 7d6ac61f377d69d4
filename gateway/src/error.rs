use std::io;

use thiserror::Error;
use tokio::sync::mpsc::error::SendError;
use tracing_error::SpanTrace;

/// An error produced by the gateway core.
///
/// Carries a captured [`SpanTrace`] so a session's fatal error can be logged
/// with the call stack of spans active at the point it was first observed,
/// without requiring every caller to thread a `tracing::Span` by hand.
#[derive(Debug, Error)]
#[error("{kind}\n{span}")]
pub struct Error {
    pub(crate) kind: ErrorKind,
    pub(crate) span: SpanTrace,
}

impl Error {
    #[must_use]
    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }
}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Self {
        Self {
            kind,
            span: SpanTrace::capture(),
        }
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        ErrorKind::Io(err).into()
    }
}

#[derive(Debug, Error)]
pub enum ErrorKind {
    #[error("unexpected I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("websocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    #[error("zlib decompression failed: {0}")]
    Decompression(String),

    #[error("zlib compression failed: {0}")]
    Compression(String),

    #[error("a listener named '{0}' is already registered")]
    NameCollision(String),

    #[error("unknown interface alias: {0}")]
    UnknownInterface(String),

    #[error("invalid port: {0}. port must be between 0 and 65535")]
    PortOutOfRange(u32),

    #[error("unsupported protocol: {0}. expected telnet or websocket")]
    UnsupportedProtocol(String),

    #[error("TLS context not registered: {0}")]
    UnknownTlsContext(String),

    #[error("unexpected internal error: {0}")]
    Internal(String),
}

impl<T> From<SendError<T>> for ErrorKind {
    fn from(value: SendError<T>) -> Self {
        Self::Internal(format!("sending message: {value}"))
    }
}

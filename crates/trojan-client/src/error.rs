//! Client error types.

use std::io;

use trojan_core::errors::{
    ERROR_CONFIG, ERROR_HANDSHAKE, ERROR_PROTOCOL, ERROR_TLS_HANDSHAKE, ERROR_TRANSPORT,
    ERROR_UNSUPPORTED,
};
use trojan_transport::error::TransportError;

/// Errors that can occur in the trojan client.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Bad descriptor or missing secret. Raised at construction, never retried.
    #[error("config error: {0}")]
    Config(String),

    /// The transport dialer could not reach the endpoint.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// TLS handshake or certificate validation failed.
    #[error("TLS error: {0}")]
    Tls(#[source] io::Error),

    /// The request frame could not be written.
    #[error("handshake error: {0}")]
    Handshake(#[source] io::Error),

    #[error("unsupported operation: {0}")]
    Unsupported(&'static str),

    /// The target address cannot be encoded.
    #[error("trojan protocol error: {0}")]
    Proto(#[from] trojan_proto::WriteError),
}

impl ClientError {
    /// Stable label for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Config(_) => ERROR_CONFIG,
            Self::Transport(_) => ERROR_TRANSPORT,
            Self::Tls(_) => ERROR_TLS_HANDSHAKE,
            Self::Handshake(_) => ERROR_HANDSHAKE,
            Self::Unsupported(_) => ERROR_UNSUPPORTED,
            Self::Proto(_) => ERROR_PROTOCOL,
        }
    }
}

impl From<trojan_auth::AuthError> for ClientError {
    fn from(e: trojan_auth::AuthError) -> Self {
        Self::Config(e.to_string())
    }
}

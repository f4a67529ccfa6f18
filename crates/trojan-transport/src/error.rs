//! Error types for the transport crate.

use std::io;

use thiserror::Error;

/// Errors raised while opening or configuring a transport.
#[derive(Error, Debug)]
pub enum TransportError {
    /// The endpoint could not be resolved or refused the connection.
    #[error("connect to {addr} failed: {source}")]
    Connect {
        addr: String,
        #[source]
        source: io::Error,
    },

    /// Socket option or other I/O failure on an open stream.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("TLS error: {0}")]
    Tls(#[from] rustls::Error),

    #[error("invalid server name {name:?}: {reason}")]
    InvalidServerName { name: String, reason: String },
}

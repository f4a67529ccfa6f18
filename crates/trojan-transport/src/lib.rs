//! Transport seams for the trojan dialer.
//!
//! Defines the two collaborators a trojan client composes: a [`Dialer`] that
//! opens a raw duplex stream to `host:port`, and a [`TlsHandshake`] that wraps
//! that stream in a client session. Keeping both behind traits lets the
//! connect sequence run over TCP in production and over in-memory streams in
//! tests.
//!
//! # Modules
//!
//! - [`tcp`]: TCP dialer with socket options.
//! - [`tls`]: rustls handshake, cleartext pass-through, and the TLS policy.
//! - [`session`]: bounded LRU store for TLS session resumption.

pub mod error;
pub mod session;
pub mod tcp;
pub mod tls;

use std::future::Future;
use std::io;
use std::pin::Pin;

use rustls::pki_types::ServerName;
use tokio::io::{AsyncRead, AsyncWrite};

use error::TransportError;

pub use session::LruSessionStore;
pub use tcp::{TcpDialer, TcpOptions};
pub use tls::{PlainHandshake, RustlsHandshake, TlsPolicy, TlsVersion, parse_server_name};

/// Boxed future returned by the transport traits.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Marker trait for streams usable by the dialer.
pub trait TransportStream: AsyncRead + AsyncWrite + Unpin + Send + 'static {}

impl<T: AsyncRead + AsyncWrite + Unpin + Send + 'static> TransportStream for T {}

/// Opens raw duplex streams. Never retries; the caller owns retry policy.
pub trait Dialer: Send + Sync + 'static {
    /// The stream type produced by this dialer.
    type Stream: TransportStream;

    /// Connect to the given `host:port` address.
    fn connect(&self, addr: &str) -> BoxFuture<'_, Result<Self::Stream, TransportError>>;
}

/// A failed client handshake.
///
/// Carries the raw stream back when the TLS layer still owns it, so the
/// caller can shut it down instead of leaking the socket.
#[derive(Debug)]
pub struct HandshakeFailure<S> {
    pub error: io::Error,
    pub stream: Option<S>,
}

impl<S> HandshakeFailure<S> {
    pub fn new(error: io::Error, stream: S) -> Self {
        Self {
            error,
            stream: Some(stream),
        }
    }
}

/// Wraps a raw stream in a client session.
pub trait TlsHandshake<S: TransportStream>: Send + Sync + 'static {
    /// The established session stream.
    type Stream: TransportStream;

    fn handshake(
        &self,
        server_name: ServerName<'static>,
        stream: S,
    ) -> BoxFuture<'_, Result<Self::Stream, HandshakeFailure<S>>>;
}

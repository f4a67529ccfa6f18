//! Tunnel establishment to the remote trojan server.
//!
//! One dial is one sequence: transport connect, TLS handshake, a single write
//! of the request frame. The stream is handed back right after the write; the
//! protocol has no server acknowledgment, so a wrong credential only shows up
//! later as the server closing or answering with its fallback site.

use std::convert::Infallible;
use std::io;
use std::sync::Arc;
use std::time::Duration;

use rustls::pki_types::ServerName;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tracing::debug;
use trojan_auth::Credential;
use trojan_core::defaults::{DEFAULT_CONNECT_TIMEOUT_SECS, DEFAULT_TLS_HANDSHAKE_TIMEOUT_SECS};
use trojan_proto::{Command, TargetAddr, encode_request};
use trojan_transport::{
    BoxFuture, Dialer, HandshakeFailure, PlainHandshake, RustlsHandshake, TcpDialer, TcpOptions,
    TlsHandshake, TransportStream, parse_server_name,
};

use crate::endpoint::{Descriptor, Endpoint};
use crate::error::ClientError;

/// Type-erased tunnel stream.
pub type BoxStream = Box<dyn TransportStream>;

/// Object-safe face of a proxy dialer, as stored in the registry.
pub trait ProxyDialer: Send + Sync {
    /// Remote endpoint address (`host:port`).
    fn addr(&self) -> String;

    /// Open a TCP tunnel to `target`.
    fn dial<'a>(&'a self, target: &'a TargetAddr) -> BoxFuture<'a, Result<BoxStream, ClientError>>;

    /// UDP relay. Always `ClientError::Unsupported`, with no I/O.
    fn dial_udp(&self, target: &TargetAddr) -> Result<BoxStream, ClientError>;
}

/// Knobs for dialers built from descriptors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DialerSettings {
    pub tcp: TcpOptions,
    /// Deadline for the transport connect. `None` waits as long as the OS does.
    pub connect_timeout: Option<Duration>,
    /// Deadline for the TLS handshake.
    pub handshake_timeout: Option<Duration>,
}

impl Default for DialerSettings {
    fn default() -> Self {
        Self {
            tcp: TcpOptions::default(),
            connect_timeout: secs(DEFAULT_CONNECT_TIMEOUT_SECS),
            handshake_timeout: secs(DEFAULT_TLS_HANDSHAKE_TIMEOUT_SECS),
        }
    }
}

/// `0` means no deadline.
pub(crate) fn secs(n: u64) -> Option<Duration> {
    (n > 0).then(|| Duration::from_secs(n))
}

/// Trojan client dialer.
///
/// Endpoint, credential, and TLS config are fixed at construction and only
/// read afterwards, so one instance serves any number of concurrent dials.
pub struct TrojanDialer<D, H> {
    endpoint: Endpoint,
    credential: Credential,
    server_name: ServerName<'static>,
    dialer: D,
    handshake: H,
    connect_timeout: Option<Duration>,
    handshake_timeout: Option<Duration>,
}

impl<D, H> TrojanDialer<D, H>
where
    D: Dialer,
    H: TlsHandshake<D::Stream>,
{
    /// Assemble a dialer from its parts.
    ///
    /// # Errors
    /// `ClientError::Config` if the endpoint's server name is not a valid DNS
    /// name or IP literal.
    pub fn new(
        endpoint: Endpoint,
        credential: Credential,
        dialer: D,
        handshake: H,
    ) -> Result<Self, ClientError> {
        let server_name = parse_server_name(&endpoint.server_name)
            .map_err(|e| ClientError::Config(e.to_string()))?;
        Ok(Self {
            endpoint,
            credential,
            server_name,
            dialer,
            handshake,
            connect_timeout: None,
            handshake_timeout: None,
        })
    }

    #[must_use]
    pub fn with_connect_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.connect_timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_handshake_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.handshake_timeout = timeout;
        self
    }

    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    pub fn server_name(&self) -> &ServerName<'static> {
        &self.server_name
    }

    /// Open a tunnel to `target` and return the authenticated stream.
    ///
    /// Nothing is retried. On any failure every partially established stream
    /// is shut down or dropped before the error is returned.
    pub async fn dial(&self, target: &TargetAddr) -> Result<H::Stream, ClientError> {
        let result = self.dial_inner(target).await;
        if let Err(e) = &result {
            debug!(
                remote = %self.endpoint,
                target = %target,
                kind = e.kind(),
                error = %e,
                "trojan dial failed"
            );
        }
        result
    }

    async fn dial_inner(&self, target: &TargetAddr) -> Result<H::Stream, ClientError> {
        // Encode first so an unencodable target costs no connection.
        let frame = encode_request(self.credential.as_bytes(), Command::Connect, target)?;

        let addr = self.endpoint.addr();
        debug!(remote = %addr, target = %target, "connecting to trojan server");

        let connect = self.dialer.connect(&addr);
        let raw = match self.connect_timeout {
            Some(limit) => tokio::time::timeout(limit, connect)
                .await
                .unwrap_or_else(|_| Err(timed_out("transport connect").into())),
            None => connect.await,
        }?;

        // On timeout the handshake future, and the raw stream inside it, is dropped.
        let handshake = self.handshake.handshake(self.server_name.clone(), raw);
        let handshake = match self.handshake_timeout {
            Some(limit) => match tokio::time::timeout(limit, handshake).await {
                Ok(res) => res,
                Err(_) => return Err(ClientError::Tls(timed_out("TLS handshake"))),
            },
            None => handshake.await,
        };
        let mut stream = match handshake {
            Ok(stream) => stream,
            Err(HandshakeFailure { error, stream }) => {
                if let Some(mut raw) = stream {
                    let _ = raw.shutdown().await;
                }
                return Err(ClientError::Tls(error));
            }
        };
        debug!(remote = %addr, "tls established");

        if let Err(e) = write_frame(&mut stream, &frame).await {
            let _ = stream.shutdown().await;
            return Err(ClientError::Handshake(e));
        }
        debug!(remote = %addr, target = %target, "trojan request sent");

        Ok(stream)
    }

    /// UDP relay is not implemented by this client.
    pub fn dial_udp(&self, target: &TargetAddr) -> Result<Infallible, ClientError> {
        debug!(target = %target, "rejecting UDP relay request");
        Err(ClientError::Unsupported("UDP relay"))
    }
}

impl<D: Dialer> TrojanDialer<D, RustlsHandshake> {
    /// TLS dialer (`trojan://`) for a parsed descriptor.
    pub fn with_tls(descriptor: &Descriptor, dialer: D) -> Result<Self, ClientError> {
        let handshake = RustlsHandshake::from_policy(&descriptor.tls_policy())
            .map_err(|e| ClientError::Config(e.to_string()))?;
        Self::new(
            descriptor.endpoint.clone(),
            descriptor.credential,
            dialer,
            handshake,
        )
    }
}

impl<D: Dialer> TrojanDialer<D, PlainHandshake> {
    /// Cleartext dialer (`trojanc://`) for a parsed descriptor.
    pub fn cleartext(descriptor: &Descriptor, dialer: D) -> Result<Self, ClientError> {
        Self::new(
            descriptor.endpoint.clone(),
            descriptor.credential,
            dialer,
            PlainHandshake,
        )
    }
}

impl<D, H> ProxyDialer for TrojanDialer<D, H>
where
    D: Dialer,
    H: TlsHandshake<D::Stream>,
{
    fn addr(&self) -> String {
        self.endpoint.addr()
    }

    fn dial<'a>(&'a self, target: &'a TargetAddr) -> BoxFuture<'a, Result<BoxStream, ClientError>> {
        Box::pin(async move {
            let stream = TrojanDialer::dial(self, target).await?;
            Ok(Box::new(stream) as BoxStream)
        })
    }

    fn dial_udp(&self, target: &TargetAddr) -> Result<BoxStream, ClientError> {
        match TrojanDialer::dial_udp(self, target) {
            Ok(never) => match never {},
            Err(e) => Err(e),
        }
    }
}

/// Build a TCP-backed dialer for `descriptor`, TLS or cleartext per its scheme.
pub fn build_dialer(
    descriptor: &Descriptor,
    settings: &DialerSettings,
) -> Result<Arc<dyn ProxyDialer>, ClientError> {
    let tcp = TcpDialer::new(settings.tcp.clone());
    let dialer: Arc<dyn ProxyDialer> = if descriptor.cleartext {
        Arc::new(
            TrojanDialer::cleartext(descriptor, tcp)?
                .with_connect_timeout(settings.connect_timeout),
        )
    } else {
        Arc::new(
            TrojanDialer::with_tls(descriptor, tcp)?
                .with_connect_timeout(settings.connect_timeout)
                .with_handshake_timeout(settings.handshake_timeout),
        )
    };
    Ok(dialer)
}

/// Parse a descriptor and build its dialer with default settings.
pub fn dialer_from_url(url: &str) -> Result<Arc<dyn ProxyDialer>, ClientError> {
    build_dialer(&Descriptor::parse(url)?, &DialerSettings::default())
}

/// Write the whole frame and push it through any buffering layer.
async fn write_frame<S: AsyncWrite + Unpin>(stream: &mut S, frame: &[u8]) -> io::Result<()> {
    stream.write_all(frame).await?;
    stream.flush().await
}

fn timed_out(what: &str) -> io::Error {
    io::Error::new(io::ErrorKind::TimedOut, format!("{what} timed out"))
}

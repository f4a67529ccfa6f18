//! TLS client policy and handshake implementations.
//!
//! - `TlsPolicy`: what the ClientHello looks like and how the server is verified.
//! - `RustlsHandshake`: tokio-rustls client handshake.
//! - `PlainHandshake`: pass-through for the cleartext `trojanc` variant.

use std::sync::Arc;

use rustls::client::Resumption;
use rustls::crypto::CryptoProvider;
use rustls::pki_types::{CertificateDer, ServerName};
use rustls::version::TLS13;
use rustls::{ClientConfig, RootCertStore, SupportedProtocolVersion};
use tokio_rustls::TlsConnector;
use tokio_rustls::client::TlsStream;
use trojan_core::defaults::{DEFAULT_ALPN, DEFAULT_TLS_SESSION_CACHE_SIZE};

use crate::error::TransportError;
use crate::session::LruSessionStore;
use crate::{BoxFuture, HandshakeFailure, TlsHandshake, TransportStream};

static TLS13_ONLY: &[&SupportedProtocolVersion] = &[&TLS13];

// ── Policy ──

/// Lowest TLS version the client will negotiate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TlsVersion {
    /// TLS 1.2 and 1.3. Oldest version rustls speaks; widest server reach.
    #[default]
    Tls12,
    Tls13,
}

impl TlsVersion {
    /// Versions offered in the ClientHello.
    pub fn protocol_versions(self) -> &'static [&'static SupportedProtocolVersion] {
        match self {
            Self::Tls12 => rustls::ALL_VERSIONS,
            Self::Tls13 => TLS13_ONLY,
        }
    }
}

/// Client TLS policy for one trojan endpoint.
///
/// `skip_verify` turns off certificate chain and hostname validation
/// entirely. It reduces the tunnel's trust to "whoever answers on this
/// address" and must only be set explicitly by the operator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TlsPolicy {
    /// SNI and verification name.
    pub server_name: String,
    pub skip_verify: bool,
    pub min_version: TlsVersion,
    pub alpn: Vec<String>,
    /// Servers kept in the resumption cache.
    pub session_cache_size: usize,
}

impl TlsPolicy {
    pub fn new(server_name: impl Into<String>, skip_verify: bool) -> Self {
        Self {
            server_name: server_name.into(),
            skip_verify,
            min_version: TlsVersion::default(),
            alpn: DEFAULT_ALPN.iter().map(|s| (*s).to_string()).collect(),
            session_cache_size: DEFAULT_TLS_SESSION_CACHE_SIZE,
        }
    }

    /// Whether the server certificate is checked against the web PKI.
    pub fn verifies_certificates(&self) -> bool {
        !self.skip_verify
    }

    /// Build the rustls client config with a fresh resumption store. Pure; no I/O.
    pub fn build_client_config(&self) -> Result<ClientConfig, TransportError> {
        let store = Arc::new(LruSessionStore::new(self.session_cache_size));
        self.build_client_config_with_store(store)
    }

    /// Build the rustls client config around a caller-owned resumption store.
    pub fn build_client_config_with_store(
        &self,
        store: Arc<LruSessionStore>,
    ) -> Result<ClientConfig, TransportError> {
        let provider = Arc::new(rustls::crypto::aws_lc_rs::default_provider());
        let builder = ClientConfig::builder_with_provider(provider.clone())
            .with_protocol_versions(self.min_version.protocol_versions())?;

        let mut config = if self.skip_verify {
            builder
                .dangerous()
                .with_custom_certificate_verifier(Arc::new(NoVerifier(provider)))
                .with_no_client_auth()
        } else {
            let mut root_store = RootCertStore::empty();
            root_store.extend(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());
            builder
                .with_root_certificates(root_store)
                .with_no_client_auth()
        };

        config.alpn_protocols = self.alpn.iter().map(|s| s.as_bytes().to_vec()).collect();
        config.resumption = Resumption::store(store);

        Ok(config)
    }
}

/// Parse a TLS server name (DNS name or IP literal).
pub fn parse_server_name(name: &str) -> Result<ServerName<'static>, TransportError> {
    ServerName::try_from(name.to_owned())
        .map_err(|e| TransportError::InvalidServerName {
            name: name.to_owned(),
            reason: e.to_string(),
        })
}

// ── Handshakes ──

/// rustls client handshake.
#[derive(Clone)]
pub struct RustlsHandshake {
    connector: TlsConnector,
}

impl RustlsHandshake {
    pub fn new(config: Arc<ClientConfig>) -> Self {
        Self {
            connector: TlsConnector::from(config),
        }
    }

    pub fn from_policy(policy: &TlsPolicy) -> Result<Self, TransportError> {
        Ok(Self::new(Arc::new(policy.build_client_config()?)))
    }
}

impl<S: TransportStream> TlsHandshake<S> for RustlsHandshake {
    type Stream = TlsStream<S>;

    fn handshake(
        &self,
        server_name: ServerName<'static>,
        stream: S,
    ) -> BoxFuture<'_, Result<Self::Stream, HandshakeFailure<S>>> {
        let connect = self.connector.connect(server_name, stream).into_fallible();
        Box::pin(async move {
            connect
                .await
                .map_err(|(error, stream)| HandshakeFailure::new(error, stream))
        })
    }
}

/// No-op handshake: the raw stream is used as-is.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainHandshake;

impl<S: TransportStream> TlsHandshake<S> for PlainHandshake {
    type Stream = S;

    fn handshake(
        &self,
        _server_name: ServerName<'static>,
        stream: S,
    ) -> BoxFuture<'_, Result<Self::Stream, HandshakeFailure<S>>> {
        Box::pin(async move { Ok(stream) })
    }
}

/// Certificate verifier that accepts any certificate (for skip_verify mode).
#[derive(Debug)]
struct NoVerifier(Arc<CryptoProvider>);

impl rustls::client::danger::ServerCertVerifier for NoVerifier {
    fn verify_server_cert(
        &self,
        _end_entity: &CertificateDer<'_>,
        _intermediates: &[CertificateDer<'_>],
        _server_name: &ServerName<'_>,
        _ocsp_response: &[u8],
        _now: rustls::pki_types::UnixTime,
    ) -> Result<rustls::client::danger::ServerCertVerified, rustls::Error> {
        Ok(rustls::client::danger::ServerCertVerified::assertion())
    }

    fn verify_tls12_signature(
        &self,
        _message: &[u8],
        _cert: &CertificateDer<'_>,
        _dss: &rustls::DigitallySignedStruct,
    ) -> Result<rustls::client::danger::HandshakeSignatureValid, rustls::Error> {
        Ok(rustls::client::danger::HandshakeSignatureValid::assertion())
    }

    fn verify_tls13_signature(
        &self,
        _message: &[u8],
        _cert: &CertificateDer<'_>,
        _dss: &rustls::DigitallySignedStruct,
    ) -> Result<rustls::client::danger::HandshakeSignatureValid, rustls::Error> {
        Ok(rustls::client::danger::HandshakeSignatureValid::assertion())
    }

    fn supported_verify_schemes(&self) -> Vec<rustls::SignatureScheme> {
        self.0.signature_verification_algorithms.supported_schemes()
    }
}

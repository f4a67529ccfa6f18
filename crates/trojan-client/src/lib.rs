//! Trojan outbound dialer.
//!
//! Turns a descriptor such as
//! `trojan://secret@example.com:443?serverName=cdn.example.com` into a dialer
//! that opens TLS-wrapped tunnels to a trojan server. Each dial connects,
//! completes the TLS handshake, writes the request frame once, and hands the
//! stream back to the caller for application bytes.
//!
//! ```no_run
//! # async fn demo() -> Result<(), trojan_client::ClientError> {
//! use trojan_client::DialerRegistry;
//!
//! let registry = DialerRegistry::with_defaults();
//! let dialer = registry.dialer("trojan://secret@example.com:443")?;
//! let target = "example.org:80".parse().expect("valid target");
//! let _stream = dialer.dial(&target).await?;
//! # Ok(())
//! # }
//! ```

pub mod config;
mod dialer;
mod endpoint;
mod error;
mod registry;

pub use config::{DialerConfig, TcpConfig, load_dialer_config};
pub use dialer::{
    BoxStream, DialerSettings, ProxyDialer, TrojanDialer, build_dialer, dialer_from_url,
};
pub use endpoint::{Descriptor, Endpoint, SCHEME_CLEARTEXT, SCHEME_TLS};
pub use error::ClientError;
pub use registry::{DialerFactory, DialerRegistry, DialerRegistryBuilder};

//! # trojan
//!
//! Outbound dialer for the Trojan protocol.
//!
//! A trojan tunnel is a TLS session to a server that looks like an ordinary
//! HTTPS site. The client proves knowledge of a shared secret by sending its
//! SHA-224 digest in the first application-data record, followed by the
//! target address; everything afterwards is the proxied payload.
//!
//! ## Crates
//!
//! - [`trojan_core`] - Shared defaults and error labels
//! - [`trojan_proto`] - Request frame and address encoding
//! - [`trojan_auth`] - Credential digest
//! - [`trojan_transport`] - TCP dialer, TLS policy, session resumption
//! - [`trojan_client`] - Descriptor parsing, connect sequence, scheme registry

pub use trojan_auth as auth;
pub use trojan_client as client;
pub use trojan_core as core;
pub use trojan_proto as proto;
pub use trojan_transport as transport;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use trojan_auth::Credential;
    pub use trojan_client::{
        ClientError, Descriptor, DialerConfig, DialerRegistry, ProxyDialer, TrojanDialer,
        load_dialer_config,
    };
    pub use trojan_proto::{Host, TargetAddr};
    pub use trojan_transport::{TlsPolicy, TlsVersion};
}

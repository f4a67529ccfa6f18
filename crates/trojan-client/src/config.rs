//! Dialer configuration.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;
use trojan_core::defaults;
use trojan_transport::TcpOptions;

use crate::dialer::{DialerSettings, ProxyDialer, build_dialer, secs};
use crate::endpoint::Descriptor;
use crate::error::ClientError;

/// One outbound trojan dialer.
#[derive(Clone, Deserialize)]
pub struct DialerConfig {
    /// Connection descriptor, e.g. `trojan://password@example.com:443?serverName=cdn.example.com`.
    pub url: String,

    /// TCP socket options.
    #[serde(default)]
    pub tcp: TcpConfig,

    /// Transport connect deadline in seconds (0 = none).
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,

    /// TLS handshake deadline in seconds (0 = none).
    #[serde(default = "default_tls_handshake_timeout_secs")]
    pub tls_handshake_timeout_secs: u64,
}

impl fmt::Debug for DialerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // The URL carries the secret.
        f.debug_struct("DialerConfig")
            .field("url", &"<redacted>")
            .field("tcp", &self.tcp)
            .field("connect_timeout_secs", &self.connect_timeout_secs)
            .field("tls_handshake_timeout_secs", &self.tls_handshake_timeout_secs)
            .finish()
    }
}

/// TCP socket options.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TcpConfig {
    /// Disable Nagle's algorithm.
    #[serde(default = "default_tcp_no_delay")]
    pub no_delay: bool,

    /// TCP keep-alive interval in seconds (0 = OS default).
    #[serde(default = "default_tcp_keepalive_secs")]
    pub keepalive_secs: u64,
}

impl Default for TcpConfig {
    fn default() -> Self {
        Self {
            no_delay: default_tcp_no_delay(),
            keepalive_secs: default_tcp_keepalive_secs(),
        }
    }
}

impl From<&TcpConfig> for TcpOptions {
    fn from(c: &TcpConfig) -> Self {
        Self {
            no_delay: c.no_delay,
            keepalive: (c.keepalive_secs > 0).then(|| Duration::from_secs(c.keepalive_secs)),
        }
    }
}

impl DialerConfig {
    /// Configuration for `url` with every other field at its default.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            tcp: TcpConfig::default(),
            connect_timeout_secs: default_connect_timeout_secs(),
            tls_handshake_timeout_secs: default_tls_handshake_timeout_secs(),
        }
    }

    pub fn settings(&self) -> DialerSettings {
        DialerSettings {
            tcp: TcpOptions::from(&self.tcp),
            connect_timeout: secs(self.connect_timeout_secs),
            handshake_timeout: secs(self.tls_handshake_timeout_secs),
        }
    }

    /// Parse the descriptor and build the dialer.
    pub fn into_dialer(self) -> Result<Arc<dyn ProxyDialer>, ClientError> {
        let descriptor = Descriptor::parse(&self.url)?;
        build_dialer(&descriptor, &self.settings())
    }
}

/// Load dialer configuration from a file path.
///
/// Supports TOML, JSON, and JSONC formats (detected by extension).
pub fn load_dialer_config(path: &std::path::Path) -> Result<DialerConfig, ClientError> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| ClientError::Config(format!("failed to read config: {e}")))?;

    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("toml");

    match ext {
        "json" | "jsonc" => {
            let stripped = json_comments::StripComments::new(content.as_bytes());
            serde_json::from_reader(stripped)
                .map_err(|e| ClientError::Config(format!("JSON parse error: {e}")))
        }
        _ => toml::from_str(&content)
            .map_err(|e| ClientError::Config(format!("TOML parse error: {e}"))),
    }
}

fn default_connect_timeout_secs() -> u64 {
    defaults::DEFAULT_CONNECT_TIMEOUT_SECS
}

fn default_tls_handshake_timeout_secs() -> u64 {
    defaults::DEFAULT_TLS_HANDSHAKE_TIMEOUT_SECS
}

fn default_tcp_no_delay() -> bool {
    defaults::DEFAULT_TCP_NO_DELAY
}

fn default_tcp_keepalive_secs() -> u64 {
    defaults::DEFAULT_TCP_KEEPALIVE_SECS
}

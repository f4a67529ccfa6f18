//! TCP transport dialer.
//!
//! Name resolution goes through Tokio's system resolver; the trojan endpoint
//! itself is the only host this dialer ever connects to.

use std::time::Duration;

use tokio::net::TcpStream;
use tracing::debug;
use trojan_core::defaults::{DEFAULT_TCP_KEEPALIVE_SECS, DEFAULT_TCP_NO_DELAY};

use crate::error::TransportError;
use crate::{BoxFuture, Dialer};

/// TCP socket options applied after connect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TcpOptions {
    pub no_delay: bool,
    /// `None` leaves keep-alive at the OS default.
    pub keepalive: Option<Duration>,
}

impl Default for TcpOptions {
    fn default() -> Self {
        Self {
            no_delay: DEFAULT_TCP_NO_DELAY,
            keepalive: (DEFAULT_TCP_KEEPALIVE_SECS > 0)
                .then(|| Duration::from_secs(DEFAULT_TCP_KEEPALIVE_SECS)),
        }
    }
}

impl TcpOptions {
    fn apply(&self, stream: &TcpStream) -> Result<(), TransportError> {
        stream.set_nodelay(self.no_delay)?;

        if let Some(time) = self.keepalive {
            let sock = socket2::SockRef::from(stream);
            let keepalive = socket2::TcpKeepalive::new().with_time(time);
            sock.set_tcp_keepalive(&keepalive)?;
        }

        Ok(())
    }
}

/// Plain TCP dialer.
#[derive(Debug, Clone, Default)]
pub struct TcpDialer {
    options: TcpOptions,
}

impl TcpDialer {
    pub fn new(options: TcpOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &TcpOptions {
        &self.options
    }
}

impl Dialer for TcpDialer {
    type Stream = TcpStream;

    fn connect(&self, addr: &str) -> BoxFuture<'_, Result<Self::Stream, TransportError>> {
        let addr = addr.to_string();
        Box::pin(async move {
            let tcp = TcpStream::connect(&addr)
                .await
                .map_err(|source| TransportError::Connect {
                    addr: addr.clone(),
                    source,
                })?;
            self.options.apply(&tcp)?;
            debug!(remote = %addr, "tcp connected");
            Ok(tcp)
        })
    }
}

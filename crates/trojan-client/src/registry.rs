//! Scheme registry for outbound dialers.
//!
//! The composition root builds one registry at startup and hands it to
//! whatever turns forwarder URLs into dialers. It is never mutated after
//! [`DialerRegistryBuilder::build`].

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::dialer::{ProxyDialer, dialer_from_url};
use crate::endpoint::{SCHEME_CLEARTEXT, SCHEME_TLS};
use crate::error::ClientError;

/// Builds a dialer from a full descriptor URL.
pub type DialerFactory = fn(&str) -> Result<Arc<dyn ProxyDialer>, ClientError>;

/// Immutable scheme → constructor map.
#[derive(Clone, Default)]
pub struct DialerRegistry {
    factories: HashMap<String, DialerFactory>,
}

/// Collects registrations before the registry is frozen.
#[derive(Default)]
pub struct DialerRegistryBuilder {
    factories: HashMap<String, DialerFactory>,
}

impl DialerRegistryBuilder {
    /// Register `factory` for `scheme`. Later registrations replace earlier ones.
    #[must_use]
    pub fn register(mut self, scheme: &str, factory: DialerFactory) -> Self {
        self.factories.insert(scheme.to_ascii_lowercase(), factory);
        self
    }

    pub fn build(self) -> DialerRegistry {
        DialerRegistry {
            factories: self.factories,
        }
    }
}

impl DialerRegistry {
    pub fn builder() -> DialerRegistryBuilder {
        DialerRegistryBuilder::default()
    }

    /// Registry with `trojan` and `trojanc`.
    pub fn with_defaults() -> Self {
        Self::builder()
            .register(SCHEME_TLS, dialer_from_url)
            .register(SCHEME_CLEARTEXT, dialer_from_url)
            .build()
    }

    pub fn contains(&self, scheme: &str) -> bool {
        self.factories.contains_key(&scheme.to_ascii_lowercase())
    }

    /// Registered schemes, sorted.
    pub fn schemes(&self) -> Vec<&str> {
        let mut schemes: Vec<&str> = self.factories.keys().map(String::as_str).collect();
        schemes.sort_unstable();
        schemes
    }

    /// Build the dialer registered for `url`'s scheme.
    ///
    /// # Errors
    /// `ClientError::Config` if the URL has no scheme or the scheme is unknown,
    /// plus whatever the factory returns.
    pub fn dialer(&self, url: &str) -> Result<Arc<dyn ProxyDialer>, ClientError> {
        let (scheme, _) = url
            .split_once("://")
            .ok_or_else(|| ClientError::Config(format!("missing scheme in {}", redact(url))))?;
        let factory = self
            .factories
            .get(&scheme.to_ascii_lowercase())
            .ok_or_else(|| ClientError::Config(format!("unknown scheme: {scheme}")))?;
        factory(url)
    }
}

impl fmt::Debug for DialerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DialerRegistry")
            .field("schemes", &self.schemes())
            .finish()
    }
}

/// Drop anything that could be userinfo before echoing a URL in an error.
fn redact(url: &str) -> &str {
    url.rsplit_once('@').map_or(url, |(_, host)| host)
}

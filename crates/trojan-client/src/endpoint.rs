//! Connection descriptor parsing.
//!
//! A descriptor looks like
//! `trojan://secret@host[:port]?serverName=<name>&skipVerify=<true|false>`.
//! `trojanc://` selects the cleartext variant (no TLS layer).

use std::borrow::Cow;
use std::fmt;

use percent_encoding::percent_decode_str;
use trojan_auth::Credential;
use trojan_core::defaults::DEFAULT_PORT;
use trojan_transport::TlsPolicy;
use url::{Host, Url};

use crate::error::ClientError;

/// Descriptor scheme for the TLS variant.
pub const SCHEME_TLS: &str = "trojan";
/// Descriptor scheme for the cleartext variant.
pub const SCHEME_CLEARTEXT: &str = "trojanc";

/// Remote trojan endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    /// Host without brackets or port.
    pub host: String,
    pub port: u16,
    /// TLS SNI and verification name.
    pub server_name: String,
}

impl Endpoint {
    /// `host:port` for the transport dialer, bracketing IPv6 literals.
    pub fn addr(&self) -> String {
        if self.host.contains(':') {
            format!("[{}]:{}", self.host, self.port)
        } else {
            format!("{}:{}", self.host, self.port)
        }
    }

    /// TLS policy for this endpoint. `skip_verify` must come from explicit
    /// operator configuration.
    pub fn tls_policy(&self, skip_verify: bool) -> TlsPolicy {
        TlsPolicy::new(self.server_name.clone(), skip_verify)
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.addr())
    }
}

/// A parsed connection descriptor.
///
/// Holds the digested credential, never the plaintext secret.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Descriptor {
    pub endpoint: Endpoint,
    pub credential: Credential,
    pub skip_verify: bool,
    /// `trojanc://`: frame is written straight onto the transport.
    pub cleartext: bool,
}

impl Descriptor {
    /// Parse a descriptor.
    ///
    /// # Errors
    /// `ClientError::Config` if the URL is unparsable, the scheme is not
    /// `trojan`/`trojanc`, the host is empty, or the secret is missing.
    pub fn parse(s: &str) -> Result<Self, ClientError> {
        let url = Url::parse(s).map_err(|e| ClientError::Config(format!("parse url: {e}")))?;

        let cleartext = match url.scheme() {
            SCHEME_TLS => false,
            SCHEME_CLEARTEXT => true,
            other => {
                return Err(ClientError::Config(format!("unsupported scheme: {other}")));
            }
        };

        let host = match url.host() {
            Some(Host::Domain(d)) => d.to_string(),
            Some(Host::Ipv4(ip)) => ip.to_string(),
            Some(Host::Ipv6(ip)) => ip.to_string(),
            None => String::new(),
        };
        if host.is_empty() {
            return Err(ClientError::Config("missing host".into()));
        }
        let port = url.port().unwrap_or(DEFAULT_PORT);

        let secret = percent_decode_str(url.username())
            .decode_utf8()
            .map_err(|e| ClientError::Config(format!("credential is not utf-8: {e}")))?;
        let credential = Credential::from_secret(&secret)?;

        let server_name = query_value(&url, "serverName")
            .filter(|v| !v.is_empty())
            .map_or_else(|| host.clone(), Cow::into_owned);
        let skip_verify = query_value(&url, "skipVerify").is_some_and(|v| v == "true");

        Ok(Self {
            endpoint: Endpoint {
                host,
                port,
                server_name,
            },
            credential,
            skip_verify,
            cleartext,
        })
    }

    pub fn tls_policy(&self) -> TlsPolicy {
        self.endpoint.tls_policy(self.skip_verify)
    }
}

/// First value of a query parameter.
fn query_value<'a>(url: &'a Url, key: &str) -> Option<Cow<'a, str>> {
    url.query_pairs().find(|(k, _)| k == key).map(|(_, v)| v)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_port_and_server_name() {
        let d = Descriptor::parse("trojan://pw@example.com").unwrap();
        assert_eq!(d.endpoint.host, "example.com");
        assert_eq!(d.endpoint.port, DEFAULT_PORT);
        assert_eq!(d.endpoint.server_name, "example.com");
        assert_eq!(d.endpoint.addr(), "example.com:443");
        assert!(!d.skip_verify);
        assert!(!d.cleartext);
        assert_eq!(d.credential, Credential::from_secret("pw").unwrap());
    }

    #[test]
    fn server_name_strips_port() {
        let d = Descriptor::parse("trojan://pw@example.com:8443").unwrap();
        assert_eq!(d.endpoint.port, 8443);
        assert_eq!(d.endpoint.server_name, "example.com");
    }

    #[test]
    fn server_name_override() {
        let d = Descriptor::parse("trojan://pw@1.2.3.4:443?serverName=cdn.example.org").unwrap();
        assert_eq!(d.endpoint.host, "1.2.3.4");
        assert_eq!(d.endpoint.server_name, "cdn.example.org");
        assert_eq!(d.tls_policy().server_name, "cdn.example.org");
    }

    #[test]
    fn empty_server_name_falls_back_to_host() {
        let d = Descriptor::parse("trojan://pw@example.com?serverName=").unwrap();
        assert_eq!(d.endpoint.server_name, "example.com");
    }

    #[test]
    fn ipv6_host_is_unbracketed() {
        let d = Descriptor::parse("trojan://pw@[2001:db8::1]:8443").unwrap();
        assert_eq!(d.endpoint.host, "2001:db8::1");
        assert_eq!(d.endpoint.server_name, "2001:db8::1");
        assert_eq!(d.endpoint.addr(), "[2001:db8::1]:8443");
    }

    #[test]
    fn skip_verify_flag() {
        let on = Descriptor::parse("trojan://pw@example.com?skipVerify=true").unwrap();
        assert!(on.skip_verify);
        assert!(!on.tls_policy().verifies_certificates());

        let off = Descriptor::parse("trojan://pw@example.com?skipVerify=false").unwrap();
        assert!(off.tls_policy().verifies_certificates());

        let other = Descriptor::parse("trojan://pw@example.com?skipVerify=1").unwrap();
        assert!(!other.skip_verify);
    }

    #[test]
    fn secret_is_percent_decoded() {
        let d = Descriptor::parse("trojan://p%40ss%3Aword@example.com").unwrap();
        assert_eq!(d.credential, Credential::from_secret("p@ss:word").unwrap());
    }

    #[test]
    fn cleartext_scheme() {
        let d = Descriptor::parse("trojanc://pw@10.0.0.1:8080").unwrap();
        assert!(d.cleartext);
        assert_eq!(d.endpoint.addr(), "10.0.0.1:8080");
    }

    #[test]
    fn missing_secret_is_config_error() {
        for s in ["trojan://example.com", "trojan://@example.com:443"] {
            let err = Descriptor::parse(s).unwrap_err();
            assert!(matches!(err, ClientError::Config(_)), "{s}: {err}");
        }
    }

    #[test]
    fn bad_descriptors_are_config_errors() {
        for s in [
            "",
            "not a url",
            "trojan://pw@",
            "trojan://pw@example.com:99999",
            "socks5://pw@example.com",
        ] {
            let err = Descriptor::parse(s).unwrap_err();
            assert!(matches!(err, ClientError::Config(_)), "{s}: {err}");
        }
    }
}

//! Destination addresses and their SOCKS-style wire form.

use std::fmt;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};
use std::str::FromStr;

use bytes::BytesMut;

use crate::{ATYP_DOMAIN, ATYP_IPV4, ATYP_IPV6, MAX_DOMAIN_LEN, WriteError};

/// Host part of a destination address.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Host {
    Ipv4(Ipv4Addr),
    Ipv6(Ipv6Addr),
    /// Resolved by the remote endpoint, never locally.
    Domain(String),
}

/// A destination the remote endpoint should relay to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TargetAddr {
    pub host: Host,
    pub port: u16,
}

/// Errors from parsing a `host:port` target string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddrParseError {
    MissingPort,
    InvalidPort,
    EmptyHost,
}

impl fmt::Display for AddrParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingPort => write!(f, "target address has no port"),
            Self::InvalidPort => write!(f, "target port is not a valid u16"),
            Self::EmptyHost => write!(f, "target host is empty"),
        }
    }
}

impl std::error::Error for AddrParseError {}

impl TargetAddr {
    pub fn new(host: Host, port: u16) -> Self {
        Self { host, port }
    }

    pub fn domain(domain: impl Into<String>, port: u16) -> Self {
        Self::new(Host::Domain(domain.into()), port)
    }

    /// ATYP tag for this address.
    #[inline]
    pub fn atyp(&self) -> u8 {
        match self.host {
            Host::Ipv4(_) => ATYP_IPV4,
            Host::Ipv6(_) => ATYP_IPV6,
            Host::Domain(_) => ATYP_DOMAIN,
        }
    }
}

impl From<SocketAddr> for TargetAddr {
    fn from(addr: SocketAddr) -> Self {
        let host = match addr.ip() {
            IpAddr::V4(ip) => Host::Ipv4(ip),
            IpAddr::V6(ip) => Host::Ipv6(ip),
        };
        Self::new(host, addr.port())
    }
}

impl FromStr for TargetAddr {
    type Err = AddrParseError;

    /// Accepts `1.2.3.4:443`, `[::1]:443` and `example.com:443`.
    ///
    /// Literal IPs always take the fixed-width forms; anything else is sent
    /// as a domain for the remote endpoint to resolve.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Ok(addr) = s.parse::<SocketAddr>() {
            return Ok(addr.into());
        }

        let (host, port) = s.rsplit_once(':').ok_or(AddrParseError::MissingPort)?;
        let port = port.parse::<u16>().map_err(|_| AddrParseError::InvalidPort)?;
        let host = host
            .strip_prefix('[')
            .and_then(|h| h.strip_suffix(']'))
            .unwrap_or(host);
        if host.is_empty() {
            return Err(AddrParseError::EmptyHost);
        }

        let host = match host.parse::<IpAddr>() {
            Ok(IpAddr::V4(ip)) => Host::Ipv4(ip),
            Ok(IpAddr::V6(ip)) => Host::Ipv6(ip),
            Err(_) => Host::Domain(host.to_string()),
        };
        Ok(Self::new(host, port))
    }
}

impl fmt::Display for TargetAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.host {
            Host::Ipv4(ip) => write!(f, "{ip}:{}", self.port),
            Host::Ipv6(ip) => write!(f, "[{ip}]:{}", self.port),
            Host::Domain(d) => write!(f, "{d}:{}", self.port),
        }
    }
}

/// Appends `ATYP || address || port` to `buf`.
///
/// Domains are length-prefixed with a single byte; IPv4 and IPv6 use their
/// fixed 4 and 16 byte forms. The port is written in network byte order.
///
/// # Errors
/// - `EmptyDomain` if the domain is empty.
/// - `DomainTooLong` if the domain exceeds 255 bytes.
#[allow(clippy::cast_possible_truncation)]
pub fn encode_address(buf: &mut BytesMut, addr: &TargetAddr) -> Result<(), WriteError> {
    match &addr.host {
        Host::Ipv4(ip) => {
            buf.extend_from_slice(&[ATYP_IPV4]);
            buf.extend_from_slice(&ip.octets());
        }
        Host::Ipv6(ip) => {
            buf.extend_from_slice(&[ATYP_IPV6]);
            buf.extend_from_slice(&ip.octets());
        }
        Host::Domain(domain) => {
            let domain = domain.as_bytes();
            if domain.is_empty() {
                return Err(WriteError::EmptyDomain);
            }
            if domain.len() > MAX_DOMAIN_LEN {
                return Err(WriteError::DomainTooLong);
            }
            buf.extend_from_slice(&[ATYP_DOMAIN, domain.len() as u8]);
            buf.extend_from_slice(domain);
        }
    }
    buf.extend_from_slice(&addr.port.to_be_bytes());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_ipv4_target() {
        let addr: TargetAddr = "1.2.3.4:443".parse().unwrap();
        assert_eq!(addr.host, Host::Ipv4(Ipv4Addr::new(1, 2, 3, 4)));
        assert_eq!(addr.port, 443);
        assert_eq!(addr.atyp(), ATYP_IPV4);
    }

    #[test]
    fn parse_bracketed_ipv6_target() {
        let addr: TargetAddr = "[2001:db8::1]:8443".parse().unwrap();
        assert_eq!(addr.host, Host::Ipv6("2001:db8::1".parse().unwrap()));
        assert_eq!(addr.port, 8443);
        assert_eq!(addr.to_string(), "[2001:db8::1]:8443");
    }

    #[test]
    fn parse_domain_target() {
        let addr: TargetAddr = "example.com:80".parse().unwrap();
        assert_eq!(addr, TargetAddr::domain("example.com", 80));
        assert_eq!(addr.to_string(), "example.com:80");
    }

    #[test]
    fn parse_rejects_bad_targets() {
        assert_eq!(
            "example.com".parse::<TargetAddr>(),
            Err(AddrParseError::MissingPort)
        );
        assert_eq!(
            "example.com:http".parse::<TargetAddr>(),
            Err(AddrParseError::InvalidPort)
        );
        assert_eq!(
            "example.com:70000".parse::<TargetAddr>(),
            Err(AddrParseError::InvalidPort)
        );
        assert_eq!(":80".parse::<TargetAddr>(), Err(AddrParseError::EmptyHost));
    }

    #[test]
    fn encode_ipv4_is_fixed_width() {
        let mut buf = BytesMut::new();
        encode_address(&mut buf, &"1.2.3.4:443".parse().unwrap()).unwrap();
        assert_eq!(&buf[..], &[ATYP_IPV4, 1, 2, 3, 4, 0x01, 0xbb]);
    }

    #[test]
    fn encode_ipv6_is_fixed_width() {
        let mut buf = BytesMut::new();
        encode_address(&mut buf, &"[::1]:53".parse().unwrap()).unwrap();
        assert_eq!(buf.len(), 1 + 16 + 2);
        assert_eq!(buf[0], ATYP_IPV6);
        assert_eq!(buf[16], 1);
        assert_eq!(&buf[17..], &[0x00, 0x35]);
    }

    #[test]
    fn encode_domain_is_length_prefixed() {
        let mut buf = BytesMut::new();
        encode_address(&mut buf, &TargetAddr::domain("example.com", 8080)).unwrap();
        assert_eq!(buf[0], ATYP_DOMAIN);
        assert_eq!(buf[1] as usize, "example.com".len());
        assert_eq!(&buf[2..13], b"example.com");
        assert_eq!(&buf[13..], &8080u16.to_be_bytes());
    }

    #[test]
    fn encode_rejects_oversized_and_empty_domains() {
        let mut buf = BytesMut::new();
        let long = TargetAddr::domain("a".repeat(256), 443);
        assert_eq!(encode_address(&mut buf, &long), Err(WriteError::DomainTooLong));

        let max = TargetAddr::domain("a".repeat(255), 443);
        encode_address(&mut buf, &max).unwrap();

        let empty = TargetAddr::domain("", 443);
        let mut buf = BytesMut::new();
        assert_eq!(encode_address(&mut buf, &empty), Err(WriteError::EmptyDomain));
        assert!(buf.is_empty());
    }
}

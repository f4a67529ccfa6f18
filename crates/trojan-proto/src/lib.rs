//! Trojan protocol request serialization.
//!
//! A trojan client sends exactly one request frame after the TLS handshake:
//!
//! ```text
//! +-----------------------+---------+-----+------+----------+----------+---------+
//! | hex(SHA224(password)) |  CRLF   | CMD | ATYP | DST.ADDR | DST.PORT |  CRLF   |
//! +-----------------------+---------+-----+------+----------+----------+---------+
//! |          56           | X'0D0A' |  1  |  1   | Variable |    2     | X'0D0A' |
//! +-----------------------+---------+-----+------+----------+----------+---------+
//! ```
//!
//! Everything after the frame is opaque payload.

mod address;

pub use address::{AddrParseError, Host, TargetAddr, encode_address};

use std::fmt;

use bytes::BytesMut;

pub use trojan_core::defaults::HASH_LEN;

pub const CRLF: &[u8; 2] = b"\r\n";

pub const CMD_CONNECT: u8 = 0x01;
pub const CMD_UDP_ASSOCIATE: u8 = 0x03;

/// Maximum domain name length.
pub const MAX_DOMAIN_LEN: usize = 255;

pub const ATYP_IPV4: u8 = 0x01;
pub const ATYP_DOMAIN: u8 = 0x03;
pub const ATYP_IPV6: u8 = 0x04;

/// Request command carried in the frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Connect,
    UdpAssociate,
}

impl Command {
    #[inline]
    pub fn as_u8(self) -> u8 {
        match self {
            Self::Connect => CMD_CONNECT,
            Self::UdpAssociate => CMD_UDP_ASSOCIATE,
        }
    }
}

/// Errors that can occur when writing protocol data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteError {
    /// Domain name exceeds maximum length (255 bytes).
    DomainTooLong,
    /// Domain name is empty.
    EmptyDomain,
    /// Hash must be exactly 56 bytes.
    InvalidHashLen,
}

impl fmt::Display for WriteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DomainTooLong => write!(f, "domain exceeds {MAX_DOMAIN_LEN} bytes"),
            Self::EmptyDomain => write!(f, "domain is empty"),
            Self::InvalidHashLen => write!(f, "credential must be {HASH_LEN} bytes"),
        }
    }
}

impl std::error::Error for WriteError {}

/// Writes a trojan request frame to the buffer.
///
/// The buffer is left untouched on error.
///
/// # Errors
/// - `InvalidHashLen` if hash is not exactly 56 bytes.
/// - `DomainTooLong` / `EmptyDomain` if the target domain cannot be encoded.
pub fn write_request_header(
    buf: &mut BytesMut,
    hash_hex: &[u8],
    command: Command,
    target: &TargetAddr,
) -> Result<(), WriteError> {
    if hash_hex.len() != HASH_LEN {
        return Err(WriteError::InvalidHashLen);
    }
    let start = buf.len();
    buf.extend_from_slice(hash_hex);
    buf.extend_from_slice(CRLF);
    buf.extend_from_slice(&[command.as_u8()]);
    if let Err(e) = encode_address(buf, target) {
        buf.truncate(start);
        return Err(e);
    }
    buf.extend_from_slice(CRLF);
    Ok(())
}

/// Encodes a complete request frame into a fresh buffer.
pub fn encode_request(
    hash_hex: &[u8],
    command: Command,
    target: &TargetAddr,
) -> Result<BytesMut, WriteError> {
    let mut buf = BytesMut::with_capacity(trojan_core::defaults::MAX_HEADER_BYTES);
    write_request_header(&mut buf, hash_hex, command, target)?;
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use trojan_core::defaults::MIN_HEADER_BYTES;

    fn sample_hash() -> [u8; HASH_LEN] {
        [b'a'; HASH_LEN]
    }

    #[test]
    fn connect_ipv4_frame_layout() {
        let target: TargetAddr = "1.2.3.4:443".parse().unwrap();
        let buf = encode_request(&sample_hash(), Command::Connect, &target).unwrap();

        assert_eq!(buf.len(), MIN_HEADER_BYTES);
        assert_eq!(&buf[..HASH_LEN], &sample_hash());
        assert_eq!(&buf[HASH_LEN..HASH_LEN + 2], CRLF);
        assert_eq!(buf[HASH_LEN + 2], CMD_CONNECT);
        assert_eq!(buf[HASH_LEN + 3], ATYP_IPV4);
        assert_eq!(&buf[HASH_LEN + 4..HASH_LEN + 8], &[1, 2, 3, 4]);
        assert_eq!(&buf[HASH_LEN + 8..HASH_LEN + 10], &[0x01, 0xbb]);
        assert_eq!(&buf[HASH_LEN + 10..], CRLF);
    }

    #[test]
    fn connect_domain_frame_is_length_prefixed() {
        let target = TargetAddr::domain("example.com", 80);
        let buf = encode_request(&sample_hash(), Command::Connect, &target).unwrap();

        let addr = &buf[HASH_LEN + 3..];
        assert_eq!(addr[0], ATYP_DOMAIN);
        assert_eq!(addr[1], 11);
        assert_eq!(&addr[2..13], b"example.com");
        assert_eq!(&addr[13..15], &[0x00, 0x50]);
        assert_eq!(&addr[15..], CRLF);
    }

    #[test]
    fn udp_associate_command_byte() {
        let target: TargetAddr = "[::1]:53".parse().unwrap();
        let buf = encode_request(&sample_hash(), Command::UdpAssociate, &target).unwrap();
        assert_eq!(buf[HASH_LEN + 2], CMD_UDP_ASSOCIATE);
        assert_eq!(buf[HASH_LEN + 3], ATYP_IPV6);
        assert_eq!(buf.len(), HASH_LEN + 2 + 1 + 1 + 16 + 2 + 2);
    }

    #[test]
    fn write_request_header_invalid_hash_len() {
        let target: TargetAddr = "1.2.3.4:443".parse().unwrap();
        let mut buf = BytesMut::new();
        let short_hash = [b'a'; HASH_LEN - 1];
        let res = write_request_header(&mut buf, &short_hash, Command::Connect, &target);
        assert_eq!(res, Err(WriteError::InvalidHashLen));
        assert!(buf.is_empty());
    }

    #[test]
    fn write_request_header_domain_too_long_leaves_buffer_clean() {
        let target = TargetAddr::domain("a".repeat(256), 443);
        let mut buf = BytesMut::from(&b"prefix"[..]);
        let res = write_request_header(&mut buf, &sample_hash(), Command::Connect, &target);
        assert_eq!(res, Err(WriteError::DomainTooLong));
        assert_eq!(&buf[..], b"prefix");
    }
}

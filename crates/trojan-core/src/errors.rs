//! Error kind labels for logging.
//!
//! These constants provide consistent error classification across all crates.

/// Descriptor or credential configuration error.
pub const ERROR_CONFIG: &str = "config";
/// Underlying transport connect failure.
pub const ERROR_TRANSPORT: &str = "transport";
/// TLS handshake error.
pub const ERROR_TLS_HANDSHAKE: &str = "tls_handshake";
/// Failure writing the authentication frame.
pub const ERROR_HANDSHAKE: &str = "handshake";
/// Target address could not be encoded.
pub const ERROR_PROTOCOL: &str = "protocol";
/// Operation the protocol client does not support.
pub const ERROR_UNSUPPORTED: &str = "unsupported";

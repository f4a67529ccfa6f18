//! Default configuration values.
//!
//! Centralized default constants for use across all crates.

// ============================================================================
// Endpoint Defaults
// ============================================================================

/// Standard trojan port, used when the descriptor omits one.
pub const DEFAULT_PORT: u16 = 443;

// ============================================================================
// Timeout Defaults
// ============================================================================

/// Default TLS handshake timeout in seconds.
pub const DEFAULT_TLS_HANDSHAKE_TIMEOUT_SECS: u64 = 10;
/// Default transport connect timeout in seconds (0 = no deadline).
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 0;

// ============================================================================
// TCP Socket Defaults
// ============================================================================

/// Default TCP_NODELAY (disable Nagle's algorithm for lower latency).
pub const DEFAULT_TCP_NO_DELAY: bool = true;
/// Default TCP Keep-Alive interval in seconds (0 = disabled).
pub const DEFAULT_TCP_KEEPALIVE_SECS: u64 = 300;

// ============================================================================
// TLS Defaults
// ============================================================================

/// ALPN protocols offered in the ClientHello, matching plain browser traffic.
pub const DEFAULT_ALPN: &[&str] = &["http/1.1"];
/// Capacity of the client TLS session resumption cache.
pub const DEFAULT_TLS_SESSION_CACHE_SIZE: usize = 64;

// ============================================================================
// Protocol Constants
// ============================================================================

/// Trojan protocol hash length (SHA-224 hex = 56 chars).
pub const HASH_LEN: usize = 56;
/// Minimum request frame bytes (hash + CRLF + cmd + atyp + ipv4 + port + CRLF).
pub const MIN_HEADER_BYTES: usize = HASH_LEN + 2 + 1 + 1 + 4 + 2 + 2;
/// Maximum request frame bytes (hash + CRLF + cmd + atyp + len + domain + port + CRLF).
pub const MAX_HEADER_BYTES: usize = HASH_LEN + 2 + 1 + 1 + 1 + 255 + 2 + 2;

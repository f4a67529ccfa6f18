//! Password hashing utilities.

use sha2::{Digest, Sha224};

/// Compute SHA224 hash and return as lowercase hex string.
///
/// This is the standard hash function used by the Trojan protocol.
///
/// # Example
/// ```
/// use trojan_auth::sha224_hex;
///
/// let hash = sha224_hex("password123");
/// assert_eq!(hash.len(), 56); // SHA224 = 224 bits = 28 bytes = 56 hex chars
/// ```
#[inline]
pub fn sha224_hex(input: &str) -> String {
    hex::encode(Sha224::digest(input.as_bytes()))
}

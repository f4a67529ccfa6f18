//! Fixed-length credential value.

use std::fmt;

use sha2::{Digest, Sha224};
use trojan_core::defaults::HASH_LEN;

use crate::error::AuthError;

/// The 56-byte hex SHA-224 digest sent as the first line of every request.
///
/// Computed once per client and copied freely between concurrent dials; it is
/// never mutated. `Debug` never prints the digest.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Credential([u8; HASH_LEN]);

impl Credential {
    /// Digest a plaintext secret.
    ///
    /// # Errors
    /// `MissingCredential` if `secret` is empty.
    pub fn from_secret(secret: &str) -> Result<Self, AuthError> {
        if secret.is_empty() {
            return Err(AuthError::MissingCredential);
        }
        // 28 digest bytes always encode to exactly HASH_LEN hex bytes.
        let mut out = [0u8; HASH_LEN];
        out.copy_from_slice(hex::encode(Sha224::digest(secret.as_bytes())).as_bytes());
        Ok(Self(out))
    }

    #[inline]
    pub fn as_bytes(&self) -> &[u8; HASH_LEN] {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(<redacted>)")
    }
}

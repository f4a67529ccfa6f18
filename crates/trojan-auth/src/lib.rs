//! Credential digesting for trojan.
//!
//! The trojan protocol authenticates with a single line: the lowercase hex
//! SHA-224 digest of the shared password. This crate derives that line once
//! and holds it as an immutable fixed-size value.
//!
//! # Example
//!
//! ```
//! use trojan_auth::Credential;
//!
//! let credential = Credential::from_secret("my_password")?;
//! assert_eq!(credential.as_bytes().len(), 56);
//! # Ok::<(), trojan_auth::AuthError>(())
//! ```

mod credential;
mod error;
mod hash;

pub use credential::Credential;
pub use error::AuthError;
pub use hash::sha224_hex;

//! Credential error types.

/// Credential error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    /// The secret was empty.
    #[error("missing credential")]
    MissingCredential,
}

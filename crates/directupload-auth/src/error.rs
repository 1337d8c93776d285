//! Error types for upload signing credentials.

/// Errors that can occur while preparing credentials for signing.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// The access key or secret is empty or still set to a placeholder value.
    #[error("invalid credential: {0}")]
    InvalidCredential(String),
}

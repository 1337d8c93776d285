//! Error types for upload policy generation.

use directupload_auth::AuthError;

/// Errors raised while building options, URLs, policies, or signatures.
///
/// Every variant except [`UploadError::Render`] is a deterministic
/// input-validation failure.
#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    /// A region or canned ACL outside its fixed allowed set.
    #[error("invalid {kind}: {value}")]
    InvalidValue {
        /// Which value type rejected the input (`region` or `acl`).
        kind: &'static str,
        /// The rejected input.
        value: String,
    },

    /// An option name outside the recognized schema.
    #[error("unknown option: {0}")]
    UnknownOption(String),

    /// An option value that is malformed or of the wrong type.
    #[error("invalid option {name}: {reason}")]
    InvalidOption {
        /// The option name.
        name: String,
        /// Why the value was rejected.
        reason: String,
    },

    /// The expiration is unparseable or outside 1..=604800 seconds from now.
    #[error("invalid expiry: {0}")]
    InvalidExpiry(String),

    /// The signing credentials were rejected.
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// The policy document could not be serialized.
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),

    /// The HTML form template failed to render.
    #[error(transparent)]
    Render(#[from] askama::Error),
}

impl UploadError {
    pub(crate) fn invalid_option(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidOption {
            name: name.into(),
            reason: reason.into(),
        }
    }
}

/// Convenience result type for upload operations.
pub type UploadResult<T> = Result<T, UploadError>;

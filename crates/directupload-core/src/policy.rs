//! POST policy document construction and encoding.
//!
//! A policy is a JSON object with an `expiration` timestamp and an ordered
//! list of `conditions` that S3 checks against every field of the incoming
//! form. Conditions take three shapes:
//!
//! ```text
//! {"bucket": "my-bucket"}                  exact match
//! ["starts-with", "$key", "uploads/"]      prefix match
//! ["content-length-range", 0, 524288000]   size bounds
//! ```
//!
//! The compact JSON is base64-encoded; the encoded string is both the
//! `policy` form field and the message that gets signed.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use directupload_auth::sigv4::{ALGORITHM, SigningDate};
use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};
use tracing::debug;

use crate::error::UploadResult;
use crate::options::UploadOptions;

/// Format of the policy `expiration` field.
const EXPIRATION_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// A single policy condition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Condition {
    /// The form field must equal `value`.
    Exact {
        /// Form field name.
        field: String,
        /// Required value.
        value: String,
    },
    /// The form field must start with `prefix`; an empty prefix matches anything.
    StartsWith {
        /// Form field name, without the leading `$`.
        field: String,
        /// Required prefix.
        prefix: String,
    },
    /// The uploaded body size must fall within `min..=max` bytes.
    ContentLengthRange {
        /// Minimum size in bytes.
        min: u64,
        /// Maximum size in bytes.
        max: u64,
    },
}

impl Condition {
    /// Exact-match condition.
    pub fn exact(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self::Exact {
            field: field.into(),
            value: value.into(),
        }
    }

    /// Prefix-match condition.
    pub fn starts_with(field: impl Into<String>, prefix: impl Into<String>) -> Self {
        Self::StartsWith {
            field: field.into(),
            prefix: prefix.into(),
        }
    }
}

impl Serialize for Condition {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Self::Exact { field, value } => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry(field, value)?;
                map.end()
            }
            Self::StartsWith { field, prefix } => {
                let mut seq = serializer.serialize_seq(Some(3))?;
                seq.serialize_element("starts-with")?;
                seq.serialize_element(&format!("${field}"))?;
                seq.serialize_element(prefix)?;
                seq.end()
            }
            Self::ContentLengthRange { min, max } => {
                let mut seq = serializer.serialize_seq(Some(3))?;
                seq.serialize_element("content-length-range")?;
                seq.serialize_element(min)?;
                seq.serialize_element(max)?;
                seq.end()
            }
        }
    }
}

/// The policy document S3 evaluates before accepting an upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PolicyDocument {
    /// Expiration timestamp, `YYYY-MM-DDThh:mm:ssZ` in UTC.
    pub expiration: String,
    /// Ordered match conditions.
    pub conditions: Vec<Condition>,
}

impl PolicyDocument {
    /// Serialize to compact JSON and base64-encode it.
    ///
    /// # Errors
    /// Returns [`crate::UploadError::Serialization`] if serialization fails.
    pub fn encode(&self) -> UploadResult<String> {
        let json = serde_json::to_string(self)?;
        Ok(STANDARD.encode(json))
    }
}

/// A policy document together with its base64 encoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedPolicy {
    /// The structured document.
    pub document: PolicyDocument,
    /// Base64 of the document's compact JSON; this is what gets signed.
    pub base64: String,
}

/// Build and encode the policy for one upload form.
///
/// `date` supplies both the expiration base and the `x-amz-date` value, so the
/// two can never disagree.
///
/// # Errors
///
/// Returns [`crate::UploadError::InvalidExpiry`] if `options.expires` is
/// invalid or outside 1..=604800 seconds.
pub fn build_policy(
    bucket: &str,
    options: &UploadOptions,
    credential_scope: &str,
    date: &SigningDate,
) -> UploadResult<EncodedPolicy> {
    let expiration = options.expires.expiration_from(date.instant())?;

    let content_type = if !options.content_type.is_empty() {
        Condition::exact("Content-Type", options.content_type.clone())
    } else {
        Condition::starts_with("Content-Type", options.content_type_starts_with.clone())
    };

    let mut conditions = vec![
        Condition::exact("bucket", bucket),
        Condition::exact("acl", options.acl.as_str()),
        Condition::starts_with("key", options.valid_prefix.clone()),
        content_type,
        Condition::ContentLengthRange {
            min: 0,
            max: options.max_file_size_bytes(),
        },
        Condition::exact("success_action_status", options.success_status.clone()),
        Condition::exact("x-amz-credential", credential_scope),
        Condition::exact("x-amz-algorithm", ALGORITHM),
        Condition::exact("x-amz-date", date.full()),
    ];
    conditions.extend(
        options
            .additional_inputs
            .iter()
            .map(|(name, value)| Condition::starts_with(name.clone(), value.clone())),
    );

    let document = PolicyDocument {
        expiration: expiration.format(EXPIRATION_FORMAT).to_string(),
        conditions,
    };
    let base64 = document.encode()?;

    debug!(
        bucket,
        expiration = %document.expiration,
        conditions = document.conditions.len(),
        "Built upload policy"
    );

    Ok(EncodedPolicy { document, base64 })
}

//! Upload options and their derivation rules.
//!
//! [`UploadOptions`] is the live, normalized option set a signer works from.
//! [`OptionOverrides`] carries the caller's partial changes; merging them
//! overlays the set fields and re-runs derivation:
//!
//! - `acl` is validated into a [`CannedAcl`].
//! - `success_status` is stored as a string.
//! - `encryption = true` adds `X-amz-server-side-encryption: AES256` to
//!   `additional_inputs`, so it is both signed and emitted as a form field.
//!
//! Options can also be read and written by name through [`UploadOptions::get`]
//! and [`UploadOptions::set`], which reject names outside the schema.

use std::fmt;
use std::str::FromStr;

use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use tracing::debug;
use typed_builder::TypedBuilder;

use crate::error::{UploadError, UploadResult};
use crate::expiry::Expiry;
use crate::types::CannedAcl;

/// Form field carrying the server-side encryption algorithm.
pub const SSE_FIELD: &str = "X-amz-server-side-encryption";

/// Server-side encryption algorithm requested when `encryption` is enabled.
pub const SSE_ALGORITHM: &str = "AES256";

const BYTES_PER_MEGABYTE: u64 = 1024 * 1024;

/// Recognized option names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OptionKey {
    /// `success_status`
    SuccessStatus,
    /// `acl`
    Acl,
    /// `default_filename`
    DefaultFilename,
    /// `max_file_size`
    MaxFileSize,
    /// `expires`
    Expires,
    /// `valid_prefix`
    ValidPrefix,
    /// `content_type`
    ContentType,
    /// `content_type_starts_with`
    ContentTypeStartsWith,
    /// `encryption`
    Encryption,
    /// `custom_url`
    CustomUrl,
    /// `accelerate`
    Accelerate,
    /// `additional_inputs`
    AdditionalInputs,
}

impl OptionKey {
    /// Every recognized key, in schema order.
    pub const ALL: [Self; 12] = [
        Self::SuccessStatus,
        Self::Acl,
        Self::DefaultFilename,
        Self::MaxFileSize,
        Self::Expires,
        Self::ValidPrefix,
        Self::ContentType,
        Self::ContentTypeStartsWith,
        Self::Encryption,
        Self::CustomUrl,
        Self::Accelerate,
        Self::AdditionalInputs,
    ];

    /// The option's name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::SuccessStatus => "success_status",
            Self::Acl => "acl",
            Self::DefaultFilename => "default_filename",
            Self::MaxFileSize => "max_file_size",
            Self::Expires => "expires",
            Self::ValidPrefix => "valid_prefix",
            Self::ContentType => "content_type",
            Self::ContentTypeStartsWith => "content_type_starts_with",
            Self::Encryption => "encryption",
            Self::CustomUrl => "custom_url",
            Self::Accelerate => "accelerate",
            Self::AdditionalInputs => "additional_inputs",
        }
    }
}

impl fmt::Display for OptionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OptionKey {
    type Err = UploadError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|key| key.as_str() == s)
            .ok_or_else(|| UploadError::UnknownOption(s.to_owned()))
    }
}

/// The normalized option set used to build a policy and its form fields.
///
/// # Examples
///
/// ```
/// use directupload_core::{OptionOverrides, UploadOptions};
///
/// let options = UploadOptions::new(
///     OptionOverrides::builder()
///         .acl("public-read")
///         .success_status(200)
///         .encryption(true)
///         .build(),
/// )
/// .unwrap();
///
/// assert_eq!(options.acl.as_str(), "public-read");
/// assert_eq!(options.success_status, "200");
/// assert_eq!(options.additional_inputs["X-amz-server-side-encryption"], "AES256");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UploadOptions {
    /// HTTP status S3 answers with on success, as a string.
    pub success_status: String,
    /// Canned ACL applied to the uploaded object.
    pub acl: CannedAcl,
    /// Key template appended to `valid_prefix`; `${filename}` is expanded by S3.
    pub default_filename: String,
    /// Maximum upload size in megabytes.
    pub max_file_size: u64,
    /// Policy lifetime.
    pub expires: Expiry,
    /// Required prefix of the uploaded object key.
    pub valid_prefix: String,
    /// Exact content type the upload must carry, if non-empty.
    pub content_type: String,
    /// Content type prefix, used only when `content_type` is empty.
    pub content_type_starts_with: String,
    /// Whether server-side encryption is requested.
    pub encryption: bool,
    /// Endpoint overriding the AWS-hosted URL (S3-compatible services).
    pub custom_url: Option<String>,
    /// Whether to post to the transfer-acceleration endpoint.
    pub accelerate: bool,
    /// Extra form fields, each signed as a `starts-with` condition.
    pub additional_inputs: IndexMap<String, String>,
}

impl Default for UploadOptions {
    fn default() -> Self {
        Self {
            success_status: "201".to_owned(),
            acl: CannedAcl::default(),
            default_filename: "${filename}".to_owned(),
            max_file_size: 500,
            expires: Expiry::default(),
            valid_prefix: String::new(),
            content_type: String::new(),
            content_type_starts_with: String::new(),
            encryption: false,
            custom_url: None,
            accelerate: false,
            additional_inputs: IndexMap::new(),
        }
    }
}

impl UploadOptions {
    /// Start from the defaults and apply `overrides`.
    ///
    /// # Errors
    /// Returns [`UploadError::InvalidValue`] if the ACL override is not a
    /// recognized canned ACL.
    pub fn new(overrides: OptionOverrides) -> UploadResult<Self> {
        let mut options = Self::default();
        options.merge(overrides)?;
        Ok(options)
    }

    /// Start from the defaults and apply overrides given as a JSON object.
    ///
    /// # Errors
    /// Same as [`UploadOptions::merge_json`].
    pub fn from_json(overrides: &Map<String, Value>) -> UploadResult<Self> {
        Self::new(OptionOverrides::from_json(overrides)?)
    }

    /// Overlay `overrides` onto the current values and re-run derivation.
    ///
    /// Fields left unset in `overrides` keep their current value. On error the
    /// options are left unchanged.
    ///
    /// # Errors
    /// Returns [`UploadError::InvalidValue`] for an unrecognized ACL.
    pub fn merge(&mut self, overrides: OptionOverrides) -> UploadResult<()> {
        let mut next = self.clone();

        if let Some(status) = overrides.success_status {
            next.success_status = status.to_string();
        }
        if let Some(acl) = overrides.acl {
            next.acl = CannedAcl::new(&acl)?;
        }
        if let Some(filename) = overrides.default_filename {
            next.default_filename = filename;
        }
        if let Some(size) = overrides.max_file_size {
            next.max_file_size = size;
        }
        if let Some(expires) = overrides.expires {
            next.expires = expires;
        }
        if let Some(prefix) = overrides.valid_prefix {
            next.valid_prefix = prefix;
        }
        if let Some(content_type) = overrides.content_type {
            next.content_type = content_type;
        }
        if let Some(prefix) = overrides.content_type_starts_with {
            next.content_type_starts_with = prefix;
        }
        if let Some(encryption) = overrides.encryption {
            next.encryption = encryption;
        }
        if let Some(url) = overrides.custom_url {
            next.custom_url = Some(url);
        }
        if let Some(accelerate) = overrides.accelerate {
            next.accelerate = accelerate;
        }
        if let Some(inputs) = overrides.additional_inputs {
            next.additional_inputs = inputs;
        }

        next.derive();
        *self = next;
        Ok(())
    }

    /// Merge overrides given as a JSON object keyed by option name.
    ///
    /// # Errors
    /// Returns [`UploadError::UnknownOption`] for names outside the schema,
    /// [`UploadError::InvalidOption`] for values of the wrong type, and
    /// [`UploadError::InvalidValue`] for an unrecognized ACL.
    pub fn merge_json(&mut self, overrides: &Map<String, Value>) -> UploadResult<()> {
        self.merge(OptionOverrides::from_json(overrides)?)
    }

    /// Read an option by name.
    ///
    /// # Errors
    /// Returns [`UploadError::UnknownOption`] if `name` is not recognized.
    pub fn get(&self, name: &str) -> UploadResult<Value> {
        let key: OptionKey = name.parse()?;
        let value = match key {
            OptionKey::SuccessStatus => Value::from(self.success_status.clone()),
            OptionKey::Acl => Value::from(self.acl.as_str()),
            OptionKey::DefaultFilename => Value::from(self.default_filename.clone()),
            OptionKey::MaxFileSize => Value::from(self.max_file_size),
            OptionKey::Expires => serde_json::to_value(&self.expires)?,
            OptionKey::ValidPrefix => Value::from(self.valid_prefix.clone()),
            OptionKey::ContentType => Value::from(self.content_type.clone()),
            OptionKey::ContentTypeStartsWith => Value::from(self.content_type_starts_with.clone()),
            OptionKey::Encryption => Value::from(self.encryption),
            OptionKey::CustomUrl => self.custom_url.clone().map_or(Value::Null, Value::from),
            OptionKey::Accelerate => Value::from(self.accelerate),
            OptionKey::AdditionalInputs => serde_json::to_value(&self.additional_inputs)?,
        };
        Ok(value)
    }

    /// Overwrite a single option by name without re-running derivation.
    ///
    /// # Errors
    /// Returns [`UploadError::UnknownOption`] if `name` is not recognized,
    /// [`UploadError::InvalidOption`] if `value` has the wrong type, or
    /// [`UploadError::InvalidValue`] for an unrecognized ACL.
    pub fn set(&mut self, name: &str, value: Value) -> UploadResult<()> {
        let key: OptionKey = name.parse()?;
        match key {
            OptionKey::SuccessStatus => {
                self.success_status = status_to_string(key, value)?;
            }
            OptionKey::Acl => {
                let acl: String = decode(key, value)?;
                self.acl = CannedAcl::new(&acl)?;
            }
            OptionKey::DefaultFilename => self.default_filename = decode(key, value)?,
            OptionKey::MaxFileSize => self.max_file_size = decode(key, value)?,
            OptionKey::Expires => self.expires = decode(key, value)?,
            OptionKey::ValidPrefix => self.valid_prefix = decode(key, value)?,
            OptionKey::ContentType => self.content_type = decode(key, value)?,
            OptionKey::ContentTypeStartsWith => self.content_type_starts_with = decode(key, value)?,
            OptionKey::Encryption => self.encryption = decode(key, value)?,
            OptionKey::CustomUrl => self.custom_url = decode(key, value)?,
            OptionKey::Accelerate => self.accelerate = decode(key, value)?,
            OptionKey::AdditionalInputs => self.additional_inputs = decode(key, value)?,
        }
        debug!(option = %key, "Option overwritten");
        Ok(())
    }

    /// Upper bound of the `content-length-range` condition, in bytes.
    #[must_use]
    pub fn max_file_size_bytes(&self) -> u64 {
        self.max_file_size.saturating_mul(BYTES_PER_MEGABYTE)
    }

    /// The `key` form field: `valid_prefix` followed by `default_filename`.
    #[must_use]
    pub fn key_template(&self) -> String {
        format!("{}{}", self.valid_prefix, self.default_filename)
    }

    fn derive(&mut self) {
        if self.encryption {
            self.additional_inputs
                .insert(SSE_FIELD.to_owned(), SSE_ALGORITHM.to_owned());
        }
    }
}

/// Partial option changes applied by [`UploadOptions::merge`].
///
/// Unset fields leave the current value untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, TypedBuilder)]
#[serde(deny_unknown_fields)]
pub struct OptionOverrides {
    /// See [`UploadOptions::success_status`].
    #[builder(default, setter(strip_option))]
    #[serde(default, deserialize_with = "deserialize_status")]
    pub success_status: Option<u16>,
    /// See [`UploadOptions::acl`].
    #[builder(default, setter(strip_option, into))]
    #[serde(default)]
    pub acl: Option<String>,
    /// See [`UploadOptions::default_filename`].
    #[builder(default, setter(strip_option, into))]
    #[serde(default)]
    pub default_filename: Option<String>,
    /// See [`UploadOptions::max_file_size`].
    #[builder(default, setter(strip_option))]
    #[serde(default)]
    pub max_file_size: Option<u64>,
    /// See [`UploadOptions::expires`].
    #[builder(default, setter(strip_option, into))]
    #[serde(default)]
    pub expires: Option<Expiry>,
    /// See [`UploadOptions::valid_prefix`].
    #[builder(default, setter(strip_option, into))]
    #[serde(default)]
    pub valid_prefix: Option<String>,
    /// See [`UploadOptions::content_type`].
    #[builder(default, setter(strip_option, into))]
    #[serde(default)]
    pub content_type: Option<String>,
    /// See [`UploadOptions::content_type_starts_with`].
    #[builder(default, setter(strip_option, into))]
    #[serde(default)]
    pub content_type_starts_with: Option<String>,
    /// See [`UploadOptions::encryption`].
    #[builder(default, setter(strip_option))]
    #[serde(default)]
    pub encryption: Option<bool>,
    /// See [`UploadOptions::custom_url`].
    #[builder(default, setter(strip_option, into))]
    #[serde(default)]
    pub custom_url: Option<String>,
    /// See [`UploadOptions::accelerate`].
    #[builder(default, setter(strip_option))]
    #[serde(default)]
    pub accelerate: Option<bool>,
    /// See [`UploadOptions::additional_inputs`].
    #[builder(default, setter(strip_option, into))]
    #[serde(default)]
    pub additional_inputs: Option<IndexMap<String, String>>,
}

impl OptionOverrides {
    /// Parse overrides from a JSON object keyed by option name.
    ///
    /// # Errors
    /// Returns [`UploadError::UnknownOption`] for names outside the schema and
    /// [`UploadError::InvalidOption`] for values of the wrong type.
    ///
    /// # Examples
    ///
    /// ```
    /// use directupload_core::OptionOverrides;
    ///
    /// let json = serde_json::json!({ "acl": "public-read", "success_status": "200" });
    /// let overrides = OptionOverrides::from_json(json.as_object().unwrap()).unwrap();
    /// assert_eq!(overrides.success_status, Some(200));
    ///
    /// let bad = serde_json::json!({ "colour": "blue" });
    /// assert!(OptionOverrides::from_json(bad.as_object().unwrap()).is_err());
    /// ```
    pub fn from_json(overrides: &Map<String, Value>) -> UploadResult<Self> {
        for name in overrides.keys() {
            name.parse::<OptionKey>()?;
        }
        serde_json::from_value(Value::Object(overrides.clone()))
            .map_err(|e| UploadError::invalid_option("overrides", e.to_string()))
    }
}

fn decode<T: DeserializeOwned>(key: OptionKey, value: Value) -> UploadResult<T> {
    serde_json::from_value(value).map_err(|e| UploadError::invalid_option(key.as_str(), e.to_string()))
}

fn status_to_string(key: OptionKey, value: Value) -> UploadResult<String> {
    match value {
        Value::Number(n) if n.is_u64() => Ok(n.to_string()),
        Value::String(s) => Ok(s),
        other => Err(UploadError::invalid_option(
            key.as_str(),
            format!("expected a status code, got {other}"),
        )),
    }
}

/// Accept a status code as a JSON number or a numeric string.
fn deserialize_status<'de, D>(deserializer: D) -> Result<Option<u16>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Status {
        Number(u16),
        Text(String),
    }

    match Option::<Status>::deserialize(deserializer)? {
        None => Ok(None),
        Some(Status::Number(code)) => Ok(Some(code)),
        Some(Status::Text(text)) => text
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| serde::de::Error::custom(format!("invalid status code {text:?}"))),
    }
}

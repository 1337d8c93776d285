//! Configuration for generating an upload form from the environment.
//!
//! Provides [`DirectUploadConfig`], loaded from environment variables by the
//! command-line app. Credentials are read separately by
//! [`directupload_auth::Credentials::from_env`].

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use typed_builder::TypedBuilder;

use crate::error::{UploadError, UploadResult};
use crate::options::OptionOverrides;
use crate::types::Region;

/// How the generated form is printed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// `{"url": ..., "fields": {...}}`
    #[default]
    Json,
    /// A complete `<form>` element.
    Html,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Json => f.write_str("json"),
            Self::Html => f.write_str("html"),
        }
    }
}

impl FromStr for OutputFormat {
    type Err = UploadError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "html" => Ok(Self::Html),
            other => Err(UploadError::invalid_option(
                "format",
                format!("expected json or html, got {other:?}"),
            )),
        }
    }
}

/// Upload form configuration.
///
/// # Examples
///
/// ```
/// use directupload_core::config::DirectUploadConfig;
///
/// let config = DirectUploadConfig::builder().bucket("uploads".into()).build();
/// assert_eq!(config.region.as_str(), "us-east-1");
/// assert_eq!(config.log_level, "info");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, TypedBuilder)]
#[serde(rename_all = "camelCase")]
pub struct DirectUploadConfig {
    /// Bucket the form uploads into.
    #[builder(default)]
    pub bucket: String,

    /// Region of the bucket.
    #[builder(default)]
    pub region: Region,

    /// Option overrides applied on top of the defaults.
    #[serde(skip)]
    #[builder(default)]
    pub options: OptionOverrides,

    /// Output format of the generated form.
    #[builder(default)]
    pub format: OutputFormat,

    /// Log level filter string (e.g. `"info"`, `"debug"`).
    #[builder(default = String::from("info"))]
    pub log_level: String,
}

impl Default for DirectUploadConfig {
    fn default() -> Self {
        Self {
            bucket: String::new(),
            region: Region::default(),
            options: OptionOverrides::default(),
            format: OutputFormat::default(),
            log_level: String::from("info"),
        }
    }
}

impl DirectUploadConfig {
    /// Load configuration from environment variables.
    ///
    /// | Variable | Default |
    /// |----------|---------|
    /// | `DIRECTUPLOAD_BUCKET` | *(required)* |
    /// | `DIRECTUPLOAD_REGION` | `us-east-1` |
    /// | `DIRECTUPLOAD_OPTIONS` | `{}` (JSON object of option overrides) |
    /// | `DIRECTUPLOAD_FORMAT` | `json` |
    /// | `LOG_LEVEL` | `info` |
    ///
    /// # Errors
    ///
    /// Returns an error if the bucket is missing, the region is unknown, the
    /// format is unrecognized, or the options are not a valid JSON object of
    /// known options.
    pub fn from_env() -> UploadResult<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Same as [`DirectUploadConfig::from_env`].
    pub fn from_lookup<F>(lookup: F) -> UploadResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        config.bucket = lookup("DIRECTUPLOAD_BUCKET")
            .filter(|bucket| !bucket.is_empty())
            .ok_or_else(|| UploadError::invalid_option("bucket", "DIRECTUPLOAD_BUCKET is not set"))?;
        if let Some(v) = lookup("DIRECTUPLOAD_REGION") {
            config.region = Region::new(&v)?;
        }
        if let Some(v) = lookup("DIRECTUPLOAD_OPTIONS") {
            config.options = parse_overrides(&v)?;
        }
        if let Some(v) = lookup("DIRECTUPLOAD_FORMAT") {
            config.format = v.parse()?;
        }
        if let Some(v) = lookup("LOG_LEVEL") {
            config.log_level = v;
        }

        Ok(config)
    }
}

fn parse_overrides(raw: &str) -> UploadResult<OptionOverrides> {
    let value: Value = serde_json::from_str(raw)
        .map_err(|e| UploadError::invalid_option("options", e.to_string()))?;
    let map = value
        .as_object()
        .ok_or_else(|| UploadError::invalid_option("options", "expected a JSON object"))?;
    OptionOverrides::from_json(map)
}

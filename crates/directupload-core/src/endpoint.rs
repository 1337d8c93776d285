//! Destination URL for the upload form.

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use url::Url;

use crate::error::{UploadError, UploadResult};
use crate::options::UploadOptions;
use crate::types::Region;

/// Characters escaped in a bucket name. Alphanumerics and `-_.` pass through.
const BUCKET_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC.remove(b'-').remove(b'_').remove(b'.');

/// Percent-encode a bucket name for use in a URL, preserving case.
///
/// # Examples
///
/// ```
/// use directupload_core::endpoint::encode_bucket;
///
/// assert_eq!(encode_bucket("test/bucket"), "test%2Fbucket");
/// assert_eq!(encode_bucket("CAPS_BUCKET"), "CAPS_BUCKET");
/// ```
#[must_use]
pub fn encode_bucket(bucket: &str) -> String {
    utf8_percent_encode(bucket, BUCKET_ENCODE_SET).to_string()
}

/// Build the URL the browser form posts to.
///
/// - A `custom_url` wins and must be an absolute URL with a host.
/// - Otherwise `accelerate` selects `//<bucket>.s3-accelerate.amazonaws.com`.
/// - Otherwise the path-style regional endpoint is used; `us-east-1` has no
///   region segment in its hostname.
///
/// # Errors
///
/// Returns [`UploadError::InvalidOption`] if `custom_url` is not a valid
/// absolute URL.
///
/// # Examples
///
/// ```
/// use directupload_core::endpoint::build_url;
/// use directupload_core::{Region, UploadOptions};
///
/// let options = UploadOptions::default();
/// let region = Region::new("eu-west-1").unwrap();
/// assert_eq!(
///     build_url("test/bucket", region, &options).unwrap(),
///     "//s3-eu-west-1.amazonaws.com/test%2Fbucket"
/// );
/// ```
pub fn build_url(bucket: &str, region: Region, options: &UploadOptions) -> UploadResult<String> {
    let bucket = encode_bucket(bucket);

    if let Some(custom) = &options.custom_url {
        let custom = custom.trim();
        let parsed = Url::parse(custom)
            .map_err(|e| UploadError::invalid_option("custom_url", format!("{custom:?}: {e}")))?;
        if !parsed.has_host() {
            return Err(UploadError::invalid_option(
                "custom_url",
                format!("{custom:?} has no host"),
            ));
        }
        return Ok(format!("{}/{bucket}", custom.trim_end_matches('/')));
    }

    if options.accelerate {
        return Ok(format!("//{bucket}.s3-accelerate.amazonaws.com"));
    }

    let region_segment = if region.is_default() {
        String::new()
    } else {
        format!("-{region}")
    };
    Ok(format!("//s3{region_segment}.amazonaws.com/{bucket}"))
}

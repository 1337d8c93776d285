//! AWS Signature Version 4 signing for POST policies.
//!
//! Browser uploads sign the base64-encoded policy document directly, so there
//! is no canonical request or string-to-sign step. The flow is:
//!
//! 1. Capture one timestamp and format it as a short date (`YYYYMMDD`) and a
//!    full ISO-8601 basic timestamp (`YYYYMMDDTHHMMSSZ`).
//! 2. Build the credential scope `AKID/date/region/service/aws4_request`.
//! 3. Derive the signing key using the HMAC-SHA256 chain over the scope parts.
//! 4. HMAC the encoded policy with the signing key and hex-encode the result.

use chrono::{DateTime, Utc};
use hmac::{Hmac, KeyInit, Mac};
use sha2::Sha256;
use tracing::debug;

/// The signing algorithm identifier.
pub const ALGORITHM: &str = "AWS4-HMAC-SHA256";

/// The service identifier used in the credential scope.
pub const SERVICE: &str = "s3";

/// The terminating request-type component of the credential scope.
pub const REQUEST_TYPE: &str = "aws4_request";

type HmacSha256 = Hmac<Sha256>;

/// A single captured instant used for every date-derived signing field.
///
/// All formats come from the same instant, so the credential scope, the
/// `x-amz-date` field and the policy expiration always agree even if the wall
/// clock advances during signing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SigningDate(DateTime<Utc>);

impl SigningDate {
    /// Capture the current time.
    #[must_use]
    pub fn now() -> Self {
        Self(Utc::now())
    }

    /// The captured instant.
    #[must_use]
    pub fn instant(&self) -> DateTime<Utc> {
        self.0
    }

    /// The date component of the credential scope (`YYYYMMDD`).
    ///
    /// # Examples
    ///
    /// ```
    /// use chrono::{TimeZone, Utc};
    /// use directupload_auth::sigv4::SigningDate;
    ///
    /// let date = SigningDate::from(Utc.with_ymd_and_hms(2013, 5, 24, 0, 0, 0).unwrap());
    /// assert_eq!(date.short(), "20130524");
    /// ```
    #[must_use]
    pub fn short(&self) -> String {
        self.0.format("%Y%m%d").to_string()
    }

    /// The ISO-8601 basic timestamp (`YYYYMMDDTHHMMSSZ`).
    #[must_use]
    pub fn full(&self) -> String {
        self.0.format("%Y%m%dT%H%M%SZ").to_string()
    }
}

impl From<DateTime<Utc>> for SigningDate {
    fn from(instant: DateTime<Utc>) -> Self {
        Self(instant)
    }
}

/// Build the credential scope string.
///
/// # Examples
///
/// ```
/// use directupload_auth::sigv4::credential_scope;
///
/// let scope = credential_scope("AKID", "20130524", "us-east-1", "s3", "aws4_request");
/// assert_eq!(scope, "AKID/20130524/us-east-1/s3/aws4_request");
/// ```
#[must_use]
pub fn credential_scope(
    access_key_id: &str,
    date: &str,
    region: &str,
    service: &str,
    request_type: &str,
) -> String {
    [access_key_id, date, region, service, request_type].join("/")
}

/// Derive the SigV4 signing key using HMAC-SHA256 chain.
///
/// ```text
/// DateKey              = HMAC-SHA256("AWS4" + secret_key, date)
/// DateRegionKey        = HMAC-SHA256(DateKey, region)
/// DateRegionServiceKey = HMAC-SHA256(DateRegionKey, service)
/// SigningKey           = HMAC-SHA256(DateRegionServiceKey, request_type)
/// ```
///
/// Each step keys on the raw digest of the previous one.
#[must_use]
pub fn derive_signing_key(
    secret_key: &str,
    date: &str,
    region: &str,
    service: &str,
    request_type: &str,
) -> Vec<u8> {
    let date_key = hmac_sha256(format!("AWS4{secret_key}").as_bytes(), date.as_bytes());
    let date_region_key = hmac_sha256(&date_key, region.as_bytes());
    let date_region_service_key = hmac_sha256(&date_region_key, service.as_bytes());
    hmac_sha256(&date_region_service_key, request_type.as_bytes())
}

/// Sign the base64-encoded policy with the derived signing key.
///
/// Returns the lower-case hex signature (always 64 characters).
///
/// # Examples
///
/// ```
/// use directupload_auth::sigv4::{derive_signing_key, sign};
///
/// let key = derive_signing_key("secret", "20240101", "eu-west-1", "s3", "aws4_request");
/// let signature = sign("e30=", &key);
/// assert_eq!(signature.len(), 64);
/// ```
#[must_use]
pub fn sign(base64_policy: &str, signing_key: &[u8]) -> String {
    let signature = hex::encode(hmac_sha256(signing_key, base64_policy.as_bytes()));
    debug!(policy_len = base64_policy.len(), "Signed upload policy");
    signature
}

/// Compute HMAC-SHA256 and return the raw bytes.
fn hmac_sha256(key: &[u8], data: &[u8]) -> Vec<u8> {
    let mut mac = HmacSha256::new_from_slice(key).expect("HMAC can accept keys of any length");
    mac.update(data);
    mac.finalize().into_bytes().to_vec()
}

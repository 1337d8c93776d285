//! Validated value types for regions and canned ACLs.
//!
//! Both types normalize their input to lower case and reject anything outside
//! a fixed allowed set, so an invalid value is caught where it enters the
//! system rather than deep inside policy building.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::UploadError;

/// Regions an upload endpoint can be built for.
const REGIONS: &[&str] = &[
    "ap-northeast-1",
    "ap-northeast-2",
    "ap-northeast-3",
    "ap-south-1",
    "ap-southeast-1",
    "ap-southeast-2",
    "ca-central-1",
    "cn-north-1",
    "cn-northwest-1",
    "eu-central-1",
    "eu-north-1",
    "eu-west-1",
    "eu-west-2",
    "eu-west-3",
    "sa-east-1",
    "us-east-1",
    "us-east-2",
    "us-gov-west-1",
    "us-west-1",
    "us-west-2",
];

/// Canned ACLs accepted in an upload policy.
const CANNED_ACLS: &[&str] = &[
    "authenticated-read",
    "aws-exec-read",
    "bucket-owner-full-control",
    "bucket-owner-read",
    "log-delivery-write",
    "private",
    "public-read",
    "public-read-write",
];

/// Lower-case `raw` and return the matching entry of `allowed`.
fn normalize(
    kind: &'static str,
    allowed: &'static [&'static str],
    raw: &str,
) -> Result<&'static str, UploadError> {
    let lowered = raw.to_ascii_lowercase();
    allowed
        .iter()
        .copied()
        .find(|candidate| *candidate == lowered)
        .ok_or_else(|| UploadError::InvalidValue {
            kind,
            value: raw.to_owned(),
        })
}

/// AWS Region identifier.
///
/// # Examples
///
/// ```
/// use directupload_core::Region;
///
/// let region = Region::new("EU-West-1").unwrap();
/// assert_eq!(region.as_str(), "eu-west-1");
/// assert!(Region::new("moon-base-1").is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(into = "String")]
pub struct Region(&'static str);

impl Region {
    /// The legacy default region, addressed without a region segment.
    pub const DEFAULT: &'static str = "us-east-1";

    /// Validate and normalize a region name.
    ///
    /// # Errors
    /// Returns [`UploadError::InvalidValue`] if the region is not recognized.
    pub fn new(region: &str) -> Result<Self, UploadError> {
        normalize("region", REGIONS, region).map(Self)
    }

    /// Get the region as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        self.0
    }

    /// Whether this is the legacy global region.
    #[must_use]
    pub fn is_default(&self) -> bool {
        self.0 == Self::DEFAULT
    }

    /// All recognized region names.
    #[must_use]
    pub fn allowed() -> &'static [&'static str] {
        REGIONS
    }
}

impl Default for Region {
    fn default() -> Self {
        Self(Self::DEFAULT)
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

impl FromStr for Region {
    type Err = UploadError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for Region {
    type Error = UploadError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(&value)
    }
}

impl<'de> Deserialize<'de> for Region {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::new(&raw).map_err(serde::de::Error::custom)
    }
}

impl From<Region> for String {
    fn from(region: Region) -> Self {
        region.0.to_owned()
    }
}

/// Canned access control list applied to the uploaded object.
///
/// # Examples
///
/// ```
/// use directupload_core::CannedAcl;
///
/// let acl: CannedAcl = "Public-Read".parse().unwrap();
/// assert_eq!(acl.to_string(), "public-read");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(into = "String")]
pub struct CannedAcl(&'static str);

impl CannedAcl {
    /// ACL applied when none is configured.
    pub const DEFAULT: &'static str = "private";

    /// Validate and normalize a canned ACL name.
    ///
    /// # Errors
    /// Returns [`UploadError::InvalidValue`] if the ACL is not recognized.
    pub fn new(acl: &str) -> Result<Self, UploadError> {
        normalize("acl", CANNED_ACLS, acl).map(Self)
    }

    /// Get the ACL as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        self.0
    }

    /// All recognized canned ACL names.
    #[must_use]
    pub fn allowed() -> &'static [&'static str] {
        CANNED_ACLS
    }
}

impl Default for CannedAcl {
    fn default() -> Self {
        Self(Self::DEFAULT)
    }
}

impl fmt::Display for CannedAcl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

impl FromStr for CannedAcl {
    type Err = UploadError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for CannedAcl {
    type Error = UploadError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(&value)
    }
}

impl<'de> Deserialize<'de> for CannedAcl {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::new(&raw).map_err(serde::de::Error::custom)
    }
}

impl From<CannedAcl> for String {
    fn from(acl: CannedAcl) -> Self {
        acl.0.to_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_should_accept_every_region_in_any_case() {
        for name in Region::allowed() {
            assert_eq!(Region::new(name).unwrap().as_str(), *name);
            assert_eq!(Region::new(&name.to_uppercase()).unwrap().to_string(), *name);
        }
    }

    #[test]
    fn test_should_reject_unknown_region() {
        for bad in ["", "eu-west", "us-east-1 ", "mars-north-1"] {
            assert!(
                matches!(
                    Region::new(bad),
                    Err(UploadError::InvalidValue { kind: "region", .. })
                ),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_should_use_default_region() {
        let region = Region::default();
        assert_eq!(region.as_str(), "us-east-1");
        assert!(region.is_default());
        assert!(!Region::new("eu-west-1").unwrap().is_default());
    }

    #[test]
    fn test_should_accept_every_acl_in_any_case() {
        for name in CannedAcl::allowed() {
            assert_eq!(CannedAcl::new(name).unwrap().as_str(), *name);
            assert_eq!(
                CannedAcl::new(&name.to_uppercase()).unwrap().to_string(),
                *name
            );
        }
    }

    #[test]
    fn test_should_reject_unknown_acl() {
        assert!(matches!(
            CannedAcl::new("invalid"),
            Err(UploadError::InvalidValue { kind: "acl", .. })
        ));
    }

    #[test]
    fn test_should_round_trip_through_serde_as_strings() {
        let acl: CannedAcl = serde_json::from_str("\"PUBLIC-READ\"").unwrap();
        assert_eq!(serde_json::to_string(&acl).unwrap(), "\"public-read\"");

        let region: Result<Region, _> = serde_json::from_str("\"nowhere\"");
        assert!(region.is_err());
    }

    #[test]
    fn test_should_deserialize_from_owned_input() {
        let raw = serde_json::Value::String(String::from("EU-WEST-1"));
        let region: Region = serde_json::from_value(raw).unwrap();
        assert_eq!(region.as_str(), "eu-west-1");

        let acls: Vec<CannedAcl> =
            serde_json::from_reader(r#"["private", "bucket-owner-read"]"#.as_bytes()).unwrap();
        assert_eq!(acls[1].as_str(), "bucket-owner-read");
    }
}

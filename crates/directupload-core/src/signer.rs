//! The upload signer aggregate.
//!
//! [`UploadSigner`] owns everything needed to produce one signed upload form:
//! credentials, bucket, region, options, and the instant the signature is
//! dated at. The instant is captured once at construction, and the signed
//! policy is computed on first use and cached for the signer's lifetime.

use std::sync::OnceLock;

use directupload_auth::credentials::Credentials;
use directupload_auth::sigv4::{
    REQUEST_TYPE, SERVICE, SigningDate, credential_scope, derive_signing_key, sign,
};
use indexmap::IndexMap;
use tracing::debug;

use crate::endpoint::build_url;
use crate::error::UploadResult;
use crate::form::build_form_inputs;
use crate::html::render_hidden_inputs;
use crate::options::{OptionOverrides, UploadOptions};
use crate::policy::{EncodedPolicy, build_policy};
use crate::types::Region;

/// The signed artifacts of one upload policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedPolicy {
    /// `AKID/YYYYMMDD/region/s3/aws4_request`.
    pub credential_scope: String,
    /// The policy document and its base64 encoding.
    pub policy: EncodedPolicy,
    /// Hex HMAC-SHA256 of the encoded policy.
    pub signature: String,
    /// The `x-amz-date` value (`YYYYMMDDTHHMMSSZ`).
    pub date: String,
}

/// Signs browser upload policies for a single bucket.
///
/// Concurrent first use from several threads may sign twice, but every input
/// is fixed at construction so both results are identical and only one is
/// kept.
///
/// # Examples
///
/// ```
/// use directupload_auth::Credentials;
/// use directupload_core::{OptionOverrides, UploadSigner};
///
/// let signer = UploadSigner::new(
///     Credentials::new("key", "secret").unwrap(),
///     "test/bucket",
///     "eu-west-1",
///     OptionOverrides::default(),
/// )
/// .unwrap();
///
/// assert_eq!(signer.form_url().unwrap(), "//s3-eu-west-1.amazonaws.com/test%2Fbucket");
/// assert_eq!(signer.signature().unwrap().len(), 64);
/// ```
#[derive(Debug)]
pub struct UploadSigner {
    credentials: Credentials,
    bucket: String,
    region: Region,
    options: UploadOptions,
    date: SigningDate,
    scope: OnceLock<String>,
    signed: OnceLock<SignedPolicy>,
}

impl UploadSigner {
    /// Create a signer, validating the region and applying option overrides.
    ///
    /// # Errors
    /// Returns [`crate::UploadError::InvalidValue`] for an unknown region or ACL.
    pub fn new(
        credentials: Credentials,
        bucket: impl Into<String>,
        region: &str,
        overrides: OptionOverrides,
    ) -> UploadResult<Self> {
        let region = Region::new(region)?;
        let options = UploadOptions::new(overrides)?;
        Ok(Self::with_options(credentials, bucket, region, options))
    }

    /// Create a signer from already-validated parts.
    pub fn with_options(
        credentials: Credentials,
        bucket: impl Into<String>,
        region: Region,
        options: UploadOptions,
    ) -> Self {
        Self {
            credentials,
            bucket: bucket.into(),
            region,
            options,
            date: SigningDate::now(),
            scope: OnceLock::new(),
            signed: OnceLock::new(),
        }
    }

    /// Create a signer with credentials from `AWS_ACCESS_KEY_ID` and
    /// `AWS_SECRET_ACCESS_KEY`.
    ///
    /// # Errors
    /// Returns [`crate::UploadError::Auth`] if the variables are missing or
    /// placeholders, plus the errors of [`UploadSigner::new`].
    pub fn from_env(
        bucket: impl Into<String>,
        region: &str,
        overrides: OptionOverrides,
    ) -> UploadResult<Self> {
        Self::new(Credentials::from_env()?, bucket, region, overrides)
    }

    /// Date the signature at `date` instead of the construction time.
    #[must_use]
    pub fn at(mut self, date: impl Into<SigningDate>) -> Self {
        self.date = date.into();
        self.scope = OnceLock::new();
        self.signed = OnceLock::new();
        self
    }

    /// Merge option overrides and drop the cached signature.
    ///
    /// The signing instant is kept. On error the options and any cached
    /// signature are left unchanged.
    ///
    /// # Errors
    /// Returns [`crate::UploadError::InvalidValue`] for an unrecognized ACL.
    pub fn merge_options(&mut self, overrides: OptionOverrides) -> UploadResult<()> {
        self.options.merge(overrides)?;
        self.scope = OnceLock::new();
        self.signed = OnceLock::new();
        debug!(bucket = %self.bucket, "Upload options updated, signature reset");
        Ok(())
    }

    /// The bucket name.
    #[must_use]
    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    /// The bucket's region.
    #[must_use]
    pub fn region(&self) -> Region {
        self.region
    }

    /// The normalized options.
    #[must_use]
    pub fn options(&self) -> &UploadOptions {
        &self.options
    }

    /// The instant every date field is derived from.
    #[must_use]
    pub fn signing_date(&self) -> SigningDate {
        self.date
    }

    /// The URL the form posts to.
    ///
    /// # Errors
    /// Returns [`crate::UploadError::InvalidOption`] for a malformed `custom_url`.
    pub fn form_url(&self) -> UploadResult<String> {
        build_url(&self.bucket, self.region, &self.options)
    }

    /// The credential scope, `AKID/YYYYMMDD/region/s3/aws4_request`.
    #[must_use]
    pub fn credential_scope(&self) -> &str {
        self.scope.get_or_init(|| {
            credential_scope(
                self.credentials.access_key_id(),
                &self.date.short(),
                self.region.as_str(),
                SERVICE,
                REQUEST_TYPE,
            )
        })
    }

    /// The policy document and its base64 encoding.
    ///
    /// # Errors
    /// Same as [`UploadSigner::signed`].
    pub fn policy(&self) -> UploadResult<&EncodedPolicy> {
        Ok(&self.signed()?.policy)
    }

    /// The hex signature over the encoded policy.
    ///
    /// # Errors
    /// Same as [`UploadSigner::signed`].
    pub fn signature(&self) -> UploadResult<&str> {
        Ok(&self.signed()?.signature)
    }

    /// Build, encode, and sign the policy, or return the cached result.
    ///
    /// # Errors
    /// Returns [`crate::UploadError::InvalidExpiry`] if the expiry is invalid
    /// or outside 1..=604800 seconds.
    pub fn signed(&self) -> UploadResult<&SignedPolicy> {
        if let Some(signed) = self.signed.get() {
            return Ok(signed);
        }
        let signed = self.sign_policy()?;
        Ok(self.signed.get_or_init(|| signed))
    }

    /// The ordered hidden form fields, signing on first use.
    ///
    /// # Errors
    /// Same as [`UploadSigner::signed`].
    pub fn form_inputs(&self, include_key: bool) -> UploadResult<IndexMap<String, String>> {
        let signed = self.signed()?;
        Ok(build_form_inputs(signed, &self.options, include_key))
    }

    /// The form fields, including `key`, as hidden `<input>` markup.
    ///
    /// # Errors
    /// Same as [`UploadSigner::signed`], plus [`crate::UploadError::Render`].
    pub fn form_inputs_html(&self) -> UploadResult<String> {
        render_hidden_inputs(self.form_inputs(true)?)
    }

    fn sign_policy(&self) -> UploadResult<SignedPolicy> {
        let scope = self.credential_scope().to_owned();
        let short_date = self.date.short();

        let policy = build_policy(&self.bucket, &self.options, &scope, &self.date)?;
        let signing_key = derive_signing_key(
            self.credentials.secret_access_key(),
            &short_date,
            self.region.as_str(),
            SERVICE,
            REQUEST_TYPE,
        );
        let signature = sign(&policy.base64, &signing_key);

        debug!(
            bucket = %self.bucket,
            region = %self.region,
            credential_scope = %scope,
            "Signed upload policy for bucket"
        );

        Ok(SignedPolicy {
            credential_scope: scope,
            policy,
            signature,
            date: self.date.full(),
        })
    }
}

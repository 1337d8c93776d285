//! Cross-crate tests for directupload.
//!
//! These exercise the full path from credentials and options to a signed,
//! decodable form, checking that every piece agrees with every other.
//!
//! Run them with:
//! ```text
//! cargo test -p directupload-integration
//! ```

use std::sync::Once;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use chrono::{DateTime, TimeZone, Utc};
use directupload_auth::Credentials;
use directupload_core::{OptionOverrides, UploadSigner};

mod test_form;
mod test_policy;
mod test_url;

static INIT: Once = Once::new();

/// Initialize tracing (once).
fn init_tracing() {
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
            )
            .with_test_writer()
            .init();
    });
}

/// The fixed instant signers in these tests are dated at.
#[must_use]
pub fn signing_instant() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 2, 29, 23, 59, 58)
        .single()
        .expect("valid test instant")
}

/// Build a signer for `bucket` in `region` with fixed test credentials.
///
/// # Panics
///
/// Panics if the region or overrides are invalid.
#[must_use]
pub fn signer(bucket: &str, region: &str, overrides: OptionOverrides) -> UploadSigner {
    init_tracing();

    let credentials = Credentials::new("key", "secret").expect("test credentials");
    UploadSigner::new(credentials, bucket, region, overrides)
        .expect("test signer")
        .at(signing_instant())
}

/// Decode a base64 `policy` form field into JSON.
///
/// # Panics
///
/// Panics if the field is not base64-encoded JSON.
#[must_use]
pub fn decode_policy(policy: &str) -> serde_json::Value {
    let bytes = STANDARD.decode(policy).expect("policy is base64");
    serde_json::from_slice(&bytes).expect("policy is json")
}

//! Ordered form fields for the browser upload form.

use directupload_auth::sigv4::ALGORITHM;
use indexmap::IndexMap;

use crate::options::UploadOptions;
use crate::signer::SignedPolicy;

/// Assemble the hidden form fields in the order S3 expects them.
///
/// The signed fields come first, then every additional input, then `key`
/// (`valid_prefix` + `default_filename`) when `include_key` is set. The `key`
/// field is usually filled in by the page's script when it is left out.
#[must_use]
pub fn build_form_inputs(
    signed: &SignedPolicy,
    options: &UploadOptions,
    include_key: bool,
) -> IndexMap<String, String> {
    let mut inputs = IndexMap::with_capacity(9 + options.additional_inputs.len());

    inputs.insert("Content-Type".to_owned(), options.content_type.clone());
    inputs.insert("acl".to_owned(), options.acl.to_string());
    inputs.insert(
        "success_action_status".to_owned(),
        options.success_status.clone(),
    );
    inputs.insert("policy".to_owned(), signed.policy.base64.clone());
    inputs.insert("X-amz-credential".to_owned(), signed.credential_scope.clone());
    inputs.insert("X-amz-algorithm".to_owned(), ALGORITHM.to_owned());
    inputs.insert("X-amz-date".to_owned(), signed.date.clone());
    inputs.insert("X-amz-signature".to_owned(), signed.signature.clone());

    for (name, value) in &options.additional_inputs {
        inputs.insert(name.clone(), value.clone());
    }

    if include_key {
        inputs.insert("key".to_owned(), options.key_template());
    }

    inputs
}

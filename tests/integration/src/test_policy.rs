//! Policy round-trip integration tests.

#[cfg(test)]
mod tests {
    use directupload_auth::{REQUEST_TYPE, SERVICE, derive_signing_key, sign};
    use directupload_core::{OptionOverrides, UploadError};
    use serde_json::json;

    use crate::{decode_policy, signer};

    #[test]
    fn test_should_embed_form_values_in_policy() {
        let signer = signer("testbucket", "eu-west-1", OptionOverrides::default());
        let inputs = signer.form_inputs(true).unwrap();
        let policy = decode_policy(&inputs["policy"]);

        let conditions = policy["conditions"].as_array().unwrap();
        assert_eq!(conditions.len(), 9);
        assert_eq!(conditions[6]["x-amz-credential"], inputs["X-amz-credential"].as_str());
        assert_eq!(conditions[7]["x-amz-algorithm"], inputs["X-amz-algorithm"].as_str());
        assert_eq!(conditions[8]["x-amz-date"], inputs["X-amz-date"].as_str());
        assert_eq!(conditions[1]["acl"], inputs["acl"].as_str());
        assert_eq!(
            conditions[5]["success_action_status"],
            inputs["success_action_status"].as_str()
        );
    }

    #[test]
    fn test_should_add_one_condition_per_additional_input() {
        let signer = signer(
            "testbucket",
            "eu-west-1",
            OptionOverrides::builder()
                .additional_inputs([
                    ("Content-Disposition".to_owned(), "attachment".to_owned()),
                    ("x-amz-meta-user".to_owned(), "42".to_owned()),
                ])
                .encryption(true)
                .build(),
        );
        let inputs = signer.form_inputs(true).unwrap();
        let policy = decode_policy(&inputs["policy"]);
        let conditions = policy["conditions"].as_array().unwrap();

        assert_eq!(conditions.len(), 9 + 3);
        assert_eq!(
            conditions[9..],
            [
                json!(["starts-with", "$Content-Disposition", "attachment"]),
                json!(["starts-with", "$x-amz-meta-user", "42"]),
                json!(["starts-with", "$X-amz-server-side-encryption", "AES256"]),
            ]
        );
        assert_eq!(inputs["X-amz-server-side-encryption"], "AES256");
    }

    #[test]
    fn test_should_expire_relative_to_signing_instant() {
        let signer = signer(
            "testbucket",
            "eu-west-1",
            OptionOverrides::builder().expires("+6 hours").build(),
        );
        let policy = decode_policy(&signer.form_inputs(true).unwrap()["policy"]);
        assert_eq!(policy["expiration"], "2024-03-01T05:59:58Z");
    }

    #[test]
    fn test_should_reject_expiry_past_seven_days() {
        let signer = signer(
            "testbucket",
            "eu-west-1",
            OptionOverrides::builder().expires(604_801_i64).build(),
        );
        assert!(matches!(
            signer.form_inputs(true),
            Err(UploadError::InvalidExpiry(_))
        ));
    }

    #[test]
    fn test_should_verify_signature_independently() {
        let signer = signer("testbucket", "eu-west-1", OptionOverrides::default());
        let inputs = signer.form_inputs(true).unwrap();

        let key = derive_signing_key("secret", "20240229", "eu-west-1", SERVICE, REQUEST_TYPE);
        assert_eq!(sign(&inputs["policy"], &key), inputs["X-amz-signature"]);
    }

    #[test]
    fn test_should_constrain_content_type_exactly() {
        let signer = signer(
            "testbucket",
            "eu-west-1",
            OptionOverrides::builder().content_type("image/jpeg").build(),
        );
        let inputs = signer.form_inputs(true).unwrap();
        let policy = decode_policy(&inputs["policy"]);

        assert_eq!(policy["conditions"][3], json!({ "Content-Type": "image/jpeg" }));
        assert_eq!(inputs["Content-Type"], "image/jpeg");
    }
}

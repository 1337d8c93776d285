//! Form field integration tests.

#[cfg(test)]
mod tests {
    use directupload_auth::{AuthError, Credentials};
    use directupload_core::{OptionOverrides, UploadError, UploadSigner};

    use crate::{signer, signing_instant};

    #[test]
    fn test_should_build_complete_form() {
        let signer = signer(
            "testbucket",
            "eu-west-1",
            OptionOverrides::builder()
                .acl("public-read")
                .success_status(200)
                .valid_prefix("test/")
                .build(),
        );
        let inputs = signer.form_inputs(true).unwrap();

        assert_eq!(inputs["acl"], "public-read");
        assert_eq!(inputs["success_action_status"], "200");
        assert_eq!(inputs["X-amz-date"], "20240229T235958Z");
        assert_eq!(inputs["X-amz-algorithm"], "AWS4-HMAC-SHA256");
        assert_eq!(inputs["key"], "test/${filename}");
        assert_eq!(
            inputs["X-amz-credential"],
            "key/20240229/eu-west-1/s3/aws4_request"
        );
    }

    #[test]
    fn test_should_return_identical_inputs_on_repeat_calls() {
        let signer = signer("testbucket", "eu-west-1", OptionOverrides::default());
        let first = signer.form_inputs(true).unwrap();
        let second = signer.form_inputs(true).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_should_sign_identically_for_same_instant() {
        let a = signer("testbucket", "eu-west-1", OptionOverrides::default());
        let b = signer("testbucket", "eu-west-1", OptionOverrides::default());
        assert_eq!(a.signature().unwrap(), b.signature().unwrap());
    }

    #[test]
    fn test_should_reject_placeholder_and_empty_credentials() {
        for (key, secret) in [("YOUR_S3_KEY", "secret"), ("key", "YOUR_S3_SECRET"), ("", "")] {
            let result = Credentials::new(key, secret)
                .map_err(UploadError::from)
                .and_then(|creds| {
                    UploadSigner::new(creds, "bucket", "eu-west-1", OptionOverrides::default())
                });
            assert!(
                matches!(result, Err(UploadError::Auth(AuthError::InvalidCredential(_)))),
                "({key:?}, {secret:?}) should be rejected"
            );
        }
    }

    #[test]
    fn test_should_render_html_with_signature() {
        let signer = signer("testbucket", "eu-west-1", OptionOverrides::default());
        let html = signer.form_inputs_html().unwrap();

        assert!(html.starts_with("<input type"));
        assert!(html.contains(signer.signature().unwrap()));
        assert_eq!(html.lines().count(), 9);
    }

    #[test]
    fn test_should_keep_signing_date_fixed() {
        let signer = signer("testbucket", "eu-west-1", OptionOverrides::default());
        assert_eq!(signer.signing_date().instant(), signing_instant());
    }
}

//! Form URL integration tests.

#[cfg(test)]
mod tests {
    use directupload_core::{OptionOverrides, UploadError};

    use crate::signer;

    #[test]
    fn test_should_encode_bucket_in_regional_url() {
        let signer = signer("test/bucket", "eu-west-1", OptionOverrides::default());
        assert_eq!(
            signer.form_url().unwrap(),
            "//s3-eu-west-1.amazonaws.com/test%2Fbucket"
        );
    }

    #[test]
    fn test_should_omit_region_for_us_east_1() {
        let signer = signer("bucket", "us-east-1", OptionOverrides::default());
        assert_eq!(signer.form_url().unwrap(), "//s3.amazonaws.com/bucket");
    }

    #[test]
    fn test_should_ignore_trailing_slash_on_custom_url() {
        for custom in ["http://example.com", "http://example.com/"] {
            let signer = signer(
                "bucket",
                "us-east-1",
                OptionOverrides::builder().custom_url(custom).build(),
            );
            assert_eq!(signer.form_url().unwrap(), "http://example.com/bucket");
        }
    }

    #[test]
    fn test_should_reject_malformed_custom_url() {
        let signer = signer(
            "testbucket",
            "eu-west-1",
            OptionOverrides::builder().custom_url("not a url").build(),
        );
        assert!(matches!(
            signer.form_url(),
            Err(UploadError::InvalidOption { .. })
        ));
        // The policy does not depend on the URL, so signing still works.
        assert!(signer.form_inputs(true).is_ok());
    }

    #[test]
    fn test_should_use_accelerated_endpoint() {
        let signer = signer(
            "bucket",
            "ap-southeast-2",
            OptionOverrides::builder().accelerate(true).build(),
        );
        assert_eq!(
            signer.form_url().unwrap(),
            "//bucket.s3-accelerate.amazonaws.com"
        );
    }
}

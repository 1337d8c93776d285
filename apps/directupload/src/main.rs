//! directupload - print a signed S3 browser upload form.
//!
//! Reads the bucket, region, and option overrides from the environment,
//! signs an upload policy, and writes either JSON (`url` + ordered `fields`)
//! or a ready-to-embed HTML `<form>` to stdout. Logs go to stderr.
//!
//! # Usage
//!
//! ```text
//! AWS_ACCESS_KEY_ID=... AWS_SECRET_ACCESS_KEY=... \
//! DIRECTUPLOAD_BUCKET=uploads DIRECTUPLOAD_REGION=eu-west-1 directupload
//! ```
//!
//! # Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `AWS_ACCESS_KEY_ID` | *(required)* | Access key the policy is signed for |
//! | `AWS_SECRET_ACCESS_KEY` | *(required)* | Secret used to derive the signing key |
//! | `DIRECTUPLOAD_BUCKET` | *(required)* | Destination bucket |
//! | `DIRECTUPLOAD_REGION` | `us-east-1` | Bucket region |
//! | `DIRECTUPLOAD_OPTIONS` | `{}` | JSON object of option overrides |
//! | `DIRECTUPLOAD_FORMAT` | `json` | `json` or `html` |
//! | `LOG_LEVEL` | `info` | Log level filter |
//! | `RUST_LOG` | *(unset)* | Fine-grained tracing filter (overrides `LOG_LEVEL`) |

use anyhow::{Context, Result};
use directupload_auth::Credentials;
use directupload_core::html::render_form;
use directupload_core::{DirectUploadConfig, OutputFormat, UploadOptions, UploadSigner};
use indexmap::IndexMap;
use serde::Serialize;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Initialize the tracing subscriber on stderr.
///
/// Uses `RUST_LOG` if set, otherwise falls back to the `LOG_LEVEL` config value.
fn init_tracing(log_level: &str) -> Result<()> {
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        EnvFilter::try_new(log_level)
            .with_context(|| format!("invalid log level filter: {log_level}"))?
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    Ok(())
}

/// JSON output: the form action and its fields in posting order.
#[derive(Debug, Serialize)]
struct FormOutput<'a> {
    url: &'a str,
    fields: &'a IndexMap<String, String>,
}

/// Render the signed form in the configured format.
fn render(signer: &UploadSigner, format: OutputFormat) -> Result<String> {
    let url = signer.form_url().context("failed to build form url")?;
    let fields = signer
        .form_inputs(true)
        .context("failed to sign upload policy")?;

    let output = match format {
        OutputFormat::Json => {
            let body = FormOutput {
                url: &url,
                fields: &fields,
            };
            serde_json::to_string_pretty(&body).context("failed to encode form as json")?
        }
        OutputFormat::Html => render_form(&url, &fields).context("failed to render form")?,
    };
    Ok(output)
}

fn main() -> Result<()> {
    let config = DirectUploadConfig::from_env().context("failed to load configuration")?;
    init_tracing(&config.log_level)?;

    let credentials = Credentials::from_env().context("failed to load credentials")?;
    let options =
        UploadOptions::new(config.options.clone()).context("invalid upload options")?;
    let signer = UploadSigner::with_options(credentials, &config.bucket, config.region, options);

    info!(
        bucket = %config.bucket,
        region = %config.region,
        format = %config.format,
        "generating upload form"
    );

    let output = render(&signer, config.format)?;
    println!("{output}");

    Ok(())
}

//! Hidden `<input>` markup for the upload form.
//!
//! Both views are askama templates under `templates/`, so every name, value
//! and action is HTML-escaped on output.

use askama::Template;

use crate::error::UploadResult;

/// One hidden input per field, one per line.
#[derive(Debug, Template)]
#[template(path = "hidden_inputs.html")]
pub struct HiddenInputsView {
    fields: Vec<(String, String)>,
}

impl HiddenInputsView {
    /// Collect the fields to render, preserving their order.
    pub fn new<I, K, V>(fields: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        Self {
            fields: fields
                .into_iter()
                .map(|(name, value)| (name.as_ref().to_owned(), value.as_ref().to_owned()))
                .collect(),
        }
    }
}

/// A multipart form posting to `action`, with the hidden inputs and a file
/// input.
#[derive(Debug, Template)]
#[template(path = "upload_form.html")]
pub(crate) struct UploadFormView<'a> {
    action: &'a str,
    inputs: String,
}

/// Render each field as a hidden input, one per line.
///
/// # Errors
/// Returns [`crate::UploadError::Render`] if the template fails to render.
///
/// # Examples
///
/// ```
/// use directupload_core::html::render_hidden_inputs;
///
/// let html = render_hidden_inputs([("acl", "private")]).unwrap();
/// assert_eq!(html.trim_end(), "<input type=\"hidden\" name=\"acl\" value=\"private\" />");
/// ```
pub fn render_hidden_inputs<I, K, V>(fields: I) -> UploadResult<String>
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: AsRef<str>,
{
    Ok(HiddenInputsView::new(fields).render()?)
}

/// Render a complete multipart upload form posting to `action`.
///
/// # Errors
/// Returns [`crate::UploadError::Render`] if a template fails to render.
pub fn render_form<I, K, V>(action: &str, fields: I) -> UploadResult<String>
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: AsRef<str>,
{
    let view = UploadFormView {
        action,
        inputs: render_hidden_inputs(fields)?,
    };
    Ok(view.render()?)
}

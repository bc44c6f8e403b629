//! `content-type` derivation from logical file names.

use http::HeaderValue;

/// Guesses `content-type` header value from the logical file name extension.
///
/// Only the name is used, file content is never read, so the value holds no
/// matter which encoding variant of the file ends up being served. Returns
/// [None] if the extension maps to no known type (the header is then simply
/// not set). For text files (eg. plain, html, css, js, etc) it assumes utf-8
/// encoding.
pub fn from_name(name: &str) -> Option<HeaderValue> {
    let mime = mime_guess::from_path(name).first()?;
    let mut content_type = mime.as_ref().to_owned();

    // NOTE: temporary workaround for https://github.com/abonander/mime_guess/issues/90
    if content_type == "application/javascript" {
        content_type = "text/javascript".to_owned();
    }

    if content_type.starts_with("text/") {
        content_type.push_str("; charset=utf-8");
    }

    let content_type = HeaderValue::from_str(&content_type).unwrap();
    Some(content_type)
}

use std::fmt;

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde::{Deserialize, Serialize};

pub const DEFAULT_PREVIEW_ENDPOINT: &str = "/api/preview";

// Same reserved set as `encodeURIComponent`.
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreviewPayload {
    pub title: String,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupError {
    Network(String),
    Status(u16),
    Decode(String),
}

impl fmt::Display for LookupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LookupError::Network(message) => write!(f, "preview request failed: {message}"),
            LookupError::Status(code) => write!(f, "preview request returned status {code}"),
            LookupError::Decode(message) => write!(f, "preview response unreadable: {message}"),
        }
    }
}

impl std::error::Error for LookupError {}

pub fn preview_url(endpoint: &str, path: &str) -> String {
    let separator = if endpoint.contains('?') { '&' } else { '?' };
    format!("{endpoint}{separator}path={}", utf8_percent_encode(path, COMPONENT))
}

/// Turns a successful response body into a payload. JSON bodies must carry
/// `title` and `content`; anything else is taken as rendered markup and
/// titled after the path.
pub fn decode_preview(
    path: &str,
    content_type: Option<&str>,
    body: &str,
) -> Result<PreviewPayload, LookupError> {
    let is_json = content_type
        .map(|value| value.to_ascii_lowercase().contains("json"))
        .unwrap_or(false);
    if is_json {
        return serde_json::from_str(body).map_err(|err| LookupError::Decode(err.to_string()));
    }
    Ok(PreviewPayload {
        title: title_from_path(path),
        content: body.to_string(),
    })
}

pub fn title_from_path(path: &str) -> String {
    let name = path.rsplit('/').find(|segment| !segment.is_empty()).unwrap_or(path);
    let stem = match name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() && ext.eq_ignore_ascii_case("md") => stem,
        _ => name,
    };
    stem.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_escapes_path_component() {
        assert_eq!(
            preview_url("/api/preview", "notes/My Note & more.md"),
            "/api/preview?path=notes%2FMy%20Note%20%26%20more.md"
        );
        assert_eq!(preview_url("/api/preview?v=2", "a"), "/api/preview?v=2&path=a");
    }

    #[test]
    fn json_body_is_parsed() {
        let payload = decode_preview(
            "notes/x",
            Some("application/json; charset=utf-8"),
            r#"{"title":"X","content":"<p>hi</p>"}"#,
        )
        .expect("json payload");
        assert_eq!(payload.title, "X");
        assert_eq!(payload.content, "<p>hi</p>");
    }

    #[test]
    fn bad_json_is_a_decode_error() {
        let err = decode_preview("x", Some("application/json"), "{").unwrap_err();
        assert!(matches!(err, LookupError::Decode(_)));
    }

    #[test]
    fn html_body_gets_title_from_path() {
        let payload = decode_preview("notes/Daily Log.md", Some("text/html"), "<h1>hey</h1>")
            .expect("html payload");
        assert_eq!(payload.title, "Daily Log");
        assert_eq!(payload.content, "<h1>hey</h1>");
        assert_eq!(title_from_path("archive.tar"), "archive.tar");
        assert_eq!(title_from_path(".md"), ".md");
    }
}

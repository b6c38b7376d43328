use crate::{Auth, BodySnippetConfig};
use http::HeaderMap;
use serde_json::Value;

use super::redact::{redact_text, truncate_utf8};

pub(crate) fn request_id(headers: &HeaderMap) -> Option<Box<str>> {
    for name in ["x-request-id", "openai-request-id", "x-correlation-id"] {
        if let Some(value) = headers.get(name).and_then(|v| v.to_str().ok()) {
            let value = value.trim();
            if !value.is_empty() {
                return Some(value.to_string().into_boxed_str());
            }
        }
    }
    None
}

/// Fields lifted from an API error body.
#[derive(Debug, Default, PartialEq, Eq)]
pub(crate) struct ErrorDetails {
    pub(crate) message: Option<Box<str>>,
    pub(crate) error_type: Option<Box<str>>,
    pub(crate) code: Option<Box<str>>,
}

fn non_empty_str(value: Option<&Value>) -> Option<Box<str>> {
    let text = value?.as_str()?.trim();
    (!text.is_empty()).then(|| text.to_string().into_boxed_str())
}

/// Parse `{"error": {"message", "type", "code"}}`, falling back to a flat
/// `message`/`error` string.
pub(crate) fn extract_error(body: &[u8]) -> ErrorDetails {
    let Ok(value) = serde_json::from_slice::<Value>(body) else {
        return ErrorDetails::default();
    };

    if let Some(envelope) = value.get("error").filter(|v| v.is_object()) {
        return ErrorDetails {
            message: non_empty_str(envelope.get("message")),
            error_type: non_empty_str(envelope.get("type")),
            code: non_empty_str(envelope.get("code")),
        };
    }

    let message = ["message", "error", "detail"]
        .into_iter()
        .find_map(|key| non_empty_str(value.get(key)));
    ErrorDetails {
        message,
        ..ErrorDetails::default()
    }
}

pub(crate) fn body_snippet(
    body: &[u8],
    config: BodySnippetConfig,
    auth: Option<&Auth>,
) -> Option<Box<str>> {
    if !config.enabled {
        return None;
    }

    let body = redact_text(String::from_utf8_lossy(body).into_owned(), auth);
    Some(truncate_utf8(&body, config.max_bytes).into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::HeaderValue;

    #[test]
    fn extract_error_reads_openai_envelope() {
        let body = br#"{"error":{"message":"No assistant found with id 'asst_x'.","type":"invalid_request_error","param":null,"code":null}}"#;
        let details = extract_error(body);
        assert_eq!(
            details.message.as_deref(),
            Some("No assistant found with id 'asst_x'.")
        );
        assert_eq!(details.error_type.as_deref(), Some("invalid_request_error"));
        assert_eq!(details.code, None);
    }

    #[test]
    fn extract_error_falls_back_to_flat_message() {
        let details = extract_error(br#"{"message":"  upstream down "}"#);
        assert_eq!(details.message.as_deref(), Some("upstream down"));
        assert_eq!(extract_error(b"not json"), ErrorDetails::default());
    }

    #[test]
    fn request_id_prefers_x_request_id() {
        let mut headers = HeaderMap::new();
        headers.insert("openai-request-id", HeaderValue::from_static("b"));
        headers.insert("x-request-id", HeaderValue::from_static("a"));
        assert_eq!(request_id(&headers).as_deref(), Some("a"));
    }

    #[test]
    fn body_snippet_is_truncated_and_redacted() {
        let auth = Auth::bearer("sk-secret");
        let config = BodySnippetConfig {
            enabled: true,
            max_bytes: 16,
        };
        let snippet = body_snippet(b"key=sk-secret and more text", config, Some(&auth));
        assert_eq!(snippet.as_deref(), Some("key=<redacted> a"));

        let cut_inside_key = BodySnippetConfig {
            enabled: true,
            max_bytes: 12,
        };
        let snippet = body_snippet(b"key=sk-secret", cut_inside_key, Some(&auth)).unwrap();
        assert_eq!(&*snippet, "key=<redacte");
        assert!(!snippet.contains("sk-"));

        let disabled = BodySnippetConfig {
            enabled: false,
            ..config
        };
        assert!(body_snippet(b"x", disabled, None).is_none());
    }
}

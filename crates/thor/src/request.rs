//! Request options and request construction

use std::collections::HashMap;
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE};
use serde::Serialize;
use url::Url;

use crate::error::{HttpError, Operation};

/// Per-call options for a request
///
/// `B` is the body type. It defaults to `()` for requests that never carry
/// one; any [`Serialize`] type can be used and is sent as JSON.
#[derive(Debug, Clone)]
pub struct HttpOptions<B = ()> {
    /// Full URL of the endpoint
    pub url: String,
    /// Request headers, applied over the defaults
    pub headers: HashMap<String, String>,
    /// Request body, encoded as JSON when present
    pub body: Option<B>,
    /// Timeout for this request only
    pub timeout: Option<Duration>,
}

impl HttpOptions {
    /// Options for `url` with no headers, body or timeout
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            headers: HashMap::new(),
            body: None,
            timeout: None,
        }
    }
}

impl<B> HttpOptions<B> {
    /// Add a header, replacing any earlier value for the same name
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    /// Set the request body
    pub fn body<T: Serialize>(self, body: T) -> HttpOptions<T> {
        HttpOptions {
            url: self.url,
            headers: self.headers,
            body: Some(body),
            timeout: self.timeout,
        }
    }

    /// Set the timeout for this request
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// Build a request for `operation` against an already validated `url`
///
/// The body is encoded before anything else so a body that cannot be
/// serialized never reaches the network.
pub(crate) fn build_request<B: Serialize>(
    client: &reqwest::Client,
    operation: Operation,
    url: Url,
    options: &HttpOptions<B>,
) -> Result<reqwest::Request, HttpError> {
    let body = options
        .body
        .as_ref()
        .map(serde_json::to_vec)
        .transpose()
        .map_err(HttpError::Serialization)?;

    let mut headers = HeaderMap::new();
    if body.is_some() {
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    }
    for (key, value) in &options.headers {
        let name = HeaderName::from_bytes(key.as_bytes())
            .map_err(|e| HttpError::Construction(format!("Invalid header name '{key}': {e}")))?;
        let value = HeaderValue::from_str(value).map_err(|e| {
            HttpError::Construction(format!("Invalid value for header '{key}': {e}"))
        })?;
        headers.insert(name, value);
    }

    let mut builder = client.request(operation.into(), url).headers(headers);
    if let Some(body) = body {
        builder = builder.body(body);
    }
    if let Some(timeout) = options.timeout {
        builder = builder.timeout(timeout);
    }

    builder
        .build()
        .map_err(|e| HttpError::Construction(e.to_string()))
}

#[cfg(test)]
mod tests {
    use serde::ser::Error as _;
    use serde::Serializer;

    use super::*;
    use crate::endpoint::validate_url;

    struct Unserializable;

    impl Serialize for Unserializable {
        fn serialize<S: Serializer>(&self, _serializer: S) -> Result<S::Ok, S::Error> {
            Err(S::Error::custom("value cannot be represented as JSON"))
        }
    }

    #[derive(Serialize)]
    struct Payload {
        name: String,
        value: i32,
    }

    fn url() -> Url {
        validate_url("http://localhost:3000/items").expect("Valid URL")
    }

    fn body_bytes(request: &reqwest::Request) -> Vec<u8> {
        request
            .body()
            .and_then(|body| body.as_bytes())
            .map(|bytes| bytes.to_vec())
            .unwrap_or_default()
    }

    #[test]
    fn test_builds_bodyless_request() {
        let client = reqwest::Client::new();
        let options = HttpOptions::new("http://localhost:3000/items");
        let request =
            build_request(&client, Operation::Get, url(), &options).expect("Request should build");

        assert_eq!(request.method(), reqwest::Method::GET);
        assert_eq!(request.url().as_str(), "http://localhost:3000/items");
        assert!(request.body().is_none());
        assert!(request.headers().get(CONTENT_TYPE).is_none());
        assert!(request.timeout().is_none());
    }

    #[test]
    fn test_serializes_body_as_json() {
        let client = reqwest::Client::new();
        let options = HttpOptions::new("http://localhost:3000/items").body(Payload {
            name: "test".to_string(),
            value: 42,
        });
        let request =
            build_request(&client, Operation::Post, url(), &options).expect("Request should build");

        assert_eq!(request.method(), reqwest::Method::POST);
        assert_eq!(
            request.headers().get(CONTENT_TYPE),
            Some(&HeaderValue::from_static("application/json"))
        );
        let sent: serde_json::Value =
            serde_json::from_slice(&body_bytes(&request)).expect("Body should be JSON");
        assert_eq!(sent, serde_json::json!({"name": "test", "value": 42}));
    }

    #[test]
    fn test_delete_carries_body() {
        let client = reqwest::Client::new();
        let options = HttpOptions::new("http://localhost:3000/items").body(vec![1, 2, 3]);
        let request = build_request(&client, Operation::Delete, url(), &options)
            .expect("Request should build");

        assert_eq!(request.method(), reqwest::Method::DELETE);
        assert_eq!(body_bytes(&request), b"[1,2,3]");
    }

    #[test]
    fn test_headers_override_defaults() {
        let client = reqwest::Client::new();
        let options = HttpOptions::new("http://localhost:3000/items")
            .header("Content-Type", "application/merge-patch+json")
            .header("X-Request-Id", "abc-123")
            .body(serde_json::json!({"op": "replace"}));
        let request =
            build_request(&client, Operation::Put, url(), &options).expect("Request should build");

        let content_types: Vec<_> = request.headers().get_all(CONTENT_TYPE).iter().collect();
        assert_eq!(content_types, vec!["application/merge-patch+json"]);
        assert_eq!(
            request.headers().get("x-request-id"),
            Some(&HeaderValue::from_static("abc-123"))
        );
    }

    #[test]
    fn test_applies_timeout() {
        let client = reqwest::Client::new();
        let options =
            HttpOptions::new("http://localhost:3000/items").timeout(Duration::from_millis(250));
        let request =
            build_request(&client, Operation::Get, url(), &options).expect("Request should build");

        assert_eq!(request.timeout(), Some(&Duration::from_millis(250)));
    }

    #[test]
    fn test_unserializable_body() {
        let client = reqwest::Client::new();
        let options = HttpOptions::new("http://localhost:3000/items").body(Unserializable);
        let result = build_request(&client, Operation::Post, url(), &options);

        assert!(matches!(result, Err(HttpError::Serialization(_))));
    }

    #[test]
    fn test_invalid_header_name() {
        let client = reqwest::Client::new();
        let options = HttpOptions::new("http://localhost:3000/items").header("bad header", "x");
        let result = build_request(&client, Operation::Get, url(), &options);

        match result {
            Err(HttpError::Construction(msg)) => assert!(msg.contains("bad header")),
            other => panic!("Expected HttpError::Construction, got {other:?}"),
        }
    }

    #[test]
    fn test_invalid_header_value() {
        let client = reqwest::Client::new();
        let options = HttpOptions::new("http://localhost:3000/items").header("X-Bad", "line\nbreak");
        let result = build_request(&client, Operation::Get, url(), &options);

        assert!(matches!(result, Err(HttpError::Construction(_))));
    }

    #[test]
    fn test_options_builder() {
        let options = HttpOptions::new("http://localhost")
            .header("A", "1")
            .header("A", "2")
            .timeout(Duration::from_secs(5));

        assert_eq!(options.url, "http://localhost");
        assert_eq!(options.headers.get("A").map(String::as_str), Some("2"));
        assert_eq!(options.timeout, Some(Duration::from_secs(5)));
        assert!(options.body.is_none());
    }
}

//! Outbound request construction.
//!
//! [`RequestBuilder`] turns caller intent (URL, method, payload, options) into a
//! [`RequestDescriptor`] carrying the gateway's authentication headers. It performs no I/O.

use std::time::Duration;

use reqwest::Method;
use serde_json::Value;
use url::Url;
use uuid::Uuid;

use crate::{
    config::ClientConfig,
    error::{BraspagError, Result},
};

/// Header carrying the correlation identifier.
pub const REQUEST_ID_HEADER: &str = "RequestId";
/// Header carrying the merchant identifier.
pub const MERCHANT_ID_HEADER: &str = "MerchantId";
/// Header carrying the merchant secret.
pub const MERCHANT_KEY_HEADER: &str = "MerchantKey";

/// Request payload supplied by the caller.
///
/// Text is always sent verbatim, whether it arrives as [`Payload::Text`] or as a JSON string
/// inside [`Payload::Json`]. Any other JSON value is encoded.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// Already-encoded body, sent verbatim. The caller is responsible for its encoding.
    Text(String),
    /// Structured body, JSON-encoded before sending. A JSON string is sent as its text.
    Json(Value),
}

impl From<&str> for Payload {
    fn from(text: &str) -> Self {
        Self::Text(text.to_owned())
    }
}

impl From<String> for Payload {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<Value> for Payload {
    fn from(value: Value) -> Self {
        Self::Json(value)
    }
}

impl Payload {
    /// Returns true for payloads that produce no body.
    ///
    /// Empty strings, `null` and empty JSON objects, arrays and strings count as empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Text(text) => text.is_empty(),
            Self::Json(Value::Null) => true,
            Self::Json(Value::String(s)) => s.is_empty(),
            Self::Json(Value::Array(items)) => items.is_empty(),
            Self::Json(Value::Object(fields)) => fields.is_empty(),
            Self::Json(_) => false,
        }
    }
}

/// Per-call overrides.
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    /// Correlation id to send instead of a generated one.
    pub request_id: Option<String>,
    /// Complete header set replacing the defaults.
    ///
    /// When set, no default header (including `RequestId`) is added.
    pub headers: Option<Vec<(String, String)>>,
}

impl RequestOptions {
    /// Options reusing the given correlation id.
    #[must_use]
    #[allow(
        clippy::impl_trait_in_params,
        reason = "impl Into<String> is idiomatic for builder methods"
    )]
    pub fn with_request_id(request_id: impl Into<String>) -> Self {
        Self { request_id: Some(request_id.into()), headers: None }
    }
}

/// Fully-resolved outbound request.
#[derive(Debug, Clone)]
pub struct RequestDescriptor {
    /// Absolute request URL.
    pub url: Url,
    /// HTTP method.
    pub method: Method,
    /// Encoded body, if any.
    pub body: Option<String>,
    /// Headers in insertion order.
    pub headers: Vec<(String, String)>,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl RequestDescriptor {
    /// Returns the first header value with the given name, compared case-insensitively.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Returns the correlation id sent with this request.
    #[must_use]
    pub fn request_id(&self) -> Option<&str> {
        self.header(REQUEST_ID_HEADER)
    }
}

/// Builds [`RequestDescriptor`]s from the client configuration.
#[derive(Debug, Clone)]
pub struct RequestBuilder {
    config: ClientConfig,
}

impl RequestBuilder {
    /// Creates a builder for the given configuration.
    #[must_use]
    pub fn new(config: ClientConfig) -> Self {
        Self { config }
    }

    /// Default headers sent with every gateway request.
    ///
    /// Generates a fresh UUID v4 correlation id when `request_id` is `None`.
    #[must_use]
    pub fn default_headers(&self, request_id: Option<&str>) -> Vec<(String, String)> {
        let request_id =
            request_id.map_or_else(|| Uuid::new_v4().to_string(), ToOwned::to_owned);

        vec![
            ("Content-Type".to_owned(), "application/json".to_owned()),
            (MERCHANT_ID_HEADER.to_owned(), self.config.merchant_id.clone()),
            (MERCHANT_KEY_HEADER.to_owned(), self.config.merchant_key.expose().to_owned()),
            (REQUEST_ID_HEADER.to_owned(), request_id),
        ]
    }

    /// Builds a request descriptor.
    ///
    /// Default headers are only computed when `options.headers` is `None`.
    ///
    /// # Errors
    ///
    /// Returns [`BraspagError::InvalidArgument`] if a structured payload cannot be encoded.
    pub fn build(
        &self,
        url: Url,
        method: Method,
        payload: Option<&Payload>,
        options: &RequestOptions,
    ) -> Result<RequestDescriptor> {
        let headers = match &options.headers {
            Some(headers) => headers.clone(),
            None => self.default_headers(options.request_id.as_deref()),
        };

        Ok(RequestDescriptor {
            url,
            method,
            body: encode_body(payload)?,
            headers,
            timeout: self.config.timeout(),
        })
    }
}

/// Encodes a payload into a request body.
///
/// - `None` or an empty payload: no body
/// - [`Payload::Text`] or a JSON string: passed through unchanged
/// - any other [`Payload::Json`]: JSON-encoded
///
/// # Errors
///
/// Returns [`BraspagError::InvalidArgument`] if JSON encoding fails.
///
/// # Examples
///
/// ```
/// use braspag_rest::request::{Payload, encode_body};
/// use serde_json::json;
///
/// assert_eq!(encode_body(None).unwrap(), None);
/// assert_eq!(encode_body(Some(&Payload::from("{\"a\":1}"))).unwrap().as_deref(), Some("{\"a\":1}"));
/// assert_eq!(encode_body(Some(&Payload::from(json!({"a": 1})))).unwrap().as_deref(), Some("{\"a\":1}"));
/// ```
pub fn encode_body(payload: Option<&Payload>) -> Result<Option<String>> {
    let Some(payload) = payload.filter(|p| !p.is_empty()) else {
        return Ok(None);
    };

    match payload {
        Payload::Text(text) | Payload::Json(Value::String(text)) => Ok(Some(text.clone())),
        Payload::Json(value) => serde_json::to_string(value)
            .map(Some)
            .map_err(|e| BraspagError::InvalidArgument(format!("payload is not encodable: {e}"))),
    }
}

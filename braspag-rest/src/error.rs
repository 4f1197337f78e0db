//! Error types for the Braspag REST client.
//!
//! All errors implement [`std::error::Error`] via [`thiserror::Error`].
//!
//! # Error Categories
//!
//! - **Argument errors** ([`BraspagError::InvalidArgument`]): rejected locally, before any
//!   network access
//! - **Timeouts** ([`BraspagError::Timeout`]): no response within the configured budget
//! - **Business rejections** ([`BraspagError::GatewayClientError`]): the gateway understood the
//!   request and declined it (HTTP 400); operations recover these into an
//!   [`ErrorEnvelope`](crate::response::ErrorEnvelope)
//! - **Transport errors** ([`BraspagError::Transport`]): everything else on the wire, propagated
//!   unmodified
//! - **Decoding errors** ([`BraspagError::InvalidResponse`]): the gateway answered with a body
//!   that cannot be normalized
//! - **Configuration errors** ([`BraspagError::Config`])
//!
//! # Examples
//!
//! ```
//! use braspag_rest::error::{BraspagError, Result};
//!
//! fn require_id(id: &str) -> Result<&str> {
//!     if id.is_empty() {
//!         return Err(BraspagError::InvalidArgument("transaction id is empty".to_owned()));
//!     }
//!     Ok(id)
//! }
//!
//! assert!(require_id("").is_err());
//! ```

use thiserror::Error;

/// Status reported for requests that never received a response.
///
/// Matches the pseudo status code HTTP clients commonly use for timeouts.
pub const TIMEOUT_STATUS: u16 = 599;

/// Result type alias for client operations.
pub type Result<T> = std::result::Result<T, BraspagError>;

/// Errors that can occur while talking to the gateway.
///
/// # Error Recovery
///
/// - [`InvalidArgument`](Self::InvalidArgument): fix the input, never retry as-is
/// - [`Timeout`](Self::Timeout): the caller decides whether to retry
/// - [`GatewayClientError`](Self::GatewayClientError): inspect the gateway's error codes
/// - [`Transport`](Self::Transport): treat as fatal for this call
#[must_use = "errors should be handled, propagated, or explicitly panicked"]
#[derive(Debug, Error)]
pub enum BraspagError {
    /// A caller-supplied argument failed local validation.
    ///
    /// Raised before any request is sent, e.g. for a malformed transaction id.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// No response was received within the configured timeout.
    ///
    /// `status` carries the timeout indicator ([`TIMEOUT_STATUS`]).
    #[error("Request timed out (status {status}): {message}")]
    Timeout {
        /// Timeout status indicator.
        status: u16,
        /// Transport-level description of the failure.
        message: String,
    },

    /// The gateway validated the request and rejected it (HTTP 400).
    ///
    /// The raw response body is kept so it can be mapped into an
    /// [`ErrorEnvelope`](crate::response::ErrorEnvelope).
    #[error("Gateway rejected the request with status {status}")]
    GatewayClientError {
        /// HTTP status code returned by the gateway.
        status: u16,
        /// Raw response body.
        body: Vec<u8>,
    },

    /// Any other transport failure, passed through unmodified.
    ///
    /// Covers connection errors, TLS errors and non-success statuses other than 400.
    #[error("HTTP request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The gateway returned a body that could not be decoded or normalized.
    #[error("Invalid gateway response: {0}")]
    InvalidResponse(String),

    /// Client configuration could not be loaded or failed validation.
    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl BraspagError {
    /// Returns true if this error is a timeout.
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}

impl From<serde_json::Error> for BraspagError {
    fn from(err: serde_json::Error) -> Self {
        Self::InvalidResponse(format!("malformed JSON: {err}"))
    }
}

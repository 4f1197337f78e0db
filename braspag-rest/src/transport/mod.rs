//! Transport abstraction.
//!
//! A [`Transport`] performs exactly one attempt per [`RequestDescriptor`] and classifies the
//! outcome:
//!
//! 1. no response within the timeout: [`BraspagError::Timeout`](crate::BraspagError::Timeout)
//! 2. HTTP 400: [`BraspagError::GatewayClientError`](crate::BraspagError::GatewayClientError)
//!    with the raw body
//! 3. any other failure: [`BraspagError::Transport`](crate::BraspagError::Transport), unmodified
//! 4. success: [`RawResponse`]
//!
//! There are no implicit retries.

#[allow(
    redundant_imports,
    reason = "Future needed for RPITIT despite being in Edition 2024 prelude"
)]
use std::future::Future;

use crate::{error::Result, request::RequestDescriptor};

pub mod http;
pub(crate) mod sealed;

pub use http::HttpTransport;

/// Successful gateway response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    /// HTTP status code.
    pub status: u16,
    /// Raw response body bytes.
    pub body: Vec<u8>,
}

/// Executes gateway requests.
///
/// This trait is sealed; the crate ships [`HttpTransport`].
pub trait Transport: sealed::private::Sealed + Send + Sync {
    /// Sends the request once and classifies the outcome.
    ///
    /// # Errors
    ///
    /// Returns `Timeout`, `GatewayClientError` or `Transport` errors as described in the
    /// module documentation.
    fn fetch<'a>(
        &'a self,
        request: &'a RequestDescriptor,
    ) -> impl Future<Output = Result<RawResponse>> + Send + 'a;
}

//! Injected observability sink for gateway calls.
//!
//! Every call made by [`HttpTransport`](crate::transport::HttpTransport) produces one record
//! before the request is sent and one after it completes. Records are diagnostic only; they
//! never influence control flow.
//!
//! The default sink is [`NoopObserver`]. [`TracingObserver`] forwards records to `tracing`
//! under the `braspag` target with card numbers masked.

use std::fmt;

use crate::{error::BraspagError, masking::redact_card_numbers, request::RequestDescriptor};

/// Tracing target used by [`TracingObserver`].
pub const LOG_TARGET: &str = "braspag";

/// Receives pre- and post-call records.
///
/// All methods default to doing nothing.
pub trait RequestObserver: Send + Sync + fmt::Debug {
    /// Called before the request is sent.
    fn record_request(&self, request: &RequestDescriptor) {
        let _ = request;
    }

    /// Called when a response was received, whatever its status.
    fn record_response(&self, request: &RequestDescriptor, status: u16, body: &[u8]) {
        let _ = (request, status, body);
    }

    /// Called when no response was received.
    fn record_failure(&self, request: &RequestDescriptor, error: &BraspagError) {
        let _ = (request, error);
    }
}

/// Observer that discards all records.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl RequestObserver for NoopObserver {}

/// Observer that logs records through `tracing` at WARN level.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl RequestObserver for TracingObserver {
    fn record_request(&self, request: &RequestDescriptor) {
        let payload = request.body.as_deref().map(redact_card_numbers);
        tracing::warn!(
            target: LOG_TARGET,
            request_id = request.request_id().unwrap_or_default(),
            method = %request.method,
            url = %request.url,
            payload = payload.as_deref().unwrap_or("None"),
            "Request"
        );
    }

    fn record_response(&self, request: &RequestDescriptor, status: u16, body: &[u8]) {
        let body = redact_card_numbers(&String::from_utf8_lossy(body));
        tracing::warn!(
            target: LOG_TARGET,
            request_id = request.request_id().unwrap_or_default(),
            status,
            body = %body,
            "Response"
        );
    }

    fn record_failure(&self, request: &RequestDescriptor, error: &BraspagError) {
        tracing::error!(
            target: LOG_TARGET,
            request_id = request.request_id().unwrap_or_default(),
            error = %error,
            "No response received"
        );
    }
}

//! HTTP transport implementation using reqwest.

use std::{sync::Arc, time::Duration};

use reqwest::{Client, StatusCode};
use tracing::instrument;

use crate::{
    error::{BraspagError, Result, TIMEOUT_STATUS},
    observer::{NoopObserver, RequestObserver},
    request::RequestDescriptor,
    transport::{RawResponse, Transport, sealed},
};

/// HTTP transport over a pooled reqwest client.
///
/// The connection pool is shared by all calls made through this transport. Timeouts are
/// applied per request from [`RequestDescriptor::timeout`].
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
///
/// use braspag_rest::{observer::TracingObserver, transport::HttpTransport};
///
/// let transport = HttpTransport::new()?.with_observer(Arc::new(TracingObserver));
/// # Ok::<(), braspag_rest::BraspagError>(())
/// ```
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    observer: Arc<dyn RequestObserver>,
}

impl sealed::private::Sealed for HttpTransport {}

impl HttpTransport {
    /// Creates a transport with a pooled client and a [`NoopObserver`].
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client cannot be built (e.g. TLS backend failure).
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .pool_max_idle_per_host(10)
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(BraspagError::Transport)?;
        Ok(Self::with_client(client))
    }

    /// Creates a transport around an existing client.
    ///
    /// Use this to share one connection pool between several gateway clients.
    #[must_use]
    pub fn with_client(client: Client) -> Self {
        Self { client, observer: Arc::new(NoopObserver) }
    }

    /// Replaces the observer receiving pre- and post-call records.
    #[must_use]
    pub fn with_observer(mut self, observer: Arc<dyn RequestObserver>) -> Self {
        self.observer = observer;
        self
    }

    #[instrument(
        skip(self, request),
        fields(method = %request.method, url = %request.url, request_id = request.request_id())
    )]
    async fn execute(&self, request: &RequestDescriptor) -> Result<RawResponse> {
        let mut builder = self
            .client
            .request(request.method.clone(), request.url.clone())
            .timeout(request.timeout);

        for (name, value) in &request.headers {
            builder = builder.header(name, value);
        }

        if let Some(body) = &request.body {
            builder = builder.body(body.clone());
        }

        self.observer.record_request(request);

        let response = match builder.send().await {
            Ok(response) => response,
            Err(err) => return Err(self.fail(request, err)),
        };

        let status = response.status();
        let status_error = response.error_for_status_ref().err();

        let body = match response.bytes().await {
            Ok(bytes) => bytes.to_vec(),
            Err(err) => return Err(self.fail(request, err)),
        };

        self.observer.record_response(request, status.as_u16(), &body);

        if status == StatusCode::BAD_REQUEST {
            tracing::debug!(status = status.as_u16(), "gateway rejected request");
            return Err(BraspagError::GatewayClientError { status: status.as_u16(), body });
        }

        if let Some(err) = status_error {
            return Err(BraspagError::Transport(err));
        }

        Ok(RawResponse { status: status.as_u16(), body })
    }

    fn fail(&self, request: &RequestDescriptor, err: reqwest::Error) -> BraspagError {
        let error = classify(err);
        self.observer.record_failure(request, &error);
        error
    }
}

impl Transport for HttpTransport {
    async fn fetch<'a>(&'a self, request: &'a RequestDescriptor) -> Result<RawResponse> {
        self.execute(request).await
    }
}

/// Maps a reqwest failure without a usable response into the error taxonomy.
fn classify(err: reqwest::Error) -> BraspagError {
    if err.is_timeout() {
        BraspagError::Timeout { status: TIMEOUT_STATUS, message: err.to_string() }
    } else {
        BraspagError::Transport(err)
    }
}
